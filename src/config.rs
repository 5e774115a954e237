use std::f32::consts::PI;

use thiserror::Error;

// Maze
pub const GRID_HEIGHT: usize = 39;
pub const GRID_WIDTH: usize = 13;
pub const CARVE_BUDGET: u32 = 10_000;

// Eye
pub const EYE_RANGE: f32 = PI / 2.2;
pub const EYE_RAYS: usize = 200;
pub const EYE_LENGTH: f32 = 80.0;

// Player, per tick
pub const MOVE_SPEED: f32 = 1.5;
pub const TURN_SPEED: f32 = PI / 60.0;
pub const START_HEADING: f32 = PI / 2.0; // facing +Y (down the map)
pub const PLAYER_RADIUS: f32 = 5.0;

// Shading and projection
pub const WALL_HEIGHT: f32 = 5000.0;
pub const SHADE_FLOOR: f32 = 0.05;
pub const SHADE_SCALE: f32 = 1000.0;

// Window
pub const WINDOW_WIDTH: f32 = 800.0;
pub const WINDOW_HEIGHT: f32 = 600.0;
pub const TICK_RATE: f32 = 60.0;

pub const SEED_VAR: &str = "MAZE_SEED";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("maze must be at least 5x5 cells, got {height}x{width}")]
    GridTooSmall { height: usize, width: usize },
    #[error("maze dimensions must be odd, got {height}x{width}")]
    GridNotOdd { height: usize, width: usize },
    #[error("eye needs at least one ray")]
    NoRays,
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("MAZE_SEED={0:?} is not an unsigned integer")]
    BadSeed(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeConfig {
    pub range: f32,
    pub rays: usize,
    pub length: f32,
}

impl Default for EyeConfig {
    fn default() -> Self {
        Self {
            range: EYE_RANGE,
            rays: EYE_RAYS,
            length: EYE_LENGTH,
        }
    }
}

/// Empirical shading constants, kept tunable rather than derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shading {
    pub floor: f32,
    pub scale: f32,
}

impl Default for Shading {
    fn default() -> Self {
        Self {
            floor: SHADE_FLOOR,
            scale: SHADE_SCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub grid_height: usize,
    pub grid_width: usize,
    pub cell_size: f32,
    pub carve_budget: u32,
    pub eye: EyeConfig,
    pub shading: Shading,
    pub move_speed: f32,
    pub turn_speed: f32,
    pub wall_height: f32,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_height: GRID_HEIGHT,
            grid_width: GRID_WIDTH,
            // map fills the left quarter of the initial window
            cell_size: (WINDOW_WIDTH / 4.0) / GRID_WIDTH as f32,
            carve_budget: CARVE_BUDGET,
            eye: EyeConfig::default(),
            shading: Shading::default(),
            move_speed: MOVE_SPEED,
            turn_speed: TURN_SPEED,
            wall_height: WALL_HEIGHT,
            seed: None,
        }
    }
}

impl Settings {
    /// Defaults plus the optional seed from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let seed = match std::env::var(SEED_VAR) {
            Ok(raw) => Some(parse_seed(&raw)?),
            Err(_) => None,
        };
        let settings = Self {
            seed,
            ..Self::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (height, width) = (self.grid_height, self.grid_width);
        if height < 5 || width < 5 {
            return Err(ConfigError::GridTooSmall { height, width });
        }
        if height % 2 == 0 || width % 2 == 0 {
            return Err(ConfigError::GridNotOdd { height, width });
        }
        if self.eye.rays == 0 {
            return Err(ConfigError::NoRays);
        }
        for (name, value) in [
            ("cell size", self.cell_size),
            ("eye range", self.eye.range),
            ("eye length", self.eye.length),
            ("wall height", self.wall_height),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        Ok(())
    }
}

fn parse_seed(raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::BadSeed(raw.to_string()))
}
