use rand::Rng;

use crate::geometry::{Segment, Vec2, distance};
use crate::maze::{CarveStats, carve};

/// The generated maze: wall segments plus the grid layout they came from.
/// Built once at startup and only read afterwards.
pub struct World {
    pub walls: Vec<Segment>,
    pub grid_height: usize,
    pub grid_width: usize,
    pub cell_size: f32,
}

impl World {
    pub fn generate<R: Rng + ?Sized>(
        grid_height: usize,
        grid_width: usize,
        cell_size: f32,
        budget: u32,
        rng: &mut R,
    ) -> (Self, CarveStats) {
        let (grid, stats) = carve(grid_height, grid_width, budget, rng);
        log::info!(
            "carved {}x{} maze: {} open cells, {} steps, {} teleports",
            grid_height,
            grid_width,
            grid.open_cells(),
            stats.carved,
            stats.teleports
        );

        let world = Self {
            walls: grid.wall_segments(cell_size),
            grid_height,
            grid_width,
            cell_size,
        };
        (world, stats)
    }

    /// Centre of the start cell (1, 1)
    pub fn start(&self) -> Vec2 {
        Vec2::new(1.5 * self.cell_size, 1.5 * self.cell_size)
    }

    /// Corner of cell (height - 2, width - 2) nearest the origin
    pub fn goal(&self) -> Vec2 {
        Vec2::new(
            self.cell_size * (self.grid_width - 2) as f32,
            self.cell_size * (self.grid_height - 2) as f32,
        )
    }

    pub fn reached_goal(&self, pos: Vec2) -> bool {
        distance(pos, self.goal()) < self.cell_size
    }

    /// Total extent in world units
    pub fn size(&self) -> Vec2 {
        Vec2::new(
            self.grid_width as f32 * self.cell_size,
            self.grid_height as f32 * self.cell_size,
        )
    }
}
