use std::collections::HashSet;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use maze_eye::config::{START_HEADING, Settings, TICK_RATE, WINDOW_HEIGHT, WINDOW_WIDTH};
use maze_eye::eye::Eye;
use maze_eye::focus::{WallIndex, resolve_indexed};
use maze_eye::player::{Controls, Player};
use maze_eye::renderer::{self, Scene};
use maze_eye::world::World;

const TITLE: &str = "Maze Eye";

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    settings: Settings,
    world: World,
    index: WallIndex,
    player: Player,
    eye: Eye,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,
    walking: bool,
    at_goal: bool,

    // Input and fixed-step simulation
    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
    lag: Duration,
}

impl App {
    fn new(settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("maze seed {seed}");
        let mut rng = StdRng::seed_from_u64(seed);

        let (world, _) = World::generate(
            settings.grid_height,
            settings.grid_width,
            settings.cell_size,
            settings.carve_budget,
            &mut rng,
        );
        log::info!("{} wall segments", world.walls.len());
        let index = WallIndex::new(&world.walls, world.cell_size);

        let mut player = Player::new(world.start(), START_HEADING);
        player.speed = settings.move_speed;
        player.turn_speed = settings.turn_speed;
        let eye = Eye::new(settings.eye);

        Self {
            window: None,
            surface: None,
            settings,
            world,
            index,
            player,
            eye,

            frame_counter: 0,
            last_fps_print: Instant::now(),
            walking: false,
            at_goal: false,

            keys_down: HashSet::new(),
            last_tick: Instant::now(),
            lag: Duration::ZERO,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH as f64, WINDOW_HEIGHT as f64));

        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| anyhow::anyhow!("create window: {e}"))?,
        );
        let context = softbuffer::Context::new(window.clone())
            .map_err(|e| anyhow::anyhow!("softbuffer context: {e}"))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| anyhow::anyhow!("softbuffer surface: {e}"))?;

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
        self.last_tick = Instant::now();
        Ok(())
    }

    fn held(&self, keys: [KeyCode; 2]) -> bool {
        keys.iter().any(|k| self.keys_down.contains(k))
    }

    fn controls(&self) -> Controls {
        Controls {
            forward: self.held([KeyCode::ArrowUp, KeyCode::KeyW]),
            backward: self.held([KeyCode::ArrowDown, KeyCode::KeyS]),
            turn_right: self.held([KeyCode::ArrowRight, KeyCode::KeyD]),
            turn_left: self.held([KeyCode::ArrowLeft, KeyCode::KeyA]),
        }
    }

    /// Runs as many fixed ticks as real time has accumulated.
    fn tick(&mut self) {
        // Cap dt to avoid huge jumps if the app was paused
        let now = Instant::now();
        let dt = now
            .duration_since(self.last_tick)
            .min(Duration::from_millis(100));
        self.last_tick = now;
        self.lag += dt;

        let step = Duration::from_secs_f32(1.0 / TICK_RATE);
        while self.lag >= step {
            self.lag -= step;
            self.step();
        }
    }

    fn step(&mut self) {
        let motion = self.player.update(self.controls(), &self.world.walls);

        // footsteps hook
        if motion.is_walking() != self.walking {
            self.walking = motion.is_walking();
            log::debug!("{}", if self.walking { "walking" } else { "idle" });
        }

        let at_goal = self.world.reached_goal(self.player.pos);
        if at_goal != self.at_goal {
            self.at_goal = at_goal;
            if at_goal {
                log::info!("goal reached");
            }
            if let Some(window) = &self.window {
                window.set_title(if at_goal { "Goal!" } else { TITLE });
            }
        }
    }

    fn redraw(&mut self, id: WindowId) {
        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return,
        };

        let size = window.inner_size();
        let (dw, dh) = (size.width as usize, size.height as usize);
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return; // Minimized window, skip drawing
        };

        // Set softbuffer to window size
        if let Err(e) = surface.resize(w, h) {
            log::warn!("surface resize to {dw}x{dh} failed: {e}");
            return;
        }

        let pose = self.player.pose();
        let rays = self.eye.cast(pose);
        let focus = resolve_indexed(
            &rays,
            &self.world.walls,
            &self.index,
            pose.pos,
            self.settings.shading,
        );
        let scene = Scene {
            world: &self.world,
            pose,
            rays: &rays,
            focus: &focus,
            wall_height: self.settings.wall_height,
            goal: self.at_goal,
        };

        let mut buf = match surface.buffer_mut() {
            Ok(buf) => buf,
            Err(e) => {
                log::warn!("no frame buffer: {e}");
                return;
            }
        };
        renderer::render_frame(&mut buf, dw, dh, &scene);
        if let Err(e) = buf.present() {
            log::warn!("present failed: {e}");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            log::error!("{e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        ..
                    },
                ..
            } => {
                if let PhysicalKey::Code(code) = physical_key {
                    use winit::event::ElementState;
                    match state {
                        ElementState::Pressed if code == KeyCode::Escape => event_loop.exit(),
                        ElementState::Pressed => {
                            self.keys_down.insert(code);
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&code);
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick();
                self.redraw(id);

                self.frame_counter += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
                if elapsed >= 1.0 {
                    log::debug!("FPS: {:.1}", self.frame_counter as f32 / elapsed);
                    self.frame_counter = 0;
                    self.last_fps_print = now;
                }
            }

            WindowEvent::Focused(false) => {
                // key releases are not delivered while unfocused
                self.keys_down.clear();
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env().context("invalid settings")?;
    let event_loop = EventLoop::new().map_err(|e| anyhow::anyhow!("create event loop: {e}"))?;

    // Redraws are requested from about_to_wait, so Wait still runs every frame
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(settings);
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow::anyhow!("event loop: {e}"))?;
    Ok(())
}
