use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::eye::Ray;
use crate::focus::Focus;
use crate::geometry::{Vec2, distance};
use crate::player::Pose;
use crate::world::World;

const PLAYER_DOT: f32 = 5.0;
const FOCUS_DOT: f32 = 2.0;

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

/// `h` in degrees, `s` and `v` in [0, 1]
pub fn hsv(h: f32, s: f32, v: f32) -> u32 {
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);
    let h = h.rem_euclid(360.0) / 60.0;
    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    let to8 = |f: f32| ((f + m) * 255.0).round() as u8;
    pack_rgb(to8(r), to8(g), to8(b))
}

fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f32) -> u32 {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    pack_rgb(mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]))
}

/// Which part of the maze a column shows, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallKind {
    Start,
    Goal,
    GridLine,
    Plain,
}

impl WallKind {
    /// Hit coordinates are truncated to whole units before testing.
    pub fn classify(hit: Vec2, cell_size: f32, grid_height: usize, grid_width: usize) -> Self {
        let y = hit.y as i32;
        let x = hit.x as i32;
        let (yf, xf) = (y as f32, x as f32);
        let cell = cell_size as i32;

        if yf <= cell_size * 2.0 && xf <= cell_size * 2.0 {
            WallKind::Start
        } else if yf >= cell_size * (grid_height as f32 - 2.0)
            && xf >= cell_size * (grid_width as f32 - 2.0)
        {
            WallKind::Goal
        } else if cell > 0 && y % cell == 0 && x % cell == 0 {
            WallKind::GridLine
        } else {
            WallKind::Plain
        }
    }

    pub fn color(self, weight: f32) -> u32 {
        match self {
            WallKind::Start => hsv(241.0, 1.0, weight),
            WallKind::Goal => hsv(0.0, 1.0, weight),
            WallKind::GridLine => hsv(32.0, 0.82, weight),
            WallKind::Plain => hsv(0.0, 0.0, weight),
        }
    }
}

/// Vertical extent (top, bottom) of a wall column around the horizon.
/// The raw distance is scaled by `cos(offset)` to undo the fan's fisheye.
pub fn column_extent(dist: f32, offset: f32, wall_height: f32, screen_h: f32) -> (f32, f32) {
    let mid = 0.5 * screen_h;
    let corrected = dist * offset.cos();
    if corrected <= f32::EPSILON {
        return (0.0, screen_h);
    }
    let half = wall_height / corrected;
    (mid - half, mid + half)
}

/// Everything one frame draws.
pub struct Scene<'a> {
    pub world: &'a World,
    pub pose: Pose,
    pub rays: &'a [Ray],
    pub focus: &'a [Option<Focus>],
    pub wall_height: f32,
    pub goal: bool,
}

/// Pixel buffer view with a clip rectangle `[x0, x1) x [0, height)`.
struct Canvas<'b> {
    buf: &'b mut [u32],
    width: usize,
    height: usize,
    x0: usize,
    x1: usize,
}

impl Canvas<'_> {
    #[inline]
    fn put(&mut self, x: i32, y: i32, color: u32) {
        if x < self.x0 as i32 || x >= self.x1 as i32 || y < 0 || y >= self.height as i32 {
            return;
        }
        self.buf[y as usize * self.width + x as usize] = color;
    }

    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let xa = x0.max(self.x0 as i32);
        let xb = x1.min(self.x1 as i32);
        let ya = y0.max(0);
        let yb = y1.min(self.height as i32);
        for y in ya..yb {
            let row = y as usize * self.width;
            for x in xa..xb {
                self.buf[row + x as usize] = color;
            }
        }
    }

    fn line(&mut self, a: Vec2, b: Vec2, color: u32) {
        let (mut x0, mut y0) = (a.x.round() as i32, a.y.round() as i32);
        let (x1, y1) = (b.x.round() as i32, b.y.round() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn disc(&mut self, c: Vec2, r: f32, color: u32) {
        let r = r.max(1.0);
        let (cx, cy) = (c.x.round() as i32, c.y.round() as i32);
        let ri = r.ceil() as i32;
        for y in -ri..=ri {
            for x in -ri..=ri {
                if ((x * x + y * y) as f32) <= r * r {
                    self.put(cx + x, cy + y, color);
                }
            }
        }
    }
}

pub fn render_frame(buf: &mut [u32], width: usize, height: usize, scene: &Scene) {
    if width == 0 || height == 0 {
        return;
    }
    let split = width / 4;
    fill_background(buf, width, height, split);

    let mut view = Canvas {
        buf: &mut *buf,
        width,
        height,
        x0: split,
        x1: width,
    };
    draw_columns(&mut view, scene);
    if scene.goal {
        draw_goal_banner(&mut view);
    }

    let mut map = Canvas {
        buf,
        width,
        height,
        x0: 0,
        x1: split,
    };
    draw_map(&mut map, scene);
}

/// Map quarter in flat dark grey, sky and ground gradients behind the view.
fn fill_background(buf: &mut [u32], width: usize, height: usize, split: usize) {
    let map_bg = pack_rgb(20, 20, 24);
    let sky = ([173, 216, 230], [0, 0, 0]);
    let ground = ([0, 0, 0], [0, 128, 0]);
    let mid = height / 2;

    buf.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let color = if y < mid {
            lerp_rgb(sky.0, sky.1, y as f32 / mid.max(1) as f32)
        } else {
            lerp_rgb(ground.0, ground.1, (y - mid) as f32 / (height - mid).max(1) as f32)
        };
        row[..split].fill(map_bg);
        row[split..].fill(color);
    });
}

fn draw_columns(view: &mut Canvas, scene: &Scene) {
    let n = scene.rays.len();
    if n == 0 {
        return;
    }
    let span = (view.x1 - view.x0) as f32;
    let step = span / n as f32;
    let thickness = step.ceil().max(1.0) as i32;
    let world = scene.world;

    for (i, (ray, focus)) in scene.rays.iter().zip(scene.focus).enumerate() {
        let Some(focus) = focus else {
            continue;
        };
        let dist = distance(scene.pose.pos, focus.point);
        let (top, bottom) = column_extent(dist, ray.offset, scene.wall_height, view.height as f32);
        let kind = WallKind::classify(
            focus.point,
            world.cell_size,
            world.grid_height,
            world.grid_width,
        );

        let x = view.x0 as i32 + (step * i as f32) as i32;
        view.fill_rect(
            x,
            top.floor() as i32,
            x + thickness,
            bottom.ceil() as i32,
            kind.color(focus.weight),
        );
    }
}

fn draw_goal_banner(view: &mut Canvas) {
    let x = view.x0 as i32;
    let y = (view.height / 2) as i32;
    let w = ((view.x1 - view.x0) / 3) as i32;
    let h = 36;
    view.fill_rect(x, y - h, x + w, y, pack_rgb(255, 215, 0));
    view.fill_rect(x + 4, y - h + 4, x + w - 4, y - 4, pack_rgb(200, 30, 30));
}

/// Top-down view of walls, fan, hit points and player, scaled into the quarter.
fn draw_map(map: &mut Canvas, scene: &Scene) {
    let size = scene.world.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return;
    }
    let scale = ((map.x1 - map.x0) as f32 / size.x).min(map.height as f32 / size.y);
    let to_screen = |p: Vec2| p * scale;

    let ray_color = pack_rgb(90, 90, 90);
    for ray in scene.rays {
        map.line(to_screen(ray.line.start), to_screen(ray.line.end), ray_color);
    }

    let wall_color = pack_rgb(230, 230, 230);
    for wall in &scene.world.walls {
        map.line(to_screen(wall.start), to_screen(wall.end), wall_color);
    }

    let orange = pack_rgb(255, 165, 0);
    for focus in scene.focus.iter().flatten() {
        map.disc(to_screen(focus.point), FOCUS_DOT * scale, orange);
    }

    map.disc(to_screen(scene.pose.pos), PLAYER_DOT * scale, pack_rgb(0, 0, 255));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Segment;

    fn world() -> World {
        World {
            walls: vec![Segment::new(Vec2::new(0.0, 0.0), Vec2::new(50.0, 0.0))],
            grid_height: 39,
            grid_width: 13,
            cell_size: 10.0,
        }
    }

    #[test]
    fn categories_follow_priority() {
        let kind = |x, y| WallKind::classify(Vec2::new(x, y), 10.0, 39, 13);
        assert_eq!(kind(5.0, 5.0), WallKind::Start);
        assert_eq!(kind(20.0, 20.0), WallKind::Start); // also on grid lines
        assert_eq!(kind(115.0, 375.0), WallKind::Goal);
        assert_eq!(kind(110.0, 370.0), WallKind::Goal);
        assert_eq!(kind(30.4, 50.9), WallKind::GridLine);
        assert_eq!(kind(33.0, 50.0), WallKind::Plain);
        assert_eq!(kind(115.0, 40.0), WallKind::Plain);
    }

    #[test]
    fn color_tracks_weight() {
        assert_eq!(WallKind::Plain.color(1.0), pack_rgb(255, 255, 255));
        assert_eq!(WallKind::Plain.color(7.5), pack_rgb(255, 255, 255));
        assert_eq!(WallKind::Plain.color(0.0), 0);
        assert_eq!(WallKind::Goal.color(1.0), pack_rgb(255, 0, 0));
        assert_eq!(hsv(120.0, 1.0, 1.0), pack_rgb(0, 255, 0));
        assert_eq!(hsv(240.0, 1.0, 0.5), pack_rgb(0, 0, 128));
    }

    #[test]
    fn fisheye_correction_and_projection() {
        let (top, bottom) = column_extent(100.0, 0.0, 5000.0, 600.0);
        assert_eq!((top, bottom), (250.0, 350.0));

        // off-centre ray at the same raw distance is nearer after correction
        let (top, bottom) = column_extent(100.0, std::f32::consts::FRAC_PI_3, 5000.0, 600.0);
        assert!((top - 200.0).abs() < 1e-2);
        assert!((bottom - 400.0).abs() < 1e-2);

        assert_eq!(column_extent(0.0, 0.0, 5000.0, 600.0), (0.0, 600.0));
    }

    fn render(focus: &[Option<Focus>], rays: &[Ray], goal: bool) -> Vec<u32> {
        let (w, h) = (400, 300);
        let world = world();
        let scene = Scene {
            world: &world,
            pose: Pose {
                pos: Vec2::new(0.0, 0.0),
                heading: 0.0,
            },
            rays,
            focus,
            wall_height: 5000.0,
            goal,
        };
        let mut buf = vec![0u32; w * h];
        render_frame(&mut buf, w, h, &scene);
        buf
    }

    fn rays() -> Vec<Ray> {
        (0..3)
            .map(|_| Ray {
                line: Segment::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.0)),
                offset: 0.0,
            })
            .collect()
    }

    #[test]
    fn only_focused_columns_are_drawn() {
        let rays = rays();
        let empty = render(&[None, None, None], &rays, false);
        let hit = Focus {
            point: Vec2::new(33.0, 56.0),
            weight: 1.0,
        };
        let drawn = render(&[None, Some(hit), None], &rays, false);

        // column 1 spans x in [200, 300)
        let at = |buf: &[u32], x: usize, y: usize| buf[y * 400 + x];
        assert_eq!(at(&drawn, 250, 150), pack_rgb(255, 255, 255));
        assert_ne!(at(&empty, 250, 150), at(&drawn, 250, 150));
        assert_eq!(at(&drawn, 150, 150), at(&empty, 150, 150));
        assert_eq!(at(&drawn, 350, 150), at(&empty, 350, 150));
        // far away wall leaves the sky above it
        assert_eq!(at(&drawn, 250, 2), at(&empty, 250, 2));
    }

    #[test]
    fn banner_only_when_goal_reached() {
        let rays = rays();
        let none = [None, None, None];
        let plain = render(&none, &rays, false);
        let goal = render(&none, &rays, true);
        assert_ne!(plain[140 * 400 + 120], goal[140 * 400 + 120]);
        assert_eq!(plain[200 * 400 + 120], goal[200 * 400 + 120]);
    }

    #[test]
    fn map_stays_in_left_quarter() {
        let long = vec![Ray {
            line: Segment::new(Vec2::new(0.0, 0.0), Vec2::new(5000.0, 0.0)),
            offset: 0.0,
        }];
        let with_ray = render(&[None], &long, false);
        let without = render(&[None], &[], false);
        assert_eq!(with_ray[200..400], without[200..400]);
    }
}
