use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::config::Shading;
use crate::eye::Ray;
use crate::geometry::{Segment, Vec2, distance};

/// Nearest wall hit along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Focus {
    pub point: Vec2,
    /// Brightness factor, `floor` at grazing incidence or far away. Not
    /// clamped: close, square-on hits can exceed 1.
    pub weight: f32,
}

/// Grazing-incidence and inverse-square falloff for a hit on `wall`.
pub fn shade(wall: &Segment, hit: Vec2, light: Vec2, shading: Shading) -> f32 {
    let to_light = light - hit;
    let (Some(along), Some(towards)) = (wall.direction().normalized(), to_light.normalized())
    else {
        return shading.floor;
    };
    shading.floor + shading.scale * along.cross(towards).abs() / to_light.dot(to_light)
}

fn nearest<'w>(
    ray: &Ray,
    walls: impl Iterator<Item = &'w Segment>,
    light: Vec2,
    shading: Shading,
) -> Option<Focus> {
    let mut best: Option<(f32, Vec2, &Segment)> = None;
    for wall in walls {
        let Some(hit) = ray.line.intersect(wall) else {
            continue;
        };
        let d = distance(hit, light);
        // strict: the first of equally near hits wins
        if best.is_none_or(|(bd, _, _)| d < bd) {
            best = Some((d, hit, wall));
        }
    }
    best.map(|(_, point, wall)| Focus {
        point,
        weight: shade(wall, point, light, shading),
    })
}

/// One entry per ray, in ray order. `light` is the player's position, which
/// is both the light source and the reference for "nearest".
pub fn resolve(rays: &[Ray], walls: &[Segment], light: Vec2, shading: Shading) -> Vec<Option<Focus>> {
    rays.par_iter()
        .map(|ray| nearest(ray, walls.iter(), light, shading))
        .collect()
}

/// Same result as [`resolve`], testing each ray only against walls whose
/// bucket overlaps the ray's bounding box. `index` must have been built from
/// `walls`.
pub fn resolve_indexed(
    rays: &[Ray],
    walls: &[Segment],
    index: &WallIndex,
    light: Vec2,
    shading: Shading,
) -> Vec<Option<Focus>> {
    rays.par_iter()
        .map(|ray| {
            let candidates = index.candidates(&ray.line);
            nearest(ray, candidates.iter().map(|&i| &walls[i]), light, shading)
        })
        .collect()
}

/// Uniform grid of buckets holding the indices of the walls whose bounding
/// box touches each bucket.
pub struct WallIndex {
    origin: Vec2,
    bucket: f32,
    cols: usize,
    rows: usize,
    buckets: Vec<Vec<usize>>,
}

impl WallIndex {
    pub fn new(walls: &[Segment], bucket: f32) -> Self {
        let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for wall in walls {
            let (lo, hi) = wall.bounds();
            min = Vec2::new(min.x.min(lo.x), min.y.min(lo.y));
            max = Vec2::new(max.x.max(hi.x), max.y.max(hi.y));
        }
        if walls.is_empty() {
            min = Vec2::default();
            max = Vec2::default();
        }

        let cols = ((max.x - min.x) / bucket).floor() as usize + 1;
        let rows = ((max.y - min.y) / bucket).floor() as usize + 1;
        let mut index = Self {
            origin: min,
            bucket,
            cols,
            rows,
            buckets: vec![Vec::new(); cols * rows],
        };

        for (i, wall) in walls.iter().enumerate() {
            let (c0, r0, c1, r1) = index.span(wall);
            for r in r0..=r1 {
                for c in c0..=c1 {
                    index.buckets[r * cols + c].push(i);
                }
            }
        }
        index
    }

    /// Bucket range (col0, row0, col1, row1) covered by a segment's bounds,
    /// clamped to the grid.
    fn span(&self, seg: &Segment) -> (usize, usize, usize, usize) {
        let cell = |v: f32, o: f32, n: usize| {
            (((v - o) / self.bucket).floor() as isize).clamp(0, n as isize - 1) as usize
        };
        let (lo, hi) = seg.bounds();
        (
            cell(lo.x, self.origin.x, self.cols),
            cell(lo.y, self.origin.y, self.rows),
            cell(hi.x, self.origin.x, self.cols),
            cell(hi.y, self.origin.y, self.rows),
        )
    }

    /// Wall indices that may intersect `seg`, ascending and without repeats.
    pub fn candidates(&self, seg: &Segment) -> Vec<usize> {
        let (c0, r0, c1, r1) = self.span(seg);
        let mut out = Vec::new();
        for r in r0..=r1 {
            for c in c0..=c1 {
                out.extend_from_slice(&self.buckets[r * self.cols + c]);
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::config::EyeConfig;
    use crate::eye::Eye;
    use crate::player::Pose;
    use crate::world::World;

    fn ray(from: Vec2, to: Vec2) -> Ray {
        Ray {
            line: Segment::new(from, to),
            offset: 0.0,
        }
    }

    fn vwall(x: f32) -> Segment {
        Segment::new(Vec2::new(x, -50.0), Vec2::new(x, 50.0))
    }

    #[test]
    fn ray_through_triangle_hits_an_edge() {
        let a = Vec2::new(10.0, 10.0);
        let b = Vec2::new(100.0, 100.0);
        let c = Vec2::new(50.0, 500.0);
        let walls = [Segment::new(a, b), Segment::new(b, c), Segment::new(c, a)];
        let origin = Vec2::new(0.0, 0.0);

        let focus = resolve(
            &[ray(origin, Vec2::new(200.0, 200.0))],
            &walls,
            origin,
            Shading::default(),
        );
        let hit = focus[0].expect("ray should hit the triangle");
        assert!(walls.iter().any(|w| w.distance_to(hit.point) < 1e-3));
        assert!(hit.weight > 0.0);
    }

    #[test]
    fn nothing_within_length_is_none() {
        let origin = Vec2::new(0.0, 0.0);
        let short = ray(origin, Vec2::new(30.0, 0.0));
        let focus = resolve(&[short], &[vwall(31.0)], origin, Shading::default());
        assert_eq!(focus, vec![None]);
    }

    #[test]
    fn nearest_wall_wins() {
        let origin = Vec2::new(0.0, 0.0);
        let walls = [vwall(60.0), vwall(20.0), vwall(40.0)];
        let focus = resolve(
            &[ray(origin, Vec2::new(100.0, 0.0))],
            &walls,
            origin,
            Shading::default(),
        );
        let hit = focus[0].unwrap();
        assert!((hit.point.x - 20.0).abs() < 1e-4);
    }

    #[test]
    fn weight_falls_with_distance() {
        let origin = Vec2::new(0.0, 0.0);
        let r = ray(origin, Vec2::new(200.0, 0.0));
        let weights: Vec<f32> = [15.0, 20.0, 40.0, 80.0, 160.0]
            .iter()
            .map(|&x| resolve(&[r], &[vwall(x)], origin, Shading::default())[0].unwrap().weight)
            .collect();
        for pair in weights.windows(2) {
            assert!(pair[0] > pair[1], "{weights:?}");
        }
        assert!((weights[1] - (0.05 + 1000.0 / 400.0)).abs() < 1e-4);
    }

    #[test]
    fn grazing_hit_gets_only_the_floor() {
        let shading = Shading::default();
        // wall runs straight at the light: zero cross product
        let wall = Segment::new(Vec2::new(10.0, 0.0), Vec2::new(30.0, 0.0));
        assert_eq!(shade(&wall, Vec2::new(10.0, 0.0), Vec2::new(0.0, 0.0), shading), shading.floor);
        // light sitting on the hit point
        let p = Vec2::new(5.0, 5.0);
        assert_eq!(shade(&vwall(5.0), p, p, shading), shading.floor);
    }

    #[test]
    fn indexed_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        let (world, _) = World::generate(39, 13, 15.0, 10_000, &mut rng);
        let index = WallIndex::new(&world.walls, world.cell_size);
        let eye = Eye::new(EyeConfig::default());

        for _ in 0..20 {
            let pose = Pose {
                pos: Vec2::new(rng.gen_range(0.0..195.0), rng.gen_range(0.0..585.0)),
                heading: rng.gen_range(-3.0..3.0),
            };
            let rays = eye.cast(pose);
            let brute = resolve(&rays, &world.walls, pose.pos, Shading::default());
            let fast = resolve_indexed(&rays, &world.walls, &index, pose.pos, Shading::default());
            assert_eq!(brute, fast);
        }
    }

    #[test]
    fn empty_index_has_no_candidates() {
        let index = WallIndex::new(&[], 10.0);
        let seg = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0));
        assert!(index.candidates(&seg).is_empty());
    }
}
