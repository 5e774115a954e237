use std::ops::{Add, Mul, Sub};

const EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn from_angle(theta: f32) -> Self {
        Self::new(theta.cos(), theta.sin())
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Unit vector, or `None` for a (near) zero vector.
    #[inline]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len <= EPS {
            return None;
        }
        Some(Self::new(self.x / len, self.y / len))
    }

    /// 2D cross product (z component of the 3D one)
    #[inline]
    pub fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[inline]
pub fn distance(p: Vec2, q: Vec2) -> f32 {
    (q - p).length()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec2, // (x, y) start point in world space
    pub end: Vec2,   // (x, y) end point in world space
}

impl Segment {
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (
            Vec2::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y)),
            Vec2::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y)),
        )
    }

    /// Intersection point of two segments, restricted to both spans.
    ///
    /// Endpoints count as hits. Parallel and collinear pairs never intersect,
    /// and neither do degenerate (zero length) segments.
    pub fn intersect(&self, other: &Segment) -> Option<Vec2> {
        let r = self.direction();
        let s = other.direction();
        let denom = r.cross(s);
        if denom.abs() <= EPS {
            return None;
        }

        let qp = other.start - self.start;
        let t = qp.cross(s) / denom;
        let u = qp.cross(r) / denom;
        if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
            return None;
        }

        Some(self.start + r * t)
    }

    /// Shortest distance from `p` to any point of the segment.
    pub fn distance_to(&self, p: Vec2) -> f32 {
        let d = self.direction();
        let len2 = d.dot(d);
        if len2 <= EPS {
            return distance(self.start, p);
        }
        let t = ((p - self.start).dot(d) / len2).clamp(0.0, 1.0);
        distance(self.start + d * t, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(ax: f32, ay: f32, bx: f32, by: f32) -> Segment {
        Segment::new(Vec2::new(ax, ay), Vec2::new(bx, by))
    }

    #[test]
    fn crossing_segments_meet_inside_both() {
        let a = seg(0.0, 0.0, 10.0, 10.0);
        let b = seg(0.0, 10.0, 10.0, 0.0);
        let p = a.intersect(&b).unwrap();
        assert!((p.x - 5.0).abs() < 1e-5);
        assert!((p.y - 5.0).abs() < 1e-5);
        assert!(a.distance_to(p) < 1e-4);
        assert!(b.distance_to(p) < 1e-4);
    }

    #[test]
    fn lines_crossing_outside_a_span_do_not_intersect() {
        // the infinite lines meet at (5, 5), beyond the end of `b`
        let a = seg(0.0, 0.0, 10.0, 10.0);
        let b = seg(0.0, 10.0, 4.0, 6.0);
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn parallel_and_collinear_are_none() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        assert_eq!(a.intersect(&seg(0.0, 1.0, 10.0, 1.0)), None);
        assert_eq!(a.intersect(&seg(5.0, 0.0, 15.0, 0.0)), None);
    }

    #[test]
    fn degenerate_segment_is_none() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        let dot = seg(5.0, 0.0, 5.0, 0.0);
        assert_eq!(a.intersect(&dot), None);
        assert_eq!(Vec2::default().normalized(), None);
    }

    #[test]
    fn touching_endpoint_counts() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        let b = seg(10.0, -5.0, 10.0, 5.0);
        let p = a.intersect(&b).unwrap();
        assert!((p.x - 10.0).abs() < 1e-5);
        assert!(p.y.abs() < 1e-5);
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)), 5.0);
        let wall = seg(25.0, 0.0, 25.0, 40.0);
        assert_eq!(wall.distance_to(Vec2::new(20.0, 20.0)), 5.0);
        assert_eq!(wall.distance_to(Vec2::new(25.0, 43.0)), 3.0);
    }
}
