use crate::config::EyeConfig;
use crate::geometry::{Segment, Vec2};
use crate::player::Pose;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub line: Segment, // origin to the far end at `length`
    pub offset: f32,   // |angle - heading|, for fisheye correction
}

/// Casts the view fan from a pose. Holds only configuration, so the fan is a
/// pure function of the pose it is given.
pub struct Eye {
    pub config: EyeConfig,
}

impl Eye {
    pub fn new(config: EyeConfig) -> Self {
        Self { config }
    }

    /// `rays` angles evenly spaced over `[heading - range/2, heading + range/2)`.
    pub fn cast(&self, pose: Pose) -> Vec<Ray> {
        let EyeConfig {
            range,
            rays,
            length,
        } = self.config;
        let step = range / rays as f32;
        let first = pose.heading - 0.5 * range;

        (0..rays)
            .map(|i| {
                let phi = first + i as f32 * step;
                Ray {
                    line: Segment::new(pose.pos, pose.pos + Vec2::from_angle(phi) * length),
                    offset: (phi - pose.heading).abs(),
                }
            })
            .collect()
    }
}
