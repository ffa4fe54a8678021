use crate::foundation::error::{PoseplayError, PoseplayResult};

pub use kurbo::{Point, Rect};

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> PoseplayResult<Self> {
        if den == 0 {
            return Err(PoseplayError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(PoseplayError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole-number rate, e.g. `Fps::whole(24)`.
    pub fn whole(num: u32) -> PoseplayResult<Self> {
        Self::new(num, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Nearest frame slot for a time position.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

/// Canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Whole-canvas rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    pub(crate) fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Straight-alpha RGBA8 colour as it appears in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    /// Opaque grey with all channels set to `v`.
    pub const fn grey(v: u8) -> Self {
        Self([v, v, v, 255])
    }

    /// Opaque white.
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    /// Channels premultiplied by alpha, the layout the canvas stores.
    pub fn premultiplied(self) -> [u8; 4] {
        let [r, g, b, a] = self.0;
        let a16 = u16::from(a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a16) + 127) / 255) as u8 };
        [premul(r), premul(g), premul(b), a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
