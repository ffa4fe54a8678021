use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::{PoseplayError, PoseplayResult};
use crate::foundation::math::flatten_premul_over_bg;

/// A frame as RGBA8 pixels.
///
/// Decoded video frames arrive straight-alpha; canvas snapshots are premultiplied. The
/// `premultiplied` flag makes this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Validate the buffer length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>, premultiplied: bool) -> PoseplayResult<Self> {
        let expected = Canvas { width, height }.byte_len();
        if data.len() != expected {
            return Err(PoseplayError::validation(format!(
                "frame data is {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied,
        })
    }

    /// A frame filled with one straight-alpha colour.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let len = Canvas { width, height }.byte_len();
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / 4 {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
            premultiplied: false,
        }
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Opaque RGBA8 bytes suitable for encoders that do not understand alpha.
    pub fn to_opaque_rgba8(&self, bg_rgba: [u8; 4]) -> Vec<u8> {
        let mut out = vec![0u8; self.data.len()];
        if self.premultiplied {
            flatten_premul_over_bg(&mut out, &self.data, bg_rgba);
        } else {
            let mut premul = self.data.clone();
            crate::foundation::math::premultiply_rgba8_in_place(&mut premul);
            flatten_premul_over_bg(&mut out, &premul, bg_rgba);
        }
        out
    }

    /// Write the frame as a PNG, flattening alpha over `bg_rgba`.
    pub fn save_png(&self, path: &Path, bg_rgba: [u8; 4]) -> PoseplayResult<()> {
        crate::export::download::ensure_parent_dir(path)?;
        let opaque = self.to_opaque_rgba8(bg_rgba);
        image::save_buffer_with_format(
            path,
            &opaque,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}
