//! Overlay rendering.
//!
//! The renderer draws through [`surface::DrawSurface`]; [`cpu::CpuSurface`] rasterizes with
//! `vello_cpu`, [`surface::RecordingSurface`] captures draw calls.

pub mod cpu;
pub mod frame;
pub mod overlay;
pub mod surface;
