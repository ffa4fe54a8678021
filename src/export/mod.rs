//! Export/recorder pipeline and download delivery.

pub mod download;
pub mod pipeline;
