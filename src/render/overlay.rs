use crate::config::{OverlayStyle, PlayerConfig};
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::PoseplayResult;
use crate::playback::clip::ClipState;
use crate::pose::model::PoseResultSet;
use crate::render::frame::FrameRGBA;
use crate::render::surface::{DrawSurface, StrokeStyle};

/// Which overlay layers are drawn. Both default to on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OverlayToggles {
    pub show_video: bool,
    pub show_pose: bool,
}

impl Default for OverlayToggles {
    fn default() -> Self {
        Self {
            show_video: true,
            show_pose: true,
        }
    }
}

impl OverlayToggles {
    /// Flip the video layer; returns the new value.
    pub fn toggle_video(&mut self) -> bool {
        self.show_video = !self.show_video;
        self.show_video
    }

    /// Flip the pose layer; returns the new value.
    pub fn toggle_pose(&mut self) -> bool {
        self.show_pose = !self.show_pose;
        self.show_pose
    }
}

/// Composes background, video frame, scrub track and pose overlay onto a surface.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayRenderer {
    background: Rgba8,
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(background: Rgba8, style: OverlayStyle) -> Self {
        Self { background, style }
    }

    pub fn from_config(cfg: &PlayerConfig) -> Self {
        Self::new(cfg.background, cfg.overlay.clone())
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Draw one tick's canvas.
    ///
    /// `clip` is `None` before the media is ready; the scrub marker is then omitted.
    pub fn render(
        &self,
        surface: &mut dyn DrawSurface,
        clip: Option<&ClipState>,
        frame: Option<&FrameRGBA>,
        poses: &PoseResultSet,
        toggles: OverlayToggles,
    ) -> PoseplayResult<()> {
        let canvas = surface.canvas();
        surface.clear(self.background);

        if toggles.show_video
            && let Some(frame) = frame
        {
            surface.draw_image(frame, canvas.rect())?;
        }

        self.draw_scrub_track(surface, clip);

        if toggles.show_pose && !poses.is_empty() {
            self.draw_skeletons(surface, poses);
            self.draw_keypoints(surface, poses);
        }
        Ok(())
    }

    fn draw_scrub_track(&self, surface: &mut dyn DrawSurface, clip: Option<&ClipState>) {
        let canvas = surface.canvas();
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let track_h = self.style.scrub_track_height.min(h);
        if track_h <= 0.0 {
            return;
        }
        surface.fill_rect(Rect::new(0.0, h - track_h, w, h), self.style.scrub_track_color);

        let Some(clip) = clip else {
            return;
        };
        let x = clip.completion_fraction().clamp(0.0, 1.0) * w;
        let half = self.style.scrub_marker_width / 2.0;
        surface.fill_rect(
            Rect::new((x - half).max(0.0), h - track_h, (x + half).min(w), h),
            self.style.scrub_marker_color,
        );
    }

    // Edges use raw coordinates with no confidence filtering.
    fn draw_skeletons(&self, surface: &mut dyn DrawSurface, poses: &PoseResultSet) {
        let stroke = StrokeStyle {
            color: self.style.skeleton_color,
            width: self.style.skeleton_width,
        };
        for pose in poses {
            for (a, b) in &pose.skeleton {
                surface.line(a.position(), b.position(), stroke);
            }
        }
    }

    fn draw_keypoints(&self, surface: &mut dyn DrawSurface, poses: &PoseResultSet) {
        let outline = StrokeStyle {
            color: self.style.keypoint_outline,
            width: self.style.keypoint_outline_width,
        };
        let outline = (outline.width > 0.0).then_some(outline);
        for pose in poses {
            for kp in &pose.keypoints {
                if kp.score > self.style.keypoint_threshold {
                    surface.circle(
                        Point::new(kp.x.round(), kp.y.round()),
                        self.style.keypoint_diameter,
                        self.style.keypoint_fill,
                        outline,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
