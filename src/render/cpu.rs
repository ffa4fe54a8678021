use vello_cpu::kurbo::Shape as _;

use crate::foundation::core::{Canvas, Point, Rect, Rgba8};
use crate::foundation::error::{PoseplayError, PoseplayResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::render::frame::FrameRGBA;
use crate::render::surface::{DrawSurface, StrokeStyle};

/// Flattening tolerance for circle outlines, in pixels.
const CURVE_TOLERANCE: f64 = 0.1;

/// CPU rasterizing surface backed by `vello_cpu`.
///
/// Draw calls are recorded into a render context; `snapshot` rasterizes them into the pixmap.
pub struct CpuSurface {
    canvas: Canvas,
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("canvas", &self.canvas)
            .finish_non_exhaustive()
    }
}

impl CpuSurface {
    pub fn new(canvas: Canvas) -> PoseplayResult<Self> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| PoseplayError::validation("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| PoseplayError::validation("canvas height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(PoseplayError::validation("canvas width/height must be non-zero"));
        }
        Ok(Self {
            canvas,
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }
}

impl DrawSurface for CpuSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn clear(&mut self, color: Rgba8) {
        self.ctx = vello_cpu::RenderContext::new(self.width, self.height);
        clear_pixmap(&mut self.pixmap, color.premultiplied());
        self.fill_rect(self.canvas.rect(), color);
    }

    fn draw_image(&mut self, frame: &FrameRGBA, dest: Rect) -> PoseplayResult<()> {
        if frame.width == 0 || frame.height == 0 || dest.is_zero_area() {
            return Ok(());
        }
        let paint = frame_to_image(frame)?;
        let sx = dest.width() / f64::from(frame.width);
        let sy = dest.height() / f64::from(frame.height);

        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(
            vello_cpu::kurbo::Affine::translate((dest.x0, dest.y0))
                * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy),
        );
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(frame.width),
            f64::from(frame.height),
        ));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    fn circle(&mut self, center: Point, diameter: f64, fill: Rgba8, outline: Option<StrokeStyle>) {
        let path =
            vello_cpu::kurbo::Circle::new(point_to_cpu(center), diameter / 2.0).to_path(CURVE_TOLERANCE);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(fill));
        self.ctx.fill_path(&path);
        if let Some(stroke) = outline
            && stroke.width > 0.0
        {
            self.ctx.set_paint(color_to_cpu(stroke.color));
            self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(stroke.width));
            self.ctx.stroke_path(&path);
        }
    }

    fn line(&mut self, from: Point, to: Point, stroke: StrokeStyle) {
        if stroke.width <= 0.0 {
            return;
        }
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(point_to_cpu(from));
        path.line_to(point_to_cpu(to));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(stroke.color));
        self.ctx.set_stroke(
            vello_cpu::kurbo::Stroke::new(stroke.width).with_caps(vello_cpu::kurbo::Cap::Round),
        );
        self.ctx.stroke_path(&path);
    }

    fn snapshot(&mut self) -> PoseplayResult<FrameRGBA> {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba_premul: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba_premul);
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.0;
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn frame_to_image(frame: &FrameRGBA) -> PoseplayResult<vello_cpu::Image> {
    let w: u16 = frame
        .width
        .try_into()
        .map_err(|_| PoseplayError::validation("image width exceeds u16"))?;
    let h: u16 = frame
        .height
        .try_into()
        .map_err(|_| PoseplayError::validation("image height exceeds u16"))?;
    if frame.data.len() != frame.canvas().byte_len() {
        return Err(PoseplayError::validation("image byte length mismatch"));
    }

    let premul_owned;
    let premul: &[u8] = if frame.premultiplied {
        &frame.data
    } else {
        let mut bytes = frame.data.clone();
        premultiply_rgba8_in_place(&mut bytes);
        premul_owned = bytes;
        &premul_owned
    };

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(usize::from(w) * usize::from(h));
    for px in premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}
