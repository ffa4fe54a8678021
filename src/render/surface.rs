use crate::foundation::core::{Canvas, Point, Rect, Rgba8};
use crate::foundation::error::PoseplayResult;
use crate::render::frame::FrameRGBA;

/// Outline style for strokes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba8,
    pub width: f64,
}

/// Rendering collaborator the overlay draws through.
///
/// Operations apply in call order, later ones on top. Coordinates are canvas pixels.
pub trait DrawSurface {
    /// Surface size.
    fn canvas(&self) -> Canvas;

    /// Discard everything drawn and fill the canvas with `color`.
    fn clear(&mut self, color: Rgba8);

    /// Draw `frame` scaled into `dest`.
    fn draw_image(&mut self, frame: &FrameRGBA, dest: Rect) -> PoseplayResult<()>;

    fn fill_rect(&mut self, rect: Rect, color: Rgba8);

    /// Circle of `diameter` centred on `center`, optionally outlined.
    fn circle(&mut self, center: Point, diameter: f64, fill: Rgba8, outline: Option<StrokeStyle>);

    fn line(&mut self, from: Point, to: Point, stroke: StrokeStyle);

    /// Premultiplied pixels of everything drawn so far.
    fn snapshot(&mut self) -> PoseplayResult<FrameRGBA>;
}

/// A recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear(Rgba8),
    Image {
        dest: Rect,
        width: u32,
        height: u32,
    },
    FillRect {
        rect: Rect,
        color: Rgba8,
    },
    Circle {
        center: Point,
        diameter: f64,
        fill: Rgba8,
        outline: Option<StrokeStyle>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: StrokeStyle,
    },
}

/// Surface that records draw calls instead of rasterizing them.
///
/// Snapshots are filled with the most recent clear colour.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    canvas: Canvas,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            ops: Vec::new(),
        }
    }

    /// Calls recorded since the last clear (the clear included).
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Recorded circles, in draw order.
    pub fn circles(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { .. }))
    }

    /// Recorded lines, in draw order.
    pub fn lines(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Line { .. }))
    }
}

impl DrawSurface for RecordingSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn clear(&mut self, color: Rgba8) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear(color));
    }

    fn draw_image(&mut self, frame: &FrameRGBA, dest: Rect) -> PoseplayResult<()> {
        self.ops.push(DrawOp::Image {
            dest,
            width: frame.width,
            height: frame.height,
        });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn circle(&mut self, center: Point, diameter: f64, fill: Rgba8, outline: Option<StrokeStyle>) {
        self.ops.push(DrawOp::Circle {
            center,
            diameter,
            fill,
            outline,
        });
    }

    fn line(&mut self, from: Point, to: Point, stroke: StrokeStyle) {
        self.ops.push(DrawOp::Line { from, to, stroke });
    }

    fn snapshot(&mut self) -> PoseplayResult<FrameRGBA> {
        let bg = self
            .ops
            .iter()
            .rev()
            .find_map(|op| match op {
                DrawOp::Clear(c) => Some(*c),
                _ => None,
            })
            .unwrap_or(Rgba8([0, 0, 0, 0]));
        let mut frame = FrameRGBA::solid(self.canvas.width, self.canvas.height, bg.premultiplied());
        frame.premultiplied = true;
        Ok(frame)
    }
}
