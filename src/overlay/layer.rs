use crate::foundation::core::{Affine, BezPath, Extent, Rect};
use crate::foundation::error::FramelayResult;
use crate::render::raster::{affine_to_cpu, bezpath_to_cpu};

/// An opaque renderable overlay description.
///
/// Implementations draw in a y-up layer coordinate space. The snapshot cache hands
/// `draw` a base transform that flips content into the video frame's top-left
/// origin; every transform set on `ctx` must be composed with it.
pub trait OverlayLayer: Send + Sync {
    /// Intrinsic pixel size of the layer.
    fn extent(&self) -> Extent;

    /// Draw the layer into `ctx`, composing local transforms with `base`.
    fn draw(&self, ctx: &mut vello_cpu::RenderContext, base: Affine) -> FramelayResult<()>;
}

/// Straight-alpha RGBA fill color for an overlay shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayFill {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// One solid-filled shape in layer coordinates.
#[derive(Clone, Debug)]
pub enum OverlayShape {
    Rect { rect: Rect, fill: OverlayFill },
    Path { path: BezPath, fill: OverlayFill },
}

/// Solid-shape overlay for drivers that do not bring their own renderer.
///
/// Shapes are drawn in declaration order, each source-over the previous ones.
pub struct ShapeOverlay {
    extent: Extent,
    shapes: Vec<OverlayShape>,
}

impl ShapeOverlay {
    /// Create an empty overlay of the given size.
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            shapes: Vec::new(),
        }
    }

    /// Append a shape on top of the existing ones.
    pub fn push_shape(&mut self, shape: OverlayShape) {
        self.shapes.push(shape);
    }
}

impl OverlayLayer for ShapeOverlay {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn draw(&self, ctx: &mut vello_cpu::RenderContext, base: Affine) -> FramelayResult<()> {
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(base));

        for shape in &self.shapes {
            match shape {
                OverlayShape::Rect { rect, fill } => {
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        fill.r, fill.g, fill.b, fill.a,
                    ));
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        rect.x0, rect.y0, rect.x1, rect.y1,
                    ));
                }
                OverlayShape::Path { path, fill } => {
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        fill.r, fill.g, fill.b, fill.a,
                    ));
                    let cpu_path = bezpath_to_cpu(path);
                    ctx.fill_path(&cpu_path);
                }
            }
        }
        Ok(())
    }
}
