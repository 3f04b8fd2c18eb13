//! Asynchronous layer compositing for video export pipelines.
//!
//! `framelay` produces one output frame per render request: the decoded source
//! frame is reoriented by its instruction's affine transform and composited with a
//! cached raster snapshot of a static overlay. Requests execute strictly in order
//! on a single background render queue and each resolves exactly once.
//!
//! - Describe a segment with a [`LayerInstruction`]
//! - Hand decoded frames plus a completion handler to a [`RenderRequest`]
//! - Drive the queue through a [`FrameCompositor`]
#![forbid(unsafe_code)]

mod foundation;

pub mod composition;
pub mod overlay;
pub mod render;
pub mod session;

pub use crate::foundation::core::{
    Affine, BezPath, Extent, MediaTime, Point, Rect, TimeRange, TrackId, Vec2,
};
pub use crate::foundation::error::{FramelayError, FramelayResult};

pub use crate::composition::instruction::{CompositionInstruction, LayerInstruction};
pub use crate::overlay::layer::{OverlayFill, OverlayLayer, OverlayShape, ShapeOverlay};
pub use crate::overlay::snapshot::{OverlaySnapshot, SnapshotCache};
pub use crate::render::buffer::{PixelBuffer, PixelBufferAttributes, PixelFormat};
pub use crate::render::context::{HeapBufferContext, RenderContext};
pub use crate::session::compositor::{CompositorStats, FrameCompositor};
pub use crate::session::request::{RenderOutcome, RenderRequest};
