use std::any::Any;
use std::sync::Arc;

use crate::foundation::core::{Affine, Extent, TimeRange, TrackId};
use crate::foundation::error::{FramelayError, FramelayResult};
use crate::overlay::layer::OverlayLayer;

/// Instruction contract accepted by the render queue.
///
/// The pipeline only renders the crate's own [`LayerInstruction`]; a request
/// carrying any other implementation fails with an invalid-request error.
pub trait CompositionInstruction: Send + Sync {
    /// Presentation interval this instruction governs.
    fn time_range(&self) -> TimeRange;

    /// Post-processing is always enabled for layer composition.
    fn enable_post_processing(&self) -> bool {
        true
    }

    /// Frames are never tweened between instructions.
    fn contains_tweening(&self) -> bool {
        false
    }

    /// No track is passed through unmodified.
    fn passthrough_track(&self) -> Option<TrackId> {
        None
    }

    /// Downcast support for the pipeline.
    fn as_any(&self) -> &dyn Any;
}

/// Immutable per-time-range render recipe: one source track, the orientation
/// transform to apply to its frames, the output size, and an optional overlay.
pub struct LayerInstruction {
    time_range: TimeRange,
    source_track: TrackId,
    target_size: Extent,
    transform: Affine,
    overlay: Option<Arc<dyn OverlayLayer>>,
}

impl LayerInstruction {
    /// Create an instruction, validating that an attached overlay's extent equals
    /// `target_size` exactly. A mismatch is a caller contract violation.
    pub fn new(
        time_range: TimeRange,
        source_track: TrackId,
        target_size: Extent,
        transform: Affine,
        overlay: Option<Arc<dyn OverlayLayer>>,
    ) -> FramelayResult<Self> {
        if let Some(layer) = &overlay
            && layer.extent() != target_size
        {
            return Err(FramelayError::validation(
                "overlay extent must equal the instruction target size",
            ));
        }
        Ok(Self {
            time_range,
            source_track,
            target_size,
            transform,
            overlay,
        })
    }

    /// Track whose decoded frames this instruction consumes.
    pub fn source_track(&self) -> TrackId {
        self.source_track
    }

    /// Output frame dimensions.
    pub fn target_size(&self) -> Extent {
        self.target_size
    }

    /// Affine transform applied to the decoded source frame.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Overlay to composite atop the transformed frame, if any.
    pub fn overlay(&self) -> Option<&Arc<dyn OverlayLayer>> {
        self.overlay.as_ref()
    }
}

impl CompositionInstruction for LayerInstruction {
    fn time_range(&self) -> TimeRange {
        self.time_range
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
