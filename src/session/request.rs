use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc;

use crate::composition::instruction::CompositionInstruction;
use crate::foundation::core::TrackId;
use crate::foundation::error::FramelayError;
use crate::render::buffer::PixelBuffer;

/// Terminal result of one render request.
#[derive(Debug)]
pub enum RenderOutcome {
    /// The finished composed frame.
    Composed(PixelBuffer),
    /// The request was cancelled before it started executing.
    Cancelled,
    /// The request failed; the queue and all other requests are unaffected.
    Failed(FramelayError),
}

type CompletionFn = Box<dyn FnOnce(RenderOutcome) + Send>;

/// One unit of work: a single output frame to produce.
///
/// Exactly one terminal outcome is delivered per request — a composed buffer, a
/// cancellation acknowledgment, or an error. Dropping an unfinished request still
/// delivers a terminal outcome, so the driver always hears back.
pub struct RenderRequest {
    instruction: Arc<dyn CompositionInstruction>,
    source_frames: HashMap<TrackId, PixelBuffer>,
    completion: Option<CompletionFn>,
}

impl RenderRequest {
    /// Create a request completing through `on_complete`.
    pub fn new(
        instruction: Arc<dyn CompositionInstruction>,
        on_complete: impl FnOnce(RenderOutcome) + Send + 'static,
    ) -> Self {
        Self {
            instruction,
            source_frames: HashMap::new(),
            completion: Some(Box::new(on_complete)),
        }
    }

    /// Create a request whose single outcome resolves through a channel.
    pub fn channel(
        instruction: Arc<dyn CompositionInstruction>,
    ) -> (Self, mpsc::Receiver<RenderOutcome>) {
        let (tx, rx) = mpsc::channel();
        let request = Self::new(instruction, move |outcome| {
            let _ = tx.send(outcome);
        });
        (request, rx)
    }

    /// Attach the decoded source frame for `track`.
    pub fn attach_source_frame(&mut self, track: TrackId, buffer: PixelBuffer) {
        self.source_frames.insert(track, buffer);
    }

    /// The instruction governing this request.
    pub fn instruction(&self) -> Arc<dyn CompositionInstruction> {
        self.instruction.clone()
    }

    pub(crate) fn take_source_frame(&mut self, track: TrackId) -> Option<PixelBuffer> {
        self.source_frames.remove(&track)
    }

    pub(crate) fn finish_composed(mut self, buffer: PixelBuffer) {
        self.deliver(RenderOutcome::Composed(buffer));
    }

    pub(crate) fn finish_cancelled(mut self) {
        self.deliver(RenderOutcome::Cancelled);
    }

    pub(crate) fn finish_failed(mut self, error: FramelayError) {
        self.deliver(RenderOutcome::Failed(error));
    }

    fn deliver(&mut self, outcome: RenderOutcome) {
        if let Some(complete) = self.completion.take() {
            complete(outcome);
        }
    }
}

impl Drop for RenderRequest {
    fn drop(&mut self) {
        self.deliver(RenderOutcome::Failed(FramelayError::queue(
            "request dropped before completion",
        )));
    }
}
