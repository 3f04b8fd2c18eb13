use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread::JoinHandle;

use crate::foundation::error::{FramelayError, FramelayResult};
use crate::overlay::snapshot::SnapshotCache;
use crate::render::buffer::PixelBufferAttributes;
use crate::render::context::RenderContext;
use crate::render::pipeline::FramePipeline;
use crate::session::request::RenderRequest;

/// Scheduler state. `CancelGrace` is the transitional window between a cancel-all
/// call and its reset propagating through the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueueState {
    Active,
    CancelGrace,
}

impl QueueState {
    fn from_u8(v: u8) -> Self {
        if v == 1 {
            QueueState::CancelGrace
        } else {
            QueueState::Active
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            QueueState::Active => 0,
            QueueState::CancelGrace => 1,
        }
    }
}

enum QueueMsg {
    Render(RenderRequest),
    ResumeActive,
}

/// Per-outcome counters for one compositor instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositorStats {
    /// Requests that delivered a composed buffer.
    pub composed: u64,
    /// Requests acknowledged as cancelled.
    pub cancelled: u64,
    /// Requests that delivered an error.
    pub failed: u64,
}

#[derive(Default)]
struct StatsCells {
    composed: AtomicU64,
    cancelled: AtomicU64,
    failed: AtomicU64,
}

/// Asynchronous layer compositor.
///
/// One instance owns one serialized render queue: requests execute strictly one at
/// a time in submission order on a background worker, never on the caller's thread,
/// and each delivers exactly one terminal outcome. The overlay snapshot cache and
/// the raster scratch live on the worker, so they need no locking.
///
/// Cancellation is a broadcast: [`cancel_all_pending`](Self::cancel_all_pending)
/// flips the queue into `CancelGrace` immediately and enqueues the reset behind
/// everything already submitted, so a request enqueued before the cancel can never
/// slip through as active, and a request already mid-render runs to its natural
/// outcome.
///
/// Dropping the compositor disconnects the queue; requests already enqueued still
/// complete before the worker exits.
pub struct FrameCompositor {
    tx: Option<mpsc::Sender<QueueMsg>>,
    state: Arc<AtomicU8>,
    context: Arc<Mutex<Arc<dyn RenderContext>>>,
    stats: Arc<StatsCells>,
    worker: Option<JoinHandle<()>>,
}

impl FrameCompositor {
    /// Wide-color source frames are not supported.
    pub const SUPPORTS_WIDE_COLOR_SOURCE_FRAMES: bool = false;

    /// Attributes required of decoded source frames attached to requests.
    pub fn source_pixel_buffer_attributes() -> PixelBufferAttributes {
        PixelBufferAttributes::bgra_hardware()
    }

    /// Attributes required of buffers produced by the render context.
    pub fn required_pixel_buffer_attributes() -> PixelBufferAttributes {
        PixelBufferAttributes::bgra_hardware()
    }

    /// Spawn the render worker and start accepting requests against `context`.
    pub fn new(context: Arc<dyn RenderContext>) -> FramelayResult<Self> {
        let (tx, rx) = mpsc::channel();
        let state = Arc::new(AtomicU8::new(QueueState::Active.as_u8()));
        let context = Arc::new(Mutex::new(context));
        let stats = Arc::new(StatsCells::default());

        let worker = Worker {
            rx,
            state: state.clone(),
            context: context.clone(),
            stats: stats.clone(),
            pipeline: FramePipeline::new(),
            snapshots: SnapshotCache::new(),
        };
        let handle = std::thread::Builder::new()
            .name("framelay-render".to_owned())
            .spawn(move || worker.run())
            .map_err(|e| FramelayError::queue(format!("failed to spawn render worker: {e}")))?;

        Ok(Self {
            tx: Some(tx),
            state,
            context,
            stats,
            worker: Some(handle),
        })
    }

    /// Enqueue one request and return immediately.
    ///
    /// All work happens on the render queue. If the queue is already shut down the
    /// request is failed (its completion still fires exactly once) and an error is
    /// returned.
    pub fn start_request(&self, request: RenderRequest) -> FramelayResult<()> {
        let Some(tx) = self.tx.as_ref() else {
            request.finish_failed(FramelayError::queue("render queue is shut down"));
            return Err(FramelayError::queue("render queue is shut down"));
        };
        if let Err(mpsc::SendError(msg)) = tx.send(QueueMsg::Render(request)) {
            if let QueueMsg::Render(request) = msg {
                request.finish_failed(FramelayError::queue("render queue is shut down"));
            }
            return Err(FramelayError::queue("render queue is shut down"));
        }
        Ok(())
    }

    /// Cancel every request that has not started executing, then re-arm the queue.
    ///
    /// The state flips to `CancelGrace` before this call returns; the reset rides
    /// the same queue as the requests it grants grace to, so it takes effect only
    /// after the cancellation has propagated past everything already enqueued.
    #[tracing::instrument(skip(self))]
    pub fn cancel_all_pending(&self) {
        self.state
            .store(QueueState::CancelGrace.as_u8(), Ordering::SeqCst);
        if let Some(tx) = self.tx.as_ref() {
            let _ = tx.send(QueueMsg::ResumeActive);
        }
    }

    /// Replace the render context used for output buffer allocation.
    ///
    /// The context is swapped as a whole value; requests observe the latest context
    /// at execution time, not a snapshot taken when they were enqueued. Requests
    /// already mid-render keep the context they started with.
    pub fn render_context_changed(&self, context: Arc<dyn RenderContext>) {
        let mut current = self.context.lock().unwrap_or_else(|p| p.into_inner());
        *current = context;
    }

    /// Snapshot of the per-outcome counters.
    pub fn stats(&self) -> CompositorStats {
        CompositorStats {
            composed: self.stats.composed.load(Ordering::Relaxed),
            cancelled: self.stats.cancelled.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for FrameCompositor {
    fn drop(&mut self) {
        // Disconnect first so the worker drains the queue and exits.
        self.tx = None;
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

struct Worker {
    rx: mpsc::Receiver<QueueMsg>,
    state: Arc<AtomicU8>,
    context: Arc<Mutex<Arc<dyn RenderContext>>>,
    stats: Arc<StatsCells>,
    pipeline: FramePipeline,
    snapshots: SnapshotCache,
}

impl Worker {
    fn run(mut self) {
        while let Ok(msg) = self.rx.recv() {
            match msg {
                QueueMsg::Render(request) => self.execute(request),
                QueueMsg::ResumeActive => {
                    self.state
                        .store(QueueState::Active.as_u8(), Ordering::SeqCst);
                }
            }
        }
    }

    fn execute(&mut self, mut request: RenderRequest) {
        if QueueState::from_u8(self.state.load(Ordering::SeqCst)) == QueueState::CancelGrace {
            // No pipeline work, no allocation; just acknowledge.
            self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
            request.finish_cancelled();
            return;
        }

        let context = {
            let guard = self.context.lock().unwrap_or_else(|p| p.into_inner());
            Arc::clone(&guard)
        };
        match self
            .pipeline
            .render_request(&mut request, context.as_ref(), &mut self.snapshots)
        {
            Ok(buffer) => {
                self.stats.composed.fetch_add(1, Ordering::Relaxed);
                request.finish_composed(buffer);
            }
            Err(error) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                request.finish_failed(error);
            }
        }
    }
}
