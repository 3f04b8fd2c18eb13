use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use framelay::{
    Affine, CompositionInstruction, Extent, FrameCompositor, FramelayResult, HeapBufferContext,
    LayerInstruction, MediaTime, OverlayFill, OverlayLayer, OverlayShape, PixelBuffer, Rect,
    RenderOutcome, RenderRequest, ShapeOverlay, TimeRange, TrackId,
};

fn clip_range() -> TimeRange {
    TimeRange::new(MediaTime::ZERO, MediaTime::new(1200, 600).unwrap()).unwrap()
}

fn solid_bgra(extent: Extent, px: [u8; 4]) -> PixelBuffer {
    let mut data = Vec::with_capacity(extent.byte_len());
    for _ in 0..(extent.width * extent.height) {
        data.extend_from_slice(&px);
    }
    PixelBuffer::from_bgra8(extent, data).unwrap()
}

#[test]
fn half_white_overlay_over_black_clip_at_640x360() {
    let extent = Extent::new(640, 360);

    let mut overlay = ShapeOverlay::new(extent);
    overlay.push_shape(OverlayShape::Rect {
        rect: Rect::new(0.0, 0.0, 640.0, 360.0),
        fill: OverlayFill {
            r: 255,
            g: 255,
            b: 255,
            a: 128,
        },
    });
    let overlay: Arc<dyn OverlayLayer> = Arc::new(overlay);

    let instruction: Arc<dyn CompositionInstruction> = Arc::new(
        LayerInstruction::new(
            clip_range(),
            TrackId(1),
            extent,
            Affine::IDENTITY,
            Some(overlay),
        )
        .unwrap(),
    );

    let compositor = FrameCompositor::new(Arc::new(HeapBufferContext::new(extent))).unwrap();

    let (mut request, rx) = RenderRequest::channel(instruction);
    request.attach_source_frame(TrackId(1), solid_bgra(extent, [0, 0, 0, 255]));
    compositor.start_request(request).unwrap();

    let RenderOutcome::Composed(frame) = rx.recv().unwrap() else {
        panic!("request must compose");
    };
    assert_eq!(frame.extent(), extent);
    assert!(frame.premultiplied);
    for px in frame.data.chunks_exact(4) {
        assert_eq!(px, [128, 128, 128, 255]);
    }
}

/// Overlay that counts rasterizations; the snapshot must be produced once for a
/// whole clip's worth of frames.
struct CountingOverlay {
    extent: Extent,
    fill: OverlayFill,
    rasterized: AtomicUsize,
}

impl OverlayLayer for CountingOverlay {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn draw(&self, ctx: &mut vello_cpu::RenderContext, base: Affine) -> FramelayResult<()> {
        self.rasterized.fetch_add(1, Ordering::SeqCst);
        let mut inner = ShapeOverlay::new(self.extent);
        inner.push_shape(OverlayShape::Rect {
            rect: Rect::new(
                0.0,
                0.0,
                f64::from(self.extent.width),
                f64::from(self.extent.height),
            ),
            fill: self.fill,
        });
        inner.draw(ctx, base)
    }
}

#[test]
fn a_short_clip_rasterizes_the_overlay_once_and_keeps_order() {
    let extent = Extent::new(64, 36);
    let overlay = Arc::new(CountingOverlay {
        extent,
        fill: OverlayFill {
            r: 0,
            g: 0,
            b: 255,
            a: 255,
        },
        rasterized: AtomicUsize::new(0),
    });
    let layer: Arc<dyn OverlayLayer> = overlay.clone();

    let instruction: Arc<dyn CompositionInstruction> = Arc::new(
        LayerInstruction::new(
            clip_range(),
            TrackId(3),
            extent,
            Affine::IDENTITY,
            Some(layer),
        )
        .unwrap(),
    );

    let compositor = FrameCompositor::new(Arc::new(HeapBufferContext::new(extent))).unwrap();

    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let frames = 24;
    for i in 0..frames {
        let order = order.clone();
        let mut request = RenderRequest::new(instruction.clone(), move |outcome| {
            let RenderOutcome::Composed(frame) = outcome else {
                panic!("frame {i} must compose");
            };
            // Opaque blue overlay wins everywhere; BGRA byte order.
            assert_eq!(&frame.data[0..4], &[255, 0, 0, 255]);
            order.lock().unwrap().push(i);
        });
        request.attach_source_frame(TrackId(3), solid_bgra(extent, [0, 0, 0, 255]));
        compositor.start_request(request).unwrap();
    }

    drop(compositor);

    let order = order.lock().unwrap();
    assert_eq!(order.len(), frames);
    assert!(order.windows(2).all(|w| w[0] < w[1]), "in-order completion");
    assert_eq!(overlay.rasterized.load(Ordering::SeqCst), 1);
}

#[test]
fn cancelled_and_composed_outcomes_are_counted() {
    let extent = Extent::new(16, 16);
    let instruction: Arc<dyn CompositionInstruction> = Arc::new(
        LayerInstruction::new(clip_range(), TrackId(1), extent, Affine::IDENTITY, None).unwrap(),
    );
    let compositor = FrameCompositor::new(Arc::new(HeapBufferContext::new(extent))).unwrap();

    let (mut request, rx) = RenderRequest::channel(instruction.clone());
    request.attach_source_frame(TrackId(1), solid_bgra(extent, [10, 20, 30, 255]));
    compositor.start_request(request).unwrap();
    assert!(matches!(rx.recv().unwrap(), RenderOutcome::Composed(_)));

    let stats = compositor.stats();
    assert_eq!(stats.composed, 1);
    assert_eq!(stats.failed, 0);
}
