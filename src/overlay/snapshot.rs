use std::sync::Arc;

use crate::foundation::core::{Affine, Extent};
use crate::foundation::error::FramelayResult;
use crate::overlay::layer::OverlayLayer;
use crate::render::raster::surface_dims;

/// One rasterized overlay: premultiplied RGBA8 rows in the video frame's top-left
/// origin convention.
#[derive(Debug)]
pub struct OverlaySnapshot {
    extent: Extent,
    data: Vec<u8>,
}

impl OverlaySnapshot {
    /// Pixel dimensions of the snapshot.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Premultiplied RGBA8 bytes, row-major from the top.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Memoizes overlay rasterization, keyed by overlay identity.
///
/// Only the most recently used snapshot is retained; a compositor instance is
/// expected to serve a single overlay for its whole lifetime, so the common case
/// rasterizes exactly once. Invoked only from the render queue, so no locking.
pub struct SnapshotCache {
    cached: Option<(usize, Arc<OverlaySnapshot>)>,
}

impl SnapshotCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// Return the cached snapshot for `layer`, rasterizing it on first use.
    ///
    /// On failure the cache stays empty, so a later attempt rasterizes again.
    #[tracing::instrument(skip(self, layer))]
    pub fn snapshot(
        &mut self,
        layer: &Arc<dyn OverlayLayer>,
    ) -> FramelayResult<Arc<OverlaySnapshot>> {
        let key = Arc::as_ptr(layer) as *const () as usize;
        if let Some((cached_key, snap)) = &self.cached
            && *cached_key == key
        {
            return Ok(snap.clone());
        }

        let snap = Arc::new(rasterize(layer.as_ref())?);
        self.cached = Some((key, snap.clone()));
        Ok(snap)
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

fn rasterize(layer: &dyn OverlayLayer) -> FramelayResult<OverlaySnapshot> {
    let extent = layer.extent();
    let (w, h) = surface_dims(extent)?;

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    // Layer space is y-up; the snapshot matches the video frame's top-left origin.
    let flip = Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, f64::from(extent.height)]);
    layer.draw(&mut ctx, flip)?;
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);

    Ok(OverlaySnapshot {
        extent,
        data: pixmap.data_as_u8_slice().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::foundation::core::Rect;
    use crate::overlay::layer::{OverlayFill, OverlayShape, ShapeOverlay};

    struct CountingLayer {
        extent: Extent,
        draws: AtomicUsize,
    }

    impl OverlayLayer for CountingLayer {
        fn extent(&self) -> Extent {
            self.extent
        }

        fn draw(&self, _ctx: &mut vello_cpu::RenderContext, _base: Affine) -> FramelayResult<()> {
            self.draws.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn snapshot_rasterizes_once_and_returns_identical_arc() {
        let concrete = Arc::new(CountingLayer {
            extent: Extent::new(4, 4),
            draws: AtomicUsize::new(0),
        });
        let layer: Arc<dyn OverlayLayer> = concrete.clone();
        let mut cache = SnapshotCache::new();

        let a = cache.snapshot(&layer).unwrap();
        let b = cache.snapshot(&layer).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(concrete.draws.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn snapshot_failure_leaves_cache_empty() {
        let bad: Arc<dyn OverlayLayer> = Arc::new(CountingLayer {
            extent: Extent::new(0, 4),
            draws: AtomicUsize::new(0),
        });
        let mut cache = SnapshotCache::new();
        assert!(cache.snapshot(&bad).is_err());
        assert!(cache.cached.is_none());

        let good: Arc<dyn OverlayLayer> = Arc::new(CountingLayer {
            extent: Extent::new(4, 4),
            draws: AtomicUsize::new(0),
        });
        assert!(cache.snapshot(&good).is_ok());
    }

    #[test]
    fn snapshot_rekeys_on_a_different_overlay() {
        let first: Arc<dyn OverlayLayer> = Arc::new(CountingLayer {
            extent: Extent::new(4, 4),
            draws: AtomicUsize::new(0),
        });
        let second: Arc<dyn OverlayLayer> = Arc::new(CountingLayer {
            extent: Extent::new(8, 8),
            draws: AtomicUsize::new(0),
        });
        let mut cache = SnapshotCache::new();

        let a = cache.snapshot(&first).unwrap();
        let b = cache.snapshot(&second).unwrap();
        assert_eq!(a.extent(), Extent::new(4, 4));
        assert_eq!(b.extent(), Extent::new(8, 8));

        let b2 = cache.snapshot(&second).unwrap();
        assert!(Arc::ptr_eq(&b, &b2));
    }

    #[test]
    fn rasterization_flips_the_vertical_axis() {
        // A rect covering the bottom half of layer space (y in [0, 2), y-up) must
        // land in the bottom rows of the snapshot raster.
        let mut overlay = ShapeOverlay::new(Extent::new(4, 4));
        overlay.push_shape(OverlayShape::Rect {
            rect: Rect::new(0.0, 0.0, 4.0, 2.0),
            fill: OverlayFill {
                r: 255,
                g: 255,
                b: 255,
                a: 255,
            },
        });
        let layer: Arc<dyn OverlayLayer> = Arc::new(overlay);

        let snap = SnapshotCache::new().snapshot(&layer).unwrap();
        let row_alpha = |y: usize| snap.data()[(y * 4 + 2) * 4 + 3];
        assert_eq!(row_alpha(0), 0, "top rows stay empty");
        assert_eq!(row_alpha(1), 0);
        assert_eq!(row_alpha(2), 255, "flipped content fills the bottom rows");
        assert_eq!(row_alpha(3), 255);
    }
}
