//! Composites a badge overlay onto a short synthesized clip and writes a few of
//! the frames out as PNGs.
//!
//! ```bash
//! cargo run --example overlay_frames
//! ```

use std::sync::Arc;

use framelay::{
    Affine, BezPath, CompositionInstruction, Extent, FrameCompositor, HeapBufferContext,
    LayerInstruction, MediaTime, OverlayFill, OverlayLayer, OverlayShape, PixelBuffer, Point,
    Rect, RenderOutcome, RenderRequest, ShapeOverlay, TimeRange, TrackId,
};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 180;
const FRAMES: usize = 48;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let extent = Extent::new(WIDTH, HEIGHT);
    let time_range = TimeRange::new(MediaTime::ZERO, MediaTime::new(FRAMES as i64, 24)?)?;
    let track = TrackId(1);

    let overlay: Arc<dyn OverlayLayer> = Arc::new(badge_overlay(extent));
    let instruction: Arc<dyn CompositionInstruction> = Arc::new(LayerInstruction::new(
        time_range,
        track,
        extent,
        Affine::IDENTITY,
        Some(overlay),
    )?);

    let compositor = FrameCompositor::new(Arc::new(HeapBufferContext::new(extent)))?;

    let mut outcomes = Vec::with_capacity(FRAMES);
    for frame in 0..FRAMES {
        let (mut request, rx) = RenderRequest::channel(instruction.clone());
        request.attach_source_frame(track, synthesized_frame(extent, frame));
        compositor.start_request(request)?;
        outcomes.push(rx);
    }

    let out_dir = std::env::temp_dir().join("framelay_overlay_frames");
    std::fs::create_dir_all(&out_dir)?;

    for (frame, rx) in outcomes.into_iter().enumerate() {
        match rx.recv()? {
            RenderOutcome::Composed(buffer) => {
                if frame % 12 == 0 {
                    let path = out_dir.join(format!("frame_{frame:03}.png"));
                    write_png(&buffer, &path)?;
                    println!("wrote {}", path.display());
                }
            }
            RenderOutcome::Cancelled => println!("frame {frame} cancelled"),
            RenderOutcome::Failed(e) => println!("frame {frame} failed: {e}"),
        }
    }

    let stats = compositor.stats();
    println!(
        "composed {} / cancelled {} / failed {}",
        stats.composed, stats.cancelled, stats.failed
    );
    Ok(())
}

/// A translucent banner across the lower third plus a solid check mark, standing in
/// for burned-in export branding.
fn badge_overlay(extent: Extent) -> ShapeOverlay {
    let mut overlay = ShapeOverlay::new(extent);
    let w = f64::from(extent.width);
    let h = f64::from(extent.height);

    overlay.push_shape(OverlayShape::Rect {
        rect: Rect::new(0.0, 0.0, w, h * 0.28),
        fill: OverlayFill {
            r: 16,
            g: 16,
            b: 16,
            a: 160,
        },
    });

    let mut check = BezPath::new();
    check.move_to(Point::new(w * 0.06, h * 0.16));
    check.line_to(Point::new(w * 0.10, h * 0.08));
    check.line_to(Point::new(w * 0.18, h * 0.24));
    check.line_to(Point::new(w * 0.10, h * 0.12));
    check.close_path();
    overlay.push_shape(OverlayShape::Path {
        path: check,
        fill: OverlayFill {
            r: 255,
            g: 255,
            b: 255,
            a: 230,
        },
    });

    overlay
}

/// A moving vertical color band over a dark background, BGRA premultiplied.
fn synthesized_frame(extent: Extent, frame: usize) -> PixelBuffer {
    let mut buffer = PixelBuffer::blank(extent);
    let band = ((frame * 4) % extent.width as usize) as u32;
    for y in 0..extent.height {
        for x in 0..extent.width {
            let i = ((y * extent.width + x) * 4) as usize;
            let in_band = x >= band && x < band + 24;
            let (b, g, r) = if in_band { (40, 180, 250) } else { (60, 30, 20) };
            buffer.data[i] = b;
            buffer.data[i + 1] = g;
            buffer.data[i + 2] = r;
            buffer.data[i + 3] = 255;
        }
    }
    buffer
}

fn write_png(buffer: &PixelBuffer, path: &std::path::Path) -> anyhow::Result<()> {
    let mut rgba = buffer.data.clone();
    for px in rgba.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
    let img = image::RgbaImage::from_raw(buffer.width, buffer.height, rgba)
        .ok_or_else(|| anyhow::anyhow!("frame buffer size mismatch"))?;
    img.save(path)?;
    Ok(())
}
