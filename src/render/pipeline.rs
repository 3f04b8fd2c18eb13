use crate::composition::instruction::LayerInstruction;
use crate::foundation::core::{Affine, Extent};
use crate::foundation::error::{FramelayError, FramelayResult};
use crate::overlay::snapshot::SnapshotCache;
use crate::render::buffer::PixelBuffer;
use crate::render::composite::atop_in_place;
use crate::render::context::RenderContext;
use crate::render::raster::{
    affine_to_cpu, image_paint, pixmap_from_premul_rgba8, surface_dims, swap_bgra_rgba_in_place,
};
use crate::session::request::RenderRequest;

/// Per-frame image pipeline: wrap source -> transform -> composite -> write out.
///
/// Owns one reusable raster context (recreated when the target size changes);
/// everything else is a scoped per-frame allocation, dropped before returning.
pub(crate) struct FramePipeline {
    ctx: Option<vello_cpu::RenderContext>,
}

impl FramePipeline {
    pub(crate) fn new() -> Self {
        Self { ctx: None }
    }

    /// Render one request to a finished output buffer.
    ///
    /// Failures are local to the request; the caller decides what they mean for the
    /// overall job.
    #[tracing::instrument(skip_all)]
    pub(crate) fn render_request(
        &mut self,
        request: &mut RenderRequest,
        context: &dyn RenderContext,
        snapshots: &mut SnapshotCache,
    ) -> FramelayResult<PixelBuffer> {
        let instruction = request.instruction();
        let Some(instruction) = instruction.as_any().downcast_ref::<LayerInstruction>() else {
            return Err(FramelayError::invalid_request(
                "instruction is not a LayerInstruction",
            ));
        };

        let Some(source) = request.take_source_frame(instruction.source_track()) else {
            // Prefer a blank frame over failing the whole request when the decoder
            // could not supply one.
            return context
                .new_pixel_buffer()
                .ok_or(FramelayError::SourceFrameUnavailable);
        };

        let target = instruction.target_size();
        let background = self.transform_source(&source, instruction.transform(), target)?;
        drop(source);

        let composited = match instruction.overlay() {
            // The background-only path is never exercised by export drivers today;
            // the transformed frame passes through unmodified.
            None => background,
            Some(layer) => {
                let snapshot = snapshots
                    .snapshot(layer)
                    .map_err(|e| FramelayError::overlay_unavailable(e.to_string()))?;
                if snapshot.extent() != target {
                    return Err(FramelayError::overlay_unavailable(
                        "overlay snapshot extent does not match the target size",
                    ));
                }
                let mut dst = background;
                atop_in_place(&mut dst, snapshot.data())?;
                dst
            }
        };

        let mut out = context.new_pixel_buffer().ok_or_else(|| {
            FramelayError::overlay_unavailable("render context produced no output buffer")
        })?;
        write_clipped(&mut out, &composited, target)?;
        Ok(out)
    }

    /// Apply the orientation transform, producing a target-size premultiplied RGBA
    /// raster of the source frame.
    fn transform_source(
        &mut self,
        source: &PixelBuffer,
        transform: Affine,
        target: Extent,
    ) -> FramelayResult<Vec<u8>> {
        let src_extent = source.extent();
        if source.data.len() != src_extent.byte_len() {
            return Err(FramelayError::invalid_request(
                "source buffer byte length mismatch",
            ));
        }

        // BGRA in; the raster surface works in RGBA.
        let mut rgba = source.data.clone();
        swap_bgra_rgba_in_place(&mut rgba);

        if transform.as_coeffs() == Affine::IDENTITY.as_coeffs() && src_extent == target {
            return Ok(rgba);
        }

        let (w, h) = surface_dims(target)?;
        let paint = image_paint(pixmap_from_premul_rgba8(&rgba, src_extent)?);

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(src_extent.width),
            f64::from(src_extent.height),
        ));
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        let out = pixmap.data_as_u8_slice().to_vec();
        self.ctx = Some(ctx);
        Ok(out)
    }
}

/// Write a premultiplied RGBA raster into a BGRA output buffer, clipped to the
/// smaller of the two extents.
fn write_clipped(out: &mut PixelBuffer, rgba: &[u8], extent: Extent) -> FramelayResult<()> {
    if out.data.len() != out.extent().byte_len() {
        return Err(FramelayError::overlay_unavailable(
            "render context produced a malformed output buffer",
        ));
    }
    if rgba.len() != extent.byte_len() {
        return Err(FramelayError::overlay_unavailable(
            "composited raster byte length mismatch",
        ));
    }

    let rows = out.height.min(extent.height) as usize;
    let cols = out.width.min(extent.width) as usize;
    for y in 0..rows {
        let src_row = y * extent.width as usize * 4;
        let dst_row = y * out.width as usize * 4;
        for x in 0..cols {
            let s = src_row + x * 4;
            let d = dst_row + x * 4;
            out.data[d] = rgba[s + 2];
            out.data[d + 1] = rgba[s + 1];
            out.data[d + 2] = rgba[s];
            out.data[d + 3] = rgba[s + 3];
        }
    }
    out.premultiplied = true;
    Ok(())
}
