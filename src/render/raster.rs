use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Extent};
use crate::foundation::error::{FramelayError, FramelayResult};

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Validate an extent as a raster surface size, returning `u16` dimensions.
pub(crate) fn surface_dims(extent: Extent) -> FramelayResult<(u16, u16)> {
    if extent.is_empty() {
        return Err(FramelayError::surface_allocation(
            "surface extent must be non-zero",
        ));
    }
    let w: u16 = extent
        .width
        .try_into()
        .map_err(|_| FramelayError::surface_allocation("surface width exceeds u16"))?;
    let h: u16 = extent
        .height
        .try_into()
        .map_err(|_| FramelayError::surface_allocation("surface height exceeds u16"))?;
    Ok((w, h))
}

pub(crate) fn pixmap_from_premul_rgba8(
    bytes: &[u8],
    extent: Extent,
) -> FramelayResult<vello_cpu::Pixmap> {
    let (w, h) = surface_dims(extent)?;
    if bytes.len() != extent.byte_len() {
        return Err(FramelayError::surface_allocation(
            "pixmap byte length mismatch",
        ));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (extent.width as usize) * (extent.height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

pub(crate) fn image_paint(pixmap: vello_cpu::Pixmap) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

/// Swap the B and R channels of every pixel in place (BGRA <-> RGBA, self-inverse).
pub(crate) fn swap_bgra_rgba_in_place(px: &mut [u8]) {
    for p in px.chunks_exact_mut(4) {
        p.swap(0, 2);
    }
}
