use crate::foundation::error::FramelayResult;

pub type Premul8 = [u8; 4];

/// Source-atop blend of one premultiplied pixel pair.
///
/// The overlay (`src`) is shown where the background (`dst`) has coverage, weighted
/// by its own alpha; the result keeps the background's alpha, so the background
/// shows through only where the overlay is transparent.
pub fn atop(dst: Premul8, src: Premul8) -> Premul8 {
    if src[3] == 0 || dst[3] == 0 {
        return dst;
    }

    let da = u16::from(dst[3]);
    let inv = 255u16 - u16::from(src[3]);

    let mut out = [0u8; 4];
    out[3] = dst[3];

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), da);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Source-atop composite `src` over `dst`, pixel by pixel, in place.
///
/// Alpha sits at byte offset 3 of each pixel, so the same routine serves BGRA and
/// RGBA buffers as long as both sides agree.
pub fn atop_in_place(dst: &mut [u8], src: &[u8]) -> FramelayResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(crate::FramelayError::overlay_unavailable(
            "atop_in_place expects equal-length 4-byte-per-pixel buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = atop([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}
