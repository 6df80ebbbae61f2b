use crate::{
    foundation::error::{TalusError, TalusResult},
    foundation::math::mul_div255_u8,
    raster::grid::{ChannelLayout, Raster},
};

/// Straight-alpha over-compositing of one RGBA source pixel onto an RGB
/// destination pixel.
///
/// Cutout alpha is a label mask, not premultiplied coverage, so the blend is
/// `out = (src * a + dst * (255 - a) + 127) / 255` per color channel. Exact
/// at both endpoints: a=0 leaves the destination untouched, a=255 replaces it.
pub fn over_straight(dst: [u8; 3], src: [u8; 4]) -> [u8; 3] {
    let a = u16::from(src[3]);
    if a == 0 {
        return dst;
    }
    if a == 255 {
        return [src[0], src[1], src[2]];
    }

    let inv = 255 - a;
    let mut out = [0u8; 3];
    for i in 0..3 {
        out[i] = mul_div255_u8(u16::from(src[i]), a)
            .saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Blend a color+alpha foreground over a color destination at `(ox, oy)`.
///
/// Foreground pixels falling outside the destination are clipped.
pub fn blit_over(dst: &mut Raster, fg: &Raster, ox: u32, oy: u32) -> TalusResult<()> {
    if dst.layout != ChannelLayout::Color {
        return Err(TalusError::validation(
            "blit_over destination must be 3-channel color",
        ));
    }
    if fg.layout != ChannelLayout::ColorAlpha {
        return Err(TalusError::validation(
            "blit_over source must be 4-channel color+alpha",
        ));
    }

    for y in 0..fg.height {
        let dy = oy + y;
        if dy >= dst.height {
            break;
        }
        for x in 0..fg.width {
            let dx = ox + x;
            if dx >= dst.width {
                break;
            }
            let si = fg.pixel_offset(x, y);
            let di = dst.pixel_offset(dx, dy);
            let src = [
                fg.data[si],
                fg.data[si + 1],
                fg.data[si + 2],
                fg.data[si + 3],
            ];
            let blended = over_straight([dst.data[di], dst.data[di + 1], dst.data[di + 2]], src);
            dst.data[di..di + 3].copy_from_slice(&blended);
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blend.rs"]
mod tests;
