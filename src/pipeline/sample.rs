//! Coarse downsampling factor for the file-backed decode path.
//!
//! Decoding a 6000×4000 photo only to shrink it to 800 px wide would
//! materialise ~96 MB of RGBA first. Instead the decoder is asked for a
//! reduced image up front, and only the remainder is done by the precise
//! resampling step. This module picks that factor.

use super::geometry::Dimensions;

/// Integer downsample factor from `source` toward `target`.
///
/// The edge that constrains scaling more tightly decides: if the source is
/// relatively wider than the target, width drives the factor, otherwise
/// height. The result is clamped to at least 1 so an upscale request never
/// yields a zero factor.
pub fn sample_size(source: Dimensions, target: Dimensions) -> u32 {
    if !target.is_valid() {
        return 1;
    }
    // source.w/source.h > target.w/target.h, cross-multiplied
    let src_aspect = u64::from(source.width) * u64::from(target.height);
    let dst_aspect = u64::from(target.width) * u64::from(source.height);

    let factor = if src_aspect > dst_aspect {
        source.width / target.width
    } else {
        source.height / target.height
    };
    factor.max(1)
}
