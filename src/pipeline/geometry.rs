//! Output geometry: pure functions from source size and request to final size.
//!
//! Nothing here touches pixels or the filesystem.
//!
//! # Rounding policy
//!
//! [`resolve`] multiplies first and then divides with integer truncation
//! (round toward zero), in `u64` so the product cannot overflow. A 4000×3000
//! source asked for width 799 yields height `799 * 3000 / 4000 = 599`, not
//! 600. A result that truncates to 0 is raised to 1.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both edges strictly positive.
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// `value * num / den`, truncated, never below 1.
fn scale_truncating(value: u32, num: u32, den: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(num) / u64::from(den);
    scaled.clamp(1, u64::from(u32::MAX)) as u32
}

/// Largest box with the source's aspect ratio that fits inside the request.
///
/// * neither dimension requested → the source size
/// * one dimension requested → the other follows the source aspect ratio
/// * both requested → the tighter bound wins; the other edge shrinks
///
/// The source never gets stretched. A request of `0` counts as absent.
///
/// # Examples
/// ```
/// use image_resizer::pipeline::geometry::{resolve, Dimensions};
///
/// let src = Dimensions::new(4000, 3000);
/// assert_eq!(resolve(src, Some(800), None), Dimensions::new(800, 600));
///
/// let tall = Dimensions::new(1000, 2000);
/// assert_eq!(resolve(tall, Some(500), Some(500)), Dimensions::new(250, 500));
/// ```
pub fn resolve(source: Dimensions, width: Option<u32>, height: Option<u32>) -> Dimensions {
    let width = width.filter(|&w| w > 0);
    let height = height.filter(|&h| h > 0);

    match (width, height) {
        (None, None) => source,
        (Some(w), None) => Dimensions::new(w, scale_truncating(w, source.height, source.width)),
        (None, Some(h)) => Dimensions::new(scale_truncating(h, source.width, source.height), h),
        (Some(w), Some(h)) => {
            // Compare source.w/source.h against w/h by cross-multiplying.
            let orig = u64::from(source.width) * u64::from(h);
            let requested = u64::from(w) * u64::from(source.height);
            if orig > requested {
                // Source is relatively wider: width is the binding edge.
                Dimensions::new(w, scale_truncating(w, source.height, source.width))
            } else if orig < requested {
                Dimensions::new(scale_truncating(h, source.width, source.height), h)
            } else {
                Dimensions::new(w, h)
            }
        }
    }
}

/// Geometry for inline (data URI) sources.
///
/// Inline sources follow their own rule:
///
/// * `fit == false`: each edge is the requested value, or the source value
///   when absent. The aspect ratio is *not* preserved.
/// * `fit == true`: one scale factor is taken from the bound on the
///   source's longer edge (width for landscape, height otherwise) and applied
///   to both edges, rounding half up. When that bound is absent the request
///   falls back to [`resolve`].
pub fn resolve_inline(
    source: Dimensions,
    width: Option<u32>,
    height: Option<u32>,
    fit: bool,
) -> Dimensions {
    let width = width.filter(|&w| w > 0);
    let height = height.filter(|&h| h > 0);

    if !fit {
        return Dimensions::new(
            width.unwrap_or(source.width),
            height.unwrap_or(source.height),
        );
    }

    let ratio = if source.width > source.height {
        width.map(|w| w as f32 / source.width as f32)
    } else {
        height.map(|h| h as f32 / source.height as f32)
    };

    match ratio {
        Some(r) => Dimensions::new(
            round_half_up(r * source.width as f32),
            round_half_up(r * source.height as f32),
        ),
        None => resolve(source, width, height),
    }
}

fn round_half_up(v: f32) -> u32 {
    ((v + 0.5).floor() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // =========================================================================
    // resolve tests
    // =========================================================================

    #[test]
    fn width_only_landscape() {
        // 4000x3000, width 800 → 800x600
        assert_eq!(
            resolve(Dimensions::new(4000, 3000), Some(800), None),
            Dimensions::new(800, 600)
        );
    }

    #[test]
    fn height_only_portrait() {
        // 3000x4000, height 800 → 600x800
        assert_eq!(
            resolve(Dimensions::new(3000, 4000), None, Some(800)),
            Dimensions::new(600, 800)
        );
    }

    #[test]
    fn both_given_portrait_source_is_height_bound() {
        // 1000x2000 in 500x500 → 0.5 < 1.0 → width recomputed to 250
        assert_eq!(
            resolve(Dimensions::new(1000, 2000), Some(500), Some(500)),
            Dimensions::new(250, 500)
        );
    }

    #[test]
    fn both_given_landscape_source_is_width_bound() {
        // 2000x1000 in 500x500 → height recomputed to 250
        assert_eq!(
            resolve(Dimensions::new(2000, 1000), Some(500), Some(500)),
            Dimensions::new(500, 250)
        );
    }

    #[test]
    fn both_given_same_ratio_kept_as_is() {
        assert_eq!(
            resolve(Dimensions::new(800, 600), Some(400), Some(300)),
            Dimensions::new(400, 300)
        );
    }

    #[test]
    fn nothing_requested_returns_source() {
        let src = Dimensions::new(640, 480);
        assert_eq!(resolve(src, None, None), src);
        assert_eq!(resolve(src, Some(0), Some(0)), src);
    }

    #[test]
    fn truncates_instead_of_rounding() {
        // 799 * 3000 / 4000 = 599.25 → 599
        assert_eq!(
            resolve(Dimensions::new(4000, 3000), Some(799), None).height,
            599
        );
        // 3 * 2 / 3 = 2 exactly; 2 * 2 / 3 = 1.33 → 1
        assert_eq!(resolve(Dimensions::new(3, 2), Some(2), None).height, 1);
    }

    #[test]
    fn degenerate_truncation_clamped_to_one() {
        // 3000x10 with width 100 → 100 * 10 / 3000 = 0.33 → clamped to 1
        assert_eq!(
            resolve(Dimensions::new(3000, 10), Some(100), None),
            Dimensions::new(100, 1)
        );
    }

    #[test]
    fn upscale_request_is_honoured() {
        assert_eq!(
            resolve(Dimensions::new(100, 50), Some(400), None),
            Dimensions::new(400, 200)
        );
    }

    // =========================================================================
    // resolve_inline tests
    // =========================================================================

    #[test]
    fn inline_without_fit_stretches() {
        assert_eq!(
            resolve_inline(Dimensions::new(1000, 2000), Some(500), Some(500), false),
            Dimensions::new(500, 500)
        );
    }

    #[test]
    fn inline_without_fit_keeps_missing_edge() {
        assert_eq!(
            resolve_inline(Dimensions::new(1000, 2000), Some(500), None, false),
            Dimensions::new(500, 2000)
        );
    }

    #[test]
    fn inline_fit_portrait_uses_height() {
        // ratio = 500 / 2000 = 0.25 → 250x500
        assert_eq!(
            resolve_inline(Dimensions::new(1000, 2000), Some(500), Some(500), true),
            Dimensions::new(250, 500)
        );
    }

    #[test]
    fn inline_fit_landscape_uses_width() {
        // ratio = 300 / 900 → 300x200, height bound ignored
        assert_eq!(
            resolve_inline(Dimensions::new(900, 600), Some(300), Some(100), true),
            Dimensions::new(300, 200)
        );
    }

    #[test]
    fn inline_fit_rounds_half_up() {
        // ratio = 3 / 10 on 10x5 → 3.0x1.5 → 3x2
        assert_eq!(
            resolve_inline(Dimensions::new(10, 5), Some(3), None, true),
            Dimensions::new(3, 2)
        );
    }

    #[test]
    fn inline_fit_missing_bound_falls_back_to_resolve() {
        // Landscape source but only a height bound.
        assert_eq!(
            resolve_inline(Dimensions::new(4000, 3000), None, Some(300), true),
            Dimensions::new(400, 300)
        );
    }

    // =========================================================================
    // properties
    // =========================================================================

    fn dim() -> impl Strategy<Value = u32> {
        1u32..10_000
    }

    proptest! {
        #[test]
        fn width_only_preserves_ratio_by_truncation(sw in dim(), sh in dim(), w in dim()) {
            let out = resolve(Dimensions::new(sw, sh), Some(w), None);
            let expected = (u64::from(w) * u64::from(sh) / u64::from(sw)).max(1) as u32;
            prop_assert_eq!(out, Dimensions::new(w, expected));
        }

        #[test]
        fn contain_never_exceeds_bounds(sw in dim(), sh in dim(), w in dim(), h in dim()) {
            let out = resolve(Dimensions::new(sw, sh), Some(w), Some(h));
            prop_assert!(out.width <= w);
            prop_assert!(out.height <= h);
            prop_assert!(out.is_valid());
            // One edge always touches its bound.
            prop_assert!(out.width == w || out.height == h);
        }

        #[test]
        fn contain_matches_source_ratio(sw in dim(), sh in dim(), w in dim(), h in dim()) {
            let out = resolve(Dimensions::new(sw, sh), Some(w), Some(h));
            // The free edge is the truncated exact value for the bound edge.
            if out.width == w && out.height != h {
                prop_assert_eq!(out.height, (u64::from(w) * u64::from(sh) / u64::from(sw)).max(1) as u32);
            } else if out.height == h && out.width != w {
                prop_assert_eq!(out.width, (u64::from(h) * u64::from(sw) / u64::from(sh)).max(1) as u32);
            }
        }

        #[test]
        fn resolve_is_idempotent(sw in dim(), sh in dim(), w in proptest::option::of(dim()), h in proptest::option::of(dim())) {
            let src = Dimensions::new(sw, sh);
            prop_assert_eq!(resolve(src, w, h), resolve(src, w, h));
        }
    }
}
