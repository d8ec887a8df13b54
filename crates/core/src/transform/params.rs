//! Transform request parameters and target size calculation.

/// Resize parameters for a single retrieval.
///
/// A zero width or height is treated as absent, matching how clients omit a
/// dimension by sending `w=0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformRequest {
    width: Option<u32>,
    height: Option<u32>,
    maintain_aspect_ratio: bool,
}

impl TransformRequest {
    /// Build a request, dropping zero dimensions.
    #[must_use]
    pub fn new(width: Option<u32>, height: Option<u32>, maintain_aspect_ratio: bool) -> Self {
        Self {
            width: width.filter(|w| *w > 0),
            height: height.filter(|h| *h > 0),
            maintain_aspect_ratio,
        }
    }

    /// Serve the original pixels without resizing.
    #[must_use]
    pub const fn original() -> Self {
        Self {
            width: None,
            height: None,
            maintain_aspect_ratio: false,
        }
    }

    /// Requested width.
    #[must_use]
    pub const fn width(&self) -> Option<u32> {
        self.width
    }

    /// Requested height.
    #[must_use]
    pub const fn height(&self) -> Option<u32> {
        self.height
    }

    /// Whether to fit inside the box instead of stretching to it.
    #[must_use]
    pub const fn maintain_aspect_ratio(&self) -> bool {
        self.maintain_aspect_ratio
    }

    /// Whether any resize was requested.
    #[must_use]
    pub const fn is_resize(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    /// Largest requested dimension, if any.
    #[must_use]
    pub fn largest_dimension(&self) -> Option<u32> {
        self.width.max(self.height)
    }

    /// Output size for a source of `(width, height)`.
    ///
    /// Missing dimensions default to the source's. With
    /// `maintain_aspect_ratio` the result fits inside that box (see
    /// [`fit_within`]); otherwise it is the box itself.
    #[must_use]
    pub fn target_size(&self, source: (u32, u32)) -> (u32, u32) {
        if !self.is_resize() {
            return source;
        }

        let bounds = (
            self.width.unwrap_or(source.0),
            self.height.unwrap_or(source.1),
        );

        if self.maintain_aspect_ratio {
            fit_within(source, bounds)
        } else {
            bounds
        }
    }
}

/// Shrink `source` to fit inside `bounds`, preserving aspect ratio.
///
/// Never upscales: a source that already fits is returned unchanged. The
/// constrained side equals the bound; the other side is rounded to the
/// nearest pixel and is at least 1.
#[must_use]
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (box_w, box_h) = bounds;

    if src_w == 0 || src_h == 0 || (src_w <= box_w && src_h <= box_h) {
        return source;
    }

    let (sw, sh, bw, bh) = (
        u64::from(src_w),
        u64::from(src_h),
        u64::from(box_w),
        u64::from(box_h),
    );

    // Compare bw/sw against bh/sh without dividing.
    let (w, h) = if bw * sh <= bh * sw {
        (bw, (sh * bw + sw / 2) / sw)
    } else {
        ((sw * bh + sh / 2) / sh, bh)
    };

    (clamp_dimension(w, box_w), clamp_dimension(h, box_h))
}

fn clamp_dimension(value: u64, bound: u32) -> u32 {
    u32::try_from(value).unwrap_or(bound).min(bound).max(1)
}
