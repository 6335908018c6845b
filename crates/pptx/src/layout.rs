//! Slide geometry in EMU (914400 per inch) for a 16:9 deck.

pub const EMU_PER_INCH: f64 = 914_400.0;

pub const SLIDE_WIDTH: i64 = 12_192_000;
pub const SLIDE_HEIGHT: i64 = 6_858_000;

/// Axis-aligned box on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    /// Build a rect from inch measurements.
    pub fn inches(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x: emu(x),
            y: emu(y),
            cx: emu(w),
            cy: emu(h),
        }
    }

    pub const fn full_slide() -> Self {
        Self {
            x: 0,
            y: 0,
            cx: SLIDE_WIDTH,
            cy: SLIDE_HEIGHT,
        }
    }
}

pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Picture crop in thousandths of a percent, as `<a:srcRect>` expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crop {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Crop {
    pub fn is_empty(&self) -> bool {
        self.left == 0 && self.top == 0 && self.right == 0 && self.bottom == 0
    }
}

/// Largest box with the image's aspect ratio that fits in `region`, centred.
pub fn contain_fit(width: u32, height: u32, region: Rect) -> Rect {
    if width == 0 || height == 0 {
        return region;
    }
    let scale = (region.cx as f64 / width as f64).min(region.cy as f64 / height as f64);
    let cx = (width as f64 * scale).round() as i64;
    let cy = (height as f64 * scale).round() as i64;

    Rect {
        x: region.x + (region.cx - cx) / 2,
        y: region.y + (region.cy - cy) / 2,
        cx,
        cy,
    }
}

/// Crop that lets an image cover a `target` box without distortion.
pub fn cover_crop(width: u32, height: u32, target: Rect) -> Crop {
    if width == 0 || height == 0 || target.cx == 0 || target.cy == 0 {
        return Crop::default();
    }
    let image_aspect = width as f64 / height as f64;
    let target_aspect = target.cx as f64 / target.cy as f64;

    if image_aspect > target_aspect {
        let visible = target_aspect / image_aspect;
        let side = ((1.0 - visible) / 2.0 * 100_000.0).round() as i64;
        Crop {
            left: side,
            right: side,
            ..Default::default()
        }
    } else if image_aspect < target_aspect {
        let visible = image_aspect / target_aspect;
        let side = ((1.0 - visible) / 2.0 * 100_000.0).round() as i64;
        Crop {
            top: side,
            bottom: side,
            ..Default::default()
        }
    } else {
        Crop::default()
    }
}

/// Product slide: picture on the left.
pub fn product_image_region() -> Rect {
    Rect::inches(0.5, 0.6, 6.0, 6.0)
}

/// Product slide: text column on the right.
pub fn product_text_region() -> Rect {
    Rect::inches(6.9, 0.6, 5.9, 5.5)
}

/// Product slide: hyperlinks under the text column.
pub fn product_links_region() -> Rect {
    Rect::inches(6.9, 6.15, 5.9, 0.45)
}

pub fn spec_sheet_heading_region() -> Rect {
    Rect::inches(0.5, 0.2, 12.333, 0.5)
}

pub fn spec_sheet_image_region() -> Rect {
    Rect::inches(0.5, 0.75, 12.333, 6.2)
}

/// Footer box, text right-aligned.
pub fn footer_region() -> Rect {
    Rect::inches(6.8, 7.05, 6.2, 0.35)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contain_fit_wide_image() {
        let region = Rect {
            x: 0,
            y: 0,
            cx: 1000,
            cy: 1000,
        };
        let fitted = contain_fit(200, 100, region);
        assert_eq!(
            fitted,
            Rect {
                x: 0,
                y: 250,
                cx: 1000,
                cy: 500
            }
        );
    }

    #[test]
    fn test_contain_fit_tall_image() {
        let region = Rect {
            x: 100,
            y: 0,
            cx: 1000,
            cy: 500,
        };
        let fitted = contain_fit(100, 200, region);
        assert_eq!(fitted.cy, 500);
        assert_eq!(fitted.cx, 250);
        assert_eq!(fitted.x, 100 + 375);
    }

    #[test]
    fn test_contain_fit_zero_size_uses_region() {
        let region = product_image_region();
        assert_eq!(contain_fit(0, 10, region), region);
    }

    #[test]
    fn test_cover_crop() {
        let target = Rect {
            x: 0,
            y: 0,
            cx: 1600,
            cy: 900,
        };
        let crop = cover_crop(1000, 1000, target);
        assert_eq!(crop.left, 0);
        assert_eq!(crop.top, crop.bottom);
        assert_eq!(crop.top, 21_875);

        assert!(cover_crop(1600, 900, target).is_empty());
    }

    #[test]
    fn test_regions_inside_slide() {
        for region in [
            product_image_region(),
            product_text_region(),
            product_links_region(),
            spec_sheet_image_region(),
            footer_region(),
        ] {
            assert!(region.x + region.cx <= SLIDE_WIDTH);
            assert!(region.y + region.cy <= SLIDE_HEIGHT);
        }
    }
}
