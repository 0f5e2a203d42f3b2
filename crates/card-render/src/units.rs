//! Physical-unit conversion.
//!
//! All scale math goes through [`Scale`]; a render pass constructs exactly
//! one and threads it everywhere, so preview and print can never disagree on
//! the point-to-pixel arithmetic.

/// Print resolution in dots per inch.
pub const PRINT_DPI: f32 = 300.0;

pub const MM_PER_INCH: f32 = 25.4;

/// Points per inch (desktop-publishing point).
pub const PT_PER_INCH: f32 = 72.0;

/// Conversion factors for one render pass at a fixed DPI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    dpi: f32,
}

impl Scale {
    pub fn from_dpi(dpi: f32) -> Self {
        Self { dpi }
    }

    /// The fixed print scale.
    pub fn print() -> Self {
        Self::from_dpi(PRINT_DPI)
    }

    /// Screen-preview scale: an on-screen canvas of `canvas_width_px` showing
    /// a card `card_width_mm` wide implies an effective DPI.
    pub fn preview(canvas_width_px: f32, card_width_mm: f32) -> Self {
        Self::from_dpi(canvas_width_px / card_width_mm * MM_PER_INCH)
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    pub fn px_per_mm(&self) -> f32 {
        self.dpi / MM_PER_INCH
    }

    pub fn mm_to_px(&self, mm: f32) -> f32 {
        mm * self.px_per_mm()
    }

    /// Rounded pixel extent for a physical length, floored at one pixel.
    pub fn mm_to_px_extent(&self, mm: f32) -> u32 {
        (self.mm_to_px(mm).round() as i64).max(1) as u32
    }

    /// Font-size conversion: 1 pt = 1/72 inch.
    pub fn pt_to_px(&self, pt: f32) -> f32 {
        pt / PT_PER_INCH * self.dpi
    }
}
