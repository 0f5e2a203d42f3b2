//! Page-grid geometry
//!
//! Pure arithmetic mapping card slots to sheet positions, plus the two
//! duplex mirror transforms. No rendering happens here.

/// The card grid of one printed sheet.
///
/// Slots are indexed row-major from the top-left: slot `s` sits at
/// `row = s / columns`, `col = s % columns`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetGrid {
    pub columns: usize,
    pub rows: usize,
    pub card_width_mm: f32,
    pub card_height_mm: f32,
    /// Left edge of the first column (the sheet's left margin).
    pub origin_x_mm: f32,
    /// Top edge of the first row (the sheet's top margin).
    pub origin_y_mm: f32,
    pub gutter_x_mm: f32,
    pub gutter_y_mm: f32,
}

/// Top-left corner of a grid cell, in mm from the sheet's top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellOrigin {
    pub x_mm: f32,
    pub y_mm: f32,
}

impl SheetGrid {
    /// Card slots per sheet.
    pub fn capacity(&self) -> usize {
        self.columns * self.rows
    }

    /// Page index of the `item`-th card in a single-sided run.
    pub fn page_of(&self, item: usize) -> usize {
        item / self.capacity()
    }

    /// Within-page slot of the `item`-th card.
    pub fn slot_of(&self, item: usize) -> usize {
        item % self.capacity()
    }

    /// Top-left corner of `slot` on its page.
    pub fn cell_origin(&self, slot: usize) -> CellOrigin {
        let col = slot % self.columns;
        let row = slot / self.columns;
        CellOrigin {
            x_mm: self.origin_x_mm + col as f32 * (self.card_width_mm + self.gutter_x_mm),
            y_mm: self.origin_y_mm + row as f32 * (self.card_height_mm + self.gutter_y_mm),
        }
    }

    /// Mirror a slot across the sheet's vertical axis: same row, reflected
    /// column. Registers backs printed on their own page when the stack is
    /// flipped on the vertical axis.
    pub fn mirror_columns(&self, slot: usize) -> usize {
        let col = slot % self.columns;
        let row = slot / self.columns;
        row * self.columns + (self.columns - 1 - col)
    }

    /// Mirror a slot across the sheet's horizontal axis: same column,
    /// reflected row. Maps a front in the top band to its back slot in the
    /// bottom band of the same sheet.
    pub fn mirror_rows(&self, slot: usize) -> usize {
        let col = slot % self.columns;
        let row = slot / self.columns;
        (self.rows - 1 - row) * self.columns + col
    }

    /// Unique cards per sheet when fronts and backs share it.
    pub fn shared_sheet_capacity(&self) -> usize {
        self.capacity() / 2
    }
}
