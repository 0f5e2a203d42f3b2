use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PressError {
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Job cancelled")]
    Cancelled,
    #[error("No records to print")]
    NoRecords,
}

pub type Result<T> = std::result::Result<T, PressError>;

/// Standard paper sizes (portrait base dimensions: width < height)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PaperSize::A3 => "A3",
            PaperSize::A4 => "A4",
            PaperSize::A5 => "A5",
            PaperSize::Letter => "Letter",
            PaperSize::Legal => "Legal",
            PaperSize::Custom { .. } => "Custom",
        }
    }
}

/// Sheet margins - printer-safe area around the card grid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetMargins {
    pub top_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
    pub right_mm: f32,
}

impl Default for SheetMargins {
    fn default() -> Self {
        Self::uniform(5.0)
    }
}

impl SheetMargins {
    /// Create uniform margins on all sides
    pub fn uniform(margin_mm: f32) -> Self {
        Self {
            top_mm: margin_mm,
            bottom_mm: margin_mm,
            left_mm: margin_mm,
            right_mm: margin_mm,
        }
    }
}

/// How double-sided cards are arranged for duplex registration.
///
/// The mirroring is a physical-workflow choice that cannot be inferred from
/// card content, so it is explicit configuration. Each variant pairs a page
/// arrangement with the mirror matching its flip edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplexLayout {
    /// Fronts fill the top band of each sheet, backs fill the row-mirrored
    /// bottom band of the same sheet. Cut the sheet and fold along the
    /// horizontal axis: each back lands behind its front.
    #[default]
    SharedSheet,
    /// Every front page is followed by a column-mirrored back page; feed the
    /// stack through the printer again, flipping on the vertical axis.
    AlternatePages,
}

impl DuplexLayout {
    pub fn name(&self) -> &'static str {
        match self {
            DuplexLayout::SharedSheet => "shared-sheet",
            DuplexLayout::AlternatePages => "alternate-pages",
        }
    }
}

/// Updates sent from a running print job to its observer.
#[derive(Debug, Clone)]
pub enum JobUpdate {
    Progress {
        current: usize,
        total: usize,
        percent: u8,
    },
    Complete {
        path: PathBuf,
        pages: usize,
    },
    Failed {
        message: String,
    },
}
