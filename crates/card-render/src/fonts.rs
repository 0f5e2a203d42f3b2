//! Font resolution and text measurement.
//!
//! Faces are loaded from TTF/OTF files and resolved by (family, weight)
//! using the file stem: `Arial.ttf` serves "Arial", `Arial-Bold.ttf` serves
//! its bold weight. When no face resolves, measurement falls back to a
//! static width table so wrapping stays deterministic; glyph painting for
//! such fields is skipped by the renderer.

use std::collections::HashMap;
use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use walkdir::WalkDir;

use crate::model::FontWeight;
use crate::types::{RenderError, Result};

/// Loaded font faces, keyed by lower-cased file stem.
#[derive(Default, Clone)]
pub struct FontBook {
    faces: HashMap<String, FontArc>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a face under `name` (matched case-insensitively).
    pub fn add_face(&mut self, name: &str, bytes: Vec<u8>) -> Result<()> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| RenderError::Font(format!("{name}: {e}")))?;
        self.faces.insert(name.to_lowercase(), font);
        Ok(())
    }

    /// Scan a directory tree for `.ttf`/`.otf` files and register each under
    /// its file stem. Unparseable files are skipped with a warning.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let mut book = Self::new();
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
            if !is_font {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = std::fs::read(path)?;
            if let Err(e) = book.add_face(stem, bytes) {
                log::warn!("skipping unparseable font {}: {e}", path.display());
            }
        }
        Ok(book)
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Resolve a face for (family, weight). Bold tries the conventional
    /// `-Bold`/` Bold` stems before falling back to the plain family face.
    pub fn resolve(&self, family: &str, weight: FontWeight) -> Option<&FontArc> {
        let family = family.to_lowercase();
        if weight == FontWeight::Bold {
            for candidate in [
                format!("{family}-bold"),
                format!("{family} bold"),
                format!("{family}bold"),
            ] {
                if let Some(face) = self.faces.get(&candidate) {
                    return Some(face);
                }
            }
        }
        self.faces.get(&family)
    }

    /// Measured width of a single line at `px` pixels, using real glyph
    /// advances when a face resolves and the fallback table otherwise.
    pub fn line_width(&self, family: &str, weight: FontWeight, text: &str, px: f32) -> f32 {
        match self.resolve(family, weight) {
            Some(face) => glyph_line_width(face, text, px),
            None => fallback_line_width(text, weight, px),
        }
    }
}

/// Sum of scaled horizontal advances plus kerning.
pub fn glyph_line_width(font: &FontArc, text: &str, px: f32) -> f32 {
    let scaled = font.as_scaled(PxScale::from(px));
    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Approximate width of a line when no face is available.
///
/// Static per-character em widths for the printable ASCII range; everything
/// else uses the average. Bold applies a uniform widening factor. The
/// approximation only has to keep wrap decisions stable, not match a real
/// rasterizer.
pub fn fallback_line_width(text: &str, weight: FontWeight, px: f32) -> f32 {
    let em: f32 = text
        .chars()
        .map(|c| {
            let code = c as usize;
            if (0x20..=0x7e).contains(&code) {
                FALLBACK_WIDTHS[code - 0x20]
            } else {
                FALLBACK_AVERAGE
            }
        })
        .sum();
    let widening = match weight {
        FontWeight::Normal => 1.0,
        FontWeight::Bold => BOLD_WIDENING,
    };
    em * widening * px
}

const FALLBACK_AVERAGE: f32 = 0.556;
const BOLD_WIDENING: f32 = 1.06;

/// Em widths for ASCII 0x20..=0x7E (index = codepoint - 0x20), after the
/// metrics of a standard humanist sans face.
#[rustfmt::skip]
const FALLBACK_WIDTHS: [f32; 95] = [
    0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, // ' ' ! " # $ % & '
    0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278, // ( ) * + , - . /
    0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, // 0 1 2 3 4 5 6 7
    0.556, 0.556, 0.278, 0.278, 0.584, 0.584, 0.584, 0.556, // 8 9 : ; < = > ?
    1.015, 0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, // @ A B C D E F G
    0.722, 0.278, 0.500, 0.667, 0.556, 0.833, 0.722, 0.778, // H I J K L M N O
    0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, // P Q R S T U V W
    0.667, 0.667, 0.611, 0.278, 0.278, 0.278, 0.469, 0.556, // X Y Z [ \ ] ^ _
    0.333, 0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, // ` a b c d e f g
    0.556, 0.222, 0.222, 0.500, 0.222, 0.833, 0.556, 0.556, // h i j k l m n o
    0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, // p q r s t u v w
    0.500, 0.500, 0.500, 0.334, 0.260, 0.334, 0.584,        // x y z { | } ~
];
