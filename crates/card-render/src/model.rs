//! Card data model: records, templates and positioned fields.
//!
//! Geometry lives in millimetres relative to the card's top-left corner;
//! font sizes are in points. Conversion to pixels happens at render time
//! through [`crate::units::Scale`], never here.

use std::collections::BTreeMap;
use std::path::Path;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::types::{RenderError, Result};

/// Field key that selects the photo-drawing path instead of text.
pub const PHOTO_KEY: &str = "photo";

/// A single imported value. Import sources are untyped, so a value is
/// either text or a number; everything else is normalized away on import.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    /// Render the value the way it would appear on a card.
    ///
    /// Whole numbers print without a trailing `.0` so an imported
    /// `42` round-trips as `"42"`.
    pub fn display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }
}

/// One imported person: a stable identifier plus an opaque key-value map.
/// Keys vary by import source; the core never validates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub id: String,
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Value for `key` as display text, if the record has it.
    pub fn text(&self, key: &str) -> Option<String> {
        self.values.get(key).map(Value::display)
    }
}

/// Which face of the card a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// One positioned, styled piece of content on a card side.
///
/// `key` looks the current record up; the sentinel [`PHOTO_KEY`] switches to
/// the image-drawing path. `value` is the literal the editor captured last,
/// used when a record lacks the key (a static/default field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: Option<String>,
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    pub font_family: String,
    pub color: String,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub font_weight: FontWeight,
    /// Line height in mm; when absent the renderer uses 1.2× the font size.
    #[serde(default)]
    pub line_height: Option<f32>,
    /// Clockwise rotation in degrees about the field's own center.
    #[serde(default)]
    pub rotation: f32,
    /// Paint order within a side; higher layers paint over lower ones.
    #[serde(default)]
    pub layer: i32,
    #[serde(default)]
    pub border_radius: Option<f32>,
}

impl Field {
    pub fn is_photo(&self) -> bool {
        self.key == PHOTO_KEY
    }

    /// Record value for this field, falling back to the captured literal,
    /// then the empty string.
    pub fn resolve_value(&self, record: &Record) -> String {
        record
            .text(&self.key)
            .filter(|s| !s.is_empty())
            .or_else(|| self.value.clone())
            .unwrap_or_default()
    }

    /// Field color as an opaque RGBA pixel; malformed colors fall back to
    /// black rather than failing the render.
    pub fn color_rgba(&self) -> Rgba<u8> {
        parse_hex_color(&self.color).unwrap_or(Rgba([0, 0, 0, 255]))
    }
}

/// Parse `#rgb` or `#rrggbb` into an opaque pixel.
pub fn parse_hex_color(s: &str) -> Option<Rgba<u8>> {
    let hex = s.trim().strip_prefix('#')?;
    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                channels[i] = v * 16 + v;
            }
            Some(Rgba([channels[0], channels[1], channels[2], 255]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgba([r, g, b, 255]))
        }
        _ => None,
    }
}

/// A card design: physical size, optional per-side background images and the
/// positioned fields. Immutable during a render pass; the editor owns
/// mutation and hands the core a fresh snapshot per change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub front_image: Option<String>,
    #[serde(default)]
    pub back_image: Option<String>,
    /// Card width in mm. The editor enforces portrait (width < height);
    /// the renderer draws whatever it is given.
    pub width: f32,
    /// Card height in mm.
    pub height: f32,
    #[serde(default)]
    pub is_double_sided: bool,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Template {
    /// Background image reference for a side, if configured.
    pub fn background(&self, side: Side) -> Option<&str> {
        match side {
            Side::Front => self.front_image.as_deref(),
            Side::Back => self.back_image.as_deref(),
        }
    }

    /// Fields on `side` in paint order: ascending layer, insertion order for
    /// ties (the sort is stable).
    pub fn fields_for_side(&self, side: Side) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self.fields.iter().filter(|f| f.side == side).collect();
        fields.sort_by_key(|f| f.layer);
        fields
    }

    /// Load a template from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let template = serde_json::from_slice(&bytes)?;
        Ok(template)
    }

    /// Save the template to a JSON file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
