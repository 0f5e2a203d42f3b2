use crate::layout::SheetGrid;
use crate::types::*;

/// Print-sheet configuration
///
/// The defaults reproduce the A3 badge sheet: 5×4 cards of 57×90 mm with
/// 5 mm printer margins and no gutters, rendered at 300 DPI.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetOptions {
    pub paper: PaperSize,
    pub columns: usize,
    pub rows: usize,
    pub margins: SheetMargins,
    pub gutter_x_mm: f32,
    pub gutter_y_mm: f32,
    pub dpi: f32,
    pub duplex: DuplexLayout,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            paper: PaperSize::A3,
            columns: 5,
            rows: 4,
            margins: SheetMargins::default(),
            gutter_x_mm: 0.0,
            gutter_y_mm: 0.0,
            dpi: 300.0,
            duplex: DuplexLayout::default(),
        }
    }
}

impl SheetOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| PressError::Config(format!("Failed to parse sheet config: {e}")))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PressError::Config(format!("Failed to serialize sheet config: {e}")))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options against a card size.
    ///
    /// The grid must fit the paper: a configuration whose columns, gutters
    /// and margins overrun the sheet is rejected here rather than silently
    /// printed off-edge.
    pub fn validate(&self, card_width_mm: f32, card_height_mm: f32, double_sided: bool) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            return Err(PressError::Config(
                "grid needs at least one column and one row".to_string(),
            ));
        }
        if self.dpi <= 0.0 {
            return Err(PressError::Config(format!("DPI must be positive, got {}", self.dpi)));
        }
        if card_width_mm <= 0.0 || card_height_mm <= 0.0 {
            return Err(PressError::Config(format!(
                "card size must be positive, got {card_width_mm}x{card_height_mm} mm"
            )));
        }

        let (paper_w, paper_h) = self.paper.dimensions_mm();
        let needed_w = self.margins.left_mm
            + self.margins.right_mm
            + self.columns as f32 * card_width_mm
            + (self.columns - 1) as f32 * self.gutter_x_mm;
        let needed_h = self.margins.top_mm
            + self.margins.bottom_mm
            + self.rows as f32 * card_height_mm
            + (self.rows - 1) as f32 * self.gutter_y_mm;
        const TOLERANCE_MM: f32 = 1e-3;
        if needed_w > paper_w + TOLERANCE_MM {
            return Err(PressError::Config(format!(
                "{} columns of {card_width_mm} mm cards need {needed_w:.1} mm, but {} paper is {paper_w} mm wide",
                self.columns,
                self.paper.name()
            )));
        }
        if needed_h > paper_h + TOLERANCE_MM {
            return Err(PressError::Config(format!(
                "{} rows of {card_height_mm} mm cards need {needed_h:.1} mm, but {} paper is {paper_h} mm tall",
                self.rows,
                self.paper.name()
            )));
        }

        if double_sided && self.duplex == DuplexLayout::SharedSheet && self.rows % 2 != 0 {
            return Err(PressError::Config(format!(
                "shared-sheet duplex splits the sheet into equal bands and needs an even row count, got {}",
                self.rows
            )));
        }

        Ok(())
    }

    /// The sheet grid these options describe for a given card size.
    pub fn grid(&self, card_width_mm: f32, card_height_mm: f32) -> SheetGrid {
        SheetGrid {
            columns: self.columns,
            rows: self.rows,
            card_width_mm,
            card_height_mm,
            origin_x_mm: self.margins.left_mm,
            origin_y_mm: self.margins.top_mm,
            gutter_x_mm: self.gutter_x_mm,
            gutter_y_mm: self.gutter_y_mm,
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    // Manual implementations for types whose JSON form is a plain string
    // (or a map, for custom paper).
    impl Serialize for PaperSize {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            use serde::ser::SerializeStruct;
            match self {
                PaperSize::A3 => serializer.serialize_str("A3"),
                PaperSize::A4 => serializer.serialize_str("A4"),
                PaperSize::A5 => serializer.serialize_str("A5"),
                PaperSize::Letter => serializer.serialize_str("Letter"),
                PaperSize::Legal => serializer.serialize_str("Legal"),
                PaperSize::Custom {
                    width_mm,
                    height_mm,
                } => {
                    let mut s = serializer.serialize_struct("Custom", 2)?;
                    s.serialize_field("width_mm", width_mm)?;
                    s.serialize_field("height_mm", height_mm)?;
                    s.end()
                }
            }
        }
    }

    impl<'de> Deserialize<'de> for PaperSize {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            use serde::de::{self, MapAccess, Visitor};
            use std::fmt;

            struct PaperSizeVisitor;

            impl<'de> Visitor<'de> for PaperSizeVisitor {
                type Value = PaperSize;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("a paper size")
                }

                fn visit_str<E>(self, value: &str) -> std::result::Result<PaperSize, E>
                where
                    E: de::Error,
                {
                    match value {
                        "A3" => Ok(PaperSize::A3),
                        "A4" => Ok(PaperSize::A4),
                        "A5" => Ok(PaperSize::A5),
                        "Letter" => Ok(PaperSize::Letter),
                        "Legal" => Ok(PaperSize::Legal),
                        _ => Err(de::Error::unknown_variant(
                            value,
                            &["A3", "A4", "A5", "Letter", "Legal", "Custom"],
                        )),
                    }
                }

                fn visit_map<M>(self, mut map: M) -> std::result::Result<PaperSize, M::Error>
                where
                    M: MapAccess<'de>,
                {
                    let mut width_mm = None;
                    let mut height_mm = None;

                    while let Some(key) = map.next_key::<String>()? {
                        match key.as_str() {
                            "width_mm" => width_mm = Some(map.next_value()?),
                            "height_mm" => height_mm = Some(map.next_value()?),
                            _ => {
                                let _: serde::de::IgnoredAny = map.next_value()?;
                            }
                        }
                    }

                    match (width_mm, height_mm) {
                        (Some(w), Some(h)) => Ok(PaperSize::Custom {
                            width_mm: w,
                            height_mm: h,
                        }),
                        _ => Err(de::Error::missing_field("width_mm or height_mm")),
                    }
                }
            }

            deserializer.deserialize_any(PaperSizeVisitor)
        }
    }

    impl Serialize for DuplexLayout {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(match self {
                DuplexLayout::SharedSheet => "SharedSheet",
                DuplexLayout::AlternatePages => "AlternatePages",
            })
        }
    }

    impl<'de> Deserialize<'de> for DuplexLayout {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            match s.as_str() {
                "SharedSheet" => Ok(DuplexLayout::SharedSheet),
                "AlternatePages" => Ok(DuplexLayout::AlternatePages),
                _ => Err(serde::de::Error::custom("Unknown duplex layout")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fit_a3() {
        let options = SheetOptions::default();
        assert!(options.validate(57.0, 90.0, true).is_ok());
    }

    #[test]
    fn overfull_grid_is_a_config_error() {
        // The legacy 15mm margin: 15 + 5*57 + 15 = 315 > 297.
        let options = SheetOptions {
            margins: SheetMargins::uniform(15.0),
            ..Default::default()
        };
        let err = options.validate(57.0, 90.0, false).unwrap_err();
        assert!(matches!(err, PressError::Config(_)));
    }

    #[test]
    fn too_many_rows_fail_on_height() {
        let options = SheetOptions {
            rows: 5,
            ..Default::default()
        };
        assert!(options.validate(57.0, 90.0, false).is_err());
    }

    #[test]
    fn gutters_count_toward_the_fit() {
        // 5*57 + 4*1 + 10 = 299 > 297.
        let options = SheetOptions {
            gutter_x_mm: 1.0,
            ..Default::default()
        };
        assert!(options.validate(57.0, 90.0, false).is_err());
        // Fewer columns leave room for the gutters.
        let options = SheetOptions {
            columns: 4,
            gutter_x_mm: 1.0,
            ..Default::default()
        };
        assert!(options.validate(57.0, 90.0, false).is_ok());
    }

    #[test]
    fn shared_sheet_duplex_requires_even_rows() {
        let options = SheetOptions {
            rows: 3,
            ..Default::default()
        };
        assert!(options.validate(57.0, 90.0, false).is_ok());
        assert!(options.validate(57.0, 90.0, true).is_err());

        let options = SheetOptions {
            rows: 3,
            duplex: DuplexLayout::AlternatePages,
            ..Default::default()
        };
        assert!(options.validate(57.0, 90.0, true).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn options_json_round_trip() {
        let options = SheetOptions {
            paper: PaperSize::Custom {
                width_mm: 300.0,
                height_mm: 450.0,
            },
            duplex: DuplexLayout::AlternatePages,
            ..Default::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        let back: SheetOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);

        let named: SheetOptions =
            serde_json::from_str(&json.replace("{\"width_mm\":300.0,\"height_mm\":450.0}", "\"A3\""))
                .unwrap();
        assert_eq!(named.paper, PaperSize::A3);
    }
}
