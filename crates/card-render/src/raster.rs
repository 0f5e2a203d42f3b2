//! Full card-side rasterization.

use image::imageops::FilterType;
use image::{Rgba, RgbaImage, imageops};

use crate::assets;
use crate::field;
use crate::fonts::FontBook;
use crate::model::{Record, Side, Template};
use crate::units::Scale;

/// Render one side of one card to an RGBA surface at the given scale.
///
/// The surface is `round(width_mm × px/mm)` by `round(height_mm × px/mm)`
/// pixels, filled white, with the side's background image (if any) stretched
/// to cover it exactly and the side's fields painted in layer order. Asset
/// failures degrade per field; this function itself cannot fail, and calls
/// with identical inputs produce identical pixels.
pub async fn render_card(
    record: &Record,
    template: &Template,
    side: Side,
    scale: Scale,
    fonts: &FontBook,
) -> RgbaImage {
    let width = scale.mm_to_px_extent(template.width);
    let height = scale.mm_to_px_extent(template.height);
    // White base so transparent backgrounds print on paper-white.
    let mut surface = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

    if let Some(source) = template.background(side) {
        match assets::load_image(source).await {
            Ok(image) => {
                // Backgrounds stretch to the exact card aspect, not cover-fit.
                let stretched = image
                    .resize_exact(width, height, FilterType::Lanczos3)
                    .to_rgba8();
                imageops::overlay(&mut surface, &stretched, 0, 0);
            }
            Err(e) => {
                log::warn!(
                    "record {}: background failed to load, rendering without it: {e}",
                    record.id
                );
            }
        }
    }

    for card_field in template.fields_for_side(side) {
        field::render_field(&mut surface, card_field, record, scale, fonts).await;
    }

    surface
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, FontWeight, TextAlign, Value};
    use image::DynamicImage;
    use std::io::Cursor;

    fn template() -> Template {
        Template {
            id: "t1".into(),
            name: "Staff".into(),
            front_image: None,
            back_image: None,
            width: 57.0,
            height: 90.0,
            is_double_sided: true,
            fields: Vec::new(),
        }
    }

    fn photo_field() -> Field {
        Field {
            id: "f-photo".into(),
            key: "photo".into(),
            label: String::new(),
            value: None,
            side: Side::Front,
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 24.0,
            font_size: 14.0,
            font_family: "Arial".into(),
            color: "#000000".into(),
            text_align: TextAlign::Left,
            font_weight: FontWeight::Normal,
            line_height: None,
            rotation: 0.0,
            layer: 1,
            border_radius: None,
        }
    }

    fn write_png(dir: &tempfile::TempDir, name: &str, color: Rgba<u8>) -> String {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, color));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, &bytes).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn print_surface_has_the_contracted_pixel_size() {
        let card = render_card(
            &Record::new("r1"),
            &template(),
            Side::Front,
            Scale::print(),
            &FontBook::new(),
        )
        .await;
        assert_eq!(card.dimensions(), (673, 1063));
    }

    #[tokio::test]
    async fn blank_card_is_white() {
        let card = render_card(
            &Record::new("r1"),
            &template(),
            Side::Front,
            Scale::preview(570.0, 57.0),
            &FontBook::new(),
        )
        .await;
        assert!(card.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[tokio::test]
    async fn background_stretches_to_the_full_surface() {
        let dir = tempfile::tempdir().unwrap();
        let mut template = template();
        template.front_image = Some(write_png(&dir, "bg.png", Rgba([0, 120, 0, 255])));

        let card = render_card(
            &Record::new("r1"),
            &template,
            Side::Front,
            Scale::preview(570.0, 57.0),
            &FontBook::new(),
        )
        .await;
        assert_eq!(*card.get_pixel(0, 0), Rgba([0, 120, 0, 255]));
        assert_eq!(*card.get_pixel(569, 899), Rgba([0, 120, 0, 255]));
        assert_eq!(*card.get_pixel(285, 450), Rgba([0, 120, 0, 255]));
    }

    #[tokio::test]
    async fn missing_background_is_non_fatal() {
        let mut template = template();
        template.front_image = Some("/missing/background.png".into());

        let card = render_card(
            &Record::new("r1"),
            &template,
            Side::Front,
            Scale::preview(570.0, 57.0),
            &FontBook::new(),
        )
        .await;
        assert!(card.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[tokio::test]
    async fn broken_photo_still_produces_a_card() {
        let mut template = template();
        template.fields.push(photo_field());

        let mut record = Record::new("r1");
        record.insert("photo", Value::Text("/gone/404.png".into()));

        let card = render_card(
            &record,
            &template,
            Side::Front,
            Scale::preview(570.0, 57.0),
            &FontBook::new(),
        )
        .await;
        assert_eq!(card.dimensions(), (570, 900));
        // Placeholder occupies the field region.
        assert_ne!(*card.get_pixel(200, 200), Rgba([255, 255, 255, 255]));
    }

    #[tokio::test]
    async fn rendering_twice_is_pixel_identical() {
        let dir = tempfile::tempdir().unwrap();
        let mut template = template();
        template.front_image = Some(write_png(&dir, "bg.png", Rgba([50, 60, 70, 255])));
        template.fields.push(photo_field());

        let mut record = Record::new("r1");
        record.insert(
            "photo",
            Value::Text(write_png(&dir, "p.png", Rgba([1, 2, 3, 255]))),
        );

        let scale = Scale::preview(570.0, 57.0);
        let a = render_card(&record, &template, Side::Front, scale, &FontBook::new()).await;
        let b = render_card(&record, &template, Side::Front, scale, &FontBook::new()).await;
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[tokio::test]
    async fn higher_layers_paint_over_lower_ones() {
        let dir = tempfile::tempdir().unwrap();
        let red = write_png(&dir, "red.png", Rgba([200, 0, 0, 255]));
        let blue = write_png(&dir, "blue.png", Rgba([0, 0, 200, 255]));

        let mut template = template();
        let mut under = photo_field();
        under.id = "under".into();
        under.value = Some(red);
        under.layer = 5;
        let mut over = photo_field();
        over.id = "over".into();
        over.value = Some(blue);
        over.layer = 9;
        // Insert the top layer first to prove ordering is by layer.
        template.fields.push(over);
        template.fields.push(under);

        let card = render_card(
            &Record::new("r1"),
            &template,
            Side::Front,
            Scale::preview(570.0, 57.0),
            &FontBook::new(),
        )
        .await;
        assert_eq!(*card.get_pixel(200, 200), Rgba([0, 0, 200, 255]));
    }
}
