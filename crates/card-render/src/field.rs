//! Drawing of a single field onto a card surface.
//!
//! A field renders into its own buffer sized to the destination rect, which
//! doubles as the clip region, then composites onto the card — rotated about
//! the rect center when the field carries a rotation. Failures degrade per
//! field (placeholder or skipped glyphs); nothing here aborts a card.

use ab_glyph::PxScale;
use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::draw_text_mut;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};

use crate::assets;
use crate::fit;
use crate::fonts::FontBook;
use crate::model::{Field, Record};
use crate::text;
use crate::units::Scale;

/// Render one field against `record` onto `surface`.
pub async fn render_field(
    surface: &mut RgbaImage,
    field: &Field,
    record: &Record,
    scale: Scale,
    fonts: &FontBook,
) {
    let width_px = scale.mm_to_px_extent(field.width);
    let height_px = scale.mm_to_px_extent(field.height);
    let mut buf = RgbaImage::new(width_px, height_px);

    let painted = if field.is_photo() {
        paint_photo(&mut buf, field, record, scale).await
    } else {
        paint_text(&mut buf, field, record, scale, fonts)
    };
    if !painted {
        return;
    }

    composite(
        surface,
        buf,
        scale.mm_to_px(field.x),
        scale.mm_to_px(field.y),
        field.rotation,
    );
}

async fn paint_photo(buf: &mut RgbaImage, field: &Field, record: &Record, scale: Scale) -> bool {
    let radius_px = field.border_radius.map_or(0.0, |mm| scale.mm_to_px(mm));
    let source = field.resolve_value(record);
    if source.is_empty() {
        fit::paint_placeholder(buf);
        return true;
    }
    match assets::load_image(&source).await {
        Ok(image) => fit::paint_cover(buf, &image, radius_px),
        Err(e) => {
            log::warn!("record {}: photo failed to load: {e}", record.id);
            fit::paint_placeholder(buf);
        }
    }
    true
}

fn paint_text(
    buf: &mut RgbaImage,
    field: &Field,
    record: &Record,
    scale: Scale,
    fonts: &FontBook,
) -> bool {
    let content = field.resolve_value(record);
    if content.trim().is_empty() {
        return false;
    }
    let font_px = scale.pt_to_px(field.font_size);
    if font_px <= 0.0 {
        return false;
    }
    let line_height_px = field
        .line_height
        .map_or(font_px * 1.2, |mm| scale.mm_to_px(mm));

    let box_width = buf.width() as f32;
    let lines = text::wrap_text(&content, box_width, |s| {
        fonts.line_width(&field.font_family, field.font_weight, s, font_px)
    });
    let visible = text::visible_line_count(lines.len(), line_height_px, buf.height() as f32);
    if visible == 0 {
        return false;
    }

    let Some(face) = fonts.resolve(&field.font_family, field.font_weight) else {
        log::warn!(
            "no face for font family {:?}; field {} left unpainted",
            field.font_family,
            field.id
        );
        return false;
    };

    let color = field.color_rgba();
    for (i, line) in lines[..visible].iter().enumerate() {
        let line_width = fonts.line_width(&field.font_family, field.font_weight, line, font_px);
        let x = text::aligned_x(field.text_align, 0.0, box_width, line_width);
        let y = i as f32 * line_height_px;
        draw_text_mut(
            buf,
            color,
            x.round() as i32,
            y.round() as i32,
            PxScale::from(font_px),
            face,
            line,
        );
    }
    true
}

/// Place the field buffer on the card, rotating clockwise about the rect
/// center when needed. The buffer is padded to its diagonal before rotating
/// so corners survive the transform.
fn composite(surface: &mut RgbaImage, buf: RgbaImage, x_px: f32, y_px: f32, rotation_deg: f32) {
    if rotation_deg.rem_euclid(360.0).abs() < 1e-3 {
        imageops::overlay(surface, &buf, x_px.round() as i64, y_px.round() as i64);
        return;
    }

    let (w, h) = buf.dimensions();
    let side = ((w as f64).hypot(h as f64).ceil() as u32).max(1);
    let mut padded = RgbaImage::new(side, side);
    imageops::overlay(
        &mut padded,
        &buf,
        ((side - w) / 2) as i64,
        ((side - h) / 2) as i64,
    );
    let rotated = rotate_about_center(
        &padded,
        rotation_deg.to_radians(),
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
    );
    let dx = (x_px + w as f32 / 2.0 - side as f32 / 2.0).round() as i64;
    let dy = (y_px + h as f32 / 2.0 - side as f32 / 2.0).round() as i64;
    imageops::overlay(surface, &rotated, dx, dy);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FontWeight, Side, TextAlign, Value};
    use image::DynamicImage;
    use std::io::Cursor;

    fn photo_field(value: Option<String>) -> Field {
        Field {
            id: "photo".into(),
            key: "photo".into(),
            label: String::new(),
            value,
            side: Side::Front,
            x: 2.0,
            y: 2.0,
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

    fn surface() -> RgbaImage {
        RgbaImage::from_pixel(300, 400, Rgba([255, 255, 255, 255]))
    }

    fn scale() -> Scale {
        Scale::preview(570.0, 57.0) // 10 px per mm
    }

    fn write_png(dir: &tempfile::TempDir, color: Rgba<u8>) -> String {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, color));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, &bytes).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn photo_paints_into_its_rect() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_png(&dir, Rgba([200, 10, 10, 255]));

        let mut record = Record::new("r1");
        record.insert("photo", Value::Text(source));

        let mut card = surface();
        render_field(&mut card, &photo_field(None), &record, scale(), &FontBook::new()).await;

        // Field rect is 20..220 x 20..260 at 10px/mm.
        assert_eq!(*card.get_pixel(100, 100), Rgba([200, 10, 10, 255]));
        // Outside the rect stays white.
        assert_eq!(*card.get_pixel(280, 100), Rgba([255, 255, 255, 255]));
    }

    #[tokio::test]
    async fn failed_photo_load_paints_the_placeholder() {
        let mut record = Record::new("r1");
        record.insert("photo", Value::Text("/definitely/missing.png".into()));

        let mut card = surface();
        render_field(&mut card, &photo_field(None), &record, scale(), &FontBook::new()).await;

        // Placeholder fill is visibly not white.
        assert_ne!(*card.get_pixel(100, 100), Rgba([255, 255, 255, 255]));
    }

    #[tokio::test]
    async fn missing_font_skips_glyphs_without_failing() {
        let mut field = photo_field(None);
        field.key = "name".into();
        let mut record = Record::new("r1");
        record.insert("name", Value::Text("Ada Lovelace".into()));

        let mut card = surface();
        let before = card.clone();
        render_field(&mut card, &field, &record, scale(), &FontBook::new()).await;
        assert_eq!(card.as_raw(), before.as_raw());
    }

    #[tokio::test]
    async fn rotation_keeps_content_near_the_field_center() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_png(&dir, Rgba([10, 10, 200, 255]));

        let mut field = photo_field(None);
        field.rotation = 90.0;
        let mut record = Record::new("r1");
        record.insert("photo", Value::Text(source));

        let mut card = surface();
        render_field(&mut card, &field, &record, scale(), &FontBook::new()).await;

        // Center of the rect (120, 140) is painted regardless of rotation.
        let center = *card.get_pixel(120, 140);
        assert_ne!(center, Rgba([255, 255, 255, 255]));
    }
}
