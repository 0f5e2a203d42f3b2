//! Cover-fit image placement, rounded-corner clipping and the placeholder
//! drawn when an image cannot be loaded.

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

/// Source-space crop for a cover fit: the largest centered region of the
/// source whose aspect matches the destination box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverCrop {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the cover-fit crop of a `src_w`×`src_h` image for a
/// `dest_w`×`dest_h` box.
///
/// Scaling the crop to the box covers it completely with no letterboxing;
/// the overflowing dimension is cropped symmetrically. Wider-than-box images
/// keep full height and lose width; taller images keep full width.
pub fn cover_crop(src_w: u32, src_h: u32, dest_w: u32, dest_h: u32) -> CoverCrop {
    if src_w == 0 || src_h == 0 || dest_w == 0 || dest_h == 0 {
        return CoverCrop {
            x: 0,
            y: 0,
            width: src_w.max(1),
            height: src_h.max(1),
        };
    }

    let image_aspect = src_w as f64 / src_h as f64;
    let box_aspect = dest_w as f64 / dest_h as f64;

    if image_aspect > box_aspect {
        // Fit height, crop width, center horizontally.
        let width = ((src_h as f64 * box_aspect).round() as u32).clamp(1, src_w);
        CoverCrop {
            x: (src_w - width) / 2,
            y: 0,
            width,
            height: src_h,
        }
    } else {
        // Fit width, crop height, center vertically.
        let height = ((src_w as f64 / box_aspect).round() as u32).clamp(1, src_h);
        CoverCrop {
            x: 0,
            y: (src_h - height) / 2,
            width: src_w,
            height,
        }
    }
}

/// Paint `image` cover-fitted over the whole of `dest`, optionally clipped
/// to rounded corners of `radius_px`.
pub fn paint_cover(dest: &mut RgbaImage, image: &DynamicImage, radius_px: f32) {
    let (dw, dh) = dest.dimensions();
    if dw == 0 || dh == 0 {
        return;
    }
    let crop = cover_crop(image.width(), image.height(), dw, dh);
    let mut fitted = image
        .crop_imm(crop.x, crop.y, crop.width, crop.height)
        .resize_exact(dw, dh, FilterType::Lanczos3)
        .to_rgba8();
    if radius_px > 0.0 {
        apply_corner_radius(&mut fitted, radius_px);
    }
    image::imageops::overlay(dest, &fitted, 0, 0);
}

/// Zero the alpha of every pixel outside a rounded rectangle spanning the
/// whole buffer. The radius is clamped to half the shorter edge.
pub fn apply_corner_radius(image: &mut RgbaImage, radius_px: f32) {
    let (w, h) = image.dimensions();
    let radius = radius_px.min(w as f32 / 2.0).min(h as f32 / 2.0);
    if radius <= 0.0 {
        return;
    }
    let r2 = radius * radius;
    for y in 0..h {
        for x in 0..w {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            // Distance from the pixel to the inner box whose corners are the
            // arc centers; pixels farther than the radius lie outside an arc.
            let dx = px - px.clamp(radius, w as f32 - radius);
            let dy = py - py.clamp(radius, h as f32 - radius);
            if dx * dx + dy * dy > r2 {
                image.get_pixel_mut(x, y).0[3] = 0;
            }
        }
    }
}

/// Fill the buffer with the neutral placeholder shown for images that could
/// not be loaded: a light panel with a border and a diagonal cross.
pub fn paint_placeholder(dest: &mut RgbaImage) {
    let (w, h) = dest.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let fill = Rgba([229, 231, 235, 255]);
    let line = Rgba([156, 163, 175, 255]);
    for pixel in dest.pixels_mut() {
        *pixel = fill;
    }
    draw_hollow_rect_mut(dest, Rect::at(0, 0).of_size(w, h), line);
    draw_line_segment_mut(dest, (0.0, 0.0), (w as f32 - 1.0, h as f32 - 1.0), line);
    draw_line_segment_mut(dest, (w as f32 - 1.0, 0.0), (0.0, h as f32 - 1.0), line);
}
