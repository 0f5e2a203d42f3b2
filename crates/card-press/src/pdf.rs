//! PDF assembly: rendered card rasters placed on fixed-size pages.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, RawImage, XObjectTransform};

use crate::types::{PressError, Result};

/// Builds the output document one sheet at a time. Card rasters are embedded
/// as image XObjects; pages are fixed physical sheets in mm.
pub struct PageAssembler {
    doc: PdfDocument,
    pages: Vec<PdfPage>,
    current_ops: Vec<Op>,
    paper_width_mm: f32,
    paper_height_mm: f32,
    dpi: f32,
}

impl PageAssembler {
    pub fn new(title: &str, paper_width_mm: f32, paper_height_mm: f32, dpi: f32) -> Self {
        Self {
            doc: PdfDocument::new(title),
            pages: Vec::new(),
            current_ops: Vec::new(),
            paper_width_mm,
            paper_height_mm,
            dpi,
        }
    }

    /// Place a card raster with its top-left corner `(x_mm, y_mm)` from the
    /// sheet's top-left, scaled to exactly `width_mm` × `height_mm`.
    pub fn place_card(
        &mut self,
        raster: &RgbaImage,
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
    ) -> Result<()> {
        // Cards are opaque on a white base; strip alpha before encoding.
        let rgb = DynamicImage::ImageRgba8(raster.clone()).to_rgb8();
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(rgb).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut warnings = Vec::new();
        let image = RawImage::decode_from_bytes(&png, &mut warnings).map_err(PressError::Pdf)?;
        let image_id = self.doc.add_image(&image);

        // PDF origin is bottom-left; the layout's is top-left.
        let y_pdf_mm = self.paper_height_mm - y_mm - height_mm;
        // The raster's natural size at this DPI is within a rounding error of
        // the card; scale the remainder away so placement is exact.
        let natural_w_pt = raster.width() as f32 / self.dpi * 72.0;
        let natural_h_pt = raster.height() as f32 / self.dpi * 72.0;

        self.current_ops.push(Op::UseXobject {
            id: image_id,
            transform: XObjectTransform {
                translate_x: Some(Mm(x_mm).into_pt()),
                translate_y: Some(Mm(y_pdf_mm).into_pt()),
                rotate: None,
                scale_x: Some(Mm(width_mm).into_pt().0 / natural_w_pt),
                scale_y: Some(Mm(height_mm).into_pt().0 / natural_h_pt),
                dpi: Some(self.dpi),
            },
        });
        Ok(())
    }

    /// Close the sheet under assembly; the next placement starts a new one.
    /// A sheet with no placements is not emitted.
    pub fn end_page(&mut self) {
        if self.current_ops.is_empty() {
            return;
        }
        let ops = std::mem::take(&mut self.current_ops);
        self.pages.push(PdfPage::new(
            Mm(self.paper_width_mm),
            Mm(self.paper_height_mm),
            ops,
        ));
    }

    /// Pages emitted so far, counting the sheet still under assembly.
    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(!self.current_ops.is_empty())
    }

    /// Serialize the document to PDF bytes.
    pub async fn finish(mut self) -> Result<Vec<u8>> {
        self.end_page();
        let mut doc = self.doc;
        doc.pages = self.pages;
        // `PdfDocument` holds `Rc`-backed font tables and is not `Send`, so the
        // save cannot be offloaded to `spawn_blocking`; run it directly. The
        // emitted bytes are identical.
        let mut warnings = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        Ok(bytes)
    }
}
