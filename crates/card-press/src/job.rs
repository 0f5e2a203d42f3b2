//! The print-job orchestrator.
//!
//! Drives the end-to-end export: renders each record's card sides in strict
//! record order, decides page breaks, places rasters through the sheet grid
//! and assembles the PDF. Per-asset failures were already swallowed further
//! down; anything that reaches this level fails the whole job, and the
//! output file is only written after the document serialized successfully,
//! so a failed job leaves no partial file.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use card_render::{FontBook, Record, Scale, Side, Template, render_card};
use tokio::sync::mpsc;

use crate::options::SheetOptions;
use crate::pdf::PageAssembler;
use crate::stats::{PrintStatistics, calculate_statistics};
use crate::types::*;

/// Observer handle for a running job: optional progress channel plus a
/// cancellation flag checked between cards.
#[derive(Default, Clone)]
pub struct JobContext {
    pub progress: Option<mpsc::UnboundedSender<JobUpdate>>,
    pub cancel: Arc<AtomicBool>,
}

impl JobContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(tx: mpsc::UnboundedSender<JobUpdate>) -> Self {
        Self {
            progress: Some(tx),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that callers keep to cancel the job between cards.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn send(&self, update: JobUpdate) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(update);
        }
    }

    fn report_progress(&self, current: usize, total: usize) {
        let percent = (current as f64 / total as f64 * 100.0).round() as u8;
        self.send(JobUpdate::Progress {
            current,
            total,
            percent,
        });
    }
}

/// Default export file name: the template's name plus a fixed suffix.
pub fn default_output_name(template_name: &str, paper: PaperSize) -> String {
    format!("{}_cards_{}.pdf", template_name, paper.name())
}

/// Run a complete print job and write the PDF to `output_path`.
///
/// Records are processed strictly in order; progress is reported after each
/// finished record and cancellation is honored at the top of every record
/// iteration.
pub async fn run_print_job(
    records: &[Record],
    template: &Template,
    options: &SheetOptions,
    fonts: &FontBook,
    output_path: impl AsRef<Path>,
    ctx: &JobContext,
) -> Result<PrintStatistics> {
    let output_path = output_path.as_ref();
    let result = generate(records, template, options, fonts, output_path, ctx).await;
    match &result {
        Ok(stats) => ctx.send(JobUpdate::Complete {
            path: output_path.to_owned(),
            pages: stats.pages,
        }),
        Err(e) => ctx.send(JobUpdate::Failed {
            message: e.to_string(),
        }),
    }
    result
}

async fn generate(
    records: &[Record],
    template: &Template,
    options: &SheetOptions,
    fonts: &FontBook,
    output_path: &Path,
    ctx: &JobContext,
) -> Result<PrintStatistics> {
    if records.is_empty() {
        return Err(PressError::NoRecords);
    }
    options.validate(template.width, template.height, template.is_double_sided)?;
    let stats = calculate_statistics(records.len(), options, template.is_double_sided)?;

    let grid = options.grid(template.width, template.height);
    let scale = Scale::from_dpi(options.dpi);
    let (paper_w, paper_h) = options.paper.dimensions_mm();
    let mut assembler = PageAssembler::new(&template.name, paper_w, paper_h, options.dpi);
    let total = records.len();
    let mut done = 0usize;

    log::info!(
        "printing {total} records on {} ({} layout, {} dpi)",
        options.paper.name(),
        if template.is_double_sided {
            options.duplex.name()
        } else {
            "single-sided"
        },
        options.dpi
    );

    if !template.is_double_sided {
        for chunk in records.chunks(grid.capacity()) {
            for (slot, record) in chunk.iter().enumerate() {
                ensure_live(ctx)?;
                let front = render_card(record, template, Side::Front, scale, fonts).await;
                let origin = grid.cell_origin(slot);
                assembler.place_card(
                    &front,
                    origin.x_mm,
                    origin.y_mm,
                    template.width,
                    template.height,
                )?;
                done += 1;
                ctx.report_progress(done, total);
            }
            assembler.end_page();
        }
    } else {
        match options.duplex {
            DuplexLayout::SharedSheet => {
                for chunk in records.chunks(grid.shared_sheet_capacity()) {
                    for (slot, record) in chunk.iter().enumerate() {
                        ensure_live(ctx)?;
                        let front = render_card(record, template, Side::Front, scale, fonts).await;
                        let origin = grid.cell_origin(slot);
                        assembler.place_card(
                            &front,
                            origin.x_mm,
                            origin.y_mm,
                            template.width,
                            template.height,
                        )?;

                        let back = render_card(record, template, Side::Back, scale, fonts).await;
                        let mirrored = grid.cell_origin(grid.mirror_rows(slot));
                        assembler.place_card(
                            &back,
                            mirrored.x_mm,
                            mirrored.y_mm,
                            template.width,
                            template.height,
                        )?;
                        done += 1;
                        ctx.report_progress(done, total);
                    }
                    assembler.end_page();
                }
            }
            DuplexLayout::AlternatePages => {
                for chunk in records.chunks(grid.capacity()) {
                    for (slot, record) in chunk.iter().enumerate() {
                        ensure_live(ctx)?;
                        let front = render_card(record, template, Side::Front, scale, fonts).await;
                        let origin = grid.cell_origin(slot);
                        assembler.place_card(
                            &front,
                            origin.x_mm,
                            origin.y_mm,
                            template.width,
                            template.height,
                        )?;
                    }
                    assembler.end_page();

                    for (slot, record) in chunk.iter().enumerate() {
                        ensure_live(ctx)?;
                        let back = render_card(record, template, Side::Back, scale, fonts).await;
                        let mirrored = grid.cell_origin(grid.mirror_columns(slot));
                        assembler.place_card(
                            &back,
                            mirrored.x_mm,
                            mirrored.y_mm,
                            template.width,
                            template.height,
                        )?;
                        done += 1;
                        ctx.report_progress(done, total);
                    }
                    assembler.end_page();
                }
            }
        }
    }

    let pages = assembler.page_count();
    let bytes = assembler.finish().await?;
    tokio::fs::write(output_path, bytes).await?;
    log::info!("wrote {pages} pages to {}", output_path.display());

    Ok(stats)
}

fn ensure_live(ctx: &JobContext) -> Result<()> {
    if ctx.cancelled() {
        Err(PressError::Cancelled)
    } else {
        Ok(())
    }
}
