use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::ProgressBar;
use std::path::PathBuf;
use tokio::sync::mpsc;

use card_press::{
    DuplexLayout, JobContext, JobUpdate, PaperSize, SheetMargins, SheetOptions,
    calculate_statistics, default_output_name, run_print_job,
};
use card_render::{FontBook, Scale, Side, Template, load_records, render_card};

#[derive(Parser)]
#[command(name = "cardt", about = "ID card print tools CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a print-ready card sheet PDF from records and a template
    Print {
        /// Records file (CSV with a header row, or a JSON array)
        #[arg(short, long)]
        records: PathBuf,

        /// Template JSON file
        #[arg(short, long)]
        template: PathBuf,

        /// Output PDF file (default: "<template name>_cards_<paper>.pdf")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory scanned for TTF/OTF font files
        #[arg(long)]
        fonts: Option<PathBuf>,

        /// Paper size
        #[arg(long, default_value = "a3", value_enum)]
        paper: PaperArg,

        /// Cards per row
        #[arg(long, default_value = "5")]
        columns: usize,

        /// Rows per sheet
        #[arg(long, default_value = "4")]
        rows: usize,

        /// Sheet margin in mm (uniform on all sides)
        #[arg(long, default_value = "5.0")]
        margin: f32,

        /// Horizontal spacing between cards in mm
        #[arg(long, default_value = "0.0")]
        gutter_x: f32,

        /// Vertical spacing between cards in mm
        #[arg(long, default_value = "0.0")]
        gutter_y: f32,

        /// Render resolution in dots per inch
        #[arg(long, default_value = "300.0")]
        dpi: f32,

        /// Duplex arrangement for double-sided templates
        #[arg(long, default_value = "shared-sheet", value_enum)]
        duplex: DuplexArg,

        /// Print fronts only, even if the template has a back side
        #[arg(long)]
        single_sided: bool,

        /// Show statistics only, don't generate the PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// Render one card side to a PNG the way the editor preview shows it
    Preview {
        /// Records file (CSV with a header row, or a JSON array)
        #[arg(short, long)]
        records: PathBuf,

        /// Template JSON file
        #[arg(short, long)]
        template: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// Index of the record to preview
        #[arg(long, default_value = "0")]
        record: usize,

        /// Card side to render
        #[arg(long, default_value = "front", value_enum)]
        side: SideArg,

        /// Preview canvas width in pixels (sets the on-screen scale)
        #[arg(long, default_value = "570")]
        width: u32,

        /// Directory scanned for TTF/OTF font files
        #[arg(long)]
        fonts: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

#[derive(Clone, Copy, ValueEnum)]
enum DuplexArg {
    SharedSheet,
    AlternatePages,
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Front,
    Back,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
        }
    }
}

impl From<DuplexArg> for DuplexLayout {
    fn from(arg: DuplexArg) -> Self {
        match arg {
            DuplexArg::SharedSheet => Self::SharedSheet,
            DuplexArg::AlternatePages => Self::AlternatePages,
        }
    }
}

impl From<SideArg> for Side {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Front => Self::Front,
            SideArg::Back => Self::Back,
        }
    }
}

fn load_fonts(dir: Option<&PathBuf>) -> Result<FontBook> {
    match dir {
        Some(dir) => {
            let book = FontBook::load_dir(dir)
                .with_context(|| format!("failed to scan font directory {}", dir.display()))?;
            if book.is_empty() {
                eprintln!("warning: no fonts found in {}; text will be laid out but not painted", dir.display());
            }
            Ok(book)
        }
        None => Ok(FontBook::new()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Print {
            records,
            template,
            output,
            fonts,
            paper,
            columns,
            rows,
            margin,
            gutter_x,
            gutter_y,
            dpi,
            duplex,
            single_sided,
            stats_only,
        } => {
            let data = load_records(&records).await?;
            let mut template = Template::load(&template).await?;
            if single_sided {
                template.is_double_sided = false;
            }

            let options = SheetOptions {
                paper: paper.into(),
                columns,
                rows,
                margins: SheetMargins::uniform(margin),
                gutter_x_mm: gutter_x,
                gutter_y_mm: gutter_y,
                dpi,
                duplex: duplex.into(),
            };

            let stats = calculate_statistics(data.len(), &options, template.is_double_sided)?;
            println!("Print Statistics:");
            println!("  Records: {}", stats.records);
            println!("  Slots per sheet: {}", stats.capacity_per_page);
            println!("  Unique cards per sheet: {}", stats.unique_cards_per_page);
            println!("  Pages: {}", stats.pages);
            println!("  Blank slots on last sheet: {}", stats.blank_slots);

            if stats_only {
                return Ok(());
            }

            let fonts = load_fonts(fonts.as_ref())?;
            let output =
                output.unwrap_or_else(|| default_output_name(&template.name, options.paper).into());

            let (tx, mut rx) = mpsc::unbounded_channel();
            let ctx = JobContext::with_progress(tx);
            let bar = ProgressBar::new(100);
            let reporter = tokio::spawn(async move {
                while let Some(update) = rx.recv().await {
                    match update {
                        JobUpdate::Progress { percent, .. } => bar.set_position(percent as u64),
                        JobUpdate::Complete { .. } => bar.finish(),
                        JobUpdate::Failed { message } => bar.abandon_with_message(message),
                    }
                }
            });

            let stats = run_print_job(&data, &template, &options, &fonts, &output, &ctx).await;
            drop(ctx);
            reporter.await?;
            let stats = stats?;

            println!(
                "Generated {} cards on {} pages → {}",
                stats.records,
                stats.pages,
                output.display()
            );
        }

        Commands::Preview {
            records,
            template,
            output,
            record,
            side,
            width,
            fonts,
        } => {
            let data = load_records(&records).await?;
            let template = Template::load(&template).await?;
            if record >= data.len() {
                bail!("record index {record} out of range (0..{})", data.len());
            }

            let fonts = load_fonts(fonts.as_ref())?;
            let scale = Scale::preview(width as f32, template.width);
            let card = render_card(&data[record], &template, side.into(), scale, &fonts).await;
            card.save(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;

            println!(
                "Rendered record {} ({}) at {}x{} → {}",
                record,
                data[record].id,
                card.width(),
                card.height(),
                output.display()
            );
        }
    }

    Ok(())
}
