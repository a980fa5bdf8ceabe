// wordtest-pdf: Generate vocabulary test sheets from a word-list workbook

use std::path::{Path, PathBuf};

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use wordtest_pdf::render::{render_html, render_pdf};
use wordtest_pdf::source::{list_sheets, load_entries};
use wordtest_pdf::{
    select_items, AppError, FontSource, Header, LayoutConfig, TestSheetComposer, ITEMS_PER_TEST,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate vocabulary test sheets (questions page, then answers page)")]
struct Args {
    /// Word list: a workbook (.xlsx, .xlsm, .xls, .ods) or a JSON array
    #[arg(short, long)]
    workbook: PathBuf,

    /// Sheet to read (defaults to the first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// First row number to include
    #[arg(long, allow_negative_numbers = true, required_unless_present = "list_sheets")]
    start: Option<i64>,

    /// Last row number to include
    #[arg(long, allow_negative_numbers = true, required_unless_present = "list_sheets")]
    end: Option<i64>,

    /// Output filename (defaults to wordtest-{id}.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write an HTML page with a drawing canvas over each sheet
    #[arg(long)]
    html: Option<PathBuf>,

    /// Title printed at the top of both pages
    #[arg(short, long, default_value = "Vocabulary test")]
    title: String,

    /// Seed for a reproducible selection
    #[arg(long)]
    seed: Option<u64>,

    /// TrueType font to embed (required for non-Latin text such as Japanese)
    #[arg(long)]
    font: Option<PathBuf>,

    /// JSON file overriding layout constants
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Print the workbook's sheet names and exit
    #[arg(long)]
    list_sheets: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();

    if args.list_sheets {
        for name in list_sheets(&args.workbook)? {
            println!("{}", name);
        }
        return Ok(());
    }

    let start = args
        .start
        .ok_or_else(|| AppError::ArgumentError("--start is required".to_string()))?;
    let end = args
        .end
        .ok_or_else(|| AppError::ArgumentError("--end is required".to_string()))?;
    if start > end {
        log::warn!("Range {}..={} is empty; the test will be blank", start, end);
    }

    // Layout and font are checked before any rows are read
    let config = match &args.layout {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    let font = FontSource::load(args.font.as_deref())?;
    let metrics = font.metrics()?;
    let composer = TestSheetComposer::new(config, metrics.as_ref())?;

    let sheet = resolve_sheet(&args.workbook, args.sheet)?;
    let entries = load_entries(&args.workbook, &sheet)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let items = select_items(&entries, start, end, &mut rng);
    let selected = items.iter().filter(|i| !i.is_placeholder()).count();

    let header = Header::new(args.title, &sheet, start, end);
    let document = composer.compose(&items, &header);

    let output_file = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("wordtest-{}.pdf", generate_short_id())));
    let pdf = render_pdf(&document, &font)?;
    std::fs::write(&output_file, pdf)?;
    log::info!("Wrote {}", output_file.display());

    if let Some(html_file) = &args.html {
        std::fs::write(html_file, render_html(&document, &font.name()))?;
        log::info!("Wrote {}", html_file.display());
    }

    println!("✓ Generated: {}", output_file.display());
    if let Some(html_file) = &args.html {
        println!("  HTML: {}", html_file.display());
    }
    println!("  Sheet: {}", sheet);
    println!("  Range: {}-{}", start, end);
    println!(
        "  Items: {} of {} ({} in range)",
        selected,
        ITEMS_PER_TEST,
        entries
            .iter()
            .filter(|e| e.number.is_some_and(|n| start <= n && n <= end))
            .count()
    );

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// The requested sheet, or the first one in the workbook.
///
/// JSON word lists have no sheets; their file stem labels the test instead.
fn resolve_sheet(workbook: &Path, requested: Option<String>) -> Result<String, AppError> {
    if let Some(sheet) = requested {
        return Ok(sheet);
    }
    let sheets = list_sheets(workbook)?;
    if let Some(first) = sheets.into_iter().next() {
        return Ok(first);
    }
    let stem = workbook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(stem)
}

fn generate_short_id() -> String {
    let uuid = Uuid::new_v4();
    let hex = format!("{:x}", uuid);
    hex[..8].to_uppercase()
}
