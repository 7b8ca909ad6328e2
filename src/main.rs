// src/main.rs
mod api;
mod extractors;
mod report;
mod storage;
mod utils;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use api::models::{DEFAULT_API_URL, DEFAULT_COLUMNS, DEFAULT_DELAY_MS, DEFAULT_PER_PAGE};
use api::HttpPageSource;
use extractors::render_blocks;
use report::{IdStrategy, ReportFormat};
use storage::ExportMetadata;
use utils::text::Encoding;
use utils::AppError;

/// Command Line Interface for the proxy-voting report extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a report into one row per proposal, joined with its company header
    Parse(ParseArgs),
    /// Save the raw proposal tables of a report to a text file
    Blocks(BlocksArgs),
    /// Page through a JSON API and dump every record to JSON and CSV
    Dump(DumpArgs),
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Report layout of the input file
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Npx)]
    format: ReportFormat,

    /// Report text file to parse
    #[arg(short, long)]
    input: PathBuf,

    /// Output file; `.json` writes a JSON array, anything else CSV
    #[arg(short, long)]
    output: PathBuf,

    /// How npx proposal tables are matched to company headers
    #[arg(long, value_enum, default_value_t = IdStrategy::Anchored)]
    ids: IdStrategy,

    /// Input encoding (default: latin1 for npx, utf8 for tabular)
    #[arg(long, value_enum)]
    encoding: Option<Encoding>,

    /// Also save the isolated proposal tables to this file
    #[arg(long)]
    blocks_out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BlocksArgs {
    /// Report layout of the input file
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Npx)]
    format: ReportFormat,

    /// Report text file to read
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the proposal tables
    #[arg(short, long, default_value = "proposals.txt")]
    output: PathBuf,

    /// Input encoding (default: latin1 for npx, utf8 for tabular)
    #[arg(long, value_enum)]
    encoding: Option<Encoding>,
}

#[derive(Args, Debug)]
struct DumpArgs {
    /// Endpoint returning a JSON array per page
    #[arg(long, default_value = DEFAULT_API_URL)]
    url: String,

    /// Records requested per page
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    per_page: u32,

    /// Pause between page requests, in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    delay_ms: u64,

    /// Raw records, pretty-printed
    #[arg(long, default_value = "all_breweries_data.json")]
    json_out: PathBuf,

    /// Flattened records restricted to --columns
    #[arg(long, default_value = "all_breweries_data.csv")]
    csv_out: PathBuf,

    /// Comma-separated CSV columns (default: the brewery directory fields)
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let cli = Cli::parse();
    tracing::debug!("Starting processing for args: {:?}", cli);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Blocks(args) => run_blocks(args),
        Command::Dump(args) => run_dump(args).await,
    };

    // Failures are reported, never turned into a crash or an exit code
    match result {
        Ok(()) => {}
        Err(e @ AppError::EmptyJoinInput { .. }) => tracing::warn!("{}. Skipping save.", e),
        Err(e) => tracing::error!("{}", e),
    }
}

fn run_parse(args: ParseArgs) -> Result<(), AppError> {
    let layout = args.format.layout();
    let encoding = args.encoding.unwrap_or(layout.default_encoding);
    tracing::info!("--- Starting {} parser for {} ---", args.format.name(), args.input.display());

    let content = storage::read_input(&args.input, encoding)?;

    if let Some(blocks_out) = &args.blocks_out {
        let blocks = report::table_blocks(&content, args.format);
        storage::save_text(blocks_out, &render_blocks(blocks))?;
    }

    let parsed = report::parse_report(&content, args.format, args.ids);

    let rows = report::left_join(&parsed.headers, &parsed.proposals).ok_or_else(|| {
        AppError::EmptyJoinInput {
            output: args.output.display().to_string(),
            headers: parsed.headers.len(),
            proposals: parsed.proposals.len(),
        }
    })?;

    storage::save_table(&args.output, layout, &rows)?;

    let metadata = ExportMetadata {
        format: args.format.name().to_string(),
        input: args.input.display().to_string(),
        output: args.output.display().to_string(),
        headers: parsed.headers.len(),
        skipped_headers: parsed.skipped_headers,
        tables: parsed.blocks,
        proposals: parsed.proposals.len(),
        rows: rows.len(),
        extraction_timestamp: chrono::Utc::now().to_rfc3339(),
    };
    match storage::save_metadata(&args.output, &metadata) {
        Ok(path) => tracing::info!("Saved export metadata to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save export metadata: {}", e),
    }

    tracing::info!("Success! Merged report saved to '{}'", args.output.display());
    Ok(())
}

fn run_blocks(args: BlocksArgs) -> Result<(), AppError> {
    let encoding = args.encoding.unwrap_or(args.format.layout().default_encoding);
    let content = storage::read_input(&args.input, encoding)?;

    let blocks = report::table_blocks(&content, args.format);
    if blocks.is_empty() {
        tracing::warn!("No proposal tables found in {}", args.input.display());
    }

    storage::save_text(&args.output, &render_blocks(blocks))?;
    tracing::info!("Proposal tables extracted to '{}'", args.output.display());
    Ok(())
}

async fn run_dump(args: DumpArgs) -> Result<(), AppError> {
    if args.per_page == 0 {
        return Err(AppError::Config("--per-page must be at least 1".to_string()));
    }
    tracing::info!("--- Starting Data Extraction from {} ---", args.url);

    let source = HttpPageSource::new(&args.url, args.per_page, args.insecure)?;
    let dump = api::fetch_all(&source, Duration::from_millis(args.delay_ms)).await;

    if let Some(e) = &dump.halted {
        tracing::warn!("Extraction halted early ({}); keeping {} records already fetched", e, dump.records.len());
    }

    if dump.records.is_empty() {
        tracing::warn!("No data was extracted. Please check the API status or your network connection.");
        return Ok(());
    }
    tracing::info!(
        "--- Extraction Complete --- Total records extracted: {} ({} pages)",
        dump.records.len(),
        dump.pages
    );

    // The JSON copy is best-effort; the CSV is still attempted
    if let Err(e) = storage::save_json(&args.json_out, &dump.records) {
        tracing::error!("Error saving JSON file: {}", e);
    }

    let flat: Vec<_> = dump.records.iter().map(api::flatten_record).collect();
    let wanted = args
        .columns
        .unwrap_or_else(|| DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect());
    let columns = api::present_columns(&wanted, &flat);
    storage::save_records_csv(&args.csv_out, &columns, &flat)?;

    Ok(())
}
