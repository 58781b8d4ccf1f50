//! sheetview - Browser viewer and converter for spreadsheet data

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;

use sheetview::config::{Config, DEFAULT_BASE_NAME};
use sheetview::export::{export_table, ExportFormat};
use sheetview::output::TerminalOutput;
use sheetview::parser::ParserFactory;
use sheetview::server;

/// View spreadsheets in the browser and export them as CSV, Excel or Parquet
#[derive(Parser, Debug)]
#[command(name = "sheetview")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the web viewer (default)
    Serve(ServeArgs),

    /// Convert a file without starting the server
    Convert {
        /// File to read (.xlsx, .xls, .csv, .parquet)
        input: PathBuf,

        /// Target format: csv, excel, xlsx or parquet
        #[arg(long)]
        to: String,

        /// Output path; defaults to <stem>_exported.<ext> next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the first rows of a file
    Preview {
        /// File to read (.xlsx, .xls, .csv, .parquet)
        input: PathBuf,

        /// Maximum number of rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Largest accepted request body, in MiB
    #[arg(long, default_value_t = 64)]
    max_upload_mb: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve(cli.serve)) {
        Command::Serve(args) => {
            let config = Config::new(args.host, args.port).with_max_upload_mb(args.max_upload_mb);
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(server::serve(config))
        }
        Command::Convert { input, to, output } => convert(&input, &to, output),
        Command::Preview { input, limit } => {
            let table = ParserFactory::new()
                .parse_path(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            TerminalOutput::new(limit).render(&table, &input, &mut io::stdout().lock())
        }
    }
}

fn convert(input: &Path, to: &str, output: Option<PathBuf>) -> Result<()> {
    let format: ExportFormat = to.parse()?;

    let table = ParserFactory::new()
        .parse_path(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let source_name = input.file_name().and_then(|n| n.to_str());
    let file = export_table(&table, format, source_name, DEFAULT_BASE_NAME)?;

    let output = output.unwrap_or_else(|| match input.parent() {
        Some(dir) => dir.join(&file.file_name),
        None => PathBuf::from(&file.file_name),
    });

    std::fs::write(&output, &file.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "Wrote {} ({} rows, {} columns)",
        output.display(),
        table.row_count(),
        table.column_count()
    );
    Ok(())
}
