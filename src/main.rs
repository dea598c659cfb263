use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, error, info, warn};

use docx_grid::{inspect, GridConfig, UploadBatch, DEFAULT_FILENAME};

#[derive(Parser)]
#[command(name = "docx-grid")]
#[command(author, version, about = "Lay images out as a captioned grid in a Word document")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a grid document from images
    Build(BuildArgs),
    /// Print the table layout of a grid document
    Inspect {
        /// Document to read
        file: PathBuf,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Images to place, in reading order
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Output document
    #[arg(short, long, default_value = DEFAULT_FILENAME)]
    output: PathBuf,

    /// Caption for the next image (repeatable); defaults to "Image N"
    #[arg(short, long = "caption")]
    captions: Vec<String>,

    /// Number of grid columns
    #[arg(long, env = "GRID_COLUMNS", allow_negative_numbers = true)]
    columns: Option<i64>,

    /// Reference width used for the aspect ratio
    #[arg(long, env = "GRID_WIDTH", allow_negative_numbers = true)]
    width: Option<i64>,

    /// Reference height used for the aspect ratio
    #[arg(long, env = "GRID_HEIGHT", allow_negative_numbers = true)]
    height: Option<i64>,

    /// TOML file with `columns`, `target_width` and `target_height`
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build(args) => run_build(args),
        Command::Inspect { file } => run_inspect(&file),
    };

    if let Err(e) = &result {
        error!("Failed: {:?}", e);
    }
    result
}

fn resolve_config(args: &BuildArgs) -> Result<GridConfig> {
    let base = match &args.config {
        Some(path) => GridConfig::from_toml_file(path)?,
        None => GridConfig::default(),
    };
    debug!("Base config: {:?}", base);

    let config = GridConfig::new(
        args.columns.unwrap_or_else(|| base.columns.into()),
        args.width.unwrap_or_else(|| base.target_width.into()),
        args.height.unwrap_or_else(|| base.target_height.into()),
    )?;
    Ok(config)
}

fn run_build(args: BuildArgs) -> Result<()> {
    let config = resolve_config(&args).context("Invalid grid configuration")?;
    info!(
        "Building {}-column grid from {} images into {}",
        config.columns,
        args.images.len(),
        args.output.display()
    );

    let mut batch = UploadBatch::from_paths(args.images.iter().cloned())?;
    batch.apply_captions(args.captions.iter().cloned());
    debug!("Captions: {:?}", batch.captions());

    let doc = batch
        .generate(config)
        .context("Error generating Word document")?;
    for failure in &doc.report().failed {
        warn!(
            "Row {}, column {}: {}",
            failure.row + 1,
            failure.column + 1,
            failure.error
        );
    }

    doc.write_to(&args.output)
        .with_context(|| format!("Failed to save document: {}", args.output.display()))?;
    info!(
        "Document saved successfully. File size: {} bytes",
        doc.len()
    );
    Ok(())
}

fn run_inspect(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to open DOCX file: {}", file.display()))?;
    let summary = inspect(&bytes)
        .with_context(|| format!("Failed to inspect DOCX file: {}", file.display()))?;

    for (row, table) in summary.tables.iter().enumerate() {
        println!("row {}:", row + 1);
        for (column, cell) in table.cells.iter().enumerate() {
            let label = match (cell.drawings(), cell.has_error_marker()) {
                (_, true) => "error",
                (0, false) if cell.is_blank() => "blank",
                (0, false) => "text",
                _ => "image",
            };
            println!("  [{}] {:<5} {}", column + 1, label, cell.text());
        }
    }
    println!(
        "{} rows, {} cells",
        summary.tables.len(),
        summary.cells().count()
    );
    Ok(())
}
