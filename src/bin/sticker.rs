//! sticker: render a character sticker and its print sheet from an asset folder.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sticker_renderer::{
    Catalog, Category, DirectoryHost, FilesystemAssetSource, StickerStudio, StudioConfig,
};

/// Render a sticker and an A4 print sheet from layered character art.
#[derive(Parser, Debug)]
#[command(name = "sticker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Asset folder laid out as <category>/<name>-<id>.png
    #[arg(short, long)]
    assets: PathBuf,

    /// Folder the sticker and print sheet are written to
    #[arg(short, long)]
    out: PathBuf,

    /// Studio configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Select an asset, e.g. `peinado=02` (repeatable)
    #[arg(long = "select", value_parser = parse_assignment)]
    selections: Vec<(Category, String)>,

    /// Tint a category, e.g. `base=#f2c9a0` (repeatable)
    #[arg(long = "tint", value_parser = parse_assignment)]
    tints: Vec<(Category, String)>,

    /// Rows on the print sheet
    #[arg(long)]
    rows: Option<u32>,

    /// Columns on the print sheet
    #[arg(long)]
    columns: Option<u32>,

    /// Width of each outline ring in pixels
    #[arg(long)]
    outline_px: Option<u32>,
}

fn parse_assignment(arg: &str) -> Result<(Category, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected <category>=<value>, got '{}'", arg))?;
    Ok((key.trim().parse()?, value.trim().to_string()))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => StudioConfig::load(path)?,
        None => StudioConfig::default(),
    };
    if let Some(rows) = cli.rows {
        config.sheet.rows = rows;
    }
    if let Some(columns) = cli.columns {
        config.sheet.columns = columns;
    }
    if let Some(outline_px) = cli.outline_px {
        config.outline_px = outline_px;
    }

    let catalog = Catalog::scan_dir(&cli.assets)?;
    log::info!("Found {} assets in {}", catalog.len(), cli.assets.display());

    let mut studio = StickerStudio::new(catalog, config);
    for (category, id) in &cli.selections {
        if !studio.select(*category, id) {
            return Err(format!("no '{}' asset with id '{}'", category, id).into());
        }
    }
    for (category, hex) in &cli.tints {
        studio.set_tint_hex(*category, hex);
    }

    let source = FilesystemAssetSource::new(&cli.assets);
    studio.preview(&source)?;

    let mut host = DirectoryHost::new(&cli.out);
    studio.download_sticker(&mut host)?;
    studio.print_sheet(&mut host)?;

    println!(
        "Wrote {} and {}",
        host.dir().join(&studio.config().download_filename).display(),
        host.print_page_path().display()
    );
    Ok(())
}
