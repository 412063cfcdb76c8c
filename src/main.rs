//! model-raster: inventory icons and model exports from an asset directory

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use model_raster::{
    create_sprite, AssetStore, DumpOutcome, IconDump, ModelExport, RenderConfig, Result,
    SpriteRequest,
};

#[derive(Parser)]
#[command(name = "model-raster")]
#[command(about = "Render item icons and export models from a legacy asset directory", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Render configuration (RON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Asset directory, overrides the configuration
    #[arg(short, long, global = true)]
    assets: Option<PathBuf>,

    /// Suppress progress output (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one item icon to a PNG
    Icon {
        item: u32,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = "1")]
        quantity: i32,

        /// Outline level (0-2), defaults to the configuration
        #[arg(long)]
        border: Option<u8>,

        /// Shadow color as hex RGB, defaults to the configuration
        #[arg(long, value_parser = parse_hex)]
        shadow: Option<u32>,
    },
    /// Export a model as OBJ/MTL plus a catalogue entry
    Export {
        model: u32,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Catalogue name
        #[arg(long, default_value = "model")]
        name: String,

        /// Footprint in tiles
        #[arg(long, default_value = "1")]
        size: i32,
    },
    /// Render every item icon in an id range
    Batch {
        #[arg(long, default_value = "0")]
        first: u32,

        #[arg(long, default_value_t = u32::MAX)]
        last: u32,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_hex(s: &str) -> std::result::Result<u32, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches('#');
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid color {:?}: {}", s, e))
}

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    if let Some(assets) = cli.assets {
        config.asset_dir = assets;
    }
    let store = AssetStore::open(&config.asset_dir, config.brightness)?;

    match cli.command {
        Commands::Icon {
            item,
            output,
            quantity,
            border,
            shadow,
        } => {
            let request = SpriteRequest::new(item)
                .quantity(quantity)
                .border(border.unwrap_or(config.border))
                .shadow(shadow.unwrap_or(config.shadow));
            match create_sprite(&store, &request)? {
                Some(sprite) => {
                    sprite.to_image().save(&output)?;
                    info!("wrote {}", output.display());
                }
                None => warn!("item {} is too large to draw, nothing written", item),
            }
            Ok(())
        }
        Commands::Export {
            model,
            output,
            name,
            size,
        } => export_model(&store, model, &output, &name, size),
        Commands::Batch {
            first,
            last,
            output,
        } => dump_icons(&store, &config, first, last, &output, cli.quiet),
    }
}

fn export_model(store: &AssetStore, id: u32, output: &Path, name: &str, size: i32) -> Result<()> {
    let Some(mesh) = store.load_model(id)? else {
        warn!("model {} not found", id);
        return Ok(());
    };
    let export = ModelExport::new(id, &mesh, store)?;
    fs::create_dir_all(output)?;

    let mtl_name = format!("{}.mtl", id);
    let mut obj = BufWriter::new(File::create(output.join(format!("{}.obj", id)))?);
    export.write_obj(&mut obj, &mtl_name)?;
    obj.flush()?;

    let mut mtl = BufWriter::new(File::create(output.join(&mtl_name))?);
    export.write_mtl(&mut mtl)?;
    mtl.flush()?;

    let entry = export.catalog_entry(name, [size, size]);
    fs::write(output.join(format!("{}.ron", id)), ron::to_string(&entry)?)?;

    info!(
        "exported model {} ({} faces, height {}, {} colors)",
        id,
        mesh.face_count(),
        entry.size[2],
        entry.colors.len()
    );
    Ok(())
}

fn dump_icons(
    store: &AssetStore,
    config: &RenderConfig,
    first: u32,
    last: u32,
    output: &Path,
    quiet: bool,
) -> Result<()> {
    let ids: Vec<u32> = store
        .item_ids()?
        .into_iter()
        .filter(|id| (first..=last).contains(id))
        .collect();
    fs::create_dir_all(output)?;
    let mut index = BufWriter::new(File::create(output.join("item-names"))?);

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(ids.len() as u64)
    };
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut dump = IconDump::new(config.batch_border, config.batch_shadow);
    let (mut written, mut skipped) = (0usize, 0usize);

    for id in ids {
        progress.inc(1);
        let icons = match dump.dump_item(store, id) {
            Ok(icons) => icons,
            Err(e) => {
                progress.suspend(|| warn!("item {}: {}", id, e));
                skipped += 1;
                continue;
            }
        };

        for icon in icons {
            match icon.outcome {
                DumpOutcome::Written(sprite) => {
                    sprite.to_image().save(output.join(format!("{}.png", icon.id)))?;
                    writeln!(index, "{}={}", icon.name, icon.id)?;
                    written += 1;
                    progress.set_message(icon.name);
                }
                DumpOutcome::Duplicate => {}
                DumpOutcome::TooLarge => skipped += 1,
                DumpOutcome::Failed(e) => {
                    progress.suspend(|| warn!("item {}: {}", icon.id, e));
                    skipped += 1;
                }
            }
        }
    }

    index.flush()?;
    progress.finish_and_clear();
    info!("wrote {} icons to {} ({} skipped)", written, output.display(), skipped);
    Ok(())
}
