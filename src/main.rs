use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use tracing::{info, warn};

use kanji_grid::attributes::{self, AttributeMap};
use kanji_grid::settings::Settings;
use kanji_grid::{archive, fetch, irg, pipeline, render, supplementary};
use kanji_grid::{Page, PipelineConfig, SourceKind};

#[derive(Parser)]
#[command(name = "kanji_grid", about = "Printable radical/stroke index of CJK characters")]
struct Cli {
    /// Settings file (default: ./kanji_grid.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Cells per row
    #[arg(long, global = true)]
    columns: Option<usize>,
    /// Rows per page
    #[arg(long, global = true)]
    rows: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Inputs {
    /// Local Unihan.zip instead of downloading it
    #[arg(long)]
    unihan: Option<PathBuf>,
    /// IRG attribute store (JSON)
    #[arg(long)]
    attributes: Option<PathBuf>,
    /// Supplementary table (TSV) replacing the built-in one
    #[arg(long)]
    table: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and write it as HTML (plus JSON when configured)
    Build {
        #[command(flatten)]
        inputs: Inputs,
        /// HTML output path
        #[arg(long)]
        html: Option<PathBuf>,
        /// Also dump the pages as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Scrape the IRG working-set list into the attribute store
    Attributes {
        /// Where to write the store (default: attributes_path)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Download the GlyphWiki font files the index refers to
    Fonts {
        #[command(flatten)]
        inputs: Inputs,
        /// Target directory (default: font_dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(columns) = cli.columns {
        settings.columns = columns;
    }
    if let Some(rows) = cli.rows {
        settings.rows = rows;
    }
    let config = settings.pipeline()?;
    let client = fetch::client(Duration::from_secs(settings.timeout_secs))?;

    let result = match cli.command {
        Commands::Build { inputs, html, json } => {
            let pages = build_pages(&settings, &config, &inputs, &client).await?;
            print_summary(&pages);

            let html_path = html.unwrap_or_else(|| settings.html_path.clone());
            write_output(&html_path, &render::render_html(&pages, config.columns))?;
            println!("Wrote {}", html_path.display());

            if let Some(json_path) = json.or_else(|| settings.json_path.clone()) {
                let dump = render::to_json(&pages).context("Failed to serialize pages")?;
                write_output(&json_path, &dump)?;
                println!("Wrote {}", json_path.display());
            }
            Ok(())
        }
        Commands::Attributes { out } => {
            let scraped = match fetch::fetch_text(&client, &settings.irg_list_url).await {
                Ok(html) => irg::parse_list_page(&html),
                Err(e) => {
                    warn!("{}; the store will be filled with unknown entries", e);
                    AttributeMap::new()
                }
            };
            let store = attributes::consolidate(scraped, config.generated_count);
            let unknown = attributes::count_unknown(&store);

            let path = out.unwrap_or_else(|| settings.attributes_path.clone());
            attributes::save(&path, &store)?;
            println!(
                "Saved {} entries to {} ({} without radical, bucket {})",
                store.len(),
                path.display(),
                unknown,
                attributes::UNKNOWN_RADICAL
            );
            Ok(())
        }
        Commands::Fonts { inputs, dir } => {
            let pages = build_pages(&settings, &config, &inputs, &client).await?;
            let files: Vec<String> = render::font_faces(&pages)
                .into_iter()
                .map(|f| f.file.clone())
                .unique()
                .collect();
            let dir = dir.unwrap_or_else(|| settings.font_dir.clone());
            println!("Fetching {} font files into {}...", files.len(), dir.display());

            let stats = fetch::download_fonts(
                &client,
                &settings.glyph_base_url,
                &dir,
                files,
                settings.fetch_concurrency,
            )
            .await?;
            println!(
                "Done: {} fonts ({} downloaded, {} present, {} missing, {} errors).",
                stats.total, stats.downloaded, stats.existing, stats.missing, stats.errors
            );
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn build_pages(
    settings: &Settings,
    config: &PipelineConfig,
    inputs: &Inputs,
    client: &reqwest::Client,
) -> Result<Vec<Page>> {
    let zip_bytes = match &inputs.unihan {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => fetch::fetch_bytes(client, &settings.unihan_url)
            .await
            .context("Failed to download Unihan")?,
    };
    let entries = archive::read_entries(&zip_bytes)?;
    info!(entries = entries.len(), "Unihan entries loaded");

    let store_path = inputs
        .attributes
        .as_deref()
        .unwrap_or(settings.attributes_path.as_path());
    let resolver = attributes::load_or_absent(store_path);

    let table = match &inputs.table {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            supplementary::parse_table(&text)?
        }
        None => supplementary::default_table()?,
    };

    Ok(pipeline::run(&entries, table, &resolver, config))
}

fn print_summary(pages: &[Page]) {
    let counts = pages
        .iter()
        .flat_map(|p| &p.cells)
        .counts_by(|c| c.record.source_kind());
    let total: usize = counts.values().sum();

    for kind in [
        SourceKind::NativeUnicode,
        SourceKind::CustomUnicodeRange,
        SourceKind::Supplementary,
    ] {
        println!(
            "{:<22} {:>7}",
            kind.as_str(),
            counts.get(&kind).copied().unwrap_or(0)
        );
    }
    println!("{:<22} {:>7}", "total", total);
    println!("{:<22} {:>7}", "pages", pages.len());
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
