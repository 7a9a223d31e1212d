//! petmap CLI - PET trade balance map
//!
//! ```bash
//! petmap serve                              # HTTP API + dashboard (port 3000)
//! petmap load                               # Load report and country list
//! petmap countries                          # Selectable reporting countries
//! petmap aggregate -c Austria -c Slovenia   # Per-partner aggregates as JSON
//! petmap render -c Austria -o map.html      # Standalone map page
//! ```
//!
//! The data file and sheet come from `PETMAP_DATA` / `PETMAP_SHEET` (or
//! `.env`) unless `--data` / `--sheet` are given.

use clap::{Args, Parser, Subcommand};
use petmap::render::render_html;
use petmap::{loader, AppConfig, Dataset, Direction, MapView};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "petmap")]
#[command(about = "Map PET trade balances per partner country", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Trade statistics file (.xlsx or .csv)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Worksheet holding the records
    #[arg(short, long)]
    sheet: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        #[command(flatten)]
        source: SourceArgs,

        /// Built frontend to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Load the dataset and print the load report
    Load {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List reporting countries, one per line
    Countries {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Aggregate trade per partner and output JSON
    Aggregate {
        /// Reporting country (repeatable)
        #[arg(short = 'c', long = "country")]
        countries: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the trade balance map as a standalone HTML page
    Render {
        /// Reporting country (repeatable)
        #[arg(short = 'c', long = "country")]
        countries: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,

        /// Output HTML file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let result = match Cli::parse().command {
        Commands::Serve {
            port,
            source,
            static_dir,
        } => cmd_serve(port, source, static_dir).await,

        Commands::Load { source } => cmd_load(source),

        Commands::Countries { source } => cmd_countries(source),

        Commands::Aggregate {
            countries,
            source,
            output,
        } => cmd_aggregate(&countries, source, output.as_deref()),

        Commands::Render {
            countries,
            source,
            output,
        } => cmd_render(&countries, source, &output),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn config(source: SourceArgs) -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::from_env()?.with_overrides(source.data, source.sheet, None, None))
}

fn load_dataset(source: SourceArgs) -> Result<Dataset, Box<dyn std::error::Error>> {
    let config = config(source)?;
    Ok(loader::load(&config.data_source())?)
}

async fn cmd_serve(
    port: Option<u16>,
    source: SourceArgs,
    static_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?.with_overrides(source.data, source.sheet, port, static_dir);
    petmap::server::start_server(config).await
}

fn cmd_load(source: SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_dataset(source)?;
    let report = dataset.report();

    eprintln!("📄 Source: {}", report.source.display());
    if let Some(ref sheet) = report.sheet {
        eprintln!("   Sheet: {}", sheet);
    }
    if let Some(ref encoding) = report.encoding {
        eprintln!("   Encoding: {}", encoding);
    }
    if let Some(ref delimiter) = report.delimiter {
        eprintln!("   Delimiter: '{}'", format_delimiter(delimiter));
    }
    eprintln!("   Rows read: {}", report.rows_read);
    eprintln!("   Rows kept: {}", report.rows_kept);
    eprintln!("   Rows dropped: {}", report.rows_dropped);
    eprintln!("\n🌍 {} reporting countries:", dataset.countries().len());
    for country in dataset.countries() {
        eprintln!("   {}", country);
    }

    Ok(())
}

fn cmd_countries(source: SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_dataset(source)?;
    for country in dataset.countries() {
        println!("{}", country);
    }
    Ok(())
}

fn cmd_aggregate(
    countries: &[String],
    source: SourceArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_dataset(source)?;

    let map = match petmap::build_map(&dataset, countries)? {
        MapView::AwaitingSelection { prompt, .. } => {
            eprintln!("{}", prompt);
            return Ok(());
        }
        MapView::Ready(map) => map,
    };

    eprintln!("\n📊 {} partner aggregates", map.aggregates.len());
    for direction in [Direction::ExportSurplus, Direction::ImportSurplus, Direction::Balanced] {
        let count = map.aggregates.iter().filter(|a| a.direction == direction).count();
        eprintln!("   {}: {}", direction.label(), count);
    }
    let json = serde_json::to_string_pretty(&map.aggregates)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_render(
    countries: &[String],
    source: SourceArgs,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_dataset(source)?;

    let map = match petmap::build_map(&dataset, countries)? {
        MapView::AwaitingSelection { prompt, .. } => {
            eprintln!("{}", prompt);
            return Ok(());
        }
        MapView::Ready(map) => map,
    };

    let html = render_html(&map.figure())?;
    fs::write(output, html)?;
    eprintln!("🗺️  {}", map.title);
    eprintln!("   {} partners plotted, {} without coordinates", map.points.len(), map.unplotted.len());
    eprintln!("   💾 Saved to: {}", output.display());

    Ok(())
}

fn format_delimiter(d: &str) -> &str {
    match d {
        "\t" => "\\t",
        other => other,
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("   💾 Saved to: {}", p.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
