//! Verenigingenkaart Friesland - club dataset explorer
//!
//! Command-line front end for the pipeline: pick a dataset (upload or demo),
//! filter it, print the run summary and optionally export the filtered CSV.

use anyhow::Context;
use clap::Parser;
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

use verenigingenkaart::data::{FilterCriteria, FilterEngine};
use verenigingenkaart::export::CsvExporter;
use verenigingenkaart::geo::{normalize_postcode, GeoIndex, DEFAULT_GEOINDEX_PATH};
use verenigingenkaart::pipeline::{DataSource, Pipeline, RunOutput};

#[derive(Parser)]
#[command(name = "verenigingenkaart")]
#[command(about = "Sports-club explorer for Friesland: load, geocode, filter, export")]
#[command(version)]
struct Cli {
    /// Input dataset (.csv, .xlsx, .xls or .ods)
    input: Option<PathBuf>,

    /// Use the bundled demo dataset instead of an input file
    #[arg(long)]
    demo: bool,

    /// Postal-centroid table (CSV with pc4,latitude,longitude header)
    #[arg(long, default_value = DEFAULT_GEOINDEX_PATH)]
    geoindex: PathBuf,

    /// Keep only these municipalities (repeatable; default: all)
    #[arg(long = "gemeente")]
    gemeenten: Vec<String>,

    /// Keep only these sports (repeatable; default: all)
    #[arg(long = "sport")]
    sporten: Vec<String>,

    /// Case-insensitive search over Vereniging, plaats and postcode
    #[arg(long)]
    query: Option<String>,

    /// Write the filtered table as CSV into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// List the available gemeente and sport facet values
    #[arg(long)]
    facets: bool,

    /// Show the first N filtered rows
    #[arg(long, value_name = "N")]
    preview: Option<usize>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let source = match (&cli.input, cli.demo) {
        (Some(path), false) => DataSource::Upload(path.clone()),
        (None, true) => DataSource::Demo,
        (Some(_), true) => anyhow::bail!("Pass either an input file or --demo, not both"),
        (None, false) => anyhow::bail!("Pass an input file or use --demo"),
    };

    let index = GeoIndex::from_csv(&cli.geoindex)
        .with_context(|| format!("loading geo index from {}", cli.geoindex.display()))?;

    let criteria = FilterCriteria {
        municipalities: cli.gemeenten.iter().cloned().collect::<BTreeSet<_>>(),
        sports: cli.sporten.iter().cloned().collect::<BTreeSet<_>>(),
        query: cli.query.clone().unwrap_or_default(),
    };

    let mut pipeline = Pipeline::new(index);
    let output = pipeline.run(&source, &criteria)?;

    if cli.facets {
        print_facets(&output)?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output.summary)?);
    } else {
        let s = &output.summary;
        println!(
            "Totaal: {}  |  Gefilterd: {}  |  Met coördinaten: {}  |  Binnen Friesland: {}",
            s.total_rows, s.filtered_rows, s.geocoded_rows, s.in_friesland_rows
        );
    }

    if let Some(limit) = cli.preview {
        print_preview(&output.filtered, limit)?;
    }

    if let Some(dir) = &cli.export_dir {
        let path = CsvExporter::write(&output.filtered, dir)?;
        println!("Export: {}", path.display());
    }

    Ok(())
}

fn print_facets(output: &RunOutput) -> anyhow::Result<()> {
    let gemeenten = FilterEngine::unique_facet_values(&output.enriched, "gemeente")?;
    let sporten = FilterEngine::unique_facet_values(&output.enriched, "sport")?;
    println!("Gemeenten: {}", gemeenten.join(", "));
    println!("Sporten: {}", sporten.join(", "));
    Ok(())
}

/// One line per club, in the layout of the map popup.
fn print_preview(df: &DataFrame, limit: usize) -> anyhow::Result<()> {
    let names = df.column("Vereniging")?.str()?;
    let addresses = df.column("adres")?.str()?;
    let postcodes = df.column("postcode")?.str()?;
    let places = df.column("plaats")?.str()?;
    let gemeenten = df.column("gemeente")?.str()?;
    let sports = df.column("sport")?.str()?;
    let bonden = df.column("bond")?.str()?;
    let lats = df.column("lat")?.f64()?;
    let lngs = df.column("lng")?.f64()?;

    for i in 0..df.height().min(limit) {
        let coords = match (lats.get(i), lngs.get(i)) {
            (Some(lat), Some(lng)) => format!("[{:.3}, {:.3}]", lat, lng),
            _ => "[geen coördinaten]".to_string(),
        };
        println!(
            "{} — {}, {} {} (gemeente {}, {}, {}) {}",
            names.get(i).unwrap_or("?"),
            addresses.get(i).unwrap_or("?"),
            postcodes.get(i).map(normalize_postcode).unwrap_or_default(),
            places.get(i).unwrap_or("?"),
            gemeenten.get(i).unwrap_or("?"),
            sports.get(i).unwrap_or("?"),
            bonden.get(i).unwrap_or("?"),
            coords
        );
    }
    Ok(())
}
