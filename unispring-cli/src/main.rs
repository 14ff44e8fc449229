//! CLI for uniformizing sound-corpus layouts.
//!
//! Provides:
//! - `layout`: relax a corpus described by a session file, write the layout
//! - `region`: inspect a polygon or circle region

mod session;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use unispring_core::{
    append_layout, parse_log_level, BoundingBox, Corpus, ExportMessage, ExportSink, MatrixExport, Region, R2,
};

use session::{LayoutOutput, Session};

const BUILD_SHA: &str = env!("UNISPRING_BUILD_SHA");

#[derive(Parser)]
#[command(name = "unispring")]
#[command(about = "Density-aware spring relaxation of sound-corpus layouts", long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relax the corpus described by a session file
    Layout {
        /// Session file (JSON): track, region, corpus, relax, attractors
        #[arg(short, long)]
        session: PathBuf,

        /// Output file for the layout (JSON); stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print periodic export messages as JSON lines on stdout
        #[arg(long)]
        stream: bool,
    },

    /// Print area, bounding box and inscribed square of a region
    Region {
        /// Polygon vertices: x0,y0,x1,y1,...
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, conflicts_with = "circle")]
        vertices: Option<Vec<f64>>,

        /// Border samples per unit length
        #[arg(long, default_value = "50")]
        density: f64,

        /// Circle: cx,cy,r
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        circle: Option<Vec<f64>>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegionInfo {
    area: f64,
    bounding_box: BoundingBox,
    barycenter: R2<f64>,
    inscribed_side: f64,
    inscribed_origin: R2<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    border_samples: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(level) = cli.log_level.as_deref() {
        builder.filter_level(parse_log_level(Some(level)).map_err(anyhow::Error::msg)?);
    }
    builder.init();

    match cli.command {
        Commands::Layout { session, output, stream } => layout(session, output, stream),
        Commands::Region { vertices, density, circle } => region(vertices, density, circle),
    }
}

fn layout(path: PathBuf, output: Option<PathBuf>, stream: bool) -> Result<()> {
    let session = Session::load(&path)?;
    let region = session.region.build().context("building region")?;
    let mut corpus = Corpus::new(&session.track, region, &session.corpus).context("building corpus")?;

    let mut print = |message: ExportMessage| match serde_json::to_string(&message) {
        Ok(line) => println!("{}", line),
        Err(e) => log::warn!("dropping {} message: {}", message.address(), e),
    };
    let mut export = MatrixExport::new(&mut print);
    let sink: Option<&mut dyn ExportSink> = if stream { Some(&mut export) } else { None };
    let relaxation = corpus.unispring(&session.relax, sink).context("relaxing corpus")?;
    info!("{:?} after {} steps", relaxation.exit, relaxation.steps);

    let attract = session.attractors.as_ref().map(|config| corpus.attract(config));
    if stream {
        corpus.export(&mut export);
    }

    let track = append_layout(&session.track, &corpus)?;
    let result = LayoutOutput::new(BUILD_SHA, &relaxation, attract, &corpus, track)?;
    let json = serde_json::to_string_pretty(&result)?;
    match output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote layout to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn region(vertices: Option<Vec<f64>>, density: f64, circle: Option<Vec<f64>>) -> Result<()> {
    let region: Region = match (vertices, circle) {
        (Some(coords), None) => {
            if coords.len() % 2 != 0 {
                bail!("--vertices needs an even number of coordinates, got {}", coords.len());
            }
            let vertices = coords.chunks(2).map(|c| R2::new(c[0], c[1])).collect();
            unispring_core::PolygonRegion::new(vertices, density)?.into()
        }
        (None, Some(c)) => {
            let [cx, cy, r] = c[..] else {
                bail!("--circle takes cx,cy,r, got {} values", c.len());
            };
            Region::circle(R2::new(cx, cy), r)?
        }
        _ => bail!("pass exactly one of --vertices or --circle"),
    };
    let (inscribed_side, inscribed_origin) = region.inscribed_square();
    let info = RegionInfo {
        area: region.area().abs(),
        bounding_box: region.bounding_box(),
        barycenter: region.barycenter(),
        inscribed_side,
        inscribed_origin,
        border_samples: match &region {
            Region::Polygon(p) => Some(p.samples().len()),
            Region::Circle(_) => None,
        },
    };
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
