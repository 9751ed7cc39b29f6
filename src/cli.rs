use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::{Region, VisaCategory};
use crate::geometry::{GEO_URL, GeometrySource};

#[derive(Debug, Parser)]
#[command(
    name = "visa-atlas",
    version,
    about = "Visa-free destinations for Chinese passport holders"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Map geometry (TopoJSON or GeoJSON) to download
    #[arg(long, global = true, default_value = GEO_URL)]
    pub geometry_url: String,

    /// Read map geometry from a local file instead of downloading it
    #[arg(long, global = true)]
    pub geometry_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log file for the interactive UI
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the filtered destinations as JSON
    List {
        /// 亚洲 / 非洲 / 欧洲 / 美洲与大洋洲, or asia / africa / europe / americas
        #[arg(long)]
        region: Option<Region>,
        /// mutual / free / voa / eta / other
        #[arg(long)]
        category: Option<VisaCategory>,
        /// Case-insensitive substring of the name
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Render the map to an SVG file
    ExportSvg {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 960.0)]
        width: f64,
        #[arg(long, default_value_t = 600.0)]
        height: f64,
        /// Zoom factor about the centre, clamped to [0.5, 8]
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        pan_x: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        pan_y: f64,
    },
}

impl Cli {
    /// A local file wins over the URL
    pub fn geometry_source(&self) -> GeometrySource {
        match &self.geometry_file {
            Some(path) => GeometrySource::File(path.clone()),
            None => GeometrySource::Url(self.geometry_url.clone()),
        }
    }
}
