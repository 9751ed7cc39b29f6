use thiserror::Error;

/// Errors raised while loading geometry or parsing command-line values.
///
/// None of these reach the interactive user: a failed geometry load only
/// leaves the base map empty.
#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid geojson: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("malformed topology: {0}")]
    Topology(String),

    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error("unknown visa category: {0}")]
    UnknownCategory(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
