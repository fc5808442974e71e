use std::path::PathBuf;
use thiserror::Error;

/// The main error type for nxmeta operations.
#[derive(Debug, Error)]
pub enum NxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse NeXus tree JSON from {path}: {source}")]
    TreeParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed node '{path}': {message}")]
    MalformedNode { path: String, message: String },

    #[error("Expected exactly one {class} in '{parent}', found {found}")]
    Cardinality {
        class: &'static str,
        parent: String,
        found: usize,
    },

    #[error("No node named '{name}' in '{parent}'")]
    MissingNode { parent: String, name: String },

    #[error("Node '{node}' has no attribute '{name}'")]
    MissingAttribute { node: String, name: String },

    #[error("Node '{node}' does not hold {expected}")]
    FieldType { node: String, expected: &'static str },

    #[error("Region mapping is missing key '{0}'")]
    MissingKey(&'static str),

    #[error("Region mapping key '{key}' is not an integer: {value}")]
    InvalidRegionValue { key: &'static str, value: String },

    #[error("{what} is not implemented for beamline {beamline}")]
    NotImplemented { beamline: String, what: String },

    #[error(
        "The data file with the name {filename} could not be found. The following paths were searched:\n{}",
        .candidates.join("\n")
    )]
    FileNotFound {
        filename: String,
        candidates: Vec<String>,
    },

    #[error("Failed to parse region-of-interest text: {0}")]
    RoiParse(#[from] serde_json::Error),

    #[error("Unsupported beamline: {0}")]
    UnsupportedBeamline(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),

    #[error("Failed to write JSON report: {0}")]
    ReportWrite(#[source] serde_json::Error),

    #[error("Inspection left {unavailable} field(s) unavailable")]
    InspectFailed { unavailable: usize },
}
