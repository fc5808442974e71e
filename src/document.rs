//! Beamline-agnostic traversal of a loaded NeXus file.
//!
//! These conventions assume one `NXentry` holding one `NXinstrument` holding
//! one `NXdetector`, and raise if the file breaks that assumption. Anything
//! that needs instrument knowledge lives in [`crate::beamline`].

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::NxError;
use crate::nexus::{NxGroup, NxTree};

/// Physical quantity plotted along a default axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    /// Momentum transfer.
    Q,
    /// Sample angle theta.
    Th,
    /// Detector angle two-theta.
    Tth,
}

impl AxisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AxisType::Q => "q",
            AxisType::Th => "th",
            AxisType::Tth => "tth",
        }
    }
}

impl fmt::Display for AxisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only accessors over a loaded NeXus tree.
///
/// Accessors are recomputed on every call; callers that need a value many
/// times should keep it.
pub trait MetadataDocument {
    /// The loaded tree.
    fn tree(&self) -> &NxTree;

    /// Where the file was loaded from on this machine.
    fn local_path(&self) -> &Path;

    /// Classifies the default axis. Every beamline supplies its own mapping.
    fn default_axis_type(&self) -> Result<AxisType, NxError>;

    /// The file name recorded when the file was written.
    fn src_path(&self) -> Option<&str> {
        self.tree().file_name.as_deref()
    }

    /// The single `NXentry` under the root.
    fn entry(&self) -> Result<&NxGroup, NxError> {
        self.tree().root.only_group_of_class("NXentry")
    }

    /// The single `NXinstrument` in the entry.
    fn instrument(&self) -> Result<&NxGroup, NxError> {
        self.entry()?.only_group_of_class("NXinstrument")
    }

    /// The single `NXdetector` in the instrument.
    fn detector(&self) -> Result<&NxGroup, NxError> {
        self.instrument()?.only_group_of_class("NXdetector")
    }

    /// Name of the entry's default plottable data group (`@default`).
    fn default_dataset_name(&self) -> Result<&str, NxError> {
        self.entry()?.attr_text("default")
    }

    /// The group named by [`default_dataset_name`](Self::default_dataset_name).
    fn default_dataset(&self) -> Result<&NxGroup, NxError> {
        let name = self.default_dataset_name()?;
        self.entry()?.group(name)
    }

    /// Name of the default dataset's signal (`@signal`).
    fn default_signal_name(&self) -> Result<&str, NxError> {
        self.default_dataset()?.attr_text("signal")
    }

    /// The default signal's values.
    fn default_signal(&self) -> Result<Vec<f64>, NxError> {
        let name = self.default_signal_name()?;
        self.default_dataset()?.field(name)?.to_f64_vec()
    }

    /// Name of the default axis (`@axes`, first entry if it is a list).
    fn default_axis_name(&self) -> Result<&str, NxError> {
        self.default_dataset()?.attr_text("axes")
    }

    /// The default axis values.
    fn default_axis(&self) -> Result<Vec<f64>, NxError> {
        let name = self.default_axis_name()?;
        self.default_dataset()?.field(name)?.to_f64_vec()
    }
}
