//! Beamline-specific readers built on [`MetadataDocument`].
//!
//! Every beamline names its fields differently. Rather than one type per
//! beamline, a [`NexusFile`] carries a [`Beamline`] tag chosen at load time
//! and dispatches each beamline-specific accessor on it.

pub mod i07;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use serde::Serialize;

use crate::document::{AxisType, MetadataDocument};
use crate::error::NxError;
use crate::nexus::io_json::read_nexus_json;
use crate::nexus::{NxNode, NxTree};
use crate::region::Region;
use crate::resolve::FileResolver;

/// Beamlines with a known file layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Beamline {
    /// I07 at Diamond Light Source (surface and interface diffraction).
    I07,
    /// I10 at Diamond Light Source. Recognised, but no fields are mapped yet.
    I10,
}

impl Beamline {
    pub fn name(&self) -> &'static str {
        match self {
            Beamline::I07 => "I07",
            Beamline::I10 => "I10",
        }
    }

    /// Extension of the detector data files this beamline references.
    pub fn data_file_extension(&self) -> Option<&'static str> {
        match self {
            Beamline::I07 => Some(".h5"),
            Beamline::I10 => None,
        }
    }
}

impl fmt::Display for Beamline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Beamline {
    type Err = NxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "i07" => Ok(Beamline::I07),
            "i10" => Ok(Beamline::I10),
            _ => Err(NxError::UnsupportedBeamline(format!(
                "'{}' (supported: i07, i10)",
                s
            ))),
        }
    }
}

/// Detector model and firmware era that produced a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Detector {
    /// Excalibur with indexed `Region_{i}_*` fields.
    #[serde(rename = "excroi")]
    Excalibur2021,
    /// Excalibur with a single quoted ROI blob (since April 2022).
    #[serde(rename = "exr")]
    Excalibur2022,
}

impl Detector {
    /// The marker name identifying this detector in the file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Detector::Excalibur2021 => i07::EXCALIBUR_2021_MARKER,
            Detector::Excalibur2022 => i07::EXCALIBUR_04_2022_MARKER,
        }
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded NeXus file together with the beamline that wrote it.
#[derive(Clone, Debug)]
pub struct NexusFile {
    local_path: PathBuf,
    tree: NxTree,
    beamline: Beamline,
}

impl NexusFile {
    /// Wraps an already loaded tree.
    pub fn new(local_path: impl Into<PathBuf>, tree: NxTree, beamline: Beamline) -> Self {
        Self {
            local_path: local_path.into(),
            tree,
            beamline,
        }
    }

    /// Loads a NeXus JSON dump from disk.
    pub fn load(path: &Path, beamline: Beamline) -> Result<Self, NxError> {
        let tree = read_nexus_json(path)?;
        debug!("loaded {} as a {} file", path.display(), beamline);
        Ok(Self::new(path, tree, beamline))
    }

    pub fn beamline(&self) -> Beamline {
        self.beamline
    }

    /// Identifies the detector from marker fields in the entry.
    pub fn detector_name(&self) -> Result<Detector, NxError> {
        match self.beamline {
            Beamline::I07 => i07::detector(self),
            Beamline::I10 => Err(self.not_implemented("detector identification")),
        }
    }

    /// Regions of interest holding the signal. Currently always one region.
    pub fn signal_regions(&self) -> Result<Vec<Region>, NxError> {
        match self.beamline {
            Beamline::I07 => i07::signal_regions(self),
            Beamline::I10 => Err(self.not_implemented("signal regions")),
        }
    }

    /// Regions of interest used for background subtraction.
    pub fn background_regions(&self) -> Result<Vec<Region>, NxError> {
        match self.beamline {
            Beamline::I07 => i07::background_regions(self),
            Beamline::I10 => Err(self.not_implemented("background regions")),
        }
    }

    /// Energy of the probe beam.
    pub fn probe_energy(&self) -> Result<f64, NxError> {
        match self.beamline {
            Beamline::I07 => i07::probe_energy(self),
            Beamline::I10 => Err(self.not_implemented("probe energy")),
        }
    }

    /// Fraction of the beam let through by the attenuators.
    pub fn transmission(&self) -> Result<f64, NxError> {
        match self.beamline {
            Beamline::I07 => i07::transmission(self),
            Beamline::I10 => Err(self.not_implemented("transmission")),
        }
    }

    /// Sample to detector distance.
    pub fn detector_distance(&self) -> Result<f64, NxError> {
        match self.beamline {
            Beamline::I07 => i07::detector_distance(self),
            Beamline::I10 => Err(self.not_implemented("detector distance")),
        }
    }

    /// The data file path as recorded at acquisition time.
    ///
    /// There is no standard pointer to external data, so this returns the
    /// first node (depth-first, document order) whose string form ends in the
    /// beamline's data file extension. If several nodes qualify, which one
    /// wins depends only on document order.
    pub fn src_data_path(&self) -> Result<String, NxError> {
        let extension = self
            .beamline
            .data_file_extension()
            .ok_or_else(|| self.not_implemented("data file lookup"))?;

        self.tree
            .root
            .find_first(&mut |node: &NxNode| node.display_string().ends_with(extension))
            .map(NxNode::display_string)
            .ok_or_else(|| NxError::MissingNode {
                parent: "/".to_string(),
                name: format!("*{extension}"),
            })
    }

    /// Finds the data file on this machine, searching around the working
    /// directory and around this file's own location.
    pub fn local_data_path(&self) -> Result<String, NxError> {
        self.local_data_path_with(&[] as &[PathBuf])
    }

    /// Like [`local_data_path`](Self::local_data_path), with extra roots
    /// searched after this file's location.
    pub fn local_data_path_with<R: AsRef<Path>>(
        &self,
        search_roots: &[R],
    ) -> Result<String, NxError> {
        let nominal = self.src_data_path()?;
        let roots: Vec<&Path> = std::iter::once(self.local_path.as_path())
            .chain(search_roots.iter().map(AsRef::<Path>::as_ref))
            .collect();
        FileResolver::from_current_dir(&roots)?.resolve_one(Path::new(&nominal))
    }

    fn not_implemented(&self, what: &str) -> NxError {
        NxError::NotImplemented {
            beamline: self.beamline.to_string(),
            what: what.to_string(),
        }
    }
}

impl MetadataDocument for NexusFile {
    fn tree(&self) -> &NxTree {
        &self.tree
    }

    fn local_path(&self) -> &Path {
        &self.local_path
    }

    fn default_axis_type(&self) -> Result<AxisType, NxError> {
        match self.beamline {
            Beamline::I07 => i07::default_axis_type(self),
            Beamline::I10 => Err(self.not_implemented("default axis type")),
        }
    }
}
