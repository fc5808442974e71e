//! Inspect report types and terminal formatting.

use std::fmt;

use serde::Serialize;

use crate::beamline::Detector;
use crate::document::AxisType;
use crate::error::NxError;
use crate::region::Region;

/// The outcome of reading one field.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading<T> {
    /// The field was read successfully.
    Value(T),
    /// The accessor failed; holds the error message.
    Unavailable(String),
}

impl<T> Reading<T> {
    pub fn from_result(result: Result<T, NxError>) -> Self {
        match result {
            Ok(value) => Reading::Value(value),
            Err(err) => Reading::Unavailable(err.to_string()),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Reading::Value(value) => Some(value),
            Reading::Unavailable(_) => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Reading::Unavailable(_))
    }
}

/// The result of inspecting a NeXus file.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    /// Where the file was loaded from.
    pub file: String,
    /// Beamline the file was read as.
    pub beamline: String,
    /// File name recorded when the file was written.
    pub src_path: Option<String>,
    pub default_dataset: Reading<String>,
    pub default_signal: Reading<String>,
    pub default_axis: Reading<String>,
    pub default_axis_type: Reading<AxisType>,
    pub detector: Reading<Detector>,
    pub signal_regions: Reading<Vec<Region>>,
    pub background_regions: Reading<Vec<Region>>,
    pub probe_energy: Reading<f64>,
    pub transmission: Reading<f64>,
    pub detector_distance: Reading<f64>,
    /// Data file path as recorded at acquisition time.
    pub src_data_path: Reading<String>,
    /// Data file path on this machine; `None` when the lookup was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_data_path: Option<Reading<String>>,
}

impl InspectReport {
    /// Number of fields that could not be read.
    pub fn unavailable_count(&self) -> usize {
        [
            self.default_dataset.is_unavailable(),
            self.default_signal.is_unavailable(),
            self.default_axis.is_unavailable(),
            self.default_axis_type.is_unavailable(),
            self.detector.is_unavailable(),
            self.signal_regions.is_unavailable(),
            self.background_regions.is_unavailable(),
            self.probe_energy.is_unavailable(),
            self.transmission.is_unavailable(),
            self.detector_distance.is_unavailable(),
            self.src_data_path.is_unavailable(),
            self.local_data_path
                .as_ref()
                .is_some_and(Reading::is_unavailable),
        ]
        .into_iter()
        .filter(|unavailable| *unavailable)
        .count()
    }

    /// Pretty-printed JSON for programmatic use.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "NeXus file: {}", self.file)?;
        writeln!(f, "Beamline:   {}", self.beamline)?;
        if let Some(src) = &self.src_path {
            writeln!(f, "Written as: {}", src)?;
        }
        writeln!(f)?;

        writeln!(f, "┌─ Default plot ───────────────────────────────────────────")?;
        fmt_line(f, "Dataset", &self.default_dataset)?;
        fmt_line(f, "Signal", &self.default_signal)?;
        fmt_line(f, "Axis", &self.default_axis)?;
        fmt_line(f, "Axis type", &self.default_axis_type)?;
        writeln!(f)?;

        writeln!(f, "┌─ Detector ───────────────────────────────────────────────")?;
        fmt_line(f, "Detector", &self.detector)?;
        fmt_regions(f, "Signal regions", &self.signal_regions)?;
        fmt_regions(f, "Background", &self.background_regions)?;
        writeln!(f)?;

        writeln!(f, "┌─ Beam ───────────────────────────────────────────────────")?;
        fmt_line(f, "Probe energy", &self.probe_energy)?;
        fmt_line(f, "Transmission", &self.transmission)?;
        fmt_line(f, "Distance", &self.detector_distance)?;
        writeln!(f)?;

        writeln!(f, "┌─ Data file ──────────────────────────────────────────────")?;
        fmt_line(f, "Recorded", &self.src_data_path)?;
        if let Some(local) = &self.local_data_path {
            fmt_line(f, "Local", local)?;
        }

        let unavailable = self.unavailable_count();
        if unavailable > 0 {
            writeln!(f)?;
            writeln!(f, "{} field(s) unavailable", unavailable)?;
        }
        Ok(())
    }
}

fn fmt_line<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    reading: &Reading<T>,
) -> fmt::Result {
    match reading {
        Reading::Value(value) => writeln!(f, "│  {:<16}{}", label, value),
        Reading::Unavailable(message) => {
            writeln!(f, "│  {:<16}unavailable ({})", label, first_line(message))
        }
    }
}

fn fmt_regions(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    reading: &Reading<Vec<Region>>,
) -> fmt::Result {
    match reading {
        Reading::Value(regions) if regions.is_empty() => writeln!(f, "│  {:<16}none", label),
        Reading::Value(regions) => {
            for (i, region) in regions.iter().enumerate() {
                let label = if i == 0 { label } else { "" };
                writeln!(
                    f,
                    "│  {:<16}x {}..{}, y {}..{} ({} px)",
                    label,
                    region.x_start(),
                    region.x_end(),
                    region.y_start(),
                    region.y_end(),
                    region.num_pixels()
                )?;
            }
            Ok(())
        }
        Reading::Unavailable(message) => {
            writeln!(f, "│  {:<16}unavailable ({})", label, first_line(message))
        }
    }
}

// File-not-found messages carry one candidate per line.
fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}
