//! Field mappings for files written at the I07 beamline (Diamond).
//!
//! The Excalibur detector has recorded its regions of interest in two
//! different ways over time, which is why the detector has to be identified
//! before regions can be read.

use serde_json::{Map, Value};

use super::Detector;
use crate::document::{AxisType, MetadataDocument};
use crate::error::NxError;
use crate::nexus::NxGroup;
use crate::region::Region;

/// Marker present in the entry of files written with the 2021 detector setup.
pub const EXCALIBUR_2021_MARKER: &str = "excroi";
/// Marker present in the entry of files written since April 2022.
pub const EXCALIBUR_04_2022_MARKER: &str = "exr";

const ROI_TEXT_PATH: &str = "ex_rois/excalibur_ROIs";
const SIGNAL_REGION_KEY: &str = "Region_1";
const ROI_BARE_KEYS: [&str; 5] = ["x", "y", "width", "height", "angle"];

pub(super) fn detector(doc: &impl MetadataDocument) -> Result<Detector, NxError> {
    let entry = doc.entry()?;
    if entry.contains(EXCALIBUR_2021_MARKER) {
        return Ok(Detector::Excalibur2021);
    }
    if entry.contains(EXCALIBUR_04_2022_MARKER) {
        return Ok(Detector::Excalibur2022);
    }
    Err(NxError::NotImplemented {
        beamline: "I07".to_string(),
        what: "detector identification (no known detector marker)".to_string(),
    })
}

pub(super) fn default_axis_type(doc: &impl MetadataDocument) -> Result<AxisType, NxError> {
    match doc.default_axis_name()? {
        "qdcd" => Ok(AxisType::Q),
        "diff1delta" => Ok(AxisType::Tth),
        other => Err(NxError::NotImplemented {
            beamline: "I07".to_string(),
            what: format!("axis type for default axis '{other}'"),
        }),
    }
}

pub(super) fn signal_regions(doc: &impl MetadataDocument) -> Result<Vec<Region>, NxError> {
    match detector(doc)? {
        Detector::Excalibur2021 => Ok(vec![indexed_region(doc.detector()?, 1)?]),
        Detector::Excalibur2022 => {
            let rois = roi_map(doc.instrument()?)?;
            let signal = rois
                .get(SIGNAL_REGION_KEY)
                .ok_or(NxError::MissingKey(SIGNAL_REGION_KEY))?;
            Ok(vec![region_from_value(SIGNAL_REGION_KEY, signal)?])
        }
    }
}

/// Every region after the first is treated as background.
pub(super) fn background_regions(doc: &impl MetadataDocument) -> Result<Vec<Region>, NxError> {
    match detector(doc)? {
        Detector::Excalibur2021 => {
            let detector = doc.detector()?;
            let count = number_of_regions(detector)?;
            (2..=count)
                .map(|i| indexed_region(detector, i))
                .collect()
        }
        Detector::Excalibur2022 => {
            let rois = roi_map(doc.instrument()?)?;
            rois.iter()
                .skip(1)
                .map(|(name, value)| region_from_value(name, value))
                .collect()
        }
    }
}

pub(super) fn probe_energy(doc: &impl MetadataDocument) -> Result<f64, NxError> {
    doc.instrument()?.field("dcm1energy/value")?.as_f64()
}

pub(super) fn transmission(doc: &impl MetadataDocument) -> Result<f64, NxError> {
    doc.instrument()?.field("filterset/transmission")?.as_f64()
}

pub(super) fn detector_distance(doc: &impl MetadataDocument) -> Result<f64, NxError> {
    doc.instrument()?.field("diff1detdist/value")?.as_f64()
}

/// Turns the ROI blob written by the 2022 detector into parseable JSON.
///
/// The blob uses single quotes, bare keys and stray `u` prefixes. The
/// replacements are blind substring replacements applied in a fixed order:
/// drop every `u`, swap `'` for `"`, then quote each bare key. Any other
/// token containing `u`, `x` or `y` is rewritten too; real files have never
/// contained one.
pub fn repair_roi_text(raw: &str) -> String {
    let mut text = raw.replace('u', "").replace('\'', "\"");
    for key in ROI_BARE_KEYS {
        text = text.replace(key, &format!("\"{key}\""));
    }
    text
}

/// Repairs and parses an ROI blob, keeping the regions in written order.
///
/// # Errors
/// [`NxError::RoiParse`] if the repaired text is still not a JSON object.
pub fn parse_roi_text(raw: &str) -> Result<Map<String, Value>, NxError> {
    Ok(serde_json::from_str(&repair_roi_text(raw))?)
}

fn roi_map(instrument: &NxGroup) -> Result<Map<String, Value>, NxError> {
    parse_roi_text(instrument.field(ROI_TEXT_PATH)?.as_text()?)
}

fn region_from_value(name: &str, value: &Value) -> Result<Region, NxError> {
    let map = value.as_object().ok_or_else(|| NxError::FieldType {
        node: format!("{ROI_TEXT_PATH}[{name}]"),
        expected: "a region mapping",
    })?;
    Region::from_map(map)
}

/// Reads region `i` from the `Region_{i}_X/Width/Y/Height` detector fields.
fn indexed_region(detector: &NxGroup, i: usize) -> Result<Region, NxError> {
    let read = |kind: &str| detector.field(&format!("Region_{i}_{kind}"))?.first_f64();
    let x_1 = read("X")?;
    let x_2 = read("Width")? + x_1;
    let y_1 = read("Y")?;
    let y_2 = read("Height")? + y_1;
    Ok(Region::from_f64(x_1, x_2, y_1, y_2))
}

/// The largest `n` among detector keys of the form `Region_{n}_...`.
fn number_of_regions(detector: &NxGroup) -> Result<usize, NxError> {
    let mut count = None;
    for key in detector.keys().filter(|key| key.starts_with("Region")) {
        let n = key
            .split('_')
            .nth(1)
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| NxError::MalformedNode {
                path: format!("{}/{}", detector.path, key),
                message: "region keys must look like Region_<n>_<kind>".to_string(),
            })?;
        count = count.max(Some(n));
    }
    count.ok_or_else(|| NxError::MissingNode {
        parent: detector.path.clone(),
        name: "Region_<n>_*".to_string(),
    })
}
