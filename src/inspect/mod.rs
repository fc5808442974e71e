//! File inspection.
//!
//! Evaluates every accessor on a [`NexusFile`] and collects the results into
//! a report. A failing accessor does not stop the inspection: its error is
//! recorded in place of the value so the caller sees everything that could
//! and could not be read.

mod report;

pub use report::{InspectReport, Reading};

use std::path::PathBuf;

use crate::beamline::NexusFile;
use crate::document::MetadataDocument;

/// Options for file inspection.
#[derive(Clone, Debug, Default)]
pub struct InspectOptions {
    /// Extra directories to search for the referenced data file.
    pub search_roots: Vec<PathBuf>,
    /// Skip locating the data file on disk.
    pub skip_data_file: bool,
}

/// Inspect a NeXus file and produce a report.
pub fn inspect_document(doc: &NexusFile, opts: &InspectOptions) -> InspectReport {
    let local_data_path = if opts.skip_data_file {
        None
    } else {
        Some(Reading::from_result(
            doc.local_data_path_with(&opts.search_roots),
        ))
    };

    InspectReport {
        file: doc.local_path().display().to_string(),
        beamline: doc.beamline().to_string(),
        src_path: doc.src_path().map(str::to_string),
        default_dataset: Reading::from_result(doc.default_dataset_name().map(str::to_string)),
        default_signal: Reading::from_result(doc.default_signal_name().map(str::to_string)),
        default_axis: Reading::from_result(doc.default_axis_name().map(str::to_string)),
        default_axis_type: Reading::from_result(doc.default_axis_type()),
        detector: Reading::from_result(doc.detector_name()),
        signal_regions: Reading::from_result(doc.signal_regions()),
        background_regions: Reading::from_result(doc.background_regions()),
        probe_energy: Reading::from_result(doc.probe_energy()),
        transmission: Reading::from_result(doc.transmission()),
        detector_distance: Reading::from_result(doc.detector_distance()),
        src_data_path: Reading::from_result(doc.src_data_path()),
        local_data_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beamline::Beamline;
    use crate::nexus::io_json::from_json_str;

    const TREE: &str = r#"{"root": {"children": [
        {"name": "entry", "NX_class": "NXentry", "attrs": {"default": "scan"}, "children": [
            {"name": "exr", "NX_class": "NXcollection", "children": []},
            {"name": "instrument", "NX_class": "NXinstrument", "children": [
                {"name": "dcm1energy", "NX_class": "NXpositioner", "children": [
                    {"name": "value", "value": 12.5}
                ]},
                {"name": "ex_rois", "NX_class": "NXcollection", "children": [
                    {"name": "excalibur_ROIs",
                     "value": "{u'Region_1': {x:1,y:2,width:3,height:4}, u'Region_2': {x:10,y:20,width:5,height:5}}"}
                ]}
            ]},
            {"name": "scan", "NX_class": "NXdata", "attrs": {"signal": "roi1_sum", "axes": "qdcd"},
             "children": [
                {"name": "roi1_sum", "value": [1, 2]},
                {"name": "qdcd", "value": [0.01, 0.02]}
             ]}
        ]}
    ]}}"#;

    #[test]
    fn report_collects_values_and_errors() {
        let doc = NexusFile::new("scan.nxs", from_json_str(TREE).unwrap(), Beamline::I07);
        let report = inspect_document(
            &doc,
            &InspectOptions {
                skip_data_file: true,
                ..Default::default()
            },
        );

        assert_eq!(report.probe_energy, Reading::Value(12.5));
        assert_eq!(report.default_axis.value().map(String::as_str), Some("qdcd"));
        assert!(report.transmission.is_unavailable());
        assert!(report.detector_distance.is_unavailable());
        assert!(report.src_data_path.is_unavailable());
        assert!(report.local_data_path.is_none());
        assert_eq!(report.unavailable_count(), 3);

        let background = report.background_regions.value().expect("background");
        assert_eq!(background.len(), 1);
        assert_eq!(background[0].num_pixels(), 25);
    }

    #[test]
    fn report_renders_text_and_json() {
        let doc = NexusFile::new("scan.nxs", from_json_str(TREE).unwrap(), Beamline::I07);
        let report = inspect_document(
            &doc,
            &InspectOptions {
                skip_data_file: true,
                ..Default::default()
            },
        );

        let text = report.to_string();
        assert!(text.contains("Probe energy"));
        assert!(text.contains("12.5"));
        assert!(text.contains("unavailable"));

        let json = report.to_json().expect("json");
        assert!(json.contains("\"probe_energy\""));
        assert!(json.contains("\"value\": 12.5"));
        assert!(json.contains("\"unavailable\""));
    }
}
