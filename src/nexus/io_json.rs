//! JSON dumps of NeXus files.
//!
//! The tree is read wholesale into memory. The expected layout is
//!
//! ```json
//! {
//!   "file_name": "/dls/i07/data/2022/si1234/i07-4321.nxs",
//!   "root": {
//!     "children": [
//!       {"name": "entry", "NX_class": "NXentry", "attrs": {"default": "scan"},
//!        "children": [{"name": "title", "value": "scan 4321"}]}
//!     ]
//!   }
//! }
//! ```
//!
//! A node with `children` (or an `NX_class`) is a group, a node with `value`
//! is a field. Children keep their document order.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use super::node::{NxField, NxGroup, NxNode, NxTree};
use super::value::NxValue;
use crate::error::NxError;

const INLINE_SOURCE: &str = "<inline>";

#[derive(Deserialize)]
struct RawTree {
    #[serde(default)]
    file_name: Option<String>,
    root: RawNode,
}

#[derive(Deserialize)]
struct RawNode {
    #[serde(default)]
    name: String,
    #[serde(rename = "NX_class", default)]
    nx_class: Option<String>,
    #[serde(default)]
    attrs: BTreeMap<String, NxValue>,
    #[serde(default)]
    children: Option<Vec<RawNode>>,
    // `"value": null` is a field holding `Null`, not a missing value.
    #[serde(default, deserialize_with = "present_value")]
    value: Option<NxValue>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<NxValue>, D::Error>
where
    D: Deserializer<'de>,
{
    NxValue::deserialize(deserializer).map(Some)
}

/// Reads a NeXus tree from a JSON dump on disk.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid JSON, or
/// describes a malformed tree.
pub fn read_nexus_json(path: &Path) -> Result<NxTree, NxError> {
    let file = File::open(path).map_err(NxError::Io)?;
    let reader = BufReader::new(file);

    let raw: RawTree = serde_json::from_reader(reader).map_err(|source| NxError::TreeParse {
        path: path.to_path_buf(),
        source,
    })?;
    build_tree(raw)
}

/// Reads a NeXus tree from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<NxTree, NxError> {
    let raw: RawTree = serde_json::from_str(json).map_err(|source| NxError::TreeParse {
        path: PathBuf::from(INLINE_SOURCE),
        source,
    })?;
    build_tree(raw)
}

/// Reads a NeXus tree from raw JSON bytes.
pub fn from_json_slice(bytes: &[u8]) -> Result<NxTree, NxError> {
    let raw: RawTree = serde_json::from_slice(bytes).map_err(|source| NxError::TreeParse {
        path: PathBuf::from(INLINE_SOURCE),
        source,
    })?;
    build_tree(raw)
}

fn build_tree(raw: RawTree) -> Result<NxTree, NxError> {
    let root = match build_node("/".to_string(), raw.root)? {
        NxNode::Group(group) => group,
        NxNode::Field(_) => {
            return Err(NxError::MalformedNode {
                path: "/".to_string(),
                message: "the root must be a group".to_string(),
            })
        }
    };
    Ok(NxTree {
        file_name: raw.file_name,
        root,
    })
}

fn build_node(path: String, raw: RawNode) -> Result<NxNode, NxError> {
    let malformed = |message: &str| NxError::MalformedNode {
        path: path.clone(),
        message: message.to_string(),
    };

    let nx_class = raw.nx_class.or_else(|| {
        raw.attrs
            .get("NX_class")
            .and_then(NxValue::as_str)
            .map(str::to_string)
    });

    match (raw.children, raw.value) {
        (Some(_), Some(_)) => Err(malformed("a node cannot have both children and a value")),
        (None, Some(value)) => {
            if nx_class.is_some() {
                return Err(malformed("a field cannot carry an NX_class"));
            }
            Ok(NxNode::Field(NxField {
                path,
                value,
                attrs: raw.attrs,
            }))
        }
        (None, None) if nx_class.is_none() => {
            Err(malformed("a node needs children, a value or an NX_class"))
        }
        (children, None) => {
            let mut seen = HashSet::new();
            let mut built = Vec::new();
            for child in children.unwrap_or_default() {
                if child.name.is_empty() || child.name.contains('/') {
                    return Err(malformed(&format!("invalid child name '{}'", child.name)));
                }
                if !seen.insert(child.name.clone()) {
                    return Err(malformed(&format!("duplicate child '{}'", child.name)));
                }
                let child_path = if path == "/" {
                    format!("/{}", child.name)
                } else {
                    format!("{}/{}", path, child.name)
                };
                let name = child.name.clone();
                built.push((name, build_node(child_path, child)?));
            }
            Ok(NxNode::Group(NxGroup {
                path,
                nx_class,
                attrs: raw.attrs,
                children: built,
            }))
        }
    }
}
