//! Groups, fields and the loaded tree.

use std::collections::BTreeMap;

use super::value::NxValue;
use crate::error::NxError;

/// A fully loaded NeXus file.
#[derive(Clone, Debug)]
pub struct NxTree {
    /// The file name recorded when the file was written. This is where the
    /// file lived at acquisition time, not where it was loaded from.
    pub file_name: Option<String>,
    /// The root group (`/`).
    pub root: NxGroup,
}

/// Either a group or a field.
#[derive(Clone, Debug)]
pub enum NxNode {
    Group(NxGroup),
    Field(NxField),
}

impl NxNode {
    /// Absolute path of the node within the file.
    pub fn path(&self) -> &str {
        match self {
            NxNode::Group(g) => &g.path,
            NxNode::Field(f) => &f.path,
        }
    }

    pub fn as_group(&self) -> Option<&NxGroup> {
        match self {
            NxNode::Group(g) => Some(g),
            NxNode::Field(_) => None,
        }
    }

    pub fn as_field(&self) -> Option<&NxField> {
        match self {
            NxNode::Field(f) => Some(f),
            NxNode::Group(_) => None,
        }
    }

    /// String form of the node: a field renders its value, a group its name.
    ///
    /// A one-element string array renders as its element.
    pub fn display_string(&self) -> String {
        match self {
            NxNode::Group(g) => g.name().to_string(),
            NxNode::Field(f) => match f.value.as_str() {
                Some(text) => text.to_string(),
                None => f.value.to_string(),
            },
        }
    }
}

/// A NeXus group (`NXentry`, `NXinstrument`, ...).
#[derive(Clone, Debug, Default)]
pub struct NxGroup {
    pub path: String,
    pub nx_class: Option<String>,
    pub attrs: BTreeMap<String, NxValue>,
    /// Children in document order.
    pub children: Vec<(String, NxNode)>,
}

/// A NeXus field (dataset) with its value.
#[derive(Clone, Debug)]
pub struct NxField {
    pub path: String,
    pub value: NxValue,
    pub attrs: BTreeMap<String, NxValue>,
}

impl NxGroup {
    /// Last component of the group's path; `/` for the root.
    pub fn name(&self) -> &str {
        match self.path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => "/",
        }
    }

    /// Direct child by name.
    pub fn child(&self, name: &str) -> Option<&NxNode> {
        self.children
            .iter()
            .find(|(child_name, _)| child_name == name)
            .map(|(_, node)| node)
    }

    /// Returns true if a direct child with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Child names in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(name, _)| name.as_str())
    }

    /// Walks a slash-separated relative path, e.g. `"ex_rois/excalibur_ROIs"`.
    pub fn get(&self, rel_path: &str) -> Option<&NxNode> {
        let mut parts = rel_path.split('/').filter(|p| !p.is_empty());
        let first = parts.next()?;
        let mut node = self.child(first)?;
        for part in parts {
            node = node.as_group()?.child(part)?;
        }
        Some(node)
    }

    /// Like [`get`](Self::get) but requires a group.
    pub fn group(&self, rel_path: &str) -> Result<&NxGroup, NxError> {
        let node = self.get(rel_path).ok_or_else(|| self.missing(rel_path))?;
        node.as_group().ok_or_else(|| NxError::FieldType {
            node: node.path().to_string(),
            expected: "a group",
        })
    }

    /// Like [`get`](Self::get) but requires a field.
    pub fn field(&self, rel_path: &str) -> Result<&NxField, NxError> {
        let node = self.get(rel_path).ok_or_else(|| self.missing(rel_path))?;
        node.as_field().ok_or_else(|| NxError::FieldType {
            node: node.path().to_string(),
            expected: "a field",
        })
    }

    /// Child groups whose `NX_class` is `class`.
    pub fn groups_of_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a NxGroup> {
        self.children
            .iter()
            .filter_map(|(_, node)| node.as_group())
            .filter(move |g| g.nx_class.as_deref() == Some(class))
    }

    /// The single child group of `class`.
    ///
    /// # Errors
    /// [`NxError::Cardinality`] when zero or several such groups exist.
    pub fn only_group_of_class(&self, class: &'static str) -> Result<&NxGroup, NxError> {
        let found: Vec<&NxGroup> = self.groups_of_class(class).collect();
        match found.as_slice() {
            [group] => Ok(*group),
            _ => Err(NxError::Cardinality {
                class,
                parent: self.path.clone(),
                found: found.len(),
            }),
        }
    }

    /// Text attribute lookup.
    pub fn attr_text(&self, name: &str) -> Result<&str, NxError> {
        let value = self
            .attrs
            .get(name)
            .ok_or_else(|| NxError::MissingAttribute {
                node: self.path.clone(),
                name: name.to_string(),
            })?;
        match value {
            NxValue::Text(s) => Ok(s),
            // `axes` may be written as a list of axis names.
            NxValue::Array(items) => items.first().and_then(NxValue::as_str).ok_or_else(|| {
                NxError::FieldType {
                    node: format!("{}@{}", self.path, name),
                    expected: "text",
                }
            }),
            _ => Err(NxError::FieldType {
                node: format!("{}@{}", self.path, name),
                expected: "text",
            }),
        }
    }

    /// Depth-first, document-order search over every descendant.
    ///
    /// A node is tested before its children.
    pub fn find_first<P>(&self, predicate: &mut P) -> Option<&NxNode>
    where
        P: FnMut(&NxNode) -> bool,
    {
        for (_, node) in &self.children {
            if predicate(node) {
                return Some(node);
            }
            if let NxNode::Group(group) = node {
                if let Some(found) = group.find_first(predicate) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn missing(&self, name: &str) -> NxError {
        NxError::MissingNode {
            parent: self.path.clone(),
            name: name.to_string(),
        }
    }
}

impl NxField {
    /// The field value as `f64`.
    pub fn as_f64(&self) -> Result<f64, NxError> {
        self.value.as_f64().ok_or_else(|| self.type_error("a number"))
    }

    /// The first element of the field as `f64`.
    pub fn first_f64(&self) -> Result<f64, NxError> {
        self.value
            .first_f64()
            .ok_or_else(|| self.type_error("a numeric array"))
    }

    /// The field flattened into `f64` values.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>, NxError> {
        self.value
            .to_f64_vec()
            .ok_or_else(|| self.type_error("numeric data"))
    }

    /// The field's text, unwrapping a one-element string array.
    pub fn as_text(&self) -> Result<&str, NxError> {
        self.value.as_str().ok_or_else(|| self.type_error("text"))
    }

    fn type_error(&self, expected: &'static str) -> NxError {
        NxError::FieldType {
            node: self.path.clone(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(path: &str, value: NxValue) -> NxNode {
        NxNode::Field(NxField {
            path: path.to_string(),
            value,
            attrs: BTreeMap::new(),
        })
    }

    fn group(path: &str, class: Option<&str>, children: Vec<NxNode>) -> NxNode {
        NxNode::Group(NxGroup {
            path: path.to_string(),
            nx_class: class.map(str::to_string),
            attrs: BTreeMap::new(),
            children: children
                .into_iter()
                .map(|node| {
                    let name = node.path().rsplit('/').next().unwrap_or_default().to_string();
                    (name, node)
                })
                .collect(),
        })
    }

    fn sample() -> NxGroup {
        let root = group(
            "",
            None,
            vec![group(
                "/entry",
                Some("NXentry"),
                vec![
                    field("/entry/title", NxValue::from("scan")),
                    group(
                        "/entry/instrument",
                        Some("NXinstrument"),
                        vec![field("/entry/instrument/data", NxValue::from("/a/b.h5"))],
                    ),
                    group("/entry/first", Some("NXdata"), vec![]),
                    group("/entry/second", Some("NXdata"), vec![]),
                    group("/entry/third", Some("NXdata"), vec![]),
                ],
            )],
        );
        match root {
            NxNode::Group(g) => g,
            NxNode::Field(_) => unreachable!(),
        }
    }

    #[test]
    fn path_lookup() {
        let root = sample();
        let node = root.get("entry/instrument/data").expect("lookup");
        assert_eq!(node.path(), "/entry/instrument/data");
        assert!(root.get("entry/title/nope").is_none());
        assert!(root.get("").is_none());
    }

    #[test]
    fn typed_lookup_errors() {
        let root = sample();
        assert!(matches!(
            root.group("entry/title"),
            Err(NxError::FieldType { .. })
        ));
        assert!(matches!(
            root.field("entry/missing"),
            Err(NxError::MissingNode { .. })
        ));
    }

    #[test]
    fn cardinality_is_enforced() {
        let root = sample();
        let entry = root.only_group_of_class("NXentry").expect("one entry");
        assert_eq!(entry.name(), "entry");

        match entry.only_group_of_class("NXdata") {
            Err(NxError::Cardinality { found, .. }) => assert_eq!(found, 3),
            other => panic!("unexpected: {other:?}"),
        }
        match entry.only_group_of_class("NXdetector") {
            Err(NxError::Cardinality { found, .. }) => assert_eq!(found, 0),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn find_first_is_depth_first() {
        let root = sample();
        let found = root
            .find_first(&mut |node: &NxNode| node.display_string().ends_with(".h5"))
            .expect("found");
        assert_eq!(found.path(), "/entry/instrument/data");
    }

    #[test]
    fn root_name() {
        assert_eq!(sample().name(), "/");
    }
}
