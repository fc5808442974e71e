//! In-memory model of a NeXus metadata tree.
//!
//! A NeXus file is a hierarchy of groups (tagged with an `NX_class`), fields
//! and attributes. This module holds the loaded tree and the lookups that the
//! document and beamline layers are built from. Readers produce an
//! [`NxTree`]; nothing here writes files.

pub mod io_json;
mod node;
mod value;

pub use node::{NxField, NxGroup, NxNode, NxTree};
pub use value::NxValue;
