//! Reading and overwriting picture labels through an external metadata engine.
//!
//! - [`fetch_labels`] — read every tag of each file and flatten the names
//! - [`overwrite_labels`] — write a set of labels to all files in one batch
//!
//! Both talk to the engine through the [`MetadataEngine`] trait; the production
//! implementation is [`ExifToolEngine`], which drives an `exiftool` process.

mod engine;
mod session;
mod reader;
mod value;
mod writer;

#[cfg(test)]
pub(crate) mod fake;

use std::collections::BTreeMap;

pub use engine::{EngineSession, MetadataEngine};
pub use session::{ExifTool, ExifToolEngine};
pub use reader::{bare_label, fetch_labels, flatten_labels, NAMESPACE_SEPARATOR};
pub use value::TagValue;
pub use writer::{overwrite_labels, SKIP_BACKUP_FLAG};

/// Tags of one file exactly as the engine reported them, e.g. `"EXIF:Make" -> "Acme"`.
pub type RawTagSet = serde_json::Map<String, serde_json::Value>;

/// Bare label (namespace stripped) to value, for one file.
pub type LabelMap = BTreeMap<String, TagValue>;

/// Base filename to that file's labels.
pub type ResultSet = BTreeMap<String, LabelMap>;

/// Base filenames that were targets of a write.
pub type ChangeReport = Vec<String>;
