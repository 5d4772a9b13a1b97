use super::engine::{EngineSession, MetadataEngine};
use super::{LabelMap, RawTagSet, ResultSet, TagValue};
use crate::error::Result;
use crate::resolver::{base_name, FileSet};

/// Separates the group from the label in tag names like `EXIF:Make`.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Read the labels of every file in `files`.
///
/// One engine session is opened for the whole set and closed before returning.
/// Entries are keyed by base filename; when two files share a base name the
/// one read last wins.
pub fn fetch_labels<E: MetadataEngine>(engine: &E, files: &FileSet) -> Result<ResultSet> {
    let mut results = ResultSet::new();
    if files.is_empty() {
        log::debug!("No files to read labels from");
        return Ok(results);
    }

    let mut session = engine.open()?;
    for path in files.iter() {
        log::debug!("Reading labels: {}", path.display());
        let raw = session.get_all_tags(path)?;
        let name = base_name(path);
        if results.insert(name.clone(), flatten_labels(raw)).is_some() {
            log::debug!("Labels of {name} replaced by {}", path.display());
        }
    }

    Ok(results)
}

/// Strip the namespace from every tag name.
///
/// Tags are visited in the engine's order, so if `EXIF:Title` and `XMP:Title`
/// both exist the later one ends up under `Title`.
pub fn flatten_labels(raw: RawTagSet) -> LabelMap {
    raw.into_iter()
        .map(|(name, value)| (bare_label(&name).to_string(), TagValue::from(value)))
        .collect()
}

/// Everything after the last separator, or the whole name if there is none.
pub fn bare_label(name: &str) -> &str {
    match name.rfind(NAMESPACE_SEPARATOR) {
        Some(idx) => &name[idx + NAMESPACE_SEPARATOR.len_utf8()..],
        None => name,
    }
}
