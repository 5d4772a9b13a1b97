use super::engine::{EngineSession, MetadataEngine};
use super::{ChangeReport, LabelMap};
use crate::error::Result;
use crate::resolver::FileSet;

/// Tells exiftool to replace the original instead of keeping a `_original` copy.
pub const SKIP_BACKUP_FLAG: &str = "-overwrite_original";

/// Overwrite `labels` on every file of `files` in one engine call.
///
/// With `backup` the engine keeps its own copy of each file's previous state;
/// without it [`SKIP_BACKUP_FLAG`] is passed and files are rewritten in place.
///
/// Returns the base name of every targeted file, whether or not the engine
/// actually changed its bytes. If the engine call fails the whole batch fails.
pub fn overwrite_labels<E: MetadataEngine>(
    engine: &E,
    files: &FileSet,
    labels: &LabelMap,
    backup: bool,
) -> Result<ChangeReport> {
    if files.is_empty() {
        log::debug!("No files to write labels to");
        return Ok(ChangeReport::new());
    }

    let mut params = Vec::new();
    if !backup {
        params.push(SKIP_BACKUP_FLAG);
    }

    log::debug!(
        "Writing {} label(s) to {} file(s){}",
        labels.len(),
        files.len(),
        if backup { "" } else { " without backup" }
    );

    {
        let mut session = engine.open()?;
        session.set_tags(files.paths(), labels, &params)?;
    }

    Ok(files.base_names())
}
