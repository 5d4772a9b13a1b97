use std::path::{Path, PathBuf};

use super::{LabelMap, RawTagSet};
use crate::error::Result;

/// Something that can hand out sessions to a metadata engine.
///
/// The Label Reader and Label Writer each call [`MetadataEngine::open`] once per
/// operation and drop the session when they are done, so a session never
/// outlives a single logical operation.
pub trait MetadataEngine {
    type Session: EngineSession;

    /// Acquire a session. Released when the returned value is dropped.
    fn open(&self) -> Result<Self::Session>;
}

/// An open connection to the metadata engine.
pub trait EngineSession {
    /// Every tag of one file, keyed by namespaced tag name, in engine order.
    fn get_all_tags(&mut self, file: &Path) -> Result<RawTagSet>;

    /// Overwrite `tags` on all `files` in a single engine call.
    ///
    /// `params` are passed to the engine ahead of the tag assignments.
    fn set_tags(&mut self, files: &[PathBuf], tags: &LabelMap, params: &[&str]) -> Result<()>;
}
