//! In-memory metadata engine for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;

use super::engine::{EngineSession, MetadataEngine};
use super::{bare_label, LabelMap, RawTagSet};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedWrite {
    pub files: Vec<PathBuf>,
    pub tags: LabelMap,
    pub params: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    files: HashMap<PathBuf, RawTagSet>,
    opened: usize,
    closed: usize,
    writes: Vec<RecordedWrite>,
    unavailable: bool,
}

/// Cheap to clone; clones share the same files and counters.
#[derive(Debug, Default, Clone)]
pub(crate) struct FakeEngine {
    state: Rc<RefCell<State>>,
}

impl FakeEngine {
    /// An engine whose sessions can never be opened.
    pub fn unavailable() -> Self {
        let engine = Self::default();
        engine.state.borrow_mut().unavailable = true;
        engine
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, tags: Value) {
        let Value::Object(tags) = tags else {
            panic!("fake file tags must be a json object");
        };
        self.state.borrow_mut().files.insert(path.into(), tags);
    }

    pub fn tags_of(&self, path: impl AsRef<Path>) -> Option<RawTagSet> {
        self.state.borrow().files.get(path.as_ref()).cloned()
    }

    pub fn sessions_opened(&self) -> usize {
        self.state.borrow().opened
    }

    pub fn sessions_closed(&self) -> usize {
        self.state.borrow().closed
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.state.borrow().writes.clone()
    }
}

impl MetadataEngine for FakeEngine {
    type Session = FakeSession;

    fn open(&self) -> Result<FakeSession> {
        let mut state = self.state.borrow_mut();
        if state.unavailable {
            return Err(Error::EngineUnavailable {
                path: PathBuf::from("exiftool"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }
        state.opened += 1;
        Ok(FakeSession {
            state: Rc::clone(&self.state),
        })
    }
}

pub(crate) struct FakeSession {
    state: Rc<RefCell<State>>,
}

fn not_found(file: &Path, command_args: String) -> Error {
    Error::EngineOperation {
        message: format!("Error: File not found - {}", file.display()),
        command_args,
    }
}

impl EngineSession for FakeSession {
    fn get_all_tags(&mut self, file: &Path) -> Result<RawTagSet> {
        self.state
            .borrow()
            .files
            .get(file)
            .cloned()
            .ok_or_else(|| not_found(file, format!("-json {}", file.display())))
    }

    fn set_tags(&mut self, files: &[PathBuf], tags: &LabelMap, params: &[&str]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.writes.push(RecordedWrite {
            files: files.to_vec(),
            tags: tags.clone(),
            params: params.iter().map(|p| p.to_string()).collect(),
        });

        // One bad file fails the whole batch before anything is written.
        if let Some(missing) = files.iter().find(|f| !state.files.contains_key(*f)) {
            return Err(not_found(missing, "-Tag=...".to_string()));
        }

        for file in files {
            let Some(raw) = state.files.get_mut(file) else {
                continue;
            };
            for (label, value) in tags {
                raw.retain(|name, _| bare_label(name) != label.as_str());
                let value = serde_json::to_value(value).expect("tag values serialize");
                raw.insert(format!("XMP:{label}"), value);
            }
        }
        Ok(())
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.state.borrow_mut().closed += 1;
    }
}
