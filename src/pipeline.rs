use serde::Serialize;

use crate::config::ModuleParams;
use crate::error::Result;
use crate::exif::{fetch_labels, overwrite_labels, MetadataEngine, ResultSet};
use crate::resolver::resolve;

/// Message of a read-only invocation.
pub const FETCHED_MESSAGE: &str = "Labels are fetched. Can be printed by 'register.exiftools'.";

/// What the automation framework receives from one invocation.
///
/// # Example
///
/// ```rust,no_run
/// use exif_labels::config::{Config, ModuleParams};
/// use exif_labels::exif::{ExifToolEngine, TagValue};
/// use exif_labels::pipeline::run;
///
/// let engine = ExifToolEngine::new(Config::default().engine);
/// let mut params = ModuleParams::new("/home/user/pictures/2025/");
/// params.suffix = Some("*.JPG".into());
/// params.metadata.insert("Title".into(), TagValue::from("Hamburg"));
///
/// let outcome = run(&params, &engine).unwrap();
/// println!("{}", outcome.message);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// True whenever labels were given to write.
    pub changed: bool,
    pub message: String,
    /// Labels per base filename, read after any write.
    pub exiftools: ResultSet,
}

/// Run one invocation: resolve the files, write labels if any were given,
/// then read every file's labels back.
///
/// The write finishes, and its engine session is closed, before the read
/// opens its own. Any engine error aborts the invocation with no partial result.
pub fn run<E: MetadataEngine>(params: &ModuleParams, engine: &E) -> Result<Outcome> {
    let files = resolve(&params.path, params.suffix.as_deref())?;
    log::info!("Resolved {} file(s) from {}", files.len(), params.path.display());

    let mut outcome = Outcome {
        changed: false,
        message: FETCHED_MESSAGE.to_string(),
        exiftools: ResultSet::new(),
    };

    if !params.metadata.is_empty() {
        let names = if params.check_mode {
            log::info!("Check mode: not writing {} label(s)", params.metadata.len());
            files.base_names()
        } else {
            overwrite_labels(engine, &files, &params.metadata, params.backup)?
        };
        outcome.changed = true;
        outcome.message = change_message(&names, params.check_mode);
        log::info!("{}", outcome.message);
    }

    outcome.exiftools = fetch_labels(engine, &files)?;
    Ok(outcome)
}

fn change_message(names: &[String], check_mode: bool) -> String {
    let verb = if check_mode { "would be" } else { "got" };
    format!("Labels of following pictures {verb} changed: {}.", names.join(", "))
}
