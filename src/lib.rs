//! # exif-labels
//!
//! Read and overwrite the labels (EXIF/IPTC/XMP tags) of pictures by driving
//! [exiftool](https://exiftool.org), packaged as an automation module.
//!
//! An invocation takes a file or directory, an optional filename pattern, a
//! map of labels to overwrite and a backup switch. It returns every resolved
//! file's labels keyed by base filename, with group prefixes such as `EXIF:`
//! stripped so `EXIF:Make` becomes `Make`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_labels::config::{Config, ModuleParams};
//! use exif_labels::exif::ExifToolEngine;
//! use exif_labels::pipeline::run;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let engine = ExifToolEngine::new(config.engine);
//!
//!     let mut params = ModuleParams::new("/home/user/pictures/2025");
//!     params.suffix = Some("*.JPG".into());
//!
//!     let outcome = run(&params, &engine)?;
//!     for (file, labels) in &outcome.exiftools {
//!         println!("{file}: {:?}", labels.get("Model"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! ```rust,no_run
//! use exif_labels::config::EngineConfig;
//! use exif_labels::exif::{fetch_labels, overwrite_labels, ExifToolEngine, LabelMap, TagValue};
//! use exif_labels::resolver::resolve;
//! use std::path::Path;
//!
//! fn main() -> exif_labels::Result<()> {
//!     let engine = ExifToolEngine::new(EngineConfig::default());
//!     let files = resolve(Path::new("/home/user/pictures"), Some("DSC0838*"))?;
//!
//!     let mut labels = LabelMap::new();
//!     labels.insert("Title".into(), TagValue::from("Hamburg_New_City"));
//!     let changed = overwrite_labels(&engine, &files, &labels, false)?;
//!     println!("changed: {}", changed.join(", "));
//!
//!     let results = fetch_labels(&engine, &files)?;
//!     println!("{} file(s) read", results.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`] — engine settings and module parameters
//! - [`exif`] — engine trait, exiftool session, label reading and writing
//! - [`resolver`] — path + pattern to file set
//! - [`pipeline`] — one write-then-read invocation and its result envelope

pub mod config;
pub mod error;
pub mod exif;
pub mod pipeline;
pub mod resolver;

pub use error::{Error, Result};
