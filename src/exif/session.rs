use std::path::{Path, PathBuf};

use ::exiftool::ExifToolError;
use serde_json::Value;

use super::engine::{EngineSession, MetadataEngine};
use super::{LabelMap, RawTagSet};
use crate::config::EngineConfig;
use crate::error::{Error, Result};

// The exiftool crate echoes warnings onto stdout, which carries the envelope.
// A double -q silences warnings; errors still reach stderr.
const QUIET_ARGS: [&str; 2] = ["-q", "-q"];

/// Launches one `exiftool` process per session.
#[derive(Debug, Clone)]
pub struct ExifToolEngine {
    config: EngineConfig,
}

impl ExifToolEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl MetadataEngine for ExifToolEngine {
    type Session = ExifTool;

    fn open(&self) -> Result<ExifTool> {
        ExifTool::spawn(&self.config)
    }
}

/// A running `exiftool -stay_open` process plus the arguments every command gets.
///
/// The process is shut down when this is dropped.
#[derive(Debug)]
pub struct ExifTool {
    process: ::exiftool::ExifTool,
    common_args: Vec<String>,
}

impl ExifTool {
    pub fn spawn(config: &EngineConfig) -> Result<Self> {
        let process = ::exiftool::ExifTool::with_executable(&config.executable).map_err(|e| match e {
            ExifToolError::ExifToolNotFound(source) => Error::EngineUnavailable {
                path: config.executable.clone(),
                source,
            },
            other => engine_error(other),
        })?;
        log::debug!("exiftool session started: {}", config.executable.display());

        Ok(Self {
            process,
            common_args: config.common_args.clone(),
        })
    }

    /// Quiet flags followed by the configured common arguments.
    fn base_args(&self) -> Vec<&str> {
        let mut args = QUIET_ARGS.to_vec();
        args.extend(self.common_args.iter().map(String::as_str));
        args
    }
}

impl EngineSession for ExifTool {
    fn get_all_tags(&mut self, file: &Path) -> Result<RawTagSet> {
        let args: Vec<String> = self.base_args().into_iter().map(str::to_string).collect();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let value = self.process.json(file, &args).map_err(engine_error)?;
        match value {
            Value::Object(tags) => Ok(tags),
            _ => Err(Error::UnexpectedOutput {
                path: file.to_path_buf(),
            }),
        }
    }

    fn set_tags(&mut self, files: &[PathBuf], tags: &LabelMap, params: &[&str]) -> Result<()> {
        let mut args: Vec<String> = self.base_args().into_iter().map(str::to_string).collect();
        args.extend(assignment_args(files, tags, params));

        // exiftool reads one argument per line from stdin.
        if let Some(bad) = args.iter().find(|a| a.contains(['\n', '\r'])) {
            return Err(Error::InvalidArgument(bad.clone()));
        }

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.process.execute_raw(&args).map_err(engine_error)?;
        for line in String::from_utf8_lossy(&output).lines() {
            let line = line.trim();
            if !line.is_empty() {
                log::debug!("exiftool: {line}");
            }
        }
        Ok(())
    }
}

/// Fold the driver's error into ours. Spawn failures are handled in [`ExifTool::spawn`],
/// where the executable path is known.
fn engine_error(err: ExifToolError) -> Error {
    match err {
        ExifToolError::ProcessTerminated | ExifToolError::StderrDisconnected => {
            Error::EngineTerminated
        }
        ExifToolError::FileNotFound { path, command_args } => Error::EngineOperation {
            message: format!("Error: File not found - {}", path.display()),
            command_args,
        },
        ExifToolError::ExifToolProcess {
            message,
            command_args,
            ..
        } => Error::EngineOperation {
            message,
            command_args,
        },
        ExifToolError::UnexpectedFormat { path, .. } => Error::UnexpectedOutput {
            path: PathBuf::from(path),
        },
        other => Error::EngineOperation {
            message: other.to_string(),
            command_args: String::new(),
        },
    }
}

/// Arguments for a batched write: `params`, then `-Label=value` per operand, then files.
fn assignment_args(files: &[PathBuf], tags: &LabelMap, params: &[&str]) -> Vec<String> {
    let mut args: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    for (label, value) in tags {
        for operand in value.to_args() {
            args.push(format!("-{label}={operand}"));
        }
    }
    args.extend(files.iter().map(|f| f.to_string_lossy().into_owned()));
    args
}
