use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::exif::LabelMap;

/// Key the automation framework wraps module parameters in.
const MODULE_ARGS_KEY: &str = "ANSIBLE_MODULE_ARGS";
/// Prefix of framework-internal parameters (`_ansible_check_mode`, ...).
const INTERNAL_PREFIX: &str = "_ansible_";
const CHECK_MODE_KEY: &str = "_ansible_check_mode";

/// Settings that do not change between invocations.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_labels::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.engine.executable = "/usr/bin/exiftool".into();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
}

/// How to launch exiftool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Executable name or path.
    pub executable: PathBuf,
    /// Arguments applied to every command (`-common_args`).
    ///
    /// `-G` makes tag names group-qualified (`EXIF:Make`), `-n` keeps numeric
    /// values numeric.
    pub common_args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("exiftool"),
            common_args: vec!["-G".to_string(), "-n".to_string()],
        }
    }
}

/// Environment variable naming the config file, checked before the default location.
pub const CONFIG_ENV: &str = "EXIF_LABELS_CONFIG";
/// File name of the config next to the executable.
pub const CONFIG_FILE_NAME: &str = "exif-labels.json";

impl Config {
    /// Default config location: `$EXIF_LABELS_CONFIG` if set, otherwise
    /// `exif-labels.json` next to the executable.
    pub fn config_path() -> Result<PathBuf> {
        let from_env = std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        locate(from_env)
    }

    /// Load config from the given path, or from the default location.
    ///
    /// A missing file gives the defaults; a file that exists but does not
    /// parse, or names no executable, is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = match std::fs::read_to_string(&config_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", config_path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot read {}", config_path.display()));
            }
        };

        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config in {}", config_path.display()))?;
        config.engine.validate()?;
        log::debug!(
            "Config loaded from {} (exiftool: {})",
            config_path.display(),
            config.engine.executable.display()
        );
        Ok(config)
    }

    /// Save config to the given path, or to the default location, creating
    /// missing parent directories.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)
            .with_context(|| format!("Cannot write {}", config_path.display()))?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}

impl EngineConfig {
    /// Reject settings exiftool would choke on at the first command.
    pub fn validate(&self) -> Result<()> {
        if self.executable.as_os_str().is_empty() {
            bail!("engine.executable must not be empty");
        }
        if let Some(arg) = self
            .common_args
            .iter()
            .find(|arg| arg.contains(['\n', '\r']))
        {
            bail!("engine.common_args entry {arg:?} contains a line break");
        }
        Ok(())
    }
}

fn locate(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }
    let exe_path = std::env::current_exe().context("Cannot locate the running executable")?;
    let exe_dir = exe_path
        .parent()
        .context("Executable path has no parent directory")?;
    Ok(exe_dir.join(CONFIG_FILE_NAME))
}

/// Parameters of one module invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleParams {
    /// A picture, or a directory when `suffix` is set.
    pub path: PathBuf,
    /// Filename pattern searched recursively below `path`.
    #[serde(default)]
    pub suffix: Option<String>,
    /// Labels to overwrite; empty means read only.
    #[serde(default)]
    pub metadata: LabelMap,
    /// Let the engine keep a copy of each file before writing.
    #[serde(default = "default_backup", deserialize_with = "deserialize_flag")]
    pub backup: bool,
    /// Report what would change without writing.
    #[serde(skip)]
    pub check_mode: bool,
}

fn default_backup() -> bool {
    true
}

impl ModuleParams {
    /// Parameters for `path` with defaults for everything else.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            suffix: None,
            metadata: LabelMap::new(),
            backup: true,
            check_mode: false,
        }
    }

    /// Read parameters from an argument file written by the automation framework.
    pub fn from_args_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read module arguments {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Parse parameters, either wrapped in `ANSIBLE_MODULE_ARGS` or bare.
    ///
    /// Framework-internal `_ansible_*` keys are dropped; `_ansible_check_mode`
    /// turns on [`ModuleParams::check_mode`].
    pub fn from_json(contents: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contents).context("Module arguments are not valid JSON")?;
        let Value::Object(mut root) = value else {
            bail!("Module arguments must be a JSON object");
        };

        let args = match root.remove(MODULE_ARGS_KEY) {
            Some(Value::Object(args)) => args,
            Some(_) => bail!("{MODULE_ARGS_KEY} must be a JSON object"),
            None => root,
        };

        let check_mode = match args.get(CHECK_MODE_KEY) {
            Some(v) => parse_flag(v).context("Invalid value for _ansible_check_mode")?,
            None => false,
        };

        let params: serde_json::Map<String, Value> = args
            .into_iter()
            .filter(|(key, _)| !key.starts_with(INTERNAL_PREFIX))
            .collect();

        let mut params: ModuleParams = serde_json::from_value(Value::Object(params))
            .context("Invalid module parameters")?;
        params.check_mode = check_mode;
        Ok(params)
    }
}

/// Booleans as the automation framework accepts them.
fn parse_flag(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_i64() == Some(1) => Ok(true),
        Value::Number(n) if n.as_i64() == Some(0) => Ok(false),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "yes" | "on" | "1" | "true" | "t" | "y" => Ok(true),
            "no" | "off" | "0" | "false" | "f" | "n" => Ok(false),
            other => bail!("{other:?} is not a valid boolean"),
        },
        other => bail!("{other} is not a valid boolean"),
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    parse_flag(&value).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::TagValue;
    use tempfile::TempDir;

    #[test]
    fn wrapped_arguments() {
        let params = ModuleParams::from_json(
            r#"{"ANSIBLE_MODULE_ARGS": {
                "path": "/home/user/pictures/2025/",
                "suffix": "DSC0838*",
                "metadata": {"Title": "Hamburg_New_City"},
                "backup": false,
                "_ansible_check_mode": false,
                "_ansible_verbosity": 0
            }}"#,
        )
        .unwrap();

        assert_eq!(params.path, PathBuf::from("/home/user/pictures/2025/"));
        assert_eq!(params.suffix.as_deref(), Some("DSC0838*"));
        assert_eq!(params.metadata["Title"], TagValue::from("Hamburg_New_City"));
        assert!(!params.backup);
        assert!(!params.check_mode);
    }

    #[test]
    fn bare_arguments_use_defaults() {
        let params = ModuleParams::from_json(r#"{"path": "/pics/a.jpg"}"#).unwrap();
        assert_eq!(params, ModuleParams::new("/pics/a.jpg"));
        assert!(params.backup);
        assert!(params.metadata.is_empty());
    }

    #[test]
    fn null_suffix_is_none() {
        let params = ModuleParams::from_json(r#"{"path": "/pics", "suffix": null}"#).unwrap();
        assert_eq!(params.suffix, None);
    }

    #[test]
    fn check_mode_from_internal_key() {
        let params = ModuleParams::from_json(
            r#"{"ANSIBLE_MODULE_ARGS": {"path": "/pics/a.jpg", "_ansible_check_mode": true}}"#,
        )
        .unwrap();
        assert!(params.check_mode);
    }

    #[test]
    fn backup_accepts_framework_booleans() {
        for (raw, expected) in [("\"no\"", false), ("\"Yes\"", true), ("0", false), ("\"off\"", false)] {
            let json = format!(r#"{{"path": "/pics/a.jpg", "backup": {raw}}}"#);
            assert_eq!(ModuleParams::from_json(&json).unwrap().backup, expected, "backup: {raw}");
        }
        assert!(ModuleParams::from_json(r#"{"path": "/p", "backup": "maybe"}"#).is_err());
    }

    #[test]
    fn metadata_values_keep_their_kind() {
        let params = ModuleParams::from_json(
            r#"{"path": "/p", "metadata": {"Rating": 5, "Keywords": ["a", "b"]}}"#,
        )
        .unwrap();
        assert_eq!(params.metadata["Rating"], TagValue::Integer(5));
        assert!(matches!(params.metadata["Keywords"], TagValue::Composite(_)));
    }

    #[test]
    fn missing_path_is_rejected() {
        assert!(ModuleParams::from_json(r#"{"suffix": "*.jpg"}"#).is_err());
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let err = ModuleParams::from_json(r#"{"path": "/p", "sufix": "*.jpg"}"#).unwrap_err();
        assert!(format!("{err:#}").contains("sufix"));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        assert!(ModuleParams::from_json("[]").is_err());
        assert!(ModuleParams::from_json(r#"{"ANSIBLE_MODULE_ARGS": "path=/p"}"#).is_err());
    }

    #[test]
    fn args_file_is_read() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("args");
        std::fs::write(&file, r#"{"ANSIBLE_MODULE_ARGS": {"path": "/pics/a.jpg"}}"#).unwrap();
        assert_eq!(
            ModuleParams::from_args_file(&file).unwrap(),
            ModuleParams::new("/pics/a.jpg")
        );
    }

    #[test]
    fn missing_config_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("config.json"))).unwrap();
        assert_eq!(config.engine.executable, PathBuf::from("exiftool"));
        assert_eq!(config.engine.common_args, vec!["-G", "-n"]);
    }

    #[test]
    fn partial_config_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"engine": {"executable": "/usr/bin/exiftool"}}"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.engine.executable, PathBuf::from("/usr/bin/exiftool"));
        assert_eq!(config.engine.common_args, vec!["-G", "-n"]);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.engine.common_args.push("-charset".into());
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.engine.common_args, vec!["-G", "-n", "-charset"]);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etc/exif-labels/exif-labels.json");
        Config::default().save(Some(&path)).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn empty_executable_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"engine": {"executable": ""}}"#).unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn common_arg_with_line_break_is_rejected() {
        let mut engine = EngineConfig::default();
        engine.common_args.push("-charset\nfilename=utf8".into());
        let err = engine.validate().unwrap_err();
        assert!(err.to_string().contains("line break"));
    }

    #[test]
    fn malformed_config_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{err}").contains("config.json"));
    }

    #[test]
    fn override_path_wins_over_executable_dir() {
        let path = locate(Some(PathBuf::from("/etc/exif-labels.json"))).unwrap();
        assert_eq!(path, PathBuf::from("/etc/exif-labels.json"));
        let path = locate(None).unwrap();
        assert_eq!(path.file_name().unwrap(), CONFIG_FILE_NAME);
    }
}
