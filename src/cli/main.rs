use anyhow::{Result, bail};
use clap::Parser;
use serde_json::Value;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use exif_labels::config::{self, ModuleParams};
use exif_labels::exif::{ExifToolEngine, TagValue};
use exif_labels::pipeline::{self, Outcome};

#[derive(Parser, Debug)]
#[command(
    name = "exiftools",
    version,
    about = "Read and overwrite the labels of pictures with exiftool"
)]
struct Cli {
    /// Module argument file written by the automation framework
    #[arg(
        value_name = "ARGS_FILE",
        conflicts_with_all = ["path", "suffix", "set", "no_backup", "check"]
    )]
    args_file: Option<PathBuf>,

    /// Picture file, or a directory when --suffix is given
    #[arg(long, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Filename pattern searched recursively below --path (e.g. '*.JPG')
    #[arg(long, value_name = "GLOB")]
    suffix: Option<String>,

    /// Label to overwrite; may be repeated
    #[arg(long = "set", value_name = "LABEL=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// Rewrite pictures in place instead of letting exiftool keep a copy
    #[arg(long)]
    no_backup: bool,

    /// Report what would change without writing
    #[arg(long)]
    check: bool,

    /// Config file (default: $EXIF_LABELS_CONFIG, else exif-labels.json next to the binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a default config file and exit
    #[arg(long)]
    init: bool,

    /// Print labels as a table instead of JSON
    #[arg(long)]
    table: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the result envelope.
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            let failure = serde_json::json!({
                "failed": true,
                "changed": false,
                "msg": format!("{e:#}"),
            });
            println!("{failure}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    let config = config::Config::load(cli.config.as_deref())?;
    let params = module_params(cli)?;
    let engine = ExifToolEngine::new(config.engine);

    let outcome = pipeline::run(&params, &engine)?;

    if cli.table {
        print_table(&outcome);
    } else {
        println!("{}", serde_json::to_string(&outcome)?);
    }
    Ok(())
}

/// Parameters from the argument file, or from the individual flags.
fn module_params(cli: &Cli) -> Result<ModuleParams> {
    if let Some(ref file) = cli.args_file {
        return ModuleParams::from_args_file(file);
    }

    let Some(ref path) = cli.path else {
        bail!("No picture path given. Pass a module argument file or --path. Use --help for usage.");
    };

    let mut params = ModuleParams::new(path.clone());
    params.suffix = cli.suffix.clone();
    params.backup = !cli.no_backup;
    params.check_mode = cli.check;
    for (label, value) in &cli.set {
        params
            .metadata
            .insert(label.clone(), TagValue::from(value.as_str()));
    }
    Ok(params)
}

fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    let (label, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=VALUE, got {s:?}"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("missing label in {s:?}"));
    }
    Ok((label.to_string(), value.to_string()))
}

/// Terminal styling for `--table`; empty when stdout is not a terminal.
struct Style {
    bold: &'static str,
    dim: &'static str,
    reset: &'static str,
}

impl Style {
    fn detect() -> Self {
        if std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none() {
            Self {
                bold: "\x1b[1m",
                dim: "\x1b[2m",
                reset: "\x1b[0m",
            }
        } else {
            Self {
                bold: "",
                dim: "",
                reset: "",
            }
        }
    }
}

/// Width of the value column before wrapping.
const VALUE_WIDTH: usize = 52;
/// Labels longer than this push the value column out for their row only.
const MAX_LABEL_WIDTH: usize = 28;

/// Print every file's labels, one section per file.
fn print_table(outcome: &Outcome) {
    let style = Style::detect();
    println!("{}{}{}", style.bold, outcome.message, style.reset);

    for (file, labels) in &outcome.exiftools {
        println!();
        println!("{}File:{} {file}", style.bold, style.reset);
        println!("{}{}{}", style.dim, "═".repeat(72), style.reset);

        if labels.is_empty() {
            println!("  {}(no labels found){}", style.dim, style.reset);
            continue;
        }
        let label_width = labels
            .keys()
            .map(|label| label.chars().count())
            .max()
            .unwrap_or(0)
            .min(MAX_LABEL_WIDTH);
        for (label, value) in labels {
            for line in label_rows(label, value, label_width) {
                println!("{line}");
            }
        }
    }
    println!();
}

/// Table rows of one label: the label on the first row, continuation rows
/// aligned under the value column.
fn label_rows(label: &str, value: &TagValue, label_width: usize) -> Vec<String> {
    let indent = " ".repeat(label_width + 3);
    value_lines(value, VALUE_WIDTH)
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("  {label:<label_width$} : {line}").trim_end().to_string()
            } else {
                format!("  {indent}{line}")
            }
        })
        .collect()
}

/// Lay out a value for the value column.
///
/// Lists get one bulleted item per line, objects print as indented JSON and
/// everything else is word-wrapped.
fn value_lines(value: &TagValue, width: usize) -> Vec<String> {
    match value {
        TagValue::Composite(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .cloned()
            .flat_map(|item| {
                let item = TagValue::from(item).to_string();
                wrap_text(&item, width.saturating_sub(2).max(1))
                    .into_iter()
                    .enumerate()
                    .map(|(i, line)| if i == 0 { format!("- {line}") } else { format!("  {line}") })
                    .collect::<Vec<_>>()
            })
            .collect(),
        TagValue::Composite(object @ Value::Object(_)) => serde_json::to_string_pretty(object)
            .map(|pretty| pretty.lines().map(str::to_string).collect())
            .unwrap_or_else(|_| vec![object.to_string()]),
        other => wrap_text(&other.to_string(), width),
    }
}

/// Wrap text at word boundaries; words wider than `max_width` are split.
fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in s.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..max_width).collect());
        }
        let word: String = word.into_iter().collect();
        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= max_width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
