//! uimap command-line library
//!
//! Argument parsing, the scan pipeline and output rendering. The binary entry
//! point is in main.rs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context};
use tracing::info;

use uimap_core::{load_definitions, PerceptionConfig};
use uimap_driver::MemoryDriver;
use uimap_session::{ComponentCache, Session};

/// Usage line printed on argument errors.
pub const USAGE: &str = "usage: uimap <tree.yaml|tree.json> [--config FILE] [--definitions FILE] \
                         [--cache FILE] [--format yaml|json] | uimap --schema";

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// YAML mapping
    #[default]
    Yaml,
    /// Pretty-printed JSON object
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => bail!("unknown format '{}' (expected yaml or json)", other),
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scan a recorded tree
    Scan(Options),
    /// Print the JSON schema of the cache document
    Schema,
}

/// Options of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Options {
    /// Recorded accessibility tree
    pub tree: PathBuf,
    /// Configuration file
    pub config: Option<PathBuf>,
    /// Predeclared component definitions
    pub definitions: Option<PathBuf>,
    /// Component cache to resume from and write back
    pub cache: Option<PathBuf>,
    /// Output format
    pub format: OutputFormat,
}

impl Command {
    /// Parse command-line arguments (without the program name).
    pub fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Options::default();
        let mut tree = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--schema" => return Ok(Self::Schema),
                "--config" => options.config = Some(value(&mut args, &arg)?.into()),
                "--definitions" => options.definitions = Some(value(&mut args, &arg)?.into()),
                "--cache" => options.cache = Some(value(&mut args, &arg)?.into()),
                "--format" => options.format = value(&mut args, &arg)?.parse()?,
                flag if flag.starts_with("--") => bail!("unknown option '{}'\n{}", flag, USAGE),
                _ if tree.is_some() => bail!("unexpected argument '{}'\n{}", arg, USAGE),
                _ => tree = Some(PathBuf::from(&arg)),
            }
        }
        options.tree = tree.with_context(|| format!("missing recorded tree\n{USAGE}"))?;
        Ok(Self::Scan(options))
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<String> {
    args.next()
        .with_context(|| format!("{flag} needs a value\n{USAGE}"))
}

/// Load the configuration named by `path`, or the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PerceptionConfig> {
    match path {
        Some(path) => PerceptionConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PerceptionConfig::default()),
    }
}

/// Scan the recorded tree and return its label to locator map.
///
/// With `--cache`, an existing cache is reused as the definition set when
/// `cache.enabled` is set, and the fresh scan is written back.
pub fn scan(options: &Options, config: PerceptionConfig) -> anyhow::Result<BTreeMap<String, String>> {
    let driver = MemoryDriver::from_file(&options.tree)
        .with_context(|| format!("failed to read recorded tree {}", options.tree.display()))?;
    let cache_path = options.cache.as_deref().map(|p| cache_file(p, &config));

    let mut session = match cache_path.as_deref() {
        Some(path) if config.cache.enabled && path.exists() => {
            let cache = ComponentCache::load(path)
                .with_context(|| format!("failed to read cache {}", path.display()))?;
            Session::from_cache(driver, config, cache)
        }
        _ => {
            let definitions = match options.definitions.as_deref() {
                Some(path) => load_definitions(path)
                    .with_context(|| format!("failed to read definitions {}", path.display()))?,
                None => Vec::new(),
            };
            Session::new(driver, config).with_definitions(definitions)
        }
    };

    let map = session
        .load()
        .with_context(|| format!("failed to scan {}", options.tree.display()))?
        .label_map();

    if let Some(path) = cache_path.as_deref() {
        session
            .cache()?
            .save(path)
            .with_context(|| format!("failed to write cache {}", path.display()))?;
    }
    info!("{} component(s) mapped", map.len());
    Ok(map)
}

/// Cache file path; a path without extension takes `cache.format`.
fn cache_file(path: &Path, config: &PerceptionConfig) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(&config.cache.format)
    }
}

/// Render a label to locator map.
pub fn render(map: &BTreeMap<String, String>, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(map)?,
        OutputFormat::Json => serde_json::to_string_pretty(map)?,
    })
}

/// Render the JSON schema of the cache document.
pub fn render_schema() -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&ComponentCache::json_schema())?)
}
