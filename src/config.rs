use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Environment variable naming the listings file when none is given.
pub const DATA_ENV: &str = "HOUSE_DASH_DATA";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listings file opened at start-up.
    pub data_path: Option<PathBuf>,
    /// Number of bins in the price and carpet-area histograms.
    pub histogram_bins: usize,
    /// Floors at or above this are left out of the floor chart.
    pub max_floor: i64,
    /// Print the KPI block and exit instead of opening a window.
    #[serde(skip)]
    pub summary_only: bool,
    /// Locations applied to the `--summary` report.
    #[serde(skip)]
    pub locations: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            histogram_bins: 40,
            max_floor: 50,
            summary_only: false,
            locations: Vec::new(),
        }
    }
}

impl DashboardConfig {
    /// Build the configuration from the process arguments and environment.
    pub fn from_env() -> Result<Self> {
        Self::from_args(std::env::args().skip(1), std::env::var_os(DATA_ENV).map(PathBuf::from))
    }

    /// `[PATH] [--config FILE] [--summary] [--location NAME]...`
    ///
    /// Precedence for the data path: positional argument, config file,
    /// then `env_path`.
    pub fn from_args(
        args: impl IntoIterator<Item = String>,
        env_path: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config_file: Option<PathBuf> = None;
        let mut positional: Option<PathBuf> = None;
        let mut summary_only = false;
        let mut locations = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let file = args.next().context("--config needs a file path")?;
                    config_file = Some(PathBuf::from(file));
                }
                "--summary" => summary_only = true,
                "--location" => {
                    locations.push(args.next().context("--location needs a name")?);
                }
                flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
                _ if positional.is_some() => bail!("unexpected argument: {arg}"),
                _ => positional = Some(PathBuf::from(&arg)),
            }
        }

        let mut config = match &config_file {
            Some(file) => Self::from_file(file)?,
            None => Self::default(),
        };
        if positional.is_some() {
            config.data_path = positional;
        }
        if config.data_path.is_none() {
            config.data_path = env_path;
        }
        if config.histogram_bins == 0 {
            bail!("histogram_bins must be at least 1");
        }
        config.summary_only = summary_only;
        config.locations = locations;
        Ok(config)
    }

    /// Read a JSON config file: `{ "data_path": "...", "histogram_bins": 40, "max_floor": 50 }`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
