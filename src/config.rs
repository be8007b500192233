// Runtime configuration
// Defaults match the files produced by the offline CRITIC/TOPSIS notebook.
// Overrides are plain command-line flags, parsed by hand.

use std::path::{Path, PathBuf};

pub const TIMESERIES_FILE: &str = "data_timeseries_bansos_jabar.csv";
pub const RANKING_FILE: &str = "hasil_spk_topsis.csv";
pub const EXPORT_FILE_NAME: &str = "Laporan_SPK_Bansos_Jabar.csv";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Regions preselected in the sidebar (best ranks first)
pub const DEFAULT_SELECTION_SIZE: usize = 5;

/// Bars shown in the ranking chart
pub const RANKING_CHART_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub timeseries_file: String,
    pub ranking_file: String,
    pub addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("."),
            timeseries_file: TIMESERIES_FILE.to_string(),
            ranking_file: RANKING_FILE.to_string(),
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl Config {
    pub fn with_data_dir(dir: impl AsRef<Path>) -> Self {
        Config {
            data_dir: dir.as_ref().to_path_buf(),
            ..Config::default()
        }
    }

    pub fn timeseries_path(&self) -> PathBuf {
        self.data_dir.join(&self.timeseries_file)
    }

    pub fn ranking_path(&self) -> PathBuf {
        self.data_dir.join(&self.ranking_file)
    }

    pub fn export_path(&self) -> PathBuf {
        self.data_dir.join(EXPORT_FILE_NAME)
    }

    /// Split `--data-dir` / `--addr` out of the argument list.
    ///
    /// Returns the config plus the remaining positional arguments.
    pub fn from_args<I>(args: I) -> anyhow::Result<(Config, Vec<String>)>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut positional = Vec::new();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--data-dir" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--data-dir needs a value"))?;
                    config.data_dir = PathBuf::from(value);
                }
                "--addr" => {
                    config.addr = iter
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--addr needs a value"))?;
                }
                flag if flag.starts_with("--") => {
                    anyhow::bail!("unknown flag: {}", flag);
                }
                _ => positional.push(arg),
            }
        }

        Ok((config, positional))
    }
}
