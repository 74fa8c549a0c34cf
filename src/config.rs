use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration.
///
/// Loaded from a TOML file with a `[model]` and a `[driver]` table.
/// Missing keys (or whole tables) take their default values.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub model: ModelConfig,
    pub driver: DriverConfig,
}

/// Parameters of the simulated model.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Number of entities in population A.
    pub n_as: usize,
    /// Number of entities in population B.
    pub n_bs: usize,
    /// Number of pairs sampled per tick.
    pub n_pairs: usize,
    /// Upper bound of the random position increment.
    pub learning_rate: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_as: 10,
            n_bs: 10,
            n_pairs: 8,
            learning_rate: 0.2,
        }
    }
}

/// Parameters of the tick cadence.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Time between ticks in milliseconds.
    pub tick_interval_ms: u64,
    /// Stop after this many ticks (run forever if absent).
    pub max_ticks: Option<u64>,
    /// Seed of the random number generator (OS entropy if absent).
    pub seed: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1200,
            max_ticks: None,
            seed: None,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.model.validate()
    }
}

impl ModelConfig {
    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        check_num(self.n_as, 1..).context("invalid number of A entities")?;
        check_num(self.n_bs, 1..).context("invalid number of B entities")?;
        check_num(self.learning_rate, 0.0..f64::INFINITY).context("invalid learning rate")?;
        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
