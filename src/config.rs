//! Layered processing configuration: defaults, optional file, `INMET_*`
//! environment variables, then command-line overrides.

use crate::error::Result;
use crate::models::Variable;
use crate::utils::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_PREAMBLE_LINES};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProcessingConfig {
    #[validate(range(min = 1))]
    pub max_workers: usize,

    #[validate(range(min = 1))]
    pub chunk_size: usize,

    pub preamble_lines: usize,

    #[validate(length(min = 1))]
    pub variables: Vec<Variable>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            preamble_lines: DEFAULT_PREAMBLE_LINES,
            variables: Variable::ALL.to_vec(),
        }
    }
}

impl ProcessingConfig {
    /// Defaults, then `file` when given, then `INMET_*` environment variables
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("max_workers", defaults.max_workers as u64)?
            .set_default("chunk_size", defaults.chunk_size as u64)?
            .set_default("preamble_lines", defaults.preamble_lines as u64)?
            .set_default(
                "variables",
                defaults
                    .variables
                    .iter()
                    .map(|v| v.config_name().to_string())
                    .collect::<Vec<String>>(),
            )?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix("INMET")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("variables"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides and re-validate
    pub fn with_overrides(
        mut self,
        max_workers: Option<usize>,
        chunk_size: Option<usize>,
    ) -> Result<Self> {
        if let Some(max_workers) = max_workers {
            self.max_workers = max_workers;
        }
        if let Some(chunk_size) = chunk_size {
            self.chunk_size = chunk_size;
        }
        self.validate()?;
        Ok(self)
    }
}
