pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use adapters::ids::{RandomIds, SequentialIds};
pub use adapters::llm::{ChatCompletionsExtractor, JsonPassthrough};
pub use core::{
    calculator::{calculate, SplitCalculator},
    engine::{SplitEngine, SplitRun},
    normalizer::{Normalizer, RawBill, UnmatchedNamePolicy},
    pipeline::SplitPipeline,
    rounding::RoundingMode,
    session::BillSession,
};
pub use utils::error::{Result, SplitError, SplitValidationError};
