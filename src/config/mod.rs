pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use crate::adapters::llm::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
    use crate::core::normalizer::UnmatchedNamePolicy;
    use crate::core::rounding::RoundingMode;
    use crate::core::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "bill-split")]
    #[command(about = "Split a shared bill described in plain text")]
    pub struct CliConfig {
        /// Bill description, e.g. "jack and jill split $20, total was $25"
        pub text: Option<String>,

        /// Read the bill description from a file instead
        #[arg(long)]
        pub input_file: Option<String>,

        /// The input is already an extracted JSON document; skip the extraction service
        #[arg(long)]
        pub json: bool,

        /// TOML configuration file; replaces the settings below
        #[arg(short, long)]
        pub config: Option<String>,

        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        pub endpoint: String,

        #[arg(long, default_value = DEFAULT_MODEL)]
        pub model: String,

        #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
        pub api_key: Option<String>,

        #[arg(long, default_value = "30")]
        pub timeout_seconds: u64,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_value = "csv,tsv,json")]
        pub formats: Vec<String>,

        #[arg(long, value_enum, default_value_t = RoundingMode::HalfAwayFromZero)]
        pub rounding: RoundingMode,

        #[arg(long, value_enum, default_value_t = UnmatchedNamePolicy::Warn)]
        pub unmatched_names: UnmatchedNamePolicy,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub log_json: bool,
    }

    impl ConfigProvider for CliConfig {
        fn extractor_endpoint(&self) -> &str {
            &self.endpoint
        }

        fn model(&self) -> &str {
            &self.model
        }

        fn api_key(&self) -> Option<&str> {
            self.api_key.as_deref().filter(|key| !key.is_empty())
        }

        fn timeout_seconds(&self) -> u64 {
            self.timeout_seconds
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn rounding(&self) -> RoundingMode {
            self.rounding
        }

        fn unmatched_names(&self) -> UnmatchedNamePolicy {
            self.unmatched_names
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            if !self.json {
                validation::validate_url("endpoint", &self.endpoint)?;
                validation::validate_non_empty_string("model", &self.model)?;
            }
            validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
            validation::validate_path("output_path", &self.output_path)?;
            validation::validate_output_formats("formats", &self.formats)?;
            Ok(())
        }
    }

}
