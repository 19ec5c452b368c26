use crate::adapters::llm::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::core::normalizer::UnmatchedNamePolicy;
use crate::core::rounding::RoundingMode;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, SplitError};
use crate::utils::validation::{self, Validate, SUPPORTED_OUTPUT_FORMATS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub calculation: CalculationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationConfig {
    #[serde(default)]
    pub rounding: RoundingMode,
    #[serde(default)]
    pub unmatched_names: UnmatchedNamePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_formats() -> Vec<String> {
    SUPPORTED_OUTPUT_FORMATS.iter().map(|f| f.to_string()).collect()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SplitError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SplitError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GROQ_API_KEY})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SplitError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("extractor.endpoint", &self.extractor.endpoint)?;
        validation::validate_non_empty_string("extractor.model", &self.extractor.model)?;
        validation::validate_range(
            "extractor.timeout_seconds",
            self.extractor.timeout_seconds,
            1,
            300,
        )?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_output_formats("output.formats", &self.output.formats)?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn extractor_endpoint(&self) -> &str {
        &self.extractor.endpoint
    }

    fn model(&self) -> &str {
        &self.extractor.model
    }

    fn api_key(&self) -> Option<&str> {
        // 未設定的 ${VAR} 不當成金鑰送出
        self.extractor
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty() && !key.starts_with("${"))
    }

    fn timeout_seconds(&self) -> u64 {
        self.extractor.timeout_seconds
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn rounding(&self) -> RoundingMode {
        self.calculation.rounding
    }

    fn unmatched_names(&self) -> UnmatchedNamePolicy {
        self.calculation.unmatched_names
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
