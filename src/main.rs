use bill_split::core::{render, ConfigProvider, Extractor};
use bill_split::utils::error::{ErrorSeverity, SplitError};
use bill_split::utils::{logger, validation::Validate};
use bill_split::{
    ChatCompletionsExtractor, CliConfig, JsonPassthrough, LocalStorage, SplitEngine, SplitPipeline,
    TomlConfig,
};
use clap::Parser;
use std::io::Read;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting bill-split CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let text = match read_input(&config) {
        Ok(text) => text,
        Err(e) => exit_with(&e),
    };

    let outcome = match config.config.as_deref() {
        Some(path) => {
            tracing::info!("📄 Loading configuration from {}", path);
            let toml_config = TomlConfig::from_file(path).and_then(|c| c.validate().map(|_| c));
            match toml_config {
                Ok(toml_config) => run(&text, config.json, toml_config).await,
                Err(e) => exit_with_config_error(&e),
            }
        }
        None => {
            // 驗證配置
            if let Err(e) = config.validate() {
                exit_with_config_error(&e);
            }
            let json = config.json;
            run(&text, json, config).await
        }
    };

    match outcome {
        Ok(true) => Ok(()),
        // 驗證失敗已經印出原因
        Ok(false) => std::process::exit(1),
        Err(e) => exit_with(&e),
    }
}

/// 回傳分帳是否成功；輸出檔無論成功與否都會寫入
async fn run<C: ConfigProvider>(text: &str, json: bool, config: C) -> Result<bool, SplitError> {
    if json {
        tracing::info!("⏭️  Input is already JSON, skipping extraction");
        run_with(text, JsonPassthrough, config).await
    } else {
        let extractor = ChatCompletionsExtractor::from_config(&config)?;
        run_with(text, extractor, config).await
    }
}

async fn run_with<E: Extractor, C: ConfigProvider>(
    text: &str,
    extractor: E,
    config: C,
) -> Result<bool, SplitError> {
    // 創建存儲和管道
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = SplitPipeline::new(extractor, storage, config);
    let engine = SplitEngine::new(pipeline);

    let run = engine.run(text).await?;

    print!("{}", render::render_report(&run.report));
    println!("📁 Output saved to: {}", run.output_path);

    match &run.report.outcome {
        Ok(_) => {
            tracing::info!("✅ Split completed successfully!");
            Ok(true)
        }
        Err(e) => {
            tracing::warn!("Bill is not ready to split: {}", e);
            Ok(false)
        }
    }
}

fn read_input(config: &CliConfig) -> Result<String, SplitError> {
    if let Some(text) = &config.text {
        return Ok(text.clone());
    }
    if let Some(path) = &config.input_file {
        return Ok(std::fs::read_to_string(path)?);
    }

    tracing::debug!("Reading bill description from stdin");
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

fn exit_with_config_error(e: &SplitError) -> ! {
    tracing::error!("❌ Configuration validation failed: {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(1);
}

fn exit_with(e: &SplitError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Split failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0, // 警告，但成功
        ErrorSeverity::Medium => 2, // 重試錯誤
        ErrorSeverity::High => 1,   // 處理錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    };
    std::process::exit(exit_code);
}
