use anyhow::Context;
use clap::Parser;
use sports_lake::config::toml_config::TomlConfig;
use sports_lake::utils::{logger, validation::Validate};
use sports_lake::{AwsServices, CliArgs, LakeConfig, LakeEngine, LakeError, LakeSettings};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, args.log_json);
    tracing::info!("Starting sports-lake");

    // 配置錯誤要在任何網路呼叫之前結束程式
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Resolved config: {:?}", config);

    let services = AwsServices::from_config(&config).await;
    let engine = match LakeEngine::new(
        config,
        services.store,
        services.catalog,
        services.query_engine,
    ) {
        Ok(engine) => engine,
        Err(e) => exit_with(&anyhow::Error::from(e)),
    };

    match engine.run().await {
        Ok(summary) => {
            match serde_json::to_string(&summary) {
                Ok(json) => tracing::info!("📋 Run summary: {}", json),
                Err(_) => tracing::info!("📋 Run summary: {:?}", summary),
            }
            println!("✅ Data lake setup complete.");
        }
        Err(e) => exit_with(&anyhow::Error::from(e)),
    }
}

fn load_config(args: &CliArgs) -> anyhow::Result<LakeConfig> {
    match dotenvy::from_path(&args.env_file) {
        Ok(()) => tracing::debug!("Loaded environment from {}", args.env_file.display()),
        Err(e) if e.not_found() => {
            tracing::debug!("No {} file, using process environment", args.env_file.display())
        }
        Err(e) => {
            return Err(LakeError::ConfigError {
                message: e.to_string(),
            })
            .with_context(|| format!("Error loading {}", args.env_file.display()))
        }
    }

    let file_settings = match &args.config {
        Some(path) => TomlConfig::from_file(path)
            .with_context(|| format!("Error reading settings from {}", path.display()))?
            .into_settings(),
        None => LakeSettings::default(),
    };

    let config = LakeConfig::from_env(file_settings.merge(args.settings()))?;
    config.validate()?;
    Ok(config)
}

/// One error line per failure; the recovery hint only shows with `--verbose`.
fn exit_with(err: &anyhow::Error) -> ! {
    tracing::error!("❌ {:#}", err);

    let code = match err.downcast_ref::<LakeError>() {
        Some(lake_error) => {
            tracing::debug!("💡 Suggestion: {}", lake_error.recovery_suggestion());
            lake_error.exit_code()
        }
        None => 1,
    };
    std::process::exit(code)
}
