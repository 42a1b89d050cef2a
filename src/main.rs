use clap::Parser;
use parking_sync::core::ConfigProvider;
use parking_sync::utils::{logger, validation::Validate};
use parking_sync::{
    CliConfig, ConsoleMap, ConsoleNotifier, ControllerSettings, HttpFacilityRepository,
    LifecycleEvent, TomlConfig, ViewController,
};
use std::time::Duration;

fn load_config(cli: &CliConfig) -> parking_sync::Result<Box<dyn ConfigProvider>> {
    match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = TomlConfig::from_file(path)?;
            config.validate()?;
            Ok(Box::new(config))
        }
        None => {
            cli.validate()?;
            Ok(Box::new(cli.clone()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting parking-sync");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let repository = HttpFacilityRepository::from_config(config.as_ref())?;
    tracing::info!("Polling {} every {:?}", repository.lots_url(), config.poll_interval());

    let mut controller = ViewController::new(
        repository,
        ConsoleMap::new(),
        ConsoleNotifier,
        ControllerSettings::from_config(config.as_ref()),
    );

    controller.on_lifecycle(LifecycleEvent::Activated);

    match cli.run_for_secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                    tracing::info!("Run time of {}s elapsed", secs);
                }
                result = tokio::signal::ctrl_c() => result?,
            }
        }
        None => tokio::signal::ctrl_c().await?,
    }

    // 停止輪詢並等待背景任務結束
    controller.on_lifecycle(LifecycleEvent::Deactivated);
    controller.teardown().await;
    println!("✅ Stopped");

    Ok(())
}
