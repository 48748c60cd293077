use clap::Parser;
use hazards::config::{Command, PreviewArgs};
use hazards::core::loader::FirePointDataLoader;
use hazards::domain::ports::ConfigProvider;
use hazards::utils::error::{ErrorSeverity, HazardsError};
use hazards::utils::{logger, validation::Validate};
use hazards::{CliConfig, EtlEngine, FirePipeline, HazardsConfig, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting hazards CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let force_reload = cli.force_reload();
    let outcome = match &cli.command {
        Command::Run(args) => {
            if args.dry_run {
                tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
                display_config_summary(&config);
                return Ok(());
            }
            run(config, force_reload).await
        }
        Command::Validate(_) => validate(config, force_reload).await,
        Command::Preview(args) => preview(config, args, force_reload).await,
    };

    if let Err(e) = outcome {
        exit_with(e);
    }

    Ok(())
}

async fn run(config: HazardsConfig, force_reload: bool) -> hazards::Result<()> {
    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = FirePipeline::new(storage, config).with_force_reload(force_reload);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    let output_path = engine.run().await?;
    tracing::info!("✅ Fire map generated successfully!");
    println!("✅ Fire map generated successfully!");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}

async fn validate(config: HazardsConfig, force_reload: bool) -> hazards::Result<()> {
    let tolerance = config.validation.tolerance;
    let fail_on_unhealthy = config.validation.fail_on_unhealthy;
    let loader = FirePointDataLoader::new(config).with_tolerance(tolerance);
    let fires = loader.load(force_reload, true).await?;

    let Some(report) = loader.last_report().await else {
        return Ok(());
    };

    println!("📋 Validation Report {}", report.tag);
    println!("  Rows:      {}", report.total);
    println!("  Valid:     {}", fires.len());
    println!("  Skipped:   {}", report.skipped);
    println!("  Pass rate: {:.2}%", report.pass_rate * 100.0);
    println!("  Tolerance: {:.2}%", report.tolerance * 100.0);

    if report.healthy {
        println!("✅ Data is healthy");
    } else {
        println!("⚠️ Data is unhealthy");
    }

    report.ensure_healthy(fail_on_unhealthy)
}

async fn preview(
    config: HazardsConfig,
    args: &PreviewArgs,
    force_reload: bool,
) -> hazards::Result<()> {
    let rows = args.rows.unwrap_or(config.map.preview_rows);
    let validate = config.validation.enabled;
    let tolerance = config.validation.tolerance;
    let loader = FirePointDataLoader::new(config).with_tolerance(tolerance);
    let fires = loader.load(force_reload, validate).await?;

    println!("🔥 First {} of {} fire points", rows.min(fires.len()), fires.len());
    for fire in fires.iter().take(rows) {
        println!("  {}", fire);
    }
    Ok(())
}

fn display_config_summary(config: &HazardsConfig) {
    println!("📋 Configuration Summary:");
    println!("  Source: {}", config.source());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    println!("  View: {}", config.map.view);
    if let Some(since) = &config.map.since {
        println!("  Since: {}", since);
    }
    println!("  Validation: {}", config.validation.enabled);
    if let Some(archive) = config.compression_filename() {
        println!("  Archive: {}", archive);
    }
    println!("  🔍 DRY RUN MODE ENABLED");
}

fn exit_with(e: HazardsError) -> ! {
    tracing::error!(
        "❌ Hazards run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };

    std::process::exit(exit_code);
}
