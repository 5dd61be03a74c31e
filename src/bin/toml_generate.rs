use anyhow::Context;
use clap::Parser;
use epd_ifc::config::toml_config::TomlConfig;
use epd_ifc::core::{ConfigProvider, Pipeline};
use epd_ifc::utils::{logger, validation::Validate};
use epd_ifc::{EtlEngine, IfcPipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-generate")]
#[command(about = "Generate an IFC model from a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "epd-ifc.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override demo mode from config
    #[arg(long)]
    demo: Option<bool>,

    /// Override the product data file from config
    #[arg(long)]
    product_data: Option<String>,

    /// Override the output file name from config
    #[arg(long)]
    file_name: Option<String>,

    /// Read and embed the templates, but write nothing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose
        || matches!(
            config.log_level().map(str::to_ascii_lowercase).as_deref(),
            Some("debug" | "trace")
        );
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting TOML-based IFC generation");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(demo) = args.demo {
        config.product.demo = demo;
        tracing::info!("🔧 Demo mode overridden to: {}", demo);
    }
    if let Some(product_data) = args.product_data.clone() {
        tracing::info!("🔧 Product data overridden to: {}", product_data);
        config.product.data = Some(product_data);
    }
    if let Some(file_name) = args.file_name.clone() {
        tracing::info!("🔧 File name overridden to: {}", file_name);
        config.output.file_name = file_name;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        return perform_dry_run(config).await;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = IfcPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ IFC model generated");
            println!("✅ IFC model generated");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Project: {}", config.project_name());
    println!(
        "  Object: {} ({})",
        config.object_name(),
        config.object_class()
    );
    match config.product_data() {
        Some(path) if !config.demo() => println!("  Product data: {}", path),
        _ => println!("  Product data: none (demo mode)"),
    }
    println!(
        "  Output: {}/{}.ifc{}",
        config.output_path(),
        config.file_name(),
        if config.archive() { " (+ .ifczip)" } else { "" }
    );
    println!("  Templates:");
    for (name, path) in config.template_paths().entries() {
        println!("    {}: {}", name, path);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = IfcPipeline::new(storage, config);

    let source = pipeline
        .extract()
        .await
        .context("failed to read the templates or product data")?;

    println!("📑 Templates:");
    println!("  Property sets: {}", source.catalog.property_sets.len());
    println!("  Enumerations: {}", source.catalog.enumerations.len());
    println!("  Complex properties: {}", source.catalog.complex_properties.len());
    println!("  Indicator tables: {}", source.catalog.indicator_rows.len());
    println!("  Information modules: {}", source.catalog.module_columns.len());

    let generated = pipeline
        .transform(source)
        .await
        .context("failed to build the IFC model")?;

    println!();
    println!("🏗️ Model:");
    println!("  Entities: {}", generated.model.len());
    println!("  Property sets: {}", generated.report.property_sets);
    println!("  Properties: {}", generated.report.properties);
    println!("  Indicator tables: {}", generated.report.tables);
    println!(
        "  Skipped: {} property sets, {} properties",
        generated.report.empty_property_sets, generated.report.skipped_properties
    );

    println!();
    println!("📊 Embed report:");
    println!(
        "{}",
        serde_json::to_string_pretty(&generated.report).context("failed to serialise the report")?
    );

    println!();
    println!("✅ Dry run analysis complete. Nothing was written.");

    Ok(())
}
