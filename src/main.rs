use catalog_sheets::utils::error::ErrorSeverity;
use catalog_sheets::utils::{logger, validation::Validate};
use catalog_sheets::{CatalogConfig, CatalogError, CatalogPipeline, Cli, Command, EtlEngine};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_logger(cli.verbose, cli.log_json);

    tracing::info!("🚀 Starting catalog-sheets");
    tracing::info!("📁 Loading configuration from: {}", cli.config);

    let config = match CatalogConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let validation = match &cli.command {
        Command::Fetch { .. } => config.validate_fetch(),
        Command::Transcribe { .. } => config.validate_transcribe(),
        Command::Run { .. } => config.validate(),
    };
    if let Err(e) = validation {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    if cli.command.dry_run() {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        print_plan(&config, &cli.command);
        return Ok(());
    }

    let monitor_enabled = cli.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = CatalogPipeline::from_config(&config)?;
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    let outcome = match cli.command {
        Command::Fetch { .. } => engine
            .fetch()
            .await
            .map(|count| format!("{} responses saved to {}", count, config.output_dir())),
        Command::Transcribe { .. } => engine
            .transcribe()
            .await
            .map(|path| format!("Workbook saved to {}", path)),
        Command::Run { .. } => engine
            .run()
            .await
            .map(|path| format!("Workbook saved to {}", path)),
    };

    match outcome {
        Ok(summary) => {
            tracing::info!("✅ {}", summary);
            println!("✅ {}", summary);
            Ok(())
        }
        Err(e) => {
            report_failure(&e);
            std::process::exit(exit_code(&e));
        }
    }
}

fn report_failure(e: &CatalogError) {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    if let CatalogError::ResponsesFailed { failures, .. } = e {
        for failure in failures {
            eprintln!("❌ {}: {}", failure.response, failure.error);
        }
    } else {
        eprintln!("❌ {}", e.user_friendly_message());
    }
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}

fn exit_code(e: &CatalogError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn print_plan(config: &CatalogConfig, command: &Command) {
    println!("📋 Plan:");

    if command.fetches() {
        println!();
        println!("📡 Fetch → {}", config.output_dir());
        println!("  Timeout: {:?}", config.timeout());
        match config.api_key() {
            Some(key) => println!("  API key: sent as '{}'", key.param),
            None => println!("  API key: none"),
        }
        for endpoint in config.endpoints() {
            let params: Vec<String> = endpoint
                .query_pairs()
                .into_iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect();
            println!(
                "  {:<20} GET {} [{}] -> {}",
                endpoint.kind,
                endpoint.url,
                params.join("&"),
                endpoint.file_name
            );
        }
    }

    if command.transcribes() {
        println!();
        println!(
            "📝 Transcribe {} → {}",
            config.input_dir(),
            config.workbook_path().display()
        );
        for response in config.responses() {
            println!(
                "  {:<20} {} -> '{}' from row {} ({:?}{})",
                response.kind,
                response.file_name,
                response.sheet_name,
                response.start_row,
                response.mode,
                response
                    .dump_key
                    .as_deref()
                    .map(|key| format!(", key '{}'", key))
                    .unwrap_or_default()
            );
            if !response.header_attributes.is_empty() {
                println!("  {:<20} header: {}", "", response.header_attributes.join(", "));
            }
        }
    }

    println!();
    println!("✅ Dry run complete.");
}
