use clap::Parser;
use nwb_model::utils::error::{ErrorSeverity, InterpreterError};
use nwb_model::utils::{logger, validation::Validate};
use nwb_model::{CliConfig, NwbModelInterpreter};
use std::path::PathBuf;

fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting nwb-model CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config) {
        tracing::error!(
            "❌ Model interpretation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn run(config: &CliConfig) -> Result<(), InterpreterError> {
    config.validate()?;
    let settings = config.interpreter_config()?;
    let interpreter = NwbModelInterpreter::new(settings);

    let session = interpreter.create_model(PathBuf::from(&config.source))?;
    let model_json = serde_json::to_string_pretty(&session.model)?;

    match &config.output {
        Some(path) => {
            std::fs::write(path, model_json)?;
            tracing::info!("📁 Model saved to: {}", path);
        }
        None => println!("{}", model_json),
    }

    for path in &config.resolve {
        let value = interpreter.resolve_value(&session, path)?;
        println!("{}", serde_json::to_string(&value)?);
    }

    Ok(())
}
