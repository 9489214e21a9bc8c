use std::process::ExitCode;

use anyhow::Result;
use changeset_check::{validate_changeset, Config, OutputFormat, ValidationOutcome};

/// Exit status for a run that could not read its input
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(outcome) if outcome.fired() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run() -> Result<ValidationOutcome> {
    let (config, context) = Config::from_args_and_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    if let Some(path) = &config.config_path {
        log::debug!("Using settings from {}", path.display());
    }

    let outcome = validate_changeset(&context, &config)?;

    if let ValidationOutcome::Checked(report) = &outcome {
        match config.format {
            OutputFormat::Text => println!("{}", report),
            OutputFormat::Json => println!("{}", report.to_json()?),
        }
    }

    Ok(outcome)
}
