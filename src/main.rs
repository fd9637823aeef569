use cda_problems::utils::error::ProblemsError;
use cda_problems::utils::logger;
use cda_problems::{CliConfig, ExtractionEngine, LocalStorage, ProblemsPipeline};
use clap::Parser;

fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    let pipeline = ProblemsPipeline::new(LocalStorage::default(), config);
    let engine = ExtractionEngine::new(pipeline);

    match engine.run() {
        Ok(summary) => {
            println!("Extracted {} problems", summary.problem_count);
            for warning in &summary.warnings {
                println!(
                    "Skipped entry #{}: missing {}",
                    warning.index + 1,
                    warning.missing
                );
            }
            for path in &summary.written {
                println!("Output saved to: {}", path);
            }
        }
        Err(e) => {
            tracing::error!(
                "Problem extraction failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    }
}

fn exit_code(e: &ProblemsError) -> i32 {
    match e {
        ProblemsError::UnsupportedDialect { .. } | ProblemsError::UnrecognizedDocument { .. } => 2,
        _ => 1,
    }
}
