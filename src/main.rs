/*!
 * Command-line interface for project-context
 */

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

use project_context::config::{Args, Config};
use project_context::report::{ReportFormat, Reporter};
use project_context::ContextAssembler;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Parse command line arguments
    let args = Args::parse();

    // Create and validate configuration
    let config = match Config::from_args(args).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let reset = config.reset;
    let assembler = ContextAssembler::new(config);

    match assembler.run() {
        Ok(report) => {
            log::info!(
                "Config file {} successfully at {}",
                if reset { "reset" } else { "updated" },
                report.config_file
            );
            Reporter::new(ReportFormat::ConsoleTable).print_report(&report);
            ExitCode::SUCCESS
        }
        // The sync step is abandoned and no output is written
        Err(e) if e.is_config_error() => {
            log::error!("Error: {}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
