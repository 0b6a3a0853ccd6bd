mod api;
mod cli;
mod commands;
mod errors;
mod file_processing;
mod generation;
mod models;
mod utils;

use clap::Parser;
use cli::args::{Args, Commands};
use cli::display::CliDisplayManager;
use commands::Context;
use errors::AppError;
use utils::config::read_config;
use utils::logger;

/// The main entry point of the application
#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(err) = run(args).await {
        CliDisplayManager::new().print_error(&err);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    match args.command {
        Commands::Config {
            set_log_level,
            set_output_directory,
            set_model,
            set_max_output_tokens,
            set_timeout_secs,
        } => {
            commands::handle_config_subcommand(
                set_log_level,
                set_output_directory,
                set_model,
                set_max_output_tokens,
                set_timeout_secs,
            )
            .await
        }
        Commands::ModelConfig {
            set_api_key,
            set_temperature,
        } => commands::handle_model_config_subcommand(set_api_key, set_temperature).await,
        Commands::Package { project, archive } => {
            let config = read_config()?;
            logger::setup_logger(&config);
            commands::handle_package_subcommand(&project, archive).await
        }
        Commands::Generate {
            images,
            hint,
            output,
            zip,
            interactive,
        } => {
            let mut ctx = load_context()?;
            commands::handle_generate_subcommand(
                &mut ctx,
                &images,
                hint.as_deref(),
                output,
                zip,
                interactive,
            )
            .await
        }
        Commands::Refine {
            project,
            instruction,
            zip,
        } => {
            let mut ctx = load_context()?;
            commands::handle_refine_subcommand(&mut ctx, &project, &instruction, zip).await
        }
    }
}

/// Reads config, starts logging and builds the model client.
fn load_context() -> Result<Context, AppError> {
    let config = read_config()?;
    logger::setup_logger(&config);
    Context::new(config)
}
