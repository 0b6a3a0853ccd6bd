use crate::api::client::GeminiApi;
use crate::api::credentials::{
    ChainedCredentials, CredentialProvider, EnvCredentials, StaticCredentials,
};
use crate::cli::args::InstructionArgs;
use crate::cli::display::{summarize_changes, CliDisplayManager};
use crate::errors::AppError;
use crate::file_processing::packager::{self, DEFAULT_ARCHIVE_NAME};
use crate::file_processing::{reader, writer};
use crate::generation::errors::GenerationError;
use crate::generation::session::Session;
use crate::models::request::RefinementPreset;
use crate::utils::config::{read_config, write_config, Config};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Name of the project directory created inside the configured output directory.
pub const DEFAULT_PROJECT_DIR: &str = "frame2code.output";

/// Everything a model-backed command needs.
pub struct Context {
    pub config: Config,
    pub client: GeminiApi,
    pub credentials: ChainedCredentials,
    pub display: CliDisplayManager,
}

impl Context {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let client = GeminiApi::new(config.gemini_settings())?;
        let providers: Vec<Box<dyn CredentialProvider>> = vec![
            Box::new(StaticCredentials::new(config.api_key.clone())) as Box<dyn CredentialProvider>,
            Box::new(EnvCredentials),
        ];
        let credentials = ChainedCredentials::new(providers);
        Ok(Context {
            config,
            client,
            credentials,
            display: CliDisplayManager::new(),
        })
    }

    fn ensure_credentials(&self) -> Result<(), AppError> {
        if self.credentials.is_available() {
            Ok(())
        } else {
            Err(AppError::MissingApiKey)
        }
    }
}

/// Saves the raw text of a malformed response so the user can inspect it.
async fn keep_raw_response(ctx: &Context, err: &GenerationError, directory: &Path) {
    if let Some(raw) = err.raw_response() {
        match writer::save_raw_response(directory, raw).await {
            Ok(path) => ctx.display.print_raw_response_saved(&path),
            Err(e) => log::warn!("Could not save raw response: {}", e),
        }
    }
}

/// Handles the generate subcommand
pub async fn handle_generate_subcommand(
    ctx: &mut Context,
    images: &[PathBuf],
    hint: Option<&str>,
    output: Option<PathBuf>,
    zip: bool,
    interactive: bool,
) -> Result<(), AppError> {
    let start_time = Instant::now();
    ctx.ensure_credentials()?;

    let output_directory = output.unwrap_or_else(|| {
        Path::new(&ctx.config.output_directory).join(DEFAULT_PROJECT_DIR)
    });

    ctx.display.print_header();

    let image_paths = reader::collect_image_paths(images)?;
    if image_paths.is_empty() {
        return Err(AppError::InvalidInput(
            "No sketch images found in the given paths".to_string(),
        ));
    }
    ctx.display.print_sketch_collection_start(image_paths.len());
    for (index, path) in image_paths.iter().enumerate() {
        ctx.display.print_sketch(index, path);
    }
    let sketches = reader::read_images(&image_paths).await?;

    ctx.display.print_generation_start(&ctx.config.model);

    let mut session = Session::new();
    loop {
        ctx.display.start_spinner("Waiting for Gemini response");
        let result = session
            .generate(&ctx.client, &ctx.credentials, sketches.clone(), hint)
            .await;
        ctx.display.stop_spinner();

        let err = match result {
            Ok(()) => break,
            Err(err) => err,
        };

        keep_raw_response(ctx, &err, &output_directory).await;
        let retryable = !matches!(
            err,
            GenerationError::InvalidInput(_) | GenerationError::MissingCredential
        );
        let err = AppError::from(err);
        ctx.display.print_error(&err);
        if !retryable || !ctx.display.confirm("Retry generation?")? {
            return Err(err);
        }
    }

    ctx.display
        .print_generation_success(session.files().len());
    ctx.display.print_files(
        session.files(),
        session.selected_file().map(|file| file.path.as_str()),
    );

    save_project(ctx, &session, &output_directory, zip).await?;

    if interactive {
        run_interactive(ctx, &mut session, &output_directory).await?;
    }

    ctx.display
        .print_footer(session.files().len(), start_time.elapsed());
    Ok(())
}

/// Handles the refine subcommand
pub async fn handle_refine_subcommand(
    ctx: &mut Context,
    project: &Path,
    instruction: &InstructionArgs,
    zip: bool,
) -> Result<(), AppError> {
    let start_time = Instant::now();
    ctx.ensure_credentials()?;

    let (instruction, progress_message) = instruction.resolve();
    let files = reader::load_project(project).await?;
    let mut session = Session::resume(files)?;

    ctx.display.print_header();
    refine_and_save(ctx, &mut session, &instruction, &progress_message, project).await?;

    if zip {
        package_session(ctx, &session, project)?;
    }

    ctx.display
        .print_footer(session.files().len(), start_time.elapsed());
    Ok(())
}

/// Handles the package subcommand
pub async fn handle_package_subcommand(
    project: &Path,
    archive: Option<PathBuf>,
) -> Result<(), AppError> {
    let files = reader::load_project(project).await?;
    if files.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Nothing to pack in {}",
            project.display()
        )));
    }

    let archive = archive.unwrap_or_else(|| default_archive_path(project));
    packager::create_zip(&files, &archive)?;
    CliDisplayManager::new().print_archive_success(&archive);
    Ok(())
}

/// The archive goes next to the project directory, not inside it.
fn default_archive_path(project: &Path) -> PathBuf {
    project
        .parent()
        .map(|parent| parent.join(DEFAULT_ARCHIVE_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_NAME))
}

async fn save_project(
    ctx: &Context,
    session: &Session,
    output_directory: &Path,
    zip: bool,
) -> Result<(), AppError> {
    ctx.display.print_saving_results_start();
    let saved = writer::write_project(session.files(), output_directory).await?;
    ctx.display
        .print_saving_results_success(saved, output_directory);
    if zip {
        package_session(ctx, session, output_directory)?;
    }
    Ok(())
}

fn package_session(ctx: &Context, session: &Session, project: &Path) -> Result<(), AppError> {
    let archive = default_archive_path(project);
    packager::create_zip(session.files(), &archive)?;
    ctx.display.print_archive_success(&archive);
    Ok(())
}

/// Runs one refinement and writes the merged project back to disk.
async fn refine_and_save(
    ctx: &mut Context,
    session: &mut Session,
    instruction: &str,
    progress_message: &str,
    project: &Path,
) -> Result<(), AppError> {
    ctx.display.print_refinement_start(progress_message);
    ctx.display.start_spinner("Waiting for Gemini response");
    let result = session
        .refine(&ctx.client, &ctx.credentials, instruction)
        .await;
    ctx.display.stop_spinner();

    let previous = match result {
        Ok(previous) => previous,
        Err(err) => {
            keep_raw_response(ctx, &err, project).await;
            return Err(err.into());
        }
    };

    ctx.display
        .print_changes(&summarize_changes(&previous, session.files()));
    let saved = writer::write_project(session.files(), project).await?;
    ctx.display.print_saving_results_success(saved, project);
    Ok(())
}

/// One line typed in interactive mode.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InteractiveInput {
    Empty,
    Quit,
    Reset,
    Files,
    Zip,
    Show(String),
    Preset(RefinementPreset),
    Unknown(String),
    Instruction(String),
}

/// Lines starting with `:` are commands and never reach the model.
fn parse_interactive_line(line: &str) -> InteractiveInput {
    let line = line.trim();
    if line.is_empty() {
        return InteractiveInput::Empty;
    }
    let command = match line.strip_prefix(':') {
        Some(command) => command,
        None => return InteractiveInput::Instruction(line.to_string()),
    };

    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (command, ""),
    };
    match (name, argument) {
        ("q" | "quit" | "exit", "") => InteractiveInput::Quit,
        ("reset", "") => InteractiveInput::Reset,
        ("files", "") => InteractiveInput::Files,
        ("zip", "") => InteractiveInput::Zip,
        ("show", path) if !path.is_empty() => InteractiveInput::Show(path.to_string()),
        ("animate", "") => InteractiveInput::Preset(RefinementPreset::Animate),
        ("functional", "") => InteractiveInput::Preset(RefinementPreset::Functional),
        _ => InteractiveInput::Unknown(line.to_string()),
    }
}

/// Reads refinement instructions from stdin until `:q` or EOF.
async fn run_interactive(
    ctx: &mut Context,
    session: &mut Session,
    project: &Path,
) -> Result<(), AppError> {
    ctx.display.print_interactive_help();

    while let Some(line) = ctx.display.read_line("frame2code>")? {
        let outcome = match parse_interactive_line(&line) {
            InteractiveInput::Empty => continue,
            InteractiveInput::Quit => break,
            InteractiveInput::Reset => {
                session.reset();
                ctx.display.print_session_reset(project);
                break;
            }
            InteractiveInput::Files => {
                ctx.display.print_files(
                    session.files(),
                    session.selected_file().map(|file| file.path.as_str()),
                );
                Ok(())
            }
            InteractiveInput::Zip => package_session(ctx, session, project),
            InteractiveInput::Show(path) => {
                show_file(ctx, session, &path);
                Ok(())
            }
            InteractiveInput::Preset(preset) => run_preset(ctx, session, preset, project).await,
            InteractiveInput::Unknown(command) => {
                ctx.display.print_unknown_command(&command);
                ctx.display.print_interactive_help();
                Ok(())
            }
            InteractiveInput::Instruction(instruction) => {
                refine_and_save(ctx, session, &instruction, "Refining code...", project).await
            }
        };

        // A failed refinement leaves the session as it was; keep going.
        if let Err(err) = outcome {
            ctx.display.print_error(&err);
        }
    }

    log::debug!("Interactive session ended while {}", session.state());
    Ok(())
}

fn show_file(ctx: &Context, session: &mut Session, path: &str) {
    if session.select(path) {
        if let Some(file) = session.selected_file() {
            ctx.display.print_file_content(file);
        }
    } else {
        ctx.display
            .print_error(&AppError::InvalidInput(format!("No such file: {}", path)));
    }
}

async fn run_preset(
    ctx: &mut Context,
    session: &mut Session,
    preset: RefinementPreset,
    project: &Path,
) -> Result<(), AppError> {
    refine_and_save(
        ctx,
        session,
        preset.instruction(),
        preset.progress_message(),
        project,
    )
    .await
}

/// Handles the config subcommand
pub async fn handle_config_subcommand(
    set_log_level: Option<String>,
    set_output_directory: Option<String>,
    set_model: Option<String>,
    set_max_output_tokens: Option<u32>,
    set_timeout_secs: Option<u64>,
) -> Result<(), AppError> {
    let mut config = read_config()?;

    if let Some(log_level) = set_log_level {
        config.log_level = log_level.clone();
        println!("Log level set to {}", log_level);
    }

    if let Some(output_directory) = set_output_directory {
        config.output_directory = output_directory.clone();
        println!("Output directory set to {}", output_directory);
    }

    if let Some(model) = set_model {
        config.model = model.clone();
        println!("Model set to {}", model);
    }

    if let Some(max_output_tokens) = set_max_output_tokens {
        config.max_output_tokens = max_output_tokens;
        println!("Max output tokens set to {}", max_output_tokens);
    }

    if let Some(timeout_secs) = set_timeout_secs {
        config.timeout_secs = timeout_secs;
        println!("Timeout set to {}s", timeout_secs);
    }

    crate::utils::config::validate_config(&config)?;
    write_config(&config)?;
    Ok(())
}

/// Handles the model-config subcommand
pub async fn handle_model_config_subcommand(
    set_api_key: Option<String>,
    set_temperature: Option<f32>,
) -> Result<(), AppError> {
    let mut config = read_config()?;

    if let Some(api_key) = set_api_key {
        config.api_key = Some(api_key);
        println!("API key set");
    }

    if let Some(temperature) = set_temperature {
        config.temperature = temperature;
        println!("Temperature set to: {}", temperature);
    }

    crate::utils::config::validate_config(&config)?;
    write_config(&config)?;
    Ok(())
}
