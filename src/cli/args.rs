use crate::models::request::RefinementPreset;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the Frame2Code application.
#[derive(Parser, Debug, PartialEq, Clone)]
#[command(version, about = "Turn UI sketches into a front-end project", long_about = None)]
pub struct Args {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Refinement instruction, free-form or one of the presets.
#[derive(ClapArgs, Debug, PartialEq, Clone)]
#[group(required = true, multiple = false)]
pub struct InstructionArgs {
    /// Natural-language change to apply.
    #[arg(short, long)]
    pub instruction: Option<String>,

    /// Apply a predefined refinement.
    #[arg(long, value_enum)]
    pub preset: Option<RefinementPreset>,
}

impl InstructionArgs {
    /// The instruction text and the progress message to show while it runs.
    pub fn resolve(&self) -> (String, String) {
        match (&self.instruction, self.preset) {
            (_, Some(preset)) => (
                preset.instruction().to_string(),
                preset.progress_message().to_string(),
            ),
            (Some(instruction), None) => (instruction.clone(), "Refining code...".to_string()),
            (None, None) => (String::new(), String::new()),
        }
    }
}

/// Subcommands for the Frame2Code application.
#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum Commands {
    /// Generate a project from sketch images or directories of sketches.
    Generate {
        /// Sketch images, in screen order. Directories are read in name order.
        #[arg(required = true, num_args = 1..)]
        images: Vec<PathBuf>,

        /// Extra notes for the model.
        #[arg(long)]
        hint: Option<String>,

        /// Project directory, defaults to `frame2code.output` in the output directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also pack the project into a zip archive.
        #[arg(long)]
        zip: bool,

        /// Keep the session open and read refinement instructions from stdin.
        #[arg(short, long)]
        interactive: bool,
    },

    /// Refine a previously generated project in place.
    Refine {
        /// Project directory to refine.
        #[arg(short, long)]
        project: PathBuf,

        #[command(flatten)]
        instruction: InstructionArgs,

        /// Also pack the refined project into a zip archive.
        #[arg(long)]
        zip: bool,
    },

    /// Pack a project directory into a zip archive.
    Package {
        /// Project directory to pack.
        #[arg(short, long)]
        project: PathBuf,

        /// Archive path, defaults to `frame2code-project.zip` next to the project.
        #[arg(short, long)]
        archive: Option<PathBuf>,
    },

    /// Manage configuration options.
    Config {
        /// Set the log level (debug, info, warn, error, off).
        #[arg(long)]
        set_log_level: Option<String>,

        /// Set the output directory.
        #[arg(long)]
        set_output_directory: Option<String>,

        /// Set the model name.
        #[arg(long)]
        set_model: Option<String>,

        /// Set the output token budget per call.
        #[arg(long)]
        set_max_output_tokens: Option<u32>,

        /// Set the request timeout in seconds.
        #[arg(long)]
        set_timeout_secs: Option<u64>,
    },

    /// Manage model configuration options.
    ModelConfig {
        /// Set the API key for Gemini.
        #[arg(long)]
        set_api_key: Option<String>,

        /// Set the temperature for the model.
        #[arg(long)]
        set_temperature: Option<f32>,
    },
}
