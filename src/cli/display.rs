use crate::errors::AppError;
use crate::models::{FileCollection, GeneratedFile};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use similar::{ChangeTag, TextDiff};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

/// How a file differs between two versions of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Added { path: String, lines: usize },
    Modified { path: String, insertions: usize, deletions: usize },
}

/// Lists added and modified files, in the order of `current`.
pub fn summarize_changes(previous: &FileCollection, current: &FileCollection) -> Vec<FileChange> {
    current
        .iter()
        .filter_map(|file| match previous.get(&file.path) {
            None => Some(FileChange::Added {
                path: file.path.clone(),
                lines: file.content.lines().count(),
            }),
            Some(old) if old.content != file.content => {
                let diff = TextDiff::from_lines(&old.content, &file.content);
                let (mut insertions, mut deletions) = (0, 0);
                for change in diff.iter_all_changes() {
                    match change.tag() {
                        ChangeTag::Insert => insertions += 1,
                        ChangeTag::Delete => deletions += 1,
                        ChangeTag::Equal => {}
                    }
                }
                Some(FileChange::Modified {
                    path: file.path.clone(),
                    insertions,
                    deletions,
                })
            }
            Some(_) => None,
        })
        .collect()
}

/// Manages CLI display and output formatting.
pub struct CliDisplayManager {
    spinner: Option<ProgressBar>,
}

impl CliDisplayManager {
    /// Creates a new `CliDisplayManager`.
    pub fn new() -> Self {
        CliDisplayManager { spinner: None }
    }

    /// Prints the application header.
    pub fn print_header(&self) {
        let title = format!("│  ✏️  Frame2Code v{:<7}│", env!("CARGO_PKG_VERSION"));
        println!("\n{}", "╭──────────────────────────╮".bright_magenta());
        println!("{}", title.bright_magenta().bold());
        println!("{}\n", "╰──────────────────────────╯".bright_magenta());
    }

    pub fn print_sketch_collection_start(&self, image_count: usize) {
        self.print_section(
            "🖼️",
            "[1/3] Reading Sketches",
            &format!("Found {} sketch(es), in this order:", image_count),
        );
    }

    pub fn print_sketch(&self, index: usize, path: &Path) {
        self.print_info(&format!("{}. {}", index + 1, path.display()));
    }

    pub fn print_generation_start(&self, model: &str) {
        self.print_section("⚓", "[2/3] Querying Gemini", &format!("Model: {}", model));
    }

    pub fn print_generation_success(&self, file_count: usize) {
        self.print_info(&format!("Received {} generated file(s)", file_count));
    }

    pub fn print_saving_results_start(&self) {
        self.print_section("💾", "[3/3] Saving Results", "");
    }

    pub fn print_saving_results_success(&self, saved: usize, directory: &Path) {
        self.print_info(&format!(
            "Saved {} file(s) to '{}'",
            saved,
            directory.display()
        ));
    }

    pub fn print_archive_success(&self, archive: &Path) {
        self.print_info(&format!("Packed project into '{}'", archive.display()));
    }

    pub fn print_raw_response_saved(&self, path: &Path) {
        self.print_info(&format!("Raw model output saved to '{}'", path.display()));
    }

    /// Lists the project files, marking the one selected for display.
    pub fn print_files(&self, files: &FileCollection, selected: Option<&str>) {
        for file in files {
            let marker = if Some(file.path.as_str()) == selected {
                "★".bright_yellow()
            } else {
                "·".bright_white()
            };
            println!(
                "     {} {} {}",
                marker,
                file.path.bright_white(),
                format!("({} lines)", file.content.lines().count()).dimmed()
            );
        }
    }

    pub fn print_file_content(&self, file: &GeneratedFile) {
        println!("{} {}", "📄".bright_yellow(), file.path.bright_cyan().bold());
        for (number, line) in file.content.lines().enumerate() {
            println!("{} {}", format!("{:>5} │", number + 1).dimmed(), line);
        }
    }

    pub fn print_refinement_start(&self, progress_message: &str) {
        self.print_section("🪄", "Refining Project", progress_message);
    }

    pub fn print_changes(&self, changes: &[FileChange]) {
        if changes.is_empty() {
            self.print_info("The model returned no changes");
            return;
        }
        for change in changes {
            match change {
                FileChange::Added { path, lines } => println!(
                    "     {} {} {}",
                    "+".bright_green().bold(),
                    path.bright_white(),
                    format!("(new, {} lines)", lines).dimmed()
                ),
                FileChange::Modified {
                    path,
                    insertions,
                    deletions,
                } => println!(
                    "     {} {} {} {}",
                    "~".bright_yellow().bold(),
                    path.bright_white(),
                    format!("+{}", insertions).green(),
                    format!("-{}", deletions).red()
                ),
            }
        }
    }

    /// Prints an error together with what the user can do next.
    pub fn print_error(&self, error: &AppError) {
        println!("{} {}", "✖".bright_red(), error.to_string().bright_red());
        let hint = match error {
            AppError::GenerationError(e) => Some(e.retry_hint()),
            AppError::MissingApiKey => Some(
                "Set a key with `frame2code model-config --set-api-key <KEY>` or GEMINI_API_KEY.",
            ),
            _ => None,
        };
        if let Some(hint) = hint {
            self.print_info(hint);
        }
    }

    /// Prints the application footer.
    pub fn print_footer(&self, file_count: usize, duration: Duration) {
        println!();
        println!(
            "{}",
            format!("⚡ Project has {} file(s)", file_count)
                .bright_white()
                .dimmed(),
        );
        println!(
            "{}",
            format!("⚡ Completed in {:.2?}", duration)
                .bright_white()
                .dimmed(),
        );
        println!();
    }

    pub fn print_interactive_help(&self) {
        self.print_section(
            "💬",
            "Interactive Refinement",
            "Type an instruction, or :animate, :functional, :files, :show <path>, :zip, :reset, :q",
        );
    }

    pub fn print_unknown_command(&self, command: &str) {
        println!(
            "{} {}",
            "✖".bright_red(),
            format!("Unknown command: {}", command).bright_red()
        );
    }

    /// Tells the user the session was dropped; files on disk are kept.
    pub fn print_session_reset(&self, project: &Path) {
        self.print_info(&format!(
            "Session reset. Files already saved in '{}' were kept; run `generate` to start over.",
            project.display()
        ));
    }

    /// Reads one line from stdin after printing `prompt`. `None` on EOF.
    pub fn read_line(&self, prompt: &str) -> io::Result<Option<String>> {
        print!("{} ", prompt.bright_cyan().bold());
        io::stdout().flush()?;
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Asks a yes/no question; anything but `y`/`yes` is a no.
    pub fn confirm(&self, question: &str) -> io::Result<bool> {
        let answer = self.read_line(&format!("{} [y/N]", question))?;
        Ok(matches!(
            answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y") | Some("yes")
        ))
    }

    /// Starts a spinner for ongoing operations.
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let template = format!(
            "   {} {{spinner}} {}",
            "→".bright_white(),
            message.italic().bright_white()
        );
        if let Ok(style) = ProgressStyle::with_template(&template) {
            spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Stops the spinner.
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Helper function to print a section header.
    fn print_section(&self, icon: &str, title: &str, description: &str) {
        println!("{} {}", icon.bright_yellow(), title.bright_cyan().bold());
        if !description.is_empty() {
            self.print_info(description);
        }
    }

    /// Helper function to print an informational message.
    fn print_info(&self, message: &str) {
        println!(
            "   {} {}",
            "→".bright_white(),
            message.italic().bright_white()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_added_and_modified_files() {
        let previous = FileCollection::from_files(vec![
            GeneratedFile::new("app/page.tsx", "a\nb\nc\n"),
            GeneratedFile::new("README.md", "# App\n"),
        ]);
        let current = FileCollection::from_files(vec![
            GeneratedFile::new("app/page.tsx", "a\nB\nc\nd\n"),
            GeneratedFile::new("README.md", "# App\n"),
            GeneratedFile::new("components/Nav.tsx", "nav\nbar\n"),
        ]);

        assert_eq!(
            summarize_changes(&previous, &current),
            vec![
                FileChange::Modified {
                    path: "app/page.tsx".to_string(),
                    insertions: 2,
                    deletions: 1,
                },
                FileChange::Added {
                    path: "components/Nav.tsx".to_string(),
                    lines: 2,
                },
            ]
        );
    }

    #[test]
    fn identical_projects_have_no_changes() {
        let files = FileCollection::from_files(vec![GeneratedFile::new("a.txt", "x")]);
        assert!(summarize_changes(&files, &files).is_empty());
    }
}
