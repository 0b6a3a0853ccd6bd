use super::builder::{build_generation_request, build_refinement_request};
use super::errors::GenerationError;
use super::reconciler::{merge_refinement, parse_response, select_default_view};
use crate::api::client::ModelClient;
use crate::api::credentials::CredentialProvider;
use crate::models::request::ImageInput;
use crate::models::{FileCollection, GeneratedFile};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Generating,
    Complete,
    Failed,
    Refining,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Generating => "generating",
            SessionState::Complete => "complete",
            SessionState::Failed => "failed",
            SessionState::Refining => "refining",
        };
        f.write_str(name)
    }
}

/// One user's working project.
///
/// Every call takes `&mut self`, so a session never has two model calls in
/// flight. The collection is swapped out only after a call fully succeeds.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    files: FileCollection,
    selected: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: SessionState::Idle,
            files: FileCollection::new(),
            selected: None,
        }
    }

    /// Starts a session from a project that already exists on disk.
    pub fn resume(files: FileCollection) -> Result<Self, GenerationError> {
        if files.is_empty() {
            return Err(GenerationError::InvalidState(
                "the project has no files to refine".to_string(),
            ));
        }
        let selected = select_default_view(files.as_slice())?.path.clone();
        Ok(Session {
            state: SessionState::Complete,
            files,
            selected: Some(selected),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn files(&self) -> &FileCollection {
        &self.files
    }

    /// The file currently selected for display.
    pub fn selected_file(&self) -> Option<&GeneratedFile> {
        self.selected
            .as_deref()
            .and_then(|path| self.files.get(path))
    }

    pub fn select(&mut self, path: &str) -> bool {
        if self.files.contains(path) {
            self.selected = Some(path.to_string());
            true
        } else {
            false
        }
    }

    /// Drops the project and returns to `Idle`.
    pub fn reset(&mut self) {
        log::info!("Dropping {} file(s)", self.files.len());
        self.files = FileCollection::new();
        self.selected = None;
        self.transition(SessionState::Idle);
    }

    fn transition(&mut self, next: SessionState) {
        log::debug!("session {} -> {}", self.state, next);
        self.state = next;
    }

    /// Runs the first pass and replaces the whole collection on success.
    pub async fn generate(
        &mut self,
        client: &dyn ModelClient,
        credentials: &dyn CredentialProvider,
        images: Vec<ImageInput>,
        hints: Option<&str>,
    ) -> Result<(), GenerationError> {
        if matches!(self.state, SessionState::Generating | SessionState::Refining) {
            return Err(GenerationError::InvalidState(format!(
                "a call is already {}",
                self.state
            )));
        }

        let had_files = !self.files.is_empty();
        self.transition(SessionState::Generating);

        match Self::run_generation(client, credentials, images, hints).await {
            Ok((files, selected)) => {
                log::info!("Generation produced {} file(s)", files.len());
                self.files = files;
                self.selected = Some(selected);
                self.transition(SessionState::Complete);
                Ok(())
            }
            Err(err) => {
                log::error!("Generation failed: {}", err);
                // Earlier work stays usable.
                let next = if had_files {
                    SessionState::Complete
                } else {
                    SessionState::Failed
                };
                self.transition(next);
                Err(err)
            }
        }
    }

    async fn run_generation(
        client: &dyn ModelClient,
        credentials: &dyn CredentialProvider,
        images: Vec<ImageInput>,
        hints: Option<&str>,
    ) -> Result<(FileCollection, String), GenerationError> {
        let request = build_generation_request(credentials, images, hints)?;
        let raw = client.generate(&request).await?;
        let files = parse_response(&raw)?;
        if files.is_empty() {
            return Err(GenerationError::EmptyCollection);
        }
        let files = FileCollection::from_files(files);
        let selected = select_default_view(files.as_slice())?.path.clone();
        Ok((files, selected))
    }

    /// Runs a refinement pass and merges the result.
    ///
    /// Returns the collection as it was before the merge. On failure the
    /// session stays `Complete` with that collection unchanged.
    pub async fn refine(
        &mut self,
        client: &dyn ModelClient,
        credentials: &dyn CredentialProvider,
        instruction: &str,
    ) -> Result<FileCollection, GenerationError> {
        if self.state != SessionState::Complete {
            return Err(GenerationError::InvalidState(format!(
                "cannot refine while {}",
                self.state
            )));
        }

        self.transition(SessionState::Refining);
        let result = Self::run_refinement(client, credentials, &self.files, instruction).await;
        self.transition(SessionState::Complete);

        let merged = match result {
            Ok(merged) => merged,
            Err(err) => {
                log::error!("Refinement failed: {}", err);
                return Err(err);
            }
        };

        log::info!(
            "Refinement merged into {} file(s), was {}",
            merged.len(),
            self.files.len()
        );
        let previous = std::mem::replace(&mut self.files, merged);

        let still_present = self
            .selected
            .as_deref()
            .map(|path| self.files.contains(path))
            .unwrap_or(false);
        if !still_present {
            self.selected = Some(select_default_view(self.files.as_slice())?.path.clone());
        }

        Ok(previous)
    }

    async fn run_refinement(
        client: &dyn ModelClient,
        credentials: &dyn CredentialProvider,
        current: &FileCollection,
        instruction: &str,
    ) -> Result<FileCollection, GenerationError> {
        let request = build_refinement_request(credentials, current, instruction)?;
        let raw = client.refine(&request).await?;
        let patch = parse_response(&raw)?;
        Ok(merge_refinement(current, patch))
    }
}
