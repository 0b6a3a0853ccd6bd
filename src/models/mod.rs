pub mod request;

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// True when `path` stays inside the project root: not blank, not absolute,
/// no `..` segments.
pub fn is_project_relative(path: &str) -> bool {
    !path.trim().is_empty()
        && Path::new(path)
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// A single file of a generated project, keyed by its relative path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        GeneratedFile {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn has_project_relative_path(&self) -> bool {
        is_project_relative(&self.path)
    }
}

/// The only response shape the model is allowed to produce.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub files: Vec<GeneratedFile>,
}

/// Ordered set of generated files with unique paths.
///
/// Order is kept for stable display only; lookups are by path.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct FileCollection(Vec<GeneratedFile>);

impl FileCollection {
    pub fn new() -> Self {
        FileCollection(Vec::new())
    }

    /// Builds a collection from raw files. A repeated path overwrites the
    /// content of its first occurrence and keeps that position.
    pub fn from_files(files: Vec<GeneratedFile>) -> Self {
        let mut collection = FileCollection::new();
        for file in files {
            collection.upsert(file);
        }
        collection
    }

    fn upsert(&mut self, file: GeneratedFile) {
        match self.0.iter_mut().find(|existing| existing.path == file.path) {
            Some(existing) => existing.content = file.content,
            None => self.0.push(file),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneratedFile> {
        self.0.iter()
    }

    pub fn get(&self, path: &str) -> Option<&GeneratedFile> {
        self.0.iter().find(|file| file.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|file| file.path.as_str())
    }

    pub fn as_slice(&self) -> &[GeneratedFile] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<GeneratedFile> {
        self.0
    }
}

impl<'a> IntoIterator for &'a FileCollection {
    type Item = &'a GeneratedFile;
    type IntoIter = std::slice::Iter<'a, GeneratedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
