use super::FileCollection;
use crate::api::credentials::Credential;
use clap::ValueEnum;

/// A sketch image to be sent inline with a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Payload for the first pass: sketches in, full project out.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub images: Vec<ImageInput>,
    pub instructions: String,
    pub credential: Credential,
}

/// Payload for a follow-up pass over an existing project.
#[derive(Debug, Clone)]
pub struct RefinementRequest {
    pub current_files: FileCollection,
    pub instruction: String,
    /// Full prompt text, including the serialized file blocks.
    pub prompt: String,
    pub credential: Credential,
}

/// One-click refinements offered next to the free-form instruction.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementPreset {
    /// Add entrance animations to containers, cards and list items.
    Animate,
    /// Turn static markup into a working app with state and handlers.
    Functional,
}

impl RefinementPreset {
    pub fn instruction(&self) -> &'static str {
        match self {
            RefinementPreset::Animate => {
                "Add smooth Framer Motion entrance animations to the main container, cards, \
                 and list items. Use simple fade-in and slide-up variants. Ensure 'use client' \
                 is added."
            }
            RefinementPreset::Functional => {
                "Make the app functional. 1) Convert static data to React state using useState. \
                 2) Implement simple handle functions for buttons. 3) Add proper 'next/link' \
                 navigation. 4) If there are forms, add onSubmit handlers that alert/log the data."
            }
        }
    }

    pub fn progress_message(&self) -> &'static str {
        match self {
            RefinementPreset::Animate => "Adding animations...",
            RefinementPreset::Functional => "Wiring up logic...",
        }
    }
}
