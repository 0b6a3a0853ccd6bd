//! Request construction for the generation and refinement passes.
//!
//! Both builders embed the JSON-only output contract in the instruction
//! text; the reconciler still checks the response on its own.

use super::errors::GenerationError;
use crate::api::config::{
    FILE_BLOCK_END, FILE_BLOCK_LABEL, FILE_BLOCK_START, GENERATION_PROMPT, OUTPUT_CONTRACT,
    REFINEMENT_PROMPT,
};
use crate::api::credentials::CredentialProvider;
use crate::models::request::{GenerationRequest, ImageInput, RefinementRequest};
use crate::models::FileCollection;

/// Builds the first-pass request from one or more sketches.
pub fn build_generation_request(
    credentials: &dyn CredentialProvider,
    images: Vec<ImageInput>,
    hints: Option<&str>,
) -> Result<GenerationRequest, GenerationError> {
    if images.is_empty() {
        return Err(GenerationError::InvalidInput(
            "at least one sketch image is required".to_string(),
        ));
    }

    let credential = credentials.acquire()?;

    let mut instructions = format!("{}\n\n{}", GENERATION_PROMPT, OUTPUT_CONTRACT);
    if let Some(hints) = hints.map(str::trim).filter(|hints| !hints.is_empty()) {
        instructions.push_str("\n\nADDITIONAL NOTES FROM THE USER:\n");
        instructions.push_str(hints);
    }

    log::debug!(
        "Built generation request with {} image(s), {} prompt chars",
        images.len(),
        instructions.len()
    );

    Ok(GenerationRequest {
        images,
        instructions,
        credential,
    })
}

/// Builds a refinement request over the current project.
pub fn build_refinement_request(
    credentials: &dyn CredentialProvider,
    current_files: &FileCollection,
    instruction: &str,
) -> Result<RefinementRequest, GenerationError> {
    let instruction = instruction.trim();
    if instruction.is_empty() {
        return Err(GenerationError::InvalidInput(
            "refinement instruction is empty".to_string(),
        ));
    }
    if current_files.is_empty() {
        return Err(GenerationError::InvalidState(
            "no generated files to refine".to_string(),
        ));
    }

    let credential = credentials.acquire()?;

    let prompt = format!(
        "{}\n\nCURRENT FILES:\n{}\nUSER INSTRUCTION:\n{}\n\n{}",
        REFINEMENT_PROMPT,
        serialize_files(current_files),
        instruction,
        OUTPUT_CONTRACT
    );

    log::debug!(
        "Built refinement request over {} file(s), {} prompt chars",
        current_files.len(),
        prompt.len()
    );

    Ok(RefinementRequest {
        current_files: current_files.clone(),
        instruction: instruction.to_string(),
        prompt,
        credential,
    })
}

/// Renders every file as a labeled block: path line, then delimited content.
pub fn serialize_files(files: &FileCollection) -> String {
    let mut out = String::new();
    for file in files {
        out.push_str(FILE_BLOCK_LABEL);
        out.push(' ');
        out.push_str(&file.path);
        out.push('\n');
        out.push_str(FILE_BLOCK_START);
        out.push('\n');
        out.push_str(&file.content);
        if !file.content.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(FILE_BLOCK_END);
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::credentials::StaticCredentials;
    use crate::models::GeneratedFile;

    fn key() -> StaticCredentials {
        StaticCredentials::new(Some("test-key".to_string()))
    }

    fn sketch() -> ImageInput {
        ImageInput {
            name: "home.png".to_string(),
            mime_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    fn project() -> FileCollection {
        FileCollection::from_files(vec![
            GeneratedFile::new("app/page.tsx", "export default function Page() {}"),
            GeneratedFile::new("preview.html", "<html></html>\n"),
        ])
    }

    #[test]
    fn generation_requires_an_image() {
        let result = build_generation_request(&key(), Vec::new(), None);
        assert!(matches!(result, Err(GenerationError::InvalidInput(_))));
    }

    #[test]
    fn generation_requires_a_credential() {
        let result =
            build_generation_request(&StaticCredentials::new(None), vec![sketch()], None);
        assert!(matches!(result, Err(GenerationError::MissingCredential)));
    }

    #[test]
    fn generation_prompt_states_output_contract() {
        let request = build_generation_request(&key(), vec![sketch()], None).unwrap();
        assert!(request.instructions.contains("JSON object ONLY"));
        assert!(request.instructions.contains("```json"));
        assert!(request.instructions.contains("preview.html"));
        assert!(request.instructions.contains("README.md"));
        assert!(request.instructions.contains("package.json"));
        assert!(!request.instructions.contains("ADDITIONAL NOTES"));
        assert_eq!(request.images.len(), 1);
        assert_eq!(request.credential.expose(), "test-key");
    }

    #[test]
    fn generation_appends_hints() {
        let request =
            build_generation_request(&key(), vec![sketch()], Some("  dark theme  ")).unwrap();
        assert!(request
            .instructions
            .ends_with("ADDITIONAL NOTES FROM THE USER:\ndark theme"));
    }

    #[test]
    fn refinement_rejects_blank_instruction() {
        let result = build_refinement_request(&key(), &project(), "   \n");
        assert!(matches!(result, Err(GenerationError::InvalidInput(_))));
    }

    #[test]
    fn refinement_before_generation_is_invalid_state() {
        let result = build_refinement_request(&key(), &FileCollection::new(), "make it blue");
        assert!(matches!(result, Err(GenerationError::InvalidState(_))));
    }

    #[test]
    fn refinement_prompt_carries_every_file() {
        let request = build_refinement_request(&key(), &project(), "  make it blue ").unwrap();
        assert_eq!(request.instruction, "make it blue");
        assert!(request.prompt.contains(
            "File: app/page.tsx\n<<<CONTENT\nexport default function Page() {}\nCONTENT>>>"
        ));
        assert!(request
            .prompt
            .contains("File: preview.html\n<<<CONTENT\n<html></html>\nCONTENT>>>"));
        assert!(request.prompt.contains("USER INSTRUCTION:\nmake it blue"));
        assert!(request.prompt.contains("JSON object ONLY"));
        assert_eq!(request.current_files, project());
    }
}
