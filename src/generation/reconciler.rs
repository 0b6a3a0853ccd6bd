//! Turns raw model text into a validated file list and folds refinement
//! patches back into the full project.

use super::errors::GenerationError;
use crate::models::{FileCollection, GeneratedFile, ModelResponse};
use serde_json::Value;

/// Markdown code fence the model sometimes wraps its JSON in.
pub const CODE_FENCE: &str = "```";

/// Language tag that may follow the opening fence.
pub const JSON_LANGUAGE_TAG: &str = "json";

/// File shown first after a generation when present.
pub const PREVIEW_FILE_PATH: &str = "preview.html";

/// Removes one leading fence (with an optional `json` tag followed by
/// whitespace) and one trailing fence, trimming whitespace around the body.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix(CODE_FENCE) {
        body = match rest.get(..JSON_LANGUAGE_TAG.len()) {
            Some(tag) if tag.eq_ignore_ascii_case(JSON_LANGUAGE_TAG) => {
                let after = &rest[JSON_LANGUAGE_TAG.len()..];
                // The tag must be a whole word: "```jsonc" is not "```json".
                if after.is_empty() || after.starts_with(char::is_whitespace) {
                    after
                } else {
                    rest
                }
            }
            _ => rest,
        };
    }
    body = body.trim();

    if let Some(rest) = body.strip_suffix(CODE_FENCE) {
        body = rest.trim();
    }
    body
}

/// Parses a `{ "files": [{ "path", "content" }] }` document.
pub fn parse_response(raw: &str) -> Result<Vec<GeneratedFile>, GenerationError> {
    if raw.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(GenerationError::bad_shape("only code fences, no body", raw));
    }

    let document: Value =
        serde_json::from_str(body).map_err(|err| GenerationError::not_json(err, raw))?;

    if !document.is_object() {
        return Err(GenerationError::bad_shape("top-level value is not an object", raw));
    }

    let response: ModelResponse = serde_json::from_value(document)
        .map_err(|err| GenerationError::bad_shape(err.to_string(), raw))?;

    if let Some(file) = response
        .files
        .iter()
        .find(|file| !file.has_project_relative_path())
    {
        return Err(GenerationError::bad_shape(
            format!("path '{}' is not a relative project path", file.path),
            raw,
        ));
    }
    Ok(response.files)
}

/// Merges a (possibly partial) refinement result into the full project.
///
/// Files of `original` keep their order; a patch entry with the same path
/// replaces the whole file. Unmatched patch entries are appended in the
/// order the model returned them. `original` is left untouched.
pub fn merge_refinement(original: &FileCollection, patch: Vec<GeneratedFile>) -> FileCollection {
    let mut pending: Vec<Option<GeneratedFile>> = FileCollection::from_files(patch)
        .into_vec()
        .into_iter()
        .map(Some)
        .collect();

    let mut merged = Vec::with_capacity(original.len() + pending.len());
    for file in original {
        let replacement = pending
            .iter()
            .position(|slot| matches!(slot, Some(p) if p.path == file.path))
            .and_then(|index| pending[index].take());
        merged.push(replacement.unwrap_or_else(|| file.clone()));
    }
    merged.extend(pending.into_iter().flatten());

    FileCollection::from_files(merged)
}

/// Picks the file to display first: `preview.html`, else the first file.
pub fn select_default_view(files: &[GeneratedFile]) -> Result<&GeneratedFile, GenerationError> {
    files
        .iter()
        .find(|file| file.path == PREVIEW_FILE_PATH)
        .or_else(|| files.first())
        .ok_or(GenerationError::EmptyCollection)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> GeneratedFile {
        GeneratedFile::new(path, content)
    }

    fn original() -> FileCollection {
        FileCollection::from_files(vec![
            file("app/page.tsx", "<main className=\"bg-red-500\" />"),
            file("preview.html", "<html>red</html>"),
            file("README.md", "# App"),
        ])
    }

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"files\":[{\"path\":\"a.txt\",\"content\":\"hi\"}]}\n```";
        assert_eq!(parse_response(raw).unwrap(), vec![file("a.txt", "hi")]);
    }

    #[test]
    fn strips_bare_and_uppercase_fences() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  ```JSON {} ```  "), "{}");
        assert_eq!(strip_code_fences("{\"files\":[]}"), "{\"files\":[]}");
    }

    #[test]
    fn keeps_fence_text_inside_content() {
        let raw = r#"{"files":[{"path":"README.md","content":"```sh\nnpm i\n```"}]}"#;
        let files = parse_response(raw).unwrap();
        assert_eq!(files[0].content, "```sh\nnpm i\n```");
    }

    #[test]
    fn empty_text_is_empty_response() {
        assert!(matches!(parse_response(""), Err(GenerationError::EmptyResponse)));
        assert!(matches!(
            parse_response(" \n\t"),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn fences_without_body_are_malformed() {
        assert!(matches!(
            parse_response("```json\n```"),
            Err(GenerationError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn missing_files_field_is_malformed() {
        let err = parse_response("{\"notfiles\": []}").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse { .. }));
        assert_eq!(err.raw_response(), Some("{\"notfiles\": []}"));
    }

    #[test]
    fn non_list_files_is_malformed() {
        assert!(matches!(
            parse_response("{\"files\": {\"path\": \"a\"}}"),
            Err(GenerationError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn prose_is_malformed() {
        assert!(matches!(
            parse_response("Here is your app: {\"files\": []}"),
            Err(GenerationError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn entry_without_content_is_malformed() {
        assert!(matches!(
            parse_response("{\"files\": [{\"path\": \"a.txt\"}]}"),
            Err(GenerationError::MalformedResponse { reason, .. }) if reason.contains("content")
        ));
    }

    #[test]
    fn json_tag_needs_word_boundary() {
        assert_eq!(strip_code_fences("```json"), "");
        assert_eq!(strip_code_fences("```jsonc{\"a\":1}```"), "jsonc{\"a\":1}");
        assert!(matches!(
            parse_response("```jsonc{\"files\":[]}```"),
            Err(GenerationError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn paths_outside_the_project_are_malformed() {
        for bad in ["../evil.txt", "/etc/passwd", "", "  ", "app/../../x"] {
            let raw = serde_json::json!({ "files": [{ "path": bad, "content": "x" }] }).to_string();
            assert!(
                matches!(
                    parse_response(&raw),
                    Err(GenerationError::MalformedResponse { ref reason, .. }) if reason.contains("relative")
                ),
                "{:?} should be rejected",
                bad
            );
        }
        let raw = "{\"files\":[{\"path\":\"./app/page.tsx\",\"content\":\"x\"}]}";
        assert_eq!(parse_response(raw).unwrap()[0].path, "./app/page.tsx");
    }

    #[test]
    fn empty_file_list_parses() {
        assert_eq!(parse_response("{\"files\": []}").unwrap(), Vec::new());
    }

    #[test]
    fn merge_with_empty_patch_is_identity() {
        let original = original();
        assert_eq!(merge_refinement(&original, Vec::new()), original);
    }

    #[test]
    fn merge_replaces_in_place() {
        let original = original();
        let merged = merge_refinement(
            &original,
            vec![
                file("README.md", "# Blue app"),
                file("app/page.tsx", "<main className=\"bg-blue-500\" />"),
            ],
        );

        assert_eq!(merged.len(), original.len());
        assert_eq!(
            merged.paths().collect::<Vec<_>>(),
            original.paths().collect::<Vec<_>>()
        );
        assert_eq!(merged.get("README.md").unwrap().content, "# Blue app");
        assert_eq!(
            merged.get("app/page.tsx").unwrap().content,
            "<main className=\"bg-blue-500\" />"
        );
        assert_eq!(merged.get("preview.html").unwrap().content, "<html>red</html>");
    }

    #[test]
    fn merge_appends_new_files_in_model_order() {
        let original = original();
        let merged = merge_refinement(
            &original,
            vec![
                file("components/Nav.tsx", "nav"),
                file("preview.html", "<html>blue</html>"),
                file("components/Card.tsx", "card"),
            ],
        );

        let new_paths = 2;
        assert_eq!(merged.len(), original.len() + new_paths);
        assert_eq!(
            merged.paths().collect::<Vec<_>>(),
            vec![
                "app/page.tsx",
                "preview.html",
                "README.md",
                "components/Nav.tsx",
                "components/Card.tsx"
            ]
        );
        assert_eq!(merged.get("preview.html").unwrap().content, "<html>blue</html>");
    }

    #[test]
    fn merge_does_not_touch_original() {
        let original = original();
        let snapshot = original.clone();
        let _ = merge_refinement(&original, vec![file("app/page.tsx", "changed")]);
        assert_eq!(original, snapshot);
    }

    #[test]
    fn merge_duplicate_patch_paths_last_write_wins() {
        let merged = merge_refinement(
            &original(),
            vec![file("README.md", "first"), file("README.md", "second")],
        );
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("README.md").unwrap().content, "second");
    }

    #[test]
    fn default_view_prefers_preview() {
        let files = vec![file("app/page.tsx", "page"), file("preview.html", "html")];
        assert_eq!(select_default_view(&files).unwrap().path, "preview.html");
    }

    #[test]
    fn default_view_falls_back_to_first() {
        let files = vec![file("app/page.tsx", "page"), file("README.md", "readme")];
        assert_eq!(select_default_view(&files).unwrap().path, "app/page.tsx");
    }

    #[test]
    fn default_view_of_nothing_is_empty_collection() {
        assert!(matches!(
            select_default_view(&[]),
            Err(GenerationError::EmptyCollection)
        ));
    }

    #[test]
    fn color_change_refinement_end_to_end() {
        let generated = parse_response(
            r#"{"files":[
                {"path":"app/page.tsx","content":"bg-red-500"},
                {"path":"preview.html","content":"<html>red</html>"},
                {"path":"package.json","content":"{}"}
            ]}"#,
        )
        .unwrap();
        let project = FileCollection::from_files(generated);
        assert_eq!(
            select_default_view(project.as_slice()).unwrap().path,
            "preview.html"
        );

        let patch =
            parse_response("```json\n{\"files\":[{\"path\":\"app/page.tsx\",\"content\":\"bg-blue-500\"}]}\n```")
                .unwrap();
        let merged = merge_refinement(&project, patch);

        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged.paths().collect::<Vec<_>>(),
            vec!["app/page.tsx", "preview.html", "package.json"]
        );
        assert_eq!(merged.get("app/page.tsx").unwrap().content, "bg-blue-500");
        assert_eq!(merged.get("preview.html").unwrap().content, "<html>red</html>");
        assert_eq!(merged.get("package.json").unwrap().content, "{}");
    }
}
