// src/api/config.rs

/// Base URL for the Gemini REST API.
pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when the config file does not name one.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Output budget large enough for a full multi-file project.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 20000;

/// Declared response type; asks the API for a bare JSON body.
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Output contract shared by both passes.
pub const OUTPUT_CONTRACT: &str = r#"OUTPUT FORMAT:
You MUST return a JSON object ONLY. The structure must be:
{
  "files": [
    { "path": "app/page.tsx", "content": "..." },
    { "path": "preview.html", "content": "<html>...</html>" }
  ]
}

Do not include any prose before or after the JSON.
Do not include any markdown formatting like ```json. Return a pure JSON string.
Ensure "path" includes the full relative path from the project root.
Every "content" value is the complete text of the file."#;

/// Fixed instruction for the first pass over the uploaded sketches.
pub const GENERATION_PROMPT: &str = r#"You are Frame2Code, an expert Senior Frontend Engineer and UI/UX Designer.

TASK:
Analyze the provided UI sketches/wireframes. These images represent a sequence of screens for a web application, in the order given.
Your goal is to turn these visual designs into a fully functional, production-ready Next.js 14 application using Tailwind CSS and Lucide React icons.

REQUIREMENTS:
1. Structure: Create a logical folder structure (e.g., app/page.tsx, components/Header.tsx).
2. Styling: Use Tailwind CSS for all styling. Make it look premium, modern, and pixel-perfect to the sketches.
3. Interactivity: Add basic interactivity (links between pages, hover states, mobile menus) where appropriate based on the sketches.
4. Responsiveness: Ensure the code is responsive (mobile-first).
5. Icons: Use 'lucide-react' for icons.
6. Content: Use placeholder text or infer content from the images.
7. Preview File: You MUST generate a file named 'preview.html'. It is a standalone, single-file HTML version of the main page (or a representative screen) using Tailwind CSS via CDN (<script src="https://cdn.tailwindcss.com"></script>). It must NOT use React syntax. Use generic <img> placeholders or data URIs.
8. Project Files: You MUST include a 'README.md' explaining how to run the project and a 'package.json' with the necessary dependencies (next, react, react-dom, tailwindcss, lucide-react, clsx, tailwind-merge)."#;

/// Fixed instruction for a follow-up pass over an existing project.
pub const REFINEMENT_PROMPT: &str = r#"You are Frame2Code, an expert Senior Frontend Engineer.

TASK:
You are given the complete current files of a generated Next.js 14 + Tailwind CSS project and an instruction from the user.
Apply the instruction to the project.

RULES:
1. Return every file you changed or created, each with its FULL new content. Never return partial snippets or diffs.
2. You MAY omit files that you did not change; omitted files are kept as they are.
3. Keep existing paths for files you change. Use new paths only for new files.
4. Keep 'preview.html' in sync when the change is visible on the main page."#;

/// Label placed before each serialized file of a refinement request.
pub const FILE_BLOCK_LABEL: &str = "File:";

/// Delimiters around the content of each serialized file.
pub const FILE_BLOCK_START: &str = "<<<CONTENT";
pub const FILE_BLOCK_END: &str = "CONTENT>>>";
