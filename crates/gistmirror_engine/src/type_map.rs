//! Language → note type mapping.

use crate::schema::FILE_ICON;

/// Store-level type, MIME type and icon for a mirrored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteKind {
    /// Store note type.
    pub note_type: &'static str,
    /// MIME type of the content.
    pub mime: &'static str,
    /// Icon class.
    pub icon: &'static str,
}

impl NoteKind {
    const fn code(mime: &'static str, icon: &'static str) -> Self {
        Self {
            note_type: "code",
            mime,
            icon,
        }
    }
}

/// Fallback for unknown or missing languages.
pub const GENERIC: NoteKind = NoteKind::code("text/plain", FILE_ICON);

/// Maps a remote file's declared language to a note kind.
///
/// Matching ignores ASCII case. `None` and unknown languages map to
/// [`GENERIC`].
pub fn map_type(language: Option<&str>) -> NoteKind {
    let Some(language) = language else {
        return GENERIC;
    };

    match language.trim().to_ascii_lowercase().as_str() {
        "python" => NoteKind::code("text/x-python", "bx bxl-python"),
        "javascript" => NoteKind::code("application/javascript;env=frontend", "bx bxl-javascript"),
        "typescript" => NoteKind::code("application/typescript", "bx bxl-typescript"),
        "json" => NoteKind::code("application/json", "bx bx-data"),
        "html" => NoteKind::code("text/html", "bx bxl-html5"),
        "css" => NoteKind::code("text/css", "bx bxl-css3"),
        "markdown" => NoteKind::code("text/x-markdown", "bx bxl-markdown"),
        "shell" | "bash" => NoteKind::code("text/x-sh", "bx bx-terminal"),
        "powershell" => NoteKind::code("application/x-powershell", "bx bx-terminal"),
        "rust" => NoteKind::code("text/x-rustsrc", "bx bx-cog"),
        "go" => NoteKind::code("text/x-go", "bx bxl-go-lang"),
        "java" => NoteKind::code("text/x-java", "bx bxl-java"),
        "kotlin" => NoteKind::code("text/x-kotlin", "bx bx-code-alt"),
        "c" => NoteKind::code("text/x-csrc", "bx bx-code-alt"),
        "c++" => NoteKind::code("text/x-c++src", "bx bx-code-alt"),
        "c#" => NoteKind::code("text/x-csharp", "bx bx-code-alt"),
        "ruby" => NoteKind::code("text/x-ruby", "bx bx-diamond"),
        "php" => NoteKind::code("application/x-httpd-php", "bx bxl-php"),
        "sql" => NoteKind::code("text/x-sql", "bx bx-data"),
        "yaml" => NoteKind::code("text/x-yaml", "bx bx-list-ul"),
        "toml" => NoteKind::code("text/x-toml", "bx bx-list-ul"),
        "xml" => NoteKind::code("text/xml", "bx bx-code"),
        "dockerfile" => NoteKind::code("text/x-dockerfile", "bx bxl-docker"),
        "lua" => NoteKind::code("text/x-lua", "bx bx-moon"),
        "perl" => NoteKind::code("text/x-perl", "bx bx-code-alt"),
        "text" => NoteKind::code("text/plain", "bx bx-file-blank"),
        _ => GENERIC,
    }
}
