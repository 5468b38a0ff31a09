use std::path::Path;

use derive_more::Display;

/// Extensions whose contents are compared as decoded UTF-8 text.
pub const TEXT_EXTENSIONS: [&str; 9] = ["qmd", "md", "txt", "yaml", "yml", "json", "html", "css", "js"];

/// How the content of a file is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FileClass {
    /// Decoded as UTF-8 and diffed line by line
    #[display("text")]
    Text,
    /// Compared as an opaque byte sequence
    #[display("binary")]
    Binary,
}

/// Classifies a file purely by its extension, ignoring case.
///
/// Files without an extension (including dotfiles such as `.md`) are binary.
pub fn classify(path: impl AsRef<Path>) -> FileClass {
    let is_text = path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            TEXT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        });

    if is_text {
        FileClass::Text
    } else {
        FileClass::Binary
    }
}
