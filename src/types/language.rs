//! Submission language detection
//!
//! Maps file extensions to the display names used in prompts. The table
//! covers the languages accepted by common coding-practice sites.

use std::path::Path;

/// Language table entry
struct LanguageMeta {
    /// Display name embedded in prompts
    display_name: &'static str,
    /// File extensions (lowercase, no dot)
    extensions: &'static [&'static str],
}

macro_rules! lang_meta {
    ($display:literal, [$($ext:literal),*]) => {
        LanguageMeta {
            display_name: $display,
            extensions: &[$($ext),*],
        }
    };
}

const LANGUAGES: &[LanguageMeta] = &[
    lang_meta!("C++", ["cpp", "cc", "cxx", "hpp", "hh"]),
    lang_meta!("C", ["c", "h"]),
    lang_meta!("C#", ["cs"]),
    lang_meta!("Java", ["java"]),
    lang_meta!("Kotlin", ["kt", "kts"]),
    lang_meta!("Scala", ["scala", "sc"]),
    lang_meta!("Python", ["py", "pyw"]),
    lang_meta!("JavaScript", ["js", "mjs", "cjs"]),
    lang_meta!("TypeScript", ["ts", "mts", "cts"]),
    lang_meta!("Go", ["go"]),
    lang_meta!("Rust", ["rs"]),
    lang_meta!("Swift", ["swift"]),
    lang_meta!("Ruby", ["rb"]),
    lang_meta!("PHP", ["php"]),
    lang_meta!("Dart", ["dart"]),
    lang_meta!("Racket", ["rkt"]),
    lang_meta!("Erlang", ["erl"]),
    lang_meta!("Elixir", ["ex", "exs"]),
    lang_meta!("Haskell", ["hs"]),
    lang_meta!("OCaml", ["ml"]),
    lang_meta!("SQL", ["sql"]),
];

/// Display name for a file extension, case-insensitive
pub fn language_from_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_lowercase();
    LANGUAGES
        .iter()
        .find(|meta| meta.extensions.contains(&ext.as_str()))
        .map(|meta| meta.display_name)
}

/// Display name inferred from a path's extension
pub fn language_from_path<P: AsRef<Path>>(path: P) -> Option<&'static str> {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .and_then(language_from_extension)
}
