use crate::kotlin::{KtFile, KtFunction};
use regex::Regex;

lazy_static::lazy_static! {
    // `Array<String>`, `Array<out String>`, optionally `kotlin.`-qualified.
    static ref STRING_ARRAY_RE: Regex =
        Regex::new(r"^(kotlin\.)?Array<(out )?(kotlin\.)?String>$").unwrap();
    static ref STRING_RE: Regex = Regex::new(r"^(kotlin\.)?String$").unwrap();
    static ref UNIT_RE: Regex = Regex::new(r"^(kotlin\.)?Unit$").unwrap();
}

/// Returns true if `function` is a launchable Kotlin entry point.
///
/// A main function is a top-level, non-private, non-generic, non-extension `fun main`
/// returning `Unit` (explicitly or implicitly) that takes either no parameters,
/// a single `Array<String>`, or a single `vararg String`.
pub fn is_main(function: &KtFunction) -> bool {
    if !function.top_level || function.name != "main" {
        return false;
    }
    if !function.type_parameters.is_empty() || function.receiver.is_some() {
        return false;
    }
    if function.has_modifier("private") {
        return false;
    }
    if let Some(ret) = &function.return_type {
        if !UNIT_RE.is_match(ret) {
            return false;
        }
    }

    match function.parameters.as_slice() {
        [] => true,
        [param] if param.vararg => STRING_RE.is_match(&param.type_name),
        [param] => STRING_ARRAY_RE.is_match(&param.type_name),
        _ => false,
    }
}

/// Returns true if the file declares a main function.
pub fn has_main(file: &KtFile) -> bool {
    file.functions.iter().any(is_main)
}

/// Returns the first file, in the given order, that declares a main function.
pub fn get_main_function_file(files: &[KtFile]) -> Option<&KtFile> {
    files.iter().find(|f| has_main(f))
}
