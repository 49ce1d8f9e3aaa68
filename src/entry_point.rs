use crate::detector;
use crate::error::{LaunchError, Result};
use crate::kotlin::{KotlinParser, KtFile};
use crate::tree::SourceTree;
use log::{debug, trace};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Substring that marks a Java file as holding `main`.
///
/// Matching is textual: the marker inside a comment or string literal counts too.
pub const JAVA_MAIN_MARKER: &str = "public static void main(";

/// Suffix the Kotlin compiler appends to a file facade class name.
pub const KOTLIN_FACADE_SUFFIX: &str = "Kt";

/// Source dialect, which decides both how entry points are recognised and how the
/// main class name is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Java,
    Kotlin,
}

impl Dialect {
    pub fn extension(self) -> &'static str {
        match self {
            Dialect::Java => "java",
            Dialect::Kotlin => "kt",
        }
    }
}

/// A source file holding a program entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryPoint {
    pub file: PathBuf,
    pub dialect: Dialect,
    /// Package the file declares, if any.
    pub package: Option<String>,
    /// File name without extension.
    pub local_name: String,
    /// 1-indexed line where the entry point was recognised.
    pub line: usize,
}

/// Finds the first file in `tree` holding an entry point of the given dialect.
///
/// `Ok(None)` means the tree has no entry point.
pub fn find_entry_point(tree: &SourceTree, dialect: Dialect) -> Result<Option<EntryPoint>> {
    debug!("Searching {} for a {:?} entry point", tree.root.display(), dialect);
    let found = match dialect {
        Dialect::Java => find_java_main(tree)?,
        Dialect::Kotlin => find_kotlin_main(tree)?,
    };
    match &found {
        Some(ep) => debug!("Entry point found in {}:{}", ep.file.display(), ep.line),
        None => debug!("No {:?} entry point found", dialect),
    }
    Ok(found)
}

fn find_java_main(tree: &SourceTree) -> Result<Option<EntryPoint>> {
    let marker = JAVA_MAIN_MARKER.as_bytes();
    for file in tree.files_with_extension(Dialect::Java.extension()) {
        trace!("Scanning {}", file.path.display());
        // Raw bytes: the marker is ASCII, and sources in legacy encodings must not abort the scan.
        let bytes = fs::read(&file.path).map_err(|e| LaunchError::io(&file.path, e))?;

        for (idx, line) in bytes.split(|&b| b == b'\n').enumerate() {
            if line.windows(marker.len()).any(|w| w == marker) {
                let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
                return Ok(Some(EntryPoint {
                    file: file.path.clone(),
                    dialect: Dialect::Java,
                    package: parse_package_line(&decode_line(first_line)),
                    local_name: file_stem(&file.path),
                    line: idx + 1,
                }));
            }
        }
    }
    Ok(None)
}

fn find_kotlin_main(tree: &SourceTree) -> Result<Option<EntryPoint>> {
    // Every file is parsed before detection starts.
    let mut parser = KotlinParser::new()?;
    let files: Vec<KtFile> = tree
        .files_with_extension(Dialect::Kotlin.extension())
        .map(|f| parser.parse_file(&f.path))
        .collect::<Result<_>>()?;
    debug!("Parsed {} Kotlin files", files.len());

    let Some(main_file) = detector::get_main_function_file(&files) else {
        return Ok(None);
    };
    let line = main_file
        .functions
        .iter()
        .find(|f| detector::is_main(f))
        .map_or(0, |f| f.line);

    Ok(Some(EntryPoint {
        file: main_file.path.clone(),
        dialect: Dialect::Kotlin,
        package: main_file.package.clone(),
        local_name: file_stem(&main_file.path),
        line,
    }))
}

/// Derives the fully-qualified class name a launcher should run for `entry_point`.
///
/// The package is read from the first line of the file, which must be a package
/// declaration; leading comments or blank lines are not skipped.
pub fn derive_main_class_name(entry_point: &EntryPoint) -> Result<String> {
    let first_line = read_first_line(&entry_point.file)?;
    let package = first_line
        .as_deref()
        .and_then(parse_package_line)
        .ok_or_else(|| LaunchError::MalformedSource {
            path: entry_point.file.clone(),
            line: first_line.clone().unwrap_or_default(),
        })?;

    let class_name = match entry_point.dialect {
        Dialect::Java => entry_point.local_name.clone(),
        Dialect::Kotlin => facade_class_name(&entry_point.local_name),
    };
    Ok(format!("{}.{}", package, class_name))
}

/// Kotlin main first, then Java; `Ok(None)` when the tree has neither.
pub fn main_class_name(tree: &SourceTree) -> Result<Option<String>> {
    for dialect in [Dialect::Kotlin, Dialect::Java] {
        if let Some(ep) = find_entry_point(tree, dialect)? {
            return derive_main_class_name(&ep).map(Some);
        }
    }
    Ok(None)
}

/// `app` -> `AppKt`.
pub fn facade_class_name(file_stem: &str) -> String {
    let mut chars = file_stem.chars();
    let mut name: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    name.push_str(KOTLIN_FACADE_SUFFIX);
    name
}

/// Extracts `com.example` from `package com.example;` or `package com.example`.
pub fn parse_package_line(line: &str) -> Option<String> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "package" {
        return None;
    }
    let package = tokens.next()?.split(';').next()?;
    if package.is_empty() {
        return None;
    }
    Some(package.to_string())
}

fn read_first_line(path: &Path) -> Result<Option<String>> {
    let mut reader = BufReader::new(File::open(path).map_err(|e| LaunchError::io(path, e))?);
    let mut line = Vec::new();
    let read = reader
        .read_until(b'\n', &mut line)
        .map_err(|e| LaunchError::io(path, e))?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(decode_line(&line)))
}

/// Lossy UTF-8 decode without the line terminator or a leading byte order mark.
fn decode_line(line: &[u8]) -> String {
    let decoded = String::from_utf8_lossy(line);
    let text = decoded.strip_prefix('\u{FEFF}').unwrap_or(&*decoded);
    text.trim_end_matches(['\r', '\n']).to_string()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
