//! Kotlin front end built on tree-sitter.
//!
//! Each file is parsed with the `tree-sitter-kotlin-ng` grammar and reduced to a
//! [`KtFile`]: the package header plus the signature of every `fun` declaration.
//! That is all the main function detector needs. Syntax errors never fail a parse;
//! tree-sitter recovers and the walk records whatever declarations it can see.

use crate::error::{LaunchError, Result};
use log::trace;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Tree};

/// Node kinds that open a scope. A declaration below any of them is not top-level.
const NESTED_SCOPES: &[&str] = &[
    "class_body",
    "enum_class_body",
    "function_body",
    "block",
    "lambda_literal",
    "annotated_lambda",
    "anonymous_function",
    "object_literal",
    "control_structure_body",
    "anonymous_initializer",
];

/// Intermediate representation of one Kotlin source file.
#[derive(Debug, Clone, Serialize)]
pub struct KtFile {
    pub path: PathBuf,
    /// Qualified package name, if the file declares one.
    pub package: Option<String>,
    /// Every `fun` declaration in source order, nested ones included.
    pub functions: Vec<KtFunction>,
}

/// Signature of a `fun` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KtFunction {
    pub name: String,
    /// 1-indexed line of the `fun` keyword.
    pub line: usize,
    pub modifiers: Vec<String>,
    pub type_parameters: Vec<String>,
    /// Extension receiver type, e.g. `String` for `fun String.main()`.
    pub receiver: Option<String>,
    pub parameters: Vec<KtParameter>,
    /// Explicit return type; `None` for block bodies without one and for expression bodies.
    pub return_type: Option<String>,
    /// Declared outside of any class, object or function body.
    pub top_level: bool,
}

impl KtFunction {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KtParameter {
    pub name: String,
    pub type_name: String,
    pub vararg: bool,
}

/// A reusable tree-sitter parser configured for Kotlin.
pub struct KotlinParser {
    parser: tree_sitter::Parser,
}

impl KotlinParser {
    pub fn new() -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        let language: tree_sitter::Language = tree_sitter_kotlin_ng::LANGUAGE.into();
        parser.set_language(&language)?;
        Ok(Self { parser })
    }

    /// Parses Kotlin source text into a [`KtFile`].
    pub fn parse_source(&mut self, path: &Path, source: &str) -> Result<KtFile> {
        // A byte order mark is not part of the grammar.
        let source = source.strip_prefix('\u{FEFF}').unwrap_or(source);
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| LaunchError::Parse {
                path: path.to_path_buf(),
            })?;

        Ok(KtFile {
            path: path.to_path_buf(),
            package: package_header(&tree, source),
            functions: collect_functions(&tree, source),
        })
    }

    /// Reads and parses a Kotlin file.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected; they can
    /// only appear in comments and literals, which carry nothing we need.
    pub fn parse_file(&mut self, path: &Path) -> Result<KtFile> {
        let bytes = fs::read(path).map_err(|e| LaunchError::io(path, e))?;
        let source = String::from_utf8_lossy(&bytes);
        self.parse_source(path, &source)
    }
}

/// Parses one source string with a fresh parser.
pub fn parse_source(path: &Path, source: &str) -> Result<KtFile> {
    KotlinParser::new()?.parse_source(path, source)
}

fn text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Collapses whitespace so `Array < out String >` and `Array<out String>` compare equal.
fn normalize_type(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" <", "<")
        .replace(" .", ".")
        .replace(". ", ".")
        .replace(" ?", "?")
        .replace(" ,", ",")
}

fn package_header(tree: &Tree, source: &str) -> Option<String> {
    let root = tree.root_node();
    let mut cursor = root.walk();
    let header = root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_header")?;

    let name: String = text(header, source)
        .trim_start()
        .strip_prefix("package")?
        .trim()
        .trim_end_matches(';')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Depth-first walk over the whole tree, recording every function declaration.
fn collect_functions(tree: &Tree, source: &str) -> Vec<KtFunction> {
    let mut functions = Vec::new();
    let mut cursor = tree.walk();

    'walk: loop {
        let node = cursor.node();
        if node.kind() == "function_declaration" {
            if let Some(function) = function_declaration(node, source) {
                trace!("Parsed fun {} at line {}", function.name, function.line);
                functions.push(function);
            }
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                continue 'walk;
            }
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }

    functions
}

fn is_top_level(node: Node) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if NESTED_SCOPES.contains(&parent.kind()) {
            return false;
        }
        current = parent.parent();
    }
    true
}

/// Reduces a `function_declaration` node to its signature. Returns `None` for
/// declarations without a name or parameter list (anonymous or broken syntax).
fn function_declaration(node: Node, source: &str) -> Option<KtFunction> {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();

    let fun_idx = children.iter().position(|c| c.kind() == "fun");
    let params_idx = children
        .iter()
        .position(|c| c.kind() == "function_value_parameters")?;

    let name_node = node.child_by_field_name("name").or_else(|| {
        children[..params_idx]
            .iter()
            .rev()
            .find(|c| matches!(c.kind(), "identifier" | "simple_identifier"))
            .copied()
    })?;
    let name_idx = children.iter().position(|c| c.id() == name_node.id())?;

    let mut modifiers = Vec::new();
    let mut type_parameters = Vec::new();
    let mut receiver_parts = Vec::new();

    for (idx, child) in children.iter().enumerate().take(name_idx) {
        let kind = child.kind();
        if kind.contains("comment") || !child.is_named() {
            continue;
        }
        if kind == "modifiers" {
            let mut mc = child.walk();
            for modifier in child.named_children(&mut mc) {
                if !modifier.kind().contains("annotation") {
                    modifiers.push(text(modifier, source).trim().to_string());
                }
            }
        } else if kind.ends_with("modifier") {
            modifiers.push(text(*child, source).trim().to_string());
        } else if kind == "type_parameters" {
            let mut tc = child.walk();
            let params: Vec<Node> = child.named_children(&mut tc).collect();
            let declared: Vec<&Node> = params.iter().filter(|p| p.kind() == "type_parameter").collect();
            if declared.is_empty() {
                type_parameters.extend(params.iter().map(|p| normalize_type(text(*p, source))));
            } else {
                type_parameters.extend(declared.iter().map(|p| normalize_type(text(**p, source))));
            }
        } else if fun_idx.is_some_and(|f| idx > f) {
            receiver_parts.push(text(*child, source));
        }
    }

    let receiver = if receiver_parts.is_empty() {
        None
    } else {
        Some(normalize_type(receiver_parts.join("").trim_end_matches('.')))
    };

    let parameters = value_parameters(children[params_idx], source);

    let return_type = children[params_idx + 1..]
        .iter()
        .position(|c| c.kind() == ":")
        .and_then(|colon| {
            children[params_idx + 1 + colon + 1..]
                .iter()
                .find(|c| c.is_named() && !c.kind().contains("comment"))
        })
        .filter(|c| !matches!(c.kind(), "function_body" | "type_constraints"))
        .map(|c| normalize_type(text(*c, source)));

    let keyword = fun_idx.map_or(node, |f| children[f]);

    Some(KtFunction {
        name: text(name_node, source).trim_matches('`').to_string(),
        line: keyword.start_position().row + 1,
        modifiers,
        type_parameters,
        receiver,
        parameters,
        return_type,
        top_level: is_top_level(node),
    })
}

/// Parses the children of a `function_value_parameters` node.
fn value_parameters(node: Node, source: &str) -> Vec<KtParameter> {
    let mut parameters = Vec::new();
    let mut pending_vararg = false;
    let mut cursor = node.walk();

    for child in node.named_children(&mut cursor) {
        let kind = child.kind();
        if kind.starts_with("parameter_modifier") {
            pending_vararg |= text(child, source).contains("vararg");
            continue;
        }
        if kind != "parameter" {
            continue;
        }

        let raw = text(child, source);
        let Some((lhs, rhs)) = raw.split_once(':') else {
            continue;
        };
        let words: Vec<&str> = lhs.split_whitespace().collect();
        let Some(name) = words.last() else {
            continue;
        };
        // Defaults, when the grammar keeps them inside the parameter, follow `=`.
        let type_text = rhs.split('=').next().unwrap_or(rhs);

        parameters.push(KtParameter {
            name: name.trim_matches('`').to_string(),
            type_name: normalize_type(type_text),
            vararg: pending_vararg || words.contains(&"vararg"),
        });
        pending_vararg = false;
    }

    parameters
}
