// Lib file to expose modules for testing and external usage.
// This file serves as the root for the library crate.

/// Module defining the error type shared by every operation.
pub mod error;

/// Module containing the source tree snapshot.
/// Files are recorded once, in a fixed traversal order, before anything is read.
pub mod tree;

/// Module containing the tree-sitter based Kotlin front end.
pub mod kotlin;

/// Module recognising Kotlin main functions in parsed files.
pub mod detector;

/// Module defining the entry point logic.
/// This finds the file holding `main` and derives the class name to launch.
pub mod entry_point;

/// Module containing the Kotlin home configuration.
pub mod config;

/// Module containing project layout queries (output jar, clean, libraries).
pub mod project;
