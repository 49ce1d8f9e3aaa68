use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use ktlaunch_rs::config::KotlinHome;
use ktlaunch_rs::entry_point::{self, Dialect};
use ktlaunch_rs::project::ProjectLayout;
use ktlaunch_rs::tree::SourceTree;
use log::{debug, warn};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Command line interface configuration using `clap`.
/// This struct defines the global flags and the subcommand to run.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output raw JSON.
    /// If true, every subcommand prints a JSON value instead of a human-readable line.
    /// This is useful for driving the tool from a build script or an editor.
    #[arg(long, global = true)]
    json: bool,

    /// The operation to perform.
    #[command(subcommand)]
    command: Command,
}

/// Subcommands, one per library operation.
#[derive(Debug, Subcommand)]
enum Command {
    /// Print the fully-qualified class name to launch.
    ///
    /// This is the name a `java` or `kotlin` launcher expects, e.g. `com.example.AppKt`.
    MainClass {
        /// Project source directory.
        /// Every file below it is considered, in sorted depth-first order.
        path: PathBuf,
        /// Restrict the search to one dialect.
        /// Without it Kotlin is tried first, then Java.
        #[arg(short, long, value_enum)]
        dialect: Option<Dialect>,
    },
    /// Print the file and line holding the entry point.
    ///
    /// Unlike `main-class` this does not require a package declaration.
    Find {
        /// Project source directory.
        path: PathBuf,
        /// Which dialect's entry point convention to look for.
        #[arg(short, long, value_enum)]
        dialect: Dialect,
    },
    /// Print the output jar path, creating the build directory if needed.
    OutputJar {
        /// Project root directory.
        /// The jar is named after this directory.
        path: PathBuf,
    },
    /// Remove the build directory.
    Clean {
        /// Project root directory.
        path: PathBuf,
    },
    /// List the jars in the project's lib directory.
    Libs {
        /// Project root directory.
        path: PathBuf,
    },
    /// Print the path of a library bundled with the Kotlin installation.
    LibPath {
        /// Library name without extension, e.g. `kotlin-stdlib`.
        name: String,
        /// Kotlin installation directory.
        /// Defaults to KOTLIN_HOME, then KT_HOME.
        #[arg(long)]
        kotlin_home: Option<PathBuf>,
    },
}

/// Takes the source tree snapshot, warning when there is nothing to search.
fn snapshot(path: &Path) -> Result<SourceTree> {
    let tree = SourceTree::snapshot(path)?;
    if tree.is_empty() {
        warn!("No files found under {}", path.display());
    }
    Ok(tree)
}

/// Main entry point of the application.
///
/// This function handles argument parsing, logger setup, dispatch to the
/// library operation, and output formatting.
fn main() -> Result<()> {
    // RUST_LOG controls verbosity; nothing is logged by default.
    env_logger::init();

    // Parse command line arguments using the Cli struct definition.
    let cli = Cli::parse();
    debug!("Parsed command: {:?}", cli.command);

    match cli.command {
        Command::MainClass { path, dialect } => {
            // Snapshot once so every lookup sees the same files.
            let tree = snapshot(&path)?;
            let class_name = match dialect {
                Some(dialect) => match entry_point::find_entry_point(&tree, dialect)? {
                    Some(ep) => Some(entry_point::derive_main_class_name(&ep)?),
                    None => None,
                },
                None => entry_point::main_class_name(&tree)?,
            };

            if cli.json {
                println!("{}", json!({ "main_class": class_name }));
            }
            match class_name {
                Some(name) => {
                    if !cli.json {
                        println!("{}", name);
                    }
                }
                None => {
                    if !cli.json {
                        eprintln!("{} no entry point found in {}", "error:".red().bold(), path.display());
                    }
                    // Non-zero exit so scripts can tell nothing was found
                    std::process::exit(1);
                }
            }
        }
        Command::Find { path, dialect } => {
            let tree = snapshot(&path)?;
            let found = entry_point::find_entry_point(&tree, dialect)?;

            if cli.json {
                // Serialize the entry point (or null) for machine parsing.
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else if let Some(ep) = &found {
                println!("{}:{}", ep.file.display(), ep.line);
                println!(
                    "    └─ package: {}",
                    ep.package.as_deref().unwrap_or("<none>").cyan()
                );
            } else {
                eprintln!("{} no {:?} entry point found in {}", "error:".red().bold(), dialect, path.display());
            }
            if found.is_none() {
                std::process::exit(1);
            }
        }
        Command::OutputJar { path } => {
            let jar = ProjectLayout::new(path).output_jar_path();
            if cli.json {
                println!("{}", json!({ "output_jar": jar }));
            } else {
                println!("{}", jar.display());
            }
        }
        Command::Clean { path } => {
            let removed = ProjectLayout::new(path).clean()?;
            if cli.json {
                println!("{}", json!({ "removed": removed }));
            } else if removed {
                println!("{}", "Build directory removed".green());
            } else {
                println!("Nothing to clean");
            }
        }
        Command::Libs { path } => {
            let libs = ProjectLayout::new(path).libs()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&libs)?);
            } else {
                // Numbered list, like the other human-readable reports.
                for (i, lib) in libs.iter().enumerate() {
                    println!(" {}. {}", i + 1, lib);
                }
            }
        }
        Command::LibPath { name, kotlin_home } => {
            // An explicit flag wins over the environment.
            let home = match kotlin_home {
                Some(dir) => KotlinHome::new(dir),
                None => KotlinHome::from_env()?,
            };
            debug!("Using Kotlin home {}", home.path().display());
            let lib = home.lib_path(&name);
            if cli.json {
                println!("{}", json!({ "lib_path": lib }));
            } else {
                println!("{}", lib.display());
            }
        }
    }

    Ok(())
}
