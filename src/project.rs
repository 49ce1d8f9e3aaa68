use crate::config::{LIB_EXTENSION, LIB_FOLDER};
use crate::error::{LaunchError, Result};
use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory, relative to the project root, holding build output.
pub const BUILD_FOLDER: &str = "build";

/// Path queries over a project directory.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_FOLDER)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join(LIB_FOLDER)
    }

    /// Returns `<root>/build/<root name>.jar`, creating `build` if needed.
    ///
    /// Failing to create the directory is logged; the path is returned regardless.
    pub fn output_jar_path(&self) -> PathBuf {
        let build = self.build_dir();
        if !build.exists() {
            debug!("Creating build directory {}", build.display());
            if let Err(e) = fs::create_dir_all(&build) {
                error!("Cannot create directory {}: {}", build.display(), e);
            }
        }
        build.join(format!("{}.jar", project_name(&self.root)))
    }

    /// Removes the build directory. Nothing to remove is not an error.
    pub fn clean(&self) -> Result<bool> {
        let build = self.build_dir();
        if !build.exists() {
            debug!("Nothing to clean at {}", build.display());
            return Ok(false);
        }
        fs::remove_dir_all(&build).map_err(|e| LaunchError::io(&build, e))?;
        info!("Removed {}", build.display());
        Ok(true)
    }

    /// File names of the jars directly inside `lib/`, sorted.
    pub fn libs(&self) -> Result<Vec<String>> {
        let lib_dir = self.lib_dir();
        if !lib_dir.is_dir() {
            debug!("No library directory at {}", lib_dir.display());
            return Ok(Vec::new());
        }

        let mut libs = Vec::new();
        for entry in fs::read_dir(&lib_dir).map_err(|e| LaunchError::io(&lib_dir, e))? {
            let entry = entry.map_err(|e| LaunchError::io(&lib_dir, e))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == LIB_EXTENSION) {
                libs.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        libs.sort();
        Ok(libs)
    }
}

fn project_name(root: &Path) -> String {
    // `.` and `..` have no file name; resolve them first.
    let resolved = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_output_jar_path_creates_build_dir() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("hello");
        fs::create_dir(&root).unwrap();

        let layout = ProjectLayout::new(&root);
        let jar = layout.output_jar_path();

        assert_eq!(jar, root.join("build").join("hello.jar"));
        assert!(root.join("build").is_dir());
    }

    #[test]
    fn test_clean_removes_build_dir() {
        let dir = tempdir().unwrap();
        let build = dir.path().join("build").join("classes");
        fs::create_dir_all(&build).unwrap();
        fs::write(build.join("App.class"), "x").unwrap();

        let layout = ProjectLayout::new(dir.path());
        assert!(layout.clean().unwrap());
        assert!(!dir.path().join("build").exists());
        assert!(!layout.clean().unwrap());
    }

    #[test]
    fn test_libs_lists_only_jars() {
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(lib.join("nested.jar")).unwrap();
        fs::write(lib.join("b.jar"), "").unwrap();
        fs::write(lib.join("a.jar"), "").unwrap();
        fs::write(lib.join("readme.txt"), "").unwrap();

        let libs = ProjectLayout::new(dir.path()).libs().unwrap();
        assert_eq!(libs, vec!["a.jar".to_string(), "b.jar".to_string()]);
    }

    #[test]
    fn test_libs_without_lib_dir() {
        let dir = tempdir().unwrap();
        assert!(ProjectLayout::new(dir.path()).libs().unwrap().is_empty());
    }
}
