use crate::error::{LaunchError, Result};
use log::debug;
use std::env;
use std::path::{Path, PathBuf};

/// Directory under the Kotlin home holding the bundled libraries.
pub const LIB_FOLDER: &str = "lib";
/// Extension of bundled libraries.
pub const LIB_EXTENSION: &str = "jar";

/// Location of a Kotlin installation.
///
/// Passed explicitly to whatever needs it, so nothing reads the environment
/// behind the caller's back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KotlinHome {
    path: PathBuf,
}

impl KotlinHome {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolves the home from `KOTLIN_HOME`, falling back to `KT_HOME`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::var_os("KOTLIN_HOME"), env::var_os("KT_HOME"))
    }

    fn from_vars(kotlin_home: Option<std::ffi::OsString>, kt_home: Option<std::ffi::OsString>) -> Result<Self> {
        let path = kotlin_home
            .filter(|v| !v.is_empty())
            .or_else(|| kt_home.filter(|v| !v.is_empty()))
            .ok_or(LaunchError::MissingKotlinHome)?;
        debug!("Kotlin home resolved to {:?}", path);
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<home>/lib/<lib_name>.jar`
    pub fn lib_path(&self, lib_name: &str) -> PathBuf {
        self.path
            .join(LIB_FOLDER)
            .join(format!("{}.{}", lib_name, LIB_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_lib_path() {
        let home = KotlinHome::new("/opt/kotlinc");
        assert_eq!(
            home.lib_path("kotlin-stdlib"),
            Path::new("/opt/kotlinc").join("lib").join("kotlin-stdlib.jar")
        );
    }

    #[test]
    fn test_kotlin_home_takes_precedence() {
        let home = KotlinHome::from_vars(Some(OsString::from("/a")), Some(OsString::from("/b"))).unwrap();
        assert_eq!(home.path(), Path::new("/a"));
    }

    #[test]
    fn test_falls_back_to_kt_home() {
        let home = KotlinHome::from_vars(None, Some(OsString::from("/b"))).unwrap();
        assert_eq!(home.path(), Path::new("/b"));

        let home = KotlinHome::from_vars(Some(OsString::new()), Some(OsString::from("/b"))).unwrap();
        assert_eq!(home.path(), Path::new("/b"));
    }

    #[test]
    fn test_missing_home() {
        let result = KotlinHome::from_vars(None, None);
        assert!(matches!(result, Err(LaunchError::MissingKotlinHome)));
    }
}
