//! Font loading for report rendering.
//!
//! Reports are always typeset with a custom TrueType family; the PDF built-in
//! fonts are never used.  A family named `Name` is expected as the four files
//! `Name-Regular.ttf`, `Name-Bold.ttf`, `Name-Italic.ttf` and
//! `Name-BoldItalic.ttf` inside one directory.

use std::env;
use std::path::{Path, PathBuf};

use genpdf::fonts::{self, FontData, FontFamily};
use log::debug;

use crate::error::ReportError;

/// Name of the default font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "MapleMono";

/// Environment variable that overrides the font directory search.
pub const FONTS_DIR_ENV: &str = "MD_REPORT_FONTS_DIR";

const FACE_SUFFIXES: &[&str] = &["Regular", "Bold", "Italic", "BoldItalic"];

/// Where to look for a font family and which family to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontSource {
    directory: Option<PathBuf>,
    family: String,
}

impl FontSource {
    /// Searches the default locations for the default family.
    pub fn new() -> Self {
        Self {
            directory: None,
            family: DEFAULT_FONT_FAMILY_NAME.to_owned(),
        }
    }

    /// Uses `directory` before any other search location.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Loads `family` instead of the default family.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        let mut push = |candidate: PathBuf| {
            if !candidates.iter().any(|existing| existing == &candidate) {
                candidates.push(candidate);
            }
        };

        if let Some(directory) = &self.directory {
            push(directory.clone());
        }

        if let Some(path) = env::var_os(FONTS_DIR_ENV) {
            if !path.is_empty() {
                push(PathBuf::from(path));
            }
        }

        if let Ok(current_exe) = env::current_exe() {
            if let Some(bin_dir) = current_exe.parent() {
                push(bin_dir.join("assets/fonts"));
            }
        }

        push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"));
        candidates
    }

    fn missing_files(&self, directory: &Path) -> Vec<String> {
        FACE_SUFFIXES
            .iter()
            .map(|suffix| format!("{}-{}.ttf", self.family, suffix))
            .filter(|name| !directory.join(name).is_file())
            .collect()
    }

    /// Returns the first candidate directory holding all four faces.
    pub fn resolve_directory(&self) -> Result<PathBuf, ReportError> {
        let mut attempts = Vec::new();

        for candidate in self.candidates() {
            if !candidate.is_dir() {
                attempts.push(format!("{} (directory missing)", candidate.display()));
                continue;
            }

            let missing = self.missing_files(&candidate);
            if missing.is_empty() {
                debug!("Using font directory {}", candidate.display());
                return Ok(candidate);
            }
            attempts.push(format!(
                "{} (missing files [{}])",
                candidate.display(),
                missing.join(", ")
            ));
        }

        Err(ReportError::font(
            format!(
                "Unable to locate the '{}' font family. Checked: {}. Pass a fonts directory or set {}.",
                self.family,
                attempts.join(", "),
                FONTS_DIR_ENV
            ),
            None,
        ))
    }

    /// Loads the font family from the resolved directory.
    pub fn load(&self) -> Result<FontFamily<FontData>, ReportError> {
        let directory = self.resolve_directory()?;
        fonts::from_files(&directory, &self.family, None).map_err(|err| {
            ReportError::font(
                format!(
                    "Failed to load font family '{}' from {}",
                    self.family,
                    directory.display()
                ),
                Some(err),
            )
        })
    }

    /// Indicates whether all four faces can be found.
    pub fn is_available(&self) -> bool {
        self.resolve_directory().is_ok()
    }
}

impl Default for FontSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directory_is_searched_first() {
        let source = FontSource::new().with_directory("/opt/report-fonts");
        assert_eq!(source.candidates()[0], PathBuf::from("/opt/report-fonts"));
    }

    #[test]
    fn missing_family_reports_every_attempt() {
        let source = FontSource::new()
            .with_directory("/__md_report_missing_fonts__")
            .with_family("NoSuchFamily");
        let err = source.resolve_directory().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("NoSuchFamily"));
        assert!(message.contains("/__md_report_missing_fonts__ (directory missing)"));
    }

    #[test]
    fn lists_missing_faces() {
        let directory = env::temp_dir();
        let source = FontSource::new().with_family("__md_report_absent__");
        let missing = source.missing_files(&directory);
        assert_eq!(missing.len(), 4);
        assert!(missing.contains(&"__md_report_absent__-BoldItalic.ttf".to_owned()));
    }
}
