//! HandBrakeCLI invocation.
//!
//! Everything that spawns the external tool lives here, behind [`HandBrake`].
//! The parsing side of the crate never touches a process; callers hand it the
//! captured text.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{Error, Result};

const TOOL_NAME: &str = "HandBrakeCLI";

/// A located HandBrakeCLI binary.
#[derive(Debug, Clone)]
pub struct HandBrake {
    program: PathBuf,
}

impl HandBrake {
    /// Locate the tool, preferring an explicit path over `$PATH` lookup.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if path.is_file() {
                return Ok(Self {
                    program: path.to_path_buf(),
                });
            }
            return Err(Error::tool_not_found(path.display().to_string()));
        }
        let program = which::which(TOOL_NAME).map_err(|_| Error::tool_not_found(TOOL_NAME))?;
        Ok(Self { program })
    }

    /// Path of the located binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run a scan against `input` and return the combined diagnostic text.
    ///
    /// Scan diagnostics go to stderr; both streams are captured and joined so
    /// the parser sees everything the tool printed.
    pub fn scan(&self, input: &Path) -> Result<String> {
        tracing::info!("scanning {}", input.display());
        let output = Command::new(&self.program)
            .arg("--input")
            .arg(input)
            .args(["--scan", "--title", "0"])
            .output()
            .map_err(map_spawn_error)?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }

    /// Run a scan, reading from / writing to a cache file when one is given.
    ///
    /// An existing cache file short-circuits the tool entirely, which keeps
    /// repeated planning runs off the drive.
    pub fn scan_cached(&self, input: &Path, cache: Option<&Path>) -> Result<String> {
        if let Some(cache) = cache {
            if cache.is_file() {
                tracing::debug!("reading scan text from {}", cache.display());
                return Ok(std::fs::read_to_string(cache)?);
            }
        }
        let text = self.scan(input)?;
        if let Some(cache) = cache {
            std::fs::write(cache, &text)?;
        }
        Ok(text)
    }

    /// Return the raw `--preset-list` output.
    pub fn preset_list(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("--preset-list")
            .output()
            .map_err(map_spawn_error)?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }

    /// Run a conversion with the given argument vector, streaming the tool's
    /// output through. Exit-status interpretation is the caller's business.
    pub fn convert(&self, args: &[String]) -> Result<ExitStatus> {
        tracing::debug!("running {} {}", self.program.display(), args.join(" "));
        let status = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .map_err(map_spawn_error)?;
        Ok(status)
    }
}

fn map_spawn_error(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::tool_not_found(TOOL_NAME)
    } else {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_rejects_missing_explicit_path() {
        let err = HandBrake::locate(Some(Path::new("/nonexistent/HandBrakeCLI"))).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn scan_cached_prefers_existing_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("scan.txt");
        std::fs::write(&cache, "+ title 1:\n").unwrap();

        // Points at nothing runnable; the cache must make that irrelevant.
        let hb = HandBrake {
            program: PathBuf::from("/nonexistent/HandBrakeCLI"),
        };
        let text = hb
            .scan_cached(Path::new("/dev/sr0"), Some(&cache))
            .unwrap();
        assert_eq!(text, "+ title 1:\n");
    }
}
