//! Conversion driving.
//!
//! Everything the planner deliberately leaves to the invoker happens here:
//! output existence checks, directory creation, running the tool, and
//! judging the result. A failed title has its duplicate-detection record
//! rolled back so a retry is not misclassified as a duplicate.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use hbrip::config::Config;
use hbrip::plan::{self, Planner, TitleOutcome};
use hbrip_scan::{HandBrake, Source};

/// Outputs smaller than this are treated as failed conversions.
const MIN_OUTPUT_BYTES: u64 = 1024 * 1024;

/// Plan and convert every title of a source, returning the created files.
pub fn convert_source(
    source: &Source,
    config: &Config,
    planner: &mut Planner,
    hb: &HandBrake,
    dry_run: bool,
    verbose: bool,
) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();

    if source.titles.is_empty() {
        tracing::info!("{} contains no titles", source.path.display());
        return Ok(created);
    }

    for title in &source.titles {
        tracing::info!("checking {title}");
        let directive = match planner.plan_title(source, title) {
            TitleOutcome::Skipped(reason) => {
                tracing::info!("skipping title {}: {reason}", title.pos);
                continue;
            }
            TitleOutcome::Planned(directive) => directive,
        };

        let output = Path::new(&directive.output);
        if !config.output.force && output_exists(output) {
            tracing::info!(
                "skipping title {} because {} already exists",
                title.pos,
                output.display()
            );
            continue;
        }

        let mut args = plan::handbrake_args(&directive, &source.path, config);
        if verbose {
            args.push("--verbose".to_string());
        }

        tracing::info!("converting title {} -> {}", title.pos, output.display());
        for audio in &directive.audio {
            tracing::info!("  audio {:?}: {}", audio.tracks, audio.name);
        }

        if dry_run {
            println!("{} {}", hb.program().display(), args.join(" "));
            continue;
        }

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let status = hb.convert(&args)?;
        match verify_output(output, status.success()) {
            Ok(size) => {
                tracing::info!("created {} ({size} bytes)", output.display());
                created.push(output.to_path_buf());
            }
            Err(problem) => {
                tracing::warn!("{problem}, removing {}", output.display());
                let _ = std::fs::remove_file(output);
                planner.forget(directive.blocks);
            }
        }
    }

    Ok(created)
}

/// Existence check for the resolved output path.
///
/// Besides the exact path, any sibling file ending with `.<basename>`
/// counts: interrupted runs leave prefixed variants behind and those should
/// not be silently overwritten either.
fn output_exists(output: &Path) -> bool {
    if output.exists() {
        return true;
    }
    let (Some(parent), Some(name)) = (output.parent(), output.file_name()) else {
        return false;
    };
    let suffix = format!(".{}", name.to_string_lossy());
    match std::fs::read_dir(parent) {
        Ok(entries) => entries
            .flatten()
            .any(|e| e.file_name().to_string_lossy().ends_with(&suffix)),
        Err(_) => false,
    }
}

fn verify_output(output: &Path, success: bool) -> std::result::Result<u64, String> {
    let metadata = std::fs::metadata(output)
        .map_err(|_| format!("{} was not created", output.display()))?;
    if !success {
        return Err("conversion exited with an error".to_string());
    }
    let size = metadata.len();
    if size < MIN_OUTPUT_BYTES {
        return Err(format!("output is implausibly small ({size} bytes)"));
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_exists_matches_suffixed_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("movie.mp4");
        assert!(!output_exists(&output));

        std::fs::write(dir.path().join("partial.movie.mp4"), b"x").unwrap();
        assert!(output_exists(&output));
    }

    #[test]
    fn verify_output_judges_exit_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("movie.mp4");

        assert!(verify_output(&output, true).is_err());

        std::fs::write(&output, vec![0u8; 16]).unwrap();
        assert!(verify_output(&output, false).is_err());
        assert!(verify_output(&output, true).is_err());

        std::fs::write(&output, vec![0u8; (MIN_OUTPUT_BYTES + 1) as usize]).unwrap();
        assert_eq!(verify_output(&output, true), Ok(MIN_OUTPUT_BYTES + 1));
    }
}
