//! Output-path template resolution.
//!
//! Templates carry literal paths plus substitution tokens:
//! `#pos#` (title position, zero-padded to two digits), `#size#`, `#fps#`,
//! `#ts#` (run timestamp), `#title#` (source name), `#input#` (source path
//! basename).

use hbrip_scan::{Source, Title};

/// Resolve every template token against a source and title.
pub fn resolve_output(
    template: &str,
    source: &Source,
    title: &Title,
    timestamp: &str,
    use_alt_title: bool,
) -> String {
    template
        .replace("#pos#", &format!("{:02}", title.pos))
        .replace("#size#", title.size.as_deref().unwrap_or(""))
        .replace("#fps#", title.fps.as_deref().unwrap_or(""))
        .replace("#ts#", timestamp)
        .replace("#title#", &source.name(use_alt_title))
        .replace("#input#", &input_basename(source))
}

/// Timestamp for the `#ts#` token, resolved once per planning run.
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H_%M_%S").to_string()
}

fn input_basename(source: &Source) -> String {
    source
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
