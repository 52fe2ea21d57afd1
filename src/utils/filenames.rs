//! Filename derivation and safety checks.
//!
//! Artifact and staging filenames are always derived here, never taken
//! verbatim from user input, so a name that fails [`is_safe_filename`]
//! can only come from a tampered request.

use chrono::Utc;
use uuid::Uuid;

/// True when `name` is a single path component made of conservative
/// characters: no separators, no `..`, not empty, not dot-prefixed.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Reduce an arbitrary label to a filename-safe slug.
///
/// Non-alphanumeric runs collapse to a single underscore; leading and
/// trailing underscores are dropped.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut last_was_sep = true;
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// Derive a unique artifact filename: `{label}_{UTC stamp}_{job prefix}.{ext}`.
///
/// The job-id prefix keeps two artifacts of different jobs distinct even at
/// identical timestamps; the label keeps two artifacts of the same job
/// distinct from each other.
pub fn artifact_filename(label: &str, job_id: Uuid, ext: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let prefix = &job_id.simple().to_string()[..8];
    format!("{}_{stamp}_{prefix}.{ext}", slugify(label))
}

/// Derive a staging filename for an uploaded source file.
pub fn upload_filename(original: &str, ext_fallback: &str) -> String {
    let ext = original
        .rsplit('.')
        .next()
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(ext_fallback);
    let stamp = Utc::now().timestamp_millis();
    let nonce = &Uuid::new_v4().simple().to_string()[..8];
    format!("upload_{stamp}_{nonce}.{}", ext.to_ascii_lowercase())
}
