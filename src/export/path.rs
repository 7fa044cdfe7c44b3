//! Hierarchy-label sanitization and output naming.
//!
//! Space, folder, and page titles come from user-authored content and can
//! contain anything; everything that lands on disk goes through here first.

/// Maps an arbitrary hierarchy label to a filesystem-safe path segment.
///
/// Reserved characters (`/ \ : * ? " < > |`), control characters, and
/// whitespace runs become a single underscore; leading/trailing
/// underscores are trimmed. Alphanumerics (any script) plus `-`, `_`, and
/// `.` pass through. A label that sanitizes to nothing usable becomes
/// `"untitled"`.
///
/// Pure and total; applying it twice yields the same result.
#[must_use]
pub fn sanitize_segment(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut prev_sep = false;
    for ch in label.chars() {
        let mapped = match ch {
            c if c.is_alphanumeric() || matches!(c, '-' | '.') => c,
            _ => '_',
        };
        if mapped == '_' {
            if !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else {
            out.push(mapped);
            prev_sep = false;
        }
    }

    let trimmed = out.trim_matches('_');
    // A segment of only dots would escape the output root.
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        return "untitled".to_string();
    }
    trimmed.to_string()
}

/// Base name for a page's exported artifacts: `{sanitized title}_{id}`.
#[must_use]
pub fn page_basename(title: &str, id: &str) -> String {
    format!("{}_{id}", sanitize_segment(title))
}

/// Directory name for a page's attachments:
/// `{sanitized title}_{id}_attachments`.
#[must_use]
pub fn attachment_dirname(title: &str, id: &str) -> String {
    format!("{}_{id}_attachments", sanitize_segment(title))
}

/// Sanitizes an attachment filename for filesystem safety.
///
/// Unlike [`sanitize_segment`] this keeps the original name as intact as
/// possible (spaces, parentheses, unicode) and only replaces characters
/// invalid on common filesystems, so attachments keep their recognizable
/// filenames.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Dot-only names would resolve to the directory itself or its parent.
    if sanitized.trim_matches('_').is_empty() || sanitized.chars().all(|c| c == '.') {
        return "attachment.bin".to_string();
    }
    sanitized
}
