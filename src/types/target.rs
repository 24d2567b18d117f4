//! Target normalization.
//!
//! Targets arrive one per line, often pasted as URLs. Only the host part
//! (plus any `:port` suffix the user wrote) is kept.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Strip an `http://`/`https://` scheme and any trailing path.
///
/// ```
/// use skulk::types::sanitize_target;
///
/// assert_eq!(sanitize_target("https://example.com/path"), "example.com");
/// assert_eq!(sanitize_target("http://example.com:8080/x/y"), "example.com:8080");
/// assert_eq!(sanitize_target("example.com"), "example.com");
/// ```
pub fn sanitize_target(target: &str) -> &str {
    let target = target
        .strip_prefix("http://")
        .or_else(|| target.strip_prefix("https://"))
        .unwrap_or(target);

    match target.find('/') {
        Some(idx) => &target[..idx],
        None => target,
    }
}

/// Read line-delimited targets, sanitizing each one.
///
/// Blank lines (and lines that sanitize to nothing, such as `http:///x`)
/// are skipped.
pub async fn read_targets<R>(reader: R) -> std::io::Result<Vec<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut targets = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let host = sanitize_target(line.trim());
        if !host.is_empty() {
            targets.push(host.to_string());
        }
    }

    Ok(targets)
}
