//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Collapse a (possibly multi-line) model answer into a single truncated line
/// suitable for log fields.
pub fn preview(s: &str, max_len: usize) -> String {
    let single_line = s.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&single_line, max_len)
}
