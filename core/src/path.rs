//! Lexical path normalization for request paths.
//!
//! # Design
//! Each segment is cleaned on its own before concatenation, so a `..` inside
//! one segment can only climb to that segment's root. A request for
//! `("docs", "/../../etc")` therefore stays under `/docs`. Nothing here
//! touches the filesystem or percent-decodes input.

/// Normalize one path into a rooted form.
///
/// Empty and `.` components are dropped and `..` removes the previous
/// component (ignored at the root). The result always starts with `/` and
/// only ends with `/` when it is the root itself.
pub fn clean(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return "/".to_string();
    }
    let mut out = String::with_capacity(path.len() + 1);
    for part in parts {
        out.push('/');
        out.push_str(part);
    }
    out
}

/// Clean every segment and concatenate them into one rooted path.
pub fn join(segments: &[&str]) -> String {
    let mut out = String::new();
    for segment in segments {
        let cleaned = clean(segment);
        if cleaned != "/" {
            out.push_str(&cleaned);
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}
