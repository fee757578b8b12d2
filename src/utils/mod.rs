//! Utility functions and helpers.

pub mod http;
pub mod log;

/// Replace characters that are unsafe in a file name.
///
/// `/`, `\` and `:` become `_`, spaces become `__`; control characters are
/// dropped.
pub fn sanitize_file_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => out.push('_'),
            ' ' => out.push_str("__"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_timestamp() {
        assert_eq!(
            sanitize_file_component("2026/10/17 08:30:05"),
            "2026_10_17__08_30_05"
        );
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_file_component("ab/../cd"), "ab_.._cd");
        assert_eq!(sanitize_file_component("a\nb"), "ab");
    }
}
