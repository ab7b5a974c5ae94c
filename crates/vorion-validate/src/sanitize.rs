// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! String sanitization: control-byte stripping and whitespace
//! normalization, applied before any injection scan runs.

/// Strip ASCII control bytes (except tab/newline, which are collapsed by
/// whitespace normalization below) and collapse runs of whitespace to a
/// single space, trimming the ends.
pub fn sanitize_string(input: &str) -> String {
    let stripped: String = input
        .chars()
        .filter(|c| !c.is_control() || *c == '\t' || *c == '\n')
        .collect();

    let mut out = String::with_capacity(stripped.len());
    let mut last_was_space = false;
    for c in stripped.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_bytes() {
        let input = "hello\u{0007}world";
        assert_eq!(sanitize_string(input), "helloworld");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(sanitize_string("too   many\n\nspaces"), "too many spaces");
    }

    #[test]
    fn trims_ends() {
        assert_eq!(sanitize_string("  padded  "), "padded");
    }
}
