//! Re-indenting pass over compact JSON.

/// Lay `compact` out one member per line, nesting by `indent`.
///
/// Whitespace outside strings is dropped and rebuilt; string contents are
/// copied untouched. Empty arrays and objects stay on one line.
pub fn prettify(compact: &[u8], indent: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(compact.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    let newline = |out: &mut Vec<u8>, depth: usize| {
        out.push(b'\n');
        for _ in 0..depth {
            out.extend_from_slice(indent.as_bytes());
        }
    };

    let mut i = 0;
    while i < compact.len() {
        let b = compact[i];
        i += 1;

        if in_string {
            out.push(b);
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b' ' | b'\t' | b'\n' | b'\r' => {}
            b'"' => {
                in_string = true;
                out.push(b);
            }
            b'{' | b'[' => {
                let close = if b == b'{' { b'}' } else { b']' };
                let next = compact[i..]
                    .iter()
                    .position(|c| !c.is_ascii_whitespace())
                    .map(|skip| i + skip);
                out.push(b);
                if let Some(at) = next.filter(|&at| compact[at] == close) {
                    out.push(close);
                    i = at + 1;
                } else {
                    depth += 1;
                    newline(&mut out, depth);
                }
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                newline(&mut out, depth);
                out.push(b);
            }
            b',' => {
                out.push(b);
                newline(&mut out, depth);
            }
            b':' => out.extend_from_slice(b": "),
            _ => out.push(b),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinpack_testhelpers::test;

    fn pretty(s: &str) -> String {
        String::from_utf8(prettify(s.as_bytes(), "  ")).unwrap()
    }

    #[test]
    fn nests_objects_and_arrays() {
        assert_eq!(
            pretty(r#"{"a":[1,2],"b":{}}"#),
            "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": {}\n}"
        );
    }

    #[test]
    fn strings_are_left_alone() {
        assert_eq!(pretty(r#"["x,{:}\"]"]"#), "[\n  \"x,{:}\\\"]\"\n]");
        assert_eq!(pretty("[ ]"), "[]");
        assert_eq!(pretty("7"), "7");
    }
}
