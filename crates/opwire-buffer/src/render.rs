//! Human-readable rendering of raw bytes for log lines.
//!
//! Printable ASCII is kept as is, `\r`/`\n` are escaped, spaces become `␣`,
//! and runs of anything else are grouped as ` 0x` followed by hex pairs:
//!
//! ```text
//! b"GET /\r\n\x00\x01ok"  ->  "GET␣/\r\n 0x0001 ok"
//! ```

use std::fmt::Write;

/// Render `bytes` in the diagnostic format described in the module docs.
pub fn render(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    let mut in_hex = false;

    for &b in bytes {
        let text = match b {
            b'\r' => Some("\\r"),
            b'\n' => Some("\\n"),
            b' ' => Some("␣"),
            _ => None,
        };

        if text.is_some() || (33..=126).contains(&b) {
            if in_hex {
                out.push(' ');
                in_hex = false;
            }
            match text {
                Some(text) => out.push_str(text),
                None => out.push(char::from(b)),
            }
        } else {
            if !in_hex {
                out.push_str(" 0x");
                in_hex = true;
            }
            let _ = write!(out, "{b:02x}");
        }
    }

    out
}
