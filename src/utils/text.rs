//! Escape-aware text decoding
//!
//! Provider pages embed their data inside JS string literals, so field values
//! arrive as `\u003d`, `\x26`, `\"` and friends. Response bodies are read as
//! Latin-1 (one char per byte, so arbitrary binary never fails to decode) and
//! backslash escapes are then resolved. Malformed escapes are kept verbatim.

/// Decode raw response bytes, resolving backslash escapes
pub fn decode_unicode_escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' || i + 1 >= bytes.len() {
            out.push(char::from(b));
            i += 1;
            continue;
        }

        let next = bytes[i + 1];
        let simple = match next {
            b'\\' => Some('\\'),
            b'\'' => Some('\''),
            b'"' => Some('"'),
            b'n' => Some('\n'),
            b'r' => Some('\r'),
            b't' => Some('\t'),
            b'b' => Some('\u{08}'),
            b'f' => Some('\u{0C}'),
            b'v' => Some('\u{0B}'),
            b'a' => Some('\u{07}'),
            b'\n' => {
                // escaped line continuation
                i += 2;
                continue;
            }
            _ => None,
        };
        if let Some(c) = simple {
            out.push(c);
            i += 2;
            continue;
        }

        let decoded = match next {
            b'x' => hex_escape(bytes, i + 2, 2),
            b'u' => hex_escape(bytes, i + 2, 4),
            b'U' => hex_escape(bytes, i + 2, 8),
            b'0'..=b'7' => octal_escape(bytes, i + 1),
            _ => None,
        };
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                i += 1 + consumed;
            }
            None => {
                out.push('\\');
                i += 1;
            }
        }
    }

    out
}

/// Returns the decoded char and the number of bytes consumed after the backslash
fn hex_escape(bytes: &[u8], start: usize, digits: usize) -> Option<(char, usize)> {
    let end = start.checked_add(digits)?;
    let raw = bytes.get(start..end)?;
    let text = std::str::from_utf8(raw).ok()?;
    if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(text, 16).ok()?;
    char::from_u32(value).map(|c| (c, digits + 1))
}

fn octal_escape(bytes: &[u8], start: usize) -> Option<(char, usize)> {
    let len = bytes[start..]
        .iter()
        .take(3)
        .take_while(|b| (b'0'..=b'7').contains(*b))
        .count();
    let text = std::str::from_utf8(&bytes[start..start + len]).ok()?;
    let value = u32::from_str_radix(text, 8).ok()?;
    char::from_u32(value).map(|c| (c, len))
}
