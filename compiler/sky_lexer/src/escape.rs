//! String literal decoding.

use crate::lex_error::LexErrorKind;

/// Decode a full string literal slice, including its optional `r` prefix and
/// its quotes, into the string value.
pub fn decode_string_literal(slice: &str) -> Result<String, LexErrorKind> {
    let (raw, rest) = match slice.as_bytes().first() {
        Some(b'r' | b'R') => (true, &slice[1..]),
        _ => (false, slice),
    };
    let quote_len = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
        3
    } else {
        1
    };
    if rest.len() < quote_len * 2 {
        return Err(LexErrorKind::UnterminatedString);
    }
    let body = &rest[quote_len..rest.len() - quote_len];
    if raw {
        return Ok(body.to_string());
    }
    unescape(body)
}

fn unescape(body: &str) -> Result<String, LexErrorKind> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            return Err(LexErrorKind::UnterminatedString);
        };
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            // Escaped newline joins lines.
            '\n' => {}
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).ok_or(LexErrorKind::InvalidEscape(esc))?);
            }
            'x' => out.push(hex_escape(&mut chars, 2, esc)?),
            'u' => out.push(hex_escape(&mut chars, 4, esc)?),
            'U' => out.push(hex_escape(&mut chars, 8, esc)?),
            other => return Err(LexErrorKind::InvalidEscape(other)),
        }
    }

    Ok(out)
}

fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    esc: char,
) -> Result<char, LexErrorKind> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|d| d.to_digit(16))
            .ok_or(LexErrorKind::InvalidEscape(esc))?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or(LexErrorKind::InvalidEscape(esc))
}
