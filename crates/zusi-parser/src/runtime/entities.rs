//! String attribute decoding and XML character-reference expansion.
//!
//! `&amp;`, `&apos;`, `&quot;`, `&lt;`, `&gt;` and numeric references
//! (`&#NNN;`, `&#xHHHH;`) are recognized; anything else starting with `&` that
//! doesn't match one of those exact forms is passed through byte-for-byte,
//! `&` included — there is no general-purpose entity table and no error for
//! an unrecognized escape.

use super::cursor::Cursor;
use super::tables;
use super::types::Str;
use crate::error::{ParseError, ParseErrorReport};

pub fn parse_string<'input>(cursor: &mut Cursor<'input>, quote: u8) -> Result<Str<'input>, ParseErrorReport> {
    let start = cursor.offset();
    cursor.skip_attribute_value_pure(quote);

    if cursor.peek() == Some(quote) {
        // No character references in the value: borrow it verbatim.
        let bytes = &cursor.input()[start..cursor.offset()];
        let s = std::str::from_utf8(bytes).map_err(|_| ParseError::Utf8Error(format!("{bytes:?}")))?;
        return Ok(Str::Borrowed(s));
    }

    // An '&' was seen; rescan to the real end of the value (entity text
    // doesn't contain the raw quote byte, so the quote-terminated scan is
    // still correct here) and expand as we go.
    cursor.skip_attribute_value(quote);
    let raw = &cursor.input()[start..cursor.offset()];
    let expanded = expand_character_refs(raw, start)?;
    let s = String::from_utf8(expanded).map_err(|e| ParseError::Utf8Error(format!("{e}")))?;
    Ok(Str::Owned(s))
}

fn expand_character_refs(raw: &[u8], base_offset: usize) -> Result<Vec<u8>, ParseErrorReport> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] == b'&' {
            if let Some(rest) = raw.get(i + 1..) {
                match rest.first() {
                    Some(b'a') => {
                        if rest.get(1..4) == Some(b"mp;") {
                            out.push(b'&');
                            i += 5;
                            continue;
                        }
                        if rest.get(1..5) == Some(b"pos;") {
                            out.push(b'\'');
                            i += 6;
                            continue;
                        }
                    }
                    Some(b'q') => {
                        if rest.get(1..5) == Some(b"uot;") {
                            out.push(b'"');
                            i += 6;
                            continue;
                        }
                    }
                    Some(b'g') => {
                        if rest.get(1..3) == Some(b"t;") {
                            out.push(b'>');
                            i += 4;
                            continue;
                        }
                    }
                    Some(b'l') => {
                        if rest.get(1..3) == Some(b"t;") {
                            out.push(b'<');
                            i += 4;
                            continue;
                        }
                    }
                    Some(b'#') => {
                        let hex = rest.get(1) == Some(&b'x');
                        let mut j = i + if hex { 3 } else { 2 };
                        let mut code: u32 = 0;
                        loop {
                            let Some(&b) = raw.get(j) else { break };
                            let digit = tables::digit_value(b);
                            let valid = if hex { digit != 255 } else { digit < 10 };
                            if !valid {
                                break;
                            }
                            code = code.wrapping_mul(if hex { 16 } else { 10 }).wrapping_add(digit as u32);
                            j += 1;
                        }
                        if raw.get(j) != Some(&b';') {
                            return Err(ParseError::ExpectedSemicolon {
                                offset: base_offset + j,
                            }
                            .into());
                        }
                        push_utf8_code_point(&mut out, code, base_offset + j)?;
                        i = j + 1;
                        continue;
                    }
                    _ => {}
                }
            }
            // Unrecognized escape: copy '&' verbatim and keep scanning
            // normally, same as the upstream decoder.
            out.push(b'&');
            i += 1;
            continue;
        }

        out.push(raw[i]);
        i += 1;
    }

    Ok(out)
}

fn push_utf8_code_point(out: &mut Vec<u8>, code: u32, offset: usize) -> Result<(), ParseErrorReport> {
    match char::from_u32(code) {
        Some(c) => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            Ok(())
        }
        None => Err(ParseError::InvalidCharacterReference { offset }.into()),
    }
}
