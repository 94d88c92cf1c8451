//! Scalar attribute decoders. Each one reads up to
//! the closing quote and leaves the cursor positioned there (the caller
//! consumes the quote itself), mirroring the original decoders' contract of
//! never touching the byte that terminates the value.

use super::cursor::Cursor;
use super::tables;
use super::types::{ArgbColor, Datum, FaceIndexes};
use crate::error::{ParseError, ParseErrorReport};

pub fn parse_bool(cursor: &mut Cursor<'_>, _quote: u8) -> Result<bool, ParseErrorReport> {
    cursor.skip_whitespace();
    let value = cursor.peek() == Some(b'1');
    cursor.advance(1);
    Ok(value)
}

pub fn parse_i32(cursor: &mut Cursor<'_>, quote: u8) -> Result<i32, ParseErrorReport> {
    let (text, offset) = read_raw_token(cursor, quote);
    text.trim_end()
        .parse::<i32>()
        .map_err(|_| ParseError::Utf8Error(format!("invalid i32 `{text}` at byte {offset}")).into())
}

pub fn parse_i64(cursor: &mut Cursor<'_>, quote: u8) -> Result<i64, ParseErrorReport> {
    let (text, offset) = read_raw_token(cursor, quote);
    text.trim_end()
        .parse::<i64>()
        .map_err(|_| ParseError::Utf8Error(format!("invalid i64 `{text}` at byte {offset}")).into())
}

/// `boost::spirit::qi::int_parser<uint32_t, 16, 1, 9>`: one to nine hex
/// digits, overflow wraps modulo 2^32 rather than erroring.
pub fn parse_hex_u32(cursor: &mut Cursor<'_>, _quote: u8) -> Result<u32, ParseErrorReport> {
    cursor.skip_whitespace();
    let offset = cursor.offset();
    let mut value: u32 = 0;
    let mut count = 0;
    while let Some(b) = cursor.peek() {
        let digit = tables::digit_value(b);
        if digit == 255 {
            break;
        }
        value = value.wrapping_mul(16).wrapping_add(digit as u32);
        cursor.advance(1);
        count += 1;
    }
    if count == 0 {
        return Err(ParseError::Utf8Error(format!("expected hex digits at byte {offset}")).into());
    }
    cursor.skip_whitespace();
    Ok(value)
}

pub fn parse_argb_color(cursor: &mut Cursor<'_>, quote: u8) -> Result<ArgbColor, ParseErrorReport> {
    let tmp = parse_hex_u32(cursor, quote)?;
    Ok(ArgbColor {
        a: ((tmp >> 24) & 0xFF) as u8,
        r: ((tmp >> 16) & 0xFF) as u8,
        g: ((tmp >> 8) & 0xFF) as u8,
        b: (tmp & 0xFF) as u8,
    })
}

/// The deprecated `C`/`CA`/`E` color attributes pack their bytes in a
/// different order from `ArgbColor` (red and blue swapped relative to the
/// natural a/r/g/b reading). Existing data relies on this quirk, so it is
/// preserved rather than corrected.
pub fn parse_legacy_color(cursor: &mut Cursor<'_>, quote: u8) -> Result<ArgbColor, ParseErrorReport> {
    let tmp = parse_hex_u32(cursor, quote)?;
    Ok(ArgbColor {
        a: ((tmp >> 24) & 0xFF) as u8,
        r: (tmp & 0xFF) as u8,
        g: ((tmp >> 8) & 0xFF) as u8,
        b: ((tmp >> 16) & 0xFF) as u8,
    })
}

fn read_raw_token<'c>(cursor: &mut Cursor<'c>, quote: u8) -> (&'c str, usize) {
    cursor.skip_whitespace();
    let offset = cursor.offset();
    let start = cursor.offset();
    while cursor.peek().is_some_and(|b| b != quote) {
        cursor.advance(1);
    }
    let bytes = &cursor.input()[start..cursor.offset()];
    (std::str::from_utf8(bytes).unwrap_or(""), offset)
}

/// Fast path for `-XXXXXXX.YYYYYYY` (each run of digits up to 7 characters)
/// immediately followed by a double quote, however the attribute is actually
/// quoted — matching a quirk of the decoder this was ported from, which
/// always tests for `"` here regardless of which quote character opened the
/// attribute. Anything else falls back to a general parse that, like the
/// original, accepts both `.` and `,` as the decimal separator.
pub fn parse_float(cursor: &mut Cursor<'_>, _quote: u8) -> Result<f32, ParseErrorReport> {
    cursor.skip_whitespace();
    let save = cursor.offset();
    let neg = cursor.peek() == Some(b'-');
    if neg {
        cursor.advance(1);
    }

    let integer_start = cursor.offset();
    let mut integer_len = 0;
    while integer_len < 7 && cursor.peek().is_some_and(tables::is_ascii_digit) {
        cursor.advance(1);
        integer_len += 1;
    }

    let dot_start = cursor.offset();
    let mut fractional_len = 0;
    if cursor.peek() == Some(b'.') {
        cursor.advance(1);
        while fractional_len < 7 && cursor.peek().is_some_and(tables::is_ascii_digit) {
            cursor.advance(1);
            fractional_len += 1;
        }
    }

    if cursor.peek() == Some(b'"') {
        let input = cursor.input();
        let integer: u32 = if integer_len == 0 {
            0
        } else {
            std::str::from_utf8(&input[integer_start..integer_start + integer_len])
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0)
        };
        let fractional: u32 = if fractional_len == 0 {
            0
        } else {
            std::str::from_utf8(&input[dot_start + 1..dot_start + 1 + fractional_len])
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0)
        };

        let mut result = integer as f32;
        if fractional_len > 0 {
            result += fractional as f32 / 10f32.powi(fractional_len as i32);
        }
        if neg {
            result = -result;
        }
        return Ok(result);
    }

    // Slow path: let the cursor rewind to the original start and consume a
    // general real-number token (optional sign, digits, optional `.`/`,`
    // separator, optional exponent), then hand it to `f32::from_str`.
    let restart = save;
    let token = read_general_float_token(cursor, restart);
    cursor.skip_whitespace();
    token
        .parse::<f32>()
        .map_err(|_| ParseError::Utf8Error(format!("invalid float `{token}` at byte {restart}")).into())
}

fn read_general_float_token(cursor: &mut Cursor<'_>, start_offset: usize) -> String {
    let input = cursor.input();
    let mut pos = start_offset;
    let mut token = String::new();

    if input.get(pos) == Some(&b'-') || input.get(pos) == Some(&b'+') {
        token.push(input[pos] as char);
        pos += 1;
    }
    while input.get(pos).is_some_and(|b| b.is_ascii_digit()) {
        token.push(input[pos] as char);
        pos += 1;
    }
    if matches!(input.get(pos), Some(b'.') | Some(b',')) {
        token.push('.');
        pos += 1;
        while input.get(pos).is_some_and(|b| b.is_ascii_digit()) {
            token.push(input[pos] as char);
            pos += 1;
        }
    }
    if matches!(input.get(pos), Some(b'e') | Some(b'E')) {
        let mut exp_pos = pos + 1;
        let mut exp = String::from("e");
        if matches!(input.get(exp_pos), Some(b'-') | Some(b'+')) {
            exp.push(input[exp_pos] as char);
            exp_pos += 1;
        }
        let exp_digits_start = exp_pos;
        while input.get(exp_pos).is_some_and(|b| b.is_ascii_digit()) {
            exp.push(input[exp_pos] as char);
            exp_pos += 1;
        }
        if exp_pos > exp_digits_start {
            token.push_str(&exp);
            pos = exp_pos;
        }
    }

    cursor.seek(pos);
    token
}

/// `faceIndexes`: three `;`-separated decimal fields, at most five digits
/// each. A `;` is required after the first two fields; the trailing `;`
/// after the third is consumed if present but not required.
pub fn parse_face_indexes(cursor: &mut Cursor<'_>, _quote: u8) -> Result<FaceIndexes, ParseErrorReport> {
    let mut values = [0u16; 3];

    for (i, value) in values.iter_mut().enumerate() {
        let start = cursor.offset();
        while cursor.peek().is_some_and(tables::is_ascii_digit) {
            cursor.advance(1);
        }
        let len = cursor.offset() - start;
        let is_last = i == 2;

        if !is_last {
            if cursor.peek() != Some(b';') {
                return Err(ParseError::ExpectedSemicolon { offset: cursor.offset() }.into());
            }
        }

        if len > 5 {
            return Err(ParseError::ValueTooLong { offset: start }.into());
        }
        if len > 0 {
            let bytes = &cursor.input()[start..start + len];
            let text = std::str::from_utf8(bytes).unwrap_or("0");
            *value = text.parse().unwrap_or(0);
        }

        if !is_last {
            cursor.advance(1); // the separating ';'
        }
    }

    if cursor.peek() == Some(b';') {
        cursor.advance(1);
    }

    Ok(FaceIndexes(values))
}

/// `Vec2`/`Vec3`/`Quaternion` dispatch their single-letter attribute names
/// onto a fixed-size component array by subtracting the type's own base
/// letter (`'X'` for `Vec2`/`Vec3`, `'W'` for `Quaternion`'s leading
/// component) and bounds-checking against `count`, matching the original
/// per-type `name_size == 1 && *name >= base && *name <= base + count - 1`
/// guard rather than one shared range for all three shapes.
#[inline]
pub fn shape_component_index(name_byte: u8, base: u8, count: usize) -> Option<usize> {
    let idx = name_byte.checked_sub(base)? as usize;
    (idx < count).then_some(idx)
}

/// Writes `result`'s fields left to right and stops at the first malformed
/// one, leaving whatever was already written in place — this is the original
/// decoder's actual behavior, not an oversight, and some callers rely on a
/// partially-populated `Datum` after a `false` return (a bare time with no
/// date, for instance, leaves `year`/`month`/`day` at their defaults).
pub fn parse_datetime(cursor: &mut Cursor<'_>, quote: u8, result: &mut Datum) -> Result<bool, ParseErrorReport> {
    cursor.skip_whitespace();
    let mut prev = cursor.offset();
    skip_max_digits(cursor, 4);

    if cursor.peek() == Some(b'-') {
        let Some(year) = take_digits_value(cursor, prev, 4) else {
            return Ok(false);
        };
        result.year = year - 1900;
        cursor.advance(1);
        prev = cursor.offset();
        skip_max_digits(cursor, 2);

        if cursor.peek() != Some(b'-') {
            return Ok(false);
        }
        let Some(month) = take_digits_value(cursor, prev, 2) else {
            return Ok(false);
        };
        result.month = month;
        cursor.advance(1);
        prev = cursor.offset();
        skip_max_digits(cursor, 2);

        let Some(day) = take_digits_value(cursor, prev, 2) else {
            return Ok(false);
        };
        result.day = day;

        if cursor.peek() == Some(quote) {
            return Ok(true);
        } else if cursor.peek() == Some(b' ') {
            cursor.advance(1);
            prev = cursor.offset();
            skip_max_digits(cursor, 2);
        }
    }

    if cursor.peek() == Some(b':') {
        let Some(hour) = take_digits_value(cursor, prev, 4) else {
            return Ok(false);
        };
        result.hour = hour;
        cursor.advance(1);
        prev = cursor.offset();
        skip_max_digits(cursor, 2);

        if cursor.peek() != Some(b':') {
            return Ok(false);
        }
        let Some(minute) = take_digits_value(cursor, prev, 2) else {
            return Ok(false);
        };
        result.minute = minute;
        cursor.advance(1);
        prev = cursor.offset();
        skip_max_digits(cursor, 2);

        let Some(second) = take_digits_value(cursor, prev, 2) else {
            return Ok(false);
        };
        result.second = second;
    }

    Ok(true)
}

fn skip_max_digits(cursor: &mut Cursor<'_>, max: usize) {
    let mut n = 0;
    while n < max && cursor.peek().is_some_and(tables::is_ascii_digit) {
        cursor.advance(1);
        n += 1;
    }
}

fn take_digits_value(cursor: &Cursor<'_>, start: usize, max_len: usize) -> Option<i32> {
    let end = cursor.offset();
    let len = end - start;
    if len == 0 || len > max_len {
        return None;
    }
    let bytes = &cursor.input()[start..end];
    std::str::from_utf8(bytes).ok()?.parse().ok()
}
