//! Hand-written runtime support for the generated parser. Everything the
//! code generator emits calls into this module rather than inlining decoder
//! bodies, keeping the generated sources small and the decoding logic in one
//! reviewable place.

mod cursor;
mod decode;
mod entities;
mod tables;
mod types;

pub use cursor::{Cursor, ElementTail};
pub use decode::{
    parse_argb_color, parse_bool, parse_datetime, parse_face_indexes, parse_float, parse_hex_u32, parse_i32,
    parse_i64, parse_legacy_color, shape_component_index,
};
pub use entities::parse_string;
pub use types::{ArgbColor, Datum, FaceIndexes, SmallVec2, Str};

pub use crate::error::{ParseError, ParseErrorReport};

/// Skips a UTF-8 BOM, the XML prolog (`<?xml ... ?>`), comments, the
/// doctype, and processing instructions, then locates the root element and
/// hands off to `parse_root` — a generated `parse_element_*` function for the
/// schema's root type. The root element's own name is not validated against
/// anything; this parser has exactly one schema and one entry point, so
/// there's nothing to dispatch on.
pub fn parse_document<'input, T>(
    input: &'input [u8],
    parse_root: fn(&mut Cursor<'input>) -> Result<T, ParseErrorReport>,
) -> Result<T, ParseErrorReport> {
    let mut cursor = Cursor::new(input);
    skip_bom(&mut cursor);

    loop {
        cursor.skip_whitespace();
        if cursor.at_eof() {
            return Err(ParseError::UnexpectedEndOfData { offset: cursor.offset() }.into());
        }
        if cursor.peek() != Some(b'<') {
            return Err(ParseError::ExpectedElementName { offset: cursor.offset() }.into());
        }

        match peek_node_kind(&cursor) {
            NodeKind::XmlDeclaration => skip_xml_declaration(&mut cursor)?,
            NodeKind::Comment => skip_comment(&mut cursor)?,
            NodeKind::Doctype => skip_doctype(&mut cursor)?,
            NodeKind::ProcessingInstruction => skip_processing_instruction(&mut cursor)?,
            NodeKind::Element => {
                cursor.advance(1); // '<'
                skip_node_name(&mut cursor);
                return parse_root(&mut cursor);
            }
        }
    }
}

/// Skips the root element's tag name itself. The name is not validated
/// against anything (there is exactly one schema and one entry point), so
/// this just walks past it the same way `Cursor::read_child_name` does for
/// every other element, without keeping the bytes.
fn skip_node_name(cursor: &mut Cursor<'_>) {
    while cursor.peek().is_some_and(tables::is_node_name) {
        cursor.advance(1);
    }
}

fn skip_bom(cursor: &mut Cursor<'_>) {
    let bytes = cursor.input();
    if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        cursor.advance(3);
    }
}

enum NodeKind {
    XmlDeclaration,
    Comment,
    Doctype,
    ProcessingInstruction,
    Element,
}

fn peek_node_kind(cursor: &Cursor<'_>) -> NodeKind {
    let rest = &cursor.input()[cursor.offset()..];
    if rest.starts_with(b"<?xml") && rest.get(5).is_some_and(|b| tables::is_whitespace(*b)) {
        NodeKind::XmlDeclaration
    } else if rest.starts_with(b"<?") {
        NodeKind::ProcessingInstruction
    } else if rest.starts_with(b"<!--") {
        NodeKind::Comment
    } else if rest.starts_with(b"<!DOCTYPE") && rest.get(9).is_some_and(|b| tables::is_whitespace(*b)) {
        NodeKind::Doctype
    } else {
        NodeKind::Element
    }
}

fn skip_xml_declaration(cursor: &mut Cursor<'_>) -> Result<(), ParseErrorReport> {
    cursor.advance(5); // "<?xml"
    skip_until(cursor, b"?>")?;
    cursor.advance(2);
    Ok(())
}

fn skip_processing_instruction(cursor: &mut Cursor<'_>) -> Result<(), ParseErrorReport> {
    cursor.advance(2); // "<?"
    skip_until(cursor, b"?>")?;
    cursor.advance(2);
    Ok(())
}

fn skip_comment(cursor: &mut Cursor<'_>) -> Result<(), ParseErrorReport> {
    cursor.advance(4); // "<!--"
    skip_until(cursor, b"-->")?;
    cursor.advance(3);
    Ok(())
}

fn skip_doctype(cursor: &mut Cursor<'_>) -> Result<(), ParseErrorReport> {
    cursor.advance(9); // "<!DOCTYPE"
    let mut depth = 0usize;
    loop {
        match cursor.peek() {
            None => return Err(ParseError::UnexpectedEndOfData { offset: cursor.offset() }.into()),
            Some(b'[') => {
                depth += 1;
                cursor.advance(1);
            }
            Some(b']') => {
                depth = depth.saturating_sub(1);
                cursor.advance(1);
            }
            Some(b'>') if depth == 0 => {
                cursor.advance(1);
                return Ok(());
            }
            _ => cursor.advance(1),
        }
    }
}

fn skip_until(cursor: &mut Cursor<'_>, marker: &[u8]) -> Result<(), ParseErrorReport> {
    loop {
        let rest = &cursor.input()[cursor.offset()..];
        if rest.starts_with(marker) {
            return Ok(());
        }
        if rest.is_empty() {
            return Err(ParseError::UnexpectedEndOfData { offset: cursor.offset() }.into());
        }
        cursor.advance(1);
    }
}
