//! Pre-formatting of structured bodies before tokenization

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::{PrettyError, Result};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" ?>";

/// Re-serialize JSON with sorted keys and 4-space indentation
///
/// Returns `None` if `body` is not valid JSON.
pub fn indent_json(body: &str) -> Option<String> {
    // serde_json's default map is ordered by key; numbers keep their
    // original text (`arbitrary_precision`)
    let value: Value = serde_json::from_str(body).ok()?;

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).ok()?;
    String::from_utf8(buf).ok()
}

fn malformed(e: impl std::fmt::Display) -> PrettyError {
    PrettyError::Xml(e.to_string())
}

fn outside_root(position: u64) -> PrettyError {
    malformed(format!("content outside the root element at byte {position}"))
}

/// Attributes must be quoted, unique and use only defined entities
fn check_attributes(tag: &BytesStart<'_>) -> Result<()> {
    let mut attributes = tag.attributes();
    attributes.with_checks(true);
    for attribute in attributes {
        attribute.map_err(malformed)?.unescape_value().map_err(malformed)?;
    }
    Ok(())
}

/// Parse `body` as an XML document and pretty-print it with 2-space indentation
///
/// The output starts with an `<?xml version="1.0" ?>` declaration; any
/// declaration in the input is replaced. A document that is not well formed
/// (mismatched or unclosed tags, no root element, content after the root)
/// is an error, as are unquoted or repeated attributes and undefined entities.
///
/// Whitespace-only text between elements is dropped so the output can be
/// re-indented; any other text is kept exactly.
pub fn pretty_xml(body: &str) -> Result<String> {
    let mut reader = Reader::from_str(body);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let mut depth: usize = 0;
    let mut roots = 0;

    loop {
        let event = reader.read_event().map_err(malformed)?;
        match &event {
            Event::Eof => break,
            Event::Decl(_) => continue,
            Event::Start(tag) => {
                check_attributes(tag)?;
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("closing tag without an opening tag"))?;
            }
            Event::Empty(tag) => {
                check_attributes(tag)?;
                if depth == 0 {
                    roots += 1;
                }
            }
            Event::Text(text) => {
                let unescaped = text.unescape().map_err(malformed)?;
                if unescaped.trim().is_empty() {
                    continue;
                }
                if depth == 0 {
                    return Err(outside_root(reader.buffer_position()));
                }
            }
            Event::CData(_) if depth == 0 => return Err(outside_root(reader.buffer_position())),
            _ => {}
        }
        if roots > 1 {
            return Err(malformed("more than one root element"));
        }
        writer.write_event(event).map_err(malformed)?;
    }

    if depth > 0 {
        return Err(malformed("unexpected end of document: unclosed element"));
    }
    if roots == 0 {
        return Err(malformed("no root element"));
    }

    let pretty = String::from_utf8(writer.into_inner()).map_err(malformed)?;
    Ok(format!("{XML_DECLARATION}\n{pretty}\n"))
}
