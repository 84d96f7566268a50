//! Textual serialization of document values.
//!
//! `serialize` is a pure function from a value to its object syntax; it is
//! used both for object dictionaries and for the file trailer. All output is
//! restricted to a single-byte character repertoire so that the byte length
//! of any serialized text equals its character count.

use log::warn;

use crate::object::{Dictionary, Object};

/// Line terminator used throughout the file.
pub const EOL: &str = "\n";

/// Serialize a value into the document's object syntax.
pub fn serialize(object: &Object) -> String {
    match object {
        Object::Boolean(value) => value.to_string(),
        Object::Integer(value) => itoa::Buffer::new().format(*value).to_string(),
        Object::Real(value) => format_number(*value),
        Object::Name(name) => format!("/{}", name),
        Object::Array(array) => {
            let items = array.iter().map(serialize).collect::<Vec<String>>();
            format!("[{}]", items.join(" "))
        }
        Object::Dictionary(dict) => serialize_dictionary(dict),
        Object::Reference(id) => format!("{} {} R", id.0, id.1),
    }
}

/// Serialize a dictionary, one entry per line.
pub fn serialize_dictionary(dict: &Dictionary) -> String {
    let mut out = String::from("<<");
    out.push_str(EOL);
    for (key, value) in dict {
        out.push('/');
        out.push_str(key);
        out.push(' ');
        out.push_str(&serialize(value));
        out.push_str(EOL);
    }
    out.push_str(">>");
    out
}

/// Locale-independent decimal formatting; integral values print without a
/// fraction part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9e15 {
        itoa::Buffer::new().format(value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// Encode text in the fixed single-byte output encoding (Latin-1).
///
/// Returns `None` when the text cannot be represented; callers degrade to an
/// empty string rather than corrupting byte offsets.
pub(crate) fn latin1_bytes(text: &str) -> Option<Vec<u8>> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let code = ch as u32;
        if code > 0xFF {
            warn!("text contains U+{:04X}, not representable in the output encoding", code);
            return None;
        }
        bytes.push(code as u8);
    }
    Some(bytes)
}

/// Escape a show-text run as a string literal.
///
/// Backslashes, parentheses and the common control characters are escaped;
/// line breaks are removed since a literal must stay on one line.
pub(crate) fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\r' | '\n' => {}
            _ => out.push(ch),
        }
    }
    out.push(')');
    out
}
