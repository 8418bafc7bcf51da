//! Renders an encoded stream as a C/C++ header.
//!
//! The stream is split into quoted fragments of a fixed number of stream
//! bytes so the constant stays readable in source form:
//!
//! ```text
//! // this file was auto-generated by logoconv; do not edit
//! static constexpr int LogoWidth = 4;
//! static constexpr int LogoHeight = 4;
//! static constexpr int LogoMaxLevel = 1;
//! static const char* LogoData =  // 8 bytes of compressed data
//! "DAbAAbAD";
//! ```

use crate::codec::Encoded;
use crate::{LogoError, Result};

/// Options for [`render_header`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Prefix of the generated identifiers (`<name>Width`, `<name>Data`, ...)
    pub name: String,
    /// Stream bytes per quoted fragment
    pub line_width: usize,
    /// Tool name written into the leading comment
    pub generator: String,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            name: "Logo".to_string(),
            line_width: 76,
            generator: "logoconv".to_string(),
        }
    }
}

fn push_escaped(out: &mut String, byte: u8) {
    match byte {
        b'"' => out.push_str("\\\""),
        b'\\' => out.push_str("\\\\"),
        b' '..=b'~' => out.push(byte as char),
        // octal escapes stop after three digits, unlike \x
        _ => out.push_str(&format!("\\{byte:03o}")),
    }
}

/// Renders `encoded` as a header defining width, height, maximum level and the
/// data string.
///
/// # Errors
///
/// [`LogoError::InvalidParameter`] if `line_width` is zero or `name` is not a
/// valid identifier prefix.
pub fn render_header(encoded: &Encoded, opts: &HeaderOptions) -> Result<String> {
    if opts.line_width == 0 {
        return Err(LogoError::InvalidParameter(
            "line width must be at least 1".to_string(),
        ));
    }
    let valid_name = opts
        .name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && opts
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_name {
        return Err(LogoError::InvalidParameter(format!(
            "'{}' is not a valid identifier",
            opts.name
        )));
    }

    let name = &opts.name;
    let mut out = String::with_capacity(encoded.len() * 2 + 256);
    out.push_str(&format!(
        "// this file was auto-generated by {}; do not edit\n",
        opts.generator
    ));
    out.push_str(&format!(
        "static constexpr int {name}Width = {};\n",
        encoded.width
    ));
    out.push_str(&format!(
        "static constexpr int {name}Height = {};\n",
        encoded.height
    ));
    out.push_str(&format!(
        "static constexpr int {name}MaxLevel = {};\n",
        encoded.max_level
    ));
    out.push_str(&format!(
        "static const char* {name}Data =  // {} bytes of compressed data",
        encoded.len()
    ));

    if encoded.is_empty() {
        out.push_str("\n\"\"");
    }
    for fragment in encoded.data.chunks(opts.line_width) {
        out.push_str("\n\"");
        for &byte in fragment {
            push_escaped(&mut out, byte);
        }
        out.push('"');
    }
    out.push_str(";\n");
    Ok(out)
}
