//! String escaping for URLs and property values.

use std::collections::BTreeMap;

/// Encode `value` as an `application/x-www-form-urlencoded` component.
///
/// ASCII alphanumerics and `.-*_` pass through, space becomes `+`, every
/// other byte of the UTF-8 encoding becomes `%XX`.
pub fn form_url_encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Join a base URL and a relative path with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// Escape `value` the way a Java string literal would be written.
///
/// C0 control characters and everything outside ASCII become `\uXXXX`, one
/// escape per UTF-16 code unit.
pub fn escape_java(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if u32::from(c) < 0x20 || !c.is_ascii() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Escape every value of a property map; keys are kept as-is.
pub fn escape_property_values(props: BTreeMap<String, String>) -> BTreeMap<String, String> {
    props
        .into_iter()
        .map(|(k, v)| {
            let escaped = escape_java(&v);
            (k, escaped)
        })
        .collect()
}
