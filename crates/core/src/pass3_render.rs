//! Pass 3: JSON rendering. Pretty-prints with a one-space indent, then
//! pulls numeric array elements and closing brackets up onto the previous
//! line so vertex data stays readable.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

static COMPACTABLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+([\-+\d.e]+|\]),?$").unwrap());

/// Render any serializable document (lowered or normalized) as text.
pub fn render<T: Serialize + ?Sized>(document: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    document.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8.
    let text = String::from_utf8_lossy(&buf);
    Ok(compact_numeric_arrays(&text))
}

/// Join every line that holds only a number or a `]` (with an optional
/// trailing comma) onto the line before it. The first and last lines are
/// never joined. Purely cosmetic: the decoded JSON is unchanged.
pub fn compact_numeric_arrays(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len().saturating_sub(1);
    let mut out = String::with_capacity(text.len());
    for (i, line) in lines.iter().enumerate() {
        if i > 0 && i < last && COMPACTABLE_LINE.is_match(line) {
            out.push_str(line.trim_start());
        } else {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line);
        }
    }
    out
}
