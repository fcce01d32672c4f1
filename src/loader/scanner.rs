//! Lexical helpers shared by the document parser.
//!
//! All offsets are byte offsets into the full document so warnings can name
//! the line an item started on.

/// A bare identifier or a single-quoted name with `''` escapes.
pub(crate) const NAME: &str = r"'(?:[^']|'')*'|\w+";

/// Decode a matched [`NAME`]: strip quotes, undo `''` escapes, trim.
pub(crate) fn decode_name(raw: &str) -> String {
    let raw = raw.trim();
    match raw
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(inner) => inner.replace("''", "'").trim().to_string(),
        None => raw.to_string(),
    }
}

/// Maps byte offsets to 1-based line numbers.
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    pub(crate) fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

/// Offset of the `}` closing the `{` at `open`, skipping double-quoted
/// string literals. `None` when the text ends first.
pub(crate) fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;

    for (i, b) in text.bytes().enumerate().skip(open) {
        match b {
            // `""` inside a literal toggles twice and stays inside.
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode the double-quoted literal starting at `start`.
///
/// Returns the text and the offset just past the closing quote.
pub(crate) fn quoted_text(text: &str, start: usize) -> Option<(String, usize)> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'"') {
        return None;
    }

    let mut out = String::new();
    let mut seg_start = start + 1;
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            out.push_str(&text[seg_start..i]);
            if bytes.get(i + 1) == Some(&b'"') {
                out.push('"');
                i += 2;
                seg_start = i;
                continue;
            }
            return Some((out, i + 1));
        }
        i += 1;
    }
    None
}

/// First non-blank offset at or after `pos` (newlines included).
pub(crate) fn skip_whitespace(text: &str, pos: usize) -> usize {
    text[pos..]
        .find(|c: char| !c.is_whitespace())
        .map_or(text.len(), |i| pos + i)
}

/// Offset of the `\n` ending the line containing `pos` (or the text end).
pub(crate) fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map_or(text.len(), |i| pos + i)
}

/// Start of the line after the one containing `pos`.
pub(crate) fn next_line_start(text: &str, pos: usize) -> usize {
    (line_end(text, pos) + 1).min(text.len())
}
