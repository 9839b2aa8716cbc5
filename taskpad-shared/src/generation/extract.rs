/// Markdown fence extraction
///
/// Finds the first fenced block of the form
///
/// ````text
/// ```json
/// [ ... ]
/// ```
/// ````
///
/// where the `json` tag is optional, any whitespace may follow the opening
/// fence as long as it contains a line break, and the block ends at the first
/// line that starts with a closing fence. The body is returned trimmed. Text
/// with no such block is returned trimmed as a whole.

const FENCE: &str = "```";
const LANGUAGE_TAG: &str = "json";

/// Whitespace as understood by the fence grammar (ASCII only)
fn is_fence_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Body of a block whose content area begins at byte `pos`
///
/// The body may start after any line break in the leading whitespace run;
/// later line breaks are preferred.
fn body_from(text: &str, pos: usize) -> Option<&str> {
    let rest = &text[pos..];
    let run_len = rest.len() - rest.trim_start_matches(is_fence_space).len();
    let breaks: Vec<usize> = rest[..run_len].match_indices('\n').map(|(i, _)| pos + i).collect();

    breaks.into_iter().rev().find_map(|line_break| {
        let start = line_break + 1;
        text[start..]
            .find("\n```")
            .map(|end| &text[start..start + end])
    })
}

/// Body of a block opened by the fence at byte `open`
fn fenced_block_at(text: &str, open: usize) -> Option<&str> {
    let after_fence = open + FENCE.len();

    if text[after_fence..].starts_with(LANGUAGE_TAG) {
        if let Some(body) = body_from(text, after_fence + LANGUAGE_TAG.len()) {
            return Some(body);
        }
    }

    body_from(text, after_fence)
}

/// Returns the fenced JSON body of `text`, or `text` itself, trimmed
pub fn extract_json_payload(text: &str) -> &str {
    text.char_indices()
        .filter(|(i, _)| text[*i..].starts_with(FENCE))
        .find_map(|(i, _)| fenced_block_at(text, i))
        .unwrap_or(text)
        .trim()
}
