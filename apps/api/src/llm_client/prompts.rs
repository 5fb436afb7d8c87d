// Cross-cutting prompt fragments. Feature prompts live next to the code that uses them.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    Respond with a single valid JSON object and nothing else. \
    Do not use markdown code fences. \
    Do not add explanations before or after the JSON.";

/// Cuts `text` to at most `max_chars` characters on a line boundary when one is close,
/// marking the cut so the model knows content is missing.
pub fn truncate_for_prompt(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };
    let head = &text[..cut];
    let head = match head.rfind('\n') {
        Some(nl) if nl * 5 >= cut * 4 => &head[..nl],
        _ => head,
    };
    format!("{head}\n[... truncated ...]")
}
