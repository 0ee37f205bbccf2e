/// A parsed `/name@target` invocation. `target` is the bot the command was
/// addressed to, if any. Trailing arguments are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashCommand<'a> {
    pub name: &'a str,
    pub target: Option<&'a str>,
}

pub fn is_slash_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

pub fn parse_slash_command(text: &str) -> Option<SlashCommand<'_>> {
    let body = text.trim_start().strip_prefix('/')?;
    let head = body.split(char::is_whitespace).next().unwrap_or_default();
    let (name, target) = match head.split_once('@') {
        Some((name, target)) => (name, Some(target).filter(|t| !t.is_empty())),
        None => (head, None),
    };
    if name.is_empty() {
        return None;
    }
    Some(SlashCommand { name, target })
}

pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0)
}

/// Split `text` into chunks of at most `max_len` bytes, preferring to break
/// after the last newline inside each window.
pub fn split_text(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len || max_len == 0 {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while rest.len() > max_len {
        let first_char_len = rest.chars().next().map_or(1, char::len_utf8);
        let hard = floor_char_boundary(rest, max_len).max(first_char_len);
        let cut = match rest[..hard].rfind('\n') {
            Some(0) | None => hard,
            Some(nl) => nl,
        };
        chunks.push(rest[..cut].to_string());
        rest = rest[cut..].strip_prefix('\n').unwrap_or(&rest[cut..]);
    }
    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}
