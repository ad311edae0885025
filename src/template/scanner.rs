// Template scanner
//
// Splits template text into literal runs and `{{...}}` tags. Every token keeps
// its byte span, so concatenating the raw spans reproduces the input exactly.
// A `{{` that does not begin a well-formed tag is literal text; scanning then
// resumes one byte later, which gives `{{{a}}}` the tag `{{a}}` at offset 1.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Text,
    /// `{{name}}`
    Var(&'a str),
    /// `{{#each name}}`
    EachOpen(&'a str),
    /// `{{/each}}`
    EachClose,
    /// `{{#if name}}`
    IfOpen(&'a str),
    /// `{{/if}}`
    IfClose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Range<usize>,
}

/// Block flavours recognised by the loop and conditional passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Each,
    If,
}

impl BlockKind {
    fn open_name<'a>(self, kind: &TokenKind<'a>) -> Option<&'a str> {
        match (self, *kind) {
            (BlockKind::Each, TokenKind::EachOpen(name)) => Some(name),
            (BlockKind::If, TokenKind::IfOpen(name)) => Some(name),
            _ => None,
        }
    }

    fn is_close(self, kind: &TokenKind<'_>) -> bool {
        matches!(
            (self, kind),
            (BlockKind::Each, TokenKind::EachClose) | (BlockKind::If, TokenKind::IfClose)
        )
    }
}

/// A pass-level view of the text: untouched literal runs and matched blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Block { name: &'a str, body: &'a str },
}

pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(offset) = input[cursor..].find("{{") {
        let start = cursor + offset;
        match parse_tag(&input[start..]) {
            Some((kind, len)) => {
                if text_start < start {
                    tokens.push(Token { kind: TokenKind::Text, span: text_start..start });
                }
                tokens.push(Token { kind, span: start..start + len });
                cursor = start + len;
                text_start = cursor;
            }
            // '{' is one byte, so this stays on a char boundary
            None => cursor = start + 1,
        }
    }

    if text_start < input.len() {
        tokens.push(Token { kind: TokenKind::Text, span: text_start..input.len() });
    }

    tokens
}

/// Pair each open tag of `kind` with the first matching close tag after it.
///
/// Blocks do not nest: an inner open of the same kind is part of the body, and
/// the first close ends the block. An open with no close after it stays literal.
pub fn segments(input: &str, kind: BlockKind) -> Vec<Segment<'_>> {
    let tokens = tokenize(input);
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < tokens.len() {
        let Some(name) = kind.open_name(&tokens[i].kind) else {
            i += 1;
            continue;
        };

        let close = tokens[i + 1..]
            .iter()
            .position(|t| kind.is_close(&t.kind))
            .map(|p| i + 1 + p);

        let Some(j) = close else {
            // No close anywhere after this point, so no later open can match
            break;
        };

        let open = &tokens[i].span;
        let close = &tokens[j].span;
        if literal_start < open.start {
            segments.push(Segment::Literal(&input[literal_start..open.start]));
        }
        segments.push(Segment::Block {
            name,
            body: &input[open.end..close.start],
        });
        literal_start = close.end;
        i = j + 1;
    }

    if literal_start < input.len() {
        segments.push(Segment::Literal(&input[literal_start..]));
    }

    segments
}

/// Replace every `{{key}}` placeholder in `input` with `value`
pub fn substitute(input: &str, key: &str, value: &str) -> String {
    let tokens = tokenize(input);
    if !tokens.iter().any(|t| t.kind == TokenKind::Var(key)) {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    for token in tokens {
        match token.kind {
            TokenKind::Var(name) if name == key => out.push_str(value),
            _ => out.push_str(&input[token.span]),
        }
    }
    out
}

/// Placeholder names: `[A-Za-z0-9_]+`
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Parse a tag at the start of `s` (which begins with `{{`).
/// Returns the tag and its byte length.
fn parse_tag(s: &str) -> Option<(TokenKind<'_>, usize)> {
    let rest = &s[2..];

    if let Some(after) = rest.strip_prefix("#each") {
        let (name, used) = block_name(after)?;
        return Some((TokenKind::EachOpen(name), 2 + "#each".len() + used));
    }
    if let Some(after) = rest.strip_prefix("#if") {
        let (name, used) = block_name(after)?;
        return Some((TokenKind::IfOpen(name), 2 + "#if".len() + used));
    }
    if rest.starts_with("/each}}") {
        return Some((TokenKind::EachClose, "{{/each}}".len()));
    }
    if rest.starts_with("/if}}") {
        return Some((TokenKind::IfClose, "{{/if}}".len()));
    }

    let name_len = leading_name_len(rest);
    if name_len > 0 && rest[name_len..].starts_with("}}") {
        return Some((TokenKind::Var(&rest[..name_len]), 2 + name_len + 2));
    }

    None
}

/// Parse `<whitespace>+name}}`, returning the name and bytes consumed
fn block_name(s: &str) -> Option<(&str, usize)> {
    let trimmed = s.trim_start();
    let ws = s.len() - trimmed.len();
    if ws == 0 {
        return None;
    }

    let name_len = leading_name_len(trimmed);
    if name_len == 0 || !trimmed[name_len..].starts_with("}}") {
        return None;
    }

    Some((&trimmed[..name_len], ws + name_len + 2))
}

fn leading_name_len(s: &str) -> usize {
    s.bytes().take_while(|b| is_name_byte(*b)).count()
}
