//! Static extraction of `install_requires` from `setup.py`.
//!
//! Most `setup.py` files declare their requirements as a literal list, either inline
//! (`setup(install_requires=["a", "b>=1.0"])`) or through a module-level variable
//! (`requires = [...]` ... `install_requires=requires`). Those are read without
//! running any Python. Anything else (comprehensions, concatenation, reading
//! `requirements.txt`, ...) is reported as [`DeclaredRequires::Dynamic`] so the
//! caller can fall back to evaluating the file.

use std::sync::LazyLock;

use regex::Regex;

/// Outcome of scanning a `setup.py`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredRequires {
    /// `install_requires` is a literal list of strings
    Literal(Vec<String>),
    /// `install_requires` is present but computed at runtime
    Dynamic,
    /// The file never mentions `install_requires`
    Absent,
}

static KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\binstall_requires\s*=").expect("install_requires pattern"));

const STRING_PREFIX_CHARS: &str = "rRuUbBfF";

/// Scan `source` for the `install_requires` declaration.
pub fn extract_install_requires(source: &str) -> DeclaredRequires {
    let mut result = DeclaredRequires::Absent;

    for found in KEYWORD.find_iter(source) {
        let rest = &source[found.end()..];
        // `install_requires == ...` is a comparison, not a declaration
        if rest.starts_with('=') {
            continue;
        }
        match context_at(source, found.start()) {
            Context::Code => {}
            Context::Comment => continue,
            // Could be a docstring or generated code; let evaluation decide
            Context::StringLiteral => {
                result = DeclaredRequires::Dynamic;
                continue;
            }
        }

        let offset = skip_insignificant(source, found.end());
        match value_at(source, offset) {
            Some(items) => return DeclaredRequires::Literal(items),
            None => result = DeclaredRequires::Dynamic,
        }
    }

    result
}

/// What surrounds a position in Python source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Code,
    Comment,
    StringLiteral,
}

/// Classify `position` by scanning `source` from the start, skipping string
/// literals (including triple-quoted ones spanning lines) and comments.
fn context_at(source: &str, position: usize) -> Context {
    let bytes = source.as_bytes();
    let mut index = 0;
    while index < position {
        match bytes[index] {
            b'#' => {
                let end = source[index..].find('\n').map_or(source.len(), |i| index + i);
                if position < end {
                    return Context::Comment;
                }
                index = end;
            }
            quote @ (b'\'' | b'"') => {
                let end = string_end(bytes, index, quote);
                if position < end {
                    return Context::StringLiteral;
                }
                index = end;
            }
            _ => index += 1,
        }
    }
    Context::Code
}

/// Index just past the string literal whose opening quote is at `start`.
///
/// An unterminated single-quoted literal ends at the line break.
fn string_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let triple = bytes[start..].starts_with(&[quote; 3]);
    let mut index = start + if triple { 3 } else { 1 };
    while index < bytes.len() {
        match bytes[index] {
            b'\\' => index += 2,
            b'\n' if !triple => return index,
            c if c == quote => {
                if !triple {
                    return index + 1;
                }
                if bytes[index..].starts_with(&[quote; 3]) {
                    return index + 3;
                }
                index += 1;
            }
            _ => index += 1,
        }
    }
    bytes.len()
}

/// Literal value starting at `offset`: a list/tuple of strings, or a variable bound
/// to one at module level.
fn value_at(source: &str, offset: usize) -> Option<Vec<String>> {
    let rest = &source[offset..];
    let first = rest.chars().next()?;

    if first == '[' || first == '(' {
        let (items, end) = parse_string_list(source, offset)?;
        if continues_expression(source, end) {
            return None;
        }
        return Some(items);
    }

    if !(first.is_alphabetic() || first == '_') {
        return None;
    }
    let ident_len: usize = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .map(char::len_utf8)
        .sum();
    let ident = &rest[..ident_len];
    let after = offset + ident_len;
    if continues_expression(source, after) || source[after..].trim_start().starts_with('(') {
        return None;
    }

    resolve_assignment(source, ident)
}

/// Find the module-level `ident = [...]` assignment and read its literal.
fn resolve_assignment(source: &str, ident: &str) -> Option<Vec<String>> {
    let pattern = Regex::new(&format!(r"(?m)^{}\s*=", regex::escape(ident))).ok()?;

    for found in pattern.find_iter(source) {
        if source[found.end()..].starts_with('=') {
            continue;
        }
        let offset = skip_insignificant(source, found.end());
        let first = source[offset..].chars().next()?;
        if first != '[' && first != '(' {
            return None;
        }
        let (items, end) = parse_string_list(source, offset)?;
        if continues_expression(source, end) {
            return None;
        }
        return Some(items);
    }

    None
}

/// Whether the expression goes on after `position` (`[...] + extra`, `[...] if x else`).
fn continues_expression(source: &str, position: usize) -> bool {
    let next = &source[skip_insignificant(source, position)..];
    next.starts_with(['+', '*', '.', '[', '-', '|'])
        || next.starts_with("if ")
        || next.starts_with("if(")
}

/// Skip whitespace, comments, and backslash line continuations.
fn skip_insignificant(source: &str, mut position: usize) -> usize {
    loop {
        let rest = &source[position..];
        let trimmed = rest.trim_start();
        position += rest.len() - trimmed.len();

        if trimmed.starts_with('#') {
            position += trimmed.find('\n').unwrap_or(trimmed.len());
        } else if trimmed.starts_with("\\\n") {
            position += 2;
        } else {
            return position;
        }
    }
}

/// Parse `[ "a", 'b', ]` or `("a",)` starting at the opening bracket.
///
/// Returns the strings and the position just after the closing bracket, or `None` if
/// any element is not a plain string literal.
fn parse_string_list(source: &str, offset: usize) -> Option<(Vec<String>, usize)> {
    let close = match source[offset..].chars().next()? {
        '[' => ']',
        '(' => ')',
        _ => return None,
    };

    let mut items = Vec::new();
    let mut position = offset + 1;
    let mut expect_item = true;

    loop {
        position = skip_insignificant(source, position);
        let c = source[position..].chars().next()?;

        if c == close {
            return Some((items, position + 1));
        }
        if c == ',' {
            if expect_item {
                return None;
            }
            expect_item = true;
            position += 1;
            continue;
        }
        if !expect_item {
            return None;
        }

        let (mut value, mut next) = parse_string(source, position)?;
        // Adjacent literals are concatenated
        loop {
            let candidate = skip_insignificant(source, next);
            if !starts_string(&source[candidate..]) {
                break;
            }
            let (more, after) = parse_string(source, candidate)?;
            value.push_str(&more);
            next = after;
        }

        items.push(value);
        expect_item = false;
        position = next;
    }
}

fn starts_string(rest: &str) -> bool {
    let prefix_len = rest.chars().take_while(|c| STRING_PREFIX_CHARS.contains(*c)).count();
    prefix_len <= 2 && rest[prefix_len..].starts_with(['\'', '"'])
}

/// Parse one string literal (optionally prefixed, optionally triple-quoted).
fn parse_string(source: &str, position: usize) -> Option<(String, usize)> {
    let rest = &source[position..];
    let prefix_len = rest.chars().take_while(|c| STRING_PREFIX_CHARS.contains(*c)).count();
    if prefix_len > 2 {
        return None;
    }
    let prefix = &rest[..prefix_len];
    if prefix.contains(['f', 'F']) {
        return None;
    }
    let raw = prefix.contains(['r', 'R']);

    let body = &rest[prefix_len..];
    let quote = body.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    let triple_quote: String = std::iter::repeat_n(quote, 3).collect();
    let triple = body.starts_with(&triple_quote);
    let delimiter_len = if triple { 3 } else { 1 };
    let content_start = position + prefix_len + delimiter_len;

    let mut out = String::new();
    let mut chars = source[content_start..].char_indices();
    loop {
        let (index, c) = chars.next()?;
        match c {
            '\\' => {
                let (_, escaped) = chars.next()?;
                if raw {
                    out.push('\\');
                    out.push(escaped);
                    continue;
                }
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    '\n' => {}
                    '\\' | '\'' | '"' => out.push(escaped),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
            }
            c if c == quote => {
                if !triple {
                    return Some((out, content_start + index + 1));
                }
                if source[content_start + index..].starts_with(&triple_quote) {
                    return Some((out, content_start + index + 3));
                }
                out.push(c);
            }
            '\n' if !triple => return None,
            c => out.push(c),
        }
    }
}
