//! Physical lines to logical lines.
//!
//! - `#` starts a comment unless it is inside a quoted string;
//! - a trailing `\` joins the next physical line;
//! - a line that ends inside an open quote joins the next physical line;
//! - a logical line is numbered by its first physical line.

/// One logical line of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the first physical line.
    pub number: usize,
    pub text: String,
}

struct Scan {
    comment_at: Option<usize>,
    open_quote: bool,
}

fn scan(line: &str) -> Scan {
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quote => escaped = true,
            '"' => in_quote = !in_quote,
            '#' if !in_quote => {
                return Scan {
                    comment_at: Some(i),
                    open_quote: false,
                }
            }
            _ => {}
        }
    }
    Scan {
        comment_at: None,
        open_quote: in_quote,
    }
}

/// The line without a trailing comment.
pub fn strip_comment(line: &str) -> &str {
    match scan(line).comment_at {
        Some(i) => &line[..i],
        None => line,
    }
}

pub fn logical_lines(text: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let (number, buffer) = match pending.take() {
            Some((number, mut buffer)) => {
                buffer.push(' ');
                buffer.push_str(raw.trim());
                (number, buffer)
            }
            None => (idx + 1, raw.to_string()),
        };

        let scanned = scan(&buffer);
        if scanned.open_quote {
            pending = Some((number, buffer));
            continue;
        }
        let body = match scanned.comment_at {
            Some(i) => &buffer[..i],
            None => buffer.as_str(),
        }
        .trim_end();
        if let Some(continued) = body.strip_suffix('\\') {
            pending = Some((number, continued.trim_end().to_string()));
            continue;
        }
        let body = body.trim();
        if !body.is_empty() {
            lines.push(LogicalLine {
                number,
                text: body.to_string(),
            });
        }
    }

    // An unterminated continuation is still handed to the parser so it can
    // report it.
    if let Some((number, buffer)) = pending {
        let body = buffer.trim();
        if !body.is_empty() {
            lines.push(LogicalLine {
                number,
                text: body.to_string(),
            });
        }
    }
    lines
}

/// Normalises typography that commonly sneaks into curated BEL: smart quotes,
/// non-breaking spaces, tabs and runs of whitespace outside quoted strings.
pub fn streamline(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_quote = false;
    let mut escaped = false;
    let mut pending_space = false;

    for c in line.chars() {
        let c = match c {
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{a0}' | '\t' => ' ',
            other => other,
        };
        if in_quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quote = false;
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        if c == '"' {
            in_quote = true;
        }
        out.push(c);
    }
    out
}
