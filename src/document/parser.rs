use crate::document::node::{FormatNode, Span};
use crate::foundation::error::{BakeError, BakeResult};

/// Parse the sibling nodes that start at byte `start` and run to the end of `text`.
///
/// `{ ... }` bodies become children. A stray `}` at this level or a block still open at end of
/// text is a structural error; no partial tree is returned.
pub fn parse(text: &str, start: usize) -> BakeResult<Vec<FormatNode>> {
    let mut p = Parser::at(text, start)?;
    let (nodes, close) = p.parse_scope(0, None)?;
    debug_assert!(close.is_none());
    Ok(nodes)
}

#[derive(Clone, Copy, Debug)]
struct Line<'a> {
    text: &'a str,
    start: usize,
    end: usize,
    number: usize,
}

#[derive(Debug, PartialEq)]
enum LineKind<'a> {
    Blank,
    Comment,
    Close,
    Node {
        name: &'a str,
        attributes: &'a str,
        shape: NodeShape,
    },
    Continuation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeShape {
    Leaf,
    Open,
    EmptyBlock,
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line_no: usize,
}

impl<'a> Parser<'a> {
    fn at(src: &'a str, start: usize) -> BakeResult<Self> {
        if start > src.len() || !src.is_char_boundary(start) {
            return Err(BakeError::Structural(format!(
                "parse offset {start} is not a character boundary of the input"
            )));
        }
        let line_no = src.as_bytes()[..start].iter().filter(|&&b| b == b'\n').count() + 1;
        Ok(Self {
            src,
            pos: start,
            line_no,
        })
    }

    fn next_line(&mut self) -> Option<Line<'a>> {
        if self.pos >= self.src.len() {
            return None;
        }
        let rest = &self.src[self.pos..];
        let (raw, consumed) = match rest.find('\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        let line = Line {
            text: raw.strip_suffix('\r').unwrap_or(raw),
            start: self.pos,
            end: self.pos + consumed,
            number: self.line_no,
        };
        self.pos += consumed;
        self.line_no += 1;
        Some(line)
    }

    /// Parse siblings until the scope's close brace (`opened_at` is `Some`) or end of text.
    fn parse_scope(
        &mut self,
        depth: usize,
        opened_at: Option<usize>,
    ) -> BakeResult<(Vec<FormatNode>, Option<Line<'a>>)> {
        let mut nodes: Vec<FormatNode> = Vec::new();

        while let Some(line) = self.next_line() {
            match classify(line)? {
                LineKind::Blank | LineKind::Comment => {}
                LineKind::Close => {
                    if opened_at.is_none() {
                        return Err(BakeError::structural(
                            line.number,
                            "'}' without a matching '{'",
                        ));
                    }
                    return Ok((nodes, Some(line)));
                }
                LineKind::Node {
                    name,
                    attributes,
                    shape,
                } => {
                    let mut node = FormatNode::leaf(name, attributes, depth);
                    let mut span = Span {
                        start: line.start,
                        close: None,
                        end: line.end,
                        line: line.number,
                    };
                    match shape {
                        NodeShape::Leaf => {}
                        NodeShape::EmptyBlock => node.block = true,
                        NodeShape::Open => {
                            let (children, close) =
                                self.parse_scope(depth + 1, Some(line.number))?;
                            let Some(close) = close else {
                                return Err(BakeError::structural(
                                    line.number,
                                    format!("block '{name}' is never closed"),
                                ));
                            };
                            node.block = true;
                            node.children = children;
                            span.close = Some(close.start);
                            span.end = close.end;
                        }
                    }
                    node.span = Some(span);
                    nodes.push(node);
                }
                LineKind::Continuation => {
                    let Some(prev) = nodes.last_mut().filter(|n| !n.is_block()) else {
                        return Err(BakeError::structural(
                            line.number,
                            format!("unexpected text '{}'", line.text.trim()),
                        ));
                    };
                    prev.attributes.push('\n');
                    prev.attributes.push_str(line.text);
                    if let Some(span) = prev.span.as_mut() {
                        span.end = line.end;
                    }
                }
            }
        }

        match opened_at {
            Some(open_line) => Err(BakeError::structural(
                open_line,
                "'{' without a matching '}' before end of text",
            )),
            None => Ok((nodes, None)),
        }
    }
}

fn classify(line: Line<'_>) -> BakeResult<LineKind<'_>> {
    let trimmed = line.text.trim();
    if trimmed.is_empty() {
        return Ok(LineKind::Blank);
    }
    if trimmed.starts_with(';') {
        return Ok(LineKind::Comment);
    }
    if let Some(after) = trimmed.strip_prefix('}') {
        let after = after.trim_start();
        if after.is_empty() || after.starts_with(';') {
            return Ok(LineKind::Close);
        }
        return Err(BakeError::structural(
            line.number,
            format!("unexpected text after '}}': '{after}'"),
        ));
    }

    let Some((name, rest)) = split_node_name(trimmed) else {
        if unquoted_braces(trimmed).is_empty() {
            return Ok(LineKind::Continuation);
        }
        return Err(BakeError::structural(
            line.number,
            format!("malformed node '{trimmed}'"),
        ));
    };

    let braces = unquoted_braces(rest);
    let body = rest.trim_end();
    let shape = match braces.as_slice() {
        [] => NodeShape::Leaf,
        [(open, '{')] if *open + 1 == body.len() => NodeShape::Open,
        [(open, '{'), (close, '}')]
            if *close + 1 == body.len() && rest[open + 1..*close].trim().is_empty() =>
        {
            NodeShape::EmptyBlock
        }
        _ => {
            return Err(BakeError::structural(
                line.number,
                format!("unbalanced braces in node '{name}'"),
            ));
        }
    };

    let attributes = match shape {
        NodeShape::Leaf => body,
        NodeShape::Open | NodeShape::EmptyBlock => &rest[..braces[0].0],
    };
    Ok(LineKind::Node {
        name,
        attributes: attributes.trim(),
        shape,
    })
}

/// Split `Name: rest` where `Name` is an identifier; `None` for any other line.
fn split_node_name(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let first = *bytes.first()?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let len = bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    if bytes.get(len) != Some(&b':') {
        return None;
    }
    Some((&s[..len], &s[len + 1..]))
}

/// Positions of `{`/`}` outside double-quoted strings.
pub(crate) fn unquoted_braces(s: &str) -> Vec<(usize, char)> {
    let mut out = Vec::new();
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '{' | '}' if !quoted => out.push((i, c)),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/document/parser.rs"]
mod tests;
