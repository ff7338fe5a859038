use crate::error::{PhyloError, PhyloResult};

use super::tree::{PhyloNode, PhyloTree};

/// Characters that end an unquoted label or branch length.
const DELIMITERS: &[u8] = b"()[],:;";

/// Deepest `(` nesting the decoder follows before giving up.
const MAX_DEPTH: usize = 1024;

/// Renders `tree` as a Newick string terminated by `;`.
///
/// Branch lengths use six decimals; a node without a length (the root) gets no
/// `:length` suffix.
pub fn to_newick(tree: &PhyloTree) -> String {
    let mut s = String::with_capacity(tree.num_nodes() * 12);
    write_subtree(tree.root(), &mut s);
    s.push(';');
    s
}

fn needs_quoting(label: &str) -> bool {
    label.is_empty()
        || label.chars().any(|ch| {
            ch.is_whitespace() || matches!(ch, ':' | ',' | '(' | ')' | ';' | '[' | ']' | '\'')
        })
}

/// Empty labels are written as `''` so they read back as `Some("")`.
fn write_label(out: &mut String, label: &str) {
    if needs_quoting(label) {
        out.push('\'');
        for ch in label.chars() {
            if ch == '\'' {
                out.push_str("''");
            } else {
                out.push(ch);
            }
        }
        out.push('\'');
    } else {
        out.push_str(label);
    }
}

fn write_subtree(node: &PhyloNode, out: &mut String) {
    if !node.is_leaf() {
        out.push('(');
        for (i, child) in node.children.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_subtree(child, out);
        }
        out.push(')');
    }
    if let Some(ref label) = node.label {
        write_label(out, label);
    }
    if let Some(bl) = node.branch_length {
        out.push(':');
        out.push_str(&format!("{:.6}", bl));
    }
}

/// Parses one Newick tree.
///
/// Accepts quoted (`'...'`, with `''` for a literal quote) and unquoted
/// labels, optional branch lengths, internal labels, any number of children
/// per node, whitespace and `[...]` comments between tokens. Internal labels
/// are kept; see [`strip_internal_labels`](super::canonical::strip_internal_labels).
pub fn parse_newick(input: &str) -> PhyloResult<PhyloTree> {
    let mut reader = NewickReader {
        bytes: input.as_bytes(),
        pos: 0,
        depth: 0,
    };
    let root = reader.parse_node()?;
    reader.skip_whitespace_and_comments()?;
    if !reader.consume_if(b';') {
        return Err(match reader.peek() {
            None => reader.error("missing ';' at end of tree"),
            Some(b')') => reader.error("unbalanced parentheses: unexpected ')'"),
            Some(b) => reader.error(format!("expected ';' but found {:?}", char::from(b))),
        });
    }
    reader.skip_whitespace_and_comments()?;
    if reader.peek().is_some() {
        return Err(reader.error("unexpected content after ';'"));
    }
    Ok(PhyloTree::new(root))
}

struct NewickReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> NewickReader<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn consume_if(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> PhyloError {
        PhyloError::parse(self.pos, message)
    }

    fn skip_whitespace_and_comments(&mut self) -> PhyloResult<()> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'[') => {
                    let start = self.pos;
                    match self.bytes[start..].iter().position(|&b| b == b']') {
                        Some(len) => self.pos = start + len + 1,
                        None => return Err(PhyloError::parse(start, "unterminated comment")),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// `node := '(' node (',' node)* ')' [label] [':' length] | [label] [':' length]`
    fn parse_node(&mut self) -> PhyloResult<PhyloNode> {
        self.skip_whitespace_and_comments()?;
        let mut children = Vec::new();
        if self.consume_if(b'(') {
            if self.depth == MAX_DEPTH {
                return Err(PhyloError::parse(
                    self.pos - 1,
                    format!("nesting deeper than {} levels", MAX_DEPTH),
                ));
            }
            self.depth += 1;
            children.push(self.parse_node()?);
            loop {
                self.skip_whitespace_and_comments()?;
                if self.consume_if(b',') {
                    children.push(self.parse_node()?);
                } else if self.consume_if(b')') {
                    self.depth -= 1;
                    break;
                } else {
                    return Err(match self.peek() {
                        None | Some(b';') => self.error("unbalanced parentheses: missing ')'"),
                        Some(b) => self.error(format!(
                            "expected ',' or ')' but found {:?}",
                            char::from(b)
                        )),
                    });
                }
            }
        }
        let label = self.parse_label()?;
        let branch_length = self.parse_branch_length()?;
        Ok(PhyloNode {
            label,
            branch_length,
            children,
        })
    }

    fn parse_label(&mut self) -> PhyloResult<Option<Box<str>>> {
        self.skip_whitespace_and_comments()?;
        if self.peek() == Some(b'\'') {
            return self.parse_quoted_label().map(Some);
        }
        let token = self.take_token();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.into()))
    }

    fn parse_quoted_label(&mut self) -> PhyloResult<Box<str>> {
        let start = self.pos;
        self.pos += 1;
        let mut raw = Vec::new();
        loop {
            match self.peek() {
                None => return Err(PhyloError::parse(start, "unterminated quoted label")),
                Some(b'\'') => {
                    self.pos += 1;
                    if self.consume_if(b'\'') {
                        raw.push(b'\'');
                    } else {
                        break;
                    }
                }
                Some(b) => {
                    raw.push(b);
                    self.pos += 1;
                }
            }
        }
        String::from_utf8(raw)
            .map(String::into_boxed_str)
            .map_err(|_| PhyloError::parse(start, "quoted label is not valid UTF-8"))
    }

    fn parse_branch_length(&mut self) -> PhyloResult<Option<f64>> {
        self.skip_whitespace_and_comments()?;
        if !self.consume_if(b':') {
            return Ok(None);
        }
        self.skip_whitespace_and_comments()?;
        let start = self.pos;
        let token = self.take_token();
        if token.is_empty() {
            return Err(PhyloError::parse(start, "missing branch length after ':'"));
        }
        match token.parse::<f64>() {
            Ok(length) if length.is_finite() => Ok(Some(length)),
            _ => Err(PhyloError::parse(
                start,
                format!("invalid branch length '{}'", token),
            )),
        }
    }

    /// Reads bytes up to the next delimiter or whitespace.
    fn take_token(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || DELIMITERS.contains(&b) || b == b'\'' {
                break;
            }
            self.pos += 1;
        }
        // Delimiters are ASCII, so the slice ends on a char boundary.
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or_default()
    }
}
