use log::trace;

use crate::{errors::LexgramErrorKind, Result, Token};

/// One bracket kind the grouper recognizes: the opener and closer tags emitted by the
/// tokenizer, and the tag given to the resulting group token.
#[derive(Debug, Clone)]
pub struct BracketPair {
    /// Tag of the opening bracket token.
    pub opener: String,
    /// Tag of the expected closing bracket token.
    pub closer: String,
    /// Tag of the group token built from the bracketed region.
    pub group: String,
}

impl BracketPair {
    /// Create a new bracket pair.
    pub fn new(
        opener: impl Into<String>,
        closer: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            opener: opener.into(),
            closer: closer.into(),
            group: group.into(),
        }
    }
}

// An open bracketed region on the grouper's stack.
struct Frame {
    opener: Token,
    closer_tag: String,
    group_tag: String,
    children: Vec<Token>,
}

/// The grouper nests a flat token stream inside matching bracket pairs.
///
/// It runs one linear pass with an explicit stack of open frames. An opening bracket pushes a
/// frame; a token matching the current frame's expected closer completes the frame into a
/// [`Token::Group`] appended to the enclosing frame's child list; every other token is appended
/// to the current frame. Mismatched bracket kinds are not specially detected beyond the
/// closer-tag check already enforced by the frame.
#[derive(Debug, Clone)]
pub struct Grouper {
    pairs: Vec<BracketPair>,
}

impl Default for Grouper {
    /// The stock grouper with the three bracket kinds: parentheses, square brackets and curly
    /// braces, grouped as `group-parenthesis`, `group-square-bracket` and `group-curly-brace`.
    fn default() -> Self {
        Self::new(vec![
            BracketPair::new("open-parenthesis", "close-parenthesis", "group-parenthesis"),
            BracketPair::new(
                "open-square-bracket",
                "close-square-bracket",
                "group-square-bracket",
            ),
            BracketPair::new("open-curly-brace", "close-curly-brace", "group-curly-brace"),
        ])
    }
}

impl Grouper {
    /// Create a grouper for the given bracket pairs.
    pub fn new(pairs: Vec<BracketPair>) -> Self {
        Self { pairs }
    }

    /// Group the flat token stream into nested tokens.
    ///
    /// Fails with a grouping error pointing at the still-open opener when a bracket is left
    /// open at the end of input. The source text is needed to compute each group's verbatim
    /// value, the substring from its opener to its closer inclusive.
    pub fn group(&self, source: &str, tokens: Vec<Token>) -> Result<Vec<Token>> {
        let mut root: Vec<Token> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        for token in tokens {
            if let Some(pair) = self.pairs.iter().find(|p| p.opener == token.tag()) {
                stack.push(Frame {
                    opener: token,
                    closer_tag: pair.closer.clone(),
                    group_tag: pair.group.clone(),
                    children: Vec::new(),
                });
                continue;
            }
            let closes_top = stack
                .last()
                .is_some_and(|frame| frame.closer_tag == token.tag());
            if closes_top {
                let frame = stack.pop().unwrap();
                let index = frame.opener.index();
                let group = Token::Group {
                    tag: frame.group_tag,
                    index,
                    value: source[index..token.end()].to_string(),
                    opener: Box::new(frame.opener),
                    closer: Box::new(token),
                    children: frame.children,
                };
                trace!("completed {}", group);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(group),
                    None => root.push(group),
                }
            } else {
                match stack.last_mut() {
                    Some(frame) => frame.children.push(token),
                    None => root.push(token),
                }
            }
        }
        if let Some(frame) = stack.last() {
            let at = frame.opener.index();
            return Err(LexgramErrorKind::grouping(at, frame.opener.value().len()));
        }
        Ok(root)
    }
}
