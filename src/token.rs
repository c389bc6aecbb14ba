use crate::Span;

/// The smallest tagged unit produced by scanning.
///
/// A token is either *plain* (a directly scanned piece of input) or a *group* produced by the
/// grouper for a fully bracketed region. Callers pattern match on the variant instead of probing
/// optional payload fields. Tokens are immutable once emitted; a group is completed exactly once,
/// when its closing bracket is resolved.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    /// A directly scanned token.
    Plain {
        /// The type tag of the token, e.g. `word` or `semicolon`.
        tag: String,
        /// The byte offset of the token in the source text.
        index: usize,
        /// The matched substring.
        value: String,
    },
    /// A bracketed region turned into a single token by the grouper.
    Group {
        /// The type tag of the group, e.g. `group-parenthesis`.
        tag: String,
        /// The byte offset of the opening bracket in the source text.
        index: usize,
        /// The verbatim source substring from the opening to the closing bracket, inclusive.
        value: String,
        /// The opening bracket token.
        opener: Box<Token>,
        /// The closing bracket token.
        closer: Box<Token>,
        /// The tokens found between the brackets, in source order. Groups own their children.
        children: Vec<Token>,
    },
}

impl Token {
    /// Create a new plain token.
    pub fn plain(tag: impl Into<String>, index: usize, value: impl Into<String>) -> Self {
        Token::Plain {
            tag: tag.into(),
            index,
            value: value.into(),
        }
    }

    /// Get the type tag of the token.
    #[inline]
    pub fn tag(&self) -> &str {
        match self {
            Token::Plain { tag, .. } | Token::Group { tag, .. } => tag,
        }
    }

    /// Get the byte offset of the token in the source text.
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Token::Plain { index, .. } | Token::Group { index, .. } => *index,
        }
    }

    /// Get the matched substring of the token.
    #[inline]
    pub fn value(&self) -> &str {
        match self {
            Token::Plain { value, .. } | Token::Group { value, .. } => value,
        }
    }

    /// Get the byte offset just past the token.
    #[inline]
    pub fn end(&self) -> usize {
        self.index() + self.value().len()
    }

    /// Get the source span covered by the token.
    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.index(), self.end())
    }

    /// Check whether the token is a group token.
    #[inline]
    pub fn is_group(&self) -> bool {
        matches!(self, Token::Group { .. })
    }

    /// Get the child tokens of a group token, or `None` for a plain token.
    pub fn children(&self) -> Option<&[Token]> {
        match self {
            Token::Group { children, .. } => Some(children),
            Token::Plain { .. } => None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?})@{}", self.tag(), self.value(), self.index())
    }
}
