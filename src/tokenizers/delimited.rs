use crate::{errors::LexgramErrorKind, Pipeline, Result, Token, Tokenize};

/// The placeholder that may appear in the end / escape / allowed / disallowed / injector lists
/// of [`DelimitedOptions`]. It is resolved at match time to whichever start marker actually
/// opened the run, which is how "close with whatever quote character opened" is expressed.
pub const START_PLACEHOLDER: &str = ".start";

const DEFAULT_ALLOW_MSG: &str = "unexpected disallowed character";
const DEFAULT_DISALLOW_MSG: &str = "unexpected disallowed character";
const DEFAULT_END_OF_INPUT_MSG: &str = "unexpected end of input";
const DEFAULT_INJECTOR_END_OF_INPUT_MSG: &str =
    "unexpected end of input after an open injector marker";
const DEFAULT_MAX_LENGTH_MSG: &str = "the token length limit has been reached";

/// Whether a boundary violation of a delimited run aborts the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Throw {
    /// End the run silently; the token emitted so far stands.
    #[default]
    Silent,
    /// Raise a lexical error with the default message for the violation.
    Error,
    /// Raise a lexical error with a custom message.
    Message(String),
}

impl Throw {
    fn message<'a>(&'a self, default: &'a str) -> Option<&'a str> {
        match self {
            Throw::Silent => None,
            Throw::Error => Some(default),
            Throw::Message(m) => Some(m),
        }
    }
}

/// Configuration for a [`DelimitedTokenizer`].
///
/// Only `tag` and `start` are required; every other category is skipped during scanning when it
/// is left empty. Lists are matched as substrings, so multi-character markers work throughout.
#[derive(Debug, Clone)]
pub struct DelimitedOptions {
    /// The type tag of the emitted tokens.
    pub tag: String,
    /// The start markers; a run is claimed when one of them is a prefix of the input.
    pub start: Vec<String>,
    /// The end markers; reaching one (unescaped) ends the run and includes the marker in the
    /// token value.
    pub end: Vec<String>,
    /// The escape markers. An escape marker flips a flag that makes the next character literal
    /// for end/disallow purposes.
    pub escape: Vec<String>,
    /// If non-empty, only these substrings may continue the run.
    pub allowed: Vec<String>,
    /// Substrings that forbid continuation of the run.
    pub disallowed: Vec<String>,
    /// Markers that flush the current partial token and hand control back to the full pipeline.
    pub injector_start: Vec<String>,
    /// Markers that end an injected stretch and resume the run.
    pub injector_end: Vec<String>,
    /// Maximum run length in characters, counting the start marker.
    pub max_length: Option<usize>,
    /// Suppress emission of run tokens entirely.
    pub ignore: bool,
    /// Behavior when the allow-list rejects a character.
    pub allow_throw: Throw,
    /// Behavior when the disallow-list matches.
    pub disallow_throw: Throw,
    /// Behavior when the source ends mid-run.
    pub end_of_input_throw: Throw,
    /// Behavior when the source ends inside an injected stretch. Fatal by default.
    pub injector_end_of_input_throw: Throw,
    /// Behavior when the length cap is reached.
    pub max_length_throw: Throw,
}

impl DelimitedOptions {
    /// Create options for runs of type `tag` opened by any of the given start markers.
    pub fn new(tag: impl Into<String>, start: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tag: tag.into(),
            start: start.into_iter().map(Into::into).collect(),
            end: Vec::new(),
            escape: Vec::new(),
            allowed: Vec::new(),
            disallowed: Vec::new(),
            injector_start: Vec::new(),
            injector_end: Vec::new(),
            max_length: None,
            ignore: false,
            allow_throw: Throw::Silent,
            disallow_throw: Throw::Silent,
            end_of_input_throw: Throw::Silent,
            injector_end_of_input_throw: Throw::Error,
            max_length_throw: Throw::Silent,
        }
    }

    /// Set the end markers.
    pub fn end(mut self, end: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.end = end.into_iter().map(Into::into).collect();
        self
    }

    /// Set the escape markers.
    pub fn escape(mut self, escape: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.escape = escape.into_iter().map(Into::into).collect();
        self
    }

    /// Set the allow-list.
    pub fn allowed(mut self, allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowed = allowed.into_iter().map(Into::into).collect();
        self
    }

    /// Set the disallow-list.
    pub fn disallowed(mut self, disallowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.disallowed = disallowed.into_iter().map(Into::into).collect();
        self
    }

    /// Set the injector start and end markers.
    pub fn injectors(
        mut self,
        start: impl IntoIterator<Item = impl Into<String>>,
        end: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.injector_start = start.into_iter().map(Into::into).collect();
        self.injector_end = end.into_iter().map(Into::into).collect();
        self
    }

    /// Set the maximum run length in characters.
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Suppress emission of run tokens.
    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Make an allow-list violation fatal.
    pub fn allow_throw(mut self, throw: Throw) -> Self {
        self.allow_throw = throw;
        self
    }

    /// Make a disallow-list match fatal.
    pub fn disallow_throw(mut self, throw: Throw) -> Self {
        self.disallow_throw = throw;
        self
    }

    /// Make end of input mid-run fatal.
    pub fn end_of_input_throw(mut self, throw: Throw) -> Self {
        self.end_of_input_throw = throw;
        self
    }

    /// Configure the behavior when the source ends inside an injected stretch.
    pub fn injector_end_of_input_throw(mut self, throw: Throw) -> Self {
        self.injector_end_of_input_throw = throw;
        self
    }

    /// Make reaching the length cap fatal.
    pub fn max_length_throw(mut self, throw: Throw) -> Self {
        self.max_length_throw = throw;
        self
    }
}

// A marker list with the `.start` placeholder split off, so resolution at match time is a flag
// check instead of a list rewrite.
#[derive(Debug, Clone)]
struct MarkerList {
    has_start: bool,
    literals: Vec<String>,
}

impl MarkerList {
    fn build(list: &[String]) -> Self {
        Self {
            has_start: list.iter().any(|m| m == START_PLACEHOLDER),
            literals: list
                .iter()
                .filter(|m| *m != START_PLACEHOLDER)
                .cloned()
                .collect(),
        }
    }

    fn is_empty(&self) -> bool {
        !self.has_start && self.literals.is_empty()
    }

    // Returns the marker matching at `at`, the resolved start marker taking priority.
    fn matches_at<'a>(&'a self, source: &str, at: usize, start_marker: &'a str) -> Option<&'a str> {
        if self.has_start && source[at..].starts_with(start_marker) {
            return Some(start_marker);
        }
        self.literals
            .iter()
            .find(|m| source[at..].starts_with(m.as_str()))
            .map(|m| m.as_str())
    }
}

/// The generic delimited-run tokenizer.
///
/// It claims input whose prefix equals one of the configured start markers and then consumes
/// characters until an end marker is reached, applying in priority order: end-marker detection,
/// the allow-list, the disallow-list, the length cap, injector hand-off, and escape toggling.
/// End of source or a boundary violation is fatal only where the corresponding throw option
/// says so; otherwise the run ends silently. See [`DelimitedOptions`].
///
/// The injector sub-mode turns one delimited run into several tokens: upon an injector start
/// marker the partial run token is flushed and the full pipeline tokenizes the input until an
/// injector end marker is seen, at which point a new run token begins. This is how template
/// strings with embedded expressions are scanned.
#[derive(Debug, Clone)]
pub struct DelimitedTokenizer {
    tag: String,
    start: Vec<String>,
    end: MarkerList,
    escape: MarkerList,
    allowed: MarkerList,
    disallowed: MarkerList,
    injector_start: MarkerList,
    injector_end: MarkerList,
    max_length: Option<usize>,
    ignore: bool,
    allow_throw: Throw,
    disallow_throw: Throw,
    end_of_input_throw: Throw,
    injector_end_of_input_throw: Throw,
    max_length_throw: Throw,
}

impl DelimitedTokenizer {
    /// Create a new delimited-run tokenizer from the given options.
    pub fn new(options: DelimitedOptions) -> Self {
        Self {
            tag: options.tag,
            start: options.start,
            end: MarkerList::build(&options.end),
            escape: MarkerList::build(&options.escape),
            allowed: MarkerList::build(&options.allowed),
            disallowed: MarkerList::build(&options.disallowed),
            injector_start: MarkerList::build(&options.injector_start),
            injector_end: MarkerList::build(&options.injector_end),
            max_length: options.max_length,
            ignore: options.ignore,
            allow_throw: options.allow_throw,
            disallow_throw: options.disallow_throw,
            end_of_input_throw: options.end_of_input_throw,
            injector_end_of_input_throw: options.injector_end_of_input_throw,
            max_length_throw: options.max_length_throw,
        }
    }

    // Runs the pipeline over the injected stretch until an injector end marker is found.
    // Returns the position of the injector end marker and the marker itself, or `None` when the
    // source ran out (already handled per the configured throw).
    fn run_injector<'a>(
        &'a self,
        source: &str,
        at: usize,
        mut pos: usize,
        start_marker: &'a str,
        pipeline: &Pipeline,
        out: &mut Vec<Token>,
    ) -> Result<Option<(usize, &'a str)>> {
        loop {
            if pos >= source.len() {
                if let Some(msg) = self
                    .injector_end_of_input_throw
                    .message(DEFAULT_INJECTOR_END_OF_INPUT_MSG)
                {
                    return Err(LexgramErrorKind::lexical(at, pos - at, msg));
                }
                return Ok(None);
            }
            if let Some(marker) = self.injector_end.matches_at(source, pos, start_marker) {
                return Ok(Some((pos, marker)));
            }
            pos = pipeline.scan_at(source, pos, out)?;
        }
    }
}

impl Tokenize for DelimitedTokenizer {
    fn claim(
        &self,
        source: &str,
        at: usize,
        pipeline: &Pipeline,
        out: &mut Vec<Token>,
    ) -> Result<Option<usize>> {
        let Some(start_marker) = self
            .start
            .iter()
            .find(|st| source[at..].starts_with(st.as_str()))
        else {
            return Ok(None);
        };
        let start_marker = start_marker.as_str();

        let mut pos = at + start_marker.len();
        let mut value = String::from(start_marker);
        let mut char_count = start_marker.chars().count();
        let mut token_start = at;
        let mut escape = false;

        loop {
            if pos >= source.len() {
                if let Some(msg) = self.end_of_input_throw.message(DEFAULT_END_OF_INPUT_MSG) {
                    return Err(LexgramErrorKind::lexical(at, pos - at, msg));
                }
                break;
            }

            if !escape {
                if let Some(marker) = self.end.matches_at(source, pos, start_marker) {
                    value.push_str(marker);
                    pos += marker.len();
                    break;
                }
            }

            if !self.allowed.is_empty() {
                match self.allowed.matches_at(source, pos, start_marker) {
                    Some(marker) => {
                        value.push_str(marker);
                        char_count += marker.chars().count();
                        pos += marker.len();
                        continue;
                    }
                    None => {
                        if let Some(msg) = self.allow_throw.message(DEFAULT_ALLOW_MSG) {
                            return Err(LexgramErrorKind::lexical(at, pos - at, msg));
                        }
                        break;
                    }
                }
            }

            if !escape
                && !self.disallowed.is_empty()
                && self
                    .disallowed
                    .matches_at(source, pos, start_marker)
                    .is_some()
            {
                if let Some(msg) = self.disallow_throw.message(DEFAULT_DISALLOW_MSG) {
                    return Err(LexgramErrorKind::lexical(at, pos - at, msg));
                }
                break;
            }

            if self.max_length == Some(char_count) {
                if let Some(msg) = self.max_length_throw.message(DEFAULT_MAX_LENGTH_MSG) {
                    return Err(LexgramErrorKind::lexical(at, pos - at, msg));
                }
                break;
            }

            if let Some(marker) = self.injector_start.matches_at(source, pos, start_marker) {
                value.push_str(marker);
                pos += marker.len();
                // Flush the partial run token before the pipeline takes over.
                out.push(Token::plain(&self.tag, token_start, &value));
                match self.run_injector(source, at, pos, start_marker, pipeline, out)? {
                    Some((end_at, end_marker)) => {
                        // Resume a new run token starting at the injector end marker.
                        value = end_marker.to_string();
                        char_count = end_marker.chars().count();
                        token_start = end_at;
                        pos = end_at + end_marker.len();
                        continue;
                    }
                    None => return Ok(Some(source.len())),
                }
            }

            if let Some(marker) = self.escape.matches_at(source, pos, start_marker) {
                escape = !escape;
                value.push_str(marker);
                char_count += marker.chars().count();
                pos += marker.len();
                continue;
            }
            escape = false;

            // Safe: pos < source.len() and always on a char boundary.
            let c = source[pos..].chars().next().unwrap();
            value.push(c);
            char_count += 1;
            pos += c.len_utf8();
        }

        if !self.ignore {
            out.push(Token::plain(&self.tag, token_start, &value));
        }
        Ok(Some(pos))
    }
}
