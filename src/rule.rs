use crate::{grammar::RuleSetId, Token};

/// The token field a predicate inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subject {
    /// The token's type tag.
    Tag,
    /// The token's matched substring.
    Value,
    /// The end-of-stream/absence check. No real token ever satisfies it; a step carrying a
    /// positive `End` predicate accepts running out of input instead of a token.
    End,
}

/// One predicate of a grammar step: `(field, expected value, polarity)`.
///
/// With polarity `true` the field must equal the expected value (or, for [`Subject::End`], the
/// absence check must hold); polarity `false` negates the check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Predicate {
    /// The inspected token field.
    pub subject: Subject,
    /// The expected value.
    pub expected: String,
    /// `true` for an equality check, `false` for its negation.
    pub polarity: bool,
}

impl Predicate {
    /// Create a new predicate.
    pub fn new(subject: Subject, expected: impl Into<String>, polarity: bool) -> Self {
        Self {
            subject,
            expected: expected.into(),
            polarity,
        }
    }

    /// Evaluate the predicate against a token.
    pub fn satisfied_by(&self, token: &Token) -> bool {
        let holds = match self.subject {
            Subject::Tag => token.tag() == self.expected,
            Subject::Value => token.value() == self.expected,
            // A present token never satisfies the absence check.
            Subject::End => false,
        };
        holds == self.polarity
    }
}

/// How a step's predicates combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchMode {
    /// The step matches a token if any predicate is satisfied. A step with no predicates in
    /// this mode matches nothing.
    #[default]
    Any,
    /// The step matches a token only if every predicate is satisfied. A step with no
    /// predicates in this mode matches every token unconditionally.
    All,
}

/// One quantified matcher within a rule.
///
/// A step consumes a contiguous sub-run of between `min` and `max` tokens each satisfying its
/// predicates under its match mode. Constructed either through the chainable builder methods
/// here or compiled from the textual rule language.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    /// Capture label; a labeled step's consumed tokens become a field of the statement.
    pub label: Option<String>,
    /// The predicates, combined per `mode`.
    pub predicates: Vec<Predicate>,
    /// How the predicates combine.
    pub mode: MatchMode,
    /// Minimum number of tokens the step must consume.
    pub min: usize,
    /// Maximum number of tokens the step may consume; `None` is unbounded.
    pub max: Option<usize>,
    /// Single-capture dispatch: every captured group token has its children re-matched against
    /// this rule set, and the results are spliced in place of the group.
    pub descend: Option<RuleSetId>,
    /// Whole-match dispatch: the entire captured token list is re-matched as one stream against
    /// this rule set.
    pub dispatch: Option<RuleSetId>,
}

impl Step {
    fn with_predicates(predicates: Vec<Predicate>, mode: MatchMode) -> Self {
        Self {
            label: None,
            predicates,
            mode,
            min: 1,
            max: Some(1),
            descend: None,
            dispatch: None,
        }
    }

    /// A step matching one token with the given type tag.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::with_predicates(vec![Predicate::new(Subject::Tag, tag, true)], MatchMode::Any)
    }

    /// A step matching one token with any of the given type tags.
    pub fn tags<T: Into<String>>(tags: impl IntoIterator<Item = T>) -> Self {
        Self::with_predicates(
            tags.into_iter()
                .map(|t| Predicate::new(Subject::Tag, t, true))
                .collect(),
            MatchMode::Any,
        )
    }

    /// A step matching one token with the given value.
    pub fn value(value: impl Into<String>) -> Self {
        Self::with_predicates(
            vec![Predicate::new(Subject::Value, value, true)],
            MatchMode::Any,
        )
    }

    /// A step matching one token with any of the given values.
    pub fn values<V: Into<String>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::with_predicates(
            values.into_iter()
                .map(|v| Predicate::new(Subject::Value, v, true))
                .collect(),
            MatchMode::Any,
        )
    }

    /// A step matching any token unconditionally.
    pub fn any() -> Self {
        Self::with_predicates(Vec::new(), MatchMode::All)
    }

    /// Set the capture label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the minimum repeat count.
    pub fn min(mut self, min: usize) -> Self {
        self.min = min;
        self
    }

    /// Set the maximum repeat count.
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Remove the maximum repeat count.
    pub fn unbounded(mut self) -> Self {
        self.max = None;
        self
    }

    /// Set the match mode.
    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a predicate.
    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Additionally accept the end of the token stream.
    pub fn or_end(self) -> Self {
        self.predicate(Predicate::new(Subject::End, "", true))
    }

    /// Set the single-capture dispatch reference.
    pub fn descend(mut self, set: RuleSetId) -> Self {
        self.descend = Some(set);
        self
    }

    /// Set the whole-match dispatch reference.
    pub fn dispatch(mut self, set: RuleSetId) -> Self {
        self.dispatch = Some(set);
        self
    }

    /// Whether the step accepts the absence of a token, i.e. carries a positive
    /// [`Subject::End`] predicate.
    pub fn accepts_absence(&self) -> bool {
        self.predicates
            .iter()
            .any(|p| p.subject == Subject::End && p.polarity)
    }

    /// Evaluate the step's predicates against a token under the step's match mode.
    pub fn matches(&self, token: &Token) -> bool {
        match self.mode {
            MatchMode::Any => self.predicates.iter().any(|p| p.satisfied_by(token)),
            MatchMode::All => self.predicates.iter().all(|p| p.satisfied_by(token)),
        }
    }
}

/// One grammar rule: a labeled, ordered sequence of steps.
///
/// A rule matches a contiguous run of tokens when every step matches in sequence, consuming
/// left to right with no backtracking across steps.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    /// The rule label; becomes the `label` of matched statements.
    pub label: String,
    /// The ordered steps.
    pub steps: Vec<Step>,
}

impl Rule {
    /// Create a new rule with no steps.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}
