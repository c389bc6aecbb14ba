use rustc_hash::FxHashMap;

use crate::{errors::LexgramErrorKind, Result, Rule};

/// The stable integer handle of a rule set within a [`Grammar`].
///
/// Steps reference rule sets through this handle, never through late-bound lookup, which keeps
/// mutual recursion between rule sets cheap and checkable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleSetId(usize);

impl RuleSetId {
    /// Create a new id.
    #[inline]
    pub const fn new(index: usize) -> Self {
        RuleSetId(index)
    }

    /// Get the id as usize.
    #[inline]
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RuleSetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for RuleSetId {
    fn from(index: usize) -> Self {
        RuleSetId::new(index)
    }
}

/// A named, ordered collection of grammar rules.
///
/// Rules are tried in declaration order at every stream position; the first rule that matches
/// wins and the rest are not consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleSet {
    /// The label of the rule set.
    pub label: String,
    /// The rules, in declaration order.
    pub rules: Vec<Rule>,
}

/// The arena of rule sets one matching run operates on.
///
/// Rule sets are allocated here and referenced by [`RuleSetId`]; the label map exists for the
/// textual rule language and for callers that wire rule sets up by name. A grammar is built
/// once during setup and is read-only during matching, so sharing it between threads needs no
/// locking.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    sets: Vec<RuleSet>,
    names: FxHashMap<String, RuleSetId>,
}

impl Grammar {
    /// Create an empty grammar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty rule set with the given label and return its handle.
    ///
    /// Fails with a compiler error if the label is already taken.
    pub fn add_set(&mut self, label: impl Into<String>) -> Result<RuleSetId> {
        let label = label.into();
        if self.names.contains_key(&label) {
            return Err(LexgramErrorKind::compiler(format!(
                "duplicate rule set label `{}`",
                label
            )));
        }
        let id = RuleSetId::new(self.sets.len());
        self.names.insert(label.clone(), id);
        self.sets.push(RuleSet {
            label,
            rules: Vec::new(),
        });
        Ok(id)
    }

    /// Append a rule to a rule set.
    pub fn push_rule(&mut self, set: RuleSetId, rule: Rule) {
        self.sets[set.as_usize()].rules.push(rule);
    }

    /// Look up a rule set handle by label.
    pub fn set_id(&self, label: &str) -> Option<RuleSetId> {
        self.names.get(label).copied()
    }

    /// Get a rule set by handle.
    pub fn set(&self, id: RuleSetId) -> Option<&RuleSet> {
        self.sets.get(id.as_usize())
    }

    /// The number of rule sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the grammar has no rule sets.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Validate the grammar.
    ///
    /// Checks that every rule set reference points at an existing set, and that the whole-match
    /// dispatch reference graph is acyclic. A whole-match dispatch re-matches the tokens a step
    /// captured without descending into a bracket, so a cycle of such references can recurse
    /// without ever shrinking its input; those grammars are rejected here instead of recursing
    /// until the matcher's depth ceiling trips. Single-capture references may be cyclic: they
    /// always operate on a group's children, a strictly smaller token list.
    pub fn validate(&self) -> Result<()> {
        for set in &self.sets {
            for rule in &set.rules {
                for step in &rule.steps {
                    for reference in [step.descend, step.dispatch].into_iter().flatten() {
                        if reference.as_usize() >= self.sets.len() {
                            return Err(LexgramErrorKind::compiler(format!(
                                "rule `{}` in set `{}` references unknown rule set id {}",
                                rule.label, set.label, reference
                            )));
                        }
                    }
                }
            }
        }
        self.check_dispatch_cycles()
    }

    // Depth-first search for cycles over the whole-match dispatch edges.
    fn check_dispatch_cycles(&self) -> Result<()> {
        const UNSEEN: u8 = 0;
        const IN_PROGRESS: u8 = 1;
        const DONE: u8 = 2;
        let mut state = vec![UNSEEN; self.sets.len()];
        // Iterative DFS; `false` marks the enter visit, `true` the exit visit.
        for start in 0..self.sets.len() {
            if state[start] != UNSEEN {
                continue;
            }
            let mut work = vec![(start, false)];
            while let Some((node, exit)) = work.pop() {
                if exit {
                    state[node] = DONE;
                    continue;
                }
                if state[node] == DONE {
                    continue;
                }
                state[node] = IN_PROGRESS;
                work.push((node, true));
                for target in self.dispatch_targets(node) {
                    match state[target] {
                        IN_PROGRESS => {
                            return Err(LexgramErrorKind::compiler(format!(
                                "whole-match dispatch cycle through rule set `{}`",
                                self.sets[target].label
                            )));
                        }
                        UNSEEN => work.push((target, false)),
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn dispatch_targets(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.sets[node]
            .rules
            .iter()
            .flat_map(|rule| rule.steps.iter())
            .filter_map(|step| step.dispatch)
            .map(|id| id.as_usize())
            .filter(|&t| t < self.sets.len())
    }
}
