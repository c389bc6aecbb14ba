use log::trace;
use rustc_hash::FxHashMap;

use crate::{
    errors::LexgramErrorKind, grammar::RuleSetId, Grammar, Grouper, Pipeline, Result, Rule, Step,
    Token,
};

/// One element of a captured field list: either a raw token or a statement produced by
/// recursive dispatch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// A raw captured token.
    Token(Token),
    /// A statement produced by re-matching captured tokens against another rule set.
    Statement(Statement),
}

impl Node {
    /// Get the token, if this node is one.
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Node::Token(token) => Some(token),
            Node::Statement(_) => None,
        }
    }

    /// Get the statement, if this node is one.
    pub fn as_statement(&self) -> Option<&Statement> {
        match self {
            Node::Statement(statement) => Some(statement),
            Node::Token(_) => None,
        }
    }
}

/// A captured field of a statement.
///
/// A field is `Single` exactly when its step consumes one token (`min = max = 1`) and involves
/// no recursive dispatch; any other quantifier or a dispatch reference makes it a list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capture {
    /// The sole captured token.
    Single(Token),
    /// The ordered captured list.
    Many(Vec<Node>),
}

impl Capture {
    /// Get the sole captured token, if the capture is single.
    pub fn single(&self) -> Option<&Token> {
        match self {
            Capture::Single(token) => Some(token),
            Capture::Many(_) => None,
        }
    }

    /// Get the captured list, if the capture is a list.
    pub fn many(&self) -> Option<&[Node]> {
        match self {
            Capture::Many(nodes) => Some(nodes),
            Capture::Single(_) => None,
        }
    }
}

/// The labeled result of one successful rule match.
///
/// Statements are never mutated after creation; recursive dispatch makes a statement's fields
/// themselves hold nested statements.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statement {
    /// The label of the winning rule.
    pub label: String,
    /// The byte offset of the first matched token.
    pub index: usize,
    /// The verbatim source substring covered by the match.
    pub value: String,
    /// One entry per labeled step of the winning rule.
    pub fields: FxHashMap<String, Capture>,
}

impl Statement {
    /// Get a captured field by its step label.
    pub fn field(&self, label: &str) -> Option<&Capture> {
        self.fields.get(label)
    }
}

/// The grammar matching engine.
///
/// Walks a rule set over a token stream: at every position the rules are tried in declaration
/// order and the first whose step sequence matches wins. Step quantities are satisfied greedily
/// with one-token lookahead against the following step, which is how "consume expression tokens
/// until you see a semicolon" is expressed without an end marker on the expression step itself.
///
/// Recursive dispatch into other rule sets is bounded by a depth ceiling (default 64) because a
/// whole-match dispatch does not necessarily shrink its input; see
/// [`Grammar::validate`] for the compile-time side of that guard.
#[derive(Debug, Clone)]
pub struct Matcher<'g> {
    grammar: &'g Grammar,
    max_depth: usize,
}

impl<'g> Matcher<'g> {
    /// Create a matcher for the given grammar.
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            max_depth: 64,
        }
    }

    /// Set the recursion depth ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Match a token stream (grouped or flat) against a rule set.
    ///
    /// Returns the ordered statements, or a grammar error pinpointing the first token no rule
    /// of the set matches.
    pub fn match_tokens(
        &self,
        source: &str,
        tokens: &[Token],
        set: RuleSetId,
    ) -> Result<Vec<Statement>> {
        self.match_list(source, tokens, set, 0)
    }

    /// Run the full chain: scan the source, group the brackets, and match against a rule set.
    pub fn match_source(
        &self,
        source: &str,
        pipeline: &Pipeline,
        grouper: &Grouper,
        set: RuleSetId,
    ) -> Result<Vec<Statement>> {
        let tokens = grouper.group(source, pipeline.scan(source)?)?;
        self.match_tokens(source, &tokens, set)
    }

    fn match_list(
        &self,
        source: &str,
        tokens: &[Token],
        set_id: RuleSetId,
        depth: usize,
    ) -> Result<Vec<Statement>> {
        let at = tokens.first().map_or(0, |t| t.index());
        if depth > self.max_depth {
            return Err(LexgramErrorKind::grammar(
                at,
                1,
                format!("recursion depth ceiling ({}) exceeded", self.max_depth),
            ));
        }
        let set = self.grammar.set(set_id).ok_or_else(|| {
            LexgramErrorKind::grammar(at, 1, format!("unknown rule set id {}", set_id))
        })?;
        let mut statements = Vec::new();
        let mut index = 0;
        'scan: while index < tokens.len() {
            let token = &tokens[index];
            for rule in &set.rules {
                let Some((next_index, fields)) =
                    self.try_rule(source, tokens, index, rule, depth)?
                else {
                    continue;
                };
                if next_index == index {
                    // A zero-width match would stall the scan; treat it as a non-match.
                    continue;
                }
                let last = &tokens[next_index - 1];
                let statement = Statement {
                    label: rule.label.clone(),
                    index: token.index(),
                    value: source[token.index()..last.end()].to_string(),
                    fields,
                };
                trace!("matched {} at offset {}", statement.label, statement.index);
                statements.push(statement);
                index = next_index;
                continue 'scan;
            }
            return Err(LexgramErrorKind::grammar(
                token.index(),
                token.value().len(),
                "unexpected token",
            ));
        }
        Ok(statements)
    }

    // Attempts one rule at one position. `Ok(None)` means the rule does not match there.
    fn try_rule(
        &self,
        source: &str,
        tokens: &[Token],
        index: usize,
        rule: &Rule,
        depth: usize,
    ) -> Result<Option<(usize, FxHashMap<String, Capture>)>> {
        let mut fields = FxHashMap::default();
        let mut at = index;
        for (i, step) in rule.steps.iter().enumerate() {
            match self.match_step(source, tokens, at, step, rule.steps.get(i + 1), depth)? {
                None => return Ok(None),
                Some((next, nodes)) => {
                    at = next;
                    if let Some(label) = &step.label {
                        fields.insert(label.clone(), capture_for(step, nodes));
                    }
                }
            }
        }
        Ok(Some((at, fields)))
    }

    // Attempts to satisfy one step starting at `index`, with one-token lookahead against the
    // following step. Returns the position after the consumed sub-run and the captured nodes.
    fn match_step(
        &self,
        source: &str,
        tokens: &[Token],
        index: usize,
        step: &Step,
        next_step: Option<&Step>,
        depth: usize,
    ) -> Result<Option<(usize, Vec<Node>)>> {
        let mut consumed: Vec<Token> = Vec::new();
        let mut until = 0usize;
        let mut at = index;
        while at < tokens.len() {
            let token = &tokens[at];
            if let Some(next) = next_step {
                if next.matches(token) {
                    until += 1;
                    // Hand the token off to the next step once both minimums are reachable.
                    if until >= next.min && consumed.len() >= step.min {
                        break;
                    }
                } else {
                    until = 0;
                }
            }
            if !step.matches(token) {
                if consumed.len() < step.min {
                    return Ok(None);
                }
                break;
            }
            consumed.push(token.clone());
            at += 1;
            if step.max == Some(consumed.len()) {
                break;
            }
        }
        // Running out of tokens completes the step only if its minimum is already satisfied or
        // it accepts absence through a positive end-of-stream predicate.
        if consumed.len() < step.min && !step.accepts_absence() {
            return Ok(None);
        }

        if let Some(set) = step.descend {
            let mut nodes = Vec::new();
            for token in consumed {
                if let Token::Group { ref children, .. } = token {
                    let statements = self.match_list(source, children, set, depth + 1)?;
                    nodes.extend(statements.into_iter().map(Node::Statement));
                } else {
                    nodes.push(Node::Token(token));
                }
            }
            return Ok(Some((at, nodes)));
        }
        if let Some(set) = step.dispatch {
            let statements = self.match_list(source, &consumed, set, depth + 1)?;
            return Ok(Some((
                at,
                statements.into_iter().map(Node::Statement).collect(),
            )));
        }
        Ok(Some((at, consumed.into_iter().map(Node::Token).collect())))
    }
}

fn capture_for(step: &Step, mut nodes: Vec<Node>) -> Capture {
    if step.min == 1
        && step.max == Some(1)
        && step.descend.is_none()
        && step.dispatch.is_none()
        && nodes.len() == 1
    {
        if let Some(Node::Token(token)) = nodes.pop() {
            return Capture::Single(token);
        }
    }
    Capture::Many(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizers::{
        CharRunTokenizer, IgnoreTokenizer, SymbolTokenizer, INTEGER_CHARS, WORD_CHARS,
    };
    use crate::PipelineBuilder;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn pipeline() -> Pipeline {
        PipelineBuilder::new()
            .add_tokenizer(SymbolTokenizer::new([
                ("=", "set"),
                ("+", "add"),
                (";", "semicolon"),
                ("(", "open-parenthesis"),
                (")", "close-parenthesis"),
            ]))
            .add_tokenizer(CharRunTokenizer::new("integer", INTEGER_CHARS))
            .add_tokenizer(CharRunTokenizer::new("word", WORD_CHARS))
            .add_tokenizer(IgnoreTokenizer::new(" \t\r\n"))
            .build()
    }

    // `word = <expression tokens> ;` with the expression bounded by the semicolon step.
    fn assignment_grammar() -> (Grammar, RuleSetId) {
        let mut grammar = Grammar::new();
        let set = grammar.add_set("statement").unwrap();
        grammar.push_rule(
            set,
            Rule::new("assignment")
                .step(Step::tag("word").label("name"))
                .step(Step::tag("set"))
                .step(Step::any().label("expression").min(1).unbounded())
                .step(Step::tag("semicolon")),
        );
        (grammar, set)
    }

    #[test]
    fn test_greedy_until_lookahead() {
        init();
        let source = "x = 1 + 2;";
        let (grammar, set) = assignment_grammar();
        let statements = Matcher::new(&grammar)
            .match_source(source, &pipeline(), &Grouper::default(), set)
            .unwrap();
        assert_eq!(statements.len(), 1);
        let statement = &statements[0];
        assert_eq!(statement.label, "assignment");
        assert_eq!(statement.value, "x = 1 + 2;");
        assert_eq!(
            statement.field("name").unwrap().single().unwrap().value(),
            "x"
        );
        let expression = statement.field("expression").unwrap().many().unwrap();
        let values: Vec<_> = expression
            .iter()
            .map(|n| n.as_token().unwrap().value())
            .collect();
        assert_eq!(values, vec!["1", "+", "2"]);
    }

    #[test]
    fn test_error_at_exact_offset() {
        init();
        let source = "x = 1;\n= 2;";
        let (grammar, set) = assignment_grammar();
        let err = Matcher::new(&grammar)
            .match_source(source, &pipeline(), &Grouper::default(), set)
            .unwrap_err();
        // The first unmatched token is the `=` on the second line, not the input start.
        assert_eq!(err.offset(), Some(7));
        assert_eq!(err.len(), Some(1));
    }

    #[test]
    fn test_determinism() {
        init();
        let source = "x = 1 + 2; y = 3;";
        let (grammar, set) = assignment_grammar();
        let matcher = Matcher::new(&grammar);
        let first = matcher
            .match_source(source, &pipeline(), &Grouper::default(), set)
            .unwrap();
        let second = matcher
            .match_source(source, &pipeline(), &Grouper::default(), set)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_end_predicate_accepts_stream_end() {
        init();
        let mut grammar = Grammar::new();
        let set = grammar.add_set("statement").unwrap();
        grammar.push_rule(
            set,
            Rule::new("assignment")
                .step(Step::tag("word").label("name"))
                .step(Step::tag("set"))
                .step(Step::any().label("expression").min(1).unbounded())
                .step(Step::tag("semicolon").or_end()),
        );
        let source = "x = 1 + 2";
        let statements = Matcher::new(&grammar)
            .match_source(source, &pipeline(), &Grouper::default(), set)
            .unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].value, "x = 1 + 2");
    }

    #[test]
    fn test_descend_into_groups() {
        init();
        let mut grammar = Grammar::new();
        let statement = grammar.add_set("statement").unwrap();
        let expression = grammar.add_set("expression").unwrap();
        grammar.push_rule(
            statement,
            Rule::new("assignment")
                .step(Step::tag("word").label("name"))
                .step(Step::tag("set"))
                .step(
                    Step::any()
                        .label("expression")
                        .min(1)
                        .unbounded()
                        .descend(expression),
                )
                .step(Step::tag("semicolon")),
        );
        grammar.push_rule(
            expression,
            Rule::new("group").step(
                Step::tag("group-parenthesis")
                    .label("children")
                    .descend(expression),
            ),
        );
        grammar.push_rule(expression, Rule::new("operator").step(Step::tag("add")));
        grammar.push_rule(
            expression,
            Rule::new("number").step(Step::tag("integer").label("v")),
        );
        grammar.validate().unwrap();

        let source = "x = ((1) + 2) + 3;";
        let statements = Matcher::new(&grammar)
            .match_source(source, &pipeline(), &Grouper::default(), statement)
            .unwrap();
        assert_eq!(statements.len(), 1);
        // The outer group was replaced by the statements matched over its children; the plain
        // tokens after it pass through untouched.
        let expression_nodes = statements[0].field("expression").unwrap().many().unwrap();
        assert_eq!(expression_nodes.len(), 5);
        let group = expression_nodes[0].as_statement().unwrap();
        assert_eq!(group.label, "group");
        assert_eq!(group.value, "(1)");
        let children = group.field("children").unwrap().many().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].as_statement().unwrap().label, "number");
        assert_eq!(expression_nodes[1].as_statement().unwrap().label, "operator");
        assert_eq!(expression_nodes[2].as_statement().unwrap().label, "number");
        assert_eq!(expression_nodes[3].as_token().unwrap().tag(), "add");
        assert_eq!(expression_nodes[4].as_token().unwrap().value(), "3");
    }

    #[test]
    fn test_first_rule_wins() {
        init();
        let mut grammar = Grammar::new();
        let set = grammar.add_set("statement").unwrap();
        grammar.push_rule(set, Rule::new("first").step(Step::tag("integer")));
        grammar.push_rule(set, Rule::new("second").step(Step::tag("integer")));
        let source = "1";
        let statements = Matcher::new(&grammar)
            .match_source(source, &pipeline(), &Grouper::default(), set)
            .unwrap();
        assert_eq!(statements[0].label, "first");
    }

    #[test]
    fn test_max_bounds_consumption() {
        init();
        let mut grammar = Grammar::new();
        let set = grammar.add_set("statement").unwrap();
        grammar.push_rule(
            set,
            Rule::new("pair").step(Step::tag("integer").label("pair").min(1).max(2)),
        );
        let source = "1 2 3";
        let statements = Matcher::new(&grammar)
            .match_source(source, &pipeline(), &Grouper::default(), set)
            .unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].value, "1 2");
        assert_eq!(statements[1].value, "3");
    }

    #[test]
    fn test_depth_ceiling_guards_non_shrinking_dispatch() {
        init();
        // A rule set dispatching its whole capture onto itself never shrinks its input. The
        // compile-time cycle check rejects this grammar; when built anyway, the runtime
        // ceiling stops it.
        let mut grammar = Grammar::new();
        let set = grammar.add_set("statement").unwrap();
        grammar.push_rule(
            set,
            Rule::new("loop").step(Step::any().min(1).unbounded().dispatch(set)),
        );
        assert!(grammar.validate().is_err());
        let source = "1 2";
        let err = Matcher::new(&grammar)
            .match_source(source, &pipeline(), &Grouper::default(), set)
            .unwrap_err();
        assert!(err.to_string().contains("recursion depth ceiling"));
    }

    #[test]
    fn test_unknown_rule_set_id_is_a_grammar_error() {
        init();
        let mut grammar = Grammar::new();
        let set = grammar.add_set("statement").unwrap();
        grammar.push_rule(
            set,
            Rule::new("bad").step(Step::any().min(1).unbounded().descend(RuleSetId::new(9))),
        );
        let source = "(1)";
        let err = Matcher::new(&grammar)
            .match_source(source, &pipeline(), &Grouper::default(), set)
            .unwrap_err();
        assert!(err.to_string().contains("unknown rule set id"));
    }
}
