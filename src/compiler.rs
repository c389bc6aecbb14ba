//! The textual rule language.
//!
//! The compiler is a thin front end that only produces the structural grammar model; the
//! matching engine never sees text. A rule definition is one line: a space separated sequence
//! of step specifications, each a comma separated list of `keyword:value` clauses. The program
//! form adds `@set` and `@splice` directives for building several named rule sets at once.
//!
//! Clause reference (aliases in parentheses, `!` prefix negates a predicate clause):
//!
//! | clause            | meaning                                              |
//! |-------------------|------------------------------------------------------|
//! | `foo`             | literal value match, no colon                        |
//! | `type:x` (`t:`, `:`) | type tag predicate; `:*` matches any token        |
//! | `value:x` (`v:`)  | value predicate                                      |
//! | `space:` (`s:`)   | literal space value (space is the step separator)    |
//! | `colon:` (`d:`)   | literal colon value (colon is the clause separator)  |
//! | `comma:` (`c:`)   | literal comma value (comma separates clauses)        |
//! | `end:` (`!:`)     | accept the end of the token stream                   |
//! | `mode:some/every` | match mode override                                  |
//! | `min:n` (`>:`)    | minimum repeat count                                 |
//! | `max:n` (`<:`)    | maximum repeat count; `inf`/`infinity` is unbounded  |
//! | `label:x` (`l:`)  | capture label                                        |
//! | `job:x` (`j:`)    | single-capture dispatch, by set label or numeric id  |
//! | `jobAll:x` (`ja:`)| whole-match dispatch, by set label or numeric id     |

use crate::{
    errors::LexgramErrorKind, grammar::RuleSetId, Grammar, MatchMode, Predicate, Result, Rule,
    Step, Subject,
};

impl Grammar {
    /// Compile one textual rule definition into a [`Rule`].
    ///
    /// Rule-set references (`job:`/`jobAll:`) by label are resolved against this grammar's
    /// registry. Fails with a compiler error naming the offending clause.
    pub fn compile_rule(&self, label: &str, text: &str) -> Result<Rule> {
        let mut rule = Rule::new(label);
        for spec in text.split(' ').filter(|s| !s.is_empty()) {
            rule.steps.push(self.compile_step(spec)?);
        }
        Ok(rule)
    }

    /// Compile one textual rule definition and append it to a rule set.
    pub fn compile_rule_into(&mut self, set: RuleSetId, label: &str, text: &str) -> Result<()> {
        let rule = self.compile_rule(label, text)?;
        self.push_rule(set, rule);
        Ok(())
    }

    fn compile_step(&self, spec: &str) -> Result<Step> {
        let mut step = Step::any().mode(MatchMode::Any);
        for clause in spec.split(',') {
            self.compile_clause(&mut step, spec, clause)?;
        }
        if let Some(max) = step.max {
            if step.min > max {
                return Err(LexgramErrorKind::compiler(format!(
                    "min {} exceeds max {} in step `{}`",
                    step.min, max, spec
                )));
            }
        }
        Ok(step)
    }

    fn compile_clause(&self, step: &mut Step, spec: &str, clause: &str) -> Result<()> {
        let Some((raw_keyword, rest)) = clause.split_once(':') else {
            // A bare clause is a literal value match.
            step.predicates
                .push(Predicate::new(Subject::Value, clause, true));
            return Ok(());
        };
        // `!` alone is the end-of-stream alias; a leading `!` on anything else negates.
        let (keyword, polarity) = if raw_keyword != "!" && raw_keyword.starts_with('!') {
            (&raw_keyword[1..], false)
        } else {
            (raw_keyword, true)
        };
        match keyword {
            "end" | "!" => step
                .predicates
                .push(Predicate::new(Subject::End, "", polarity)),
            "value" | "v" => step
                .predicates
                .push(Predicate::new(Subject::Value, rest, polarity)),
            "space" | "s" => step
                .predicates
                .push(Predicate::new(Subject::Value, " ", polarity)),
            "colon" | "d" => step
                .predicates
                .push(Predicate::new(Subject::Value, ":", polarity)),
            "comma" | "c" => step
                .predicates
                .push(Predicate::new(Subject::Value, ",", polarity)),
            "mode" => {
                step.mode = match rest {
                    "some" => MatchMode::Any,
                    "every" => MatchMode::All,
                    _ => {
                        return Err(invalid_clause(spec, clause));
                    }
                }
            }
            "min" | ">" | ">=" => step.min = parse_count(spec, clause, rest)?,
            "max" | "<" | "<=" => {
                step.max = if rest.eq_ignore_ascii_case("inf") || rest.eq_ignore_ascii_case("infinity")
                {
                    None
                } else {
                    Some(parse_count(spec, clause, rest)?)
                }
            }
            "label" | "l" => step.label = Some(rest.to_string()),
            "job" | "j" => step.descend = Some(self.resolve_set_reference(spec, clause, rest)?),
            "jobAll" | "ja" => {
                step.dispatch = Some(self.resolve_set_reference(spec, clause, rest)?)
            }
            "type" | "t" | "" => {
                if rest == "*" {
                    // The wildcard: match any remaining token unconditionally.
                    step.mode = MatchMode::All;
                    step.predicates.clear();
                } else {
                    step.predicates
                        .push(Predicate::new(Subject::Tag, rest, polarity));
                }
            }
            _ => return Err(invalid_clause(spec, clause)),
        }
        Ok(())
    }

    fn resolve_set_reference(&self, spec: &str, clause: &str, rest: &str) -> Result<RuleSetId> {
        if let Ok(id) = rest.parse::<usize>() {
            return Ok(RuleSetId::new(id));
        }
        self.set_id(rest).ok_or_else(|| {
            LexgramErrorKind::compiler(format!(
                "undefined rule set label `{}` in clause `{}` of step `{}`",
                rest, clause, spec
            ))
        })
    }
}

fn invalid_clause(spec: &str, clause: &str) -> crate::LexgramError {
    LexgramErrorKind::compiler(format!("invalid clause `{}` in step `{}`", clause, spec))
}

fn parse_count(spec: &str, clause: &str, rest: &str) -> Result<usize> {
    rest.parse::<usize>().map_err(|_| {
        LexgramErrorKind::compiler(format!(
            "invalid count `{}` in clause `{}` of step `{}`",
            rest, clause, spec
        ))
    })
}

// One parsed line of a rule set body, before splices are resolved.
enum Entry {
    Rule(Rule),
    Splice(RuleSetId),
}

/// Compile a multi-line rule program into a [`Grammar`].
///
/// A program is a sequence of lines: `@set <label>` starts a new named rule set, `@splice
/// <label>` splices another set's rules into the current one at that point, every other
/// non-empty line is `<rule-label> <step specifications...>`. Lines starting with `#` are
/// comments. Set labels may be referenced before their `@set` line; splices are resolved after
/// the whole program is parsed, so a spliced set contributes its complete rule list. The
/// compiled grammar is validated before being returned.
pub fn compile_program(text: &str) -> Result<Grammar> {
    let mut grammar = Grammar::new();
    // First pass: collect the set labels so rules can reference sets defined later.
    for line in text.lines() {
        let line = line.trim();
        if let Some((directive, argument)) = directive_of(line) {
            if directive == "set" {
                if argument.is_empty() {
                    return Err(LexgramErrorKind::compiler("missing label after @set"));
                }
                grammar.add_set(argument)?;
            }
        }
    }

    // Second pass: compile rule lines and record splice points.
    let mut entries: Vec<Vec<Entry>> = (0..grammar.len()).map(|_| Vec::new()).collect();
    let mut current: Option<RuleSetId> = None;
    let mut sets_seen = 0usize;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((directive, argument)) = directive_of(line) {
            match directive {
                "set" => {
                    current = Some(RuleSetId::new(sets_seen));
                    sets_seen += 1;
                }
                "splice" => {
                    let Some(current) = current else {
                        return Err(LexgramErrorKind::compiler(
                            "@splice before any @set directive",
                        ));
                    };
                    let target = grammar.set_id(argument).ok_or_else(|| {
                        LexgramErrorKind::compiler(format!(
                            "undefined rule set label `{}` in @splice",
                            argument
                        ))
                    })?;
                    entries[current.as_usize()].push(Entry::Splice(target));
                }
                _ => {
                    return Err(LexgramErrorKind::compiler(format!(
                        "unknown directive `@{}`",
                        directive
                    )));
                }
            }
            continue;
        }
        let Some(current) = current else {
            return Err(LexgramErrorKind::compiler(format!(
                "rule `{}` before any @set directive",
                line
            )));
        };
        let (label, body) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        let rule = grammar.compile_rule(label, body)?;
        if rule.steps.is_empty() {
            return Err(LexgramErrorKind::compiler(format!(
                "rule `{}` has no steps",
                label
            )));
        }
        entries[current.as_usize()].push(Entry::Rule(rule));
    }

    // Third pass: resolve splices, rejecting cycles.
    let mut expanded: Vec<Option<Vec<Rule>>> = vec![None; grammar.len()];
    let mut in_progress = vec![false; grammar.len()];
    for index in 0..entries.len() {
        let rules = expand_set(index, &entries, &mut expanded, &mut in_progress, &grammar)?;
        for rule in rules {
            grammar.push_rule(RuleSetId::new(index), rule);
        }
    }
    grammar.validate()?;
    Ok(grammar)
}

fn directive_of(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('@')?;
    let (directive, argument) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Some((directive, argument.trim()))
}

fn expand_set(
    index: usize,
    entries: &[Vec<Entry>],
    expanded: &mut Vec<Option<Vec<Rule>>>,
    in_progress: &mut Vec<bool>,
    grammar: &Grammar,
) -> Result<Vec<Rule>> {
    if let Some(rules) = &expanded[index] {
        return Ok(rules.clone());
    }
    if in_progress[index] {
        let label = grammar
            .set(RuleSetId::new(index))
            .map(|s| s.label.clone())
            .unwrap_or_default();
        return Err(LexgramErrorKind::compiler(format!(
            "splice cycle through rule set `{}`",
            label
        )));
    }
    in_progress[index] = true;
    let mut rules = Vec::new();
    for entry in &entries[index] {
        match entry {
            Entry::Rule(rule) => rules.push(rule.clone()),
            Entry::Splice(target) => {
                let spliced =
                    expand_set(target.as_usize(), entries, expanded, in_progress, grammar)?;
                rules.extend(spliced);
            }
        }
    }
    in_progress[index] = false;
    expanded[index] = Some(rules.clone());
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_text_equals_builder_rule() {
        let mut grammar = Grammar::new();
        grammar.add_set("expression").unwrap();
        let compiled = grammar
            .compile_rule(
                "define_variable",
                "let,const l:name,:word = l:value,:*,>:1,<:inf ;,!:",
            )
            .unwrap();
        let built = Rule::new("define_variable")
            .step(Step::values(["let", "const"]))
            .step(Step::tag("word").label("name"))
            .step(Step::value("="))
            .step(Step::any().label("value").min(1).unbounded())
            .step(Step::value(";").or_end());
        assert_eq!(compiled, built);
    }

    #[test]
    fn test_compile_rule_into_appends() {
        let mut grammar = Grammar::new();
        let set = grammar.add_set("expression").unwrap();
        grammar.compile_rule_into(set, "number", ":integer").unwrap();
        grammar.compile_rule_into(set, "word", "l:name,:word").unwrap();
        let rules = &grammar.set(set).unwrap().rules;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].label, "number");
        assert_eq!(rules[1].label, "word");
    }

    #[test]
    fn test_punctuation_aliases() {
        let grammar = Grammar::new();
        let rule = grammar.compile_rule("punct", "s: d: c:").unwrap();
        let expected: Vec<&str> = vec![" ", ":", ","];
        let values: Vec<&str> = rule
            .steps
            .iter()
            .map(|s| s.predicates[0].expected.as_str())
            .collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_negated_clause() {
        let grammar = Grammar::new();
        let rule = grammar.compile_rule("not_word", "!t:word,:*").unwrap();
        // `:*` clears the predicate list; negation alone keeps it.
        assert_eq!(rule.steps[0].predicates.len(), 0);
        let rule = grammar.compile_rule("not_word", "!t:word,!v:x").unwrap();
        assert_eq!(rule.steps[0].predicates.len(), 2);
        assert!(!rule.steps[0].predicates[0].polarity);
        assert_eq!(rule.steps[0].predicates[0].subject, Subject::Tag);
        assert!(!rule.steps[0].predicates[1].polarity);
    }

    #[test]
    fn test_mode_and_counts() {
        let grammar = Grammar::new();
        let rule = grammar
            .compile_rule("r", ":word,mode:every,min:2,max:5")
            .unwrap();
        let step = &rule.steps[0];
        assert_eq!(step.mode, MatchMode::All);
        assert_eq!(step.min, 2);
        assert_eq!(step.max, Some(5));
    }

    #[test]
    fn test_invalid_clause_is_named() {
        let grammar = Grammar::new();
        let err = grammar.compile_rule("r", ":word bogus:1").unwrap_err();
        assert!(err.to_string().contains("bogus:1"));
    }

    #[test]
    fn test_invalid_count_is_named() {
        let grammar = Grammar::new();
        let err = grammar.compile_rule("r", ":word,min:x").unwrap_err();
        assert!(err.to_string().contains("min:x"));
        let err = grammar.compile_rule("r", ":word,min:3,max:2").unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_job_reference_by_label_and_id() {
        let mut grammar = Grammar::new();
        let expression = grammar.add_set("expression").unwrap();
        let rule = grammar
            .compile_rule("r", "l:e,:group-parenthesis,j:expression")
            .unwrap();
        assert_eq!(rule.steps[0].descend, Some(expression));
        let rule = grammar.compile_rule("r", "l:e,:*,ja:0").unwrap();
        assert_eq!(rule.steps[0].dispatch, Some(expression));
        let err = grammar.compile_rule("r", ":word,j:missing").unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_program_with_sets_and_splice() {
        let program = "\
# statement level
@set statement
assign l:name,:word = l:value,:*,>:1,<:inf,j:expression ;
@splice expression

@set expression
number :integer
word l:name,:word
";
        let grammar = compile_program(program).unwrap();
        let statement = grammar.set_id("statement").unwrap();
        let expression = grammar.set_id("expression").unwrap();
        assert_eq!(grammar.set(expression).unwrap().rules.len(), 2);
        // The splice contributed the expression set's complete rule list, even though its
        // rules appear later in the program.
        let statement_rules = grammar.set(statement).unwrap();
        let labels: Vec<_> = statement_rules
            .rules
            .iter()
            .map(|r| r.label.as_str())
            .collect();
        assert_eq!(labels, vec!["assign", "number", "word"]);
    }

    #[test]
    fn test_self_referential_splice_is_rejected() {
        let program = "@set a\n@splice a\n";
        let err = compile_program(program).unwrap_err();
        assert!(err.to_string().contains("splice cycle"));
    }

    #[test]
    fn test_splice_cycle_is_rejected() {
        let program = "@set a\n@splice b\n@set b\n@splice a\n";
        let err = compile_program(program).unwrap_err();
        assert!(err.to_string().contains("splice cycle"));
    }

    #[test]
    fn test_unknown_directive_is_rejected() {
        let err = compile_program("@ruleset a\n").unwrap_err();
        assert!(err.to_string().contains("@ruleset"));
    }

    #[test]
    fn test_rule_before_set_is_rejected() {
        let err = compile_program("number :integer\n").unwrap_err();
        assert!(err.to_string().contains("before any @set"));
    }

    #[test]
    fn test_forward_reference_between_sets() {
        let program = "@set statement\ncall l:args,:group-parenthesis,j:expression\n@set expression\nnumber :integer\n";
        let grammar = compile_program(program).unwrap();
        let statement = grammar.set_id("statement").unwrap();
        let expression = grammar.set_id("expression").unwrap();
        assert_eq!(
            grammar.set(statement).unwrap().rules[0].steps[0].descend,
            Some(expression)
        );
    }
}
