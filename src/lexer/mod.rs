//! Lexers
//!
//! Header blocks use [`RuleLexer`], a small state machine whose states hold
//! ordered regex rules. At each position the first rule of the current state
//! that matches a non-empty prefix wins, emits one or more tokens and
//! optionally pushes or pops a state.
//!
//! Bodies are tokenized by [`syntax::SyntaxLexer`]s. The rest of the crate
//! only talks to the [`Lexer`] trait, so any other tokenizer can be plugged
//! into a [`registry::LexerRegistry`].

pub mod http;
pub mod registry;
pub mod syntax;

use std::collections::VecDeque;

use regex::Regex;

use crate::error::{PrettyError, Result};
use crate::token::{Category, Token};

/// A grammar that can split text into categorized tokens
pub trait Lexer: Send + Sync {
    /// Display name, e.g. `"JSON"` or `"XML"`
    fn name(&self) -> &'static str;

    /// MIME types this grammar is registered for
    fn mimetypes(&self) -> &[&'static str];

    /// Confidence in `0.0..=1.0` that `text` is written in this grammar
    fn analyse(&self, _text: &str) -> f32 {
        0.0
    }

    /// Lazily tokenize `text`. Calling this again restarts from the beginning.
    fn tokenize<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = Result<Token<'a>>> + 'a>;
}

/// What a matching rule emits
#[derive(Debug, Clone, Copy)]
pub enum Action {
    /// The whole match as one token
    Token(Category),
    /// One token per capture group, in order
    Groups(&'static [Category]),
}

/// State change after a rule fires
#[derive(Debug, Clone, Copy)]
pub enum Transition {
    Stay,
    Push(&'static str),
    Pop,
}

/// What to do when no rule matches at the current position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unmatched {
    /// Stop and report [`PrettyError::UnrecognizedInput`]
    Fail,
    /// Emit the offending character as [`Category::Error`] and carry on.
    /// A newline resets the state stack to the root state.
    ErrorToken,
}

#[derive(Debug)]
struct Rule {
    regex: Regex,
    action: Action,
    next: usize,
    pop: bool,
}

#[derive(Debug)]
struct State {
    name: &'static str,
    rules: Vec<Rule>,
}

/// Declarative rule, resolved into a [`Rule`] by [`RuleLexerBuilder::build`]
pub struct RuleSpec {
    pattern: &'static str,
    action: Action,
    transition: Transition,
}

/// Shorthand for a rule that emits a single token
pub fn token(pattern: &'static str, category: Category) -> RuleSpec {
    RuleSpec {
        pattern,
        action: Action::Token(category),
        transition: Transition::Stay,
    }
}

/// Shorthand for a rule that emits one token per capture group
pub fn groups(pattern: &'static str, categories: &'static [Category]) -> RuleSpec {
    RuleSpec {
        pattern,
        action: Action::Groups(categories),
        transition: Transition::Stay,
    }
}

impl RuleSpec {
    pub fn push(mut self, state: &'static str) -> Self {
        self.transition = Transition::Push(state);
        self
    }

    pub fn pop(mut self) -> Self {
        self.transition = Transition::Pop;
        self
    }
}

pub struct RuleLexerBuilder {
    name: &'static str,
    mimetypes: &'static [&'static str],
    states: Vec<(&'static str, Vec<RuleSpec>)>,
    unmatched: Unmatched,
}

impl RuleLexerBuilder {
    pub fn mimetypes(mut self, mimetypes: &'static [&'static str]) -> Self {
        self.mimetypes = mimetypes;
        self
    }

    /// Add a state. The first state added is the root.
    pub fn state(mut self, name: &'static str, rules: Vec<RuleSpec>) -> Self {
        self.states.push((name, rules));
        self
    }

    pub fn unmatched(mut self, unmatched: Unmatched) -> Self {
        self.unmatched = unmatched;
        self
    }

    /// Compile all rules
    ///
    /// Patterns are crate-internal literals, so a pattern that fails to
    /// compile or a push to an unknown state is a bug in the grammar.
    pub fn build(self) -> RuleLexer {
        let names: Vec<&'static str> = self.states.iter().map(|(name, _)| *name).collect();

        let states = self
            .states
            .into_iter()
            .map(|(name, specs)| State {
                name,
                rules: specs
                    .into_iter()
                    .enumerate()
                    .map(|(i, spec)| {
                        let anchored = format!(r"\A(?:{})", spec.pattern);
                        let regex = Regex::new(&anchored).unwrap_or_else(|e| {
                            panic!("{} grammar, state {name}, rule {i}: {e}", self.name)
                        });
                        let current = names.iter().position(|n| *n == name).unwrap_or(0);
                        let (next, pop) = match spec.transition {
                            Transition::Stay => (current, false),
                            Transition::Pop => (current, true),
                            Transition::Push(target) => {
                                match names.iter().position(|n| *n == target) {
                                    Some(next) => (next, false),
                                    None => panic!(
                                        "{} grammar pushes unknown state {target}",
                                        self.name
                                    ),
                                }
                            }
                        };
                        Rule {
                            regex,
                            action: spec.action,
                            next,
                            pop,
                        }
                    })
                    .collect(),
            })
            .collect();

        RuleLexer {
            name: self.name,
            mimetypes: self.mimetypes,
            states,
            unmatched: self.unmatched,
        }
    }
}

/// A regex state-machine grammar
#[derive(Debug)]
pub struct RuleLexer {
    name: &'static str,
    mimetypes: &'static [&'static str],
    states: Vec<State>,
    unmatched: Unmatched,
}

impl RuleLexer {
    pub fn builder(name: &'static str) -> RuleLexerBuilder {
        RuleLexerBuilder {
            name,
            mimetypes: &[],
            states: Vec::new(),
            unmatched: Unmatched::ErrorToken,
        }
    }

    /// Concrete iterator over the tokens of `text`
    pub fn tokens<'a>(&'a self, text: &'a str) -> Tokens<'a> {
        Tokens {
            lexer: self,
            text,
            pos: 0,
            stack: vec![0],
            pending: VecDeque::new(),
            failed: false,
        }
    }

    #[cfg(test)]
    fn state_names(&self) -> Vec<&'static str> {
        self.states.iter().map(|s| s.name).collect()
    }
}

impl Lexer for RuleLexer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn mimetypes(&self) -> &[&'static str] {
        self.mimetypes
    }

    fn tokenize<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = Result<Token<'a>>> + 'a> {
        Box::new(self.tokens(text))
    }
}

/// Lazy token stream produced by [`RuleLexer::tokens`]
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    lexer: &'a RuleLexer,
    text: &'a str,
    pos: usize,
    stack: Vec<usize>,
    pending: VecDeque<Token<'a>>,
    failed: bool,
}

impl<'a> Tokens<'a> {
    /// Try every rule of the current state; returns false when none matched
    fn advance(&mut self) -> bool {
        let text: &'a str = self.text;
        let lexer: &'a RuleLexer = self.lexer;
        let rest = &text[self.pos..];
        let state = self.stack.last().copied().unwrap_or(0);

        for rule in &lexer.states[state].rules {
            let Some(caps) = rule.regex.captures(rest) else {
                continue;
            };
            let whole = match caps.get(0) {
                Some(m) if !m.is_empty() => m,
                _ => continue,
            };

            match rule.action {
                Action::Token(category) => {
                    self.pending.push_back(Token::new(whole.as_str(), category));
                }
                Action::Groups(categories) => {
                    // Anything not covered by a group is still emitted, as Text.
                    let mut cursor = 0;
                    for (i, category) in categories.iter().enumerate() {
                        let Some(group) = caps.get(i + 1) else {
                            continue;
                        };
                        if group.is_empty() || group.start() < cursor {
                            continue;
                        }
                        if group.start() > cursor {
                            self.pending
                                .push_back(Token::new(&rest[cursor..group.start()], Category::Text));
                        }
                        self.pending.push_back(Token::new(group.as_str(), *category));
                        cursor = group.end();
                    }
                    if cursor < whole.end() {
                        self.pending
                            .push_back(Token::new(&rest[cursor..whole.end()], Category::Text));
                    }
                }
            }

            self.pos += whole.end();
            if rule.pop {
                if self.stack.len() > 1 {
                    self.stack.pop();
                }
            } else if rule.next != state {
                self.stack.push(rule.next);
            }
            return true;
        }

        false
    }

    fn unrecognized(&mut self) -> Option<Result<Token<'a>>> {
        let text: &'a str = self.text;
        let rest = &text[self.pos..];
        let state = self.stack.last().copied().unwrap_or(0);
        tracing::trace!(
            grammar = self.lexer.name,
            state = self.lexer.states[state].name,
            offset = self.pos,
            "no rule matched"
        );
        match self.lexer.unmatched {
            Unmatched::Fail => {
                self.failed = true;
                let line = rest.lines().next().unwrap_or_default();
                Some(Err(PrettyError::UnrecognizedInput {
                    grammar: self.lexer.name,
                    offset: self.pos,
                    snippet: line.chars().take(40).collect(),
                }))
            }
            Unmatched::ErrorToken => {
                let width = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                let lexeme = &rest[..width];
                self.pos += width;
                if lexeme == "\n" {
                    self.stack.truncate(1);
                    Some(Ok(Token::new(lexeme, Category::Text)))
                } else {
                    Some(Ok(Token::new(lexeme, Category::Error)))
                }
            }
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.failed || self.pos >= self.text.len() {
                return None;
            }
            if !self.advance() {
                return self.unrecognized();
            }
        }
    }
}

/// Collect a token stream, stopping at the first error
pub fn collect_tokens<'a>(lexer: &'a dyn Lexer, text: &'a str) -> Result<Vec<Token<'a>>> {
    lexer.tokenize(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy(unmatched: Unmatched) -> RuleLexer {
        RuleLexer::builder("toy")
            .state(
                "root",
                vec![
                    token(r"\s+", Category::Whitespace),
                    token(r"\d+", Category::Number),
                    token(r"\(", Category::Punctuation).push("group"),
                ],
            )
            .state(
                "group",
                vec![
                    token(r"[a-z]+", Category::Name),
                    groups(r"(,)( *)", &[Category::Punctuation, Category::Whitespace]),
                    token(r"\)", Category::Punctuation).pop(),
                ],
            )
            .unmatched(unmatched)
            .build()
    }

    #[test]
    fn test_states_are_registered_in_order() {
        assert_eq!(toy(Unmatched::Fail).state_names(), vec!["root", "group"]);
    }

    #[test]
    fn test_push_and_pop() {
        let lexer = toy(Unmatched::Fail);
        let tokens = collect_tokens(&lexer, "1 (ab, cd) 2").unwrap();
        let categories: Vec<_> = tokens.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Number,
                Category::Whitespace,
                Category::Punctuation,
                Category::Name,
                Category::Punctuation,
                Category::Whitespace,
                Category::Name,
                Category::Punctuation,
                Category::Whitespace,
                Category::Number,
            ]
        );
    }

    #[test]
    fn test_tokens_cover_input() {
        let lexer = toy(Unmatched::ErrorToken);
        let input = "12 (a,b) ?? 3\n(x";
        let joined: String = collect_tokens(&lexer, input)
            .unwrap()
            .iter()
            .map(|t| t.lexeme)
            .collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn test_error_token_policy() {
        let lexer = toy(Unmatched::ErrorToken);
        let tokens = collect_tokens(&lexer, "1 ?").unwrap();
        assert_eq!(tokens.last(), Some(&Token::new("?", Category::Error)));
    }

    #[test]
    fn test_fail_policy_reports_offset() {
        let lexer = toy(Unmatched::Fail);
        let err = collect_tokens(&lexer, "12 x").unwrap_err();
        match err {
            PrettyError::UnrecognizedInput {
                grammar, offset, ..
            } => {
                assert_eq!(grammar, "toy");
                assert_eq!(offset, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_tokenize_is_restartable() {
        let lexer = toy(Unmatched::Fail);
        let first: Vec<_> = lexer.tokenize("1 2").collect::<Result<_>>().unwrap();
        let second: Vec<_> = lexer.tokenize("1 2").collect::<Result<_>>().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_newline_resets_state_after_error() {
        let lexer = toy(Unmatched::ErrorToken);
        let tokens = collect_tokens(&lexer, "(a\n7").unwrap();
        assert_eq!(tokens.last(), Some(&Token::new("7", Category::Number)));
    }
}
