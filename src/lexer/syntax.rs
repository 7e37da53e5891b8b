//! Body grammars backed by syntect
//!
//! Bodies are tokenized with the Sublime syntax definitions bundled by
//! `two-face` (syntect's defaults plus the extra syntaxes bat ships). The
//! `SyntaxSet` is loaded once, on first use.

use std::collections::VecDeque;
use std::sync::{LazyLock, OnceLock};

use syntect::easy::ScopeRangeIterator;
use syntect::parsing::{ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::Lexer;
use crate::error::{PrettyError, Result};
use crate::token::{Category, Token};

/// Name of the JSON syntax
pub const JSON: &str = "JSON";

/// Name of the XML syntax
pub const XML: &str = "XML";

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();

/// The shared syntax definitions
pub fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
}

// More specific prefixes first: the first entry that is a prefix of a scope wins.
const SCOPE_CATEGORIES: &[(&str, Category)] = &[
    ("invalid", Category::Error),
    ("comment", Category::Comment),
    ("meta.preprocessor", Category::CommentPreproc),
    ("meta.tag.preprocessor", Category::CommentPreproc),
    ("keyword.operator", Category::Operator),
    ("keyword", Category::Keyword),
    ("storage", Category::Keyword),
    ("constant.language", Category::KeywordConstant),
    ("constant.numeric", Category::Number),
    ("constant.character.entity", Category::NameEntity),
    ("entity.name.tag", Category::NameTag),
    ("entity.other.attribute-name", Category::NameAttribute),
    ("entity.name.namespace", Category::NameNamespace),
    ("entity.name", Category::Name),
    ("support", Category::Name),
    ("variable", Category::Name),
    ("string", Category::String),
    ("punctuation", Category::Punctuation),
];

static SCOPES: LazyLock<Vec<(Scope, Category)>> = LazyLock::new(|| {
    SCOPE_CATEGORIES
        .iter()
        .filter_map(|(name, category)| Scope::new(name).ok().map(|scope| (scope, *category)))
        .collect()
});

fn scope_category(scope: Scope) -> Option<Category> {
    SCOPES
        .iter()
        .find(|(prefix, _)| prefix.is_prefix_of(scope))
        .map(|(_, category)| *category)
}

/// Category of the innermost classified scope
///
/// Punctuation only counts when nothing around it is classified, so the
/// quotes of a string stay part of the string.
pub fn categorize(stack: &[Scope]) -> Category {
    let mut fallback = Category::Text;
    for scope in stack.iter().rev() {
        match scope_category(*scope) {
            Some(Category::Punctuation) => {
                if fallback == Category::Text {
                    fallback = Category::Punctuation;
                }
            }
            Some(category) => return category,
            None => {}
        }
    }
    fallback
}

/// One syntect syntax exposed through the [`Lexer`] trait
#[derive(Debug, Clone, Copy)]
pub struct SyntaxLexer {
    syntax: &'static SyntaxReference,
    mimetypes: &'static [&'static str],
}

impl SyntaxLexer {
    pub fn new(syntax: &'static SyntaxReference, mimetypes: &'static [&'static str]) -> Self {
        Self { syntax, mimetypes }
    }

    /// Look a syntax up by name or file extension, e.g. `"json"` or `"js"`
    pub fn find(token: &str, mimetypes: &'static [&'static str]) -> Option<Self> {
        syntax_set()
            .find_syntax_by_token(token)
            .map(|syntax| Self::new(syntax, mimetypes))
    }
}

impl Lexer for SyntaxLexer {
    fn name(&self) -> &'static str {
        let syntax: &'static SyntaxReference = self.syntax;
        syntax.name.as_str()
    }

    fn mimetypes(&self) -> &[&'static str] {
        self.mimetypes
    }

    fn tokenize<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = Result<Token<'a>>> + 'a> {
        Box::new(SyntaxTokens {
            name: self.name(),
            lines: LinesWithEndings::from(text),
            state: ParseState::new(self.syntax),
            stack: ScopeStack::new(),
            pending: VecDeque::new(),
            failed: false,
        })
    }
}

/// Lazy token stream, parsed one line at a time
struct SyntaxTokens<'a> {
    name: &'static str,
    lines: LinesWithEndings<'a>,
    state: ParseState,
    stack: ScopeStack,
    pending: VecDeque<Token<'a>>,
    failed: bool,
}

impl<'a> SyntaxTokens<'a> {
    fn parse_line(&mut self, line: &'a str) -> Result<()> {
        let ops = self
            .state
            .parse_line(line, syntax_set())
            .map_err(|e| PrettyError::Syntax(format!("{}: {e}", self.name)))?;

        // Ranges are contiguous; runs of one category become one token
        let mut run: Option<(usize, usize, Category)> = None;
        for (range, op) in ScopeRangeIterator::new(&ops, line) {
            self.stack
                .apply(op)
                .map_err(|e| PrettyError::Syntax(format!("{}: {e:?}", self.name)))?;
            if range.is_empty() {
                continue;
            }
            let category = categorize(self.stack.as_slice());
            run = match run {
                Some((start, _, current)) if current == category => Some((start, range.end, category)),
                Some((start, end, current)) => {
                    self.pending.push_back(Token::new(&line[start..end], current));
                    Some((range.start, range.end, category))
                }
                None => Some((range.start, range.end, category)),
            };
        }
        if let Some((start, end, category)) = run {
            self.pending.push_back(Token::new(&line[start..end], category));
        }
        Ok(())
    }
}

impl<'a> Iterator for SyntaxTokens<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.failed {
                return None;
            }
            let line = self.lines.next()?;
            if let Err(e) = self.parse_line(line) {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}
