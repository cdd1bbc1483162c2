//! Syntax tokenization for fenced code blocks.
//!
//! Code is tokenized with `syntect` and every token is reduced to a coarse
//! [`TokenCategory`] derived from its TextMate scope stack.  Colors come from a
//! fixed palette rather than a theme so reports look the same everywhere.

use genpdf::style::Color;
use log::warn;
use syntect::easy::ScopeRangeIterator;
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Coarse classification of a code token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Keyword,
    String,
    Number,
    Comment,
    FunctionName,
    ClassName,
    VariableName,
    Literal,
    BuiltinName,
    #[default]
    Other,
}

impl TokenCategory {
    /// Palette color for the category.  Anything unrecognized is black.
    pub fn color(self) -> Color {
        match self {
            Self::Keyword => Color::Rgb(0, 0, 255),
            Self::String => Color::Rgb(0, 128, 0),
            Self::Number => Color::Rgb(255, 0, 0),
            Self::Comment => Color::Rgb(128, 128, 128),
            Self::FunctionName => Color::Rgb(0, 0, 128),
            Self::ClassName => Color::Rgb(0, 100, 200),
            Self::VariableName => Color::Rgb(139, 69, 19),
            Self::Literal => Color::Rgb(255, 69, 0),
            Self::BuiltinName => Color::Rgb(0, 100, 0),
            Self::Other => Color::Rgb(0, 0, 0),
        }
    }

    /// Maps a single TextMate scope name to a category, if it has one.
    pub fn from_scope(scope: &str) -> Option<Self> {
        const PREFIXES: &[(&str, TokenCategory)] = &[
            ("comment", TokenCategory::Comment),
            ("string", TokenCategory::String),
            ("constant.numeric", TokenCategory::Number),
            ("constant", TokenCategory::Literal),
            ("keyword", TokenCategory::Keyword),
            ("storage", TokenCategory::Keyword),
            ("entity.name.function", TokenCategory::FunctionName),
            ("variable.function", TokenCategory::FunctionName),
            ("support.function", TokenCategory::BuiltinName),
            ("entity.name.class", TokenCategory::ClassName),
            ("entity.name.struct", TokenCategory::ClassName),
            ("entity.name.type", TokenCategory::ClassName),
            ("support.class", TokenCategory::ClassName),
            ("support.type", TokenCategory::BuiltinName),
            ("variable.language", TokenCategory::BuiltinName),
            ("variable", TokenCategory::VariableName),
        ];

        PREFIXES
            .iter()
            .find(|(prefix, _)| {
                scope == *prefix
                    || (scope.starts_with(prefix) && scope[prefix.len()..].starts_with('.'))
            })
            .map(|(_, category)| *category)
    }

    fn from_stack(stack: &ScopeStack) -> Self {
        stack
            .as_slice()
            .iter()
            .rev()
            .find_map(|scope| Self::from_scope(&scope.build_string()))
            .unwrap_or_default()
    }
}

/// A piece of source text with its category.  Line ends are separate tokens
/// whose text is exactly `"\n"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub category: TokenCategory,
}

impl Token {
    pub fn new(text: impl Into<String>, category: TokenCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }

    pub fn newline() -> Self {
        Self::new("\n", TokenCategory::Other)
    }

    pub fn is_newline(&self) -> bool {
        self.text == "\n"
    }
}

/// Owns the syntax definitions used to tokenize code blocks.
pub struct Highlighter {
    syntax_set: SyntaxSet,
}

impl Highlighter {
    /// Loads the bundled syntax definitions.
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    fn syntax_for(&self, language: &str) -> &SyntaxReference {
        let token = language.split_whitespace().next().unwrap_or_default();
        self.syntax_set
            .find_syntax_by_token(token)
            .unwrap_or_else(|| {
                if !token.is_empty() {
                    warn!("No syntax definition for '{}', rendering as plain text", token);
                }
                self.syntax_set.find_syntax_plain_text()
            })
    }

    /// Returns a lazy token stream for `code` written in `language`.
    pub fn tokens<'a>(&'a self, code: &'a str, language: &str) -> Tokens<'a> {
        Tokens {
            syntax_set: &self.syntax_set,
            parse_state: ParseState::new(self.syntax_for(language)),
            stack: ScopeStack::new(),
            lines: LinesWithEndings::from(code),
            pending: Vec::new(),
            failed: false,
        }
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the tokens of one code block, parsed a line at a time.
pub struct Tokens<'a> {
    syntax_set: &'a SyntaxSet,
    parse_state: ParseState,
    stack: ScopeStack,
    lines: LinesWithEndings<'a>,
    /// Tokens of the current line in reverse order.
    pending: Vec<Token>,
    failed: bool,
}

impl Tokens<'_> {
    fn tokenize_line(&mut self, line: &str) -> Vec<Token> {
        let (body, has_newline) = match line.strip_suffix('\n') {
            Some(body) => (body.strip_suffix('\r').unwrap_or(body), true),
            None => (line, false),
        };

        let mut tokens = Vec::new();
        let ops = if self.failed {
            None
        } else {
            match self.parse_state.parse_line(line, self.syntax_set) {
                Ok(ops) => Some(ops),
                Err(err) => {
                    warn!("Tokenizer failed, rendering the rest of the block unstyled: {}", err);
                    self.failed = true;
                    None
                }
            }
        };

        match ops {
            Some(ops) => {
                for (range, op) in ScopeRangeIterator::new(&ops, line) {
                    if self.stack.apply(op).is_err() {
                        self.failed = true;
                    }
                    let end = range.end.min(body.len());
                    if range.start >= end {
                        continue;
                    }
                    let category = if self.failed {
                        TokenCategory::Other
                    } else {
                        TokenCategory::from_stack(&self.stack)
                    };
                    push_token(&mut tokens, &body[range.start..end], category);
                }
            }
            None => push_token(&mut tokens, body, TokenCategory::Other),
        }

        if has_newline {
            tokens.push(Token::newline());
        }
        tokens
    }
}

fn push_token(tokens: &mut Vec<Token>, text: &str, category: TokenCategory) {
    if text.is_empty() {
        return;
    }
    match tokens.last_mut() {
        Some(last) if last.category == category && !last.is_newline() => last.text.push_str(text),
        _ => tokens.push(Token::new(text, category)),
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop() {
                return Some(token);
            }
            let line = self.lines.next()?;
            let mut tokens = self.tokenize_line(line);
            tokens.reverse();
            self.pending = tokens;
        }
    }
}
