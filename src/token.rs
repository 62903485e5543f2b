//! The token definition for `@supports` conditions.

/// A token is a single unit of a condition, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// The exact input text the token was scanned from.
    pub raw: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, raw: &'a str, span: Span) -> Self {
        Self { kind, raw, span }
    }

    /// Returns the feature payload if this token is a feature atom.
    pub fn feature(&self) -> Option<&Feature<'a>> {
        match &self.kind {
            TokenKind::Feature(feature) => Some(feature),
            _ => None,
        }
    }
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    // Punctuation
    LParen, // (
    RParen, // )

    // Keywords
    Not, // "not"
    And, // "and"
    Or,  // "or"

    /// A feature test such as `display: grid` or `selector(h2 > p)`.
    Feature(Feature<'a>),
}

/// The shape a feature atom was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// `name: value`
    Declaration,
    /// `name(args)`
    Function,
    /// Neither form, or a form with an unterminated quoted string.
    Invalid,
}

/// A scanned feature atom.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature<'a> {
    pub kind: FeatureKind,
    /// True when the atom used call syntax `name(...)`.
    pub function_form: bool,
    /// The name before the separator.
    pub left: &'a str,
    /// Trimmed content after the colon or inside the parentheses.
    pub right: &'a str,
}

impl<'a> Feature<'a> {
    /// An atom that matched neither the declaration nor the function form.
    pub fn bare(literal: &'a str) -> Self {
        Self {
            kind: FeatureKind::Invalid,
            function_form: false,
            left: literal,
            right: "",
        }
    }
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}
