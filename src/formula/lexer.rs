//! Lexer for Tableau calculation formulas.
//!
//! Converts formula text into a token sequence with span information.
//! Keywords are matched case-insensitively, as Tableau accepts `if`, `If`
//! and `IF` interchangeably.

use chumsky::prelude::*;

/// A token in a Tableau calculation formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // ========================================================================
    // Keywords
    // ========================================================================
    If,
    Then,
    Elseif,
    Else,
    End,
    And,
    Or,
    Not,
    True,
    False,
    Null,

    // ========================================================================
    // Literals
    // ========================================================================
    /// A bare identifier (function name or unit name, not a keyword).
    Ident(&'src str),
    /// A bracketed field reference (contents without the brackets).
    Field(&'src str),
    /// A number literal kept as source text.
    Number(&'src str),
    /// A string literal (contents without quotes), single- or double-quoted.
    Str(&'src str),

    // ========================================================================
    // Symbols
    // ========================================================================
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `=` or `==`
    Eq,
    /// `!=` or `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl<'src> std::fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::If => write!(f, "IF"),
            Token::Then => write!(f, "THEN"),
            Token::Elseif => write!(f, "ELSEIF"),
            Token::Else => write!(f, "ELSE"),
            Token::End => write!(f, "END"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::True => write!(f, "TRUE"),
            Token::False => write!(f, "FALSE"),
            Token::Null => write!(f, "NULL"),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Field(s) => write!(f, "[{}]", s),
            Token::Number(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Caret => write!(f, "^"),
            Token::Eq => write!(f, "="),
            Token::Ne => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
        }
    }
}

/// Map an identifier string to a keyword token or return Ident.
fn keyword_or_ident(s: &str) -> Token<'_> {
    match s.to_ascii_uppercase().as_str() {
        "IF" => Token::If,
        "THEN" => Token::Then,
        "ELSEIF" => Token::Elseif,
        "ELSE" => Token::Else,
        "END" => Token::End,
        "AND" => Token::And,
        "OR" => Token::Or,
        "NOT" => Token::Not,
        "TRUE" => Token::True,
        "FALSE" => Token::False,
        "NULL" => Token::Null,
        _ => Token::Ident(s),
    }
}

/// Create a lexer for Tableau calculation formulas.
///
/// Returns a parser that tokenizes the input string into a sequence of
/// tokens with span information, skipping whitespace and `//` comments.
pub fn lexer<'src>(
) -> impl Parser<'src, &'src str, Vec<(Token<'src>, SimpleSpan)>, extra::Err<Rich<'src, char>>> {
    // Identifiers: letter or underscore, then alphanumeric or underscore
    let ident = text::ident().map(keyword_or_ident);

    // Field references: [Field Name] — any characters up to the closing
    // bracket. Tableau does not allow nested brackets in field names.
    let field = just('[')
        .ignore_then(none_of(']').repeated().to_slice())
        .then_ignore(just(']'))
        .map(Token::Field);

    // String literals: single- or double-quoted. Inside double quotes an
    // embedded quote is written doubled; the token keeps the raw contents
    // and the parser collapses the escape.
    let dq_string = just('"')
        .ignore_then(
            choice((just("\"\"").ignored(), none_of('"').ignored()))
                .repeated()
                .to_slice(),
        )
        .then_ignore(just('"'))
        .map(Token::Str);
    let sq_string = just('\'')
        .ignore_then(none_of('\'').repeated().to_slice())
        .then_ignore(just('\''))
        .map(Token::Str);

    // Numbers: integer or decimal, kept as source text
    let number = text::digits(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(Token::Number);

    // Operators and punctuation; two-char forms must come first
    let symbol = choice((
        just("==").to(Token::Eq),
        just("!=").to(Token::Ne),
        just("<>").to(Token::Ne),
        just("<=").to(Token::Le),
        just(">=").to(Token::Ge),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just(',').to(Token::Comma),
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
        just('%').to(Token::Percent),
        just('^').to(Token::Caret),
        just('=').to(Token::Eq),
        just('<').to(Token::Lt),
        just('>').to(Token::Gt),
    ));

    // Formula comments run to end of line
    let comment = just("//")
        .then(any().and_is(just('\n').not()).repeated())
        .ignored();

    // A single token with span
    let token =
        choice((field, dq_string, sq_string, number, ident, symbol)).map_with(|tok, e| (tok, e.span()));

    token
        .padded_by(comment.padded().repeated())
        .padded()
        .repeated()
        .collect()
        .padded_by(comment.padded().repeated())
        .padded()
        .then_ignore(end())
}

/// Lex a formula string into tokens.
///
/// Returns Ok with the token list on success, or Err with the lex errors.
pub fn lex(source: &str) -> Result<Vec<(Token<'_>, SimpleSpan)>, Vec<Rich<'_, char>>> {
    let (tokens, errs) = lexer().parse(source).into_output_errors();
    if errs.is_empty() {
        Ok(tokens.unwrap_or_default())
    } else {
        Err(errs)
    }
}
