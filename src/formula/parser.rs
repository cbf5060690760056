//! Parser for Tableau calculation formulas.
//!
//! Builds an [`Expr`] tree from the lexer's token stream. A real parser is
//! required here: formulas nest function calls and field references
//! arbitrarily deep (`IF [A] > SUM([B]) THEN ...`), and text substitution
//! cannot match nested argument lists correctly.
//!
//! Precedence, tightest first: unary minus, `^`, multiplicative, additive,
//! comparison, NOT, AND/OR.

use chumsky::input::ValueInput;
use chumsky::prelude::*;
use thiserror::Error;

use super::ast::{BinaryOperator, Expr, Literal, UnaryOperator};
use super::lexer::{self, Token};

/// Errors that can occur while parsing a formula.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("tokenization failed: {0}")]
    Lex(String),

    #[error("syntax error: {0}")]
    Syntax(String),
}

/// Create the formula parser over a token stream.
pub fn parser<'tokens, 'src: 'tokens, I>(
) -> impl Parser<'tokens, I, Expr, extra::Err<Rich<'tokens, Token<'src>, SimpleSpan>>>
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    recursive(|expr| {
        // ====================================================================
        // Atoms
        // ====================================================================

        let literal = select! {
            Token::Number(n) => Expr::Literal(Literal::Number(n.to_string())),
            // Doubled quotes are the escape for an embedded quote
            Token::Str(s) => Expr::Literal(Literal::Str(s.replace("\"\"", "\""))),
            Token::True => Expr::Literal(Literal::Bool(true)),
            Token::False => Expr::Literal(Literal::Bool(false)),
            Token::Null => Expr::Literal(Literal::Null),
        }
        .labelled("literal");

        let field = select! {
            Token::Field(name) => Expr::field(name.to_string()),
        }
        .labelled("field reference");

        let ident = select! {
            Token::Ident(name) => name.to_string(),
        }
        .labelled("identifier");

        // Table-qualified field: Orders[Sales] or 'Sales Data'[Amount].
        // Accepting these makes translated output valid input again.
        let qualified_field = select! {
            Token::Ident(table) => table.to_string(),
            Token::Str(table) => table.to_string(),
        }
        .then(select! { Token::Field(name) => name.to_string() })
        .map(|(table, name)| Expr::Field {
            table: Some(table),
            name,
        });

        // Function call: name(arg, arg, ...) — arguments are full
        // sub-expressions, so nesting is exact.
        let call = ident
            .clone()
            .then(
                expr.clone()
                    .separated_by(just(Token::Comma))
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::LParen), just(Token::RParen)),
            )
            .map(|(name, args)| Expr::call(name, args));

        // A bare identifier, e.g. an unquoted date part
        let bare_ident = ident.map(Expr::Ident);

        let paren = expr
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map(|e| Expr::Paren(Box::new(e)));

        // IF c THEN a [ELSEIF c THEN b]* [ELSE z] END
        let if_expr = just(Token::If)
            .ignore_then(expr.clone())
            .then_ignore(just(Token::Then))
            .then(expr.clone())
            .then(
                just(Token::Elseif)
                    .ignore_then(expr.clone())
                    .then_ignore(just(Token::Then))
                    .then(expr.clone())
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .then(just(Token::Else).ignore_then(expr.clone()).or_not())
            .then_ignore(just(Token::End))
            .map(|((first, elseifs), else_branch)| {
                let (cond, then) = first;
                let mut branches = vec![(cond, then)];
                branches.extend(elseifs);
                Expr::If {
                    branches,
                    else_branch: else_branch.map(Box::new),
                }
            });

        // Call-form conditional: IF(c, a, b). IF is a keyword, so the plain
        // call rule never sees it; this keeps translated output parseable.
        let if_call = just(Token::If)
            .ignore_then(
                expr.clone()
                    .separated_by(just(Token::Comma))
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::LParen), just(Token::RParen)),
            )
            .map(|args| Expr::call("IF", args));

        let atom = choice((
            if_expr,
            if_call,
            call,
            qualified_field,
            bare_ident,
            field,
            literal,
            paren,
        ))
        .boxed();

        // ====================================================================
        // Operator precedence ladder
        // ====================================================================

        // Unary minus binds tightest
        let unary = just(Token::Minus)
            .to(UnaryOperator::Neg)
            .repeated()
            .foldr(atom, |op, rhs| Expr::unary(op, rhs));

        // Exponentiation is right-associative: a ^ b ^ c == a ^ (b ^ c)
        let power = unary
            .clone()
            .then(
                just(Token::Caret)
                    .ignore_then(unary)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| {
                let mut iter = rest.into_iter().rev();
                match iter.next() {
                    None => first,
                    Some(last) => {
                        let right =
                            iter.fold(last, |acc, e| Expr::binary(e, BinaryOperator::Pow, acc));
                        Expr::binary(first, BinaryOperator::Pow, right)
                    }
                }
            });

        let product = power.clone().foldl(
            choice((
                just(Token::Star).to(BinaryOperator::Mul),
                just(Token::Slash).to(BinaryOperator::Div),
                just(Token::Percent).to(BinaryOperator::Mod),
            ))
            .then(power)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(lhs, op, rhs),
        );

        let sum = product.clone().foldl(
            choice((
                just(Token::Plus).to(BinaryOperator::Add),
                just(Token::Minus).to(BinaryOperator::Sub),
            ))
            .then(product)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(lhs, op, rhs),
        );

        let comparison = sum.clone().foldl(
            choice((
                just(Token::Eq).to(BinaryOperator::Eq),
                just(Token::Ne).to(BinaryOperator::Ne),
                just(Token::Le).to(BinaryOperator::Le),
                just(Token::Lt).to(BinaryOperator::Lt),
                just(Token::Ge).to(BinaryOperator::Ge),
                just(Token::Gt).to(BinaryOperator::Gt),
            ))
            .then(sum)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(lhs, op, rhs),
        );

        // NOT binds looser than comparison: NOT a = b is NOT (a = b)
        let negation = just(Token::Not)
            .to(UnaryOperator::Not)
            .repeated()
            .foldr(comparison, |op, rhs| Expr::unary(op, rhs));

        negation.clone().foldl(
            choice((
                just(Token::And).to(BinaryOperator::And),
                just(Token::Or).to(BinaryOperator::Or),
            ))
            .then(negation)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(lhs, op, rhs),
        )
    })
}

/// Parse a formula string into an expression tree.
///
/// # Errors
///
/// Returns [`ParseError::Lex`] if tokenization fails (unbalanced brackets,
/// unterminated strings) and [`ParseError::Syntax`] if the token stream does
/// not form a valid expression. Failures carry the first diagnostic message.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = lexer::lex(source).map_err(|errs| {
        let msgs: Vec<String> = errs.iter().map(|e| e.to_string()).collect();
        ParseError::Lex(msgs.join("; "))
    })?;

    let len = source.len();
    let eoi: SimpleSpan = (len..len).into();
    let token_stream = tokens
        .as_slice()
        .map(eoi, |(tok, span): &(Token<'_>, SimpleSpan)| (tok, span));

    let (expr, errs) = parser().parse(token_stream).into_output_errors();

    match expr {
        Some(e) if errs.is_empty() => Ok(e),
        _ => {
            let msgs: Vec<String> = errs.iter().map(|e| e.to_string()).collect();
            Err(ParseError::Syntax(if msgs.is_empty() {
                "empty formula".to_string()
            } else {
                msgs.join("; ")
            }))
        }
    }
}
