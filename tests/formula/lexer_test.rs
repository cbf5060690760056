//! Integration tests for the formula lexer.

use prism::formula::lexer::{lex, Token};

fn tokens(source: &str) -> Vec<Token<'_>> {
    lex(source)
        .expect("source should tokenize")
        .into_iter()
        .map(|(t, _)| t)
        .collect()
}

#[test]
fn test_realistic_formula() {
    let toks = tokens("IF SUM([Sales]) > 100 THEN 'High' ELSE 'Low' END");
    assert_eq!(
        toks,
        vec![
            Token::If,
            Token::Ident("SUM"),
            Token::LParen,
            Token::Field("Sales"),
            Token::RParen,
            Token::Gt,
            Token::Number("100"),
            Token::Then,
            Token::Str("High"),
            Token::Else,
            Token::Str("Low"),
            Token::End,
        ]
    );
}

#[test]
fn test_field_names_keep_inner_spacing() {
    let toks = tokens("[Order Date] + [  padded  ]");
    assert_eq!(toks[0], Token::Field("Order Date"));
    assert_eq!(toks[2], Token::Field("  padded  "));
}

#[test]
fn test_keywords_are_not_case_sensitive() {
    assert_eq!(tokens("if"), vec![Token::If]);
    assert_eq!(tokens("If"), vec![Token::If]);
    assert_eq!(tokens("elseIF"), vec![Token::Elseif]);
    // Function names are kept verbatim
    assert_eq!(tokens("Sum"), vec![Token::Ident("Sum")]);
}

#[test]
fn test_comments_are_skipped() {
    let toks = tokens("// leading comment\n[Sales] // trailing\n+ 1");
    assert_eq!(
        toks,
        vec![Token::Field("Sales"), Token::Plus, Token::Number("1")]
    );
}

#[test]
fn test_decimal_numbers_keep_source_text() {
    let toks = tokens("2.50");
    assert_eq!(toks, vec![Token::Number("2.50")]);
}

#[test]
fn test_unterminated_string_fails() {
    assert!(lex("'no closing quote").is_err());
}
