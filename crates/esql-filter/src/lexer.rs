//! Filter tokenizer using winnow
//!
//! Produces a flat token list with byte spans. `and`/`or` are only keywords
//! when an opening parenthesis follows, so columns and values may still use
//! those words.

use esql_diagnostics::{ESQL0006, ESQL0011, EsqlError, Result, Span};
use log::trace;
use std::fmt;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, preceded, repeat};
use winnow::prelude::*;
use winnow::token::{any, none_of, take_while};

type Input<'a> = &'a str;
type PResult<T> = ModalResult<T>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    And,
    Or,
    Open,
    Close,
    Comma,
    Dot,
    /// Bare column name, operator keyword or value fragment
    Word(String),
    /// Double-quoted value, escapes resolved
    Quoted(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("'and('"),
            Self::Or => f.write_str("'or('"),
            Self::Open => f.write_str("'('"),
            Self::Close => f.write_str("')'"),
            Self::Comma => f.write_str("','"),
            Self::Dot => f.write_str("'.'"),
            Self::Word(word) => write!(f, "'{word}'"),
            Self::Quoted(text) => write!(f, "\"{text}\""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Split a filter expression into tokens
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut input: Input<'_> = source;
    let mut tokens = Vec::new();

    loop {
        skip_whitespace(&mut input);
        let Some(first) = input.chars().next() else {
            break;
        };
        let start = source.len() - input.len();
        let kind = token.parse_next(&mut input).map_err(|_| {
            if first == '"' {
                EsqlError::syntax(
                    ESQL0006,
                    "unterminated quoted value",
                    Span::new(start, source.len()),
                )
            } else {
                EsqlError::syntax(
                    ESQL0011,
                    format!("unrecognized character {first:?}"),
                    Span::new(start, start + first.len_utf8()),
                )
            }
        })?;
        let span = Span::new(start, source.len() - input.len());
        trace!("token {kind} at {span}");
        tokens.push(Token { kind, span });
    }

    promote_keywords(&mut tokens);
    Ok(tokens)
}

fn skip_whitespace(input: &mut Input<'_>) {
    let _: PResult<&str> = multispace0.parse_next(input);
}

fn token(input: &mut Input<'_>) -> PResult<TokenKind> {
    alt((
        '('.value(TokenKind::Open),
        ')'.value(TokenKind::Close),
        ','.value(TokenKind::Comma),
        '.'.value(TokenKind::Dot),
        quoted.map(TokenKind::Quoted),
        word.map(|w: &str| TokenKind::Word(w.to_string())),
    ))
    .parse_next(input)
}

fn quoted(input: &mut Input<'_>) -> PResult<String> {
    delimited('"', repeat(0.., quoted_char), '"').parse_next(input)
}

fn quoted_char(input: &mut Input<'_>) -> PResult<char> {
    alt((preceded('\\', any), none_of('"'))).parse_next(input)
}

fn word<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    take_while(1.., is_word_char).parse_next(input)
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !c.is_control() && !matches!(c, '(' | ')' | ',' | '.' | '"')
}

fn promote_keywords(tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        let opens = matches!(tokens.get(i + 1), Some(Token { kind: TokenKind::Open, .. }));
        if !opens {
            continue;
        }
        let promoted = match &tokens[i].kind {
            TokenKind::Word(w) if w.eq_ignore_ascii_case("and") => TokenKind::And,
            TokenKind::Word(w) if w.eq_ignore_ascii_case("or") => TokenKind::Or,
            _ => continue,
        };
        tokens[i].kind = promoted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn word(w: &str) -> TokenKind {
        TokenKind::Word(w.to_string())
    }

    #[test]
    fn test_condition_tokens() {
        assert_eq!(
            kinds("and(price.gt.10)"),
            vec![
                TokenKind::And,
                TokenKind::Open,
                word("price"),
                TokenKind::Dot,
                word("gt"),
                TokenKind::Dot,
                word("10"),
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn test_and_or_only_before_parenthesis() {
        assert_eq!(
            kinds("or (and.eq.or)"),
            vec![
                TokenKind::Or,
                TokenKind::Open,
                word("and"),
                TokenKind::Dot,
                word("eq"),
                TokenKind::Dot,
                word("or"),
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn test_quoted_value_keeps_delimiters() {
        assert_eq!(
            kinds(r#""a,b.(c) \"d\"""#),
            vec![TokenKind::Quoted(r#"a,b.(c) "d""#.to_string())]
        );
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = tokenize("  name . eq").unwrap();
        assert_eq!(tokens[0].span, Span::new(2, 6));
        assert_eq!(tokens[1].span, Span::new(7, 8));
        assert_eq!(tokens[2].span, Span::new(9, 11));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize(r#"name.eq."open"#).unwrap_err();
        assert_eq!(err.code(), ESQL0006);
        assert_eq!(err.span(), Some(Span::new(8, 13)));
    }

    #[test]
    fn test_control_character_is_rejected() {
        let err = tokenize("name.eq.\u{7}").unwrap_err();
        assert_eq!(err.code(), ESQL0011);
    }
}
