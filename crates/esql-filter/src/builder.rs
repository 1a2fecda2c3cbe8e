//! Recursive descent over the token list
//!
//! ```text
//! group      := ("and" | "or") "(" clause ("," clause)* ")"
//! clause     := group | condition
//! condition  := column "." ["not" "."] operator "." (value | "(" value ("," value)* ")")
//! ```

use crate::ast::{Comparison, Condition, Connective, Group, Literal, Node, Operand, Operator, Value};
use crate::lexer::{Token, TokenKind, tokenize};
use esql_diagnostics::{
    ESQL0001, ESQL0002, ESQL0003, ESQL0004, ESQL0005, ESQL0007, ESQL0008, ESQL0009, ESQL0010,
    ESQL0012, ESQL0104, EsqlError, Result, Span,
};

/// Deepest group nesting accepted; `and(price.gt.1)` has depth 1
pub const MAX_DEPTH: usize = 64;

/// Parse filter text into a tree without resolving columns
pub fn parse_filter(source: &str) -> Result<Group> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(EsqlError::syntax(
            ESQL0008,
            "empty filter expression",
            Span::point(source.len()),
        ));
    }

    let mut builder = Builder::new(source, tokens);
    let group = builder.group()?;
    if let Some(token) = builder.peek() {
        return Err(EsqlError::syntax(
            ESQL0004,
            format!("unexpected {} after the end of the filter", token.kind),
            token.span,
        ));
    }
    Ok(group)
}

struct Builder<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'s> Builder<'s> {
    fn new(source: &'s str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn end(&self) -> Span {
        Span::point(self.source.len())
    }

    /// Next token, or an end-of-input error mentioning what was expected
    fn next(&mut self, expected: &str) -> Result<Token> {
        self.advance().ok_or_else(|| {
            EsqlError::syntax(
                ESQL0002,
                format!("unexpected end of input, expected {expected}"),
                self.end(),
            )
        })
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        let token = self.next(expected)?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected(&token, expected))
        }
    }

    fn word(&mut self, expected: &str) -> Result<(String, Span)> {
        let token = self.next(expected)?;
        match token.kind {
            TokenKind::Word(word) => Ok((word, token.span)),
            _ => Err(unexpected(&token, expected)),
        }
    }

    fn group(&mut self) -> Result<Group> {
        self.depth += 1;
        let group = self.group_body();
        self.depth -= 1;
        group
    }

    fn group_body(&mut self) -> Result<Group> {
        let start = self.next("'and(' or 'or('")?;
        if self.depth > MAX_DEPTH {
            return Err(EsqlError::syntax(
                ESQL0012,
                format!("filter nested too deeply (at most {MAX_DEPTH} groups)"),
                start.span,
            ));
        }
        let connective = match start.kind {
            TokenKind::And => Connective::And,
            TokenKind::Or => Connective::Or,
            _ => {
                return Err(EsqlError::syntax(
                    ESQL0009,
                    format!("expected 'and(' or 'or(', found {}", start.kind),
                    start.span,
                ));
            }
        };
        let open = self.expect(TokenKind::Open, "'('")?;

        if let Some(Token {
            kind: TokenKind::Close,
            span,
        }) = self.peek()
        {
            return Err(EsqlError::syntax(
                ESQL0007,
                format!("empty {} group", connective.keyword()),
                start.span.merge(*span),
            ));
        }

        let mut children = Vec::new();
        loop {
            children.push(self.clause()?);
            match self.advance() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => continue,
                Some(Token {
                    kind: TokenKind::Close,
                    span,
                }) => {
                    return Ok(Group {
                        connective,
                        children,
                        span: start.span.merge(span),
                    });
                }
                Some(token) => return Err(unexpected(&token, "',' or ')'")),
                None => {
                    return Err(EsqlError::syntax(
                        ESQL0003,
                        "missing closing parenthesis",
                        open.span,
                    ));
                }
            }
        }
    }

    fn clause(&mut self) -> Result<Node> {
        match self.peek_kind() {
            Some(TokenKind::And | TokenKind::Or) => self.group().map(Node::Group),
            _ => self.condition().map(Node::Condition),
        }
    }

    fn condition(&mut self) -> Result<Condition> {
        let (column, column_span) = self.word("a column name")?;
        self.expect(TokenKind::Dot, "'.' after the column name")?;

        let (mut keyword, mut operator_span) = self.word("an operator")?;
        let negated = keyword.eq_ignore_ascii_case("not");
        if negated {
            self.expect(TokenKind::Dot, "'.' after 'not'")?;
            let (inner, inner_span) = self.word("an operator after 'not.'")?;
            keyword = inner;
            operator_span = operator_span.merge(inner_span);
        }
        let comparison = Comparison::from_keyword(&keyword).ok_or_else(|| {
            EsqlError::syntax(ESQL0005, format!("unknown operator '{keyword}'"), operator_span)
        })?;
        let operator = Operator {
            comparison,
            negated,
        };
        self.expect(TokenKind::Dot, "'.' after the operator")?;

        let operand = if self.peek_kind() == Some(&TokenKind::Open) {
            let (values, span) = self.value_list()?;
            if comparison != Comparison::In {
                return Err(EsqlError::syntax(
                    ESQL0010,
                    format!("value lists are only allowed with 'in', not '{operator}'"),
                    span,
                ));
            }
            Operand::List(values)
        } else {
            let value = self.value()?;
            if comparison == Comparison::In {
                return Err(EsqlError::invalid_value("'in' requires a parenthesized value list")
                    .with_code(ESQL0104)
                    .for_column(&column)
                    .with_span(value.span));
            }
            Operand::Single(value)
        };

        Ok(Condition {
            column,
            column_span,
            operator,
            operator_span,
            operand,
        })
    }

    fn value_list(&mut self) -> Result<(Vec<Value>, Span)> {
        let open = self.expect(TokenKind::Open, "'('")?;
        let mut values = Vec::new();
        loop {
            values.push(self.value()?);
            match self.advance() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => continue,
                Some(Token {
                    kind: TokenKind::Close,
                    span,
                }) => return Ok((values, open.span.merge(span))),
                Some(token) => return Err(unexpected(&token, "',' or ')'")),
                None => {
                    return Err(EsqlError::syntax(
                        ESQL0003,
                        "missing closing parenthesis in value list",
                        open.span,
                    ));
                }
            }
        }
    }

    /// A value runs up to the next `,` or `)`; bare values may contain dots
    fn value(&mut self) -> Result<Value> {
        let start = self.pos;
        while matches!(
            self.peek_kind(),
            Some(TokenKind::Word(_) | TokenKind::Dot | TokenKind::Quoted(_))
        ) {
            self.pos += 1;
        }
        let parts = &self.tokens[start..self.pos];

        match parts {
            [] => match self.peek() {
                Some(token) => Err(unexpected(token, "a value")),
                None => Err(EsqlError::syntax(
                    ESQL0002,
                    "unexpected end of input, expected a value",
                    self.end(),
                )),
            },
            [Token {
                kind: TokenKind::Quoted(text),
                span,
            }] => Ok(Value::new(Literal::Text(text.clone()), *span)),
            [first, ..] => {
                let last = parts.last().unwrap_or(first);
                if let Some(quoted) = parts
                    .iter()
                    .find(|t| matches!(t.kind, TokenKind::Quoted(_)))
                {
                    return Err(unexpected(quoted, "a bare value"));
                }
                let span = first.span.merge(last.span);
                Ok(Value::new(Literal::from_bare(span.slice(self.source)), span))
            }
        }
    }
}

fn unexpected(token: &Token, expected: &str) -> EsqlError {
    EsqlError::syntax(
        ESQL0001,
        format!("unexpected {}, expected {expected}", token.kind),
        token.span,
    )
}
