//! Filter expression tree

use esql_diagnostics::Span;
use std::fmt;

/// Logical connective of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    /// Separator placed between rendered children
    pub fn sql(&self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Comparison operator keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    Is,
}

impl Comparison {
    pub const ALL: [Comparison; 10] = [
        Self::Eq,
        Self::Neq,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Like,
        Self::ILike,
        Self::In,
        Self::Is,
    ];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.keyword().eq_ignore_ascii_case(keyword))
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::ILike => "ilike",
            Self::In => "in",
            Self::Is => "is",
        }
    }

    /// SQL operator, with `not.` applied
    pub fn sql(&self, negated: bool) -> &'static str {
        match (self, negated) {
            (Self::Eq, false) | (Self::Neq, true) => "=",
            (Self::Eq, true) | (Self::Neq, false) => "!=",
            (Self::Gt, false) | (Self::Lt, true) => ">",
            (Self::Gt, true) | (Self::Lt, false) => "<",
            (Self::Gte, false) | (Self::Lte, true) => ">=",
            (Self::Gte, true) | (Self::Lte, false) => "<=",
            (Self::Like, false) => "LIKE",
            (Self::Like, true) => "NOT LIKE",
            (Self::ILike, false) => "ILIKE",
            (Self::ILike, true) => "NOT ILIKE",
            (Self::In, false) => "IN",
            (Self::In, true) => "NOT IN",
            (Self::Is, false) => "IS",
            (Self::Is, true) => "IS NOT",
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Like | Self::ILike)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Operator with its optional `not.` prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator {
    pub comparison: Comparison,
    pub negated: bool,
}

impl Operator {
    pub fn new(comparison: Comparison) -> Self {
        Self {
            comparison,
            negated: false,
        }
    }

    pub fn not(comparison: Comparison) -> Self {
        Self {
            comparison,
            negated: true,
        }
    }

    pub fn sql(&self) -> &'static str {
        self.comparison.sql(self.negated)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("not.")?;
        }
        f.write_str(self.comparison.keyword())
    }
}

/// A literal as written in the filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Text(String),
    Bool(bool),
    Null,
}

impl Literal {
    /// Bare words `true`, `false` and `null` (any case) are not text
    pub fn from_bare(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            Self::Bool(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Self::Bool(false)
        } else if raw.eq_ignore_ascii_case("null") {
            Self::Null
        } else {
            Self::Text(raw.to_string())
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) if needs_quotes(text) => {
                write!(f, "\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Self::Text(text) => f.write_str(text),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
        }
    }
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.trim() != text
        || text.contains(['(', ')', ',', '"', '\\'])
        || !matches!(Literal::from_bare(text), Literal::Text(_))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub literal: Literal,
    pub span: Span,
}

impl Value {
    pub fn new(literal: Literal, span: Span) -> Self {
        Self { literal, span }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Single(Value),
    List(Vec<Value>),
}

impl Operand {
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub column_span: Span,
    pub operator: Operator,
    pub operator_span: Span,
    pub operand: Operand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub connective: Connective,
    pub children: Vec<Node>,
    pub span: Span,
}

impl Group {
    /// Conditions in source order, nested groups flattened
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'g>(&'g self, out: &mut Vec<&'g Condition>) {
        for child in &self.children {
            match child {
                Node::Group(group) => group.collect_conditions(out),
                Node::Condition(condition) => out.push(condition),
            }
        }
    }

    /// Nesting depth, 1 for a flat group
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .filter_map(|child| match child {
                Node::Group(group) => Some(group.depth()),
                Node::Condition(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Group(Group),
    Condition(Condition),
}

// Display renders the canonical filter text the tree was parsed from.

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.connective.keyword())?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(group) => write!(f, "{group}"),
            Self::Condition(condition) => write!(f, "{condition}"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.", self.column, self.operator)?;
        match &self.operand {
            Operand::Single(value) => write!(f, "{}", value.literal),
            Operand::List(values) => {
                f.write_str("(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", value.literal)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Comparison::Eq, "=", "!=")]
    #[case(Comparison::Neq, "!=", "=")]
    #[case(Comparison::Gt, ">", "<")]
    #[case(Comparison::Gte, ">=", "<=")]
    #[case(Comparison::Lt, "<", ">")]
    #[case(Comparison::Lte, "<=", ">=")]
    #[case(Comparison::Like, "LIKE", "NOT LIKE")]
    #[case(Comparison::ILike, "ILIKE", "NOT ILIKE")]
    #[case(Comparison::In, "IN", "NOT IN")]
    #[case(Comparison::Is, "IS", "IS NOT")]
    fn test_sql_operators(#[case] op: Comparison, #[case] plain: &str, #[case] negated: &str) {
        assert_eq!(op.sql(false), plain);
        assert_eq!(op.sql(true), negated);
        assert_eq!(Comparison::from_keyword(op.keyword()), Some(op));
    }

    #[rstest]
    #[case("TRUE", Literal::Bool(true))]
    #[case("False", Literal::Bool(false))]
    #[case("null", Literal::Null)]
    #[case("nullable", Literal::Text("nullable".into()))]
    fn test_bare_literals(#[case] raw: &str, #[case] expected: Literal) {
        assert_eq!(Literal::from_bare(raw), expected);
    }

    #[test]
    fn test_literal_display_quotes_when_needed() {
        assert_eq!(Literal::Text("a,b".into()).to_string(), "\"a,b\"");
        assert_eq!(Literal::Text("say \"hi\"".into()).to_string(), "\"say \\\"hi\\\"\"");
        assert_eq!(Literal::Text("10.5".into()).to_string(), "10.5");
        assert_eq!(Literal::Text("null".into()).to_string(), "\"null\"");
    }
}
