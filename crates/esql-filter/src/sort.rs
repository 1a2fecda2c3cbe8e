//! Sort expressions
//!
//! `name.desc,price.nullslast` style ordering. Each entry is
//! `<field>[.<direction>][.<nulls>]`; entries naming unknown fields are
//! skipped.

use esql_resolver::{Context, SchemaResolver};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    First,
    Last,
}

/// One resolved ordering entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortItem {
    pub column: String,
    pub direction: Direction,
    pub nulls: Option<Nulls>,
}

impl SortItem {
    /// Order clauses for this entry, the null ordering one first
    pub fn clauses(&self) -> Vec<String> {
        let mut clauses = Vec::with_capacity(2);
        match self.nulls {
            Some(Nulls::Last) => clauses.push(format!("{} IS NULL", self.column)),
            Some(Nulls::First) => clauses.push(format!("{} IS NOT NULL", self.column)),
            None => {}
        }
        clauses.push(format!("{} {}", self.column, self.direction.sql()));
        clauses
    }
}

pub struct SortParser<'r> {
    resolver: &'r SchemaResolver,
}

impl<'r> SortParser<'r> {
    pub fn new(resolver: &'r SchemaResolver) -> Self {
        Self { resolver }
    }

    pub fn items(&self, text: &str, ctx: &Context) -> Vec<SortItem> {
        text.split(',')
            .filter_map(|entry| self.item(entry, ctx))
            .collect()
    }

    /// Order clauses, without the `ORDER BY` keyword
    pub fn parse(&self, text: &str, ctx: &Context) -> Vec<String> {
        self.items(text, ctx)
            .iter()
            .flat_map(SortItem::clauses)
            .collect()
    }

    /// `ORDER BY ...`, or an empty string when nothing sortable was given
    pub fn order_by(&self, text: &str, ctx: &Context) -> String {
        let clauses = self.parse(text, ctx);
        if clauses.is_empty() {
            String::new()
        } else {
            format!("ORDER BY {}", clauses.join(", "))
        }
    }

    fn item(&self, entry: &str, ctx: &Context) -> Option<SortItem> {
        let mut parts = entry.split('.').map(str::trim);
        let field = parts.next().filter(|f| !f.is_empty())?;
        let Some(column) = self.resolver.column(ctx, field) else {
            debug!("ignoring sort on unknown field {field}");
            return None;
        };

        let mut direction = Direction::Asc;
        let mut nulls = None;
        match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("desc") => direction = Direction::Desc,
            Some("nullsfirst") => nulls = Some(Nulls::First),
            Some("nullslast") => nulls = Some(Nulls::Last),
            _ => {}
        }
        if nulls.is_none() {
            nulls = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                Some("nullsfirst") => Some(Nulls::First),
                Some("nullslast") => Some(Nulls::Last),
                _ => None,
            };
        }

        Some(SortItem {
            column,
            direction,
            nulls,
        })
    }
}
