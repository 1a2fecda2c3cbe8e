//! Column selection options

/// Which columns [`SchemaResolver::columns`](crate::SchemaResolver::columns) emits
/// and how.
///
/// ```
/// use esql_resolver::ColumnSelection;
///
/// let selection = ColumnSelection::fields(["name", "model"]).without_aliases();
/// assert!(selection.includes("model"));
/// assert!(!selection.includes("price"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    fields: Option<Vec<String>>,
    aliases: bool,
    join_columns: bool,
    identifiers_only: bool,
}

impl ColumnSelection {
    /// Every scalar field and to-one join column, aliased
    pub fn all() -> Self {
        Self {
            fields: None,
            aliases: true,
            join_columns: true,
            identifiers_only: false,
        }
    }

    /// Only the named fields; association names select their join columns
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: Some(fields.into_iter().map(Into::into).collect()),
            ..Self::all()
        }
    }

    /// Emit `alias.column` without `AS alias_field`
    pub fn without_aliases(mut self) -> Self {
        self.aliases = false;
        self
    }

    /// Skip the join columns of to-one associations
    pub fn without_join_columns(mut self) -> Self {
        self.join_columns = false;
        self
    }

    /// Restrict to identifier fields
    pub fn identifiers_only(mut self) -> Self {
        self.identifiers_only = true;
        self
    }

    pub fn includes(&self, field: &str) -> bool {
        self.fields
            .as_ref()
            .is_none_or(|fields| fields.iter().any(|f| f == field))
    }

    pub fn with_aliases(&self) -> bool {
        self.aliases
    }

    pub fn with_join_columns(&self) -> bool {
        self.join_columns && !self.identifiers_only
    }

    pub fn is_identifiers_only(&self) -> bool {
        self.identifiers_only
    }
}

impl Default for ColumnSelection {
    fn default() -> Self {
        Self::all()
    }
}
