//! Record type metadata
//!
//! A [`SchemaType`] is everything the resolver needs to know about one mapped
//! type: where it is stored, which fields map to which columns, which fields
//! identify a record and how it relates to other types.

use esql_types::ColumnType;
use serde::{Deserialize, Serialize};

/// Metadata for one mapped record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaType {
    /// Type name as callers refer to it (`Car`, `App\Entity\Car`)
    pub name: String,
    /// Table name, defaults to the type's short name
    #[serde(default)]
    pub table: String,
    /// Database schema (namespace) the table lives in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Scalar fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldMapping>,
    /// Names of the fields forming the identifier
    #[serde(default)]
    pub identifiers: Vec<String>,
    #[serde(default)]
    pub associations: Vec<Association>,
}

impl SchemaType {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            schema: None,
            fields: Vec::new(),
            identifiers: Vec::new(),
            associations: Vec::new(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_field(mut self, field: FieldMapping) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a field and mark it as (part of) the identifier
    pub fn with_id(mut self, field: FieldMapping) -> Self {
        self.identifiers.push(field.name.clone());
        self.fields.push(field);
        self
    }

    pub fn with_association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    /// Last segment of the type name
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    /// `schema.table` or `table`
    pub fn qualified_table(&self) -> String {
        match &self.schema {
            Some(schema) if !schema.is_empty() => format!("{schema}.{}", self.table),
            _ => self.table.clone(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_column(&self, column: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.column == column)
    }

    pub fn association(&self, field: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.field == field)
    }

    /// Associations pointing at `target`, in declaration order
    pub fn associations_to<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Association> + 'a {
        self.associations.iter().filter(move |a| a.target == target)
    }

    pub fn is_identifier(&self, field: &str) -> bool {
        self.identifiers.iter().any(|id| id == field)
    }

    /// Identifier field mappings, in identifier order
    pub fn identifier_fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.identifiers.iter().filter_map(|id| self.field(id))
    }

    /// Fill the defaults a mapping document may leave out.
    ///
    /// Table names default to the short type name, owning to-one associations
    /// without join columns get `<field>_id -> id`.
    pub fn normalize(mut self) -> Self {
        if self.table.is_empty() {
            self.table = self.short_name().to_string();
        }
        for field in &mut self.fields {
            if field.column.is_empty() {
                field.column = field.name.clone();
            }
        }
        for association in &mut self.associations {
            if association.kind.is_to_one()
                && association.mapped_by.is_none()
                && association.join_columns.is_empty()
            {
                association
                    .join_columns
                    .push(JoinColumn::new(format!("{}_id", association.field), "id"));
            }
        }
        self
    }
}

/// Last segment of a type name after `\`, `::`, `.` or `/`
pub fn short_name(type_name: &str) -> &str {
    type_name
        .rsplit(['\\', ':', '.', '/'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(type_name)
}

/// One scalar field and the column storing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub name: String,
    #[serde(default)]
    pub column: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub nullable: bool,
}

impl FieldMapping {
    pub fn new(name: impl Into<String>, column: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            column_type,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Cardinality of an association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    #[default]
    ManyToOne,
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl AssociationKind {
    pub fn is_to_one(&self) -> bool {
        matches!(self, Self::ManyToOne | Self::OneToOne)
    }
}

/// A relation from one type to another through a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    pub field: String,
    pub target: String,
    #[serde(default)]
    pub kind: AssociationKind,
    /// Local column / referenced column pairs on the owning side
    #[serde(default)]
    pub join_columns: Vec<JoinColumn>,
    /// Owning association on the target, for inverse sides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
}

impl Association {
    pub fn new(field: impl Into<String>, target: impl Into<String>, kind: AssociationKind) -> Self {
        Self {
            field: field.into(),
            target: target.into(),
            kind,
            join_columns: Vec::new(),
            mapped_by: None,
        }
    }

    pub fn many_to_one(field: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(field, target, AssociationKind::ManyToOne)
    }

    pub fn one_to_one(field: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(field, target, AssociationKind::OneToOne)
    }

    /// Inverse side of a many-to-one owned by `mapped_by` on the target
    pub fn one_to_many(
        field: impl Into<String>,
        target: impl Into<String>,
        mapped_by: impl Into<String>,
    ) -> Self {
        let mut association = Self::new(field, target, AssociationKind::OneToMany);
        association.mapped_by = Some(mapped_by.into());
        association
    }

    pub fn with_join_column(mut self, name: impl Into<String>, referenced: impl Into<String>) -> Self {
        self.join_columns.push(JoinColumn::new(name, referenced));
        self
    }

    /// Whether this side holds the join columns
    pub fn is_owning_side(&self) -> bool {
        self.mapped_by.is_none() && !self.join_columns.is_empty()
    }
}

/// A local foreign-key column and the target column it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinColumn {
    pub name: String,
    #[serde(default = "default_referenced_column")]
    pub referenced_column: String,
}

impl JoinColumn {
    pub fn new(name: impl Into<String>, referenced_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            referenced_column: referenced_column.into(),
        }
    }
}

fn default_referenced_column() -> String {
    "id".to_string()
}
