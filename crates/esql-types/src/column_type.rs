//! Declared column types
//!
//! Mapping documents name column types the way Doctrine DBAL does
//! (`integer`, `datetime_immutable`, `guid`, ...). Unknown names are kept
//! verbatim so values for custom types pass through untouched.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The declared type of a mapped column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    Integer,
    Float,
    Decimal,
    Boolean,
    #[default]
    String,
    Date,
    DateTime,
    Time,
    Json,
    /// A type name with no built-in conversion
    Other(String),
}

impl ColumnType {
    /// Canonical lowercase name
    pub fn name(&self) -> &str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Json => "json",
            Self::Other(name) => name,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Decimal)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::Time)
    }
}

impl FromStr for ColumnType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Ok(match lowered.as_str() {
            "integer" | "int" | "smallint" | "bigint" => Self::Integer,
            "float" | "double" | "real" => Self::Float,
            "decimal" | "numeric" => Self::Decimal,
            "boolean" | "bool" => Self::Boolean,
            "string" | "text" | "ascii_string" | "guid" | "uuid" | "ulid" => Self::String,
            "date" | "date_immutable" => Self::Date,
            "datetime" | "datetime_immutable" | "datetimetz" | "datetimetz_immutable" => {
                Self::DateTime
            }
            "time" | "time_immutable" => Self::Time,
            "json" | "jsonb" => Self::Json,
            _ => Self::Other(s.trim().to_string()),
        })
    }
}

impl From<String> for ColumnType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(parsed) => parsed,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for ColumnType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
