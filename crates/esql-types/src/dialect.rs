//! Target database dialects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The database family SQL fragments and bound values are produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
    /// ANSI-ish output with native booleans
    #[default]
    Generic,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [Self::Postgres, Self::MySql, Self::Sqlite, Self::Generic];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Generic => "generic",
        }
    }

    /// Whether booleans are bound as booleans rather than 0/1 integers
    pub fn has_native_bool(&self) -> bool {
        matches!(self, Self::Postgres | Self::Generic)
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown dialect '{0}' (expected postgres, mysql, sqlite or generic)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    /// Accepts plain names as well as PDO driver names (`pdo_pgsql`, `pdo_sqlite`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pgsql" | "pdo_pgsql" => Ok(Self::Postgres),
            "mysql" | "mariadb" | "pdo_mysql" => Ok(Self::MySql),
            "sqlite" | "sqlite3" | "pdo_sqlite" => Ok(Self::Sqlite),
            "generic" | "ansi" => Ok(Self::Generic),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_driver_names() {
        assert_eq!("pdo_sqlite".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
        }
    }
}
