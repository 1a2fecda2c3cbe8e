//! ESQL error codes
//!
//! Error code ranges:
//! - ESQL0001-ESQL0099: Filter syntax errors
//! - ESQL0100-ESQL0199: Filter semantic errors (columns, operators, values)
//! - ESQL0200-ESQL0299: Alias and relation errors, row mapping
//! - ESQL0300-ESQL0399: Schema errors
//! - ESQL0400-ESQL0499: System errors (I/O, configuration)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Static description and help for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    pub const fn is_syntax_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    pub const fn is_filter_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    pub const fn is_relation_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    pub const fn is_schema_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ESQL{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub description: &'static str,
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Filter syntax (0001-0099)
    map.insert(1, ErrorInfo::new("Unexpected token"));
    map.insert(2, ErrorInfo::new("Unexpected end of input"));
    map.insert(3, ErrorInfo::new("Missing closing parenthesis"));
    map.insert(4, ErrorInfo::new("Unexpected trailing input")
        .with_help("A filter is a single and(...) or or(...) group"));
    map.insert(5, ErrorInfo::new("Unknown operator")
        .with_help("Use eq, neq, gt, gte, lt, lte, like, ilike, in or is, optionally prefixed with not."));
    map.insert(6, ErrorInfo::new("Unterminated quoted value"));
    map.insert(7, ErrorInfo::new("Empty group"));
    map.insert(8, ErrorInfo::new("Empty filter expression"));
    map.insert(9, ErrorInfo::new("Expected a group")
        .with_help("Wrap conditions in and(...) or or(...)"));
    map.insert(10, ErrorInfo::new("Value list outside of an in condition"));
    map.insert(11, ErrorInfo::new("Unrecognized character"));
    map.insert(12, ErrorInfo::new("Filter nested too deeply"));

    // Filter semantics (0100-0199)
    map.insert(100, ErrorInfo::new("Unknown column")
        .with_help("Filter columns are field names of the resolved type"));
    map.insert(101, ErrorInfo::new("Operator not supported by dialect"));
    map.insert(102, ErrorInfo::new("Invalid value"));
    map.insert(103, ErrorInfo::new("Invalid operand for is")
        .with_help("is accepts only true, false or null"));
    map.insert(104, ErrorInfo::new("in requires a parenthesized value list"));

    // Alias and relation (0200-0299)
    map.insert(200, ErrorInfo::new("Relation not found"));
    map.insert(201, ErrorInfo::new("Relation aliases exhausted")
        .with_help("Pass an explicit alias to traverse the same relation again"));
    map.insert(210, ErrorInfo::new("Row mapping failed"));
    map.insert(211, ErrorInfo::new("Denormalization failed"));

    // Schema (0300-0399)
    map.insert(300, ErrorInfo::new("Type not found"));
    map.insert(301, ErrorInfo::new("Invalid mapping document"));
    map.insert(302, ErrorInfo::new("Field not found"));

    // System (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Configuration error"));

    map
});

// Filter syntax
pub const ESQL0001: ErrorCode = ErrorCode::new(1);
pub const ESQL0002: ErrorCode = ErrorCode::new(2);
pub const ESQL0003: ErrorCode = ErrorCode::new(3);
pub const ESQL0004: ErrorCode = ErrorCode::new(4);
pub const ESQL0005: ErrorCode = ErrorCode::new(5);
pub const ESQL0006: ErrorCode = ErrorCode::new(6);
pub const ESQL0007: ErrorCode = ErrorCode::new(7);
pub const ESQL0008: ErrorCode = ErrorCode::new(8);
pub const ESQL0009: ErrorCode = ErrorCode::new(9);
pub const ESQL0010: ErrorCode = ErrorCode::new(10);
pub const ESQL0011: ErrorCode = ErrorCode::new(11);
pub const ESQL0012: ErrorCode = ErrorCode::new(12);

// Filter semantics
pub const ESQL0100: ErrorCode = ErrorCode::new(100);
pub const ESQL0101: ErrorCode = ErrorCode::new(101);
pub const ESQL0102: ErrorCode = ErrorCode::new(102);
pub const ESQL0103: ErrorCode = ErrorCode::new(103);
pub const ESQL0104: ErrorCode = ErrorCode::new(104);

// Alias and relation
pub const ESQL0200: ErrorCode = ErrorCode::new(200);
pub const ESQL0201: ErrorCode = ErrorCode::new(201);
pub const ESQL0210: ErrorCode = ErrorCode::new(210);
pub const ESQL0211: ErrorCode = ErrorCode::new(211);

// Schema
pub const ESQL0300: ErrorCode = ErrorCode::new(300);
pub const ESQL0301: ErrorCode = ErrorCode::new(301);
pub const ESQL0302: ErrorCode = ErrorCode::new(302);

// System
pub const ESQL0400: ErrorCode = ErrorCode::new(400);
pub const ESQL0401: ErrorCode = ErrorCode::new(401);
pub const ESQL0402: ErrorCode = ErrorCode::new(402);
