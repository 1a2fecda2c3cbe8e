//! ESQL error types

use crate::{
    ESQL0100, ESQL0101, ESQL0102, ESQL0200, ESQL0201, ESQL0210, ESQL0300, ESQL0400, ErrorCode,
    SourceLocation, Span,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional location in the filter source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location: None,
            help: code.info().help.map(str::to_string),
        }
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the diagnostic with the offending source line and a caret marker.
    ///
    /// The header is colored when the `colored` feature is enabled.
    pub fn render(&self, source: &str) -> String {
        let mut out = self.header();
        if let Some(loc) = &self.location {
            if let Some(line) = source.lines().nth(loc.line.saturating_sub(1)) {
                let width = loc.length.max(1);
                out.push_str(&format!(
                    "\n  | {line}\n  | {}{}",
                    " ".repeat(loc.column.saturating_sub(1)),
                    "^".repeat(width)
                ));
            }
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  = help: {help}"));
        }
        out
    }

    #[cfg(feature = "colored")]
    fn header(&self) -> String {
        use colored::Colorize;
        let label = match self.severity {
            Severity::Error => format!("{}[{}]", self.severity, self.code).red().bold(),
            Severity::Warning => format!("{}[{}]", self.severity, self.code).yellow().bold(),
        };
        format!("{label}: {}", self.message)
    }

    #[cfg(not(feature = "colored"))]
    fn header(&self) -> String {
        format!("{}[{}]: {}", self.severity, self.code, self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Main ESQL error type
#[derive(Debug, Clone, Error)]
pub enum EsqlError {
    /// The reflector has no entry for a type, or a mapping document is invalid
    #[error("{code}: {message}")]
    Schema {
        code: ErrorCode,
        message: String,
        type_name: Option<String>,
    },

    /// No association connects the source type to the target type
    #[error("{code}: no relation from '{source_type}' to '{target_type}'")]
    RelationNotFound {
        code: ErrorCode,
        source_type: String,
        target_type: String,
    },

    /// Every association to the target type is already claimed by an unnamed traversal
    #[error(
        "{code}: all relations from '{source_type}' to '{target_type}' are already aliased; an explicit alias is required"
    )]
    AliasExhausted {
        code: ErrorCode,
        source_type: String,
        target_type: String,
    },

    /// Malformed filter input
    #[error("{code}: {message} at position {position}")]
    Syntax {
        code: ErrorCode,
        message: String,
        position: usize,
        span: Span,
    },

    #[error("{code}: unknown column '{column}'")]
    UnknownColumn {
        code: ErrorCode,
        column: String,
        span: Option<Span>,
    },

    #[error("{code}: operator '{operator}' is not supported by the {dialect} dialect")]
    UnsupportedOperator {
        code: ErrorCode,
        operator: String,
        dialect: String,
        span: Option<Span>,
    },

    #[error("{code}: {message}")]
    InvalidValue {
        code: ErrorCode,
        message: String,
        column: Option<String>,
        span: Option<Span>,
    },

    /// A row could not be reshaped or materialized
    #[error("{code}: {message}")]
    Mapping { code: ErrorCode, message: String },

    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },
}

impl EsqlError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            code: ESQL0300,
            message: message.into(),
            type_name: None,
        }
    }

    /// Schema error for a type the reflector does not know
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::Schema {
            code: ESQL0300,
            message: format!("no schema registered for type '{type_name}'"),
            type_name: Some(type_name),
        }
    }

    pub fn relation_not_found(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::RelationNotFound {
            code: ESQL0200,
            source_type: source.into(),
            target_type: target.into(),
        }
    }

    pub fn alias_exhausted(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::AliasExhausted {
            code: ESQL0201,
            source_type: source.into(),
            target_type: target.into(),
        }
    }

    pub fn syntax(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            code,
            message: message.into(),
            position: span.start,
            span,
        }
    }

    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            code: ESQL0100,
            column: column.into(),
            span: None,
        }
    }

    pub fn unsupported_operator(operator: impl Into<String>, dialect: impl fmt::Display) -> Self {
        Self::UnsupportedOperator {
            code: ESQL0101,
            operator: operator.into(),
            dialect: dialect.to_string(),
            span: None,
        }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            code: ESQL0102,
            message: message.into(),
            column: None,
            span: None,
        }
    }

    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping {
            code: ESQL0210,
            message: message.into(),
        }
    }

    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Internal invariant violation
    pub fn internal(message: impl Into<String>) -> Self {
        Self::system(ESQL0400, message)
    }

    /// Replace the error code, keeping the variant
    pub fn with_code(mut self, new_code: ErrorCode) -> Self {
        match &mut self {
            Self::Schema { code, .. }
            | Self::RelationNotFound { code, .. }
            | Self::AliasExhausted { code, .. }
            | Self::Syntax { code, .. }
            | Self::UnknownColumn { code, .. }
            | Self::UnsupportedOperator { code, .. }
            | Self::InvalidValue { code, .. }
            | Self::Mapping { code, .. }
            | Self::System { code, .. } => *code = new_code,
        }
        self
    }

    /// Attach the source span of the offending filter fragment
    pub fn with_span(mut self, new_span: Span) -> Self {
        match &mut self {
            Self::UnknownColumn { span, .. }
            | Self::UnsupportedOperator { span, .. }
            | Self::InvalidValue { span, .. } => *span = Some(new_span),
            Self::Syntax { span, position, .. } => {
                *span = new_span;
                *position = new_span.start;
            }
            _ => {}
        }
        self
    }

    /// Record the column an invalid value was bound to
    pub fn for_column(mut self, name: impl Into<String>) -> Self {
        if let Self::InvalidValue { column, .. } = &mut self {
            *column = Some(name.into());
        }
        self
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        if let Self::System { context, .. } = &mut self {
            *context = Some(ctx.into());
        }
        self
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Schema { code, .. }
            | Self::RelationNotFound { code, .. }
            | Self::AliasExhausted { code, .. }
            | Self::Syntax { code, .. }
            | Self::UnknownColumn { code, .. }
            | Self::UnsupportedOperator { code, .. }
            | Self::InvalidValue { code, .. }
            | Self::Mapping { code, .. }
            | Self::System { code, .. } => *code,
        }
    }

    /// Span in the filter source, when the error came from filter text
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax { span, .. } => Some(*span),
            Self::UnknownColumn { span, .. }
            | Self::UnsupportedOperator { span, .. }
            | Self::InvalidValue { span, .. } => *span,
            _ => None,
        }
    }

    /// Errors caused by caller input rather than by configuration.
    ///
    /// Schema and system errors indicate a broken mapping or environment.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Schema { .. } | Self::System { .. } | Self::Mapping { .. }
        )
    }

    /// Convert to a diagnostic, projecting spans onto `source`
    pub fn to_diagnostic(&self, source: &str) -> Diagnostic {
        let message = match self {
            Self::Syntax { message, .. } => message.clone(),
            other => strip_code(&other.to_string(), other.code()),
        };
        let mut diag = Diagnostic::error(self.code(), message);
        if let Some(span) = self.span() {
            diag = diag.with_location(SourceLocation::from_span(span, source));
        }
        if let Self::System {
            context: Some(ctx), ..
        } = self
        {
            diag = diag.with_help(ctx.clone());
        }
        diag
    }
}

fn strip_code(rendered: &str, code: ErrorCode) -> String {
    let prefix = format!("{code}: ");
    rendered
        .strip_prefix(&prefix)
        .unwrap_or(rendered)
        .to_string()
}

impl From<std::io::Error> for EsqlError {
    fn from(err: std::io::Error) -> Self {
        Self::system(crate::ESQL0401, err.to_string())
    }
}
