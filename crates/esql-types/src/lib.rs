//! ESQL type system
//!
//! This crate defines the values bound to SQL placeholders and the rules that
//! turn caller input into them:
//! - [`SqlValue`], the dialect-neutral bound value
//! - [`ColumnType`], the declared type of a mapped column
//! - [`Dialect`], the target database family
//! - [`TypeCoercer`], dialect and type aware value conversion

pub mod coercion;
pub mod column_type;
pub mod dialect;
pub mod value;

pub use coercion::{CoercionError, CoercionResult, TypeCoercer};
pub use column_type::ColumnType;
pub use dialect::{Dialect, UnknownDialect};
pub use value::SqlValue;
