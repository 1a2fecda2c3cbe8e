//! ESQL schema abstraction
//!
//! This crate provides:
//! - [`SchemaType`], the read-only projection of one mapped record type
//! - [`SchemaReflector`], the capability the resolver asks for metadata
//! - [`SchemaRegistry`], a reflector loaded from JSON or Doctrine-style XML mappings

pub mod parser;
pub mod reflector;
pub mod registry;
pub mod schema;

pub use parser::{ParseError, parse_json, parse_xml};
pub use reflector::*;
pub use registry::*;
pub use schema::*;
