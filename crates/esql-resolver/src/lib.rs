//! Schema-to-SQL resolution for ESQL
//!
//! [`SchemaResolver`] turns type metadata from a
//! [`SchemaReflector`](esql_schema::SchemaReflector) into SQL fragments and
//! keeps the alias hierarchy of one query-building session. [`RowMapper`]
//! reverses the aliasing on the way back.
//!
//! ```
//! use std::sync::Arc;
//! use esql_resolver::{ColumnSelection, SchemaResolver};
//! use esql_schema::{Association, FieldMapping, SchemaRegistry, SchemaType};
//! use esql_types::{ColumnType, Dialect};
//!
//! let registry = SchemaRegistry::from_types([
//!     SchemaType::new("Car", "car")
//!         .with_id(FieldMapping::new("id", "id", ColumnType::Integer))
//!         .with_field(FieldMapping::new("name", "name", ColumnType::String))
//!         .with_association(Association::many_to_one("model", "Model").with_join_column("model_id", "id")),
//!     SchemaType::new("Model", "model")
//!         .with_id(FieldMapping::new("id", "id", ColumnType::Integer)),
//! ])
//! .unwrap();
//!
//! let resolver = SchemaResolver::new(Arc::new(registry), Dialect::Postgres);
//! let car = resolver.resolve("Car").unwrap();
//! let model = resolver.traverse(&car, "Model", None).unwrap();
//!
//! assert_eq!(resolver.table(&car), "car car");
//! assert_eq!(resolver.alias(&model), "car_model");
//! assert_eq!(resolver.join(&car, "Model").unwrap(), "car_model.id = car.model_id");
//! assert_eq!(
//!     resolver.columns(&car, &ColumnSelection::all()),
//!     "car.id AS car_id, car.name AS car_name, car.model_id AS car_model_id"
//! );
//! ```

pub mod alias;
pub mod context;
pub mod denormalize;
pub mod mapper;
pub mod resolver;
pub mod selection;

pub use alias::{AliasNode, KeyMetadata, normalize};
pub use context::Context;
pub use denormalize::{Denormalizer, SerdeDenormalizer};
pub use mapper::RowMapper;
pub use resolver::SchemaResolver;
pub use selection::ColumnSelection;
