#![allow(dead_code)]

use esql_resolver::SchemaResolver;
use esql_schema::{Association, FieldMapping, SchemaRegistry, SchemaType};
use esql_types::{ColumnType, Dialect};
use std::sync::Arc;

pub fn car() -> SchemaType {
    SchemaType::new("Car", "car")
        .with_id(FieldMapping::new("id", "id", ColumnType::Integer))
        .with_field(FieldMapping::new("name", "name", ColumnType::String))
        .with_field(FieldMapping::new("color", "color", ColumnType::String).nullable())
        .with_field(FieldMapping::new("price", "price", ColumnType::Integer))
        .with_field(FieldMapping::new("sold", "sold", ColumnType::Boolean))
        .with_association(Association::many_to_one("model", "Model").with_join_column("model_id", "id"))
}

pub fn model() -> SchemaType {
    SchemaType::new("Model", "model")
        .with_id(FieldMapping::new("id", "id", ColumnType::Integer))
        .with_field(FieldMapping::new("name", "name", ColumnType::String))
        .with_association(Association::one_to_many("cars", "Car", "model"))
}

pub fn category() -> SchemaType {
    SchemaType::new("Category", "category")
        .with_id(FieldMapping::new("identifier", "identifier", ColumnType::String))
        .with_field(FieldMapping::new("name", "name", ColumnType::String))
        .with_association(
            Association::many_to_one("parent", "Category").with_join_column("parent_id", "identifier"),
        )
        .with_association(Association::one_to_many("children", "Category", "parent"))
}

pub fn product() -> SchemaType {
    SchemaType::new("Product", "product")
        .with_id(FieldMapping::new("id", "id", ColumnType::Other("ulid".into())))
        .with_field(FieldMapping::new("name", "name", ColumnType::String))
        .with_field(FieldMapping::new("description", "description", ColumnType::String))
        .with_field(FieldMapping::new("gtin", "gtin", ColumnType::String))
        .with_association(
            Association::many_to_one("categoryRelation", "Category")
                .with_join_column("category_id", "identifier"),
        )
}

/// Output type for `Product` rows
pub fn product_dto() -> SchemaType {
    SchemaType::new("App\\Dto\\Product", "product")
        .with_id(FieldMapping::new("id", "id", ColumnType::Other("ulid".into())))
        .with_field(FieldMapping::new("name", "name", ColumnType::String))
}

pub fn aggregate_similar() -> SchemaType {
    SchemaType::new("AggregateSimilar", "aggregate_similar")
        .with_id(FieldMapping::new("id", "id", ColumnType::Integer))
        .with_association(
            Association::many_to_one("firstModel", "Model").with_join_column("first_model_id", "id"),
        )
        .with_association(
            Association::many_to_one("secondModel", "Model").with_join_column("second_model_id", "id"),
        )
}

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::from_types([
        car(),
        model(),
        category(),
        product(),
        product_dto(),
        aggregate_similar(),
    ])
    .unwrap()
}

pub fn resolver() -> SchemaResolver {
    resolver_for(Dialect::Postgres)
}

pub fn resolver_for(dialect: Dialect) -> SchemaResolver {
    SchemaResolver::new(Arc::new(registry()), dialect)
}
