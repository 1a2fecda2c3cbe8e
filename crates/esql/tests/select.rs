//! Composing statements and mapping their rows back

mod common;

use esql::{ColumnSelection, Dialect, SelectBuilder, SqlValue};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_select_with_join_filter_and_sort() {
    let (session, _file) = common::session(Dialect::Postgres);
    let resolver = session.resolver();
    let car = resolver.resolve("Car").unwrap();

    let query = SelectBuilder::new(resolver, car)
        .join("model")
        .unwrap()
        .filter("and(price.gt.100,or(color.is.null,sold.eq.false))")
        .sort("name.desc,color.nullslast")
        .build()
        .unwrap();

    assert_snapshot!(
        query.sql,
        @"SELECT car.id AS car_id, car.name AS car_name, car.color AS car_color, car.price AS car_price, car.sold AS car_sold, car.model_id AS car_model_id, car_model.name AS car_model_name FROM car car LEFT JOIN model car_model ON car_model.id = car.model_id WHERE car.price > :price_1 AND (car.color IS NULL OR car.sold = :sold_1) ORDER BY car.name desc, car.color IS NULL, car.color asc"
    );
    assert_eq!(
        query.parameters.into_iter().collect::<Vec<_>>(),
        vec![
            ("price_1".to_string(), SqlValue::Integer(100)),
            ("sold_1".to_string(), SqlValue::Bool(false)),
        ]
    );
}

#[test]
fn test_rows_of_a_joined_select_map_back() {
    let (session, _file) = common::session(Dialect::Postgres);
    let resolver = session.resolver();
    let car = resolver.resolve("Car").unwrap();
    let builder = SelectBuilder::new(resolver, car).join("model").unwrap();
    assert!(builder.build().is_ok());

    let rows = json!([
        {"car_id": 1, "car_name": "Caddy", "car_color": null, "car_price": 100,
         "car_sold": false, "car_model_id": 1, "car_model_name": "Volkswagen"},
        {"car_id": 2, "car_name": "Bike", "car_color": "red", "car_price": 5,
         "car_sold": true, "car_model_id": null, "car_model_name": null}
    ]);

    assert_eq!(
        resolver.map(builder.root(), &rows).unwrap(),
        json!([
            {"id": 1, "name": "Caddy", "color": null, "price": 100, "sold": false,
             "model": {"id": 1, "name": "Volkswagen"}},
            {"id": 2, "name": "Bike", "color": "red", "price": 5, "sold": true,
             "model": null}
        ])
    );
}

#[test]
fn test_inverse_side_join() {
    let (session, _file) = common::session(Dialect::Postgres);
    let resolver = session.resolver();
    let model = resolver.resolve("Model").unwrap();

    let query = SelectBuilder::new(resolver, model)
        .selection(ColumnSelection::fields(["id", "name"]))
        .join("cars")
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(
        query.sql,
        "SELECT model.id AS model_id, model.name AS model_name, model_cars.id AS model_cars_id, \
         model_cars.name AS model_cars_name FROM model model \
         LEFT JOIN car model_cars ON model_cars.model_id = model.id"
    );
}

#[test]
fn test_sqlite_binds_booleans_as_integers() {
    let (session, _file) = common::session(Dialect::Sqlite);
    let resolver = session.resolver();
    let car = resolver.resolve("Car").unwrap();

    let query = SelectBuilder::new(resolver, car)
        .filter("and(sold.eq.true)")
        .build()
        .unwrap();
    assert_eq!(query.parameters["sold_1"], SqlValue::Integer(1));
}
