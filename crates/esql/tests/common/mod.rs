#![allow(dead_code)]

use esql::cli::session::Session;
use esql::Dialect;
use std::io::Write;
use tempfile::NamedTempFile;

pub const FLEET_JSON: &str = r#"{
    "types": [
        {
            "name": "Car",
            "table": "car",
            "fields": [
                {"name": "id", "type": "integer"},
                {"name": "name", "type": "string"},
                {"name": "color", "type": "string", "nullable": true},
                {"name": "price", "type": "integer"},
                {"name": "sold", "type": "boolean"}
            ],
            "identifiers": ["id"],
            "associations": [
                {"field": "model", "target": "Model", "kind": "many_to_one",
                 "joinColumns": [{"name": "model_id", "referencedColumn": "id"}]}
            ]
        },
        {
            "name": "Model",
            "table": "model",
            "fields": [
                {"name": "id", "type": "integer"},
                {"name": "name", "type": "string"}
            ],
            "identifiers": ["id"],
            "associations": [
                {"field": "cars", "target": "Car", "kind": "one_to_many", "mappedBy": "model"}
            ]
        }
    ]
}"#;

pub const FLEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<doctrine-mapping>
    <entity name="Car" table="car">
        <id name="id" type="integer"/>
        <field name="name" type="string"/>
        <field name="color" type="string" nullable="true"/>
        <field name="price" type="integer"/>
        <field name="sold" type="boolean"/>
        <many-to-one field="model" target-entity="Model">
            <join-column name="model_id" referenced-column-name="id"/>
        </many-to-one>
    </entity>
    <entity name="Model" table="model">
        <id name="id" type="integer"/>
        <field name="name" type="string"/>
        <one-to-many field="cars" target-entity="Car" mapped-by="model"/>
    </entity>
</doctrine-mapping>"#;

pub fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A session over the fleet mapping; the file handle must outlive the test
pub fn session(dialect: Dialect) -> (Session, NamedTempFile) {
    let file = write_temp(".json", FLEET_JSON);
    let session = Session::load(file.path().to_path_buf(), dialect).unwrap();
    (session, file)
}

/// Fresh output file path inside a temporary directory
pub fn output_path() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    (dir, path)
}
