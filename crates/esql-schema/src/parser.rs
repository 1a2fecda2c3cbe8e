//! Mapping document parser for JSON and Doctrine-style XML
//!
//! JSON documents are either a list of types or `{"types": [...]}`, each type
//! following the serde layout of [`SchemaType`]. XML documents follow the
//! Doctrine ORM mapping format:
//!
//! ```xml
//! <doctrine-mapping>
//!   <entity name="Car" table="car">
//!     <id name="id" type="integer"/>
//!     <field name="name" type="string"/>
//!     <many-to-one field="model" target-entity="Model">
//!       <join-column name="model_id" referenced-column-name="id"/>
//!     </many-to-one>
//!   </entity>
//! </doctrine-mapping>
//! ```

use crate::schema::{Association, AssociationKind, FieldMapping, JoinColumn, SchemaType};
use esql_types::ColumnType;
use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Deserialize;

/// Error type for mapping document parsing
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    AttrError(#[from] quick_xml::events::attributes::AttrError),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid mapping structure: {0}")]
    InvalidStructure(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Wrapped { types: Vec<SchemaType> },
    List(Vec<SchemaType>),
}

/// Parse a JSON mapping document
pub fn parse_json(json: &str) -> Result<Vec<SchemaType>, ParseError> {
    let types = match serde_json::from_str::<JsonDocument>(json)? {
        JsonDocument::Wrapped { types } | JsonDocument::List(types) => types,
    };
    types
        .into_iter()
        .map(|schema| {
            if schema.name.is_empty() {
                Err(ParseError::InvalidStructure("type without a name".to_string()))
            } else {
                Ok(schema.normalize())
            }
        })
        .collect()
}

/// Parse a Doctrine XML mapping document
pub fn parse_xml(xml: &str) -> Result<Vec<SchemaType>, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut state = XmlState::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let (tag, attrs) = element(&e)?;
                state.open(&tag, attrs)?;
            }
            Event::Empty(e) => {
                let (tag, attrs) = element(&e)?;
                state.open(&tag, attrs)?;
                state.close(&tag)?;
            }
            Event::End(e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                state.close(&tag)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(schema) = state.entity {
        return Err(ParseError::InvalidStructure(format!(
            "entity '{}' is not closed",
            schema.name
        )));
    }
    Ok(state.types)
}

fn element(e: &BytesStart<'_>) -> Result<(String, IndexMap<String, String>), ParseError> {
    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
    let mut attrs = IndexMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        attrs.insert(
            String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string(),
            String::from_utf8_lossy(&attr.value).to_string(),
        );
    }
    Ok((tag, attrs))
}

#[derive(Default)]
struct XmlState {
    types: Vec<SchemaType>,
    entity: Option<SchemaType>,
    association: Option<Association>,
    in_join_table: bool,
}

impl XmlState {
    fn open(&mut self, tag: &str, mut attrs: IndexMap<String, String>) -> Result<(), ParseError> {
        match tag {
            "entity" => {
                let name = required(&mut attrs, "name", tag)?;
                let mut schema = SchemaType::new(name, attrs.swap_remove("table").unwrap_or_default());
                schema.schema = attrs.swap_remove("schema");
                self.entity = Some(schema);
            }
            "id" | "field" => {
                let schema = self.entity_mut(tag)?;
                let name = required(&mut attrs, "name", tag)?;
                let field = FieldMapping {
                    column: attrs.swap_remove("column").unwrap_or_else(|| name.clone()),
                    column_type: attrs
                        .swap_remove("type")
                        .map(ColumnType::from)
                        .unwrap_or_default(),
                    nullable: attrs.get("nullable").is_some_and(|v| v == "true"),
                    name,
                };
                if tag == "id" {
                    schema.identifiers.push(field.name.clone());
                }
                schema.fields.push(field);
            }
            "many-to-one" | "one-to-one" | "one-to-many" | "many-to-many" => {
                self.entity_mut(tag)?;
                let kind = match tag {
                    "many-to-one" => AssociationKind::ManyToOne,
                    "one-to-one" => AssociationKind::OneToOne,
                    "one-to-many" => AssociationKind::OneToMany,
                    _ => AssociationKind::ManyToMany,
                };
                let mut association = Association::new(
                    required(&mut attrs, "field", tag)?,
                    required(&mut attrs, "target-entity", tag)?,
                    kind,
                );
                association.mapped_by = attrs.swap_remove("mapped-by");
                self.association = Some(association);
            }
            "join-table" => self.in_join_table = true,
            "join-column" if !self.in_join_table => {
                let name = required(&mut attrs, "name", tag)?;
                let referenced = attrs
                    .swap_remove("referenced-column-name")
                    .unwrap_or_else(|| "id".to_string());
                let association = self.association.as_mut().ok_or_else(|| {
                    ParseError::InvalidStructure("join-column outside of an association".to_string())
                })?;
                association.join_columns.push(JoinColumn::new(name, referenced));
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, tag: &str) -> Result<(), ParseError> {
        match tag {
            "entity" => {
                if let Some(schema) = self.entity.take() {
                    self.types.push(schema.normalize());
                }
            }
            "many-to-one" | "one-to-one" | "one-to-many" | "many-to-many" => {
                if let Some(association) = self.association.take() {
                    self.entity_mut(tag)?.associations.push(association);
                }
            }
            "join-table" => self.in_join_table = false,
            _ => {}
        }
        Ok(())
    }

    fn entity_mut(&mut self, tag: &str) -> Result<&mut SchemaType, ParseError> {
        self.entity
            .as_mut()
            .ok_or_else(|| ParseError::InvalidStructure(format!("<{tag}> outside of an <entity>")))
    }
}

fn required(attrs: &mut IndexMap<String, String>, key: &str, tag: &str) -> Result<String, ParseError> {
    attrs
        .swap_remove(key)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ParseError::InvalidStructure(format!("<{tag}> requires a '{key}' attribute")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CATEGORY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <doctrine-mapping xmlns="http://doctrine-project.org/schemas/orm/doctrine-mapping">
            <entity name="Category" table="category">
                <id name="identifier" type="string" column="identifier"/>
                <field name="name" type="string"/>
                <one-to-many field="children" target-entity="Category" mapped-by="parent"/>
                <many-to-one field="parent" target-entity="Category" inversed-by="children">
                    <join-columns>
                        <join-column name="parent_id" referenced-column-name="identifier"/>
                    </join-columns>
                </many-to-one>
            </entity>
        </doctrine-mapping>"#;

    #[test]
    fn test_parse_doctrine_xml() {
        let types = parse_xml(CATEGORY_XML).unwrap();
        assert_eq!(types.len(), 1);

        let category = &types[0];
        assert_eq!(category.table, "category");
        assert_eq!(category.identifiers, vec!["identifier".to_string()]);
        assert_eq!(category.fields[1].column, "name");

        let children = category.association("children").unwrap();
        assert_eq!(children.kind, AssociationKind::OneToMany);
        assert_eq!(children.mapped_by.as_deref(), Some("parent"));
        assert!(children.join_columns.is_empty());

        let parent = category.association("parent").unwrap();
        assert_eq!(
            parent.join_columns,
            vec![JoinColumn::new("parent_id", "identifier")]
        );
    }

    #[test]
    fn test_join_table_columns_ignored() {
        let xml = r#"<doctrine-mapping>
            <entity name="Car">
                <id name="id" type="integer"/>
                <many-to-many field="owners" target-entity="Owner">
                    <join-table name="car_owner">
                        <join-columns><join-column name="car_id"/></join-columns>
                    </join-table>
                </many-to-many>
            </entity>
        </doctrine-mapping>"#;

        let types = parse_xml(xml).unwrap();
        assert_eq!(types[0].table, "Car");
        assert!(types[0].associations[0].join_columns.is_empty());
    }

    #[test]
    fn test_field_outside_entity() {
        let err = parse_xml(r#"<doctrine-mapping><field name="x"/></doctrine-mapping>"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidStructure(_)));
    }

    #[test]
    fn test_parse_json_list_and_wrapped() {
        let list = r#"[{"name": "Model", "fields": [{"name": "id", "type": "integer"}], "identifiers": ["id"]}]"#;
        let wrapped = r#"{"types": [{"name": "Model", "table": "Model", "fields": [{"name": "id", "column": "id", "type": "integer"}], "identifiers": ["id"]}]}"#;

        assert_eq!(parse_json(list).unwrap(), parse_json(wrapped).unwrap());
    }
}
