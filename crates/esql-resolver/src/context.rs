//! Resolution context
//!
//! A [`Context`] ties a type's metadata to one alias occurrence. Contexts are
//! immutable values: traversing a relation produces a new context chained to
//! its parent instead of mutating the current one.

use crate::alias::AliasNode;
use esql_schema::{Association, SchemaType};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Context {
    schema: Arc<SchemaType>,
    effective: Arc<SchemaType>,
    node: Arc<AliasNode>,
    map_to: Option<String>,
    parent: Option<Arc<Context>>,
}

impl Context {
    pub(crate) fn new(
        schema: Arc<SchemaType>,
        effective: Arc<SchemaType>,
        node: Arc<AliasNode>,
        map_to: Option<String>,
        parent: Option<Arc<Context>>,
    ) -> Self {
        Self {
            schema,
            effective,
            node,
            map_to,
            parent,
        }
    }

    /// Metadata of the source type (the one stored in the table)
    pub fn schema(&self) -> &SchemaType {
        &self.schema
    }

    /// Metadata relations are looked up in: the map-to type when it is mapped,
    /// the source type otherwise
    pub fn effective_schema(&self) -> &SchemaType {
        &self.effective
    }

    pub(crate) fn effective_arc(&self) -> &Arc<SchemaType> {
        &self.effective
    }

    pub fn node(&self) -> &Arc<AliasNode> {
        &self.node
    }

    /// Full SQL alias
    pub fn alias(&self) -> &str {
        self.node.full()
    }

    pub fn type_name(&self) -> &str {
        &self.schema.name
    }

    /// Output type rows are mapped to, when it differs from the source type
    pub fn map_to(&self) -> Option<&str> {
        self.map_to.as_deref()
    }

    /// Name handed to a denormalizer
    pub fn output_type(&self) -> &str {
        self.map_to().unwrap_or_else(|| self.type_name())
    }

    pub fn parent(&self) -> Option<&Context> {
        self.parent.as_deref()
    }

    /// Association on the parent this context was reached through
    pub fn relation(&self) -> Option<&Association> {
        let field = self.node.relation()?;
        self.parent()?.effective_schema().association(field)
    }

    /// Number of traversals from the root
    pub fn depth(&self) -> usize {
        self.parent().map_or(0, |parent| parent.depth() + 1)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("type", &self.schema.name)
            .field("alias", &self.alias())
            .field("map_to", &self.map_to)
            .field("parent", &self.parent().map(Context::alias))
            .finish()
    }
}
