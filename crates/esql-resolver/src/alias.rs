//! Alias registry
//!
//! Every occurrence of a type in a query gets an [`AliasNode`]. Roots are named
//! after the type, children after the relation field (or explicit alias) that
//! reached them, prefixed by the parent alias: `car`, `car_model`,
//! `car_model_maker`. Children are registered under their parent so flat row
//! keys can be routed back to the relation they came from.

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Lowercase a name and drop everything that is not alphanumeric
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One aliased occurrence of a type
pub struct AliasNode {
    raw: String,
    normalized: String,
    full: String,
    type_name: String,
    parent: Option<String>,
    relation: Option<String>,
    explicit: bool,
    children: Mutex<IndexMap<String, Arc<AliasNode>>>,
}

/// A flat row key split at its first two underscores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMetadata {
    /// Everything after the alias segment, or the whole key without one
    pub field: String,
    pub alias: Option<String>,
    /// Second segment as it appears in the key
    pub segment: Option<String>,
    /// Relation field the second segment is aliased to
    pub relation: Option<String>,
    /// Everything after the relation segment
    pub remainder: Option<String>,
}

impl KeyMetadata {
    /// Split `key`, naming the relation segment with `aliased_to`
    pub fn parse(key: &str, aliased_to: impl FnOnce(&str) -> String) -> Self {
        let Some((alias, rest)) = key.split_once('_') else {
            return Self {
                field: key.to_string(),
                alias: None,
                segment: None,
                relation: None,
                remainder: None,
            };
        };
        let (segment, relation, remainder) = match rest.split_once('_') {
            Some((segment, remainder)) => (
                Some(segment.to_string()),
                Some(aliased_to(segment)),
                Some(remainder.to_string()),
            ),
            None => (None, None, None),
        };
        Self {
            field: rest.to_string(),
            alias: Some(alias.to_string()),
            segment,
            relation,
            remainder,
        }
    }
}

impl AliasNode {
    /// Root node for a type; `raw` is usually the type's short name
    pub fn root(type_name: impl Into<String>, raw: impl Into<String>) -> Arc<Self> {
        let raw = raw.into();
        let normalized = normalize(&raw);
        Arc::new(Self {
            full: normalized.clone(),
            raw,
            normalized,
            type_name: type_name.into(),
            parent: None,
            relation: None,
            explicit: false,
            children: Mutex::new(IndexMap::new()),
        })
    }

    fn child(&self, key: String, raw: &str, type_name: &str, relation: Option<&str>, explicit: bool) -> Arc<Self> {
        Arc::new(Self {
            full: format!("{}_{key}", self.full),
            raw: raw.to_string(),
            normalized: key,
            type_name: type_name.to_string(),
            parent: Some(self.full.clone()),
            relation: relation.map(str::to_string),
            explicit,
            children: Mutex::new(IndexMap::new()),
        })
    }

    /// The name this node was created from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Full SQL alias, including every parent segment
    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Full alias of the parent node
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Association field on the parent this node was reached through
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Field name mapped rows use for this node: the explicit alias as
    /// given, otherwise the relation it was reached through
    pub fn aliased_name(&self) -> &str {
        match (&self.relation, self.explicit) {
            (Some(relation), false) => relation,
            _ => &self.raw,
        }
    }

    /// Registered child by normalized name
    pub fn get_child(&self, normalized: &str) -> Option<Arc<AliasNode>> {
        self.children.lock().get(normalized).cloned()
    }

    pub fn children(&self) -> Vec<Arc<AliasNode>> {
        self.children.lock().values().cloned().collect()
    }

    /// Child created by an unnamed traversal of `relation`
    pub fn claimed(&self, relation: &str) -> Option<Arc<AliasNode>> {
        self.children
            .lock()
            .values()
            .find(|child| !child.explicit && child.relation() == Some(relation))
            .cloned()
    }

    /// Claim the first relation in `candidates` no unnamed traversal has taken yet.
    ///
    /// Returns `None` when every candidate is already claimed.
    pub fn claim_relation(&self, candidates: &[&str], type_name: &str) -> Option<Arc<AliasNode>> {
        let mut children = self.children.lock();
        let relation = candidates.iter().copied().find(|field| {
            !children
                .values()
                .any(|child| !child.explicit && child.relation() == Some(*field))
        })?;
        let key = free_key(&children, &normalize(relation));
        let node = self.child(key.clone(), relation, type_name, Some(relation), false);
        children.insert(key, Arc::clone(&node));
        Some(node)
    }

    /// Register a child under an explicit alias.
    ///
    /// Requesting the same alias for the same type again returns the existing node.
    pub fn claim_named(&self, alias: &str, type_name: &str, relation: Option<&str>) -> Arc<AliasNode> {
        let mut children = self.children.lock();
        let base = normalize(alias);
        if let Some(existing) = children.get(&base) {
            if existing.type_name == type_name {
                return Arc::clone(existing);
            }
        }
        let key = free_key(&children, &base);
        let node = self.child(key.clone(), alias, type_name, relation, true);
        children.insert(key, Arc::clone(&node));
        node
    }

    /// Alias of the child standing for `relation`, or the one an unnamed
    /// traversal would allocate.
    ///
    /// Unnamed children take precedence over explicitly aliased ones.
    pub fn relation_alias(&self, relation: &str) -> String {
        let child = self.claimed(relation).or_else(|| {
            self.children
                .lock()
                .values()
                .find(|child| child.relation() == Some(relation))
                .cloned()
        });
        match child {
            Some(child) => child.full.clone(),
            None => format!("{}_{}", self.full, normalize(relation)),
        }
    }

    /// Field a child key stands for (see [`aliased_name`](Self::aliased_name)),
    /// or the key itself
    pub fn aliased_to(&self, key: &str) -> String {
        match self.children.lock().get(&normalize(key)) {
            Some(child) => child.aliased_name().to_string(),
            None => key.to_string(),
        }
    }

    /// Split a flat key into alias, relation and remainder segments.
    ///
    /// `car_model_name` gives alias `car`, field `model_name`, relation
    /// `aliased_to("model")` and remainder `name`.
    pub fn metadata(&self, key: &str) -> KeyMetadata {
        KeyMetadata::parse(key, |segment| self.aliased_to(segment))
    }
}

fn free_key(children: &IndexMap<String, Arc<AliasNode>>, base: &str) -> String {
    if !children.contains_key(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}{n}"))
        .find(|key| !children.contains_key(key))
        .unwrap_or_else(|| base.to_string())
}

impl fmt::Display for AliasNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl fmt::Debug for AliasNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliasNode")
            .field("full", &self.full)
            .field("type_name", &self.type_name)
            .field("relation", &self.relation)
            .field("explicit", &self.explicit)
            .field("children", &self.children.lock().keys().collect::<Vec<_>>())
            .finish()
    }
}
