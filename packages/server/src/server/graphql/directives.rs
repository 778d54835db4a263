//! Field directive table.
//!
//! juniper has no custom field directives, so the schema's declarative
//! annotations live here, keyed by `(object, field)` with GraphQL names.

use std::collections::{HashMap, HashSet};

/// Directive marking a root field as callable without a credential
pub const SKIP_AUTH: &str = "skipAuth";

/// Root operation types of the schema
pub const ROOT_TYPES: [&str; 3] = ["Query", "Mutation", "Subscription"];

#[derive(Debug, Clone, Default)]
pub struct SchemaDirectives {
    root_types: HashSet<String>,
    fields: HashMap<(String, String), Vec<String>>,
}

impl SchemaDirectives {
    pub fn new<I, T>(root_types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            root_types: root_types.into_iter().map(Into::into).collect(),
            fields: HashMap::new(),
        }
    }

    /// Attach `directive` to `object.field`.
    pub fn directive(mut self, object: &str, field: &str, directive: &str) -> Self {
        let directives = self
            .fields
            .entry((object.to_string(), field.to_string()))
            .or_default();
        if !directives.iter().any(|d| d == directive) {
            directives.push(directive.to_string());
        }
        self
    }

    pub fn directives(&self, object: &str, field: &str) -> &[String] {
        self.fields
            .get(&(object.to_string(), field.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `object.field` carries any of `names`.
    pub fn has_any(&self, object: &str, field: &str, names: &[String]) -> bool {
        self.directives(object, field)
            .iter()
            .any(|directive| names.contains(directive))
    }

    pub fn is_root_type(&self, object: &str) -> bool {
        self.root_types.contains(object)
    }
}

/// Directives declared by this service's schema
pub fn schema_directives() -> SchemaDirectives {
    SchemaDirectives::new(ROOT_TYPES)
        .directive("Query", "login", SKIP_AUTH)
        .directive("Query", "serverInfo", SKIP_AUTH)
}
