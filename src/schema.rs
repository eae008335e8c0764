//! Schemas and schema composition
//!
//! A [`Schema`] is an ordered set of [`KeyDefinition`]s with unique names.
//! Schemas compose by value: [`Schema::extend`] takes a base schema and a list of
//! additions and fails if any addition reuses a name, so a derived connector can
//! never silently redefine a key it inherited.

use serde::Serialize;
use std::collections::HashMap;

use crate::checksum::Checksum;
use crate::error::{Result, SchemaError};
use crate::key::{Importance, KeyDefinition};
use crate::materialize::resolve_key;
use crate::raw::RawConfig;
use crate::recommender::ResolvedValues;
use crate::value::{TypedValue, ValueType};

/// Ordered collection of key definitions
#[derive(Debug, Clone, Default)]
pub struct Schema {
    keys: Vec<KeyDefinition>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one key, failing on a name collision
    pub fn define(mut self, key: KeyDefinition) -> Result<Self> {
        if self.index.contains_key(key.name()) {
            return Err(SchemaError::DuplicateKey {
                name: key.name().to_string(),
            });
        }
        self.index.insert(key.name().to_string(), self.keys.len());
        self.keys.push(key);
        Ok(self)
    }

    /// Build a derived schema: base keys first, then additions in order.
    ///
    /// Fails with [`SchemaError::DuplicateKey`] if an addition collides with a
    /// base key or with an earlier addition. The base is left untouched.
    pub fn extend<I>(base: &Schema, additions: I) -> Result<Schema>
    where
        I: IntoIterator<Item = KeyDefinition>,
    {
        let mut derived = base.clone();
        for key in additions {
            derived = derived.define(key)?;
        }
        tracing::debug!(
            base_keys = base.len(),
            added_keys = derived.len() - base.len(),
            "extended schema"
        );
        Ok(derived)
    }

    /// Get a key definition by name
    pub fn get(&self, name: &str) -> Option<&KeyDefinition> {
        self.index.get(name).map(|&i| &self.keys[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All key definitions in declaration order
    pub fn keys(&self) -> &[KeyDefinition] {
        &self.keys
    }

    /// All key names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.name())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Read-only description of every key for documentation and UI tooling
    pub fn descriptors(&self) -> Vec<KeyDescriptor> {
        self.keys.iter().map(KeyDescriptor::from).collect()
    }

    /// Fingerprint of the descriptors; changes whenever any key changes
    pub fn fingerprint(&self) -> Result<Checksum> {
        Ok(Checksum::of(&self.descriptors())?)
    }

    /// Validate a raw config for interactive tooling.
    ///
    /// Unlike [`materialize`](crate::materialize::materialize) this never fails:
    /// each key reports its value (if it resolved), its errors, whether it is
    /// visible and the values its recommender suggests.
    pub fn validate_for_tooling(&self, raw: &RawConfig) -> Vec<ConfigValue> {
        let outcomes: Vec<_> = self
            .keys
            .iter()
            .map(|key| (key, resolve_key(key, raw.get(key.name()))))
            .collect();

        let resolved: ResolvedValues = outcomes
            .iter()
            .filter_map(|(key, outcome)| {
                outcome
                    .as_ref()
                    .ok()
                    .map(|value| (key.name().to_string(), value.clone()))
            })
            .collect();

        outcomes
            .into_iter()
            .map(|(key, outcome)| {
                let (value, errors) = match outcome {
                    Ok(value) => (Some(value), Vec::new()),
                    Err(error) => (None, vec![error.reason]),
                };
                let (recommended_values, visible) = match key.recommender() {
                    Some(r) => (
                        r.valid_values(key.name(), &resolved),
                        r.visible(key.name(), &resolved),
                    ),
                    None => (Vec::new(), true),
                };
                ConfigValue {
                    name: key.name().to_string(),
                    value,
                    recommended_values,
                    visible,
                    errors,
                }
            })
            .collect()
    }
}

/// Serializable description of one key
#[derive(Debug, Clone, Serialize)]
pub struct KeyDescriptor {
    pub name: String,
    pub value_type: ValueType,
    pub documentation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<TypedValue>,
    pub required: bool,
    pub importance: Importance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_in_group: Option<u32>,
    pub display_name: String,
}

impl From<&KeyDefinition> for KeyDescriptor {
    fn from(key: &KeyDefinition) -> Self {
        Self {
            name: key.name().to_string(),
            value_type: key.value_type(),
            documentation: key.documentation().to_string(),
            default_value: key.default_value().cloned(),
            required: !key.has_default(),
            importance: key.importance(),
            valid_values: key.validator().map(|v| v.describe()),
            group: key.group().map(String::from),
            order_in_group: key.order_in_group(),
            display_name: key.display_name().to_string(),
        }
    }
}

/// Per-key result of [`Schema::validate_for_tooling`]
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue {
    pub name: String,
    pub value: Option<TypedValue>,
    pub recommended_values: Vec<TypedValue>,
    pub visible: bool,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommender::EnumRecommender;
    use crate::validator::{Range, ValidString};

    fn key(name: &str) -> KeyDefinition {
        KeyDefinition::builder(name, ValueType::String)
            .default_value("x")
            .build()
            .unwrap()
    }

    fn base() -> Schema {
        Schema::new().define(key("a")).unwrap().define(key("b")).unwrap()
    }

    #[test]
    fn test_extend_preserves_order() {
        let derived = Schema::extend(&base(), vec![key("c"), key("d")]).unwrap();
        assert_eq!(derived.names().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
        assert_eq!(base().len(), 2);
    }

    #[test]
    fn test_extend_collision_fails_without_overwrite() {
        let base = Schema::new()
            .define(
                KeyDefinition::builder("a", ValueType::Long)
                    .default_value(1i64)
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let err = Schema::extend(&base, vec![key("c"), key("a")]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateKey { ref name } if name == "a"));
        assert_eq!(base.get("a").unwrap().value_type(), ValueType::Long);
        assert!(!base.contains("c"));
    }

    #[test]
    fn test_duplicate_within_additions_fails() {
        let err = Schema::extend(&Schema::new(), vec![key("x"), key("x")]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateKey { .. }));
    }

    #[test]
    fn test_descriptors_and_fingerprint() {
        let schema = Schema::new()
            .define(
                KeyDefinition::builder("mode", ValueType::String)
                    .documentation("write mode")
                    .default_value("SET")
                    .validator(ValidString::one_of(["SET", "PUBLISH"]))
                    .importance(Importance::Medium)
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let descriptors = schema.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].valid_values.as_deref(), Some("[SET, PUBLISH]"));
        assert!(!descriptors[0].required);

        let json = serde_json::to_value(&descriptors[0]).unwrap();
        assert_eq!(json["value_type"], "STRING");
        assert_eq!(json["importance"], "MEDIUM");
        assert_eq!(json["default_value"], "SET");

        let changed = Schema::extend(&schema, vec![key("other")]).unwrap();
        assert_ne!(schema.fingerprint().unwrap(), changed.fingerprint().unwrap());
    }

    #[test]
    fn test_validate_for_tooling_reports_without_failing() {
        let schema = Schema::new()
            .define(
                KeyDefinition::builder("timeout", ValueType::Long)
                    .default_value(1000i64)
                    .validator(Range::at_least(100i64))
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .define(
                KeyDefinition::builder("mode", ValueType::String)
                    .default_value("SET")
                    .recommender(EnumRecommender::new(["SET", "PUBLISH"]))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let raw = RawConfig::from_pairs([("timeout", 5i64)]);
        let values = schema.validate_for_tooling(&raw);

        assert_eq!(values[0].name, "timeout");
        assert!(values[0].value.is_none());
        assert_eq!(values[0].errors, vec!["Value must be at least 100".to_string()]);

        assert_eq!(values[1].value, Some(TypedValue::String("SET".into())));
        assert_eq!(values[1].recommended_values.len(), 2);
        assert!(values[1].visible);
    }
}
