//! Materialization
//!
//! Turns a [`Schema`] plus a [`RawConfig`] into an immutable [`ResolvedConfig`].
//! Every key is resolved independently:
//!
//! 1. take the raw value, or the default when the key is absent
//!    (a key with neither is a missing required key)
//! 2. convert it to the declared type
//! 3. run the key's validator
//!
//! Nothing short-circuits. If any key fails, every failure is returned in one
//! [`ValidationErrors`] and no config is produced.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write as _};
use std::sync::Arc;

use crate::error::{ErrorKind, KeyError, Result, SchemaError, ValidationErrors};
use crate::key::KeyDefinition;
use crate::raw::RawConfig;
use crate::schema::Schema;
use crate::value::{Password, RawValue, TypedValue, ValueType};

/// Resolve a single key against its raw value (if any)
pub fn resolve_key(
    key: &KeyDefinition,
    raw: Option<&RawValue>,
) -> std::result::Result<TypedValue, KeyError> {
    let reject = |kind: ErrorKind, reason: String| KeyError {
        key: key.name().to_string(),
        kind,
        reason,
    };

    match raw.filter(|value| !matches!(value, RawValue::Null)) {
        Some(raw) => {
            let typed = key
                .value_type()
                .coerce(raw)
                .map_err(|reason| reject(ErrorKind::TypeMismatch, reason))?;
            key.check(&typed)
                .map_err(|reason| reject(ErrorKind::ConstraintViolation, reason))?;
            Ok(typed)
        }
        // Defaults were validated when the key was built.
        None => key.default_value().cloned().ok_or_else(|| {
            reject(
                ErrorKind::MissingRequired,
                format!(
                    "Missing required configuration \"{}\" which has no default value.",
                    key.name()
                ),
            )
        }),
    }
}

/// Validate a raw config against a schema and build the typed config
pub fn materialize(
    schema: &Schema,
    raw: &RawConfig,
) -> std::result::Result<ResolvedConfig, ValidationErrors> {
    let mut entries = Vec::with_capacity(schema.len());
    let mut errors = Vec::new();

    for key in schema.keys() {
        match resolve_key(key, raw.get(key.name())) {
            Ok(value) => {
                tracing::debug!(key = key.name(), value = %value, "resolved configuration key");
                entries.push((key.name().to_string(), value));
            }
            Err(error) => {
                tracing::debug!(key = key.name(), reason = %error.reason, "rejected configuration key");
                errors.push(error);
            }
        }
    }

    if !errors.is_empty() {
        let errors = ValidationErrors::new(errors);
        tracing::warn!(failed_keys = errors.len(), "configuration rejected");
        return Err(errors);
    }

    let unused: Vec<String> = raw
        .keys()
        .filter(|name| !schema.contains(name))
        .map(String::from)
        .collect();
    for name in &unused {
        match suggest_key(schema, name) {
            Some(suggestion) => tracing::warn!(
                "configuration key '{}' is not defined by the schema; did you mean '{}'?",
                name,
                suggestion
            ),
            None => tracing::warn!("configuration key '{}' is not defined by the schema", name),
        }
    }

    let secrets = schema
        .keys()
        .iter()
        .filter(|key| key.value_type() == ValueType::Password)
        .map(|key| key.name().to_string())
        .collect();

    Ok(ResolvedConfig::new(entries, raw.clone(), secrets, unused))
}

/// Closest schema key for an unknown name
pub(crate) fn suggest_key<'a>(schema: &'a Schema, unknown: &str) -> Option<&'a str> {
    let matcher = SkimMatcherV2::default();
    schema
        .names()
        .filter_map(|name| matcher.fuzzy_match(name, unknown).map(|score| (score, name)))
        .max_by_key(|(score, _)| *score)
        .map(|(_, name)| name)
}

struct Resolved {
    entries: Vec<(String, TypedValue)>,
    index: HashMap<String, usize>,
    originals: RawConfig,
    /// Password keys, masked when the originals are printed
    secrets: HashSet<String>,
    unused: Vec<String>,
}

/// Raw entries with password keys masked
struct MaskedOriginals<'a>(&'a Resolved);

impl fmt::Debug for MaskedOriginals<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hidden = &Password::new(String::new());
        f.debug_map()
            .entries(self.0.originals.iter().map(|(name, value)| {
                let shown: &dyn fmt::Debug = if self.0.secrets.contains(name) {
                    hidden
                } else {
                    value
                };
                (name, shown)
            }))
            .finish()
    }
}

/// Immutable, typed view over a validated configuration.
///
/// Cloning is cheap and the config can be shared freely across threads.
#[derive(Clone)]
pub struct ResolvedConfig {
    inner: Arc<Resolved>,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("values", &self.inner.entries)
            .field("originals", &MaskedOriginals(&self.inner))
            .field("unused", &self.inner.unused)
            .finish()
    }
}

impl ResolvedConfig {
    fn new(
        entries: Vec<(String, TypedValue)>,
        originals: RawConfig,
        secrets: HashSet<String>,
        unused: Vec<String>,
    ) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        Self {
            inner: Arc::new(Resolved {
                entries,
                index,
                originals,
                secrets,
                unused,
            }),
        }
    }

    /// Get the typed value of a key
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.inner
            .index
            .get(name)
            .map(|&i| &self.inner.entries[i].1)
    }

    fn lookup(&self, name: &str) -> Result<&TypedValue> {
        self.get(name).ok_or_else(|| SchemaError::UnknownKey {
            name: name.to_string(),
        })
    }

    fn wrong_type(name: &str, actual: &TypedValue, requested: ValueType) -> SchemaError {
        SchemaError::WrongType {
            name: name.to_string(),
            actual: actual.value_type(),
            requested,
        }
    }

    pub fn get_string(&self, name: &str) -> Result<&str> {
        match self.lookup(name)? {
            TypedValue::String(s) => Ok(s),
            other => Err(Self::wrong_type(name, other, ValueType::String)),
        }
    }

    pub fn get_long(&self, name: &str) -> Result<i64> {
        match self.lookup(name)? {
            TypedValue::Long(i) => Ok(*i),
            other => Err(Self::wrong_type(name, other, ValueType::Long)),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i32> {
        match self.lookup(name)? {
            TypedValue::Int(i) => Ok(*i),
            other => Err(Self::wrong_type(name, other, ValueType::Int)),
        }
    }

    pub fn get_double(&self, name: &str) -> Result<f64> {
        match self.lookup(name)? {
            TypedValue::Double(f) => Ok(*f),
            other => Err(Self::wrong_type(name, other, ValueType::Double)),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        match self.lookup(name)? {
            TypedValue::Boolean(b) => Ok(*b),
            other => Err(Self::wrong_type(name, other, ValueType::Boolean)),
        }
    }

    pub fn get_list(&self, name: &str) -> Result<&[String]> {
        match self.lookup(name)? {
            TypedValue::List(items) => Ok(items),
            other => Err(Self::wrong_type(name, other, ValueType::List)),
        }
    }

    pub fn get_password(&self, name: &str) -> Result<&Password> {
        match self.lookup(name)? {
            TypedValue::Password(p) => Ok(p),
            other => Err(Self::wrong_type(name, other, ValueType::Password)),
        }
    }

    /// All resolved values in schema order
    pub fn values(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.inner.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The raw config this was resolved from
    pub fn originals(&self) -> &RawConfig {
        &self.inner.originals
    }

    /// Raw keys the schema does not define
    pub fn unused_keys(&self) -> &[String] {
        &self.inner.unused
    }

    /// Render every value, one per line, with passwords masked
    pub fn render_values(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.values() {
            let _ = writeln!(out, "\t{} = {}", name, value);
        }
        out
    }

    /// Log every value at INFO, with passwords masked
    pub fn log_values(&self, title: &str) {
        tracing::info!("{} values:\n{}", title, self.render_values());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Importance;
    use crate::validator::{Range, ValidString};

    fn schema() -> Schema {
        Schema::new()
            .define(
                KeyDefinition::builder("timeout", ValueType::Long)
                    .default_value(10000i64)
                    .validator(Range::at_least(100i64))
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .define(
                KeyDefinition::builder("mode", ValueType::String)
                    .default_value("SET")
                    .validator(ValidString::one_of(["SET", "PUBLISH"]))
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .define(
                KeyDefinition::builder("hosts", ValueType::List)
                    .importance(Importance::High)
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .define(
                KeyDefinition::builder("secret", ValueType::Password)
                    .default_value("")
                    .build()
                    .unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn test_missing_required_key() {
        let err = materialize(&schema(), &RawConfig::new()).unwrap_err();
        let error = err.get("hosts").unwrap();
        assert_eq!(error.kind, ErrorKind::MissingRequired);
        assert!(error.reason.contains("no default value"));
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn test_all_failures_are_reported() {
        let raw = RawConfig::new()
            .with("timeout", "fast")
            .with("mode", "DELETE");
        let err = materialize(&schema(), &raw).unwrap_err();

        assert_eq!(err.keys(), vec!["timeout", "mode", "hosts"]);
        assert_eq!(err.get("timeout").unwrap().kind, ErrorKind::TypeMismatch);
        assert!(err.get("timeout").unwrap().reason.contains("'fast'"));
        assert_eq!(err.get("mode").unwrap().kind, ErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_null_raw_value_uses_default() {
        let raw = RawConfig::new()
            .with("timeout", RawValue::Null)
            .with("hosts", RawValue::List(vec![]));
        let config = materialize(&schema(), &raw).unwrap();
        assert_eq!(config.get_long("timeout").unwrap(), 10000);
    }

    #[test]
    fn test_typed_getters() {
        let raw = RawConfig::new()
            .with("hosts", "")
            .with("secret", "hunter2")
            .with("timeout", 250i64);
        let config = materialize(&schema(), &raw).unwrap();

        assert_eq!(config.get_long("timeout").unwrap(), 250);
        assert_eq!(config.get_string("mode").unwrap(), "SET");
        assert!(config.get_list("hosts").unwrap().is_empty());
        assert_eq!(config.get_password("secret").unwrap().value(), "hunter2");

        assert!(matches!(
            config.get_int("timeout"),
            Err(SchemaError::WrongType { requested: ValueType::Int, .. })
        ));
        assert!(matches!(config.get_bool("nope"), Err(SchemaError::UnknownKey { .. })));
    }

    #[test]
    fn test_render_values_masks_passwords() {
        let raw = RawConfig::new().with("hosts", "").with("secret", "hunter2");
        let config = materialize(&schema(), &raw).unwrap();
        let rendered = config.render_values();
        assert!(rendered.contains("\tsecret = [hidden]"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_debug_masks_passwords() {
        let raw = RawConfig::new().with("hosts", "").with("secret", "hunter2");
        let config = materialize(&schema(), &raw).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"), "{}", debug);
        assert!(debug.contains("\"secret\": [hidden]"), "{}", debug);
        assert!(debug.contains("\"hosts\": String(\"\")"), "{}", debug);
    }

    #[test]
    fn test_password_type_mismatch_hides_the_value() {
        let raw = RawConfig::new()
            .with("hosts", "")
            .with("secret", vec!["hunter2"]);
        let err = materialize(&schema(), &raw).unwrap_err();
        assert_eq!(err.get("secret").unwrap().kind, ErrorKind::TypeMismatch);
        assert!(!err.to_string().contains("hunter2"), "{}", err);
    }

    #[test]
    fn test_unused_keys_and_suggestion() {
        let raw = RawConfig::new().with("hosts", "").with("tmeout", 5i64);
        let config = materialize(&schema(), &raw).unwrap();
        assert_eq!(config.unused_keys(), ["tmeout".to_string()]);
        assert_eq!(config.originals().get("tmeout"), Some(&RawValue::Integer(5)));
        assert_eq!(suggest_key(&schema(), "tmeout"), Some("timeout"));
        assert_eq!(suggest_key(&schema(), "zzz"), None);
    }

    #[test]
    fn test_resolved_config_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResolvedConfig>();
        assert_send_sync::<Schema>();
    }
}
