//! Recommenders
//!
//! Tooling-only suggestions of valid values for a key. They are consulted by
//! [`Schema::validate_for_tooling`](crate::schema::Schema::validate_for_tooling)
//! and never take part in the pass/fail decision of materialization.

use std::collections::BTreeMap;
use std::fmt;

use crate::charset::Charset;
use crate::value::TypedValue;

/// Values that resolved successfully so far, keyed by name
pub type ResolvedValues = BTreeMap<String, TypedValue>;

/// Suggests valid values for a key given the rest of the resolved config
pub trait Recommender: Send + Sync + fmt::Debug {
    fn valid_values(&self, name: &str, resolved: &ResolvedValues) -> Vec<TypedValue>;

    /// Whether the key is relevant given the other values
    fn visible(&self, _name: &str, _resolved: &ResolvedValues) -> bool {
        true
    }
}

/// Recommends every charset in the registry
#[derive(Debug, Clone, Copy, Default)]
pub struct CharsetRecommender;

impl Recommender for CharsetRecommender {
    fn valid_values(&self, _name: &str, _resolved: &ResolvedValues) -> Vec<TypedValue> {
        Charset::available()
            .iter()
            .map(|name| TypedValue::String(name.to_string()))
            .collect()
    }
}

/// Recommends a fixed list of strings
#[derive(Debug, Clone)]
pub struct EnumRecommender {
    values: Vec<String>,
}

impl EnumRecommender {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Recommender for EnumRecommender {
    fn valid_values(&self, _name: &str, _resolved: &ResolvedValues) -> Vec<TypedValue> {
        self.values.iter().cloned().map(TypedValue::String).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_recommender_lists_utf8() {
        let values = CharsetRecommender.valid_values("redis.charset", &ResolvedValues::new());
        assert!(values.contains(&TypedValue::String("UTF-8".into())));
    }
}
