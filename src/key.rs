//! Key definitions
//!
//! A [`KeyDefinition`] declares one configuration key: its name, type,
//! documentation, optional default, validator and recommender, and importance.
//! Definitions are built with [`KeyBuilder`] and immutable afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SchemaError};
use crate::recommender::Recommender;
use crate::validator::Validator;
use crate::value::{RawValue, TypedValue, ValueType};

/// How much an operator needs to care about a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Importance::High => "HIGH",
            Importance::Medium => "MEDIUM",
            Importance::Low => "LOW",
        };
        f.write_str(name)
    }
}

/// Declarative description of one configuration key
#[derive(Debug, Clone)]
pub struct KeyDefinition {
    name: String,
    value_type: ValueType,
    documentation: String,
    default_value: Option<TypedValue>,
    validator: Option<Arc<dyn Validator>>,
    recommender: Option<Arc<dyn Recommender>>,
    importance: Importance,
    group: Option<String>,
    order_in_group: Option<u32>,
    display_name: Option<String>,
}

impl KeyDefinition {
    /// Start defining a key
    pub fn builder(name: impl Into<String>, value_type: ValueType) -> KeyBuilder {
        KeyBuilder {
            name: name.into(),
            value_type,
            documentation: String::new(),
            default_value: None,
            validator: None,
            recommender: None,
            importance: Importance::Medium,
            group: None,
            order_in_group: None,
            display_name: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// The default, already converted to the key's type
    pub fn default_value(&self) -> Option<&TypedValue> {
        self.default_value.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    pub fn validator(&self) -> Option<&dyn Validator> {
        self.validator.as_deref()
    }

    pub fn recommender(&self) -> Option<&dyn Recommender> {
        self.recommender.as_deref()
    }

    pub fn importance(&self) -> Importance {
        self.importance
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn order_in_group(&self) -> Option<u32> {
        self.order_in_group
    }

    /// Display name, falling back to the key name
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Run the validator (if any) against a typed value
    pub fn check(&self, value: &TypedValue) -> std::result::Result<(), String> {
        match &self.validator {
            Some(validator) => validator.ensure_valid(&self.name, value),
            None => Ok(()),
        }
    }
}

/// Builder for [`KeyDefinition`]
pub struct KeyBuilder {
    name: String,
    value_type: ValueType,
    documentation: String,
    default_value: Option<RawValue>,
    validator: Option<Arc<dyn Validator>>,
    recommender: Option<Arc<dyn Recommender>>,
    importance: Importance,
    group: Option<String>,
    order_in_group: Option<u32>,
    display_name: Option<String>,
}

impl KeyBuilder {
    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<RawValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn recommender(mut self, recommender: impl Recommender + 'static) -> Self {
        self.recommender = Some(Arc::new(recommender));
        self
    }

    pub fn importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn order_in_group(mut self, order: u32) -> Self {
        self.order_in_group = Some(order);
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Finish the definition.
    ///
    /// The default value must convert to the declared type and satisfy the
    /// validator; a bad default is a definition error, not a user error.
    pub fn build(self) -> Result<KeyDefinition> {
        let default_value = match self.default_value {
            Some(raw) => {
                let typed = self.value_type.coerce(&raw).map_err(|reason| {
                    SchemaError::InvalidDefault {
                        name: self.name.clone(),
                        reason,
                    }
                })?;
                if let Some(validator) = &self.validator {
                    validator
                        .ensure_valid(&self.name, &typed)
                        .map_err(|reason| SchemaError::InvalidDefault {
                            name: self.name.clone(),
                            reason,
                        })?;
                }
                Some(typed)
            }
            None => None,
        };

        Ok(KeyDefinition {
            name: self.name,
            value_type: self.value_type,
            documentation: self.documentation,
            default_value,
            validator: self.validator,
            recommender: self.recommender,
            importance: self.importance,
            group: self.group,
            order_in_group: self.order_in_group,
            display_name: self.display_name,
        })
    }
}
