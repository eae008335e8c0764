//! Validators
//!
//! A validator checks a single already-typed value and either accepts it or
//! returns a reason. Validators never see other keys, so every key of a schema
//! can be checked independently and all failures reported together.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

use crate::charset::Charset;
use crate::value::TypedValue;

/// Pass/fail check over one configuration value
pub trait Validator: Send + Sync + fmt::Debug {
    /// Accept the value or explain why it is rejected
    fn ensure_valid(&self, name: &str, value: &TypedValue) -> Result<(), String>;

    /// Short human description of the accepted values, used by introspection
    fn describe(&self) -> String;
}

/// Numeric bound, kept exact for integers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Integer(i64),
    Float(f64),
}

impl Bound {
    /// Compare a value against this bound; `None` when not comparable
    fn cmp_value(&self, value: &TypedValue) -> Option<std::cmp::Ordering> {
        match (self, value.as_i64()) {
            (Bound::Integer(b), Some(v)) => Some(v.cmp(b)),
            _ => {
                let v = value.as_f64()?;
                let b = match self {
                    Bound::Integer(b) => *b as f64,
                    Bound::Float(b) => *b,
                };
                v.partial_cmp(&b)
            }
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Integer(i) => write!(f, "{}", i),
            Bound::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<i64> for Bound {
    fn from(i: i64) -> Self {
        Bound::Integer(i)
    }
}

impl From<i32> for Bound {
    fn from(i: i32) -> Self {
        Bound::Integer(i64::from(i))
    }
}

impl From<f64> for Bound {
    fn from(f: f64) -> Self {
        Bound::Float(f)
    }
}

/// Inclusive numeric range
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    min: Option<Bound>,
    max: Option<Bound>,
}

impl Range {
    /// Accept any number `>= min`
    pub fn at_least(min: impl Into<Bound>) -> Self {
        Self {
            min: Some(min.into()),
            max: None,
        }
    }

    /// Accept any number in `[min, max]`
    pub fn between(min: impl Into<Bound>, max: impl Into<Bound>) -> Self {
        Self {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }
}

impl Validator for Range {
    fn ensure_valid(&self, _name: &str, value: &TypedValue) -> Result<(), String> {
        use std::cmp::Ordering;

        if let Some(min) = &self.min {
            match min.cmp_value(value) {
                Some(Ordering::Less) => return Err(format!("Value must be at least {}", min)),
                None => return Err(format!("Value {} is not a number", value)),
                _ => {}
            }
        }
        if let Some(max) = &self.max {
            match max.cmp_value(value) {
                Some(Ordering::Greater) => return Err(format!("Value must be no more than {}", max)),
                None => return Err(format!("Value {} is not a number", value)),
                _ => {}
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => format!("[{},...,{}]", min, max),
            (Some(min), None) => format!("[{},...]", min),
            (None, Some(max)) => format!("[...,{}]", max),
            (None, None) => "[...]".to_string(),
        }
    }
}

/// Case-sensitive membership in a fixed set of strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidString {
    allowed: Vec<String>,
}

impl ValidString {
    pub fn one_of<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl Validator for ValidString {
    fn ensure_valid(&self, _name: &str, value: &TypedValue) -> Result<(), String> {
        match value.as_str() {
            Some(s) if self.allowed.iter().any(|a| a == s) => Ok(()),
            _ => Err(format!(
                "Invalid value '{}'. String must be one of: {}",
                value,
                self.allowed.join(", ")
            )),
        }
    }

    fn describe(&self) -> String {
        format!("[{}]", self.allowed.join(", "))
    }
}

/// Each list element must belong to a fixed set of strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidList {
    inner: ValidString,
}

impl ValidList {
    pub fn any_of<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: ValidString::one_of(allowed),
        }
    }
}

impl Validator for ValidList {
    fn ensure_valid(&self, name: &str, value: &TypedValue) -> Result<(), String> {
        let items = value
            .as_list()
            .ok_or_else(|| format!("Value {} is not a list", value))?;
        for item in items {
            self.inner
                .ensure_valid(name, &TypedValue::String(item.clone()))?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

/// The value must name a charset known to the registry
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidCharset;

impl Validator for ValidCharset {
    fn ensure_valid(&self, _name: &str, value: &TypedValue) -> Result<(), String> {
        match value.as_str() {
            Some(s) if Charset::is_supported(s) => Ok(()),
            _ => Err(format!("Charset '{}' is not supported", value)),
        }
    }

    fn describe(&self) -> String {
        "Valid values are charsets known to the encoding registry".to_string()
    }
}

/// The string must not be empty
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyString;

impl Validator for NonEmptyString {
    fn ensure_valid(&self, _name: &str, value: &TypedValue) -> Result<(), String> {
        match value.as_str() {
            Some(s) if !s.is_empty() => Ok(()),
            _ => Err("String must be non-empty".to_string()),
        }
    }

    fn describe(&self) -> String {
        "non-empty string".to_string()
    }
}

/// The whole string must match a regular expression
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile an anchored pattern
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self { regex })
    }
}

impl Validator for Pattern {
    fn ensure_valid(&self, _name: &str, value: &TypedValue) -> Result<(), String> {
        let matches = match value {
            TypedValue::String(s) => self.regex.is_match(s),
            TypedValue::List(items) => items.iter().all(|i| self.regex.is_match(i)),
            _ => false,
        };
        if matches {
            Ok(())
        } else {
            Err(format!("Value '{}' must match pattern {}", value, self.regex.as_str()))
        }
    }

    fn describe(&self) -> String {
        format!("matches {}", self.regex.as_str())
    }
}

type CheckFn = dyn Fn(&TypedValue) -> Result<(), String> + Send + Sync;

/// User-supplied check
pub struct Predicate {
    description: String,
    check: Box<CheckFn>,
}

impl Predicate {
    pub fn new<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&TypedValue) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            check: Box::new(check),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Validator for Predicate {
    fn ensure_valid(&self, _name: &str, value: &TypedValue) -> Result<(), String> {
        (self.check)(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// All validators must pass; the first rejection is reported
#[derive(Debug, Clone)]
pub struct Composite {
    validators: Vec<Arc<dyn Validator>>,
}

impl Composite {
    pub fn and(validators: Vec<Arc<dyn Validator>>) -> Self {
        Self { validators }
    }
}

impl Validator for Composite {
    fn ensure_valid(&self, name: &str, value: &TypedValue) -> Result<(), String> {
        self.validators
            .iter()
            .try_for_each(|v| v.ensure_valid(name, value))
    }

    fn describe(&self) -> String {
        self.validators
            .iter()
            .map(|v| v.describe())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
