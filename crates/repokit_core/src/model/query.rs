//! Named-parameter query description.
//!
//! # Responsibility
//! - Carry a query template plus its named parameter values to a store
//!   adapter without knowing anything about the store.
//!
//! # Invariants
//! - The template is immutable after construction.
//! - Parameter keys are unique, non-blank and stored without a leading
//!   placeholder prefix (`:`, `@` or `$`).
//! - Parameters keep insertion order.
//! - Placeholder/parameter consistency is checked by the adapter, not here.

use crate::repo::{RepoError, RepoResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One bound value for a named query parameter.
///
/// There is no null variant: a parameter either has a value or is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Display for QueryValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "'{value}'"),
            Self::Blob(value) => write!(f, "<{} bytes>", value.len()),
        }
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for QueryValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

/// Query template plus named parameters.
///
/// How the template is interpreted is up to the repository receiving it: a
/// SQL adapter executes it as a statement with `:name` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQueryData")]
pub struct QueryData {
    query: String,
    parameters: IndexMap<String, QueryValue>,
}

#[derive(Deserialize)]
struct RawQueryData {
    query: String,
    #[serde(default)]
    parameters: IndexMap<String, QueryValue>,
}

impl TryFrom<RawQueryData> for QueryData {
    type Error = RepoError;

    fn try_from(value: RawQueryData) -> Result<Self, Self::Error> {
        Self::with_parameters(value.query, value.parameters)
    }
}

impl QueryData {
    /// Creates a query without parameters.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            parameters: IndexMap::new(),
        }
    }

    /// Creates a query with an initial parameter set.
    ///
    /// # Errors
    /// - Returns `InvalidArgument` when any key is blank.
    pub fn with_parameters<K, V, I>(query: impl Into<String>, parameters: I) -> RepoResult<Self>
    where
        K: AsRef<str>,
        V: Into<QueryValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut data = Self::new(query);
        data.add_parameters(parameters)?;
        Ok(data)
    }

    /// Adds one parameter, replacing any value already bound to `key`.
    ///
    /// # Errors
    /// - Returns `InvalidArgument` when `key` is blank.
    pub fn add_parameter(&mut self, key: &str, value: impl Into<QueryValue>) -> RepoResult<()> {
        let key = normalize_key(key)?;
        self.parameters.insert(key, value.into());
        Ok(())
    }

    /// Merges a set of parameters with the same overwrite rule as
    /// [`QueryData::add_parameter`].
    ///
    /// Keys are validated before anything is merged, so a failing call leaves
    /// the parameters untouched.
    pub fn add_parameters<K, V, I>(&mut self, parameters: I) -> RepoResult<()>
    where
        K: AsRef<str>,
        V: Into<QueryValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut staged = Vec::new();
        for (key, value) in parameters {
            staged.push((normalize_key(key.as_ref())?, value.into()));
        }
        self.parameters.extend(staged);
        Ok(())
    }

    /// Removes the parameter bound to `key`, returning its value if any.
    pub fn remove_parameter(&mut self, key: &str) -> Option<QueryValue> {
        self.parameters.shift_remove(strip_prefix(key))
    }

    /// Read-only view of the parameters in insertion order.
    pub fn parameters(&self) -> &IndexMap<String, QueryValue> {
        &self.parameters
    }

    /// Returns the value bound to `key`.
    pub fn parameter(&self, key: &str) -> Option<&QueryValue> {
        self.parameters.get(strip_prefix(key))
    }

    /// The query template.
    pub fn query(&self) -> &str {
        &self.query
    }
}

fn strip_prefix(key: &str) -> &str {
    key.trim().trim_start_matches([':', '@', '$'])
}

fn normalize_key(key: &str) -> RepoResult<String> {
    let stripped = strip_prefix(key);
    if stripped.is_empty() {
        return Err(RepoError::InvalidArgument(
            "query parameter key cannot be blank".to_string(),
        ));
    }
    Ok(stripped.to_string())
}
