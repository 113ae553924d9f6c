//! Namespaced handler identifiers.
//!
//! Handler ids are stable string identifiers of the form `namespace:path`
//! (e.g., `server:paper`). They are validated on construction and ordered
//! lexically so reports iterate in a stable order.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default namespace used when an id omits an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "server";

const MAX_NAMESPACE_LEN: usize = 64;
const MAX_PATH_LEN: usize = 128;

/// Error returned when parsing an invalid [`HandlerId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerIdError {
    /// Input was empty or whitespace.
    #[error("handler id cannot be empty")]
    Empty,
    /// Namespace segment was empty.
    #[error("handler id namespace cannot be empty")]
    EmptyNamespace,
    /// Path segment was empty.
    #[error("handler id path cannot be empty")]
    EmptyPath,
    /// Namespace exceeded the length limit.
    #[error("handler id namespace too long (max 64)")]
    NamespaceTooLong,
    /// Path exceeded the length limit.
    #[error("handler id path too long (max 128)")]
    PathTooLong,
    /// Namespace contained characters outside `a-z0-9_.-`.
    #[error("handler id namespace `{0}` has invalid characters (allowed: a-z0-9_.-)")]
    InvalidNamespace(String),
    /// Path contained characters outside `a-z0-9_./-`.
    #[error("handler id path `{0}` has invalid characters (allowed: a-z0-9_./-)")]
    InvalidPath(String),
}

/// A namespaced handler id of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId {
    namespace: String,
    path: String,
}

impl HandlerId {
    /// Parse a handler id.
    ///
    /// Accepts either:
    /// - `namespace:path`
    /// - `path` (uses [`DEFAULT_NAMESPACE`])
    pub fn parse(input: &str) -> Result<Self, HandlerIdError> {
        Self::parse_with_default_namespace(input, DEFAULT_NAMESPACE)
    }

    /// Parse a handler id using a caller-provided default namespace.
    pub fn parse_with_default_namespace(
        input: &str,
        default_namespace: &str,
    ) -> Result<Self, HandlerIdError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(HandlerIdError::Empty);
        }

        let (namespace, path) = match input.split_once(':') {
            Some((ns, p)) => (ns.trim(), p.trim()),
            None => (default_namespace, input),
        };

        validate_namespace(namespace)?;
        validate_path(path)?;

        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Handler id namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Handler id path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for HandlerId {
    type Err = HandlerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for HandlerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HandlerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn validate_namespace(ns: &str) -> Result<(), HandlerIdError> {
    if ns.is_empty() {
        return Err(HandlerIdError::EmptyNamespace);
    }
    if ns.len() > MAX_NAMESPACE_LEN {
        return Err(HandlerIdError::NamespaceTooLong);
    }
    if !ns
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
    {
        return Err(HandlerIdError::InvalidNamespace(ns.to_string()));
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<(), HandlerIdError> {
    if path.is_empty() {
        return Err(HandlerIdError::EmptyPath);
    }
    if path.len() > MAX_PATH_LEN {
        return Err(HandlerIdError::PathTooLong);
    }
    if !path
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'))
    {
        return Err(HandlerIdError::InvalidPath(path.to_string()));
    }
    Ok(())
}
