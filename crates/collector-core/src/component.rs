// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Component identity and lifecycle.
//!
//! Every pipeline stage is identified by a [`ComponentId`] made of a [`Type`]
//! and an optional name, rendered as `type` or `type/name`. The identifier is
//! what self-telemetry uses to attribute measurements to a stage instance.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{BoxError, Context};

const TYPE_PATTERN: &str = r"^[a-zA-Z][0-9a-zA-Z_]{0,62}$";
const NAME_PATTERN: &str = r"^[^\pZ\pC\pS]+$";
const NAME_MAX_LEN: usize = 1024;
const TYPE_NAME_SEPARATOR: char = '/';

/// Errors raised while building component identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    #[error("id must not be empty")]
    EmptyId,

    #[error("in \"{0}\" id: the part before / should not be empty")]
    EmptyType(String),

    #[error("in \"{0}\" id: the part after / should not be empty")]
    EmptyName(String),

    #[error("invalid character(s) in type \"{0}\"")]
    InvalidType(String),

    #[error("invalid character(s) in name \"{0}\"")]
    InvalidName(String),

    #[error("name \"{0}\" is longer than {max} characters", max = NAME_MAX_LEN)]
    NameTooLong(String),
}

fn type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(TYPE_PATTERN).expect("type pattern is valid"))
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(NAME_PATTERN).expect("name pattern is valid"))
}

/// Kind of a component, e.g. `batch` or `filter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Type(String);

impl Type {
    /// Validates and wraps a component type.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::InvalidType`] if the type does not start with
    /// an ASCII letter, contains characters other than ASCII alphanumerics and
    /// underscores, or is longer than 63 characters.
    pub fn new(ty: impl Into<String>) -> Result<Self, ComponentError> {
        let ty = ty.into();
        if ty.is_empty() {
            return Err(ComponentError::EmptyId);
        }
        if !type_regex().is_match(&ty) {
            return Err(ComponentError::InvalidType(ty));
        }
        Ok(Self(ty))
    }

    /// Like [`Type::new`] for types known to be valid at compile time.
    ///
    /// # Panics
    ///
    /// Panics if `ty` is not a valid type.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn must_new(ty: &str) -> Self {
        Self::new(ty).expect("invalid component type")
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of a component instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentId {
    ty: Type,
    name: String,
}

impl ComponentId {
    /// Identifier with no name part.
    #[must_use]
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            name: String::new(),
        }
    }

    /// Identifier rendered as `type/name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is empty, too long, or contains whitespace,
    /// control or symbol characters.
    pub fn with_name(ty: Type, name: impl Into<String>) -> Result<Self, ComponentError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { ty, name })
    }

    #[must_use]
    pub fn component_type(&self) -> &Type {
        &self.ty
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_name(name: &str) -> Result<(), ComponentError> {
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ComponentError::NameTooLong(name.to_string()));
    }
    if !name_regex().is_match(name) {
        return Err(ComponentError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "{}{}{}", self.ty, TYPE_NAME_SEPARATOR, self.name)
        }
    }
}

impl FromStr for ComponentId {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ComponentError::EmptyId);
        }

        match s.split_once(TYPE_NAME_SEPARATOR) {
            None => Ok(Self::new(Type::new(s)?)),
            Some((ty, name)) => {
                let ty = ty.trim();
                let name = name.trim();
                if ty.is_empty() {
                    return Err(ComponentError::EmptyType(s.to_string()));
                }
                if name.is_empty() {
                    return Err(ComponentError::EmptyName(s.to_string()));
                }
                Self::with_name(Type::new(ty)?, name)
            }
        }
    }
}

impl TryFrom<String> for ComponentId {
    type Error = ComponentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ComponentId> for String {
    fn from(id: ComponentId) -> Self {
        id.to_string()
    }
}

/// Information about the running binary, surfaced to components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub command: String,
    pub description: String,
    pub version: String,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            command: "collector".to_string(),
            description: "Telemetry pipeline".to_string(),
            version: "latest".to_string(),
        }
    }
}

/// Marker for component configuration values.
///
/// Configuration is opaque to helpers; only the component that defines it
/// interprets its fields.
pub trait Config: fmt::Debug + Send + Sync + 'static {
    /// Checks the configuration before the component is built.
    fn validate(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Services the running pipeline exposes to its components.
pub trait Host: Send + Sync {
    /// Looks up a running extension by id.
    fn get_extension(&self, _id: &ComponentId) -> Option<Arc<dyn Component>> {
        None
    }
}

/// Lifecycle every pipeline stage goes through.
///
/// `start` is called once before any data is delivered and `shutdown` once
/// after the last delivery. Errors are reported to the host unchanged.
#[async_trait]
pub trait Component: Send + Sync {
    async fn start(&self, ctx: &Context, host: &dyn Host) -> Result<(), BoxError>;

    async fn shutdown(&self, ctx: &Context) -> Result<(), BoxError>;
}

/// Test doubles for component lifecycle.
pub mod componenttest {
    use super::{Config, Host};

    /// Host with no extensions.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct NopHost;

    impl Host for NopHost {}

    /// Configuration with no fields.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct NopConfig;

    impl Config for NopConfig {}
}
