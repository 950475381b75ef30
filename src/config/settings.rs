// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
//! Frozen settings instances and the process-wide publish-once holder.

use std::sync::OnceLock;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::coerce::{FromValue, Value};
use super::error::ConfigError;

/// Fully resolved settings for one schema, one value per field in schema
/// order. There is no way to change a value after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    schema: &'static str,
    values: Vec<(&'static str, Value)>,
}

impl Settings {
    pub(crate) fn freeze(schema: &'static str, values: Vec<(&'static str, Value)>) -> Self {
        Self { schema, values }
    }

    pub fn schema(&self) -> &'static str {
        self.schema
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    /// Typed copy of a field's value.
    pub fn get_as<T: FromValue>(&self, field: &str) -> Result<T, ConfigError> {
        let value = self.get(field).ok_or_else(|| ConfigError::InvalidSchema {
            schema: self.schema.to_string(),
            reason: format!("no field named {}", field),
        })?;
        T::from_value(value.clone()).ok_or_else(|| ConfigError::InvalidSchema {
            schema: self.schema.to_string(),
            reason: format!(
                "field {} holds a {} value, not {}",
                field,
                value.kind_name(),
                std::any::type_name::<T>()
            ),
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Assignment is always rejected once settings are frozen.
    pub fn set(&self, field: &str, _value: Value) -> Result<(), ConfigError> {
        Err(ConfigError::FrozenInstance {
            field: field.to_string(),
        })
    }
}

impl Serialize for Settings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Publish-once holder for process-wide settings.
///
/// The first `publish` stores the value; every later call fails with
/// `FrozenInstance` and leaves the published value untouched. Readers go
/// through `get` without locking.
#[derive(Debug)]
pub struct Frozen<T> {
    name: &'static str,
    cell: OnceLock<T>,
}

impl<T> Frozen<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            cell: OnceLock::new(),
        }
    }

    pub fn publish(&self, value: T) -> Result<&T, ConfigError> {
        let mut stored = false;
        let published = self.cell.get_or_init(|| {
            stored = true;
            value
        });
        if stored {
            Ok(published)
        } else {
            Err(ConfigError::FrozenInstance {
                field: self.name.to_string(),
            })
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_published(&self) -> bool {
        self.cell.get().is_some()
    }
}
