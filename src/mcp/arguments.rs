//! Deferred validation of tool arguments.
//!
//! Tool inputs deserialize through [`LenientInput`], which never fails at
//! the protocol layer: a missing or ill-typed argument is captured as a
//! message and later collapses into the textual "Error ..." envelope the
//! same way a driver fault does. The advertised JSON schema is the inner
//! type's schema, unchanged.

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;

pub struct LenientInput<T>(Result<T, String>);

impl<T> LenientInput<T> {
    /// The validated input, or the argument fault message.
    pub fn into_result(self) -> Result<T, String> {
        self.0
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for LenientInput<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self(
            serde_json::from_value(value).map_err(|e| e.to_string()),
        ))
    }
}

impl<T: JsonSchema> JsonSchema for LenientInput<T> {
    fn schema_name() -> Cow<'static, str> {
        T::schema_name()
    }

    fn schema_id() -> Cow<'static, str> {
        T::schema_id()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        T::json_schema(generator)
    }
}
