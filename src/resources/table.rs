//! Keyed data store declaration
//!
//! A table needs exactly one partition key, at most one sort key, and
//! positive capacity settings before it can be registered.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::attr::LogicalId;
use crate::error::{StackError, StackResult};

/// Key attribute types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    Text,
    Number,
    Binary,
}

impl KeyType {
    pub fn code(&self) -> &'static str {
        match self {
            KeyType::Text => "S",
            KeyType::Number => "N",
            KeyType::Binary => "B",
        }
    }
}

/// A named key attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySchema {
    pub name: String,
    pub key_type: KeyType,
}

impl KeySchema {
    pub fn new(name: impl Into<String>, key_type: KeyType) -> Self {
        Self {
            name: name.into(),
            key_type,
        }
    }

    fn to_json(&self) -> JsonValue {
        json!({ "name": self.name, "type": self.key_type.code() })
    }
}

/// Declaration of a keyed data store
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    table_name: Option<String>,
    partition_key: Option<KeySchema>,
    sort_key: Option<KeySchema>,
    read_capacity: u64,
    write_capacity: u64,
}

impl Table {
    /// New table declaration with default capacity 5/5
    pub fn new() -> Self {
        Self {
            table_name: None,
            partition_key: None,
            sort_key: None,
            read_capacity: 5,
            write_capacity: 5,
        }
    }

    /// Explicit physical table name; a name is synthesized when unset
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    pub fn partition_key(mut self, name: impl Into<String>, key_type: KeyType) -> Self {
        self.partition_key = Some(KeySchema::new(name, key_type));
        self
    }

    pub fn sort_key(mut self, name: impl Into<String>, key_type: KeyType) -> Self {
        self.sort_key = Some(KeySchema::new(name, key_type));
        self
    }

    pub fn read_capacity(mut self, units: u64) -> Self {
        self.read_capacity = units;
        self
    }

    pub fn write_capacity(mut self, units: u64) -> Self {
        self.write_capacity = units;
        self
    }

    pub fn explicit_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    /// Schema checks run at registration time
    pub(crate) fn validate(&self, id: &LogicalId) -> StackResult<()> {
        if self.partition_key.is_none() {
            return Err(StackError::InvalidTableSchema {
                id: id.clone(),
                reason: "partition key not declared".to_string(),
            });
        }
        if self.read_capacity == 0 || self.write_capacity == 0 {
            return Err(StackError::InvalidTableSchema {
                id: id.clone(),
                reason: "capacity settings must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn resolved_properties(&self, physical_name: &str) -> JsonMap<String, JsonValue> {
        let mut props = JsonMap::new();
        props.insert("tableName".to_string(), json!(physical_name));
        if let Some(pk) = &self.partition_key {
            props.insert("partitionKey".to_string(), pk.to_json());
        }
        if let Some(sk) = &self.sort_key {
            props.insert("sortKey".to_string(), sk.to_json());
        }
        props.insert("readCapacity".to_string(), json!(self.read_capacity));
        props.insert("writeCapacity".to_string(), json!(self.write_capacity));
        props
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}
