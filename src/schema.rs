//! The order of the named fields of each node kind, used to step from one field of a node to the
//! next when there is no list to step along.

use crate::log;
use crate::util::NavBug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DEFAULT_SCHEMA_RON: &str = include_str!("../data/slot_schema.ron");

/// The serialized form of a [`SlotSchema`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotSchemaSpec {
    /// Node kind, and the ordered names of the fields that hold its children.
    pub kinds: Vec<(String, Vec<String>)>,
}

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("In {file_name}{}: {message}", fmt_pos(.pos))]
    Ron {
        file_name: String,
        /// 0-indexed (row, col).
        pos: Option<(usize, usize)>,
        message: String,
    },
    #[error("Node kind '{0}' is listed twice")]
    DuplicateKind(String),
    #[error("Node kind '{0}' has no fields")]
    NoFields(String),
    #[error("Node kind '{0}' lists field '{1}' twice")]
    DuplicateField(String, String),
}

fn fmt_pos(pos: &Option<(usize, usize)>) -> String {
    match pos {
        Some((row, col)) => format!(" at {}:{}", row + 1, col + 1),
        None => String::new(),
    }
}

/// Maps node kinds to the order of their fields.
#[derive(Debug, Clone)]
pub struct SlotSchema {
    kinds: HashMap<String, Vec<String>>,
}

impl SlotSchema {
    pub fn from_spec(spec: SlotSchemaSpec) -> Result<SlotSchema, SchemaError> {
        let mut kinds = HashMap::new();
        for (kind, fields) in spec.kinds {
            if fields.is_empty() {
                return Err(SchemaError::NoFields(kind));
            }
            for (i, field) in fields.iter().enumerate() {
                if fields[..i].contains(field) {
                    return Err(SchemaError::DuplicateField(kind, field.clone()));
                }
            }
            if kinds.contains_key(&kind) {
                return Err(SchemaError::DuplicateKind(kind));
            }
            kinds.insert(kind, fields);
        }
        Ok(SlotSchema { kinds })
    }

    pub fn from_ron(file_name: &str, source: &str) -> Result<SlotSchema, SchemaError> {
        let spec = ron::from_str::<SlotSchemaSpec>(source).map_err(|err| {
            // Serde ron uses 1-indexed positions, with 0,0 as a sentinel value.
            let (row, col) = (err.position.line, err.position.col);
            let pos = if row == 0 || col == 0 {
                None
            } else {
                Some((row - 1, col - 1))
            };
            SchemaError::Ron {
                file_name: file_name.to_owned(),
                pos,
                message: format!("{}", err.code),
            }
        })?;
        let schema = SlotSchema::from_spec(spec)?;
        log!(Debug, "Loaded slot schema for {} node kinds from {}", schema.kinds.len(), file_name);
        Ok(schema)
    }

    /// A schema with no entries: every node kind falls back to plain document order.
    pub fn empty() -> SlotSchema {
        SlotSchema {
            kinds: HashMap::new(),
        }
    }

    /// The ordered fields of `kind`, if it has an entry.
    pub fn fields(&self, kind: &str) -> Option<&[String]> {
        self.kinds.get(kind).map(|fields| fields.as_slice())
    }

    /// The field after `field` in `kind`'s entry. `None` if `kind` has no entry, `field` isn't
    /// in it, or it is the last one.
    pub fn field_after(&self, kind: &str, field: &str) -> Option<&str> {
        let fields = self.fields(kind)?;
        let index = fields.iter().position(|f| f == field)?;
        fields.get(index + 1).map(String::as_str)
    }

    /// The field before `field` in `kind`'s entry. `None` if `kind` has no entry or `field`
    /// isn't in it.
    ///
    /// The first field wraps around to the last one.
    pub fn field_before(&self, kind: &str, field: &str) -> Option<&str> {
        let fields = self.fields(kind)?;
        let index = fields.iter().position(|f| f == field)?;
        let index = if index == 0 { fields.len() } else { index };
        Some(fields[index - 1].as_str())
    }
}

impl Default for SlotSchema {
    fn default() -> SlotSchema {
        SlotSchema::from_ron("data/slot_schema.ron", DEFAULT_SCHEMA_RON)
            .bug_msg("Invalid bundled slot schema")
    }
}
