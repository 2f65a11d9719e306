//! Argument schemas
//!
//! Each tool declares an ordered list of typed fields. The same schema is
//! rendered as JSON Schema for the model and used to validate the model's
//! arguments before `invoke` runs, so a tool body only ever sees well-typed
//! values.
//!
//! Validation is lenient in the ways a chat model needs: numeric strings are
//! accepted for integers, numbers are accepted for strings, and fields the
//! schema does not name are ignored.

use netops_network::parse_ipv4;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;

use crate::error::ToolError;

/// Valid 802.1Q VLAN ids
pub const VLAN_RANGE: RangeInclusive<i64> = 1..=4094;

/// Primitive type of an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    String,
    Integer,
    /// A string that must parse as a dotted-quad IPv4 address
    Ipv4,
}

impl ArgType {
    fn json_type(&self) -> &'static str {
        match self {
            ArgType::String | ArgType::Ipv4 => "string",
            ArgType::Integer => "integer",
        }
    }
}

/// One declared argument
#[derive(Debug, Clone, PartialEq)]
pub struct ArgField {
    pub name: String,
    pub ty: ArgType,
    pub required: bool,
    pub description: String,
    /// Inclusive bounds for integer fields
    pub range: Option<RangeInclusive<i64>>,
}

/// Ordered argument schema of a tool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgSchema {
    fields: Vec<ArgField>,
}

impl ArgSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, name: &str, ty: ArgType, description: &str) -> Self {
        self.field(name, ty, true, description)
    }

    pub fn optional(self, name: &str, ty: ArgType, description: &str) -> Self {
        self.field(name, ty, false, description)
    }

    /// Constrain the most recently added field to `range`
    pub fn with_range(mut self, range: RangeInclusive<i64>) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.range = Some(range);
        }
        self
    }

    fn field(mut self, name: &str, ty: ArgType, required: bool, description: &str) -> Self {
        self.fields.push(ArgField {
            name: name.to_string(),
            ty,
            required,
            description: description.to_string(),
            range: None,
        });
        self
    }

    pub fn fields(&self) -> &[ArgField] {
        &self.fields
    }

    /// JSON Schema object advertised to the model
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = json!({
                "type": field.ty.json_type(),
                "description": field.description,
            });
            if field.ty == ArgType::Ipv4 {
                prop["format"] = json!("ipv4");
            }
            if let Some(range) = &field.range {
                prop["minimum"] = json!(range.start());
                prop["maximum"] = json!(range.end());
            }
            properties.insert(field.name.clone(), prop);
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check `input` against the schema and produce typed arguments.
    ///
    /// `null` is treated as an empty object; any other non-object fails.
    pub fn validate(&self, input: &Value) -> Result<ToolArgs, ToolError> {
        let empty = Map::new();
        let object = match input {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(ToolError::invalid_argument(format!(
                    "arguments must be a JSON object, got {}",
                    type_name(other)
                )))
            }
        };

        let mut values = HashMap::with_capacity(self.fields.len());
        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(ToolError::invalid_argument(format!(
                            "missing required argument '{}'",
                            field.name
                        )));
                    }
                }
                Some(raw) => {
                    let value = coerce(field, raw)?;
                    values.insert(field.name.clone(), value);
                }
            }
        }

        Ok(ToolArgs { values })
    }
}

fn coerce(field: &ArgField, raw: &Value) -> Result<ArgValue, ToolError> {
    match field.ty {
        ArgType::String => match raw {
            Value::String(s) => Ok(ArgValue::Str(s.clone())),
            Value::Number(n) => Ok(ArgValue::Str(n.to_string())),
            other => Err(wrong_type(field, other)),
        },
        ArgType::Ipv4 => match raw {
            Value::String(s) => parse_ipv4(s).map(ArgValue::Ip).map_err(ToolError::from),
            other => Err(wrong_type(field, other)),
        },
        ArgType::Integer => {
            let n = match raw {
                Value::Number(n) => n.as_i64().or_else(|| integral(n.as_f64()?)),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| wrong_type(field, raw))?;

            if let Some(range) = &field.range {
                if !range.contains(&n) {
                    return Err(ToolError::invalid_argument(format!(
                        "argument '{}' must be between {} and {}, got {}",
                        field.name,
                        range.start(),
                        range.end(),
                        n
                    )));
                }
            }
            Ok(ArgValue::Int(n))
        }
    }
}

/// Floats with no fractional part, as models sometimes send `20.0`
fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f as i64)
}

fn wrong_type(field: &ArgField, raw: &Value) -> ToolError {
    ToolError::invalid_argument(format!(
        "argument '{}' must be {}, got {}",
        field.name,
        field.ty.json_type(),
        type_name(raw)
    ))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ArgValue {
    Str(String),
    Int(i64),
    Ip(Ipv4Addr),
}

/// Validated arguments handed to [`Tool::invoke`](crate::Tool::invoke)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: HashMap<String, ArgValue>,
}

impl ToolArgs {
    pub fn get_str(&self, name: &str) -> Result<&str, ToolError> {
        match self.values.get(name) {
            Some(ArgValue::Str(s)) => Ok(s),
            _ => Err(missing(name)),
        }
    }

    pub fn opt_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i64, ToolError> {
        match self.values.get(name) {
            Some(ArgValue::Int(n)) => Ok(*n),
            _ => Err(missing(name)),
        }
    }

    pub fn get_ipv4(&self, name: &str) -> Result<Ipv4Addr, ToolError> {
        match self.values.get(name) {
            Some(ArgValue::Ip(ip)) => Ok(*ip),
            _ => Err(missing(name)),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn missing(name: &str) -> ToolError {
    ToolError::invalid_argument(format!("missing required argument '{}'", name))
}
