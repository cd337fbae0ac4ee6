use std::{fmt, rc::Rc};

use indexmap::IndexMap;
use serde_json::{Map, Number, Value as Json};
use thiserror::Error;

use crate::graph::{node::Node, types::Type};

/// Literal value carried by a `Const` node or produced by the executor.
///
/// ## Sharing
///
/// Heap-backed variants use `Rc` so cloning a value out of a node is O(1).
/// Values are never mutated in place; the path setters below return a new
/// value that shares every untouched branch with the original.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of value.
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Rc<str>),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    List(Rc<Vec<Value>>),
    /// Ordered record (typed dict).
    Record(Rc<IndexMap<String, Value>>),
    /// Function literal whose body is itself a graph.
    Function(Rc<FunctionLiteral>),
}

/// A lambda: named, typed parameters and a body expression.
///
/// A zero-parameter function literal is how a whole graph is passed as a
/// value (for example the target of a mutation).
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub params: Vec<(String, Type)>,
    pub body: Node,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("expected {expected}, got {found}")]
    Mismatch { expected: Type, found: String },
    #[error("record is missing field `{field}`")]
    MissingField { field: String },
    #[error("invalid function body: {0}")]
    FunctionBody(String),
}

impl Value {
    pub fn string(value: impl AsRef<str>) -> Self {
        Value::String(Rc::from(value.as_ref()))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Rc::new(items.into_iter().collect()))
    }

    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Record(Rc::new(
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn function(params: Vec<(String, Type)>, body: Node) -> Self {
        Value::Function(Rc::new(FunctionLiteral { params, body }))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Returns the runtime type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Function(_) => "function",
        }
    }

    pub fn infer_type(&self) -> Type {
        match self {
            Value::None => Type::None,
            Value::Bool(_) => Type::Boolean,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Number,
            Value::String(_) => Type::String,
            Value::Timestamp(_) => Type::Timestamp,
            Value::List(items) => {
                let mut element = None;
                for item in items.iter() {
                    let ty = item.infer_type();
                    match &element {
                        None => element = Some(ty),
                        Some(existing) if *existing == ty => {}
                        Some(_) => {
                            element = Some(Type::Any);
                            break;
                        }
                    }
                }
                Type::list(element.unwrap_or(Type::Unknown))
            }
            Value::Record(fields) => {
                Type::Record(fields.iter().map(|(k, v)| (k.clone(), v.infer_type())).collect())
            }
            Value::Function(lit) => Type::function(lit.params.clone(), lit.body.ty().clone()),
        }
    }

    /// Checks the value against a declared type without coercing it.
    pub fn conforms_to(&self, ty: &Type) -> bool {
        match (ty, self) {
            (Type::Unknown | Type::Any, _) => true,
            (Type::Optional(_), Value::None) => true,
            (Type::Optional(inner), value) => value.conforms_to(inner),
            (Type::None, Value::None)
            | (Type::Boolean, Value::Bool(_))
            | (Type::Int, Value::Int(_))
            | (Type::Number, Value::Int(_) | Value::Float(_))
            | (Type::String, Value::String(_))
            | (Type::Timestamp, Value::Timestamp(_)) => true,
            (Type::List(element), Value::List(items)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            (Type::Record(fields), Value::Record(values)) => {
                fields.iter().all(|(name, field_ty)| match values.get(name) {
                    Some(value) => value.conforms_to(field_ty),
                    None => matches!(field_ty, Type::Optional(_) | Type::Any | Type::Unknown),
                })
            }
            (Type::Function { inputs, .. }, Value::Function(lit)) => {
                inputs.len() == lit.params.len()
            }
            _ => false,
        }
    }

    /// Decodes executor JSON against the declared type.
    ///
    /// Timestamps travel as plain millisecond numbers, so the declared type
    /// is the only thing that tells a timestamp from an int.
    pub fn from_json(json: &Json, ty: &Type) -> Result<Value, DecodeError> {
        let mismatch = || DecodeError::Mismatch {
            expected: ty.clone(),
            found: json_kind(json).to_string(),
        };
        match ty {
            Type::Unknown | Type::Any => Ok(Value::infer_json(json)),
            Type::Optional(inner) => match json {
                Json::Null => Ok(Value::None),
                other => Value::from_json(other, inner),
            },
            Type::None => match json {
                Json::Null => Ok(Value::None),
                _ => Err(mismatch()),
            },
            Type::Boolean => json.as_bool().map(Value::Bool).ok_or_else(mismatch),
            Type::Int => json.as_i64().map(Value::Int).ok_or_else(mismatch),
            Type::Number => match json.as_i64() {
                Some(v) => Ok(Value::Int(v)),
                None => json.as_f64().map(Value::Float).ok_or_else(mismatch),
            },
            Type::String => json.as_str().map(Value::string).ok_or_else(mismatch),
            Type::Timestamp => match json.as_i64() {
                Some(ms) => Ok(Value::Timestamp(ms)),
                None => json
                    .as_f64()
                    .map(|ms| Value::Timestamp(ms.round() as i64))
                    .ok_or_else(mismatch),
            },
            Type::List(element) => {
                let items = json.as_array().ok_or_else(mismatch)?;
                let items = items
                    .iter()
                    .map(|item| Value::from_json(item, element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(Rc::new(items)))
            }
            Type::Record(fields) => {
                let object = json.as_object().ok_or_else(mismatch)?;
                let mut out = IndexMap::with_capacity(object.len());
                for (name, field_ty) in fields {
                    match object.get(name) {
                        Some(field) => {
                            out.insert(name.clone(), Value::from_json(field, field_ty)?);
                        }
                        None if matches!(field_ty, Type::Optional(_)) => {
                            out.insert(name.clone(), Value::None);
                        }
                        None => {
                            return Err(DecodeError::MissingField {
                                field: name.clone(),
                            });
                        }
                    }
                }
                for (name, field) in object {
                    if !out.contains_key(name) {
                        out.insert(name.clone(), Value::infer_json(field));
                    }
                }
                Ok(Value::Record(Rc::new(out)))
            }
            Type::Function { inputs, .. } => {
                let body: Node = serde_json::from_value(json.clone())
                    .map_err(|e| DecodeError::FunctionBody(e.to_string()))?;
                Ok(Value::function(inputs.clone(), body))
            }
        }
    }

    fn infer_json(json: &Json) -> Value {
        match json {
            Json::Null => Value::None,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(v) => Value::Int(v),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::string(s),
            Json::Array(items) => Value::list(items.iter().map(Value::infer_json)),
            Json::Object(fields) => Value::Record(Rc::new(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::infer_json(v)))
                    .collect(),
            )),
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            Value::None => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(v) | Value::Timestamp(v) => Json::Number((*v).into()),
            Value::Float(v) => Number::from_f64(*v).map(Json::Number).unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.to_string()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Record(fields) => {
                let mut map = Map::with_capacity(fields.len());
                for (k, v) in fields.iter() {
                    map.insert(k.clone(), v.to_json());
                }
                Json::Object(map)
            }
            Value::Function(lit) => serde_json::to_value(&lit.body).unwrap_or(Json::Null),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Element at `index`; negative indices and out-of-range reads yield `None`.
    pub fn element(&self, index: i64) -> Option<&Value> {
        match self {
            Value::List(items) => usize::try_from(index).ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Returns a copy of this record with `name` replaced (or appended).
    pub fn with_field(&self, name: &str, value: Value) -> Option<Value> {
        match self {
            Value::Record(fields) => {
                let mut fields: IndexMap<String, Value> = (**fields).clone();
                fields.insert(name.to_string(), value);
                Some(Value::Record(Rc::new(fields)))
            }
            _ => None,
        }
    }

    /// Returns a copy of this list with the element at `index` replaced.
    pub fn with_element(&self, index: i64, value: Value) -> Option<Value> {
        match self {
            Value::List(items) => {
                let i = usize::try_from(index).ok().filter(|i| *i < items.len())?;
                let mut items: Vec<Value> = (**items).clone();
                items[i] = value;
                Some(Value::List(Rc::new(items)))
            }
            _ => None,
        }
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Timestamp(ms) => write!(f, "@{}", ms),
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Record(fields) => {
                let items: Vec<String> =
                    fields.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Value::Function(lit) => {
                let params: Vec<&str> = lit.params.iter().map(|(n, _)| n.as_str()).collect();
                write!(f, "({}) => {}", params.join(", "), lit.body)
            }
        }
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod value_test;
