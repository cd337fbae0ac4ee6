use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared result type of a node.
///
/// `Unknown` marks a type that is only partially known on the client; such
/// nodes are candidates for a server-side refinement round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Unknown,
    Any,
    None,
    Boolean,
    Int,
    Number,
    String,
    Timestamp,
    List(Box<Type>),
    Record(#[serde(with = "ordered_fields")] Vec<(String, Type)>),
    Function {
        #[serde(with = "ordered_fields")]
        inputs: Vec<(String, Type)>,
        output: Box<Type>,
    },
    Optional(Box<Type>),
}

impl Type {
    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn optional(inner: Type) -> Self {
        Type::Optional(Box::new(inner))
    }

    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Type)>) -> Self {
        Type::Record(fields.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    pub fn function(inputs: Vec<(String, Type)>, output: Type) -> Self {
        Type::Function {
            inputs,
            output: Box::new(output),
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function { .. })
    }

    /// True when any part of the type is still `Unknown`.
    pub fn is_partial(&self) -> bool {
        match self {
            Type::Unknown => true,
            Type::List(element) | Type::Optional(element) => element.is_partial(),
            Type::Record(fields) => fields.iter().any(|(_, t)| t.is_partial()),
            Type::Function { inputs, output } => {
                inputs.iter().any(|(_, t)| t.is_partial()) || output.is_partial()
            }
            _ => false,
        }
    }

    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::List(element) => Some(element),
            Type::Optional(inner) => inner.element(),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        match self {
            Type::Record(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, t)| t),
            Type::Optional(inner) => inner.field(name),
            _ => None,
        }
    }

    /// Strips one level of `Optional`.
    pub fn non_optional(&self) -> &Type {
        match self {
            Type::Optional(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unknown => write!(f, "unknown"),
            Type::Any => write!(f, "any"),
            Type::None => write!(f, "none"),
            Type::Boolean => write!(f, "boolean"),
            Type::Int => write!(f, "int"),
            Type::Number => write!(f, "number"),
            Type::String => write!(f, "string"),
            Type::Timestamp => write!(f, "timestamp"),
            Type::List(element) => write!(f, "list<{}>", element),
            Type::Record(fields) => {
                let items: Vec<String> = fields.iter().map(|(k, t)| format!("{}: {}", k, t)).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Type::Function { inputs, output } => {
                let items: Vec<String> = inputs.iter().map(|(k, t)| format!("{}: {}", k, t)).collect();
                write!(f, "({}) -> {}", items.join(", "), output)
            }
            Type::Optional(inner) => write!(f, "{}?", inner),
        }
    }
}

/// Record fields are serialized as a JSON object but kept ordered in memory.
mod ordered_fields {
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Type;

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(fields: &Vec<(String, Type)>, s: S) -> Result<S::Ok, S::Error> {
        let map: IndexMap<&str, &Type> = fields.iter().map(|(k, t)| (k.as_str(), t)).collect();
        map.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<(String, Type)>, D::Error> {
        let map = IndexMap::<String, Type>::deserialize(d)?;
        Ok(map.into_iter().collect())
    }
}

