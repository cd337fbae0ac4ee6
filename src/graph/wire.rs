//! Executor wire format for nodes.
//!
//! ```json
//! {"nodeType": "output", "type": "int",
//!  "fromOp": {"name": "pick", "inputs": {
//!     "obj": {"nodeType": "const", "type": {"record": {"a": "int"}}, "val": {"a": 1}},
//!     "key": {"nodeType": "const", "type": "string", "val": "a"}}}}
//! ```
//!
//! `const` values are decoded against their declared `type`; a function
//! literal's `val` is its body node.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use serde_json::Value as Json;

use crate::graph::{
    node::{Node, NodeKind, OpCall},
    types::Type,
    value::Value,
};

#[derive(Serialize, Deserialize)]
#[serde(tag = "nodeType", rename_all = "lowercase")]
enum NodeRepr {
    Void {
        #[serde(rename = "type")]
        ty: Type,
    },
    Const {
        #[serde(rename = "type")]
        ty: Type,
        val: Json,
    },
    Var {
        #[serde(rename = "type")]
        ty: Type,
        #[serde(rename = "varName")]
        var_name: String,
    },
    Output {
        #[serde(rename = "type")]
        ty: Type,
        #[serde(rename = "fromOp")]
        from_op: OpRepr,
    },
}

#[derive(Serialize, Deserialize)]
struct OpRepr {
    name: String,
    inputs: IndexMap<String, Node>,
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ty = self.ty().clone();
        let repr = match self.kind() {
            NodeKind::Void => NodeRepr::Void { ty },
            NodeKind::Const(value) => NodeRepr::Const {
                ty,
                val: value.to_json(),
            },
            NodeKind::Var(name) => NodeRepr::Var {
                ty,
                var_name: name.to_string(),
            },
            NodeKind::Output(OpCall { name, inputs }) => NodeRepr::Output {
                ty,
                from_op: OpRepr {
                    name: name.to_string(),
                    inputs: inputs.clone(),
                },
            },
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match NodeRepr::deserialize(deserializer)? {
            NodeRepr::Void { ty } => Node::new(ty, NodeKind::Void),
            NodeRepr::Const { ty, val } => {
                let value = Value::from_json(&val, &ty).map_err(D::Error::custom)?;
                Node::constant(value, ty)
            }
            NodeRepr::Var { ty, var_name } => Node::var(&var_name, ty),
            NodeRepr::Output { ty, from_op } => Node::output(&from_op.name, ty, from_op.inputs),
        })
    }
}
