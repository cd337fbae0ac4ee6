use sha2::{Digest, Sha256};

use crate::graph::{
    node::{Node, NodeKind},
    types::Type,
    value::Value,
};

/// SHA-256 of a node's full structure, type annotations included.
pub fn content_hash(node: &Node) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hash_node(&mut hasher, node);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

pub fn to_hex(bytes: &[u8; 32]) -> String {
    let mut out = String::with_capacity(64);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_type(hasher: &mut Sha256, ty: &Type) {
    // Types serialize deterministically (record fields keep their order).
    let encoded = serde_json::to_string(ty).unwrap_or_default();
    hash_str(hasher, &encoded);
}

fn hash_node(hasher: &mut Sha256, node: &Node) {
    hash_type(hasher, node.ty());
    match node.kind() {
        NodeKind::Void => hasher.update([0u8]),
        NodeKind::Const(value) => {
            hasher.update([1u8]);
            hash_value(hasher, value);
        }
        NodeKind::Var(name) => {
            hasher.update([2u8]);
            hash_str(hasher, name);
        }
        NodeKind::Output(call) => {
            hasher.update([3u8]);
            hash_str(hasher, &call.name);
            hasher.update((call.inputs.len() as u64).to_le_bytes());
            for (name, input) in &call.inputs {
                hash_str(hasher, name);
                hash_node(hasher, input);
            }
        }
    }
}

fn hash_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::None => hasher.update([0u8]),
        Value::Bool(b) => hasher.update([1u8, *b as u8]),
        Value::Int(v) => {
            hasher.update([2u8]);
            hasher.update(v.to_le_bytes());
        }
        Value::Float(v) => {
            hasher.update([3u8]);
            hasher.update(v.to_bits().to_le_bytes());
        }
        Value::String(s) => {
            hasher.update([4u8]);
            hash_str(hasher, s);
        }
        Value::Timestamp(ms) => {
            hasher.update([5u8]);
            hasher.update(ms.to_le_bytes());
        }
        Value::List(items) => {
            hasher.update([6u8]);
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items.iter() {
                hash_value(hasher, item);
            }
        }
        Value::Record(fields) => {
            hasher.update([7u8]);
            hasher.update((fields.len() as u64).to_le_bytes());
            for (name, field) in fields.iter() {
                hash_str(hasher, name);
                hash_value(hasher, field);
            }
        }
        Value::Function(lit) => {
            hasher.update([8u8]);
            hasher.update((lit.params.len() as u64).to_le_bytes());
            for (name, ty) in &lit.params {
                hash_str(hasher, name);
                hash_type(hasher, ty);
            }
            hash_node(hasher, &lit.body);
        }
    }
}
