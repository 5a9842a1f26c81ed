//! Scope-restricted catalog fingerprints.
//!
//! A fingerprint covers exactly the objects a plan touches: the canonical
//! snapshots of every resolvable identity in the plan scope, sorted by stable
//! identifier, encoded as canonical JSON and hashed with SHA-256. Nothing
//! time- or order-dependent participates, so equal catalogs always produce
//! equal digests. Numbers are encoded as decimal strings to keep the digest
//! stable across implementations without 64-bit integers.

use std::collections::BTreeSet;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::catalog::id::ObjectId;
use crate::catalog::Catalog;
use crate::change::{Change, ChangeKind};

/// Collects the plan scope: every identity a change creates, requires or
/// drops, plus each change's primary target. Virtual identities collapse to
/// the object they decorate; column identities collapse to their table.
pub fn collect_scope<'a, I>(changes: I) -> BTreeSet<ObjectId>
where
    I: IntoIterator<Item = &'a Change>,
{
    let mut scope = BTreeSet::new();
    for change in changes {
        for id in change
            .creates()
            .into_iter()
            .chain(change.requires())
            .chain(change.drops())
            .chain(std::iter::once(change.target()))
        {
            add_scope_id(&mut scope, id);
        }
    }
    scope
}

fn add_scope_id(scope: &mut BTreeSet<ObjectId>, id: ObjectId) {
    match id {
        ObjectId::Unknown { .. } => {}
        ObjectId::Comment { object } | ObjectId::Acl { object, .. } => {
            add_scope_id(scope, *object);
        }
        ObjectId::Membership { role, member } => {
            scope.insert(ObjectId::Role { name: role });
            scope.insert(ObjectId::Role { name: member });
        }
        ObjectId::DefaultAcl { grantor, .. } => {
            scope.insert(ObjectId::Role { name: grantor });
        }
        ObjectId::Column { .. } => {
            scope.insert(id.owning_object());
        }
        other => {
            scope.insert(other);
        }
    }
}

/// Canonical JSON: object keys sorted (the Value representation already keeps
/// them sorted), arrays in place, and every number rendered as a quoted
/// decimal string.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            out.push('"');
            out.push_str(&n.to_string());
            out.push('"');
        }
        Value::String(_) => out.push_str(&value.to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

/// SHA-256 hex digest of the catalog restricted to `scope`. Identities that
/// do not resolve in this catalog simply do not participate.
pub fn fingerprint_scope(catalog: &Catalog, scope: &BTreeSet<ObjectId>) -> String {
    let mut pairs: Vec<(String, Value)> = scope
        .iter()
        .filter_map(|id| {
            catalog
                .lookup_snapshot(id)
                .map(|snapshot| (id.to_string(), snapshot))
        })
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut encoded = String::from("[");
    for (i, (id, snapshot)) in pairs.iter().enumerate() {
        if i > 0 {
            encoded.push(',');
        }
        encoded.push('[');
        encoded.push_str(&Value::String(id.clone()).to_string());
        encoded.push(',');
        write_canonical(snapshot, &mut encoded);
        encoded.push(']');
    }
    encoded.push(']');

    let digest = Sha256::digest(encoded.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::table::{Column, Table};

    fn scope_for(table: &Table) -> BTreeSet<ObjectId> {
        use crate::catalog::CatalogEntity;
        [table.id()].into_iter().collect()
    }

    fn users(data_type: &str) -> Table {
        Table::new("public", "users", "postgres", vec![Column::new("id", 1, data_type)])
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let mut a = Catalog::empty();
        a.insert(users("bigint"));
        let mut b = Catalog::empty();
        b.insert(users("bigint"));

        let scope = scope_for(&users("bigint"));
        assert_eq!(fingerprint_scope(&a, &scope), fingerprint_scope(&b, &scope));
    }

    #[test]
    fn test_fingerprint_changes_with_data_fields() {
        let mut a = Catalog::empty();
        a.insert(users("bigint"));
        let mut b = Catalog::empty();
        b.insert(users("integer"));

        let scope = scope_for(&users("bigint"));
        assert_ne!(fingerprint_scope(&a, &scope), fingerprint_scope(&b, &scope));
    }

    #[test]
    fn test_out_of_scope_objects_do_not_participate() {
        let mut a = Catalog::empty();
        a.insert(users("bigint"));
        let mut b = Catalog::empty();
        b.insert(users("bigint"));
        b.insert(Table::new(
            "public",
            "audit_log",
            "postgres",
            vec![Column::new("id", 1, "bigint")],
        ));

        let scope = scope_for(&users("bigint"));
        assert_eq!(fingerprint_scope(&a, &scope), fingerprint_scope(&b, &scope));
    }

    #[test]
    fn test_canonical_numbers_are_strings() {
        let mut out = String::new();
        write_canonical(
            &serde_json::json!({"max": 9223372036854775807i64, "pi": 3.5}),
            &mut out,
        );
        assert_eq!(out, "{\"max\":\"9223372036854775807\",\"pi\":\"3.5\"}");
    }
}
