//! The typed catalog model.
//!
//! A [`Catalog`] is a passive snapshot of one database's schema, produced by an
//! external extractor and never mutated by the pipeline. Collections are maps
//! keyed by stable identity; nested lists (columns, privileges, enum labels)
//! are kept in extraction order and canonicalized by [`CatalogEntity::stable_snapshot`]
//! when they participate in fingerprints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod acl;
pub mod collation;
pub mod constraint;
pub mod custom_type;
pub mod domain;
pub mod event_trigger;
pub mod extension;
pub mod foreign;
pub mod id;
pub mod index;
pub mod language;
pub mod policy;
pub mod replication;
pub mod role;
pub mod routine;
pub mod rule;
pub mod schema;
pub mod sequence;
pub mod table;
pub mod trigger;
pub mod view;

use acl::DefaultPrivilegeState;
use id::ObjectId;

/// One pg_depend row, with OIDs already resolved to stable identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependRow {
    pub dependent: ObjectId,
    pub referenced: ObjectId,
    pub deptype: DepType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepType {
    #[serde(rename = "n")]
    Normal,
    #[serde(rename = "a")]
    Auto,
    #[serde(rename = "i")]
    Internal,
}

/// Implemented by every per-kind record.
pub trait CatalogEntity: Serialize {
    fn id(&self) -> ObjectId;

    /// Canonical projection used for change detection and fingerprinting:
    /// the serde image of the record with nested collections sorted
    /// (columns/attributes by position, privileges by grantee then privilege,
    /// enum labels by sort order). Object keys are already sorted by the JSON
    /// representation itself.
    fn stable_snapshot(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        canonicalize_collections(&mut value);
        value
    }
}

/// Recursively sorts the collection fields whose order is not semantic.
fn canonicalize_collections(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if let Value::Array(items) = child {
                    match key.as_str() {
                        "privileges" | "acl" => {
                            items.sort_by_key(|item| item.to_string());
                        }
                        "labels" => items.sort_by(|a, b| {
                            let order = |v: &Value| {
                                v.get("sort_order").and_then(Value::as_f64).unwrap_or(0.0)
                            };
                            order(a).total_cmp(&order(b))
                        }),
                        "columns" | "attributes" => items.sort_by_key(|item| {
                            item.get("position").and_then(Value::as_i64).unwrap_or(0)
                        }),
                        _ => {}
                    }
                }
                canonicalize_collections(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                canonicalize_collections(item);
            }
        }
        _ => {}
    }
}

/// A full schema snapshot of one database.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// PostgreSQL server version number, e.g. 150004
    pub version: u32,
    /// role of the extracting connection
    pub current_user: String,

    pub schemas: BTreeMap<ObjectId, schema::SchemaDef>,
    pub roles: BTreeMap<ObjectId, role::Role>,
    pub extensions: BTreeMap<ObjectId, extension::Extension>,
    pub languages: BTreeMap<ObjectId, language::Language>,
    pub collations: BTreeMap<ObjectId, collation::Collation>,
    pub types: BTreeMap<ObjectId, custom_type::TypeDef>,
    pub domains: BTreeMap<ObjectId, domain::Domain>,
    pub sequences: BTreeMap<ObjectId, sequence::Sequence>,
    pub tables: BTreeMap<ObjectId, table::Table>,
    pub views: BTreeMap<ObjectId, view::View>,
    pub materialized_views: BTreeMap<ObjectId, view::MaterializedView>,
    pub indexes: BTreeMap<ObjectId, index::Index>,
    pub constraints: BTreeMap<ObjectId, constraint::Constraint>,
    pub routines: BTreeMap<ObjectId, routine::Routine>,
    pub triggers: BTreeMap<ObjectId, trigger::Trigger>,
    pub rules: BTreeMap<ObjectId, rule::Rule>,
    pub policies: BTreeMap<ObjectId, policy::Policy>,
    pub foreign_data_wrappers: BTreeMap<ObjectId, foreign::ForeignDataWrapper>,
    pub servers: BTreeMap<ObjectId, foreign::Server>,
    pub user_mappings: BTreeMap<ObjectId, foreign::UserMapping>,
    pub foreign_tables: BTreeMap<ObjectId, foreign::ForeignTable>,
    pub publications: BTreeMap<ObjectId, replication::Publication>,
    pub subscriptions: BTreeMap<ObjectId, replication::Subscription>,
    pub event_triggers: BTreeMap<ObjectId, event_trigger::EventTrigger>,

    pub default_privileges: DefaultPrivilegeState,
    pub depends: Vec<DependRow>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self {
            current_user: "postgres".to_string(),
            ..Default::default()
        }
    }

    /// Inserts a record into the collection matching its type.
    pub fn insert<T: CatalogEntity>(&mut self, entity: T)
    where
        Self: CatalogStore<T>,
    {
        self.store().insert(entity.id(), entity);
    }

    /// Flat lookup across every collection, returning the canonical snapshot
    /// of the object the identity resolves to. Virtual and child identities
    /// do not resolve here; callers collapse them first.
    pub fn lookup_snapshot(&self, id: &ObjectId) -> Option<Value> {
        match id {
            ObjectId::Schema { .. } => self.schemas.get(id).map(CatalogEntity::stable_snapshot),
            ObjectId::Role { .. } => self.roles.get(id).map(CatalogEntity::stable_snapshot),
            ObjectId::Extension { .. } => {
                self.extensions.get(id).map(CatalogEntity::stable_snapshot)
            }
            ObjectId::Language { .. } => {
                self.languages.get(id).map(CatalogEntity::stable_snapshot)
            }
            ObjectId::Collation { .. } => {
                self.collations.get(id).map(CatalogEntity::stable_snapshot)
            }
            ObjectId::Type { .. } => self.types.get(id).map(CatalogEntity::stable_snapshot),
            ObjectId::Domain { .. } => self.domains.get(id).map(CatalogEntity::stable_snapshot),
            ObjectId::Sequence { .. } => {
                self.sequences.get(id).map(CatalogEntity::stable_snapshot)
            }
            ObjectId::Table { .. } => self.tables.get(id).map(CatalogEntity::stable_snapshot),
            ObjectId::View { .. } => self.views.get(id).map(CatalogEntity::stable_snapshot),
            ObjectId::MaterializedView { .. } => self
                .materialized_views
                .get(id)
                .map(CatalogEntity::stable_snapshot),
            ObjectId::Index { .. } => self.indexes.get(id).map(CatalogEntity::stable_snapshot),
            ObjectId::Constraint { .. } => self
                .constraints
                .get(id)
                .map(CatalogEntity::stable_snapshot),
            ObjectId::Function { .. } | ObjectId::Procedure { .. } | ObjectId::Aggregate { .. } => {
                self.routines.get(id).map(CatalogEntity::stable_snapshot)
            }
            ObjectId::Trigger { .. } => self.triggers.get(id).map(CatalogEntity::stable_snapshot),
            ObjectId::Rule { .. } => self.rules.get(id).map(CatalogEntity::stable_snapshot),
            ObjectId::Policy { .. } => self.policies.get(id).map(CatalogEntity::stable_snapshot),
            ObjectId::ForeignDataWrapper { .. } => self
                .foreign_data_wrappers
                .get(id)
                .map(CatalogEntity::stable_snapshot),
            ObjectId::Server { .. } => self.servers.get(id).map(CatalogEntity::stable_snapshot),
            ObjectId::UserMapping { .. } => self
                .user_mappings
                .get(id)
                .map(CatalogEntity::stable_snapshot),
            ObjectId::ForeignTable { .. } => self
                .foreign_tables
                .get(id)
                .map(CatalogEntity::stable_snapshot),
            ObjectId::Publication { .. } => self
                .publications
                .get(id)
                .map(CatalogEntity::stable_snapshot),
            ObjectId::Subscription { .. } => self
                .subscriptions
                .get(id)
                .map(CatalogEntity::stable_snapshot),
            ObjectId::EventTrigger { .. } => self
                .event_triggers
                .get(id)
                .map(CatalogEntity::stable_snapshot),
            _ => None,
        }
    }

    pub fn contains_id(&self, id: &ObjectId) -> bool {
        match id {
            ObjectId::Comment { object } | ObjectId::Acl { object, .. } => {
                self.contains_id(object)
            }
            ObjectId::Column {
                schema,
                table,
                name,
            } => self
                .tables
                .get(&ObjectId::Table {
                    schema: schema.clone(),
                    name: table.clone(),
                })
                .is_some_and(|t| t.find_column(name).is_some()),
            ObjectId::DefaultAcl {
                grantor,
                objtype,
                schema,
                ..
            } => self
                .default_privileges
                .entry(grantor, *objtype, schema.as_deref())
                .is_some(),
            ObjectId::Membership { role, member } => self
                .roles
                .get(&ObjectId::Role { name: role.clone() })
                .is_some_and(|r| r.members.iter().any(|m| m == member)),
            ObjectId::Unknown { .. } => false,
            other => self.lookup_snapshot(other).is_some(),
        }
    }
}

/// Routes `Catalog::insert` to the map holding a given record type.
pub trait CatalogStore<T: CatalogEntity> {
    fn store(&mut self) -> &mut BTreeMap<ObjectId, T>;
}

macro_rules! impl_store {
    ($ty:ty, $field:ident) => {
        impl CatalogStore<$ty> for Catalog {
            fn store(&mut self) -> &mut BTreeMap<ObjectId, $ty> {
                &mut self.$field
            }
        }
    };
}

impl_store!(schema::SchemaDef, schemas);
impl_store!(role::Role, roles);
impl_store!(extension::Extension, extensions);
impl_store!(language::Language, languages);
impl_store!(collation::Collation, collations);
impl_store!(custom_type::TypeDef, types);
impl_store!(domain::Domain, domains);
impl_store!(sequence::Sequence, sequences);
impl_store!(table::Table, tables);
impl_store!(view::View, views);
impl_store!(view::MaterializedView, materialized_views);
impl_store!(index::Index, indexes);
impl_store!(constraint::Constraint, constraints);
impl_store!(routine::Routine, routines);
impl_store!(trigger::Trigger, triggers);
impl_store!(rule::Rule, rules);
impl_store!(policy::Policy, policies);
impl_store!(foreign::ForeignDataWrapper, foreign_data_wrappers);
impl_store!(foreign::Server, servers);
impl_store!(foreign::UserMapping, user_mappings);
impl_store!(foreign::ForeignTable, foreign_tables);
impl_store!(replication::Publication, publications);
impl_store!(replication::Subscription, subscriptions);
impl_store!(event_trigger::EventTrigger, event_triggers);

#[cfg(test)]
mod tests {
    use super::table::{Column, Table};
    use super::*;
    use crate::catalog::acl::AclItem;

    #[test]
    fn test_stable_snapshot_sorts_columns_and_privileges() {
        let mut table = Table::new(
            "public",
            "users",
            "owner",
            vec![
                Column::new("email", 2, "text"),
                Column::new("id", 1, "bigint"),
            ],
        );
        table.privileges = vec![
            AclItem::new("writer", "INSERT", false),
            AclItem::new("reader", "SELECT", false),
        ];

        let snapshot = table.stable_snapshot();
        let columns = snapshot["columns"].as_array().unwrap();
        assert_eq!(columns[0]["name"], "id");
        assert_eq!(columns[1]["name"], "email");

        let privileges = snapshot["privileges"].as_array().unwrap();
        assert_eq!(privileges[0]["grantee"], "reader");
        assert_eq!(privileges[1]["grantee"], "writer");
    }

    #[test]
    fn test_contains_membership_and_column() {
        let mut catalog = Catalog::empty();
        let mut admins = role::Role::new("admins");
        admins.members.push("alice".into());
        catalog.insert(admins);
        catalog.insert(Table::new(
            "public",
            "users",
            "owner",
            vec![Column::new("id", 1, "bigint")],
        ));

        assert!(catalog.contains_id(&ObjectId::Membership {
            role: "admins".into(),
            member: "alice".into()
        }));
        assert!(!catalog.contains_id(&ObjectId::Membership {
            role: "admins".into(),
            member: "bob".into()
        }));
        assert!(catalog.contains_id(&ObjectId::Column {
            schema: "public".into(),
            table: "users".into(),
            name: "id".into()
        }));
        assert!(!catalog.contains_id(&ObjectId::Column {
            schema: "public".into(),
            table: "users".into(),
            name: "missing".into()
        }));
    }
}
