//! Privilege records and the default-privilege algebra.
//!
//! ACLs are modeled as flat `(grantee, privilege, grantable)` rows. The
//! [`DefaultPrivilegeState`] answers the question the diff keeps asking: which
//! ACL does a freshly created object inherit for a given `(grantor, objtype,
//! schema)` key, once PostgreSQL's built-in defaults and any `ALTER DEFAULT
//! PRIVILEGES` entries are composed. Grants already implied by that answer are
//! never emitted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::id::ObjectId;

/// The pseudo-role PostgreSQL spells as an empty grantee OID.
pub const PUBLIC: &str = "PUBLIC";

/// A single aclitem row: one privilege for one grantee.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AclItem {
    pub grantee: String,
    pub privilege: String,
    pub grantable: bool,
}

impl AclItem {
    pub fn new(grantee: &str, privilege: &str, grantable: bool) -> Self {
        Self {
            grantee: grantee.to_string(),
            privilege: privilege.to_string(),
            grantable,
        }
    }
}

/// One `pg_default_acl` row: the complete ACL that objects of `objtype`
/// created by `grantor` (in `schema`, or anywhere when `None`) will carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultAclEntry {
    pub grantor: String,
    pub objtype: char,
    pub schema: Option<String>,
    pub acl: Vec<AclItem>,
}

/// All default-ACL entries of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultPrivilegeState {
    pub entries: Vec<DefaultAclEntry>,
}

impl DefaultPrivilegeState {
    pub fn entry(
        &self,
        grantor: &str,
        objtype: char,
        schema: Option<&str>,
    ) -> Option<&DefaultAclEntry> {
        self.entries.iter().find(|e| {
            e.grantor == grantor && e.objtype == objtype && e.schema.as_deref() == schema
        })
    }

    /// The effective ACL a newly created object inherits.
    ///
    /// A global entry replaces the built-in defaults outright (PostgreSQL
    /// stores the full resulting ACL, not a delta); per-schema entries are
    /// added on top of whichever base applies.
    pub fn effective_acl(&self, owner: &str, objtype: char, schema: Option<&str>) -> BTreeSet<AclItem> {
        let mut acl: BTreeSet<AclItem> = match self.entry(owner, objtype, None) {
            Some(e) => e.acl.iter().cloned().collect(),
            None => builtin_default_acl(owner, objtype),
        };
        if let Some(s) = schema
            && let Some(e) = self.entry(owner, objtype, Some(s))
        {
            acl.extend(e.acl.iter().cloned());
        }
        acl
    }
}

/// PostgreSQL's hard-wired defaults: the owner holds every privilege of the
/// kind (grantable), and PUBLIC gets USAGE on types/domains/languages and
/// EXECUTE on routines.
pub fn builtin_default_acl(owner: &str, objtype: char) -> BTreeSet<AclItem> {
    let mut acl = BTreeSet::new();
    for privilege in owner_privileges(objtype) {
        acl.insert(AclItem::new(owner, privilege, true));
    }
    match objtype {
        'T' | 'l' => {
            acl.insert(AclItem::new(PUBLIC, "USAGE", false));
        }
        'f' => {
            acl.insert(AclItem::new(PUBLIC, "EXECUTE", false));
        }
        _ => {}
    }
    acl
}

/// The full privilege set an owner holds for a `pg_default_acl` objtype.
pub fn owner_privileges(objtype: char) -> &'static [&'static str] {
    match objtype {
        'r' => &[
            "SELECT",
            "INSERT",
            "UPDATE",
            "DELETE",
            "TRUNCATE",
            "REFERENCES",
            "TRIGGER",
        ],
        'S' => &["SELECT", "UPDATE", "USAGE"],
        'f' => &["EXECUTE"],
        'T' | 'l' => &["USAGE"],
        'n' => &["USAGE", "CREATE"],
        _ => &[],
    }
}

/// Maps an object kind to its `pg_default_acl.defaclobjtype` letter.
/// Aggregates are routines (`f`); relations of every flavor are `r`.
pub fn objtype_for(id: &ObjectId) -> Option<char> {
    match id {
        ObjectId::Table { .. }
        | ObjectId::View { .. }
        | ObjectId::MaterializedView { .. }
        | ObjectId::ForeignTable { .. } => Some('r'),
        ObjectId::Sequence { .. } => Some('S'),
        ObjectId::Function { .. } | ObjectId::Procedure { .. } | ObjectId::Aggregate { .. } => {
            Some('f')
        }
        ObjectId::Type { .. } | ObjectId::Domain { .. } => Some('T'),
        ObjectId::Schema { .. } => Some('n'),
        ObjectId::Language { .. } => Some('l'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults_for_types_include_public_usage() {
        let acl = builtin_default_acl("owner", 'T');
        assert!(acl.contains(&AclItem::new("owner", "USAGE", true)));
        assert!(acl.contains(&AclItem::new(PUBLIC, "USAGE", false)));
    }

    #[test]
    fn test_global_entry_replaces_builtin() {
        let state = DefaultPrivilegeState {
            entries: vec![DefaultAclEntry {
                grantor: "owner".into(),
                objtype: 'f',
                schema: None,
                acl: vec![AclItem::new("owner", "EXECUTE", true)],
            }],
        };
        let acl = state.effective_acl("owner", 'f', Some("app"));
        // PUBLIC EXECUTE was revoked by the global entry.
        assert!(!acl.contains(&AclItem::new(PUBLIC, "EXECUTE", false)));
        assert!(acl.contains(&AclItem::new("owner", "EXECUTE", true)));
    }

    #[test]
    fn test_schema_entry_adds_to_base() {
        let state = DefaultPrivilegeState {
            entries: vec![DefaultAclEntry {
                grantor: "owner".into(),
                objtype: 'r',
                schema: Some("app".into()),
                acl: vec![AclItem::new("reader", "SELECT", false)],
            }],
        };
        let acl = state.effective_acl("owner", 'r', Some("app"));
        assert!(acl.contains(&AclItem::new("reader", "SELECT", false)));
        // Built-in owner privileges survive alongside the schema entry.
        assert!(acl.contains(&AclItem::new("owner", "SELECT", true)));

        // Other schemas are unaffected.
        let elsewhere = state.effective_acl("owner", 'r', Some("public"));
        assert!(!elsewhere.contains(&AclItem::new("reader", "SELECT", false)));
    }

    #[test]
    fn test_objtype_mapping() {
        assert_eq!(
            objtype_for(&ObjectId::MaterializedView {
                schema: "a".into(),
                name: "b".into()
            }),
            Some('r')
        );
        assert_eq!(
            objtype_for(&ObjectId::Aggregate {
                schema: "a".into(),
                name: "b".into(),
                arguments: "integer".into()
            }),
            Some('f')
        );
        assert_eq!(objtype_for(&ObjectId::Role { name: "r".into() }), None);
    }
}
