//! Stable identifiers for database objects.
//!
//! Every catalog object has a deterministic textual identity, independent of
//! OIDs, with a fixed `kind:qualified.name` grammar. The same grammar is used
//! by pg_depend rows handed to the sorter and by the plan scope list, so the
//! identifiers must render and re-parse losslessly.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A globally unique identifier for any database object pgdrift models.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectId {
    Schema {
        name: String,
    },
    Role {
        name: String,
    },
    Table {
        schema: String,
        name: String,
    },
    View {
        schema: String,
        name: String,
    },
    MaterializedView {
        schema: String,
        name: String,
    },
    ForeignTable {
        schema: String,
        name: String,
    },
    Column {
        schema: String,
        table: String,
        name: String,
    },
    Constraint {
        schema: String,
        table: String,
        name: String,
    },
    Index {
        schema: String,
        name: String,
    },
    Sequence {
        schema: String,
        name: String,
    },
    /// Enums, ranges and composite types share the `type:` prefix.
    Type {
        schema: String,
        name: String,
    },
    Domain {
        schema: String,
        name: String,
    },
    Collation {
        schema: String,
        name: String,
    },
    Function {
        schema: String,
        name: String,
        arguments: String,
    },
    Procedure {
        schema: String,
        name: String,
        arguments: String,
    },
    Aggregate {
        schema: String,
        name: String,
        arguments: String,
    },
    Trigger {
        schema: String,
        table: String,
        name: String,
    },
    Rule {
        schema: String,
        table: String,
        name: String,
    },
    Policy {
        schema: String,
        table: String,
        name: String,
    },
    Publication {
        name: String,
    },
    Subscription {
        name: String,
    },
    Extension {
        name: String,
    },
    Language {
        name: String,
    },
    ForeignDataWrapper {
        name: String,
    },
    Server {
        name: String,
    },
    UserMapping {
        server: String,
        user: String,
    },
    EventTrigger {
        name: String,
    },

    /// The comment attached to another object.
    Comment {
        object: Box<ObjectId>,
    },
    /// One grantee's ACL entry on another object.
    Acl {
        object: Box<ObjectId>,
        grantee: String,
    },
    /// A default-privilege entry, keyed by grantor, objtype letter and scope.
    DefaultAcl {
        grantor: String,
        objtype: char,
        schema: Option<String>,
        grantee: String,
    },
    /// `member` holding membership in `role`.
    Membership {
        role: String,
        member: String,
    },

    /// An identifier the extractor could not resolve. Filtered during sort.
    Unknown {
        raw: String,
    },
}

impl ObjectId {
    /// The schema qualifying this object, when it has one.
    pub fn schema(&self) -> Option<&str> {
        match self {
            ObjectId::Schema { name } => Some(name.as_str()),
            ObjectId::Table { schema, .. }
            | ObjectId::View { schema, .. }
            | ObjectId::MaterializedView { schema, .. }
            | ObjectId::ForeignTable { schema, .. }
            | ObjectId::Column { schema, .. }
            | ObjectId::Constraint { schema, .. }
            | ObjectId::Index { schema, .. }
            | ObjectId::Sequence { schema, .. }
            | ObjectId::Type { schema, .. }
            | ObjectId::Domain { schema, .. }
            | ObjectId::Collation { schema, .. }
            | ObjectId::Function { schema, .. }
            | ObjectId::Procedure { schema, .. }
            | ObjectId::Aggregate { schema, .. }
            | ObjectId::Trigger { schema, .. }
            | ObjectId::Rule { schema, .. }
            | ObjectId::Policy { schema, .. } => Some(schema.as_str()),
            ObjectId::Comment { object } => object.schema(),
            ObjectId::Acl { object, .. } => object.schema(),
            ObjectId::DefaultAcl { schema, .. } => schema.as_deref(),
            _ => None,
        }
    }

    /// Collapses column- and constraint-level identifiers to the owning
    /// relation. All other identifiers map to themselves.
    pub fn owning_object(&self) -> ObjectId {
        match self {
            ObjectId::Column { schema, table, .. } | ObjectId::Constraint { schema, table, .. } => {
                ObjectId::Table {
                    schema: schema.clone(),
                    name: table.clone(),
                }
            }
            other => other.clone(),
        }
    }

    /// Virtual identifiers (comments, ACL entries, memberships) name facets of
    /// other objects rather than objects themselves. Dependency traversal
    /// skips them.
    pub fn is_virtual(&self) -> bool {
        matches!(
            self,
            ObjectId::Comment { .. }
                | ObjectId::Acl { .. }
                | ObjectId::DefaultAcl { .. }
                | ObjectId::Membership { .. }
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ObjectId::Unknown { .. })
    }

    pub fn commented(self) -> ObjectId {
        ObjectId::Comment {
            object: Box::new(self),
        }
    }

    pub fn acl_for(self, grantee: &str) -> ObjectId {
        ObjectId::Acl {
            object: Box::new(self),
            grantee: grantee.to_string(),
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectId::Schema { name } => write!(f, "schema:{name}"),
            ObjectId::Role { name } => write!(f, "role:{name}"),
            ObjectId::Table { schema, name } => write!(f, "table:{schema}.{name}"),
            ObjectId::View { schema, name } => write!(f, "view:{schema}.{name}"),
            ObjectId::MaterializedView { schema, name } => {
                write!(f, "materializedView:{schema}.{name}")
            }
            ObjectId::ForeignTable { schema, name } => write!(f, "foreignTable:{schema}.{name}"),
            ObjectId::Column {
                schema,
                table,
                name,
            } => write!(f, "column:{schema}.{table}.{name}"),
            ObjectId::Constraint {
                schema,
                table,
                name,
            } => write!(f, "constraint:{schema}.{table}.{name}"),
            ObjectId::Index { schema, name } => write!(f, "index:{schema}.{name}"),
            ObjectId::Sequence { schema, name } => write!(f, "sequence:{schema}.{name}"),
            ObjectId::Type { schema, name } => write!(f, "type:{schema}.{name}"),
            ObjectId::Domain { schema, name } => write!(f, "domain:{schema}.{name}"),
            ObjectId::Collation { schema, name } => write!(f, "collation:{schema}.{name}"),
            ObjectId::Function {
                schema,
                name,
                arguments,
            } => write!(f, "function:{schema}.{name}({arguments})"),
            ObjectId::Procedure {
                schema,
                name,
                arguments,
            } => write!(f, "procedure:{schema}.{name}({arguments})"),
            ObjectId::Aggregate {
                schema,
                name,
                arguments,
            } => write!(f, "aggregate:{schema}.{name}({arguments})"),
            ObjectId::Trigger {
                schema,
                table,
                name,
            } => write!(f, "trigger:{schema}.{table}.{name}"),
            ObjectId::Rule {
                schema,
                table,
                name,
            } => write!(f, "rule:{schema}.{table}.{name}"),
            ObjectId::Policy {
                schema,
                table,
                name,
            } => write!(f, "rls_policy:{schema}.{table}.{name}"),
            ObjectId::Publication { name } => write!(f, "publication:{name}"),
            ObjectId::Subscription { name } => write!(f, "subscription:{name}"),
            ObjectId::Extension { name } => write!(f, "extension:{name}"),
            ObjectId::Language { name } => write!(f, "language:{name}"),
            ObjectId::ForeignDataWrapper { name } => write!(f, "foreignDataWrapper:{name}"),
            ObjectId::Server { name } => write!(f, "server:{name}"),
            ObjectId::UserMapping { server, user } => write!(f, "userMapping:{server}.{user}"),
            ObjectId::EventTrigger { name } => write!(f, "eventTrigger:{name}"),
            ObjectId::Comment { object } => write!(f, "comment:{object}"),
            ObjectId::Acl { object, grantee } => write!(f, "acl:{object}::grantee:{grantee}"),
            ObjectId::DefaultAcl {
                grantor,
                objtype,
                schema,
                grantee,
            } => match schema {
                Some(s) => write!(f, "defacl:{grantor}:{objtype}:schema:{s}:grantee:{grantee}"),
                None => write!(f, "defacl:{grantor}:{objtype}:global:grantee:{grantee}"),
            },
            ObjectId::Membership { role, member } => write!(f, "membership:{role}.{member}"),
            ObjectId::Unknown { raw } => write!(f, "unknown:{raw}"),
        }
    }
}

fn split2(rest: &str) -> Option<(String, String)> {
    rest.split_once('.')
        .map(|(a, b)| (a.to_string(), b.to_string()))
}

fn split3(rest: &str) -> Option<(String, String, String)> {
    let (a, rest) = rest.split_once('.')?;
    let (b, c) = rest.split_once('.')?;
    Some((a.to_string(), b.to_string(), c.to_string()))
}

/// Parses `schema.name(arguments)`.
fn split_signature(rest: &str) -> Option<(String, String, String)> {
    let open = rest.find('(')?;
    let args = rest[open..].strip_prefix('(')?.strip_suffix(')')?;
    let (schema, name) = rest[..open].split_once('.')?;
    Some((schema.to_string(), name.to_string(), args.to_string()))
}

impl FromStr for ObjectId {
    type Err = String;

    /// Parsing never fails on a prefixed string: unrecognized or malformed
    /// identifiers fold into [`ObjectId::Unknown`], matching how the sorter
    /// treats identities it cannot resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((kind, rest)) = s.split_once(':') else {
            return Err(format!("stable id without kind prefix: {s}"));
        };

        let unknown = || ObjectId::Unknown { raw: s.to_string() };

        let id = match kind {
            "schema" => ObjectId::Schema {
                name: rest.to_string(),
            },
            "role" => ObjectId::Role {
                name: rest.to_string(),
            },
            "table" => match split2(rest) {
                Some((schema, name)) => ObjectId::Table { schema, name },
                None => unknown(),
            },
            "view" => match split2(rest) {
                Some((schema, name)) => ObjectId::View { schema, name },
                None => unknown(),
            },
            "materializedView" => match split2(rest) {
                Some((schema, name)) => ObjectId::MaterializedView { schema, name },
                None => unknown(),
            },
            "foreignTable" => match split2(rest) {
                Some((schema, name)) => ObjectId::ForeignTable { schema, name },
                None => unknown(),
            },
            "column" => match split3(rest) {
                Some((schema, table, name)) => ObjectId::Column {
                    schema,
                    table,
                    name,
                },
                None => unknown(),
            },
            "constraint" => match split3(rest) {
                Some((schema, table, name)) => ObjectId::Constraint {
                    schema,
                    table,
                    name,
                },
                None => unknown(),
            },
            "index" => match split2(rest) {
                Some((schema, name)) => ObjectId::Index { schema, name },
                None => unknown(),
            },
            "sequence" => match split2(rest) {
                Some((schema, name)) => ObjectId::Sequence { schema, name },
                None => unknown(),
            },
            "type" => match split2(rest) {
                Some((schema, name)) => ObjectId::Type { schema, name },
                None => unknown(),
            },
            "domain" => match split2(rest) {
                Some((schema, name)) => ObjectId::Domain { schema, name },
                None => unknown(),
            },
            "collation" => match split2(rest) {
                Some((schema, name)) => ObjectId::Collation { schema, name },
                None => unknown(),
            },
            "function" => match split_signature(rest) {
                Some((schema, name, arguments)) => ObjectId::Function {
                    schema,
                    name,
                    arguments,
                },
                None => unknown(),
            },
            "procedure" => match split_signature(rest) {
                Some((schema, name, arguments)) => ObjectId::Procedure {
                    schema,
                    name,
                    arguments,
                },
                None => unknown(),
            },
            "aggregate" => match split_signature(rest) {
                Some((schema, name, arguments)) => ObjectId::Aggregate {
                    schema,
                    name,
                    arguments,
                },
                None => unknown(),
            },
            "trigger" => match split3(rest) {
                Some((schema, table, name)) => ObjectId::Trigger {
                    schema,
                    table,
                    name,
                },
                None => unknown(),
            },
            "rule" => match split3(rest) {
                Some((schema, table, name)) => ObjectId::Rule {
                    schema,
                    table,
                    name,
                },
                None => unknown(),
            },
            "rls_policy" => match split3(rest) {
                Some((schema, table, name)) => ObjectId::Policy {
                    schema,
                    table,
                    name,
                },
                None => unknown(),
            },
            "publication" => ObjectId::Publication {
                name: rest.to_string(),
            },
            "subscription" => ObjectId::Subscription {
                name: rest.to_string(),
            },
            "extension" => ObjectId::Extension {
                name: rest.to_string(),
            },
            "language" => ObjectId::Language {
                name: rest.to_string(),
            },
            "foreignDataWrapper" => ObjectId::ForeignDataWrapper {
                name: rest.to_string(),
            },
            "server" => ObjectId::Server {
                name: rest.to_string(),
            },
            "userMapping" => match split2(rest) {
                Some((server, user)) => ObjectId::UserMapping { server, user },
                None => unknown(),
            },
            "eventTrigger" => ObjectId::EventTrigger {
                name: rest.to_string(),
            },
            "comment" => match rest.parse::<ObjectId>() {
                Ok(object) => ObjectId::Comment {
                    object: Box::new(object),
                },
                Err(_) => unknown(),
            },
            "acl" => match rest.rsplit_once("::grantee:") {
                Some((object, grantee)) => match object.parse::<ObjectId>() {
                    Ok(object) => ObjectId::Acl {
                        object: Box::new(object),
                        grantee: grantee.to_string(),
                    },
                    Err(_) => unknown(),
                },
                None => unknown(),
            },
            "defacl" => parse_defacl(rest).unwrap_or_else(unknown),
            "membership" => match split2(rest) {
                Some((role, member)) => ObjectId::Membership { role, member },
                None => unknown(),
            },
            "unknown" => ObjectId::Unknown {
                raw: rest.to_string(),
            },
            _ => unknown(),
        };

        Ok(id)
    }
}

fn parse_defacl(rest: &str) -> Option<ObjectId> {
    // <grantor>:<objtype>:{global|schema:<s>}:grantee:<g>
    let (grantor, rest) = rest.split_once(':')?;
    let (objtype, rest) = rest.split_once(':')?;
    let objtype = objtype.chars().next().filter(|_| objtype.len() == 1)?;
    let (schema, grantee) = if let Some(rest) = rest.strip_prefix("global:grantee:") {
        (None, rest)
    } else {
        let rest = rest.strip_prefix("schema:")?;
        let (schema, grantee) = rest.rsplit_once(":grantee:")?;
        (Some(schema.to_string()), grantee)
    };
    Some(ObjectId::DefaultAcl {
        grantor: grantor.to_string(),
        objtype,
        schema,
        grantee: grantee.to_string(),
    })
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(id: ObjectId) {
        let rendered = id.to_string();
        assert_eq!(rendered.parse::<ObjectId>().unwrap(), id, "{rendered}");
    }

    #[test]
    fn test_display_grammar() {
        assert_eq!(
            ObjectId::Table {
                schema: "public".into(),
                name: "users".into()
            }
            .to_string(),
            "table:public.users"
        );
        assert_eq!(
            ObjectId::Function {
                schema: "app".into(),
                name: "f".into(),
                arguments: "integer, text".into()
            }
            .to_string(),
            "function:app.f(integer, text)"
        );
        assert_eq!(
            ObjectId::Policy {
                schema: "public".into(),
                table: "users".into(),
                name: "tenant".into()
            }
            .to_string(),
            "rls_policy:public.users.tenant"
        );
        assert_eq!(
            ObjectId::DefaultAcl {
                grantor: "owner".into(),
                objtype: 'r',
                schema: Some("app".into()),
                grantee: "reader".into()
            }
            .to_string(),
            "defacl:owner:r:schema:app:grantee:reader"
        );
    }

    #[test]
    fn test_roundtrip_virtual_ids() {
        roundtrip(
            ObjectId::Table {
                schema: "public".into(),
                name: "users".into(),
            }
            .commented(),
        );
        roundtrip(
            ObjectId::Sequence {
                schema: "s".into(),
                name: "q".into(),
            }
            .acl_for("reader"),
        );
        roundtrip(ObjectId::DefaultAcl {
            grantor: "owner".into(),
            objtype: 'S',
            schema: None,
            grantee: "writer".into(),
        });
        roundtrip(ObjectId::Membership {
            role: "admins".into(),
            member: "alice".into(),
        });
    }

    #[test]
    fn test_unknown_prefix_is_preserved() {
        let id: ObjectId = "unknown:pg_class.12345".parse().unwrap();
        assert!(id.is_unknown());
        assert_eq!(id.to_string(), "unknown:pg_class.12345");

        // Unrecognized kinds fold into Unknown rather than failing.
        let id: ObjectId = "tablespace:fast".parse().unwrap();
        assert!(id.is_unknown());
    }

    #[test]
    fn test_owning_object_collapses_children() {
        let column = ObjectId::Column {
            schema: "public".into(),
            table: "orders".into(),
            name: "total".into(),
        };
        assert_eq!(
            column.owning_object(),
            ObjectId::Table {
                schema: "public".into(),
                name: "orders".into()
            }
        );

        let index = ObjectId::Index {
            schema: "public".into(),
            name: "orders_idx".into(),
        };
        assert_eq!(index.owning_object(), index);
    }
}
