//! The closed family of schema changes.
//!
//! Every change is one atomic schema operation: it knows which stable
//! identities it brings into existence (`creates`), which must already exist
//! (`requires`), and which it destroys (`drops`), and it can render itself as
//! a single SQL statement without a trailing semicolon. Multi-statement
//! replacements are always modeled as separate Drop and Create changes so the
//! sorter can interleave dependents between them.

use crate::catalog::id::ObjectId;
use crate::error::EmitError;

pub mod collation;
pub mod comment;
pub mod context;
pub mod domain;
pub mod event_trigger;
pub mod extension;
pub mod foreign;
pub mod index;
pub mod language;
pub mod owner;
pub mod policy;
pub mod privilege;
pub mod quote;
pub mod replication;
pub mod role;
pub mod routine;
pub mod rule;
pub mod schema;
pub mod sequence;
pub mod table;
pub mod table_constraint;
pub mod trigger;
pub mod types;
pub mod view;

pub use context::{EmitContext, SqlFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    Drop,
    Alter,
    Create,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Object,
    Column,
    Constraint,
    Comment,
    Privilege,
    Membership,
    Owner,
}

/// A placeholder left in emitted SQL in place of a secret value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveField {
    pub key: String,
    pub placeholder: String,
}

/// Contract every change variant honors. `creates`, `requires` and `drops`
/// are pure functions of the constructor data.
pub trait ChangeKind {
    /// Object-kind tag, e.g. `table` or `rls_policy`.
    fn object_type(&self) -> &'static str;
    fn operation(&self) -> Operation;
    fn scope(&self) -> Scope;
    /// The primary stable identity this change targets.
    fn target(&self) -> ObjectId;
    fn creates(&self) -> Vec<ObjectId>;
    fn requires(&self) -> Vec<ObjectId>;
    fn drops(&self) -> Vec<ObjectId>;
    /// Renders the SQL statement, without a trailing semicolon.
    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError>;
    /// Placeholders substituted into the emitted SQL for secret values.
    fn sensitive_info(&self) -> Vec<SensitiveField> {
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub enum Change {
    Schema(schema::SchemaChange),
    Role(role::RoleChange),
    Extension(extension::ExtensionChange),
    Language(language::LanguageChange),
    Collation(collation::CollationChange),
    Type(types::TypeChange),
    Domain(domain::DomainChange),
    Sequence(sequence::SequenceChange),
    Table(table::TableChange),
    View(view::ViewChange),
    MaterializedView(view::MaterializedViewChange),
    Index(index::IndexChange),
    Constraint(table_constraint::ConstraintChange),
    Routine(routine::RoutineChange),
    Trigger(trigger::TriggerChange),
    Rule(rule::RuleChange),
    Policy(policy::PolicyChange),
    ForeignDataWrapper(foreign::FdwChange),
    Server(foreign::ServerChange),
    UserMapping(foreign::UserMappingChange),
    ForeignTable(foreign::ForeignTableChange),
    Publication(replication::PublicationChange),
    Subscription(replication::SubscriptionChange),
    EventTrigger(event_trigger::EventTriggerChange),
    Comment(comment::CommentChange),
    Privilege(privilege::PrivilegeChange),
    DefaultPrivilege(privilege::DefaultPrivilegeChange),
    Membership(privilege::MembershipChange),
    Owner(owner::OwnerChange),
}

macro_rules! delegate {
    ($self:expr, $method:ident $(, $arg:expr)*) => {
        match $self {
            Change::Schema(c) => c.$method($($arg),*),
            Change::Role(c) => c.$method($($arg),*),
            Change::Extension(c) => c.$method($($arg),*),
            Change::Language(c) => c.$method($($arg),*),
            Change::Collation(c) => c.$method($($arg),*),
            Change::Type(c) => c.$method($($arg),*),
            Change::Domain(c) => c.$method($($arg),*),
            Change::Sequence(c) => c.$method($($arg),*),
            Change::Table(c) => c.$method($($arg),*),
            Change::View(c) => c.$method($($arg),*),
            Change::MaterializedView(c) => c.$method($($arg),*),
            Change::Index(c) => c.$method($($arg),*),
            Change::Constraint(c) => c.$method($($arg),*),
            Change::Routine(c) => c.$method($($arg),*),
            Change::Trigger(c) => c.$method($($arg),*),
            Change::Rule(c) => c.$method($($arg),*),
            Change::Policy(c) => c.$method($($arg),*),
            Change::ForeignDataWrapper(c) => c.$method($($arg),*),
            Change::Server(c) => c.$method($($arg),*),
            Change::UserMapping(c) => c.$method($($arg),*),
            Change::ForeignTable(c) => c.$method($($arg),*),
            Change::Publication(c) => c.$method($($arg),*),
            Change::Subscription(c) => c.$method($($arg),*),
            Change::EventTrigger(c) => c.$method($($arg),*),
            Change::Comment(c) => c.$method($($arg),*),
            Change::Privilege(c) => c.$method($($arg),*),
            Change::DefaultPrivilege(c) => c.$method($($arg),*),
            Change::Membership(c) => c.$method($($arg),*),
            Change::Owner(c) => c.$method($($arg),*),
        }
    };
}

impl ChangeKind for Change {
    fn object_type(&self) -> &'static str {
        delegate!(self, object_type)
    }

    fn operation(&self) -> Operation {
        delegate!(self, operation)
    }

    fn scope(&self) -> Scope {
        delegate!(self, scope)
    }

    fn target(&self) -> ObjectId {
        delegate!(self, target)
    }

    fn creates(&self) -> Vec<ObjectId> {
        delegate!(self, creates)
    }

    fn requires(&self) -> Vec<ObjectId> {
        delegate!(self, requires)
    }

    fn drops(&self) -> Vec<ObjectId> {
        delegate!(self, drops)
    }

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        delegate!(self, emit, ctx)
    }

    fn sensitive_info(&self) -> Vec<SensitiveField> {
        delegate!(self, sensitive_info)
    }
}

impl Change {
    /// Short constructor name used in cycle diagnostics.
    pub fn describe(&self) -> String {
        format!(
            "{}.{}",
            self.object_type(),
            match self.operation() {
                Operation::Create => "create",
                Operation::Alter => "alter",
                Operation::Drop => "drop",
            }
        )
    }
}

/// Rewrites a stored `CREATE …` definition into `CREATE OR REPLACE …`.
/// Definitions extracted via `pg_get_functiondef` already carry the prefix;
/// rule definitions do not.
pub(crate) fn with_or_replace(definition: &str) -> String {
    let trimmed = definition.trim_start();
    if trimmed
        .get(..17)
        .is_some_and(|head| head.eq_ignore_ascii_case("CREATE OR REPLACE"))
    {
        definition.to_string()
    } else if let Some(rest) = trimmed
        .get(..6)
        .filter(|head| head.eq_ignore_ascii_case("CREATE"))
        .map(|_| &trimmed[6..])
    {
        format!("CREATE OR REPLACE{rest}")
    } else {
        definition.to_string()
    }
}

/// Strips a trailing semicolon from extracted definitions; statements are
/// joined with explicit separators at plan-assembly time.
pub(crate) fn without_trailing_semicolon(definition: &str) -> &str {
    definition.trim_end().trim_end_matches(';').trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_or_replace() {
        assert_eq!(
            with_or_replace("CREATE RULE r AS ON SELECT"),
            "CREATE OR REPLACE RULE r AS ON SELECT"
        );
        assert_eq!(
            with_or_replace("CREATE OR REPLACE FUNCTION f() ..."),
            "CREATE OR REPLACE FUNCTION f() ..."
        );
    }

    #[test]
    fn test_without_trailing_semicolon() {
        assert_eq!(without_trailing_semicolon("SELECT 1;\n"), "SELECT 1");
        assert_eq!(without_trailing_semicolon("SELECT 1"), "SELECT 1");
    }
}
