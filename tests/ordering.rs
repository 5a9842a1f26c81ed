//! Ordering guarantees: phase partitioning, custom constraints and the
//! sequence-ownership cycle breaker.

mod common;

use common::*;
use pgdrift::catalog::acl::{AclItem, DefaultAclEntry};
use pgdrift::catalog::role::Role;
use pgdrift::catalog::schema::SchemaDef;
use pgdrift::catalog::DepType;
use pgdrift::diff::expand::expand_replacements;
use pgdrift::diff::{diff_catalogs, DiffContext};
use pgdrift::sort::sort_changes;
use pgdrift::{plan_migration, ChangeKind, Hooks, PlanOptions};

fn plan(source: &pgdrift::Catalog, target: &pgdrift::Catalog) -> pgdrift::Plan {
    plan_migration(source, target, &Hooks::none(), &PlanOptions::default()).expect("plan")
}

fn app_schema() -> SchemaDef {
    SchemaDef {
        name: "app".into(),
        owner: OWNER.into(),
        comment: None,
        privileges: Vec::new(),
    }
}

#[test]
fn test_sequence_ownership_cycle_resolves() {
    let source = catalog();

    let mut target = catalog();
    target.insert(table(
        "public",
        "users",
        vec![not_null(with_default(
            column("id", 1, "bigint"),
            "nextval('public.users_id_seq'::regclass)",
        ))],
    ));
    target.insert(sequence("public", "users_id_seq", Some("public.users.id")));
    // the sequence auto-depends on its owning column, the column default
    // depends on the sequence
    target.depends.push(depend(
        sequence_id("public", "users_id_seq"),
        column_id("public", "users", "id"),
        DepType::Auto,
    ));
    target.depends.push(depend(
        column_id("public", "users", "id"),
        sequence_id("public", "users_id_seq"),
        DepType::Normal,
    ));

    let plan = plan(&source, &target);
    let seq = plan
        .statements
        .iter()
        .position(|s| s.starts_with("CREATE SEQUENCE public.users_id_seq"))
        .expect("sequence create");
    let table = plan
        .statements
        .iter()
        .position(|s| s.starts_with("CREATE TABLE public.users"))
        .expect("table create");
    let owned = plan
        .statements
        .iter()
        .position(|s| s == "ALTER SEQUENCE public.users_id_seq OWNED BY public.users.id")
        .expect("ownership");

    assert!(seq < table);
    assert!(table < owned);
}

#[test]
fn test_default_privileges_emit_between_dependencies_and_creates() {
    let source = catalog();

    let mut target = catalog();
    target.insert(app_schema());
    target.insert(Role::new("reader"));
    target.insert(table("app", "t", vec![column("id", 1, "bigint")]));
    target.default_privileges.entries.push(DefaultAclEntry {
        grantor: OWNER.into(),
        objtype: 'r',
        schema: Some("app".into()),
        acl: vec![
            AclItem::new(OWNER, "SELECT", true),
            AclItem::new("reader", "SELECT", false),
        ],
    });

    let plan = plan(&source, &target);
    let schema = plan
        .statements
        .iter()
        .position(|s| s == "CREATE SCHEMA app")
        .expect("schema");
    let role = plan
        .statements
        .iter()
        .position(|s| s.starts_with("CREATE ROLE reader"))
        .expect("role");
    let defacl = plan
        .statements
        .iter()
        .position(|s| {
            s == "ALTER DEFAULT PRIVILEGES FOR ROLE postgres IN SCHEMA app \
                  GRANT SELECT ON TABLES TO reader"
        })
        .expect("default privileges");
    let table = plan
        .statements
        .iter()
        .position(|s| s.starts_with("CREATE TABLE app.t"))
        .expect("table");

    assert!(schema < defacl);
    assert!(role < defacl);
    assert!(defacl < table);
}

#[test]
fn test_phase_monotonicity() {
    let mut source = catalog();
    source.insert(table("public", "old", vec![column("id", 1, "bigint")]));
    source.insert(view("public", "old_view", "SELECT id FROM public.old"));
    source.depends.push(depend(
        view_id("public", "old_view"),
        table_id("public", "old"),
        DepType::Normal,
    ));

    let mut target = catalog();
    target.insert(app_schema());
    let mut t = table("app", "fresh", vec![column("id", 1, "bigint")]);
    t.comment = Some("fresh table".into());
    target.insert(t);

    let plan = plan(&source, &target);
    let statements = &plan.statements;

    let last_drop = statements
        .iter()
        .rposition(|s| s.starts_with("DROP"))
        .expect("drops");
    let first_create = statements
        .iter()
        .position(|s| s.starts_with("CREATE"))
        .expect("creates");
    assert!(last_drop < first_create, "{statements:?}");

    // comments trail the creates they decorate
    let comment = statements
        .iter()
        .position(|s| s.starts_with("COMMENT ON TABLE app.fresh"))
        .expect("comment");
    let create_table = statements
        .iter()
        .position(|s| s.starts_with("CREATE TABLE app.fresh"))
        .expect("table");
    assert!(create_table < comment);

    // dependents drop before their dependencies
    let drop_view = statements
        .iter()
        .position(|s| s == "DROP VIEW public.old_view")
        .expect("view drop");
    let drop_table = statements
        .iter()
        .position(|s| s == "DROP TABLE public.old")
        .expect("table drop");
    assert!(drop_view < drop_table);
}

#[test]
fn test_every_requirement_is_satisfied_or_preexisting() {
    let mut source = catalog();
    source.insert(table("public", "legacy", vec![column("id", 1, "bigint")]));

    let mut target = catalog();
    target.insert(app_schema());
    target.insert(Role::new("reader"));
    target.insert(enum_type("app", "status", &["new", "done"]));
    let mut users = table(
        "app",
        "users",
        vec![
            not_null(column("id", 1, "bigint")),
            column("state", 2, "app.status"),
        ],
    );
    users.privileges = vec![
        AclItem::new(OWNER, "SELECT", true),
        AclItem::new("reader", "SELECT", false),
    ];
    target.insert(users);
    target.insert(view("app", "user_states", "SELECT state FROM app.users"));
    target.depends.push(depend(
        column_id("app", "users", "state"),
        pgdrift::ObjectId::Type {
            schema: "app".into(),
            name: "status".into(),
        },
        DepType::Normal,
    ));
    target.depends.push(depend(
        view_id("app", "user_states"),
        column_id("app", "users", "state"),
        DepType::Normal,
    ));

    let ctx = DiffContext::new(&source, &target);
    let changes = expand_replacements(diff_catalogs(&ctx), &ctx);
    let ordered = sort_changes(&changes, &ctx).expect("order");

    let mut created: Vec<pgdrift::ObjectId> = Vec::new();
    for change in &ordered {
        for required in change.requires() {
            let satisfied = created
                .iter()
                .any(|c| *c == required || *c == required.owning_object())
                || source.contains_id(&required)
                || source.contains_id(&required.owning_object());
            assert!(
                satisfied,
                "{} requires {} before any change creates it",
                change.describe(),
                required
            );
        }
        created.extend(change.creates());
    }
}
