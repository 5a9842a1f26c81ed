//! End-to-end planning scenarios over the diff pipeline.

mod common;

use common::*;
use pgdrift::catalog::schema::SchemaDef;
use pgdrift::catalog::DepType;
use pgdrift::{plan_migration, Hooks, PlanOptions, Risk};

fn plan(source: &pgdrift::Catalog, target: &pgdrift::Catalog) -> pgdrift::Plan {
    plan_migration(source, target, &Hooks::none(), &PlanOptions::default()).expect("plan")
}

#[test]
fn test_enum_label_insertion_uses_before_anchor() {
    let mut source = catalog();
    source.insert(enum_type("public", "status", &["a", "c"]));
    let mut target = catalog();
    target.insert(enum_type("public", "status", &["a", "b", "c"]));

    let plan = plan(&source, &target);
    assert_eq!(
        plan.statements,
        vec!["ALTER TYPE public.status ADD VALUE 'b' BEFORE 'c'"]
    );
    assert_eq!(plan.risk, Risk::Safe);
}

#[test]
fn test_dropped_column_is_classified_as_data_loss() {
    let mut source = catalog();
    source.insert(table(
        "public",
        "users",
        vec![
            not_null(column("id", 1, "bigint")),
            column("email", 2, "text"),
        ],
    ));
    let mut target = catalog();
    target.insert(table("public", "users", vec![not_null(column("id", 1, "bigint"))]));

    let plan = plan(&source, &target);
    assert_eq!(
        plan.statements,
        vec!["ALTER TABLE public.users DROP COLUMN email"]
    );
    assert_eq!(
        plan.risk,
        Risk::DataLoss {
            statements: vec!["ALTER TABLE public.users DROP COLUMN email".to_string()]
        }
    );
}

#[test]
fn test_column_type_change_replaces_dependent_view() {
    let mut source = catalog();
    source.insert(table(
        "public",
        "orders",
        vec![not_null(column("id", 1, "bigint")), column("total", 2, "integer")],
    ));
    source.insert(view(
        "public",
        "orders_view",
        "SELECT id, total FROM public.orders",
    ));
    source.depends.push(depend(
        view_id("public", "orders_view"),
        column_id("public", "orders", "total"),
        DepType::Normal,
    ));

    let mut target = catalog();
    target.insert(table(
        "public",
        "orders",
        vec![not_null(column("id", 1, "bigint")), column("total", 2, "bigint")],
    ));
    target.insert(view(
        "public",
        "orders_view",
        "SELECT id, total FROM public.orders",
    ));

    let plan = plan(&source, &target);
    let drop_pos = plan
        .statements
        .iter()
        .position(|s| s == "DROP VIEW public.orders_view")
        .expect("view drop");
    let alter_pos = plan
        .statements
        .iter()
        .position(|s| s == "ALTER TABLE public.orders ALTER COLUMN total TYPE bigint")
        .expect("column alter");
    let create_pos = plan
        .statements
        .iter()
        .position(|s| s.starts_with("CREATE VIEW public.orders_view"))
        .expect("view create");

    assert!(drop_pos < alter_pos);
    assert!(alter_pos < create_pos);
}

#[test]
fn test_identical_catalogs_diff_to_nothing() {
    let mut cat = catalog();
    cat.insert(SchemaDef {
        name: "app".into(),
        owner: OWNER.into(),
        comment: Some("application schema".into()),
        privileges: Vec::new(),
    });
    cat.insert(enum_type("app", "status", &["new", "done"]));
    let mut users = table(
        "app",
        "users",
        vec![
            not_null(with_default(
                column("id", 1, "bigint"),
                "nextval('app.users_id_seq'::regclass)",
            )),
            column("email", 2, "text"),
        ],
    );
    users.comment = Some("registered users".into());
    cat.insert(users);
    cat.insert(sequence("app", "users_id_seq", Some("app.users.id")));
    cat.insert(view("app", "emails", "SELECT email FROM app.users"));

    let plan = plan(&cat, &cat);
    assert!(plan.statements.is_empty(), "{:?}", plan.statements);
    assert_eq!(plan.source.fingerprint, plan.target.fingerprint);
}

#[test]
fn test_pipeline_is_deterministic() {
    let mut source = catalog();
    source.insert(table("public", "a", vec![column("id", 1, "bigint")]));
    let mut target = catalog();
    target.insert(table("public", "a", vec![column("id", 1, "bigint")]));
    target.insert(table("public", "b", vec![column("id", 1, "bigint")]));
    target.insert(enum_type("public", "status", &["x", "y"]));
    target.insert(view("public", "b_view", "SELECT id FROM public.b"));

    let first = plan(&source, &target).to_json();
    let second = plan(&source, &target).to_json();
    assert_eq!(first, second);
}

#[test]
fn test_fingerprints_are_sensitive_to_touched_objects() {
    let mut source = catalog();
    source.insert(table("public", "users", vec![column("id", 1, "bigint")]));
    let mut target = catalog();
    target.insert(table(
        "public",
        "users",
        vec![column("id", 1, "bigint"), column("email", 2, "text")],
    ));

    let baseline = plan(&source, &target);

    // mutate a data field of a touched object on the source side
    let mut altered_source = catalog();
    altered_source.insert(table("public", "users", vec![column("id", 1, "integer")]));
    let altered = plan(&altered_source, &target);

    assert_ne!(baseline.source.fingerprint, altered.source.fingerprint);
    assert_eq!(baseline.target.fingerprint, altered.target.fingerprint);
}

#[test]
fn test_filter_hook_suppresses_changes() {
    let mut source = catalog();
    let mut target = catalog();
    target.insert(table("public", "keep", vec![column("id", 1, "bigint")]));
    target.insert(table("public", "skip", vec![column("id", 1, "bigint")]));
    source.insert(table("public", "keep", vec![column("id", 1, "bigint")]));

    let filter = |_: &pgdrift::DiffContext<'_>, change: &pgdrift::Change| {
        use pgdrift::ChangeKind;
        !change.target().to_string().contains("skip")
    };
    let hooks = Hooks {
        filter: Some(&filter),
        serialize: None,
    };
    let plan = plan_migration(&source, &target, &hooks, &PlanOptions::default()).unwrap();
    assert!(plan.statements.is_empty(), "{:?}", plan.statements);
}

#[test]
fn test_serialize_hook_overrides_emission() {
    let source = catalog();
    let mut target = catalog();
    target.insert(SchemaDef {
        name: "app".into(),
        owner: OWNER.into(),
        comment: None,
        privileges: Vec::new(),
    });

    let serialize = |_: &pgdrift::DiffContext<'_>, change: &pgdrift::Change| {
        use pgdrift::ChangeKind;
        (change.object_type() == "schema").then(|| "CREATE SCHEMA IF NOT EXISTS app".to_string())
    };
    let hooks = Hooks {
        filter: None,
        serialize: Some(&serialize),
    };
    let plan = plan_migration(&source, &target, &hooks, &PlanOptions::default()).unwrap();
    assert_eq!(plan.statements, vec!["CREATE SCHEMA IF NOT EXISTS app"]);
}
