//! Shared catalog builders for the integration tests.

#![allow(dead_code)]

use pgdrift::catalog::custom_type::{EnumLabel, TypeDef, TypeKind};
use pgdrift::catalog::sequence::Sequence;
use pgdrift::catalog::table::{Column, Table};
use pgdrift::catalog::view::View;
use pgdrift::catalog::{Catalog, DepType, DependRow};
use pgdrift::ObjectId;

pub const OWNER: &str = "postgres";

pub fn catalog() -> Catalog {
    let mut catalog = Catalog::empty();
    catalog.version = 150004;
    catalog.current_user = OWNER.to_string();
    catalog
}

pub fn column(name: &str, position: i32, data_type: &str) -> Column {
    Column::new(name, position, data_type)
}

pub fn not_null(mut column: Column) -> Column {
    column.not_null = true;
    column
}

pub fn with_default(mut column: Column, default: &str) -> Column {
    column.default = Some(default.to_string());
    column
}

pub fn table(schema: &str, name: &str, columns: Vec<Column>) -> Table {
    Table::new(schema, name, OWNER, columns)
}

pub fn view(schema: &str, name: &str, definition: &str) -> View {
    View {
        schema: schema.to_string(),
        name: name.to_string(),
        owner: OWNER.to_string(),
        definition: definition.to_string(),
        options: Vec::new(),
        comment: None,
        privileges: Vec::new(),
    }
}

pub fn enum_type(schema: &str, name: &str, labels: &[&str]) -> TypeDef {
    TypeDef {
        schema: schema.to_string(),
        name: name.to_string(),
        owner: OWNER.to_string(),
        kind: TypeKind::Enum {
            labels: labels
                .iter()
                .enumerate()
                .map(|(i, label)| EnumLabel {
                    name: label.to_string(),
                    sort_order: i as f64 + 1.0,
                })
                .collect(),
        },
        comment: None,
        privileges: Vec::new(),
    }
}

pub fn sequence(schema: &str, name: &str, owned_by: Option<&str>) -> Sequence {
    Sequence {
        schema: schema.to_string(),
        name: name.to_string(),
        owner: OWNER.to_string(),
        data_type: "bigint".to_string(),
        increment: 1,
        min_value: 1,
        max_value: 9223372036854775807,
        start_value: 1,
        cache: 1,
        cycle: false,
        owned_by: owned_by.map(str::to_string),
        comment: None,
        privileges: Vec::new(),
    }
}

pub fn depend(dependent: ObjectId, referenced: ObjectId, deptype: DepType) -> DependRow {
    DependRow {
        dependent,
        referenced,
        deptype,
    }
}

pub fn table_id(schema: &str, name: &str) -> ObjectId {
    ObjectId::Table {
        schema: schema.to_string(),
        name: name.to_string(),
    }
}

pub fn column_id(schema: &str, table: &str, name: &str) -> ObjectId {
    ObjectId::Column {
        schema: schema.to_string(),
        table: table.to_string(),
        name: name.to_string(),
    }
}

pub fn view_id(schema: &str, name: &str) -> ObjectId {
    ObjectId::View {
        schema: schema.to_string(),
        name: name.to_string(),
    }
}

pub fn sequence_id(schema: &str, name: &str) -> ObjectId {
    ObjectId::Sequence {
        schema: schema.to_string(),
        name: name.to_string(),
    }
}
