//! Table and column changes.

use crate::catalog::id::ObjectId;
use crate::catalog::table::{Column, IdentityKind, Persistence, ReplicaIdentity, Table};
use crate::change::quote::{quote_ident, quote_qualified};
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum ColumnFacet {
    SetNotNull,
    DropNotNull,
    SetDefault(String),
    DropDefault,
    SetType {
        data_type: String,
        collation: Option<String>,
    },
    AddIdentity(IdentityKind),
    DropIdentity,
}

#[derive(Debug, Clone)]
pub enum TableChange {
    Create {
        table: Table,
    },
    Drop {
        schema: String,
        name: String,
    },
    AddColumn {
        schema: String,
        table: String,
        column: Column,
    },
    DropColumn {
        schema: String,
        table: String,
        name: String,
    },
    AlterColumn {
        schema: String,
        table: String,
        name: String,
        facet: ColumnFacet,
    },
    SetRowSecurity {
        schema: String,
        name: String,
        enabled: bool,
    },
    ForceRowSecurity {
        schema: String,
        name: String,
        forced: bool,
    },
    SetReplicaIdentity {
        schema: String,
        name: String,
        identity: ReplicaIdentity,
    },
    SetOptions {
        schema: String,
        name: String,
        options: Vec<String>,
    },
    ResetOptions {
        schema: String,
        name: String,
        options: Vec<String>,
    },
}

/// Renders one column definition as tabular cells: name, type, trailing
/// qualifiers. The caller decides whether the cells are aligned.
pub(crate) fn column_row(ctx: &EmitContext, column: &Column) -> Vec<String> {
    let mut tail = Vec::new();
    if let Some(collation) = &column.collation {
        tail.push(format!("{} {}", ctx.kw("COLLATE"), collation));
    }
    if let Some(expression) = &column.generated {
        tail.push(format!(
            "{} ({expression}) {}",
            ctx.kw("GENERATED ALWAYS AS"),
            ctx.kw("STORED")
        ));
    }
    if let Some(identity) = &column.identity {
        tail.push(match identity {
            IdentityKind::Always => ctx.kw("GENERATED ALWAYS AS IDENTITY"),
            IdentityKind::ByDefault => ctx.kw("GENERATED BY DEFAULT AS IDENTITY"),
        });
    }
    if let Some(default) = &column.default {
        tail.push(format!("{} {default}", ctx.kw("DEFAULT")));
    }
    if column.not_null {
        tail.push(ctx.kw("NOT NULL"));
    }
    vec![
        quote_ident(&column.name),
        column.data_type.clone(),
        tail.join(" "),
    ]
}

pub(crate) fn column_definition(ctx: &EmitContext, column: &Column) -> String {
    column_row(ctx, column)
        .into_iter()
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn emit_create(ctx: &EmitContext, table: &Table) -> String {
    let name = quote_qualified(&table.schema, &table.name);
    let keyword = match table.persistence {
        Persistence::Permanent => ctx.kw("CREATE TABLE"),
        Persistence::Unlogged => ctx.kw("CREATE UNLOGGED TABLE"),
    };

    // Partition children restate the parent, not a column list.
    if let (true, Some(parent), Some(bound)) = (
        table.is_partition,
        table.parent_table.as_ref(),
        table.partition_bound.as_ref(),
    ) {
        let parent = match parent.split_once('.') {
            Some((schema, name)) => quote_qualified(schema, name),
            None => quote_ident(parent),
        };
        return format!(
            "{keyword} {name} {} {parent} {bound}",
            ctx.kw("PARTITION OF")
        );
    }

    let rows: Vec<Vec<String>> = table.columns.iter().map(|c| column_row(ctx, c)).collect();
    let definitions = ctx.aligned_rows(&rows);
    let mut sql = format!("{keyword} {name} {}", ctx.paren_list(&definitions));

    if let Some(key) = &table.partition_key {
        sql.push_str(&format!(" {} {key}", ctx.kw("PARTITION BY")));
    }
    if !table.options.is_empty() {
        sql.push_str(&format!(
            " {} ({})",
            ctx.kw("WITH"),
            table.options.join(", ")
        ));
    }
    sql
}

impl TableChange {
    fn schema_and_table(&self) -> (&str, &str) {
        match self {
            Self::Create { table } => (&table.schema, &table.name),
            Self::Drop { schema, name }
            | Self::SetRowSecurity { schema, name, .. }
            | Self::ForceRowSecurity { schema, name, .. }
            | Self::SetReplicaIdentity { schema, name, .. }
            | Self::SetOptions { schema, name, .. }
            | Self::ResetOptions { schema, name, .. } => (schema, name),
            Self::AddColumn { schema, table, .. }
            | Self::DropColumn { schema, table, .. }
            | Self::AlterColumn { schema, table, .. } => (schema, table),
        }
    }

    fn table_id(&self) -> ObjectId {
        let (schema, table) = self.schema_and_table();
        ObjectId::Table {
            schema: schema.to_string(),
            name: table.to_string(),
        }
    }

    fn column_id(&self) -> Option<ObjectId> {
        let (schema, table) = self.schema_and_table();
        let column = match self {
            Self::AddColumn { column, .. } => &column.name,
            Self::DropColumn { name, .. } | Self::AlterColumn { name, .. } => name,
            _ => return None,
        };
        Some(ObjectId::Column {
            schema: schema.to_string(),
            table: table.to_string(),
            name: column.clone(),
        })
    }
}

impl ChangeKind for TableChange {
    fn object_type(&self) -> &'static str {
        "table"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } | Self::AddColumn { .. } => Operation::Create,
            Self::Drop { .. } | Self::DropColumn { .. } => Operation::Drop,
            _ => Operation::Alter,
        }
    }

    fn scope(&self) -> Scope {
        match self {
            Self::AddColumn { .. } | Self::DropColumn { .. } | Self::AlterColumn { .. } => {
                Scope::Column
            }
            _ => Scope::Object,
        }
    }

    fn target(&self) -> ObjectId {
        self.column_id().unwrap_or_else(|| self.table_id())
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { table } => {
                let mut ids = vec![self.table_id()];
                ids.extend(table.columns.iter().map(|c| table.column_id(&c.name)));
                ids
            }
            Self::AddColumn { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { table } => {
                let mut requires = vec![ObjectId::Schema {
                    name: table.schema.clone(),
                }];
                if let Some(parent) = &table.parent_table
                    && let Some((schema, name)) = parent.split_once('.')
                {
                    requires.push(ObjectId::Table {
                        schema: schema.to_string(),
                        name: name.to_string(),
                    });
                }
                requires
            }
            Self::Drop { .. } | Self::DropColumn { .. } => Vec::new(),
            Self::AddColumn { .. } => vec![self.table_id()],
            Self::AlterColumn { .. } => {
                let mut requires = vec![self.table_id()];
                requires.extend(self.column_id());
                requires
            }
            _ => vec![self.table_id()],
        }
    }

    fn drops(&self) -> Vec<ObjectId> {
        match self {
            Self::Drop { .. } | Self::DropColumn { .. } => vec![self.target()],
            _ => Vec::new(),
        }
    }

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        let alter = |rest: String| {
            let (schema, table) = self.schema_and_table();
            format!(
                "{} {} {rest}",
                ctx.kw("ALTER TABLE"),
                quote_qualified(schema, table)
            )
        };

        Ok(match self {
            Self::Create { table } => emit_create(ctx, table),
            Self::Drop { schema, name } => {
                format!("{} {}", ctx.kw("DROP TABLE"), quote_qualified(schema, name))
            }
            Self::AddColumn { column, .. } => alter(format!(
                "{} {}",
                ctx.kw("ADD COLUMN"),
                column_definition(ctx, column)
            )),
            Self::DropColumn { name, .. } => {
                alter(format!("{} {}", ctx.kw("DROP COLUMN"), quote_ident(name)))
            }
            Self::AlterColumn { name, facet, .. } => {
                let column = quote_ident(name);
                let clause = match facet {
                    ColumnFacet::SetNotNull => {
                        format!("{} {column} {}", ctx.kw("ALTER COLUMN"), ctx.kw("SET NOT NULL"))
                    }
                    ColumnFacet::DropNotNull => {
                        format!("{} {column} {}", ctx.kw("ALTER COLUMN"), ctx.kw("DROP NOT NULL"))
                    }
                    ColumnFacet::SetDefault(default) => format!(
                        "{} {column} {} {default}",
                        ctx.kw("ALTER COLUMN"),
                        ctx.kw("SET DEFAULT")
                    ),
                    ColumnFacet::DropDefault => {
                        format!("{} {column} {}", ctx.kw("ALTER COLUMN"), ctx.kw("DROP DEFAULT"))
                    }
                    ColumnFacet::SetType {
                        data_type,
                        collation,
                    } => {
                        let mut clause = format!(
                            "{} {column} {} {data_type}",
                            ctx.kw("ALTER COLUMN"),
                            ctx.kw("TYPE")
                        );
                        if let Some(collation) = collation {
                            clause.push_str(&format!(" {} {collation}", ctx.kw("COLLATE")));
                        }
                        clause
                    }
                    ColumnFacet::AddIdentity(kind) => format!(
                        "{} {column} {}",
                        ctx.kw("ALTER COLUMN"),
                        match kind {
                            IdentityKind::Always => ctx.kw("ADD GENERATED ALWAYS AS IDENTITY"),
                            IdentityKind::ByDefault => {
                                ctx.kw("ADD GENERATED BY DEFAULT AS IDENTITY")
                            }
                        }
                    ),
                    ColumnFacet::DropIdentity => {
                        format!("{} {column} {}", ctx.kw("ALTER COLUMN"), ctx.kw("DROP IDENTITY"))
                    }
                };
                alter(clause)
            }
            Self::SetRowSecurity { enabled, .. } => alter(if *enabled {
                ctx.kw("ENABLE ROW LEVEL SECURITY")
            } else {
                ctx.kw("DISABLE ROW LEVEL SECURITY")
            }),
            Self::ForceRowSecurity { forced, .. } => alter(if *forced {
                ctx.kw("FORCE ROW LEVEL SECURITY")
            } else {
                ctx.kw("NO FORCE ROW LEVEL SECURITY")
            }),
            Self::SetReplicaIdentity { identity, .. } => alter(format!(
                "{} {}",
                ctx.kw("REPLICA IDENTITY"),
                match identity {
                    ReplicaIdentity::Default => ctx.kw("DEFAULT"),
                    ReplicaIdentity::Full => ctx.kw("FULL"),
                    ReplicaIdentity::Nothing => ctx.kw("NOTHING"),
                    ReplicaIdentity::Index => ctx.kw("USING INDEX"),
                }
            )),
            Self::SetOptions { options, .. } => {
                alter(format!("{} ({})", ctx.kw("SET"), options.join(", ")))
            }
            Self::ResetOptions { options, .. } => {
                alter(format!("{} ({})", ctx.kw("RESET"), options.join(", ")))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::context::{CommaStyle, KeywordCase, SqlFormat};

    fn users() -> Table {
        let mut id = Column::new("id", 1, "bigint");
        id.not_null = true;
        id.default = Some("nextval('public.users_id_seq'::regclass)".into());
        let email = Column::new("email", 2, "text");
        Table::new("public", "users", "postgres", vec![id, email])
    }

    #[test]
    fn test_create_table_plain() {
        let change = TableChange::Create { table: users() };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "CREATE TABLE public.users (id bigint DEFAULT \
             nextval('public.users_id_seq'::regclass) NOT NULL, email text)"
        );
    }

    #[test]
    fn test_create_table_formatted_aligns_columns() {
        let ctx = EmitContext::formatted(SqlFormat {
            enabled: true,
            keyword_case: KeywordCase::Preserve,
            line_width: 40,
            indent_width: 4,
            comma_style: CommaStyle::Trailing,
            align_columns: true,
        });
        let change = TableChange::Create { table: users() };
        let sql = change.emit(&ctx).unwrap();
        assert!(sql.contains("id    bigint"));
        assert!(sql.contains("email text"));
        assert!(sql.starts_with("CREATE TABLE public.users (\n"));
    }

    #[test]
    fn test_drop_column() {
        let change = TableChange::DropColumn {
            schema: "public".into(),
            table: "users".into(),
            name: "email".into(),
        };
        assert_eq!(
            change.emit(&EmitContext::plain()).unwrap(),
            "ALTER TABLE public.users DROP COLUMN email"
        );
        assert_eq!(
            change.drops(),
            vec![ObjectId::Column {
                schema: "public".into(),
                table: "users".into(),
                name: "email".into()
            }]
        );
    }

    #[test]
    fn test_create_creates_columns_too() {
        let change = TableChange::Create { table: users() };
        let creates = change.creates();
        assert!(creates.contains(&ObjectId::Table {
            schema: "public".into(),
            name: "users".into()
        }));
        assert!(creates.contains(&ObjectId::Column {
            schema: "public".into(),
            table: "users".into(),
            name: "id".into()
        }));
    }
}
