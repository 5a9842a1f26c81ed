//! Enum, composite and range types. All three share the `type:` identity
//! prefix; the kind lives in the payload.

use serde::{Deserialize, Serialize};

use crate::catalog::acl::AclItem;
use crate::catalog::id::ObjectId;
use crate::catalog::CatalogEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumLabel {
    pub name: String,
    pub sort_order: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeAttribute {
    pub name: String,
    pub position: i32,
    pub data_type: String,
    pub collation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Enum {
        labels: Vec<EnumLabel>,
    },
    Composite {
        attributes: Vec<CompositeAttribute>,
    },
    Range {
        subtype: String,
        subtype_opclass: Option<String>,
        collation: Option<String>,
        canonical: Option<String>,
        subtype_diff: Option<String>,
        multirange_type_name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub schema: String,
    pub name: String,
    pub owner: String,
    #[serde(flatten)]
    pub kind: TypeKind,
    pub comment: Option<String>,
    pub privileges: Vec<AclItem>,
}

impl TypeDef {
    pub fn enum_labels(&self) -> Option<&[EnumLabel]> {
        match &self.kind {
            TypeKind::Enum { labels } => Some(labels),
            _ => None,
        }
    }
}

impl CatalogEntity for TypeDef {
    fn id(&self) -> ObjectId {
        ObjectId::Type {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}
