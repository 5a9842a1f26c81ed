use crate::catalog::id::ObjectId;
use crate::catalog::language::Language;
use crate::change::quote::quote_ident;
use crate::change::{ChangeKind, EmitContext, Operation, Scope};
use crate::error::EmitError;

#[derive(Debug, Clone)]
pub enum LanguageChange {
    Create { language: Language },
    Drop { name: String },
}

impl ChangeKind for LanguageChange {
    fn object_type(&self) -> &'static str {
        "language"
    }

    fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Drop { .. } => Operation::Drop,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Object
    }

    fn target(&self) -> ObjectId {
        let name = match self {
            Self::Create { language } => &language.name,
            Self::Drop { name } => name,
        };
        ObjectId::Language { name: name.clone() }
    }

    fn creates(&self) -> Vec<ObjectId> {
        match self {
            Self::Create { .. } => vec![self.target()],
            Self::Drop { .. } => Vec::new(),
        }
    }

    fn requires(&self) -> Vec<ObjectId> {
        Vec::new()
    }

    fn drops(&self) -> Vec<ObjectId> {
        match self {
            Self::Drop { .. } => vec![self.target()],
            Self::Create { .. } => Vec::new(),
        }
    }

    fn emit(&self, ctx: &EmitContext) -> Result<String, EmitError> {
        Ok(match self {
            Self::Create { language } => format!(
                "{} {}",
                ctx.kw("CREATE LANGUAGE"),
                quote_ident(&language.name)
            ),
            Self::Drop { name } => format!("{} {}", ctx.kw("DROP LANGUAGE"), quote_ident(name)),
        })
    }
}
