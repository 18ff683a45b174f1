use crate::identifier::Identifier;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryErrorKind {
    #[error("Identifier {identifier} already registered")]
    AlreadyRegistered { identifier: Identifier },
    #[error("Identifier {identifier} not in registry")]
    NotRegistered { identifier: Identifier },
}
