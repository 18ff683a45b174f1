use core::any::TypeId;

use super::instantiate::InstantiateErrorKind;
use crate::{any::TypeInfo, identifier::Identifier, payload::Shape};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Identifier {identifier} not in registry")]
    NotRegistered { identifier: Identifier },
    #[error("Payload for identifier {identifier} is empty")]
    EmptyPayload { identifier: Identifier },
    #[error("Identifier {identifier} resolved to {actual}, expected {expected}")]
    WrongShape {
        identifier: Identifier,
        expected: Shape,
        actual: Shape,
    },
    #[error("Incorrect type resolved for identifier {identifier}. Expected: {}, actual: {actual:?}", expected.name)]
    IncorrectType {
        identifier: Identifier,
        expected: TypeInfo,
        actual: TypeId,
    },
    #[error("Container was dropped before identifier {identifier} could be resolved")]
    ContainerDropped { identifier: Identifier },
    #[error(transparent)]
    Instantiate(InstantiateErrorKind),
}
