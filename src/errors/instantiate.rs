use alloc::boxed::Box;

use super::{inject::InjectErrorKind, registry::RegistryErrorKind, resolve::ResolveErrorKind};

/// Failure of a newable constructor or a factory
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error(transparent)]
    Resolve(Box<ResolveErrorKind>),
    #[error(transparent)]
    Inject(Box<InjectErrorKind>),
    #[error(transparent)]
    Registry(#[from] RegistryErrorKind),
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl From<ResolveErrorKind> for InstantiateErrorKind {
    fn from(err: ResolveErrorKind) -> Self {
        Self::Resolve(Box::new(err))
    }
}

impl From<InjectErrorKind> for InstantiateErrorKind {
    fn from(err: InjectErrorKind) -> Self {
        Self::Inject(Box::new(err))
    }
}

impl From<core::convert::Infallible> for InstantiateErrorKind {
    fn from(err: core::convert::Infallible) -> Self {
        match err {}
    }
}
