use alloc::sync::Arc;
use core::fmt::{self, Debug, Formatter};
use tracing::debug;

use crate::{any::RcAny, errors::InstantiateErrorKind, Container};

/// Constructible type, the counterpart of a class registered with `as_newable`.
///
/// The container is passed so the constructor can create its
/// [`crate::Inject`] accessors with explicit member names.
pub trait Newable: Sized + Send + Sync + 'static {
    fn new(container: &Container) -> Result<Self, InstantiateErrorKind>;
}

type ProduceFn = dyn Fn(&Container) -> Result<RcAny, InstantiateErrorKind> + Send + Sync;

/// Type-erased newable or factory
#[derive(Clone)]
pub struct Producer(Arc<ProduceFn>);

impl Debug for Producer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Producer")
    }
}

impl Producer {
    #[inline]
    pub(crate) fn produce(&self, container: &Container) -> Result<RcAny, InstantiateErrorKind> {
        (self.0)(container)
    }
}

/// Producer constructing `T` through [`Newable::new`]
#[inline]
#[must_use]
pub fn newable<T: Newable>() -> Producer {
    newable_as::<T, T>()
}

/// Producer constructing `T` and converting it into `P`.
///
/// Used to put several newables behind one type, e.g. `Box<dyn Route>`.
#[must_use]
pub fn newable_as<T, P>() -> Producer
where
    T: Newable + Into<P>,
    P: Send + Sync + 'static,
{
    Producer(Arc::new(|container: &Container| {
        let instance: P = T::new(container)?.into();
        debug!(newable = core::any::type_name::<T>(), "Constructed");
        Ok(Arc::new(instance) as RcAny)
    }))
}

/// Producer calling a zero-argument function
#[must_use]
pub fn factory<F, T, E>(factory: F) -> Producer
where
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
    T: Send + Sync + 'static,
    E: Into<InstantiateErrorKind>,
{
    Producer(Arc::new(move |_: &Container| match factory() {
        Ok(value) => {
            debug!(factory = core::any::type_name::<T>(), "Produced");
            Ok(Arc::new(value) as RcAny)
        }
        Err(err) => Err(err.into()),
    }))
}
