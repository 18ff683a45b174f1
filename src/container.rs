use alloc::{
    sync::{Arc, Weak},
    vec::Vec,
};
use core::any::type_name;
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::{erased_type_id, RcAny, TypeInfo},
    builder::BindBuilder,
    errors::{RegistryErrorKind, ResolveErrorKind},
    identifier::Identifier,
    payload::{Payload, Plan, Produced, ProducerKind, Shape},
    producer::Producer,
    registry::Registry,
};

/// Shared handle to a registry of identifiers.
///
/// Clones point to the same registry, separate [`Container::new`] calls share nothing.
#[derive(Clone, Default)]
pub struct Container {
    pub(crate) inner: Arc<Mutex<Registry>>,
}

/// Non-owning handle, used by accessors living inside resolved values
#[derive(Clone)]
pub struct WeakContainer {
    inner: Weak<Mutex<Registry>>,
}

impl WeakContainer {
    #[inline]
    #[must_use]
    pub fn upgrade(&self) -> Option<Container> {
        self.inner.upgrade().map(|inner| Container { inner })
    }
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry::new())),
        }
    }

    #[inline]
    #[must_use]
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Registers an empty payload for the identifier and returns a builder for it.
    /// The entry is visible to [`Self::has`] right away, before any producer is configured.
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::AlreadyRegistered`] if the identifier is present
    pub fn bind(&self, identifier: impl Into<Identifier>) -> Result<BindBuilder, RegistryErrorKind> {
        let identifier = identifier.into();
        self.inner.lock().insert_new(&identifier)?;
        Ok(BindBuilder::new(self.clone(), identifier))
    }

    /// # Errors
    /// - Returns [`RegistryErrorKind::NotRegistered`] if the identifier is absent
    pub fn unbind(&self, identifier: impl Into<Identifier>) -> Result<&Self, RegistryErrorKind> {
        self.inner.lock().remove(&identifier.into())?;
        Ok(self)
    }

    /// Unbinds and binds the identifier again, dropping everything configured for it
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::NotRegistered`] if the identifier is absent
    pub fn rebind(&self, identifier: impl Into<Identifier>) -> Result<BindBuilder, RegistryErrorKind> {
        let identifier = identifier.into();
        {
            let mut registry = self.inner.lock();
            registry.remove(&identifier)?;
            registry.insert_new(&identifier)?;
        }
        Ok(BindBuilder::new(self.clone(), identifier))
    }

    /// Reopens the existing payload of the identifier.
    /// Array calls on the returned builder extend what is registered when `done` is called.
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::NotRegistered`] if the identifier is absent
    pub fn define(&self, identifier: impl Into<Identifier>) -> Result<BindBuilder, RegistryErrorKind> {
        let identifier = identifier.into();
        if !self.inner.lock().contains(&identifier) {
            return Err(RegistryErrorKind::NotRegistered { identifier });
        }
        Ok(BindBuilder::new(self.clone(), identifier))
    }

    /// Builder over the existing payload, or over a fresh one if the identifier is absent
    pub(crate) fn bind_or_define(&self, identifier: Identifier) -> BindBuilder {
        self.inner.lock().get_or_insert_new(&identifier);
        BindBuilder::new(self.clone(), identifier)
    }

    /// Replaces the payload of the identifier wholesale
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::NotRegistered`] if the identifier is absent
    pub fn override_payload(&self, identifier: impl Into<Identifier>, payload: Payload) -> Result<&Self, RegistryErrorKind> {
        self.inner.lock().replace(&identifier.into(), payload)?;
        Ok(self)
    }

    #[must_use]
    pub fn has(&self, identifier: impl Into<Identifier>) -> bool {
        self.inner.lock().contains(&identifier.into())
    }

    /// Copy of the registered payload, if any
    #[must_use]
    pub fn get(&self, identifier: impl Into<Identifier>) -> Option<Payload> {
        self.inner.lock().get(&identifier.into()).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Saves the current registry state.
    ///
    /// # Warning
    /// Snapshots form a stack: every [`Self::restore`] pops the most recent one,
    /// so they must be used in nested fashion by a single caller.
    pub fn snapshot(&self) -> &Self {
        self.inner.lock().snapshot();
        self
    }

    /// Discards every change made since the most recent [`Self::snapshot`].
    /// Does nothing if no snapshot was taken.
    pub fn restore(&self) -> &Self {
        self.inner.lock().restore();
        self
    }

    /// Removes every entry, saved snapshots are kept
    pub fn clear(&self) -> &Self {
        self.inner.lock().clear();
        self
    }
}

impl Container {
    /// Resolves a scalar value of the identifier
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NotRegistered`] if the identifier is absent
    /// - Returns [`ResolveErrorKind::EmptyPayload`] if no producer is configured
    /// - Returns [`ResolveErrorKind::WrongShape`] if an array was produced
    /// - Returns [`ResolveErrorKind::IncorrectType`] if the value isn't a `T`
    /// - Returns [`ResolveErrorKind::Instantiate`] if a newable or factory failed
    pub fn resolve<T: Send + Sync + 'static>(&self, identifier: impl Into<Identifier>) -> Result<Arc<T>, ResolveErrorKind> {
        self.resolve_scalar(identifier.into(), None)
    }

    /// Resolves a scalar value from the given payload field only
    ///
    /// # Errors
    /// See [`Self::resolve`]. An unset field gives [`ResolveErrorKind::EmptyPayload`].
    pub fn resolve_with<T: Send + Sync + 'static>(
        &self,
        identifier: impl Into<Identifier>,
        kind: ProducerKind,
    ) -> Result<Arc<T>, ResolveErrorKind> {
        self.resolve_scalar(identifier.into(), Some(kind))
    }

    /// Resolves the values of the identifier, in registration order
    ///
    /// # Errors
    /// See [`Self::resolve`], with [`ResolveErrorKind::WrongShape`] returned if a scalar was produced
    pub fn resolve_array<T: Send + Sync + 'static>(&self, identifier: impl Into<Identifier>) -> Result<Vec<Arc<T>>, ResolveErrorKind> {
        self.resolve_vec(identifier.into(), None)
    }

    /// Resolves the values of the identifier from the given payload field only
    ///
    /// # Errors
    /// See [`Self::resolve_array`]. An unset field gives [`ResolveErrorKind::EmptyPayload`].
    pub fn resolve_array_with<T: Send + Sync + 'static>(
        &self,
        identifier: impl Into<Identifier>,
        kind: ProducerKind,
    ) -> Result<Vec<Arc<T>>, ResolveErrorKind> {
        self.resolve_vec(identifier.into(), Some(kind))
    }

    /// Resolves without checking the shape or type of the result
    ///
    /// # Errors
    /// See [`Self::resolve`]
    pub fn resolve_any(&self, identifier: impl Into<Identifier>, kind: Option<ProducerKind>) -> Result<Produced, ResolveErrorKind> {
        let identifier = identifier.into();

        let span = info_span!("resolve_any", %identifier, kind = ?kind);
        let _guard = span.enter();

        self.resolve_produced(&identifier, kind)
    }
}

impl Container {
    fn resolve_scalar<T: Send + Sync + 'static>(&self, identifier: Identifier, kind: Option<ProducerKind>) -> Result<Arc<T>, ResolveErrorKind> {
        let span = info_span!("resolve", %identifier, kind = ?kind, dependency = type_name::<T>());
        let _guard = span.enter();

        match self.resolve_produced(&identifier, kind)? {
            Produced::Scalar(value) => downcast(&identifier, value),
            Produced::Array(_) => Err(wrong_shape(identifier, Shape::Scalar, Shape::Array)),
        }
    }

    fn resolve_vec<T: Send + Sync + 'static>(&self, identifier: Identifier, kind: Option<ProducerKind>) -> Result<Vec<Arc<T>>, ResolveErrorKind> {
        let span = info_span!("resolve_array", %identifier, kind = ?kind, dependency = type_name::<T>());
        let _guard = span.enter();

        match self.resolve_produced(&identifier, kind)? {
            Produced::Array(values) => values.into_iter().map(|value| downcast(&identifier, value)).collect(),
            Produced::Scalar(_) => Err(wrong_shape(identifier, Shape::Array, Shape::Scalar)),
        }
    }

    fn resolve_produced(&self, identifier: &Identifier, kind: Option<ProducerKind>) -> Result<Produced, ResolveErrorKind> {
        // The lock is released before any producer runs, producers may resolve other identifiers
        let (plan, config) = {
            let registry = self.inner.lock();
            let Some(payload) = registry.get(identifier) else {
                let err = ResolveErrorKind::NotRegistered {
                    identifier: identifier.clone(),
                };
                error!("{}", err);
                return Err(err);
            };
            (payload.plan(kind), payload.config())
        };

        let produced = match plan {
            Plan::Cached(produced) => {
                debug!("Found in cache");
                return Ok(produced);
            }
            Plan::Ready(produced) => {
                debug!("Found registered value");
                return Ok(produced);
            }
            Plan::Produce(producer) => Produced::Scalar(self.produce(&producer)?),
            Plan::ProduceArray(producers) => Produced::Array(
                producers
                    .iter()
                    .map(|producer| self.produce(producer))
                    .collect::<Result<_, _>>()?,
            ),
            Plan::Empty => {
                let err = ResolveErrorKind::EmptyPayload {
                    identifier: identifier.clone(),
                };
                error!("{}", err);
                return Err(err);
            }
        };

        if config.caches() {
            self.store_cache(identifier, produced.clone());
        }

        Ok(produced)
    }

    fn produce(&self, producer: &Producer) -> Result<RcAny, ResolveErrorKind> {
        producer.produce(self).map_err(|err| {
            error!("{}", err);
            ResolveErrorKind::Instantiate(err)
        })
    }

    fn store_cache(&self, identifier: &Identifier, produced: Produced) {
        let mut registry = self.inner.lock();
        match registry.get_mut(identifier) {
            Some(payload) if payload.config.caches() => {
                payload.cache = Some(produced);
                debug!("Cached");
            }
            Some(_) => debug!("Caching disabled while producing, not cached"),
            None => debug!("Unbound while producing, not cached"),
        }
    }
}

fn downcast<T: Send + Sync + 'static>(identifier: &Identifier, value: RcAny) -> Result<Arc<T>, ResolveErrorKind> {
    let actual = erased_type_id(&value);
    value.downcast::<T>().map_err(|_| {
        let err = ResolveErrorKind::IncorrectType {
            identifier: identifier.clone(),
            expected: TypeInfo::of::<T>(),
            actual,
        };
        error!("{}", err);
        err
    })
}

fn wrong_shape(identifier: Identifier, expected: Shape, actual: Shape) -> ResolveErrorKind {
    let err = ResolveErrorKind::WrongShape {
        identifier,
        expected,
        actual,
    };
    error!("{}", err);
    err
}
