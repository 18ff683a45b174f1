use alloc::{sync::Arc, vec::Vec};
use tracing::debug;

use crate::{
    any::RcAny,
    errors::{InstantiateErrorKind, RegistryErrorKind},
    identifier::Identifier,
    payload::{Payload, Produced},
    producer::{factory, newable, Newable, Producer},
    Container,
};

/// What a commit writes into the payload cache
enum NewValue {
    Untouched,
    /// Concrete value, cached on commit unless caching is disabled
    Literal(Produced),
    /// Has to be produced on resolution, any previous cache is stale
    Lazy,
}

/// Contribution of an array call
enum ArrayArgs {
    Values(Vec<RcAny>),
    Newables(Vec<Producer>),
    Factories(Vec<Producer>),
}

/// Producer change recorded by a builder, applied to the live entry on commit
enum Edit {
    Untouched,
    Value(RcAny),
    Newable(Producer),
    Factory(Producer),
    Array { args: ArrayArgs, replace: bool },
}

impl Edit {
    fn apply(self, payload: &mut Payload, identifier: &Identifier) -> NewValue {
        match self {
            Self::Untouched => NewValue::Untouched,
            Self::Value(value) => {
                if payload.value.replace(value.clone()).is_some() {
                    debug!(%identifier, "Previous value replaced");
                }
                NewValue::Literal(Produced::Scalar(value))
            }
            Self::Newable(newable) => {
                payload.newable = Some(newable);
                NewValue::Lazy
            }
            Self::Factory(factory) => {
                payload.factory = Some(factory);
                NewValue::Lazy
            }
            Self::Array { args, replace } => match args {
                ArrayArgs::Values(values) => {
                    let array = merge(&mut payload.array, values, replace);
                    NewValue::Literal(Produced::Array(array.clone()))
                }
                ArrayArgs::Newables(newables) => {
                    merge(&mut payload.newable_array, newables, replace);
                    NewValue::Lazy
                }
                ArrayArgs::Factories(factories) => {
                    merge(&mut payload.factory_array, factories, replace);
                    NewValue::Lazy
                }
            },
        }
    }
}

/// Appends to the registered elements, or replaces them
fn merge<T>(field: &mut Option<Vec<T>>, items: Vec<T>, replace: bool) -> &mut Vec<T> {
    let existing = field.get_or_insert_with(Vec::new);
    if replace {
        existing.clear();
    }
    existing.extend(items);
    existing
}

struct Session {
    container: Container,
    identifier: Identifier,
    edit: Edit,
    transient: bool,
    no_cache: bool,
}

impl Session {
    /// Applies the recorded changes to the entry as it is at commit time,
    /// so builders opened on the same identifier don't overwrite each other
    fn commit(self) -> Result<Container, RegistryErrorKind> {
        let Self {
            container,
            identifier,
            edit,
            transient,
            no_cache,
        } = self;

        {
            let mut registry = container.inner.lock();
            let Some(payload) = registry.get_mut(&identifier) else {
                return Err(RegistryErrorKind::NotRegistered { identifier });
            };

            if transient {
                payload.config.singleton = false;
            }
            if no_cache {
                payload.config.no_cache = true;
            }

            match edit.apply(payload, &identifier) {
                NewValue::Literal(produced) if !payload.config.no_cache => {
                    payload.cache = Some(produced);
                    debug!(%identifier, "Cached on commit");
                }
                NewValue::Literal(_) | NewValue::Lazy => {
                    if payload.cache.take().is_some() {
                        debug!(%identifier, "Stale cache dropped");
                    }
                }
                NewValue::Untouched => {}
            }
            debug!(%identifier, "Committed");
        }

        Ok(container)
    }
}

/// First stage of the builder chain, picks the producer of the entry.
///
/// The entry itself already exists: dropping the builder without
/// configuring anything leaves it as is.
pub struct BindBuilder {
    session: Session,
}

impl BindBuilder {
    pub(crate) fn new(container: Container, identifier: Identifier) -> Self {
        Self {
            session: Session {
                container,
                identifier,
                edit: Edit::Untouched,
                transient: false,
                no_cache: false,
            },
        }
    }

    #[must_use]
    pub fn as_value<T: Send + Sync + 'static>(mut self, value: T) -> ObjectBuilder {
        self.session.edit = Edit::Value(Arc::new(value));
        ObjectBuilder { session: self.session }
    }

    /// Appends the values to the array registered at commit time
    #[must_use]
    pub fn as_array<T, I>(self, values: I) -> ArrayBuilder
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter().map(|value| Arc::new(value) as RcAny).collect();
        self.array(ArrayArgs::Values(values))
    }

    #[must_use]
    pub fn as_newable<T: Newable>(mut self) -> ObjectBuilder {
        self.session.edit = Edit::Newable(newable::<T>());
        ObjectBuilder { session: self.session }
    }

    /// Appends the newables to the ones registered at commit time.
    /// See [`crate::newable`] and [`crate::newable_as`] to create them.
    #[must_use]
    pub fn as_newable_array<I>(self, newables: I) -> ArrayBuilder
    where
        I: IntoIterator<Item = Producer>,
    {
        self.array(ArrayArgs::Newables(newables.into_iter().collect()))
    }

    #[must_use]
    pub fn as_factory<F, T, E>(mut self, f: F) -> ObjectBuilder
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        T: Send + Sync + 'static,
        E: Into<InstantiateErrorKind>,
    {
        self.session.edit = Edit::Factory(factory(f));
        ObjectBuilder { session: self.session }
    }

    /// Appends the factories to the ones registered at commit time.
    /// See [`crate::factory`] to create them.
    #[must_use]
    pub fn as_factory_array<I>(self, factories: I) -> ArrayBuilder
    where
        I: IntoIterator<Item = Producer>,
    {
        self.array(ArrayArgs::Factories(factories.into_iter().collect()))
    }

    fn array(mut self, args: ArrayArgs) -> ArrayBuilder {
        self.session.edit = Edit::Array { args, replace: false };
        ArrayBuilder { session: self.session }
    }
}

/// Scope stage of a scalar binding
#[must_use = "the payload is only stored on `done`"]
pub struct ObjectBuilder {
    session: Session,
}

impl ObjectBuilder {
    /// Every resolution invokes the producer again
    pub fn not_in_singleton_scope(mut self) -> Self {
        self.session.transient = true;
        self
    }

    /// Produced values are never written to the cache
    pub fn no_cache(mut self) -> Self {
        self.session.no_cache = true;
        self
    }

    /// Stores the changes and returns the container for further chaining
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::NotRegistered`] if the entry was removed in the meantime
    pub fn done(self) -> Result<Container, RegistryErrorKind> {
        self.session.commit()
    }
}

/// Scope stage of an array binding
#[must_use = "the payload is only stored on `done`"]
pub struct ArrayBuilder {
    session: Session,
}

impl ArrayBuilder {
    /// Every resolution invokes the producers again
    pub fn not_in_singleton_scope(mut self) -> Self {
        self.session.transient = true;
        self
    }

    /// Produced values are never written to the cache
    pub fn no_cache(mut self) -> Self {
        self.session.no_cache = true;
        self
    }

    /// Replaces the accumulated array with the elements of this call only
    pub fn override_array(mut self) -> ObjectBuilder {
        if let Edit::Array { replace, .. } = &mut self.session.edit {
            *replace = true;
        }
        ObjectBuilder { session: self.session }
    }

    /// Stores the changes and returns the container for further chaining
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::NotRegistered`] if the entry was removed in the meantime
    pub fn done(self) -> Result<Container, RegistryErrorKind> {
        self.session.commit()
    }
}
