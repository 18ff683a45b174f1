use alloc::{sync::Arc, vec::Vec};
use core::fmt::{self, Display, Formatter};

use crate::{
    any::RcAny,
    config::Config,
    errors::InstantiateErrorKind,
    producer::{factory, newable, Newable, Producer},
};

/// Field of a [`Payload`] a resolution can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerKind {
    Cache,
    Value,
    Array,
    Newable,
    NewableArray,
    Factory,
    FactoryArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Array,
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("a scalar"),
            Self::Array => f.write_str("an array"),
        }
    }
}

/// Output of a resolution: a single value or an ordered sequence of values
#[derive(Debug, Clone)]
pub enum Produced {
    Scalar(RcAny),
    Array(Vec<RcAny>),
}

impl Produced {
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> Shape {
        match self {
            Self::Scalar(_) => Shape::Scalar,
            Self::Array(_) => Shape::Array,
        }
    }
}

/// Registered recipe for producing the values of one identifier.
///
/// Several producer fields may be set at once, the resolution engine picks by priority:
/// cache (singleton only), value, array, newable, newable array, factory, factory array.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub(crate) value: Option<RcAny>,
    pub(crate) array: Option<Vec<RcAny>>,
    pub(crate) newable: Option<Producer>,
    pub(crate) newable_array: Option<Vec<Producer>>,
    pub(crate) factory: Option<Producer>,
    pub(crate) factory_array: Option<Vec<Producer>>,
    pub(crate) cache: Option<Produced>,
    pub(crate) config: Config,
}

impl Payload {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    #[inline]
    #[must_use]
    pub const fn is_singleton(&self) -> bool {
        self.config.singleton
    }

    #[inline]
    #[must_use]
    pub const fn is_no_cache(&self) -> bool {
        self.config.no_cache
    }

    #[inline]
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Sets the literal value.
    /// Unlike [`crate::BindBuilder::as_value`] this doesn't touch the cache.
    #[must_use]
    pub fn with_value<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.value = Some(Arc::new(value));
        self
    }

    #[must_use]
    pub fn with_array<T, I>(mut self, values: I) -> Self
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        self.array = Some(values.into_iter().map(|value| Arc::new(value) as RcAny).collect());
        self
    }

    #[must_use]
    pub fn with_newable<T: Newable>(mut self) -> Self {
        self.newable = Some(newable::<T>());
        self
    }

    #[must_use]
    pub fn with_newable_array<I: IntoIterator<Item = Producer>>(mut self, newables: I) -> Self {
        self.newable_array = Some(newables.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_factory<F, T, E>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        T: Send + Sync + 'static,
        E: Into<InstantiateErrorKind>,
    {
        self.factory = Some(factory(f));
        self
    }

    #[must_use]
    pub fn with_factory_array<I: IntoIterator<Item = Producer>>(mut self, factories: I) -> Self {
        self.factory_array = Some(factories.into_iter().collect());
        self
    }

    /// Whether the field of the given kind is populated
    #[must_use]
    pub const fn has(&self, kind: ProducerKind) -> bool {
        match kind {
            ProducerKind::Cache => self.cache.is_some(),
            ProducerKind::Value => self.value.is_some(),
            ProducerKind::Array => self.array.is_some(),
            ProducerKind::Newable => self.newable.is_some(),
            ProducerKind::NewableArray => self.newable_array.is_some(),
            ProducerKind::Factory => self.factory.is_some(),
            ProducerKind::FactoryArray => self.factory_array.is_some(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.array.is_none()
            && self.newable.is_none()
            && self.newable_array.is_none()
            && self.factory.is_none()
            && self.factory_array.is_none()
            && self.cache.is_none()
    }

    /// Decides how a resolution of this payload proceeds.
    /// Ready values are cloned out so the registry lock can be released before producers run.
    pub(crate) fn plan(&self, kind: Option<ProducerKind>) -> Plan {
        let Some(kind) = kind else {
            if self.config.singleton {
                if let Some(cache) = &self.cache {
                    return Plan::Cached(cache.clone());
                }
            }
            return self.plan_default();
        };

        let plan = match kind {
            ProducerKind::Cache => self.cache.clone().map(Plan::Cached),
            ProducerKind::Value => self.value.clone().map(|value| Plan::Ready(Produced::Scalar(value))),
            ProducerKind::Array => self.array.clone().map(|array| Plan::Ready(Produced::Array(array))),
            ProducerKind::Newable => self.newable.clone().map(Plan::Produce),
            ProducerKind::NewableArray => self.newable_array.clone().map(Plan::ProduceArray),
            ProducerKind::Factory => self.factory.clone().map(Plan::Produce),
            ProducerKind::FactoryArray => self.factory_array.clone().map(Plan::ProduceArray),
        };
        plan.unwrap_or(Plan::Empty)
    }

    fn plan_default(&self) -> Plan {
        if let Some(value) = &self.value {
            return Plan::Ready(Produced::Scalar(value.clone()));
        }
        if let Some(array) = &self.array {
            return Plan::Ready(Produced::Array(array.clone()));
        }
        if let Some(newable) = &self.newable {
            return Plan::Produce(newable.clone());
        }
        if let Some(newables) = &self.newable_array {
            return Plan::ProduceArray(newables.clone());
        }
        if let Some(factory) = &self.factory {
            return Plan::Produce(factory.clone());
        }
        if let Some(factories) = &self.factory_array {
            return Plan::ProduceArray(factories.clone());
        }
        Plan::Empty
    }
}

pub(crate) enum Plan {
    Cached(Produced),
    Ready(Produced),
    Produce(Producer),
    ProduceArray(Vec<Producer>),
    Empty,
}
