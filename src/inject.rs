//! Declarative markers.
//!
//! Markers are plain registration calls meant to run once, when the application wires itself up:
//! - [`InjectableDecorator`] registers a [`Newable`] under an identifier (its own type by default).
//! - [`InjectableArrayDecorator`] appends a [`Newable`] to a collection, in call order.
//! - [`InjectDecorator`] creates read-only accessors resolving an identifier on every read.
//!
//! Every marker is bound to the container it was created from, several containers can coexist.

use alloc::{sync::Arc, vec::Vec};
use core::marker::PhantomData;
use tracing::debug;

use crate::{
    errors::{InjectErrorKind, RegistryErrorKind, ResolveErrorKind},
    identifier::Identifier,
    producer::{newable_as, Newable},
    Container, WeakContainer,
};

impl Container {
    #[inline]
    #[must_use]
    pub fn create_inject_decorator(&self) -> InjectDecorator {
        InjectDecorator { container: self.clone() }
    }

    #[inline]
    #[must_use]
    pub fn create_injectable_decorator(&self) -> InjectableDecorator {
        InjectableDecorator { container: self.clone() }
    }

    #[inline]
    #[must_use]
    pub fn create_injectable_array_decorator(&self) -> InjectableArrayDecorator {
        InjectableArrayDecorator { container: self.clone() }
    }
}

#[derive(Clone)]
pub struct InjectableDecorator {
    container: Container,
}

impl InjectableDecorator {
    /// Registers `T` as a newable under its own type token
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::NotRegistered`] if the entry is removed while being registered
    pub fn apply<T: Newable>(&self) -> Result<&Self, RegistryErrorKind> {
        self.apply_with::<T>(Identifier::of::<T>())
    }

    /// Registers `T` as a newable under the identifier.
    /// An already registered identifier is redefined instead of bound twice.
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::NotRegistered`] if the entry is removed while being registered
    pub fn apply_with<T: Newable>(&self, identifier: impl Into<Identifier>) -> Result<&Self, RegistryErrorKind> {
        let identifier = identifier.into();
        debug!(%identifier, newable = core::any::type_name::<T>(), "Injectable");

        self.container.bind_or_define(identifier).as_newable::<T>().done()?;
        Ok(self)
    }
}

#[derive(Clone)]
pub struct InjectableArrayDecorator {
    container: Container,
}

impl InjectableArrayDecorator {
    /// Appends `T` to the newables collected under the identifier
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::NotRegistered`] if the entry is removed while being registered
    pub fn apply<T: Newable>(&self, identifier: impl Into<Identifier>) -> Result<&Self, RegistryErrorKind> {
        self.apply_as::<T, T>(identifier)
    }

    /// Appends `T` to the newables collected under the identifier, resolved as `P`.
    /// Lets unrelated types form one collection, e.g. `Box<dyn Route>`.
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::NotRegistered`] if the entry is removed while being registered
    pub fn apply_as<T, P>(&self, identifier: impl Into<Identifier>) -> Result<&Self, RegistryErrorKind>
    where
        T: Newable + Into<P>,
        P: Send + Sync + 'static,
    {
        let identifier = identifier.into();
        debug!(%identifier, newable = core::any::type_name::<T>(), "Injectable array");

        self.container
            .bind_or_define(identifier)
            .as_newable_array([newable_as::<T, P>()])
            .done()?;
        Ok(self)
    }
}

/// Creates [`Inject`] and [`InjectArray`] accessors.
///
/// The member name stands in for the identifier when none is given,
/// and the identifier is bound if absent, so it can be defined later.
#[derive(Clone)]
pub struct InjectDecorator {
    container: Container,
}

impl InjectDecorator {
    #[must_use]
    pub fn field<T: Send + Sync + 'static>(&self, member: &'static str) -> Inject<T> {
        self.field_with(member, member)
    }

    #[must_use]
    pub fn field_with<T: Send + Sync + 'static>(&self, member: &'static str, identifier: impl Into<Identifier>) -> Inject<T> {
        let identifier = self.ensure_bound(member, identifier.into());
        Inject {
            container: self.container.downgrade(),
            identifier,
            member,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn array_field<T: Send + Sync + 'static>(&self, member: &'static str) -> InjectArray<T> {
        self.array_field_with(member, member)
    }

    #[must_use]
    pub fn array_field_with<T: Send + Sync + 'static>(&self, member: &'static str, identifier: impl Into<Identifier>) -> InjectArray<T> {
        let identifier = self.ensure_bound(member, identifier.into());
        InjectArray {
            container: self.container.downgrade(),
            identifier,
            member,
            _marker: PhantomData,
        }
    }

    fn ensure_bound(&self, member: &'static str, identifier: Identifier) -> Identifier {
        self.container.inner.lock().get_or_insert_new(&identifier);
        debug!(%identifier, member, "Inject");
        identifier
    }
}

/// Read-only accessor resolving a scalar on every read.
/// Memoization, if any, is the one of the registered payload.
pub struct Inject<T> {
    container: WeakContainer,
    identifier: Identifier,
    member: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Inject<T> {
    /// # Errors
    /// - Returns [`ResolveErrorKind::ContainerDropped`] if the container no longer exists
    /// - Returns errors of [`Container::resolve`]
    pub fn get(&self) -> Result<Arc<T>, ResolveErrorKind> {
        upgrade(&self.container, &self.identifier)?.resolve(&self.identifier)
    }

    /// # Errors
    /// Always returns [`InjectErrorKind::ReadOnly`]
    pub fn set(&self, _value: T) -> Result<(), InjectErrorKind> {
        Err(InjectErrorKind::ReadOnly { member: self.member })
    }
}

impl<T> Inject<T> {
    #[inline]
    #[must_use]
    pub const fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    #[inline]
    #[must_use]
    pub const fn member(&self) -> &'static str {
        self.member
    }
}

impl<T> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            identifier: self.identifier.clone(),
            member: self.member,
            _marker: PhantomData,
        }
    }
}

/// Read-only accessor resolving a collection on every read
pub struct InjectArray<T> {
    container: WeakContainer,
    identifier: Identifier,
    member: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> InjectArray<T> {
    /// # Errors
    /// - Returns [`ResolveErrorKind::ContainerDropped`] if the container no longer exists
    /// - Returns errors of [`Container::resolve_array`]
    pub fn get(&self) -> Result<Vec<Arc<T>>, ResolveErrorKind> {
        upgrade(&self.container, &self.identifier)?.resolve_array(&self.identifier)
    }

    /// # Errors
    /// Always returns [`InjectErrorKind::ReadOnly`]
    pub fn set(&self, _values: Vec<T>) -> Result<(), InjectErrorKind> {
        Err(InjectErrorKind::ReadOnly { member: self.member })
    }
}

impl<T> InjectArray<T> {
    #[inline]
    #[must_use]
    pub const fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    #[inline]
    #[must_use]
    pub const fn member(&self) -> &'static str {
        self.member
    }
}

impl<T> Clone for InjectArray<T> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            identifier: self.identifier.clone(),
            member: self.member,
            _marker: PhantomData,
        }
    }
}

fn upgrade(container: &WeakContainer, identifier: &Identifier) -> Result<Container, ResolveErrorKind> {
    container.upgrade().ok_or_else(|| ResolveErrorKind::ContainerDropped {
        identifier: identifier.clone(),
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{Inject, InjectArray};
    use crate::{
        errors::{InjectErrorKind, InstantiateErrorKind, ResolveErrorKind},
        identifier::Identifier,
        Container, Newable,
    };

    use alloc::{
        boxed::Box,
        string::{String, ToString as _},
        sync::Arc,
    };
    use tracing_test::traced_test;
    #[allow(unused_imports)]
    use std::format;

    struct Foo {
        foo: Inject<String>,
        bar: Inject<String>,
    }

    impl Newable for Foo {
        fn new(container: &Container) -> Result<Self, InstantiateErrorKind> {
            let inject = container.create_inject_decorator();
            Ok(Self {
                foo: inject.field("foo"),
                bar: inject.field("bar"),
            })
        }
    }

    #[test]
    #[traced_test]
    fn test_injectable_default_identifier() {
        let container = Container::new();
        container.create_injectable_decorator().apply::<Foo>().unwrap();

        assert!(container.has(Identifier::of::<Foo>()));
        assert!(container.resolve::<Foo>(Identifier::of::<Foo>()).is_ok());
    }

    #[test]
    #[traced_test]
    fn test_injectable_is_idempotent() {
        let container = Container::new();
        let injectable = container.create_injectable_decorator();
        injectable.apply_with::<Foo>("foo_service").unwrap();
        injectable.apply_with::<Foo>("foo_service").unwrap();
        assert_eq!(container.len(), 1);

        assert!(container.resolve::<Foo>("foo_service").is_ok());
        assert_eq!(container.len(), 3);
    }

    #[test]
    #[traced_test]
    fn test_inject_reads_latest_definition() {
        let container = Container::new();
        container.create_injectable_decorator().apply::<Foo>().unwrap();

        let foo = container.resolve::<Foo>(Identifier::of::<Foo>()).unwrap();
        assert!(container.has("foo"));
        assert!(container.has("bar"));
        assert!(matches!(foo.foo.get(), Err(ResolveErrorKind::EmptyPayload { .. })));

        container.define("foo").unwrap().as_value("MyFooValue".to_string()).done().unwrap();
        assert_eq!(*foo.foo.get().unwrap(), "MyFooValue");

        container.define("bar").unwrap().as_value("MyBarValue".to_string()).done().unwrap();
        assert_eq!(*foo.bar.get().unwrap(), "MyBarValue");

        container.define("foo").unwrap().as_value("MyBarValue".to_string()).done().unwrap();
        assert_eq!(*foo.foo.get().unwrap(), "MyBarValue");

        container.define("bar").unwrap().as_value("MyFooValue".to_string()).done().unwrap();
        assert_eq!(*foo.bar.get().unwrap(), "MyFooValue");
    }

    #[test]
    #[traced_test]
    fn test_inject_is_readonly() {
        let container = Container::new();
        let foo = container.create_inject_decorator().field::<String>("foo");

        assert_eq!(foo.member(), "foo");
        assert_eq!(foo.identifier(), &Identifier::from("foo"));
        assert_eq!(
            foo.set("bar".to_string()).unwrap_err(),
            InjectErrorKind::ReadOnly { member: "foo" }
        );
    }

    #[test]
    #[traced_test]
    fn test_inject_keeps_existing_binding() {
        let container = Container::new();
        container.bind("config").unwrap().as_value(5u8).done().unwrap();

        let config = container.create_inject_decorator().field_with::<u8>("port", "config");
        assert!(!container.has("port"));
        assert_eq!(*config.get().unwrap(), 5);
    }

    #[test]
    #[traced_test]
    fn test_inject_after_container_dropped() {
        let container = Container::new();
        let foo = container.create_inject_decorator().field::<String>("foo");
        drop(container);

        assert!(matches!(foo.get(), Err(ResolveErrorKind::ContainerDropped { .. })));
    }

    trait Route: Send + Sync {
        fn path(&self) -> &'static str;
    }

    struct FooRoute;
    struct BarRoute;

    impl Route for FooRoute {
        fn path(&self) -> &'static str {
            "/foo"
        }
    }

    impl Route for BarRoute {
        fn path(&self) -> &'static str {
            "/bar"
        }
    }

    impl Newable for FooRoute {
        fn new(_container: &Container) -> Result<Self, InstantiateErrorKind> {
            Ok(Self)
        }
    }

    impl Newable for BarRoute {
        fn new(_container: &Container) -> Result<Self, InstantiateErrorKind> {
            Ok(Self)
        }
    }

    impl From<FooRoute> for Box<dyn Route> {
        fn from(route: FooRoute) -> Self {
            Box::new(route)
        }
    }

    impl From<BarRoute> for Box<dyn Route> {
        fn from(route: BarRoute) -> Self {
            Box::new(route)
        }
    }

    struct Server {
        routes: InjectArray<Box<dyn Route>>,
    }

    impl Newable for Server {
        fn new(container: &Container) -> Result<Self, InstantiateErrorKind> {
            Ok(Self {
                routes: container.create_inject_decorator().array_field("routes"),
            })
        }
    }

    #[test]
    #[traced_test]
    fn test_injectable_array() {
        let container = Container::new();
        container.create_injectable_decorator().apply::<Server>().unwrap();

        let injectable_array = container.create_injectable_array_decorator();
        injectable_array
            .apply_as::<FooRoute, Box<dyn Route>>("routes")
            .unwrap()
            .apply_as::<BarRoute, Box<dyn Route>>("routes")
            .unwrap();

        let server = container.resolve::<Server>(Identifier::of::<Server>()).unwrap();
        let routes = server.routes.get().unwrap();

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].path(), "/foo");
        assert_eq!(routes[1].path(), "/bar");
    }

    #[test]
    #[traced_test]
    fn test_injectable_array_same_type() {
        let container = Container::new();
        let injectable_array = container.create_injectable_array_decorator();
        injectable_array.apply::<FooRoute>("routes").unwrap();
        injectable_array.apply::<FooRoute>("routes").unwrap();

        let routes = container.resolve_array::<FooRoute>("routes").unwrap();
        assert_eq!(routes.len(), 2);
        assert!(!Arc::ptr_eq(&routes[0], &routes[1]));
    }

    #[test]
    #[traced_test]
    fn test_injectable_array_extends_inject_binding() {
        let container = Container::new();
        let routes = container.create_inject_decorator().array_field::<FooRoute>("routes");
        assert!(matches!(routes.get(), Err(ResolveErrorKind::EmptyPayload { .. })));

        container.create_injectable_array_decorator().apply::<FooRoute>("routes").unwrap();
        assert_eq!(routes.get().unwrap().len(), 1);
        assert!(routes.set(alloc::vec![]).is_err());
    }
}
