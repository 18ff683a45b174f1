//! Identifier-keyed IoC container.
//!
//! Values are registered under an [`Identifier`] (a string, a number, a [`Symbol`] or a type token)
//! with a fluent builder, and resolved on demand:
//!
//! ```
//! use heinjector::Container;
//! use std::convert::Infallible;
//!
//! let container = Container::new();
//! container.bind("greeting").unwrap().as_value(String::from("hello")).done().unwrap();
//! container
//!     .bind("counter")
//!     .unwrap()
//!     .as_factory(|| Ok::<_, Infallible>(0u32))
//!     .not_in_singleton_scope()
//!     .done()
//!     .unwrap();
//!
//! assert_eq!(*container.resolve::<String>("greeting").unwrap(), "hello");
//! assert_eq!(*container.resolve::<u32>("counter").unwrap(), 0);
//! ```
//!
//! Array bindings accumulate across `bind`/`define` calls, which lets independent
//! places contribute to one collection, see [`InjectableArrayDecorator`].

#![no_std]

extern crate alloc;

pub(crate) mod any;
pub(crate) mod builder;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod errors;
pub(crate) mod identifier;
pub(crate) mod inject;
pub(crate) mod payload;
pub(crate) mod producer;
pub(crate) mod registry;

pub use any::{RcAny, TypeInfo};
pub use builder::{ArrayBuilder, BindBuilder, ObjectBuilder};
pub use config::Config;
pub use container::{Container, WeakContainer};
pub use errors::{InjectErrorKind, InstantiateErrorKind, RegistryErrorKind, ResolveErrorKind};
pub use identifier::{Identifier, Key, Symbol};
pub use inject::{Inject, InjectArray, InjectDecorator, InjectableArrayDecorator, InjectableDecorator};
pub use payload::{Payload, Produced, ProducerKind, Shape};
pub use producer::{factory, newable, newable_as, Newable, Producer};
