#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use heinjector::{Container, Identifier, InstantiateErrorKind, Newable};
use std::{convert::Infallible, sync::Arc};

struct A(Arc<B>, Arc<C>);
struct B(i32);
struct C(Arc<CA>);
struct CA(Arc<CAA>);
struct CAA;

impl Newable for A {
    fn new(container: &Container) -> Result<Self, InstantiateErrorKind> {
        Ok(Self(container.resolve("b")?, container.resolve(Identifier::of::<C>())?))
    }
}

impl Newable for C {
    fn new(container: &Container) -> Result<Self, InstantiateErrorKind> {
        Ok(Self(container.resolve(Identifier::of::<CA>())?))
    }
}

impl Newable for CA {
    fn new(container: &Container) -> Result<Self, InstantiateErrorKind> {
        Ok(Self(container.resolve(Identifier::of::<CAA>())?))
    }
}

impl Newable for CAA {
    fn new(_container: &Container) -> Result<Self, InstantiateErrorKind> {
        Ok(Self)
    }
}

#[inline]
fn container_with_graph(singleton: bool) -> Container {
    let container = Container::new();
    let injectable = container.create_injectable_decorator();
    injectable.apply::<C>().unwrap().apply::<CA>().unwrap().apply::<CAA>().unwrap();

    let builder = container
        .bind("b")
        .unwrap()
        .as_factory(|| Ok::<_, Infallible>(B(2)));
    let builder = if singleton { builder } else { builder.not_in_singleton_scope() };
    builder.done().unwrap();

    let builder = container.bind(Identifier::of::<A>()).unwrap().as_newable::<A>();
    let builder = if singleton { builder } else { builder.not_in_singleton_scope() };
    builder.done().unwrap();

    container
}

#[inline]
fn container_bind_values() -> Container {
    let container = Container::new();
    for key in 0..16 {
        container.bind(key).unwrap().as_value(key).done().unwrap();
    }
    container
}

#[inline]
fn container_bind_array() -> Container {
    let container = Container::new();
    container.bind("routes").unwrap().as_array(0..16).done().unwrap();
    for key in 0..16 {
        container.define("routes").unwrap().as_array([key]).done().unwrap();
    }
    container
}

#[inline]
fn container_resolve(container: &Container) {
    let _ = container.resolve::<A>(Identifier::of::<A>()).unwrap();
}

#[inline]
fn container_snapshot_restore(container: &Container) {
    container.snapshot();
    container.rebind("b").unwrap().as_value(B(3)).done().unwrap();
    container.restore();
}

fn criterion_benchmark(c: &mut Criterion) {
    let container_1 = container_with_graph(true);
    let container_2 = container_with_graph(false);
    let container_3 = container_bind_array();

    c.bench_function("container_bind_values", |b| b.iter(|| container_bind_values()))
        .bench_function("container_bind_array", |b| b.iter(|| container_bind_array()))
        .bench_function("container_resolve_with_cache", |b| b.iter(|| container_resolve(&container_1)))
        .bench_function("container_resolve_not_in_singleton_scope", |b| {
            b.iter(|| container_resolve(&container_2))
        })
        .bench_function("container_resolve_array", |b| {
            b.iter(|| {
                let _ = container_3.resolve_array::<i32>("routes").unwrap();
            })
        })
        .bench_function("container_snapshot_restore", |b| b.iter(|| container_snapshot_restore(&container_1)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
