//! Binding combinators: several cells in, one derived cell out.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::eq;
use crate::var::Pull;
use crate::{Value, Var};

/// Snapshots a keyed collection of cells into one read-only cell.
pub fn pack<K, A, C>(cells: impl IntoIterator<Item = (K, C)>) -> Value<BTreeMap<K, A>>
where
    K: Ord + Clone + 'static,
    A: Clone + PartialEq + 'static,
    C: Into<Value<A>>,
{
    let cells: BTreeMap<K, Value<A>> = cells.into_iter().map(|(k, c)| (k, c.into())).collect();
    let triggers = cells.values().map(Value::trigger).collect();
    let pull: Pull<BTreeMap<K, A>> = Rc::new(move || {
        cells
            .iter()
            .map(|(k, cell)| (k.clone(), cell.get()))
            .collect()
    });
    Value::computed(eq::structural(), pull, triggers)
}

/// Like [`pack`], and writes to the composite are pushed back into the matching cells.
///
/// Keys that have no matching cell are ignored.
pub fn pack_bidirectional<K, A, C>(cells: impl IntoIterator<Item = (K, C)>) -> Var<BTreeMap<K, A>>
where
    K: Ord + Clone + 'static,
    A: Clone + PartialEq + 'static,
    C: Into<Var<A>>,
{
    let cells: Rc<BTreeMap<K, Var<A>>> =
        Rc::new(cells.into_iter().map(|(k, c)| (k, c.into())).collect());
    let packed = Var::from_value(pack(cells.iter().map(|(k, c)| (k.clone(), c.value()))));
    packed
        .listen_up(move |next: &BTreeMap<K, A>, _: &BTreeMap<K, A>| {
            for (k, value) in next {
                if let Some(cell) = cells.get(k) {
                    cell.set(value.clone());
                }
            }
        })
        .detach();
    packed
}

/// Snapshots a sequence of cells into one read-only cell.
pub fn list<A, C>(cells: impl IntoIterator<Item = C>) -> Value<Vec<A>>
where
    A: Clone + PartialEq + 'static,
    C: Into<Value<A>>,
{
    let cells: Vec<Value<A>> = cells.into_iter().map(Into::into).collect();
    let triggers = cells.iter().map(Value::trigger).collect();
    let pull: Pull<Vec<A>> = Rc::new(move || cells.iter().map(Value::get).collect());
    Value::computed(eq::structural(), pull, triggers)
}

/// Like [`list`], and writes to the composite are pushed back element-wise.
///
/// Elements past the number of cells are ignored.
pub fn list_bidirectional<A, C>(cells: impl IntoIterator<Item = C>) -> Var<Vec<A>>
where
    A: Clone + PartialEq + 'static,
    C: Into<Var<A>>,
{
    let cells: Vec<Var<A>> = cells.into_iter().map(Into::into).collect();
    let listed = Var::from_value(list(cells.iter().map(Var::value)));
    listed
        .listen_up(move |next: &Vec<A>, _: &Vec<A>| {
            for (cell, value) in cells.iter().zip(next) {
                cell.set(value.clone());
            }
        })
        .detach();
    listed
}

pub fn lift2<A, B, R>(
    a: impl Into<Value<A>>,
    b: impl Into<Value<B>>,
    f: impl Fn(&A, &B) -> R + 'static,
) -> Value<R>
where
    A: Clone + 'static,
    B: Clone + 'static,
    R: Clone + PartialEq + 'static,
{
    let (a, b) = (a.into(), b.into());
    let triggers = alloc::vec![a.trigger(), b.trigger()];
    let pull: Pull<R> = Rc::new(move || f(&a.get(), &b.get()));
    Value::computed(eq::structural(), pull, triggers)
}

pub fn lift3<A, B, C, R>(
    a: impl Into<Value<A>>,
    b: impl Into<Value<B>>,
    c: impl Into<Value<C>>,
    f: impl Fn(&A, &B, &C) -> R + 'static,
) -> Value<R>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
    R: Clone + PartialEq + 'static,
{
    let (a, b, c) = (a.into(), b.into(), c.into());
    let triggers = alloc::vec![a.trigger(), b.trigger(), c.trigger()];
    let pull: Pull<R> = Rc::new(move || f(&a.get(), &b.get(), &c.get()));
    Value::computed(eq::structural(), pull, triggers)
}

pub fn lift4<A, B, C, D, R>(
    a: impl Into<Value<A>>,
    b: impl Into<Value<B>>,
    c: impl Into<Value<C>>,
    d: impl Into<Value<D>>,
    f: impl Fn(&A, &B, &C, &D) -> R + 'static,
) -> Value<R>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
    D: Clone + 'static,
    R: Clone + PartialEq + 'static,
{
    let (a, b, c, d) = (a.into(), b.into(), c.into(), d.into());
    let triggers = alloc::vec![a.trigger(), b.trigger(), c.trigger(), d.trigger()];
    let pull: Pull<R> = Rc::new(move || f(&a.get(), &b.get(), &c.get(), &d.get()));
    Value::computed(eq::structural(), pull, triggers)
}
