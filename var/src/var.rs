use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ops::Deref;

use crate::Uninstaller;
use crate::eq::{self, EqFn};
use crate::listeners::Listeners;

pub(crate) type Listener<A> = dyn Fn(&A, &A);
pub(crate) type Pull<A> = Rc<dyn Fn() -> A>;
type Install = Box<dyn Fn() -> Uninstaller>;

/// Subscribes a "recompute" callback to one source of a derived cell.
pub(crate) type Trigger = Rc<dyn Fn(Rc<dyn Fn()>) -> Uninstaller>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Channel {
    Up,
    Down,
    Effect,
}

pub(crate) struct Node<A> {
    value: RefCell<A>,
    pub(crate) eq: EqFn<A>,
    pull: Option<Pull<A>>,
    /// Installed cells hold the last value released to them instead of pulling on read.
    lagging: bool,
    up: RefCell<Listeners<Listener<A>>>,
    down: RefCell<Listeners<Listener<A>>>,
    effects: RefCell<Listeners<Listener<A>>>,
    busy: Cell<usize>,
    consumers: Cell<usize>,
    pending: RefCell<Vec<Install>>,
    installed: RefCell<Vec<Uninstaller>>,
}

impl<A: Clone + 'static> Node<A> {
    fn new(value: A, eq: EqFn<A>, pull: Option<Pull<A>>, lagging: bool) -> Rc<Self> {
        Rc::new(Self {
            value: RefCell::new(value),
            eq,
            pull,
            lagging,
            up: RefCell::new(Listeners::new()),
            down: RefCell::new(Listeners::new()),
            effects: RefCell::new(Listeners::new()),
            busy: Cell::new(0),
            consumers: Cell::new(0),
            pending: RefCell::new(Vec::new()),
            installed: RefCell::new(Vec::new()),
        })
    }

    fn channel(&self, channel: Channel) -> &RefCell<Listeners<Listener<A>>> {
        match channel {
            Channel::Up => &self.up,
            Channel::Down => &self.down,
            Channel::Effect => &self.effects,
        }
    }

    fn reader(&self) -> Option<&Pull<A>> {
        match &self.pull {
            Some(pull) if !(self.lagging && self.consumers.get() > 0) => Some(pull),
            _ => None,
        }
    }

    fn get(&self) -> A {
        match self.reader() {
            Some(pull) => pull(),
            None => self.value.borrow().clone(),
        }
    }

    /// An external write. The cached value of a pulling cell can trail its source (a recompute
    /// dropped while the cell was busy), so it is refreshed before the comparison.
    pub(crate) fn set(&self, next: A) {
        if self.busy.get() == 0 {
            if let Some(pull) = self.reader() {
                let fresh = pull();
                *self.value.borrow_mut() = fresh;
            }
        }
        self.commit(next);
    }

    /// Compares `next` against the cached value and propagates it when different.
    pub(crate) fn commit(&self, next: A) {
        if self.busy.get() > 0 {
            vdebug!("Var::set dropped: write during propagation");
            return;
        }
        let unchanged = {
            let current = self.value.borrow();
            (self.eq)(&*current, &next)
        };
        if unchanged {
            return;
        }

        let prev = self.value.replace(next.clone());
        self.busy.set(self.busy.get() + 1);
        self.fire(Channel::Up, &next, &prev);
        self.fire(Channel::Down, &next, &prev);
        self.fire(Channel::Effect, &next, &prev);
        self.busy.set(self.busy.get() - 1);
    }

    pub(crate) fn recompute(&self) {
        if let Some(pull) = &self.pull {
            let next = pull();
            self.commit(next);
        }
    }

    fn fire(&self, channel: Channel, next: &A, prev: &A) {
        let list = self.channel(channel);
        let keys = list.borrow().snapshot();
        for key in keys {
            let f = list.borrow().get(key);
            if let Some(f) = f {
                f(next, prev);
            }
        }
    }

    fn listen(self: &Rc<Self>, channel: Channel, f: Rc<Listener<A>>) -> Uninstaller {
        let counted = channel != Channel::Up;
        if counted {
            self.acquire();
        }
        let key = self.channel(channel).borrow_mut().insert(f);
        let node = Rc::clone(self);
        Uninstaller::new(move || {
            let removed = node.channel(channel).borrow_mut().remove(key);
            if removed && counted {
                node.release();
            }
        })
    }

    fn acquire(&self) {
        let n = self.consumers.get();
        self.consumers.set(n + 1);
        if n == 0 {
            self.install();
        }
    }

    fn release(&self) {
        let n = self.consumers.get();
        debug_assert!(n > 0, "Var consumer count underflow");
        if n == 0 {
            return;
        }
        self.consumers.set(n - 1);
        if n == 1 {
            self.uninstall();
        }
    }

    fn install(&self) {
        if let Some(pull) = &self.pull {
            let fresh = pull();
            *self.value.borrow_mut() = fresh;
        }
        let handles: Vec<Uninstaller> = {
            let pending = self.pending.borrow();
            pending.iter().map(|install| install()).collect()
        };
        vtrace!(subscriptions = handles.len(), "Var: installed");
        self.installed.borrow_mut().extend(handles);
    }

    fn uninstall(&self) {
        let handles = core::mem::take(&mut *self.installed.borrow_mut());
        vtrace!(subscriptions = handles.len(), "Var: uninstalled");
        for handle in handles {
            handle.uninstall();
        }
    }

    pub(crate) fn add_install(&self, install: Install) {
        if self.consumers.get() > 0 {
            let handle = install();
            self.installed.borrow_mut().push(handle);
        }
        self.pending.borrow_mut().push(install);
    }
}

/// A read-only observable cell.
///
/// Handles are cheap to clone; every clone observes the same cell. Derived cells (`map`,
/// combinators, time-shaped cells) are `Value`s: they subscribe to their sources only while they
/// have consumers themselves.
pub struct Value<A: 'static> {
    node: Rc<Node<A>>,
}

/// A read-write observable cell.
///
/// `Var` dereferences to [`Value`] for every read-side operation.
pub struct Var<A: 'static> {
    value: Value<A>,
}

impl<A: 'static> Clone for Value<A> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<A: 'static> Clone for Var<A> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<A: 'static> Deref for Var<A> {
    type Target = Value<A>;

    fn deref(&self) -> &Value<A> {
        &self.value
    }
}

impl<A: 'static> AsRef<Value<A>> for Var<A> {
    fn as_ref(&self) -> &Value<A> {
        &self.value
    }
}

impl<A: 'static> From<Var<A>> for Value<A> {
    fn from(var: Var<A>) -> Self {
        var.value
    }
}

impl<A: 'static> From<&Var<A>> for Value<A> {
    fn from(var: &Var<A>) -> Self {
        var.value.clone()
    }
}

impl<A: 'static> From<&Value<A>> for Value<A> {
    fn from(value: &Value<A>) -> Self {
        value.clone()
    }
}

impl<A: 'static> From<&Var<A>> for Var<A> {
    fn from(var: &Var<A>) -> Self {
        var.clone()
    }
}

impl<A: Clone + 'static> Value<A> {
    pub(crate) fn derived(value: A, eq: EqFn<A>, pull: Option<Pull<A>>) -> Self {
        Self {
            node: Node::new(value, eq, pull, false),
        }
    }

    /// A derived cell that reads through `pull` while detached and otherwise holds whatever its
    /// installed subscriptions release into it.
    pub(crate) fn lagging(eq: EqFn<A>, pull: Pull<A>) -> Self {
        let initial = pull();
        Self {
            node: Node::new(initial, eq, Some(pull), true),
        }
    }

    /// A derived cell that re-reads `pull` whenever one of `triggers` fires.
    pub(crate) fn computed(eq: EqFn<A>, pull: Pull<A>, triggers: Vec<Trigger>) -> Self {
        let initial = pull();
        let out = Self::derived(initial, eq, Some(pull));
        let target = out.weak();
        out.node.add_install(Box::new(move || {
            let target = target.clone();
            let recompute: Rc<dyn Fn()> = Rc::new(move || {
                if let Some(node) = target.upgrade() {
                    node.recompute();
                }
            });
            Uninstaller::all(triggers.iter().map(|t| t(Rc::clone(&recompute))))
        }));
        out
    }

    pub(crate) fn node(&self) -> &Rc<Node<A>> {
        &self.node
    }

    pub(crate) fn weak(&self) -> Weak<Node<A>> {
        Rc::downgrade(&self.node)
    }

    pub(crate) fn trigger(&self) -> Trigger {
        let src = self.clone();
        Rc::new(move |recompute: Rc<dyn Fn()>| src.listen_down(move |_: &A, _: &A| recompute()))
    }

    /// Reads the current value.
    ///
    /// Cells derived with `map`, `zoom` and the binding combinators recompute from their sources
    /// on every read, so reads are current even when nothing is subscribed. Time-shaped cells
    /// (`batch`, `debounce`, `throttle`) read their source while nothing is subscribed and the
    /// last released value otherwise.
    pub fn get(&self) -> A {
        self.node.get()
    }

    /// Reads the current value by reference without cloning (plain cells only; derived cells
    /// are recomputed into a temporary).
    pub fn with<R>(&self, f: impl FnOnce(&A) -> R) -> R {
        match self.node.reader() {
            Some(pull) => f(&pull()),
            None => f(&*self.node.value.borrow()),
        }
    }

    pub fn map<B: Clone + PartialEq + 'static>(&self, f: impl Fn(&A) -> B + 'static) -> Value<B> {
        self.map_with_eq(f, eq::structural())
    }

    pub fn map_with_eq<B: Clone + 'static>(
        &self,
        f: impl Fn(&A) -> B + 'static,
        eq: EqFn<B>,
    ) -> Value<B> {
        let src = self.clone();
        let pull: Pull<B> = Rc::new(move || f(&src.get()));
        Value::computed(eq, pull, alloc::vec![self.trigger()])
    }

    /// Registers a listener fired for writes coming from downstream cells (write-back path).
    ///
    /// Upstream listeners do not count as consumers.
    pub fn listen_up(&self, f: impl Fn(&A, &A) + 'static) -> Uninstaller {
        self.node.listen(Channel::Up, Rc::new(f))
    }

    /// Registers a listener fired with `(new, old)` whenever the value changes.
    ///
    /// The first consumer installs the cell's upstream subscriptions.
    pub fn listen_down(&self, f: impl Fn(&A, &A) + 'static) -> Uninstaller {
        self.node.listen(Channel::Down, Rc::new(f))
    }

    /// Registers a side effect fired with `(new, old)` whenever the value changes.
    pub fn effect(&self, f: impl Fn(&A, &A) + 'static) -> Uninstaller {
        self.node.listen(Channel::Effect, Rc::new(f))
    }

    /// Like [`Self::effect`], and runs `f(current, current)` right away.
    pub fn effect_now(&self, f: impl Fn(&A, &A) + 'static) -> Uninstaller {
        let f: Rc<Listener<A>> = Rc::new(f);
        let handle = self.node.listen(Channel::Effect, Rc::clone(&f));
        let current = self.get();
        f(&current, &current);
        handle
    }

    /// Number of downstream listeners and effects currently registered.
    pub fn consumer_count(&self) -> usize {
        self.node.consumers.get()
    }

    pub fn is_installed(&self) -> bool {
        self.consumer_count() > 0
    }

    pub fn downstream_count(&self) -> usize {
        self.node.down.borrow().len()
    }

    pub fn effect_count(&self) -> usize {
        self.node.effects.borrow().len()
    }

    pub fn upstream_count(&self) -> usize {
        self.node.up.borrow().len()
    }

    /// Returns `true` while a propagation cascade of this cell is running.
    pub fn is_busy(&self) -> bool {
        self.node.busy.get() > 0
    }

    /// Returns `true` when both handles observe the same cell.
    pub fn ptr_eq(&self, other: &Value<A>) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl<A: Clone + PartialEq + 'static> Var<A> {
    pub fn new(value: A) -> Self {
        Self::with_eq(value, eq::structural())
    }
}

impl<A: Clone + 'static> Var<A> {
    /// Creates a cell with an explicit equality function.
    pub fn with_eq(value: A, eq: EqFn<A>) -> Self {
        Self {
            value: Value::derived(value, eq, None),
        }
    }

    pub(crate) fn from_value(value: Value<A>) -> Self {
        Self { value }
    }

    /// A read-only handle to this cell.
    pub fn value(&self) -> Value<A> {
        self.value.clone()
    }

    /// Writes a new value.
    ///
    /// Does nothing when the value is equal to the current one, or when called while this cell is
    /// already propagating a write (nested writes are dropped, not queued). Otherwise fires
    /// upstream, downstream, then effect listeners with `(new, old)`.
    pub fn set(&self, value: A) {
        self.value.node.set(value);
    }

    pub fn modify(&self, f: impl FnOnce(&A) -> A) {
        let next = f(&self.get());
        self.set(next);
    }

    /// Mutates a copy of the current value in place, then writes it.
    pub fn update(&self, f: impl FnOnce(&mut A)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    pub fn zoom<B: Clone + PartialEq + 'static>(
        &self,
        get: impl Fn(&A) -> B + 'static,
        set: impl Fn(B, &A) -> A + 'static,
    ) -> Var<B> {
        self.zoom_with_eq(get, set, eq::structural())
    }

    /// A read-write view of part of this cell.
    ///
    /// Reading applies `get` to the source. Writing `b` replaces the source with
    /// `set(b, &current)`. For a lawful lens, `view.set(x)` followed by `view.get()` returns `x`.
    pub fn zoom_with_eq<B: Clone + 'static>(
        &self,
        get: impl Fn(&A) -> B + 'static,
        set: impl Fn(B, &A) -> A + 'static,
        eq: EqFn<B>,
    ) -> Var<B> {
        let view = Var::from_value(self.map_with_eq(get, eq));
        let src = self.clone();
        view.listen_up(move |b: &B, _: &B| {
            src.modify(|a| set(b.clone(), a));
        })
        .detach();
        view
    }

    /// A view of one field, given shared and mutable accessors.
    pub fn prop<B: Clone + PartialEq + 'static>(
        &self,
        get: impl Fn(&A) -> &B + 'static,
        get_mut: impl Fn(&mut A) -> &mut B + 'static,
    ) -> Var<B> {
        self.zoom(
            move |a| get(a).clone(),
            move |b, a| {
                let mut next = a.clone();
                *get_mut(&mut next) = b;
                next
            },
        )
    }

    /// A view through a bijection.
    pub fn iso<B: Clone + PartialEq + 'static>(
        &self,
        forward: impl Fn(&A) -> B + 'static,
        backward: impl Fn(&B) -> A + 'static,
    ) -> Var<B> {
        self.zoom(forward, move |b, _| backward(&b))
    }
}

impl<T: Clone + PartialEq + 'static> Var<Vec<T>> {
    /// A view of one element.
    ///
    /// Reads past the end yield `None`. Writing `Some(x)` replaces the element; writing `None` or
    /// writing past the end leaves the source unchanged.
    pub fn at(&self, index: usize) -> Var<Option<T>> {
        self.zoom(
            move |items| items.get(index).cloned(),
            move |item, items| {
                let mut next = items.clone();
                if let (Some(item), Some(slot)) = (item, next.get_mut(index)) {
                    *slot = item;
                }
                next
            },
        )
    }
}

impl<A: Clone + fmt::Debug + 'static> fmt::Debug for Value<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("value", &self.get())
            .field("consumers", &self.consumer_count())
            .finish_non_exhaustive()
    }
}

impl<A: Clone + fmt::Debug + 'static> fmt::Debug for Var<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("value", &self.get())
            .field("consumers", &self.consumer_count())
            .finish_non_exhaustive()
    }
}

impl<A: Clone + Default + PartialEq + 'static> Default for Var<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}
