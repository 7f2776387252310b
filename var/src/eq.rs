//! Equality functions used to suppress no-op propagation.
//!
//! A cell only notifies its listeners when its equality function reports that the new value
//! differs from the current one. Plain data uses [`structural`] (the default); opaque handles
//! should compare by identity with [`rc_ptr`].

use alloc::rc::Rc;

/// The equality capability stored by every cell.
pub type EqFn<A> = Rc<dyn Fn(&A, &A) -> bool>;

pub fn structural<A: PartialEq + 'static>() -> EqFn<A> {
    Rc::new(|a: &A, b: &A| a == b)
}

/// Reference equality for `Rc` payloads.
pub fn rc_ptr<T: ?Sized + 'static>() -> EqFn<Rc<T>> {
    Rc::new(|a: &Rc<T>, b: &Rc<T>| Rc::ptr_eq(a, b))
}

/// Never equal: every `set` propagates.
pub fn never<A: 'static>() -> EqFn<A> {
    Rc::new(|_: &A, _: &A| false)
}
