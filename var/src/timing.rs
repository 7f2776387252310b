use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

use crate::var::Node;
use crate::{Scheduler, TaskId, Uninstaller, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Batch,
    Debounce,
    Throttle,
}

/// Per-install state shared between a source listener and the task it schedules.
///
/// Scheduled tasks only hold a `Weak` to this state: once the subscription is torn down the state
/// is gone and a task that still fires does nothing.
struct Gate<A: 'static> {
    shape: Shape,
    scheduler: Rc<dyn Scheduler>,
    target: Weak<Node<A>>,
    delay_ms: u64,
    held: RefCell<Option<A>>,
    task: Cell<Option<TaskId>>,
}

impl<A: Clone + 'static> Gate<A> {
    fn emit(&self, value: A) {
        if let Some(node) = self.target.upgrade() {
            node.commit(value);
        }
    }

    fn cancel(&self) {
        if let Some(id) = self.task.take() {
            self.scheduler.cancel(id);
        }
    }

    fn on_source(self: &Rc<Self>, value: &A) {
        match self.shape {
            Shape::Batch => {
                *self.held.borrow_mut() = Some(value.clone());
                if self.task.get().is_none() {
                    let gate = Rc::downgrade(self);
                    let id = self.scheduler.next_frame(Box::new(move || {
                        if let Some(gate) = gate.upgrade() {
                            gate.fire();
                        }
                    }));
                    self.task.set(Some(id));
                }
            }
            Shape::Debounce => {
                *self.held.borrow_mut() = Some(value.clone());
                self.cancel();
                self.schedule_after();
            }
            Shape::Throttle => {
                if self.task.get().is_some() {
                    *self.held.borrow_mut() = Some(value.clone());
                    return;
                }
                self.emit(value.clone());
                self.schedule_after();
            }
        }
    }

    fn schedule_after(self: &Rc<Self>) {
        let gate = Rc::downgrade(self);
        let id = self.scheduler.after(
            self.delay_ms,
            Box::new(move || {
                if let Some(gate) = gate.upgrade() {
                    gate.fire();
                }
            }),
        );
        self.task.set(Some(id));
    }

    fn fire(self: &Rc<Self>) {
        self.task.set(None);
        let held = self.held.borrow_mut().take();
        let Some(value) = held else {
            return;
        };
        vtrace!(shape = ?self.shape, "Var: deferred value released");
        self.emit(value);
        if self.shape == Shape::Throttle {
            // A trailing flush opens the next window.
            self.schedule_after();
        }
    }
}

impl<A: Clone + 'static> Value<A> {
    /// Coalesces updates into at most one propagation per animation frame (last write wins).
    pub fn batch(&self, scheduler: &Rc<dyn Scheduler>) -> Value<A> {
        self.shaped(Shape::Batch, scheduler, 0)
    }

    /// Propagates the latest value once `delay_ms` milliseconds pass without another update.
    ///
    /// When the first consumer attaches, the cell takes the source's current value immediately.
    pub fn debounce(&self, scheduler: &Rc<dyn Scheduler>, delay_ms: u64) -> Value<A> {
        self.shaped(Shape::Debounce, scheduler, delay_ms)
    }

    /// Propagates the first update immediately, then at most one update per `delay_ms` window;
    /// the most recent update held back during a window is flushed when the window ends.
    pub fn throttle(&self, scheduler: &Rc<dyn Scheduler>, delay_ms: u64) -> Value<A> {
        self.shaped(Shape::Throttle, scheduler, delay_ms)
    }

    fn shaped(&self, shape: Shape, scheduler: &Rc<dyn Scheduler>, delay_ms: u64) -> Value<A> {
        let src = self.clone();
        let out = {
            let src = src.clone();
            Value::lagging(Rc::clone(&self.node().eq), Rc::new(move || src.get()))
        };
        let scheduler = Rc::clone(scheduler);
        let target = out.weak();
        out.node().add_install(Box::new(move || {
            let gate = Rc::new(Gate {
                shape,
                scheduler: Rc::clone(&scheduler),
                target: target.clone(),
                delay_ms,
                held: RefCell::new(None),
                task: Cell::new(None),
            });
            gate.emit(src.get());

            let listener = {
                let gate = Rc::clone(&gate);
                src.listen_down(move |value: &A, _: &A| gate.on_source(value))
            };
            Uninstaller::all([
                listener,
                Uninstaller::new(move || {
                    gate.cancel();
                    gate.held.borrow_mut().take();
                }),
            ])
        }));
        out
    }
}
