use alloc::rc::Rc;

use toulouse_var::Uninstaller;

use crate::ScrollSnapshot;

/// A scroll container the engine can measure.
///
/// Hosts implement this over whatever their platform exposes (a DOM element, a terminal pane, a
/// test fixture).
pub trait Measure {
    fn snapshot(&self) -> ScrollSnapshot;

    /// Calls `f` whenever the container's size changes, until the returned handle is dropped.
    fn on_resize(&self, f: Rc<dyn Fn()>) -> Uninstaller;
}
