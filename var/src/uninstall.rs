use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// Tears down a subscription.
///
/// Returned by every registration (`effect`, `listen_down`, `listen_up`, ...). The teardown runs
/// exactly once: either when [`Uninstaller::uninstall`] is called or when the value is dropped.
/// Use [`Uninstaller::detach`] to keep a subscription alive for the lifetime of the cell.
#[must_use = "dropping an Uninstaller removes the subscription immediately"]
pub struct Uninstaller {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Uninstaller {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// An uninstaller that does nothing.
    pub fn noop() -> Self {
        Self { teardown: None }
    }

    /// Combines several uninstallers into one; they run in order.
    pub fn all(parts: impl IntoIterator<Item = Uninstaller>) -> Self {
        let parts: Vec<Uninstaller> = parts.into_iter().collect();
        Self::new(move || {
            for part in parts {
                part.uninstall();
            }
        })
    }

    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }

    pub fn uninstall(mut self) {
        self.run();
    }

    /// Keeps the subscription installed forever.
    pub fn detach(mut self) {
        self.teardown = None;
    }

    fn run(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Uninstaller {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Uninstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uninstaller")
            .field("active", &self.is_active())
            .finish()
    }
}
