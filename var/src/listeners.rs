use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;

/// A handle to a registered listener.
///
/// Keys are registration sequence numbers and are never reissued, so a removed listener's key
/// never matches a later registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct ListenerKey(u64);

/// Listeners ordered by registration.
///
/// `snapshot` captures the live keys in order so a propagation can walk them while listeners
/// come and go.
#[derive(Debug)]
pub(crate) struct Listeners<F: ?Sized> {
    entries: BTreeMap<ListenerKey, Rc<F>>,
    next_seq: u64,
}

impl<F: ?Sized> Listeners<F> {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn insert(&mut self, f: Rc<F>) -> ListenerKey {
        let key = ListenerKey(self.next_seq);
        self.next_seq += 1;
        self.entries.insert(key, f);
        key
    }

    /// Removes a listener. Returns `false` for stale or unknown keys.
    pub(crate) fn remove(&mut self, key: ListenerKey) -> bool {
        self.entries.remove(&key).is_some()
    }

    pub(crate) fn get(&self, key: ListenerKey) -> Option<Rc<F>> {
        self.entries.get(&key).cloned()
    }

    /// Live keys, ordered by registration.
    pub(crate) fn snapshot(&self) -> Vec<ListenerKey> {
        self.entries.keys().copied().collect()
    }
}
