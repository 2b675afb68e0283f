// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::model::StableId;

type Callback = Arc<dyn Fn(&StableId) + Send + Sync>;

#[derive(Default)]
struct ListenerSet {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// Sub-pathway-selected listeners, notified in registration order.
#[derive(Clone, Default)]
pub(crate) struct Listeners {
    inner: Arc<Mutex<ListenerSet>>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: impl Fn(&StableId) + Send + Sync + 'static) -> ListenerHandle {
        let mut set = lock(&self.inner);
        let id = set.next_id;
        set.next_id += 1;
        set.entries.push((id, Arc::new(listener)));
        ListenerHandle {
            id,
            set: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn notify(&self, target: &StableId) {
        // Callbacks run unlocked so they can register or unsubscribe listeners themselves.
        let callbacks: Vec<Callback> =
            lock(&self.inner).entries.iter().map(|(_, callback)| callback.clone()).collect();
        for callback in callbacks {
            // A panicking listener must not take the navigation task down with it.
            if panic::catch_unwind(AssertUnwindSafe(|| callback(target))).is_err() {
                tracing::error!(%target, "sub-pathway listener panicked");
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

fn lock(set: &Mutex<ListenerSet>) -> MutexGuard<'_, ListenerSet> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registration of a sub-pathway-selected listener.
///
/// Dropping the handle keeps the listener registered; call [`ListenerHandle::unsubscribe`] to
/// remove it.
#[derive(Debug)]
pub struct ListenerHandle {
    id: u64,
    set: Weak<Mutex<ListenerSet>>,
}

impl ListenerHandle {
    /// Removes the listener. Returns `false` if it was already gone (loader dropped).
    pub fn unsubscribe(self) -> bool {
        let Some(set) = self.set.upgrade() else {
            return false;
        };
        let mut set = lock(&set);
        let before = set.entries.len();
        set.entries.retain(|(id, _)| *id != self.id);
        set.entries.len() != before
    }
}

impl fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet").field("len", &self.entries.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::Listeners;
    use crate::model::StableId;

    #[test]
    fn notifies_in_registration_order_until_unsubscribed() {
        let listeners = Listeners::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let seen = seen.clone();
            listeners.add(move |target| seen.lock().unwrap().push(format!("a:{target}")))
        };
        let _second = {
            let seen = seen.clone();
            listeners.add(move |target| seen.lock().unwrap().push(format!("b:{target}")))
        };

        let target = StableId::new("R1").unwrap();
        listeners.notify(&target);
        assert!(first.unsubscribe());
        listeners.notify(&target);

        assert_eq!(*seen.lock().unwrap(), vec!["a:R1", "b:R1", "b:R1"]);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn same_callback_registered_twice_fires_twice() {
        let listeners = Listeners::default();
        let count = Arc::new(Mutex::new(0));
        for _ in 0..2 {
            let count = count.clone();
            listeners.add(move |_| *count.lock().unwrap() += 1);
        }

        listeners.notify(&StableId::new("R1").unwrap());
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn panicking_listener_does_not_stop_the_others() {
        let listeners = Listeners::default();
        let count = Arc::new(Mutex::new(0));
        listeners.add(|_| panic!("listener failure"));
        {
            let count = count.clone();
            listeners.add(move |_| *count.lock().unwrap() += 1);
        }

        let target = StableId::new("R1").unwrap();
        listeners.notify(&target);
        listeners.notify(&target);

        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn unsubscribe_after_owner_dropped_reports_false() {
        let listeners = Listeners::default();
        let handle = listeners.add(|_| {});
        drop(listeners);
        assert!(!handle.unsubscribe());
    }
}
