// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The id-keyed callback list shared by both channel kinds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::subscription::SubscriptionId;

/// Removal side of a subscriber list, erased over the callback type so a
/// [`Subscription`](super::Subscription) can point back at any channel.
pub(crate) trait Revoke: Send + Sync {
    /// Removes the registration with the given id. Returns `false` if it was
    /// not present.
    fn revoke(&self, id: SubscriptionId) -> bool;

    /// Returns `true` if the registration with the given id is present.
    fn contains(&self, id: SubscriptionId) -> bool;
}

struct Entry<C: ?Sized> {
    id: SubscriptionId,
    callback: Arc<C>,
}

/// Ordered list of callbacks, keyed by registration id.
///
/// Publishing never holds the lock while callbacks run: it clones the
/// callback handles into a snapshot first.
pub(crate) struct SubscriberList<C: ?Sized> {
    entries: RwLock<Vec<Entry<C>>>,
    next_id: AtomicU64,
}

impl<C: ?Sized> SubscriberList<C> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Appends a callback and returns the id of the new registration.
    pub(crate) fn push(&self, callback: Arc<C>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.write().push(Entry { id, callback });
        id
    }

    /// Clones every callback, in registration order.
    pub(crate) fn snapshot(&self) -> Vec<Arc<C>> {
        self.read()
            .iter()
            .map(|entry| Arc::clone(&entry.callback))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.read().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panicking reader cannot leave the vector half-updated, so poisoning
    // is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Entry<C>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Entry<C>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: ?Sized + Send + Sync> Revoke for SubscriberList<C> {
    fn revoke(&self, id: SubscriptionId) -> bool {
        let mut entries = self.write();
        match entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn contains(&self, id: SubscriptionId) -> bool {
        self.read().iter().any(|entry| entry.id == id)
    }
}
