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

//! Revocable subscription tokens.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use super::subscribers::Revoke;

/// Identifies one registration on one channel.
///
/// Ids are unique per channel and never reused, so registering the same
/// callback twice yields two distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A token representing one active registration on a channel.
///
/// Revoking removes exactly that registration. The token only holds a weak
/// reference to its channel, so it never keeps a channel (or anything the
/// channel's callbacks capture) alive on its own.
///
/// Dropping a `Subscription` does not revoke it; use
/// [`into_guard`](Self::into_guard) for that behaviour.
pub struct Subscription {
    id: SubscriptionId,
    event_type: &'static str,
    subscribers: Weak<dyn Revoke>,
    revoked: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        event_type: &'static str,
        subscribers: Weak<dyn Revoke>,
    ) -> Self {
        Self {
            id,
            event_type,
            subscribers,
            revoked: AtomicBool::new(false),
        }
    }

    /// The id of the registration this token revokes.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The name of the payload type this subscription receives.
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    /// Removes the registration from its channel.
    ///
    /// Returns `true` if this call removed it. Revoking twice, or after the
    /// channel is gone, is a no-op that returns `false`.
    pub fn revoke(&self) -> bool {
        if self.revoked.swap(true, Ordering::AcqRel) {
            return false;
        }

        let removed = self
            .subscribers
            .upgrade()
            .is_some_and(|subscribers| subscribers.revoke(self.id));

        if removed {
            log::trace!("Subscription {} to {} revoked.", self.id, self.event_type);
        }
        removed
    }

    /// Returns `true` while the registration is still present on its channel.
    pub fn is_active(&self) -> bool {
        !self.revoked.load(Ordering::Acquire)
            && self
                .subscribers
                .upgrade()
                .is_some_and(|subscribers| subscribers.contains(self.id))
    }

    /// Wraps this subscription in a guard that revokes it when dropped.
    #[must_use]
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard { subscription: self }
    }

    /// Returns `true` if this token was issued by the subscriber list at
    /// `subscribers`.
    pub(crate) fn is_issued_by<C: ?Sized>(&self, subscribers: &Arc<C>) -> bool {
        std::ptr::eq(
            self.subscribers.as_ptr().cast::<()>(),
            Arc::as_ptr(subscribers).cast::<()>(),
        )
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event_type", &self.event_type)
            .field("revoked", &self.revoked.load(Ordering::Relaxed))
            .finish()
    }
}

/// Revokes the wrapped [`Subscription`] when dropped.
#[derive(Debug)]
pub struct SubscriptionGuard {
    subscription: Subscription,
}

impl SubscriptionGuard {
    /// The guarded subscription.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.subscription.revoke();
    }
}
