//! # Presence Registry
//!
//! Process-wide mapping from authenticated user identity to the active
//! delivery channel. One entry per connected user; a user who opens a second
//! channel replaces the first (last connection wins). Entries are in-memory
//! only: after a restart every user appears offline until they reconnect.
//!
//! Every register/unregister broadcasts the full online-user-id set to all
//! currently connected channels as a `getOnlineUsers` event, which is how
//! every client's presence indicators stay live.
//!
//! The map is the one piece of shared mutable state in the process. It is
//! guarded by a single `std::sync::Mutex`; critical sections are short and
//! never await (the queued `mpsc` send does not block), so register,
//! unregister and lookup never observe a torn state.

use lib_core::dto::PushEvent;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use uuid::Uuid;

/// Identifier of one live delivery channel.
pub type ChannelId = Uuid;

/// A connected user's delivery channel.
#[derive(Debug, Clone)]
struct PresenceEntry {
    channel_id: ChannelId,
    tx: UnboundedSender<PushEvent>,
}

/// In-memory registry of connected users.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    inner: Mutex<HashMap<i64, PresenceEntry>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the active channel for a user, then broadcast
    /// the updated online list to everyone. Idempotent, no error conditions.
    pub fn register(&self, user_id: i64, channel_id: ChannelId, tx: UnboundedSender<PushEvent>) {
        let mut map = self.inner.lock().expect("presence registry poisoned");
        map.insert(user_id, PresenceEntry { channel_id, tx });
        info!(user_id, %channel_id, online = map.len(), "[PRESENCE] channel registered");
        Self::broadcast_online(&map);
    }

    /// Remove whatever entry currently maps to `channel_id`.
    ///
    /// Keyed on the channel, not the user: when a user reconnects before the
    /// old channel's close event fires, the stale close must not clobber the
    /// new mapping. If no entry holds this channel anymore, this is a no-op.
    pub fn unregister(&self, channel_id: ChannelId) {
        let mut map = self.inner.lock().expect("presence registry poisoned");
        let user_id = map
            .iter()
            .find(|(_, entry)| entry.channel_id == channel_id)
            .map(|(user_id, _)| *user_id);

        match user_id {
            Some(user_id) => {
                map.remove(&user_id);
                info!(user_id, %channel_id, online = map.len(), "[PRESENCE] channel unregistered");
                Self::broadcast_online(&map);
            }
            None => {
                debug!(%channel_id, "[PRESENCE] stale close ignored");
            }
        }
    }

    /// The channel a user is currently connected on, if any. Pure read.
    pub fn lookup(&self, user_id: i64) -> Option<ChannelId> {
        let map = self.inner.lock().expect("presence registry poisoned");
        map.get(&user_id).map(|entry| entry.channel_id)
    }

    /// Ids of all currently connected users, ascending.
    pub fn online_user_ids(&self) -> Vec<i64> {
        let map = self.inner.lock().expect("presence registry poisoned");
        let mut ids: Vec<i64> = map.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Push an event to a user's channel if they are connected.
    ///
    /// A push with no connected recipient is NOT an error: the event is
    /// dropped and the recipient sees the data on their next history fetch.
    /// Returns whether the event was handed to a channel.
    pub fn emit_to_user(&self, user_id: i64, event: PushEvent) -> bool {
        let map = self.inner.lock().expect("presence registry poisoned");
        match map.get(&user_id) {
            Some(entry) => {
                let delivered = entry.tx.send(event).is_ok();
                if !delivered {
                    debug!(user_id, "[PRESENCE] channel gone, event dropped");
                }
                delivered
            }
            None => {
                debug!(user_id, "[PRESENCE] recipient offline, event dropped");
                false
            }
        }
    }

    /// Send the current online-user list to every connected channel.
    fn broadcast_online(map: &HashMap<i64, PresenceEntry>) {
        let mut ids: Vec<i64> = map.keys().copied().collect();
        ids.sort_unstable();
        for entry in map.values() {
            let _ = entry.tx.send(PushEvent::GetOnlineUsers(ids.clone()));
        }
    }
}
