use actix::Addr;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::Arc;

use super::handler::ChessWebSocket;
use crate::models::{ChessWebSocketMessage, GameId, ServerMessage};

/// Outgoing side of a client connection.
pub trait Outbox: Send + Sync {
    fn is_open(&self) -> bool;

    /// Queues `text` for delivery; false once the connection is gone.
    fn deliver(&self, text: String) -> bool;
}

pub type Channel = Arc<dyn Outbox>;

impl Outbox for Addr<ChessWebSocket> {
    fn is_open(&self) -> bool {
        self.connected()
    }

    fn deliver(&self, text: String) -> bool {
        if !self.connected() {
            return false;
        }
        self.do_send(ChessWebSocketMessage(text));
        true
    }
}

impl Outbox for futures::channel::mpsc::UnboundedSender<String> {
    fn is_open(&self) -> bool {
        !self.is_closed()
    }

    fn deliver(&self, text: String) -> bool {
        self.unbounded_send(text).is_ok()
    }
}

/// Who is watching which game. Each game has its own inner map so traffic on
/// one game never waits on another.
#[derive(Default)]
pub struct ConnectionRegistry {
    games: DashMap<GameId, DashMap<String, Channel>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `identity` on `game_id`, replacing any earlier channel.
    pub fn add(&self, identity: &str, game_id: GameId, channel: Channel) {
        self.games
            .entry(game_id)
            .or_default()
            .insert(identity.to_string(), channel);
        debug!("{} now watching game {}", identity, game_id);
    }

    pub fn remove(&self, identity: &str, game_id: GameId) {
        self.remove_where(identity, game_id, |_| true);
    }

    /// Removes `identity` only while it is still registered with `channel`,
    /// so a reconnect on a new channel survives cleanup of the old one.
    pub fn remove_channel(&self, identity: &str, game_id: GameId, channel: &Channel) {
        self.remove_where(identity, game_id, |current| Arc::ptr_eq(current, channel));
    }

    fn remove_where(&self, identity: &str, game_id: GameId, matches: impl Fn(&Channel) -> bool) {
        let emptied = match self.games.get(&game_id) {
            Some(watchers) => {
                if watchers.remove_if(identity, |_, current| matches(current)).is_some() {
                    debug!("{} stopped watching game {}", identity, game_id);
                }
                watchers.is_empty()
            }
            None => return,
        };
        if emptied {
            self.games.remove_if(&game_id, |_, watchers| watchers.is_empty());
        }
    }

    /// Sends to every live watcher of `game_id` except `exclude`. Closed
    /// channels are pruned after the pass. Returns the number delivered.
    pub fn broadcast(&self, game_id: GameId, message: &ServerMessage, exclude: Option<&str>) -> usize {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                warn!("Error serializing message: {}", e);
                return 0;
            }
        };
        let recipients = self.watchers_of(game_id);
        let mut delivered = 0;
        let mut closed = Vec::new();
        for (identity, channel) in recipients {
            if exclude == Some(identity.as_str()) {
                continue;
            }
            if channel.is_open() && channel.deliver(text.clone()) {
                delivered += 1;
            } else {
                closed.push((identity, channel));
            }
        }
        for (identity, channel) in closed {
            info!("pruning closed connection {} from game {}", identity, game_id);
            self.remove_channel(&identity, game_id, &channel);
        }
        delivered
    }

    /// Unicast to one watcher. Returns false when it is unregistered or gone.
    pub fn send_to(&self, game_id: GameId, identity: &str, message: &ServerMessage) -> bool {
        let channel = self
            .games
            .get(&game_id)
            .and_then(|watchers| watchers.get(identity).map(|c| c.value().clone()));
        let Some(channel) = channel else {
            return false;
        };
        if !channel.is_open() {
            self.remove_channel(identity, game_id, &channel);
            return false;
        }
        match serde_json::to_string(message) {
            Ok(text) => channel.deliver(text),
            Err(e) => {
                warn!("Error serializing message: {}", e);
                false
            }
        }
    }

    /// Identities currently watching `game_id`.
    pub fn watching(&self, game_id: GameId) -> Vec<String> {
        let mut identities: Vec<String> = self
            .watchers_of(game_id)
            .into_iter()
            .map(|(identity, _)| identity)
            .collect();
        identities.sort();
        identities
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    fn watchers_of(&self, game_id: GameId) -> Vec<(String, Channel)> {
        self.games
            .get(&game_id)
            .map(|watchers| {
                watchers
                    .iter()
                    .map(|e| (e.key().clone(), e.value().clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};

    fn channel() -> (Channel, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded::<String>();
        (Arc::new(tx), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<String> {
        std::iter::from_fn(|| rx.try_next().ok().flatten()).collect()
    }

    fn note(text: &str) -> ServerMessage {
        ServerMessage::notification(NotificationType::MoveMade, text)
    }

    #[test]
    fn broadcast_skips_excluded_identity() {
        let registry = ConnectionRegistry::new();
        let (a, mut rx_a) = channel();
        let (b, mut rx_b) = channel();
        registry.add("a", 1, a);
        registry.add("b", 1, b);

        assert_eq!(registry.broadcast(1, &note("hi"), Some("b")), 1);
        assert_eq!(drain(&mut rx_a).len(), 1);
        assert!(drain(&mut rx_b).is_empty());
    }

    #[test]
    fn games_are_isolated() {
        let registry = ConnectionRegistry::new();
        let (a, mut rx_a) = channel();
        let (b, mut rx_b) = channel();
        registry.add("a", 1, a);
        registry.add("b", 2, b);
        registry.broadcast(1, &note("one"), None);
        assert_eq!(drain(&mut rx_a).len(), 1);
        assert!(drain(&mut rx_b).is_empty());
    }

    #[test]
    fn closed_channels_are_pruned_without_stopping_delivery() {
        let registry = ConnectionRegistry::new();
        let (a, rx_a) = channel();
        let (b, mut rx_b) = channel();
        let (c, mut rx_c) = channel();
        registry.add("a", 1, a);
        registry.add("b", 1, b);
        registry.add("c", 1, c);
        drop(rx_a);

        assert_eq!(registry.broadcast(1, &note("x"), None), 2);
        assert_eq!(drain(&mut rx_b).len(), 1);
        assert_eq!(drain(&mut rx_c).len(), 1);
        assert_eq!(registry.watching(1), vec!["b", "c"]);
    }

    #[test]
    fn remove_is_idempotent_and_drops_empty_games() {
        let registry = ConnectionRegistry::new();
        let (a, _rx) = channel();
        registry.add("a", 1, a);
        registry.remove("a", 1);
        registry.remove("a", 1);
        registry.remove("nobody", 7);
        assert_eq!(registry.game_count(), 0);
        assert!(registry.watching(1).is_empty());
    }

    #[test]
    fn add_overwrites_and_stale_cleanup_keeps_new_channel() {
        let registry = ConnectionRegistry::new();
        let (old, _old_rx) = channel();
        let (new, mut new_rx) = channel();
        registry.add("a", 1, old.clone());
        registry.add("a", 1, new);
        registry.remove_channel("a", 1, &old);
        assert!(registry.send_to(1, "a", &note("still here")));
        assert_eq!(drain(&mut new_rx).len(), 1);
    }

    #[test]
    fn send_to_unknown_or_closed_is_a_no_op() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.send_to(1, "ghost", &note("x")));
        let (a, rx) = channel();
        registry.add("a", 1, a);
        drop(rx);
        assert!(!registry.send_to(1, "a", &note("x")));
        assert!(registry.watching(1).is_empty());
    }
}
