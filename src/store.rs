//! Persisted game records. The server only needs get/update semantics; the
//! in-memory store stands in for a database and gives each game its own lock.

use dashmap::DashMap;
use log::info;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{GameError, Result};
use crate::models::{GameId, GameState};

pub trait GameStore: Send + Sync {
    /// Creates a game in the starting position and returns its id.
    fn create(&self, name: &str) -> GameId;

    fn get(&self, id: GameId) -> Result<GameState>;

    /// Replaces the stored record with the same id.
    fn update(&self, record: GameState) -> Result<()>;

    fn list(&self) -> Vec<GameState>;

    /// Runs `f` against a copy of the record while holding that game's lock
    /// and commits the copy only if `f` succeeds. Returns the committed record.
    fn update_with(
        &self,
        id: GameId,
        f: &mut dyn FnMut(&mut GameState) -> Result<()>,
    ) -> Result<GameState>;
}

pub struct InMemoryGameStore {
    games: DashMap<GameId, Arc<Mutex<GameState>>>,
    next_id: AtomicU32,
}

impl Default for InMemoryGameStore {
    fn default() -> Self {
        Self {
            games: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: GameId) -> Result<Arc<Mutex<GameState>>> {
        self.games
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| GameError::NotFound(format!("game {}", id)))
    }
}

fn lock(slot: &Mutex<GameState>) -> MutexGuard<'_, GameState> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl GameStore for InMemoryGameStore {
    fn create(&self, name: &str) -> GameId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.games
            .insert(id, Arc::new(Mutex::new(GameState::new(id, name))));
        info!("created game {} ({})", id, name);
        id
    }

    fn get(&self, id: GameId) -> Result<GameState> {
        let slot = self.slot(id)?;
        let record = lock(&slot).clone();
        Ok(record)
    }

    fn update(&self, record: GameState) -> Result<()> {
        let slot = self.slot(record.game_id)?;
        *lock(&slot) = record;
        Ok(())
    }

    fn list(&self) -> Vec<GameState> {
        let slots: Vec<_> = self.games.iter().map(|e| e.value().clone()).collect();
        let mut records: Vec<_> = slots.iter().map(|slot| lock(slot).clone()).collect();
        records.sort_by_key(|r| r.game_id);
        records
    }

    fn update_with(
        &self,
        id: GameId,
        f: &mut dyn FnMut(&mut GameState) -> Result<()>,
    ) -> Result<GameState> {
        let slot = self.slot(id)?;
        let mut guard = lock(&slot);
        let mut draft = guard.clone();
        f(&mut draft)?;
        *guard = draft.clone();
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_get_update_list() {
        let store = InMemoryGameStore::new();
        let a = store.create("first");
        let b = store.create("second");
        assert_ne!(a, b);

        let mut record = store.get(a).unwrap();
        assert_eq!(record.game_name, "first");
        record.white_username = Some("alice".into());
        store.update(record).unwrap();
        assert_eq!(store.get(a).unwrap().white_username.as_deref(), Some("alice"));

        let names: Vec<_> = store.list().into_iter().map(|r| r.game_name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn unknown_game_is_not_found() {
        let store = InMemoryGameStore::new();
        assert!(matches!(store.get(42), Err(GameError::NotFound(_))));
        assert!(matches!(
            store.update(GameState::new(42, "ghost")),
            Err(GameError::NotFound(_))
        ));
    }

    #[test]
    fn failed_update_commits_nothing() {
        let store = InMemoryGameStore::new();
        let id = store.create("g");
        let result = store.update_with(id, &mut |record| {
            record.game.set_over(true);
            Err(GameError::InvalidMove("nope".into()))
        });
        assert!(result.is_err());
        assert!(!store.get(id).unwrap().game.is_over());
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let store = Arc::new(InMemoryGameStore::new());
        let id = store.create("busy");
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .update_with(id, &mut |record| {
                            let name = format!("{}{}", record.game_name, i);
                            record.game_name = name;
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get(id).unwrap().game_name.len(), "busy".len() + 8);
    }
}
