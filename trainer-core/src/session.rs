//! Session - the primary public API for the companion.
//!
//! A [`Session`] owns the [`AppState`], routes every change through the
//! rules engine and keeps the snapshot in its [`KeyValueStore`] up to date.
//! It is constructed explicitly and handed to the front end; there is no
//! global instance.

use crate::persist::{self, KeyValueStore, PersistError};
use crate::rules::{apply_effects, Effect, Intent, RulesEngine};
use crate::view::TeamPolicy;
use crate::world::{AppState, Creature, CreatureId, Trainer};
use thiserror::Error;

/// Errors from Session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("The team already has {cap} members")]
    TeamFull { cap: usize },

    #[error("No trainer has been created yet")]
    NoTrainer,
}

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Store key the snapshot lives under.
    pub storage_key: String,

    /// How many creatures [`Session::add_creature`] allows.
    pub team_cap: usize,

    /// Attack slots shown per creature.
    pub attack_slots: usize,

    /// Persist after every state-changing dispatch.
    pub autosave: bool,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            storage_key: "trainer-state".to_string(),
            team_cap: 6,
            attack_slots: 4,
            autosave: true,
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_team_cap(mut self, cap: usize) -> Self {
        self.team_cap = cap;
        self
    }

    pub fn with_attack_slots(mut self, slots: usize) -> Self {
        self.attack_slots = slots;
        self
    }

    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    pub fn team_policy(&self) -> TeamPolicy {
        TeamPolicy::new(self.team_cap)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a dispatched intent.
#[derive(Debug, Clone)]
pub struct Response {
    /// Human-readable description of what happened.
    pub narrative: String,

    /// Effects applied to the state.
    pub effects: Vec<Effect>,
}

impl Response {
    pub fn changed(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// The state container.
pub struct Session<S: KeyValueStore> {
    config: SessionConfig,
    store: S,
    state: AppState,
    rules: RulesEngine,
}

impl<S: KeyValueStore> Session<S> {
    /// Start with an empty state. Nothing is read from the store.
    pub fn new(config: SessionConfig, store: S) -> Self {
        Self {
            config,
            store,
            state: AppState::new(),
            rules: RulesEngine::new(),
        }
    }

    /// Load the snapshot from the store, or start empty if there is none.
    ///
    /// An unreadable snapshot is an error so that it is never silently overwritten.
    pub fn restore(config: SessionConfig, store: S) -> Result<Self, SessionError> {
        let state = persist::load_state(&store, &config.storage_key)?;
        match &state {
            Some(state) => tracing::info!(
                key = %config.storage_key,
                team = state.team.len(),
                "Restored saved state"
            ),
            None => tracing::info!(key = %config.storage_key, "No saved state, starting fresh"),
        }

        Ok(Self {
            state: state.unwrap_or_default(),
            ..Self::new(config, store)
        })
    }

    /// Resolve and apply an intent.
    pub fn dispatch(&mut self, intent: Intent) -> Response {
        tracing::debug!(?intent, "Dispatching intent");
        let resolution = self.rules.resolve(&self.state, intent);
        apply_effects(&mut self.state, &resolution.effects);

        if !resolution.effects.is_empty() {
            self.autosave();
        }

        Response {
            narrative: resolution.narrative,
            effects: resolution.effects,
        }
    }

    /// Add a creature, enforcing the configured team cap.
    pub fn add_creature(&mut self, creature: Creature) -> Result<CreatureId, SessionError> {
        let policy = self.config.team_policy();
        if !policy.can_add(&self.state.team) {
            return Err(SessionError::TeamFull { cap: policy.cap });
        }

        let response = self.dispatch(Intent::AddCreature { creature });
        response
            .effects
            .iter()
            .find_map(|effect| match effect {
                Effect::CreatureAdded { id, .. } => Some(*id),
                _ => None,
            })
            .ok_or(SessionError::TeamFull { cap: policy.cap })
    }

    /// Replace the state with a loaded one and persist it.
    pub fn replace_state(&mut self, state: AppState) {
        self.state = state;
        self.autosave();
    }

    /// Drop everything and persist the empty state.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        tracing::info!("Resetting session state");
        self.state = AppState::new();
        self.save()
    }

    /// Persist now, returning any error.
    pub fn save(&mut self) -> Result<(), SessionError> {
        persist::store_state(&mut self.store, &self.config.storage_key, &self.state)?;
        Ok(())
    }

    fn autosave(&mut self) {
        if !self.config.autosave {
            return;
        }
        if let Err(e) = persist::store_state(&mut self.store, &self.config.storage_key, &self.state)
        {
            tracing::warn!(error = %e, "Failed to persist state");
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The trainer, or [`SessionError::NoTrainer`].
    pub fn trainer(&self) -> Result<&Trainer, SessionError> {
        self.state.trainer.as_ref().ok_or(SessionError::NoTrainer)
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.state.creature(id)
    }

    /// Whether another creature may join under the configured cap.
    pub fn can_add_creature(&self) -> bool {
        self.config.team_policy().can_add(&self.state.team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use crate::testing::{sample_creature, sample_trainer};

    /// A store whose writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }

        fn remove(&mut self, _key: &str) -> Result<(), PersistError> {
            Ok(())
        }
    }

    #[test]
    fn test_session_config() {
        let config = SessionConfig::new()
            .with_storage_key("slot-2")
            .with_team_cap(3)
            .with_attack_slots(6)
            .with_autosave(false);

        assert_eq!(config.storage_key, "slot-2");
        assert_eq!(config.team_cap, 3);
        assert_eq!(config.attack_slots, 6);
        assert!(!config.autosave);

        let defaults = SessionConfig::default();
        assert_eq!(defaults.storage_key, "trainer-state");
        assert_eq!(defaults.team_cap, 6);
        assert_eq!(defaults.attack_slots, 4);
    }

    #[test]
    fn test_dispatch_autosaves() {
        let mut session = Session::new(SessionConfig::new(), MemoryStore::new());
        assert!(session.store().is_empty());

        session.dispatch(Intent::CreateTrainer {
            trainer: sample_trainer("Ash"),
        });
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn test_noop_dispatch_does_not_save() {
        let mut session = Session::new(SessionConfig::new(), MemoryStore::new());
        let response = session.dispatch(Intent::SetCurrency { amount: 10 });
        assert!(!response.changed());
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_team_cap_enforced() {
        let mut session = Session::new(SessionConfig::new(), MemoryStore::new());
        for i in 0..6 {
            session.add_creature(sample_creature(&format!("Mon {i}"))).unwrap();
        }
        assert!(!session.can_add_creature());

        let result = session.add_creature(sample_creature("Seventh"));
        assert!(matches!(result, Err(SessionError::TeamFull { cap: 6 })));
        assert_eq!(session.state().team.len(), 6);
    }

    #[test]
    fn test_failed_persist_is_not_fatal() {
        let mut session = Session::new(SessionConfig::new(), BrokenStore);
        let response = session.dispatch(Intent::CreateTrainer {
            trainer: sample_trainer("Ash"),
        });
        assert!(response.changed());
        assert_eq!(session.trainer().unwrap().name, "Ash");

        assert!(matches!(session.save(), Err(SessionError::Persist(_))));
    }

    #[test]
    fn test_restore_and_reset() {
        let mut session = Session::new(SessionConfig::new(), MemoryStore::new());
        session.dispatch(Intent::CreateTrainer {
            trainer: sample_trainer("Ash"),
        });
        let id = session.add_creature(sample_creature("Sparky")).unwrap();

        let store = session.store().clone();
        let mut restored = Session::restore(SessionConfig::new(), store).unwrap();
        assert_eq!(restored.state(), session.state());
        assert!(restored.creature(id).is_some());

        restored.reset().unwrap();
        assert!(matches!(restored.trainer(), Err(SessionError::NoTrainer)));
        assert!(restored.state().team.is_empty());
    }
}
