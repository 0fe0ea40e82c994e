//! The team registry: generated id to creature.
//!
//! The registry itself has no size limit. How many creatures a trainer may
//! carry is a caller policy, see [`crate::view::TeamPolicy`].

use crate::world::{Creature, CreatureId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keyed collection of a trainer's creatures.
///
/// Iteration is ordered by id, which is stable but unrelated to insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamRegistry {
    members: BTreeMap<CreatureId, Creature>,
}

impl TeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under a fresh id and return the id.
    pub fn add(&mut self, creature: Creature) -> CreatureId {
        let id = CreatureId::new();
        self.members.insert(id, creature);
        id
    }

    /// Insert under a known id, replacing any existing entry.
    pub fn insert_with_id(&mut self, id: CreatureId, creature: Creature) {
        self.members.insert(id, creature);
    }

    /// Delete an entry. Absent ids are ignored.
    pub fn remove(&mut self, id: CreatureId) -> Option<Creature> {
        self.members.remove(&id)
    }

    /// Replace the creature stored under `id`. Returns false if the id is unknown.
    pub fn update(&mut self, id: CreatureId, next: Creature) -> bool {
        match self.members.get_mut(&id) {
            Some(slot) => {
                *slot = next;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        self.members.get(&id)
    }

    pub fn get_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.members.get_mut(&id)
    }

    pub fn contains(&self, id: CreatureId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CreatureId, &Creature)> {
        self.members.iter().map(|(id, c)| (*id, c))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (CreatureId, &mut Creature)> {
        self.members.iter_mut().map(|(id, c)| (*id, c))
    }

    pub fn ids(&self) -> Vec<CreatureId> {
        self.members.keys().copied().collect()
    }

    /// Look a creature up by name, case-insensitively.
    pub fn find_by_name(&self, name: &str) -> Option<CreatureId> {
        let name_lower = name.to_lowercase();
        self.iter()
            .find(|(_, c)| c.name.to_lowercase() == name_lower)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_creature;

    #[test]
    fn test_add_generates_unique_ids() {
        let mut team = TeamRegistry::new();
        let a = team.add(sample_creature("Sparky"));
        let b = team.add(sample_creature("Sparky"));
        assert_ne!(a, b);
        assert_eq!(team.len(), 2);
    }

    #[test]
    fn test_registry_has_no_size_limit() {
        let mut team = TeamRegistry::new();
        for i in 0..7 {
            team.add(sample_creature(&format!("Mon {i}")));
        }
        assert_eq!(team.len(), 7);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut team = TeamRegistry::new();
        let id = team.add(sample_creature("Sparky"));
        assert!(team.remove(CreatureId::new()).is_none());
        assert_eq!(team.len(), 1);
        assert!(team.remove(id).is_some());
        assert!(team.is_empty());
    }

    #[test]
    fn test_update_preserves_id() {
        let mut team = TeamRegistry::new();
        let id = team.add(sample_creature("Sparky"));

        let mut next = sample_creature("Sparky");
        next.level = 12;
        assert!(team.update(id, next));
        assert_eq!(team.get(id).map(|c| c.level), Some(12));

        assert!(!team.update(CreatureId::new(), sample_creature("Ghost")));
        assert_eq!(team.len(), 1);
    }

    #[test]
    fn test_iteration_is_stable() {
        let mut team = TeamRegistry::new();
        for name in ["A", "B", "C"] {
            team.add(sample_creature(name));
        }
        let first: Vec<_> = team.iter().map(|(id, _)| id).collect();
        let second = team.ids();
        assert_eq!(first, second);
    }

    #[test]
    fn test_find_by_name() {
        let mut team = TeamRegistry::new();
        let id = team.add(sample_creature("Sparky"));
        assert_eq!(team.find_by_name("sparky"), Some(id));
        assert_eq!(team.find_by_name("Bolt"), None);
    }
}
