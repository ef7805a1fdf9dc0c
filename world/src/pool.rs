//! Character pool that recycles slots instead of destroying them.

use std::collections::{HashMap, VecDeque};

use glam::Vec3;
use zombie_io_core::{Archetype, CharacterId, CharacterKind};

use crate::Character;

/// Pool partitioned into active characters and per-kind disabled queues.
///
/// A slot is constructed once and lives for as long as the pool does. The
/// active list preserves acquisition order; disabled queues hand slots back
/// out in FIFO order.
#[derive(Debug, Default)]
pub(crate) struct CharacterPool {
    slots: Vec<Character>,
    active: Vec<CharacterId>,
    disabled: HashMap<CharacterKind, VecDeque<CharacterId>>,
}

impl CharacterPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hands out a freshly initialised character built from `archetype`.
    pub(crate) fn acquire(&mut self, archetype: &Archetype, position: Vec3) -> CharacterId {
        let recycled = self
            .disabled
            .entry(archetype.kind)
            .or_default()
            .pop_front();

        let id = match recycled {
            Some(id) => id,
            None => self.construct(archetype),
        };

        if let Some(character) = self.slot_mut(id) {
            character.initialize(archetype, position);
        }
        self.active.push(id);
        debug_assert!(self.is_partitioned(id));
        id
    }

    /// Moves an active character into its kind's disabled queue.
    ///
    /// Returns the kind of the released character, or `None` when the
    /// character was not active.
    pub(crate) fn release(&mut self, id: CharacterId) -> Option<CharacterKind> {
        let index = self.active.iter().position(|active| *active == id)?;
        let _ = self.active.remove(index);

        let kind = self.slot(id)?.kind;
        self.disabled.entry(kind).or_default().push_back(id);
        debug_assert!(self.is_partitioned(id));
        Some(kind)
    }

    pub(crate) fn is_active(&self, id: CharacterId) -> bool {
        self.active.contains(&id)
    }

    pub(crate) fn active(&self, id: CharacterId) -> Option<&Character> {
        if self.is_active(id) {
            self.slot(id)
        } else {
            None
        }
    }

    pub(crate) fn active_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        if self.is_active(id) {
            self.slot_mut(id)
        } else {
            None
        }
    }

    /// Active characters in acquisition order.
    pub(crate) fn iter_active(&self) -> impl Iterator<Item = &Character> {
        self.active.iter().filter_map(|id| self.slot(*id))
    }

    pub(crate) fn active_ids(&self) -> &[CharacterId] {
        &self.active
    }

    pub(crate) fn disabled_len(&self, kind: CharacterKind) -> usize {
        self.disabled.get(&kind).map_or(0, VecDeque::len)
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn tick_active<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut Character),
    {
        for id in &self.active {
            if let Some(character) = usize::try_from(id.get())
                .ok()
                .and_then(|index| self.slots.get_mut(index))
            {
                visit(character);
            }
        }
    }

    fn construct(&mut self, archetype: &Archetype) -> CharacterId {
        let id = CharacterId::new(self.slots.len() as u32);
        self.slots.push(Character::from_archetype(id, archetype));
        id
    }

    fn slot(&self, id: CharacterId) -> Option<&Character> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.slots.get(index))
    }

    fn slot_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.slots.get_mut(index))
    }

    fn is_partitioned(&self, id: CharacterId) -> bool {
        let active = self.active.iter().filter(|active| **active == id).count();
        let disabled: usize = self
            .disabled
            .values()
            .map(|queue| queue.iter().filter(|disabled| **disabled == id).count())
            .sum();
        active + disabled == 1
    }
}
