//! Local view of the remote participants.

use std::collections::HashMap;

use proxmesh_common::{ParticipantId, Position};

use crate::animation::AnimationState;
use crate::state::{FieldChange, ParticipantRecord};

/// Local proxy for one remote participant.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RemoteParticipant {
    pub position: Position,
    pub animation: AnimationState,
}

impl RemoteParticipant {
    fn apply(&mut self, change: &FieldChange) {
        match *change {
            FieldChange::X(x) => self.position.x = x,
            FieldChange::Y(y) => self.position.y = y,
            FieldChange::Animation(anim) => self.animation = anim,
        }
    }
}

/// Joined-and-not-yet-left remote participants. Never holds the local id.
pub(crate) struct LocalParticipantRegistry {
    local_id: ParticipantId,
    entries: HashMap<ParticipantId, RemoteParticipant>,
}

impl LocalParticipantRegistry {
    pub(crate) fn new(local_id: ParticipantId) -> Self {
        Self {
            local_id,
            entries: HashMap::new(),
        }
    }

    /// Returns `false` for the local id or an id already present.
    pub(crate) fn insert(&mut self, record: &ParticipantRecord) -> bool {
        if record.id == self.local_id || self.entries.contains_key(&record.id) {
            return false;
        }
        self.entries.insert(
            record.id.clone(),
            RemoteParticipant {
                position: record.position,
                animation: record.animation,
            },
        );
        true
    }

    pub(crate) fn remove(&mut self, id: &ParticipantId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Returns `false` when `id` is not registered.
    pub(crate) fn apply(&mut self, id: &ParticipantId, change: &FieldChange) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.apply(change);
                true
            }
            None => false,
        }
    }

    pub(crate) fn get(&self, id: &ParticipantId) -> Option<&RemoteParticipant> {
        self.entries.get(id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &RemoteParticipant)> {
        self.entries.iter()
    }

    /// Registered ids in ascending order.
    pub(crate) fn ids(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<_> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }
}
