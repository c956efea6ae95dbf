//! Persistence context: the per-unit-of-work identity map of loaded members.
//!
//! # Invariants
//! - At most one registered instance per member id.
//! - A row loaded for an id that is already registered resolves to the
//!   registered instance, not the fresh row.
//! - Bulk updates never touch this map. Callers clear it after a bulk update
//!   or keep reading the values registered before it.

use crate::model::member::{Member, MemberId};
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PersistenceContext {
    members: RefCell<HashMap<MemberId, Member>>,
}

impl PersistenceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered instance for `id`, if any.
    pub fn get(&self, id: MemberId) -> Option<Member> {
        self.members.borrow().get(&id).cloned()
    }

    pub fn contains(&self, id: MemberId) -> bool {
        self.members.borrow().contains_key(&id)
    }

    /// Registers `member`, replacing any previous instance for the same id.
    ///
    /// Unsaved members are ignored.
    pub fn register(&self, member: &Member) {
        if let Some(id) = member.id() {
            self.members.borrow_mut().insert(id, member.clone());
        }
    }

    /// Resolves a freshly loaded row against the map.
    ///
    /// Returns the registered instance when one exists; otherwise registers
    /// and returns `loaded`.
    pub fn resolve(&self, loaded: Member) -> Member {
        let Some(id) = loaded.id() else {
            return loaded;
        };
        self.members
            .borrow_mut()
            .entry(id)
            .or_insert(loaded)
            .clone()
    }

    pub fn evict(&self, id: MemberId) {
        self.members.borrow_mut().remove(&id);
    }

    /// Detaches every registered member.
    pub fn clear(&self) {
        let mut members = self.members.borrow_mut();
        let detached = members.len();
        members.clear();
        debug!("event=context_clear module=repo status=ok detached={detached}");
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }
}
