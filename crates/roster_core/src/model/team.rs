//! Team entity.
//!
//! `members` is a back-pointer index only. The member table owns the
//! relationship; the repository re-derives this list whenever a team loads.

use crate::model::member::MemberId;
use crate::query::{Field, FieldKind};
use serde::{Deserialize, Serialize};

/// Store-assigned team identity.
pub type TeamId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: Option<TeamId>,
    pub name: String,
    members: Vec<MemberId>,
}

impl Team {
    /// Creates an unsaved team with no members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub(crate) fn from_parts(id: TeamId, name: String, members: Vec<MemberId>) -> Self {
        Self {
            id: Some(id),
            name,
            members,
        }
    }

    pub fn id(&self) -> Option<TeamId> {
        self.id
    }

    /// Ids of members known to reference this team, ascending.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub(crate) fn assign_id(&mut self, id: TeamId) {
        self.id = Some(id);
    }

    pub(crate) fn register_member(&mut self, member_id: MemberId) {
        if let Err(position) = self.members.binary_search(&member_id) {
            self.members.insert(position, member_id);
        }
    }
}

/// Queryable team columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamField {
    Id,
    Name,
}

impl Field for TeamField {
    const ALL: &'static [Self] = &[Self::Id, Self::Name];
    const IDENTITY: Self = Self::Id;

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "t.id",
            Self::Name => "t.name",
        }
    }

    fn writable_column(self) -> Option<&'static str> {
        match self {
            Self::Id => None,
            Self::Name => Some("name"),
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Id => FieldKind::Integer,
            Self::Name => FieldKind::Text,
        }
    }
}
