//! Member entity.
//!
//! # Invariants
//! - `id` is `None` until the record store assigns one on first save.
//! - `team` is only set by the repository (load or `assign_team`).

use crate::model::team::TeamId;
use crate::query::{Field, FieldKind};
use serde::{Deserialize, Serialize};

/// Store-assigned member identity.
pub type MemberId = i64;

/// Denormalized reference to the member's team, loaded with the member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: TeamId,
    pub name: String,
}

/// Stored member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: Option<MemberId>,
    pub username: String,
    pub age: i32,
    team: Option<TeamRef>,
}

impl Member {
    /// Creates an unsaved member aged 0 with no team.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_age(username, 0)
    }

    /// Creates an unsaved member with the given age and no team.
    pub fn with_age(username: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            username: username.into(),
            age,
            team: None,
        }
    }

    pub(crate) fn from_parts(
        id: MemberId,
        username: String,
        age: i32,
        team: Option<TeamRef>,
    ) -> Self {
        Self {
            id: Some(id),
            username,
            age,
            team,
        }
    }

    pub fn id(&self) -> Option<MemberId> {
        self.id
    }

    pub fn team(&self) -> Option<&TeamRef> {
        self.team.as_ref()
    }

    /// Team name, or `""` when the member has no team.
    pub fn team_name(&self) -> &str {
        self.team.as_ref().map_or("", |team| team.name.as_str())
    }

    pub(crate) fn assign_id(&mut self, id: MemberId) {
        self.id = Some(id);
    }

    pub(crate) fn set_team(&mut self, team: Option<TeamRef>) {
        self.team = team;
    }
}

/// Queryable member columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberField {
    Id,
    Username,
    Age,
    TeamId,
    /// Name of the joined team; read-only.
    TeamName,
}

impl Field for MemberField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Username,
        Self::Age,
        Self::TeamId,
        Self::TeamName,
    ];
    const IDENTITY: Self = Self::Id;

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Username => "username",
            Self::Age => "age",
            Self::TeamId => "teamId",
            Self::TeamName => "teamName",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "m.id",
            Self::Username => "m.username",
            Self::Age => "m.age",
            Self::TeamId => "m.team_id",
            Self::TeamName => "t.name",
        }
    }

    fn writable_column(self) -> Option<&'static str> {
        match self {
            Self::Username => Some("username"),
            Self::Age => Some("age"),
            Self::TeamId => Some("team_id"),
            Self::Id | Self::TeamName => None,
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Id | Self::Age | Self::TeamId => FieldKind::Integer,
            Self::Username | Self::TeamName => FieldKind::Text,
        }
    }

    fn nullable(self) -> bool {
        matches!(self, Self::TeamId)
    }

    fn bounds(self) -> Option<(i64, i64)> {
        match self {
            Self::Age => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            _ => None,
        }
    }
}
