//! Read-side projections.
//!
//! Views are built on read and never persisted; building one performs no I/O.

use crate::model::member::{Member, MemberId};
use serde::{Deserialize, Serialize};

/// Flattened member shape returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: Option<MemberId>,
    pub username: String,
    /// Empty when the member has no team.
    pub team_name: String,
}

impl MemberView {
    pub fn new(
        id: Option<MemberId>,
        username: impl Into<String>,
        team_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            team_name: team_name.into(),
        }
    }
}

impl From<&Member> for MemberView {
    fn from(member: &Member) -> Self {
        Self::new(member.id(), member.username.as_str(), member.team_name())
    }
}

/// Applies `mapper` to `entity`.
pub fn project_to<E, V>(entity: &E, mapper: impl FnOnce(&E) -> V) -> V {
    mapper(entity)
}
