//! Member roster core: record store, filtered and paginated queries, and the
//! persistence-context rules around bulk updates.

pub mod config;
pub mod db;
pub mod listing;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::{PagingConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use listing::{list_members, parse_listing_request, MemberListing};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::member::{Member, MemberField, MemberId, TeamRef};
pub use model::team::{Team, TeamField, TeamId};
pub use model::view::{project_to, MemberView};
pub use query::{
    Direction, Field, FieldKind, Mutation, Order, Page, PageRequest, Predicate, QueryError,
    QueryResult, Slice, Sort, Value,
};
pub use repo::context::PersistenceContext;
pub use repo::member_repo::{MemberRepository, QueryStatistics, SqliteMemberRepository};
pub use repo::team_repo::{SqliteTeamRepository, TeamRepository};
pub use repo::{RepoError, RepoResult};
pub use seed::{seed_demo_members, DEMO_MEMBER_COUNT};
pub use service::member_service::MemberService;

/// Liveness probe for embedding hosts and the CLI.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
