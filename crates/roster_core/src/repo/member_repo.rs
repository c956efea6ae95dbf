//! Member record store and query execution over SQLite.
//!
//! # Responsibility
//! - CRUD, conditional bulk update, and the member/team assignment entry point.
//! - Execute predicate, page, and slice queries built by the query layer.
//! - Route every entity read through the repository's persistence context.
//!
//! # Invariants
//! - Entity reads return the context's registered instance for known ids.
//! - `bulk_update` writes straight to storage and leaves the context alone;
//!   callers must `clear_context()` before trusting later reads.
//! - Results are ordered by the requested sort keys, then by `id ASC`.
//! - `find_slice` never issues a count query.

use crate::model::member::{Member, MemberField, MemberId, TeamRef};
use crate::model::team::Team;
use crate::model::view::MemberView;
use crate::query::sql::{
    increment_overflow_clause, order_by_clause, set_clause, where_clause, SqlFragment,
};
use crate::query::{
    Assignment, Field, Mutation, Page, PageRequest, Predicate, QueryError, Slice, Sort,
};
use crate::repo::context::PersistenceContext;
use crate::repo::{ensure_connection_ready, narrow_i32, RepoError, RepoResult};
use log::{debug, info, warn};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::cell::Cell;

const MEMBER_SELECT_SQL: &str = "SELECT
    m.id AS id,
    m.username AS username,
    m.age AS age,
    m.team_id AS team_id,
    t.name AS team_name
FROM member m
LEFT JOIN team t ON t.id = m.team_id";

const MEMBER_FROM_SQL: &str = "FROM member m LEFT JOIN team t ON t.id = m.team_id";

/// Repository interface for members: record store plus query execution.
pub trait MemberRepository {
    /// Inserts an unsaved member (assigning its id) or updates a saved one.
    fn save(&self, member: &Member) -> RepoResult<Member>;
    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>>;
    /// Every member with its team, ordered by id.
    fn find_all(&self) -> RepoResult<Vec<Member>>;
    fn count(&self) -> RepoResult<u64>;
    /// Removes by identity; unsaved or already-deleted members are a no-op.
    ///
    /// `Team` values the caller already holds keep listing the member until
    /// they are reloaded.
    fn delete(&self, member: &Member) -> RepoResult<()>;
    fn delete_by_id(&self, id: MemberId) -> RepoResult<()>;
    /// Applies `mutation` to every matching row in one statement.
    ///
    /// Returns the affected row count. Does not touch the persistence
    /// context; see [`MemberRepository::clear_context`].
    ///
    /// Clearing a non-nullable column, setting a value outside the column
    /// bounds, or an increment that would push any matching row out of them
    /// is rejected as `InvalidArgument` before anything is written.
    fn bulk_update(
        &self,
        predicate: &Predicate<MemberField>,
        mutation: &Mutation<MemberField>,
    ) -> RepoResult<usize>;
    /// Points `member` at `team` and registers it on the team's side.
    ///
    /// When the member moves away from another team, a `Team` value the
    /// caller holds for that previous team still lists it; stored state is
    /// correct and a reload of the previous team drops it.
    fn assign_team(&self, member: &mut Member, team: &mut Team) -> RepoResult<()>;
    /// Detaches every member held by the persistence context.
    fn clear_context(&self);

    fn find_by(
        &self,
        predicate: &Predicate<MemberField>,
        sort: &Sort<MemberField>,
    ) -> RepoResult<Vec<Member>>;
    fn count_by(&self, predicate: &Predicate<MemberField>) -> RepoResult<u64>;
    /// One page of matches plus a count query for the totals.
    fn find_page(
        &self,
        predicate: &Predicate<MemberField>,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Page<Member>>;
    /// One window of matches, detecting more data with a `size + 1` over-fetch.
    fn find_slice(
        &self,
        predicate: &Predicate<MemberField>,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Slice<Member>>;
    /// One window of matches with neither totals nor over-fetch.
    fn find_list(
        &self,
        predicate: &Predicate<MemberField>,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Vec<Member>>;
    /// Every username, ordered by member id.
    fn find_usernames(&self) -> RepoResult<Vec<String>>;
    /// Views of members that belong to a team (inner join), ordered by id.
    fn find_member_views(&self) -> RepoResult<Vec<MemberView>>;
}

/// Statement counts issued by one repository instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStatistics {
    pub entity_queries: u64,
    pub count_queries: u64,
    pub bulk_updates: u64,
}

/// SQLite-backed member repository; one instance is one unit of work.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
    context: PersistenceContext,
    stats: Cell<QueryStatistics>,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            context: PersistenceContext::new(),
            stats: Cell::new(QueryStatistics::default()),
        })
    }

    pub fn context(&self) -> &PersistenceContext {
        &self.context
    }

    pub fn statistics(&self) -> QueryStatistics {
        self.stats.get()
    }

    fn record(&self, update: impl FnOnce(&mut QueryStatistics)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }

    /// Rejects the mutation when any matching row would leave its column
    /// bounds after an increment.
    fn ensure_increments_fit(
        &self,
        filter: &SqlFragment,
        mutation: &Mutation<MemberField>,
    ) -> RepoResult<()> {
        for assignment in mutation.assignments() {
            let Assignment::Increment(field, delta) = assignment else {
                continue;
            };
            let Some(overflow) = increment_overflow_clause(*field, *delta) else {
                continue;
            };

            let sql = format!(
                "SELECT EXISTS(SELECT 1 {MEMBER_FROM_SQL} WHERE ({}) AND ({}));",
                filter.sql, overflow.sql
            );
            let mut bind_values = filter.params.clone();
            bind_values.extend(overflow.params);

            self.record(|stats| stats.count_queries += 1);
            let overflows: bool = self
                .conn
                .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
            if overflows {
                warn!(
                    "event=member_bulk_update module=repo status=rejected reason=overflow field={}",
                    field.name()
                );
                return Err(QueryError::IncrementOverflow {
                    field: field.name(),
                    delta: *delta,
                }
                .into());
            }
        }
        Ok(())
    }

    fn select_members(
        &self,
        predicate: &Predicate<MemberField>,
        sort: &Sort<MemberField>,
        window: Option<(u64, u64)>,
    ) -> RepoResult<Vec<Member>> {
        let filter = where_clause(predicate)?;
        let mut sql = format!(
            "{MEMBER_SELECT_SQL} WHERE {} ORDER BY {}",
            filter.sql,
            order_by_clause(sort)
        );
        let mut bind_values = filter.params;

        if let Some((limit, offset)) = window {
            sql.push_str(" LIMIT ? OFFSET ?");
            bind_values.push(SqlValue::Integer(clamp_to_i64(limit)));
            bind_values.push(SqlValue::Integer(clamp_to_i64(offset)));
        }

        self.record(|stats| stats.entity_queries += 1);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(self.context.resolve(parse_member_row(row)?));
        }
        Ok(members)
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn save(&self, member: &Member) -> RepoResult<Member> {
        let team_id = member.team().map(|team| team.id);
        let mut saved = member.clone();

        match member.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO member (username, age, team_id) VALUES (?1, ?2, ?3);",
                    params![member.username.as_str(), member.age, team_id],
                )?;
                saved.assign_id(self.conn.last_insert_rowid());
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE member SET username = ?1, age = ?2, team_id = ?3 WHERE id = ?4;",
                    params![member.username.as_str(), member.age, team_id, id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "member",
                        id,
                    });
                }
            }
        }

        self.context.register(&saved);
        Ok(saved)
    }

    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        if let Some(registered) = self.context.get(id) {
            return Ok(Some(registered));
        }

        self.record(|stats| stats.entity_queries += 1);
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE m.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(self.context.resolve(parse_member_row(row)?))),
            None => Ok(None),
        }
    }

    fn find_all(&self) -> RepoResult<Vec<Member>> {
        self.select_members(&Predicate::All, &Sort::unsorted(), None)
    }

    fn count(&self) -> RepoResult<u64> {
        self.count_by(&Predicate::All)
    }

    fn delete(&self, member: &Member) -> RepoResult<()> {
        match member.id() {
            Some(id) => self.delete_by_id(id),
            None => Ok(()),
        }
    }

    fn delete_by_id(&self, id: MemberId) -> RepoResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM member WHERE id = ?1;", [id])?;
        self.context.evict(id);
        debug!("event=member_delete module=repo status=ok id={id} removed={removed}");
        Ok(())
    }

    fn bulk_update(
        &self,
        predicate: &Predicate<MemberField>,
        mutation: &Mutation<MemberField>,
    ) -> RepoResult<usize> {
        let assignments = set_clause(mutation)?;
        let filter = where_clause(predicate)?;
        self.ensure_increments_fit(&filter, mutation)?;
        let sql = format!(
            "UPDATE member SET {} WHERE id IN (SELECT m.id {MEMBER_FROM_SQL} WHERE {});",
            assignments.sql, filter.sql
        );
        let mut bind_values = assignments.params;
        bind_values.extend(filter.params);

        self.record(|stats| stats.bulk_updates += 1);
        match self.conn.execute(&sql, params_from_iter(bind_values)) {
            Ok(affected) => {
                info!(
                    "event=member_bulk_update module=repo status=ok affected={affected} context_size={}",
                    self.context.len()
                );
                Ok(affected)
            }
            Err(err) => {
                warn!("event=member_bulk_update module=repo status=error error={err}");
                Err(err.into())
            }
        }
    }

    fn assign_team(&self, member: &mut Member, team: &mut Team) -> RepoResult<()> {
        let member_id = member.id().ok_or(RepoError::UnsavedEntity("member"))?;
        let team_id = team.id().ok_or(RepoError::UnsavedEntity("team"))?;

        let changed = self.conn.execute(
            "UPDATE member SET team_id = ?1 WHERE id = ?2;",
            params![team_id, member_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "member",
                id: member_id,
            });
        }

        member.set_team(Some(TeamRef {
            id: team_id,
            name: team.name.clone(),
        }));
        team.register_member(member_id);
        self.context.register(member);
        Ok(())
    }

    fn clear_context(&self) {
        self.context.clear();
    }

    fn find_by(
        &self,
        predicate: &Predicate<MemberField>,
        sort: &Sort<MemberField>,
    ) -> RepoResult<Vec<Member>> {
        self.select_members(predicate, sort, None)
    }

    fn count_by(&self, predicate: &Predicate<MemberField>) -> RepoResult<u64> {
        let filter = where_clause(predicate)?;
        let sql = format!("SELECT COUNT(*) {MEMBER_FROM_SQL} WHERE {};", filter.sql);

        self.record(|stats| stats.count_queries += 1);
        let total: i64 = self
            .conn
            .query_row(&sql, params_from_iter(filter.params), |row| row.get(0))?;
        u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {total}")))
    }

    fn find_page(
        &self,
        predicate: &Predicate<MemberField>,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Page<Member>> {
        let window = (u64::from(request.size()), request.offset());
        let content = self.select_members(predicate, request.sort(), Some(window))?;
        let total_elements = self.count_by(predicate)?;
        debug!(
            "event=member_page module=repo status=ok page={} size={} returned={} total={total_elements}",
            request.page(),
            request.size(),
            content.len()
        );
        Ok(Page::new(
            content,
            request.page(),
            request.size(),
            total_elements,
        ))
    }

    fn find_slice(
        &self,
        predicate: &Predicate<MemberField>,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Slice<Member>> {
        let window = (u64::from(request.size()) + 1, request.offset());
        let fetched = self.select_members(predicate, request.sort(), Some(window))?;
        debug!(
            "event=member_slice module=repo status=ok page={} size={} fetched={}",
            request.page(),
            request.size(),
            fetched.len()
        );
        Ok(Slice::from_overfetch(
            fetched,
            request.page(),
            request.size(),
        ))
    }

    fn find_list(
        &self,
        predicate: &Predicate<MemberField>,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Vec<Member>> {
        let window = (u64::from(request.size()), request.offset());
        self.select_members(predicate, request.sort(), Some(window))
    }

    fn find_usernames(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT m.username FROM member m ORDER BY m.id ASC;")?;
        let usernames = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(usernames)
    }

    fn find_member_views(&self) -> RepoResult<Vec<MemberView>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.id, m.username, t.name
             FROM member m
             INNER JOIN team t ON t.id = m.team_id
             ORDER BY m.id ASC;",
        )?;
        let views = stmt
            .query_map([], |row| {
                Ok(MemberView::new(
                    Some(row.get(0)?),
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(views)
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let team_id: Option<i64> = row.get("team_id")?;
    let team_name: Option<String> = row.get("team_name")?;
    let team = match (team_id, team_name) {
        (Some(id), Some(name)) => Some(TeamRef { id, name }),
        (None, _) => None,
        (Some(id), None) => {
            return Err(RepoError::InvalidData(format!(
                "member.team_id references missing team {id}"
            )));
        }
    };

    Ok(Member::from_parts(
        row.get("id")?,
        row.get("username")?,
        narrow_i32(row.get("age")?, "member.age")?,
        team,
    ))
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
