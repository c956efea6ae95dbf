//! Team record store over SQLite.
//!
//! Loaded teams carry their member list derived from `member.team_id`, so a
//! freshly loaded team never lists a deleted member.

use crate::model::member::MemberId;
use crate::model::team::{Team, TeamField, TeamId};
use crate::query::sql::{order_by_clause, where_clause};
use crate::query::{Predicate, Sort};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, params_from_iter, Connection};

/// Repository interface for teams.
pub trait TeamRepository {
    /// Inserts an unsaved team (assigning its id) or renames a saved one.
    fn save(&self, team: &Team) -> RepoResult<Team>;
    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>>;
    fn find_all(&self) -> RepoResult<Vec<Team>>;
    fn find_by(
        &self,
        predicate: &Predicate<TeamField>,
        sort: &Sort<TeamField>,
    ) -> RepoResult<Vec<Team>>;
    fn count(&self) -> RepoResult<u64>;
    /// Removes by identity; members of the team keep existing without a team.
    fn delete(&self, team: &Team) -> RepoResult<()>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn member_ids(&self, team_id: TeamId) -> RepoResult<Vec<MemberId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM member WHERE team_id = ?1 ORDER BY id ASC;")?;
        let ids = stmt
            .query_map([team_id], |row| row.get(0))?
            .collect::<Result<Vec<MemberId>, _>>()?;
        Ok(ids)
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn save(&self, team: &Team) -> RepoResult<Team> {
        match team.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO team (name) VALUES (?1);",
                    [team.name.as_str()],
                )?;
                let mut saved = team.clone();
                saved.assign_id(self.conn.last_insert_rowid());
                Ok(saved)
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE team SET name = ?1 WHERE id = ?2;",
                    params![team.name.as_str(), id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound { entity: "team", id });
                }
                Ok(team.clone())
            }
        }
    }

    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>> {
        self.find_by(&Predicate::eq(TeamField::Id, id), &Sort::unsorted())
            .map(|teams| teams.into_iter().next())
    }

    fn find_all(&self) -> RepoResult<Vec<Team>> {
        self.find_by(&Predicate::All, &Sort::unsorted())
    }

    fn find_by(
        &self,
        predicate: &Predicate<TeamField>,
        sort: &Sort<TeamField>,
    ) -> RepoResult<Vec<Team>> {
        let filter = where_clause(predicate)?;
        let sql = format!(
            "SELECT t.id, t.name FROM team t WHERE {} ORDER BY {};",
            filter.sql,
            order_by_clause(sort)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(filter.params), |row| {
                Ok((row.get::<_, TeamId>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name)| Ok(Team::from_parts(id, name, self.member_ids(id)?)))
            .collect()
    }

    fn count(&self) -> RepoResult<u64> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM team;", [], |row| row.get(0))?;
        u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {total}")))
    }

    fn delete(&self, team: &Team) -> RepoResult<()> {
        let Some(id) = team.id() else {
            return Ok(());
        };
        let removed = self.conn.execute("DELETE FROM team WHERE id = ?1;", [id])?;
        debug!("event=team_delete module=repo status=ok id={id} removed={removed}");
        Ok(())
    }
}
