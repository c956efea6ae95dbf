//! Demo data seeding.
//!
//! Never runs on its own; tests and the CLI call it explicitly.

use crate::model::member::Member;
use crate::repo::member_repo::MemberRepository;
use crate::repo::RepoResult;
use log::info;

/// Member count used by the CLI when no count is given.
pub const DEMO_MEMBER_COUNT: usize = 40;

/// Saves `user0..user{count-1}`, each aged by its index, and returns them.
pub fn seed_demo_members<R: MemberRepository>(repo: &R, count: usize) -> RepoResult<Vec<Member>> {
    let mut saved = Vec::with_capacity(count);
    for index in 0..count {
        let age = i32::try_from(index).unwrap_or(i32::MAX);
        saved.push(repo.save(&Member::with_age(format!("user{index}"), age))?);
    }
    info!("event=seed_members module=seed status=ok count={count}");
    Ok(saved)
}
