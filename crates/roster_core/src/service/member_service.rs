//! Member use-case service.
//!
//! # Responsibility
//! - Named query methods composed from predicate combinators.
//! - Page/slice/list helpers filtered by age.
//! - The auto-clearing bulk age increment.
//!
//! # Invariants
//! - Every method goes through the repository; no SQL here.
//! - `bulk_age_plus` clears the persistence context before returning, so
//!   reads after it observe the updated ages.

use crate::model::member::{Member, MemberField};
use crate::model::view::MemberView;
use crate::query::{Mutation, Page, PageRequest, Predicate, Slice, Sort, Value};
use crate::repo::member_repo::MemberRepository;
use crate::repo::RepoResult;
use log::info;

/// Use-case facade over a member repository.
pub struct MemberService<R: MemberRepository> {
    repo: R,
}

impl<R: MemberRepository> MemberService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Underlying repository, for record-store calls the service does not wrap.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn create_member(&self, username: impl Into<String>, age: i32) -> RepoResult<Member> {
        self.repo.save(&Member::with_age(username, age))
    }

    /// Equality filter on one field; no match is an empty list.
    pub fn find_by_exact_match(
        &self,
        field: MemberField,
        value: impl Into<Value>,
    ) -> RepoResult<Vec<Member>> {
        self.repo
            .find_by(&Predicate::eq(field, value), &Sort::unsorted())
    }

    pub fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        self.find_by_exact_match(MemberField::Username, username)
    }

    /// `username = ? AND age > ?`
    pub fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        age: i32,
    ) -> RepoResult<Vec<Member>> {
        let predicate = Predicate::eq(MemberField::Username, username)
            .and(Predicate::gt(MemberField::Age, age));
        self.repo.find_by(&predicate, &Sort::unsorted())
    }

    /// `username = ? AND age = ?`
    pub fn find_user(&self, username: &str, age: i32) -> RepoResult<Vec<Member>> {
        let predicate = Predicate::eq(MemberField::Username, username)
            .and(Predicate::eq(MemberField::Age, age));
        self.repo.find_by(&predicate, &Sort::unsorted())
    }

    /// `field IN (values) AND extra_field = extra_value`
    pub fn find_by_membership_list<V: Into<Value>>(
        &self,
        field: MemberField,
        values: impl IntoIterator<Item = V>,
        extra_field: MemberField,
        extra_value: impl Into<Value>,
    ) -> RepoResult<Vec<Member>> {
        let predicate =
            Predicate::is_in(field, values).and(Predicate::eq(extra_field, extra_value));
        self.repo.find_by(&predicate, &Sort::unsorted())
    }

    pub fn find_by_names<S: AsRef<str>>(&self, names: &[S], age: i32) -> RepoResult<Vec<Member>> {
        self.find_by_membership_list(
            MemberField::Username,
            names.iter().map(|name| name.as_ref()),
            MemberField::Age,
            age,
        )
    }

    pub fn find_username_list(&self) -> RepoResult<Vec<String>> {
        self.repo.find_usernames()
    }

    /// Views of members that have a team; teamless members are skipped.
    pub fn find_member_views(&self) -> RepoResult<Vec<MemberView>> {
        self.repo.find_member_views()
    }

    /// Every member with its team loaded in the same query.
    pub fn find_member_fetch_join(&self) -> RepoResult<Vec<Member>> {
        self.repo.find_all()
    }

    pub fn find_page_by_age(
        &self,
        age: i32,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Page<Member>> {
        self.repo
            .find_page(&Predicate::eq(MemberField::Age, age), request)
    }

    pub fn find_slice_by_age(
        &self,
        age: i32,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Slice<Member>> {
        self.repo
            .find_slice(&Predicate::eq(MemberField::Age, age), request)
    }

    pub fn find_list_by_age(
        &self,
        age: i32,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Vec<Member>> {
        self.repo
            .find_list(&Predicate::eq(MemberField::Age, age), request)
    }

    /// Adds one year to every member aged `min_age` or older.
    ///
    /// Returns the number of members updated.
    pub fn bulk_age_plus(&self, min_age: i32) -> RepoResult<usize> {
        let affected = self.repo.bulk_update(
            &Predicate::ge(MemberField::Age, min_age),
            &Mutation::increment(MemberField::Age, 1),
        )?;
        self.repo.clear_context();
        info!("event=bulk_age_plus module=service status=ok min_age={min_age} affected={affected}");
        Ok(affected)
    }

    /// Every member, paged and projected for the listing endpoint.
    pub fn list_member_views(
        &self,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Page<MemberView>> {
        let page = self.repo.find_page(&Predicate::All, request)?;
        Ok(page.map(|member| MemberView::from(&member)))
    }
}
