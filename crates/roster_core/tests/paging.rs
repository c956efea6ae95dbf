use roster_core::db::open_db_in_memory;
use roster_core::{
    Direction, Member, MemberField, MemberService, PageRequest, QueryError, Sort,
    SqliteMemberRepository,
};
use rusqlite::Connection;
use std::collections::HashSet;

fn seeded_service(conn: &Connection) -> MemberService<SqliteMemberRepository<'_>> {
    let service = MemberService::new(SqliteMemberRepository::try_new(conn).unwrap());
    for index in 1..=5 {
        service.create_member(format!("member{index}"), 10).unwrap();
    }
    service.create_member("other", 20).unwrap();
    service
}

fn usernames(members: &[Member]) -> Vec<&str> {
    members.iter().map(|m| m.username.as_str()).collect()
}

fn by_username_desc(page: i64, size: i64) -> PageRequest<MemberField> {
    PageRequest::of_sorted(page, size, Sort::by(Direction::Desc, MemberField::Username)).unwrap()
}

#[test]
fn first_page_carries_content_and_totals() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn);

    let page = service.find_page_by_age(10, &by_username_desc(0, 3)).unwrap();

    assert_eq!(usernames(page.content()), vec!["member5", "member4", "member3"]);
    assert_eq!(page.number(), 0);
    assert_eq!(page.size(), 3);
    assert_eq!(page.number_of_elements(), 3);
    assert_eq!(page.total_elements(), 5);
    assert_eq!(page.total_pages(), 2);
    assert!(page.is_first());
    assert!(page.has_next());
    assert!(!page.is_last());

    let stats = service.repo().statistics();
    assert_eq!(stats.entity_queries, 1);
    assert_eq!(stats.count_queries, 1);
}

#[test]
fn walking_every_page_returns_each_match_once() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn);

    let mut request = by_username_desc(0, 2);
    let mut seen = Vec::new();
    loop {
        let page = service.find_page_by_age(10, &request).unwrap();
        assert_eq!(page.total_pages(), 3);
        seen.extend(page.content().iter().map(|m| m.id().unwrap()));
        if !page.has_next() {
            assert!(page.is_last());
            break;
        }
        request = request.next();
    }

    let distinct: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(seen.len(), 5);
    assert_eq!(distinct.len(), 5);
}

#[test]
fn page_beyond_the_last_is_empty_with_real_totals() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn);

    let page = service.find_page_by_age(10, &by_username_desc(4, 3)).unwrap();

    assert!(page.content().is_empty());
    assert_eq!(page.total_elements(), 5);
    assert_eq!(page.total_pages(), 2);
    assert!(!page.has_next());
    assert!(page.has_previous());
}

#[test]
fn no_matches_yield_a_single_empty_page() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn);

    let page = service.find_page_by_age(99, &by_username_desc(0, 3)).unwrap();

    assert_eq!(page.total_elements(), 0);
    assert_eq!(page.total_pages(), 0);
    assert!(page.is_first());
    assert!(page.is_last());
    assert!(!page.has_next());
}

#[test]
fn slice_detects_more_data_without_counting() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn);

    let first = service.find_slice_by_age(10, &by_username_desc(0, 3)).unwrap();
    assert_eq!(usernames(first.content()), vec!["member5", "member4", "member3"]);
    assert!(first.has_next());
    assert!(first.is_first());

    let second = service.find_slice_by_age(10, &by_username_desc(1, 3)).unwrap();
    assert_eq!(usernames(second.content()), vec!["member2", "member1"]);
    assert!(!second.has_next());
    assert!(second.has_previous());

    let stats = service.repo().statistics();
    assert_eq!(stats.count_queries, 0);
    assert_eq!(stats.entity_queries, 2);
}

#[test]
fn slice_that_exactly_fills_the_window_has_no_next() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn);

    let slice = service.find_slice_by_age(10, &by_username_desc(0, 5)).unwrap();
    assert_eq!(slice.number_of_elements(), 5);
    assert!(!slice.has_next());
}

#[test]
fn list_returns_the_window_only() {
    let conn = open_db_in_memory().unwrap();
    let service = seeded_service(&conn);

    let list = service.find_list_by_age(10, &by_username_desc(1, 3)).unwrap();
    assert_eq!(usernames(&list), vec!["member2", "member1"]);
    assert_eq!(service.repo().statistics().count_queries, 0);
}

#[test]
fn invalid_page_requests_are_rejected() {
    assert_eq!(
        PageRequest::<MemberField>::of(-1, 3).unwrap_err(),
        QueryError::InvalidPageIndex(-1)
    );
    assert_eq!(
        PageRequest::<MemberField>::of(0, 0).unwrap_err(),
        QueryError::InvalidPageSize(0)
    );
}
