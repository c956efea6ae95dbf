use roster_core::db::open_db_in_memory;
use roster_core::{
    list_members, MemberRepository, MemberService, PagingConfig, QueryError, RepoError,
    SqliteMemberRepository, SqliteTeamRepository, Team, TeamRepository,
};
use serde_json::json;

#[test]
fn listing_renders_envelope_with_team_names() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let service = MemberService::new(SqliteMemberRepository::try_new(&conn).unwrap());

    let mut team = teams.save(&Team::new("teamA")).unwrap();
    let mut young = service.create_member("young", 5).unwrap();
    service.create_member("old", 50).unwrap();
    service.create_member("middle", 20).unwrap();
    service.repo().assign_team(&mut young, &mut team).unwrap();

    let listing = list_members(&service, "size=2", &PagingConfig::default()).unwrap();
    let body = serde_json::to_value(&listing).unwrap();

    assert_eq!(
        body,
        json!({
            "content": [
                { "id": young.id(), "username": "young", "teamName": "teamA" },
                { "id": 3, "username": "middle", "teamName": "" }
            ],
            "number": 0,
            "size": 2,
            "numberOfElements": 2,
            "totalElements": 3,
            "totalPages": 2,
            "first": true,
            "last": false,
            "hasNext": true,
            "hasPrevious": false
        })
    );
}

#[test]
fn listing_defaults_to_five_by_age() {
    let conn = open_db_in_memory().unwrap();
    let service = MemberService::new(SqliteMemberRepository::try_new(&conn).unwrap());
    for age in [30, 10, 70, 20, 60, 40, 50] {
        service.create_member(format!("age{age}"), age).unwrap();
    }

    let listing = list_members(&service, "", &PagingConfig::default()).unwrap();

    let names: Vec<&str> = listing
        .content
        .iter()
        .map(|view| view.username.as_str())
        .collect();
    assert_eq!(names, vec!["age10", "age20", "age30", "age40", "age50"]);
    assert_eq!(listing.size, 5);
    assert_eq!(listing.total_elements, 7);
    assert!(listing.has_next);
}

#[test]
fn listing_honors_explicit_sort_and_page() {
    let conn = open_db_in_memory().unwrap();
    let service = MemberService::new(SqliteMemberRepository::try_new(&conn).unwrap());
    for name in ["a", "b", "c", "d"] {
        service.create_member(name, 1).unwrap();
    }

    let listing = list_members(
        &service,
        "?page=1&size=3&sort=username,desc",
        &PagingConfig::default(),
    )
    .unwrap();

    let names: Vec<&str> = listing
        .content
        .iter()
        .map(|view| view.username.as_str())
        .collect();
    assert_eq!(names, vec!["a"]);
    assert!(listing.last);
    assert!(listing.has_previous);
}

#[test]
fn listing_rejects_invalid_parameters_before_querying() {
    let conn = open_db_in_memory().unwrap();
    let service = MemberService::new(SqliteMemberRepository::try_new(&conn).unwrap());

    let result = list_members(&service, "size=-3", &PagingConfig::default());
    assert!(matches!(
        result,
        Err(RepoError::InvalidArgument(QueryError::InvalidPageSize(-3)))
    ));
    assert_eq!(service.repo().statistics().entity_queries, 0);

    let result = list_members(&service, "page=99999999999", &PagingConfig::default());
    assert!(matches!(
        result,
        Err(RepoError::InvalidArgument(QueryError::PageIndexTooLarge {
            page: 99_999_999_999,
            ..
        }))
    ));
    assert_eq!(service.repo().count().unwrap(), 0);
}
