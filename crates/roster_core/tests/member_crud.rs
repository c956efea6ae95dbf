use roster_core::db::open_db_in_memory;
use roster_core::{
    seed_demo_members, Member, MemberRepository, RepoError, SqliteMemberRepository,
};

#[test]
fn save_assigns_id_and_find_by_id_round_trips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let saved = repo.save(&Member::new("memberA")).unwrap();
    let id = saved.id().expect("saved member has an id");

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.id(), Some(id));
    assert_eq!(loaded.username, "memberA");
    assert_eq!(loaded.age, 0);
    assert!(loaded.team().is_none());
    assert_eq!(loaded, saved);
}

#[test]
fn find_by_id_reads_storage_once_context_is_cleared() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let saved = repo.save(&Member::with_age("memberA", 12)).unwrap();
    repo.clear_context();

    let loaded = repo.find_by_id(saved.id().unwrap()).unwrap().unwrap();
    assert_eq!(loaded.username, "memberA");
    assert_eq!(loaded.age, 12);
    assert_eq!(repo.statistics().entity_queries, 1);
}

#[test]
fn basic_crud_counts_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let member1 = repo.save(&Member::new("member1")).unwrap();
    let member2 = repo.save(&Member::new("member2")).unwrap();

    assert_eq!(
        repo.find_by_id(member1.id().unwrap()).unwrap().unwrap().username,
        "member1"
    );
    assert_eq!(repo.find_all().unwrap().len(), 2);
    assert_eq!(repo.count().unwrap(), 2);

    repo.delete(&member1).unwrap();
    repo.delete(&member2).unwrap();
    assert_eq!(repo.count().unwrap(), 0);
    assert!(repo.find_by_id(member1.id().unwrap()).unwrap().is_none());
}

#[test]
fn deleting_missing_or_unsaved_members_is_a_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let kept = repo.save(&Member::new("kept")).unwrap();
    repo.delete(&Member::new("never saved")).unwrap();
    repo.delete_by_id(9_999).unwrap();

    let deleted = repo.save(&Member::new("gone")).unwrap();
    repo.delete(&deleted).unwrap();
    repo.delete(&deleted).unwrap();

    assert_eq!(repo.count().unwrap(), 1);
    assert!(repo.find_by_id(kept.id().unwrap()).unwrap().is_some());
}

#[test]
fn save_updates_existing_member_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let mut member = repo.save(&Member::with_age("draft", 1)).unwrap();
    member.username = "final".to_string();
    member.age = 30;
    repo.save(&member).unwrap();
    repo.clear_context();

    let loaded = repo.find_by_id(member.id().unwrap()).unwrap().unwrap();
    assert_eq!(loaded.username, "final");
    assert_eq!(loaded.age, 30);
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn save_of_deleted_member_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let member = repo.save(&Member::new("temp")).unwrap();
    let id = member.id().unwrap();
    repo.delete_by_id(id).unwrap();

    match repo.save(&member) {
        Err(RepoError::NotFound { entity, id: missing }) => {
            assert_eq!(entity, "member");
            assert_eq!(missing, id);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn seeding_saves_members_aged_by_index() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let seeded = seed_demo_members(&repo, 4).unwrap();

    assert_eq!(repo.count().unwrap(), 4);
    let summary: Vec<(String, i32)> = seeded
        .iter()
        .map(|member| (member.username.clone(), member.age))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("user0".to_string(), 0),
            ("user1".to_string(), 1),
            ("user2".to_string(), 2),
            ("user3".to_string(), 3),
        ]
    );
    assert!(seeded.iter().all(|member| member.id().is_some()));
}
