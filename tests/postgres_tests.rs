mod common;

use chrono::{Duration, Utc};

use wasabi::db::Gateway;
use wasabi::error::ErrorKind;
use wasabi::models::{CreateUser, NewHistory, UpdateUser, UserFilter};
use wasabi::retention::Purger;
use wasabi::service::UserService;

fn create_req(username: &str, role: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        password: "password123".to_string(),
        role: role.to_string(),
    }
}

fn history(process_id: i64, hours_ago: i64) -> NewHistory {
    NewHistory {
        process_id,
        sender: "agent".to_string(),
        receiver: "customer".to_string(),
        content: format!("sent {hours_ago}h ago"),
        role_as: "assistant".to_string(),
        created_at: Some(Utc::now() - Duration::hours(hours_ago)),
    }
}

// ── Users ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_lookup_user() {
    let Some(db) = common::spawn_db().await else { return };
    let users = UserService::new(db.gateway.clone());

    let user = users.create(&create_req("alice", "admin")).await.unwrap();
    assert!(!user.is_active);
    assert_ne!(user.password, "password123");
    assert!(wasabi::password::matches("password123", &user.password));

    let by_id = users.find_by_id(user.id).await.unwrap();
    let by_name = users.find_by_username("alice").await.unwrap();
    assert_eq!(by_id, by_name);
    assert_eq!(by_id.role, "admin");

    common::cleanup(db).await;
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let Some(db) = common::spawn_db().await else { return };
    let users = UserService::new(db.gateway.clone());

    let first = users.create(&create_req("alice", "admin")).await.unwrap();
    let err = users.create(&create_req("alice", "member")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let kept = users.find_by_id(first.id).await.unwrap();
    assert_eq!(kept.role, "admin");

    common::cleanup(db).await;
}

#[tokio::test]
async fn update_writes_zero_valued_fields() {
    let Some(db) = common::spawn_db().await else { return };
    let users = UserService::new(db.gateway.clone());

    let user = users.create(&create_req("alice", "admin")).await.unwrap();
    users
        .update(&UpdateUser {
            id: user.id,
            username: "alice".to_string(),
            is_active: true,
            role: "admin".to_string(),
        })
        .await
        .unwrap();

    let updated = users
        .update(&UpdateUser {
            id: user.id,
            username: "a".to_string(),
            is_active: false,
            role: String::new(),
        })
        .await
        .unwrap();
    assert!(!updated.is_active);
    assert_eq!(updated.password, user.password);

    let dto = users.find_by_id(user.id).await.unwrap();
    assert_eq!(dto.username, "a");
    assert_eq!(dto.role, "");

    common::cleanup(db).await;
}

#[tokio::test]
async fn update_to_taken_username_is_conflict() {
    let Some(db) = common::spawn_db().await else { return };
    let users = UserService::new(db.gateway.clone());

    users.create(&create_req("alice", "admin")).await.unwrap();
    let bob = users.create(&create_req("bob", "member")).await.unwrap();

    let err = users
        .update(&UpdateUser {
            id: bob.id,
            username: "alice".to_string(),
            is_active: true,
            role: "admin".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let kept = users.find_by_id(bob.id).await.unwrap();
    assert_eq!(kept.username, "bob");
    assert_eq!(kept.role, "member");

    common::cleanup(db).await;
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let Some(db) = common::spawn_db().await else { return };
    let users = UserService::new(db.gateway.clone());

    assert_eq!(users.find_by_id(12345).await.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(
        users.find_by_username("nobody").await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    let err = users
        .update(&UpdateUser {
            id: 12345,
            username: "ghost".to_string(),
            is_active: false,
            role: String::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    common::cleanup(db).await;
}

#[tokio::test]
async fn find_combines_filters() {
    let Some(db) = common::spawn_db().await else { return };
    let users = UserService::new(db.gateway.clone());

    let alice = users.create(&create_req("alice", "admin")).await.unwrap();
    users.create(&create_req("bob", "member")).await.unwrap();
    users.create(&create_req("carol", "admin")).await.unwrap();

    let all = users.find(&UserFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let mut admins: Vec<String> = users
        .find(&UserFilter { role: Some("admin".into()), ..Default::default() })
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    admins.sort();
    assert_eq!(admins, vec!["alice", "carol"]);

    let exact = users
        .find(&UserFilter {
            user_id: Some(alice.id),
            username: Some("alice".into()),
            role: Some("admin".into()),
        })
        .await
        .unwrap();
    assert_eq!(exact.len(), 1);

    let nobody = users
        .find(&UserFilter { username: Some("dave".into()), ..Default::default() })
        .await
        .unwrap();
    assert!(nobody.is_empty());

    common::cleanup(db).await;
}

// ── Retention ───────────────────────────────────────────────────

#[tokio::test]
async fn purge_removes_rows_older_than_threshold() {
    let Some(db) = common::spawn_db().await else { return };
    let process = db.gateway.insert_process("support").await.unwrap();
    db.gateway.insert_history(&history(process, 48)).await.unwrap();
    db.gateway.insert_history(&history(process, 1)).await.unwrap();

    let purger = Purger::new(db.gateway.clone());
    assert_eq!(purger.purge_older_than(24).await.unwrap(), 1);
    assert_eq!(purger.purge_older_than(24).await.unwrap(), 0);

    let left = db.gateway.find_histories(process).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].content, "sent 1h ago");

    common::cleanup(db).await;
}

#[tokio::test]
async fn purge_with_age_beyond_timestamp_range_removes_nothing() {
    let Some(db) = common::spawn_db().await else { return };
    let process = db.gateway.insert_process("support").await.unwrap();
    db.gateway.insert_history(&history(process, 48)).await.unwrap();

    let purger = Purger::new(db.gateway.clone());
    for hours in [50_000_000, 100_000_000, i32::MAX as u32, u32::MAX] {
        assert_eq!(purger.purge_older_than(hours).await.unwrap(), 0, "age {hours}h");
    }
    assert_eq!(db.gateway.find_histories(process).await.unwrap().len(), 1);

    common::cleanup(db).await;
}

#[tokio::test]
async fn history_defaults_created_at_to_now() {
    let Some(db) = common::spawn_db().await else { return };
    let process = db.gateway.insert_process("support").await.unwrap();

    let mut fresh = history(process, 0);
    fresh.created_at = None;
    let row = db.gateway.insert_history(&fresh).await.unwrap();
    assert!(row.created_at > Utc::now() - Duration::minutes(5));

    let purger = Purger::new(db.gateway.clone());
    assert_eq!(purger.purge_older_than(1).await.unwrap(), 0);

    common::cleanup(db).await;
}
