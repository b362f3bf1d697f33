use std::collections::HashMap;
use std::sync::Arc;

use rbxlink_core::{
    BindingError, BindingService, BindingSummary, ConflictKind, RegisterOutcome,
    SessionContext, UnregisterOutcome, UserRecord, UserRole, UserStore,
    infra::{JsonFileUserStore, MemorySession, MemorySink, MemoryUserStore},
};

/// Service wired to in-memory adapters.
struct Harness {
    store: Arc<MemoryUserStore>,
    sink: Arc<MemorySink>,
    service: BindingService,
}

impl Harness {
    fn new(users: impl IntoIterator<Item = UserRecord>) -> Self {
        let store = Arc::new(MemoryUserStore::with_users(users));
        let sink = Arc::new(MemorySink::new());
        let service = BindingService::new(store.clone(), sink.clone());
        Self {
            store,
            sink,
            service,
        }
    }

    async fn binding_of(&self, user: &UserRecord) -> Option<String> {
        self.store
            .get(&user.id)
            .await
            .and_then(|record| record.binding().map(str::to_string))
    }
}

fn user(name: &str) -> UserRecord {
    UserRecord::new(name, format!("{name}@example.com"), UserRole::User)
}

fn admin(name: &str) -> UserRecord {
    UserRecord::new(name, format!("{name}@example.com"), UserRole::Admin)
}

fn bound(mut record: UserRecord, value: &str) -> UserRecord {
    record.roblox_username = Some(value.to_string());
    record
}

fn assert_unique(users: &[UserRecord]) {
    let mut seen = HashMap::new();
    for user in users {
        if let Some(value) = user.binding() {
            let previous = seen.insert(value.to_string(), user.id.clone());
            assert!(previous.is_none(), "{value} bound to more than one account");
        }
    }
}

#[tokio::test]
async fn register_binds_trimmed_value_and_refreshes_session() {
    let mina = user("mina");
    let harness = Harness::new([mina.clone()]);
    let session = MemorySession::signed_in(mina.clone());

    let outcome = harness
        .service
        .register(&session, "  BuilderMan  ")
        .await
        .unwrap();

    let RegisterOutcome::Registered(record) = outcome else {
        panic!("expected registration");
    };
    assert_eq!(record.binding(), Some("BuilderMan"));
    assert!(record.roblox_registered_at.is_some());
    assert_eq!(harness.binding_of(&mina).await.as_deref(), Some("BuilderMan"));
    assert_eq!(session.current(), Some(record));

    let sent = harness.sink.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].field("User"), Some("mina"));
    assert_eq!(sent[0].field("Roblox account"), Some("BuilderMan"));
}

#[tokio::test]
async fn register_rejects_malformed_values() {
    let mina = user("mina");
    let harness = Harness::new([mina.clone()]);
    let session = MemorySession::signed_in(mina.clone());

    let err = harness.service.register(&session, "   ").await.unwrap_err();
    assert_eq!(err.code(), "empty");

    let err = harness.service.register(&session, "ab").await.unwrap_err();
    assert_eq!(err.code(), "length");

    let err = harness
        .service
        .register(&session, &"x".repeat(21))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "length");

    assert_eq!(harness.binding_of(&mina).await, None);
    assert!(harness.sink.is_empty());
}

#[tokio::test]
async fn register_accepts_boundary_lengths() {
    let short = user("short");
    let long = user("long");
    let harness = Harness::new([short.clone(), long.clone()]);

    let outcome = harness
        .service
        .register(&MemorySession::signed_in(short), "abc")
        .await
        .unwrap();
    assert!(outcome.is_registered());

    let outcome = harness
        .service
        .register(&MemorySession::signed_in(long), &"z".repeat(20))
        .await
        .unwrap();
    assert!(outcome.is_registered());
}

#[tokio::test]
async fn register_of_taken_value_conflicts_without_writing() {
    let holder = bound(user("first"), "alpha");
    let claimant = user("second");
    let harness = Harness::new([holder.clone(), claimant.clone()]);
    let before = harness.store.list().await.unwrap();

    let err = harness
        .service
        .register(&MemorySession::signed_in(claimant), "alpha")
        .await
        .unwrap_err();

    assert!(matches!(err, BindingError::Conflict(ConflictKind::Taken)));
    assert_eq!(err.code(), "taken");
    assert_eq!(harness.store.list().await.unwrap(), before);
    assert!(harness.sink.is_empty());
}

#[tokio::test]
async fn short_value_fails_validation_before_anything_else() {
    let claimant = user("second");
    let harness = Harness::new([claimant.clone()]);

    let err = harness
        .service
        .register(&MemorySession::signed_in(claimant), "ab")
        .await
        .unwrap_err();

    assert!(matches!(err, BindingError::Validation(_)));
}

#[tokio::test]
async fn released_value_is_reusable() {
    let a = user("a");
    let b = user("b");
    let harness = Harness::new([a.clone(), b.clone()]);
    let session_a = MemorySession::signed_in(a.clone());
    let session_b = MemorySession::signed_in(b.clone());

    harness.service.register(&session_a, "foo").await.unwrap();
    let outcome = harness.service.unregister(&session_a, a.id).await.unwrap();
    assert_eq!(outcome.released(), Some("foo"));
    assert!(!session_a.current().unwrap().is_bound());
    assert!(session_a.current().unwrap().roblox_unregistered_at.is_some());

    let outcome = harness.service.register(&session_b, "foo").await.unwrap();
    assert!(outcome.is_registered());
    assert_eq!(harness.binding_of(&b).await.as_deref(), Some("foo"));

    // The previous holder could equally have taken it back.
    harness.service.unregister(&session_b, b.id).await.unwrap();
    let outcome = harness.service.register(&session_a, "foo").await.unwrap();
    assert!(outcome.is_registered());
}

#[tokio::test]
async fn unregister_of_unbound_target_is_a_silent_no_op() {
    let mina = user("mina");
    let harness = Harness::new([mina.clone()]);
    let session = MemorySession::signed_in(mina.clone());
    let before = harness.store.list().await.unwrap();

    let outcome = harness.service.unregister(&session, mina.id).await.unwrap();

    assert!(matches!(outcome, UnregisterOutcome::AlreadyUnbound(_)));
    assert_eq!(harness.store.list().await.unwrap(), before);
    assert!(harness.sink.is_empty());
}

#[tokio::test]
async fn unregister_of_unknown_account_is_not_found() {
    let root = admin("root_admin");
    let harness = Harness::new([root.clone()]);
    let ghost = user("ghost");

    let err = harness
        .service
        .unregister(&MemorySession::signed_in(root), ghost.id)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn admin_release_clears_target_and_leaves_admin_session_alone() {
    let root = admin("root_admin");
    let target = bound(user("jun"), "beta");
    let harness = Harness::new([root.clone(), target.clone()]);
    let admin_session = MemorySession::signed_in(root.clone());

    let outcome = harness
        .service
        .unregister(&admin_session, target.id.clone())
        .await
        .unwrap();

    assert_eq!(outcome.released(), Some("beta"));
    assert_eq!(harness.binding_of(&target).await, None);
    assert_eq!(admin_session.current(), Some(root));

    let sent = harness.sink.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].field("Target user"), Some("jun"));
    assert_eq!(sent[0].field("Released account"), Some("beta"));
    assert_eq!(sent[0].field("Released by"), Some("root_admin"));
}

#[tokio::test]
async fn self_release_is_announced_differently_from_admin_release() {
    let mina = bound(user("mina"), "alpha");
    let harness = Harness::new([mina.clone()]);
    let session = MemorySession::signed_in(mina.clone());

    harness.service.unregister(&session, mina.id).await.unwrap();

    let sent = harness.sink.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].field("User"), Some("mina"));
    assert_eq!(sent[0].field("Released account"), Some("alpha"));
    assert_eq!(sent[0].field("Released by"), None);
}

#[tokio::test]
async fn visibility_depends_on_role() {
    let a = bound(user("a"), "zeta");
    let c = bound(user("c"), "eta");
    let idle = user("idle");
    let m = admin("m");
    let harness = Harness::new([a.clone(), idle.clone(), m.clone(), c.clone()]);

    let visible = harness
        .service
        .list_visible(&MemorySession::signed_in(a.clone()))
        .await
        .unwrap();
    assert_eq!(visible, vec![a.clone()]);

    let visible = harness
        .service
        .list_visible(&MemorySession::signed_in(idle.clone()))
        .await
        .unwrap();
    assert!(visible.is_empty());

    let visible = harness
        .service
        .list_visible(&MemorySession::signed_in(m))
        .await
        .unwrap();
    let ids: Vec<_> = visible.iter().map(|user| user.id.clone()).collect();
    assert_eq!(ids, vec![a.id, c.id]);

    let rows: Vec<_> = visible
        .iter()
        .filter_map(BindingSummary::from_record)
        .map(|row| row.roblox_username)
        .collect();
    assert_eq!(rows, ["zeta", "eta"]);
}

#[tokio::test]
async fn describe_projects_account_details() {
    let root = admin("root_admin");
    let mut target = bound(user("jun"), "beta");
    target.scripts_executed = 7;
    let harness = Harness::new([root.clone(), target.clone()]);

    let detail = harness
        .service
        .describe(&MemorySession::signed_in(root.clone()), target.id)
        .await
        .unwrap();

    assert_eq!(detail.username, "jun");
    assert_eq!(detail.email, "jun@example.com");
    assert_eq!(detail.roblox_username.as_deref(), Some("beta"));
    assert_eq!(detail.scripts_executed, 7);
    assert_eq!(detail.join_date, target.join_date);

    let err = harness
        .service
        .describe(&MemorySession::signed_in(root), user("ghost").id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn rebind_goes_through_confirmation_then_retry() {
    let mina = user("mina");
    let harness = Harness::new([mina.clone()]);
    let session = MemorySession::signed_in(mina.clone());

    harness.service.register(&session, "alpha").await.unwrap();

    let RegisterOutcome::AlreadyBound(confirmation) =
        harness.service.register(&session, "bravo").await.unwrap()
    else {
        panic!("expected confirmation request");
    };
    assert_eq!(confirmation.roblox_username(), "alpha");
    assert_eq!(harness.binding_of(&mina).await.as_deref(), Some("alpha"));

    harness
        .service
        .confirm_and_unregister(&session, confirmation)
        .await
        .unwrap();
    let outcome = harness.service.register(&session, "bravo").await.unwrap();

    assert!(outcome.is_registered());
    assert_eq!(harness.binding_of(&mina).await.as_deref(), Some("bravo"));
    assert_eq!(session.current().unwrap().binding(), Some("bravo"));
    // register, release, register
    assert_eq!(harness.sink.len(), 3);
}

#[tokio::test]
async fn concurrent_registrations_leave_one_winner() {
    let contenders: Vec<_> = (0..8).map(|i| user(&format!("player{i}"))).collect();
    let harness = Arc::new(Harness::new(contenders.clone()));

    let tasks: Vec<_> = contenders
        .into_iter()
        .map(|contender| {
            let harness = harness.clone();
            tokio::spawn(async move {
                let session = MemorySession::signed_in(contender);
                harness.service.register(&session, "shared").await
            })
        })
        .collect();

    let mut winners = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(outcome) if outcome.is_registered() => winners += 1,
            Ok(_) => panic!("no contender was bound yet"),
            Err(err) => assert!(matches!(err, BindingError::Conflict(ConflictKind::Taken))),
        }
    }

    assert_eq!(winners, 1);
    assert_unique(&harness.store.list().await.unwrap());
    assert_eq!(harness.sink.len(), 1);
}

#[tokio::test]
async fn lifecycle_against_json_document_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");

    let mina = user("mina");
    let root = admin("root_admin");
    let store = Arc::new(JsonFileUserStore::new(&path));
    store.insert(mina.clone()).await.unwrap();
    store.insert(root.clone()).await.unwrap();

    let sink = Arc::new(MemorySink::new());
    let service = BindingService::new(store.clone(), sink.clone());
    let mina_session = MemorySession::signed_in(mina.clone());

    service.register(&mina_session, "alpha").await.unwrap();
    service
        .unregister(&MemorySession::signed_in(root), mina.id.clone())
        .await
        .unwrap();

    let reopened = JsonFileUserStore::new(&path).list().await.unwrap();
    let stored = reopened.iter().find(|user| user.id == mina.id).unwrap();
    assert!(!stored.is_bound());
    assert!(stored.roblox_registered_at.is_some());
    assert!(stored.roblox_unregistered_at.is_some());
    assert_eq!(sink.len(), 2);
}
