mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use common::{FakeHub, FakeLinkRepo, FakeUserRepo, hub_entity, owner_hub};
use hubshare::application::ports::link_repository::{AccessOutcome, LinkRepository};
use hubshare::application::use_cases::links::create_link::{
    CreateLink, CreateLinkInput, CreateOutcome,
};
use hubshare::application::use_cases::links::resolve_link::{ResolveLink, ResolveOutcome};
use hubshare::application::use_cases::links::trigger_entity::{TriggerEntity, TriggerOutcome};
use hubshare::application::use_cases::links::update_link::{
    UpdateLink, UpdateLinkInput, UpdateOutcome,
};
use hubshare::domain::links::{AccessMode, LinkDenied, LinkKind, ShareLink, generate_link_id};

fn make_link(owner_id: Uuid, kind: LinkKind, access_mode: AccessMode) -> ShareLink {
    ShareLink {
        id: generate_link_id(),
        owner_id,
        entity_ids: vec!["light.kitchen".into()],
        kind,
        access_mode,
        access_count: 0,
        max_access: None,
        expires_at: None,
        active: true,
        password_hash: None,
        created_at: Utc::now(),
    }
}

struct World {
    links: FakeLinkRepo,
    users: FakeUserRepo,
    hub: FakeHub,
}

impl World {
    fn new(link: ShareLink) -> Self {
        let owner_id = link.owner_id;
        World {
            links: FakeLinkRepo::with(link),
            users: FakeUserRepo::with_hub_user(owner_id, owner_hub()),
            hub: FakeHub::with_states(vec![
                hub_entity("light.kitchen", "on"),
                hub_entity("sensor.porch", "21.5"),
            ]),
        }
    }

    fn resolver(&self) -> ResolveLink<'_> {
        ResolveLink {
            links: &self.links,
            users: &self.users,
            hub: &self.hub,
        }
    }

    fn trigger(&self) -> TriggerEntity<'_> {
        TriggerEntity {
            links: &self.links,
            users: &self.users,
            hub: &self.hub,
        }
    }
}

#[tokio::test]
async fn counter_link_with_max_one_serves_exactly_once() {
    let mut link = make_link(Uuid::new_v4(), LinkKind::Counter, AccessMode::ReadOnly);
    link.max_access = Some(1);
    let id = link.id.clone();
    let world = World::new(link);

    match world.resolver().execute(&id, None, Utc::now()).await.unwrap() {
        ResolveOutcome::Granted { entities, .. } => {
            assert_eq!(entities.len(), 1);
            assert_eq!(entities[0].entity_id, "light.kitchen");
            assert_eq!(entities[0].state, "on");
        }
        other => panic!("first resolve should grant, got {other:?}"),
    }

    match world.resolver().execute(&id, None, Utc::now()).await.unwrap() {
        ResolveOutcome::Denied(LinkDenied::Exhausted) => {}
        other => panic!("second resolve should be exhausted, got {other:?}"),
    }

    let stored = world.links.snapshot(&id).unwrap();
    assert!(!stored.active);
    assert_eq!(stored.access_count, 1);

    // once inactive, every further attempt is denied as inactive
    match world.resolver().execute(&id, None, Utc::now()).await.unwrap() {
        ResolveOutcome::Denied(LinkDenied::Inactive) => {}
        other => panic!("third resolve should be inactive, got {other:?}"),
    }
}

#[tokio::test]
async fn expired_time_link_denies_without_counting_and_flips_permanently() {
    let mut link = make_link(Uuid::new_v4(), LinkKind::Time, AccessMode::ReadOnly);
    link.expires_at = Some(Utc::now() - Duration::hours(1));
    let id = link.id.clone();
    let world = World::new(link);

    match world.resolver().execute(&id, None, Utc::now()).await.unwrap() {
        ResolveOutcome::Denied(LinkDenied::Expired) => {}
        other => panic!("expected expired, got {other:?}"),
    }
    let stored = world.links.snapshot(&id).unwrap();
    assert_eq!(stored.access_count, 0);
    assert!(!stored.active);

    match world.resolver().execute(&id, None, Utc::now()).await.unwrap() {
        ResolveOutcome::Denied(LinkDenied::Inactive) => {}
        other => panic!("expected inactive after flip, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_link_is_not_found() {
    let world = World::new(make_link(
        Uuid::new_v4(),
        LinkKind::Permanent,
        AccessMode::ReadOnly,
    ));
    match world
        .resolver()
        .execute("deadbeefdeadbeefdeadbeefdeadbeef", None, Utc::now())
        .await
        .unwrap()
    {
        ResolveOutcome::Denied(LinkDenied::NotFound) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_entity_fetches_are_omitted_not_fatal() {
    let mut link = make_link(Uuid::new_v4(), LinkKind::Permanent, AccessMode::ReadOnly);
    link.entity_ids = vec!["light.kitchen".into(), "light.gone".into()];
    let id = link.id.clone();
    let world = World::new(link);

    match world.resolver().execute(&id, None, Utc::now()).await.unwrap() {
        ResolveOutcome::Granted {
            entity_ids,
            entities,
            ..
        } => {
            assert_eq!(entity_ids.len(), 2);
            assert_eq!(entities.len(), 1, "the unknown entity is silently omitted");
            assert_eq!(entities[0].entity_id, "light.kitchen");
        }
        other => panic!("expected grant, got {other:?}"),
    }
    // the increment stands despite the partial failure
    assert_eq!(world.links.snapshot(&id).unwrap().access_count, 1);
}

#[tokio::test]
async fn password_protected_link_rejects_bad_and_missing_passwords() {
    let owner_id = Uuid::new_v4();
    let links = FakeLinkRepo::default();
    let uc = CreateLink { repo: &links };
    let created = match uc
        .execute(
            owner_id,
            CreateLinkInput {
                entity_ids: vec!["light.kitchen".into()],
                kind: LinkKind::Permanent,
                access_mode: AccessMode::ReadOnly,
                max_access: None,
                expires_at: None,
                password: Some("hunter2".into()),
            },
        )
        .await
        .unwrap()
    {
        CreateOutcome::Created(l) => l,
        other => panic!("expected creation, got {other:?}"),
    };

    let users = FakeUserRepo::with_hub_user(owner_id, owner_hub());
    let hub = FakeHub::with_states(vec![hub_entity("light.kitchen", "on")]);
    let resolver = ResolveLink {
        links: &links,
        users: &users,
        hub: &hub,
    };

    match resolver
        .execute(&created.id, Some("wrong"), Utc::now())
        .await
        .unwrap()
    {
        ResolveOutcome::Denied(LinkDenied::BadPassword) => {}
        other => panic!("expected bad password, got {other:?}"),
    }
    match resolver.execute(&created.id, None, Utc::now()).await.unwrap() {
        ResolveOutcome::Denied(LinkDenied::BadPassword) => {}
        other => panic!("expected bad password, got {other:?}"),
    }
    // denied attempts never count
    assert_eq!(links.snapshot(&created.id).unwrap().access_count, 0);

    match resolver
        .execute(&created.id, Some("hunter2"), Utc::now())
        .await
        .unwrap()
    {
        ResolveOutcome::Granted { .. } => {}
        other => panic!("expected grant with password, got {other:?}"),
    }
    assert_eq!(links.snapshot(&created.id).unwrap().access_count, 1);
}

#[tokio::test]
async fn triggerable_link_dispatches_with_owner_credentials() {
    let link = make_link(Uuid::new_v4(), LinkKind::Permanent, AccessMode::Triggerable);
    let id = link.id.clone();
    let world = World::new(link);

    match world
        .trigger()
        .execute(
            &id,
            "light.kitchen",
            "turn_on",
            Some(serde_json::json!({ "brightness": 128 })),
            None,
            Utc::now(),
        )
        .await
        .unwrap()
    {
        TriggerOutcome::Dispatched => {}
        other => panic!("expected dispatch, got {other:?}"),
    }

    let calls = world.hub.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    // the owner's credentials, never the caller's
    assert_eq!(calls[0].hub, owner_hub());
    assert_eq!(calls[0].domain, "light");
    assert_eq!(calls[0].action, "turn_on");
    assert_eq!(calls[0].data["entity_id"], "light.kitchen");
    assert_eq!(calls[0].data["brightness"], 128);

    // triggers never count against the access counter
    assert_eq!(world.links.snapshot(&id).unwrap().access_count, 0);
}

#[tokio::test]
async fn readonly_link_rejects_triggers() {
    let link = make_link(Uuid::new_v4(), LinkKind::Permanent, AccessMode::ReadOnly);
    let id = link.id.clone();
    let world = World::new(link);

    match world
        .trigger()
        .execute(&id, "light.kitchen", "turn_on", None, None, Utc::now())
        .await
        .unwrap()
    {
        TriggerOutcome::Denied(LinkDenied::ReadOnly) => {}
        other => panic!("expected readonly denial, got {other:?}"),
    }
    assert!(world.hub.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn trigger_rejects_targets_outside_the_entity_set() {
    let link = make_link(Uuid::new_v4(), LinkKind::Permanent, AccessMode::Triggerable);
    let id = link.id.clone();
    let world = World::new(link);

    match world
        .trigger()
        .execute(&id, "lock.front_door", "unlock", None, None, Utc::now())
        .await
        .unwrap()
    {
        TriggerOutcome::Denied(LinkDenied::NotShared) => {}
        other => panic!("expected not-shared denial, got {other:?}"),
    }
    assert!(world.hub.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_validates_shape_per_kind() {
    let links = FakeLinkRepo::default();
    let uc = CreateLink { repo: &links };
    let owner = Uuid::new_v4();

    let base = CreateLinkInput {
        entity_ids: vec!["light.kitchen".into()],
        kind: LinkKind::Permanent,
        access_mode: AccessMode::ReadOnly,
        max_access: None,
        expires_at: None,
        password: None,
    };

    let empty = CreateLinkInput {
        entity_ids: vec![],
        ..base.clone()
    };
    assert!(matches!(
        uc.execute(owner, empty).await.unwrap(),
        CreateOutcome::Invalid(_)
    ));

    let counter_without_bound = CreateLinkInput {
        kind: LinkKind::Counter,
        ..base.clone()
    };
    assert!(matches!(
        uc.execute(owner, counter_without_bound).await.unwrap(),
        CreateOutcome::Invalid(_)
    ));

    let time_without_deadline = CreateLinkInput {
        kind: LinkKind::Time,
        ..base.clone()
    };
    assert!(matches!(
        uc.execute(owner, time_without_deadline).await.unwrap(),
        CreateOutcome::Invalid(_)
    ));

    let ok = uc.execute(owner, base).await.unwrap();
    match ok {
        CreateOutcome::Created(l) => {
            assert!(l.active);
            assert_eq!(l.access_count, 0);
            assert_eq!(l.id.len(), 32);
        }
        other => panic!("expected creation, got {other:?}"),
    }
}

#[tokio::test]
async fn update_cannot_resurrect_an_inactive_link() {
    let mut link = make_link(Uuid::new_v4(), LinkKind::Counter, AccessMode::ReadOnly);
    link.max_access = Some(1);
    link.access_count = 1;
    link.active = false;
    let owner = link.owner_id;
    let id = link.id.clone();
    let links = FakeLinkRepo::with(link);

    let uc = UpdateLink { repo: &links };
    let input = UpdateLinkInput {
        max_access: Some(100),
        ..Default::default()
    };
    match uc.execute(owner, &id, input).await.unwrap() {
        UpdateOutcome::Inactive => {}
        other => panic!("expected inactive rejection, got {other:?}"),
    }
    let stored = links.snapshot(&id).unwrap();
    assert!(!stored.active);
    assert_eq!(stored.max_access, Some(1));
}

#[tokio::test]
async fn update_replaces_settings_but_never_the_counter() {
    let mut link = make_link(Uuid::new_v4(), LinkKind::Permanent, AccessMode::ReadOnly);
    link.access_count = 7;
    let owner = link.owner_id;
    let id = link.id.clone();
    let links = FakeLinkRepo::with(link);

    let uc = UpdateLink { repo: &links };
    let input = UpdateLinkInput {
        entity_ids: Some(vec!["light.kitchen".into(), "sensor.porch".into()]),
        kind: Some(LinkKind::Counter),
        access_mode: Some(AccessMode::Triggerable),
        max_access: Some(10),
        ..Default::default()
    };
    match uc.execute(owner, &id, input).await.unwrap() {
        UpdateOutcome::Updated(l) => {
            assert_eq!(l.kind, LinkKind::Counter);
            assert_eq!(l.access_mode, AccessMode::Triggerable);
            assert_eq!(l.max_access, Some(10));
            assert_eq!(l.access_count, 7, "update never resets the counter");
        }
        other => panic!("expected update, got {other:?}"),
    }

    // switching kind without the matching bound is rejected
    let bad = UpdateLinkInput {
        kind: Some(LinkKind::Time),
        ..Default::default()
    };
    assert!(matches!(
        uc.execute(owner, &id, bad).await.unwrap(),
        UpdateOutcome::Invalid(_)
    ));
}

#[tokio::test]
async fn concurrent_resolutions_never_exceed_the_bound() {
    let mut link = make_link(Uuid::new_v4(), LinkKind::Counter, AccessMode::ReadOnly);
    link.max_access = Some(5);
    let id = link.id.clone();
    let links = Arc::new(FakeLinkRepo::with(link));

    let mut handles = Vec::new();
    for _ in 0..32 {
        let links = links.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            links.begin_access(&id, None, Utc::now()).await.unwrap()
        }));
    }

    let mut grants = 0;
    for h in handles {
        if let AccessOutcome::Granted(_) = h.await.unwrap() {
            grants += 1;
        }
    }
    assert_eq!(grants, 5);
    let stored = links.snapshot(&id).unwrap();
    assert_eq!(stored.access_count, 5);
    assert!(!stored.active);
}
