use asset_runtime::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SPRITE: &str = r#"{
    "texture": "hero.png",
    "animations": [{ "name": "idle", "frame_time": 0.1,
                     "frames": [{ "position": [0, 0], "size": [8, 8] }] }]
}"#;

fn setup() -> (ResourceManager, AssetStore<SpriteLoader>, Arc<MemorySource>) {
    let source = Arc::new(MemorySource::new());
    source.insert("hero.json", SPRITE);
    source.insert("broken.json", "{ \"texture\": ");
    let config = RuntimeConfig {
        wait_poll_ms: 1.0,
        ..Default::default()
    };
    let mut manager = ResourceManager::with_source(config, source.clone()).unwrap();
    let store = AssetStore::new(&mut manager, SpriteLoader).unwrap();
    (manager, store, source)
}

fn drain_until_settled(manager: &mut ResourceManager) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while manager.scheduler().outstanding_count() > 0 {
        assert!(Instant::now() < deadline, "loads did not settle");
        manager.drain_completed(Duration::from_millis(8));
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_two_async_creates_share_one_job() {
    let (mut manager, store, source) = setup();

    let first = store.create(&mut manager, "hero.json", false).unwrap();
    let second = store.create(&mut manager, "hero.json", false).unwrap();

    assert!(first.same_resource(&second));
    assert_eq!(store.state(&manager, &first), ResourceState::Creating);
    assert_eq!(store.state(&manager, &second), ResourceState::Creating);
    let job = store.job(&manager, &first);
    assert!(job.is_some());
    assert_eq!(store.job(&manager, &second), job);
    assert_eq!(manager.list_live().len(), 1);
    assert_eq!(manager.list_live()[0].ref_count, 2);

    drain_until_settled(&mut manager);
    assert_eq!(store.state(&manager, &second), ResourceState::Created);
    assert_eq!(source.reads(), 1);

    store.destroy(&mut manager, first).unwrap();
    store.destroy(&mut manager, second).unwrap();
}

#[test]
fn test_immediate_round_trip_decodes_twice() {
    let (mut manager, store, source) = setup();

    let handle = store.create(&mut manager, "hero.json", true).unwrap();
    assert_eq!(store.state(&manager, &handle), ResourceState::Created);
    store.destroy(&mut manager, handle).unwrap();
    assert_eq!(manager.find("sprite", "hero.json"), None);

    let handle = store.create(&mut manager, "hero.json", true).unwrap();
    assert_eq!(source.reads(), 2);
    store.destroy(&mut manager, handle).unwrap();
}

#[test]
fn test_async_success_path() {
    let (mut manager, store, _) = setup();

    let started = Instant::now();
    let handle = store.create(&mut manager, "hero.json", false).unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(store.state(&manager, &handle), ResourceState::Creating);

    drain_until_settled(&mut manager);
    assert_eq!(store.state(&manager, &handle), ResourceState::Created);
    assert_eq!(store.job(&manager, &handle), None);
    let sprite = store.get(&handle).unwrap();
    assert_eq!(sprite.default_animation().unwrap().name, "idle");
    drop(sprite);

    store.destroy(&mut manager, handle).unwrap();
}

#[test]
fn test_async_failure_path() {
    let (mut manager, store, _) = setup();

    let broken = store.create(&mut manager, "broken.json", false).unwrap();
    let missing = store.create(&mut manager, "missing.json", false).unwrap();
    drain_until_settled(&mut manager);

    assert_eq!(store.state(&manager, &broken), ResourceState::AsyncError);
    assert_eq!(store.state(&manager, &missing), ResourceState::AsyncError);
    assert!(store.get(&broken).is_none());
    assert_eq!(manager.stats().async_failures, 2);

    store.destroy(&mut manager, broken).unwrap();
    store.destroy(&mut manager, missing).unwrap();
}

#[test]
fn test_immediate_missing_file() {
    let (mut manager, store, _) = setup();

    assert!(store.create(&mut manager, "missing.file", true).is_none());
    assert_eq!(manager.find("sprite", "missing.file"), None);
    assert!(manager.list_live().is_empty());
}

#[test]
fn test_async_disabled_forces_immediate() {
    let (mut manager, store, _) = setup();
    manager.set_async_loading(false);

    let handle = store.create(&mut manager, "hero.json", false).unwrap();
    assert_eq!(store.state(&manager, &handle), ResourceState::Created);
    assert!(store.create(&mut manager, "missing.json", false).is_none());
    store.destroy(&mut manager, handle).unwrap();
}

#[test]
fn test_key_is_unique_per_type() {
    let (mut manager, store, _) = setup();

    let a = store.create(&mut manager, "hero.json", true).unwrap();
    let b = store.create(&mut manager, "hero.json", false).unwrap();
    let c = store.clone_handle(&mut manager, &b).unwrap();

    let live = manager.list_live();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].ref_count, 3);
    assert!(a.same_resource(&b) && b.same_resource(&c));

    assert_eq!(store.destroy(&mut manager, a).unwrap(), 2);
    assert_eq!(store.destroy(&mut manager, b).unwrap(), 1);
    assert_eq!(store.destroy(&mut manager, c).unwrap(), 0);
    assert!(manager.list_live().is_empty());
    assert!(store.is_empty());
}

#[test]
fn test_stats_track_hits_and_misses() {
    let (mut manager, store, _) = setup();

    let a = store.create(&mut manager, "hero.json", true).unwrap();
    let b = store.create(&mut manager, "hero.json", true).unwrap();
    let stats = manager.stats();
    assert_eq!((stats.hits, stats.misses, stats.created), (1, 1, 1));

    store.destroy(&mut manager, a).unwrap();
    store.destroy(&mut manager, b).unwrap();
    assert_eq!(manager.stats().destroyed, 1);
}

#[test]
fn test_leaks_are_reported() {
    let (mut manager, store, _) = setup();

    let _kept = store.create(&mut manager, "hero.json", true).unwrap();
    assert_eq!(manager.report_leaks(), 1);
    assert_eq!(manager.shutdown(), 1);
}
