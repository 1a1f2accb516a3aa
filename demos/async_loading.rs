//! Example: loading a sprite in the background
//!
//! Writes a sprite descriptor to a temporary data directory, requests it
//! asynchronously twice (the second request shares the first), and pumps
//! frames until the load has finished.

use asset_runtime::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const SPRITE: &str = r#"{
    "texture": "hero.png",
    "default_animation": "walk",
    "animations": [
        { "name": "idle", "frame_time": 0.25,
          "frames": [{ "position": [0, 0], "size": [16, 16] }] },
        { "name": "walk", "frame_time": 0.1,
          "frames": [{ "position": [16, 0], "size": [16, 16] },
                     { "position": [32, 0], "size": [16, 16] }] }
    ]
}"#;

fn main() -> asset_runtime::Result<()> {
    let data_dir = std::env::temp_dir().join("asset_runtime_demo");
    std::fs::create_dir_all(&data_dir)?;
    std::fs::write(data_dir.join("hero.json"), SPRITE)?;

    let config = RuntimeConfig {
        root_data_dirs: vec![data_dir],
        ..Default::default()
    };
    let mut runtime = AssetRuntime::new(
        config,
        Arc::new(RawImageDecoder),
        Arc::new(PcmDecoder::default()),
    )?;

    let hero = runtime
        .sprites
        .create(&mut runtime.manager, "hero.json", false)
        .ok_or_else(|| AssetError::NotFound("hero.json".to_string()))?;
    let hero_again = runtime
        .sprites
        .create(&mut runtime.manager, "hero.json", false)
        .ok_or_else(|| AssetError::NotFound("hero.json".to_string()))?;
    println!("Shared placeholder: {}", hero.same_resource(&hero_again));

    while runtime.sprites.state(&runtime.manager, &hero) == ResourceState::Creating {
        let finalized = runtime.update();
        println!(
            "Frame {}: finalized {finalized} loads",
            runtime.frame.frame_count()
        );
        std::thread::sleep(Duration::from_millis(16));
    }

    match runtime.sprites.get(&hero) {
        Some(sprite) => {
            let walk = sprite.default_animation().map(|a| a.frames.len());
            println!("Loaded sprite using {} ({walk:?} walk frames)", sprite.texture);
        }
        None => println!("Sprite failed to load"),
    }

    for resource in runtime.manager.list_live() {
        println!("Live: {resource}");
    }

    runtime.sprites.destroy(&mut runtime.manager, hero)?;
    runtime.sprites.destroy(&mut runtime.manager, hero_again)?;
    println!("Leaked resources: {}", runtime.shutdown());
    Ok(())
}
