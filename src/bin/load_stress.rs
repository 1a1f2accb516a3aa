#![allow(dead_code, unused_imports)]

use asset_runtime::prelude::*;
use std::sync::Arc;
use std::{fs::File, time::Duration, time::Instant};

#[cfg(feature = "profiling")]
use tracing_subscriber::{self, prelude::*};

const SPRITE: &str = r#"{
    "texture": "sheet.png",
    "animations": [{ "name": "idle", "frame_time": 0.1,
                     "frames": [{ "position": [0, 0], "size": [32, 32] }] }]
}"#;

fn make_source(count: usize) -> Arc<MemorySource> {
    let source = Arc::new(MemorySource::new());
    for i in 0..count {
        source.insert(format!("sprite_{i}.json"), SPRITE);
    }
    source
}

#[cfg(feature = "profiling")]
#[tracing::instrument(skip(runtime))]
fn stress_loads(runtime: &mut AssetRuntime, count: usize) -> usize {
    let _span = tracing::info_span!("load_loop", count = count).entered();
    let mut handles = Vec::with_capacity(count);
    for i in 0..count {
        if i % 1_000 == 0 {
            tracing::info!("Requesting sprite {}/{}", i, count);
        }
        let key = format!("sprite_{}.json", i % (count / 2).max(1));
        if let Some(handle) = runtime.sprites.create(&mut runtime.manager, &key, false) {
            handles.push(handle);
        }
    }

    let mut frames = 0;
    while runtime.manager.scheduler().outstanding_count() > 0 {
        runtime.update();
        frames += 1;
        std::thread::sleep(Duration::from_millis(1));
    }

    for handle in handles {
        if let Err(err) = runtime.sprites.destroy(&mut runtime.manager, handle) {
            tracing::error!("destroy failed: {err}");
        }
    }
    frames
}

#[cfg(feature = "profiling")]
fn main() -> asset_runtime::Result<()> {
    // Set up tracing subscriber to write to a file
    let file = File::create("trace.json")?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .init();

    let count = 10_000;
    let mut runtime = AssetRuntime::with_source(
        RuntimeConfig::default(),
        make_source(count),
        Arc::new(RawImageDecoder),
        Arc::new(PcmDecoder::default()),
    )?;

    println!("Warming up...");
    {
        let _span = tracing::info_span!("warmup").entered();
        stress_loads(&mut runtime, 100);
    }

    println!("Profiling {count} async sprite loads...");
    let start = Instant::now();
    let frames = stress_loads(&mut runtime, count);
    println!(
        "{count} loads settled in {:?} over {frames} frames",
        start.elapsed()
    );
    println!("Cache stats: {:?}", runtime.manager.stats());
    Ok(())
}

#[cfg(not(feature = "profiling"))]
fn main() {
    println!("load_stress binary requires --features profiling");
}
