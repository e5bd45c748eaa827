//! Evaluates a two-stage time warp over a frame source and prints the
//! frame each stage sees.
//!
//! Usage: `plugraph-cli [--config engine.toml] [frame...]`

use anyhow::{Context as _, Result, bail};
use log::info;
use plugraph::nodes::{FrameSource, TimeWarp};
use plugraph::{Context, EngineConfig, Graph};

fn main() -> Result<()> {
    env_logger::init();

    let mut config = EngineConfig::default();
    let mut frames = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let Some(path) = args.next() else {
                bail!("--config needs a path");
            };
            config = EngineConfig::load(&path)?;
            info!("Loaded configuration from {}", path);
        } else {
            let frame: f64 = arg
                .parse()
                .with_context(|| format!("invalid frame \"{}\"", arg))?;
            frames.push(frame);
        }
    }
    if frames.is_empty() {
        frames.push(1.0);
    }

    let mut graph = Graph::with_config(config)?;
    let source = graph.add_node("source", FrameSource::new())?;
    let slow = graph.add_node("slow", TimeWarp::new())?;
    let shifted = graph.add_node("shifted", TimeWarp::new())?;

    graph.connect(graph.plug(source, "out")?, graph.plug(slow, "in")?)?;
    graph.connect(graph.plug(slow, "out")?, graph.plug(shifted, "in")?)?;
    graph.set_value(graph.plug(slow, "speed")?, 0.5)?;
    graph.set_value(graph.plug(shifted, "offset")?, 10.0)?;

    let outputs = [graph.plug(slow, "out")?, graph.plug(shifted, "out")?];
    for frame in frames {
        let values = graph.get_values(&outputs, &Context::with_frame(frame))?;
        println!(
            "frame {:>8.3}  slow.out {:>8.3}  shifted.out {:>8.3}",
            frame,
            values[0].as_float().unwrap_or(f64::NAN),
            values[1].as_float().unwrap_or(f64::NAN)
        );
    }

    let stats = graph.cache_stats();
    info!(
        "hash hits {} misses {}, value hits {} misses {}",
        stats.hash_hits, stats.hash_misses, stats.value_hits, stats.value_misses
    );
    Ok(())
}
