mod components;
mod config;
mod sim;

use anyhow::Result;
use clap::Parser;

use config::DemoConfig;
use sim::Simulation;

#[derive(Parser)]
#[command(name = "replicator-demo")]
#[command(about = "Replicates a simulated world through full-state snapshots")]
struct Args {
    #[arg(short, long, default_value_t = 16)]
    entities: usize,

    #[arg(short, long, default_value_t = 10)]
    passes: u32,

    /// Initial snapshot buffer size in bytes
    #[arg(short, long, default_value_t = 1200)]
    buffer_size: usize,

    /// Replace the oldest entity every N passes (0 disables)
    #[arg(long, default_value_t = 3)]
    despawn_every: u32,

    #[arg(short, long, default_value_t = 20)]
    tick_rate: u32,
}

fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();

    let args = Args::parse();
    let config = DemoConfig {
        entity_count: args.entities,
        passes: args.passes,
        buffer_size: args.buffer_size,
        despawn_every: args.despawn_every,
        tick_rate: args.tick_rate,
    };

    log::info!(
        "replicating {} entities for {} passes",
        config.entity_count,
        config.passes
    );

    let passes = config.passes;
    let mut sim = Simulation::new(config)?;
    let mut total_bytes = 0;

    for _ in 0..passes {
        sim.step();
        let stats = sim.sync()?;
        sim.verify()?;
        total_bytes += stats.bytes;

        log::info!(
            "pass {}: {} entities in {} bytes ({} created, {} updated, {} destroyed)",
            sim.pass(),
            stats.entities,
            stats.bytes,
            stats.summary.created,
            stats.summary.updated,
            stats.summary.destroyed
        );
    }

    log::info!(
        "done: {} bytes over {} passes, mirror in sync",
        total_bytes,
        passes
    );
    Ok(())
}
