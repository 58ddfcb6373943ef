//! Headless match driver.
//!
//! Builds the expected map in a [`SimHost`], starts a match, and plays a
//! short scripted session: chat commands at fixed thinks, plus seeded random
//! damage to live troops. Every rendered overlay frame is printed.
//!
//! ```text
//! garrison-sim [config.json]
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

use std::fs;
use std::path::Path;

use anyhow::Context;
use garrison_core::prelude::*;
use garrison_host::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::info;

const SEED: u64 = 0x6172_7269_736f_6e;
const ROUNDS: u32 = 24;

/// Chat lines typed before the given think.
const SCRIPT: &[(u32, &str)] = &[
    (1, "!door"),
    (2, "!vase t"),
    (3, "!flower ct b"),
    (4, "!tank"),
    (5, "!gallon t c"),
    (7, "!liter"),
    (9, "!statue t"),
    (18, "!clear t"),
];

fn load_config(path: &Path) -> anyhow::Result<MatchConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => MatchConfig::default(),
    };
    let interval = config.think_interval;

    let host = SimHost::from_blueprint(&GameEntities::blueprint(&config));
    let mut game = TowerDefenseMatch::start(host, config).context("starting match")?;
    let mut rng = Pcg64::seed_from_u64(SEED);

    for round in 1..=ROUNDS {
        for (_, line) in SCRIPT.iter().filter(|(at, _)| *at == round) {
            game.host_mut().push_chat(Some(PlayerSlot(1)), line);
        }

        let props: Vec<ActorHandle> = Faction::ALL
            .iter()
            .flat_map(|&f| game.roster(f).iter().map(|t| t.prop().handle()))
            .collect();
        if !props.is_empty() {
            let target = props[rng.gen_range(0..props.len())];
            let amount: f64 = rng.gen_range(10.0..60.0);
            game.host_mut().apply_damage(target, amount)?;
        }

        game.host_mut().advance_clock(interval);
        if game.frame() {
            print_frame(&game);
        }
    }

    for line in game.host().console_log() {
        println!("console: {line}");
    }
    let diagnostics = game.diagnostics();
    info!(?diagnostics, "session finished");
    println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    Ok(())
}

fn print_frame(game: &TowerDefenseMatch<SimHost>) {
    let overlay = game.menu().overlay();
    let host = game.host();
    if let Some(time) = host.screen_text_at(overlay.game_time.x, overlay.game_time.y) {
        println!("{}", time.text);
    }
    if let Some(table) = host.screen_text_at(overlay.table.x, overlay.table.y) {
        println!("{}", table.text);
    }
    println!();
}
