#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Crossroads game.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use crossroads_core::{SystemClock, WINDOW_TITLE};
use crossroads_rendering::{
    Color, Presentation, RenderingBackend, Scene, WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crossroads_rendering_macroquad::MacroquadBackend;
use crossroads_simulation::{Simulation, TickScheduler, WorldConfig};
use glam::Vec2;
use log::{info, LevelFilter};

/// Command-line arguments for the Crossroads binary.
#[derive(Debug, Parser)]
#[command(name = "crossroads")]
#[command(about = "Stop at the sign, dodge the other car, and cross the junction")]
struct CliArgs {
    /// Seed for the AI car's speed; a random seed is used when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Sprite manifest listing the car and background images.
    #[arg(long, default_value = "assets/manifest.toml")]
    sprite_manifest: PathBuf,
    /// Draw flat rectangles instead of loading sprites.
    #[arg(long)]
    no_sprites: bool,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, action = ArgAction::Set)]
    vsync: Option<bool>,
    /// Log level; overrides the default taken from `RUST_LOG`.
    #[arg(long)]
    log_level: Option<LevelFilter>,
}

/// Entry point for the Crossroads command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_level);

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("starting run with AI seed {seed}");

    let mut simulation = Simulation::new(WorldConfig::seeded(seed), Box::new(SystemClock::new()));
    let mut scheduler = TickScheduler::default();

    let presentation = Presentation::new(
        WINDOW_TITLE,
        Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT),
        Color::WHITE,
        Scene::from_snapshot(&simulation.snapshot()),
    )
    .context("invalid window configuration")?;

    let sprite_manifest = (!args.no_sprites).then_some(args.sprite_manifest);
    let mut backend = MacroquadBackend::new().with_sprite_manifest(sprite_manifest);
    if let Some(vsync) = args.vsync {
        backend = backend.with_vsync(vsync);
    }

    backend.run(presentation, move |frame_dt, input, scene| {
        for direction in input.moves {
            let _ = simulation.handle_key(direction);
        }
        for _ in 0..scheduler.advance(frame_dt) {
            let _ = simulation.step();
        }
        *scene = Scene::from_snapshot(&simulation.snapshot());
    })
}

fn init_logging(level: Option<LevelFilter>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        let _ = builder.filter_level(level);
    }
    builder.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_the_shipped_manifest() {
        let args = CliArgs::try_parse_from(["crossroads"]).expect("defaults parse");

        assert_eq!(args.seed, None);
        assert_eq!(args.sprite_manifest, PathBuf::from("assets/manifest.toml"));
        assert!(!args.no_sprites);
        assert_eq!(args.vsync, None);
        assert_eq!(args.log_level, None);
    }

    #[test]
    fn flags_are_parsed() {
        let args = CliArgs::try_parse_from([
            "crossroads",
            "--seed",
            "42",
            "--no-sprites",
            "--vsync",
            "false",
            "--log-level",
            "debug",
        ])
        .expect("flags parse");

        assert_eq!(args.seed, Some(42));
        assert!(args.no_sprites);
        assert_eq!(args.vsync, Some(false));
        assert_eq!(args.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn invalid_seed_is_rejected() {
        assert!(CliArgs::try_parse_from(["crossroads", "--seed", "fast"]).is_err());
    }
}
