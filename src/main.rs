//! AR Waste Patrol entry point
//!
//! Native builds run a headless match against a scripted AR session and a
//! scripted player, then print the high score table. Useful for balancing.
//!
//! Usage: ar-waste-patrol [--seed N] [--tuning tuning.json] [--catalog catalog.json]

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::{Context, Result, bail};
    use glam::Vec3;

    use ar_waste_patrol::consts::FRAME_DT;
    use ar_waste_patrol::sim::{
        Catalog, CatalogManifest, GameEvent, MatchState, ProgressionController, TickInput, tick,
    };
    use ar_waste_patrol::tracker::{AnchorPose, AnchorRegistry, PlaneObservation, SessionStatus, TrackingState};
    use ar_waste_patrol::{HighScoreStore, Settings, Tuning, platform, ui};

    /// Planes the scripted session discovers, one every `PLANE_INTERVAL` seconds
    const MAX_PLANES: u64 = 8;
    const PLANE_INTERVAL: f32 = 2.0;
    /// Distance at which the scripted player clears an item
    const PLAYER_REACH: f32 = 1.2;
    /// Every Nth item is missed by the scripted player
    const MISS_EVERY: u32 = 9;
    /// Give up after this much simulated time
    const MAX_SECONDS: f32 = 3600.0;

    struct Args {
        seed: u64,
        tuning: Option<PathBuf>,
        catalog: Option<PathBuf>,
    }

    fn parse_args() -> Result<Args> {
        let mut args = Args {
            seed: 0x5eed,
            tuning: None,
            catalog: None,
        };
        let mut iter = std::env::args().skip(1);
        while let Some(flag) = iter.next() {
            let mut value = || iter.next().with_context(|| format!("{flag} needs a value"));
            match flag.as_str() {
                "--seed" => args.seed = value()?.parse().context("seed must be an integer")?,
                "--tuning" => args.tuning = Some(PathBuf::from(value()?)),
                "--catalog" => args.catalog = Some(PathBuf::from(value()?)),
                other => bail!("unknown argument {other}"),
            }
        }
        Ok(args)
    }

    /// Scripted plane `index`, on a ring three metres around the player
    fn plane(index: u64) -> PlaneObservation {
        let angle = index as f32 * 0.9;
        PlaneObservation {
            pose: AnchorPose::new(index, Vec3::new(3.0 * angle.cos(), -1.0, 3.0 * angle.sin())),
            state: TrackingState::Tracking,
        }
    }

    pub fn run() -> Result<()> {
        platform::init_logging();
        let args = parse_args()?;

        let tuning = match &args.tuning {
            Some(path) => Tuning::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => Tuning::default(),
        };
        let manifest = match &args.catalog {
            Some(path) => {
                CatalogManifest::load(path).with_context(|| format!("loading {}", path.display()))?
            }
            None => CatalogManifest::builtin(),
        };

        let storage = platform::default_storage();
        let settings = Settings::load(&storage);
        let store = HighScoreStore::load(storage);
        log::info!(
            "AR Waste Patrol (headless) starting, seed {}, guide {}",
            args.seed,
            if settings.show_in_game_guide { "on" } else { "off" }
        );
        println!("High scores:\n{}\n", ui::format_highscores(store.get_all()));

        let mut ctrl =
            ProgressionController::new(tuning, Catalog::from_manifest(manifest), store, args.seed);
        ctrl.subscribe(|event| match event {
            GameEvent::StateChanged(state) => {
                println!("[{}]", ui::Panel::for_state(*state).as_str());
            }
            GameEvent::LevelAdvanced {
                level,
                required_anchors,
            } => println!("Level {level}, waste sources required: {required_anchors}"),
            GameEvent::MatchEnded { final_score, rank } => match rank {
                Some(rank) => println!("Final score {final_score} - new high score #{rank}!"),
                None => println!("Final score {final_score}"),
            },
            _ => {}
        });

        let mut tracker = AnchorRegistry::new();
        tracker.set_status(SessionStatus::Tracking)?;
        ctrl.start_game()?;

        let mut elapsed = 0.0_f32;
        let mut planes_seen = 0;
        let mut input = TickInput::default();

        while ctrl.state() != MatchState::Results {
            if elapsed > MAX_SECONDS {
                log::warn!("Stopping after {MAX_SECONDS}s of simulated play");
                break;
            }

            if planes_seen < MAX_PLANES && elapsed >= planes_seen as f32 * PLANE_INTERVAL {
                tracker.observe(&[plane(planes_seen)]);
                planes_seen += 1;
            }

            input.collected = ctrl
                .live()
                .items()
                .iter()
                .filter(|item| item.id % MISS_EVERY != 0)
                .filter(|item| item.position.distance(input.player_position) <= PLAYER_REACH)
                .map(|item| item.id)
                .collect();

            tick(&mut ctrl, &input, &tracker, FRAME_DT);
            elapsed += FRAME_DT;
        }

        println!(
            "\nReached level {} with {} points after {:.0}s",
            ctrl.level(),
            ctrl.score(),
            elapsed
        );
        println!("High scores:\n{}", ui::format_highscores(ctrl.high_scores()));
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives the library directly
}
