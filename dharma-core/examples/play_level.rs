//! Play through a level with a simple scripted strategy.
//!
//! Run with: `RUST_LOG=dharma_core=debug cargo run -p dharma-core --example play_level -- 2 42`
//! Arguments are the number of levels to play and an optional seed.

use dharma_core::config::GameConfig;
use dharma_core::content::VILLAGE_CHOICES;
use dharma_core::headless::{HeadlessGame, PlayerEvent};
use dharma_core::progression::{GamePhase, MissionLaunch, SubInteraction, SubOutcome};
use dharma_core::LogKind;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let levels: u32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(1);
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(7);

    let mut game = HeadlessGame::new(GameConfig::default().with_seed(seed));
    game.send(PlayerEvent::BeginJourney)?;

    for level_id in 1..=levels {
        let title = game
            .controller()
            .level(level_id)
            .map(|l| l.title.clone())
            .unwrap_or_default();
        println!("\n=== Level {level_id}: {title} ===");
        game.send(PlayerEvent::StartLevel(level_id))?;
        game.send(PlayerEvent::EnterHub)?;

        let mut retries = 0;
        loop {
            match game.phase() {
                GamePhase::MissionHub => play_mission(&mut game)?,
                GamePhase::GameOver if retries < 3 => {
                    retries += 1;
                    println!("-- fallen; retry {retries}");
                    game.send(PlayerEvent::RetryLevel)?;
                }
                _ => break,
            }
        }

        match game.phase() {
            GamePhase::LevelComplete if level_id < levels => {
                game.send(PlayerEvent::ContinueToNextLevel)?;
            }
            GamePhase::LevelComplete => break,
            phase => {
                println!("stopped in {phase}");
                break;
            }
        }
    }

    let last_level = game.controller().current_level_id();
    let is_final = game.controller().level(last_level + 1).is_none();
    if game.phase() == GamePhase::LevelComplete && is_final {
        game.send(PlayerEvent::FinishJourney)?;
        println!("\nThe journey is complete.");
    }

    let player = game.player();
    println!(
        "\n{} - level {} | hp {}/{} | xp {} | karma {} | gold {} | ending {:?}",
        player.name,
        player.stats.level,
        player.stats.hp,
        player.stats.max_hp,
        player.stats.xp,
        player.karma,
        player.gold,
        game.controller().ending()
    );
    Ok(())
}

fn play_mission(game: &mut HeadlessGame) -> Result<(), Box<dyn std::error::Error>> {
    let title = game
        .controller()
        .current_mission()
        .map(|m| m.title.clone())
        .unwrap_or_default();
    let response = game.send(PlayerEvent::SelectMission)?;
    println!("> {title}");

    match response.launch {
        Some(MissionLaunch::Combat(enemy)) => {
            println!("  vs {} ({} hp)", enemy.name, enemy.max_hp);
            while game.phase() == GamePhase::InCombat {
                let event = if game.current_hp() * 3 < game.max_hp() {
                    PlayerEvent::UseItem
                } else {
                    PlayerEvent::Attack
                };
                let mut response = game.send(event)?;
                if response.ignored {
                    response = game.send(PlayerEvent::Attack)?;
                }
                for entry in &response.log {
                    let marker = match entry.kind {
                        LogKind::Player => ">>",
                        LogKind::Enemy => "<<",
                        LogKind::Special => "!!",
                        LogKind::System => "--",
                    };
                    println!("  {marker} {}", entry.text);
                }
            }
        }
        Some(MissionLaunch::SubInteraction(kind)) => {
            match kind {
                SubInteraction::Resource => {
                    for _ in 0..5 {
                        game.send(PlayerEvent::SearchClue)?;
                        game.send(PlayerEvent::DisarmTrap)?;
                    }
                }
                SubInteraction::Choice => {
                    let choice = VILLAGE_CHOICES[0][0];
                    game.send(PlayerEvent::Choose(choice))?;
                }
                _ => {}
            }
            let response = game.send(PlayerEvent::CompleteSubInteraction {
                outcome: SubOutcome::Success,
                bonus: None,
            })?;
            println!("  {kind:?} done ({} effects)", response.effects.len());
        }
        None => {}
    }
    Ok(())
}
