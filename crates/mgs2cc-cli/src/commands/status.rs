//! One-shot state report.

use std::sync::Arc;

use anyhow::{Context, Result};
use mgs2cc_core::game::{Inventory, Slot};
use mgs2cc_core::{Character, Config, Connector, GameState, ProcessHandle, StateClassifier};
use owo_colors::OwoColorize;

pub fn run(config: &Config) -> Result<()> {
    let process = ProcessHandle::find_and_open(&config.process.executable)
        .with_context(|| format!("{} is not running", config.process.executable))?;

    let connector = Connector::new();
    connector.attach(
        Arc::new(process),
        &config.addresses,
        config.process.pointer_width,
    )?;
    let session = connector.session()?;
    let classifier = StateClassifier::new(config.state.clone());

    let state = classifier.classify(&connector);
    let state_text = match state {
        GameState::Ready => state.green().to_string(),
        GameState::WrongMode => state.yellow().to_string(),
        GameState::Unknown => state.red().to_string(),
    };
    println!("{:<10} {}", "State:".bold(), state_text);

    match classifier.sample(&session) {
        Ok(snapshot) => {
            println!("{:<10} {}", "Location:".bold(), snapshot.location_id);
            println!("{:<10} {}", "Pause:".bold(), snapshot.pause_code);
        }
        Err(e) => println!("{:<10} {}", "Location:".bold(), e.red()),
    }

    let inventory = Inventory::new(&session);
    match inventory.character_id() {
        Ok(id) => println!("{:<10} {} ({:?})", "Character:".bold(), id, Character::from_id(&id)),
        Err(e) => println!("{:<10} {}", "Character:".bold(), e.red()),
    }
    match inventory.equipped_weapon() {
        Ok(Some(weapon)) => {
            let clip = inventory
                .clip_count()
                .map(|c| c.to_string())
                .unwrap_or_else(|_| "?".to_string());
            let count = inventory.value(Slot::weapon(weapon));
            let max = inventory.read(Slot::max_ammo(weapon));
            let ammo = match (count, max) {
                (Ok(count), Ok(max)) if weapon.has_ammo() => {
                    format!(", ammo {}/{}", count.raw(), max)
                }
                _ => String::new(),
            };
            println!("{:<10} {} (clip {}{})", "Weapon:".bold(), weapon.label(), clip, ammo);
        }
        Ok(None) => println!("{:<10} {}", "Weapon:".bold(), "unknown".dimmed()),
        Err(e) => println!("{:<10} {}", "Weapon:".bold(), e.red()),
    }

    connector.detach();
    Ok(())
}
