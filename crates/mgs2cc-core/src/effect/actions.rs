//! What each catalogue entry does to the target.
//!
//! One-shot actions run against a session snapshot and return the field they
//! wrote as a [`Change`], a memory fault, or a rejection decided from what
//! they read. Timed actions
//! return a [`RepeatAction`] whose tick re-fetches the session every time, so
//! a detach mid-effect turns into failed ticks rather than stale writes.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::EffectOutcome;
use super::timed::RepeatAction;
use crate::error::Error;
use crate::game::{Inventory, Item, Slot, Weapon};
use crate::memory::layout::values;
use crate::memory::{Connector, Session};

pub(crate) enum ActionError {
    /// The action decided not to proceed
    Rejected(EffectOutcome),
    Fault(Error),
}

impl From<Error> for ActionError {
    fn from(e: Error) -> Self {
        Self::Fault(e)
    }
}

/// The field a one-shot action wrote, before and after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Change {
    pub before: i16,
    pub after: i16,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.before, self.after)
    }
}

pub(crate) type ActionResult = std::result::Result<Change, ActionError>;

pub(crate) fn permanent(reason: impl Into<String>) -> ActionError {
    ActionError::Rejected(EffectOutcome::FailPermanent(reason.into()))
}

fn transient(reason: impl Into<String>) -> ActionError {
    ActionError::Rejected(EffectOutcome::FailTransient(reason.into()))
}

/// Max out the alert timer, then settle it after `settle_after` so the
/// alert phase runs its normal course.
pub(crate) fn set_alert_status(connector: &Arc<Connector>, settle_after: Duration) -> ActionResult {
    let session = connector.session()?;
    let alert = &session.addresses.alert_timer;
    let before = session.memory.read_i16(alert)?;
    session.memory.write_i16(alert, values::ALERT_TRIGGER)?;
    let change = Change {
        before,
        after: values::ALERT_TRIGGER,
    };
    info!("Alert timer {}", change);

    let connector = Arc::clone(connector);
    let spawned = thread::Builder::new()
        .name("alert-settle".to_string())
        .spawn(move || {
            thread::sleep(settle_after);
            let result = connector.session().and_then(|s| {
                s.memory
                    .write_i16(&s.addresses.alert_timer, values::ALERT_SETTLE)
            });
            match result {
                Ok(()) => debug!("Alert timer settled at {}", values::ALERT_SETTLE),
                Err(e) => warn!("Failed to settle alert timer: {}", e),
            }
        });
    if let Err(e) = spawned {
        warn!("Could not schedule alert timer settle: {}", e);
    }
    Ok(change)
}

pub(crate) fn flinch(session: &Session) -> ActionResult {
    let flinch = &session.addresses.flinch;
    let before = session.memory.read_u8(flinch)?;
    session.memory.write_u8(flinch, values::FLINCH)?;
    let change = Change {
        before: i16::from(before),
        after: i16::from(values::FLINCH),
    };
    info!("Flinch flag {}", change);
    Ok(change)
}

pub(crate) fn subtract_ammo(session: &Session, quantity: i32) -> ActionResult {
    if quantity <= 0 {
        return Err(permanent("Invalid quantity"));
    }

    let inventory = Inventory::new(session);
    if inventory.clip_count()? == 0 {
        return Err(permanent("The equipped weapon's clip is empty."));
    }

    // Unequipped and count-less weapons share the table; zeroing them can softlock
    let weapon = match inventory.equipped_weapon()? {
        Some(weapon) if weapon.has_ammo() => weapon,
        _ => return Err(transient("No valid weapon is currently equipped.")),
    };

    let slot = Slot::weapon(weapon);
    let current = inventory.read(slot)?;
    if current <= 0 {
        return Err(transient(format!("{} has no ammo to subtract.", weapon.label())));
    }

    let updated = i32::from(current).saturating_sub(quantity).max(0) as i16;
    inventory.write(slot, updated)?;
    let change = Change {
        before: current,
        after: updated,
    };
    info!("Subtracted {} from {}: {}", quantity, weapon, change);
    Ok(change)
}

pub(crate) fn add_ammo(session: &Session, weapon: Weapon, quantity: i32) -> ActionResult {
    let inventory = Inventory::new(session);
    let slot = Slot::weapon(weapon);
    let current = inventory.value(slot)?;
    if !current.is_owned() {
        return Err(permanent(format!("Player does not have the {}.", weapon.label())));
    }

    let before = current.raw();
    let updated = i32::from(before)
        .saturating_add(quantity)
        .clamp(0, i32::from(i16::MAX)) as i16;
    inventory.write(slot, updated)?;
    let change = Change {
        before,
        after: updated,
    };
    info!("Added {} to {}: {}", quantity, weapon, change);
    Ok(change)
}

/// Zero the clip counter every tick while a clip-fed weapon is equipped.
pub(crate) fn empty_gun_clip(
    connector: Arc<Connector>,
    duration: Duration,
    interval: Duration,
) -> RepeatAction {
    RepeatAction::new("emptyGunClip", duration, interval, move || {
        let session = connector.session()?;
        let inventory = Inventory::new(&session);
        match inventory.equipped_weapon()? {
            Some(weapon) if weapon.has_clip() => {
                inventory.set_clip_count(0)?;
                debug!("Emptied clip of {}", weapon);
            }
            other => debug!("No clip to empty (equipped: {:?})", other),
        }
        Ok(())
    })
}

/// Keep `item` in the inventory and equipped every tick.
pub(crate) fn grant_item(
    connector: Arc<Connector>,
    item: Item,
    duration: Duration,
    interval: Duration,
) -> RepeatAction {
    RepeatAction::new("infiniteAmmo", duration, interval, move || {
        let session = connector.session()?;
        let inventory = Inventory::new(&session);
        inventory.write(Slot::item(item), 1)?;
        inventory.equip_item(item)?;
        Ok(())
    })
}

/// Undo [`grant_item`]. Best effort; the target may already be gone.
pub(crate) fn revoke_item(connector: &Connector, item: Item) {
    let result = connector
        .session()
        .and_then(|s| Inventory::new(&s).write(Slot::item(item), 0));
    if let Err(e) = result {
        warn!("Failed to remove {}: {}", item, e);
    }
}

/// Name of a granted item in player-facing messages
pub(crate) fn item_label(item: Item) -> &'static str {
    match item {
        Item::Bandana => "Bandana",
        Item::SpWig => "SPWIG",
        other => other.short_name(),
    }
}
