//! Gating, validation and execution of a single request.
//!
//! [`Engine::start`] makes one attempt. Retrying deferred or transiently
//! failed requests is the dispatcher's job.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::actions::{self, ActionError, ActionResult};
use super::catalog::{self, EffectDef, EffectKind};
use super::sink::MessageSink;
use super::timed::{RepeatAction, TimedHandle};
use super::{EffectOutcome, EffectRequest};
use crate::config::EngineConfig;
use crate::game::{Character, GameState, Inventory, StateClassifier};
use crate::memory::{Connector, Session};

/// Result of one attempt to start a request
pub enum Started {
    /// The request reached its outcome
    Finished {
        outcome: EffectOutcome,
        message: Option<String>,
    },
    /// The target is not ready; try again later
    Deferred,
    /// A timed effect is ticking
    Running { handle: TimedHandle, message: String },
}

impl Started {
    fn finished(outcome: EffectOutcome) -> Self {
        Self::Finished {
            outcome,
            message: None,
        }
    }
}

pub struct Engine {
    connector: Arc<Connector>,
    classifier: Arc<StateClassifier>,
    sink: Arc<dyn MessageSink>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        connector: Arc<Connector>,
        classifier: Arc<StateClassifier>,
        sink: Arc<dyn MessageSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            connector,
            classifier,
            sink,
            config,
        }
    }

    pub fn connector(&self) -> &Arc<Connector> {
        &self.connector
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classify(&self) -> GameState {
        self.classifier.classify(&self.connector)
    }

    /// Single readiness check
    pub fn is_ready(&self) -> bool {
        self.classify() == GameState::Ready
    }

    /// Validate, gate and run `request` once.
    pub fn start(&self, request: &EffectRequest) -> Started {
        let Some(def) = catalog::lookup(&request.code) else {
            debug!("Unknown effect code {:?} ({})", request.code, request.id);
            return Started::finished(EffectOutcome::Unsupported);
        };

        let quantity = if def.kind.takes_quantity() {
            match request.quantity() {
                Some(q) => q,
                None => {
                    return Started::finished(EffectOutcome::FailPermanent(
                        "Invalid quantity".to_string(),
                    ));
                }
            }
        } else {
            0
        };

        if !self.is_ready() {
            debug!("{} {} deferred: {}", request.id, def.code, self.classifier.last_state());
            return Started::Deferred;
        }

        let session = match self.connector.session() {
            Ok(session) => session,
            Err(e) => return Started::finished(EffectOutcome::FailTransient(e.to_string())),
        };

        info!("Running {} for {} ({})", def.code, request.viewer, request.id);
        let viewer = &request.viewer;
        match def.kind {
            EffectKind::AlertStatus => self.one_shot(
                actions::set_alert_status(&self.connector, self.config.alert_settle_delay()),
                format!("{viewer} set the game to Alert Status."),
                "Alert timer",
            ),
            EffectKind::Flinch => self.one_shot(
                actions::flinch(&session),
                format!("{viewer} made the player flinch."),
                "Flinch",
            ),
            EffectKind::SubtractAmmo => self.one_shot(
                actions::subtract_ammo(&session, quantity),
                format!("{viewer} subtracted {quantity} ammo from the player's equipped weapon."),
                "Ammo",
            ),
            EffectKind::AddAmmo { weapon } => self.one_shot(
                actions::add_ammo(&session, weapon, quantity),
                format!("{viewer} added {quantity} {}.", weapon.top_up_phrase()),
                "Ammo",
            ),
            EffectKind::EmptyGunClip => {
                let duration = effect_duration(def, request);
                let action = actions::empty_gun_clip(
                    Arc::clone(&self.connector),
                    duration,
                    self.config.tick_interval(),
                );
                self.timed(
                    action,
                    format!(
                        "{viewer} emptied the player's gun clip for {} seconds.",
                        duration.as_secs()
                    ),
                    || "Gun clip has been refilled.".to_string(),
                )
            }
            EffectKind::InfiniteAmmo => self.infinite_ammo(def, request, &session),
        }
    }

    fn infinite_ammo(&self, def: &EffectDef, request: &EffectRequest, session: &Session) -> Started {
        let character = match Inventory::new(session).character_id() {
            Ok(id) => Character::from_id(&id),
            Err(e) => return Started::finished(EffectOutcome::FailTransient(e.to_string())),
        };
        let Some(item) = character.infinite_ammo_item() else {
            return Started::finished(EffectOutcome::FailPermanent(
                "Infinite Ammo is not available for this character.".to_string(),
            ));
        };

        let duration = effect_duration(def, request);
        let label = actions::item_label(item);
        let action = actions::grant_item(
            Arc::clone(&self.connector),
            item,
            duration,
            self.config.tick_interval(),
        );
        let connector = Arc::clone(&self.connector);
        self.timed(
            action,
            format!(
                "{} gave the player the {label} for {} seconds.",
                request.viewer,
                duration.as_secs()
            ),
            move || {
                actions::revoke_item(&connector, item);
                format!("{label} effect has ended.")
            },
        )
    }

    /// Finish a one-shot action. On success the message ends with the written
    /// field's before and after values, e.g. "Ammo: 5 -> 30".
    fn one_shot(&self, result: ActionResult, description: String, field: &str) -> Started {
        match result {
            Ok(change) => {
                let message = format!("{description} {field}: {change}");
                self.sink.send(&message);
                Started::Finished {
                    outcome: EffectOutcome::Success,
                    message: Some(message),
                }
            }
            Err(ActionError::Rejected(outcome)) => {
                info!("Effect rejected: {}", outcome);
                Started::finished(outcome)
            }
            Err(ActionError::Fault(e)) => {
                warn!("Effect failed: {}", e);
                Started::finished(EffectOutcome::FailTransient(e.to_string()))
            }
        }
    }

    /// Wire readiness and messaging into `action` and start it. `finish` runs
    /// once on the effect thread and produces the end message.
    fn timed<F>(&self, action: RepeatAction, start_message: String, finish: F) -> Started
    where
        F: FnOnce() -> String + Send + 'static,
    {
        let connector = Arc::clone(&self.connector);
        let classifier = Arc::clone(&self.classifier);
        let start_sink = Arc::clone(&self.sink);
        let end_sink = Arc::clone(&self.sink);
        let announced = start_message.clone();

        let action = action
            .ready(move || classifier.classify(&connector) == GameState::Ready)
            .on_start(move || start_sink.send(&announced))
            .on_end(move |reason| {
                debug!("Timed effect ended: {}", reason);
                end_sink.send(&finish());
            });

        match action.spawn() {
            Ok(handle) => Started::Running {
                handle,
                message: start_message,
            },
            Err(e) => Started::finished(EffectOutcome::FailTransient(e.to_string())),
        }
    }
}

fn effect_duration(def: &EffectDef, request: &EffectRequest) -> Duration {
    request
        .duration
        .or_else(|| def.default_duration())
        .unwrap_or_default()
}
