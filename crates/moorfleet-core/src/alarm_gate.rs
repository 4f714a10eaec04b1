// ── Alarm lifecycle gate ──
//
// The only path by which an alarm's status changes on the client. The
// local transition is applied after the backend confirms it, never
// before, and never backwards.

use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::FleetBackend;
use crate::error::CoreError;
use crate::model::{Alarm, AlarmAction, AlarmId};
use crate::notify::Notifier;
use crate::store::AlarmBook;

/// Sends acknowledge/clear requests and applies confirmed transitions.
pub struct AlarmGate<B: FleetBackend> {
    backend: Arc<B>,
    notifier: Notifier,
}

impl<B: FleetBackend> Clone for AlarmGate<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            notifier: self.notifier.clone(),
        }
    }
}

impl<B: FleetBackend> AlarmGate<B> {
    pub fn new(backend: Arc<B>, notifier: Notifier) -> Self {
        Self { backend, notifier }
    }

    /// `created` → `acknowledged`.
    pub async fn acknowledge(&self, book: &AlarmBook, id: &AlarmId) -> Result<Arc<Alarm>, CoreError> {
        self.transition(book, id, AlarmAction::Acknowledge).await
    }

    /// `acknowledged` → `cleared`.
    pub async fn clear(&self, book: &AlarmBook, id: &AlarmId) -> Result<Arc<Alarm>, CoreError> {
        self.transition(book, id, AlarmAction::Clear).await
    }

    async fn transition(
        &self,
        book: &AlarmBook,
        id: &AlarmId,
        action: AlarmAction,
    ) -> Result<Arc<Alarm>, CoreError> {
        let Some(alarm) = book.get(id) else {
            let err = CoreError::NotFound {
                identifier: format!("alarm {id}"),
            };
            self.notifier.error(failure_title(action), err.to_string());
            return Err(err);
        };

        if alarm.status() >= action.target() {
            debug!(%id, %action, status = %alarm.status(), "alarm already there, nothing to send");
            return Ok(alarm);
        }
        if !alarm.permits(action) {
            let err = CoreError::InvalidTransition {
                id: id.clone(),
                action,
                status: alarm.status(),
            };
            self.notifier.error(failure_title(action), err.to_string());
            return Err(err);
        }

        let sent = match action {
            AlarmAction::Acknowledge => self.backend.acknowledge_alarm(id.as_str()).await,
            AlarmAction::Clear => self.backend.clear_alarm(id.as_str()).await,
        };
        if let Err(e) = sent {
            let err = CoreError::from(e);
            self.notifier.error(failure_title(action), err.to_string());
            return Err(err);
        }

        match book.advance(id, action.target()) {
            Some(true) => {
                info!(%id, %action, "alarm transition confirmed");
                self.notifier
                    .info(success_title(action), format!("Alarm {id}: {}", alarm.message));
            }
            Some(false) => debug!(%id, %action, "duplicate confirmation ignored"),
            None => debug!(%id, "alarm left the view before confirmation"),
        }

        Ok(book.get(id).unwrap_or_else(|| {
            let mut confirmed = Alarm::clone(&alarm);
            confirmed.advance_to(action.target());
            Arc::new(confirmed)
        }))
    }
}

fn success_title(action: AlarmAction) -> &'static str {
    match action {
        AlarmAction::Acknowledge => "Alarm acknowledged",
        AlarmAction::Clear => "Alarm cleared",
    }
}

fn failure_title(action: AlarmAction) -> &'static str {
    match action {
        AlarmAction::Acknowledge => "Acknowledge failed",
        AlarmAction::Clear => "Clear failed",
    }
}
