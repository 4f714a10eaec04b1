// Alarm endpoints
//
// Recent alarms (fleet-wide or per unit) and the two lifecycle
// transitions. Both POSTs are idempotent from the client's view.

use tracing::debug;

use crate::client::FleetClient;
use crate::error::Error;
use crate::models::AlarmRecord;

impl FleetClient {
    /// Most recent alarms, newest first.
    ///
    /// `GET /api/alarms/recent` or `GET /api/alarms/recent/{unit_id}`
    pub async fn recent_alarms(&self, unit_id: Option<&str>) -> Result<Vec<AlarmRecord>, Error> {
        let path = match unit_id {
            Some(id) => format!("alarms/recent/{id}"),
            None => "alarms/recent".to_owned(),
        };
        let url = self.api_url(&path)?;
        debug!(?unit_id, "listing recent alarms");
        self.get(url).await
    }

    /// Acknowledge an alarm.
    ///
    /// `POST /api/alarms/{id}/acknowledge`
    pub async fn acknowledge_alarm(&self, id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("alarms/{id}/acknowledge"))?;
        debug!(id, "acknowledging alarm");
        self.post_confirm(url).await
    }

    /// Clear an acknowledged alarm.
    ///
    /// `POST /api/alarms/{id}/clear`
    pub async fn clear_alarm(&self, id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("alarms/{id}/clear"))?;
        debug!(id, "clearing alarm");
        self.post_confirm(url).await
    }
}
