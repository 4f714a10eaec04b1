// Unit endpoints
//
// Unit list, single unit, and per-unit state-transition history.

use tracing::debug;

use crate::client::FleetClient;
use crate::error::Error;
use crate::models::{StateHistoryRecord, UnitRecord};

impl FleetClient {
    /// List all units with their latest state.
    ///
    /// `GET /api/units`
    pub async fn list_units(&self) -> Result<Vec<UnitRecord>, Error> {
        let url = self.api_url("units")?;
        debug!("listing units");
        self.get(url).await
    }

    /// Fetch a single unit.
    ///
    /// `GET /api/units/{id}` -- a 404 surfaces as [`Error::NotFound`].
    pub async fn get_unit(&self, id: &str) -> Result<UnitRecord, Error> {
        let url = self.api_url(&format!("units/{id}"))?;
        debug!(id, "fetching unit");
        self.get(url).await
    }

    /// Fetch the state-transition history of a unit.
    ///
    /// `GET /api/units/{id}/history`
    pub async fn get_unit_history(&self, id: &str) -> Result<Vec<StateHistoryRecord>, Error> {
        let url = self.api_url(&format!("units/{id}/history"))?;
        debug!(id, "fetching unit state history");
        self.get(url).await
    }
}
