// Site endpoints

use crate::client::{ApiClient, ErrorPolicy};
use crate::error::Error;
use crate::models::ListSitesResponse;

impl ApiClient {
    /// List all federated sites.
    ///
    /// `GET /api/v1/sites`
    pub async fn list_sites(&self) -> Result<ListSitesResponse, Error> {
        let url = self.api_url(&["sites"])?;
        self.get(url, ErrorPolicy::Generic("Failed to fetch sites"))
            .await
    }
}
