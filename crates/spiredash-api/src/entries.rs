// Workload entry endpoints

use tracing::debug;

use crate::client::{ApiClient, ErrorPolicy};
use crate::error::Error;
use crate::models::{
    CreateEntryBody, ENTRY_TTL_SECS, ListEntriesResponse, NewEntry, WorkloadEntry,
};

impl ApiClient {
    /// List all workload entries with their per-site status.
    ///
    /// `GET /api/v1/entries`
    pub async fn list_entries(&self) -> Result<ListEntriesResponse, Error> {
        let url = self.api_url(&["entries"])?;
        self.get(url, ErrorPolicy::Generic("Failed to fetch entries"))
            .await
    }

    /// Fetch a single entry.
    ///
    /// `GET /api/v1/entries/{id}`
    pub async fn get_entry(&self, id: &str) -> Result<WorkloadEntry, Error> {
        let url = self.api_url(&["entries", id])?;
        self.get(url, ErrorPolicy::Generic("Failed to fetch entry"))
            .await
    }

    /// Create an entry targeting `entry.site_ids`.
    ///
    /// `POST /api/v1/entries`. The TTL is always [`ENTRY_TTL_SECS`].
    /// A rejection carries the server's explanation in [`Error::Rejected`].
    /// `None` means the server accepted the entry but its reply was not
    /// a readable entry.
    pub async fn create_entry(&self, entry: &NewEntry) -> Result<Option<WorkloadEntry>, Error> {
        let url = self.api_url(&["entries"])?;
        debug!(spiffe_id = %entry.spiffe_id, sites = entry.site_ids.len(), "creating entry");
        let body = CreateEntryBody {
            entry,
            ttl: ENTRY_TTL_SECS,
        };
        self.post(url, &body, ErrorPolicy::ServerText).await
    }

    /// Delete an entry from every site.
    ///
    /// `DELETE /api/v1/entries/{id}`. Any 2xx is success, whatever the body.
    pub async fn delete_entry(&self, id: &str) -> Result<(), Error> {
        let url = self.api_url(&["entries", id])?;
        debug!(id, "deleting entry");
        self.delete(url, ErrorPolicy::Generic("Failed to delete entry"))
            .await
    }
}
