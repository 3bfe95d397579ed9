// Audit trail endpoint

use crate::client::{ApiClient, ErrorPolicy};
use crate::error::Error;
use crate::models::{AuditQuery, ListAuditLogsResponse};

impl ApiClient {
    /// List audit log rows, newest first, optionally narrowed by resource.
    ///
    /// `GET /api/v1/audit[?resource_type=..&resource_id=..]`
    pub async fn list_audit_logs(&self, query: &AuditQuery) -> Result<ListAuditLogsResponse, Error> {
        let url = self.api_url(&["audit"])?;
        self.get_with_params(
            url,
            &query.params(),
            ErrorPolicy::Generic("Failed to fetch audit logs"),
        )
        .await
    }
}
