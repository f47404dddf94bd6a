//! Daily consumer-group refresh
//!
//! Once a day, off-peak, the collector asks the admin collaborator for the
//! full consumer-group listing. The collaborator warms its own caches while
//! answering; nothing is stored here beyond the count that gets logged.

use std::sync::Arc;

use crate::admin::AdminClient;
use crate::error::Result;

/// Runs the daily consumer-group listing.
pub struct GroupRefresher {
    admin: Arc<dyn AdminClient>,
}

impl GroupRefresher {
    pub fn new(admin: Arc<dyn AdminClient>) -> Self {
        Self { admin }
    }

    /// Query the consumer-group listing once; returns how many groups the
    /// cluster reported.
    pub async fn refresh_once(&self) -> Result<usize> {
        let list = self.admin.query_consumer_groups().await?;
        Ok(list.groups.len())
    }
}
