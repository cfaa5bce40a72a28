//! Order source port.

use async_trait::async_trait;

use crate::domain::{Credential, Order};
use crate::error::FetchError;

/// Fetches the current batch of orders awaiting packing.
///
/// One call is one network round trip; implementations do not retry.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Fetch and normalize the orders visible to `credential`.
    async fn fetch(&self, credential: &Credential) -> Result<Vec<Order>, FetchError>;

    /// Source name for logging.
    fn source_name(&self) -> &'static str;
}
