use medialog_core::types::{Genre, MediaCategory, Provider};

use crate::rate_gate::RateGate;
use crate::{DiscoverParams, MetadataError, RawPage, SearchParams};

/// A third-party catalog that can search, browse and list genres.
///
/// Callers acquire [`CatalogProvider::rate_gate`] before every request.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Provider-native item shape.
    type Item: Send + 'static;

    fn provider(&self) -> Provider;

    fn rate_gate(&self) -> &RateGate;

    /// Free-text title search.
    async fn search(
        &self,
        category: MediaCategory,
        params: &SearchParams,
    ) -> Result<RawPage<Self::Item>, MetadataError>;

    /// Browse by genre and ordering.
    async fn discover(
        &self,
        category: MediaCategory,
        params: &DiscoverParams,
    ) -> Result<RawPage<Self::Item>, MetadataError>;

    /// Full genre list for a category.
    async fn genres(&self, category: MediaCategory) -> Result<Vec<Genre>, MetadataError>;
}

pub(crate) fn unsupported(provider: Provider, category: MediaCategory) -> MetadataError {
    MetadataError::UnsupportedCategory {
        provider: provider.as_str(),
        category: category.as_str(),
    }
}
