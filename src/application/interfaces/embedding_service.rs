use async_trait::async_trait;

use crate::domain::DomainError;

/// The opaque, externally-supplied embedding provider (§6, out of scope per
/// §1 — contracted only at this interface). A dimension and a health probe
/// are all the orchestrator ever assumes about it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this provider distinguishes `search_document:`/`search_query:`
    /// prefixed inputs. When false, the orchestrator embeds raw text.
    fn supports_prefixes(&self) -> bool;

    async fn health_check(&self) -> Result<(), DomainError>;

    async fn probe_dimension(&self) -> Result<usize, DomainError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError>;

    async fn embed_single(&self, text: &str) -> Result<Vec<f32>, DomainError>;
}
