//! Backend key layout.
//!
//! Every document lives under `watch:doc:{id}` and every claimed SKU under
//! `watch:sku:{sku}`. The backend's own key is never exposed to clients.

/// Namespace shared by all keys the store writes.
pub const NAMESPACE: &str = "watch";

const DOC_SEGMENT: &str = "doc";
const SKU_SEGMENT: &str = "sku";

/// Builder for backend keys.
pub struct KeyBuilder;

impl KeyBuilder {
    /// Key holding the document with business identifier `id`.
    pub fn document(id: &str) -> String {
        compose(&[NAMESPACE, DOC_SEGMENT, id])
    }

    /// Key holding the owner `id` of `sku`.
    pub fn sku(sku: &str) -> String {
        compose(&[NAMESPACE, SKU_SEGMENT, sku])
    }

    /// Prefix matched by every document key.
    pub fn document_prefix() -> String {
        format!("{}:{}:", NAMESPACE, DOC_SEGMENT)
    }
}

fn compose(parts: &[&str]) -> String {
    parts.join(":")
}
