//! Document store adapter: the catalog on top of a [`DocumentBackend`].
//!
//! Layout on the backend:
//! - `watch:doc:{id}` holds the enveloped, postcard-encoded [`Watch`]
//! - `watch:sku:{sku}` holds a [`SkuClaim`] naming the owning `id` and
//!   enforces `sku` uniqueness
//!
//! Writes claim the SKU entry first with `set_if_absent` and release it again
//! if persisting the document fails. Once a document write has committed, a
//! failure to release the SKU it gave up is logged, not returned: the write
//! stands. A claim left behind that way (or by a crash) is cleared by the
//! next writer of that SKU once its owner no longer holds the SKU and the
//! claim is older than the grace period. No other coordination is done;
//! concurrent writers to one document race at the backend.

use crate::backend::DocumentBackend;
use crate::capability::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::claim::{SkuClaim, DEFAULT_CLAIM_GRACE};
use crate::error::{Result, StoreError};
use crate::key::KeyBuilder;
use crate::model::Watch;
use crate::observability::{NoOpMetrics, StoreMetrics};
use crate::repository::WatchRepository;
use crate::serialization::{decode_document, encode_document};
use crate::validation::{Stamp, WatchDraft};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fields an update payload can never overwrite.
const IMMUTABLE_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

#[derive(Clone, Copy)]
enum OpKind {
    Read,
    Write,
    Delete,
}

/// Catalog store over any [`DocumentBackend`].
///
/// Cheap to clone; clones share backend, generators and metrics.
///
/// # Example
///
/// ```ignore
/// use watch_store::{backend::InMemoryBackend, DocumentStore, WatchRepository};
/// use serde_json::json;
///
/// let store = DocumentStore::new(InMemoryBackend::new());
/// let watch = store.create(json!({
///     "title": "Chrono X", "brand": "Acme", "price": 199.99,
///     "images": ["a.jpg"], "categories": ["sport"],
///     "gender": "Unisex", "sku": "ACME-001"
/// })).await?;
/// assert_eq!(store.find_by_id(&watch.id).await?, watch);
/// ```
#[derive(Clone)]
pub struct DocumentStore<B: DocumentBackend> {
    backend: B,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn StoreMetrics>,
    claim_grace: Duration,
}

impl<B: DocumentBackend> DocumentStore<B> {
    /// Store with UUID v4 identifiers, the system clock and no metrics.
    pub fn new(backend: B) -> Self {
        DocumentStore {
            backend,
            ids: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
            metrics: Arc::new(NoOpMetrics),
            claim_grace: DEFAULT_CLAIM_GRACE,
        }
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_metrics(mut self, metrics: impl StoreMetrics + 'static) -> Self {
        self.metrics = Arc::new(metrics);
        self
    }

    /// Minimum age before an abandoned SKU claim may be cleared. It must
    /// exceed the longest time a write holds a claim before its document
    /// lands.
    pub fn with_claim_grace(mut self, grace: Duration) -> Self {
        self.claim_grace = grace;
        self
    }

    /// Get a reference to the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn observe<T>(
        &self,
        operation: &str,
        kind: OpKind,
        started: Instant,
        result: Result<T>,
    ) -> Result<T> {
        let elapsed = started.elapsed();
        match &result {
            Ok(_) => match kind {
                OpKind::Read => self.metrics.record_read(operation, elapsed),
                OpKind::Write => self.metrics.record_write(operation, elapsed),
                OpKind::Delete => self.metrics.record_delete(operation, elapsed),
            },
            Err(e) => self.metrics.record_error(operation, &e.to_string()),
        }
        result
    }

    async fn load(&self, id: &str) -> Result<Option<Watch>> {
        match self.backend.get(&KeyBuilder::document(id)).await? {
            Some(bytes) => decode_document(&bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn load_existing(&self, id: &str) -> Result<Watch> {
        self.load(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn claim_sku(&self, sku: &str, id: &str) -> Result<()> {
        let key = KeyBuilder::sku(sku);
        let claim = SkuClaim::new(id, self.clock.now()).encode();

        if self.backend.set_if_absent(&key, claim.clone()).await? {
            return Ok(());
        }
        if self.clear_abandoned_claim(&key, sku).await?
            && self.backend.set_if_absent(&key, claim).await?
        {
            return Ok(());
        }

        warn!("Rejected write of watch {}: sku {} already in use", id, sku);
        Err(StoreError::Validation(format!(
            "Duplicate key: sku `{}` is already in use",
            sku
        )))
    }

    /// Remove the claim on `sku` if its owner no longer holds that SKU and
    /// the claim is past the grace period. Returns whether the key is vacant
    /// now.
    async fn clear_abandoned_claim(&self, key: &str, sku: &str) -> Result<bool> {
        let Some(current) = self.backend.get(key).await? else {
            return Ok(true);
        };
        let Some(claim) = SkuClaim::decode(&current) else {
            warn!("Unreadable claim on sku {}", sku);
            return Ok(false);
        };
        if !claim.is_settled(self.clock.now(), self.claim_grace) {
            return Ok(false);
        }

        let owner_holds_sku = match self.load(&claim.owner).await? {
            Some(owner) => owner.sku == sku,
            None => false,
        };
        if owner_holds_sku {
            return Ok(false);
        }

        let cleared = self.backend.delete_if_eq(key, &current).await?;
        if cleared {
            warn!(
                "Cleared abandoned claim on sku {} left by watch {}",
                sku, claim.owner
            );
        }
        Ok(cleared)
    }

    /// Drop the claim on `sku` if `id` still owns it. Failures are logged;
    /// a claim that stays behind is cleared later by [`Self::claim_sku`].
    async fn release_claim(&self, sku: &str, id: &str) {
        if let Err(e) = self.release_owned(sku, id).await {
            error!("Failed to release sku {} claimed by {}: {}", sku, id, e);
        }
    }

    async fn release_owned(&self, sku: &str, id: &str) -> Result<bool> {
        let key = KeyBuilder::sku(sku);
        match self.backend.get(&key).await? {
            Some(current) if SkuClaim::decode(&current).is_some_and(|c| c.owner == id) => {
                self.backend.delete_if_eq(&key, &current).await
            }
            _ => Ok(false),
        }
    }

    async fn list_documents(&self) -> Result<Vec<Watch>> {
        let keys = self
            .backend
            .keys_with_prefix(&KeyBuilder::document_prefix())
            .await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        // Documents deleted between the scan and the fetch come back as None
        let mut watches = self
            .backend
            .mget(&refs)
            .await?
            .into_iter()
            .flatten()
            .map(|bytes| decode_document::<Watch>(&bytes))
            .collect::<Result<Vec<_>>>()?;

        watches.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(watches)
    }

    async fn create_document(&self, payload: Value) -> Result<Watch> {
        let draft = WatchDraft::from_payload(payload)?;
        let id = match draft.requested_id() {
            Some(id) => id.to_string(),
            None => self.ids.next_id(),
        };

        let watch = draft.validate(Stamp::created(id, self.clock.now()))?;
        let bytes = encode_document(&watch)?;

        self.claim_sku(&watch.sku, &watch.id).await?;

        match self
            .backend
            .set_if_absent(&KeyBuilder::document(&watch.id), bytes)
            .await
        {
            Ok(true) => {
                info!("Created watch {} (sku {})", watch.id, watch.sku);
                Ok(watch)
            }
            Ok(false) => {
                self.release_claim(&watch.sku, &watch.id).await;
                warn!("Rejected create: id {} already in use", watch.id);
                Err(StoreError::Validation(format!(
                    "Duplicate key: id `{}` is already in use",
                    watch.id
                )))
            }
            Err(e) => {
                self.release_claim(&watch.sku, &watch.id).await;
                Err(e)
            }
        }
    }

    async fn update_document(&self, id: &str, payload: Value) -> Result<Watch> {
        let existing = self.load_existing(id).await?;
        let merged = merge_fields(&existing, payload)?;
        let draft = WatchDraft::from_payload(merged)?;

        // updated_at never moves backwards, even if the clock does
        let now = self.clock.now().max(existing.updated_at);
        let watch = draft.validate(Stamp::updated(&existing, now))?;
        let bytes = encode_document(&watch)?;

        let sku_changed = watch.sku != existing.sku;
        if sku_changed {
            self.claim_sku(&watch.sku, &watch.id).await?;
        }

        match self
            .backend
            .replace(&KeyBuilder::document(&watch.id), bytes)
            .await
        {
            Ok(true) => {
                if sku_changed {
                    self.release_claim(&existing.sku, &watch.id).await;
                }
                info!("Updated watch {}", watch.id);
                Ok(watch)
            }
            Ok(false) => {
                // Deleted between load and replace
                if sku_changed {
                    self.release_claim(&watch.sku, &watch.id).await;
                }
                Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => {
                if sku_changed {
                    self.release_claim(&watch.sku, &watch.id).await;
                }
                Err(e)
            }
        }
    }

    async fn delete_document(&self, id: &str) -> Result<()> {
        let removed = self
            .backend
            .take(&KeyBuilder::document(id))
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        // Release the sku of the document actually removed, not of an
        // earlier read that a concurrent update may have superseded
        match decode_document::<Watch>(&removed) {
            Ok(watch) => self.release_claim(&watch.sku, id).await,
            Err(e) => error!("Deleted watch {} could not be decoded: {}", id, e),
        }

        info!("Deleted watch {}", id);
        Ok(())
    }
}

/// Overlay the top-level fields of `patch` on the stored document.
///
/// Nested records in the patch replace the stored ones wholesale; `null`
/// clears an optional field. Immutable fields in the patch are ignored.
fn merge_fields(existing: &Watch, patch: Value) -> Result<Value> {
    let Value::Object(patch) = patch else {
        return Err(StoreError::Validation(
            "Watch payload must be a JSON object".to_string(),
        ));
    };

    let mut document =
        serde_json::to_value(existing).map_err(|e| StoreError::Serialization(e.to_string()))?;

    if let Value::Object(fields) = &mut document {
        for (name, value) in patch {
            if IMMUTABLE_FIELDS.contains(&name.as_str()) {
                continue;
            }
            fields.insert(name, value);
        }
    }

    Ok(document)
}

impl<B: DocumentBackend> WatchRepository for DocumentStore<B> {
    async fn list_all(&self) -> Result<Vec<Watch>> {
        let started = Instant::now();
        let result = self.list_documents().await;
        self.observe("list_all", OpKind::Read, started, result)
    }

    async fn find_by_id(&self, id: &str) -> Result<Watch> {
        let started = Instant::now();
        let result = self.load_existing(id).await;
        self.observe("find_by_id", OpKind::Read, started, result)
    }

    async fn create(&self, payload: Value) -> Result<Watch> {
        let started = Instant::now();
        let result = self.create_document(payload).await;
        self.observe("create", OpKind::Write, started, result)
    }

    async fn update(&self, id: &str, payload: Value) -> Result<Watch> {
        let started = Instant::now();
        let result = self.update_document(id, payload).await;
        self.observe("update", OpKind::Write, started, result)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let started = Instant::now();
        let result = self.delete_document(id).await;
        self.observe("delete", OpKind::Delete, started, result)
    }

    async fn health_check(&self) -> Result<bool> {
        self.backend.health_check().await
    }
}
