use crate::domain::ports::ReceiptStore;
use crate::domain::receipt::ReceiptDocument;
use crate::error::PublishError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Clone)]
struct StoredReceipt {
    document: ReceiptDocument,
    created_at: Instant,
}

/// A thread-safe, bounded in-memory store for receipts served by this process.
///
/// Entries expire after `ttl` and the store never holds more than `capacity`
/// receipts: inserting into a full store evicts the oldest entry. Expired
/// entries are purged on every access.
#[derive(Clone)]
pub struct InMemoryReceiptStore {
    ttl: Duration,
    capacity: usize,
    receipts: Arc<Mutex<HashMap<String, StoredReceipt>>>,
}

impl InMemoryReceiptStore {
    /// Creates a new, empty receipt store.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            receipts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        let mut receipts = self.receipts.lock().await;
        self.purge_expired(&mut receipts);
        receipts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn purge_expired(&self, receipts: &mut HashMap<String, StoredReceipt>) {
        receipts.retain(|_, r| r.created_at.elapsed() <= self.ttl);
    }
}

#[async_trait]
impl ReceiptStore for InMemoryReceiptStore {
    async fn insert(&self, id: String, document: ReceiptDocument) -> Result<(), PublishError> {
        let mut receipts = self.receipts.lock().await;
        self.purge_expired(&mut receipts);

        if receipts.len() >= self.capacity
            && !receipts.contains_key(&id)
            && let Some(oldest) = receipts
                .iter()
                .min_by_key(|(_, r)| r.created_at)
                .map(|(k, _)| k.clone())
        {
            receipts.remove(&oldest);
        }

        receipts.insert(
            id,
            StoredReceipt {
                document,
                created_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, id: &str) -> Option<ReceiptDocument> {
        let mut receipts = self.receipts.lock().await;
        self.purge_expired(&mut receipts);
        receipts.get(id).map(|r| r.document.clone())
    }
}
