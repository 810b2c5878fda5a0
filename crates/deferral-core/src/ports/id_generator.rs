//! IdGenerator port - ID 生成の抽象化
//!
//! テストで決定的な ID を使えるように trait にしている。

use chrono::DateTime;
use chrono_tz::Tz;
use ulid::Ulid;

use crate::domain::ItemId;

/// Generates item ids.
///
/// # Thread Safety
/// - `Send + Sync`: the intake is shared across request handlers.
pub trait IdGenerator: Send + Sync {
    /// Id for an item created at `issued_at`.
    fn generate_item_id(&self, issued_at: &DateTime<Tz>) -> ItemId;
}

/// ULID ids whose timestamp part is the item's creation time.
///
/// 時刻は引数で受け取る（Clock と揃えるため）。
#[derive(Debug, Clone, Copy, Default)]
pub struct UlidGenerator;

impl UlidGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UlidGenerator {
    fn generate_item_id(&self, issued_at: &DateTime<Tz>) -> ItemId {
        let timestamp_ms = u64::try_from(issued_at.timestamp_millis()).unwrap_or(0);
        ItemId::from(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}
