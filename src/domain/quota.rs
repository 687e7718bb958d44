use serde::{Deserialize, Serialize};

/// One per user. Invariant: `0 <= current_size <= capacity` at every commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStore {
    pub user_id: i64,
    pub capacity: i64,
    pub current_size: i64,
    pub created_at_unix: i64,
    pub updated_at_unix: i64,
}

impl FileStore {
    pub fn has_capacity_for(&self, additional: i64) -> bool {
        self.current_size + additional <= self.capacity
    }
}
