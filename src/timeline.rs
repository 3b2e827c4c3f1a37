use crate::api::{PageMeta, Tweet};
use serde::{Deserialize, Serialize};

/// Posts accumulated across pages, newest first, with merged page metadata.
///
/// This is the document written to disk: `{"data": [...], "meta": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub data: Vec<Tweet>,
    #[serde(default)]
    pub meta: PageMeta,
}

impl Timeline {
    pub fn from_page(data: Vec<Tweet>, meta: PageMeta) -> Self {
        Self { data, meta }
    }

    /// Appends a page in received order. `next_token` and `oldest_id` follow
    /// the latest page; `newest_id` stays with the first page that had one.
    pub fn append_page(&mut self, data: Vec<Tweet>, meta: PageMeta) {
        self.data.extend(data);
        self.meta.result_count += meta.result_count;
        self.meta.next_token = meta.next_token;
        if meta.oldest_id.is_some() {
            self.meta.oldest_id = meta.oldest_id;
        }
        if self.meta.newest_id.is_none() {
            self.meta.newest_id = meta.newest_id;
        }
    }

    /// Drops posts beyond `cap`, keeping the newest ones.
    pub fn truncate(&mut self, cap: usize) {
        if self.data.len() <= cap {
            return;
        }
        self.data.truncate(cap);
        self.meta.result_count = cap as u32;
        self.meta.oldest_id = self.data.last().map(|t| t.id.clone());
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
