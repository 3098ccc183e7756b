mod formatter;

use serde::{Deserialize, Serialize};

pub use formatter::{escape_html, format_digest, DIGEST_HEADER};

/// One important article with its generated summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub title: String,
    pub summary: String,
    pub url: String,
}

/// Important articles of one run, in the order the feed returned them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    entries: Vec<DigestEntry>,
}

impl Digest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: DigestEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[DigestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<DigestEntry> for Digest {
    fn from_iter<I: IntoIterator<Item = DigestEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
