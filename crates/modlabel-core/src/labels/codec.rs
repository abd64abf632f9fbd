//! Session-document codec for the label table.
//!
//! Labels are written into two arrays on the session root: `labels` for
//! manual entries and `autolabels` for automatic ones, each element being
//! `{ "module": .., "address": "0x..", "text": .. }` with a module-relative
//! address. An array with no entries is left out of the document.

use serde_json::{json, Map, Value};

use crate::hex;

use super::store::LabelStore;
use super::types::{LabelEntry, LabelText, MAX_LABEL_LEN, MAX_MODULE_NAME_LEN};

pub const MANUAL_KEY: &str = "labels";
pub const AUTOMATIC_KEY: &str = "autolabels";

/// Counts reported by [`LabelStore::save`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveSummary {
    pub manual: usize,
    pub automatic: usize,
}

impl SaveSummary {
    pub fn total(&self) -> usize {
        self.manual + self.automatic
    }
}

/// Counts reported by [`LabelStore::load`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub manual: usize,
    pub automatic: usize,
    pub skipped: usize,
}

impl LabelStore {
    /// Write the table into `root`, replacing any previous label arrays.
    /// Entries are ordered by (module, offset) so saves are stable.
    pub fn save(&self, root: &mut Map<String, Value>) -> SaveSummary {
        let table = self.lock();

        let mut entries: Vec<&LabelEntry> = table.values().collect();
        entries.sort_by(|a, b| {
            a.module
                .cmp(&b.module)
                .then_with(|| a.offset.cmp(&b.offset))
                .then_with(|| a.text.as_str().cmp(b.text.as_str()))
        });

        let (manual, automatic): (Vec<&LabelEntry>, Vec<&LabelEntry>) =
            entries.into_iter().partition(|entry| entry.manual);
        let summary = SaveSummary {
            manual: manual.len(),
            automatic: automatic.len(),
        };

        write_bucket(root, MANUAL_KEY, &manual);
        write_bucket(root, AUTOMATIC_KEY, &automatic);

        tracing::info!(
            manual = summary.manual,
            automatic = summary.automatic,
            "labels saved"
        );
        summary
    }

    /// Replace the table with the labels in `root`. Malformed elements are
    /// skipped individually; whatever loaded before them stays loaded.
    pub fn load(&self, root: &Value) -> LoadSummary {
        let mut table = self.lock();
        table.clear();

        let mut summary = LoadSummary::default();
        for (key, manual) in [(MANUAL_KEY, true), (AUTOMATIC_KEY, false)] {
            let Some(bucket) = root.get(key) else {
                continue;
            };
            let Some(items) = bucket.as_array() else {
                tracing::warn!(key, "label bucket is not an array, ignoring");
                continue;
            };

            for (index, item) in items.iter().enumerate() {
                let Some(entry) = decode_entry(item, manual) else {
                    tracing::warn!(key, index, "skipping persisted label without usable text");
                    summary.skipped += 1;
                    continue;
                };

                let slot = self.target().module_offset_hash(&entry.module, entry.offset);
                if !table.insert_if_vacant(slot, entry) {
                    tracing::debug!(key, index, "persisted label collides with an earlier one");
                    summary.skipped += 1;
                } else if manual {
                    summary.manual += 1;
                } else {
                    summary.automatic += 1;
                }
            }
        }

        tracing::info!(
            manual = summary.manual,
            automatic = summary.automatic,
            skipped = summary.skipped,
            "labels loaded"
        );
        summary
    }
}

fn write_bucket(root: &mut Map<String, Value>, key: &str, entries: &[&LabelEntry]) {
    if entries.is_empty() {
        root.remove(key);
        return;
    }
    let items = entries
        .iter()
        .map(|entry| {
            json!({
                "module": entry.module,
                "address": hex::encode(entry.offset),
                "text": entry.text.as_str(),
            })
        })
        .collect();
    root.insert(key.to_string(), Value::Array(items));
}

/// Decode one array element. Missing or odd `module`/`address` fields fall
/// back to empty/zero; missing, empty or oversized text drops the element.
fn decode_entry(item: &Value, manual: bool) -> Option<LabelEntry> {
    let text = item.get("text").and_then(Value::as_str)?;
    if text.is_empty() || text.len() >= MAX_LABEL_LEN {
        return None;
    }

    let module = match item.get("module").and_then(Value::as_str) {
        Some(name) if name.len() < MAX_MODULE_NAME_LEN => name.to_string(),
        Some(name) => {
            tracing::warn!(len = name.len(), "persisted module name too long, dropping it");
            String::new()
        }
        None => String::new(),
    };
    let offset = item
        .get("address")
        .and_then(Value::as_str)
        .and_then(hex::decode)
        .unwrap_or(0);

    Some(LabelEntry {
        module,
        offset,
        text: LabelText::from_persisted(text, manual),
        manual,
    })
}
