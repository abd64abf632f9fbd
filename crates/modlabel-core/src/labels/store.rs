//! `LabelStore` — the process-wide table of address labels.
//!
//! Labels are keyed by module hash and stored module-relative, so they
//! survive the module being loaded at a different base. Every public
//! operation runs under one exclusive lock for its whole duration, target
//! queries included, so callers never observe a half-applied mutation.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::target::{Address, DebugTarget, MAX_ADDRESS, NO_MODULE};

use super::table::LabelTable;
use super::types::{LabelEntry, LabelError, LabelInfo, LabelText};

pub struct LabelStore {
    target: Arc<dyn DebugTarget>,
    table: Mutex<LabelTable>,
}

impl LabelStore {
    pub fn new(target: Arc<dyn DebugTarget>) -> Self {
        Self {
            target,
            table: Mutex::new(LabelTable::default()),
        }
    }

    pub fn target(&self) -> &Arc<dyn DebugTarget> {
        &self.target
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, LabelTable> {
        self.table.lock()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Label `address`. Empty `text` deletes the label instead.
    ///
    /// The entry is first offered to the slot keyed by hashing the primary
    /// key again; only when that slot is taken does it overwrite the
    /// primary slot. See `LabelTable::insert_live`.
    pub fn set_label(&self, address: Address, text: &str, manual: bool) -> Result<(), LabelError> {
        let mut table = self.lock();
        if !self.target.is_debugging() {
            return Err(LabelError::NotDebugging);
        }
        if !self.target.is_readable(address) {
            return Err(LabelError::UnreadableAddress(address));
        }

        let key = self.target.address_hash(address);
        let Some(text) = LabelText::parse(text)? else {
            let removed = table.remove(key).is_some();
            tracing::debug!(address = %crate::hex::encode(address), removed, "label cleared");
            return Ok(());
        };

        let module = self.target.module_name_from_address(address, true);
        let offset = address.wrapping_sub(self.target.module_base_from_address(address));
        let secondary = self.target.address_hash(key);
        tracing::debug!(
            address = %crate::hex::encode(address),
            module = %module,
            offset = %crate::hex::encode(offset),
            manual,
            "label set"
        );
        table.insert_live(
            key,
            secondary,
            LabelEntry {
                module,
                offset,
                text,
                manual,
            },
        );
        Ok(())
    }

    /// Remove the label keyed by `address`. Returns whether one existed.
    pub fn delete_label(&self, address: Address) -> bool {
        let mut table = self.lock();
        if !self.target.is_debugging() {
            return false;
        }
        table.remove(self.target.address_hash(address)).is_some()
    }

    /// Remove automatic labels whose offset lies in `[start, end)` of the
    /// module both bounds fall in. `(0, MAX_ADDRESS)` removes every
    /// automatic label in every module. Manual labels are never touched.
    ///
    /// Returns the number of labels removed.
    pub fn delete_labels_in_range(&self, start: Address, end: Address) -> usize {
        let mut table = self.lock();
        if !self.target.is_debugging() {
            return 0;
        }

        if start == 0 && end == MAX_ADDRESS {
            let removed = table.remove_where(|entry| !entry.manual);
            tracing::info!(removed, "purged all automatic labels");
            return removed;
        }

        let base = self.target.module_base_from_address(start);
        if base == NO_MODULE || base != self.target.module_base_from_address(end) {
            return 0;
        }
        let module = self.target.module_name_from_address(start, true);
        let (start, end) = (start - base, end - base);

        let removed = table.remove_where(|entry| {
            !entry.manual
                && entry.module.eq_ignore_ascii_case(&module)
                && entry.offset >= start
                && entry.offset < end
        });
        tracing::debug!(module = %module, removed, "purged automatic labels in range");
        removed
    }

    /// Remove every label, manual and automatic.
    pub fn clear_all(&self) {
        self.lock().clear();
    }

    /// The target went away or was replaced: labels keyed against the old
    /// process are meaningless until a session is loaded again.
    pub fn on_target_changed(&self) {
        let mut table = self.lock();
        let dropped = table.len();
        table.clear();
        tracing::info!(dropped, "target changed, label table cleared");
    }

    // ========================================================================
    // Query
    // ========================================================================

    pub fn get_label(&self, address: Address) -> Option<String> {
        let table = self.lock();
        if !self.target.is_debugging() {
            return None;
        }
        table
            .get(self.target.address_hash(address))
            .map(|entry| entry.text.to_string())
    }

    /// Reverse lookup: the current absolute address of the first label
    /// whose text equals `text`. Table order is unspecified.
    pub fn find_label_by_text(&self, text: &str) -> Option<Address> {
        let table = self.lock();
        if !self.target.is_debugging() {
            return None;
        }
        let found = table
            .values()
            .find(|entry| entry.text.as_str() == text)
            .map(|entry| self.rebase(entry));
        found
    }

    /// Every label, rebased onto its module's current base.
    pub fn enumerate(&self) -> Result<Vec<LabelInfo>, LabelError> {
        let table = self.lock();
        if !self.target.is_debugging() {
            return Err(LabelError::NotDebugging);
        }
        let labels = table
            .values()
            .map(|entry| LabelInfo {
                module: entry.module.clone(),
                address: self.rebase(entry),
                text: entry.text.to_string(),
                manual: entry.manual,
            })
            .collect();
        Ok(labels)
    }

    /// Bytes a caller needs to hold the result of [`Self::enumerate`].
    pub fn enumeration_size(&self) -> Result<usize, LabelError> {
        let table = self.lock();
        if !self.target.is_debugging() {
            return Err(LabelError::NotDebugging);
        }
        Ok(table.len() * std::mem::size_of::<LabelInfo>())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rebase(&self, entry: &LabelEntry) -> Address {
        entry
            .offset
            .wrapping_add(self.target.module_base_from_name(&entry.module))
    }
}
