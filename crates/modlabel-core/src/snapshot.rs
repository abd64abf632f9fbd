//! `ProcessSnapshot` — an in-process [`DebugTarget`] backed by a module
//! list and a set of readable regions.
//!
//! The service uses it as its view of the attached process (loaded from a
//! JSON snapshot file), and tests use it to drive attach/detach and module
//! relocation without a real debugger.

use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hex::serde_hex;
use crate::target::{Address, DebugTarget, NO_MODULE};

// ==============================================================================
// Snapshot Types
// ==============================================================================

/// A loaded module image: `[base, base + size)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub name: String,
    #[serde(with = "serde_hex")]
    pub base: Address,
    #[serde(with = "serde_hex")]
    pub size: Address,
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>, base: Address, size: Address) -> Self {
        Self {
            name: name.into(),
            base,
            size,
        }
    }

    fn contains(&self, address: Address) -> bool {
        address >= self.base && address - self.base < self.size
    }
}

/// Readable memory outside any module image (heap, stack, mapped views).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegion {
    #[serde(with = "serde_hex")]
    pub start: Address,
    #[serde(with = "serde_hex")]
    pub size: Address,
}

impl MemoryRegion {
    fn contains(&self, address: Address) -> bool {
        address >= self.start && address - self.start < self.size
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default = "default_attached")]
    attached: bool,
    #[serde(default)]
    modules: Vec<ModuleInfo>,
    #[serde(default)]
    readable: Vec<MemoryRegion>,
}

fn default_attached() -> bool {
    true
}

#[derive(Debug, Default)]
struct SnapshotState {
    attached: bool,
    modules: Vec<ModuleInfo>,
    regions: Vec<MemoryRegion>,
}

impl SnapshotState {
    fn module_at(&self, address: Address) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| m.contains(address))
    }

    fn module_named(&self, name: &str) -> Option<&ModuleInfo> {
        self.modules
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

// ==============================================================================
// ProcessSnapshot
// ==============================================================================

/// Mutable snapshot of a debugged process. Shared via `Arc`, mutated by
/// whoever observes process events (module loads, relocation, detach).
#[derive(Debug, Default)]
pub struct ProcessSnapshot {
    state: RwLock<SnapshotState>,
}

impl ProcessSnapshot {
    /// A detached snapshot with no modules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ProcessSnapshotBuilder {
        ProcessSnapshotBuilder {
            state: SnapshotState {
                attached: true,
                ..SnapshotState::default()
            },
        }
    }

    /// Parse a JSON snapshot document.
    pub fn from_json(content: &str) -> Result<Self, CoreError> {
        let file: SnapshotFile = serde_json::from_str(content)
            .map_err(|e| CoreError::InvalidSnapshot(e.to_string()))?;
        file.modules.iter().try_for_each(validate_module)?;

        Ok(Self {
            state: RwLock::new(SnapshotState {
                attached: file.attached,
                modules: file.modules,
                regions: file.readable,
            }),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn attach(&self) {
        self.state.write().attached = true;
    }

    /// Mark the process as gone and forget its layout.
    pub fn detach(&self) {
        let mut state = self.state.write();
        state.attached = false;
        state.modules.clear();
        state.regions.clear();
    }

    /// Register a module, replacing any module with the same name.
    pub fn load_module(&self, module: ModuleInfo) -> Result<(), CoreError> {
        validate_module(&module)?;
        let mut state = self.state.write();
        state
            .modules
            .retain(|m| !m.name.eq_ignore_ascii_case(&module.name));
        tracing::debug!(module = %module.name, base = %crate::hex::encode(module.base), "module loaded");
        state.modules.push(module);
        Ok(())
    }

    pub fn unload_module(&self, name: &str) -> bool {
        let mut state = self.state.write();
        let before = state.modules.len();
        state.modules.retain(|m| !m.name.eq_ignore_ascii_case(name));
        state.modules.len() != before
    }

    /// Move a module to a new base, as happens when the image is loaded
    /// again under ASLR. Returns `false` if no such module is loaded.
    pub fn relocate_module(&self, name: &str, new_base: Address) -> bool {
        let mut state = self.state.write();
        let Some(module) = state
            .modules
            .iter_mut()
            .find(|m| m.name.eq_ignore_ascii_case(name))
        else {
            return false;
        };
        if new_base == NO_MODULE || new_base.checked_add(module.size).is_none() {
            return false;
        }
        tracing::debug!(
            module = %module.name,
            old_base = %crate::hex::encode(module.base),
            new_base = %crate::hex::encode(new_base),
            "module relocated"
        );
        module.base = new_base;
        true
    }

    pub fn modules(&self) -> Vec<ModuleInfo> {
        self.state.read().modules.clone()
    }
}

fn validate_module(module: &ModuleInfo) -> Result<(), CoreError> {
    if module.name.is_empty() {
        return Err(CoreError::InvalidSnapshot("module name is empty".into()));
    }
    if module.base == NO_MODULE || module.size == 0 {
        return Err(CoreError::InvalidSnapshot(format!(
            "module `{}` has an empty image",
            module.name
        )));
    }
    if module.base.checked_add(module.size).is_none() {
        return Err(CoreError::InvalidSnapshot(format!(
            "module `{}` extends past the address space",
            module.name
        )));
    }
    Ok(())
}

impl DebugTarget for ProcessSnapshot {
    fn is_debugging(&self) -> bool {
        self.state.read().attached
    }

    fn is_readable(&self, address: Address) -> bool {
        let state = self.state.read();
        state.attached
            && (state.module_at(address).is_some()
                || state.regions.iter().any(|r| r.contains(address)))
    }

    fn module_base_from_address(&self, address: Address) -> Address {
        self.state
            .read()
            .module_at(address)
            .map_or(NO_MODULE, |m| m.base)
    }

    fn module_base_from_name(&self, name: &str) -> Address {
        self.state
            .read()
            .module_named(name)
            .map_or(NO_MODULE, |m| m.base)
    }

    fn module_name_from_address(&self, address: Address, with_extension: bool) -> String {
        let state = self.state.read();
        let Some(module) = state.module_at(address) else {
            return String::new();
        };
        if with_extension {
            return module.name.clone();
        }
        match module.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => module.name.clone(),
        }
    }
}

// ==============================================================================
// Builder
// ==============================================================================

pub struct ProcessSnapshotBuilder {
    state: SnapshotState,
}

impl ProcessSnapshotBuilder {
    pub fn with_module(mut self, name: &str, base: Address, size: Address) -> Self {
        self.state.modules.push(ModuleInfo::new(name, base, size));
        self
    }

    pub fn with_region(mut self, start: Address, size: Address) -> Self {
        self.state.regions.push(MemoryRegion { start, size });
        self
    }

    pub fn detached(mut self) -> Self {
        self.state.attached = false;
        self
    }

    pub fn build(self) -> ProcessSnapshot {
        ProcessSnapshot {
            state: RwLock::new(self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::sample_target;

    #[test]
    fn resolves_module_by_address_and_name() {
        let target = sample_target();
        assert_eq!(target.module_base_from_address(0x401000), 0x400000);
        assert_eq!(target.module_name_from_address(0x401000, true), "app.exe");
        assert_eq!(target.module_name_from_address(0x401000, false), "app");
        assert_eq!(target.module_base_from_name("APP.EXE"), 0x400000);
    }

    #[test]
    fn unresolved_addresses_report_sentinel() {
        let target = sample_target();
        assert_eq!(target.module_base_from_address(0x10), NO_MODULE);
        assert_eq!(target.module_name_from_address(0x10, true), "");
        assert_eq!(target.module_base_from_name("missing.dll"), NO_MODULE);
    }

    #[test]
    fn readability_covers_modules_and_regions() {
        let target = sample_target();
        assert!(target.is_readable(0x400000));
        assert!(target.is_readable(0x20_0010));
        assert!(!target.is_readable(0x10));
        assert!(!target.is_readable(0x410000));
    }

    #[test]
    fn detach_drops_layout() {
        let target = sample_target();
        target.detach();
        assert!(!target.is_debugging());
        assert!(!target.is_readable(0x401000));
        assert!(target.modules().is_empty());
    }

    #[test]
    fn relocate_moves_module_base() {
        let target = sample_target();
        assert!(target.relocate_module("app.exe", 0x500000));
        assert_eq!(target.module_base_from_address(0x501000), 0x500000);
        assert_eq!(target.module_base_from_address(0x401000), NO_MODULE);
        assert!(!target.relocate_module("missing.dll", 0x500000));
    }

    #[test]
    fn load_module_replaces_same_name() {
        let target = sample_target();
        target
            .load_module(ModuleInfo::new("App.exe", 0x600000, 0x1000))
            .expect("load module");
        assert_eq!(target.module_base_from_name("app.exe"), 0x600000);
        assert_eq!(
            target
                .modules()
                .iter()
                .filter(|m| m.name.eq_ignore_ascii_case("app.exe"))
                .count(),
            1
        );
        assert!(target.unload_module("app.exe"));
        assert!(!target.unload_module("app.exe"));
    }

    #[test]
    fn parses_snapshot_json() {
        let target = ProcessSnapshot::from_json(
            r#"{
                "modules": [{ "name": "app.exe", "base": "0x400000", "size": "0x10000" }],
                "readable": [{ "start": "0x1000", "size": "0x100" }]
            }"#,
        )
        .expect("parse snapshot");
        assert!(target.is_debugging());
        assert_eq!(target.module_base_from_address(0x40FFFF), 0x400000);
        assert!(target.is_readable(0x10FF));
        assert!(!target.is_readable(0x1100));
    }

    #[test]
    fn rejects_empty_module_image() {
        let result = ProcessSnapshot::from_json(
            r#"{ "modules": [{ "name": "app.exe", "base": "0x400000", "size": "0x0" }] }"#,
        );
        assert!(matches!(result, Err(CoreError::InvalidSnapshot(_))));
    }

    #[test]
    fn rejects_malformed_hex() {
        let result = ProcessSnapshot::from_json(
            r#"{ "modules": [{ "name": "app.exe", "base": "entry", "size": "0x10" }] }"#,
        );
        assert!(matches!(result, Err(CoreError::InvalidSnapshot(_))));
    }
}
