//! Shared test helpers for `modlabel-core` unit tests.
//!
//! Targets here stand in for the debugger's module directory so that store
//! and codec tests agree on one address layout.

use std::sync::Arc;

use crate::snapshot::ProcessSnapshot;
use crate::target::{Address, DebugTarget};

/// `app.exe` at `0x400000`, `kernel32.dll` at `0x7FF000000`, plus a
/// readable heap region at `0x200000` that belongs to no module.
pub fn sample_target() -> Arc<ProcessSnapshot> {
    Arc::new(
        ProcessSnapshot::builder()
            .with_module("app.exe", 0x400000, 0x10000)
            .with_module("kernel32.dll", 0x7FF000000, 0x100000)
            .with_region(0x200000, 0x1000)
            .build(),
    )
}

/// Delegates to a snapshot but keys every in-module address on its offset
/// rounded down to 16 bytes, so neighbouring addresses share a key.
pub struct CoarseHashTarget {
    pub inner: Arc<ProcessSnapshot>,
}

impl CoarseHashTarget {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: sample_target(),
        })
    }
}

impl DebugTarget for CoarseHashTarget {
    fn is_debugging(&self) -> bool {
        self.inner.is_debugging()
    }

    fn is_readable(&self, address: Address) -> bool {
        self.inner.is_readable(address)
    }

    fn module_base_from_address(&self, address: Address) -> Address {
        self.inner.module_base_from_address(address)
    }

    fn module_base_from_name(&self, name: &str) -> Address {
        self.inner.module_base_from_name(name)
    }

    fn module_name_from_address(&self, address: Address, with_extension: bool) -> String {
        self.inner.module_name_from_address(address, with_extension)
    }

    fn module_offset_hash(&self, name: &str, offset: Address) -> Address {
        if name.is_empty() {
            return offset;
        }
        crate::target::module_name_hash(name).wrapping_add(offset & !0xF)
    }
}

/// Keys land back inside `app.exe` (`key = va + 0x100`), so treating a key
/// as an address yields yet another key. Used to observe which slot the
/// first write of a label lands in.
pub struct ShiftedHashTarget {
    pub inner: Arc<ProcessSnapshot>,
}

impl ShiftedHashTarget {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: sample_target(),
        })
    }
}

impl DebugTarget for ShiftedHashTarget {
    fn is_debugging(&self) -> bool {
        self.inner.is_debugging()
    }

    fn is_readable(&self, address: Address) -> bool {
        self.inner.is_readable(address)
    }

    fn module_base_from_address(&self, address: Address) -> Address {
        self.inner.module_base_from_address(address)
    }

    fn module_base_from_name(&self, name: &str) -> Address {
        self.inner.module_base_from_name(name)
    }

    fn module_name_from_address(&self, address: Address, with_extension: bool) -> String {
        self.inner.module_name_from_address(address, with_extension)
    }

    fn module_offset_hash(&self, name: &str, offset: Address) -> Address {
        self.inner
            .module_base_from_name(name)
            .wrapping_add(offset)
            .wrapping_add(0x100)
    }
}
