//! The debugger-side collaborators the label store consumes: target
//! liveness, memory readability, module directory and module hashing.

use xxhash_rust::xxh3::xxh3_64;

/// A virtual address (or address-sized offset) inside the debugged process.
pub type Address = u64;

/// Base reported when an address or name resolves to no loaded module.
pub const NO_MODULE: Address = 0;

/// Highest representable address. `(0, MAX_ADDRESS)` is the full span.
pub const MAX_ADDRESS: Address = Address::MAX;

/// Read-only view of the debugged process.
///
/// The hash pair has provided implementations that satisfy the keying
/// contract: `address_hash(va)` must equal
/// `module_offset_hash(module_name_from_address(va), va - module_base_from_address(va))`.
/// Labels persisted as (name, offset) are only retrievable by address if
/// an override keeps that equality.
pub trait DebugTarget: Send + Sync {
    /// Whether a process is currently attached.
    fn is_debugging(&self) -> bool;

    /// Whether `address` can be read in the target's memory.
    fn is_readable(&self, address: Address) -> bool;

    /// Base of the module containing `address`, or [`NO_MODULE`].
    fn module_base_from_address(&self, address: Address) -> Address;

    /// Current base of the module named `name`, or [`NO_MODULE`].
    fn module_base_from_name(&self, name: &str) -> Address;

    /// Name of the module containing `address`, empty when there is none.
    /// `with_extension` keeps the file extension (`app.exe` vs `app`).
    fn module_name_from_address(&self, address: Address, with_extension: bool) -> String;

    fn module_offset_hash(&self, name: &str, offset: Address) -> Address {
        module_name_hash(name).wrapping_add(offset)
    }

    fn address_hash(&self, address: Address) -> Address {
        let name = self.module_name_from_address(address, true);
        let offset = address.wrapping_sub(self.module_base_from_address(address));
        self.module_offset_hash(&name, offset)
    }
}

/// Case-insensitive hash of a module name. The empty name hashes to zero
/// so that addresses outside any module key on their raw value.
pub fn module_name_hash(name: &str) -> Address {
    if name.is_empty() {
        return 0;
    }
    xxh3_64(name.to_ascii_lowercase().as_bytes())
}
