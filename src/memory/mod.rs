//! Cross-platform memory operations
//!
//! This module provides platform-agnostic abstractions for memory reading,
//! with implementations for Windows and Linux and mocks for tests.

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
mod linux;

mod process;
mod traits;

pub use process::{
    find_process, get_main_module, is_process_running, matches_process_name, ModuleInfo,
    ProcessInfo, SystemProcessFinder,
};
pub use traits::{MemoryReader, MockMemoryReader, MockProcessFinder, ProcessFinder};

#[cfg(target_os = "windows")]
pub use self::windows::WindowsMemoryReader;

#[cfg(target_os = "linux")]
pub use self::linux::LinuxMemoryReader;

use crate::{AutosplitterError, Result};

/// Context for a connected process
pub struct ProcessContext {
    reader: Box<dyn MemoryReader>,
    process_id: u32,
    process_name: String,
}

impl ProcessContext {
    /// Create a new process context
    pub fn new(
        reader: Box<dyn MemoryReader>,
        process_id: u32,
        process_name: impl Into<String>,
    ) -> Self {
        Self {
            reader,
            process_id,
            process_name: process_name.into(),
        }
    }

    pub fn process_id(&self) -> u32 {
        self.process_id
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// Base address of the main module
    pub fn base_address(&self) -> usize {
        self.reader.base_address()
    }

    /// Size of the main module, used to tell game builds apart
    pub fn module_size(&self) -> usize {
        self.reader.module_size()
    }

    /// Whether the process is still alive
    pub fn is_alive(&self) -> bool {
        self.reader.is_valid()
    }

    /// Read an i32 at an offset from the module base
    pub fn read_i32(&self, offset: usize) -> Result<i32> {
        let address = self.base_address() + offset;
        self.reader
            .read_i32(address)
            .ok_or(AutosplitterError::ReadFailed { address })
    }

    /// Read a u8 at an offset from the module base
    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        let address = self.base_address() + offset;
        self.reader
            .read_u8(address)
            .ok_or(AutosplitterError::ReadFailed { address })
    }

    /// Read a fixed-size NUL-terminated string at an offset from the module base
    pub fn read_c_string(&self, offset: usize, max_len: usize) -> Result<String> {
        let address = self.base_address() + offset;
        self.reader
            .read_c_string(address, max_len)
            .ok_or(AutosplitterError::ReadFailed { address })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_reads_relative_to_base() {
        let reader = MockMemoryReader::new().with_base(0x400000);
        reader.write_i32(0x400000 + 0x100, 4);
        reader.write_u8(0x400000 + 0x200, 1);
        reader.write_c_string(0x400000 + 0x300, "base1.bsp", 16);

        let ctx = ProcessContext::new(Box::new(reader), 42, "kingpin.exe");
        assert_eq!(ctx.read_i32(0x100).unwrap(), 4);
        assert_eq!(ctx.read_u8(0x200).unwrap(), 1);
        assert_eq!(ctx.read_c_string(0x300, 16).unwrap(), "base1.bsp");
        assert_eq!(ctx.process_id(), 42);
        assert_eq!(ctx.process_name(), "kingpin.exe");
    }

    #[test]
    fn test_context_read_failure_reports_absolute_address() {
        let reader = MockMemoryReader::new().with_base(0x400000);
        let ctx = ProcessContext::new(Box::new(reader), 1, "kingpin.exe");

        match ctx.read_i32(0x10) {
            Err(AutosplitterError::ReadFailed { address }) => assert_eq!(address, 0x400010),
            other => panic!("expected ReadFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_context_liveness_follows_reader() {
        let reader = MockMemoryReader::new();
        let handle = reader.clone();
        let ctx = ProcessContext::new(Box::new(reader), 1, "kingpin.exe");
        assert!(ctx.is_alive());
        handle.invalidate();
        assert!(!ctx.is_alive());
    }
}
