//! Traits for memory reading and process management
//!
//! These traits allow for dependency injection, enabling mock implementations
//! for testing without requiring actual running processes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use super::process::matches_process_name;
use crate::{AutosplitterError, Result};

/// Trait for reading memory from a process
pub trait MemoryReader: Send + Sync {
    /// Read raw bytes from memory
    fn read_bytes(&self, address: usize, size: usize) -> Option<Vec<u8>>;

    /// Read a u8 from memory
    fn read_u8(&self, address: usize) -> Option<u8> {
        let bytes = self.read_bytes(address, 1)?;
        Some(bytes[0])
    }

    /// Read an i32 from memory
    fn read_i32(&self, address: usize) -> Option<i32> {
        let bytes = self.read_bytes(address, 4)?;
        Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a NUL-terminated string stored in a fixed-size buffer.
    ///
    /// The whole buffer must be readable; anything after the first NUL is ignored.
    fn read_c_string(&self, address: usize, max_len: usize) -> Option<String> {
        let bytes = self.read_bytes(address, max_len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Check if the reader is still valid (process still running)
    fn is_valid(&self) -> bool;

    /// Get the base address of the main module
    fn base_address(&self) -> usize;

    /// Get the size of the main module
    fn module_size(&self) -> usize;
}

/// Trait for finding and attaching to processes
pub trait ProcessFinder: Send + Sync {
    /// Find a process by name from a list of target names
    /// Returns (pid, process_name) if found
    fn find_process(&self, target_names: &[&str]) -> Option<(u32, String)>;

    /// Open a process and create a memory reader for its main module,
    /// identified by the name `find_process` returned
    fn open_process(&self, pid: u32, process_name: &str) -> Result<Box<dyn MemoryReader>>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

#[derive(Default)]
struct MockMemory {
    blocks: HashMap<usize, Vec<u8>>,
    failing: HashSet<usize>,
}

/// Mock memory reader backed by a shared memory map.
///
/// Clones share the same memory, so a test can keep one handle and mutate
/// memory between ticks while the autosplitter owns another.
#[derive(Clone)]
pub struct MockMemoryReader {
    memory: Arc<RwLock<MockMemory>>,
    base: usize,
    size: usize,
    valid: Arc<RwLock<bool>>,
}

impl Default for MockMemoryReader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMemoryReader {
    /// Create a new mock memory reader
    pub fn new() -> Self {
        Self {
            memory: Arc::new(RwLock::new(MockMemory::default())),
            base: 0x400000,
            size: 0x1000000,
            valid: Arc::new(RwLock::new(true)),
        }
    }

    /// Set the base address
    pub fn with_base(mut self, base: usize) -> Self {
        self.base = base;
        self
    }

    /// Set the module size
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Write bytes to mock memory
    pub fn write_bytes(&self, address: usize, data: &[u8]) {
        self.memory.write().blocks.insert(address, data.to_vec());
    }

    /// Write a u8 to mock memory
    pub fn write_u8(&self, address: usize, value: u8) {
        self.write_bytes(address, &[value]);
    }

    /// Write an i32 to mock memory
    pub fn write_i32(&self, address: usize, value: i32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    /// Write a string into a zero-padded buffer of `len` bytes
    pub fn write_c_string(&self, address: usize, value: &str, len: usize) {
        let mut buffer = vec![0u8; len];
        let bytes = value.as_bytes();
        let count = bytes.len().min(len);
        buffer[..count].copy_from_slice(&bytes[..count]);
        self.write_bytes(address, &buffer);
    }

    /// Make every read starting at `address` fail until cleared
    pub fn fail_reads_at(&self, address: usize) {
        self.memory.write().failing.insert(address);
    }

    /// Stop failing reads at `address`
    pub fn restore_reads_at(&self, address: usize) {
        self.memory.write().failing.remove(&address);
    }

    /// Invalidate the process (simulate process exit)
    pub fn invalidate(&self) {
        *self.valid.write() = false;
    }
}

impl MemoryReader for MockMemoryReader {
    fn read_bytes(&self, address: usize, size: usize) -> Option<Vec<u8>> {
        if !*self.valid.read() {
            return None;
        }

        let memory = self.memory.read();
        if memory.failing.contains(&address) {
            return None;
        }

        // Check for exact match first
        if let Some(data) = memory.blocks.get(&address) {
            if data.len() >= size {
                return Some(data[..size].to_vec());
            }
        }

        // Check if the address falls within any stored block
        for (&block_start, block_data) in &memory.blocks {
            if address >= block_start && address < block_start + block_data.len() {
                let offset = address - block_start;
                if offset + size <= block_data.len() {
                    return Some(block_data[offset..offset + size].to_vec());
                }
            }
        }

        None
    }

    fn is_valid(&self) -> bool {
        *self.valid.read()
    }

    fn base_address(&self) -> usize {
        self.base
    }

    fn module_size(&self) -> usize {
        self.size
    }
}

/// Mock process finder for testing
#[derive(Default)]
pub struct MockProcessFinder {
    /// List of mock processes: (pid, name)
    processes: RwLock<Vec<(u32, String)>>,
    /// Memory readers to return for each process
    readers: RwLock<HashMap<u32, MockMemoryReader>>,
}

impl MockProcessFinder {
    /// Create a new mock process finder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mock process with a memory reader
    pub fn add_process_with_reader(&self, pid: u32, name: &str, reader: MockMemoryReader) {
        self.processes.write().push((pid, name.to_string()));
        self.readers.write().insert(pid, reader);
    }

    /// Remove a mock process, as if it exited before being found
    pub fn remove_process(&self, pid: u32) {
        self.processes.write().retain(|(p, _)| *p != pid);
        self.readers.write().remove(&pid);
    }
}

impl ProcessFinder for MockProcessFinder {
    fn find_process(&self, target_names: &[&str]) -> Option<(u32, String)> {
        self.processes
            .read()
            .iter()
            .find(|(_, name)| target_names.iter().any(|t| matches_process_name(name, t)))
            .cloned()
    }

    fn open_process(&self, pid: u32, _process_name: &str) -> Result<Box<dyn MemoryReader>> {
        self.readers
            .read()
            .get(&pid)
            .cloned()
            .map(|r| Box::new(r) as Box<dyn MemoryReader>)
            .ok_or(AutosplitterError::ProcessOpenFailed(pid))
    }
}
