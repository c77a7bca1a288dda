//! Linux memory reader implementation (native or Wine processes)

#![cfg(target_os = "linux")]

use super::process::{is_process_running, ModuleInfo};
use super::MemoryReader;

/// Linux-specific memory reader using process_vm_readv
pub struct LinuxMemoryReader {
    pid: u32,
    module: ModuleInfo,
}

impl LinuxMemoryReader {
    /// Create a new Linux memory reader for the given process ID
    pub fn new(pid: u32, module: ModuleInfo) -> Self {
        Self { pid, module }
    }
}

impl MemoryReader for LinuxMemoryReader {
    fn read_bytes(&self, address: usize, size: usize) -> Option<Vec<u8>> {
        let mut buffer = vec![0u8; size];

        let local_iov = libc::iovec {
            iov_base: buffer.as_mut_ptr() as *mut _,
            iov_len: size,
        };

        let remote_iov = libc::iovec {
            iov_base: address as *mut _,
            iov_len: size,
        };

        let result = unsafe {
            libc::process_vm_readv(self.pid as libc::pid_t, &local_iov, 1, &remote_iov, 1, 0)
        };

        if result == size as isize {
            Some(buffer)
        } else {
            None
        }
    }

    fn is_valid(&self) -> bool {
        is_process_running(self.pid)
    }

    fn base_address(&self) -> usize {
        self.module.base_address
    }

    fn module_size(&self) -> usize {
        self.module.size
    }
}
