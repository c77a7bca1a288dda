//! Windows memory reader implementation

#![cfg(target_os = "windows")]

use super::process::ModuleInfo;
use super::MemoryReader;
use crate::{AutosplitterError, Result};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};

/// Check if the process behind a handle is still running
pub(crate) fn is_handle_running(handle: HANDLE) -> bool {
    // STILL_ACTIVE is 259 (STATUS_PENDING)
    const STILL_ACTIVE: u32 = 259;

    if handle.is_invalid() {
        return false;
    }

    let mut exit_code = 0u32;
    unsafe { GetExitCodeProcess(handle, &mut exit_code).is_ok() && exit_code == STILL_ACTIVE }
}

/// Windows-specific memory reader using ReadProcessMemory
pub struct WindowsMemoryReader {
    handle: HANDLE,
    module: ModuleInfo,
}

impl WindowsMemoryReader {
    /// Open a process for reading
    pub fn open(pid: u32, module: ModuleInfo) -> Result<Self> {
        let handle = unsafe { OpenProcess(PROCESS_VM_READ | PROCESS_QUERY_INFORMATION, false, pid) }
            .map_err(|_| AutosplitterError::ProcessOpenFailed(pid))?;
        Ok(Self { handle, module })
    }
}

impl MemoryReader for WindowsMemoryReader {
    fn read_bytes(&self, address: usize, size: usize) -> Option<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        let mut bytes_read = 0;

        let result = unsafe {
            ReadProcessMemory(
                self.handle,
                address as *const _,
                buffer.as_mut_ptr() as *mut _,
                size,
                Some(&mut bytes_read),
            )
        };

        if result.is_ok() && bytes_read == size {
            Some(buffer)
        } else {
            None
        }
    }

    fn is_valid(&self) -> bool {
        is_handle_running(self.handle)
    }

    fn base_address(&self) -> usize {
        self.module.base_address
    }

    fn module_size(&self) -> usize {
        self.module.size
    }
}

impl Drop for WindowsMemoryReader {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

// HANDLE is not Send/Sync by default; the reader only ever performs reads
unsafe impl Send for WindowsMemoryReader {}
unsafe impl Sync for WindowsMemoryReader {}
