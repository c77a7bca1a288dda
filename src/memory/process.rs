//! Process finding and module information

use super::traits::{MemoryReader, ProcessFinder};
use crate::{AutosplitterError, Result};

/// Information about a running process
#[derive(Debug, Clone)]
pub struct ProcessInfo {
    /// Process ID
    pub pid: u32,
    /// Process name
    pub name: String,
}

/// Information about a module loaded in a process
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    /// Base address
    pub base_address: usize,
    /// Size in bytes
    pub size: usize,
}

/// Compare a running process name against a target name.
///
/// Case-insensitive, and a target given without `.exe` also matches the
/// `.exe` form.
pub fn matches_process_name(actual: &str, target: &str) -> bool {
    let actual = actual.to_lowercase();
    let target = target.to_lowercase();
    actual == target || actual == format!("{}.exe", target.trim_end_matches(".exe"))
}

/// Find the first running process matching any of the given names
#[cfg(target_os = "windows")]
pub fn find_process(process_names: &[&str]) -> Option<ProcessInfo> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
        TH32CS_SNAPPROCESS,
    };

    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0).ok()?;

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        let mut found = None;
        if Process32FirstW(snapshot, &mut entry).is_ok() {
            loop {
                let name = String::from_utf16_lossy(
                    &entry.szExeFile[..entry
                        .szExeFile
                        .iter()
                        .position(|&c| c == 0)
                        .unwrap_or(entry.szExeFile.len())],
                );

                if process_names.iter().any(|t| matches_process_name(&name, t)) {
                    found = Some(ProcessInfo {
                        pid: entry.th32ProcessID,
                        name,
                    });
                    break;
                }

                if Process32NextW(snapshot, &mut entry).is_err() {
                    break;
                }
            }
        }

        let _ = CloseHandle(snapshot);
        found
    }
}

/// Find the first running process matching any of the given names (Linux)
#[cfg(target_os = "linux")]
pub fn find_process(process_names: &[&str]) -> Option<ProcessInfo> {
    use std::fs;
    use std::path::Path;

    for entry in fs::read_dir("/proc").ok()?.flatten() {
        let path = entry.path();

        let Some(pid) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|s| s.parse::<u32>().ok())
        else {
            continue;
        };

        let Ok(comm) = fs::read_to_string(path.join("comm")) else {
            continue;
        };
        let comm = comm.trim();

        // Wine processes report the Windows executable in cmdline
        let exe_name = fs::read_to_string(path.join("cmdline"))
            .ok()
            .and_then(|s| s.split('\0').next().map(|s| s.replace('\\', "/")))
            .and_then(|s| {
                Path::new(&s)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| comm.to_string());

        if process_names
            .iter()
            .any(|t| matches_process_name(comm, t) || matches_process_name(&exe_name, t))
        {
            return Some(ProcessInfo {
                pid,
                name: exe_name,
            });
        }
    }

    None
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub fn find_process(_process_names: &[&str]) -> Option<ProcessInfo> {
    None
}

/// Get the main module of a process (the first module in its module list)
#[cfg(target_os = "windows")]
pub fn get_main_module(pid: u32, _process_name: &str) -> Option<ModuleInfo> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, Module32FirstW, MODULEENTRY32W, TH32CS_SNAPMODULE,
        TH32CS_SNAPMODULE32,
    };

    unsafe {
        let snapshot =
            CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid).ok()?;

        let mut entry = MODULEENTRY32W {
            dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };

        let module = if Module32FirstW(snapshot, &mut entry).is_ok() {
            Some(ModuleInfo {
                base_address: entry.modBaseAddr as usize,
                size: entry.modBaseSize as usize,
            })
        } else {
            None
        };

        let _ = CloseHandle(snapshot);
        module
    }
}

/// Get the main module of a process by parsing /proc/[pid]/maps
#[cfg(target_os = "linux")]
pub fn get_main_module(pid: u32, process_name: &str) -> Option<ModuleInfo> {
    let maps = std::fs::read_to_string(format!("/proc/{}/maps", pid)).ok()?;
    parse_main_module(&maps, process_name)
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub fn get_main_module(_pid: u32, _process_name: &str) -> Option<ModuleInfo> {
    None
}

/// Find the extent of the executable image in a /proc/[pid]/maps listing.
///
/// The image is the file whose name matches the process name. Under Wine the
/// first mappings belong to the loader, so the first file-backed mapping is
/// only used when no file matches.
#[cfg(any(target_os = "linux", test))]
fn parse_main_module(maps: &str, process_name: &str) -> Option<ModuleInfo> {
    let mappings: Vec<(usize, usize, String)> = maps
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 6 || !parts[5].starts_with('/') {
                return None;
            }
            let (start, end) = parts[0].split_once('-')?;
            let start = usize::from_str_radix(start, 16).ok()?;
            let end = usize::from_str_radix(end, 16).ok()?;
            // Paths may contain spaces (Wine prefixes)
            Some((start, end, parts[5..].join(" ")))
        })
        .collect();

    let file_name = |path: &str| path.rsplit('/').next().unwrap_or(path).to_string();
    let main_path = mappings
        .iter()
        .find(|(_, _, path)| matches_process_name(&file_name(path), process_name))
        .or_else(|| mappings.first())
        .map(|(_, _, path)| path.clone())?;

    let (base, end) = mappings
        .iter()
        .filter(|(_, _, path)| *path == main_path)
        .fold((usize::MAX, 0), |(base, end), &(start, stop, _)| {
            (base.min(start), end.max(stop))
        });

    Some(ModuleInfo {
        base_address: base,
        size: end - base,
    })
}

/// Check if a process is still running by its PID
#[cfg(target_os = "windows")]
pub fn is_process_running(pid: u32) -> bool {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};

    unsafe {
        if let Ok(handle) = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
            let result = super::windows::is_handle_running(handle);
            let _ = CloseHandle(handle);
            return result;
        }
    }

    false
}

/// Check if a process is still running by its PID (Linux)
#[cfg(target_os = "linux")]
pub fn is_process_running(pid: u32) -> bool {
    std::path::Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub fn is_process_running(_pid: u32) -> bool {
    false
}

/// Process finder backed by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessFinder;

impl ProcessFinder for SystemProcessFinder {
    fn find_process(&self, target_names: &[&str]) -> Option<(u32, String)> {
        find_process(target_names).map(|info| (info.pid, info.name))
    }

    #[cfg(target_os = "windows")]
    fn open_process(&self, pid: u32, process_name: &str) -> Result<Box<dyn MemoryReader>> {
        let module = get_main_module(pid, process_name)
            .ok_or(AutosplitterError::ProcessOpenFailed(pid))?;
        let reader = super::windows::WindowsMemoryReader::open(pid, module)?;
        Ok(Box::new(reader))
    }

    #[cfg(target_os = "linux")]
    fn open_process(&self, pid: u32, process_name: &str) -> Result<Box<dyn MemoryReader>> {
        let module = get_main_module(pid, process_name)
            .ok_or(AutosplitterError::ProcessOpenFailed(pid))?;
        Ok(Box::new(super::linux::LinuxMemoryReader::new(pid, module)))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux")))]
    fn open_process(&self, pid: u32, _process_name: &str) -> Result<Box<dyn MemoryReader>> {
        Err(AutosplitterError::ProcessOpenFailed(pid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_process_name() {
        assert!(matches_process_name("kingpin.exe", "kingpin"));
        assert!(matches_process_name("Kingpin.EXE", "kingpin"));
        assert!(matches_process_name("kingpin.exe", "kingpin.exe"));
        assert!(matches_process_name("kingpin", "kingpin"));
        assert!(!matches_process_name("kingpin2.exe", "kingpin"));
        assert!(!matches_process_name("quake2.exe", "kingpin"));
    }

    #[test]
    fn test_find_process_unknown_name() {
        assert!(find_process(&["definitely-not-a-running-process-name"]).is_none());
    }

    #[test]
    fn test_system_finder_unknown_name() {
        let finder = SystemProcessFinder;
        assert!(finder
            .find_process(&["definitely-not-a-running-process-name"])
            .is_none());
    }

    const WINE_MAPS: &str = "\
7bc00000-7bc01000 r--p 00000000 08:01 1311 /usr/bin/wine-preloader
7bc01000-7bc03000 r-xp 00001000 08:01 1311 /usr/bin/wine-preloader
7d000000-7d010000 rw-p 00000000 00:00 0
00400000-00401000 r--p 00000000 08:01 2048 /home/u/.wine/drive_c/Program Files/Kingpin/Kingpin.exe
00401000-00f00000 r-xp 00001000 08:01 2048 /home/u/.wine/drive_c/Program Files/Kingpin/Kingpin.exe
00f00000-01000000 rw-p 00b00000 08:01 2048 /home/u/.wine/drive_c/Program Files/Kingpin/Kingpin.exe
7f0000000000-7f0000001000 r--p 00000000 08:01 77 /usr/lib/libc.so.6
";

    #[test]
    fn test_parse_main_module_skips_wine_loader() {
        let module = parse_main_module(WINE_MAPS, "kingpin.exe").unwrap();
        assert_eq!(module.base_address, 0x400000);
        assert_eq!(module.size, 0xC00000);
    }

    #[test]
    fn test_parse_main_module_falls_back_to_first_file() {
        let module = parse_main_module(WINE_MAPS, "quake2.exe").unwrap();
        assert_eq!(module.base_address, 0x7bc00000);
        assert_eq!(module.size, 0x3000);
    }

    #[test]
    fn test_parse_main_module_native_binary() {
        let maps = "\
55d0c0000000-55d0c0002000 r--p 00000000 08:01 10 /opt/kingpin/kingpin
55d0c0002000-55d0c0010000 r-xp 00002000 08:01 10 /opt/kingpin/kingpin
7f0000000000-7f0000001000 r--p 00000000 08:01 77 /usr/lib/libc.so.6
";
        let module = parse_main_module(maps, "kingpin").unwrap();
        assert_eq!(module.base_address, 0x55d0c0000000);
        assert_eq!(module.size, 0x10000);
    }

    #[test]
    fn test_parse_main_module_empty() {
        assert!(parse_main_module("", "kingpin.exe").is_none());
    }
}
