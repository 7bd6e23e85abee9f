//! Live target process access.
//!
//! `ProcessMemory` is the seam between the resolver/accessor and whatever
//! holds the target's address space. On Windows `ProcessHandle` implements it
//! with `ReadProcessMemory`/`WriteProcessMemory` and ToolHelp snapshots; tests
//! use `MockProcess`.

use crate::error::{Error, Result};

/// Raw byte-level access to a target address space.
pub trait ProcessMemory: Send + Sync {
    /// Current load base of `module`.
    ///
    /// Looked up on every call: the target may reload a module between two
    /// resolutions.
    fn module_base(&self, module: &str) -> Result<u64>;

    /// Read exactly `size` bytes at `address`.
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Write all of `data` at `address`.
    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()>;

    /// Whether the target is still running.
    fn is_alive(&self) -> bool {
        true
    }
}

/// Handle to a running target process
pub struct ProcessHandle {
    pub pid: u32,
    pub executable: String,
    #[cfg(target_os = "windows")]
    handle: windows::Win32::Foundation::HANDLE,
}

// SAFETY: process HANDLEs are process-wide and can be used from any thread.
#[cfg(target_os = "windows")]
unsafe impl Send for ProcessHandle {}
#[cfg(target_os = "windows")]
unsafe impl Sync for ProcessHandle {}

#[cfg(target_os = "windows")]
const STILL_ACTIVE: u32 = 259;

#[cfg(target_os = "windows")]
impl ProcessHandle {
    /// Find a running process by executable name and open it for reading and writing.
    pub fn find_and_open(executable: &str) -> Result<Self> {
        use windows::Win32::System::Threading::{
            OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_VM_OPERATION,
            PROCESS_VM_READ, PROCESS_VM_WRITE,
        };

        let pid = find_process_id(executable)?;
        let access = PROCESS_VM_READ
            | PROCESS_VM_WRITE
            | PROCESS_VM_OPERATION
            | PROCESS_QUERY_LIMITED_INFORMATION;

        // SAFETY: OpenProcess has no pointer arguments; the handle is closed in Drop.
        let handle = unsafe { OpenProcess(access, false, pid) }
            .map_err(|e| Error::ProcessOpenFailed(format!("{executable} (pid {pid}): {e}")))?;

        Ok(Self {
            pid,
            executable: executable.to_string(),
            handle,
        })
    }
}

#[cfg(target_os = "windows")]
impl ProcessMemory for ProcessHandle {
    fn module_base(&self, module: &str) -> Result<u64> {
        use windows::Win32::System::Diagnostics::ToolHelp::{
            CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, Module32NextW,
            TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32,
        };

        // SAFETY: CreateToolhelp32Snapshot takes no pointers; the guard closes the handle.
        let snapshot = unsafe {
            CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, self.pid)
        }
        .map_err(|e| Error::ModuleNotFound(format!("{module}: module snapshot failed: {e}")))?;
        let snapshot = SnapshotGuard(snapshot);

        let mut entry = MODULEENTRY32W {
            dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };

        // SAFETY: entry.dwSize is initialized as Module32FirstW requires.
        let mut more = unsafe { Module32FirstW(snapshot.0, &mut entry) }.is_ok();
        while more {
            if wide_to_string(&entry.szModule).eq_ignore_ascii_case(module) {
                return Ok(entry.modBaseAddr as u64);
            }
            // SAFETY: same entry buffer, still correctly sized.
            more = unsafe { Module32NextW(snapshot.0, &mut entry) }.is_ok();
        }

        Err(Error::ModuleNotFound(module.to_string()))
    }

    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;

        let mut buffer = vec![0u8; size];
        let mut read = 0usize;
        // SAFETY: buffer is valid for `size` bytes of writes for the duration of the call.
        let result = unsafe {
            ReadProcessMemory(
                self.handle,
                address as *const std::ffi::c_void,
                buffer.as_mut_ptr().cast(),
                size,
                Some(&mut read),
            )
        };

        if result.is_err() || read != size {
            return Err(Error::ReadFault { address, size });
        }
        Ok(buffer)
    }

    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
        use windows::Win32::System::Diagnostics::Debug::WriteProcessMemory;

        let mut written = 0usize;
        // SAFETY: data is valid for `data.len()` bytes of reads for the duration of the call.
        let result = unsafe {
            WriteProcessMemory(
                self.handle,
                address as *const std::ffi::c_void,
                data.as_ptr().cast(),
                data.len(),
                Some(&mut written),
            )
        };

        if result.is_err() || written != data.len() {
            return Err(Error::WriteFault {
                address,
                size: data.len(),
            });
        }
        Ok(())
    }

    fn is_alive(&self) -> bool {
        use windows::Win32::System::Threading::GetExitCodeProcess;

        let mut code = 0u32;
        // SAFETY: `code` is a valid out pointer.
        unsafe { GetExitCodeProcess(self.handle, &mut code) }.is_ok() && code == STILL_ACTIVE
    }
}

#[cfg(target_os = "windows")]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was opened by OpenProcess and is closed exactly once.
        unsafe {
            let _ = windows::Win32::Foundation::CloseHandle(self.handle);
        }
    }
}

#[cfg(target_os = "windows")]
struct SnapshotGuard(windows::Win32::Foundation::HANDLE);

#[cfg(target_os = "windows")]
impl Drop for SnapshotGuard {
    fn drop(&mut self) {
        // SAFETY: the snapshot handle is owned by this guard.
        unsafe {
            let _ = windows::Win32::Foundation::CloseHandle(self.0);
        }
    }
}

#[cfg(target_os = "windows")]
fn find_process_id(executable: &str) -> Result<u32> {
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
        TH32CS_SNAPPROCESS,
    };

    // SAFETY: CreateToolhelp32Snapshot takes no pointers; the guard closes the handle.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
        .map_err(|e| Error::ProcessNotFound(format!("process snapshot failed: {e}")))?;
    let snapshot = SnapshotGuard(snapshot);

    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    // SAFETY: entry.dwSize is initialized as Process32FirstW requires.
    let mut more = unsafe { Process32FirstW(snapshot.0, &mut entry) }.is_ok();
    while more {
        if wide_to_string(&entry.szExeFile).eq_ignore_ascii_case(executable) {
            return Ok(entry.th32ProcessID);
        }
        // SAFETY: same entry buffer, still correctly sized.
        more = unsafe { Process32NextW(snapshot.0, &mut entry) }.is_ok();
    }

    Err(Error::ProcessNotFound(executable.to_string()))
}

#[cfg(target_os = "windows")]
fn wide_to_string(buffer: &[u16]) -> String {
    let end = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..end])
}

#[cfg(not(target_os = "windows"))]
impl ProcessHandle {
    pub fn find_and_open(executable: &str) -> Result<Self> {
        Err(Error::ProcessNotFound(format!(
            "{executable}: live process access is only supported on Windows"
        )))
    }
}

#[cfg(not(target_os = "windows"))]
impl ProcessMemory for ProcessHandle {
    fn module_base(&self, module: &str) -> Result<u64> {
        Err(Error::ModuleNotFound(module.to_string()))
    }

    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        Err(Error::ReadFault { address, size })
    }

    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
        Err(Error::WriteFault {
            address,
            size: data.len(),
        })
    }

    fn is_alive(&self) -> bool {
        false
    }
}
