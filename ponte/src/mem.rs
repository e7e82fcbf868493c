// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guest memory access.
//!
//! The engine does not own the guest address space; the embedder (the CPU
//! interpreter or whatever runs guest code) does. It hands the dispatcher
//! an implementation of [`GuestMem`]. Host-pointer translation is what lets
//! blocking calls (futex, message queues) and bulk I/O operate directly on
//! guest-resident buffers without copies.

use std::{error::Error, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemFault {
    AddressOverflow { addr: u64, size: usize },
    Unmapped { addr: u64, size: usize },
}

impl fmt::Display for MemFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemFault::AddressOverflow { addr, size } => {
                write!(f, "address overflow at {addr:#x} (size {size})")
            }
            MemFault::Unmapped { addr, size } => {
                let end = addr.saturating_add(*size as u64);
                write!(f, "no mapping covers range {addr:#x}..{end:#x}")
            }
        }
    }
}

impl Error for MemFault {}

/// Byte-level access to the guest address space.
///
/// All addresses are guest virtual addresses. Implementations must reject
/// ranges that are not fully mapped; the dispatcher turns a [`MemFault`]
/// into EFAULT for the guest rather than crashing.
pub trait GuestMem {
    fn read(&self, addr: u64, out: &mut [u8]) -> Result<(), MemFault>;
    fn write(&mut self, addr: u64, bytes: &[u8]) -> Result<(), MemFault>;

    /// Translate a guest range to a stable host pointer, or `None` if the
    /// range is not contiguously mapped. A zero-length range translates to
    /// a null pointer.
    fn host_ptr(&self, addr: u64, len: usize) -> Option<*const u8>;
    fn host_ptr_mut(&mut self, addr: u64, len: usize) -> Option<*mut u8>;
}

/// A single contiguous guest mapping backed by host memory. Enough for an
/// embedder with a flat address space, and for the test suite.
#[derive(Debug)]
pub struct GuestRam {
    base: u64,
    bytes: Vec<u8>,
}

impl GuestRam {
    pub fn new(base: u64, size: usize) -> Self {
        GuestRam {
            base,
            bytes: vec![0; size],
        }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    fn offset(&self, addr: u64, len: usize) -> Result<usize, MemFault> {
        let end = addr
            .checked_add(len as u64)
            .ok_or(MemFault::AddressOverflow { addr, size: len })?;
        if addr < self.base || end > self.base + self.bytes.len() as u64 {
            return Err(MemFault::Unmapped { addr, size: len });
        }
        Ok((addr - self.base) as usize)
    }
}

impl GuestMem for GuestRam {
    fn read(&self, addr: u64, out: &mut [u8]) -> Result<(), MemFault> {
        let off = self.offset(addr, out.len())?;
        out.copy_from_slice(&self.bytes[off..off + out.len()]);
        Ok(())
    }

    fn write(&mut self, addr: u64, bytes: &[u8]) -> Result<(), MemFault> {
        let off = self.offset(addr, bytes.len())?;
        self.bytes[off..off + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn host_ptr(&self, addr: u64, len: usize) -> Option<*const u8> {
        if len == 0 {
            return Some(std::ptr::null());
        }
        let off = self.offset(addr, len).ok()?;
        Some(self.bytes[off..].as_ptr())
    }

    fn host_ptr_mut(&mut self, addr: u64, len: usize) -> Option<*mut u8> {
        if len == 0 {
            return Some(std::ptr::null_mut());
        }
        let off = self.offset(addr, len).ok()?;
        Some(self.bytes[off..].as_mut_ptr())
    }
}
