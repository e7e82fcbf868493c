// SPDX-License-Identifier: MIT OR Apache-2.0

//! The operation families. Each module owns its `OperationSpec` statics,
//! the handlers behind them, and a `register` function wiring guest
//! numbers to them for both epochs.

use ponte_common::kernel_types::{legacy_open_flags, Timespec};
use ponte_common::{Abi, AbiEpoch};

use crate::dispatch::Call;
use crate::errno::Fault;
use crate::layout::read_timespec;
use crate::mem::{GuestMem, MemFault};
use crate::table::SyscallTable;

pub mod basic_io;
pub mod filesystem;
pub mod mq;
pub mod poll;
pub mod process;
pub mod security;
pub mod signal;
pub mod socket;
pub mod sync;
pub mod sysvipc;
pub mod time;

pub(crate) fn register(t: &mut SyscallTable) {
    basic_io::register(t);
    filesystem::register(t);
    mq::register(t);
    poll::register(t);
    process::register(t);
    security::register(t);
    signal::register(t);
    socket::register(t);
    sync::register(t);
    sysvipc::register(t);
    time::register(t);
}

/// Borrow a readable guest buffer as a host pointer.
pub(crate) fn host_buf(call: &Call<'_>, addr: u64, len: usize) -> Result<*const u8, Fault> {
    call.mem
        .host_ptr(addr, len)
        .ok_or(Fault::Mem(MemFault::Unmapped { addr, size: len }))
}

/// Borrow a writable guest buffer as a host pointer.
pub(crate) fn host_buf_mut(call: &mut Call<'_>, addr: u64, len: usize) -> Result<*mut u8, Fault> {
    call.mem
        .host_ptr_mut(addr, len)
        .ok_or(Fault::Mem(MemFault::Unmapped { addr, size: len }))
}

pub(crate) fn to_host_timespec(ts: &Timespec) -> libc::timespec {
    libc::timespec {
        tv_sec: ts.seconds as libc::time_t,
        tv_nsec: ts.nanos as libc::c_long,
    }
}

/// Read a guest timespec argument into host form; a null pointer means
/// "no timeout".
pub(crate) fn opt_host_timespec(
    call: &Call<'_>,
    addr: u64,
) -> Result<Option<libc::timespec>, Fault> {
    if addr == 0 {
        return Ok(None);
    }
    let ts = read_timespec(call.mem, call.abi, call.wide(), addr)?;
    Ok(Some(to_host_timespec(&ts)))
}

/// Expand a packed 64-bit signal mask into the host's sigset.
pub(crate) fn host_sigset(mask: u64) -> libc::sigset_t {
    unsafe {
        let mut set: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut set);
        for bit in 0..64 {
            if mask & (1u64 << bit) != 0 {
                libc::sigaddset(&mut set, bit as i32 + 1);
            }
        }
        set
    }
}

/// Map guest open(2) flag bits to the host's encoding. The low creation
/// and access bits are common to every Linux ABI; only four bits moved
/// between the legacy layout and the unified one.
pub(crate) fn open_flags_to_host(abi: Abi, guest: i32) -> i32 {
    if abi.epoch == AbiEpoch::Modern64 {
        return guest;
    }
    let moved = legacy_open_flags::O_DIRECTORY
        | legacy_open_flags::O_NOFOLLOW
        | legacy_open_flags::O_DIRECT
        | legacy_open_flags::O_LARGEFILE;
    let mut host = guest & !moved;
    if guest & legacy_open_flags::O_DIRECTORY != 0 {
        host |= libc::O_DIRECTORY;
    }
    if guest & legacy_open_flags::O_NOFOLLOW != 0 {
        host |= libc::O_NOFOLLOW;
    }
    if guest & legacy_open_flags::O_DIRECT != 0 {
        host |= libc::O_DIRECT;
    }
    // O_LARGEFILE is implied on a 64-bit host; the bit just drops.
    host
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_open_flags_move() {
        let abi = Abi::legacy32_be();
        assert_eq!(
            open_flags_to_host(abi, legacy_open_flags::O_DIRECTORY),
            libc::O_DIRECTORY
        );
        assert_eq!(
            open_flags_to_host(abi, legacy_open_flags::O_NOFOLLOW),
            libc::O_NOFOLLOW
        );
        // Common low bits and O_CLOEXEC pass through untouched.
        let common = libc::O_RDWR | libc::O_CREAT | libc::O_CLOEXEC;
        assert_eq!(open_flags_to_host(abi, common), common);
        // A 64-bit guest's flags are already in host encoding.
        let wide = Abi::modern64_le();
        assert_eq!(open_flags_to_host(wide, libc::O_DIRECTORY), libc::O_DIRECTORY);
    }
}
