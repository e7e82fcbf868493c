// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host result to guest errno translation.
//!
//! Both shipped epochs are Linux-derived, so errno values pass through
//! unchanged and failures travel back as a negated errno in the return
//! register. The translation seam still exists so that a non-Linux epoch
//! could map values here without touching any handler.

use std::fmt;

use nix::errno::Errno;

use crate::mem::MemFault;

/// Why a handler could not produce a plain return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// A guest pointer argument did not resolve to mapped memory.
    Mem(MemFault),
    /// The operation resolves to no host equivalent for this epoch.
    Unsupported,
    /// A host error, already in kernel convention (positive errno).
    Errno(i32),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Mem(e) => write!(f, "bad guest pointer: {e}"),
            Fault::Unsupported => write!(f, "no host equivalent"),
            Fault::Errno(e) => write!(f, "errno {e} ({})", Errno::from_raw(*e)),
        }
    }
}

impl std::error::Error for Fault {}

impl From<MemFault> for Fault {
    fn from(e: MemFault) -> Self {
        Fault::Mem(e)
    }
}

impl From<Errno> for Fault {
    fn from(e: Errno) -> Self {
        Fault::Errno(e as i32)
    }
}

/// What a handler returns: a success value for the guest's return
/// register, or a fault the dispatcher folds into the epoch's error
/// convention.
pub type SysResult = Result<i64, Fault>;

impl Fault {
    /// The guest-visible errno for this fault.
    pub fn guest_errno(&self) -> i32 {
        match self {
            Fault::Mem(_) => libc::EFAULT,
            Fault::Unsupported => libc::ENOSYS,
            Fault::Errno(e) => translate(*e),
        }
    }
}

/// Maps a host errno to the guest epoch's numbering. Identity for the
/// Linux-derived epochs we ship.
pub fn translate(host_errno: i32) -> i32 {
    host_errno
}

/// Converts a libc-convention result (-1 with errno set) into kernel
/// convention (negated errno), leaving successes untouched.
pub fn from_libc(ret: i64) -> i64 {
    if ret == -1 {
        -(Errno::last_raw() as i64)
    } else {
        ret
    }
}

/// Shorthand for handlers that finished a libc call (or a raw
/// `libc::syscall`, which reports failure the same way): fold the -1 +
/// errno convention into a `SysResult`.
pub fn libc_result(ret: i64) -> SysResult {
    let ret = from_libc(ret);
    if ret < 0 {
        Err(Fault::Errno(-ret as i32))
    } else {
        Ok(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::MemFault;

    #[test]
    fn faults_map_to_errnos() {
        assert_eq!(
            Fault::Mem(MemFault::Unmapped { addr: 0x10, size: 4 }).guest_errno(),
            libc::EFAULT
        );
        assert_eq!(Fault::Unsupported.guest_errno(), libc::ENOSYS);
        assert_eq!(Fault::Errno(libc::EAGAIN).guest_errno(), libc::EAGAIN);
    }

    #[test]
    fn libc_success_passes_through() {
        assert_eq!(from_libc(42), 42);
        assert_eq!(from_libc(0), 0);
    }
}
