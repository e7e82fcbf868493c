// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared ABI model for the ponte syscall compatibility engine.
//!
//! A guest "ABI epoch" is a combination of syscall numbering scheme, word
//! width and endianness. The engine never hard-codes one target; everything
//! that depends on the guest's memory conventions consults an [`Abi`] value.

#![no_std]

pub mod kernel_types;
pub mod syscalls;

/// Syscall numbering scheme. Determines which number table an invocation
/// is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiEpoch {
    /// Legacy 32-bit numbering: unsuffixed calls reserved for 16-bit-ID
    /// variants (`getuid` vs `getuid32`), `*64` large-file aliases, the
    /// SysV `ipc()` multiplexer, `*_time64` aliases.
    Legacy32,
    /// Unified 64-bit numbering; no legacy aliases.
    Modern64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordWidth {
    W32,
    W64,
}

impl WordWidth {
    pub const fn bytes(self) -> usize {
        match self {
            WordWidth::W32 => 4,
            WordWidth::W64 => 8,
        }
    }
}

/// How a failing syscall reports its errno to the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnConvention {
    /// Kernel convention: a negative return value in `-4095..=-1` encodes
    /// the errno directly.
    NegatedErrno,
    /// The return value and errno travel separately; the embedder stores
    /// the errno in whatever side channel its ABI defines.
    ErrnoSlot,
}

/// A fully specified guest ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abi {
    pub epoch: AbiEpoch,
    pub endian: Endian,
    pub width: WordWidth,
}

impl Abi {
    /// Big-endian 32-bit guest with legacy numbering.
    pub const fn legacy32_be() -> Self {
        Abi {
            epoch: AbiEpoch::Legacy32,
            endian: Endian::Big,
            width: WordWidth::W32,
        }
    }

    /// Little-endian 64-bit guest with unified numbering.
    pub const fn modern64_le() -> Self {
        Abi {
            epoch: AbiEpoch::Modern64,
            endian: Endian::Little,
            width: WordWidth::W64,
        }
    }

    pub const fn is_wide(&self) -> bool {
        matches!(self.width, WordWidth::W64)
    }

    pub const fn return_convention(&self) -> ReturnConvention {
        // Both shipped epochs are Linux-derived and use the kernel
        // convention. An ErrnoSlot epoch would change only the final
        // encoding step, not dispatch.
        ReturnConvention::NegatedErrno
    }
}

/// Directory-fd sentinel meaning "resolve relative to the current working
/// directory". Same value across Linux ABIs.
pub const AT_FDCWD: i32 = -100;

pub const AT_SYMLINK_NOFOLLOW: i32 = 0x100;
pub const AT_REMOVEDIR: i32 = 0x200;
