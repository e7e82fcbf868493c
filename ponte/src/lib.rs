// SPDX-License-Identifier: MIT OR Apache-2.0

//! ponte: a syscall compatibility engine for usermode guests.
//!
//! An embedder (a CPU interpreter, a binary translator) traps a guest
//! syscall instruction and hands the raw number and argument registers to a
//! [`Dispatcher`]. The dispatcher resolves the number through the epoch's
//! [`SyscallTable`], marshals guest-layout arguments and structures into
//! host form, performs the call against the host kernel, and folds the
//! result back into the guest's return convention.
//!
//! Memory is always the embedder's: everything goes through the
//! [`GuestMem`] trait, and address-space calls (mmap and friends) are
//! deliberately not in the table.

pub mod dispatch;
pub mod errno;
pub mod layout;
pub mod marshal;
pub mod mem;
mod ops;
pub mod table;

#[cfg(test)]
mod tests;

pub use dispatch::{Call, Dispatcher, Outcome};
pub use errno::{Fault, SysResult};
pub use mem::{GuestMem, GuestRam, MemFault};
pub use table::{table, OpKind, OperationSpec, SyscallTable};

pub use ponte_common::{Abi, AbiEpoch, Endian, ReturnConvention, WordWidth};
