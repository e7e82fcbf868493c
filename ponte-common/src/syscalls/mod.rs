// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-epoch syscall number tables.
//!
//! Unlike a host-side tracer, both epochs are always compiled in: which
//! table an invocation resolves against is a runtime property of the guest.

pub mod legacy32;
pub mod modern64;
