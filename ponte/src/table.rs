// SPDX-License-Identifier: MIT OR Apache-2.0

//! The number table: maps (epoch, guest syscall number) to an operation.
//!
//! Built once at first use and read lock-free afterwards. Registering the
//! same number twice for an epoch is a construction bug and panics during
//! the build rather than silently shadowing an operation.

use std::collections::HashMap;
use std::sync::LazyLock;

use ponte_common::AbiEpoch;

use crate::dispatch::Call;
use crate::errno::SysResult;

pub type OpFn = fn(&mut Call<'_>) -> SysResult;

/// How an operation reaches the host.
#[derive(Clone, Copy)]
pub enum OpKind {
    /// Forward straight to the host syscall with the given number, taking
    /// `args` register arguments and no pointer rewriting.
    Passthrough { nr: libc::c_long, args: u8 },
    /// Marshaled by a handler.
    Handler(OpFn),
    /// Terminates the guest; the dispatcher turns this into an exit
    /// outcome instead of ever calling the host.
    Exit,
}

/// Everything epoch-independent about one operation.
pub struct OperationSpec {
    pub name: &'static str,
    pub kind: OpKind,
    /// Whether the call may sleep. Recorded so an embedder driving many
    /// guests can route blocking operations off its event loop.
    pub blocking: bool,
}

impl OperationSpec {
    pub const fn handler(name: &'static str, f: OpFn) -> Self {
        Self {
            name,
            kind: OpKind::Handler(f),
            blocking: false,
        }
    }

    pub const fn blocking_handler(name: &'static str, f: OpFn) -> Self {
        Self {
            name,
            kind: OpKind::Handler(f),
            blocking: true,
        }
    }

    pub const fn passthrough(name: &'static str, nr: libc::c_long, args: u8) -> Self {
        Self {
            name,
            kind: OpKind::Passthrough { nr, args },
            blocking: false,
        }
    }

    pub const fn blocking_passthrough(name: &'static str, nr: libc::c_long, args: u8) -> Self {
        Self {
            name,
            kind: OpKind::Passthrough { nr, args },
            blocking: true,
        }
    }

    pub const fn exit(name: &'static str) -> Self {
        Self {
            name,
            kind: OpKind::Exit,
            blocking: false,
        }
    }
}

/// Per-number register adaptation applied before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgAdapt {
    None,
    /// A `*64`/`*_time64` alias: handlers see the wide struct layouts
    /// even on a narrow epoch.
    Wide,
    /// A 64-bit value arrives as a hi/lo register pair starting at this
    /// argument slot; the dispatcher folds it and shifts the tail down.
    PairAt(usize),
}

#[derive(Clone, Copy)]
pub struct Entry {
    pub spec: &'static OperationSpec,
    pub adapt: ArgAdapt,
}

pub struct SyscallTable {
    entries: HashMap<(AbiEpoch, u32), Entry>,
}

impl SyscallTable {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn resolve(&self, epoch: AbiEpoch, nr: u32) -> Option<Entry> {
        self.entries.get(&(epoch, nr)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn add(
        &mut self,
        epoch: AbiEpoch,
        nr: u32,
        spec: &'static OperationSpec,
        adapt: ArgAdapt,
    ) {
        if let Some(old) = self.entries.insert((epoch, nr), Entry { spec, adapt }) {
            panic!(
                "{epoch:?} syscall {nr} registered twice: {} and {}",
                old.spec.name, spec.name
            );
        }
    }

    pub(crate) fn legacy(&mut self, nr: u32, spec: &'static OperationSpec) {
        self.add(AbiEpoch::Legacy32, nr, spec, ArgAdapt::None);
    }

    pub(crate) fn legacy_adapted(&mut self, nr: u32, spec: &'static OperationSpec, adapt: ArgAdapt) {
        self.add(AbiEpoch::Legacy32, nr, spec, adapt);
    }

    pub(crate) fn modern(&mut self, nr: u32, spec: &'static OperationSpec) {
        self.add(AbiEpoch::Modern64, nr, spec, ArgAdapt::None);
    }

    /// Registers the common case: same operation under both epochs'
    /// numbering, no adaptation.
    pub(crate) fn both(&mut self, legacy_nr: u32, modern_nr: u32, spec: &'static OperationSpec) {
        self.legacy(legacy_nr, spec);
        self.modern(modern_nr, spec);
    }
}

static TABLE: LazyLock<SyscallTable> = LazyLock::new(|| {
    let mut t = SyscallTable::new();
    crate::ops::register(&mut t);
    t
});

pub fn table() -> &'static SyscallTable {
    &TABLE
}
