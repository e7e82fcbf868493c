// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dispatch loop body: number resolution, register adaptation, and
//! folding handler results into the epoch's return convention.

use std::ffi::CString;

use ponte_common::{Abi, Endian, ReturnConvention};

use crate::errno::{from_libc, Fault, SysResult};
use crate::marshal::read_cstring;
use crate::mem::GuestMem;
use crate::table::{table, ArgAdapt, OpKind};

/// What the embedder does with a finished call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Value for the guest's return register, errors already folded into
    /// the epoch's convention.
    Return(i64),
    /// The guest asked to terminate with this status. The host process
    /// is never exited on the guest's behalf.
    Exit(i32),
}

/// One in-flight call, as seen by a handler: the adapted argument
/// registers plus access to guest memory.
pub struct Call<'m> {
    pub abi: Abi,
    pub args: [u64; 6],
    pub mem: &'m mut dyn GuestMem,
    wide: bool,
}

impl Call<'_> {
    pub fn arg(&self, i: usize) -> u64 {
        self.args[i]
    }

    /// Argument as a signed int, truncating to the register's low half
    /// on a narrow epoch. Used for fds, pids, and flag words where
    /// negative sentinels like `AT_FDCWD` must survive.
    pub fn arg_i32(&self, i: usize) -> i32 {
        self.args[i] as i32
    }

    pub fn fd(&self, i: usize) -> i32 {
        self.arg_i32(i)
    }

    pub fn len(&self, i: usize) -> usize {
        self.args[i] as usize
    }

    /// Reads the NUL-terminated path the argument points at.
    pub fn path(&self, i: usize) -> Result<CString, Fault> {
        read_cstring(self.mem, self.args[i])
    }

    /// Whether struct arguments use the wide layouts: always on a wide
    /// epoch, and on a narrow one when the number is a `*64` alias.
    pub fn wide(&self) -> bool {
        self.wide
    }
}

pub struct Dispatcher {
    abi: Abi,
}

impl Dispatcher {
    pub fn new(abi: Abi) -> Self {
        Self { abi }
    }

    pub fn abi(&self) -> Abi {
        self.abi
    }

    /// Runs one guest syscall to completion.
    pub fn dispatch(&self, mem: &mut dyn GuestMem, nr: u32, args: [u64; 6]) -> Outcome {
        let Some(entry) = table().resolve(self.abi.epoch, nr) else {
            log::warn!("unknown syscall {nr} for {:?}", self.abi.epoch);
            return self.fold(Err(Fault::Unsupported));
        };

        let (args, wide) = adapt_args(self.abi, args, entry.adapt);
        log::trace!("{}({:#x?})", entry.spec.name, &args);

        match entry.spec.kind {
            OpKind::Exit => Outcome::Exit(args[0] as i32),
            OpKind::Passthrough { nr, args: argc } => {
                self.fold(passthrough(self.abi, nr, &args, argc))
            }
            OpKind::Handler(f) => {
                let mut call = Call {
                    abi: self.abi,
                    args,
                    mem,
                    wide,
                };
                let result = f(&mut call);
                if let Err(fault) = &result {
                    log::debug!("{} failed: {fault}", entry.spec.name);
                }
                self.fold(result)
            }
        }
    }

    /// Folds a handler result into the epoch's return convention.
    fn fold(&self, result: SysResult) -> Outcome {
        match (result, self.abi.return_convention()) {
            (Ok(v), _) => Outcome::Return(v),
            (Err(fault), ReturnConvention::NegatedErrno) => {
                Outcome::Return(-(fault.guest_errno() as i64))
            }
            (Err(fault), ReturnConvention::ErrnoSlot) => {
                // The errno travels in the return register here too; an
                // epoch using a real out-of-band slot would write it to
                // guest state instead.
                Outcome::Return(fault.guest_errno() as i64)
            }
        }
    }
}

/// Applies the entry's register adaptation: folds hi/lo pairs and
/// resolves the wide-layout flag.
fn adapt_args(abi: Abi, mut args: [u64; 6], adapt: ArgAdapt) -> ([u64; 6], bool) {
    match adapt {
        ArgAdapt::None => (args, abi.is_wide()),
        ArgAdapt::Wide => (args, true),
        ArgAdapt::PairAt(i) => {
            // Register pair order follows the epoch's endianness: the
            // big-endian epoch passes the high half first.
            let folded = match abi.endian {
                Endian::Big => (args[i] << 32) | (args[i + 1] & 0xffff_ffff),
                Endian::Little => (args[i + 1] << 32) | (args[i] & 0xffff_ffff),
            };
            args[i] = folded;
            for j in i + 1..5 {
                args[j] = args[j + 1];
            }
            args[5] = 0;
            (args, abi.is_wide())
        }
    }
}

/// Forwards scalar-only operations straight to the host. Narrow-epoch
/// registers are sign-extended so negative fds and offsets survive the
/// widening.
fn passthrough(abi: Abi, nr: libc::c_long, args: &[u64; 6], argc: u8) -> SysResult {
    let a: Vec<libc::c_long> = args
        .iter()
        .map(|&v| {
            if abi.is_wide() {
                v as libc::c_long
            } else {
                v as u32 as i32 as libc::c_long
            }
        })
        .collect();

    let ret = unsafe {
        match argc {
            0 => libc::syscall(nr),
            1 => libc::syscall(nr, a[0]),
            2 => libc::syscall(nr, a[0], a[1]),
            3 => libc::syscall(nr, a[0], a[1], a[2]),
            4 => libc::syscall(nr, a[0], a[1], a[2], a[3]),
            5 => libc::syscall(nr, a[0], a[1], a[2], a[3], a[4]),
            _ => libc::syscall(nr, a[0], a[1], a[2], a[3], a[4], a[5]),
        }
    };

    let ret = from_libc(ret);
    if ret < 0 {
        Err(Fault::Errno(-ret as i32))
    } else {
        Ok(ret)
    }
}
