// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal management. Masks re-encode between the guest's word layout
//! and the kernel's 64-bit set; sigaction structs re-encode field by
//! field. Handler and restorer addresses point into guest code and pass
//! through as opaque words; delivering a signal back into guest code is
//! the embedder's business.

use ponte_common::kernel_types::SigAction;
use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use crate::dispatch::Call;
use crate::errno::{libc_result, Fault, SysResult};
use crate::layout::{read_sigaction, write_sigaction};
use crate::marshal::{read_sigset, write_sigset};
use crate::table::{OperationSpec, SyscallTable};

/// Both epochs use the 64-bit rt sigset; any other size is a caller bug.
const SIGSET_BYTES: u64 = 8;

static RT_SIGACTION: OperationSpec = OperationSpec::handler("rt_sigaction", sys_rt_sigaction);
static RT_SIGPROCMASK: OperationSpec = OperationSpec::handler("rt_sigprocmask", sys_rt_sigprocmask);
static RT_SIGPENDING: OperationSpec = OperationSpec::handler("rt_sigpending", sys_rt_sigpending);

pub(crate) fn register(t: &mut SyscallTable) {
    t.both(l::SYS_rt_sigaction, m::SYS_rt_sigaction, &RT_SIGACTION);
    t.both(l::SYS_rt_sigprocmask, m::SYS_rt_sigprocmask, &RT_SIGPROCMASK);
    t.both(l::SYS_rt_sigpending, m::SYS_rt_sigpending, &RT_SIGPENDING);
}

/// The raw-syscall sigaction shape; libc's `sigaction` struct differs.
#[repr(C)]
#[derive(Default, Clone, Copy)]
struct KernelSigaction {
    handler: u64,
    flags: u64,
    restorer: u64,
    mask: u64,
}

fn sys_rt_sigaction(call: &mut Call<'_>) -> SysResult {
    let sig = call.arg_i32(0);
    let (act_addr, oact_addr) = (call.arg(1), call.arg(2));
    if call.arg(3) != SIGSET_BYTES {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let (abi, wide) = (call.abi, call.wide());

    let act = if act_addr == 0 {
        None
    } else {
        let sa = read_sigaction(call.mem, abi, wide, act_addr)?;
        Some(KernelSigaction {
            handler: sa.handler,
            flags: sa.flags,
            restorer: sa.restorer,
            mask: sa.mask,
        })
    };
    let mut old = KernelSigaction::default();
    let act_ptr = act
        .as_ref()
        .map_or(std::ptr::null(), |a| a as *const KernelSigaction);
    let old_ptr = if oact_addr == 0 {
        std::ptr::null_mut()
    } else {
        &mut old as *mut KernelSigaction
    };
    libc_result(unsafe {
        libc::syscall(libc::SYS_rt_sigaction, sig, act_ptr, old_ptr, SIGSET_BYTES)
    })?;
    if oact_addr != 0 {
        let sa = SigAction {
            handler: old.handler,
            flags: old.flags,
            restorer: old.restorer,
            mask: old.mask,
        };
        write_sigaction(call.mem, abi, wide, oact_addr, &sa)?;
    }
    Ok(0)
}

fn sys_rt_sigprocmask(call: &mut Call<'_>) -> SysResult {
    let how = call.arg_i32(0);
    let (set_addr, oldset_addr) = (call.arg(1), call.arg(2));
    if call.arg(3) != SIGSET_BYTES {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let abi = call.abi;

    let new: Option<u64> = if set_addr == 0 {
        None
    } else {
        Some(read_sigset(call.mem, abi, set_addr)?)
    };
    let mut old: u64 = 0;
    let new_ptr = new.as_ref().map_or(std::ptr::null(), |v| v as *const u64);
    let old_ptr = if oldset_addr == 0 {
        std::ptr::null_mut()
    } else {
        &mut old as *mut u64
    };
    libc_result(unsafe {
        libc::syscall(libc::SYS_rt_sigprocmask, how, new_ptr, old_ptr, SIGSET_BYTES)
    })?;
    if oldset_addr != 0 {
        write_sigset(call.mem, abi, oldset_addr, old)?;
    }
    Ok(0)
}

fn sys_rt_sigpending(call: &mut Call<'_>) -> SysResult {
    let set_addr = call.arg(0);
    if call.arg(1) != SIGSET_BYTES {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let abi = call.abi;
    let mut pending: u64 = 0;
    libc_result(unsafe {
        libc::syscall(libc::SYS_rt_sigpending, &mut pending as *mut u64, SIGSET_BYTES)
    })?;
    write_sigset(call.mem, abi, set_addr, pending)?;
    Ok(0)
}
