// SPDX-License-Identifier: MIT OR Apache-2.0

//! Futex. The guest word lives in guest memory; translating it to a host
//! pointer lets guest threads block on and wake the very same kernel
//! futex queue, which is what makes pthread primitives inside the guest
//! work against each other.

use ponte_common::syscalls::{legacy32 as l, modern64 as m};
use ponte_common::{Abi, Endian};

use crate::dispatch::Call;
use crate::errno::{libc_result, Fault, SysResult};
use crate::ops::{host_buf_mut, opt_host_timespec};
use crate::table::{ArgAdapt, OperationSpec, SyscallTable};

static FUTEX: OperationSpec = OperationSpec::blocking_handler("futex", sys_futex);

pub(crate) fn register(t: &mut SyscallTable) {
    t.both(l::SYS_futex, m::SYS_futex, &FUTEX);
    t.legacy_adapted(l::SYS_futex_time64, &FUTEX, ArgAdapt::Wide);
}

/// The kernel compares the raw 32-bit cell against `val`. A big-endian
/// guest stores its futex words byte-swapped relative to the host's
/// read, so the comparison value must be swapped the same way.
fn futex_word(abi: Abi, val: u32) -> u32 {
    match abi.endian {
        Endian::Big => val.swap_bytes(),
        Endian::Little => val,
    }
}

fn sys_futex(call: &mut Call<'_>) -> SysResult {
    let uaddr = call.arg(0);
    let op = call.arg_i32(1);
    let val = call.arg(2) as u32;
    let cmd = op & !(libc::FUTEX_PRIVATE_FLAG | libc::FUTEX_CLOCK_REALTIME);
    let abi = call.abi;
    let uptr = host_buf_mut(call, uaddr, 4)?;

    match cmd {
        libc::FUTEX_WAIT | libc::FUTEX_WAIT_BITSET => {
            let tmo = opt_host_timespec(call, call.arg(3))?;
            let tmo_ptr = tmo
                .as_ref()
                .map_or(std::ptr::null(), |t| t as *const libc::timespec);
            let bitset = call.arg(5) as u32;
            libc_result(unsafe {
                libc::syscall(
                    libc::SYS_futex,
                    uptr,
                    op,
                    futex_word(abi, val),
                    tmo_ptr,
                    std::ptr::null_mut::<u32>(),
                    bitset,
                )
            })
        }
        libc::FUTEX_WAKE | libc::FUTEX_WAKE_BITSET => {
            // val is a waiter count here, never a cell value.
            let bitset = call.arg(5) as u32;
            libc_result(unsafe {
                libc::syscall(
                    libc::SYS_futex,
                    uptr,
                    op,
                    val,
                    std::ptr::null::<libc::timespec>(),
                    std::ptr::null_mut::<u32>(),
                    bitset,
                )
            })
        }
        libc::FUTEX_REQUEUE | libc::FUTEX_CMP_REQUEUE => {
            let val2 = call.arg(3) as u32;
            let uaddr2 = call.arg(4);
            let val3 = call.arg(5) as u32;
            let uptr2 = host_buf_mut(call, uaddr2, 4)?;
            libc_result(unsafe {
                libc::syscall(
                    libc::SYS_futex,
                    uptr,
                    op,
                    val,
                    val2 as usize,
                    uptr2,
                    futex_word(abi, val3),
                )
            })
        }
        // FUTEX_WAKE_OP mutates the second word with host-endian
        // arithmetic, which has no faithful mapping for a byte-swapped
        // cell; PI operations depend on host TIDs stored in the word.
        _ => Err(Fault::Unsupported),
    }
}
