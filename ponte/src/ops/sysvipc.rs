// SPDX-License-Identifier: MIT OR Apache-2.0

//! SysV IPC: semaphores and message queues, reachable directly on the
//! unified numbering and through the legacy `ipc()` multiplexer.
//!
//! Message types are a guest `long`, so the narrow epoch's 32-bit mtype
//! is widened into the host's 64-bit slot on send and narrowed back on
//! receive. Shared-memory attach/detach is address-space management and
//! stays with the embedder.

use ponte_common::kernel_types::ipc_call;
use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use crate::dispatch::Call;
use crate::errno::{libc_result, Fault, SysResult};
use crate::marshal::{read_u16, read_word, write_word};
use crate::mem::GuestMem;
use crate::ops::opt_host_timespec;
use crate::table::{OperationSpec, SyscallTable};

/// Kernel SEMOPM: most sops per semop call.
const SEMOPM: usize = 500;
/// Sanity bound on message payloads before the host allocation; the
/// kernel's own MSGMAX is far below this.
const MSG_MAX: usize = 1 << 20;

static IPC: OperationSpec = OperationSpec::blocking_handler("ipc", sys_ipc);
static SEMGET: OperationSpec = OperationSpec::passthrough("semget", libc::SYS_semget, 3);
static SEMOP: OperationSpec = OperationSpec::blocking_handler("semop", sys_semop);
static SEMTIMEDOP: OperationSpec = OperationSpec::blocking_handler("semtimedop", sys_semtimedop);
static SEMCTL: OperationSpec = OperationSpec::handler("semctl", sys_semctl);
static MSGGET: OperationSpec = OperationSpec::passthrough("msgget", libc::SYS_msgget, 2);
static MSGSND: OperationSpec = OperationSpec::blocking_handler("msgsnd", sys_msgsnd);
static MSGRCV: OperationSpec = OperationSpec::blocking_handler("msgrcv", sys_msgrcv);
static MSGCTL: OperationSpec = OperationSpec::handler("msgctl", sys_msgctl);
static SHMGET: OperationSpec = OperationSpec::passthrough("shmget", libc::SYS_shmget, 3);
static SHMCTL: OperationSpec = OperationSpec::handler("shmctl", sys_shmctl);

pub(crate) fn register(t: &mut SyscallTable) {
    t.legacy(l::SYS_ipc, &IPC);
    t.both(l::SYS_semget, m::SYS_semget, &SEMGET);
    t.both(l::SYS_semctl, m::SYS_semctl, &SEMCTL);
    t.both(l::SYS_msgget, m::SYS_msgget, &MSGGET);
    t.both(l::SYS_msgsnd, m::SYS_msgsnd, &MSGSND);
    t.both(l::SYS_msgrcv, m::SYS_msgrcv, &MSGRCV);
    t.both(l::SYS_msgctl, m::SYS_msgctl, &MSGCTL);
    t.both(l::SYS_shmget, m::SYS_shmget, &SHMGET);
    t.both(l::SYS_shmctl, m::SYS_shmctl, &SHMCTL);
    t.modern(m::SYS_semop, &SEMOP);
    t.modern(m::SYS_semtimedop, &SEMTIMEDOP);
}

/// The legacy single-number entry: `ipc(call, first, second, third, ptr,
/// fifth)`, rearranged into the direct argument orders.
fn sys_ipc(call: &mut Call<'_>) -> SysResult {
    let which = (call.arg(0) & 0xffff) as u32;
    let (first, second, third) = (call.arg(1), call.arg(2), call.arg(3));
    let (ptr, fifth) = (call.arg(4), call.arg(5));

    match which {
        ipc_call::SEMOP => do_semop(call, first as i32, ptr, second as usize, 0),
        ipc_call::SEMTIMEDOP => do_semop(call, first as i32, ptr, second as usize, fifth),
        ipc_call::SEMGET => libc_result(unsafe {
            libc::semget(first as i32 as libc::key_t, second as i32, third as i32)
        } as i64),
        // ptr points at the semun union value, one extra indirection
        // compared to the direct call.
        ipc_call::SEMCTL => {
            let arg = read_word(call.mem, call.abi, ptr)?;
            do_semctl(first as i32, second as i32, third as i32, arg)
        }
        ipc_call::MSGSND => do_msgsnd(call, first as i32, ptr, second as usize, third as i32),
        ipc_call::MSGRCV => do_msgrcv(
            call,
            first as i32,
            ptr,
            second as usize,
            fifth as i32 as i64,
            third as i32,
        ),
        ipc_call::MSGGET => libc_result(unsafe {
            libc::msgget(first as i32 as libc::key_t, second as i32)
        } as i64),
        ipc_call::MSGCTL => do_msgctl(first as i32, second as i32),
        ipc_call::SHMGET => libc_result(unsafe {
            libc::shmget(first as i32 as libc::key_t, second as usize, third as i32)
        } as i64),
        ipc_call::SHMCTL => do_shmctl(first as i32, second as i32),
        // Attach and detach map guest address space; the embedder owns
        // that.
        ipc_call::SHMAT | ipc_call::SHMDT => Err(Fault::Unsupported),
        _ => Err(Fault::Unsupported),
    }
}

/// Guest sembuf entries are packed (num u16, op i16, flg i16), same
/// shape as the host's; only byte order needs fixing.
fn read_sembufs(call: &Call<'_>, addr: u64, nsops: usize) -> Result<Vec<libc::sembuf>, Fault> {
    if nsops > SEMOPM {
        return Err(Fault::Errno(libc::E2BIG));
    }
    let mut sops = Vec::with_capacity(nsops);
    for i in 0..nsops {
        let base = addr + i as u64 * 6;
        sops.push(libc::sembuf {
            sem_num: read_u16(call.mem, call.abi, base)?,
            sem_op: read_u16(call.mem, call.abi, base + 2)? as i16,
            sem_flg: read_u16(call.mem, call.abi, base + 4)? as i16,
        });
    }
    Ok(sops)
}

fn do_semop(
    call: &mut Call<'_>,
    semid: i32,
    sops_addr: u64,
    nsops: usize,
    tmo_addr: u64,
) -> SysResult {
    let mut sops = read_sembufs(call, sops_addr, nsops)?;
    let tmo = opt_host_timespec(call, tmo_addr)?;
    let tmo_ptr = tmo
        .as_ref()
        .map_or(std::ptr::null(), |t| t as *const libc::timespec);
    libc_result(unsafe {
        libc::syscall(libc::SYS_semtimedop, semid, sops.as_mut_ptr(), nsops, tmo_ptr)
    })
}

fn sys_semop(call: &mut Call<'_>) -> SysResult {
    let (semid, addr, nsops) = (call.arg_i32(0), call.arg(1), call.len(2));
    do_semop(call, semid, addr, nsops, 0)
}

fn sys_semtimedop(call: &mut Call<'_>) -> SysResult {
    let (semid, addr, nsops, tmo) = (call.arg_i32(0), call.arg(1), call.len(2), call.arg(3));
    do_semop(call, semid, addr, nsops, tmo)
}

fn do_semctl(semid: i32, semnum: i32, cmd: i32, arg: u64) -> SysResult {
    // IPC_64 requests the modern struct encoding; irrelevant for the
    // scalar commands supported here.
    match cmd & !0x100 {
        libc::IPC_RMID | libc::GETVAL | libc::GETPID | libc::GETNCNT | libc::GETZCNT
        | libc::SETVAL => libc_result(unsafe {
            libc::syscall(libc::SYS_semctl, semid, semnum, cmd, arg)
        }),
        // The struct commands need semid_ds marshaling that no supported
        // guest currently exercises.
        _ => Err(Fault::Unsupported),
    }
}

fn sys_semctl(call: &mut Call<'_>) -> SysResult {
    let (semid, semnum, cmd, arg) = (
        call.arg_i32(0),
        call.arg_i32(1),
        call.arg_i32(2),
        call.arg(3),
    );
    do_semctl(semid, semnum, cmd, arg)
}

fn guest_mtype_width(call: &Call<'_>) -> u64 {
    call.abi.width.bytes() as u64
}

fn do_msgsnd(call: &mut Call<'_>, msqid: i32, msgp: u64, msgsz: usize, msgflg: i32) -> SysResult {
    if msgsz > MSG_MAX {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let mtype_width = guest_mtype_width(call);
    let mtype = if call.abi.is_wide() {
        read_word(call.mem, call.abi, msgp)? as i64
    } else {
        read_word(call.mem, call.abi, msgp)? as u32 as i32 as i64
    };

    // Host msgbuf: 64-bit mtype followed by the payload.
    let mut buf = vec![0u8; 8 + msgsz];
    buf[..8].copy_from_slice(&mtype.to_ne_bytes());
    call.mem.read(msgp + mtype_width, &mut buf[8..])?;

    libc_result(unsafe {
        libc::msgsnd(msqid, buf.as_ptr() as *const libc::c_void, msgsz, msgflg)
    } as i64)
}

fn do_msgrcv(
    call: &mut Call<'_>,
    msqid: i32,
    msgp: u64,
    msgsz: usize,
    msgtyp: i64,
    msgflg: i32,
) -> SysResult {
    if msgsz > MSG_MAX {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let mut buf = vec![0u8; 8 + msgsz];
    let received = libc_result(unsafe {
        libc::msgrcv(msqid, buf.as_mut_ptr() as *mut libc::c_void, msgsz, msgtyp, msgflg)
    } as i64)?;

    let mtype = i64::from_ne_bytes(buf[..8].try_into().unwrap_or([0; 8]));
    let mtype_width = guest_mtype_width(call);
    let abi = call.abi;
    write_word(call.mem, abi, msgp, mtype as u64)?;
    call.mem
        .write(msgp + mtype_width, &buf[8..8 + received as usize])?;
    Ok(received)
}

fn sys_msgsnd(call: &mut Call<'_>) -> SysResult {
    let (msqid, msgp, msgsz, msgflg) =
        (call.arg_i32(0), call.arg(1), call.len(2), call.arg_i32(3));
    do_msgsnd(call, msqid, msgp, msgsz, msgflg)
}

fn sys_msgrcv(call: &mut Call<'_>) -> SysResult {
    let (msqid, msgp, msgsz) = (call.arg_i32(0), call.arg(1), call.len(2));
    let msgtyp = if call.abi.is_wide() {
        call.arg(3) as i64
    } else {
        call.arg_i32(3) as i64
    };
    let msgflg = call.arg_i32(4);
    do_msgrcv(call, msqid, msgp, msgsz, msgtyp, msgflg)
}

fn do_msgctl(msqid: i32, cmd: i32) -> SysResult {
    match cmd & !0x100 {
        libc::IPC_RMID => {
            libc_result(unsafe { libc::msgctl(msqid, libc::IPC_RMID, std::ptr::null_mut()) }
                as i64)
        }
        _ => Err(Fault::Unsupported),
    }
}

fn sys_msgctl(call: &mut Call<'_>) -> SysResult {
    do_msgctl(call.arg_i32(0), call.arg_i32(1))
}

fn do_shmctl(shmid: i32, cmd: i32) -> SysResult {
    match cmd & !0x100 {
        libc::IPC_RMID => {
            libc_result(unsafe { libc::shmctl(shmid, libc::IPC_RMID, std::ptr::null_mut()) }
                as i64)
        }
        _ => Err(Fault::Unsupported),
    }
}

fn sys_shmctl(call: &mut Call<'_>) -> SysResult {
    do_shmctl(call.arg_i32(0), call.arg_i32(1))
}
