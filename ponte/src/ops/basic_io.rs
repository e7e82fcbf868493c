// SPDX-License-Identifier: MIT OR Apache-2.0

//! File descriptor I/O: read/write and their positioned and vectored
//! variants, open paths, pipes, dup, directory enumeration.

use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use crate::dispatch::Call;
use crate::errno::{libc_result, Fault, SysResult};
use crate::layout::{read_open_how, OPEN_HOW};
use crate::marshal::{read_iovecs, read_u32, read_u64, write_u32, write_u64};
use crate::ops::{host_buf, host_buf_mut, open_flags_to_host};
use crate::table::{ArgAdapt, OperationSpec, SyscallTable};

/// Linux's UIO_MAXIOV; larger vectors are rejected before any marshaling.
const IOV_MAX: usize = 1024;

static READ: OperationSpec = OperationSpec::blocking_handler("read", sys_read);
static WRITE: OperationSpec = OperationSpec::blocking_handler("write", sys_write);
static READV: OperationSpec = OperationSpec::blocking_handler("readv", sys_readv);
static WRITEV: OperationSpec = OperationSpec::blocking_handler("writev", sys_writev);
static PREAD64: OperationSpec = OperationSpec::blocking_handler("pread64", sys_pread64);
static PWRITE64: OperationSpec = OperationSpec::blocking_handler("pwrite64", sys_pwrite64);
static LSEEK: OperationSpec = OperationSpec::handler("lseek", sys_lseek);
static LLSEEK: OperationSpec = OperationSpec::handler("_llseek", sys_llseek);
static OPEN: OperationSpec = OperationSpec::blocking_handler("open", sys_open);
static CREAT: OperationSpec = OperationSpec::blocking_handler("creat", sys_creat);
static OPENAT: OperationSpec = OperationSpec::blocking_handler("openat", sys_openat);
static OPENAT2: OperationSpec = OperationSpec::blocking_handler("openat2", sys_openat2);
static CLOSE: OperationSpec = OperationSpec::passthrough("close", libc::SYS_close, 1);
static DUP: OperationSpec = OperationSpec::passthrough("dup", libc::SYS_dup, 1);
static DUP2: OperationSpec = OperationSpec::passthrough("dup2", libc::SYS_dup2, 2);
static DUP3: OperationSpec = OperationSpec::passthrough("dup3", libc::SYS_dup3, 3);
static PIPE: OperationSpec = OperationSpec::handler("pipe", sys_pipe);
static PIPE2: OperationSpec = OperationSpec::handler("pipe2", sys_pipe2);
static SENDFILE: OperationSpec = OperationSpec::blocking_handler("sendfile", sys_sendfile);
static GETDENTS64: OperationSpec = OperationSpec::handler("getdents64", sys_getdents64);
static EVENTFD: OperationSpec = OperationSpec::passthrough("eventfd", libc::SYS_eventfd, 1);
static EVENTFD2: OperationSpec = OperationSpec::passthrough("eventfd2", libc::SYS_eventfd2, 2);

pub(crate) fn register(t: &mut SyscallTable) {
    t.both(l::SYS_read, m::SYS_read, &READ);
    t.both(l::SYS_write, m::SYS_write, &WRITE);
    t.both(l::SYS_readv, m::SYS_readv, &READV);
    t.both(l::SYS_writev, m::SYS_writev, &WRITEV);
    t.both(l::SYS_lseek, m::SYS_lseek, &LSEEK);
    t.both(l::SYS_open, m::SYS_open, &OPEN);
    t.both(l::SYS_creat, m::SYS_creat, &CREAT);
    t.both(l::SYS_openat, m::SYS_openat, &OPENAT);
    t.both(l::SYS_openat2, m::SYS_openat2, &OPENAT2);
    t.both(l::SYS_close, m::SYS_close, &CLOSE);
    t.both(l::SYS_dup, m::SYS_dup, &DUP);
    t.both(l::SYS_dup2, m::SYS_dup2, &DUP2);
    t.both(l::SYS_dup3, m::SYS_dup3, &DUP3);
    t.both(l::SYS_pipe, m::SYS_pipe, &PIPE);
    t.both(l::SYS_pipe2, m::SYS_pipe2, &PIPE2);
    t.both(l::SYS_sendfile, m::SYS_sendfile, &SENDFILE);
    t.both(l::SYS_getdents64, m::SYS_getdents64, &GETDENTS64);
    t.both(l::SYS_eventfd, m::SYS_eventfd, &EVENTFD);
    t.both(l::SYS_eventfd2, m::SYS_eventfd2, &EVENTFD2);

    // The narrow epoch splits 64-bit file offsets across register pairs.
    t.legacy_adapted(l::SYS_pread64, &PREAD64, ArgAdapt::PairAt(3));
    t.legacy_adapted(l::SYS_pwrite64, &PWRITE64, ArgAdapt::PairAt(3));
    t.modern(m::SYS_pread64, &PREAD64);
    t.modern(m::SYS_pwrite64, &PWRITE64);

    // Narrow-only spellings.
    t.legacy(l::SYS__llseek, &LLSEEK);
    t.legacy_adapted(l::SYS_sendfile64, &SENDFILE, ArgAdapt::Wide);
}

fn sys_read(call: &mut Call<'_>) -> SysResult {
    let (fd, addr, len) = (call.fd(0), call.arg(1), call.len(2));
    let buf = host_buf_mut(call, addr, len)?;
    libc_result(unsafe { libc::read(fd, buf as *mut libc::c_void, len) } as i64)
}

fn sys_write(call: &mut Call<'_>) -> SysResult {
    let (fd, addr, len) = (call.fd(0), call.arg(1), call.len(2));
    let buf = host_buf(call, addr, len)?;
    libc_result(unsafe { libc::write(fd, buf as *const libc::c_void, len) } as i64)
}

fn sys_readv(call: &mut Call<'_>) -> SysResult {
    let (fd, base, count) = (call.fd(0), call.arg(1), call.len(2));
    if count > IOV_MAX {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let iov = read_iovecs(call.mem, call.abi, base, count, true)?;
    libc_result(unsafe { libc::readv(fd, iov.as_ptr(), count as libc::c_int) } as i64)
}

fn sys_writev(call: &mut Call<'_>) -> SysResult {
    let (fd, base, count) = (call.fd(0), call.arg(1), call.len(2));
    if count > IOV_MAX {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let iov = read_iovecs(call.mem, call.abi, base, count, false)?;
    libc_result(unsafe { libc::writev(fd, iov.as_ptr(), count as libc::c_int) } as i64)
}

fn sys_pread64(call: &mut Call<'_>) -> SysResult {
    let (fd, addr, len) = (call.fd(0), call.arg(1), call.len(2));
    let offset = call.arg(3) as i64;
    let buf = host_buf_mut(call, addr, len)?;
    libc_result(unsafe {
        libc::pread(fd, buf as *mut libc::c_void, len, offset as libc::off_t)
    } as i64)
}

fn sys_pwrite64(call: &mut Call<'_>) -> SysResult {
    let (fd, addr, len) = (call.fd(0), call.arg(1), call.len(2));
    let offset = call.arg(3) as i64;
    let buf = host_buf(call, addr, len)?;
    libc_result(unsafe {
        libc::pwrite(fd, buf as *const libc::c_void, len, offset as libc::off_t)
    } as i64)
}

fn sys_lseek(call: &mut Call<'_>) -> SysResult {
    // The narrow off_t is a signed 32-bit register; widen with sign.
    let offset = if call.wide() {
        call.arg(1) as i64
    } else {
        call.arg_i32(1) as i64
    };
    libc_result(unsafe { libc::lseek(call.fd(0), offset, call.arg_i32(2)) })
}

/// The narrow epoch's way to seek past 4 GiB: hi/lo halves in, a 64-bit
/// result written through a pointer, zero returned.
fn sys_llseek(call: &mut Call<'_>) -> SysResult {
    let fd = call.fd(0);
    let offset = ((call.arg(1) << 32) | (call.arg(2) & 0xffff_ffff)) as i64;
    let result_addr = call.arg(3);
    let whence = call.arg_i32(4);

    let pos = libc_result(unsafe { libc::lseek(fd, offset, whence) })?;
    write_u64(call.mem, call.abi, result_addr, pos as u64)?;
    Ok(0)
}

fn sys_open(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    let flags = open_flags_to_host(call.abi, call.arg_i32(1));
    let mode = call.arg(2) as libc::mode_t;
    libc_result(unsafe { libc::open(path.as_ptr(), flags, mode) } as i64)
}

fn sys_creat(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    let mode = call.arg(1) as libc::mode_t;
    libc_result(unsafe { libc::creat(path.as_ptr(), mode) } as i64)
}

fn sys_openat(call: &mut Call<'_>) -> SysResult {
    let dirfd = call.fd(0);
    let path = call.path(1)?;
    let flags = open_flags_to_host(call.abi, call.arg_i32(2));
    let mode = call.arg(3) as libc::mode_t;
    libc_result(unsafe { libc::openat(dirfd, path.as_ptr(), flags, mode) } as i64)
}

fn sys_openat2(call: &mut Call<'_>) -> SysResult {
    let dirfd = call.fd(0);
    let path = call.path(1)?;
    let size = call.len(3);
    if size < OPEN_HOW.size {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let mut how = read_open_how(call.mem, call.abi, call.arg(2))?;
    how.flags = open_flags_to_host(call.abi, how.flags as i32) as u64;

    #[repr(C)]
    struct RawOpenHow {
        flags: u64,
        mode: u64,
        resolve: u64,
    }
    let raw = RawOpenHow {
        flags: how.flags,
        mode: how.mode,
        resolve: how.resolve,
    };
    libc_result(unsafe {
        libc::syscall(
            libc::SYS_openat2,
            dirfd,
            path.as_ptr(),
            &raw as *const RawOpenHow,
            std::mem::size_of::<RawOpenHow>(),
        )
    })
}

fn sys_pipe(call: &mut Call<'_>) -> SysResult {
    do_pipe(call, 0)
}

fn sys_pipe2(call: &mut Call<'_>) -> SysResult {
    let flags = open_flags_to_host(call.abi, call.arg_i32(1));
    do_pipe(call, flags)
}

fn do_pipe(call: &mut Call<'_>, flags: i32) -> SysResult {
    let mut fds = [0 as libc::c_int; 2];
    libc_result(unsafe { libc::pipe2(fds.as_mut_ptr(), flags) } as i64)?;
    let addr = call.arg(0);
    write_u32(call.mem, call.abi, addr, fds[0] as u32)?;
    write_u32(call.mem, call.abi, addr + 4, fds[1] as u32)?;
    Ok(0)
}

fn sys_sendfile(call: &mut Call<'_>) -> SysResult {
    let (out_fd, in_fd) = (call.fd(0), call.fd(1));
    let off_addr = call.arg(2);
    let count = call.len(3);

    if off_addr == 0 {
        return libc_result(unsafe {
            libc::sendfile(out_fd, in_fd, std::ptr::null_mut(), count)
        } as i64);
    }

    let mut offset: libc::off_t = if call.wide() {
        read_u64(call.mem, call.abi, off_addr)? as i64
    } else {
        read_u32(call.mem, call.abi, off_addr)? as i32 as i64
    };
    let sent = libc_result(unsafe { libc::sendfile(out_fd, in_fd, &mut offset, count) } as i64);
    // The kernel updates the offset even on a short transfer.
    if call.wide() {
        write_u64(call.mem, call.abi, off_addr, offset as u64)?;
    } else {
        write_u32(call.mem, call.abi, off_addr, offset as u32)?;
    }
    sent
}

/// The 64-bit dirent format is identical across every Linux ABI, records
/// included, so the buffer passes through untouched.
fn sys_getdents64(call: &mut Call<'_>) -> SysResult {
    let (fd, addr, len) = (call.fd(0), call.arg(1), call.len(2));
    let buf = host_buf_mut(call, addr, len)?;
    libc_result(unsafe { libc::syscall(libc::SYS_getdents64, fd, buf, len) })
}
