// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sockets. Payload bytes move through host pointers untouched; sockaddr
//! buffers need exactly one correction: `sa_family` is a host-order u16
//! while the body (port, address) is already network order in every
//! epoch.

use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use crate::dispatch::Call;
use crate::errno::{libc_result, Fault, SysResult};
use crate::marshal::{read_u16, read_u32, write_u16, write_u32};
use crate::mem::GuestMem;
use crate::ops::{host_buf, host_buf_mut};
use crate::table::{OperationSpec, SyscallTable};

/// sizeof(struct sockaddr_storage).
const SOCKADDR_MAX: usize = 128;
/// Upper bound on socket option values; SO_PEERSEC labels stay under it.
const OPTVAL_MAX: usize = 1024;

static SOCKET: OperationSpec = OperationSpec::passthrough("socket", libc::SYS_socket, 3);
static SOCKETPAIR: OperationSpec = OperationSpec::handler("socketpair", sys_socketpair);
static BIND: OperationSpec = OperationSpec::handler("bind", sys_bind);
static CONNECT: OperationSpec = OperationSpec::blocking_handler("connect", sys_connect);
static LISTEN: OperationSpec = OperationSpec::passthrough("listen", libc::SYS_listen, 2);
static ACCEPT: OperationSpec = OperationSpec::blocking_handler("accept", sys_accept);
static ACCEPT4: OperationSpec = OperationSpec::blocking_handler("accept4", sys_accept4);
static GETSOCKNAME: OperationSpec = OperationSpec::handler("getsockname", sys_getsockname);
static GETPEERNAME: OperationSpec = OperationSpec::handler("getpeername", sys_getpeername);
static GETSOCKOPT: OperationSpec = OperationSpec::handler("getsockopt", sys_getsockopt);
static SETSOCKOPT: OperationSpec = OperationSpec::handler("setsockopt", sys_setsockopt);
static SENDTO: OperationSpec = OperationSpec::blocking_handler("sendto", sys_sendto);
static RECVFROM: OperationSpec = OperationSpec::blocking_handler("recvfrom", sys_recvfrom);
static SHUTDOWN: OperationSpec = OperationSpec::passthrough("shutdown", libc::SYS_shutdown, 2);

pub(crate) fn register(t: &mut SyscallTable) {
    t.both(l::SYS_socket, m::SYS_socket, &SOCKET);
    t.both(l::SYS_socketpair, m::SYS_socketpair, &SOCKETPAIR);
    t.both(l::SYS_bind, m::SYS_bind, &BIND);
    t.both(l::SYS_connect, m::SYS_connect, &CONNECT);
    t.both(l::SYS_listen, m::SYS_listen, &LISTEN);
    t.both(l::SYS_accept4, m::SYS_accept4, &ACCEPT4);
    // The legacy numbering never grew a plain accept.
    t.modern(m::SYS_accept, &ACCEPT);
    t.both(l::SYS_getsockname, m::SYS_getsockname, &GETSOCKNAME);
    t.both(l::SYS_getpeername, m::SYS_getpeername, &GETPEERNAME);
    t.both(l::SYS_getsockopt, m::SYS_getsockopt, &GETSOCKOPT);
    t.both(l::SYS_setsockopt, m::SYS_setsockopt, &SETSOCKOPT);
    t.both(l::SYS_sendto, m::SYS_sendto, &SENDTO);
    t.both(l::SYS_recvfrom, m::SYS_recvfrom, &RECVFROM);
    t.both(l::SYS_shutdown, m::SYS_shutdown, &SHUTDOWN);
}

/// Decode a guest sockaddr into host bytes: only the family word is
/// re-encoded.
fn read_sockaddr(call: &Call<'_>, addr: u64, len: usize) -> Result<Vec<u8>, Fault> {
    if len < 2 || len > SOCKADDR_MAX {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let mut buf = vec![0u8; len];
    call.mem.read(addr, &mut buf)?;
    let family = read_u16(call.mem, call.abi, addr)?;
    buf[..2].copy_from_slice(&family.to_ne_bytes());
    Ok(buf)
}

fn write_sockaddr(call: &mut Call<'_>, addr: u64, buf: &[u8]) -> Result<(), Fault> {
    let abi = call.abi;
    call.mem.write(addr, buf)?;
    if buf.len() >= 2 {
        let family = u16::from_ne_bytes([buf[0], buf[1]]);
        write_u16(call.mem, abi, addr, family)?;
    }
    Ok(())
}

fn sys_socketpair(call: &mut Call<'_>) -> SysResult {
    let (domain, ty, protocol) = (call.arg_i32(0), call.arg_i32(1), call.arg_i32(2));
    let sv_addr = call.arg(3);
    let abi = call.abi;
    let mut sv = [0i32; 2];
    libc_result(unsafe { libc::socketpair(domain, ty, protocol, sv.as_mut_ptr()) } as i64)?;
    write_u32(call.mem, abi, sv_addr, sv[0] as u32)?;
    write_u32(call.mem, abi, sv_addr + 4, sv[1] as u32)?;
    Ok(0)
}

fn do_sockaddr_call(call: &mut Call<'_>, nr: libc::c_long) -> SysResult {
    let (fd, addr, len) = (call.fd(0), call.arg(1), call.len(2));
    let sa = read_sockaddr(call, addr, len)?;
    libc_result(unsafe { libc::syscall(nr, fd, sa.as_ptr(), len as libc::socklen_t) })
}

fn sys_bind(call: &mut Call<'_>) -> SysResult {
    do_sockaddr_call(call, libc::SYS_bind)
}

fn sys_connect(call: &mut Call<'_>) -> SysResult {
    do_sockaddr_call(call, libc::SYS_connect)
}

fn do_accept(call: &mut Call<'_>, flags: i32) -> SysResult {
    let (fd, addr, len_addr) = (call.fd(0), call.arg(1), call.arg(2));
    let abi = call.abi;
    if addr == 0 {
        return libc_result(unsafe {
            libc::syscall(
                libc::SYS_accept4,
                fd,
                std::ptr::null_mut::<u8>(),
                std::ptr::null_mut::<libc::socklen_t>(),
                flags,
            )
        });
    }
    let guest_len = read_u32(call.mem, abi, len_addr)? as usize;
    let mut storage = [0u8; SOCKADDR_MAX];
    let mut host_len = SOCKADDR_MAX as libc::socklen_t;
    let accepted = libc_result(unsafe {
        libc::syscall(libc::SYS_accept4, fd, storage.as_mut_ptr(), &mut host_len, flags)
    })?;
    // The guest sees its buffer's worth; the full length is reported so a
    // truncated address is detectable.
    let copy = (host_len as usize).min(guest_len).min(SOCKADDR_MAX);
    write_sockaddr(call, addr, &storage[..copy])?;
    write_u32(call.mem, abi, len_addr, host_len as u32)?;
    Ok(accepted)
}

fn sys_accept(call: &mut Call<'_>) -> SysResult {
    do_accept(call, 0)
}

fn sys_accept4(call: &mut Call<'_>) -> SysResult {
    let flags = call.arg_i32(3);
    do_accept(call, flags)
}

fn do_sockname(call: &mut Call<'_>, nr: libc::c_long) -> SysResult {
    let (fd, addr, len_addr) = (call.fd(0), call.arg(1), call.arg(2));
    let abi = call.abi;
    let guest_len = read_u32(call.mem, abi, len_addr)? as usize;
    let mut storage = [0u8; SOCKADDR_MAX];
    let mut host_len = SOCKADDR_MAX as libc::socklen_t;
    libc_result(unsafe { libc::syscall(nr, fd, storage.as_mut_ptr(), &mut host_len) })?;
    let copy = (host_len as usize).min(guest_len).min(SOCKADDR_MAX);
    write_sockaddr(call, addr, &storage[..copy])?;
    write_u32(call.mem, abi, len_addr, host_len as u32)?;
    Ok(0)
}

fn sys_getsockname(call: &mut Call<'_>) -> SysResult {
    do_sockname(call, libc::SYS_getsockname)
}

fn sys_getpeername(call: &mut Call<'_>) -> SysResult {
    do_sockname(call, libc::SYS_getpeername)
}

fn sys_getsockopt(call: &mut Call<'_>) -> SysResult {
    let (fd, level, optname) = (call.fd(0), call.arg_i32(1), call.arg_i32(2));
    let (optval_addr, optlen_addr) = (call.arg(3), call.arg(4));
    let abi = call.abi;
    let guest_len = read_u32(call.mem, abi, optlen_addr)? as usize;
    if guest_len > OPTVAL_MAX {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let mut buf = vec![0u8; guest_len];
    let mut host_len = guest_len as libc::socklen_t;
    libc_result(unsafe {
        libc::getsockopt(
            fd,
            level,
            optname,
            buf.as_mut_ptr() as *mut libc::c_void,
            &mut host_len,
        )
    } as i64)?;
    // A 4-byte value is an int and re-encodes; anything else is an opaque
    // option-specific blob.
    if host_len == 4 {
        let v = u32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]);
        write_u32(call.mem, abi, optval_addr, v)?;
    } else {
        call.mem.write(optval_addr, &buf[..host_len as usize])?;
    }
    write_u32(call.mem, abi, optlen_addr, host_len as u32)?;
    Ok(0)
}

fn sys_setsockopt(call: &mut Call<'_>) -> SysResult {
    let (fd, level, optname) = (call.fd(0), call.arg_i32(1), call.arg_i32(2));
    let (optval_addr, optlen) = (call.arg(3), call.len(4));
    if optlen > OPTVAL_MAX {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let mut buf = vec![0u8; optlen];
    call.mem.read(optval_addr, &mut buf)?;
    if optlen == 4 {
        let v = read_u32(call.mem, call.abi, optval_addr)?;
        buf.copy_from_slice(&v.to_ne_bytes());
    }
    libc_result(unsafe {
        libc::setsockopt(
            fd,
            level,
            optname,
            buf.as_ptr() as *const libc::c_void,
            optlen as libc::socklen_t,
        )
    } as i64)
}

fn sys_sendto(call: &mut Call<'_>) -> SysResult {
    let (fd, buf_addr, len, flags) = (call.fd(0), call.arg(1), call.len(2), call.arg_i32(3));
    let (dest_addr, dest_len) = (call.arg(4), call.len(5));
    let buf = host_buf(call, buf_addr, len)?;
    let sa = if dest_addr == 0 {
        None
    } else {
        Some(read_sockaddr(call, dest_addr, dest_len)?)
    };
    let (sa_ptr, sa_len) = sa
        .as_ref()
        .map_or((std::ptr::null(), 0), |s| (s.as_ptr(), s.len()));
    libc_result(unsafe {
        libc::syscall(libc::SYS_sendto, fd, buf, len, flags, sa_ptr, sa_len as libc::socklen_t)
    })
}

fn sys_recvfrom(call: &mut Call<'_>) -> SysResult {
    let (fd, buf_addr, len, flags) = (call.fd(0), call.arg(1), call.len(2), call.arg_i32(3));
    let (src_addr, len_addr) = (call.arg(4), call.arg(5));
    let abi = call.abi;
    let buf = host_buf_mut(call, buf_addr, len)?;
    if src_addr == 0 {
        return libc_result(unsafe {
            libc::syscall(
                libc::SYS_recvfrom,
                fd,
                buf,
                len,
                flags,
                std::ptr::null_mut::<u8>(),
                std::ptr::null_mut::<libc::socklen_t>(),
            )
        });
    }
    let guest_len = read_u32(call.mem, abi, len_addr)? as usize;
    let mut storage = [0u8; SOCKADDR_MAX];
    let mut host_len = SOCKADDR_MAX as libc::socklen_t;
    let got = libc_result(unsafe {
        libc::syscall(
            libc::SYS_recvfrom,
            fd,
            buf,
            len,
            flags,
            storage.as_mut_ptr(),
            &mut host_len,
        )
    })?;
    let copy = (host_len as usize).min(guest_len).min(SOCKADDR_MAX);
    write_sockaddr(call, src_addr, &storage[..copy])?;
    write_u32(call.mem, abi, len_addr, host_len as u32)?;
    Ok(got)
}
