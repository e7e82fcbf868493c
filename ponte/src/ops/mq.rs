// SPDX-License-Identifier: MIT OR Apache-2.0

//! POSIX message queues. Message payloads are opaque bytes and move
//! through host pointers; only the attribute struct and the priority
//! word need re-encoding.

use ponte_common::kernel_types::MqAttr;
use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use crate::dispatch::Call;
use crate::errno::{libc_result, SysResult};
use crate::layout::{read_mq_attr, write_mq_attr};
use crate::marshal::write_u32;
use crate::ops::{host_buf, host_buf_mut, open_flags_to_host, opt_host_timespec};
use crate::table::{ArgAdapt, OperationSpec, SyscallTable};

static MQ_OPEN: OperationSpec = OperationSpec::handler("mq_open", sys_mq_open);
static MQ_UNLINK: OperationSpec = OperationSpec::handler("mq_unlink", sys_mq_unlink);
static MQ_TIMEDSEND: OperationSpec =
    OperationSpec::blocking_handler("mq_timedsend", sys_mq_timedsend);
static MQ_TIMEDRECEIVE: OperationSpec =
    OperationSpec::blocking_handler("mq_timedreceive", sys_mq_timedreceive);
static MQ_GETSETATTR: OperationSpec = OperationSpec::handler("mq_getsetattr", sys_mq_getsetattr);

pub(crate) fn register(t: &mut SyscallTable) {
    t.both(l::SYS_mq_open, m::SYS_mq_open, &MQ_OPEN);
    t.both(l::SYS_mq_unlink, m::SYS_mq_unlink, &MQ_UNLINK);
    t.both(l::SYS_mq_timedsend, m::SYS_mq_timedsend, &MQ_TIMEDSEND);
    t.both(l::SYS_mq_timedreceive, m::SYS_mq_timedreceive, &MQ_TIMEDRECEIVE);
    t.both(l::SYS_mq_getsetattr, m::SYS_mq_getsetattr, &MQ_GETSETATTR);

    t.legacy_adapted(l::SYS_mq_timedsend_time64, &MQ_TIMEDSEND, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_mq_timedreceive_time64, &MQ_TIMEDRECEIVE, ArgAdapt::Wide);
}

fn to_host_mq_attr(attr: &MqAttr) -> libc::mq_attr {
    let mut host: libc::mq_attr = unsafe { std::mem::zeroed() };
    host.mq_flags = attr.mq_flags;
    host.mq_maxmsg = attr.mq_maxmsg;
    host.mq_msgsize = attr.mq_msgsize;
    host.mq_curmsgs = attr.mq_curmsgs;
    host
}

fn from_host_mq_attr(host: &libc::mq_attr) -> MqAttr {
    MqAttr {
        mq_flags: host.mq_flags,
        mq_maxmsg: host.mq_maxmsg,
        mq_msgsize: host.mq_msgsize,
        mq_curmsgs: host.mq_curmsgs,
    }
}

fn sys_mq_open(call: &mut Call<'_>) -> SysResult {
    // The guest libc already stripped the leading slash before the
    // syscall, so the name passes straight through.
    let name = call.path(0)?;
    let oflag = open_flags_to_host(call.abi, call.arg_i32(1));
    let mode = call.arg(2) as libc::mode_t;
    let attr_addr = call.arg(3);

    let attr = if attr_addr == 0 {
        None
    } else {
        Some(to_host_mq_attr(&read_mq_attr(
            call.mem,
            call.abi,
            call.wide(),
            attr_addr,
        )?))
    };
    let attr_ptr = attr
        .as_ref()
        .map_or(std::ptr::null(), |a| a as *const libc::mq_attr);
    libc_result(unsafe { libc::syscall(libc::SYS_mq_open, name.as_ptr(), oflag, mode, attr_ptr) })
}

fn sys_mq_unlink(call: &mut Call<'_>) -> SysResult {
    let name = call.path(0)?;
    libc_result(unsafe { libc::syscall(libc::SYS_mq_unlink, name.as_ptr()) })
}

fn sys_mq_timedsend(call: &mut Call<'_>) -> SysResult {
    let (mqd, msg_addr, len) = (call.fd(0), call.arg(1), call.len(2));
    let prio = call.arg(3) as u32;
    let tmo = opt_host_timespec(call, call.arg(4))?;
    let msg = host_buf(call, msg_addr, len)?;
    let tmo_ptr = tmo
        .as_ref()
        .map_or(std::ptr::null(), |t| t as *const libc::timespec);
    libc_result(unsafe { libc::syscall(libc::SYS_mq_timedsend, mqd, msg, len, prio, tmo_ptr) })
}

fn sys_mq_timedreceive(call: &mut Call<'_>) -> SysResult {
    let (mqd, buf_addr, len) = (call.fd(0), call.arg(1), call.len(2));
    let prio_addr = call.arg(3);
    let abi = call.abi;
    let tmo = opt_host_timespec(call, call.arg(4))?;
    let buf = host_buf_mut(call, buf_addr, len)?;

    let mut prio: u32 = 0;
    let prio_ptr = if prio_addr == 0 {
        std::ptr::null_mut()
    } else {
        &mut prio as *mut u32
    };
    let tmo_ptr = tmo
        .as_ref()
        .map_or(std::ptr::null(), |t| t as *const libc::timespec);
    let received = libc_result(unsafe {
        libc::syscall(libc::SYS_mq_timedreceive, mqd, buf, len, prio_ptr, tmo_ptr)
    })?;

    if prio_addr != 0 {
        write_u32(call.mem, abi, prio_addr, prio)?;
    }
    Ok(received)
}

fn sys_mq_getsetattr(call: &mut Call<'_>) -> SysResult {
    let mqd = call.fd(0);
    let (new_addr, old_addr) = (call.arg(1), call.arg(2));
    let (abi, wide) = (call.abi, call.wide());

    let new = if new_addr == 0 {
        None
    } else {
        Some(to_host_mq_attr(&read_mq_attr(call.mem, abi, wide, new_addr)?))
    };
    let new_ptr = new
        .as_ref()
        .map_or(std::ptr::null(), |a| a as *const libc::mq_attr);
    let mut old: libc::mq_attr = unsafe { std::mem::zeroed() };

    libc_result(unsafe {
        libc::syscall(libc::SYS_mq_getsetattr, mqd, new_ptr, &mut old as *mut libc::mq_attr)
    })?;

    if old_addr != 0 {
        write_mq_attr(call.mem, abi, wide, old_addr, &from_host_mq_attr(&old))?;
    }
    Ok(0)
}
