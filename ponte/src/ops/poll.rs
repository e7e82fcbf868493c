// SPDX-License-Identifier: MIT OR Apache-2.0

//! Readiness multiplexing: poll/ppoll, select/pselect6, and epoll.
//!
//! pollfd and fd_set contents cannot pass through untouched: the guest's
//! byte order differs from the host's on the big-endian epoch, so each
//! entry is re-encoded both ways.

use ponte_common::kernel_types::Timespec;
use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use crate::dispatch::Call;
use crate::errno::{libc_result, Fault, SysResult};
use crate::layout::{read_epoll_event, write_epoll_event, write_timespec};
use crate::marshal::{read_fdset, read_sigset, read_u16, read_u32, read_word, write_fdset,
    write_u16};
use crate::ops::{host_sigset, opt_host_timespec};
use crate::table::{ArgAdapt, OperationSpec, SyscallTable};

/// Matches the kernel's limit on poll entries (RLIMIT_NOFILE at most).
const POLL_MAX: usize = 4096;
const EPOLL_MAX_EVENTS: i32 = 4096;

static POLL: OperationSpec = OperationSpec::blocking_handler("poll", sys_poll);
static PPOLL: OperationSpec = OperationSpec::blocking_handler("ppoll", sys_ppoll);
static SELECT: OperationSpec = OperationSpec::blocking_handler("select", sys_select);
static PSELECT6: OperationSpec = OperationSpec::blocking_handler("pselect6", sys_pselect6);
static EPOLL_CREATE: OperationSpec =
    OperationSpec::passthrough("epoll_create", libc::SYS_epoll_create, 1);
static EPOLL_CREATE1: OperationSpec =
    OperationSpec::passthrough("epoll_create1", libc::SYS_epoll_create1, 1);
static EPOLL_CTL: OperationSpec = OperationSpec::handler("epoll_ctl", sys_epoll_ctl);
static EPOLL_WAIT: OperationSpec = OperationSpec::blocking_handler("epoll_wait", sys_epoll_wait);
static EPOLL_PWAIT: OperationSpec = OperationSpec::blocking_handler("epoll_pwait", sys_epoll_pwait);

pub(crate) fn register(t: &mut SyscallTable) {
    t.both(l::SYS_poll, m::SYS_poll, &POLL);
    t.both(l::SYS_ppoll, m::SYS_ppoll, &PPOLL);
    t.both(l::SYS_select, m::SYS_select, &SELECT);
    t.both(l::SYS_pselect6, m::SYS_pselect6, &PSELECT6);
    t.both(l::SYS_epoll_create, m::SYS_epoll_create, &EPOLL_CREATE);
    t.both(l::SYS_epoll_create1, m::SYS_epoll_create1, &EPOLL_CREATE1);
    t.both(l::SYS_epoll_ctl, m::SYS_epoll_ctl, &EPOLL_CTL);
    t.both(l::SYS_epoll_wait, m::SYS_epoll_wait, &EPOLL_WAIT);
    t.both(l::SYS_epoll_pwait, m::SYS_epoll_pwait, &EPOLL_PWAIT);

    t.legacy_adapted(l::SYS_ppoll_time64, &PPOLL, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_pselect6_time64, &PSELECT6, ArgAdapt::Wide);
}

fn read_pollfds(call: &Call<'_>, addr: u64, nfds: usize) -> Result<Vec<libc::pollfd>, Fault> {
    let mut fds = Vec::with_capacity(nfds);
    for i in 0..nfds {
        let base = addr + i as u64 * 8;
        fds.push(libc::pollfd {
            fd: read_u32(call.mem, call.abi, base)? as i32,
            events: read_u16(call.mem, call.abi, base + 4)? as i16,
            revents: 0,
        });
    }
    Ok(fds)
}

fn write_revents(call: &mut Call<'_>, addr: u64, fds: &[libc::pollfd]) -> Result<(), Fault> {
    let abi = call.abi;
    for (i, pfd) in fds.iter().enumerate() {
        write_u16(call.mem, abi, addr + i as u64 * 8 + 6, pfd.revents as u16)?;
    }
    Ok(())
}

fn sys_poll(call: &mut Call<'_>) -> SysResult {
    let (addr, nfds, timeout) = (call.arg(0), call.len(1), call.arg_i32(2));
    if nfds > POLL_MAX {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let mut fds = read_pollfds(call, addr, nfds)?;
    let ready = libc_result(unsafe {
        libc::poll(fds.as_mut_ptr(), nfds as libc::nfds_t, timeout)
    } as i64)?;
    write_revents(call, addr, &fds)?;
    Ok(ready)
}

fn sys_ppoll(call: &mut Call<'_>) -> SysResult {
    let (addr, nfds) = (call.arg(0), call.len(1));
    let (tmo_addr, mask_addr) = (call.arg(2), call.arg(3));
    if nfds > POLL_MAX {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let (abi, wide) = (call.abi, call.wide());
    let mut fds = read_pollfds(call, addr, nfds)?;
    let mut tmo = opt_host_timespec(call, tmo_addr)?;
    let sigset = if mask_addr == 0 {
        None
    } else {
        Some(host_sigset(read_sigset(call.mem, abi, mask_addr)?))
    };

    let tmo_ptr = tmo
        .as_mut()
        .map_or(std::ptr::null_mut(), |t| t as *mut libc::timespec);
    let sig_ptr = sigset
        .as_ref()
        .map_or(std::ptr::null(), |s| s as *const libc::sigset_t);
    let ready = libc_result(unsafe {
        libc::syscall(
            libc::SYS_ppoll,
            fds.as_mut_ptr(),
            nfds as libc::nfds_t,
            tmo_ptr,
            sig_ptr,
            std::mem::size_of::<u64>(),
        )
    });

    write_revents(call, addr, &fds)?;
    // The kernel counts the remaining time down in place.
    if let (Some(t), true) = (tmo.as_ref(), tmo_addr != 0) {
        let guest = Timespec {
            seconds: t.tv_sec,
            nanos: t.tv_nsec,
        };
        write_timespec(call.mem, abi, wide, tmo_addr, &guest)?;
    }
    ready
}

struct FdSets {
    read: Option<libc::fd_set>,
    write: Option<libc::fd_set>,
    except: Option<libc::fd_set>,
}

fn read_fdsets(call: &Call<'_>, nfds: i32, addrs: [u64; 3]) -> Result<FdSets, Fault> {
    let mut read_set = |addr: u64| -> Result<Option<libc::fd_set>, Fault> {
        if addr == 0 {
            Ok(None)
        } else {
            Ok(Some(read_fdset(call.mem, call.abi, addr, nfds)?))
        }
    };
    Ok(FdSets {
        read: read_set(addrs[0])?,
        write: read_set(addrs[1])?,
        except: read_set(addrs[2])?,
    })
}

fn write_fdsets(
    call: &mut Call<'_>,
    nfds: i32,
    addrs: [u64; 3],
    sets: &FdSets,
) -> Result<(), Fault> {
    let abi = call.abi;
    for (addr, set) in [
        (addrs[0], &sets.read),
        (addrs[1], &sets.write),
        (addrs[2], &sets.except),
    ] {
        if let (true, Some(s)) = (addr != 0, set) {
            write_fdset(call.mem, abi, addr, nfds, s)?;
        }
    }
    Ok(())
}

fn set_ptr(set: &mut Option<libc::fd_set>) -> *mut libc::fd_set {
    set.as_mut()
        .map_or(std::ptr::null_mut(), |s| s as *mut libc::fd_set)
}

fn sys_select(call: &mut Call<'_>) -> SysResult {
    let nfds = call.arg_i32(0);
    if !(0..=libc::FD_SETSIZE as i32).contains(&nfds) {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let addrs = [call.arg(1), call.arg(2), call.arg(3)];
    let tmo_addr = call.arg(4);
    let (abi, wide) = (call.abi, call.wide());

    let mut sets = read_fdsets(call, nfds, addrs)?;
    let mut tv = if tmo_addr == 0 {
        None
    } else {
        let guest = crate::layout::read_timeval(call.mem, abi, wide, tmo_addr)?;
        Some(libc::timeval {
            tv_sec: guest.tv_sec,
            tv_usec: guest.tv_usec,
        })
    };
    let tv_ptr = tv
        .as_mut()
        .map_or(std::ptr::null_mut(), |t| t as *mut libc::timeval);

    let ready = libc_result(unsafe {
        libc::select(
            nfds,
            set_ptr(&mut sets.read),
            set_ptr(&mut sets.write),
            set_ptr(&mut sets.except),
            tv_ptr,
        )
    } as i64);

    write_fdsets(call, nfds, addrs, &sets)?;
    if let Some(t) = tv.as_ref() {
        let guest = ponte_common::kernel_types::Timeval {
            tv_sec: t.tv_sec,
            tv_usec: t.tv_usec,
        };
        crate::layout::write_timeval(call.mem, abi, wide, tmo_addr, &guest)?;
    }
    ready
}

fn sys_pselect6(call: &mut Call<'_>) -> SysResult {
    let nfds = call.arg_i32(0);
    if !(0..=libc::FD_SETSIZE as i32).contains(&nfds) {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let addrs = [call.arg(1), call.arg(2), call.arg(3)];
    let tmo_addr = call.arg(4);
    let sig_pair_addr = call.arg(5);
    let (abi, wide) = (call.abi, call.wide());

    let mut sets = read_fdsets(call, nfds, addrs)?;
    let mut tmo = opt_host_timespec(call, tmo_addr)?;

    // The sixth argument points at a (sigset pointer, sigset size) pair
    // in guest memory.
    let sigset = if sig_pair_addr == 0 {
        None
    } else {
        let mask_addr = read_word(call.mem, abi, sig_pair_addr)?;
        if mask_addr == 0 {
            None
        } else {
            Some(host_sigset(read_sigset(call.mem, abi, mask_addr)?))
        }
    };

    #[repr(C)]
    struct SigsetArg {
        ss: *const libc::sigset_t,
        ss_len: usize,
    }
    let sig_arg = SigsetArg {
        ss: sigset
            .as_ref()
            .map_or(std::ptr::null(), |s| s as *const libc::sigset_t),
        ss_len: std::mem::size_of::<u64>(),
    };

    let tmo_ptr = tmo
        .as_mut()
        .map_or(std::ptr::null_mut(), |t| t as *mut libc::timespec);
    let ready = libc_result(unsafe {
        libc::syscall(
            libc::SYS_pselect6,
            nfds,
            set_ptr(&mut sets.read),
            set_ptr(&mut sets.write),
            set_ptr(&mut sets.except),
            tmo_ptr,
            &sig_arg as *const SigsetArg,
        )
    });

    write_fdsets(call, nfds, addrs, &sets)?;
    if let Some(t) = tmo.as_ref() {
        let guest = Timespec {
            seconds: t.tv_sec,
            nanos: t.tv_nsec,
        };
        write_timespec(call.mem, abi, wide, tmo_addr, &guest)?;
    }
    ready
}

fn sys_epoll_ctl(call: &mut Call<'_>) -> SysResult {
    let (epfd, op, fd, event_addr) = (call.fd(0), call.arg_i32(1), call.fd(2), call.arg(3));
    let mut event = libc::epoll_event { events: 0, u64: 0 };
    let event_ptr = if event_addr == 0 {
        std::ptr::null_mut()
    } else {
        let (events, data) = read_epoll_event(call.mem, call.abi, call.wide(), event_addr)?;
        event.events = events;
        event.u64 = data;
        &mut event as *mut libc::epoll_event
    };
    libc_result(unsafe { libc::epoll_ctl(epfd, op, fd, event_ptr) } as i64)
}

fn do_epoll_wait(
    call: &mut Call<'_>,
    sigmask_addr: Option<u64>,
) -> SysResult {
    let (epfd, events_addr) = (call.fd(0), call.arg(1));
    let (maxevents, timeout) = (call.arg_i32(2), call.arg_i32(3));
    if maxevents <= 0 || maxevents > EPOLL_MAX_EVENTS {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let (abi, wide) = (call.abi, call.wide());

    let sigset = match sigmask_addr {
        Some(addr) if addr != 0 => Some(host_sigset(read_sigset(call.mem, abi, addr)?)),
        _ => None,
    };
    let sig_ptr = sigset
        .as_ref()
        .map_or(std::ptr::null(), |s| s as *const libc::sigset_t);

    let mut events = vec![libc::epoll_event { events: 0, u64: 0 }; maxevents as usize];
    let ready = libc_result(unsafe {
        if sigmask_addr.is_some() {
            libc::epoll_pwait(epfd, events.as_mut_ptr(), maxevents, timeout, sig_ptr)
        } else {
            libc::epoll_wait(epfd, events.as_mut_ptr(), maxevents, timeout)
        }
    } as i64)?;

    let stride: u64 = if wide { 12 } else { 16 };
    for (i, ev) in events.iter().take(ready as usize).enumerate() {
        write_epoll_event(call.mem, abi, wide, events_addr + i as u64 * stride, ev.events, ev.u64)?;
    }
    Ok(ready)
}

fn sys_epoll_wait(call: &mut Call<'_>) -> SysResult {
    do_epoll_wait(call, None)
}

fn sys_epoll_pwait(call: &mut Call<'_>) -> SysResult {
    let mask = call.arg(4);
    do_epoll_wait(call, Some(mask))
}
