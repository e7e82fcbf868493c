// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clocks, sleeps and timerfds. The narrow epoch reaches these both
//! through its original numbers and through the `*_time64` aliases; the
//! aliases differ only in using the wide timespec layout.

use ponte_common::kernel_types::{Itimerspec, Timespec, Timeval};
use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use crate::dispatch::Call;
use crate::errno::{libc_result, Fault, SysResult};
use crate::layout::{read_itimerspec, read_timespec, read_timeval, write_itimerspec,
    write_timespec, write_timeval};
use crate::marshal::{write_u64, write_word};
use crate::ops::to_host_timespec;
use crate::table::{ArgAdapt, OperationSpec, SyscallTable};

static CLOCK_GETTIME: OperationSpec = OperationSpec::handler("clock_gettime", sys_clock_gettime);
static CLOCK_SETTIME: OperationSpec = OperationSpec::handler("clock_settime", sys_clock_settime);
static CLOCK_GETRES: OperationSpec = OperationSpec::handler("clock_getres", sys_clock_getres);
static CLOCK_NANOSLEEP: OperationSpec =
    OperationSpec::blocking_handler("clock_nanosleep", sys_clock_nanosleep);
static NANOSLEEP: OperationSpec = OperationSpec::blocking_handler("nanosleep", sys_nanosleep);
static GETTIMEOFDAY: OperationSpec = OperationSpec::handler("gettimeofday", sys_gettimeofday);
static SETTIMEOFDAY: OperationSpec = OperationSpec::handler("settimeofday", sys_settimeofday);
static TIMERFD_CREATE: OperationSpec =
    OperationSpec::passthrough("timerfd_create", libc::SYS_timerfd_create, 2);
static TIMERFD_SETTIME: OperationSpec =
    OperationSpec::handler("timerfd_settime", sys_timerfd_settime);
static TIMERFD_GETTIME: OperationSpec =
    OperationSpec::handler("timerfd_gettime", sys_timerfd_gettime);
static TIME: OperationSpec = OperationSpec::handler("time", sys_time);
static TIMES: OperationSpec = OperationSpec::handler("times", sys_times);

pub(crate) fn register(t: &mut SyscallTable) {
    t.both(l::SYS_clock_gettime, m::SYS_clock_gettime, &CLOCK_GETTIME);
    t.both(l::SYS_clock_settime, m::SYS_clock_settime, &CLOCK_SETTIME);
    t.both(l::SYS_clock_getres, m::SYS_clock_getres, &CLOCK_GETRES);
    t.both(l::SYS_clock_nanosleep, m::SYS_clock_nanosleep, &CLOCK_NANOSLEEP);
    t.both(l::SYS_nanosleep, m::SYS_nanosleep, &NANOSLEEP);
    t.both(l::SYS_gettimeofday, m::SYS_gettimeofday, &GETTIMEOFDAY);
    t.both(l::SYS_settimeofday, m::SYS_settimeofday, &SETTIMEOFDAY);
    t.both(l::SYS_timerfd_create, m::SYS_timerfd_create, &TIMERFD_CREATE);
    t.both(l::SYS_timerfd_settime, m::SYS_timerfd_settime, &TIMERFD_SETTIME);
    t.both(l::SYS_timerfd_gettime, m::SYS_timerfd_gettime, &TIMERFD_GETTIME);
    t.both(l::SYS_time, m::SYS_time, &TIME);
    t.both(l::SYS_times, m::SYS_times, &TIMES);

    t.legacy_adapted(l::SYS_clock_gettime64, &CLOCK_GETTIME, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_clock_settime64, &CLOCK_SETTIME, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_clock_getres_time64, &CLOCK_GETRES, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_clock_nanosleep_time64, &CLOCK_NANOSLEEP, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_timerfd_settime64, &TIMERFD_SETTIME, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_timerfd_gettime64, &TIMERFD_GETTIME, ArgAdapt::Wide);
}

fn sys_clock_gettime(call: &mut Call<'_>) -> SysResult {
    let (clockid, addr) = (call.arg_i32(0), call.arg(1));
    let (abi, wide) = (call.abi, call.wide());
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    libc_result(unsafe { libc::clock_gettime(clockid, &mut ts) } as i64)?;
    let guest = Timespec {
        seconds: ts.tv_sec,
        nanos: ts.tv_nsec,
    };
    write_timespec(call.mem, abi, wide, addr, &guest)?;
    Ok(0)
}

fn sys_clock_settime(call: &mut Call<'_>) -> SysResult {
    let ts = read_timespec(call.mem, call.abi, call.wide(), call.arg(1))?;
    let host = to_host_timespec(&ts);
    libc_result(unsafe { libc::clock_settime(call.arg_i32(0), &host) } as i64)
}

fn sys_clock_getres(call: &mut Call<'_>) -> SysResult {
    let (clockid, addr) = (call.arg_i32(0), call.arg(1));
    let (abi, wide) = (call.abi, call.wide());
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    libc_result(unsafe { libc::clock_getres(clockid, &mut ts) } as i64)?;
    if addr != 0 {
        let guest = Timespec {
            seconds: ts.tv_sec,
            nanos: ts.tv_nsec,
        };
        write_timespec(call.mem, abi, wide, addr, &guest)?;
    }
    Ok(0)
}

fn sys_nanosleep(call: &mut Call<'_>) -> SysResult {
    let rem_addr = call.arg(1);
    let (abi, wide) = (call.abi, call.wide());
    let req = to_host_timespec(&read_timespec(call.mem, abi, wide, call.arg(0))?);
    let mut rem = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let ret = unsafe { libc::nanosleep(&req, &mut rem) };
    let result = libc_result(ret as i64);
    // The remainder is defined only for an interrupted sleep.
    if result == Err(Fault::Errno(libc::EINTR)) && rem_addr != 0 {
        let guest = Timespec {
            seconds: rem.tv_sec,
            nanos: rem.tv_nsec,
        };
        write_timespec(call.mem, abi, wide, rem_addr, &guest)?;
    }
    result
}

fn sys_clock_nanosleep(call: &mut Call<'_>) -> SysResult {
    let (clockid, flags) = (call.arg_i32(0), call.arg_i32(1));
    let rem_addr = call.arg(3);
    let (abi, wide) = (call.abi, call.wide());
    let req = to_host_timespec(&read_timespec(call.mem, abi, wide, call.arg(2))?);
    let mut rem = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // Unlike the rest of libc, this returns the error number directly.
    let err = unsafe { libc::clock_nanosleep(clockid, flags, &req, &mut rem) };
    if err == 0 {
        return Ok(0);
    }
    if err == libc::EINTR && rem_addr != 0 && flags & libc::TIMER_ABSTIME == 0 {
        let guest = Timespec {
            seconds: rem.tv_sec,
            nanos: rem.tv_nsec,
        };
        write_timespec(call.mem, abi, wide, rem_addr, &guest)?;
    }
    Err(Fault::Errno(err))
}

fn sys_gettimeofday(call: &mut Call<'_>) -> SysResult {
    let addr = call.arg(0);
    let (abi, wide) = (call.abi, call.wide());
    let mut tv = libc::timeval {
        tv_sec: 0,
        tv_usec: 0,
    };
    libc_result(unsafe { libc::gettimeofday(&mut tv, std::ptr::null_mut()) } as i64)?;
    if addr != 0 {
        let guest = Timeval {
            tv_sec: tv.tv_sec,
            tv_usec: tv.tv_usec,
        };
        write_timeval(call.mem, abi, wide, addr, &guest)?;
    }
    Ok(0)
}

fn sys_settimeofday(call: &mut Call<'_>) -> SysResult {
    let tv = read_timeval(call.mem, call.abi, call.wide(), call.arg(0))?;
    let host = libc::timeval {
        tv_sec: tv.tv_sec,
        tv_usec: tv.tv_usec,
    };
    libc_result(unsafe { libc::settimeofday(&host, std::ptr::null()) } as i64)
}

fn to_host_itimerspec(it: &Itimerspec) -> libc::itimerspec {
    libc::itimerspec {
        it_interval: to_host_timespec(&it.interval),
        it_value: to_host_timespec(&it.value),
    }
}

fn from_host_itimerspec(it: &libc::itimerspec) -> Itimerspec {
    Itimerspec {
        interval: Timespec {
            seconds: it.it_interval.tv_sec,
            nanos: it.it_interval.tv_nsec,
        },
        value: Timespec {
            seconds: it.it_value.tv_sec,
            nanos: it.it_value.tv_nsec,
        },
    }
}

fn sys_timerfd_settime(call: &mut Call<'_>) -> SysResult {
    let (fd, flags) = (call.fd(0), call.arg_i32(1));
    let old_addr = call.arg(3);
    let (abi, wide) = (call.abi, call.wide());
    let new = to_host_itimerspec(&read_itimerspec(call.mem, abi, wide, call.arg(2))?);
    let mut old: libc::itimerspec = unsafe { std::mem::zeroed() };
    libc_result(unsafe { libc::timerfd_settime(fd, flags, &new, &mut old) } as i64)?;
    if old_addr != 0 {
        write_itimerspec(call.mem, abi, wide, old_addr, &from_host_itimerspec(&old))?;
    }
    Ok(0)
}

fn sys_timerfd_gettime(call: &mut Call<'_>) -> SysResult {
    let (fd, addr) = (call.fd(0), call.arg(1));
    let (abi, wide) = (call.abi, call.wide());
    let mut curr: libc::itimerspec = unsafe { std::mem::zeroed() };
    libc_result(unsafe { libc::timerfd_gettime(fd, &mut curr) } as i64)?;
    write_itimerspec(call.mem, abi, wide, addr, &from_host_itimerspec(&curr))?;
    Ok(0)
}

fn sys_time(call: &mut Call<'_>) -> SysResult {
    let addr = call.arg(0);
    let abi = call.abi;
    let now = libc_result(unsafe { libc::time(std::ptr::null_mut()) } as i64)?;
    if addr != 0 {
        // 64-bit time_t on both epochs, like timespec.tv_sec.
        write_u64(call.mem, abi, addr, now as u64)?;
    }
    Ok(now)
}

fn sys_times(call: &mut Call<'_>) -> SysResult {
    let addr = call.arg(0);
    let abi = call.abi;
    let mut tms = libc::tms {
        tms_utime: 0,
        tms_stime: 0,
        tms_cutime: 0,
        tms_cstime: 0,
    };
    let ticks = libc_result(unsafe { libc::times(&mut tms) } as i64)?;
    if addr != 0 {
        // Four clock_t counters at the guest word width.
        let stride = abi.width.bytes() as u64;
        let counters = [tms.tms_utime, tms.tms_stime, tms.tms_cutime, tms.tms_cstime];
        for (i, v) in counters.into_iter().enumerate() {
            write_word(call.mem, abi, addr + i as u64 * stride, v as u64)?;
        }
    }
    Ok(ticks)
}
