// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process lifecycle and identity: exits, the wait family, credentials,
//! groups, resource limits, priorities, and uname.
//!
//! Guest exit never terminates the host; the dispatcher surfaces it as an
//! outcome for the embedder to act on.

use ponte_common::kernel_types::{Rusage, SigInfoWait, Timeval};
use ponte_common::syscalls::{legacy32 as l, modern64 as m};
use ponte_common::AbiEpoch;

use crate::dispatch::Call;
use crate::errno::{libc_result, Fault, SysResult};
use crate::layout::{read_rlimit, write_rlimit, write_rusage, write_siginfo_wait};
use crate::marshal::{read_u32, write_u32};
use crate::mem::GuestMem;
use crate::table::{OperationSpec, SyscallTable};

/// Kernel NGROUPS_MAX.
const NGROUPS_MAX: usize = 65536;
/// Field size in utsname, NUL included.
const UTS_LEN: usize = 65;

static EXIT: OperationSpec = OperationSpec::exit("exit");
static EXIT_GROUP: OperationSpec = OperationSpec::exit("exit_group");

static WAITPID: OperationSpec = OperationSpec::blocking_handler("waitpid", sys_waitpid);
static WAIT4: OperationSpec = OperationSpec::blocking_handler("wait4", sys_wait4);
static WAITID: OperationSpec = OperationSpec::blocking_handler("waitid", sys_waitid);

static GETPID: OperationSpec = OperationSpec::passthrough("getpid", libc::SYS_getpid, 0);
static GETPPID: OperationSpec = OperationSpec::passthrough("getppid", libc::SYS_getppid, 0);
static GETTID: OperationSpec = OperationSpec::passthrough("gettid", libc::SYS_gettid, 0);
static GETUID: OperationSpec = OperationSpec::passthrough("getuid", libc::SYS_getuid, 0);
static GETEUID: OperationSpec = OperationSpec::passthrough("geteuid", libc::SYS_geteuid, 0);
static GETGID: OperationSpec = OperationSpec::passthrough("getgid", libc::SYS_getgid, 0);
static GETEGID: OperationSpec = OperationSpec::passthrough("getegid", libc::SYS_getegid, 0);
static GETPGRP: OperationSpec = OperationSpec::passthrough("getpgrp", libc::SYS_getpgrp, 0);
static SETSID: OperationSpec = OperationSpec::passthrough("setsid", libc::SYS_setsid, 0);
static GETSID: OperationSpec = OperationSpec::passthrough("getsid", libc::SYS_getsid, 1);
static GETPGID: OperationSpec = OperationSpec::passthrough("getpgid", libc::SYS_getpgid, 1);
static SETPGID: OperationSpec = OperationSpec::passthrough("setpgid", libc::SYS_setpgid, 2);

static SETUID: OperationSpec = OperationSpec::passthrough("setuid", libc::SYS_setuid, 1);
static SETGID: OperationSpec = OperationSpec::passthrough("setgid", libc::SYS_setgid, 1);
static SETREUID: OperationSpec = OperationSpec::passthrough("setreuid", libc::SYS_setreuid, 2);
static SETREGID: OperationSpec = OperationSpec::passthrough("setregid", libc::SYS_setregid, 2);
static SETRESUID: OperationSpec = OperationSpec::passthrough("setresuid", libc::SYS_setresuid, 3);
static SETRESGID: OperationSpec = OperationSpec::passthrough("setresgid", libc::SYS_setresgid, 3);
static SETFSUID: OperationSpec = OperationSpec::passthrough("setfsuid", libc::SYS_setfsuid, 1);
static SETFSGID: OperationSpec = OperationSpec::passthrough("setfsgid", libc::SYS_setfsgid, 1);

static GETRESUID: OperationSpec = OperationSpec::handler("getresuid", sys_getresuid);
static GETRESGID: OperationSpec = OperationSpec::handler("getresgid", sys_getresgid);
static GETGROUPS: OperationSpec = OperationSpec::handler("getgroups", sys_getgroups);
static SETGROUPS: OperationSpec = OperationSpec::handler("setgroups", sys_setgroups);

static KILL: OperationSpec = OperationSpec::passthrough("kill", libc::SYS_kill, 2);
static TKILL: OperationSpec = OperationSpec::passthrough("tkill", libc::SYS_tkill, 2);
static TGKILL: OperationSpec = OperationSpec::passthrough("tgkill", libc::SYS_tgkill, 3);

static SCHED_YIELD: OperationSpec =
    OperationSpec::passthrough("sched_yield", libc::SYS_sched_yield, 0);
static GETPRIORITY: OperationSpec =
    OperationSpec::passthrough("getpriority", libc::SYS_getpriority, 2);
static SETPRIORITY: OperationSpec =
    OperationSpec::passthrough("setpriority", libc::SYS_setpriority, 3);

static UNAME: OperationSpec = OperationSpec::handler("uname", sys_uname);
static SETHOSTNAME: OperationSpec = OperationSpec::handler("sethostname", sys_sethostname);
static SETDOMAINNAME: OperationSpec = OperationSpec::handler("setdomainname", sys_setdomainname);

static GETRLIMIT: OperationSpec = OperationSpec::handler("getrlimit", sys_getrlimit);
static SETRLIMIT: OperationSpec = OperationSpec::handler("setrlimit", sys_setrlimit);
static PRLIMIT64: OperationSpec = OperationSpec::handler("prlimit64", sys_prlimit64);
static GETRUSAGE: OperationSpec = OperationSpec::handler("getrusage", sys_getrusage);

pub(crate) fn register(t: &mut SyscallTable) {
    t.both(l::SYS_exit, m::SYS_exit, &EXIT);
    t.both(l::SYS_exit_group, m::SYS_exit_group, &EXIT_GROUP);

    t.legacy(l::SYS_waitpid, &WAITPID);
    t.both(l::SYS_wait4, m::SYS_wait4, &WAIT4);
    t.both(l::SYS_waitid, m::SYS_waitid, &WAITID);

    t.both(l::SYS_getpid, m::SYS_getpid, &GETPID);
    t.both(l::SYS_getppid, m::SYS_getppid, &GETPPID);
    t.both(l::SYS_gettid, m::SYS_gettid, &GETTID);
    t.both(l::SYS_getpgrp, m::SYS_getpgrp, &GETPGRP);
    t.both(l::SYS_setsid, m::SYS_setsid, &SETSID);
    t.both(l::SYS_getsid, m::SYS_getsid, &GETSID);
    t.both(l::SYS_getpgid, m::SYS_getpgid, &GETPGID);
    t.both(l::SYS_setpgid, m::SYS_setpgid, &SETPGID);

    // Identity calls, both the legacy 16-bit-ID spellings and the `*32`
    // ones; the host IDs fit either way for any practical guest.
    t.both(l::SYS_getuid, m::SYS_getuid, &GETUID);
    t.both(l::SYS_geteuid, m::SYS_geteuid, &GETEUID);
    t.both(l::SYS_getgid, m::SYS_getgid, &GETGID);
    t.both(l::SYS_getegid, m::SYS_getegid, &GETEGID);
    t.both(l::SYS_setuid, m::SYS_setuid, &SETUID);
    t.both(l::SYS_setgid, m::SYS_setgid, &SETGID);
    t.both(l::SYS_setreuid, m::SYS_setreuid, &SETREUID);
    t.both(l::SYS_setregid, m::SYS_setregid, &SETREGID);
    t.both(l::SYS_setresuid, m::SYS_setresuid, &SETRESUID);
    t.both(l::SYS_setresgid, m::SYS_setresgid, &SETRESGID);
    t.both(l::SYS_setfsuid, m::SYS_setfsuid, &SETFSUID);
    t.both(l::SYS_setfsgid, m::SYS_setfsgid, &SETFSGID);
    t.both(l::SYS_getresuid, m::SYS_getresuid, &GETRESUID);
    t.both(l::SYS_getresgid, m::SYS_getresgid, &GETRESGID);
    t.both(l::SYS_getgroups, m::SYS_getgroups, &GETGROUPS);
    t.both(l::SYS_setgroups, m::SYS_setgroups, &SETGROUPS);

    t.legacy(l::SYS_getuid32, &GETUID);
    t.legacy(l::SYS_geteuid32, &GETEUID);
    t.legacy(l::SYS_getgid32, &GETGID);
    t.legacy(l::SYS_getegid32, &GETEGID);
    t.legacy(l::SYS_setuid32, &SETUID);
    t.legacy(l::SYS_setgid32, &SETGID);
    t.legacy(l::SYS_setreuid32, &SETREUID);
    t.legacy(l::SYS_setregid32, &SETREGID);
    t.legacy(l::SYS_setresuid32, &SETRESUID);
    t.legacy(l::SYS_setresgid32, &SETRESGID);
    t.legacy(l::SYS_setfsuid32, &SETFSUID);
    t.legacy(l::SYS_setfsgid32, &SETFSGID);
    t.legacy(l::SYS_getresuid32, &GETRESUID);
    t.legacy(l::SYS_getresgid32, &GETRESGID);
    t.legacy(l::SYS_getgroups32, &GETGROUPS);
    t.legacy(l::SYS_setgroups32, &SETGROUPS);

    t.both(l::SYS_kill, m::SYS_kill, &KILL);
    t.both(l::SYS_tkill, m::SYS_tkill, &TKILL);
    t.both(l::SYS_tgkill, m::SYS_tgkill, &TGKILL);

    t.both(l::SYS_sched_yield, m::SYS_sched_yield, &SCHED_YIELD);
    t.both(l::SYS_getpriority, m::SYS_getpriority, &GETPRIORITY);
    t.both(l::SYS_setpriority, m::SYS_setpriority, &SETPRIORITY);

    t.both(l::SYS_uname, m::SYS_uname, &UNAME);
    t.both(l::SYS_sethostname, m::SYS_sethostname, &SETHOSTNAME);
    t.both(l::SYS_setdomainname, m::SYS_setdomainname, &SETDOMAINNAME);

    t.both(l::SYS_getrlimit, m::SYS_getrlimit, &GETRLIMIT);
    t.legacy(l::SYS_ugetrlimit, &GETRLIMIT);
    t.both(l::SYS_setrlimit, m::SYS_setrlimit, &SETRLIMIT);
    t.both(l::SYS_prlimit64, m::SYS_prlimit64, &PRLIMIT64);
    t.both(l::SYS_getrusage, m::SYS_getrusage, &GETRUSAGE);
}

fn rusage_to_guest(ru: &libc::rusage) -> Rusage {
    Rusage {
        ru_utime: Timeval {
            tv_sec: ru.ru_utime.tv_sec,
            tv_usec: ru.ru_utime.tv_usec,
        },
        ru_stime: Timeval {
            tv_sec: ru.ru_stime.tv_sec,
            tv_usec: ru.ru_stime.tv_usec,
        },
        ru_maxrss: ru.ru_maxrss,
        ru_minflt: ru.ru_minflt,
        ru_majflt: ru.ru_majflt,
        ru_inblock: ru.ru_inblock,
        ru_oublock: ru.ru_oublock,
        ru_nvcsw: ru.ru_nvcsw,
        ru_nivcsw: ru.ru_nivcsw,
    }
}

fn do_wait4(
    call: &mut Call<'_>,
    pid: i32,
    status_addr: u64,
    options: i32,
    rusage_addr: u64,
) -> SysResult {
    let (abi, wide) = (call.abi, call.wide());
    let mut status: libc::c_int = 0;
    let mut ru: libc::rusage = unsafe { std::mem::zeroed() };
    let reaped = libc_result(unsafe { libc::wait4(pid, &mut status, options, &mut ru) } as i64)?;

    if status_addr != 0 {
        write_u32(call.mem, abi, status_addr, status as u32)?;
    }
    if rusage_addr != 0 {
        write_rusage(call.mem, abi, wide, rusage_addr, &rusage_to_guest(&ru))?;
    }
    Ok(reaped)
}

fn sys_waitpid(call: &mut Call<'_>) -> SysResult {
    let (pid, status_addr, options) = (call.arg_i32(0), call.arg(1), call.arg_i32(2));
    do_wait4(call, pid, status_addr, options, 0)
}

fn sys_wait4(call: &mut Call<'_>) -> SysResult {
    let (pid, status_addr, options, rusage_addr) =
        (call.arg_i32(0), call.arg(1), call.arg_i32(2), call.arg(3));
    do_wait4(call, pid, status_addr, options, rusage_addr)
}

fn sys_waitid(call: &mut Call<'_>) -> SysResult {
    let (idtype, id, infop, options) =
        (call.arg_i32(0), call.arg_i32(1), call.arg(2), call.arg_i32(3));
    let rusage_addr = call.arg(4);
    let (abi, wide) = (call.abi, call.wide());

    let mut si: libc::siginfo_t = unsafe { std::mem::zeroed() };
    let mut ru: libc::rusage = unsafe { std::mem::zeroed() };
    let ru_ptr = if rusage_addr == 0 {
        std::ptr::null_mut()
    } else {
        &mut ru as *mut libc::rusage
    };
    libc_result(unsafe {
        libc::syscall(
            libc::SYS_waitid,
            idtype,
            id,
            &mut si as *mut libc::siginfo_t,
            options,
            ru_ptr,
        )
    })?;

    if infop != 0 {
        // With WNOHANG and nothing to reap, si stays zeroed; the guest
        // checks si_pid for that case.
        let guest = SigInfoWait {
            si_signo: si.si_signo,
            si_errno: si.si_errno,
            si_code: si.si_code,
            si_pid: unsafe { si.si_pid() },
            si_uid: unsafe { si.si_uid() },
            si_status: unsafe { si.si_status() },
        };
        write_siginfo_wait(call.mem, abi, infop, &guest)?;
    }
    if rusage_addr != 0 {
        write_rusage(call.mem, abi, wide, rusage_addr, &rusage_to_guest(&ru))?;
    }
    Ok(0)
}

fn sys_getresuid(call: &mut Call<'_>) -> SysResult {
    let addrs = [call.arg(0), call.arg(1), call.arg(2)];
    let abi = call.abi;
    let (mut r, mut e, mut s): (libc::uid_t, libc::uid_t, libc::uid_t) = (0, 0, 0);
    libc_result(unsafe { libc::getresuid(&mut r, &mut e, &mut s) } as i64)?;
    for (addr, id) in addrs.iter().zip([r, e, s]) {
        write_u32(call.mem, abi, *addr, id)?;
    }
    Ok(0)
}

fn sys_getresgid(call: &mut Call<'_>) -> SysResult {
    let addrs = [call.arg(0), call.arg(1), call.arg(2)];
    let abi = call.abi;
    let (mut r, mut e, mut s): (libc::gid_t, libc::gid_t, libc::gid_t) = (0, 0, 0);
    libc_result(unsafe { libc::getresgid(&mut r, &mut e, &mut s) } as i64)?;
    for (addr, id) in addrs.iter().zip([r, e, s]) {
        write_u32(call.mem, abi, *addr, id)?;
    }
    Ok(0)
}

fn sys_getgroups(call: &mut Call<'_>) -> SysResult {
    let (count, addr) = (call.arg_i32(0), call.arg(1));
    let abi = call.abi;
    if count < 0 || count as usize > NGROUPS_MAX {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let mut groups = vec![0 as libc::gid_t; count as usize];
    let n = libc_result(unsafe { libc::getgroups(count, groups.as_mut_ptr()) } as i64)?;
    for (i, gid) in groups.iter().take(n as usize).enumerate() {
        write_u32(call.mem, abi, addr + i as u64 * 4, *gid)?;
    }
    Ok(n)
}

fn sys_setgroups(call: &mut Call<'_>) -> SysResult {
    let (count, addr) = (call.len(0), call.arg(1));
    if count > NGROUPS_MAX {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let mut groups = Vec::with_capacity(count);
    for i in 0..count {
        groups.push(read_u32(call.mem, call.abi, addr + i as u64 * 4)? as libc::gid_t);
    }
    libc_result(unsafe { libc::setgroups(count, groups.as_ptr()) } as i64)
}

fn uts_field(src: &[libc::c_char; UTS_LEN]) -> [u8; UTS_LEN] {
    let mut out = [0u8; UTS_LEN];
    for (o, c) in out.iter_mut().zip(src.iter()) {
        *o = *c as u8;
    }
    out
}

fn sys_uname(call: &mut Call<'_>) -> SysResult {
    let addr = call.arg(0);
    let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
    libc_result(unsafe { libc::uname(&mut uts) } as i64)?;

    // The machine field reports what the guest was compiled for, not
    // what it actually runs on.
    let mut machine = [0u8; UTS_LEN];
    let name: &[u8] = match call.abi.epoch {
        AbiEpoch::Legacy32 => b"m68k",
        AbiEpoch::Modern64 => b"x86_64",
    };
    machine[..name.len()].copy_from_slice(name);

    let fields = [
        uts_field(&uts.sysname),
        uts_field(&uts.nodename),
        uts_field(&uts.release),
        uts_field(&uts.version),
        machine,
        uts_field(&uts.domainname),
    ];
    for (i, field) in fields.iter().enumerate() {
        call.mem.write(addr + (i * UTS_LEN) as u64, field)?;
    }
    Ok(0)
}

fn sys_sethostname(call: &mut Call<'_>) -> SysResult {
    let (addr, len) = (call.arg(0), call.len(1));
    if len > UTS_LEN - 1 {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let mut name = vec![0u8; len];
    call.mem.read(addr, &mut name)?;
    libc_result(unsafe { libc::sethostname(name.as_ptr() as *const libc::c_char, len) } as i64)
}

fn sys_setdomainname(call: &mut Call<'_>) -> SysResult {
    let (addr, len) = (call.arg(0), call.len(1));
    if len > UTS_LEN - 1 {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let mut name = vec![0u8; len];
    call.mem.read(addr, &mut name)?;
    libc_result(unsafe { libc::setdomainname(name.as_ptr() as *const libc::c_char, len) } as i64)
}

fn sys_getrlimit(call: &mut Call<'_>) -> SysResult {
    let (resource, addr) = (call.arg_i32(0), call.arg(1));
    let (abi, wide) = (call.abi, call.wide());
    let mut rl = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    libc_result(unsafe { libc::getrlimit(resource as libc::__rlimit_resource_t, &mut rl) } as i64)?;
    write_rlimit(call.mem, abi, wide, addr, rl.rlim_cur, rl.rlim_max)?;
    Ok(0)
}

fn sys_setrlimit(call: &mut Call<'_>) -> SysResult {
    let (resource, addr) = (call.arg_i32(0), call.arg(1));
    let (cur, max) = read_rlimit(call.mem, call.abi, call.wide(), addr)?;
    // The narrow all-ones value is the narrow RLIM_INFINITY.
    let widen = |v: u64| -> libc::rlim_t {
        if !call.wide() && v == u32::MAX as u64 {
            libc::RLIM_INFINITY
        } else {
            v
        }
    };
    let rl = libc::rlimit {
        rlim_cur: widen(cur),
        rlim_max: widen(max),
    };
    libc_result(unsafe { libc::setrlimit(resource as libc::__rlimit_resource_t, &rl) } as i64)
}

fn sys_prlimit64(call: &mut Call<'_>) -> SysResult {
    let (pid, resource) = (call.arg_i32(0), call.arg_i32(1));
    let (new_addr, old_addr) = (call.arg(2), call.arg(3));
    let abi = call.abi;

    // prlimit64 always uses the 64-bit struct, even on the narrow epoch.
    let new = if new_addr == 0 {
        None
    } else {
        let (cur, max) = read_rlimit(call.mem, abi, true, new_addr)?;
        Some(libc::rlimit {
            rlim_cur: cur,
            rlim_max: max,
        })
    };
    let new_ptr = new
        .as_ref()
        .map_or(std::ptr::null(), |rl| rl as *const libc::rlimit);
    let mut old = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    let old_ptr = if old_addr == 0 {
        std::ptr::null_mut()
    } else {
        &mut old as *mut libc::rlimit
    };

    libc_result(unsafe {
        libc::syscall(libc::SYS_prlimit64, pid, resource, new_ptr, old_ptr)
    })?;
    if old_addr != 0 {
        write_rlimit(call.mem, abi, true, old_addr, old.rlim_cur, old.rlim_max)?;
    }
    Ok(0)
}

fn sys_getrusage(call: &mut Call<'_>) -> SysResult {
    let (who, addr) = (call.arg_i32(0), call.arg(1));
    let (abi, wide) = (call.abi, call.wide());
    let mut ru: libc::rusage = unsafe { std::mem::zeroed() };
    libc_result(unsafe { libc::getrusage(who, &mut ru) } as i64)?;
    write_rusage(call.mem, abi, wide, addr, &rusage_to_guest(&ru))?;
    Ok(0)
}
