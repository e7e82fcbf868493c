// SPDX-License-Identifier: MIT OR Apache-2.0

use std::process::Command;

use ponte_common::syscalls::{legacy32 as l, modern64 as m};
use serial_test::serial;

use super::{legacy_env, modern_env, ret, RAM_BASE};
use crate::layout::read_rlimit;
use crate::marshal::read_u32;
use crate::mem::GuestMem;

#[test]
fn getpid_matches_the_host() {
    let (d, mut ram) = modern_env();
    let pid = ret(d.dispatch(&mut ram, m::SYS_getpid, [0; 6]));
    assert_eq!(pid, std::process::id() as i64);

    let (d, mut ram) = legacy_env();
    let pid = ret(d.dispatch(&mut ram, l::SYS_getpid, [0; 6]));
    assert_eq!(pid, std::process::id() as i64);
}

fn uts_str(ram: &crate::GuestRam, addr: u64) -> String {
    let mut buf = [0u8; 65];
    ram.read(addr, &mut buf).unwrap();
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

#[test]
fn uname_reports_the_guest_machine() {
    let (d, mut ram) = legacy_env();
    let addr = RAM_BASE;
    assert_eq!(ret(d.dispatch(&mut ram, l::SYS_uname, [addr, 0, 0, 0, 0, 0])), 0);
    assert_eq!(uts_str(&ram, addr), "Linux");
    assert_eq!(uts_str(&ram, addr + 4 * 65), "m68k");

    let (d, mut ram) = modern_env();
    assert_eq!(ret(d.dispatch(&mut ram, m::SYS_uname, [addr, 0, 0, 0, 0, 0])), 0);
    assert_eq!(uts_str(&ram, addr + 4 * 65), "x86_64");
}

#[test]
#[serial]
fn wait4_reaps_a_spawned_child() {
    let (d, mut ram) = modern_env();
    let child = Command::new("/bin/true").spawn().unwrap();
    let pid = child.id() as i64;

    let status_addr = RAM_BASE;
    let reaped = ret(d.dispatch(
        &mut ram,
        m::SYS_wait4,
        [pid as u64, status_addr, 0, 0, 0, 0],
    ));
    assert_eq!(reaped, pid);
    // exited(0)
    assert_eq!(read_u32(&ram, d.abi(), status_addr).unwrap(), 0);
}

#[test]
fn prlimit64_reads_what_the_host_reports() {
    let (d, mut ram) = modern_env();
    let old = RAM_BASE;
    let r = ret(d.dispatch(
        &mut ram,
        m::SYS_prlimit64,
        [0, libc::RLIMIT_NOFILE as u64, 0, old, 0, 0],
    ));
    assert_eq!(r, 0);

    let (cur, max) = read_rlimit(&ram, d.abi(), true, old).unwrap();
    let mut host = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut host) };
    assert_eq!(cur, host.rlim_cur);
    assert_eq!(max, host.rlim_max);
}

// Narrow guests see values clamped to what 32 bits can carry.
#[test]
fn narrow_getrlimit_clamps_unbounded_limits() {
    let (d, mut ram) = legacy_env();
    let addr = RAM_BASE;
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS_ugetrlimit,
        [libc::RLIMIT_NOFILE as u64, addr, 0, 0, 0, 0],
    ));
    assert_eq!(r, 0);

    let (cur, max) = read_rlimit(&ram, d.abi(), false, addr).unwrap();
    let mut host = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut host) };
    assert_eq!(cur, host.rlim_cur.min(u32::MAX as u64));
    assert_eq!(max, host.rlim_max.min(u32::MAX as u64));
}
