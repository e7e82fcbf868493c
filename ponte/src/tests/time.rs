// SPDX-License-Identifier: MIT OR Apache-2.0

use ponte_common::kernel_types::Timespec;
use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use super::{legacy_env, modern_env, ret, RAM_BASE};
use crate::layout::{read_timespec, read_timeval, write_timespec};
use crate::marshal::{read_u32, read_u64};
use crate::mem::GuestMem;

fn host_monotonic() -> i64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
    ts.tv_sec
}

#[test]
fn clock_gettime_decodes_in_guest_byte_order() {
    let (d, mut ram) = legacy_env();
    let addr = RAM_BASE;
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS_clock_gettime,
        [libc::CLOCK_MONOTONIC as u64, addr, 0, 0, 0, 0],
    ));
    assert_eq!(r, 0);

    let ts = read_timespec(&ram, d.abi(), false, addr).unwrap();
    assert!((ts.seconds - host_monotonic()).abs() <= 1);
    assert!((0..1_000_000_000).contains(&ts.nanos));
}

#[test]
fn clock_gettime_wide_alias_uses_the_wide_layout() {
    let (d, mut ram) = legacy_env();
    let addr = RAM_BASE;
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS_clock_gettime64,
        [libc::CLOCK_MONOTONIC as u64, addr, 0, 0, 0, 0],
    ));
    assert_eq!(r, 0);

    let ts = read_timespec(&ram, d.abi(), true, addr).unwrap();
    assert!((ts.seconds - host_monotonic()).abs() <= 1);
}

#[test]
fn clock_gettime_on_the_wide_epoch() {
    let (d, mut ram) = modern_env();
    let addr = RAM_BASE;
    let r = ret(d.dispatch(
        &mut ram,
        m::SYS_clock_gettime,
        [libc::CLOCK_MONOTONIC as u64, addr, 0, 0, 0, 0],
    ));
    assert_eq!(r, 0);
    let ts = read_timespec(&ram, d.abi(), true, addr).unwrap();
    assert!((ts.seconds - host_monotonic()).abs() <= 1);
}

#[test]
fn nanosleep_completes() {
    let (d, mut ram) = legacy_env();
    let req = RAM_BASE;
    write_timespec(
        &mut ram,
        d.abi(),
        false,
        req,
        &Timespec {
            seconds: 0,
            nanos: 1_000_000,
        },
    )
    .unwrap();
    let r = ret(d.dispatch(&mut ram, l::SYS_nanosleep, [req, 0, 0, 0, 0, 0]));
    assert_eq!(r, 0);
}

#[test]
fn gettimeofday_is_plausible() {
    let (d, mut ram) = modern_env();
    let addr = RAM_BASE;
    let r = ret(d.dispatch(&mut ram, m::SYS_gettimeofday, [addr, 0, 0, 0, 0, 0]));
    assert_eq!(r, 0);

    let tv = read_timeval(&ram, d.abi(), true, addr).unwrap();
    let host = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    assert!((tv.tv_sec - host).abs() <= 1);
}

#[test]
fn time_writes_a_wide_time_t() {
    let (d, mut ram) = legacy_env();
    let addr = RAM_BASE;
    let r = ret(d.dispatch(&mut ram, l::SYS_time, [addr, 0, 0, 0, 0, 0]));
    let host = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    assert!((r - host).abs() <= 1);
    assert_eq!(read_u64(&ram, d.abi(), addr).unwrap() as i64, r);
}

#[test]
fn times_fills_four_word_width_counters() {
    let (d, mut ram) = legacy_env();
    let addr = RAM_BASE;
    ram.write(addr, &[0xff; 16]).unwrap();
    let r = ret(d.dispatch(&mut ram, l::SYS_times, [addr, 0, 0, 0, 0, 0]));
    assert!(r >= 0, "times -> {r}");
    // a fresh test process has burned less than u32::MAX ticks
    let user = read_u32(&ram, d.abi(), addr).unwrap();
    assert_ne!(user, 0xffff_ffff);
}
