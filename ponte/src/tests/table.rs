// SPDX-License-Identifier: MIT OR Apache-2.0

use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use super::{legacy_env, modern_env, neg, ret};
use crate::table::table;
use crate::{AbiEpoch, Outcome};

#[test]
fn core_numbers_resolve_on_both_epochs() {
    let t = table();
    for (lnr, mnr, name) in [
        (l::SYS_read, m::SYS_read, "read"),
        (l::SYS_write, m::SYS_write, "write"),
        (l::SYS_openat, m::SYS_openat, "openat"),
        (l::SYS_clock_gettime, m::SYS_clock_gettime, "clock_gettime"),
        (l::SYS_futex, m::SYS_futex, "futex"),
        (l::SYS_wait4, m::SYS_wait4, "wait4"),
        (l::SYS_capget, m::SYS_capget, "capget"),
    ] {
        let le = t.resolve(AbiEpoch::Legacy32, lnr).unwrap();
        let me = t.resolve(AbiEpoch::Modern64, mnr).unwrap();
        assert_eq!(le.spec.name, name);
        assert!(
            std::ptr::eq(le.spec, me.spec),
            "{name} diverges between epochs"
        );
    }
}

#[test]
fn wide_aliases_share_the_plain_operation() {
    let t = table();
    for (alias, plain) in [
        (l::SYS_clock_gettime64, l::SYS_clock_gettime),
        (l::SYS_futex_time64, l::SYS_futex),
        (l::SYS_fstat64, l::SYS_fstat),
        (l::SYS_ppoll_time64, l::SYS_ppoll),
        (l::SYS_mq_timedsend_time64, l::SYS_mq_timedsend),
    ] {
        let a = t.resolve(AbiEpoch::Legacy32, alias).unwrap();
        let p = t.resolve(AbiEpoch::Legacy32, plain).unwrap();
        assert!(std::ptr::eq(a.spec, p.spec), "{} != {}", a.spec.name, p.spec.name);
    }
}

#[test]
fn the_multiplexer_is_legacy_only() {
    let t = table();
    assert!(t.resolve(AbiEpoch::Legacy32, l::SYS_ipc).is_some());
    assert!(t.resolve(AbiEpoch::Modern64, l::SYS_ipc).map_or(true, |e| e.spec.name != "ipc"));
}

#[test]
fn unknown_numbers_return_enosys() {
    let (d, mut ram) = modern_env();
    assert_eq!(ret(d.dispatch(&mut ram, 60000, [0; 6])), neg(libc::ENOSYS));

    let (d, mut ram) = legacy_env();
    assert_eq!(ret(d.dispatch(&mut ram, 60000, [0; 6])), neg(libc::ENOSYS));
}

#[test]
fn exit_surfaces_as_an_outcome() {
    let (d, mut ram) = legacy_env();
    assert_eq!(
        d.dispatch(&mut ram, l::SYS_exit, [7, 0, 0, 0, 0, 0]),
        Outcome::Exit(7)
    );

    let (d, mut ram) = modern_env();
    assert_eq!(
        d.dispatch(&mut ram, m::SYS_exit_group, [3, 0, 0, 0, 0, 0]),
        Outcome::Exit(3)
    );
}
