// SPDX-License-Identifier: MIT OR Apache-2.0

use ponte_common::kernel_types::Timespec;
use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use super::{legacy_env, modern_env, neg, ret, RAM_BASE};
use crate::layout::write_timespec;
use crate::marshal::write_u32;

#[test]
fn futex_wake_with_no_waiters() {
    let (d, mut ram) = modern_env();
    let cell = RAM_BASE;
    write_u32(&mut ram, d.abi(), cell, 1).unwrap();
    let r = ret(d.dispatch(
        &mut ram,
        m::SYS_futex,
        [cell, libc::FUTEX_WAKE as u64, 1, 0, 0, 0],
    ));
    assert_eq!(r, 0);
}

// The kernel compares the raw cell; a big-endian guest's stored value
// only matches after the expected value is swapped to match.
#[test]
fn futex_wait_sees_the_guest_stored_value() {
    let (d, mut ram) = legacy_env();
    let cell = RAM_BASE;
    write_u32(&mut ram, d.abi(), cell, 0x0000_0001).unwrap();

    // Mismatched expectation fails immediately.
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS_futex,
        [cell, libc::FUTEX_WAIT as u64, 2, 0, 0, 0],
    ));
    assert_eq!(r, neg(libc::EAGAIN));

    // Matching expectation blocks until the (tiny) timeout. Reaching
    // ETIMEDOUT proves the comparison value was swapped correctly.
    let tmo = RAM_BASE + 0x40;
    write_timespec(
        &mut ram,
        d.abi(),
        false,
        tmo,
        &Timespec {
            seconds: 0,
            nanos: 1_000_000,
        },
    )
    .unwrap();
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS_futex,
        [cell, libc::FUTEX_WAIT as u64, 1, tmo, 0, 0],
    ));
    assert_eq!(r, neg(libc::ETIMEDOUT));
}

#[test]
fn futex_pi_operations_are_refused() {
    let (d, mut ram) = modern_env();
    let cell = RAM_BASE;
    let r = ret(d.dispatch(
        &mut ram,
        m::SYS_futex,
        [cell, libc::FUTEX_LOCK_PI as u64, 0, 0, 0, 0],
    ));
    assert_eq!(r, neg(libc::ENOSYS));
}
