// SPDX-License-Identifier: MIT OR Apache-2.0

use ponte_common::syscalls::legacy32 as l;

use super::{legacy_env, ret, RAM_BASE};
use crate::marshal::{read_u16, read_u32, read_u64, write_u16, write_u32, write_u64};
use crate::mem::{GuestMem, GuestRam};
use crate::{Dispatcher, Outcome};

fn guest_pipe(d: &Dispatcher, ram: &mut GuestRam) -> (u64, u64) {
    let fds = RAM_BASE + 0x4000;
    assert_eq!(ret(d.dispatch(ram, l::SYS_pipe, [fds, 0, 0, 0, 0, 0])), 0);
    (
        read_u32(ram, d.abi(), fds).unwrap() as u64,
        read_u32(ram, d.abi(), fds + 4).unwrap() as u64,
    )
}

fn close(d: &Dispatcher, ram: &mut GuestRam, fd: u64) {
    ret(d.dispatch(ram, l::SYS_close, [fd, 0, 0, 0, 0, 0]));
}

// Guest pollfd: fd u32, events u16, revents u16 written back at +6.
#[test]
fn poll_reports_a_readable_pipe() {
    let (d, mut ram) = legacy_env();
    let (rd, wr) = guest_pipe(&d, &mut ram);

    let buf = RAM_BASE + 0x100;
    ram.write(buf, b"!").unwrap();
    assert_eq!(ret(d.dispatch(&mut ram, l::SYS_write, [wr, buf, 1, 0, 0, 0])), 1);

    let pfds = RAM_BASE;
    write_u32(&mut ram, d.abi(), pfds, rd as u32).unwrap();
    write_u16(&mut ram, d.abi(), pfds + 4, libc::POLLIN as u16).unwrap();
    write_u16(&mut ram, d.abi(), pfds + 6, 0).unwrap();

    let n = ret(d.dispatch(&mut ram, l::SYS_poll, [pfds, 1, 1000, 0, 0, 0]));
    assert_eq!(n, 1);
    let revents = read_u16(&ram, d.abi(), pfds + 6).unwrap();
    assert_ne!(revents & libc::POLLIN as u16, 0);

    close(&d, &mut ram, rd);
    close(&d, &mut ram, wr);
}

#[test]
fn epoll_round_trip_preserves_the_event_payload() {
    let (d, mut ram) = legacy_env();
    let (rd, wr) = guest_pipe(&d, &mut ram);

    let epfd = ret(d.dispatch(&mut ram, l::SYS_epoll_create1, [0; 6]));
    assert!(epfd >= 0);

    // narrow epoll_event: events u32 at 0, data u64 at 8
    let ev = RAM_BASE;
    write_u32(&mut ram, d.abi(), ev, libc::EPOLLIN as u32).unwrap();
    write_u64(&mut ram, d.abi(), ev + 8, 0xfeed_beef_0042).unwrap();
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS_epoll_ctl,
        [epfd as u64, libc::EPOLL_CTL_ADD as u64, rd, ev, 0, 0],
    ));
    assert_eq!(r, 0);

    let buf = RAM_BASE + 0x100;
    ram.write(buf, b"!").unwrap();
    assert_eq!(ret(d.dispatch(&mut ram, l::SYS_write, [wr, buf, 1, 0, 0, 0])), 1);

    let events = RAM_BASE + 0x200;
    let n = ret(d.dispatch(
        &mut ram,
        l::SYS_epoll_wait,
        [epfd as u64, events, 8, 1000, 0, 0],
    ));
    assert_eq!(n, 1);
    assert_ne!(
        read_u32(&ram, d.abi(), events).unwrap() & libc::EPOLLIN as u32,
        0
    );
    assert_eq!(
        read_u64(&ram, d.abi(), events + 8).unwrap(),
        0xfeed_beef_0042
    );

    close(&d, &mut ram, epfd as u64);
    close(&d, &mut ram, rd);
    close(&d, &mut ram, wr);
}

#[test]
fn select_times_out_on_a_quiet_fd() {
    let (d, mut ram) = legacy_env();
    let (rd, wr) = guest_pipe(&d, &mut ram);

    // readfds bitmap: one 32-bit word is enough for a low fd
    let readfds = RAM_BASE;
    write_u32(&mut ram, d.abi(), readfds + (rd / 32) * 4, 1u32 << (rd % 32)).unwrap();

    // 10ms timeout, nothing written
    let tv = RAM_BASE + 0x100;
    crate::layout::write_timeval(
        &mut ram,
        d.abi(),
        false,
        tv,
        &ponte_common::kernel_types::Timeval {
            tv_sec: 0,
            tv_usec: 10_000,
        },
    )
    .unwrap();
    let outcome = d.dispatch(
        &mut ram,
        l::SYS_select,
        [rd + 1, readfds, 0, 0, tv, 0],
    );
    assert_eq!(outcome, Outcome::Return(0));

    close(&d, &mut ram, rd);
    close(&d, &mut ram, wr);
}
