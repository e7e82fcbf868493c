// SPDX-License-Identifier: MIT OR Apache-2.0

use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use super::{legacy_env, modern_env, ret, RAM_BASE};
use crate::marshal::{read_u16, read_u32, write_u16, write_u32};
use crate::mem::GuestMem;

#[test]
fn socketpair_writes_guest_order_fds() {
    let (d, mut ram) = legacy_env();
    let sv = RAM_BASE;
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS_socketpair,
        [libc::AF_UNIX as u64, libc::SOCK_STREAM as u64, 0, sv, 0, 0],
    ));
    assert_eq!(r, 0);
    let a = read_u32(&ram, d.abi(), sv).unwrap() as u64;
    let b = read_u32(&ram, d.abi(), sv + 4).unwrap() as u64;

    let msg = RAM_BASE + 0x100;
    ram.write(msg, b"ping").unwrap();
    let n = ret(d.dispatch(&mut ram, l::SYS_write, [a, msg, 4, 0, 0, 0]));
    assert_eq!(n, 4);
    let out = RAM_BASE + 0x200;
    let n = ret(d.dispatch(&mut ram, l::SYS_read, [b, out, 4, 0, 0, 0]));
    assert_eq!(n, 4);
    let mut got = [0u8; 4];
    ram.read(out, &mut got).unwrap();
    assert_eq!(&got, b"ping");

    ret(d.dispatch(&mut ram, l::SYS_close, [a, 0, 0, 0, 0, 0]));
    ret(d.dispatch(&mut ram, l::SYS_close, [b, 0, 0, 0, 0, 0]));
}

// The family word crosses in guest byte order; the port and address stay
// in network order regardless of epoch.
#[test]
fn bind_and_getsockname_re_encode_the_family() {
    let (d, mut ram) = legacy_env();
    let fd = ret(d.dispatch(
        &mut ram,
        l::SYS_socket,
        [libc::AF_INET as u64, libc::SOCK_DGRAM as u64, 0, 0, 0, 0],
    ));
    assert!(fd >= 0, "socket -> {fd}");

    let sa = RAM_BASE;
    ram.write(sa, &[0u8; 16]).unwrap();
    write_u16(&mut ram, d.abi(), sa, libc::AF_INET as u16).unwrap();
    // port 0 lets the kernel pick; 127.0.0.1 in network order
    ram.write(sa + 4, &[127, 0, 0, 1]).unwrap();
    let r = ret(d.dispatch(&mut ram, l::SYS_bind, [fd as u64, sa, 16, 0, 0, 0]));
    assert_eq!(r, 0);

    let out = RAM_BASE + 0x40;
    let out_len = RAM_BASE + 0x80;
    write_u32(&mut ram, d.abi(), out_len, 16).unwrap();
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS_getsockname,
        [fd as u64, out, out_len, 0, 0, 0],
    ));
    assert_eq!(r, 0);
    assert_eq!(read_u32(&ram, d.abi(), out_len).unwrap(), 16);
    assert_eq!(read_u16(&ram, d.abi(), out).unwrap(), libc::AF_INET as u16);
    let mut port = [0u8; 2];
    ram.read(out + 2, &mut port).unwrap();
    assert_ne!(u16::from_be_bytes(port), 0);

    ret(d.dispatch(&mut ram, l::SYS_close, [fd as u64, 0, 0, 0, 0, 0]));
}

#[test]
fn udp_round_trip_reports_the_sender() {
    let (d, mut ram) = modern_env();
    let socket = |d: &crate::Dispatcher, ram: &mut crate::GuestRam| {
        ret(d.dispatch(
            ram,
            m::SYS_socket,
            [libc::AF_INET as u64, libc::SOCK_DGRAM as u64, 0, 0, 0, 0],
        ))
    };
    let rx = socket(&d, &mut ram);
    let tx = socket(&d, &mut ram);
    assert!(rx >= 0 && tx >= 0);

    let sa = RAM_BASE;
    ram.write(sa, &[0u8; 16]).unwrap();
    write_u16(&mut ram, d.abi(), sa, libc::AF_INET as u16).unwrap();
    ram.write(sa + 4, &[127, 0, 0, 1]).unwrap();
    let r = ret(d.dispatch(&mut ram, m::SYS_bind, [rx as u64, sa, 16, 0, 0, 0]));
    assert_eq!(r, 0);

    // getsockname fills in the kernel's port; the buffer then doubles as
    // the sendto destination.
    let dst = RAM_BASE + 0x40;
    let dst_len = RAM_BASE + 0x80;
    write_u32(&mut ram, d.abi(), dst_len, 16).unwrap();
    let r = ret(d.dispatch(
        &mut ram,
        m::SYS_getsockname,
        [rx as u64, dst, dst_len, 0, 0, 0],
    ));
    assert_eq!(r, 0);

    let msg = RAM_BASE + 0x100;
    ram.write(msg, b"datagram").unwrap();
    let n = ret(d.dispatch(
        &mut ram,
        m::SYS_sendto,
        [tx as u64, msg, 8, 0, dst, 16],
    ));
    assert_eq!(n, 8);

    let out = RAM_BASE + 0x200;
    let src = RAM_BASE + 0x240;
    let src_len = RAM_BASE + 0x280;
    write_u32(&mut ram, d.abi(), src_len, 16).unwrap();
    let n = ret(d.dispatch(
        &mut ram,
        m::SYS_recvfrom,
        [rx as u64, out, 64, 0, src, src_len],
    ));
    assert_eq!(n, 8);
    let mut got = [0u8; 8];
    ram.read(out, &mut got).unwrap();
    assert_eq!(&got, b"datagram");
    assert_eq!(read_u32(&ram, d.abi(), src_len).unwrap(), 16);
    assert_eq!(read_u16(&ram, d.abi(), src).unwrap(), libc::AF_INET as u16);

    ret(d.dispatch(&mut ram, m::SYS_close, [rx as u64, 0, 0, 0, 0, 0]));
    ret(d.dispatch(&mut ram, m::SYS_close, [tx as u64, 0, 0, 0, 0, 0]));
}

// SO_REUSEADDR is a 4-byte int option and must cross in guest byte
// order both directions.
#[test]
fn int_socket_options_cross_in_guest_order() {
    let (d, mut ram) = legacy_env();
    let fd = ret(d.dispatch(
        &mut ram,
        l::SYS_socket,
        [libc::AF_INET as u64, libc::SOCK_DGRAM as u64, 0, 0, 0, 0],
    ));
    assert!(fd >= 0);

    let val = RAM_BASE;
    write_u32(&mut ram, d.abi(), val, 1).unwrap();
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS_setsockopt,
        [
            fd as u64,
            libc::SOL_SOCKET as u64,
            libc::SO_REUSEADDR as u64,
            val,
            4,
            0,
        ],
    ));
    assert_eq!(r, 0);

    let out = RAM_BASE + 0x20;
    let out_len = RAM_BASE + 0x40;
    write_u32(&mut ram, d.abi(), out_len, 4).unwrap();
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS_getsockopt,
        [
            fd as u64,
            libc::SOL_SOCKET as u64,
            libc::SO_REUSEADDR as u64,
            out,
            out_len,
            0,
        ],
    ));
    assert_eq!(r, 0);
    assert_eq!(read_u32(&ram, d.abi(), out_len).unwrap(), 4);
    assert_eq!(read_u32(&ram, d.abi(), out).unwrap(), 1);

    ret(d.dispatch(&mut ram, l::SYS_close, [fd as u64, 0, 0, 0, 0, 0]));
}
