// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs;

use ponte_common::kernel_types::legacy_open_flags;
use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use super::{legacy_env, modern_env, neg, put_cstr, ret, scratch_path, RAM_BASE};
use crate::marshal::read_u32;
use crate::mem::GuestMem;

#[test]
fn write_reaches_the_host_fd() {
    let (d, mut ram) = legacy_env();
    let path = RAM_BASE;
    put_cstr(&mut ram, path, "/dev/null");

    let fd = ret(d.dispatch(
        &mut ram,
        l::SYS_open,
        [path, libc::O_WRONLY as u64, 0, 0, 0, 0],
    ));
    assert!(fd >= 0, "open(/dev/null) -> {fd}");

    let buf = RAM_BASE + 0x100;
    ram.write(buf, b"ponte").unwrap();
    let n = ret(d.dispatch(&mut ram, l::SYS_write, [fd as u64, buf, 5, 0, 0, 0]));
    assert_eq!(n, 5);

    assert_eq!(ret(d.dispatch(&mut ram, l::SYS_close, [fd as u64, 0, 0, 0, 0, 0])), 0);
}

#[test]
fn read_fills_guest_memory() {
    let (d, mut ram) = modern_env();
    let file = scratch_path("read");
    fs::write(&file, b"hello from the host").unwrap();

    let path = RAM_BASE;
    put_cstr(&mut ram, path, &file);
    let fd = ret(d.dispatch(
        &mut ram,
        m::SYS_openat,
        [libc::AT_FDCWD as u64, path, libc::O_RDONLY as u64, 0, 0, 0],
    ));
    assert!(fd >= 0);

    let buf = RAM_BASE + 0x100;
    let n = ret(d.dispatch(&mut ram, m::SYS_read, [fd as u64, buf, 64, 0, 0, 0]));
    assert_eq!(n, 19);
    let mut got = vec![0u8; n as usize];
    ram.read(buf, &mut got).unwrap();
    assert_eq!(&got, b"hello from the host");

    ret(d.dispatch(&mut ram, m::SYS_close, [fd as u64, 0, 0, 0, 0, 0]));
    fs::remove_file(&file).unwrap();
}

#[test]
fn pipe_fds_land_big_endian_in_guest_memory() {
    let (d, mut ram) = legacy_env();
    let fds_addr = RAM_BASE;
    assert_eq!(ret(d.dispatch(&mut ram, l::SYS_pipe, [fds_addr, 0, 0, 0, 0, 0])), 0);

    let rd = read_u32(&ram, d.abi(), fds_addr).unwrap() as u64;
    let wr = read_u32(&ram, d.abi(), fds_addr + 4).unwrap() as u64;

    let buf = RAM_BASE + 0x100;
    ram.write(buf, b"xy").unwrap();
    assert_eq!(ret(d.dispatch(&mut ram, l::SYS_write, [wr, buf, 2, 0, 0, 0])), 2);

    let out = RAM_BASE + 0x200;
    assert_eq!(ret(d.dispatch(&mut ram, l::SYS_read, [rd, out, 2, 0, 0, 0])), 2);
    let mut got = [0u8; 2];
    ram.read(out, &mut got).unwrap();
    assert_eq!(&got, b"xy");

    ret(d.dispatch(&mut ram, l::SYS_close, [rd, 0, 0, 0, 0, 0]));
    ret(d.dispatch(&mut ram, l::SYS_close, [wr, 0, 0, 0, 0, 0]));
}

// The narrow epoch passes 64-bit offsets as hi/lo register pairs, high
// half first.
#[test]
fn pread_folds_the_register_pair() {
    let (d, mut ram) = legacy_env();
    let file = scratch_path("pread");
    fs::write(&file, b"0123456789abcdef").unwrap();

    let path = RAM_BASE;
    put_cstr(&mut ram, path, &file);
    let fd = ret(d.dispatch(
        &mut ram,
        l::SYS_open,
        [path, libc::O_RDONLY as u64, 0, 0, 0, 0],
    ));
    assert!(fd >= 0);

    let buf = RAM_BASE + 0x100;
    let n = ret(d.dispatch(
        &mut ram,
        l::SYS_pread64,
        [fd as u64, buf, 6, 0, 10, 0],
    ));
    assert_eq!(n, 6);
    let mut got = [0u8; 6];
    ram.read(buf, &mut got).unwrap();
    assert_eq!(&got, b"abcdef");

    ret(d.dispatch(&mut ram, l::SYS_close, [fd as u64, 0, 0, 0, 0, 0]));
    fs::remove_file(&file).unwrap();
}

#[test]
fn llseek_writes_the_folded_position_back() {
    let (d, mut ram) = legacy_env();
    let file = scratch_path("llseek");
    fs::write(&file, vec![0u8; 100]).unwrap();

    let path = RAM_BASE;
    put_cstr(&mut ram, path, &file);
    let fd = ret(d.dispatch(
        &mut ram,
        l::SYS_open,
        [path, libc::O_RDONLY as u64, 0, 0, 0, 0],
    ));
    assert!(fd >= 0);

    let result = RAM_BASE + 0x100;
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS__llseek,
        [fd as u64, 0, 40, result, libc::SEEK_SET as u64, 0],
    ));
    assert_eq!(r, 0);
    let pos = crate::marshal::read_u64(&ram, d.abi(), result).unwrap();
    assert_eq!(pos, 40);

    ret(d.dispatch(&mut ram, l::SYS_close, [fd as u64, 0, 0, 0, 0, 0]));
    fs::remove_file(&file).unwrap();
}

// The narrow epoch's O_DIRECTORY bit sits where the host keeps O_DIRECT;
// untranslated it would silently change meaning instead of failing.
#[test]
fn legacy_open_flags_are_translated() {
    let (d, mut ram) = legacy_env();
    let file = scratch_path("flags");
    fs::write(&file, b"x").unwrap();

    let path = RAM_BASE;
    put_cstr(&mut ram, path, &file);
    let r = ret(d.dispatch(
        &mut ram,
        l::SYS_open,
        [
            path,
            (libc::O_RDONLY | legacy_open_flags::O_DIRECTORY) as u64,
            0,
            0,
            0,
            0,
        ],
    ));
    assert_eq!(r, neg(libc::ENOTDIR));
    fs::remove_file(&file).unwrap();
}

#[test]
fn faulting_buffer_returns_efault() {
    let (d, mut ram) = modern_env();
    let r = ret(d.dispatch(&mut ram, m::SYS_pipe, [0xdead_0000, 0, 0, 0, 0, 0]));
    assert_eq!(r, neg(libc::EFAULT));
}
