// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs;

use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use super::{legacy_env, modern_env, put_cstr, ret, scratch_path, RAM_BASE};
use crate::layout::read_stat;
use crate::mem::GuestMem;

#[test]
fn stat_decodes_into_the_narrow_layout() {
    let (d, mut ram) = legacy_env();
    let file = scratch_path("stat");
    fs::write(&file, b"0123456789").unwrap();

    let path = RAM_BASE;
    put_cstr(&mut ram, path, &file);
    let buf = RAM_BASE + 0x100;
    assert_eq!(ret(d.dispatch(&mut ram, l::SYS_stat, [path, buf, 0, 0, 0, 0])), 0);

    let st = read_stat(&ram, d.abi(), false, buf).unwrap();
    assert_eq!(st.st_size, 10);
    assert_eq!(st.st_mode & libc::S_IFMT, libc::S_IFREG);

    // the same operation under the wide alias carries full-width fields
    assert_eq!(ret(d.dispatch(&mut ram, l::SYS_stat64, [path, buf, 0, 0, 0, 0])), 0);
    let st64 = read_stat(&ram, d.abi(), true, buf).unwrap();
    assert_eq!(st64.st_size, 10);
    assert_eq!(st64.st_ino & 0xffff_ffff, st.st_ino);

    fs::remove_file(&file).unwrap();
}

#[test]
fn getcwd_fills_the_guest_buffer() {
    let (d, mut ram) = modern_env();
    let buf = RAM_BASE;
    let n = ret(d.dispatch(&mut ram, m::SYS_getcwd, [buf, 4096, 0, 0, 0, 0]));
    assert!(n > 1, "getcwd -> {n}");

    let mut got = vec![0u8; n as usize];
    ram.read(buf, &mut got).unwrap();
    assert_eq!(got.pop(), Some(0));
    let host = std::env::current_dir().unwrap();
    assert_eq!(got, host.to_str().unwrap().as_bytes());
}

#[test]
fn symlink_and_readlink_round_trip() {
    let (d, mut ram) = legacy_env();
    let target = scratch_path("target");
    let link = scratch_path("link");
    fs::write(&target, b"x").unwrap();

    let target_addr = RAM_BASE;
    let link_addr = RAM_BASE + 0x100;
    put_cstr(&mut ram, target_addr, &target);
    put_cstr(&mut ram, link_addr, &link);
    assert_eq!(
        ret(d.dispatch(&mut ram, l::SYS_symlink, [target_addr, link_addr, 0, 0, 0, 0])),
        0
    );

    let buf = RAM_BASE + 0x200;
    let n = ret(d.dispatch(&mut ram, l::SYS_readlink, [link_addr, buf, 256, 0, 0, 0]));
    assert_eq!(n as usize, target.len());
    let mut got = vec![0u8; n as usize];
    ram.read(buf, &mut got).unwrap();
    assert_eq!(got, target.as_bytes());

    fs::remove_file(&link).unwrap();
    fs::remove_file(&target).unwrap();
}

#[test]
fn mkdir_and_rmdir() {
    let (d, mut ram) = legacy_env();
    let dir = scratch_path("dir");
    let path = RAM_BASE;
    put_cstr(&mut ram, path, &dir);

    assert_eq!(ret(d.dispatch(&mut ram, l::SYS_mkdir, [path, 0o755, 0, 0, 0, 0])), 0);
    assert!(fs::metadata(&dir).unwrap().is_dir());
    assert_eq!(ret(d.dispatch(&mut ram, l::SYS_rmdir, [path, 0, 0, 0, 0, 0])), 0);
    assert!(fs::metadata(&dir).is_err());
}
