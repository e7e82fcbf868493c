// SPDX-License-Identifier: MIT OR Apache-2.0

mod basic_io;
mod filesystem;
mod ipc;
mod marshal;
mod poll;
mod process;
mod socket;
mod sync;
mod table;
mod time;

use once_cell::sync::Lazy;

use crate::mem::GuestMem;
use crate::{Abi, Dispatcher, GuestRam, Outcome};

pub(crate) const RAM_BASE: u64 = 0x0001_0000;
pub(crate) const RAM_SIZE: usize = 256 * 1024;

static LOG: Lazy<()> = Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub(crate) fn legacy_env() -> (Dispatcher, GuestRam) {
    Lazy::force(&LOG);
    (
        Dispatcher::new(Abi::legacy32_be()),
        GuestRam::new(RAM_BASE, RAM_SIZE),
    )
}

pub(crate) fn modern_env() -> (Dispatcher, GuestRam) {
    Lazy::force(&LOG);
    (
        Dispatcher::new(Abi::modern64_le()),
        GuestRam::new(RAM_BASE, RAM_SIZE),
    )
}

/// Unwraps a `Return` outcome; exits are a test failure here.
pub(crate) fn ret(outcome: Outcome) -> i64 {
    match outcome {
        Outcome::Return(v) => v,
        Outcome::Exit(status) => panic!("unexpected guest exit({status})"),
    }
}

pub(crate) fn neg(errno: i32) -> i64 {
    -(errno as i64)
}

/// Places a NUL-terminated string in guest memory.
pub(crate) fn put_cstr(ram: &mut GuestRam, addr: u64, s: &str) {
    ram.write(addr, s.as_bytes()).unwrap();
    ram.write(addr + s.len() as u64, &[0]).unwrap();
}

/// A /tmp path unique to this test process.
pub(crate) fn scratch_path(tag: &str) -> String {
    format!("/tmp/ponte-test-{}-{tag}", std::process::id())
}
