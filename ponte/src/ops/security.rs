// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability sets, Landlock sandboxing, and random bytes.

use ponte_common::kernel_types::CapUserHeader;
use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use crate::dispatch::Call;
use crate::errno::{libc_result, Fault, SysResult};
use crate::layout::{
    read_cap_data, read_cap_header, write_cap_data, write_cap_header, CAP_USER_DATA,
    LANDLOCK_NET_PORT, LANDLOCK_PATH_BENEATH,
};
use crate::marshal::{read_struct, read_u64};
use crate::mem::GuestMem;
use crate::ops::host_buf_mut;
use crate::table::{OperationSpec, SyscallTable};

/// Capability ABI versions; V1 carries one 32-bit set per pointer, the
/// later ones two.
const CAP_VERSION_1: u32 = 0x1998_0330;
const CAP_VERSION_2: u32 = 0x2007_1026;
const CAP_VERSION_3: u32 = 0x2008_0522;

const LANDLOCK_RULE_PATH_BENEATH: u32 = 1;
const LANDLOCK_RULE_NET_PORT: u32 = 2;

/// Upper bound on a caller-sized ruleset attr; far beyond any version
/// the kernel defines.
const LANDLOCK_ATTR_MAX: usize = 256;

static CAPGET: OperationSpec = OperationSpec::handler("capget", sys_capget);
static CAPSET: OperationSpec = OperationSpec::handler("capset", sys_capset);
static GETRANDOM: OperationSpec = OperationSpec::handler("getrandom", sys_getrandom);
static LANDLOCK_CREATE_RULESET: OperationSpec =
    OperationSpec::handler("landlock_create_ruleset", sys_landlock_create_ruleset);
static LANDLOCK_ADD_RULE: OperationSpec =
    OperationSpec::handler("landlock_add_rule", sys_landlock_add_rule);
static LANDLOCK_RESTRICT_SELF: OperationSpec = OperationSpec::passthrough(
    "landlock_restrict_self",
    libc::SYS_landlock_restrict_self,
    2,
);

pub(crate) fn register(t: &mut SyscallTable) {
    t.both(l::SYS_capget, m::SYS_capget, &CAPGET);
    t.both(l::SYS_capset, m::SYS_capset, &CAPSET);
    t.both(l::SYS_getrandom, m::SYS_getrandom, &GETRANDOM);
    t.both(
        l::SYS_landlock_create_ruleset,
        m::SYS_landlock_create_ruleset,
        &LANDLOCK_CREATE_RULESET,
    );
    t.both(l::SYS_landlock_add_rule, m::SYS_landlock_add_rule, &LANDLOCK_ADD_RULE);
    t.both(
        l::SYS_landlock_restrict_self,
        m::SYS_landlock_restrict_self,
        &LANDLOCK_RESTRICT_SELF,
    );
}

#[repr(C)]
struct RawCapHeader {
    version: u32,
    pid: i32,
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
struct RawCapData {
    effective: u32,
    permitted: u32,
    inheritable: u32,
}

fn cap_sets(version: u32) -> u64 {
    if version == CAP_VERSION_1 {
        1
    } else {
        2
    }
}

fn known_cap_version(version: u32) -> bool {
    matches!(version, CAP_VERSION_1 | CAP_VERSION_2 | CAP_VERSION_3)
}

fn sys_capget(call: &mut Call<'_>) -> SysResult {
    let (hdr_addr, data_addr) = (call.arg(0), call.arg(1));
    let abi = call.abi;
    let hdr = read_cap_header(call.mem, abi, hdr_addr)?;

    let mut raw_hdr = RawCapHeader {
        version: hdr.version,
        pid: hdr.pid,
    };
    let mut raw_data = [RawCapData::default(); 2];
    let data_ptr = if data_addr == 0 {
        std::ptr::null_mut()
    } else {
        raw_data.as_mut_ptr()
    };
    let ret = unsafe { libc::syscall(libc::SYS_capget, &mut raw_hdr as *mut RawCapHeader, data_ptr) };

    // Version negotiation: on an unknown version the kernel rewrites the
    // header with its preferred one and fails with EINVAL, so the header
    // goes back to the guest whether the call succeeded or not.
    write_cap_header(
        call.mem,
        abi,
        hdr_addr,
        &CapUserHeader {
            version: raw_hdr.version,
            pid: raw_hdr.pid,
        },
    )?;
    libc_result(ret)?;

    if data_addr != 0 {
        for i in 0..cap_sets(hdr.version) {
            let d = &raw_data[i as usize];
            write_cap_data(
                call.mem,
                abi,
                data_addr + i * CAP_USER_DATA.size as u64,
                &ponte_common::kernel_types::CapUserData {
                    effective: d.effective,
                    permitted: d.permitted,
                    inheritable: d.inheritable,
                },
            )?;
        }
    }
    Ok(0)
}

fn sys_capset(call: &mut Call<'_>) -> SysResult {
    let (hdr_addr, data_addr) = (call.arg(0), call.arg(1));
    let abi = call.abi;
    let hdr = read_cap_header(call.mem, abi, hdr_addr)?;

    let mut raw_hdr = RawCapHeader {
        version: hdr.version,
        pid: hdr.pid,
    };
    let mut raw_data = [RawCapData::default(); 2];
    // An unknown version is a pure version query: the kernel rewrites the
    // header and fails without ever reading the data, so neither do we.
    let data_ptr = if known_cap_version(hdr.version) && data_addr != 0 {
        for i in 0..cap_sets(hdr.version) {
            let d = read_cap_data(call.mem, abi, data_addr + i * CAP_USER_DATA.size as u64)?;
            raw_data[i as usize] = RawCapData {
                effective: d.effective,
                permitted: d.permitted,
                inheritable: d.inheritable,
            };
        }
        raw_data.as_ptr()
    } else {
        std::ptr::null()
    };
    let ret = unsafe {
        libc::syscall(libc::SYS_capset, &mut raw_hdr as *mut RawCapHeader, data_ptr)
    };

    // Same negotiation contract as capget: the rewritten header reaches
    // the guest whether the call succeeded or not.
    write_cap_header(
        call.mem,
        abi,
        hdr_addr,
        &CapUserHeader {
            version: raw_hdr.version,
            pid: raw_hdr.pid,
        },
    )?;
    libc_result(ret)
}

fn sys_getrandom(call: &mut Call<'_>) -> SysResult {
    let (addr, len, flags) = (call.arg(0), call.len(1), call.arg(2) as libc::c_uint);
    let buf = host_buf_mut(call, addr, len)?;
    libc_result(unsafe { libc::getrandom(buf as *mut libc::c_void, len, flags) } as i64)
}

fn sys_landlock_create_ruleset(call: &mut Call<'_>) -> SysResult {
    let (attr_addr, size, flags) = (call.arg(0), call.len(1), call.arg(2) as u32);

    // A null attr with zero size asks for the supported ABI version.
    if attr_addr == 0 && size == 0 {
        return libc_result(unsafe {
            libc::syscall(
                libc::SYS_landlock_create_ruleset,
                std::ptr::null::<u8>(),
                0usize,
                flags,
            )
        });
    }
    if size < 8 {
        return Err(Fault::Errno(libc::EINVAL));
    }
    if size > LANDLOCK_ATTR_MAX {
        return Err(Fault::Errno(libc::E2BIG));
    }

    // The struct is caller-sized and versioned by its size: every field
    // is a u64 flag mask, so the whole thing re-encodes as words and the
    // host sees the guest's exact size. A struct newer than the host
    // kernel fails there with E2BIG instead of losing its trailing bits.
    let words = size / 8;
    let mut raw = Vec::with_capacity(size);
    for i in 0..words {
        let v = read_u64(call.mem, call.abi, attr_addr + i as u64 * 8)?;
        raw.extend_from_slice(&v.to_ne_bytes());
    }
    let tail = size % 8;
    if tail != 0 {
        let mut rest = vec![0u8; tail];
        call.mem.read(attr_addr + (size - tail) as u64, &mut rest)?;
        raw.extend_from_slice(&rest);
    }
    libc_result(unsafe {
        libc::syscall(
            libc::SYS_landlock_create_ruleset,
            raw.as_ptr(),
            size,
            flags,
        )
    })
}

fn sys_landlock_add_rule(call: &mut Call<'_>) -> SysResult {
    let (fd, rule_type, attr_addr) = (call.fd(0), call.arg(1) as u32, call.arg(2));
    let flags = call.arg(3) as u32;

    // Both attr structs are packed on the host side, so the bytes are
    // assembled by hand.
    let raw: Vec<u8> = match rule_type {
        LANDLOCK_RULE_PATH_BENEATH => {
            let v = read_struct(call.mem, call.abi, attr_addr, &LANDLOCK_PATH_BENEATH)?;
            let mut buf = Vec::with_capacity(12);
            buf.extend_from_slice(&(v[0] as u64).to_ne_bytes());
            buf.extend_from_slice(&(v[1] as i32).to_ne_bytes());
            buf
        }
        LANDLOCK_RULE_NET_PORT => {
            let v = read_struct(call.mem, call.abi, attr_addr, &LANDLOCK_NET_PORT)?;
            let mut buf = Vec::with_capacity(16);
            buf.extend_from_slice(&(v[0] as u64).to_ne_bytes());
            buf.extend_from_slice(&(v[1] as u64).to_ne_bytes());
            buf
        }
        _ => return Err(Fault::Errno(libc::EINVAL)),
    };

    libc_result(unsafe {
        libc::syscall(
            libc::SYS_landlock_add_rule,
            fd,
            rule_type,
            raw.as_ptr(),
            flags,
        )
    })
}
