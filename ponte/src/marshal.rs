// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argument marshaling primitives.
//!
//! Everything that crosses the guest/host boundary goes through here:
//! endian- and width-aware scalar codecs, C strings, scatter/gather
//! vectors, fd_sets, signal masks, and a single generic struct codec
//! driven by layout tables. Per-struct byte arithmetic is confined to the
//! tables in [`crate::layout`].

use std::ffi::CString;

use ponte_common::{Abi, Endian, WordWidth};

use crate::errno::Fault;
use crate::mem::{GuestMem, MemFault};

pub fn read_u16(mem: &dyn GuestMem, abi: Abi, addr: u64) -> Result<u16, MemFault> {
    let mut buf = [0u8; 2];
    mem.read(addr, &mut buf)?;
    Ok(match abi.endian {
        Endian::Big => u16::from_be_bytes(buf),
        Endian::Little => u16::from_le_bytes(buf),
    })
}

pub fn read_u32(mem: &dyn GuestMem, abi: Abi, addr: u64) -> Result<u32, MemFault> {
    let mut buf = [0u8; 4];
    mem.read(addr, &mut buf)?;
    Ok(match abi.endian {
        Endian::Big => u32::from_be_bytes(buf),
        Endian::Little => u32::from_le_bytes(buf),
    })
}

pub fn read_u64(mem: &dyn GuestMem, abi: Abi, addr: u64) -> Result<u64, MemFault> {
    let mut buf = [0u8; 8];
    mem.read(addr, &mut buf)?;
    Ok(match abi.endian {
        Endian::Big => u64::from_be_bytes(buf),
        Endian::Little => u64::from_le_bytes(buf),
    })
}

pub fn write_u16(mem: &mut dyn GuestMem, abi: Abi, addr: u64, val: u16) -> Result<(), MemFault> {
    let buf = match abi.endian {
        Endian::Big => val.to_be_bytes(),
        Endian::Little => val.to_le_bytes(),
    };
    mem.write(addr, &buf)
}

pub fn write_u32(mem: &mut dyn GuestMem, abi: Abi, addr: u64, val: u32) -> Result<(), MemFault> {
    let buf = match abi.endian {
        Endian::Big => val.to_be_bytes(),
        Endian::Little => val.to_le_bytes(),
    };
    mem.write(addr, &buf)
}

pub fn write_u64(mem: &mut dyn GuestMem, abi: Abi, addr: u64, val: u64) -> Result<(), MemFault> {
    let buf = match abi.endian {
        Endian::Big => val.to_be_bytes(),
        Endian::Little => val.to_le_bytes(),
    };
    mem.write(addr, &buf)
}

/// Read one machine word at the guest's native width, zero-extended.
pub fn read_word(mem: &dyn GuestMem, abi: Abi, addr: u64) -> Result<u64, MemFault> {
    match abi.width {
        WordWidth::W32 => Ok(read_u32(mem, abi, addr)? as u64),
        WordWidth::W64 => read_u64(mem, abi, addr),
    }
}

pub fn write_word(mem: &mut dyn GuestMem, abi: Abi, addr: u64, val: u64) -> Result<(), MemFault> {
    match abi.width {
        WordWidth::W32 => write_u32(mem, abi, addr, val as u32),
        WordWidth::W64 => write_u64(mem, abi, addr, val),
    }
}

/// Upper bound on guest C strings; PATH_MAX on Linux.
const CSTRING_MAX: usize = 4096;

/// Read a NUL-terminated string from guest memory. A mapping hole is a
/// memory fault; a string that runs past `CSTRING_MAX` without a NUL is
/// an overlong path and reports ENAMETOOLONG.
pub fn read_cstring(mem: &dyn GuestMem, addr: u64) -> Result<CString, Fault> {
    let mut bytes = Vec::new();
    // Chunked reads keep short paths cheap without a per-byte loop.
    let mut chunk = [0u8; 64];
    let mut off = 0u64;
    while (off as usize) < CSTRING_MAX {
        let want = chunk.len().min(CSTRING_MAX - off as usize);
        // Fall back to byte-at-a-time near the end of a mapping.
        let got = if mem.read(addr + off, &mut chunk[..want]).is_ok() {
            want
        } else {
            let mut one = [0u8; 1];
            mem.read(addr + off, &mut one)?;
            chunk[0] = one[0];
            1
        };
        if let Some(pos) = chunk[..got].iter().position(|&b| b == 0) {
            bytes.extend_from_slice(&chunk[..pos]);
            // The unwrap is fine: we stopped at the first NUL.
            return Ok(CString::new(bytes).unwrap());
        }
        bytes.extend_from_slice(&chunk[..got]);
        off += got as u64;
    }
    Err(Fault::Errno(libc::ENAMETOOLONG))
}

/// Field widths a layout may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    B1,
    B2,
    B4,
    B8,
}

impl Width {
    pub const fn bytes(self) -> usize {
        match self {
            Width::B1 => 1,
            Width::B2 => 2,
            Width::B4 => 4,
            Width::B8 => 8,
        }
    }
}

/// One field of a guest struct: where it sits and how wide it is.
#[derive(Debug, Clone, Copy)]
pub struct FieldDesc {
    pub offset: usize,
    pub width: Width,
    pub signed: bool,
}

/// Byte layout of a guest struct for one epoch. Fields must lie inside
/// `size`; bytes not covered by any field are reserved and always written
/// as zero.
#[derive(Debug, Clone, Copy)]
pub struct StructLayout {
    pub size: usize,
    pub fields: &'static [FieldDesc],
}

impl StructLayout {
    /// Construction-time sanity check; a bad table is a bug, not a
    /// runtime condition.
    pub fn validate(&self) {
        for f in self.fields {
            assert!(
                f.offset + f.width.bytes() <= self.size,
                "field at {:#x} overflows struct of {} bytes",
                f.offset,
                self.size
            );
        }
    }
}

/// Decode all fields of `layout` at `addr`. Signed fields are
/// sign-extended into the returned i64s; unsigned ones zero-extended.
pub fn read_struct(
    mem: &dyn GuestMem,
    abi: Abi,
    addr: u64,
    layout: &StructLayout,
) -> Result<Vec<i64>, MemFault> {
    let mut buf = vec![0u8; layout.size];
    mem.read(addr, &mut buf)?;

    let mut out = Vec::with_capacity(layout.fields.len());
    for f in layout.fields {
        let raw = &buf[f.offset..f.offset + f.width.bytes()];
        let mut word = [0u8; 8];
        match abi.endian {
            Endian::Big => word[8 - raw.len()..].copy_from_slice(raw),
            Endian::Little => word[..raw.len()].copy_from_slice(raw),
        }
        let unsigned = match abi.endian {
            Endian::Big => u64::from_be_bytes(word),
            Endian::Little => u64::from_le_bytes(word),
        };
        let val = if f.signed {
            sign_extend(unsigned, f.width)
        } else {
            unsigned as i64
        };
        out.push(val);
    }
    Ok(out)
}

/// Encode `values` (one per field, same order as the layout) at `addr`.
/// The full struct range is zero-filled first, so reserved bytes never
/// leak host garbage.
pub fn write_struct(
    mem: &mut dyn GuestMem,
    abi: Abi,
    addr: u64,
    layout: &StructLayout,
    values: &[i64],
) -> Result<(), MemFault> {
    assert_eq!(
        values.len(),
        layout.fields.len(),
        "field count mismatch for struct encode"
    );

    let mut buf = vec![0u8; layout.size];
    for (f, &val) in layout.fields.iter().zip(values) {
        let n = f.width.bytes();
        let word = match abi.endian {
            Endian::Big => (val as u64).to_be_bytes(),
            Endian::Little => (val as u64).to_le_bytes(),
        };
        let src = match abi.endian {
            Endian::Big => &word[8 - n..],
            Endian::Little => &word[..n],
        };
        buf[f.offset..f.offset + n].copy_from_slice(src);
    }
    mem.write(addr, &buf)
}

fn sign_extend(val: u64, width: Width) -> i64 {
    match width {
        Width::B1 => val as u8 as i8 as i64,
        Width::B2 => val as u16 as i16 as i64,
        Width::B4 => val as u32 as i32 as i64,
        Width::B8 => val as i64,
    }
}

/// Build host iovecs from a guest iovec array. Each entry is a
/// (pointer, length) pair at the guest's word width; buffers are
/// translated to host pointers so the host kernel fills or drains guest
/// memory directly, preserving per-segment results.
pub fn read_iovecs(
    mem: &mut dyn GuestMem,
    abi: Abi,
    base: u64,
    count: usize,
    writable: bool,
) -> Result<Vec<libc::iovec>, MemFault> {
    let stride = abi.width.bytes() as u64 * 2;
    let mut iovecs = Vec::with_capacity(count);
    for i in 0..count {
        let entry = base + i as u64 * stride;
        let iov_base = read_word(mem, abi, entry)?;
        let iov_len = read_word(mem, abi, entry + abi.width.bytes() as u64)? as usize;
        if iov_len == 0 {
            // Zero-length segments are legal; keep the slot so segment
            // counts line up.
            iovecs.push(libc::iovec {
                iov_base: std::ptr::null_mut(),
                iov_len,
            });
            continue;
        }

        let host_ptr = if writable {
            mem.host_ptr_mut(iov_base, iov_len)
        } else {
            mem.host_ptr(iov_base, iov_len).map(|p| p as *mut u8)
        }
        .ok_or(MemFault::Unmapped {
            addr: iov_base,
            size: iov_len,
        })?;

        iovecs.push(libc::iovec {
            iov_base: host_ptr as *mut libc::c_void,
            iov_len,
        });
    }
    Ok(iovecs)
}

/// Convert a guest fd_set (bitmask of native-width words) to a host one.
pub fn read_fdset(
    mem: &dyn GuestMem,
    abi: Abi,
    addr: u64,
    nfds: i32,
) -> Result<libc::fd_set, MemFault> {
    let mut host: libc::fd_set = unsafe { std::mem::zeroed() };
    let word_bits = abi.width.bytes() as i32 * 8;
    for fd in 0..nfds {
        let word_addr = addr + (fd / word_bits) as u64 * abi.width.bytes() as u64;
        let word = read_word(mem, abi, word_addr)?;
        if word & (1u64 << (fd % word_bits)) != 0 {
            unsafe { libc::FD_SET(fd, &mut host) };
        }
    }
    Ok(host)
}

/// Write a host fd_set back into a guest one, clearing all words the
/// guest set could cover up to `nfds`.
pub fn write_fdset(
    mem: &mut dyn GuestMem,
    abi: Abi,
    addr: u64,
    nfds: i32,
    host: &libc::fd_set,
) -> Result<(), MemFault> {
    let word_bits = abi.width.bytes() as i32 * 8;
    // nfds == 0 covers no words at all; the guest buffer stays untouched.
    let words = (nfds + word_bits - 1) / word_bits;
    for w in 0..words {
        let mut word = 0u64;
        for bit in 0..word_bits {
            let fd = w * word_bits + bit;
            if fd < nfds && unsafe { libc::FD_ISSET(fd, host) } {
                word |= 1u64 << bit;
            }
        }
        write_word(mem, abi, addr + w as u64 * abi.width.bytes() as u64, word)?;
    }
    Ok(())
}

/// Read a guest signal mask (array of native-width words, 64 signal bits
/// total) into the host's u64 representation.
pub fn read_sigset(mem: &dyn GuestMem, abi: Abi, addr: u64) -> Result<u64, MemFault> {
    match abi.width {
        WordWidth::W64 => read_u64(mem, abi, addr),
        WordWidth::W32 => {
            let lo = read_u32(mem, abi, addr)? as u64;
            let hi = read_u32(mem, abi, addr + 4)? as u64;
            Ok(lo | (hi << 32))
        }
    }
}

/// Write a 64-bit signal mask back in the guest's word convention.
pub fn write_sigset(mem: &mut dyn GuestMem, abi: Abi, addr: u64, mask: u64) -> Result<(), MemFault> {
    match abi.width {
        WordWidth::W64 => write_u64(mem, abi, addr, mask),
        WordWidth::W32 => {
            write_u32(mem, abi, addr, mask as u32)?;
            write_u32(mem, abi, addr + 4, (mask >> 32) as u32)
        }
    }
}
