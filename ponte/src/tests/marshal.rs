// SPDX-License-Identifier: MIT OR Apache-2.0

use ponte_common::kernel_types::Timespec;

use crate::layout::write_timespec;
use crate::errno::Fault;
use crate::marshal::{
    read_cstring, read_struct, read_u32, write_fdset, write_struct, write_u32, FieldDesc,
    StructLayout, Width,
};
use crate::mem::{GuestMem, GuestRam};
use crate::Abi;

#[test]
fn scalar_byte_order_follows_the_abi() {
    let mut ram = GuestRam::new(0x1000, 64);
    let mut raw = [0u8; 4];

    write_u32(&mut ram, Abi::legacy32_be(), 0x1000, 0x1122_3344).unwrap();
    ram.read(0x1000, &mut raw).unwrap();
    assert_eq!(raw, [0x11, 0x22, 0x33, 0x44]);
    assert_eq!(
        read_u32(&ram, Abi::legacy32_be(), 0x1000).unwrap(),
        0x1122_3344
    );

    write_u32(&mut ram, Abi::modern64_le(), 0x1000, 0x1122_3344).unwrap();
    ram.read(0x1000, &mut raw).unwrap();
    assert_eq!(raw, [0x44, 0x33, 0x22, 0x11]);
}

#[test]
fn cstring_reads_stop_at_the_terminator() {
    let mut ram = GuestRam::new(0x1000, 4096);
    ram.write(0x1000, b"/etc/hostname\0junk").unwrap();
    let s = read_cstring(&ram, 0x1000).unwrap();
    assert_eq!(s.as_bytes(), b"/etc/hostname");
}

// A string ending just short of the mapping's edge forces the chunked
// reader onto its byte-at-a-time fallback.
#[test]
fn cstring_reads_near_the_end_of_a_mapping() {
    let mut ram = GuestRam::new(0x1000, 70);
    let addr = 0x1000 + 66;
    ram.write(addr, b"abc\0").unwrap();
    assert_eq!(read_cstring(&ram, addr).unwrap().as_bytes(), b"abc");
}

const PAIR: StructLayout = StructLayout {
    size: 8,
    fields: &[
        FieldDesc {
            offset: 0,
            width: Width::B4,
            signed: true,
        },
        FieldDesc {
            offset: 4,
            width: Width::B2,
            signed: false,
        },
    ],
};

#[test]
fn struct_fields_sign_extend_on_read() {
    let mut ram = GuestRam::new(0x1000, 32);
    write_struct(&mut ram, Abi::legacy32_be(), 0x1000, &PAIR, &[-5, 0xbeef]).unwrap();
    let v = read_struct(&ram, Abi::legacy32_be(), 0x1000, &PAIR).unwrap();
    assert_eq!(v, vec![-5, 0xbeef]);
}

#[test]
fn struct_writes_zero_the_reserved_bytes() {
    let mut ram = GuestRam::new(0x1000, 32);
    ram.write(0x1000, &[0xff; 8]).unwrap();
    write_struct(&mut ram, Abi::modern64_le(), 0x1000, &PAIR, &[1, 2]).unwrap();
    let mut raw = [0u8; 8];
    ram.read(0x1000, &mut raw).unwrap();
    // offsets 6..8 are covered by no field
    assert_eq!(&raw[6..], &[0, 0]);
}

#[test]
fn narrow_timespec_bytes_are_stable() {
    let mut ram = GuestRam::new(0x1000, 32);
    let ts = Timespec {
        seconds: 0x0102_0304_0506_0708,
        nanos: 999_999_999,
    };
    write_timespec(&mut ram, Abi::legacy32_be(), false, 0x1000, &ts).unwrap();
    let mut raw = [0u8; 16];
    ram.read(0x1000, &mut raw).unwrap();
    assert_eq!(&raw[..8], &ts.seconds.to_be_bytes());
    assert_eq!(&raw[8..12], &999_999_999u32.to_be_bytes());
    assert_eq!(&raw[12..], &[0; 4]);
}

// Falling off the end of guest memory before the NUL is a mapping
// problem, not a path-length one.
#[test]
fn unterminated_cstring_at_the_mapping_edge_is_a_memory_fault() {
    let mut ram = GuestRam::new(0x1000, 32);
    ram.write(0x1000, &[b'x'; 32]).unwrap();
    assert!(matches!(read_cstring(&ram, 0x1000), Err(Fault::Mem(_))));
}

// A path that keeps going past the kernel's PATH_MAX without a NUL is an
// overlong name, which the kernel reports as ENAMETOOLONG.
#[test]
fn overlong_cstring_reports_enametoolong() {
    let mut ram = GuestRam::new(0x1000, 8192);
    ram.write(0x1000, &[b'x'; 8192]).unwrap();
    assert_eq!(
        read_cstring(&ram, 0x1000),
        Err(Fault::Errno(libc::ENAMETOOLONG))
    );
}

// select with nfds == 0 owns none of the fd_set buffer; writing results
// back must leave the guest's bytes alone.
#[test]
fn fdset_writeback_with_zero_nfds_touches_nothing() {
    let mut ram = GuestRam::new(0x1000, 32);
    ram.write(0x1000, &[0xa5; 8]).unwrap();
    let host: libc::fd_set = unsafe { std::mem::zeroed() };
    write_fdset(&mut ram, Abi::legacy32_be(), 0x1000, 0, &host).unwrap();
    let mut raw = [0u8; 8];
    ram.read(0x1000, &mut raw).unwrap();
    assert_eq!(raw, [0xa5; 8]);
}
