// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guest struct layouts per epoch, and the typed codecs on top of them.
//!
//! The same logical struct has different byte offsets depending on the
//! epoch's width; endianness is applied by the generic codec in
//! [`crate::marshal`]. A `*64` alias selects the wide layout on a narrow
//! epoch, which is why codecs take an explicit `wide` flag instead of
//! consulting `abi.width` themselves.
//!
//! The narrow epoch uses 64-bit time_t (its libc was built that way), so
//! `timespec.tv_sec` is 8 bytes even on the 32-bit layout; the old-style
//! timevals embedded in rusage stayed 32-bit.

use ponte_common::kernel_types::{
    CapUserData, CapUserHeader, Itimerspec, MountAttr, MqAttr, OpenHow, Rusage, SigAction,
    SigInfoWait, Stat, Statfs, Timespec, Timeval,
};
use ponte_common::Abi;

use crate::marshal::{read_struct, write_struct, FieldDesc, StructLayout, Width};
use crate::mem::{GuestMem, MemFault};

const fn f(offset: usize, width: Width, signed: bool) -> FieldDesc {
    FieldDesc {
        offset,
        width,
        signed,
    }
}

use Width::{B4, B8};

// tv_sec, tv_nsec
pub const TIMESPEC32: StructLayout = StructLayout {
    size: 16,
    fields: &[f(0, B8, true), f(8, B4, true)],
};
pub const TIMESPEC64: StructLayout = StructLayout {
    size: 16,
    fields: &[f(0, B8, true), f(8, B8, true)],
};

// tv_sec, tv_usec
pub const TIMEVAL32: StructLayout = StructLayout {
    size: 16,
    fields: &[f(0, B8, true), f(8, B4, true)],
};
pub const TIMEVAL64: StructLayout = StructLayout {
    size: 16,
    fields: &[f(0, B8, true), f(8, B8, true)],
};

// dev, ino, mode, nlink, uid, gid, rdev, size, blksize, blocks,
// atime, mtime, ctime
pub const STAT32: StructLayout = StructLayout {
    size: 56,
    fields: &[
        f(0, B4, false),
        f(4, B4, false),
        f(8, B4, false),
        f(12, B4, false),
        f(16, B4, false),
        f(20, B4, false),
        f(24, B4, false),
        f(28, B4, true),
        f(32, B4, true),
        f(36, B4, true),
        f(40, B4, true),
        f(44, B4, true),
        f(48, B4, true),
    ],
};
pub const STAT64: StructLayout = StructLayout {
    size: 96,
    fields: &[
        f(0, B8, false),
        f(8, B8, false),
        f(24, B4, false),
        f(16, B8, false),
        f(28, B4, false),
        f(32, B4, false),
        f(40, B8, false),
        f(48, B8, true),
        f(56, B8, true),
        f(64, B8, true),
        f(72, B8, true),
        f(80, B8, true),
        f(88, B8, true),
    ],
};

// type, bsize, blocks, bfree, bavail, files, ffree, namelen
pub const STATFS32: StructLayout = StructLayout {
    size: 32,
    fields: &[
        f(0, B4, true),
        f(4, B4, true),
        f(8, B4, false),
        f(12, B4, false),
        f(16, B4, false),
        f(20, B4, false),
        f(24, B4, false),
        f(28, B4, true),
    ],
};
pub const STATFS64: StructLayout = StructLayout {
    size: 64,
    fields: &[
        f(0, B8, true),
        f(8, B8, true),
        f(16, B8, false),
        f(24, B8, false),
        f(32, B8, false),
        f(40, B8, false),
        f(48, B8, false),
        f(56, B8, true),
    ],
};

// flags, maxmsg, msgsize, curmsgs
pub const MQ_ATTR32: StructLayout = StructLayout {
    size: 16,
    fields: &[
        f(0, B4, true),
        f(4, B4, true),
        f(8, B4, true),
        f(12, B4, true),
    ],
};
// The kernel's wide mq_attr reserves four trailing longs; zero-filled.
pub const MQ_ATTR64: StructLayout = StructLayout {
    size: 64,
    fields: &[
        f(0, B8, true),
        f(8, B8, true),
        f(16, B8, true),
        f(24, B8, true),
    ],
};

// version, pid -- fixed 32-bit fields in every epoch
pub const CAP_USER_HEADER: StructLayout = StructLayout {
    size: 8,
    fields: &[f(0, B4, false), f(4, B4, true)],
};

// effective, permitted, inheritable
pub const CAP_USER_DATA: StructLayout = StructLayout {
    size: 12,
    fields: &[f(0, B4, false), f(4, B4, false), f(8, B4, false)],
};

// flags, mode, resolve -- fixed 64-bit fields (extensible struct ABI)
pub const OPEN_HOW: StructLayout = StructLayout {
    size: 24,
    fields: &[f(0, B8, false), f(8, B8, false), f(16, B8, false)],
};

// attr_set, attr_clr, propagation, userns_fd
pub const MOUNT_ATTR: StructLayout = StructLayout {
    size: 32,
    fields: &[
        f(0, B8, false),
        f(8, B8, false),
        f(16, B8, false),
        f(24, B8, false),
    ],
};

// allowed_access, parent_fd
pub const LANDLOCK_PATH_BENEATH: StructLayout = StructLayout {
    size: 12,
    fields: &[f(0, B8, false), f(8, B4, true)],
};

// allowed_access, port
pub const LANDLOCK_NET_PORT: StructLayout = StructLayout {
    size: 16,
    fields: &[f(0, B8, false), f(8, B8, false)],
};

// signo, errno, code, pid, uid, status at the fixed offsets the waitid
// contract promises; the rest of siginfo_t reads back as zero.
pub const SIGINFO_WAIT: StructLayout = StructLayout {
    size: 128,
    fields: &[
        f(0, B4, true),
        f(4, B4, true),
        f(8, B4, true),
        f(12, B4, true),
        f(16, B4, false),
        f(20, B4, true),
    ],
};

// handler, flags, restorer, mask. Kernel field order on both epochs;
// the mask is a single 64-bit word even on the narrow layout.
pub const SIGACTION32: StructLayout = StructLayout {
    size: 20,
    fields: &[
        f(0, B4, false),
        f(4, B4, false),
        f(8, B4, false),
        f(12, B8, false),
    ],
};
pub const SIGACTION64: StructLayout = StructLayout {
    size: 32,
    fields: &[
        f(0, B8, false),
        f(8, B8, false),
        f(16, B8, false),
        f(24, B8, false),
    ],
};

// events, data. The wide layout is the packed one the unified 64-bit
// ABI uses; the narrow layout aligns data to 8 bytes.
pub const EPOLL_EVENT32: StructLayout = StructLayout {
    size: 16,
    fields: &[f(0, B4, false), f(8, B8, false)],
};
pub const EPOLL_EVENT64: StructLayout = StructLayout {
    size: 12,
    fields: &[f(0, B4, false), f(4, B8, false)],
};

// utime{sec,usec}, stime{sec,usec}, then the kernel's long counters at
// their real slots: maxrss, minflt, majflt, inblock, oublock, nvcsw,
// nivcsw. rusage keeps old-style 32-bit timevals on the narrow epoch.
pub const RUSAGE32: StructLayout = StructLayout {
    size: 72,
    fields: &[
        f(0, B4, true),
        f(4, B4, true),
        f(8, B4, true),
        f(12, B4, true),
        f(16, B4, true),
        f(32, B4, true),
        f(36, B4, true),
        f(44, B4, true),
        f(48, B4, true),
        f(64, B4, true),
        f(68, B4, true),
    ],
};
pub const RUSAGE64: StructLayout = StructLayout {
    size: 144,
    fields: &[
        f(0, B8, true),
        f(8, B8, true),
        f(16, B8, true),
        f(24, B8, true),
        f(32, B8, true),
        f(64, B8, true),
        f(72, B8, true),
        f(88, B8, true),
        f(96, B8, true),
        f(128, B8, true),
        f(136, B8, true),
    ],
};

// rlim_cur, rlim_max at the guest word width
pub const RLIMIT32: StructLayout = StructLayout {
    size: 8,
    fields: &[f(0, B4, false), f(4, B4, false)],
};
pub const RLIMIT64: StructLayout = StructLayout {
    size: 16,
    fields: &[f(0, B8, false), f(8, B8, false)],
};

pub fn timespec_layout(wide: bool) -> &'static StructLayout {
    if wide {
        &TIMESPEC64
    } else {
        &TIMESPEC32
    }
}

pub fn read_timespec(
    mem: &dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
) -> Result<Timespec, MemFault> {
    let v = read_struct(mem, abi, addr, timespec_layout(wide))?;
    Ok(Timespec {
        seconds: v[0],
        nanos: v[1],
    })
}

pub fn write_timespec(
    mem: &mut dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
    ts: &Timespec,
) -> Result<(), MemFault> {
    write_struct(mem, abi, addr, timespec_layout(wide), &[ts.seconds, ts.nanos])
}

pub fn read_timeval(
    mem: &dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
) -> Result<Timeval, MemFault> {
    let layout = if wide { &TIMEVAL64 } else { &TIMEVAL32 };
    let v = read_struct(mem, abi, addr, layout)?;
    Ok(Timeval {
        tv_sec: v[0],
        tv_usec: v[1],
    })
}

pub fn write_timeval(
    mem: &mut dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
    tv: &Timeval,
) -> Result<(), MemFault> {
    let layout = if wide { &TIMEVAL64 } else { &TIMEVAL32 };
    write_struct(mem, abi, addr, layout, &[tv.tv_sec, tv.tv_usec])
}

/// itimerspec is two timespecs back to back; both layouts have a 16-byte
/// timespec stride.
pub fn read_itimerspec(
    mem: &dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
) -> Result<Itimerspec, MemFault> {
    Ok(Itimerspec {
        interval: read_timespec(mem, abi, wide, addr)?,
        value: read_timespec(mem, abi, wide, addr + 16)?,
    })
}

pub fn write_itimerspec(
    mem: &mut dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,

    it: &Itimerspec,
) -> Result<(), MemFault> {
    write_timespec(mem, abi, wide, addr, &it.interval)?;
    write_timespec(mem, abi, wide, addr + 16, &it.value)
}

pub fn epoll_event_layout(wide: bool) -> &'static StructLayout {
    if wide {
        &EPOLL_EVENT64
    } else {
        &EPOLL_EVENT32
    }
}

pub fn read_epoll_event(
    mem: &dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
) -> Result<(u32, u64), MemFault> {
    let v = read_struct(mem, abi, addr, epoll_event_layout(wide))?;
    Ok((v[0] as u32, v[1] as u64))
}

pub fn write_epoll_event(
    mem: &mut dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
    events: u32,
    data: u64,
) -> Result<(), MemFault> {
    write_struct(
        mem,
        abi,
        addr,
        epoll_event_layout(wide),
        &[events as i64, data as i64],
    )
}

pub fn write_stat(
    mem: &mut dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
    st: &Stat,
) -> Result<(), MemFault> {
    let layout = if wide { &STAT64 } else { &STAT32 };
    write_struct(
        mem,
        abi,
        addr,
        layout,
        &[
            st.st_dev as i64,
            st.st_ino as i64,
            st.st_mode as i64,
            st.st_nlink as i64,
            st.st_uid as i64,
            st.st_gid as i64,
            st.st_rdev as i64,
            st.st_size,
            st.st_blksize,
            st.st_blocks,
            st.st_atime,
            st.st_mtime,
            st.st_ctime,
        ],
    )
}

pub fn read_stat(mem: &dyn GuestMem, abi: Abi, wide: bool, addr: u64) -> Result<Stat, MemFault> {
    let layout = if wide { &STAT64 } else { &STAT32 };
    let v = read_struct(mem, abi, addr, layout)?;
    Ok(Stat {
        st_dev: v[0] as u64,
        st_ino: v[1] as u64,
        st_mode: v[2] as u32,
        st_nlink: v[3] as u64,
        st_uid: v[4] as u32,
        st_gid: v[5] as u32,
        st_rdev: v[6] as u64,
        st_size: v[7],
        st_blksize: v[8],
        st_blocks: v[9],
        st_atime: v[10],
        st_mtime: v[11],
        st_ctime: v[12],
    })
}

pub fn write_statfs(
    mem: &mut dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
    sf: &Statfs,
) -> Result<(), MemFault> {
    let layout = if wide { &STATFS64 } else { &STATFS32 };
    write_struct(
        mem,
        abi,
        addr,
        layout,
        &[
            sf.f_type,
            sf.f_bsize,
            sf.f_blocks as i64,
            sf.f_bfree as i64,
            sf.f_bavail as i64,
            sf.f_files as i64,
            sf.f_ffree as i64,
            sf.f_namelen,
        ],
    )
}

pub fn read_mq_attr(
    mem: &dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
) -> Result<MqAttr, MemFault> {
    let layout = if wide { &MQ_ATTR64 } else { &MQ_ATTR32 };
    let v = read_struct(mem, abi, addr, layout)?;
    Ok(MqAttr {
        mq_flags: v[0],
        mq_maxmsg: v[1],
        mq_msgsize: v[2],
        mq_curmsgs: v[3],
    })
}

pub fn write_mq_attr(
    mem: &mut dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
    attr: &MqAttr,
) -> Result<(), MemFault> {
    let layout = if wide { &MQ_ATTR64 } else { &MQ_ATTR32 };
    write_struct(
        mem,
        abi,
        addr,
        layout,
        &[attr.mq_flags, attr.mq_maxmsg, attr.mq_msgsize, attr.mq_curmsgs],
    )
}

pub fn read_cap_header(
    mem: &dyn GuestMem,
    abi: Abi,
    addr: u64,
) -> Result<CapUserHeader, MemFault> {
    let v = read_struct(mem, abi, addr, &CAP_USER_HEADER)?;
    Ok(CapUserHeader {
        version: v[0] as u32,
        pid: v[1] as i32,
    })
}

pub fn write_cap_header(
    mem: &mut dyn GuestMem,
    abi: Abi,
    addr: u64,
    hdr: &CapUserHeader,
) -> Result<(), MemFault> {
    write_struct(
        mem,
        abi,
        addr,
        &CAP_USER_HEADER,
        &[hdr.version as i64, hdr.pid as i64],
    )
}

pub fn read_cap_data(mem: &dyn GuestMem, abi: Abi, addr: u64) -> Result<CapUserData, MemFault> {
    let v = read_struct(mem, abi, addr, &CAP_USER_DATA)?;
    Ok(CapUserData {
        effective: v[0] as u32,
        permitted: v[1] as u32,
        inheritable: v[2] as u32,
    })
}

pub fn write_cap_data(
    mem: &mut dyn GuestMem,
    abi: Abi,
    addr: u64,
    data: &CapUserData,
) -> Result<(), MemFault> {
    write_struct(
        mem,
        abi,
        addr,
        &CAP_USER_DATA,
        &[
            data.effective as i64,
            data.permitted as i64,
            data.inheritable as i64,
        ],
    )
}

pub fn read_open_how(mem: &dyn GuestMem, abi: Abi, addr: u64) -> Result<OpenHow, MemFault> {
    let v = read_struct(mem, abi, addr, &OPEN_HOW)?;
    Ok(OpenHow {
        flags: v[0] as u64,
        mode: v[1] as u64,
        resolve: v[2] as u64,
    })
}

pub fn read_mount_attr(mem: &dyn GuestMem, abi: Abi, addr: u64) -> Result<MountAttr, MemFault> {
    let v = read_struct(mem, abi, addr, &MOUNT_ATTR)?;
    Ok(MountAttr {
        attr_set: v[0] as u64,
        attr_clr: v[1] as u64,
        propagation: v[2] as u64,
        userns_fd: v[3] as u64,
    })
}

pub fn write_siginfo_wait(
    mem: &mut dyn GuestMem,
    abi: Abi,
    addr: u64,
    si: &SigInfoWait,
) -> Result<(), MemFault> {
    write_struct(
        mem,
        abi,
        addr,
        &SIGINFO_WAIT,
        &[
            si.si_signo as i64,
            si.si_errno as i64,
            si.si_code as i64,
            si.si_pid as i64,
            si.si_uid as i64,
            si.si_status as i64,
        ],
    )
}

pub fn read_siginfo_wait(
    mem: &dyn GuestMem,
    abi: Abi,
    addr: u64,
) -> Result<SigInfoWait, MemFault> {
    let v = read_struct(mem, abi, addr, &SIGINFO_WAIT)?;
    Ok(SigInfoWait {
        si_signo: v[0] as i32,
        si_errno: v[1] as i32,
        si_code: v[2] as i32,
        si_pid: v[3] as i32,
        si_uid: v[4] as u32,
        si_status: v[5] as i32,
    })
}

pub fn read_sigaction(
    mem: &dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
) -> Result<SigAction, MemFault> {
    let layout = if wide { &SIGACTION64 } else { &SIGACTION32 };
    let v = read_struct(mem, abi, addr, layout)?;
    Ok(SigAction {
        handler: v[0] as u64,
        flags: v[1] as u64,
        restorer: v[2] as u64,
        mask: v[3] as u64,
    })
}

pub fn write_sigaction(
    mem: &mut dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
    sa: &SigAction,
) -> Result<(), MemFault> {
    let layout = if wide { &SIGACTION64 } else { &SIGACTION32 };
    write_struct(
        mem,
        abi,
        addr,
        layout,
        &[
            sa.handler as i64,
            sa.flags as i64,
            sa.restorer as i64,
            sa.mask as i64,
        ],
    )
}

pub fn write_rusage(
    mem: &mut dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
    ru: &Rusage,
) -> Result<(), MemFault> {
    let layout = if wide { &RUSAGE64 } else { &RUSAGE32 };
    write_struct(
        mem,
        abi,
        addr,
        layout,
        &[
            ru.ru_utime.tv_sec,
            ru.ru_utime.tv_usec,
            ru.ru_stime.tv_sec,
            ru.ru_stime.tv_usec,
            ru.ru_maxrss,
            ru.ru_minflt,
            ru.ru_majflt,
            ru.ru_inblock,
            ru.ru_oublock,
            ru.ru_nvcsw,
            ru.ru_nivcsw,
        ],
    )
}

pub fn read_rlimit(
    mem: &dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
) -> Result<(u64, u64), MemFault> {
    let layout = if wide { &RLIMIT64 } else { &RLIMIT32 };
    let v = read_struct(mem, abi, addr, layout)?;
    Ok((v[0] as u64, v[1] as u64))
}

pub fn write_rlimit(
    mem: &mut dyn GuestMem,
    abi: Abi,
    wide: bool,
    addr: u64,
    cur: u64,
    max: u64,
) -> Result<(), MemFault> {
    let layout = if wide { &RLIMIT64 } else { &RLIMIT32 };
    // The narrow rlimit saturates values the 32-bit field cannot hold
    // (RLIM_INFINITY in particular).
    let clamp = |v: u64| -> i64 {
        if !wide && v > u32::MAX as u64 {
            u32::MAX as i64
        } else {
            v as i64
        }
    };
    write_struct(mem, abi, addr, layout, &[clamp(cur), clamp(max)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_are_well_formed() {
        for layout in [
            &TIMESPEC32,
            &TIMESPEC64,
            &TIMEVAL32,
            &TIMEVAL64,
            &STAT32,
            &STAT64,
            &STATFS32,
            &STATFS64,
            &MQ_ATTR32,
            &MQ_ATTR64,
            &EPOLL_EVENT32,
            &EPOLL_EVENT64,
            &CAP_USER_HEADER,
            &CAP_USER_DATA,
            &OPEN_HOW,
            &MOUNT_ATTR,
            &LANDLOCK_PATH_BENEATH,
            &LANDLOCK_NET_PORT,
            &SIGINFO_WAIT,
            &SIGACTION32,
            &SIGACTION64,
            &RUSAGE32,
            &RUSAGE64,
            &RLIMIT32,
            &RLIMIT64,
        ] {
            layout.validate();
        }
    }
}
