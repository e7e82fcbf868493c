// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-normalized views of the kernel structures the engine marshals.
//!
//! These are the values handlers work with; the guest byte layout for each
//! epoch lives in the engine's layout tables, not here.

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Timespec {
    pub seconds: i64,
    pub nanos: i64,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Timeval {
    pub tv_sec: i64,
    pub tv_usec: i64,
}

/// Interval timer value for timerfd_settime/gettime.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Itimerspec {
    pub interval: Timespec,
    pub value: Timespec,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Stat {
    pub st_dev: u64,
    pub st_ino: u64,
    pub st_nlink: u64,
    pub st_mode: u32,
    pub st_uid: u32,
    pub st_gid: u32,
    pub st_rdev: u64,
    pub st_size: i64,
    pub st_blksize: i64,
    pub st_blocks: i64,
    pub st_atime: i64,
    pub st_mtime: i64,
    pub st_ctime: i64,
}

/// Filesystem statistics, matching the kernel's struct statfs
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Statfs {
    pub f_type: i64,
    pub f_bsize: i64,
    pub f_blocks: u64,
    pub f_bfree: u64,
    pub f_bavail: u64,
    pub f_files: u64,
    pub f_ffree: u64,
    pub f_namelen: i64,
}

/// POSIX message queue attributes (flags, maxmsg, msgsize, curmsgs).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MqAttr {
    pub mq_flags: i64,
    pub mq_maxmsg: i64,
    pub mq_msgsize: i64,
    pub mq_curmsgs: i64,
}

/// The siginfo_t subset waitid reports: fixed 32-bit fields at offsets
/// 0/4/8/12/16/20 in every epoch.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SigInfoWait {
    pub si_signo: i32,
    pub si_errno: i32,
    pub si_code: i32,
    pub si_pid: i32,
    pub si_uid: u32,
    pub si_status: i32,
}

/// The kernel-shape sigaction. Handler and restorer are guest code
/// addresses and travel through as opaque words.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SigAction {
    pub handler: u64,
    pub flags: u64,
    pub restorer: u64,
    pub mask: u64,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Rusage {
    pub ru_utime: Timeval,
    pub ru_stime: Timeval,
    pub ru_maxrss: i64,
    pub ru_minflt: i64,
    pub ru_majflt: i64,
    pub ru_inblock: i64,
    pub ru_oublock: i64,
    pub ru_nvcsw: i64,
    pub ru_nivcsw: i64,
}

/// Header for capget/capset. In/out: a rejected version is rewritten by
/// the kernel to its preferred one, and that rewrite must reach the guest.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CapUserHeader {
    pub version: u32,
    pub pid: i32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CapUserData {
    pub effective: u32,
    pub permitted: u32,
    pub inheritable: u32,
}

/// Caller-sized, versioned-by-size attribute for landlock_create_ruleset.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LandlockRulesetAttr {
    pub handled_access_fs: u64,
    pub handled_access_net: u64,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LandlockPathBeneathAttr {
    pub allowed_access: u64,
    pub parent_fd: i32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LandlockNetPortAttr {
    pub allowed_access: u64,
    pub port: u64,
}

/// openat2 extensible open arguments (flags, mode, resolve bitmask).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct OpenHow {
    pub flags: u64,
    pub mode: u64,
    pub resolve: u64,
}

/// Mount attributes for open_tree_attr.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MountAttr {
    pub attr_set: u64,
    pub attr_clr: u64,
    pub propagation: u64,
    pub userns_fd: u64,
}

/// Legacy-epoch open(2) flag values that differ from the unified ABI.
/// O_RDONLY/O_WRONLY/O_CREAT and friends share values; these four do not.
pub mod legacy_open_flags {
    pub const O_DIRECTORY: i32 = 0o040000;
    pub const O_NOFOLLOW: i32 = 0o100000;
    pub const O_DIRECT: i32 = 0o200000;
    pub const O_LARGEFILE: i32 = 0o400000;
    /// Flags below this mask have identical values in both epochs.
    pub const COMMON_MASK: i32 = 0o037777;
    pub const O_CLOEXEC: i32 = 0o2000000;
}

/// Sub-operation selectors for the SysV `ipc()` multiplexer.
pub mod ipc_call {
    pub const SEMOP: u32 = 1;
    pub const SEMGET: u32 = 2;
    pub const SEMCTL: u32 = 3;
    pub const SEMTIMEDOP: u32 = 4;
    pub const MSGSND: u32 = 11;
    pub const MSGRCV: u32 = 12;
    pub const MSGGET: u32 = 13;
    pub const MSGCTL: u32 = 14;
    pub const SHMAT: u32 = 21;
    pub const SHMDT: u32 = 22;
    pub const SHMGET: u32 = 23;
    pub const SHMCTL: u32 = 24;
}
