// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path and metadata operations: the stat family, directory and link
//! manipulation, permissions and ownership, filesystem statistics, and
//! the newer extensible-struct entry points.

use ponte_common::kernel_types::{Stat, Statfs};
use ponte_common::syscalls::{legacy32 as l, modern64 as m};

use crate::dispatch::Call;
use crate::errno::{libc_result, Fault, SysResult};
use crate::layout::{self, read_mount_attr, read_timespec, write_stat, write_statfs, MOUNT_ATTR};
use crate::ops::{host_buf_mut, to_host_timespec};
use crate::table::{ArgAdapt, OperationSpec, SyscallTable};

// Not yet in the libc crate at our pinned version.
const SYS_FCHMODAT2: libc::c_long = 452;
const SYS_OPEN_TREE_ATTR: libc::c_long = 467;

static STAT: OperationSpec = OperationSpec::handler("stat", sys_stat);
static LSTAT: OperationSpec = OperationSpec::handler("lstat", sys_lstat);
static FSTAT: OperationSpec = OperationSpec::handler("fstat", sys_fstat);
static FSTATAT: OperationSpec = OperationSpec::handler("fstatat", sys_fstatat);
static STATFS: OperationSpec = OperationSpec::handler("statfs", sys_statfs);
static FSTATFS: OperationSpec = OperationSpec::handler("fstatfs", sys_fstatfs);
static STATFS64: OperationSpec = OperationSpec::handler("statfs64", sys_statfs64);
static FSTATFS64: OperationSpec = OperationSpec::handler("fstatfs64", sys_fstatfs64);

static ACCESS: OperationSpec = OperationSpec::handler("access", sys_access);
static FACCESSAT: OperationSpec = OperationSpec::handler("faccessat", sys_faccessat);
static FACCESSAT2: OperationSpec = OperationSpec::handler("faccessat2", sys_faccessat2);

static CHDIR: OperationSpec = OperationSpec::handler("chdir", sys_chdir);
static FCHDIR: OperationSpec = OperationSpec::passthrough("fchdir", libc::SYS_fchdir, 1);
static GETCWD: OperationSpec = OperationSpec::handler("getcwd", sys_getcwd);

static RENAME: OperationSpec = OperationSpec::handler("rename", sys_rename);
static RENAMEAT: OperationSpec = OperationSpec::handler("renameat", sys_renameat);
static RENAMEAT2: OperationSpec = OperationSpec::handler("renameat2", sys_renameat2);

static MKDIR: OperationSpec = OperationSpec::handler("mkdir", sys_mkdir);
static MKDIRAT: OperationSpec = OperationSpec::handler("mkdirat", sys_mkdirat);
static RMDIR: OperationSpec = OperationSpec::handler("rmdir", sys_rmdir);

static LINK: OperationSpec = OperationSpec::handler("link", sys_link);
static LINKAT: OperationSpec = OperationSpec::handler("linkat", sys_linkat);
static UNLINK: OperationSpec = OperationSpec::handler("unlink", sys_unlink);
static UNLINKAT: OperationSpec = OperationSpec::handler("unlinkat", sys_unlinkat);
static SYMLINK: OperationSpec = OperationSpec::handler("symlink", sys_symlink);
static SYMLINKAT: OperationSpec = OperationSpec::handler("symlinkat", sys_symlinkat);
static READLINK: OperationSpec = OperationSpec::handler("readlink", sys_readlink);
static READLINKAT: OperationSpec = OperationSpec::handler("readlinkat", sys_readlinkat);

static CHMOD: OperationSpec = OperationSpec::handler("chmod", sys_chmod);
static FCHMOD: OperationSpec = OperationSpec::passthrough("fchmod", libc::SYS_fchmod, 2);
static FCHMODAT: OperationSpec = OperationSpec::handler("fchmodat", sys_fchmodat);
static FCHMODAT2: OperationSpec = OperationSpec::handler("fchmodat2", sys_fchmodat2);

static CHOWN: OperationSpec = OperationSpec::handler("chown", sys_chown);
static LCHOWN: OperationSpec = OperationSpec::handler("lchown", sys_lchown);
static FCHOWN: OperationSpec = OperationSpec::passthrough("fchown", libc::SYS_fchown, 3);
static FCHOWNAT: OperationSpec = OperationSpec::handler("fchownat", sys_fchownat);

static TRUNCATE: OperationSpec = OperationSpec::handler("truncate", sys_truncate);
static TRUNCATE64: OperationSpec = OperationSpec::handler("truncate64", sys_truncate64);
static FTRUNCATE: OperationSpec = OperationSpec::passthrough("ftruncate", libc::SYS_ftruncate, 2);
static FTRUNCATE64: OperationSpec = OperationSpec::handler("ftruncate64", sys_ftruncate64);

static MKNOD: OperationSpec = OperationSpec::handler("mknod", sys_mknod);
static MKNODAT: OperationSpec = OperationSpec::handler("mknodat", sys_mknodat);

static UMASK: OperationSpec = OperationSpec::passthrough("umask", libc::SYS_umask, 1);
static FLOCK: OperationSpec = OperationSpec::blocking_passthrough("flock", libc::SYS_flock, 2);
static FSYNC: OperationSpec = OperationSpec::blocking_passthrough("fsync", libc::SYS_fsync, 1);
static FDATASYNC: OperationSpec =
    OperationSpec::blocking_passthrough("fdatasync", libc::SYS_fdatasync, 1);
static SYNC: OperationSpec = OperationSpec::blocking_passthrough("sync", libc::SYS_sync, 0);

static UTIMENSAT: OperationSpec = OperationSpec::handler("utimensat", sys_utimensat);

static INOTIFY_INIT: OperationSpec =
    OperationSpec::passthrough("inotify_init", libc::SYS_inotify_init, 0);
static INOTIFY_INIT1: OperationSpec =
    OperationSpec::passthrough("inotify_init1", libc::SYS_inotify_init1, 1);
static INOTIFY_ADD_WATCH: OperationSpec =
    OperationSpec::handler("inotify_add_watch", sys_inotify_add_watch);
static INOTIFY_RM_WATCH: OperationSpec =
    OperationSpec::passthrough("inotify_rm_watch", libc::SYS_inotify_rm_watch, 2);

static OPEN_TREE_ATTR: OperationSpec = OperationSpec::handler("open_tree_attr", sys_open_tree_attr);

pub(crate) fn register(t: &mut SyscallTable) {
    t.both(l::SYS_stat, m::SYS_stat, &STAT);
    t.both(l::SYS_lstat, m::SYS_lstat, &LSTAT);
    t.both(l::SYS_fstat, m::SYS_fstat, &FSTAT);
    t.modern(m::SYS_newfstatat, &FSTATAT);
    t.both(l::SYS_statfs, m::SYS_statfs, &STATFS);
    t.both(l::SYS_fstatfs, m::SYS_fstatfs, &FSTATFS);

    // Narrow-epoch wide-layout aliases.
    t.legacy_adapted(l::SYS_stat64, &STAT, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_lstat64, &LSTAT, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_fstat64, &FSTAT, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_fstatat64, &FSTATAT, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_statfs64, &STATFS64, ArgAdapt::Wide);
    t.legacy_adapted(l::SYS_fstatfs64, &FSTATFS64, ArgAdapt::Wide);

    t.both(l::SYS_access, m::SYS_access, &ACCESS);
    t.both(l::SYS_faccessat, m::SYS_faccessat, &FACCESSAT);
    t.both(l::SYS_faccessat2, m::SYS_faccessat2, &FACCESSAT2);

    t.both(l::SYS_chdir, m::SYS_chdir, &CHDIR);
    t.both(l::SYS_fchdir, m::SYS_fchdir, &FCHDIR);
    t.both(l::SYS_getcwd, m::SYS_getcwd, &GETCWD);

    t.both(l::SYS_rename, m::SYS_rename, &RENAME);
    t.both(l::SYS_renameat, m::SYS_renameat, &RENAMEAT);
    t.both(l::SYS_renameat2, m::SYS_renameat2, &RENAMEAT2);

    t.both(l::SYS_mkdir, m::SYS_mkdir, &MKDIR);
    t.both(l::SYS_mkdirat, m::SYS_mkdirat, &MKDIRAT);
    t.both(l::SYS_rmdir, m::SYS_rmdir, &RMDIR);

    t.both(l::SYS_link, m::SYS_link, &LINK);
    t.both(l::SYS_linkat, m::SYS_linkat, &LINKAT);
    t.both(l::SYS_unlink, m::SYS_unlink, &UNLINK);
    t.both(l::SYS_unlinkat, m::SYS_unlinkat, &UNLINKAT);
    t.both(l::SYS_symlink, m::SYS_symlink, &SYMLINK);
    t.both(l::SYS_symlinkat, m::SYS_symlinkat, &SYMLINKAT);
    t.both(l::SYS_readlink, m::SYS_readlink, &READLINK);
    t.both(l::SYS_readlinkat, m::SYS_readlinkat, &READLINKAT);

    t.both(l::SYS_chmod, m::SYS_chmod, &CHMOD);
    t.both(l::SYS_fchmod, m::SYS_fchmod, &FCHMOD);
    t.both(l::SYS_fchmodat, m::SYS_fchmodat, &FCHMODAT);
    t.both(l::SYS_fchmodat2, m::SYS_fchmodat2, &FCHMODAT2);

    t.both(l::SYS_chown, m::SYS_chown, &CHOWN);
    t.both(l::SYS_lchown, m::SYS_lchown, &LCHOWN);
    t.both(l::SYS_fchown, m::SYS_fchown, &FCHOWN);
    t.both(l::SYS_fchownat, m::SYS_fchownat, &FCHOWNAT);

    // 32-bit-ID spellings on the narrow epoch; the host IDs are 32-bit
    // either way.
    t.legacy(l::SYS_chown32, &CHOWN);
    t.legacy(l::SYS_lchown32, &LCHOWN);
    t.legacy(l::SYS_fchown32, &FCHOWN);

    t.both(l::SYS_truncate, m::SYS_truncate, &TRUNCATE);
    t.both(l::SYS_ftruncate, m::SYS_ftruncate, &FTRUNCATE);
    t.legacy_adapted(l::SYS_truncate64, &TRUNCATE64, ArgAdapt::PairAt(1));
    t.legacy_adapted(l::SYS_ftruncate64, &FTRUNCATE64, ArgAdapt::PairAt(1));

    t.both(l::SYS_mknod, m::SYS_mknod, &MKNOD);
    t.both(l::SYS_mknodat, m::SYS_mknodat, &MKNODAT);

    t.both(l::SYS_umask, m::SYS_umask, &UMASK);
    t.both(l::SYS_flock, m::SYS_flock, &FLOCK);
    t.both(l::SYS_fsync, m::SYS_fsync, &FSYNC);
    t.both(l::SYS_fdatasync, m::SYS_fdatasync, &FDATASYNC);
    t.both(l::SYS_sync, m::SYS_sync, &SYNC);

    t.both(l::SYS_utimensat, m::SYS_utimensat, &UTIMENSAT);
    t.legacy_adapted(l::SYS_utimensat_time64, &UTIMENSAT, ArgAdapt::Wide);

    t.both(l::SYS_inotify_init, m::SYS_inotify_init, &INOTIFY_INIT);
    t.both(l::SYS_inotify_init1, m::SYS_inotify_init1, &INOTIFY_INIT1);
    t.both(l::SYS_inotify_add_watch, m::SYS_inotify_add_watch, &INOTIFY_ADD_WATCH);
    t.both(l::SYS_inotify_rm_watch, m::SYS_inotify_rm_watch, &INOTIFY_RM_WATCH);

    t.both(l::SYS_open_tree_attr, m::SYS_open_tree_attr, &OPEN_TREE_ATTR);
}

fn stat_to_guest(st: &libc::stat) -> Stat {
    Stat {
        st_dev: st.st_dev,
        st_ino: st.st_ino,
        st_nlink: st.st_nlink,
        st_mode: st.st_mode,
        st_uid: st.st_uid,
        st_gid: st.st_gid,
        st_rdev: st.st_rdev,
        st_size: st.st_size,
        st_blksize: st.st_blksize,
        st_blocks: st.st_blocks,
        st_atime: st.st_atime,
        st_mtime: st.st_mtime,
        st_ctime: st.st_ctime,
    }
}

fn finish_stat(call: &mut Call<'_>, addr: u64, st: &libc::stat) -> SysResult {
    let (abi, wide) = (call.abi, call.wide());
    write_stat(call.mem, abi, wide, addr, &stat_to_guest(st))?;
    Ok(0)
}

fn sys_stat(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    let addr = call.arg(1);
    let mut st: libc::stat = unsafe { std::mem::zeroed() };
    libc_result(unsafe { libc::stat(path.as_ptr(), &mut st) } as i64)?;
    finish_stat(call, addr, &st)
}

fn sys_lstat(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    let addr = call.arg(1);
    let mut st: libc::stat = unsafe { std::mem::zeroed() };
    libc_result(unsafe { libc::lstat(path.as_ptr(), &mut st) } as i64)?;
    finish_stat(call, addr, &st)
}

fn sys_fstat(call: &mut Call<'_>) -> SysResult {
    let addr = call.arg(1);
    let mut st: libc::stat = unsafe { std::mem::zeroed() };
    libc_result(unsafe { libc::fstat(call.fd(0), &mut st) } as i64)?;
    finish_stat(call, addr, &st)
}

fn sys_fstatat(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    let addr = call.arg(2);
    let mut st: libc::stat = unsafe { std::mem::zeroed() };
    libc_result(unsafe {
        libc::fstatat(call.fd(0), path.as_ptr(), &mut st, call.arg_i32(3))
    } as i64)?;
    finish_stat(call, addr, &st)
}

fn statfs_to_guest(sf: &libc::statfs) -> Statfs {
    Statfs {
        f_type: sf.f_type,
        f_bsize: sf.f_bsize,
        f_blocks: sf.f_blocks,
        f_bfree: sf.f_bfree,
        f_bavail: sf.f_bavail,
        f_files: sf.f_files,
        f_ffree: sf.f_ffree,
        f_namelen: sf.f_namelen,
    }
}

fn finish_statfs(call: &mut Call<'_>, wide: bool, addr: u64, sf: &libc::statfs) -> SysResult {
    let abi = call.abi;
    write_statfs(call.mem, abi, wide, addr, &statfs_to_guest(sf))?;
    Ok(0)
}

fn sys_statfs(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    let (wide, addr) = (call.wide(), call.arg(1));
    let mut sf: libc::statfs = unsafe { std::mem::zeroed() };
    libc_result(unsafe { libc::statfs(path.as_ptr(), &mut sf) } as i64)?;
    finish_statfs(call, wide, addr, &sf)
}

fn sys_fstatfs(call: &mut Call<'_>) -> SysResult {
    let (wide, addr) = (call.wide(), call.arg(1));
    let mut sf: libc::statfs = unsafe { std::mem::zeroed() };
    libc_result(unsafe { libc::fstatfs(call.fd(0), &mut sf) } as i64)?;
    finish_statfs(call, wide, addr, &sf)
}

// The narrow *64 spellings carry an explicit struct size between the
// subject and the buffer.
fn sys_statfs64(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    if call.len(1) < layout::STATFS64.size {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let addr = call.arg(2);
    let mut sf: libc::statfs = unsafe { std::mem::zeroed() };
    libc_result(unsafe { libc::statfs(path.as_ptr(), &mut sf) } as i64)?;
    finish_statfs(call, true, addr, &sf)
}

fn sys_fstatfs64(call: &mut Call<'_>) -> SysResult {
    if call.len(1) < layout::STATFS64.size {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let addr = call.arg(2);
    let mut sf: libc::statfs = unsafe { std::mem::zeroed() };
    libc_result(unsafe { libc::fstatfs(call.fd(0), &mut sf) } as i64)?;
    finish_statfs(call, true, addr, &sf)
}

fn sys_access(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    libc_result(unsafe { libc::access(path.as_ptr(), call.arg_i32(1)) } as i64)
}

fn sys_faccessat(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    // The kernel entry point takes no flags; libc emulation would add
    // behavior the guest did not ask for.
    libc_result(unsafe {
        libc::syscall(libc::SYS_faccessat, call.fd(0), path.as_ptr(), call.arg_i32(2))
    })
}

fn sys_faccessat2(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    libc_result(unsafe {
        libc::syscall(
            libc::SYS_faccessat2,
            call.fd(0),
            path.as_ptr(),
            call.arg_i32(2),
            call.arg_i32(3),
        )
    })
}

fn sys_chdir(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    libc_result(unsafe { libc::chdir(path.as_ptr()) } as i64)
}

fn sys_getcwd(call: &mut Call<'_>) -> SysResult {
    let (addr, size) = (call.arg(0), call.len(1));
    let buf = host_buf_mut(call, addr, size)?;
    // The raw syscall fills the buffer and returns the length including
    // the NUL, unlike the libc wrapper.
    libc_result(unsafe { libc::syscall(libc::SYS_getcwd, buf, size) })
}

fn sys_rename(call: &mut Call<'_>) -> SysResult {
    let (old, new) = (call.path(0)?, call.path(1)?);
    libc_result(unsafe { libc::rename(old.as_ptr(), new.as_ptr()) } as i64)
}

fn sys_renameat(call: &mut Call<'_>) -> SysResult {
    let (old, new) = (call.path(1)?, call.path(3)?);
    libc_result(unsafe {
        libc::renameat(call.fd(0), old.as_ptr(), call.fd(2), new.as_ptr())
    } as i64)
}

fn sys_renameat2(call: &mut Call<'_>) -> SysResult {
    let (old, new) = (call.path(1)?, call.path(3)?);
    libc_result(unsafe {
        libc::syscall(
            libc::SYS_renameat2,
            call.fd(0),
            old.as_ptr(),
            call.fd(2),
            new.as_ptr(),
            call.arg(4) as libc::c_uint,
        )
    })
}

fn sys_mkdir(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    libc_result(unsafe { libc::mkdir(path.as_ptr(), call.arg(1) as libc::mode_t) } as i64)
}

fn sys_mkdirat(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    libc_result(unsafe {
        libc::mkdirat(call.fd(0), path.as_ptr(), call.arg(2) as libc::mode_t)
    } as i64)
}

fn sys_rmdir(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    libc_result(unsafe { libc::rmdir(path.as_ptr()) } as i64)
}

fn sys_link(call: &mut Call<'_>) -> SysResult {
    let (old, new) = (call.path(0)?, call.path(1)?);
    libc_result(unsafe { libc::link(old.as_ptr(), new.as_ptr()) } as i64)
}

fn sys_linkat(call: &mut Call<'_>) -> SysResult {
    let (old, new) = (call.path(1)?, call.path(3)?);
    libc_result(unsafe {
        libc::linkat(call.fd(0), old.as_ptr(), call.fd(2), new.as_ptr(), call.arg_i32(4))
    } as i64)
}

fn sys_unlink(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    libc_result(unsafe { libc::unlink(path.as_ptr()) } as i64)
}

fn sys_unlinkat(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    libc_result(unsafe { libc::unlinkat(call.fd(0), path.as_ptr(), call.arg_i32(2)) } as i64)
}

fn sys_symlink(call: &mut Call<'_>) -> SysResult {
    let (target, link) = (call.path(0)?, call.path(1)?);
    libc_result(unsafe { libc::symlink(target.as_ptr(), link.as_ptr()) } as i64)
}

fn sys_symlinkat(call: &mut Call<'_>) -> SysResult {
    let (target, link) = (call.path(0)?, call.path(2)?);
    libc_result(unsafe { libc::symlinkat(target.as_ptr(), call.fd(1), link.as_ptr()) } as i64)
}

fn sys_readlink(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    let (addr, len) = (call.arg(1), call.len(2));
    let buf = host_buf_mut(call, addr, len)?;
    libc_result(unsafe { libc::readlink(path.as_ptr(), buf as *mut libc::c_char, len) } as i64)
}

fn sys_readlinkat(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    let (addr, len) = (call.arg(2), call.len(3));
    let buf = host_buf_mut(call, addr, len)?;
    libc_result(unsafe {
        libc::readlinkat(call.fd(0), path.as_ptr(), buf as *mut libc::c_char, len)
    } as i64)
}

fn sys_chmod(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    libc_result(unsafe { libc::chmod(path.as_ptr(), call.arg(1) as libc::mode_t) } as i64)
}

fn sys_fchmodat(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    libc_result(unsafe {
        libc::syscall(
            libc::SYS_fchmodat,
            call.fd(0),
            path.as_ptr(),
            call.arg(2) as libc::mode_t,
        )
    })
}

fn sys_fchmodat2(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    libc_result(unsafe {
        libc::syscall(
            SYS_FCHMODAT2,
            call.fd(0),
            path.as_ptr(),
            call.arg(2) as libc::mode_t,
            call.arg_i32(3),
        )
    })
}

fn sys_chown(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    libc_result(unsafe {
        libc::chown(path.as_ptr(), call.arg(1) as libc::uid_t, call.arg(2) as libc::gid_t)
    } as i64)
}

fn sys_lchown(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    libc_result(unsafe {
        libc::lchown(path.as_ptr(), call.arg(1) as libc::uid_t, call.arg(2) as libc::gid_t)
    } as i64)
}

fn sys_fchownat(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    libc_result(unsafe {
        libc::fchownat(
            call.fd(0),
            path.as_ptr(),
            call.arg(2) as libc::uid_t,
            call.arg(3) as libc::gid_t,
            call.arg_i32(4),
        )
    } as i64)
}

fn sys_truncate(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    let len = if call.wide() {
        call.arg(1) as i64
    } else {
        call.arg_i32(1) as i64
    };
    libc_result(unsafe { libc::truncate(path.as_ptr(), len as libc::off_t) } as i64)
}

fn sys_truncate64(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    libc_result(unsafe { libc::truncate(path.as_ptr(), call.arg(1) as libc::off_t) } as i64)
}

fn sys_ftruncate64(call: &mut Call<'_>) -> SysResult {
    libc_result(unsafe { libc::ftruncate(call.fd(0), call.arg(1) as libc::off_t) } as i64)
}

fn sys_mknod(call: &mut Call<'_>) -> SysResult {
    let path = call.path(0)?;
    libc_result(unsafe {
        libc::mknod(path.as_ptr(), call.arg(1) as libc::mode_t, call.arg(2) as libc::dev_t)
    } as i64)
}

fn sys_mknodat(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    libc_result(unsafe {
        libc::mknodat(
            call.fd(0),
            path.as_ptr(),
            call.arg(2) as libc::mode_t,
            call.arg(3) as libc::dev_t,
        )
    } as i64)
}

fn sys_utimensat(call: &mut Call<'_>) -> SysResult {
    // A null path means "operate on the fd itself"; the libc wrapper
    // rejects it, the raw syscall accepts it.
    let path = if call.arg(1) == 0 {
        None
    } else {
        Some(call.path(1)?)
    };
    let times_addr = call.arg(2);
    let times: Option<[libc::timespec; 2]> = if times_addr == 0 {
        None
    } else {
        let atime = read_timespec(call.mem, call.abi, call.wide(), times_addr)?;
        let mtime = read_timespec(call.mem, call.abi, call.wide(), times_addr + 16)?;
        Some([to_host_timespec(&atime), to_host_timespec(&mtime)])
    };

    let path_ptr = path.as_ref().map_or(std::ptr::null(), |p| p.as_ptr());
    let times_ptr = times
        .as_ref()
        .map_or(std::ptr::null(), |t| t.as_ptr());
    libc_result(unsafe {
        libc::syscall(libc::SYS_utimensat, call.fd(0), path_ptr, times_ptr, call.arg_i32(3))
    })
}

fn sys_inotify_add_watch(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    libc_result(unsafe {
        libc::inotify_add_watch(call.fd(0), path.as_ptr(), call.arg(2) as u32)
    } as i64)
}

fn sys_open_tree_attr(call: &mut Call<'_>) -> SysResult {
    let path = call.path(1)?;
    let flags = call.arg(2) as libc::c_uint;
    let size = call.len(4);
    if size < MOUNT_ATTR.size {
        return Err(Fault::Errno(libc::EINVAL));
    }
    let attr = read_mount_attr(call.mem, call.abi, call.arg(3))?;

    #[repr(C)]
    struct RawMountAttr {
        attr_set: u64,
        attr_clr: u64,
        propagation: u64,
        userns_fd: u64,
    }
    let raw = RawMountAttr {
        attr_set: attr.attr_set,
        attr_clr: attr.attr_clr,
        propagation: attr.propagation,
        userns_fd: attr.userns_fd,
    };
    libc_result(unsafe {
        libc::syscall(
            SYS_OPEN_TREE_ATTR,
            call.fd(0),
            path.as_ptr(),
            flags,
            &raw as *const RawMountAttr,
            std::mem::size_of::<RawMountAttr>(),
        )
    })
}
