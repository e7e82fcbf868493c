// SPDX-License-Identifier: MIT OR Apache-2.0

//! Legacy 32-bit syscall numbers.
//!
//! This numbering predates the unified 64-bit table: unsuffixed identity
//! calls return 16-bit IDs (hence the `*32` aliases), large-file variants
//! carry a `*64` suffix, SysV IPC goes through the `ipc()` multiplexer,
//! and 64-bit-time variants were appended late as `*_time64`.

#![allow(non_upper_case_globals)]

pub const SYS_exit: u32 = 1;
pub const SYS_read: u32 = 3;
pub const SYS_write: u32 = 4;
pub const SYS_open: u32 = 5;
pub const SYS_close: u32 = 6;
pub const SYS_waitpid: u32 = 7;
pub const SYS_creat: u32 = 8;
pub const SYS_link: u32 = 9;
pub const SYS_unlink: u32 = 10;
pub const SYS_chdir: u32 = 12;
pub const SYS_time: u32 = 13;
pub const SYS_mknod: u32 = 14;
pub const SYS_chmod: u32 = 15;
pub const SYS_chown: u32 = 16;
pub const SYS_lseek: u32 = 19;
pub const SYS_getpid: u32 = 20;
pub const SYS_setuid: u32 = 23;
pub const SYS_getuid: u32 = 24;
pub const SYS_access: u32 = 33;
pub const SYS_sync: u32 = 36;
pub const SYS_kill: u32 = 37;
pub const SYS_rename: u32 = 38;
pub const SYS_mkdir: u32 = 39;
pub const SYS_rmdir: u32 = 40;
pub const SYS_dup: u32 = 41;
pub const SYS_pipe: u32 = 42;
pub const SYS_times: u32 = 43;
pub const SYS_setgid: u32 = 46;
pub const SYS_getgid: u32 = 47;
pub const SYS_geteuid: u32 = 49;
pub const SYS_getegid: u32 = 50;
pub const SYS_setpgid: u32 = 57;
pub const SYS_umask: u32 = 60;
pub const SYS_dup2: u32 = 63;
pub const SYS_getppid: u32 = 64;
pub const SYS_getpgrp: u32 = 65;
pub const SYS_setsid: u32 = 66;
pub const SYS_setreuid: u32 = 70;
pub const SYS_setregid: u32 = 71;
pub const SYS_sethostname: u32 = 74;
pub const SYS_setrlimit: u32 = 75;
pub const SYS_getrlimit: u32 = 76;
pub const SYS_getrusage: u32 = 77;
pub const SYS_gettimeofday: u32 = 78;
pub const SYS_settimeofday: u32 = 79;
pub const SYS_getgroups: u32 = 80;
pub const SYS_setgroups: u32 = 81;
pub const SYS_select: u32 = 82;
pub const SYS_symlink: u32 = 83;
pub const SYS_readlink: u32 = 85;
pub const SYS_truncate: u32 = 92;
pub const SYS_ftruncate: u32 = 93;
pub const SYS_fchmod: u32 = 94;
pub const SYS_fchown: u32 = 95;
pub const SYS_getpriority: u32 = 96;
pub const SYS_setpriority: u32 = 97;
pub const SYS_statfs: u32 = 99;
pub const SYS_fstatfs: u32 = 100;
pub const SYS_stat: u32 = 106;
pub const SYS_lstat: u32 = 107;
pub const SYS_fstat: u32 = 108;
pub const SYS_wait4: u32 = 114;
pub const SYS_ipc: u32 = 117;
pub const SYS_fsync: u32 = 118;
pub const SYS_setdomainname: u32 = 121;
pub const SYS_uname: u32 = 122;
pub const SYS_getpgid: u32 = 132;
pub const SYS_fchdir: u32 = 133;
pub const SYS_setfsuid: u32 = 138;
pub const SYS_setfsgid: u32 = 139;
pub const SYS__llseek: u32 = 140;
pub const SYS_flock: u32 = 143;
pub const SYS_readv: u32 = 145;
pub const SYS_writev: u32 = 146;
pub const SYS_getsid: u32 = 147;
pub const SYS_fdatasync: u32 = 148;
pub const SYS_sched_yield: u32 = 158;
pub const SYS_nanosleep: u32 = 162;
pub const SYS_setresuid: u32 = 164;
pub const SYS_getresuid: u32 = 165;
pub const SYS_poll: u32 = 168;
pub const SYS_setresgid: u32 = 170;
pub const SYS_getresgid: u32 = 171;
pub const SYS_rt_sigaction: u32 = 174;
pub const SYS_rt_sigprocmask: u32 = 175;
pub const SYS_rt_sigpending: u32 = 176;
pub const SYS_pread64: u32 = 180;
pub const SYS_pwrite64: u32 = 181;
pub const SYS_lchown: u32 = 182;
pub const SYS_getcwd: u32 = 183;
pub const SYS_capget: u32 = 184;
pub const SYS_capset: u32 = 185;
pub const SYS_sendfile: u32 = 187;
pub const SYS_ugetrlimit: u32 = 191;
pub const SYS_truncate64: u32 = 193;
pub const SYS_ftruncate64: u32 = 194;
pub const SYS_stat64: u32 = 195;
pub const SYS_lstat64: u32 = 196;
pub const SYS_fstat64: u32 = 197;
pub const SYS_chown32: u32 = 198;
pub const SYS_getuid32: u32 = 199;
pub const SYS_getgid32: u32 = 200;
pub const SYS_geteuid32: u32 = 201;
pub const SYS_getegid32: u32 = 202;
pub const SYS_setreuid32: u32 = 203;
pub const SYS_setregid32: u32 = 204;
pub const SYS_getgroups32: u32 = 205;
pub const SYS_setgroups32: u32 = 206;
pub const SYS_fchown32: u32 = 207;
pub const SYS_setresuid32: u32 = 208;
pub const SYS_getresuid32: u32 = 209;
pub const SYS_setresgid32: u32 = 210;
pub const SYS_getresgid32: u32 = 211;
pub const SYS_lchown32: u32 = 212;
pub const SYS_setuid32: u32 = 213;
pub const SYS_setgid32: u32 = 214;
pub const SYS_setfsuid32: u32 = 215;
pub const SYS_setfsgid32: u32 = 216;
pub const SYS_getdents64: u32 = 220;
pub const SYS_gettid: u32 = 221;
pub const SYS_tkill: u32 = 222;
pub const SYS_futex: u32 = 235;
pub const SYS_sendfile64: u32 = 236;
pub const SYS_exit_group: u32 = 247;
pub const SYS_epoll_create: u32 = 249;
pub const SYS_epoll_ctl: u32 = 250;
pub const SYS_epoll_wait: u32 = 251;
pub const SYS_clock_settime: u32 = 259;
pub const SYS_clock_gettime: u32 = 260;
pub const SYS_clock_getres: u32 = 261;
pub const SYS_clock_nanosleep: u32 = 262;
pub const SYS_statfs64: u32 = 263;
pub const SYS_fstatfs64: u32 = 264;
pub const SYS_tgkill: u32 = 265;
pub const SYS_mq_open: u32 = 271;
pub const SYS_mq_unlink: u32 = 272;
pub const SYS_mq_timedsend: u32 = 273;
pub const SYS_mq_timedreceive: u32 = 274;
pub const SYS_mq_getsetattr: u32 = 276;
pub const SYS_waitid: u32 = 277;
pub const SYS_inotify_init: u32 = 284;
pub const SYS_inotify_add_watch: u32 = 285;
pub const SYS_inotify_rm_watch: u32 = 286;
pub const SYS_openat: u32 = 288;
pub const SYS_mkdirat: u32 = 289;
pub const SYS_mknodat: u32 = 290;
pub const SYS_fchownat: u32 = 291;
pub const SYS_fstatat64: u32 = 293;
pub const SYS_unlinkat: u32 = 294;
pub const SYS_renameat: u32 = 295;
pub const SYS_linkat: u32 = 296;
pub const SYS_symlinkat: u32 = 297;
pub const SYS_readlinkat: u32 = 298;
pub const SYS_fchmodat: u32 = 299;
pub const SYS_faccessat: u32 = 300;
pub const SYS_pselect6: u32 = 301;
pub const SYS_ppoll: u32 = 302;
pub const SYS_epoll_pwait: u32 = 315;
pub const SYS_utimensat: u32 = 316;
pub const SYS_timerfd_create: u32 = 318;
pub const SYS_eventfd: u32 = 319;
pub const SYS_timerfd_settime: u32 = 321;
pub const SYS_timerfd_gettime: u32 = 322;
pub const SYS_eventfd2: u32 = 324;
pub const SYS_epoll_create1: u32 = 325;
pub const SYS_dup3: u32 = 326;
pub const SYS_pipe2: u32 = 327;
pub const SYS_inotify_init1: u32 = 328;
pub const SYS_prlimit64: u32 = 339;
pub const SYS_renameat2: u32 = 351;
pub const SYS_getrandom: u32 = 352;
pub const SYS_socket: u32 = 356;
pub const SYS_socketpair: u32 = 357;
pub const SYS_bind: u32 = 358;
pub const SYS_connect: u32 = 359;
pub const SYS_listen: u32 = 360;
pub const SYS_accept4: u32 = 361;
pub const SYS_getsockopt: u32 = 362;
pub const SYS_setsockopt: u32 = 363;
pub const SYS_getsockname: u32 = 364;
pub const SYS_getpeername: u32 = 365;
pub const SYS_sendto: u32 = 366;
pub const SYS_recvfrom: u32 = 368;
pub const SYS_shutdown: u32 = 370;
pub const SYS_semget: u32 = 393;
pub const SYS_semctl: u32 = 394;
pub const SYS_shmget: u32 = 395;
pub const SYS_shmctl: u32 = 396;
pub const SYS_msgget: u32 = 399;
pub const SYS_msgsnd: u32 = 400;
pub const SYS_msgrcv: u32 = 401;
pub const SYS_msgctl: u32 = 402;
pub const SYS_clock_gettime64: u32 = 403;
pub const SYS_clock_settime64: u32 = 404;
pub const SYS_clock_getres_time64: u32 = 406;
pub const SYS_clock_nanosleep_time64: u32 = 407;
pub const SYS_timerfd_gettime64: u32 = 410;
pub const SYS_timerfd_settime64: u32 = 411;
pub const SYS_utimensat_time64: u32 = 412;
pub const SYS_pselect6_time64: u32 = 413;
pub const SYS_ppoll_time64: u32 = 414;
pub const SYS_mq_timedsend_time64: u32 = 418;
pub const SYS_mq_timedreceive_time64: u32 = 419;
pub const SYS_futex_time64: u32 = 422;
pub const SYS_openat2: u32 = 437;
pub const SYS_faccessat2: u32 = 439;
pub const SYS_landlock_create_ruleset: u32 = 444;
pub const SYS_landlock_add_rule: u32 = 445;
pub const SYS_landlock_restrict_self: u32 = 446;
pub const SYS_fchmodat2: u32 = 452;
pub const SYS_open_tree_attr: u32 = 467;
