// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unified 64-bit syscall numbers. One spelling per operation; no `*32`,
//! `*64` or multiplexer entries.

#![allow(non_upper_case_globals)]

pub const SYS_read: u32 = 0;
pub const SYS_write: u32 = 1;
pub const SYS_open: u32 = 2;
pub const SYS_close: u32 = 3;
pub const SYS_stat: u32 = 4;
pub const SYS_fstat: u32 = 5;
pub const SYS_lstat: u32 = 6;
pub const SYS_poll: u32 = 7;
pub const SYS_lseek: u32 = 8;
pub const SYS_rt_sigaction: u32 = 13;
pub const SYS_rt_sigprocmask: u32 = 14;
pub const SYS_pread64: u32 = 17;
pub const SYS_pwrite64: u32 = 18;
pub const SYS_readv: u32 = 19;
pub const SYS_writev: u32 = 20;
pub const SYS_access: u32 = 21;
pub const SYS_pipe: u32 = 22;
pub const SYS_select: u32 = 23;
pub const SYS_sched_yield: u32 = 24;
pub const SYS_dup: u32 = 32;
pub const SYS_dup2: u32 = 33;
pub const SYS_nanosleep: u32 = 35;
pub const SYS_getpid: u32 = 39;
pub const SYS_sendfile: u32 = 40;
pub const SYS_socket: u32 = 41;
pub const SYS_connect: u32 = 42;
pub const SYS_accept: u32 = 43;
pub const SYS_sendto: u32 = 44;
pub const SYS_recvfrom: u32 = 45;
pub const SYS_shutdown: u32 = 48;
pub const SYS_bind: u32 = 49;
pub const SYS_listen: u32 = 50;
pub const SYS_getsockname: u32 = 51;
pub const SYS_getpeername: u32 = 52;
pub const SYS_socketpair: u32 = 53;
pub const SYS_setsockopt: u32 = 54;
pub const SYS_getsockopt: u32 = 55;
pub const SYS_exit: u32 = 60;
pub const SYS_wait4: u32 = 61;
pub const SYS_kill: u32 = 62;
pub const SYS_uname: u32 = 63;
pub const SYS_shmget: u32 = 29;
pub const SYS_shmctl: u32 = 31;
pub const SYS_semget: u32 = 64;
pub const SYS_semop: u32 = 65;
pub const SYS_semctl: u32 = 66;
pub const SYS_msgget: u32 = 68;
pub const SYS_msgsnd: u32 = 69;
pub const SYS_msgrcv: u32 = 70;
pub const SYS_msgctl: u32 = 71;
pub const SYS_flock: u32 = 73;
pub const SYS_fsync: u32 = 74;
pub const SYS_fdatasync: u32 = 75;
pub const SYS_truncate: u32 = 76;
pub const SYS_ftruncate: u32 = 77;
pub const SYS_getcwd: u32 = 79;
pub const SYS_chdir: u32 = 80;
pub const SYS_fchdir: u32 = 81;
pub const SYS_rename: u32 = 82;
pub const SYS_mkdir: u32 = 83;
pub const SYS_rmdir: u32 = 84;
pub const SYS_creat: u32 = 85;
pub const SYS_link: u32 = 86;
pub const SYS_unlink: u32 = 87;
pub const SYS_symlink: u32 = 88;
pub const SYS_readlink: u32 = 89;
pub const SYS_chmod: u32 = 90;
pub const SYS_fchmod: u32 = 91;
pub const SYS_chown: u32 = 92;
pub const SYS_fchown: u32 = 93;
pub const SYS_lchown: u32 = 94;
pub const SYS_umask: u32 = 95;
pub const SYS_gettimeofday: u32 = 96;
pub const SYS_getrlimit: u32 = 97;
pub const SYS_getrusage: u32 = 98;
pub const SYS_times: u32 = 100;
pub const SYS_getuid: u32 = 102;
pub const SYS_getgid: u32 = 104;
pub const SYS_setuid: u32 = 105;
pub const SYS_setgid: u32 = 106;
pub const SYS_geteuid: u32 = 107;
pub const SYS_getegid: u32 = 108;
pub const SYS_setpgid: u32 = 109;
pub const SYS_getppid: u32 = 110;
pub const SYS_getpgrp: u32 = 111;
pub const SYS_setsid: u32 = 112;
pub const SYS_setreuid: u32 = 113;
pub const SYS_setregid: u32 = 114;
pub const SYS_getgroups: u32 = 115;
pub const SYS_setgroups: u32 = 116;
pub const SYS_setresuid: u32 = 117;
pub const SYS_getresuid: u32 = 118;
pub const SYS_setresgid: u32 = 119;
pub const SYS_getresgid: u32 = 120;
pub const SYS_getpgid: u32 = 121;
pub const SYS_setfsuid: u32 = 122;
pub const SYS_setfsgid: u32 = 123;
pub const SYS_getsid: u32 = 124;
pub const SYS_capget: u32 = 125;
pub const SYS_capset: u32 = 126;
pub const SYS_rt_sigpending: u32 = 127;
pub const SYS_mknod: u32 = 133;
pub const SYS_statfs: u32 = 137;
pub const SYS_fstatfs: u32 = 138;
pub const SYS_getpriority: u32 = 140;
pub const SYS_setpriority: u32 = 141;
pub const SYS_setrlimit: u32 = 160;
pub const SYS_sync: u32 = 162;
pub const SYS_settimeofday: u32 = 164;
pub const SYS_sethostname: u32 = 170;
pub const SYS_setdomainname: u32 = 171;
pub const SYS_gettid: u32 = 186;
pub const SYS_tkill: u32 = 200;
pub const SYS_time: u32 = 201;
pub const SYS_futex: u32 = 202;
pub const SYS_epoll_create: u32 = 213;
pub const SYS_getdents64: u32 = 217;
pub const SYS_semtimedop: u32 = 220;
pub const SYS_clock_settime: u32 = 227;
pub const SYS_clock_gettime: u32 = 228;
pub const SYS_clock_getres: u32 = 229;
pub const SYS_clock_nanosleep: u32 = 230;
pub const SYS_exit_group: u32 = 231;
pub const SYS_epoll_wait: u32 = 232;
pub const SYS_epoll_ctl: u32 = 233;
pub const SYS_tgkill: u32 = 234;
pub const SYS_mq_open: u32 = 240;
pub const SYS_mq_unlink: u32 = 241;
pub const SYS_mq_timedsend: u32 = 242;
pub const SYS_mq_timedreceive: u32 = 243;
pub const SYS_mq_getsetattr: u32 = 245;
pub const SYS_waitid: u32 = 247;
pub const SYS_inotify_init: u32 = 253;
pub const SYS_inotify_add_watch: u32 = 254;
pub const SYS_inotify_rm_watch: u32 = 255;
pub const SYS_openat: u32 = 257;
pub const SYS_mkdirat: u32 = 258;
pub const SYS_mknodat: u32 = 259;
pub const SYS_fchownat: u32 = 260;
pub const SYS_newfstatat: u32 = 262;
pub const SYS_unlinkat: u32 = 263;
pub const SYS_renameat: u32 = 264;
pub const SYS_linkat: u32 = 265;
pub const SYS_symlinkat: u32 = 266;
pub const SYS_readlinkat: u32 = 267;
pub const SYS_fchmodat: u32 = 268;
pub const SYS_faccessat: u32 = 269;
pub const SYS_pselect6: u32 = 270;
pub const SYS_ppoll: u32 = 271;
pub const SYS_utimensat: u32 = 280;
pub const SYS_epoll_pwait: u32 = 281;
pub const SYS_timerfd_create: u32 = 283;
pub const SYS_eventfd: u32 = 284;
pub const SYS_timerfd_settime: u32 = 286;
pub const SYS_timerfd_gettime: u32 = 287;
pub const SYS_accept4: u32 = 288;
pub const SYS_eventfd2: u32 = 290;
pub const SYS_epoll_create1: u32 = 291;
pub const SYS_dup3: u32 = 292;
pub const SYS_pipe2: u32 = 293;
pub const SYS_inotify_init1: u32 = 294;
pub const SYS_prlimit64: u32 = 302;
pub const SYS_renameat2: u32 = 316;
pub const SYS_getrandom: u32 = 318;
pub const SYS_openat2: u32 = 437;
pub const SYS_faccessat2: u32 = 439;
pub const SYS_landlock_create_ruleset: u32 = 444;
pub const SYS_landlock_add_rule: u32 = 445;
pub const SYS_landlock_restrict_self: u32 = 446;
pub const SYS_fchmodat2: u32 = 452;
pub const SYS_open_tree_attr: u32 = 467;
