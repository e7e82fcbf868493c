// SPDX-License-Identifier: MIT OR Apache-2.0

use ponte_common::kernel_types::ipc_call;
use ponte_common::syscalls::{legacy32 as l, modern64 as m};
use serial_test::serial;

use super::{legacy_env, modern_env, neg, put_cstr, ret, RAM_BASE};
use crate::marshal::{read_u32, write_u16, write_u32};
use crate::mem::GuestMem;

#[test]
#[serial]
fn message_queue_round_trip_through_the_multiplexer() {
    let (d, mut ram) = legacy_env();
    let ipc = |d: &crate::Dispatcher, ram: &mut crate::GuestRam, args: [u64; 6]| {
        ret(d.dispatch(ram, l::SYS_ipc, args))
    };

    let msqid = ipc(
        &d,
        &mut ram,
        [
            ipc_call::MSGGET as u64,
            0, // IPC_PRIVATE
            (libc::IPC_CREAT | 0o600) as u64,
            0,
            0,
            0,
        ],
    );
    assert!(msqid >= 0, "msgget -> {msqid}");

    // Guest msgbuf: 32-bit mtype, payload right behind it.
    let sndbuf = RAM_BASE;
    write_u32(&mut ram, d.abi(), sndbuf, 42).unwrap();
    ram.write(sndbuf + 4, b"ping").unwrap();
    let r = ipc(
        &d,
        &mut ram,
        [ipc_call::MSGSND as u64, msqid as u64, 4, 0, sndbuf, 0],
    );
    assert_eq!(r, 0);

    let rcvbuf = RAM_BASE + 0x100;
    let r = ipc(
        &d,
        &mut ram,
        [ipc_call::MSGRCV as u64, msqid as u64, 64, 0, rcvbuf, 0],
    );
    assert_eq!(r, 4);
    assert_eq!(read_u32(&ram, d.abi(), rcvbuf).unwrap(), 42);
    let mut payload = [0u8; 4];
    ram.read(rcvbuf + 4, &mut payload).unwrap();
    assert_eq!(&payload, b"ping");

    let r = ipc(
        &d,
        &mut ram,
        [
            ipc_call::MSGCTL as u64,
            msqid as u64,
            libc::IPC_RMID as u64,
            0,
            0,
            0,
        ],
    );
    assert_eq!(r, 0);
}

#[test]
#[serial]
fn semaphores_on_the_unified_numbering() {
    let (d, mut ram) = modern_env();

    let semid = ret(d.dispatch(
        &mut ram,
        m::SYS_semget,
        [0, 1, (libc::IPC_CREAT | 0o600) as u64, 0, 0, 0],
    ));
    assert!(semid >= 0, "semget -> {semid}");

    // sembuf { sem_num: 0, sem_op: +1, sem_flg: 0 }
    let sops = RAM_BASE;
    write_u16(&mut ram, d.abi(), sops, 0).unwrap();
    write_u16(&mut ram, d.abi(), sops + 2, 1).unwrap();
    write_u16(&mut ram, d.abi(), sops + 4, 0).unwrap();
    let r = ret(d.dispatch(&mut ram, m::SYS_semop, [semid as u64, sops, 1, 0, 0, 0]));
    assert_eq!(r, 0);

    let val = ret(d.dispatch(
        &mut ram,
        m::SYS_semctl,
        [semid as u64, 0, libc::GETVAL as u64, 0, 0, 0],
    ));
    assert_eq!(val, 1);

    // semid_ds marshaling is not provided
    let r = ret(d.dispatch(
        &mut ram,
        m::SYS_semctl,
        [semid as u64, 0, libc::IPC_STAT as u64, RAM_BASE, 0, 0],
    ));
    assert_eq!(r, neg(libc::ENOSYS));

    let r = ret(d.dispatch(
        &mut ram,
        m::SYS_semctl,
        [semid as u64, 0, libc::IPC_RMID as u64, 0, 0, 0],
    ));
    assert_eq!(r, 0);
}

#[test]
#[serial]
fn posix_queue_returns_the_priority() {
    let (d, mut ram) = legacy_env();
    let name = format!("ponte-test-{}", std::process::id());
    let name_addr = RAM_BASE;
    put_cstr(&mut ram, name_addr, &name);

    let mqd = ret(d.dispatch(
        &mut ram,
        l::SYS_mq_open,
        [
            name_addr,
            (libc::O_CREAT | libc::O_RDWR) as u64,
            0o600,
            0,
            0,
            0,
        ],
    ));
    if mqd < 0 {
        eprintln!("skipping: mq_open -> {mqd}");
        return;
    }

    let msg = RAM_BASE + 0x100;
    ram.write(msg, b"hello").unwrap();
    let r = ret(d.dispatch(&mut ram, l::SYS_mq_timedsend, [mqd as u64, msg, 5, 7, 0, 0]));
    assert_eq!(r, 0);

    // The receive buffer must cover the queue's mq_msgsize (8192 by
    // default).
    let out = RAM_BASE + 0x1000;
    let prio = RAM_BASE + 0x200;
    let n = ret(d.dispatch(
        &mut ram,
        l::SYS_mq_timedreceive,
        [mqd as u64, out, 16384, prio, 0, 0],
    ));
    assert_eq!(n, 5);
    assert_eq!(read_u32(&ram, d.abi(), prio).unwrap(), 7);
    let mut got = [0u8; 5];
    ram.read(out, &mut got).unwrap();
    assert_eq!(&got, b"hello");

    ret(d.dispatch(&mut ram, l::SYS_close, [mqd as u64, 0, 0, 0, 0, 0]));
    let r = ret(d.dispatch(&mut ram, l::SYS_mq_unlink, [name_addr, 0, 0, 0, 0, 0]));
    assert_eq!(r, 0);
}

// Receives come back highest priority first, not in send order.
#[test]
#[serial]
fn posix_queue_delivers_by_priority() {
    let (d, mut ram) = legacy_env();
    let name = format!("ponte-test-prio-{}", std::process::id());
    let name_addr = RAM_BASE;
    put_cstr(&mut ram, name_addr, &name);

    let mqd = ret(d.dispatch(
        &mut ram,
        l::SYS_mq_open,
        [
            name_addr,
            (libc::O_CREAT | libc::O_RDWR) as u64,
            0o600,
            0,
            0,
            0,
        ],
    ));
    if mqd < 0 {
        eprintln!("skipping: mq_open -> {mqd}");
        return;
    }

    let low = RAM_BASE + 0x100;
    ram.write(low, b"Low priority").unwrap();
    let r = ret(d.dispatch(&mut ram, l::SYS_mq_timedsend, [mqd as u64, low, 12, 1, 0, 0]));
    assert_eq!(r, 0);

    let high = RAM_BASE + 0x200;
    ram.write(high, b"High priority").unwrap();
    let r = ret(d.dispatch(&mut ram, l::SYS_mq_timedsend, [mqd as u64, high, 13, 10, 0, 0]));
    assert_eq!(r, 0);

    let out = RAM_BASE + 0x1000;
    let prio = RAM_BASE + 0x300;
    let n = ret(d.dispatch(
        &mut ram,
        l::SYS_mq_timedreceive,
        [mqd as u64, out, 16384, prio, 0, 0],
    ));
    assert_eq!(n, 13);
    assert_eq!(read_u32(&ram, d.abi(), prio).unwrap(), 10);
    let mut got = [0u8; 13];
    ram.read(out, &mut got).unwrap();
    assert_eq!(&got, b"High priority");

    let n = ret(d.dispatch(
        &mut ram,
        l::SYS_mq_timedreceive,
        [mqd as u64, out, 16384, prio, 0, 0],
    ));
    assert_eq!(n, 12);
    assert_eq!(read_u32(&ram, d.abi(), prio).unwrap(), 1);

    ret(d.dispatch(&mut ram, l::SYS_close, [mqd as u64, 0, 0, 0, 0, 0]));
    let r = ret(d.dispatch(&mut ram, l::SYS_mq_unlink, [name_addr, 0, 0, 0, 0, 0]));
    assert_eq!(r, 0);
}
