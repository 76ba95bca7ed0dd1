//! End-to-end: encode → bounded channel → frame read → dispatch table.

use net_core::channel::channel_bounded;
use net_core::dispatch::HandlerTable;
use net_core::frame::read_msg;
use net_core::message::{encode_framed, EntityDestroy, Ping};
use net_core::opcode::{ConnectionStatus, Opcode, SocketId};
use net_core::wire::{read_u32, WireDecode};

#[derive(Default)]
struct Ctx {
    destroyed: Vec<u32>,
}

fn handle_destroy(ctx: &mut Ctx, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Ok(msg) = EntityDestroy::decode(cur) else {
        return false;
    };
    ctx.destroyed.push(msg.id);
    true
}

fn handle_ping_echo(_ctx: &mut Ctx, _s: SocketId, cur: &mut &[u8]) -> bool {
    read_u32(cur).is_ok()
}

#[test]
fn frames_flow_through_channel_and_table() {
    let (tx, rx) = channel_bounded(16);
    assert!(tx.try_send(encode_framed(Opcode::EntityDestroy, &EntityDestroy { id: 42 })));
    assert!(tx.try_send(encode_framed(Opcode::Ping, &Ping { client_time_ms: 5 })));

    let mut table: HandlerTable<Ctx> = HandlerTable::new();
    table.register(
        Opcode::EntityDestroy,
        ConnectionStatus::Connected,
        EntityDestroy::MIN_LEN,
        handle_destroy,
    );
    table.register(
        Opcode::Ping,
        ConnectionStatus::Connecting,
        Ping::MIN_LEN,
        handle_ping_echo,
    );

    let mut ctx = Ctx::default();
    for bytes in rx.drain() {
        let (op, payload) = read_msg(&bytes).expect("well-formed frame");
        assert!(table.dispatch(
            &mut ctx,
            SocketId(1),
            ConnectionStatus::Connected,
            op,
            payload
        ));
    }
    assert_eq!(ctx.destroyed, vec![42]);
}

#[test]
fn garbage_frame_is_rejected_before_dispatch() {
    let bytes = vec![9u8, 1, 2, 3];
    assert!(read_msg(&bytes).is_err());
}
