//! Opcode→handler dispatch table.
//!
//! Each entry declares the connection status it requires and a minimum
//! payload length; both are checked before the handler runs. Handlers return
//! `true` when the message was consumed (including benign stale-reference
//! cases) and `false` only for protocol violations, which the caller must
//! answer by closing the connection.

use std::collections::HashMap;

use crate::opcode::{ConnectionStatus, Opcode, SocketId};

pub type Handler<C> = fn(&mut C, SocketId, &mut &[u8]) -> bool;

pub struct HandlerEntry<C> {
    pub status: ConnectionStatus,
    pub min_len: usize,
    pub handler: Handler<C>,
}

pub struct HandlerTable<C> {
    entries: HashMap<u16, HandlerEntry<C>>,
}

impl<C> Default for HandlerTable<C> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<C> HandlerTable<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        opcode: Opcode,
        status: ConnectionStatus,
        min_len: usize,
        handler: Handler<C>,
    ) {
        let prev = self.entries.insert(
            opcode as u16,
            HandlerEntry {
                status,
                min_len,
                handler,
            },
        );
        debug_assert!(prev.is_none(), "duplicate handler for {opcode:?}");
    }

    /// Route one framed message. Returns `false` when the connection must be
    /// closed: unknown opcode, wrong connection status, or undersized
    /// payload, or the handler itself reporting a malformed body.
    pub fn dispatch(
        &self,
        ctx: &mut C,
        socket: SocketId,
        status: ConnectionStatus,
        opcode: u16,
        payload: &[u8],
    ) -> bool {
        let Some(entry) = self.entries.get(&opcode) else {
            log::error!("dispatch: unknown opcode {opcode:#06x} on {socket:?}");
            return false;
        };
        if status < entry.status {
            log::error!(
                "dispatch: opcode {opcode:#06x} requires {:?}, connection is {status:?}",
                entry.status
            );
            return false;
        }
        if payload.len() < entry.min_len {
            log::error!(
                "dispatch: opcode {opcode:#06x} payload {} < min {}",
                payload.len(),
                entry.min_len
            );
            return false;
        }
        let mut cur = payload;
        (entry.handler)(ctx, socket, &mut cur)
    }
}
