use std::fmt;

/// The kind of write a store performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WriteOp::Create => write!(f, "create"),
            WriteOp::Update => write!(f, "update"),
            WriteOp::Delete => write!(f, "delete"),
        }
    }
}

/// A completed write on a list, an item or a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteEvent {
    pub entity: &'static str,
    pub op: WriteOp,
    pub entity_id: i32,
    pub user_id: Option<i32>,
    pub rows_affected: u64,
}

/// Receives write events from the stores.
pub trait WriteObserver: Send + Sync {
    fn on_write(&self, event: &WriteEvent);
}

/// Default observer, writes every event to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl WriteObserver for LogObserver {
    fn on_write(&self, event: &WriteEvent) {
        log::info!(
            "{} {} id={} user={:?} rows={}",
            event.op,
            event.entity,
            event.entity_id,
            event.user_id,
            event.rows_affected
        );
    }
}
