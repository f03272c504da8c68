mod receive;
mod send;

pub use receive::{ReceiveEntityMap, ReceivedEntity};
pub use send::SendEntityMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("all {0} network entity ids are in use")]
    NetworkIdsExhausted(usize),
}
