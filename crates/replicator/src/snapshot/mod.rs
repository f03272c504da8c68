mod decoder;
mod diff;
mod encoder;
mod error;

pub use decoder::{DecodeSummary, SnapshotDecoder};
pub use diff::{TypeIdDiff, diff};
pub use encoder::SnapshotEncoder;
pub use error::{DecodeError, EncodeError};
