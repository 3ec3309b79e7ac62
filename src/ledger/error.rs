use thiserror::Error;

use super::RangeDescriptor;

#[derive(Error, Debug)]
pub enum AppendError {
    #[error("Couldn't append transactions to {destination_id} at {range}: {source}")]
    Sink {
        destination_id: String,
        range: RangeDescriptor,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Append to {destination_id} ended without reporting a result")]
    Aborted { destination_id: String },

    #[error("Append to {destination_id} was cancelled before anything was written")]
    Cancelled { destination_id: String },
}
