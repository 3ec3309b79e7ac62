use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Couldn't read account history: {0}")]
    Io(#[from] std::io::Error),

    #[error("Couldn't read account history: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: failed to parse {field} {value:?}")]
    Parse {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("Nobody is receiving transactions anymore")]
    ReceiverClosed,
}

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Append pipeline for {destination_id} stopped receiving transactions")]
    PipelineClosed { destination_id: String },

    #[error("No append pipeline for {destination_id}")]
    UnknownDestination { destination_id: String },
}
