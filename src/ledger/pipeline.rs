use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::{sort_for_append, AppendError, AppendSink, RangeDescriptor, RowLayout, Transaction};

const CHANNEL_CAPACITY: usize = 64;

/// Creates the queue a producer fills and a pipeline drains.
/// Dropping every sender ends the stream.
pub fn channel() -> (mpsc::Sender<Transaction>, mpsc::Receiver<Transaction>) {
    mpsc::channel(CHANNEL_CAPACITY)
}

/// Worksheet in a ledger destination, and the category label put in front of each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub destination_id: String,
    pub worksheet: String,
    pub category_label: String,
    pub layout: RowLayout,
}

impl Destination {
    pub fn data_range(&self) -> RangeDescriptor {
        self.layout.data_range(&self.worksheet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    pub destination_id: String,
    pub range: RangeDescriptor,
    pub rows_appended: usize,
}

/// Appends batches of transactions through an injected sink.
pub struct LedgerAppender<S> {
    sink: Arc<S>,
}

impl<S> Clone for LedgerAppender<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S> LedgerAppender<S>
where
    S: AppendSink + Send + Sync + 'static,
{
    pub fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// Buffers everything from `source` until it is closed, then appends it as one batch.
    pub async fn run_append(
        &self,
        mut source: mpsc::Receiver<Transaction>,
        destination: &Destination,
    ) -> Result<AppendOutcome, AppendError> {
        let mut transactions = Vec::new();
        while let Some(transaction) = source.recv().await {
            transactions.push(transaction);
        }
        self.append_batch(transactions, destination).await
    }

    /// Appends everything it's given, sorted by date and index. It doesn't
    /// filter by date; callers decide which transactions belong here.
    pub async fn append_batch(
        &self,
        transactions: Vec<Transaction>,
        destination: &Destination,
    ) -> Result<AppendOutcome, AppendError> {
        let rows: Vec<_> = sort_for_append(transactions)
            .iter()
            .map(|transaction| {
                destination
                    .layout
                    .row(&destination.category_label, transaction)
            })
            .collect();
        if rows.is_empty() {
            log::info!(
                "No transactions for {} in {}",
                destination.destination_id,
                destination.worksheet
            );
        }

        let range = destination.data_range();
        let rows_appended = rows.len();
        self.sink
            .append(&destination.destination_id, &range, rows)
            .await?;

        Ok(AppendOutcome {
            destination_id: destination.destination_id.clone(),
            range,
            rows_appended,
        })
    }

    /// Does what [`Self::run_append`] does, on its own task. The returned handle
    /// resolves once the batch was appended, the append failed, or it was
    /// cancelled before `source` closed.
    pub fn spawn_append(
        &self,
        source: mpsc::Receiver<Transaction>,
        destination: Destination,
    ) -> AppendHandle {
        let (done_sender, done_receiver) = oneshot::channel();
        let (cancel_sender, cancel_receiver) = oneshot::channel();
        let destination_id = destination.destination_id.clone();
        let appender = self.clone();
        tokio::spawn(async move {
            let result = match collect_until_cancelled(source, cancel_receiver).await {
                Some(transactions) => appender.append_batch(transactions, &destination).await,
                None => {
                    log::info!(
                        "Cancelled append to {} in {}",
                        destination.destination_id,
                        destination.worksheet
                    );
                    Err(AppendError::Cancelled {
                        destination_id: destination.destination_id.clone(),
                    })
                }
            };
            // The caller may have stopped waiting, nothing to report to then
            let _ = done_sender.send(result);
        });
        AppendHandle {
            destination_id,
            cancel: Some(cancel_sender),
            done: done_receiver,
        }
    }
}

/// Returns None if `cancel` fires before `source` closes. Dropping the cancel
/// sender without sending doesn't cancel.
async fn collect_until_cancelled(
    mut source: mpsc::Receiver<Transaction>,
    mut cancel: oneshot::Receiver<()>,
) -> Option<Vec<Transaction>> {
    let mut transactions = Vec::new();
    let mut cancel_dropped = false;
    loop {
        tokio::select! {
            biased;
            signal = &mut cancel, if !cancel_dropped => match signal {
                Ok(()) => return None,
                Err(_) => cancel_dropped = true,
            },
            transaction = source.recv() => match transaction {
                Some(transaction) => transactions.push(transaction),
                None => return Some(transactions),
            },
        }
    }
}

/// Completion of one spawned append.
#[must_use]
pub struct AppendHandle {
    destination_id: String,
    cancel: Option<oneshot::Sender<()>>,
    done: oneshot::Receiver<Result<AppendOutcome, AppendError>>,
}

impl AppendHandle {
    pub fn destination_id(&self) -> &str {
        &self.destination_id
    }

    /// Skips the append unless the source already closed. Only takes effect
    /// while a sender of the source is still alive.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // The pipeline may already be done
            let _ = cancel.send(());
        }
    }

    pub async fn wait(self) -> Result<AppendOutcome, AppendError> {
        match self.done.await {
            Ok(result) => result,
            Err(_) => Err(AppendError::Aborted {
                destination_id: self.destination_id,
            }),
        }
    }
}

/// Waits for every handle, returning results in handle order.
pub async fn wait_all(handles: Vec<AppendHandle>) -> Vec<Result<AppendOutcome, AppendError>> {
    futures::future::join_all(handles.into_iter().map(AppendHandle::wait)).await
}
