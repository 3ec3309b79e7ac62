use std::collections::HashMap;

use tokio::sync::mpsc;

use super::RouteError;
use crate::catalog::{resolve_date, PeriodRecord};
use crate::ledger::Transaction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutingSummary {
    pub routed: usize,
    pub unrouted: usize,
}

/// Forwards each transaction to the pipeline of the first active period covering its date.
pub struct Router {
    periods: Vec<PeriodRecord>,
    pipelines: HashMap<String, mpsc::Sender<Transaction>>,
}

impl Router {
    /// `pipelines` maps destination ids to pipeline inputs. Every period's
    /// destination must have a pipeline.
    pub fn new(
        periods: Vec<PeriodRecord>,
        pipelines: HashMap<String, mpsc::Sender<Transaction>>,
    ) -> Result<Self, RouteError> {
        if let Some(period) = periods
            .iter()
            .find(|period| !pipelines.contains_key(period.destination_id()))
        {
            return Err(RouteError::UnknownDestination {
                destination_id: period.destination_id().to_string(),
            });
        }
        Ok(Self { periods, pipelines })
    }

    /// Routes until `input` is closed. The pipelines stay open until the router is dropped.
    pub async fn run(
        &self,
        mut input: mpsc::Receiver<Transaction>,
    ) -> Result<RoutingSummary, RouteError> {
        let mut summary = RoutingSummary::default();
        while let Some(transaction) = input.recv().await {
            let Some(period) = resolve_date(&self.periods, transaction.date) else {
                log::debug!(
                    "No active period for transaction {} on {}",
                    transaction.sequence_index,
                    transaction.date
                );
                summary.unrouted += 1;
                continue;
            };
            let destination_id = period.destination_id();
            self.pipelines[destination_id]
                .send(transaction)
                .await
                .map_err(|_| RouteError::PipelineClosed {
                    destination_id: destination_id.to_string(),
                })?;
            summary.routed += 1;
        }
        if summary.unrouted > 0 {
            log::info!(
                "{} transactions didn't fall into an active period",
                summary.unrouted
            );
        }
        Ok(summary)
    }
}
