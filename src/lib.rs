//! Appends bank transactions to date-bounded budget ledgers.
//!
//! A [catalog](catalog) lists budget periods. For every transaction, the
//! [resolver](catalog::active_periods) picks the period that may receive it,
//! and the [append pipeline](ledger::LedgerAppender) writes each destination's
//! transactions as one sorted batch.

pub mod args;
pub mod bank;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod terminal;
