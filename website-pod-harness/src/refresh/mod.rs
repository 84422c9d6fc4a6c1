//! Instance-refresh convergence waiting.
//!
//! An instance refresh is an asynchronous Auto Scaling operation that
//! incrementally replaces group members. Assertions against group
//! membership are only meaningful once no refresh is in flight, so the
//! waiter here blocks the caller until a fresh status snapshot contains
//! zero in-flight entries.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};

use crate::aws::{AwsError, AwsResult};

/// Delay between consecutive status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Status of a single instance refresh operation.
///
/// The set of values is closed on purpose: a status string the provider
/// introduces later fails parsing instead of being silently treated as
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    Pending,
    InProgress,
    Cancelling,
    RollbackInProgress,
    Successful,
    Failed,
    Cancelled,
    RollbackFailed,
    RollbackSuccessful,
}

impl RefreshStatus {
    /// Whether the refresh is still mutating the group.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            RefreshStatus::Pending
                | RefreshStatus::InProgress
                | RefreshStatus::Cancelling
                | RefreshStatus::RollbackInProgress
        )
    }

    pub fn is_terminal(self) -> bool {
        !self.is_in_flight()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RefreshStatus::Pending => "Pending",
            RefreshStatus::InProgress => "InProgress",
            RefreshStatus::Cancelling => "Cancelling",
            RefreshStatus::RollbackInProgress => "RollbackInProgress",
            RefreshStatus::Successful => "Successful",
            RefreshStatus::Failed => "Failed",
            RefreshStatus::Cancelled => "Cancelled",
            RefreshStatus::RollbackFailed => "RollbackFailed",
            RefreshStatus::RollbackSuccessful => "RollbackSuccessful",
        }
    }
}

impl fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefreshStatus {
    type Err = AwsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RefreshStatus::Pending),
            "InProgress" => Ok(RefreshStatus::InProgress),
            "Cancelling" => Ok(RefreshStatus::Cancelling),
            "RollbackInProgress" => Ok(RefreshStatus::RollbackInProgress),
            "Successful" => Ok(RefreshStatus::Successful),
            "Failed" => Ok(RefreshStatus::Failed),
            "Cancelled" => Ok(RefreshStatus::Cancelled),
            "RollbackFailed" => Ok(RefreshStatus::RollbackFailed),
            "RollbackSuccessful" => Ok(RefreshStatus::RollbackSuccessful),
            other => Err(AwsError::UnknownRefreshStatus(other.to_string())),
        }
    }
}

/// Capability to query the current refresh statuses of a named group.
///
/// Each call must return a fresh snapshot; the waiter never caches
/// between polls.
#[async_trait]
pub trait RefreshStatusSource {
    async fn describe_refreshes(&self, group_name: &str) -> AwsResult<Vec<RefreshStatus>>;
}

/// Block until no instance refresh against `group_name` is in flight.
///
/// A single in-flight entry anywhere in the snapshot blocks completion.
/// The wait is unbounded: the waiter itself never times out, and a query
/// error propagates immediately. Callers own the deadline, typically via
/// `tokio::time::timeout` around this future.
pub async fn wait_for_instance_refresh<S>(
    source: &S,
    group_name: &str,
    poll_interval: Duration,
) -> AwsResult<()>
where
    S: RefreshStatusSource + ?Sized,
{
    loop {
        let refreshes = source.describe_refreshes(group_name).await?;
        debug!("describe_instance_refreshes({group_name}): {refreshes:?}");

        let in_flight = refreshes.iter().filter(|s| s.is_in_flight()).count();
        if in_flight == 0 {
            return Ok(());
        }

        info!("Waiting until {group_name} finishes {in_flight} instance refresh(es)");
        tokio::time::sleep(poll_interval).await;
    }
}
