//! Bounded existence polling
//!
//! Deletes return once ARM accepts them, but the resource can linger for a
//! while. Parents cannot be removed until their children are gone, so the
//! cleanup phase waits for each deleted resource to disappear.

use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use super::operations::NetAppOperations;
use crate::error::{AnfError, Result};

/// Interval and attempt bound for an existence poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            max_attempts: 60,
        }
    }
}

/// Wait until `resource_id` no longer exists.
///
/// Checks up to `max_attempts` times, sleeping `interval` between checks.
/// Returns [`AnfError::Timeout`] when the resource is still present after the
/// last check.
pub async fn wait_until_absent(
    ops: &dyn NetAppOperations,
    resource_id: &str,
    options: PollOptions,
) -> Result<()> {
    for attempt in 1..=options.max_attempts {
        if !ops.resource_exists(resource_id).await? {
            debug!("{} is gone after {} check(s)", resource_id, attempt);
            return Ok(());
        }

        if attempt < options.max_attempts {
            sleep(options.interval).await;
        }
    }

    Err(AnfError::timeout(resource_id, options.max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netapp::operations::MockNetAppOperations;
    use mockall::Sequence;

    fn fast(max_attempts: u32) -> PollOptions {
        PollOptions {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn test_returns_once_resource_is_gone() {
        let mut ops = MockNetAppOperations::new();
        let mut seq = Sequence::new();
        ops.expect_resource_exists()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        ops.expect_resource_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let result = wait_until_absent(&ops, "/subscriptions/s/x", fast(5)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_times_out_after_bound() {
        let mut ops = MockNetAppOperations::new();
        ops.expect_resource_exists()
            .times(3)
            .returning(|_| Ok(true));

        let result = wait_until_absent(&ops, "/subscriptions/s/x", fast(3)).await;
        assert!(matches!(
            result,
            Err(AnfError::Timeout { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_lookup_errors_propagate() {
        let mut ops = MockNetAppOperations::new();
        ops.expect_resource_exists()
            .times(1)
            .returning(|_| Err(AnfError::azure_api("HTTP 500: boom")));

        let result = wait_until_absent(&ops, "/subscriptions/s/x", fast(3)).await;
        assert!(matches!(result, Err(AnfError::AzureApiError(_))));
    }
}
