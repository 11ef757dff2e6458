use std::sync::Arc;
use std::time::Duration;

use crate::host::{Scheduler, ValueStore};

/// Name of the host timer that triggers a balance refresh.
pub const BALANCE_TIMER: &str = "GetCurrentBalance";

/// Value store key holding the last known balance.
pub const BALANCE_VALUE: &str = "CurrentBalance";

/// Delay between a successful send and the follow-up balance query.
pub const BALANCE_REFRESH_DELAY: Duration = Duration::from_secs(30);

/// Appended to the gateway's formatted balance before it is stored.
pub const BALANCE_CURRENCY_SUFFIX: &str = " €";

/// One-shot balance refresh timer plus the stored balance value.
///
/// Idle while the timer interval is zero, armed while it is
/// [`BALANCE_REFRESH_DELAY`]. The host calls back into
/// `NexxtMobileClient::get_current_balance` when the timer fires, which
/// disarms it again before querying.
#[derive(Clone)]
pub(super) struct BalancePoller {
    scheduler: Arc<dyn Scheduler>,
    values: Arc<dyn ValueStore>,
}

impl BalancePoller {
    pub(super) fn new(scheduler: Arc<dyn Scheduler>, values: Arc<dyn ValueStore>) -> Self {
        Self { scheduler, values }
    }

    pub(super) fn arm(&self) {
        tracing::debug!(timer = BALANCE_TIMER, "balance refresh armed");
        self.scheduler
            .set_interval(BALANCE_TIMER, BALANCE_REFRESH_DELAY);
    }

    pub(super) fn disarm(&self) {
        self.scheduler.set_interval(BALANCE_TIMER, Duration::ZERO);
    }

    /// Store the formatted balance and return what was stored.
    pub(super) fn publish(&self, balance_formatted: &str) -> String {
        let balance = format!("{balance_formatted}{BALANCE_CURRENCY_SUFFIX}");
        tracing::debug!(%balance, "current balance");
        self.values.set_value(BALANCE_VALUE, balance.clone());
        balance
    }
}
