// # Operation Timeouts
//
// Every lifecycle operation runs under a deadline. Create, update and delete
// get a long ceiling (DNS changes can take a while to be acknowledged by the
// Resource Manager), read gets a short one.
//
// A `Deadline` is fixed when the operation starts; every remote call made by
// that operation draws from the same budget.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Largest accepted ceiling for any operation (7 days)
pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// Stand-in deadline distance when `now + budget` is not representable
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Per-operation timeout ceilings (in seconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Ceiling for creating a new record set
    #[serde(default = "default_create_secs")]
    pub create_secs: u64,

    /// Ceiling for reading a record set
    #[serde(default = "default_read_secs")]
    pub read_secs: u64,

    /// Ceiling for updating an existing record set
    #[serde(default = "default_update_secs")]
    pub update_secs: u64,

    /// Ceiling for deleting a record set
    #[serde(default = "default_delete_secs")]
    pub delete_secs: u64,
}

impl TimeoutsConfig {
    /// Deadline for a create (`is_new`) or update
    pub fn for_create_update(&self, is_new: bool) -> Deadline {
        if is_new {
            Deadline::after(Duration::from_secs(self.create_secs))
        } else {
            Deadline::after(Duration::from_secs(self.update_secs))
        }
    }

    /// Deadline for a read
    pub fn for_read(&self) -> Deadline {
        Deadline::after(Duration::from_secs(self.read_secs))
    }

    /// Deadline for a delete
    pub fn for_delete(&self) -> Deadline {
        Deadline::after(Duration::from_secs(self.delete_secs))
    }

    /// Validate the timeout configuration
    pub fn validate(&self) -> Result<()> {
        for (label, secs) in [
            ("create", self.create_secs),
            ("read", self.read_secs),
            ("update", self.update_secs),
            ("delete", self.delete_secs),
        ] {
            if secs == 0 {
                return Err(Error::config(format!("{} timeout must be > 0", label)));
            }
            if secs > MAX_TIMEOUT_SECS {
                return Err(Error::config(format!(
                    "{} timeout must be at most {} seconds. Got: {}",
                    label, MAX_TIMEOUT_SECS, secs
                )));
            }
        }
        Ok(())
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            create_secs: default_create_secs(),
            read_secs: default_read_secs(),
            update_secs: default_update_secs(),
            delete_secs: default_delete_secs(),
        }
    }
}

fn default_create_secs() -> u64 {
    30 * 60
}

fn default_read_secs() -> u64 {
    5 * 60
}

fn default_update_secs() -> u64 {
    30 * 60
}

fn default_delete_secs() -> u64 {
    30 * 60
}

/// A fixed point in time by which an operation must finish
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Deadline `budget` from now
    ///
    /// A budget too large to represent saturates to a far-future deadline.
    pub fn after(budget: Duration) -> Self {
        let now = Instant::now();
        let at = now
            .checked_add(budget)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self { at, budget }
    }

    /// The total budget this deadline was created with
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Await `fut`, failing with [`Error::Timeout`] if the deadline passes first
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout_at(self.at, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.budget)),
        }
    }
}
