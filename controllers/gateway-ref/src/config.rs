//! Controller configuration.
//!
//! Read once at startup from environment variables:
//!
//! | Variable                | Default        | Meaning                                   |
//! |-------------------------|----------------|-------------------------------------------|
//! | `WATCH_NAMESPACE`       | all namespaces | Restrict watches to one namespace         |
//! | `RECONCILE_CONCURRENCY` | `0`            | Max concurrent reconciles per kind, 0 = unbounded |
//! | `DEBOUNCE_SECS`         | `0`            | Quiet period before reconciling an object |
//! | `BACKOFF_MIN_MINUTES`   | `1`            | First requeue delay after a failure       |
//! | `BACKOFF_MAX_MINUTES`   | `10`           | Requeue delay cap                         |
//! | `METRICS_ADDR`          | `0.0.0.0:8080` | Metrics and probe listener                |

use crate::error::ControllerError;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";

/// Runtime configuration of the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace to watch; `None` watches all namespaces
    pub watch_namespace: Option<String>,
    /// Max concurrent reconciles per watched kind (0 = unbounded)
    pub reconcile_concurrency: u16,
    /// Debounce applied to watch events
    pub debounce: Duration,
    /// First requeue delay, in minutes
    pub backoff_min_minutes: u64,
    /// Requeue delay cap, in minutes
    pub backoff_max_minutes: u64,
    /// Listen address of the metrics/probe server
    pub metrics_addr: SocketAddr,
}

impl ControllerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let watch_namespace = lookup("WATCH_NAMESPACE")
            .map(|ns| ns.trim().to_string())
            .filter(|ns| !ns.is_empty());
        let reconcile_concurrency = parse_or(&lookup, "RECONCILE_CONCURRENCY", 0u16)?;
        let debounce = Duration::from_secs(parse_or(&lookup, "DEBOUNCE_SECS", 0u64)?);
        let backoff_min_minutes = parse_or(&lookup, "BACKOFF_MIN_MINUTES", 1u64)?;
        let backoff_max_minutes = parse_or(&lookup, "BACKOFF_MAX_MINUTES", 10u64)?;
        let metrics_addr = match lookup("METRICS_ADDR") {
            Some(addr) => parse_value("METRICS_ADDR", &addr)?,
            None => parse_value("METRICS_ADDR", DEFAULT_METRICS_ADDR)?,
        };

        if backoff_min_minutes == 0 {
            return Err(ControllerError::InvalidConfig(
                "BACKOFF_MIN_MINUTES must be at least 1".to_string(),
            ));
        }
        if backoff_max_minutes < backoff_min_minutes {
            return Err(ControllerError::InvalidConfig(format!(
                "BACKOFF_MAX_MINUTES ({backoff_max_minutes}) must not be below \
                 BACKOFF_MIN_MINUTES ({backoff_min_minutes})"
            )));
        }

        Ok(Self {
            watch_namespace,
            reconcile_concurrency,
            debounce,
            backoff_min_minutes,
            backoff_max_minutes,
            metrics_addr,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ControllerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ControllerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ControllerError::InvalidConfig(format!("{key}={raw:?}: {e}")))
}
