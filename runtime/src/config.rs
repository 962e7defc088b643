use crate::error::SessionError;
use std::time::Duration;

/// Default record store polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Default capacity of the adapter → projector event queue.
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// Default time `unmount` waits for tasks before aborting them.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a [`Session`](crate::Session)
///
/// # Example
///
/// ```
/// use session_view_runtime::SessionConfig;
/// use std::time::Duration;
///
/// let config = SessionConfig::default()
///     .with_poll_interval(Duration::from_millis(500))
///     .with_event_buffer(16);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How often the record store is polled (the first poll is immediate)
    pub poll_interval: Duration,
    /// Capacity of the queue between adapters and the projector
    pub event_buffer: usize,
    /// How long `unmount` waits for tasks to finish
    pub shutdown_timeout: Duration,
}

impl SessionConfig {
    /// Create a configuration with custom values
    #[must_use]
    pub const fn new(poll_interval: Duration, event_buffer: usize, shutdown_timeout: Duration) -> Self {
        Self {
            poll_interval,
            event_buffer,
            shutdown_timeout,
        }
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the event queue capacity
    #[must_use]
    pub const fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    /// Set the unmount timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Check the configuration before mounting.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] for a zero poll interval or a
    /// zero event buffer.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.poll_interval.is_zero() {
            return Err(SessionError::InvalidConfig(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(SessionError::InvalidConfig(
                "event_buffer must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            event_buffer: DEFAULT_EVENT_BUFFER,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.event_buffer, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_values() {
        let zero_interval = SessionConfig::default().with_poll_interval(Duration::ZERO);
        assert!(matches!(
            zero_interval.validate(),
            Err(SessionError::InvalidConfig(_))
        ));

        let zero_buffer = SessionConfig::default().with_event_buffer(0);
        assert!(matches!(
            zero_buffer.validate(),
            Err(SessionError::InvalidConfig(_))
        ));
    }
}
