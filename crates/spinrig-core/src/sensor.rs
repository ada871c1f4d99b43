//! Temperature/humidity sensor polling.
//!
//! The sensor relay prints `"<temperature>  <humidity>"`. A failed poll
//! never clears the last good reading; it only bumps a failure counter.

use time::OffsetDateTime;
use tracing::{debug, warn};

use spinrig_types::SensorReading;

use crate::error::Result;
use crate::traits::Relay;

/// Runs the sensor relay and caches the last good reading.
#[derive(Debug)]
pub struct SensorPoller<R> {
    relay: R,
    last: SensorReading,
    last_updated: Option<OffsetDateTime>,
    consecutive_failures: u32,
}

impl<R: Relay> SensorPoller<R> {
    /// Create a poller whose last reading is `0.0, 0.0`.
    pub fn new(relay: R) -> Self {
        Self {
            relay,
            last: SensorReading::default(),
            last_updated: None,
            consecutive_failures: 0,
        }
    }

    /// Read the sensor once.
    ///
    /// On success the cached reading is replaced and returned. On any error
    /// the cached reading is left untouched.
    pub async fn poll(&mut self) -> Result<SensorReading> {
        match self.read().await {
            Ok(reading) => {
                debug!(
                    temperature = reading.temperature,
                    humidity = reading.humidity,
                    "Sensor reading"
                );
                self.last = reading;
                self.last_updated = Some(OffsetDateTime::now_utc());
                self.consecutive_failures = 0;
                Ok(reading)
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                warn!(
                    error = %e,
                    failures = self.consecutive_failures,
                    "Sensor poll failed, keeping last reading"
                );
                Err(e)
            }
        }
    }

    async fn read(&self) -> Result<SensorReading> {
        let output = self.relay.invoke().await?;
        Ok(SensorReading::from_relay_output(&output.stdout)?)
    }

    /// Last good reading, `0.0, 0.0` until the first success.
    pub fn last(&self) -> SensorReading {
        self.last
    }

    pub fn last_updated(&self) -> Option<OffsetDateTime> {
        self.last_updated
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
