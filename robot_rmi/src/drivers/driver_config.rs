use serde::{Deserialize, Serialize};
use std::net::ToSocketAddrs;
use std::time::Duration;

use crate::packets::MotionParams;
use crate::ArmError;

/// ```rust,ignore
/// let config = ArmDriverConfig::new("arm-1", "192.168.58.2", 8080)
///     .with_speed(50.0)
///     .with_timeout(Duration::from_secs(5));
///
/// config.validate()?;
/// let driver = ArmDriver::connect(config).await?;
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ArmDriverConfig {
    /// Prefix of every diagnostic message.
    pub name: String,
    pub addr: String,
    pub port: u32,
    /// Per-request deadline. Not clamped.
    pub timeout_ms: u64,
    pub speed: f64,
    pub acceleration: f64,
    pub blend_time_ms: f64,
    /// Fixed delay between reconnect attempts.
    pub reconnect_interval_ms: u64,
    /// Complete every pending request with `Disconnected` as soon as the
    /// read loop fails, instead of letting each one run into its timeout.
    pub fail_pending_on_disconnect: bool,
    /// Largest amount of unframed input tolerated before the link is reset.
    pub max_frame_len: usize,
}

impl ArmDriverConfig {
    pub fn new(name: impl Into<String>, addr: impl Into<String>, port: u32) -> Self {
        Self {
            name: name.into(),
            addr: addr.into(),
            port,
            ..Default::default()
        }
    }

    /// Reads a JSON config. Missing fields take their defaults and motion
    /// values are clamped.
    pub fn from_json(json: &str) -> Result<Self, ArmError> {
        let config: ArmDriverConfig =
            serde_json::from_str(json).map_err(|e| ArmError::InvalidConfig(e.to_string()))?;
        let config = config.clamped();
        config.validate()?;
        Ok(config)
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self.clamped()
    }

    pub fn with_acceleration(mut self, acceleration: f64) -> Self {
        self.acceleration = acceleration;
        self.clamped()
    }

    pub fn with_blend_time(mut self, blend_time_ms: f64) -> Self {
        self.blend_time_ms = blend_time_ms;
        self.clamped()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_fail_pending_on_disconnect(mut self, fail_fast: bool) -> Self {
        self.fail_pending_on_disconnect = fail_fast;
        self
    }

    /// Brings speed, acceleration and blend time back into range.
    pub fn clamped(mut self) -> Self {
        let params = self.motion_params();
        self.speed = params.speed;
        self.acceleration = params.acceleration;
        self.blend_time_ms = params.blend_time_ms;
        self
    }

    pub fn motion_params(&self) -> MotionParams {
        MotionParams::new(self.speed, self.acceleration, self.blend_time_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ArmError> {
        if self.addr.is_empty() {
            return Err(ArmError::InvalidConfig("Address cannot be empty.".to_string()));
        }
        if self.port == 0 || self.port > u16::MAX as u32 {
            return Err(ArmError::InvalidConfig(format!("Port {} is out of range.", self.port)));
        }
        if self.max_frame_len == 0 {
            return Err(ArmError::InvalidConfig("Maximum frame length must be greater than 0.".to_string()));
        }
        Ok(())
    }

    /// Generates a connection URL from the address and port.
    pub fn connection_url(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }

    /// Resolves the address to a `SocketAddr` string.
    pub fn resolve(&self) -> Result<String, ArmError> {
        let address_with_port = self.connection_url();
        match address_with_port.to_socket_addrs() {
            Ok(mut iter) => match iter.next() {
                Some(socket_addr) => Ok(socket_addr.to_string()),
                None => Err(ArmError::InvalidConfig("Could not resolve address".to_string())),
            },
            Err(_) => Err(ArmError::InvalidConfig("Invalid address format".to_string())),
        }
    }
}

impl Default for ArmDriverConfig {
    fn default() -> Self {
        Self {
            name: "robot".to_string(),
            addr: "127.0.0.1".to_string(),
            port: 8080,
            timeout_ms: 3000,
            speed: 100.0,
            acceleration: 100.0,
            blend_time_ms: 0.0,
            reconnect_interval_ms: 3000,
            fail_pending_on_disconnect: false,
            max_frame_len: 64 * 1024,
        }
    }
}
