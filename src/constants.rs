//! Constants used throughout the application

/// Default number of samples kept in the smoothing window
pub const DEFAULT_WINDOW_SIZE: usize = 8;

/// Default factor applied to the window mean before truncation
pub const DEFAULT_SCALE_FACTOR: f64 = 50.0;

/// Default remote endpoint
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9002;
pub const DEFAULT_PATH: &str = "/";

/// Network timeouts in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 1000;

/// Default frames per second assumption for paced sources
pub const DEFAULT_FPS: u32 = 30;

/// Amplitude in degrees of the synthetic yaw sweep
pub const SIMULATED_SWEEP_AMPLITUDE: f64 = 20.0;

/// Period in seconds of the synthetic yaw sweep
pub const SIMULATED_SWEEP_PERIOD_SECS: f64 = 4.0;

/// Name of the session worker thread
pub const SESSION_THREAD_NAME: &str = "stream-session";
