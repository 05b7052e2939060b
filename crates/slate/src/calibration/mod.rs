//! Online pressure calibration
//!
//! Raw pressure ranges differ wildly between devices (and between fingers and
//! styluses on the same device). The calibrator watches the extrema of raw
//! pressure over a window of samples and, each time the window closes, blends
//! its long-run range toward what it just saw. Normalized pressure is the raw
//! value mapped linearly from that range onto `[0, 1]`.
//!
//! A fresh device starts with a short window so it converges quickly; the
//! window then grows geometrically toward a large steady-state size.

mod store;

pub use store::{CalibrationStore, JsonFileStore, MemoryStore};

use serde::{Deserialize, Serialize};
use slate_config::CalibrationConfig;
use tracing::{debug, warn};

use crate::constants::NEUTRAL_PRESSURE;

/// Persisted calibration: the learned raw pressure range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    pub pressure_min: f32,
    pub pressure_max: f32,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            pressure_min: 0.0,
            pressure_max: 1.0,
        }
    }
}

impl CalibrationState {
    pub fn new(pressure_min: f32, pressure_max: f32) -> Self {
        Self {
            pressure_min,
            pressure_max,
        }
    }

    /// Finite and ordered
    pub fn is_valid(&self) -> bool {
        self.pressure_min.is_finite()
            && self.pressure_max.is_finite()
            && self.pressure_min <= self.pressure_max
    }
}

/// Adaptive raw-pressure normalizer
pub struct PressureCalibrator {
    config: CalibrationConfig,
    state: CalibrationState,
    recent_min: f32,
    recent_max: f32,
    countdown: u32,
    window: u32,
    store: Option<Box<dyn CalibrationStore>>,
    degenerate: bool,
}

impl std::fmt::Debug for PressureCalibrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PressureCalibrator")
            .field("state", &self.state)
            .field("recent_min", &self.recent_min)
            .field("recent_max", &self.recent_max)
            .field("countdown", &self.countdown)
            .field("window", &self.window)
            .field("has_store", &self.store.is_some())
            .finish()
    }
}

impl PressureCalibrator {
    /// Create a calibrator from a previously persisted state.
    ///
    /// `None` is a first run: default `0..1` range and the short training window.
    pub fn new(config: CalibrationConfig, state: Option<CalibrationState>) -> Self {
        let state = state.filter(|s| {
            let valid = s.is_valid();
            if !valid {
                warn!("Discarding invalid calibration state {:?}", s);
            }
            valid
        });
        let first_run = state.is_none();
        let window = if first_run {
            config.first_run_window
        } else {
            config.steady_window
        }
        .max(1);

        debug!(
            "PressureCalibrator::new: first_run={}, window={}, state={:?}",
            first_run, window, state
        );

        Self {
            config,
            state: state.unwrap_or_default(),
            recent_min: f32::INFINITY,
            recent_max: f32::NEG_INFINITY,
            countdown: window,
            window,
            store: None,
            degenerate: false,
        }
    }

    /// Create a calibrator that loads from and saves to `store`.
    ///
    /// A store that fails to load is treated as a first run.
    pub fn with_store(config: CalibrationConfig, store: impl CalibrationStore + 'static) -> Self {
        let state = match store.load() {
            Ok(state) => state,
            Err(e) => {
                warn!("Failed to load calibration, starting fresh: {}", e);
                None
            }
        };
        let mut calibrator = Self::new(config, state);
        calibrator.store = Some(Box::new(store));
        calibrator
    }

    /// Map raw pressure into `[0, 1]`, learning from it.
    ///
    /// Returns [`NEUTRAL_PRESSURE`] when the learned range has collapsed or the
    /// input is not finite.
    pub fn adjust(&mut self, raw: f32) -> f32 {
        if !raw.is_finite() {
            return NEUTRAL_PRESSURE;
        }
        if !self.config.enabled {
            return raw.clamp(0.0, 1.0);
        }

        if raw < self.recent_min {
            self.recent_min = raw;
        }
        if raw > self.recent_max {
            self.recent_max = raw;
        }

        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.close_window();
        }

        self.normalize(raw)
    }

    /// Normalize against the current range without learning
    pub fn normalize(&mut self, raw: f32) -> f32 {
        let range = self.state.pressure_max - self.state.pressure_min;
        if range.is_nan() || range <= f32::EPSILON {
            if !self.degenerate {
                warn!(
                    "Degenerate pressure range [{}, {}], using neutral pressure",
                    self.state.pressure_min, self.state.pressure_max
                );
                self.degenerate = true;
            }
            return NEUTRAL_PRESSURE;
        }
        self.degenerate = false;
        ((raw - self.state.pressure_min) / range).clamp(0.0, 1.0)
    }

    fn close_window(&mut self) {
        let decay = self.config.decay.clamp(0.0, 1.0);
        self.state.pressure_min = (1.0 - decay) * self.state.pressure_min + decay * self.recent_min;
        self.state.pressure_max = (1.0 - decay) * self.state.pressure_max + decay * self.recent_max;

        // Inverted sentinels: the next sample sets both bounds.
        self.recent_min = f32::INFINITY;
        self.recent_max = f32::NEG_INFINITY;

        let steady = self.config.steady_window.max(1);
        if self.window < steady {
            let grown = (self.window as f32 * self.config.window_growth) as u32;
            self.window = grown.clamp(self.window + 1, steady);
        }
        self.countdown = self.window;

        debug!(
            "Calibration window closed: range=[{:.4}, {:.4}], next window={}",
            self.state.pressure_min, self.state.pressure_max, self.window
        );

        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.save(&self.state) {
                warn!("Failed to persist calibration: {}", e);
            }
        }
    }

    /// Current learned range
    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Samples per calibration window
    pub fn window(&self) -> u32 {
        self.window
    }

    /// Samples left before the current window closes
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

impl Default for PressureCalibrator {
    fn default() -> Self {
        Self::new(CalibrationConfig::default(), None)
    }
}
