//! Per-pointer temporal smoothing of raw input samples
//!
//! The filter keeps the last `N` raw spots (newest first) and emits, for every
//! input, a weighted mean over that window. Position and time use weights
//! `position_decay^i`; pressure and size use `pressure_decay^i`, so the two
//! groups can be smoothed with different strengths over the same window.

use std::collections::VecDeque;

use slate_config::FilterConfig;
use tracing::trace;

use crate::types::{Spot, ToolKind};

/// Receiver of filtered spots
pub trait SpotSink {
    fn plot(&mut self, spot: Spot);
}

impl<F: FnMut(Spot)> SpotSink for F {
    fn plot(&mut self, spot: Spot) {
        self(spot)
    }
}

/// Exponentially weighted smoothing over a bounded window of spots
#[derive(Debug, Clone)]
pub struct SpotFilter {
    /// Newest at the front
    spots: VecDeque<Spot>,
    capacity: usize,
    position_decay: f32,
    pressure_decay: f32,
    precise_stylus: bool,
}

impl SpotFilter {
    pub fn new(capacity: usize, position_decay: f32, pressure_decay: f32, precise_stylus: bool) -> Self {
        let capacity = capacity.max(1);
        Self {
            spots: VecDeque::with_capacity(capacity),
            capacity,
            position_decay: position_decay.clamp(0.0, 1.0),
            pressure_decay: pressure_decay.clamp(0.0, 1.0),
            precise_stylus,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(
            config.window,
            config.position_decay,
            config.pressure_decay,
            config.precise_stylus,
        )
    }

    /// Number of buffered raw spots
    #[inline]
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push one raw spot and emit exactly one filtered spot
    pub fn add<S: SpotSink + ?Sized>(&mut self, spot: Spot, sink: &mut S) {
        if self.spots.len() == self.capacity {
            self.spots.pop_back();
        }
        self.spots.push_front(spot);

        if let Some(filtered) = self.filtered() {
            sink.plot(filtered);
        }
    }

    /// Drain the window, emitting one filtered spot per buffered sample
    ///
    /// Each step filters the remaining window, then drops the oldest sample, so
    /// the tail converges onto the newest raw spot and the buffer ends empty.
    pub fn finish<S: SpotSink + ?Sized>(&mut self, sink: &mut S) {
        trace!("SpotFilter::finish: draining {} spots", self.spots.len());
        while let Some(filtered) = self.filtered() {
            self.spots.pop_back();
            sink.plot(filtered);
        }
    }

    /// Forget all history without emitting
    pub fn reset(&mut self) {
        self.spots.clear();
    }

    /// Weighted mean of the current window, or `None` when empty
    fn filtered(&self) -> Option<Spot> {
        let newest = *self.spots.front()?;
        let truncate = self.precise_stylus && newest.tool == ToolKind::Stylus;

        let mut pos_weight = 1.0f32;
        let mut pressure_weight = 1.0f32;
        let (mut pos_sum, mut pressure_sum) = (0.0f32, 0.0f32);
        let (mut x, mut y, mut t) = (0.0f32, 0.0f32, 0.0f64);
        let (mut size, mut pressure) = (0.0f32, 0.0f32);

        for spot in &self.spots {
            x += spot.x * pos_weight;
            y += spot.y * pos_weight;
            t += spot.timestamp as f64 * pos_weight as f64;
            pos_sum += pos_weight;

            size += spot.size * pressure_weight;
            pressure += spot.pressure * pressure_weight;
            pressure_sum += pressure_weight;

            if truncate {
                break;
            }
            pos_weight *= self.position_decay;
            pressure_weight *= self.pressure_decay;
        }

        if truncate {
            return Some(newest);
        }

        Some(Spot {
            x: x / pos_sum,
            y: y / pos_sum,
            size: size / pressure_sum,
            pressure: pressure / pressure_sum,
            timestamp: (t / pos_sum as f64).round() as i64,
            tool: newest.tool,
        })
    }
}

impl Default for SpotFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}
