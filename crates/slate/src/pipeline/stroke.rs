//! Event dispatch and per-pointer stroke handling

use slate_config::{PenConfig, PressureSource};
use tracing::{debug, trace, warn};

use crate::brush::StrokeRenderer;
use crate::calibration::PressureCalibrator;
use crate::constants::{MAX_POINTERS, NEUTRAL_PRESSURE};
use crate::filter::{SpotFilter, SpotSink};
use crate::tiles::TiledSurface;
use crate::types::{DirtyRect, Spot};

use super::{PointerSample, PointerStroke, StrokeSession, TouchAction, TouchEvent};

/// Sink that turns filtered spots into ink
struct Inker<'a> {
    renderer: &'a mut StrokeRenderer,
    surface: &'a mut TiledSurface,
    calibrator: &'a mut PressureCalibrator,
    pen: &'a PenConfig,
    source: PressureSource,
    dirty: DirtyRect,
}

impl Inker<'_> {
    /// Normalized pressure in `[0, 1]`
    ///
    /// Stylus tips report calibrated pressure and skip the calibrator.
    fn pressure(&mut self, spot: &Spot) -> f32 {
        if spot.tool.is_stylus() {
            return if spot.pressure.is_finite() {
                spot.pressure.clamp(0.0, 1.0)
            } else {
                NEUTRAL_PRESSURE
            };
        }
        let raw = match self.source {
            PressureSource::Pressure => spot.pressure,
            PressureSource::Size => spot.size,
        };
        self.calibrator.adjust(raw)
    }
}

impl SpotSink for Inker<'_> {
    fn plot(&mut self, spot: Spot) {
        let pressure = self.pressure(&spot);
        let (radius_min, radius_max) = self.pen.radius_range();
        let radius = radius_min + (radius_max - radius_min) * pressure.powf(self.pen.pressure_exponent);

        trace!(
            "plot: ({:.1}, {:.1}) raw={:.3} pressure={:.3} radius={:.2} tool={:?}",
            spot.x, spot.y, spot.pressure, pressure, radius, spot.tool
        );

        self.renderer.set_tool(spot.tool);
        let dirty = self.renderer.stroke_to(self.surface, spot.x, spot.y, radius);
        self.dirty.union(&dirty);
    }
}

impl StrokeSession {
    /// Process one touch event; returns the union of everything it inked
    pub fn handle_event(&mut self, event: &TouchEvent) -> DirtyRect {
        let mut dirty = DirtyRect::EMPTY;
        match event.action {
            TouchAction::Down => {
                // Leftovers from a gesture that never saw its Up.
                dirty.union(&self.finish_all());
                self.surface.commit();
                for sample in &event.pointers {
                    dirty.union(&self.begin_pointer(sample.id));
                    dirty.union(&self.feed(sample));
                }
            }
            TouchAction::PointerDown { id } => {
                dirty.union(&self.begin_pointer(id));
                for sample in &event.pointers {
                    dirty.union(&self.feed(sample));
                }
            }
            TouchAction::Move => {
                for sample in &event.pointers {
                    dirty.union(&self.feed(sample));
                }
            }
            TouchAction::PointerUp { id } => {
                for sample in &event.pointers {
                    dirty.union(&self.feed(sample));
                }
                dirty.union(&self.finish_pointer(id));
            }
            TouchAction::Up => {
                for sample in &event.pointers {
                    dirty.union(&self.feed(sample));
                }
                dirty.union(&self.finish_all());
            }
            TouchAction::Cancel => {
                dirty.union(&self.finish_all());
            }
        }
        dirty
    }

    /// Flush every active pointer
    pub fn finish_all(&mut self) -> DirtyRect {
        let mut dirty = DirtyRect::EMPTY;
        for id in 0..MAX_POINTERS {
            dirty.union(&self.finish_pointer(id));
        }
        dirty
    }

    /// Start a fresh stroke in the pointer's slot, flushing any stroke still there
    fn begin_pointer(&mut self, id: usize) -> DirtyRect {
        if id >= MAX_POINTERS {
            warn!("Pointer id {} out of range (max {}), ignoring", id, MAX_POINTERS);
            return DirtyRect::EMPTY;
        }
        let dirty = self.finish_pointer(id);
        debug!("Stroke begin: pointer {}", id);
        self.pointers[id] = Some(PointerStroke {
            filter: SpotFilter::from_config(&self.filter_config),
            renderer: StrokeRenderer::new(self.pen.color, self.pen.style, self.sprites.clone()),
        });
        dirty
    }

    /// Replay a pointer's history and current sample through its filter
    fn feed(&mut self, sample: &PointerSample) -> DirtyRect {
        let Some(Some(stroke)) = self.pointers.get_mut(sample.id) else {
            warn!("Sample for unknown pointer {}, ignoring", sample.id);
            return DirtyRect::EMPTY;
        };
        let PointerStroke { filter, renderer } = stroke;
        let mut inker = Inker {
            renderer,
            surface: &mut self.surface,
            calibrator: &mut self.calibrator,
            pen: &self.pen,
            source: self.pressure_source,
            dirty: DirtyRect::EMPTY,
        };
        for spot in sample.samples() {
            filter.add(*spot, &mut inker);
        }
        inker.dirty
    }

    /// Drain a pointer's filter and free its slot
    fn finish_pointer(&mut self, id: usize) -> DirtyRect {
        let Some(slot) = self.pointers.get_mut(id) else {
            warn!("Pointer id {} out of range (max {}), ignoring", id, MAX_POINTERS);
            return DirtyRect::EMPTY;
        };
        let Some(PointerStroke { mut filter, mut renderer }) = slot.take() else {
            return DirtyRect::EMPTY;
        };

        let mut inker = Inker {
            renderer: &mut renderer,
            surface: &mut self.surface,
            calibrator: &mut self.calibrator,
            pen: &self.pen,
            source: self.pressure_source,
            dirty: DirtyRect::EMPTY,
        };
        filter.finish(&mut inker);
        debug!("Stroke finish: pointer {}", id);
        inker.dirty
    }
}
