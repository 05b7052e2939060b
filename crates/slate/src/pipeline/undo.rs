//! Commit, undo and clear for the drawing session

use tracing::debug;

use super::StrokeSession;

impl StrokeSession {
    /// Close the current undo step; the next drawing starts a new one
    pub fn commit(&mut self) {
        self.surface.commit();
    }

    /// Revert the most recent undo step
    ///
    /// Strokes in progress are flushed first so they belong to the step being
    /// undone. Returns the number of tiles whose content changed.
    pub fn undo(&mut self) -> usize {
        self.finish_all();
        let reverted = self.surface.step(-1);
        debug!("Undo: {} tiles reverted, version {}", reverted, self.surface.version());
        reverted
    }

    /// Erase the whole canvas as its own undoable step
    pub fn clear(&mut self) {
        self.finish_all();
        self.surface.commit();
        self.surface.fill([0.0, 0.0, 0.0, 0.0]);
        debug!("Canvas cleared at version {}", self.surface.version());
    }
}

#[cfg(test)]
mod tests {
    use slate_config::{SlateConfig, SurfaceConfig};

    use crate::calibration::PressureCalibrator;
    use crate::pipeline::{StrokeSession, TouchAction, TouchEvent};
    use crate::types::{Spot, ToolKind};

    fn session() -> StrokeSession {
        let config = SlateConfig {
            surface: SurfaceConfig {
                tile_size: 64,
                ..Default::default()
            },
            ..Default::default()
        };
        StrokeSession::new(128, 128, &config, PressureCalibrator::default()).unwrap()
    }

    fn tap(session: &mut StrokeSession, x: f32, y: f32) {
        let spot = Spot::new(x, y, 0.1, 0.5, 0, ToolKind::Finger);
        session.handle_event(&TouchEvent::single(TouchAction::Down, 0, spot));
        session.handle_event(&TouchEvent::single(TouchAction::Up, 0, spot));
    }

    #[test]
    fn test_undo_last_stroke() {
        let mut session = session();
        tap(&mut session, 20.0, 20.0);
        tap(&mut session, 100.0, 100.0);

        assert!(session.undo() > 0);
        assert_eq!(session.surface().get_pixel(100, 100), Some([0, 0, 0, 0]));
        assert_eq!(session.surface().get_pixel(20, 20), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_undo_flushes_stroke_in_progress() {
        let mut session = session();
        let spot = Spot::new(50.0, 50.0, 0.1, 0.5, 0, ToolKind::Finger);
        session.handle_event(&TouchEvent::single(TouchAction::Down, 0, spot));

        session.undo();
        assert!(!session.is_drawing());
        assert_eq!(session.surface().get_pixel(50, 50), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_clear_is_undoable() {
        let mut session = session();
        tap(&mut session, 20.0, 20.0);

        session.clear();
        assert_eq!(session.surface().get_pixel(20, 20), Some([0, 0, 0, 0]));

        session.undo();
        assert_eq!(session.surface().get_pixel(20, 20), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_undo_with_nothing_to_undo() {
        let mut session = session();
        assert_eq!(session.undo(), 0);
        assert_eq!(session.surface().version(), 0);
    }
}
