//! Touch events as delivered by the host platform

use serde::{Deserialize, Serialize};

use crate::types::Spot;

/// What happened in a touch event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchAction {
    /// First pointer touched down; starts a new undo step
    Down,
    /// An additional pointer touched down
    PointerDown { id: usize },
    Move,
    /// One of several pointers lifted
    PointerUp { id: usize },
    /// Last pointer lifted
    Up,
    /// Gesture aborted by the platform
    Cancel,
}

/// Samples for one pointer within an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub id: usize,
    /// Batched samples since the previous event, oldest first
    #[serde(default)]
    pub history: Vec<Spot>,
    pub current: Spot,
}

impl PointerSample {
    pub fn new(id: usize, current: Spot) -> Self {
        Self {
            id,
            history: Vec::new(),
            current,
        }
    }

    pub fn with_history(id: usize, history: Vec<Spot>, current: Spot) -> Self {
        Self { id, history, current }
    }

    /// All samples in chronological order, ending with the current one
    pub fn samples(&self) -> impl Iterator<Item = &Spot> {
        self.history.iter().chain(std::iter::once(&self.current))
    }
}

/// One multi-pointer touch event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub pointers: Vec<PointerSample>,
}

impl TouchEvent {
    pub fn new(action: TouchAction, pointers: Vec<PointerSample>) -> Self {
        Self { action, pointers }
    }

    /// Single-pointer event without history
    pub fn single(action: TouchAction, id: usize, spot: Spot) -> Self {
        Self::new(action, vec![PointerSample::new(id, spot)])
    }
}
