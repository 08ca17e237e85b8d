//! Vertical display slots
//!
//! Each slot is a vertical rank below the anchor edge. Slots count their
//! occupants rather than being exclusive: once every slot is taken, new
//! notifications share the least crowded one and overlap visually.

use crate::curve::BezierCurve;

/// Occupancy counters for the on-screen slots
#[derive(Debug, Clone)]
pub struct SlotTable {
    occupancy: Vec<u32>,
}

impl SlotTable {
    /// Create a table with `count` empty slots
    pub fn new(count: usize) -> Self {
        Self {
            occupancy: vec![0; count.max(1)],
        }
    }

    /// Take the least occupied slot (lowest index on ties)
    pub fn acquire(&mut self) -> usize {
        let mut index = 0;
        for (i, &count) in self.occupancy.iter().enumerate() {
            if count < self.occupancy[index] {
                index = i;
            }
        }

        self.occupancy[index] += 1;
        index
    }

    /// Give back a slot taken with [`acquire`](Self::acquire)
    pub fn release(&mut self, index: usize) {
        match self.occupancy.get_mut(index) {
            Some(count) if *count > 0 => *count -= 1,
            Some(_) => log::warn!("Released notification slot {} which was not occupied", index),
            None => log::warn!(
                "Released notification slot {} out of range ({} slots)",
                index,
                self.occupancy.len()
            ),
        }
    }

    /// Current occupants of a slot
    pub fn occupancy(&self, index: usize) -> u32 {
        self.occupancy.get(index).copied().unwrap_or(0)
    }

    /// Total occupants across all slots
    pub fn occupied(&self) -> u32 {
        self.occupancy.iter().sum()
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.occupancy.len()
    }

    /// Always false, a table has at least one slot
    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }
}

/// Geometry mapping slots to vertical offsets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotLayout {
    /// Height of one notification
    pub element_height: f32,
    /// Gap between stacked notifications
    pub spacing: f32,
    /// Distance from the anchor edge to the first slot
    pub spawn_offset: f32,
}

impl SlotLayout {
    /// Vertical offset of a slot (negative is away from the anchor edge)
    pub fn offset(&self, slot: usize) -> f32 {
        -(self.element_height + self.spacing) * slot as f32 - self.spawn_offset
    }

    /// Resting position of a notification in `slot`
    pub fn rest_position(&self, slot: usize) -> f32 {
        self.offset(slot) - self.element_height * 0.5
    }

    /// Curve for sliding into `slot`, dipping past the rest position and settling back
    pub fn show_curve(&self, slot: usize) -> BezierCurve {
        let offset = self.offset(slot);
        let half = self.element_height * 0.5;

        BezierCurve::new(
            offset - half,
            offset - half * 3.0,
            offset - half * 0.5,
            offset - half,
        )
    }

    /// Curve for leaving the screen past the anchor edge from `position`
    pub fn hide_curve(&self, position: f32) -> BezierCurve {
        let half = self.element_height * 0.5;
        BezierCurve::new(position, position * 1.1, half, half)
    }
}
