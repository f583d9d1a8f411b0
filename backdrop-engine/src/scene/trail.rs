// trail.rs - Fixed-capacity position history for motion trails
//
// Slot 0 is the newest position. Pushing past capacity evicts the oldest.

use std::collections::VecDeque;

use glam::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct TrailBuffer {
    capacity: usize,
    slots: VecDeque<Vec3>,
}

impl TrailBuffer {
    /// Capacity is clamped to at least one slot.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, slots: VecDeque::with_capacity(capacity + 1) }
    }

    pub fn push(&mut self, position: Vec3) {
        self.slots.push_front(position);
        self.slots.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn capacity(&self) -> usize { self.capacity }
    pub fn len(&self) -> usize { self.slots.len() }
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.slots.iter()
    }

    /// Opacity multiplier for slot `index`: 1.0 at the head, fading linearly.
    pub fn fade(&self, index: usize) -> f32 {
        1.0 - index as f32 / self.capacity as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn keeps_most_recent_first() {
        let mut trail = TrailBuffer::new(3);
        for i in 0..5 {
            trail.push(Vec3::splat(i as f32));
        }
        let xs: Vec<f32> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![4.0, 3.0, 2.0]);
    }

    #[test]
    fn fade_decreases_by_index() {
        let trail = TrailBuffer::new(4);
        assert_eq!(trail.fade(0), 1.0);
        assert!(trail.fade(1) > trail.fade(2));
        assert!(trail.fade(3) > 0.0);
    }

    #[test]
    fn zero_capacity_clamped() {
        let mut trail = TrailBuffer::new(0);
        trail.push(Vec3::ONE);
        trail.push(Vec3::ZERO);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.iter().next(), Some(&Vec3::ZERO));
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(capacity in 1usize..64, pushes in 0usize..256) {
            let mut trail = TrailBuffer::new(capacity);
            for i in 0..pushes {
                trail.push(Vec3::new(i as f32, 0.0, 0.0));
                prop_assert!(trail.len() <= capacity);
            }
            prop_assert_eq!(trail.len(), pushes.min(capacity));
            let expected: Vec<f32> = (0..pushes).rev().take(capacity).map(|i| i as f32).collect();
            let actual: Vec<f32> = trail.iter().map(|p| p.x).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
