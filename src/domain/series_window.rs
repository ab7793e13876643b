// Fixed-capacity sliding windows over recent series values
use super::reading::SeriesKey;
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_WINDOW_CAPACITY: usize = 3;

/// FIFO buffer holding the most recent `capacity` values, oldest first.
#[derive(Debug, Clone)]
pub struct SeriesWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl SeriesWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest one when already at capacity.
    /// Returns whether the window is now full.
    pub fn push(&mut self, value: f64) -> bool {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Values in arrival order.
    pub fn values(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}

/// Windows for every series seen so far, created lazily on first push.
#[derive(Debug, Clone)]
pub struct SeriesWindows {
    windows: HashMap<SeriesKey, SeriesWindow>,
    capacity: usize,
}

impl SeriesWindows {
    pub fn new(capacity: usize) -> Self {
        Self {
            windows: HashMap::new(),
            capacity,
        }
    }

    pub fn push(&mut self, key: SeriesKey, value: f64) -> bool {
        let capacity = self.capacity;
        self.windows
            .entry(key)
            .or_insert_with(|| SeriesWindow::new(capacity))
            .push(value)
    }

    pub fn get(&self, key: &SeriesKey) -> Option<&SeriesWindow> {
        self.windows.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeriesKey, &SeriesWindow)> {
        self.windows.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::{SensorSlot, SeriesKind};

    #[test]
    fn test_window_fills_then_evicts_oldest() {
        let mut window = SeriesWindow::new(3);
        assert!(!window.push(1.0));
        assert!(!window.push(2.0));
        assert!(window.push(3.0));
        assert_eq!(window.values(), vec![1.0, 2.0, 3.0]);

        assert!(window.push(4.0));
        assert_eq!(window.values(), vec![2.0, 3.0, 4.0]);
        assert!(window.push(5.0));
        assert_eq!(window.values(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_window_length_never_exceeds_capacity() {
        let mut window = SeriesWindow::new(3);
        for i in 0..20 {
            window.push(i as f64);
            assert_eq!(window.values().len(), (i + 1).min(3));
        }
        assert_eq!(window.values(), vec![17.0, 18.0, 19.0]);
    }

    #[test]
    fn test_windows_are_created_lazily_and_independent() {
        let voc = SeriesKey::new(SensorSlot::Primary, SeriesKind::Voc);
        let temp = SeriesKey::new(SensorSlot::Primary, SeriesKind::Temperature);
        let mut windows = SeriesWindows::new(3);
        assert!(windows.get(&voc).is_none());

        windows.push(voc, 1.0);
        windows.push(voc, 2.0);
        windows.push(temp, 9.0);

        assert_eq!(windows.get(&voc).map(SeriesWindow::values), Some(vec![1.0, 2.0]));
        assert_eq!(windows.get(&temp).map(SeriesWindow::values), Some(vec![9.0]));
        assert_eq!(windows.iter().count(), 2);
    }
}
