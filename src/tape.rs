//! The interpreter's memory: an unbounded tape of byte cells grown lazily in
//! both directions.
//!
//! The tape is stored as two growable halves addressed by distance from the
//! origin cell:
//! - `right[i]` holds the cell at position `i` (`i >= 0`, the origin included),
//! - `left[i]` holds the cell at position `-(i + 1)`.
//!
//! A cell is only materialized the first time the cursor reaches it, so the
//! materialized region is always contiguous and always contains the cursor.

use std::fmt;

/// An unbounded, bidirectionally-extensible sequence of `u8` cells with a
/// single movable cursor.
#[derive(Clone, PartialEq, Eq)]
pub struct Tape {
    right: Vec<u8>,
    left: Vec<u8>,
    position: isize,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Tape {
    /// Create a tape holding a single zeroed cell under the cursor.
    pub fn new() -> Self {
        Self {
            right: vec![0],
            left: Vec::new(),
            position: 0,
        }
    }

    /// Move the cursor one cell to the right, materializing a zero cell if
    /// the cursor walks off the materialized region.
    pub fn move_right(&mut self) {
        self.position += 1;
        if self.position >= 0 && self.position as usize == self.right.len() {
            self.right.push(0);
        }
    }

    /// Move the cursor one cell to the left, materializing a zero cell if
    /// the cursor walks off the materialized region.
    pub fn move_left(&mut self) {
        self.position -= 1;
        if self.position < 0 && Self::left_index(self.position) == self.left.len() {
            self.left.push(0);
        }
    }

    /// Add one to the current cell, wrapping from 255 to 0.
    pub fn increment(&mut self) {
        let cell = self.current_mut();
        *cell = cell.wrapping_add(1);
    }

    /// Subtract one from the current cell, wrapping from 0 to 255.
    pub fn decrement(&mut self) {
        let cell = self.current_mut();
        *cell = cell.wrapping_sub(1);
    }

    /// Value of the current cell.
    pub fn read(&self) -> u8 {
        if self.position >= 0 {
            self.right[self.position as usize]
        } else {
            self.left[Self::left_index(self.position)]
        }
    }

    /// Overwrite the current cell.
    pub fn write(&mut self, value: u8) {
        *self.current_mut() = value;
    }

    /// Signed cursor position relative to the origin cell.
    pub fn position(&self) -> isize {
        self.position
    }

    /// Position of the leftmost materialized cell.
    pub fn leftmost(&self) -> isize {
        -(self.left.len() as isize)
    }

    /// Number of cells visited so far.
    pub fn materialized_len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    /// Value at an absolute position, if that cell has been materialized.
    pub fn get(&self, position: isize) -> Option<u8> {
        if position >= 0 {
            self.right.get(position as usize).copied()
        } else {
            self.left.get(Self::left_index(position)).copied()
        }
    }

    /// Materialized cells from leftmost to rightmost.
    pub fn cells(&self) -> impl Iterator<Item = u8> + '_ {
        self.left.iter().rev().chain(self.right.iter()).copied()
    }

    fn current_mut(&mut self) -> &mut u8 {
        if self.position >= 0 {
            &mut self.right[self.position as usize]
        } else {
            let i = Self::left_index(self.position);
            &mut self.left[i]
        }
    }

    #[inline]
    fn left_index(position: isize) -> usize {
        (-position - 1) as usize
    }
}

impl fmt::Debug for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tape")
            .field("leftmost", &self.leftmost())
            .field("position", &self.position)
            .field("cells", &self.cells().collect::<Vec<_>>())
            .finish()
    }
}
