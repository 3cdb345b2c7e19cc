//! Edge colorings, and how they are parsed, checked and produced.

use std::collections::BTreeMap;

use crate::graph::Edge;

pub mod parser;
pub mod reference;
pub mod validator;

pub use parser::{ColoringParser, ParseMode};
pub use reference::{ReferenceColorer, ReferenceRun};
pub use validator::{validate, validate_all, Validity, Violation};

pub type Color = usize;

/// Stored color of an entry written as `Color 0`. It is a color of its own,
/// distinct from every numbered color, and does not count toward `num_colors`.
pub const COLOR_ZERO: Color = Color::MAX;

/// Zero-based color per edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coloring {
    pub edges_coloring: BTreeMap<Edge, Color>,
    /// One more than the largest color ever seen, 0 if nothing was colored.
    pub num_colors: usize,
}

impl Coloring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_colors(colors: impl IntoIterator<Item = (Edge, Color)>) -> Self {
        let mut coloring = Self::new();
        for (edge, color) in colors {
            coloring.set(edge, color);
        }
        coloring
    }

    /// Assign `color` to `edge`, replacing any earlier color.
    /// Returns the replaced color.
    pub fn set(&mut self, edge: Edge, color: Color) -> Option<Color> {
        if let Some(count) = color.checked_add(1) {
            self.num_colors = self.num_colors.max(count);
        }
        self.edges_coloring.insert(edge, color)
    }

    pub fn color(&self, edge: Edge) -> Option<Color> {
        self.edges_coloring.get(&edge).copied()
    }

    pub fn len(&self) -> usize {
        self.edges_coloring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges_coloring.is_empty()
    }
}
