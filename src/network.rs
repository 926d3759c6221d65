//! Concrete comparator networks

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vectors::{binary_vectors, is_sorted};

/// Compare-and-swap between two channels, `low < high`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Comparator {
    pub low: usize,
    pub high: usize,
}

impl Comparator {
    /// Comparator on channels `a` and `b`, in either order.
    pub fn new(a: usize, b: usize) -> Self {
        debug_assert_ne!(a, b);
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Put the smaller value on the lower channel and the larger on the
    /// higher one. Both results are computed from the incoming pair.
    pub fn apply<T: Ord + Copy>(&self, values: &mut [T]) {
        let (a, b) = (values[self.low], values[self.high]);
        values[self.low] = a.min(b);
        values[self.high] = a.max(b);
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

/// Comparators grouped into sequential layers; each layer touches every
/// channel at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    channels: usize,
    layers: Vec<Vec<Comparator>>,
}

impl Network {
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            layers: Vec::new(),
        }
    }

    /// Append a layer. Empty layers are ignored.
    pub fn push_layer(&mut self, mut layer: Vec<Comparator>) {
        if layer.is_empty() {
            return;
        }
        layer.sort();
        self.layers.push(layer);
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn layers(&self) -> &[Vec<Comparator>] {
        &self.layers
    }

    /// Number of non-empty layers
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Total number of comparators
    pub fn size(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Run the network over `values` in place.
    pub fn apply<T: Ord + Copy>(&self, values: &mut [T]) {
        for layer in &self.layers {
            for comparator in layer {
                comparator.apply(values);
            }
        }
    }

    /// Output of the network for one input.
    pub fn run<T: Ord + Copy>(&self, input: &[T]) -> Vec<T> {
        let mut values = input.to_vec();
        self.apply(&mut values);
        values
    }

    /// True if the network sorts every 0/1 input of its width.
    pub fn sorts_all_binary(&self) -> bool {
        binary_vectors(self.channels)
            .iter()
            .all(|v| is_sorted(&self.run(v)))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, layer) in self.layers.iter().enumerate() {
            let pairs: Vec<String> = layer.iter().map(Comparator::to_string).collect();
            writeln!(f, "Depth: {}, Index: [{}]", index + 1, pairs.join(", "))?;
        }
        Ok(())
    }
}
