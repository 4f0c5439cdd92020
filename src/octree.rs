//! Octree color quantization.
//!
//! Each pixel is inserted into an octree of depth [`DEPTH`], where the child taken at level `l`
//! is given by bit `7 - l` of the red, green, and blue components. Every node keeps the number
//! of pixels that passed through it and the sum of their components.
//!
//! While there are more leaves than requested colors, the node with the fewest pixels among
//! the deepest level that still has children is folded into a leaf. Each remaining leaf yields
//! the mean color of its pixels, in depth-first order.
//!
//! The result is deterministic for a given input.

use crate::{ColorSample, PaletteSize, Quantizer};
use palette::{cast, Srgb};

/// The number of bits of each component used to place a pixel in the tree.
pub const DEPTH: usize = 6;

/// The octree quantizer. See the [module documentation](self) for more details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Octree;

impl Quantizer for Octree {
    fn quantize(&self, colors: &[Srgb<u8>], palette_size: PaletteSize) -> Vec<ColorSample> {
        palette(colors, palette_size)
    }
}

/// Computes a color palette from the given `colors` with at most `palette_size` entries.
#[must_use]
pub fn palette(colors: &[Srgb<u8>], palette_size: PaletteSize) -> Vec<ColorSample> {
    let mut tree = Tree::new();
    for &color in colors {
        tree.insert(cast::into_array(color));
    }
    tree.reduce(palette_size.as_usize());
    tree.leaves()
}

/// A node of the octree, stored in an arena.
#[derive(Debug, Clone, Default)]
struct Node {
    /// The number of pixels inserted through this node.
    count: u32,
    /// The component-wise sum of the pixels inserted through this node.
    components: [u64; 3],
    /// Indices of the child nodes.
    children: [Option<u32>; 8],
    /// Whether this node is a leaf (at the maximum depth or folded).
    is_leaf: bool,
}

/// An octree over RGB colors.
struct Tree {
    /// The node arena; the root is at index `0`.
    nodes: Vec<Node>,
    /// The indices of the inner nodes at each level.
    levels: [Vec<u32>; DEPTH],
    /// The current number of leaves.
    leaf_count: usize,
}

/// Returns the child slot of `color` at the given level.
#[inline]
fn child_index(color: [u8; 3], level: usize) -> usize {
    let shift = 7 - level;
    let [r, g, b] = color.map(|c| usize::from((c >> shift) & 1));
    (r << 2) | (g << 1) | b
}

impl Tree {
    /// Creates a tree containing only the root.
    fn new() -> Self {
        let mut levels: [Vec<u32>; DEPTH] = Default::default();
        levels[0].push(0);
        Self {
            nodes: vec![Node::default()],
            levels,
            leaf_count: 0,
        }
    }

    /// Appends a new node at the given level and returns its index.
    #[allow(clippy::cast_possible_truncation)]
    fn push_node(&mut self, level: usize) -> u32 {
        // a tree of depth 6 has well under u32::MAX nodes
        let index = self.nodes.len() as u32;
        let is_leaf = level == DEPTH;
        self.nodes.push(Node { is_leaf, ..Node::default() });
        if is_leaf {
            self.leaf_count += 1;
        } else {
            self.levels[level].push(index);
        }
        index
    }

    /// Inserts a color, accumulating it in every node along its path.
    fn insert(&mut self, color: [u8; 3]) {
        let mut node = 0;
        for level in 0..=DEPTH {
            let Node { count, components, .. } = &mut self.nodes[node];
            *count += 1;
            for (sum, c) in components.iter_mut().zip(color) {
                *sum += u64::from(c);
            }

            if level == DEPTH {
                break;
            }

            let slot = child_index(color, level);
            let child = match self.nodes[node].children[slot] {
                Some(child) => child,
                None => {
                    let child = self.push_node(level + 1);
                    self.nodes[node].children[slot] = Some(child);
                    child
                }
            };
            node = child as usize;
        }
    }

    /// Folds nodes into leaves until there are at most `k` leaves.
    fn reduce(&mut self, k: usize) {
        for level in (0..DEPTH).rev() {
            if self.leaf_count <= k {
                break;
            }

            // all nodes at deeper levels are leaves by now
            let mut candidates = std::mem::take(&mut self.levels[level]);
            candidates.sort_by_key(|&i| self.nodes[i as usize].count);

            for i in candidates {
                if self.leaf_count <= k {
                    break;
                }
                let node = &mut self.nodes[i as usize];
                let children = node.children.iter().flatten().count();
                node.children = [None; 8];
                node.is_leaf = true;
                self.leaf_count = self.leaf_count + 1 - children;
            }
        }
    }

    /// Returns the mean color and count of every leaf, in depth-first order.
    fn leaves(&self) -> Vec<ColorSample> {
        let mut samples = Vec::with_capacity(self.leaf_count);
        let mut stack = vec![0u32];

        while let Some(i) = stack.pop() {
            let node = &self.nodes[i as usize];
            if node.count == 0 {
                continue;
            }
            if node.is_leaf {
                let n = u64::from(node.count);
                #[allow(clippy::cast_possible_truncation)]
                let color = node.components.map(|c| ((c + n / 2) / n) as u8);
                samples.push(ColorSample::new(cast::from_array(color), node.count));
            } else {
                stack.extend(node.children.iter().rev().flatten());
            }
        }

        samples
    }
}
