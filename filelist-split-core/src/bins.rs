//! Capacity-tracked bins and the ordered set of currently open bins.

use std::fmt;

use uuid::Uuid;

use crate::contract::{BinConfig, Item};

/// Unique, stable identifier of a bin. Its hyphenated form names the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinId(Uuid);

impl BinId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BinId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Container of items that tracks cumulative size and item count.
///
/// All capacity enforcement happens in [`Bin::insert`]; there is no other way
/// to mutate a bin.
#[derive(Debug)]
pub struct Bin {
    id: BinId,
    items: Vec<Item>,
    cumulative_size: u64,
    max_size: u64,
    max_count: usize,
    fill_ratio: f64,
    allow_oversized: bool,
    oversized: bool,
}

impl Bin {
    /// Create an empty bin with the capacities from `config`.
    pub fn new(config: &BinConfig) -> Self {
        Self {
            id: BinId::new(),
            items: Vec::new(),
            cumulative_size: 0,
            max_size: config.max_size,
            max_count: config.max_count,
            fill_ratio: config.fill_ratio,
            allow_oversized: config.allow_oversized,
            oversized: false,
        }
    }

    /// Attempt to insert an item.
    ///
    /// The item is accepted if it fits both the size and count limits. An
    /// item that does not fit is still accepted when the bin is empty and
    /// oversized items are allowed; the bin is then pinned to a single item.
    /// A rejected item is handed back unchanged.
    pub fn insert(&mut self, item: Item) -> Result<(), Item> {
        let new_size = self.cumulative_size.saturating_add(item.size());
        let fits = new_size <= self.max_size && self.items.len() < self.max_count;
        if !fits {
            if !(self.allow_oversized && self.items.is_empty()) {
                return Err(item);
            }
            self.max_count = 1;
            self.oversized = true;
        }
        self.items.push(item);
        self.cumulative_size = new_size;
        Ok(())
    }

    /// True once the bin reached its count limit or the soft size threshold
    /// (`max_size * fill_ratio`).
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_count
            || self.cumulative_size as f64 >= self.max_size as f64 * self.fill_ratio
    }

    pub fn id(&self) -> BinId {
        self.id
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cumulative_size(&self) -> u64 {
        self.cumulative_size
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Current count limit; 1 for a bin holding an oversized item.
    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn is_oversized(&self) -> bool {
        self.oversized
    }

    pub fn percent_full(&self) -> f64 {
        self.cumulative_size as f64 / self.max_size as f64 * 100.0
    }
}

/// Open bins, iterated oldest first.
///
/// Creation order is what makes first-fit placement reproducible: the same
/// input always lands in the same groups.
#[derive(Debug, Default)]
pub struct BinSet {
    bins: Vec<Bin>,
}

impl BinSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Add a newly created bin at the end of the scan order.
    pub fn insert(&mut self, bin: Bin) {
        self.bins.push(bin);
    }

    pub fn contains(&self, id: BinId) -> bool {
        self.bins.iter().any(|bin| bin.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bin> {
        self.bins.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Bin> {
        self.bins.iter_mut()
    }

    /// Remove every bin whose id is in `marked`, keeping the remaining bins
    /// in their original order. Removed bins are returned oldest first.
    pub fn remove_marked(&mut self, marked: &[BinId]) -> Vec<Bin> {
        if marked.is_empty() {
            return Vec::new();
        }
        let (closed, open): (Vec<Bin>, Vec<Bin>) = std::mem::take(&mut self.bins)
            .into_iter()
            .partition(|bin| marked.contains(&bin.id()));
        self.bins = open;
        closed
    }

    /// Remove and return all bins, oldest first.
    pub fn drain(&mut self) -> Vec<Bin> {
        std::mem::take(&mut self.bins)
    }
}
