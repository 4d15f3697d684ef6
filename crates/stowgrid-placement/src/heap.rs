//! Array-backed binary min-heap over warehouses, ordered by utilization.
//!
//! The ordering key is recomputed from the warehouse on every comparison,
//! so a warehouse must be popped before it is mutated and pushed back
//! afterwards. Ties on utilization break on warehouse id (ascending).

use std::cmp::Ordering;

use stow_core::Warehouse;

/// Min-heap keyed by [`Warehouse::utilization`].
#[derive(Debug, Default)]
pub struct UtilizationHeap {
    slots: Vec<Warehouse>,
}

/// Least-utilized first, then lexicographic id. `-0.0` ranks as `0.0`.
fn precedes(a: &Warehouse, b: &Warehouse) -> bool {
    match (a.utilization() + 0.0).total_cmp(&(b.utilization() + 0.0)) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => a.id < b.id,
    }
}

impl UtilizationHeap {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn push(&mut self, warehouse: Warehouse) {
        self.slots.push(warehouse);
        self.sift_up(self.slots.len() - 1);
    }

    /// Remove and return the least-utilized warehouse.
    pub fn pop_min(&mut self) -> Option<Warehouse> {
        if self.slots.is_empty() {
            return None;
        }
        let last = self.slots.len() - 1;
        self.slots.swap(0, last);
        let min = self.slots.pop();
        if !self.slots.is_empty() {
            self.sift_down(0);
        }
        min
    }

    #[cfg(test)]
    pub fn peek_min(&self) -> Option<&Warehouse> {
        self.slots.first()
    }

    /// Drain every warehouse in heap order.
    #[cfg(test)]
    pub fn into_sorted_vec(mut self) -> Vec<Warehouse> {
        let mut out = Vec::with_capacity(self.slots.len());
        while let Some(w) = self.pop_min() {
            out.push(w);
        }
        out
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !precedes(&self.slots[idx], &self.slots[parent]) {
                break;
            }
            self.slots.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut smallest = idx;

            if left < len && precedes(&self.slots[left], &self.slots[smallest]) {
                smallest = left;
            }
            if right < len && precedes(&self.slots[right], &self.slots[smallest]) {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.slots.swap(idx, smallest);
            idx = smallest;
        }
    }
}

impl FromIterator<Warehouse> for UtilizationHeap {
    fn from_iter<I: IntoIterator<Item = Warehouse>>(iter: I) -> Self {
        let mut heap = Self::new();
        for w in iter {
            heap.push(w);
        }
        heap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wh(id: &str, total: f64, stock: f64) -> Warehouse {
        Warehouse::new(id, total).with_stock(stock)
    }

    #[test]
    fn empty_heap_pops_none() {
        let mut heap = UtilizationHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);
        assert!(heap.pop_min().is_none());
        assert!(heap.peek_min().is_none());
    }

    #[test]
    fn pops_in_ascending_utilization() {
        let heap: UtilizationHeap = vec![
            wh("half", 100.0, 50.0),
            wh("empty", 100.0, 0.0),
            wh("zero-cap", 0.0, 0.0),
            wh("most", 100.0, 90.0),
            wh("quarter", 200.0, 50.0),
        ]
        .into_iter()
        .collect();

        let order: Vec<String> = heap.into_sorted_vec().into_iter().map(|w| w.id).collect();
        assert_eq!(order, vec!["empty", "quarter", "half", "most", "zero-cap"]);
    }

    #[test]
    fn equal_utilization_breaks_on_id() {
        let heap: UtilizationHeap = vec![
            wh("wh-c", 100.0, 10.0),
            wh("wh-a", 200.0, 20.0),
            wh("wh-b", 50.0, 5.0),
        ]
        .into_iter()
        .collect();

        let order: Vec<String> = heap.into_sorted_vec().into_iter().map(|w| w.id).collect();
        assert_eq!(order, vec!["wh-a", "wh-b", "wh-c"]);
    }

    #[test]
    fn negative_zero_stock_ties_on_id() {
        let heap: UtilizationHeap = vec![
            Warehouse::new("wh-b", 100.0),
            Warehouse::new("wh-a", 100.0).with_stock(-0.0).with_incoming(-0.0),
        ]
        .into_iter()
        .collect();

        let order: Vec<String> = heap.into_sorted_vec().into_iter().map(|w| w.id).collect();
        assert_eq!(order, vec!["wh-a", "wh-b"]);
    }

    #[test]
    fn reinserted_warehouse_is_reordered_by_new_state() {
        let mut heap: UtilizationHeap =
            vec![wh("a", 100.0, 0.0), wh("b", 100.0, 20.0)].into_iter().collect();

        let mut first = heap.pop_min().unwrap();
        assert_eq!(first.id, "a");
        first.incoming_m3 += 50.0;
        heap.push(first);

        assert_eq!(heap.peek_min().unwrap().id, "b");
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn overcommitted_sorts_after_full() {
        let heap: UtilizationHeap = vec![
            wh("over", 100.0, 150.0),
            wh("full", 100.0, 100.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(heap.peek_min().unwrap().id, "full");
    }

    #[test]
    fn many_pushes_keep_heap_property() {
        let mut heap = UtilizationHeap::with_capacity(64);
        for i in 0..64u32 {
            // Scramble stock levels so insertion order differs from key order.
            let stock = f64::from((i * 37) % 64);
            heap.push(wh(&format!("wh-{i:02}"), 64.0, stock));
        }

        let mut last = f64::NEG_INFINITY;
        while let Some(w) = heap.pop_min() {
            assert!(w.utilization() >= last);
            last = w.utilization();
        }
    }
}
