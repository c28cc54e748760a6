use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::stats::TopEntry;

/// Heap slot ordered by size alone
#[derive(Debug)]
struct BySize(TopEntry);

impl PartialEq for BySize {
    fn eq(&self, other: &Self) -> bool {
        self.0.size == other.0.size
    }
}

impl Eq for BySize {}

impl PartialOrd for BySize {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BySize {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.size.cmp(&other.0.size)
    }
}

/// Bounded set of the N largest entries seen.
///
/// Min-heap of capacity N. A full set only evicts its minimum for a strictly
/// larger candidate, so among equal sizes the first one offered stays.
#[derive(Debug)]
pub struct TopN {
    capacity: usize,
    heap: BinaryHeap<Reverse<BySize>>,
}

impl TopN {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(1024) + 1),
        }
    }

    /// Offer a candidate; returns whether it was kept
    pub fn offer(&mut self, entry: TopEntry) -> bool {
        if self.capacity == 0 {
            return false;
        }

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(BySize(entry)));
            return true;
        }

        match self.heap.peek() {
            Some(Reverse(min)) if entry.size > min.0.size => {
                self.heap.pop();
                self.heap.push(Reverse(BySize(entry)));
                true
            }
            _ => false,
        }
    }

    /// Smallest size currently kept
    pub fn min_size(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(min)| min.0.size)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drain into ascending size order, largest last. Equal sizes are ordered
    /// by path so the listing is stable.
    pub fn into_sorted(self) -> Vec<TopEntry> {
        let mut entries: Vec<TopEntry> = self
            .heap
            .into_iter()
            .map(|Reverse(BySize(entry))| entry)
            .collect();
        entries.sort_by(|a, b| a.size.cmp(&b.size).then_with(|| a.path.cmp(&b.path)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(top: TopN) -> Vec<u64> {
        top.into_sorted().into_iter().map(|e| e.size).collect()
    }

    #[test]
    fn test_keeps_largest() {
        let mut top = TopN::new(3);
        for (i, size) in [5u64, 1, 9, 3, 7, 2, 8].into_iter().enumerate() {
            top.offer(TopEntry::new(format!("f{i}"), size));
        }
        assert_eq!(top.len(), 3);
        assert_eq!(top.min_size(), Some(7));
        assert_eq!(sizes(top), vec![7, 8, 9]);
    }

    #[test]
    fn test_fewer_than_capacity() {
        let mut top = TopN::new(10);
        top.offer(TopEntry::new("b", 2));
        top.offer(TopEntry::new("a", 1));
        assert_eq!(sizes(top), vec![1, 2]);
    }

    #[test]
    fn test_equal_size_does_not_evict() {
        let mut top = TopN::new(1);
        assert!(top.offer(TopEntry::new("first", 10)));
        assert!(!top.offer(TopEntry::new("second", 10)));
        assert!(top.offer(TopEntry::new("third", 11)));
        let kept = top.into_sorted();
        assert_eq!(kept, vec![TopEntry::new("third", 11)]);
    }

    #[test]
    fn test_zero_capacity() {
        let mut top = TopN::new(0);
        assert!(!top.offer(TopEntry::new("a", 1)));
        assert!(top.is_empty());
    }

    #[test]
    fn test_sorted_ties_by_path() {
        let mut top = TopN::new(3);
        top.offer(TopEntry::new("z", 4));
        top.offer(TopEntry::new("a", 4));
        top.offer(TopEntry::new("m", 1));
        let paths: Vec<String> = top.into_sorted().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["m", "a", "z"]);
    }
}
