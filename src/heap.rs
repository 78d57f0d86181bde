/// Binary min-heap ordered by a caller-supplied score.
///
/// Queued elements can be located by equality and re-sifted after their score drops.
pub struct PriorityQueue<T, F>
where
    F: Fn(&T) -> f64,
{
    content: Vec<T>,
    score: F,
}

impl<T, F> PriorityQueue<T, F>
where
    T: PartialEq,
    F: Fn(&T) -> f64,
{
    pub fn new(score: F) -> Self {
        PriorityQueue {
            content: Vec::new(),
            score,
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn peek(&self) -> Option<&T> {
        self.content.first()
    }

    pub fn push(&mut self, element: T) {
        self.content.push(element);
        self.sift_up(self.content.len() - 1);
    }

    /// Removes the lowest-scored element, or `None` when the queue is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.content.is_empty() {
            return None;
        }
        let result = self.content.swap_remove(0);
        if !self.content.is_empty() {
            self.sift_down(0);
        }
        Some(result)
    }

    /// Removes the first slot equal to `element`, filling the hole with the last slot.
    pub fn remove(&mut self, element: &T) -> Option<T> {
        let index = self.position(element)?;
        let removed = self.content.swap_remove(index);
        if index < self.content.len() {
            let moved = (self.score)(&self.content[index]);
            if moved < (self.score)(&removed) {
                self.sift_up(index);
            } else {
                self.sift_down(index);
            }
        }
        Some(removed)
    }

    /// Replaces the queued slot equal to `element` with `element` and moves it
    /// toward the root. Scores only ever decrease on rescoring, so sifting up is
    /// enough. Returns `false` when no such slot is queued.
    pub fn rescore_element(&mut self, element: T) -> bool {
        let Some(index) = self.position(&element) else {
            return false;
        };
        self.content[index] = element;
        self.sift_up(index);
        true
    }

    /// Checks that no child scores below its parent.
    pub fn is_heap(&self) -> bool {
        (1..self.content.len()).all(|i| {
            (self.score)(&self.content[(i - 1) / 2]) <= (self.score)(&self.content[i])
        })
    }

    fn position(&self, element: &T) -> Option<usize> {
        self.content.iter().position(|queued| queued == element)
    }

    fn sift_up(&mut self, mut n: usize) {
        let score = (self.score)(&self.content[n]);
        while n > 0 {
            let parent = (n - 1) / 2;
            if score < (self.score)(&self.content[parent]) {
                self.content.swap(n, parent);
                n = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut n: usize) {
        let length = self.content.len();
        let score = (self.score)(&self.content[n]);
        loop {
            let right = (n + 1) * 2;
            let left = right - 1;
            let mut swap = None;
            let mut best = score;

            if left < length {
                let left_score = (self.score)(&self.content[left]);
                if left_score < best {
                    swap = Some(left);
                    best = left_score;
                }
            }
            if right < length && (self.score)(&self.content[right]) < best {
                swap = Some(right);
            }

            match swap {
                Some(child) => {
                    self.content.swap(n, child);
                    n = child;
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Entry {
        id: usize,
        score: f64,
    }

    // Identity only, so a rescored entry still matches its queued slot.
    #[derive(Debug, Clone, Copy)]
    struct Keyed(Entry);

    impl PartialEq for Keyed {
        fn eq(&self, other: &Self) -> bool {
            self.0.id == other.0.id
        }
    }

    #[test]
    fn test_pop_empty_queue() {
        let mut queue = PriorityQueue::new(|x: &f64| *x);
        assert_eq!(queue.size(), 0);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_pop_in_score_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut queue = PriorityQueue::new(|x: &f64| *x);
        for _ in 0..200 {
            queue.push(rng.gen_range(-50.0..50.0));
        }
        assert_eq!(queue.size(), 200);

        let mut last = f64::NEG_INFINITY;
        while let Some(score) = queue.pop() {
            assert!(score >= last);
            last = score;
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_duplicates_are_distinct_slots() {
        let mut queue = PriorityQueue::new(|x: &u32| f64::from(*x));
        queue.push(3);
        queue.push(3);
        queue.push(1);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_remove_arbitrary() {
        let mut queue = PriorityQueue::new(|x: &u32| f64::from(*x));
        for value in [9, 4, 7, 1, 8, 2, 6] {
            queue.push(value);
        }
        assert_eq!(queue.remove(&4), Some(4));
        assert_eq!(queue.remove(&42), None);
        assert!(queue.is_heap());

        let drained: Vec<u32> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(drained, vec![1, 2, 6, 7, 8, 9]);
    }

    #[test]
    fn test_remove_last_slot() {
        let mut queue = PriorityQueue::new(|x: &u32| f64::from(*x));
        queue.push(1);
        queue.push(5);
        assert_eq!(queue.remove(&5), Some(5));
        assert_eq!(queue.size(), 1);
        assert_eq!(queue.peek(), Some(&1));
    }

    #[test]
    fn test_rescore_moves_element_up() {
        let mut queue = PriorityQueue::new(|k: &Keyed| k.0.score);
        for id in 0..10 {
            queue.push(Keyed(Entry {
                id,
                score: 10.0 + id as f64,
            }));
        }
        assert!(queue.rescore_element(Keyed(Entry { id: 9, score: 0.5 })));
        assert!(!queue.rescore_element(Keyed(Entry { id: 99, score: 0.0 })));
        assert_eq!(queue.pop().map(|k| k.0.id), Some(9));
        assert_eq!(queue.pop().map(|k| k.0.id), Some(0));
    }

    #[test]
    fn test_heap_invariant_under_mixed_operations() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut queue = PriorityQueue::new(|k: &Keyed| k.0.score);
        let mut scores: Vec<Option<f64>> = Vec::new();

        for step in 0..2000 {
            match rng.gen_range(0..4) {
                0 | 1 => {
                    let score = rng.gen_range(0.0..100.0);
                    queue.push(Keyed(Entry {
                        id: scores.len(),
                        score,
                    }));
                    scores.push(Some(score));
                }
                2 => {
                    if let Some(popped) = queue.pop() {
                        let min = scores
                            .iter()
                            .flatten()
                            .fold(f64::INFINITY, |acc, s| acc.min(*s));
                        assert_eq!(popped.0.score, min, "step {step}");
                        scores[popped.0.id] = None;
                    }
                }
                _ => {
                    let live: Vec<usize> = (0..scores.len())
                        .filter(|id| scores[*id].is_some())
                        .collect();
                    if live.is_empty() {
                        continue;
                    }
                    let id = live[rng.gen_range(0..live.len())];
                    let old = scores[id].unwrap_or_default();
                    if rng.gen_bool(0.5) {
                        let score = old * rng.gen_range(0.0..1.0);
                        assert!(queue.rescore_element(Keyed(Entry { id, score })));
                        scores[id] = Some(score);
                    } else {
                        let key = Keyed(Entry { id, score: old });
                        assert_eq!(queue.remove(&key).map(|k| k.0.id), Some(id));
                        scores[id] = None;
                    }
                }
            }
            assert!(queue.is_heap(), "heap property broken at step {step}");
            assert_eq!(queue.size(), scores.iter().flatten().count());
        }
    }
}
