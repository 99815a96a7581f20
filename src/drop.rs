// Copyright (c) 2026 rezky_nightky

use std::collections::TryReserveError;

use rand::Rng;

pub const MIN_HEIGHT: i32 = 4;

/// Drops enter one row above the visible top so the first step puts the
/// lead character on row 0.
pub const SPAWN_ROW: i32 = -1;

/// Stable, generation-checked reference to a registry slot. A handle held
/// across a removal goes stale instead of dangling: the slot's generation
/// moves on and lookups return None.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropHandle {
    index: u32,
    generation: u32,
}

/// One falling streak. `row` is the leading (brightest) character;
/// everything in `(row - length, row)` is still colored trail.
#[derive(Clone, Debug)]
pub struct Drop {
    pub column: u16,
    pub row: i32,
    pub length: i32,
    pub last_glyph: char,
}

struct Node {
    drop: Drop,
    prev: Option<u32>,
    next: Option<u32>,
}

enum Entry {
    Occupied(Node),
    Free { next_free: Option<u32> },
}

struct Slot {
    generation: u32,
    entry: Entry,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RegistryStats {
    pub created: u64,
    pub destroyed: u64,
    pub high_water: usize,
}

/// All live drops, as an intrusive doubly-linked list threaded through a
/// slab. Front-insert and arbitrary removal are O(1); freed slots go on a
/// free list so steady-state churn never touches the allocator. Insertion
/// order carries no meaning.
pub struct DropRegistry {
    slots: Vec<Slot>,
    free_head: Option<u32>,
    head: Option<u32>,
    live: usize,
    stats: RegistryStats,
}

impl DropRegistry {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            head: None,
            live: 0,
            stats: RegistryStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn stats(&self) -> RegistryStats {
        self.stats
    }

    /// Allocate a drop in `column` and link it at the head. Length is drawn
    /// uniformly from `[MIN_HEIGHT, max(MIN_HEIGHT, max_row * fraction)]`,
    /// which collapses to the floor on degenerate geometry. The only
    /// failure is allocation exhaustion when the slab must grow.
    pub fn create<R: Rng>(
        &mut self,
        column: u16,
        max_row: i32,
        height_fraction: f64,
        rng: &mut R,
    ) -> Result<DropHandle, TryReserveError> {
        let cap = ((max_row as f64) * height_fraction).floor() as i32;
        let upper = cap.max(MIN_HEIGHT);
        let drop = Drop {
            column,
            row: SPAWN_ROW,
            length: rng.random_range(MIN_HEIGHT..=upper),
            last_glyph: ' ',
        };

        let index = match self.free_head {
            Some(i) => {
                self.free_head = match &self.slots[i as usize].entry {
                    Entry::Free { next_free } => *next_free,
                    Entry::Occupied(_) => unreachable!("free list points at occupied slot"),
                };
                i
            }
            None => {
                self.slots.try_reserve(1)?;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Entry::Free { next_free: None },
                });
                (self.slots.len() - 1) as u32
            }
        };

        let old_head = self.head;
        self.slots[index as usize].entry = Entry::Occupied(Node {
            drop,
            prev: None,
            next: old_head,
        });
        if let Some(h) = old_head {
            if let Entry::Occupied(n) = &mut self.slots[h as usize].entry {
                n.prev = Some(index);
            }
        }
        self.head = Some(index);

        self.live += 1;
        self.stats.created += 1;
        self.stats.high_water = self.stats.high_water.max(self.live);

        Ok(DropHandle {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    fn node(&self, h: DropHandle) -> Option<&Node> {
        let slot = self.slots.get(h.index as usize)?;
        if slot.generation != h.generation {
            return None;
        }
        match &slot.entry {
            Entry::Occupied(n) => Some(n),
            Entry::Free { .. } => None,
        }
    }

    #[allow(dead_code)]
    pub fn get(&self, h: DropHandle) -> Option<&Drop> {
        self.node(h).map(|n| &n.drop)
    }

    pub fn get_mut(&mut self, h: DropHandle) -> Option<&mut Drop> {
        let slot = self.slots.get_mut(h.index as usize)?;
        if slot.generation != h.generation {
            return None;
        }
        match &mut slot.entry {
            Entry::Occupied(n) => Some(&mut n.drop),
            Entry::Free { .. } => None,
        }
    }

    fn handle_at(&self, index: u32) -> DropHandle {
        DropHandle {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    pub fn head(&self) -> Option<DropHandle> {
        self.head.map(|i| self.handle_at(i))
    }

    pub fn next(&self, h: DropHandle) -> Option<DropHandle> {
        self.node(h)?.next.map(|i| self.handle_at(i))
    }

    /// Unlink and release the node, returning whichever node followed it so
    /// a forward scan can keep going without restarting from the head. Safe
    /// on head and tail alike; a stale handle is a no-op returning None.
    pub fn remove(&mut self, h: DropHandle) -> Option<DropHandle> {
        let (prev, next) = {
            let n = self.node(h)?;
            (n.prev, n.next)
        };

        match prev {
            None => self.head = next,
            Some(p) => {
                if let Entry::Occupied(n) = &mut self.slots[p as usize].entry {
                    n.next = next;
                }
            }
        }
        if let Some(nx) = next {
            if let Entry::Occupied(n) = &mut self.slots[nx as usize].entry {
                n.prev = prev;
            }
        }

        let slot = &mut self.slots[h.index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.entry = Entry::Free {
            next_free: self.free_head,
        };
        self.free_head = Some(h.index);

        self.live -= 1;
        self.stats.destroyed += 1;

        next.map(|i| self.handle_at(i))
    }

    /// Release every node. Idempotent on an empty registry.
    pub fn clear(&mut self) {
        let mut cur = self.head();
        while let Some(h) = cur {
            cur = self.remove(h);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn create(reg: &mut DropRegistry, rng: &mut StdRng, column: u16) -> DropHandle {
        reg.create(column, 24, 0.5, rng).expect("slab alloc")
    }

    /// Walk from the head checking acyclicity and that every back-link
    /// names its predecessor (head's is absent).
    fn check_links(reg: &DropRegistry) {
        let mut seen = 0usize;
        let mut prev: Option<DropHandle> = None;
        let mut cur = reg.head();
        while let Some(h) = cur {
            assert!(seen <= reg.len(), "cycle detected");
            let back = reg.node(h).expect("live node").prev;
            match prev {
                None => assert_eq!(back, None, "head must have no back-link"),
                Some(p) => assert_eq!(back, Some(p.index), "broken back-link"),
            }
            seen += 1;
            prev = Some(h);
            cur = reg.next(h);
        }
        assert_eq!(seen, reg.len());
    }

    #[test]
    fn links_survive_interleaved_create_remove() {
        let mut rng = rng();
        let mut reg = DropRegistry::new();

        let a = create(&mut reg, &mut rng, 0);
        let b = create(&mut reg, &mut rng, 1);
        let c = create(&mut reg, &mut rng, 2);
        let d = create(&mut reg, &mut rng, 3);
        check_links(&reg);

        // middle
        reg.remove(b);
        check_links(&reg);
        // tail
        reg.remove(a);
        check_links(&reg);
        // head
        reg.remove(d);
        check_links(&reg);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(c).unwrap().column, 2);

        let e = create(&mut reg, &mut rng, 4);
        check_links(&reg);
        reg.remove(c);
        reg.remove(e);
        check_links(&reg);
        assert!(reg.is_empty());
    }

    #[test]
    fn remove_returns_the_following_node() {
        let mut rng = rng();
        let mut reg = DropRegistry::new();
        let a = create(&mut reg, &mut rng, 0);
        let b = create(&mut reg, &mut rng, 1);
        // list order is [b, a]; removing b continues at a
        assert_eq!(reg.remove(b), Some(a));
        // tail removal ends the scan
        assert_eq!(reg.remove(a), None);
    }

    #[test]
    fn clear_is_idempotent_on_empty() {
        let mut rng = rng();
        let mut reg = DropRegistry::new();
        reg.clear();
        assert!(reg.is_empty());

        create(&mut reg, &mut rng, 0);
        create(&mut reg, &mut rng, 1);
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.head(), None);
        reg.clear();
        assert!(reg.is_empty());
    }

    #[test]
    fn stale_handles_miss_after_slot_reuse() {
        let mut rng = rng();
        let mut reg = DropRegistry::new();
        let a = create(&mut reg, &mut rng, 0);
        reg.remove(a);

        // reuses the freed slot, but under a newer generation
        let b = create(&mut reg, &mut rng, 9);
        assert!(reg.get(a).is_none());
        assert!(reg.remove(a).is_none());
        assert_eq!(reg.get(b).unwrap().column, 9);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn freed_slots_are_reused_before_growing() {
        let mut rng = rng();
        let mut reg = DropRegistry::new();
        let a = create(&mut reg, &mut rng, 0);
        reg.remove(a);
        let _ = create(&mut reg, &mut rng, 1);
        assert_eq!(reg.slots.len(), 1);
    }

    #[test]
    fn counters_track_lifecycle_and_high_water() {
        let mut rng = rng();
        let mut reg = DropRegistry::new();
        let a = create(&mut reg, &mut rng, 0);
        let _b = create(&mut reg, &mut rng, 1);
        let _c = create(&mut reg, &mut rng, 2);
        reg.remove(a);
        let _d = create(&mut reg, &mut rng, 3);
        reg.clear();

        let s = reg.stats();
        assert_eq!(s.created, 4);
        assert_eq!(s.destroyed, 4);
        assert_eq!(s.high_water, 3);
    }

    #[test]
    fn length_is_clamped_on_degenerate_geometry() {
        let mut rng = rng();
        let mut reg = DropRegistry::new();
        for _ in 0..32 {
            let h = reg.create(0, 2, 0.06, &mut rng).unwrap();
            let d = reg.get(h).unwrap();
            assert_eq!(d.length, MIN_HEIGHT);
            assert_eq!(d.row, SPAWN_ROW);
            reg.remove(h);
        }
    }

    #[test]
    fn length_stays_within_configured_range() {
        let mut rng = rng();
        let mut reg = DropRegistry::new();
        for _ in 0..256 {
            let h = reg.create(0, 40, 0.5, &mut rng).unwrap();
            let len = reg.get(h).unwrap().length;
            assert!((MIN_HEIGHT..=20).contains(&len), "length {} out of range", len);
            reg.remove(h);
        }
    }
}
