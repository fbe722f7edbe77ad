// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wailing wall scroll loop.
//!
//! Two sections of bricks crawl right-to-left across the viewport. One
//! section enters from the right edge while the other exits to the left.
//! When a cycle completes the roles swap: the exited section is reset to the
//! right edge and refilled from the next page of names.

use crate::wall::brick::Brick;
use crate::wall::layout::WallLayout;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;

/// Default crawl speed in pixels per second.
pub const DEFAULT_SPEED: f64 = 40.0;

/// Soul names padded and shuffled into fixed-size pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NamePages {
    capacity: usize,
    pages: Vec<Vec<String>>,
}

impl NamePages {
    /// Pad `names` with blanks to a multiple of `capacity`, shuffle once and chunk.
    pub fn new<R: Rng + ?Sized>(mut names: Vec<String>, capacity: usize, rng: &mut R) -> Self {
        let capacity = capacity.max(1);
        let remainder = names.len() % capacity;
        if remainder != 0 {
            names.resize(names.len() + capacity - remainder, String::new());
        }
        names.shuffle(rng);

        let pages = names.chunks(capacity).map(<[String]>::to_vec).collect();
        Self { capacity, pages }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Vec<String>] {
        &self.pages
    }

    /// Page shown on loop iteration `loop_count`, or `None` when there are no names.
    pub fn page_for_loop(&self, loop_count: u64) -> Option<&[String]> {
        if self.pages.is_empty() {
            return None;
        }
        let index = (loop_count % self.pages.len() as u64) as usize;
        Some(&self.pages[index])
    }
}

/// One of the two ring slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    A,
    B,
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }

    fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// A horizontally scrolling band of bricks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub slot: Slot,
    /// Page the bricks were drawn from.
    pub page: Option<usize>,
    pub bricks: Vec<Brick>,
}

/// Offsets of both sections at the current clock value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollFrame {
    pub entering: Slot,
    pub entering_offset: f64,
    pub exiting: Slot,
    pub exiting_offset: f64,
    pub loop_count: u64,
}

/// Two-slot ring of scrolling sections.
#[derive(Debug, Clone)]
pub struct WailingWall {
    layout: WallLayout,
    pages: NamePages,
    speed: f64,
    sections: [Section; 2],
    /// Slot currently entering from the right edge.
    front: Slot,
    loop_count: u64,
    /// Milliseconds into the current cycle.
    elapsed_ms: f64,
}

impl WailingWall {
    /// Build the wall with the first page entering and the last page already on screen.
    pub fn new<R: Rng + ?Sized>(
        layout: WallLayout,
        pages: NamePages,
        speed: f64,
        rng: &mut R,
    ) -> Self {
        let speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            DEFAULT_SPEED
        };
        let total = pages.total_pages() as u64;
        let behind_page = total.saturating_sub(1);
        let sections = [
            build_section(Slot::A, &layout, &pages, 0, rng),
            build_section(Slot::B, &layout, &pages, behind_page, rng),
        ];

        Self {
            layout,
            pages,
            speed,
            sections,
            front: Slot::A,
            loop_count: 0,
            elapsed_ms: 0.0,
        }
    }

    /// Length of one full crawl across the viewport.
    pub fn cycle_ms(&self) -> f64 {
        self.layout.viewport_width / self.speed * 1000.0
    }

    pub fn layout(&self) -> &WallLayout {
        &self.layout
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn loop_count(&self) -> u64 {
        self.loop_count
    }

    pub fn front(&self) -> Slot {
        self.front
    }

    pub fn section(&self, slot: Slot) -> &Section {
        &self.sections[slot.index()]
    }

    pub fn pages(&self) -> &NamePages {
        &self.pages
    }

    /// Advance the clock, swapping roles at each cycle boundary crossed.
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: Duration, rng: &mut R) -> ScrollFrame {
        let cycle = self.cycle_ms();
        if cycle <= 0.0 {
            return self.frame();
        }

        self.elapsed_ms += dt.as_secs_f64() * 1000.0;
        while self.elapsed_ms >= cycle {
            self.elapsed_ms -= cycle;
            self.swap(rng);
        }

        self.frame()
    }

    /// Current offsets without advancing the clock.
    pub fn frame(&self) -> ScrollFrame {
        let width = self.layout.viewport_width;
        let cycle = self.cycle_ms();
        let progress = if cycle > 0.0 {
            (self.elapsed_ms / cycle).clamp(0.0, 1.0)
        } else {
            0.0
        };

        ScrollFrame {
            entering: self.front,
            entering_offset: width * (1.0 - progress),
            exiting: self.front.other(),
            exiting_offset: -width * progress,
            loop_count: self.loop_count,
        }
    }

    fn swap<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.loop_count += 1;
        let exited = self.front.other();
        self.sections[exited.index()] =
            build_section(exited, &self.layout, &self.pages, self.loop_count, rng);
        self.front = exited;

        tracing::trace!(
            loop_count = self.loop_count,
            front = ?self.front,
            "Wailing wall sections swapped"
        );
    }
}

fn build_section<R: Rng + ?Sized>(
    slot: Slot,
    layout: &WallLayout,
    pages: &NamePages,
    loop_count: u64,
    rng: &mut R,
) -> Section {
    let capacity = layout.capacity();
    let page = pages.page_for_loop(loop_count);
    let page_index = page.map(|_| (loop_count % pages.total_pages() as u64) as usize);

    let bricks = (0..capacity)
        .map(|i| {
            let name = page
                .and_then(|names| names.get(i))
                .map(String::as_str)
                .unwrap_or("");
            Brick::new(name, None, rng.gen_bool(0.5), rng)
        })
        .collect();

    Section {
        slot,
        page: page_index,
        bricks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("person {i}")).collect()
    }

    #[test]
    fn test_padding_is_exact_multiple() {
        let mut rng = StdRng::seed_from_u64(9);
        for (n, c) in [(0, 4), (1, 4), (4, 4), (5, 4), (23, 7), (10, 1)] {
            let pages = NamePages::new(names(n), c, &mut rng);
            let padded: usize = pages.pages().iter().map(Vec::len).sum();
            assert_eq!(padded % c, 0, "n={n} c={c}");
            assert!(padded >= n && padded < n + c, "n={n} c={c}");
            assert!(pages.pages().iter().all(|p| p.len() == c));
        }
    }

    #[test]
    fn test_pages_reproduce_padded_set_once() {
        let mut rng = StdRng::seed_from_u64(11);
        let input = names(10);
        let pages = NamePages::new(input.clone(), 4, &mut rng);

        let mut flattened: Vec<String> = pages.pages().concat();
        let mut expected = input;
        expected.resize(12, String::new());
        flattened.sort();
        expected.sort();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_zero_capacity_is_treated_as_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let pages = NamePages::new(names(3), 0, &mut rng);
        assert_eq!(pages.capacity(), 1);
        assert_eq!(pages.total_pages(), 3);
    }

    #[test]
    fn test_page_for_loop_wraps() {
        let mut rng = StdRng::seed_from_u64(2);
        let pages = NamePages::new(names(6), 2, &mut rng);
        assert_eq!(pages.page_for_loop(4), Some(&pages.pages()[1][..]));
        assert_eq!(NamePages::default().page_for_loop(3), None);
    }

    fn wall(n: usize) -> (WailingWall, StdRng) {
        let mut rng = StdRng::seed_from_u64(5);
        let layout = WallLayout::compute(400.0, 84.0, 90.0, 40.0, 2.0);
        let pages = NamePages::new(names(n), layout.capacity(), &mut rng);
        (WailingWall::new(layout, pages, 40.0, &mut rng), rng)
    }

    #[test]
    fn test_offsets_interpolate_linearly() {
        let (mut wall, mut rng) = wall(30);
        assert_eq!(wall.cycle_ms(), 10_000.0);

        let frame = wall.advance(Duration::from_millis(2_500), &mut rng);
        assert_eq!(frame.entering, Slot::A);
        assert_eq!(frame.entering_offset, 300.0);
        assert_eq!(frame.exiting_offset, -100.0);
    }

    #[test]
    fn test_roles_swap_at_cycle_boundary() {
        let (mut wall, mut rng) = wall(30);
        let frame = wall.advance(Duration::from_millis(10_000), &mut rng);

        assert_eq!(frame.loop_count, 1);
        assert_eq!(frame.entering, Slot::B);
        assert_eq!(frame.exiting, Slot::A);
        assert_eq!(frame.entering_offset, 400.0);
        assert_eq!(frame.exiting_offset, 0.0);
        assert_eq!(wall.section(Slot::B).page, Some(1));
    }

    #[test]
    fn test_advance_crosses_several_boundaries() {
        let (mut wall, mut rng) = wall(30);
        let total = wall.pages().total_pages() as u64;
        let frame = wall.advance(Duration::from_millis(35_000), &mut rng);

        assert_eq!(frame.loop_count, 3);
        assert_eq!(frame.entering, Slot::B);
        assert_eq!(wall.section(Slot::B).page, Some((3 % total) as usize));
        assert_eq!(frame.entering_offset, 200.0);
    }

    #[test]
    fn test_empty_names_leave_wall_blank() {
        let (wall, _) = wall(0);
        let section = wall.section(Slot::A);
        assert_eq!(section.page, None);
        assert!(section.bricks.iter().all(|b| b.label.is_none()));
    }
}
