use std::collections::{HashSet, VecDeque};

use super::types::{Direction, Point};

/// Head-first body with a set mirror for O(1) occupancy checks.
#[derive(Clone, Debug)]
pub struct Snake {
    pub body: VecDeque<Point>,
    pub body_set: HashSet<Point>,
    pub direction: Direction,
    pub pending_direction: Option<Direction>,
}

impl Snake {
    pub fn new(start_pos: Point, direction: Direction) -> Self {
        let mut body = VecDeque::new();
        let mut body_set = HashSet::new();
        body.push_back(start_pos);
        body_set.insert(start_pos);

        Self {
            body,
            body_set,
            direction,
            pending_direction: None,
        }
    }

    /// Builds a snake from explicit segments, head first. Returns `None` for an
    /// empty body or one with repeated cells.
    pub fn from_segments(segments: &[Point], direction: Direction) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        let body: VecDeque<Point> = segments.iter().copied().collect();
        let body_set: HashSet<Point> = segments.iter().copied().collect();
        if body_set.len() != body.len() {
            return None;
        }
        Some(Self {
            body,
            body_set,
            direction,
            pending_direction: None,
        })
    }

    pub fn head(&self) -> Point {
        *self.body.front().expect("Snake body should never be empty")
    }

    pub fn tail(&self) -> Point {
        *self.body.back().expect("Snake body should never be empty")
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, point: &Point) -> bool {
        self.body_set.contains(point)
    }

    /// Makes the pending turn current. Called once at the start of a tick.
    pub fn apply_pending_direction(&mut self) {
        if let Some(new_direction) = self.pending_direction.take() {
            self.direction = new_direction;
        }
    }

    pub fn push_head(&mut self, head: Point) {
        self.body.push_front(head);
        self.body_set.insert(head);
    }

    pub fn drop_tail(&mut self) {
        if self.body.len() <= 1 {
            return;
        }
        if let Some(tail) = self.body.pop_back()
            && !self.body.contains(&tail)
        {
            self.body_set.remove(&tail);
        }
    }
}
