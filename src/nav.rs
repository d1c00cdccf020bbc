// Navigation cursor over a deck: horizontal top-level slides, vertical
// sub-slides within a group, and fragment steps within a leaf slide

use crate::content::Deck;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Top-level slide
    pub h: usize,
    /// Sub-slide within a group, 0 for plain slides
    pub v: usize,
    /// Fragments revealed so far
    pub step: usize,
}

/// What a navigation request changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Revealed(usize),
    Hidden(usize),
    Slide(Position),
    Stay,
}

impl Move {
    pub fn changed(self) -> bool {
        self != Move::Stay
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    /// Fragment count of every leaf, indexed [h][v]
    fragments: Vec<Vec<usize>>,
    position: Position,
}

impl Navigator {
    pub fn new(deck: &Deck) -> Self {
        let fragments = deck
            .slides()
            .iter()
            .map(|slide| slide.leaves().iter().map(|leaf| leaf.fragment_count()).collect())
            .collect();
        Self {
            fragments,
            position: Position::default(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Fragments on the current leaf
    pub fn fragment_total(&self) -> usize {
        self.fragments_at(self.position.h, self.position.v)
    }

    pub fn top_level_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn sub_slide_count(&self, h: usize) -> usize {
        self.fragments.get(h).map_or(0, Vec::len)
    }

    fn fragments_at(&self, h: usize, v: usize) -> usize {
        self.fragments
            .get(h)
            .and_then(|leaves| leaves.get(v))
            .copied()
            .unwrap_or(0)
    }

    fn move_to(&mut self, h: usize, v: usize, step: usize) -> Move {
        let target = Position { h, v, step };
        if target == self.position {
            return Move::Stay;
        }
        self.position = target;
        Move::Slide(target)
    }

    /// Next stop in reading order, if any
    fn next_stop(&self) -> Option<(usize, usize)> {
        let Position { h, v, .. } = self.position;
        if v + 1 < self.sub_slide_count(h) {
            Some((h, v + 1))
        } else if h + 1 < self.top_level_count() {
            Some((h + 1, 0))
        } else {
            None
        }
    }

    fn previous_stop(&self) -> Option<(usize, usize)> {
        let Position { h, v, .. } = self.position;
        if v > 0 {
            Some((h, v - 1))
        } else if h > 0 {
            Some((h - 1, self.sub_slide_count(h - 1).saturating_sub(1)))
        } else {
            None
        }
    }

    /// Reveal the next fragment, or move to the next stop once all are shown
    pub fn advance(&mut self) -> Move {
        if self.position.step < self.fragment_total() {
            self.position.step += 1;
            return Move::Revealed(self.position.step);
        }
        match self.next_stop() {
            Some((h, v)) => self.move_to(h, v, 0),
            None => Move::Stay,
        }
    }

    /// Hide the last fragment, or go back to the previous stop fully revealed
    pub fn retreat(&mut self) -> Move {
        if self.position.step > 0 {
            self.position.step -= 1;
            return Move::Hidden(self.position.step);
        }
        match self.previous_stop() {
            Some((h, v)) => {
                let step = self.fragments_at(h, v);
                self.move_to(h, v, step)
            }
            None => Move::Stay,
        }
    }

    pub fn right(&mut self) -> Move {
        let h = self.position.h + 1;
        if h < self.top_level_count() {
            self.move_to(h, 0, 0)
        } else {
            Move::Stay
        }
    }

    pub fn left(&mut self) -> Move {
        match self.position.h.checked_sub(1) {
            Some(h) => self.move_to(h, 0, 0),
            None => Move::Stay,
        }
    }

    pub fn down(&mut self) -> Move {
        let Position { h, v, .. } = self.position;
        if v + 1 < self.sub_slide_count(h) {
            self.move_to(h, v + 1, 0)
        } else {
            Move::Stay
        }
    }

    pub fn up(&mut self) -> Move {
        let Position { h, v, .. } = self.position;
        match v.checked_sub(1) {
            Some(v) => self.move_to(h, v, 0),
            None => Move::Stay,
        }
    }

    pub fn first(&mut self) -> Move {
        self.move_to(0, 0, 0)
    }

    pub fn last(&mut self) -> Move {
        let h = self.top_level_count().saturating_sub(1);
        let v = self.sub_slide_count(h).saturating_sub(1);
        self.move_to(h, v, 0)
    }

    /// Jump to a leaf; out-of-range positions leave the cursor where it is
    pub fn goto(&mut self, h: usize, v: usize) -> Move {
        if v < self.sub_slide_count(h) {
            self.move_to(h, v, 0)
        } else {
            Move::Stay
        }
    }
}
