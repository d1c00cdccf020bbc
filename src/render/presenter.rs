// Presenter-facing view: speaker notes and where we are in the deck

use std::fmt;

use crate::content::Deck;
use crate::nav::{Navigator, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct PresenterView {
    pub position: Position,
    pub fragment_total: usize,
    pub title: Option<String>,
    pub notes: Vec<String>,
    /// Title of the slide the next stop lands on
    pub next_title: Option<String>,
    pub is_last: bool,
}

impl PresenterView {
    pub fn new(deck: &Deck, position: Position) -> Option<Self> {
        let leaf = deck.leaf(position.h, position.v)?;

        let mut lookahead = Navigator::new(deck);
        lookahead.goto(position.h, position.v);
        let next = if lookahead.down().changed() || lookahead.right().changed() {
            let p = lookahead.position();
            deck.leaf(p.h, p.v)
        } else {
            None
        };

        Some(Self {
            position,
            fragment_total: leaf.fragment_count(),
            title: leaf.title().map(str::to_string),
            notes: leaf.notes().into_iter().map(str::to_string).collect(),
            next_title: next.and_then(|l| l.title()).map(str::to_string),
            is_last: next.is_none(),
        })
    }

    /// Views for every leaf slide, on entry
    pub fn all(deck: &Deck) -> Vec<Self> {
        deck.leaves()
            .filter_map(|(h, v, _)| Self::new(deck, Position { h, v, step: 0 }))
            .collect()
    }
}

impl fmt::Display for PresenterView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Position { h, v, step } = self.position;
        write!(f, "[{}.{}] {}", h + 1, v + 1, self.title.as_deref().unwrap_or("(untitled)"))?;
        if self.fragment_total > 0 {
            write!(f, "  ({}/{} revealed)", step, self.fragment_total)?;
        }
        writeln!(f)?;
        for note in &self.notes {
            writeln!(f, "  note: {}", note)?;
        }
        match (&self.next_title, self.is_last) {
            (_, true) => writeln!(f, "  next: end of deck"),
            (Some(title), false) => writeln!(f, "  next: {}", title),
            (None, false) => writeln!(f, "  next: (untitled)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentNode, Group, LeafSlide, Slide};

    fn titled(title: &str, extra: Vec<ContentNode>) -> LeafSlide {
        let mut content = vec![ContentNode::heading(4, title).unwrap()];
        content.extend(extra);
        LeafSlide::new(content)
    }

    fn deck() -> Deck {
        Deck::new(
            vec![],
            vec![
                Slide::Leaf(titled(
                    "Intro",
                    vec![
                        ContentNode::note("say hello"),
                        ContentNode::fragment(vec![ContentNode::note("hidden but listed")]),
                    ],
                )),
                Slide::Group(Group {
                    options: vec![],
                    slides: vec![titled("Inner one", vec![]), titled("Inner two", vec![])],
                }),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_notes_and_next() {
        let deck = deck();
        let view = PresenterView::new(&deck, Position::default()).unwrap();
        assert_eq!(view.title.as_deref(), Some("Intro"));
        assert_eq!(view.notes, vec!["say hello", "hidden but listed"]);
        assert_eq!(view.next_title.as_deref(), Some("Inner one"));
        assert_eq!(view.fragment_total, 1);

        let inner = PresenterView::new(&deck, Position { h: 1, v: 0, step: 0 }).unwrap();
        assert_eq!(inner.next_title.as_deref(), Some("Inner two"));

        let last = PresenterView::new(&deck, Position { h: 1, v: 1, step: 0 }).unwrap();
        assert!(last.is_last);
        assert!(PresenterView::new(&deck, Position { h: 5, v: 0, step: 0 }).is_none());
    }

    #[test]
    fn test_display() {
        let deck = deck();
        let text = PresenterView::new(&deck, Position { h: 0, v: 0, step: 1 })
            .unwrap()
            .to_string();
        assert_eq!(
            text,
            "[1.1] Intro  (1/1 revealed)\n  note: say hello\n  note: hidden but listed\n  next: Inner one\n"
        );
        assert_eq!(PresenterView::all(&deck).len(), 3);
    }
}
