use std::fs;

use deck::content::ContentNode;
use deck::render::pdf::export_to_pdf;
use deck::render::{resolve_deck, resolve_frame, FrameSelection, PresenterView, ResolveConfig, ResolvedBlock};
use deck::{parse_deck, talk, Deck, Error, Move, Navigator, Position, Slide};
use indoc::indoc;

fn fixture(name: &str) -> Deck {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    let content = fs::read_to_string(path).expect("Failed to read test fixture");
    parse_deck(&content).expect("fixture should parse")
}

fn has_note(nodes: &[ContentNode]) -> bool {
    nodes.iter().any(|node| match node {
        ContentNode::Note(_) => true,
        ContentNode::List(children)
        | ContentNode::ListItem { children, .. }
        | ContentNode::Fragment(children) => has_note(children),
        _ => false,
    })
}

#[test]
fn test_parse_simple_deck() {
    let deck = fixture("simple.deck");
    assert_eq!(deck.options, vec!["center", "text-align=center"]);
    assert_eq!(deck.slides().len(), 3);
    assert_eq!(deck.slides()[0].options(), ["black"]);

    let steps = deck.leaf(1, 0).unwrap();
    assert_eq!(steps.title(), Some("Three steps"));
    assert_eq!(steps.fragment_count(), 3);
    assert_eq!(steps.notes(), vec!["take it slowly"]);
}

#[test]
fn test_parse_complex_deck() {
    let deck = fixture("complex.deck");
    assert_eq!(deck.slides().len(), 3);

    let Slide::Group(group) = &deck.slides()[1] else {
        panic!("second slide should be a group");
    };
    assert_eq!(group.slides.len(), 3);
    assert_eq!(deck.effective_options(1, 0), vec!["bottom", "top"]);

    let crates = deck.leaf(1, 0).unwrap();
    assert_eq!(crates.notes(), vec!["mention cargo"]);
    assert_eq!(crates.fragment_count(), 1);

    let code = deck.leaf(1, 1).unwrap();
    assert!(code.content.iter().any(|node| matches!(
        node,
        ContentNode::CodeBlock { lang: Some(lang), code }
            if lang == "rust" && code.contains("    // -- not a slide header\n")
    )));

    assert_eq!(deck.leaf(0, 0).unwrap().notes(), vec!["Introduce yourself and the topic."]);
    let last = deck.leaf(2, 0).unwrap();
    assert_eq!(last.title(), None);
    assert_eq!(last.fragment_count(), 2);
    assert_eq!(last.notes(), vec!["hidden note"]);
}

#[test]
fn test_top_level_slides_visited_once_in_order() {
    let deck = talk::deck().unwrap();
    let mut nav = Navigator::new(&deck);
    let mut visited = vec![nav.position().h];
    while nav.right().changed() {
        visited.push(nav.position().h);
    }
    assert_eq!(visited, (0..deck.slides().len()).collect::<Vec<_>>());
    assert_eq!(visited.len(), 10);
}

#[test]
fn test_advance_visits_every_sub_slide_before_moving_on() {
    let deck = talk::deck().unwrap();
    let mut nav = Navigator::new(&deck);
    nav.goto(4, 0);

    let mut stops = vec![(4, 0)];
    while nav.position().h == 4 {
        if let Move::Slide(p) = nav.advance() {
            stops.push((p.h, p.v));
        }
    }
    let expected: Vec<_> = (0..10).map(|v| (4, v)).chain([(5, 0)]).collect();
    assert_eq!(stops, expected);
}

#[test]
fn test_notes_only_reach_the_presenter() {
    let deck = talk::deck().unwrap();
    let mut notes_seen = 0;
    for (h, v, leaf) in deck.leaves() {
        let view = PresenterView::new(&deck, Position { h, v, step: 0 }).unwrap();
        assert_eq!(view.notes, leaf.notes());
        notes_seen += view.notes.len();
        for step in 0..=leaf.fragment_count() {
            assert!(!has_note(&leaf.visible(step)), "note visible on {}.{}", h, v);
        }
    }
    assert!(notes_seen > 0);
}

#[test]
fn test_forward_navigation_never_hides_fragments() {
    let deck = talk::deck().unwrap();
    let mut nav = Navigator::new(&deck);
    let mut last = nav.position();
    assert_eq!(last.step, 0);
    loop {
        match nav.advance() {
            Move::Revealed(step) => assert_eq!(step, last.step + 1),
            Move::Slide(p) => assert_eq!(p.step, 0),
            Move::Hidden(_) => panic!("advance hid a fragment"),
            Move::Stay => break,
        }
        last = nav.position();
    }
    assert_eq!((last.h, last.v), (9, 0));
}

#[test]
fn test_three_fragments_reveal_one_per_advance() {
    let deck = fixture("simple.deck");
    let config = ResolveConfig::default();
    let mut nav = Navigator::new(&deck);
    nav.goto(1, 0);

    let paragraphs = |position| {
        resolve_frame(&deck, position, &config)
            .unwrap()
            .blocks
            .len()
            - 1
    };
    assert_eq!(paragraphs(nav.position()), 0);
    for expected in 1..=3 {
        assert_eq!(nav.advance(), Move::Revealed(expected));
        assert_eq!(paragraphs(nav.position()), expected);
    }
    assert_eq!(nav.advance(), Move::Slide(Position { h: 2, v: 0, step: 0 }));
}

#[test]
fn test_half_width_image() {
    let deck = fixture("complex.deck");
    let config = ResolveConfig::default();
    let frame = resolve_frame(&deck, Position { h: 1, v: 2, step: 0 }, &config).unwrap();
    let widths: Vec<_> = frame
        .blocks
        .iter()
        .filter_map(|block| match block {
            ResolvedBlock::Image { width, exists, .. } => {
                assert!(!exists);
                *width
            }
            _ => None,
        })
        .collect();
    let content = config.dimensions.content_width();
    assert_eq!(widths, vec![content * 0.5, content * 0.25]);
}

#[test]
fn test_parse_errors_carry_lines() {
    let mixed = parse_deck(indoc! {"
        --
        content
        ---
        sub
    "});
    assert!(matches!(mixed, Err(Error::MixedSlide { line: 1 })));

    let orphan = parse_deck("---\nsub\n");
    assert!(matches!(orphan, Err(Error::OrphanSubSlide { line: 1 })));

    let unclosed = parse_deck(indoc! {"
        --
        ```rust
        fn main() {}
    "})
    .unwrap_err();
    assert_eq!(unclosed.line(), Some(2));

    assert!(matches!(
        parse_deck("--\n![wide](a.png)\n"),
        Err(Error::InvalidWidth(_))
    ));
    assert!(matches!(parse_deck("# only a comment\n"), Err(Error::EmptyDeck)));
}

#[test]
fn test_export_pdf() {
    let deck = fixture("complex.deck");
    let config = ResolveConfig::default();
    let dir = tempfile::tempdir().unwrap();

    let each_step = resolve_deck(&deck, &config, FrameSelection::EachStep);
    assert_eq!(each_step.frames.len(), 1 + 2 + 1 + 1 + 3);
    let path = dir.path().join("complex.pdf");
    export_to_pdf(&each_step, "complex", &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_talk_code_is_highlighted() {
    let deck = talk::deck().unwrap();
    let config = ResolveConfig::default();
    let resolved = resolve_deck(&deck, &config, FrameSelection::FullyRevealed);

    let rust_blocks: Vec<_> = resolved
        .frames
        .iter()
        .flat_map(|frame| &frame.blocks)
        .filter(|block| matches!(block, ResolvedBlock::Code { lang: Some(lang), .. } if lang == "rust"))
        .collect();
    assert!(!rust_blocks.is_empty());
    for block in rust_blocks {
        let ResolvedBlock::Code { lines, .. } = block else {
            unreachable!()
        };
        let first = lines.iter().flatten().next().unwrap().color;
        assert!(lines.iter().flatten().any(|token| token.color != first));
    }
}
