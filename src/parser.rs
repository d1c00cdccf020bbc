// Deck source grammar, pinpoint style with one level of nesting:
//
//   deck     := settings slide*
//   settings := ( comment | whitespace | "[" option "]" )*
//   slide    := header body
//   header   := ( "---" | "--" ) ( "[" option "]" )* comment? eol
//   body     := every line up to the next one starting with "--", skipping
//               over ``` fences
//
// "--" opens a top-level slide, "---" a sub-slide of the last top-level
// slide. Body lines are parsed into content blocks by `Blocks`.

use log::debug;
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while_m_n},
    character::complete::{line_ending, multispace1, not_line_ending, space0, space1},
    combinator::{eof, map, opt, recognize, rest, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::content::{ContentNode, Deck, Group, LeafSlide, Proportion, Slide, SlideOptions};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Depth {
    Top,
    Nested,
}

fn option(input: &str) -> IResult<&str, &str> {
    preceded(space0, delimited(tag("["), is_not("]\n"), tag("]")))(input)
}

fn whitespace_or_comment(input: &str) -> IResult<&str, &str> {
    let (input, _) = many0(alt((
        multispace1,
        preceded(tag("#"), terminated(not_line_ending, alt((line_ending, eof)))),
    )))(input)?;
    Ok((input, ""))
}

fn settings(input: &str) -> IResult<&str, SlideOptions> {
    let (input, options) = terminated(
        many0(preceded(whitespace_or_comment, option)),
        whitespace_or_comment,
    )(input)?;

    let options = options.iter().map(|s| s.to_string()).collect();
    Ok((input, options))
}

// Slide headers look like "-- [a] [b] # comment\n"
fn header(input: &str) -> IResult<&str, (Depth, SlideOptions)> {
    let (input, depth) = alt((
        value(Depth::Nested, tag("---")),
        value(Depth::Top, tag("--")),
    ))(input)?;
    let (input, options) = many0(option)(input)?;
    let (input, _) = tuple((
        space0,
        opt(preceded(tag("#"), not_line_ending)),
        alt((line_ending, eof)),
    ))(input)?;

    let options = options.iter().map(|s| s.to_string()).collect();
    Ok((input, (depth, options)))
}

fn line(input: &str) -> IResult<&str, &str> {
    recognize(terminated(not_line_ending, opt(line_ending)))(input)
}

fn body(input: &str) -> IResult<&str, &str> {
    let mut remaining = input;
    let mut in_fence = false;
    while !remaining.is_empty() {
        let (rest, current) = line(remaining)?;
        if in_fence {
            // Only a bare fence closes, as in `Blocks::code_block`
            in_fence = current.trim() != "```";
        } else if current.starts_with("--") {
            break;
        } else {
            in_fence = opens_fence(current);
        }
        remaining = rest;
    }
    let consumed = input.len() - remaining.len();
    Ok((remaining, &input[..consumed]))
}

fn slide(input: &str) -> IResult<&str, (Depth, SlideOptions, &str)> {
    let (input, (depth, options)) = header(input)?;
    let (input, body) = body(input)?;
    Ok((input, (depth, options, body)))
}

/// Kinds of `:::` blocks
#[derive(Debug, Clone, Copy, PartialEq)]
enum BlockKind {
    Fragment,
    Note,
}

/// What a single trimmed body line introduces
#[derive(Debug, Clone, PartialEq)]
enum Line<'a> {
    Fragment(&'a str),
    Fence(Option<&'a str>),
    Open(BlockKind),
    Close,
    Heading(u8, &'a str),
    Item(&'a str),
    Quote(&'a str),
    Image(&'a str, &'a str),
    Note(&'a str),
    Text(&'a str),
}

fn fence(input: &str) -> IResult<&str, Option<&str>> {
    map(preceded(tag("```"), rest), |lang: &str| {
        let lang = lang.trim();
        (!lang.is_empty()).then_some(lang)
    })(input)
}

fn block_open(input: &str) -> IResult<&str, BlockKind> {
    delimited(
        pair(tag(":::"), space0),
        alt((
            value(BlockKind::Fragment, tag("fragment")),
            value(BlockKind::Note, tag("note")),
        )),
        pair(space0, eof),
    )(input)
}

fn heading(input: &str) -> IResult<&str, (&str, &str)> {
    pair(
        take_while_m_n(1, 6, |c| c == '#'),
        alt((preceded(space1, rest), eof)),
    )(input)
}

// ![50%](docx_app.jpg), the alt text holds the optional width
fn image(input: &str) -> IResult<&str, (&str, &str)> {
    terminated(
        pair(
            preceded(tag("!["), take_until("]")),
            delimited(tag("]("), take_until(")"), tag(")")),
        ),
        pair(space0, eof),
    )(input)
}

fn classify(line: &str) -> Line<'_> {
    let parsed: IResult<&str, Line<'_>> = alt((
        map(preceded(pair(tag("+"), space1), rest), Line::Fragment),
        map(fence, Line::Fence),
        map(block_open, Line::Open),
        map(terminated(tag(":::"), pair(space0, eof)), |_| Line::Close),
        map(heading, |(hashes, text)| Line::Heading(hashes.len() as u8, text)),
        map(preceded(pair(tag("-"), space1), rest), Line::Item),
        map(preceded(pair(tag(">"), space0), rest), Line::Quote),
        map(image, |(alt, src)| Line::Image(alt, src)),
        map(preceded(pair(tag("note:"), space0), rest), Line::Note),
    ))(line);
    parsed.map_or(Line::Text(line), |(_, kind)| kind)
}

fn opens_fence(line: &str) -> bool {
    match classify(line.trim()) {
        Line::Fence(_) => true,
        Line::Fragment(inner) => matches!(classify(inner), Line::Fence(_)),
        _ => false,
    }
}

fn as_text(line: Line<'_>) -> Option<&str> {
    match line {
        Line::Text(text) => Some(text),
        _ => None,
    }
}

fn as_quote(line: Line<'_>) -> Option<&str> {
    match line {
        Line::Quote(text) => Some(text),
        _ => None,
    }
}

/// Cursor over the lines of one slide body
struct Blocks<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    first_line: usize,
}

impl<'a> Blocks<'a> {
    fn new(body: &'a str, first_line: usize) -> Self {
        Self {
            lines: body.lines().collect(),
            pos: 0,
            first_line,
        }
    }

    fn line_no(&self) -> usize {
        self.first_line + self.pos
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    /// Parse blocks until the end of the body, or until `:::` when
    /// `closing` names the block being closed
    fn parse(&mut self, closing: Option<(&'static str, usize)>) -> Result<Vec<ContentNode>> {
        let mut nodes = Vec::new();
        while let Some(raw) = self.peek() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                self.pos += 1;
                continue;
            }
            if closing.is_some() && classify(trimmed) == Line::Close {
                self.pos += 1;
                return Ok(nodes);
            }
            let line_no = self.line_no();
            self.pos += 1;
            let node = self.block(classify(trimmed), line_no)?;
            push_node(&mut nodes, node);
        }
        match closing {
            Some((kind, line)) => Err(Error::Unclosed { kind, line }),
            None => Ok(nodes),
        }
    }

    fn block(&mut self, line: Line<'a>, line_no: usize) -> Result<ContentNode> {
        let node = match line {
            Line::Fragment(inner) => {
                let inner = match classify(inner) {
                    Line::Text(text) => ContentNode::paragraph(text.trim()),
                    Line::Quote(text) => ContentNode::BlockQuote(text.trim().to_string()),
                    other => self.block(other, line_no)?,
                };
                ContentNode::Fragment(vec![inner])
            }
            Line::Fence(lang) => self.code_block(lang, line_no)?,
            Line::Open(BlockKind::Fragment) => {
                ContentNode::Fragment(self.parse(Some(("fragment block", line_no)))?)
            }
            Line::Open(BlockKind::Note) => ContentNode::Note(self.note_block(line_no)?),
            Line::Close => {
                return Err(Error::Parse {
                    line: line_no,
                    message: "`:::` without an open block".to_string(),
                })
            }
            Line::Heading(level, text) => ContentNode::heading(level, text.trim())?,
            Line::Item(text) => {
                let mut children = Vec::new();
                while let Some(note) = self.item_note() {
                    children.push(ContentNode::note(note));
                }
                ContentNode::ListItem {
                    text: text.trim().to_string(),
                    children,
                }
            }
            Line::Quote(text) => ContentNode::BlockQuote(self.joined(text, as_quote)),
            Line::Image(alt, src) => {
                let alt = alt.trim();
                let width = if alt.is_empty() {
                    None
                } else {
                    Some(Proportion::parse(alt)?)
                };
                ContentNode::image(src.trim(), width)
            }
            Line::Note(text) => ContentNode::note(text.trim()),
            Line::Text(text) => ContentNode::Paragraph(self.joined(text, as_text)),
        };
        Ok(node)
    }

    /// Join `first` with the following lines of the same kind
    fn joined(&mut self, first: &str, same_kind: fn(Line<'_>) -> Option<&str>) -> String {
        let mut text = first.trim().to_string();
        while let Some(next) = self.peek().and_then(|raw| same_kind(classify(raw.trim()))) {
            text.push(' ');
            text.push_str(next.trim());
            self.pos += 1;
        }
        text
    }

    // An indented "note:" line directly under a list item belongs to it
    fn item_note(&mut self) -> Option<&'a str> {
        let raw = self.peek()?;
        if !raw.starts_with([' ', '\t']) {
            return None;
        }
        match classify(raw.trim()) {
            Line::Note(text) => {
                self.pos += 1;
                Some(text.trim())
            }
            _ => None,
        }
    }

    fn code_block(&mut self, lang: Option<&str>, open_line: usize) -> Result<ContentNode> {
        let mut code: Vec<&str> = Vec::new();
        while let Some(raw) = self.peek() {
            self.pos += 1;
            if raw.trim() == "```" {
                return Ok(ContentNode::code(lang, code.join("\n")));
            }
            code.push(raw);
        }
        Err(Error::Unclosed {
            kind: "code fence",
            line: open_line,
        })
    }

    fn note_block(&mut self, open_line: usize) -> Result<String> {
        let mut words: Vec<&str> = Vec::new();
        while let Some(raw) = self.peek() {
            self.pos += 1;
            let trimmed = raw.trim();
            if classify(trimmed) == Line::Close {
                return Ok(words.join(" "));
            }
            if !trimmed.is_empty() {
                words.push(trimmed);
            }
        }
        Err(Error::Unclosed {
            kind: "note block",
            line: open_line,
        })
    }
}

// Consecutive list items, revealed or not, share one list
fn push_node(nodes: &mut Vec<ContentNode>, node: ContentNode) {
    let is_item = match &node {
        ContentNode::ListItem { .. } => true,
        ContentNode::Fragment(children) => {
            matches!(children.as_slice(), [ContentNode::ListItem { .. }])
        }
        _ => false,
    };
    if !is_item {
        nodes.push(node);
        return;
    }
    match nodes.last_mut() {
        Some(ContentNode::List(items)) => items.push(node),
        _ => nodes.push(ContentNode::List(vec![node])),
    }
}

/// Parse the lines of one slide body into content nodes
pub fn parse_blocks(body: &str, first_line: usize) -> Result<Vec<ContentNode>> {
    Blocks::new(body, first_line).parse(None)
}

fn line_number(source: &str, remaining: &str) -> usize {
    let consumed = source.len().saturating_sub(remaining.len());
    source[..consumed].matches('\n').count() + 1
}

fn nom_error(source: &str, err: nom::Err<nom::error::Error<&str>>) -> Error {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => Error::Parse {
            line: line_number(source, e.input),
            message: format!(
                "expected a slide header, found {:?}",
                e.input.lines().next().unwrap_or_default()
            ),
        },
        nom::Err::Incomplete(_) => Error::Parse {
            line: line_number(source, ""),
            message: "incomplete input".to_string(),
        },
    }
}

struct PendingSlide {
    options: SlideOptions,
    content: Vec<ContentNode>,
    children: Vec<LeafSlide>,
}

impl PendingSlide {
    fn finish(self) -> Slide {
        if self.children.is_empty() {
            Slide::Leaf(LeafSlide {
                options: self.options,
                content: self.content,
            })
        } else {
            Slide::Group(Group {
                options: self.options,
                slides: self.children,
            })
        }
    }
}

pub fn parse_deck(source: &str) -> Result<Deck> {
    let (mut input, global_options) = settings(source).map_err(|e| nom_error(source, e))?;
    let mut pending: Vec<(usize, PendingSlide)> = Vec::new();

    while !input.is_empty() {
        let header_line = line_number(source, input);
        let (rest, (depth, options, body)) = slide(input).map_err(|e| nom_error(source, e))?;
        let content = parse_blocks(body, header_line + 1)?;

        match depth {
            Depth::Top => pending.push((
                header_line,
                PendingSlide {
                    options,
                    content,
                    children: Vec::new(),
                },
            )),
            Depth::Nested => {
                let (top_line, top) = pending
                    .last_mut()
                    .ok_or(Error::OrphanSubSlide { line: header_line })?;
                if !top.content.is_empty() {
                    return Err(Error::MixedSlide { line: *top_line });
                }
                top.children.push(LeafSlide { options, content });
            }
        }
        input = rest;
    }

    let slides: Vec<Slide> = pending.into_iter().map(|(_, p)| p.finish()).collect();
    debug!(
        "parsed deck with {} top-level slides and {} global options",
        slides.len(),
        global_options.len()
    );
    Deck::new(global_options, slides)
}

#[cfg(test)]
mod tests {

    use super::*;
    use indoc::indoc;

    #[test]
    fn test_whitespace_or_comment() {
        assert_eq!(whitespace_or_comment(""), Ok(("", "")));
        assert_eq!(whitespace_or_comment(" "), Ok(("", "")));
        assert_eq!(whitespace_or_comment("    "), Ok(("", "")));
        assert_eq!(whitespace_or_comment(" # hmm\n"), Ok(("", "")));
        assert_eq!(whitespace_or_comment("# hmm\n"), Ok(("", "")));
        assert_eq!(whitespace_or_comment("# no newline"), Ok(("", "")));
        assert_eq!(whitespace_or_comment("\n\n"), Ok(("", "")));
    }

    #[test]
    fn test_settings() {
        assert_eq!(settings(""), Ok(("", vec![])));
        assert_eq!(
            settings("# deck\n[center] [text-align=center]\n--"),
            Ok((
                "--",
                vec!["center".to_string(), "text-align=center".to_string()]
            ))
        );
    }

    #[test]
    fn header_test() {
        assert_eq!(header("--\n"), Ok(("", (Depth::Top, vec![]))));
        assert_eq!(
            header("-- [a]\n"),
            Ok(("", (Depth::Top, vec!["a".to_string()])))
        );
        assert_eq!(
            header("-- [a]  [c] # Plus a comment\n"),
            Ok(("", (Depth::Top, vec!["a".to_string(), "c".to_string()])))
        );
        assert_eq!(
            header("--- [top]\nbody"),
            Ok(("body", (Depth::Nested, vec!["top".to_string()])))
        );
        assert_eq!(header("---"), Ok(("", (Depth::Nested, vec![]))));
        assert!(header("----\n").is_err());
    }

    #[test]
    fn body_test() {
        assert_eq!(
            body("stuff\nand\nthings\n--"),
            Ok(("--", "stuff\nand\nthings\n"))
        );
        assert_eq!(
            body("```sql\n-- a comment\n```\n--- next"),
            Ok(("--- next", "```sql\n-- a comment\n```\n"))
        );
        assert_eq!(body("no newline"), Ok(("", "no newline")));
        // A fence with an info string inside a block does not close it
        assert_eq!(
            body("```sql\n```text\n-- still code\n```\n-- next"),
            Ok(("-- next", "```sql\n```text\n-- still code\n```\n"))
        );
    }

    #[test]
    fn classify_test() {
        assert_eq!(classify("#### Who am I?"), Line::Heading(4, "Who am I?"));
        assert_eq!(classify("####### seven"), Line::Text("####### seven"));
        assert_eq!(classify("#hashtag"), Line::Text("#hashtag"));
        assert_eq!(classify("####"), Line::Heading(4, ""));
        assert_eq!(classify("- item"), Line::Item("item"));
        assert_eq!(classify("+ - item"), Line::Fragment("- item"));
        assert_eq!(classify("+1 for this"), Line::Text("+1 for this"));
        assert_eq!(classify("> quoted"), Line::Quote("quoted"));
        assert_eq!(classify("![50%](app.jpg)"), Line::Image("50%", "app.jpg"));
        assert_eq!(classify("![](jni.svg)"), Line::Image("", "jni.svg"));
        assert_eq!(classify("note: psst"), Line::Note("psst"));
        assert_eq!(classify("```rust"), Line::Fence(Some("rust")));
        assert_eq!(classify("```"), Line::Fence(None));
        assert_eq!(classify("::: fragment"), Line::Open(BlockKind::Fragment));
        assert_eq!(classify(":::note"), Line::Open(BlockKind::Note));
        assert_eq!(classify(":::"), Line::Close);
        assert_eq!(classify("Rust <-------> Android"), Line::Text("Rust <-------> Android"));
    }

    #[test]
    fn blocks_test() {
        let nodes = parse_blocks(
            indoc! {"
                #### Why Rust?
                - always shown
                + - revealed later
                  note: only for the presenter

                Two lines
                of paragraph
                + Bare fragment
            "},
            2,
        )
        .unwrap();

        assert_eq!(
            nodes,
            vec![
                ContentNode::heading(4, "Why Rust?").unwrap(),
                ContentNode::List(vec![
                    ContentNode::item("always shown"),
                    ContentNode::fragment(vec![ContentNode::ListItem {
                        text: "revealed later".into(),
                        children: vec![ContentNode::note("only for the presenter")],
                    }]),
                ]),
                ContentNode::paragraph("Two lines of paragraph"),
                ContentNode::fragment(vec![ContentNode::paragraph("Bare fragment")]),
            ]
        );
    }

    #[test]
    fn empty_heading_stays_a_heading() {
        let nodes = parse_blocks("#### \n", 1).unwrap();
        assert_eq!(nodes, vec![ContentNode::heading(4, "").unwrap()]);
    }

    #[test]
    fn fence_with_info_string_inside_code() {
        let deck = parse_deck("--\n```sql\nSELECT 1;\n```text\n-- not a header\n```\n").unwrap();
        assert_eq!(
            deck.leaf(0, 0).unwrap().content,
            vec![ContentNode::code(Some("sql"), "SELECT 1;\n```text\n-- not a header")]
        );
    }

    #[test]
    fn code_block_is_verbatim() {
        let nodes = parse_blocks(
            "```toml\n  [lib]\n\n  # not a heading\n- not an item\n```\n",
            1,
        )
        .unwrap();
        assert_eq!(
            nodes,
            vec![ContentNode::code(
                Some("toml"),
                "  [lib]\n\n  # not a heading\n- not an item"
            )]
        );
    }

    #[test]
    fn fragment_and_note_blocks() {
        let nodes = parse_blocks(
            indoc! {"
                ::: fragment
                > You have to aim to use
                > native widgets.
                ###### Somebody
                :::
                ::: note
                first line
                second line
                :::
            "},
            1,
        )
        .unwrap();
        assert_eq!(
            nodes,
            vec![
                ContentNode::fragment(vec![
                    ContentNode::BlockQuote("You have to aim to use native widgets.".into()),
                    ContentNode::heading(6, "Somebody").unwrap(),
                ]),
                ContentNode::note("first line second line"),
            ]
        );
    }

    #[test]
    fn unclosed_blocks_report_their_line() {
        let err = parse_blocks("text\n```rust\nfn main() {}\n", 10).unwrap_err();
        assert!(matches!(err, Error::Unclosed { kind: "code fence", line: 11 }));

        let err = parse_blocks("::: fragment\nhello\n", 3).unwrap_err();
        assert!(matches!(err, Error::Unclosed { kind: "fragment block", line: 3 }));

        let err = parse_blocks(":::\n", 1).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn invalid_image_width() {
        let err = parse_blocks("![wide](a.png)", 1).unwrap_err();
        assert!(matches!(err, Error::InvalidWidth(w) if w == "wide"));
    }

    #[test]
    fn deck_test() {
        assert!(matches!(parse_deck(""), Err(Error::EmptyDeck)));
        assert!(matches!(parse_deck("[a]\n"), Err(Error::EmptyDeck)));

        let deck = parse_deck("--\nhello world").unwrap();
        assert!(deck.options.is_empty());
        assert_eq!(
            deck.slides(),
            &[Slide::Leaf(LeafSlide::new(vec![ContentNode::paragraph(
                "hello world"
            )]))]
        );

        let deck =
            parse_deck("[a]\n-- [b] [c] # fishies\nhello world\n-- [d]\nThis is dog\n").unwrap();
        assert_eq!(deck.options, vec!["a".to_string()]);
        assert_eq!(deck.slides().len(), 2);
        assert_eq!(deck.slides()[0].options(), &["b".to_string(), "c".to_string()]);
        assert_eq!(deck.slides()[1].options(), &["d".to_string()]);
    }

    #[test]
    fn nested_deck_test() {
        let deck = parse_deck(indoc! {"
            -- [group]
            --- [first]
            #### One
            ---
            #### Two
            --
            #### After
        "})
        .unwrap();

        assert_eq!(deck.slides().len(), 2);
        match &deck.slides()[0] {
            Slide::Group(group) => {
                assert_eq!(group.options, vec!["group".to_string()]);
                assert_eq!(group.slides.len(), 2);
                assert_eq!(group.slides[0].options, vec!["first".to_string()]);
                assert_eq!(group.slides[1].title(), Some("Two"));
            }
            other => panic!("expected a group, got {:?}", other),
        }
        assert_eq!(deck.leaf(1, 0).and_then(LeafSlide::title), Some("After"));
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(
            parse_deck("--- \nlost\n"),
            Err(Error::OrphanSubSlide { line: 1 })
        ));
        assert!(matches!(
            parse_deck("--\n#### content\n---\nchild\n"),
            Err(Error::MixedSlide { line: 1 })
        ));
        assert!(matches!(
            parse_deck("stray text\n--\nslide\n"),
            Err(Error::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_deck("--\none\n----\ntwo\n"),
            Err(Error::Parse { line: 3, .. })
        ));
        assert!(matches!(parse_deck("# only a comment"), Err(Error::EmptyDeck)));
    }
}
