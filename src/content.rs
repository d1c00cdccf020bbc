// Slide content tree: decks, slides and the content nodes inside them

use std::fmt;

use crate::error::{Error, Result};

pub type SlideOptions = Vec<String>;

/// Heading level, always within 1..=6
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub fn new(level: u8) -> Result<Self> {
        if (1..=6).contains(&level) {
            Ok(Self(level))
        } else {
            Err(Error::InvalidHeadingLevel(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        Self::new(level)
    }
}

/// A width expressed as a fraction of the container, in (0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proportion(f32);

impl Proportion {
    pub fn new(fraction: f32) -> Option<Self> {
        (fraction > 0.0 && fraction <= 1.0).then_some(Self(fraction))
    }

    /// Parse a percentage such as "50%" or "12.5%"
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidWidth(text.to_string());
        let number = text.trim().strip_suffix('%').ok_or_else(invalid)?;
        let percent: f32 = number.trim().parse().map_err(|_| invalid())?;
        Self::new(percent / 100.0).ok_or_else(invalid)
    }

    pub fn fraction(self) -> f32 {
        self.0
    }

    /// Width this proportion takes out of `container`
    pub fn of(self, container: f32) -> f32 {
        container * self.0
    }
}

impl fmt::Display for Proportion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0 * 100.0)
    }
}

/// One renderable unit of slide content
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    Heading { level: HeadingLevel, text: String },
    Paragraph(String),
    /// Unordered list. Children are `ListItem`s or `Fragment`s wrapping them.
    List(Vec<ContentNode>),
    ListItem {
        text: String,
        children: Vec<ContentNode>,
    },
    CodeBlock {
        lang: Option<String>,
        code: String,
    },
    BlockQuote(String),
    Image {
        src: String,
        width: Option<Proportion>,
    },
    /// Presenter-only text
    Note(String),
    /// Children are revealed together on one advance
    Fragment(Vec<ContentNode>),
}

impl ContentNode {
    pub fn heading(level: u8, text: impl Into<String>) -> Result<Self> {
        Ok(ContentNode::Heading {
            level: HeadingLevel::new(level)?,
            text: text.into(),
        })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentNode::Paragraph(text.into())
    }

    pub fn item(text: impl Into<String>) -> Self {
        ContentNode::ListItem {
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn code(lang: Option<&str>, code: impl Into<String>) -> Self {
        ContentNode::CodeBlock {
            lang: lang.map(str::to_string),
            code: code.into(),
        }
    }

    pub fn image(src: impl Into<String>, width: Option<Proportion>) -> Self {
        ContentNode::Image {
            src: src.into(),
            width,
        }
    }

    pub fn note(text: impl Into<String>) -> Self {
        ContentNode::Note(text.into())
    }

    pub fn fragment(children: Vec<ContentNode>) -> Self {
        ContentNode::Fragment(children)
    }

    fn children(&self) -> &[ContentNode] {
        match self {
            ContentNode::List(children)
            | ContentNode::ListItem { children, .. }
            | ContentNode::Fragment(children) => children,
            _ => &[],
        }
    }
}

/// A slide holding content directly
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeafSlide {
    pub options: SlideOptions,
    pub content: Vec<ContentNode>,
}

impl LeafSlide {
    pub fn new(content: Vec<ContentNode>) -> Self {
        Self {
            options: Vec::new(),
            content,
        }
    }

    pub fn with_options(mut self, options: SlideOptions) -> Self {
        self.options = options;
        self
    }

    /// Number of fragments, counting nested fragments separately
    pub fn fragment_count(&self) -> usize {
        fn count(nodes: &[ContentNode]) -> usize {
            nodes
                .iter()
                .map(|node| {
                    let own = usize::from(matches!(node, ContentNode::Fragment(_)));
                    own + count(node.children())
                })
                .sum()
        }
        count(&self.content)
    }

    /// All notes in document order, including notes inside hidden fragments
    pub fn notes(&self) -> Vec<&str> {
        fn collect<'a>(nodes: &'a [ContentNode], out: &mut Vec<&'a str>) {
            for node in nodes {
                if let ContentNode::Note(text) = node {
                    out.push(text);
                }
                collect(node.children(), out);
            }
        }
        let mut notes = Vec::new();
        collect(&self.content, &mut notes);
        notes
    }

    /// Content shown to the audience once `step` fragments are revealed.
    ///
    /// Notes are dropped, fragments numbered at or past `step` (in document
    /// preorder) are dropped, and revealed fragments are unwrapped in place.
    pub fn visible(&self, step: usize) -> Vec<ContentNode> {
        let mut next_index = 0;
        filter_visible(&self.content, step, &mut next_index)
    }

    /// Text of the first heading, used as the slide title
    pub fn title(&self) -> Option<&str> {
        fn find(nodes: &[ContentNode]) -> Option<&str> {
            nodes.iter().find_map(|node| match node {
                ContentNode::Heading { text, .. } => Some(text.as_str()),
                other => find(other.children()),
            })
        }
        find(&self.content)
    }
}

fn filter_visible(nodes: &[ContentNode], step: usize, next_index: &mut usize) -> Vec<ContentNode> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            ContentNode::Note(_) => {}
            ContentNode::Fragment(children) => {
                let index = *next_index;
                *next_index += 1;
                // Children still get numbered so later fragments keep their index
                let inner = filter_visible(children, step, next_index);
                if index < step {
                    out.extend(inner);
                }
            }
            ContentNode::List(children) => {
                out.push(ContentNode::List(filter_visible(children, step, next_index)));
            }
            ContentNode::ListItem { text, children } => out.push(ContentNode::ListItem {
                text: text.clone(),
                children: filter_visible(children, step, next_index),
            }),
            other => out.push(other.clone()),
        }
    }
    out
}

/// A top-level slide whose sub-slides form a vertical sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub options: SlideOptions,
    pub slides: Vec<LeafSlide>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Slide {
    Leaf(LeafSlide),
    Group(Group),
}

impl Slide {
    /// The leaf slides visited when navigating through this slide
    pub fn leaves(&self) -> &[LeafSlide] {
        match self {
            Slide::Leaf(leaf) => std::slice::from_ref(leaf),
            Slide::Group(group) => &group.slides,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            Slide::Leaf(leaf) => &leaf.options,
            Slide::Group(group) => &group.options,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Slide::Group(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub options: SlideOptions,
    slides: Vec<Slide>,
}

impl Deck {
    pub fn new(options: SlideOptions, slides: Vec<Slide>) -> Result<Self> {
        if slides.is_empty() {
            return Err(Error::EmptyDeck);
        }
        for (index, slide) in slides.iter().enumerate() {
            if slide.leaves().is_empty() {
                return Err(Error::EmptyGroup { index });
            }
        }
        Ok(Self { options, slides })
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn leaf(&self, h: usize, v: usize) -> Option<&LeafSlide> {
        self.slides.get(h)?.leaves().get(v)
    }

    /// Every leaf slide with its (h, v) position, in navigation order
    pub fn leaves(&self) -> impl Iterator<Item = (usize, usize, &LeafSlide)> {
        self.slides.iter().enumerate().flat_map(|(h, slide)| {
            slide
                .leaves()
                .iter()
                .enumerate()
                .map(move |(v, leaf)| (h, v, leaf))
        })
    }

    /// Options that apply to the leaf at (h, v): its own, then its group's,
    /// then the deck's. Earlier entries win.
    pub fn effective_options(&self, h: usize, v: usize) -> Vec<String> {
        let mut options = Vec::new();
        if let Some(slide) = self.slides.get(h) {
            if let Some(leaf) = slide.leaves().get(v) {
                if slide.is_group() {
                    options.extend(leaf.options.iter().cloned());
                }
            }
            options.extend(slide.options().iter().cloned());
        }
        options.extend(self.options.iter().cloned());
        options
    }
}
