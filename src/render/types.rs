// Renderer-agnostic types that don't depend on Bevy or any specific backend

/// A color represented as RGBA values (0.0 to 1.0)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl RenderColor {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// From "#rrggbb" or "#rrggbbaa"
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        let alpha = if digits.len() == 8 { channel(6)? } else { 1.0 };
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

impl Default for RenderColor {
    fn default() -> Self {
        Self::white()
    }
}

/// Parse a named or hex color
pub fn parse_color(color_str: &str) -> Option<RenderColor> {
    let lower = color_str.trim().to_lowercase();
    if lower.starts_with('#') {
        return RenderColor::from_hex(&lower);
    }
    match lower.as_str() {
        "red" => Some(RenderColor::rgb(1.0, 0.0, 0.0)),
        "orange" => Some(RenderColor::rgb(1.0, 0.5, 0.0)),
        "yellow" => Some(RenderColor::rgb(1.0, 1.0, 0.0)),
        "green" => Some(RenderColor::rgb(0.0, 1.0, 0.0)),
        "blue" => Some(RenderColor::rgb(0.0, 0.0, 1.0)),
        "purple" => Some(RenderColor::rgb(0.5, 0.0, 0.5)),
        "white" => Some(RenderColor::white()),
        "black" => Some(RenderColor::black()),
        "gray" | "grey" => Some(RenderColor::rgb(0.5, 0.5, 0.5)),
        _ => None,
    }
}

/// Colors used across a deck
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: RenderColor,
    pub foreground: RenderColor,
    pub heading: RenderColor,
    pub accent: RenderColor,
    pub code_background: RenderColor,
    pub code_foreground: RenderColor,
    /// syntect theme for highlighted code
    pub syntax: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: RenderColor::rgb(0.098, 0.098, 0.098),
            foreground: RenderColor::white(),
            heading: RenderColor::white(),
            accent: RenderColor::rgb(0.259, 0.686, 0.98),
            code_background: RenderColor::rgb(0.247, 0.247, 0.247),
            code_foreground: RenderColor::rgb(0.863, 0.863, 0.8),
            syntax: super::highlight::DEFAULT_SYNTAX_THEME.to_string(),
        }
    }
}

/// Where the content column sits on the slide
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TextPosition {
    #[default]
    Center,
    Top,
    Bottom,
}

/// Text alignment within the content column
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font style
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Dimensions for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderDimensions {
    pub width: f32,
    pub height: f32,
}

impl RenderDimensions {
    /// Fraction of each edge left as padding around the content area
    pub const PADDING: f32 = 0.05;

    /// Width available to slide content once padding is removed
    pub fn content_width(&self) -> f32 {
        self.width * (1.0 - 2.0 * Self::PADDING)
    }

    pub fn content_height(&self) -> f32 {
        self.height * (1.0 - 2.0 * Self::PADDING)
    }
}

impl Default for RenderDimensions {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}
