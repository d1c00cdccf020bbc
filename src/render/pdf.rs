// Pure PDF renderer using printpdf for vector-based output

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::{info, warn};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;

use super::resolved::{CodeToken, ResolvedBlock, ResolvedDeck, ResolvedFrame, TextSpan};
use super::types::{FontStyle, FontWeight, RenderColor, TextAlign, TextPosition};
use crate::error::{Error, Result};

/// Space between blocks, in virtual pixels
const BLOCK_GAP: f32 = 14.0;
/// Left indent per nesting level, in virtual pixels
const INDENT: f32 = 28.0;
/// Padding inside code boxes, in virtual pixels
const CODE_PADDING: f32 = 10.0;
const LINE_HEIGHT: f32 = 1.2;
/// Rough glyph advance as a fraction of font size
const SANS_ADVANCE: f32 = 0.5;
const MONO_ADVANCE: f32 = 0.6;

#[derive(Clone, Copy)]
enum Face {
    Regular,
    Bold,
    Italic,
    Mono,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    mono: IndirectFontRef,
}

impl Fonts {
    fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Italic => &self.italic,
            Face::Mono => &self.mono,
        }
    }
}

/// A block measured for the page, in virtual pixels
enum Laid<'a> {
    Text {
        lines: Vec<String>,
        size: f32,
        face: Face,
        color: RenderColor,
        indent: f32,
    },
    Code {
        lines: &'a [Vec<CodeToken>],
        size: f32,
        background: RenderColor,
    },
    Image {
        path: &'a Path,
        width: f32,
        height: f32,
        pixels: (u32, u32),
    },
}

impl Laid<'_> {
    fn height(&self) -> f32 {
        match self {
            Laid::Text { lines, size, .. } => lines.len() as f32 * size * LINE_HEIGHT,
            Laid::Code { lines, size, .. } => {
                lines.len() as f32 * size * LINE_HEIGHT + 2.0 * CODE_PADDING
            }
            Laid::Image { height, .. } => *height,
        }
    }
}

/// PDF renderer for batch slide export
/// Page size keeps the aspect ratio of the virtual pixel canvas
pub struct PdfRenderer {
    doc: PdfDocumentReference,
    page_width_mm: f32,
    page_height_mm: f32,
    // Virtual pixel dimensions (matching the viewer window)
    pixel_width: f32,
    pixel_height: f32,
    current_page: Option<(PdfPageIndex, PdfLayerIndex)>,
    fonts: Fonts,
    page_count: usize,
}

impl PdfRenderer {
    /// Create a renderer whose pages match `pixel_width` x `pixel_height`
    /// scaled to 270mm wide
    pub fn new(title: &str, pixel_width: f32, pixel_height: f32) -> Result<Self> {
        let page_width_mm = 270.0;
        let page_height_mm = page_width_mm * pixel_height / pixel_width;

        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(page_width_mm), Mm(page_height_mm), "Layer 1");

        let font = |builtin| {
            doc.add_builtin_font(builtin)
                .map_err(|e| Error::Pdf(format!("Failed to add font: {:?}", e)))
        };
        let fonts = Fonts {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
            mono: font(BuiltinFont::Courier)?,
        };

        Ok(Self {
            doc,
            page_width_mm,
            page_height_mm,
            pixel_width,
            pixel_height,
            current_page: Some((page1, layer1)),
            fonts,
            page_count: 0,
        })
    }

    /// Convert pixels to mm
    fn px_to_mm(&self, px: f32) -> f32 {
        px * (self.page_width_mm / self.pixel_width)
    }

    /// Distance from the top of the page in pixels to a PDF y coordinate
    fn y_from_top(&self, px: f32) -> Mm {
        Mm(self.page_height_mm - self.px_to_mm(px))
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Render a single frame as a new page
    pub fn render_frame(&mut self, frame: &ResolvedFrame) -> Result<()> {
        // The first page already exists from PdfDocument::new
        let (page_idx, layer_idx) = match self.current_page.take() {
            Some(first) if self.page_count == 0 => first,
            _ => self
                .doc
                .add_page(Mm(self.page_width_mm), Mm(self.page_height_mm), "Layer 1"),
        };
        self.current_page = Some((page_idx, layer_idx));
        let layer = self.doc.get_page(page_idx).get_layer(layer_idx);

        self.draw_rect(&layer, 0.0, 0.0, self.pixel_width, self.pixel_height, &frame.background);

        let laid: Vec<Laid> = frame.blocks.iter().map(|block| self.lay_out(block)).collect();
        let total: f32 = laid.iter().map(Laid::height).sum::<f32>()
            + BLOCK_GAP * laid.len().saturating_sub(1) as f32;

        let padding_x = self.pixel_width * 0.05;
        let padding_y = self.pixel_height * 0.05;
        let content_width = self.pixel_width - 2.0 * padding_x;
        let content_height = self.pixel_height - 2.0 * padding_y;

        let mut top = match frame.text_position {
            TextPosition::Top => padding_y,
            TextPosition::Center => padding_y + ((content_height - total) / 2.0).max(0.0),
            TextPosition::Bottom => padding_y + (content_height - total).max(0.0),
        };

        for block in &laid {
            match block {
                Laid::Text {
                    lines,
                    size,
                    face,
                    color,
                    indent,
                } => {
                    layer.set_fill_color(color_to_pdf(color));
                    let font_pt = self.px_to_mm(*size) / 0.3528;
                    let mut baseline = top + size;
                    for line in lines {
                        let width = line.chars().count() as f32 * size * SANS_ADVANCE;
                        let x = align_x(frame.text_align, padding_x + indent, content_width - indent, width);
                        layer.use_text(
                            line.as_str(),
                            font_pt,
                            Mm(self.px_to_mm(x)),
                            self.y_from_top(baseline),
                            self.fonts.get(*face),
                        );
                        baseline += size * LINE_HEIGHT;
                    }
                }
                Laid::Code {
                    lines,
                    size,
                    background,
                } => {
                    self.draw_rect(&layer, padding_x, top, content_width, block.height(), background);
                    let font_pt = self.px_to_mm(*size) / 0.3528;
                    let mut baseline = top + CODE_PADDING + size;
                    for tokens in lines.iter() {
                        let mut x = padding_x + CODE_PADDING;
                        for token in tokens {
                            layer.set_fill_color(color_to_pdf(&token.color));
                            layer.use_text(
                                token.text.as_str(),
                                font_pt,
                                Mm(self.px_to_mm(x)),
                                self.y_from_top(baseline),
                                self.fonts.get(Face::Mono),
                            );
                            x += token.text.chars().count() as f32 * size * MONO_ADVANCE;
                        }
                        baseline += size * LINE_HEIGHT;
                    }
                }
                Laid::Image {
                    path,
                    width,
                    height,
                    pixels,
                } => {
                    let x = align_x(frame.text_align, padding_x, content_width, *width);
                    if let Err(e) = self.draw_image(&layer, path, x, top + height, *width, *pixels) {
                        warn!("Failed to render image {}: {}", path.display(), e);
                    }
                }
            }
            top += block.height() + BLOCK_GAP;
        }

        self.page_count += 1;
        Ok(())
    }

    fn lay_out<'a>(&self, block: &'a ResolvedBlock) -> Laid<'a> {
        let padding_x = self.pixel_width * 0.05;
        let content_width = self.pixel_width - 2.0 * padding_x;
        let content_height = self.pixel_height * 0.9;

        match block {
            ResolvedBlock::Text { spans, indent } => {
                let indent = *indent as f32 * INDENT;
                let size = spans.iter().map(|s| s.font_size).fold(0.0, f32::max);
                let text: String = spans.iter().map(|s| s.text.as_str()).collect();
                let max_chars = ((content_width - indent) / (size * SANS_ADVANCE)).max(1.0) as usize;
                let styled = spans.last();
                Laid::Text {
                    lines: wrap(&text, max_chars),
                    size,
                    face: styled.map_or(Face::Regular, face_of),
                    color: styled.map_or(RenderColor::white(), |s| s.color),
                    indent,
                }
            }
            ResolvedBlock::Code {
                lines,
                font_size,
                background,
                ..
            } => {
                // Long lines shrink the code instead of wrapping it
                let widest = lines
                    .iter()
                    .map(|tokens| tokens.iter().map(|t| t.text.chars().count()).sum::<usize>())
                    .max()
                    .unwrap_or(0)
                    .max(1);
                let fitting = (content_width - 2.0 * CODE_PADDING) / (widest as f32 * MONO_ADVANCE);
                Laid::Code {
                    lines,
                    size: font_size.min(fitting),
                    background: *background,
                }
            }
            ResolvedBlock::Image {
                src,
                path,
                width,
                exists,
                ..
            } => {
                let pixels = if *exists {
                    ::image::image_dimensions(path).ok()
                } else {
                    None
                };
                match pixels {
                    Some((w, h)) if w > 0 && h > 0 => {
                        let (width, height) = fit_image((w, h), *width, content_width, content_height);
                        Laid::Image {
                            path,
                            width,
                            height,
                            pixels: (w, h),
                        }
                    }
                    _ => placeholder(src),
                }
            }
        }
    }

    /// Draw a filled rectangle given in virtual pixels from the top-left
    fn draw_rect(&self, layer: &PdfLayerReference, x: f32, top: f32, width: f32, height: f32, color: &RenderColor) {
        let left = self.px_to_mm(x);
        let right = self.px_to_mm(x + width);
        let Mm(upper) = self.y_from_top(top);
        let Mm(lower) = self.y_from_top(top + height);
        let points = vec![
            (Point::new(Mm(left), Mm(lower)), false),
            (Point::new(Mm(right), Mm(lower)), false),
            (Point::new(Mm(right), Mm(upper)), false),
            (Point::new(Mm(left), Mm(upper)), false),
        ];
        let polygon = Polygon {
            rings: vec![points],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        };
        layer.set_fill_color(color_to_pdf(color));
        layer.add_polygon(polygon);
    }

    /// Draw an image with its bottom-left corner at (x, bottom) in virtual pixels
    fn draw_image(
        &self,
        layer: &PdfLayerReference,
        path: &Path,
        x: f32,
        bottom: f32,
        width: f32,
        pixels: (u32, u32),
    ) -> Result<()> {
        let dynamic_image = ::image::open(path).map_err(|e| Error::Pdf(format!("Failed to load image: {}", e)))?;
        let rgb_image = dynamic_image.to_rgb8();
        let (px_width, px_height) = rgb_image.dimensions();
        if (px_width, px_height) != pixels {
            warn!("{} changed size while exporting", path.display());
        }

        let pdf_image = Image::from(ImageXObject {
            width: Px(px_width as usize),
            height: Px(px_height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: rgb_image.into_raw(),
            image_filter: None,
            smask: None,
            clipping_bbox: None,
        });

        // At 25.4 dpi one image pixel is one millimetre before scaling
        let scale = self.px_to_mm(width) / px_width as f32;
        pdf_image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(self.px_to_mm(x))),
                translate_y: Some(self.y_from_top(bottom)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(25.4),
                ..Default::default()
            },
        );
        Ok(())
    }

    /// Finalize the PDF and save to file
    pub fn finalize(self, output_path: &Path) -> Result<()> {
        let file = File::create(output_path).map_err(|e| Error::io(e, output_path))?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| Error::Pdf(format!("Failed to save PDF: {:?}", e)))?;
        Ok(())
    }
}

fn placeholder(src: &str) -> Laid<'static> {
    Laid::Text {
        lines: vec![format!("[image: {}]", src)],
        size: 18.0,
        face: Face::Italic,
        color: RenderColor::rgb(0.6, 0.6, 0.6),
        indent: 0.0,
    }
}

/// Size for an image of `pixels`, at the requested width or its natural
/// width, shrunk to fit the content area with its aspect ratio kept
fn fit_image(pixels: (u32, u32), width: Option<f32>, max_width: f32, max_height: f32) -> (f32, f32) {
    let (w, h) = (pixels.0 as f32, pixels.1 as f32);
    let width = width.unwrap_or(w).min(max_width);
    let height = width * h / w;
    if height > max_height {
        (max_height * w / h, max_height)
    } else {
        (width, height)
    }
}

fn face_of(span: &TextSpan) -> Face {
    match (span.weight, span.style) {
        (FontWeight::Bold, _) => Face::Bold,
        (_, FontStyle::Italic) => Face::Italic,
        _ => Face::Regular,
    }
}

fn align_x(align: TextAlign, left: f32, available: f32, width: f32) -> f32 {
    match align {
        TextAlign::Left => left,
        TextAlign::Center => left + ((available - width) / 2.0).max(0.0),
        TextAlign::Right => left + (available - width).max(0.0),
    }
}

/// Greedy word wrap to at most `max_chars` per line; longer words stay whole
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Convert RenderColor to printpdf Color
fn color_to_pdf(color: &RenderColor) -> Color {
    Color::Rgb(Rgb::new(color.r, color.g, color.b, None))
}

/// Export resolved frames to PDF, one page per frame
pub fn export_to_pdf(deck: &ResolvedDeck, title: &str, output_path: &Path) -> Result<()> {
    let dimensions = deck.frames.first().map(|f| f.dimensions).unwrap_or_default();
    let mut renderer = PdfRenderer::new(title, dimensions.width, dimensions.height)?;

    for frame in &deck.frames {
        renderer.render_frame(frame)?;
    }

    let pages = renderer.page_count();
    renderer.finalize(output_path)?;
    info!("PDF export complete: {} ({} pages)", output_path.display(), pages);
    Ok(())
}
