//! Page-oriented drawing surface on top of `lopdf` content streams.
//!
//! Coordinates passed to the canvas are measured in points from the top-left
//! corner of an A4 page; conversion to PDF's bottom-up space happens here.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

use super::ExportError;
use super::chart::RasterImage;

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 40.0;
/// Space reserved at the bottom of every page for the footer.
pub const FOOTER_HEIGHT: f32 = 30.0;

pub const BLACK: [u8; 3] = [0, 0, 0];
pub const GREY: [u8; 3] = [110, 110, 110];
pub const WHITE: [u8; 3] = [255, 255, 255];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        }
    }
}

/// Writing position: page index and distance from the top edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    pub page: usize,
    pub y: f32,
}

/// Snapshot of the canvas taken before a section runs.
#[derive(Clone, Debug)]
pub struct Checkpoint {
    op_counts: Vec<usize>,
    images: usize,
}

#[derive(Debug)]
pub struct Canvas {
    pages: Vec<Vec<Operation>>,
    images: Vec<RasterImage>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            images: Vec::new(),
        }
    }

    pub fn start(&self) -> Cursor {
        Cursor { page: 0, y: MARGIN }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn content_width(&self) -> f32 {
        PAGE_WIDTH - MARGIN * 2.0
    }

    /// Lowest y a section may draw to.
    pub fn bottom(&self) -> f32 {
        PAGE_HEIGHT - MARGIN - FOOTER_HEIGHT
    }

    pub fn new_page(&mut self) -> Cursor {
        self.pages.push(Vec::new());
        Cursor {
            page: self.pages.len() - 1,
            y: MARGIN,
        }
    }

    /// Return `cursor` unchanged when `height` still fits on its page,
    /// otherwise a cursor at the top of a fresh page.
    pub fn ensure_space(&mut self, cursor: Cursor, height: f32) -> Cursor {
        if cursor.y + height <= self.bottom() {
            cursor
        } else {
            self.new_page()
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            op_counts: self.pages.iter().map(Vec::len).collect(),
            images: self.images.len(),
        }
    }

    /// Drop everything drawn since `checkpoint`, including pages it added.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.pages.truncate(checkpoint.op_counts.len().max(1));
        for (ops, &count) in self.pages.iter_mut().zip(&checkpoint.op_counts) {
            ops.truncate(count);
        }
        self.images.truncate(checkpoint.images);
    }

    fn ops(&mut self, page: usize) -> Result<&mut Vec<Operation>, ExportError> {
        self.pages
            .get_mut(page)
            .ok_or_else(|| ExportError::Layout(format!("page {page} does not exist")))
    }

    pub fn text(
        &mut self,
        cursor: Cursor,
        x: f32,
        size: f32,
        font: Font,
        color: [u8; 3],
        text: &str,
    ) -> Result<(), ExportError> {
        let baseline = PAGE_HEIGHT - cursor.y - size;
        let ops = self.ops(cursor.page)?;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.resource().to_vec()), Object::Real(size)],
        ));
        ops.push(Operation::new("rg", rgb_operands(color)));
        ops.push(Operation::new("Td", vec![Object::Real(x), Object::Real(baseline)]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_text(text))],
        ));
        ops.push(Operation::new("ET", vec![]));
        Ok(())
    }

    /// Right-align `text` against `right_edge`.
    pub fn text_right(
        &mut self,
        cursor: Cursor,
        right_edge: f32,
        size: f32,
        font: Font,
        color: [u8; 3],
        text: &str,
    ) -> Result<(), ExportError> {
        let x = right_edge - text_width(text, size);
        self.text(cursor, x, size, font, color, text)
    }

    pub fn fill_rect(
        &mut self,
        cursor: Cursor,
        x: f32,
        width: f32,
        height: f32,
        color: [u8; 3],
    ) -> Result<(), ExportError> {
        let bottom = PAGE_HEIGHT - cursor.y - height;
        let ops = self.ops(cursor.page)?;
        ops.push(Operation::new("rg", rgb_operands(color)));
        ops.push(Operation::new(
            "re",
            vec![
                Object::Real(x),
                Object::Real(bottom),
                Object::Real(width),
                Object::Real(height),
            ],
        ));
        ops.push(Operation::new("f", vec![]));
        Ok(())
    }

    /// Horizontal rule at `cursor.y`.
    pub fn rule(
        &mut self,
        cursor: Cursor,
        x: f32,
        width: f32,
        color: [u8; 3],
    ) -> Result<(), ExportError> {
        let y = PAGE_HEIGHT - cursor.y;
        let ops = self.ops(cursor.page)?;
        ops.push(Operation::new("RG", rgb_operands(color)));
        ops.push(Operation::new("w", vec![Object::Real(0.5)]));
        ops.push(Operation::new("m", vec![Object::Real(x), Object::Real(y)]));
        ops.push(Operation::new("l", vec![Object::Real(x + width), Object::Real(y)]));
        ops.push(Operation::new("S", vec![]));
        Ok(())
    }

    /// Place `image` with its top-left corner at (`x`, `cursor.y`).
    pub fn image(
        &mut self,
        cursor: Cursor,
        x: f32,
        width: f32,
        height: f32,
        image: RasterImage,
    ) -> Result<(), ExportError> {
        let name = format!("Im{}", self.images.len() + 1);
        let bottom = PAGE_HEIGHT - cursor.y - height;
        let ops = self.ops(cursor.page)?;
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                Object::Real(width),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(height),
                Object::Real(x),
                Object::Real(bottom),
            ],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        ops.push(Operation::new("Q", vec![]));
        self.images.push(image);
        Ok(())
    }

    /// Stamp the "Page i of n" footer and serialize the document.
    pub fn finish(mut self, title: &str) -> Result<Vec<u8>, ExportError> {
        let total = self.pages.len();
        let rule_width = self.content_width();
        for page in 0..total {
            let cursor = Cursor {
                page,
                y: PAGE_HEIGHT - MARGIN - 10.0,
            };
            let label = format!("Page {} of {}", page + 1, total);
            let x = (PAGE_WIDTH - text_width(&label, 8.0)) / 2.0;
            self.rule(Cursor { page, y: cursor.y - 6.0 }, MARGIN, rule_width, GREY)?;
            self.text(cursor, x, 8.0, Font::Regular, GREY, &label)?;
            self.text(cursor, MARGIN, 8.0, Font::Regular, GREY, title)?;
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut xobjects = Dictionary::new();
        for (i, image) in self.images.into_iter().enumerate() {
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => Object::Integer(i64::from(image.width)),
                    "Height" => Object::Integer(i64::from(image.height)),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => Object::Integer(8),
                },
                image.rgb,
            );
            let id = doc.add_object(stream);
            xobjects.set(format!("Im{}", i + 1), id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
            "XObject" => xobjects,
        });

        let mut kids = Vec::with_capacity(total);
        for operations in self.pages {
            let content = Content { operations }
                .encode()
                .map_err(|e| ExportError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(total as i64),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(encode_text(title)),
            "Producer" => Object::string_literal("outlet-dashboard"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        Ok(out)
    }
}

fn rgb_operands(color: [u8; 3]) -> Vec<Object> {
    color
        .iter()
        .map(|c| Object::Real(f32::from(*c) / 255.0))
        .collect()
}

/// WinAnsi bytes for the standard fonts; characters outside Latin-1 become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Approximate Helvetica advance width.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.52
}
