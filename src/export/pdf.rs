//! PDF documents built from a flattened export
//!
//! `Single` fits the whole image onto one page. `Paged` scales the image to
//! the page width and slices it top to bottom across as many pages as needed,
//! the way long pages are usually printed.

use std::io::Write;
use std::path::Path;

use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::config::PdfLayout;
use crate::error::{EditorError, Result};

/// Page setup for a PDF export
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    /// Page width and height in points
    pub page_size: (f32, f32),
    pub layout: PdfLayout,
    pub title: Option<String>,
}

/// One image slice and where it lands on its page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// First source row of the slice
    pub src_top: u32,
    /// Number of source rows in the slice
    pub src_height: u32,
    /// Position and size on the page in points, origin bottom-left
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Lay out a `width x height` image on pages of `page_size`, one placement per page
pub fn layout_pages(
    width: u32,
    height: u32,
    page_size: (f32, f32),
    layout: PdfLayout,
) -> Vec<Placement> {
    let (page_w, page_h) = page_size;
    if width == 0 || height == 0 || page_w <= 0.0 || page_h <= 0.0 {
        return Vec::new();
    }
    let (w, h) = (width as f32, height as f32);

    match layout {
        PdfLayout::Single => {
            let scale = (page_w / w).min(page_h / h);
            let (out_w, out_h) = (w * scale, h * scale);
            vec![Placement {
                src_top: 0,
                src_height: height,
                x: (page_w - out_w) / 2.0,
                y: (page_h - out_h) / 2.0,
                width: out_w,
                height: out_h,
            }]
        }
        PdfLayout::Paged => {
            let scale = page_w / w;
            let rows_per_page = ((page_h / scale).floor() as u32).max(1);
            let mut placements = Vec::new();
            let mut src_top = 0;
            while src_top < height {
                let src_height = rows_per_page.min(height - src_top);
                let out_h = src_height as f32 * scale;
                placements.push(Placement {
                    src_top,
                    src_height,
                    x: 0.0,
                    // slices hang from the top edge of the page
                    y: page_h - out_h,
                    width: page_w,
                    height: out_h,
                });
                src_top += src_height;
            }
            placements
        }
    }
}

/// Build a PDF document holding `image`
pub fn build_pdf(image: &RgbaImage, options: &PdfOptions) -> Result<Document> {
    let placements = layout_pages(
        image.width(),
        image.height(),
        options.page_size,
        options.layout,
    );
    if placements.is_empty() {
        return Err(EditorError::Export(format!(
            "cannot lay out a {}x{} image on a {:?} page",
            image.width(),
            image.height(),
            options.page_size
        )));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let (page_w, page_h) = options.page_size;

    let mut kids = Vec::with_capacity(placements.len());
    for placement in &placements {
        let slice = image::imageops::crop_imm(
            image,
            0,
            placement.src_top,
            image.width(),
            placement.src_height,
        )
        .to_image();
        let image_id = add_image(&mut doc, &slice);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        placement.width.into(),
                        0.0f32.into(),
                        0.0f32.into(),
                        placement.height.into(),
                        placement.x.into(),
                        placement.y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(EditorError::export)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.0f32.into(), 0.0f32.into(), page_w.into(), page_h.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = options.title.as_deref() {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal(crate::config::EditorConfig::ID),
        });
        doc.trailer.set("Info", info_id);
    }

    doc.compress();
    Ok(doc)
}

/// Embed `image` as an RGB image XObject, flattened onto white
fn add_image(doc: &mut Document, image: &RgbaImage) -> ObjectId {
    let mut rgb = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let a = u16::from(a);
        for c in [r, g, b] {
            rgb.push(((u16::from(c) * a + 255 * (255 - a) + 127) / 255) as u8);
        }
    }
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(image.width()),
        "Height" => i64::from(image.height()),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8i64,
    };
    doc.add_object(Stream::new(dict, rgb))
}

/// Encode `image` as a PDF into `w`
pub fn write_pdf<W: Write>(w: &mut W, image: &RgbaImage, options: &PdfOptions) -> Result<()> {
    let mut doc = build_pdf(image, options)?;
    doc.save_to(w).map_err(EditorError::export)
}

/// Write `image` to `path` as a PDF
pub fn save_pdf(image: &RgbaImage, path: &Path, options: &PdfOptions) -> Result<()> {
    let mut doc = build_pdf(image, options)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    doc.save_to(&mut file).map_err(EditorError::export)?;
    file.flush()?;
    log::info!(
        "Saved {} page PDF to {}",
        doc.get_pages().len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4: (f32, f32) = (595.28, 841.89);

    fn options(layout: PdfLayout) -> PdfOptions {
        PdfOptions {
            page_size: A4,
            layout,
            title: Some("Example page".to_string()),
        }
    }

    #[test]
    fn test_single_layout_preserves_aspect() {
        let pages = layout_pages(1000, 4000, A4, PdfLayout::Single);
        assert_eq!(pages.len(), 1);
        let p = pages[0];
        assert!((p.width / p.height - 0.25).abs() < 1e-4);
        assert!(p.height <= A4.1 + 1e-3 && p.width <= A4.0 + 1e-3);
        assert_eq!((p.src_top, p.src_height), (0, 4000));
    }

    #[test]
    fn test_paged_layout_covers_every_row_once() {
        let pages = layout_pages(600, 2000, (600.0, 800.0), PdfLayout::Paged);
        assert_eq!(pages.len(), 3);
        assert_eq!(
            pages.iter().map(|p| p.src_height).collect::<Vec<_>>(),
            vec![800, 800, 400]
        );
        assert_eq!(pages[2].src_top, 1600);
        // the short last slice still starts at the top of its page
        assert_eq!(pages[2].y, 400.0);
    }

    #[test]
    fn test_empty_image_has_no_pages() {
        assert!(layout_pages(0, 10, A4, PdfLayout::Paged).is_empty());
        assert!(build_pdf(&RgbaImage::new(0, 0), &options(PdfLayout::Single)).is_err());
    }

    #[test]
    fn test_saved_pdf_reloads_with_page_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let img = RgbaImage::from_pixel(100, 1000, image::Rgba([255, 0, 0, 255]));

        save_pdf(&img, &path, &options(PdfLayout::Paged)).unwrap();
        let doc = Document::load(&path).unwrap();
        let expected = layout_pages(100, 1000, A4, PdfLayout::Paged).len();
        assert!(expected > 1);
        assert_eq!(doc.get_pages().len(), expected);

        let mut single = Vec::new();
        write_pdf(&mut single, &img, &options(PdfLayout::Single)).unwrap();
        assert_eq!(Document::load_mem(&single).unwrap().get_pages().len(), 1);
    }
}
