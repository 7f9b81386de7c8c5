//! 位图嵌入
//!
//! PNG / JPEG 解码后统一转成 RGB，以 FlateDecode 写入；带透明通道时附加 SMask。

use crate::error::PdfError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::GenericImageView;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

/// 嵌入后的图片
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedImage {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// 读取图片尺寸（像素）
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32), PdfError> {
    Ok(image::load_from_memory(bytes)?.dimensions())
}

/// 解码图片并作为 Image XObject 加入文档
pub fn embed_image(doc: &mut Document, bytes: &[u8]) -> Result<EmbeddedImage, PdfError> {
    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = decoded.dimensions();

    let smask_id = if decoded.color().has_alpha() {
        let rgba = decoded.to_rgba8();
        let alpha: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        if alpha.iter().all(|&a| a == u8::MAX) {
            None
        } else {
            let dict = image_dict(width, height, b"DeviceGray");
            Some(doc.add_object(Stream::new(dict, deflate(&alpha)?)))
        }
    } else {
        None
    };

    let rgb = decoded.to_rgb8().into_raw();
    let mut dict = image_dict(width, height, b"DeviceRGB");
    if let Some(smask) = smask_id {
        dict.set("SMask", Object::Reference(smask));
    }
    let id = doc.add_object(Stream::new(dict, deflate(&rgb)?));

    Ok(EmbeddedImage { id, width, height })
}

fn image_dict(width: u32, height: u32, color_space: &[u8]) -> Dictionary {
    Dictionary::from_iter([
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("ColorSpace", Object::Name(color_space.to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(b"FlateDecode".to_vec())),
    ])
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, PdfError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    /// 生成测试用的 PNG
    pub(crate) fn png_bytes(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, alpha]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn embeds_opaque_png_without_smask() {
        let mut doc = Document::with_version("1.5");
        let embedded = embed_image(&mut doc, &png_bytes(4, 2, 255)).unwrap();
        assert_eq!((embedded.width, embedded.height), (4, 2));

        let stream = doc.get_object(embedded.id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"SMask").is_err());
    }

    #[test]
    fn transparent_png_gets_smask() {
        let mut doc = Document::with_version("1.5");
        let embedded = embed_image(&mut doc, &png_bytes(3, 3, 128)).unwrap();
        let stream = doc.get_object(embedded.id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"SMask").is_ok());
    }

    #[test]
    fn garbage_is_an_image_error() {
        let mut doc = Document::with_version("1.5");
        assert!(matches!(
            embed_image(&mut doc, b"not an image"),
            Err(PdfError::Image(_))
        ));
    }
}
