//! 导入练习纸 PDF 的第一页
//!
//! 源文档的对象先整体重新编号，再只把第一页可达的对象复制到目标文档。
//! 从页树继承的属性（Resources、MediaBox 等）会直接写到页面字典上。

use crate::error::PdfError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeSet, VecDeque};

/// 页面可以从父节点继承的属性
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// 复制时丢弃的页面属性（会把其他页面一起拉进来）
const DROPPED: [&[u8]; 4] = [b"Annots", b"B", b"StructParents", b"Thumb"];

/// 导入结果
#[derive(Debug, Clone, Copy)]
pub struct ImportedPage {
    pub page_id: ObjectId,
    /// `[x0, y0, x1, y1]`
    pub media_box: [f32; 4],
}

fn media_box_size(mb: &[f32; 4]) -> (f32, f32) {
    ((mb[2] - mb[0]).abs(), (mb[3] - mb[1]).abs())
}

/// 读取 PDF 第一页的尺寸（宽, 高）
pub fn first_page_size(bytes: &[u8]) -> Result<(f32, f32), PdfError> {
    let source = Document::load_mem(bytes)?;
    let page_id = first_page_id(&source)?;
    let page = source.get_object(page_id)?.as_dict()?;
    let media_box = inherited(&source, page, b"MediaBox")?
        .ok_or(PdfError::Malformed("页面没有 MediaBox"))?;
    Ok(media_box_size(&parse_rect(&source, &media_box)?))
}

/// 把 `bytes` 的第一页导入 `target`，挂到页树节点 `parent` 下
///
/// 返回的页面尚未加入 `Kids`，由调用方负责。
pub fn import_first_page(
    target: &mut Document,
    bytes: &[u8],
    parent: ObjectId,
) -> Result<ImportedPage, PdfError> {
    let mut source = Document::load_mem(bytes)?;
    source.renumber_objects_with(target.max_id + 1);

    let page_id = first_page_id(&source)?;
    let mut page = source.get_object(page_id)?.as_dict()?.clone();

    for key in INHERITABLE {
        if !page.has(key) {
            if let Some(value) = inherited(&source, &page, key)? {
                page.set(key.to_vec(), value);
            }
        }
    }
    for key in DROPPED {
        page.remove(key);
    }
    page.remove(b"Parent");

    let media_box_obj = page
        .get(b"MediaBox")
        .ok()
        .cloned()
        .ok_or(PdfError::Malformed("页面没有 MediaBox"))?;
    let media_box = parse_rect(&source, &media_box_obj)?;

    // 广度优先复制第一页可达的对象
    let mut queue: VecDeque<ObjectId> = VecDeque::new();
    let mut copied: BTreeSet<ObjectId> = BTreeSet::new();
    collect_references(&Object::Dictionary(page.clone()), &mut queue);

    while let Some(id) = queue.pop_front() {
        if id == page_id || !copied.insert(id) {
            continue;
        }
        let Ok(object) = source.get_object(id) else {
            continue;
        };
        if is_page_tree_node(object) {
            continue;
        }
        collect_references(object, &mut queue);
        target.objects.insert(id, object.clone());
    }

    page.set("Parent", Object::Reference(parent));
    target.objects.insert(page_id, Object::Dictionary(page));
    target.max_id = target.max_id.max(source.max_id);

    Ok(ImportedPage { page_id, media_box })
}

fn first_page_id(doc: &Document) -> Result<ObjectId, PdfError> {
    doc.get_pages()
        .values()
        .next()
        .copied()
        .ok_or(PdfError::NoPages)
}

/// 沿 Parent 链查找可继承属性
fn inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Result<Option<Object>, PdfError> {
    if let Ok(value) = page.get(key) {
        return Ok(Some(value.clone()));
    }

    let mut current = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(id) = current {
        depth += 1;
        if depth > 64 {
            return Err(PdfError::Malformed("页树层级过深"));
        }
        let node = doc.get_object(id)?.as_dict()?;
        if let Ok(value) = node.get(key) {
            return Ok(Some(value.clone()));
        }
        current = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    Ok(None)
}

fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type").and_then(Object::as_name),
            Ok(b"Pages") | Ok(b"Page")
        ),
        _ => false,
    }
}

pub(crate) fn collect_references(object: &Object, out: &mut VecDeque<ObjectId>) {
    match object {
        Object::Reference(id) => out.push_back(*id),
        Object::Array(items) => items.iter().for_each(|o| collect_references(o, out)),
        Object::Dictionary(dict) => dict.iter().for_each(|(_, o)| collect_references(o, out)),
        Object::Stream(stream) => stream
            .dict
            .iter()
            .for_each(|(_, o)| collect_references(o, out)),
        _ => {}
    }
}

pub(crate) fn as_number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn parse_rect(doc: &Document, object: &Object) -> Result<[f32; 4], PdfError> {
    let object = match object {
        Object::Reference(id) => doc.get_object(*id)?,
        other => other,
    };
    let items = object.as_array()?;
    if items.len() != 4 {
        return Err(PdfError::Malformed("MediaBox 不是四个数"));
    }
    let mut rect = [0.0f32; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        let item = match item {
            Object::Reference(id) => doc.get_object(*id)?,
            other => other,
        };
        *slot = as_number(item).ok_or(PdfError::Malformed("MediaBox 含有非数字"))?;
    }
    Ok(rect)
}
