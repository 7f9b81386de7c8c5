//! 文档写入服务 - 业务能力层
//!
//! 只负责"按顺序收集页面并写出一个 PDF"能力，不关心页面从哪来

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{PdfError, WriteError};
use crate::models::Page;
use crate::pdf::font::TextFont;
use crate::pdf::PdfBuilder;

/// 文档写入服务
///
/// 职责：
/// - 按调用顺序追加页面
/// - 结束时一次性序列化并原子写入输出文件
/// - 零页文档不写文件
pub struct DocumentWriter {
    builder: PdfBuilder,
}

impl DocumentWriter {
    pub fn new(font: TextFont) -> Self {
        Self {
            builder: PdfBuilder::new(font),
        }
    }

    /// 追加一页
    ///
    /// 出错时文档中不会留下这一页。
    pub fn append(&mut self, page: &Page) -> Result<(), PdfError> {
        self.builder.add_page(page)
    }

    pub fn page_count(&self) -> usize {
        self.builder.page_count()
    }

    /// 序列化并写入 `output_path`
    ///
    /// 序列化成功后才创建输出目录；先写同目录下的临时文件再重命名，失败时删除临时文件。
    pub async fn finish(self, output_path: &Path) -> Result<PathBuf, WriteError> {
        if self.page_count() == 0 {
            return Err(WriteError::EmptyDocument);
        }
        let pages = self.page_count();

        let bytes = self.builder.finish()?;
        debug!("PDF 序列化完成: {} 页, {} 字节", pages, bytes.len());

        if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| WriteError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        let temp_path = temp_path_for(output_path);
        if let Err(source) = write_then_rename(&temp_path, output_path, &bytes).await {
            if let Err(e) = tokio::fs::remove_file(&temp_path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("⚠️ 临时文件 {} 删除失败: {}", temp_path.display(), e);
                }
            }
            return Err(WriteError::Io {
                path: output_path.to_path_buf(),
                source,
            });
        }

        info!("💾 已写入 {} ({} 页)", output_path.display(), pages);
        Ok(output_path.to_path_buf())
    }
}

async fn write_then_rename(temp_path: &Path, output_path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(temp_path, bytes).await?;
    tokio::fs::rename(temp_path, output_path).await
}

/// `out/name.pdf` → `out/.name.pdf.<pid>.tmp`
fn temp_path_for(output_path: &Path) -> PathBuf {
    let file_name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.pdf".to_string());
    output_path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
}
