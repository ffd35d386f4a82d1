//! 答卷图片格式枚举
//!
//! 批改服务只接受编码后的图片字节和 MIME 类型，
//! 这里负责从文件扩展名推断 MIME 类型

use phf::phf_map;

/// 支持的答卷图片格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ImageMime {
    /// image/png
    Png,
    /// image/jpeg
    Jpeg,
    /// image/webp
    Webp,
    /// image/gif
    Gif,
}

/// 扩展名 → 图片格式静态映射表
static EXTENSION_MIME: phf::Map<&'static str, ImageMime> = phf_map! {
    "png" => ImageMime::Png,
    "jpg" => ImageMime::Jpeg,
    "jpeg" => ImageMime::Jpeg,
    "webp" => ImageMime::Webp,
    "gif" => ImageMime::Gif,
};

impl ImageMime {
    /// 获取标准 MIME 字符串
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Webp => "image/webp",
            ImageMime::Gif => "image/gif",
        }
    }

    /// 从文件扩展名解析（不区分大小写）
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSION_MIME.get(ext.to_lowercase().as_str()).copied()
    }

    /// 从文件路径解析
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

impl std::fmt::Display for ImageMime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_from_extension() {
        assert_eq!(ImageMime::from_extension("png"), Some(ImageMime::Png));
        assert_eq!(ImageMime::from_extension("JPG"), Some(ImageMime::Jpeg));
        assert_eq!(ImageMime::from_extension("jpeg"), Some(ImageMime::Jpeg));
        assert_eq!(ImageMime::from_extension("pdf"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            ImageMime::from_path(Path::new("sheets/张三.PNG")),
            Some(ImageMime::Png)
        );
        assert_eq!(ImageMime::from_path(Path::new("sheets/readme")), None);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(ImageMime::Webp.as_str(), "image/webp");
    }
}
