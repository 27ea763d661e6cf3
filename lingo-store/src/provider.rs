//! 文本表格与图片的资源来源

use anyhow::Context;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::sprite::SpriteHandle;

const DEFAULT_SPRITE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// 一份待解析的文本表格
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSource {
    pub name: String,
    pub bytes: Cow<'static, [u8]>,
}

impl TextSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// 宿主环境提供的资源访问能力
pub trait AssetProvider {
    /// 列出 `base_path` 下的全部文本表格，顺序即加载顺序
    fn list_text_sources(&self, base_path: &str) -> anyhow::Result<Vec<TextSource>>;

    /// 加载图片，不存在时返回 `None`
    fn load_sprite(&self, path: &str) -> Option<SpriteHandle>;
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// 依次尝试原路径以及追加各扩展名后的路径
fn sprite_candidates<'a>(
    path: &'a str,
    extensions: &'a [String],
) -> impl Iterator<Item = Cow<'a, str>> {
    std::iter::once(Cow::Borrowed(path))
        .chain(extensions.iter().map(move |ext| Cow::Owned(format!("{}.{}", path, ext))))
}

fn default_extensions() -> Vec<String> {
    DEFAULT_SPRITE_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

/// 基于文件系统的资源目录
#[derive(Debug, Clone)]
pub struct DirProvider {
    root: PathBuf,
    sprite_extensions: Vec<String>,
}

impl DirProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sprite_extensions: default_extensions(),
        }
    }

    pub fn sprite_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sprite_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    fn load_text_file(path: &Path) -> Option<TextSource> {
        if !is_csv(path) {
            return None;
        }
        let name = path.file_name()?.to_str()?.to_string();
        let bytes = fs::read(path)
            .inspect_err(|e| error!("Failed to read locale file {}: {}", path.display(), e))
            .ok()?;
        info!("Found locale source: {}", name);
        Some(TextSource::new(name, bytes))
    }
}

impl AssetProvider for DirProvider {
    fn list_text_sources(&self, base_path: &str) -> anyhow::Result<Vec<TextSource>> {
        let dir = self.root.join(base_path);
        if !dir.exists() {
            warn!("Locale directory not found: {}", dir.display());
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
            .with_context(|| format!("Failed to read locale directory {}", dir.display()))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        // read_dir 的顺序不确定，按文件名排序保证加载顺序稳定
        paths.sort();

        Ok(paths
            .iter()
            .filter_map(|path| Self::load_text_file(path))
            .collect())
    }

    fn load_sprite(&self, path: &str) -> Option<SpriteHandle> {
        sprite_candidates(path, &self.sprite_extensions).find_map(|candidate| {
            let file = self.root.join(candidate.as_ref());
            if !file.is_file() {
                return None;
            }
            fs::read(&file)
                .inspect_err(|e| error!("Failed to read sprite {}: {}", file.display(), e))
                .ok()
                .map(|bytes| SpriteHandle::from_bytes(path, bytes))
        })
    }
}

/// 内存中的资源，适合测试或由宿主自行读取文件的场景；忽略 `base_path`
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    sources: Vec<TextSource>,
    sprites: HashMap<String, SpriteHandle>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(
        mut self,
        name: impl Into<String>,
        bytes: impl Into<Cow<'static, [u8]>>,
    ) -> Self {
        self.sources.push(TextSource::new(name, bytes));
        self
    }

    pub fn with_sprite(mut self, path: impl Into<String>, sprite: SpriteHandle) -> Self {
        self.sprites.insert(path.into(), sprite);
        self
    }
}

impl AssetProvider for MemoryProvider {
    fn list_text_sources(&self, _base_path: &str) -> anyhow::Result<Vec<TextSource>> {
        Ok(self.sources.clone())
    }

    fn load_sprite(&self, path: &str) -> Option<SpriteHandle> {
        self.sprites.get(path).cloned()
    }
}

/// 编译期内嵌的资源目录，由 `locale_assets!` 生成
///
/// 条目是相对于内嵌目录的路径（使用 `/` 分隔）与文件内容。
#[derive(Debug, Clone)]
pub struct EmbeddedProvider {
    files: &'static [(&'static str, &'static [u8])],
    sprite_extensions: Vec<String>,
}

impl EmbeddedProvider {
    pub fn new(files: &'static [(&'static str, &'static [u8])]) -> Self {
        Self {
            files,
            sprite_extensions: default_extensions(),
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.files.iter().map(|(path, _)| *path)
    }

    fn get(&self, path: &str) -> Option<&'static [u8]> {
        self.files
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, bytes)| *bytes)
    }
}

impl AssetProvider for EmbeddedProvider {
    fn list_text_sources(&self, base_path: &str) -> anyhow::Result<Vec<TextSource>> {
        let base = base_path.trim_matches('/');
        let mut sources: Vec<TextSource> = self
            .files
            .iter()
            .filter(|(name, _)| {
                let parent = name.rsplit_once('/').map_or("", |(dir, _)| dir);
                parent == base && is_csv(Path::new(name))
            })
            .map(|(name, bytes)| TextSource::new(*name, *bytes))
            .collect();
        sources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sources)
    }

    fn load_sprite(&self, path: &str) -> Option<SpriteHandle> {
        sprite_candidates(path, &self.sprite_extensions)
            .find_map(|candidate| self.get(&candidate))
            .map(|bytes| SpriteHandle::from_bytes(path, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_provider_lists_csv_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("Text");
        fs::create_dir_all(&text).unwrap();
        fs::write(text.join("b_menu.csv"), "KEY,English\nmenu,Menu\n").unwrap();
        fs::write(text.join("a_ui.CSV"), "KEY,English\nok,OK\n").unwrap();
        fs::write(text.join("notes.txt"), "ignored").unwrap();
        fs::create_dir_all(text.join("nested.csv")).unwrap();

        let provider = DirProvider::new(dir.path());
        let sources = provider.list_text_sources("Text").unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a_ui.CSV", "b_menu.csv"]);
        assert_eq!(sources[1].bytes.as_ref(), b"KEY,English\nmenu,Menu\n");
    }

    #[test]
    fn test_dir_provider_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let provider = DirProvider::new(dir.path());
        assert!(provider.list_text_sources("nope").unwrap().is_empty());
    }

    #[test]
    fn test_dir_provider_sprite_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Image")).unwrap();
        fs::write(dir.path().join("Image/logo_English.png"), [0x89u8, b'P']).unwrap();

        let provider = DirProvider::new(dir.path());
        let sprite = provider.load_sprite("Image/logo_English").unwrap();
        assert_eq!(sprite.path(), "Image/logo_English");
        assert_eq!(sprite.bytes(), Some(&[0x89u8, b'P'][..]));
        assert!(provider.load_sprite("Image/logo_Japanese").is_none());

        let no_ext = DirProvider::new(dir.path()).sprite_extensions(Vec::<String>::new());
        assert!(no_ext.load_sprite("Image/logo_English").is_none());
        assert!(no_ext.load_sprite("Image/logo_English.png").is_some());
    }

    #[test]
    fn test_embedded_provider() {
        static FILES: &[(&str, &[u8])] = &[
            ("Text/ui.csv", b"KEY,English\nok,OK\n"),
            ("Text/deeper/skip.csv", b"KEY,English\n"),
            ("Image/logo_English.png", b"png"),
            ("root.csv", b"KEY,English\n"),
        ];
        let provider = EmbeddedProvider::new(FILES);

        let sources = provider.list_text_sources("Text/").unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "Text/ui.csv");
        assert_eq!(provider.list_text_sources("").unwrap()[0].name, "root.csv");

        let sprite = provider.load_sprite("Image/logo_English").unwrap();
        assert_eq!(sprite.bytes(), Some(&b"png"[..]));
        assert_eq!(provider.files().count(), 4);
    }
}
