//! 多语言图片：命名约定与缓存
//!
//! 图片路径由模板生成，默认 `{base}/{key}_{language}`，例如 `Localization/Image/logo_English`。
//! `{language}` 是语言名（与表头写法一致），`{tag}` 是语言标签（`en`）。
//! 这是与资源打包约定好的格式，修改需同步资源命名。

use std::any::Any;
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use lingo_core::Language;
use regex::{Captures, Regex};

/// 共享的图片资源句柄，具体类型由资源提供方决定
#[derive(Clone)]
pub struct SpriteHandle {
    path: Arc<str>,
    resource: Arc<dyn Any + Send + Sync>,
}

impl SpriteHandle {
    pub fn new<T: Any + Send + Sync>(path: impl Into<Arc<str>>, resource: T) -> Self {
        Self {
            path: path.into(),
            resource: Arc::new(resource),
        }
    }

    /// 以原始字节作为资源
    pub fn from_bytes(path: impl Into<Arc<str>>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(path, bytes.into())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.resource.downcast_ref::<T>()
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.downcast_ref::<Vec<u8>>().map(Vec::as_slice)
    }

    /// 两个句柄是否指向同一份已加载的资源
    pub fn same_resource(&self, other: &SpriteHandle) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl fmt::Debug for SpriteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteHandle").field("path", &self.path).finish()
    }
}

fn template_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\{(base|key|language|tag)\}").expect("Invalid regex pattern"))
}

/// 按模板生成图片路径
///
/// 模板只展开一次，key 与 base 中出现的 `{tag}` 等文本原样保留。
pub fn sprite_path(template: &str, base: &str, key: &str, language: Language) -> String {
    let base = base.trim_end_matches('/');
    let template = if base.is_empty() {
        Cow::Owned(template.replace("{base}/", ""))
    } else {
        Cow::Borrowed(template)
    };
    template_regex()
        .replace_all(&template, |caps: &Captures| match &caps[1] {
            "base" => base,
            "key" => key,
            "language" => language.name(),
            _ => language.tag(),
        })
        .into_owned()
}

/// 路径 -> 图片句柄，加载失败的结果同样缓存
#[derive(Debug, Default)]
pub struct SpriteCache {
    entries: RefCell<HashMap<String, Option<SpriteHandle>>>,
}

impl SpriteCache {
    pub fn get_or_load<F>(&self, path: &str, load: F) -> Option<SpriteHandle>
    where
        F: FnOnce(&str) -> Option<SpriteHandle>,
    {
        if let Some(cached) = self.entries.borrow().get(path) {
            return cached.clone();
        }

        let loaded = load(path);
        self.entries
            .borrow_mut()
            .insert(path.to_string(), loaded.clone());
        loaded
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
