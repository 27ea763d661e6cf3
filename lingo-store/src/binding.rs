//! 与具体界面技术无关的本地化绑定
//!
//! 界面层只需要实现 [`TextDisplay`] 或 [`SpriteDisplay`]，再把 [`LocaleText`] /
//! [`LocaleSprite`] 注册为观察者，语言切换时就会自动刷新。

use std::cell::RefCell;

use lingo_core::{Language, Result};
use tracing::warn;

use crate::notifier::Observer;
use crate::sprite::SpriteHandle;
use crate::store::LocaleStore;

/// 能显示一段文本的界面元素
pub trait TextDisplay {
    fn update_display(&self, text: &str);
}

/// 能显示一张图片的界面元素，`None` 表示图片缺失
pub trait SpriteDisplay {
    fn update_sprite(&self, sprite: Option<&SpriteHandle>);
}

/// 按 key 与参数显示本地化文本
pub struct LocaleText<D> {
    display: D,
    key: RefCell<String>,
    args: RefCell<Vec<String>>,
}

impl<D: TextDisplay> LocaleText<D> {
    pub fn new(display: D, key: impl Into<String>) -> Self {
        Self {
            display,
            key: RefCell::new(key.into()),
            args: RefCell::new(Vec::new()),
        }
    }

    pub fn with_args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.args.borrow_mut() = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn key(&self) -> String {
        self.key.borrow().clone()
    }

    /// 换一个 key 并立即刷新
    pub fn update_key(&self, store: &LocaleStore, key: impl Into<String>) {
        *self.key.borrow_mut() = key.into();
        self.localize(store);
    }

    /// 换一组参数并立即刷新
    pub fn update_args<I, S>(&self, store: &LocaleStore, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.args.borrow_mut() = args.into_iter().map(Into::into).collect();
        self.localize(store);
    }
}

impl<D: TextDisplay> Observer for LocaleText<D> {
    fn localize(&self, store: &LocaleStore) {
        let text = {
            let key = self.key.borrow();
            let args = self.args.borrow();
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            store.get_text(&key, &args)
        };
        self.display.update_display(&text);
    }
}

/// 按 key 显示当前语言对应的图片
pub struct LocaleSprite<D> {
    display: D,
    key: RefCell<String>,
}

impl<D: SpriteDisplay> LocaleSprite<D> {
    pub fn new(display: D, key: impl Into<String>) -> Self {
        Self {
            display,
            key: RefCell::new(key.into()),
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn update_key(&self, store: &LocaleStore, key: impl Into<String>) {
        *self.key.borrow_mut() = key.into();
        self.localize(store);
    }
}

impl<D: SpriteDisplay> Observer for LocaleSprite<D> {
    fn localize(&self, store: &LocaleStore) {
        let sprite = store.get_sprite(&self.key.borrow());
        self.display.update_sprite(sprite.as_ref());
    }
}

/// 语言选单中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOption {
    pub language: Language,
    pub name: String,
}

/// 语言选单
///
/// 选项取自设置中的 `languages`；未配置时列出全部已加载的语言，名称为语言名。
#[derive(Debug, Clone)]
pub struct LanguagePicker {
    options: Vec<LanguageOption>,
}

impl LanguagePicker {
    pub fn new(store: &LocaleStore) -> Self {
        let configured = &store.settings().languages;
        let options = if configured.is_empty() {
            store
                .languages()
                .iter()
                .map(|&language| LanguageOption {
                    language,
                    name: language.name().to_string(),
                })
                .collect()
        } else {
            configured
                .iter()
                .map(|supported| LanguageOption {
                    language: supported.language,
                    name: supported.name.clone(),
                })
                .collect()
        };
        Self { options }
    }

    pub fn options(&self) -> &[LanguageOption] {
        &self.options
    }

    /// 当前语言在选单中的位置
    pub fn selected_index(&self, store: &LocaleStore) -> Option<usize> {
        let current = store.current_language();
        self.options.iter().position(|o| o.language == current)
    }

    /// 选择第 `index` 项并切换语言；越界时忽略并返回 `Ok(false)`
    pub fn select(&self, store: &mut LocaleStore, index: usize) -> Result<bool> {
        let Some(option) = self.options.get(index) else {
            warn!(index, options = self.options.len(), "Language option out of range");
            return Ok(false);
        };
        store.set_active_language(option.language)
    }
}
