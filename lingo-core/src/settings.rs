//! 本地化系统设置
//!
//! ```yaml
//! text_path: ${LINGO_TEXT_PATH:Localization/Text}
//! image_path: Localization/Image
//! sprite_template: "{base}/{key}_{language}"
//! preferred_language: English
//! arg_mode: literal
//! languages:
//!   - { language: English, name: English }
//!   - { language: ChineseTraditional, name: 繁體中文 }
//! log:
//!   level: info
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::csv::ParseOptions;
use crate::error::Result;
use crate::language::Language;
use crate::yaml;

/// 默认图片命名约定：`{base}/{key}_{language}`，`{language}` 为语言名（如 `English`）
pub const DEFAULT_SPRITE_TEMPLATE: &str = "{base}/{key}_{language}";

/// 参数替换方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgMode {
    /// 参数按字面值替换
    #[default]
    Literal,
    /// 参数若是当前语言中的 key，先替换成对应文本
    ResolveKeys,
}

/// 语言选单中显示的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLanguage {
    pub language: Language,
    /// 该语言的原文名称
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub console: bool,
    pub file: bool,
    pub dir: PathBuf,
    pub file_prefix: String,
    /// 保留的滚动日志文件数量
    pub max_files: Option<usize>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: true,
            file: false,
            dir: PathBuf::from("./logs"),
            file_prefix: "lingo.log".to_string(),
            max_files: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleSettings {
    /// 文本表格所在目录（相对于资源根目录）
    pub text_path: String,
    /// 图片所在目录（相对于资源根目录）
    pub image_path: String,
    /// 图片路径模板，可用 `{base}` `{key}` `{language}` `{tag}`
    pub sprite_template: String,
    /// 指定初始语言，未指定时使用系统语言
    pub preferred_language: Option<Language>,
    pub arg_mode: ArgMode,
    /// 解析前解码反斜杠转义
    pub unescape_sequences: bool,
    /// 表头语言无法识别时拒绝整份文件；关闭后只跳过该列
    pub strict_headers: bool,
    pub languages: Vec<SupportedLanguage>,
    pub log: LogSettings,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            text_path: "Localization/Text".to_string(),
            image_path: "Localization/Image".to_string(),
            sprite_template: DEFAULT_SPRITE_TEMPLATE.to_string(),
            preferred_language: None,
            arg_mode: ArgMode::Literal,
            unescape_sequences: false,
            strict_headers: true,
            languages: Vec::new(),
            log: LogSettings::default(),
        }
    }
}

impl LocaleSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(yaml::load_from_file(path)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(yaml::load_from_str(content)?)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            unescape: self.unescape_sequences,
        }
    }
}
