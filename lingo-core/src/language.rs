//! 支持的语言集合
//!
//! 表头里的语言标识既可以写系统语言名（`English`、`ChineseTraditional`），
//! 也可以写对应的语言标签（`en`、`zh-TW`）。名字区分大小写，标签不区分。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

macro_rules! languages {
    ($($variant:ident => $tag:literal),+ $(,)?) => {
        /// 一个受支持的语言
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum Language {
            $($variant),+
        }

        impl Language {
            pub const ALL: &'static [Language] = &[$(Language::$variant),+];

            /// 系统语言名，也是图片命名约定中使用的形式
            pub fn name(self) -> &'static str {
                match self {
                    $(Language::$variant => stringify!($variant)),+
                }
            }

            /// 语言标签，如 `en`、`zh-TW`
            pub fn tag(self) -> &'static str {
                match self {
                    $(Language::$variant => $tag),+
                }
            }
        }
    };
}

languages! {
    Afrikaans => "af",
    Arabic => "ar",
    Basque => "eu",
    Belarusian => "be",
    Bulgarian => "bg",
    Catalan => "ca",
    Chinese => "zh",
    ChineseSimplified => "zh-CN",
    ChineseTraditional => "zh-TW",
    Czech => "cs",
    Danish => "da",
    Dutch => "nl",
    English => "en",
    Estonian => "et",
    Faroese => "fo",
    Finnish => "fi",
    French => "fr",
    German => "de",
    Greek => "el",
    Hebrew => "he",
    Hindi => "hi",
    Hungarian => "hu",
    Icelandic => "is",
    Indonesian => "id",
    Italian => "it",
    Japanese => "ja",
    Korean => "ko",
    Latvian => "lv",
    Lithuanian => "lt",
    Norwegian => "no",
    Polish => "pl",
    Portuguese => "pt",
    Romanian => "ro",
    Russian => "ru",
    SerboCroatian => "sh",
    Slovak => "sk",
    Slovenian => "sl",
    Spanish => "es",
    Swedish => "sv",
    Thai => "th",
    Turkish => "tr",
    Ukrainian => "uk",
    Vietnamese => "vi",
}

impl Language {
    /// 按标签查找（不区分大小写，`_` 视同 `-`）
    pub fn from_tag(tag: &str) -> Option<Language> {
        let tag = tag.trim().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.tag().eq_ignore_ascii_case(&tag))
    }

    /// 将宿主环境的区域设置（如 `zh-Hant-HK`、`en_US.UTF-8`、`nb-NO`）映射到支持的语言
    ///
    /// 先整体匹配标签，再按中文脚本/地区区分简繁，最后退回主语言子标签。
    pub fn from_locale(locale: &str) -> Option<Language> {
        // 去掉 POSIX 形式的编码与修饰部分
        let locale = locale.split(['.', '@']).next().unwrap_or(locale);
        if let Some(lang) = Self::from_tag(locale) {
            return Some(lang);
        }

        let normalized = locale.trim().replace('_', "-").to_ascii_lowercase();
        let mut subtags = normalized.split('-');
        let primary = subtags.next().filter(|p| !p.is_empty())?;
        let rest: Vec<&str> = subtags.collect();

        match primary {
            "zh" => {
                if rest.iter().any(|s| matches!(*s, "hant" | "tw" | "hk" | "mo")) {
                    Some(Language::ChineseTraditional)
                } else if rest.iter().any(|s| matches!(*s, "hans" | "cn" | "sg")) {
                    Some(Language::ChineseSimplified)
                } else {
                    Some(Language::Chinese)
                }
            }
            "nb" | "nn" => Some(Language::Norwegian),
            "iw" => Some(Language::Hebrew),
            "in" => Some(Language::Indonesian),
            _ => Self::from_tag(primary),
        }
    }

    /// 按优先级列表（`zh-TW,zh;q=0.9,en;q=0.8`）挑选第一个可用语言
    pub fn preferred<'a>(
        priority_list: &str,
        available: impl IntoIterator<Item = &'a Language> + Clone,
    ) -> Option<Language> {
        parse_priority_list(priority_list)
            .iter()
            .filter_map(|tag| Self::from_locale(tag))
            .find(|lang| available.clone().into_iter().any(|a| a == lang))
    }
}

/// 解析带权重的语言优先级列表，按权重降序返回，权重相同时保持原顺序
///
/// `"zh-CN,zh;q=0.9,en;q=0.8"` -> `["zh-CN", "zh", "en"]`
pub fn parse_priority_list(list: &str) -> Vec<String> {
    let mut langs: Vec<(f32, String)> = list
        .split(',')
        .filter_map(|part| {
            let mut sections = part.split(';');
            let lang = sections.next()?.trim();
            if lang.is_empty() {
                return None;
            }
            let q_value = sections
                .next()
                .and_then(|q| q.trim().strip_prefix("q="))
                .and_then(|v| v.parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((q_value, lang.to_string()))
        })
        .collect();

    // sort_by 是稳定排序
    langs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    langs.into_iter().map(|(_, lang)| lang).collect()
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.name() == s)
            .or_else(|| Self::from_tag(s))
            .ok_or_else(|| Error::UnsupportedLanguage(s.to_string()))
    }
}

impl TryFrom<String> for Language {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_and_tag() {
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert_eq!(
            " ChineseTraditional ".parse::<Language>().unwrap(),
            Language::ChineseTraditional
        );
        assert_eq!("zh-tw".parse::<Language>().unwrap(), Language::ChineseTraditional);
        assert_eq!("ja".parse::<Language>().unwrap(), Language::Japanese);
    }

    #[test]
    fn test_parse_unsupported() {
        match "english".parse::<Language>() {
            Err(Error::UnsupportedLanguage(code)) => assert_eq!(code, "english"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!("".parse::<Language>().is_err());
    }

    #[test]
    fn test_from_locale() {
        assert_eq!(Language::from_locale("en-US"), Some(Language::English));
        assert_eq!(Language::from_locale("en_GB.UTF-8"), Some(Language::English));
        assert_eq!(Language::from_locale("zh-Hant-HK"), Some(Language::ChineseTraditional));
        assert_eq!(Language::from_locale("zh-CN"), Some(Language::ChineseSimplified));
        assert_eq!(Language::from_locale("zh-SG"), Some(Language::ChineseSimplified));
        assert_eq!(Language::from_locale("zh"), Some(Language::Chinese));
        assert_eq!(Language::from_locale("nb-NO"), Some(Language::Norwegian));
        assert_eq!(Language::from_locale("tlh"), None);
        assert_eq!(Language::from_locale(""), None);
    }

    #[test]
    fn test_parse_priority_list() {
        assert_eq!(
            parse_priority_list("fr;q=0.5, zh-CN,zh;q=0.9,en;q=0.8"),
            vec!["zh-CN", "zh", "en", "fr"]
        );
        assert!(parse_priority_list("").is_empty());
    }

    #[test]
    fn test_preferred() {
        let available = [Language::English, Language::Japanese];
        assert_eq!(
            Language::preferred("fr;q=0.9, ja;q=0.8, en;q=0.1", &available),
            Some(Language::Japanese)
        );
        assert_eq!(Language::preferred("fr", &available), None);
    }

    #[test]
    fn test_serde_uses_names() {
        let lang: Language = serde_yaml::from_str("zh-TW").unwrap();
        assert_eq!(lang, Language::ChineseTraditional);
        assert_eq!(serde_yaml::to_string(&Language::English).unwrap().trim(), "English");
    }
}
