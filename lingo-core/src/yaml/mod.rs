//! YAML 设置加载器，支持 `${VAR}` 与 `${VAR:默认值}` 形式的环境变量替换

use dotenvy::dotenv;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// YAML 加载器错误
#[derive(Debug, Error)]
pub enum YamlLoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

fn var_regex() -> &'static Regex {
    static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
    VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Z0-9_]+)(?::([^\}]*))?\}").expect("Invalid regex pattern")
    })
}

/// 替换内容中的环境变量占位符，变量不存在且没有默认值时替换为空串
fn replace_vars(content: &str) -> String {
    // 没有 .env 文件是常态
    let _ = dotenv();

    var_regex()
        .replace_all(content, |caps: &regex::Captures| {
            env::var(&caps[1])
                .unwrap_or_else(|_| caps.get(2).map_or("", |m| m.as_str()).to_string())
        })
        .into_owned()
}

/// 从文件加载 YAML 设置
pub fn load_from_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, YamlLoaderError> {
    let path = path.as_ref();
    log::debug!("Loading settings from {}", path.display());
    let content = fs::read_to_string(path)?;
    load_from_str(&content)
}

/// 从字符串加载 YAML 设置
pub fn load_from_str<T: DeserializeOwned>(content: &str) -> Result<T, YamlLoaderError> {
    let replaced = replace_vars(content);
    Ok(serde_yaml::from_str(&replaced)?)
}

/// 编译时嵌入 YAML 设置文件
#[macro_export]
macro_rules! include_settings {
    ($path:expr, $t:ty) => {
        $crate::yaml::load_from_str::<$t>(include_str!($path))
    };
}
