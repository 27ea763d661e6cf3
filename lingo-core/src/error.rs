use thiserror::Error;

use crate::yaml::YamlLoaderError;

/// 加载与解析阶段的硬错误
///
/// 查询阶段的缺失（缺 key、缺图片）不会走这里，而是作为诊断上报。
#[derive(Debug, Error)]
pub enum Error {
    /// 数据源中没有任何非空行
    #[error("source contains no non-blank lines")]
    EmptySource,

    /// 表头解析不出任何字段
    #[error("header row yields no columns")]
    NoColumns,

    /// 表头中的语言标识无法识别，或者请求了一个未加载的语言
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// 所有数据源都没有产出任何语言表
    #[error("no language tables were loaded")]
    NoLanguagesLoaded,

    #[error("settings error: {0}")]
    Settings(#[from] YamlLoaderError),

    /// 资源提供方（文件系统、内嵌资源等）返回的错误
    #[error("asset provider error: {0}")]
    Provider(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
