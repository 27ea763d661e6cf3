//! 软性问题的上报通道
//!
//! 查询缺失、表格结构异常等都不会作为错误返回给调用方，而是交给 [`DiagnosticSink`]。
//! 默认的 [`TracingSink`] 把它们写成 `tracing` 日志。

use std::fmt;

use lingo_core::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// 当前语言中找不到 key，调用方拿到的是 key 本身
    MissingKey { language: Language, key: String },
    /// 图片加载失败，调用方拿到的是空句柄
    MissingAsset { path: String },
    /// 表头中出现引号
    QuotedHeader { source: String, field: usize },
    /// 数据源在引号内结束
    UnterminatedQuote { source: String, row: usize },
    /// 表头第一格不是 `KEY`
    MissingKeySentinel { source: String, found: String },
    /// 数据行的 key 为空，整行被跳过
    EmptyKey { source: String, row: usize },
    /// 非严格模式下跳过无法识别的语言列
    SkippedColumn {
        source: String,
        column: usize,
        code: String,
    },
    /// 整份数据源被拒绝，已加载的语言不受影响
    SourceRejected { source: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingKey { language, key } => {
                write!(f, "missing key '{}' in language {}", key, language)
            }
            Diagnostic::MissingAsset { path } => write!(f, "sprite not found at '{}'", path),
            Diagnostic::QuotedHeader { source, field } => write!(
                f,
                "{}: header field {} is quoted, results may be unreliable",
                source, field
            ),
            Diagnostic::UnterminatedQuote { source, row } => {
                write!(f, "{}: quoted field never closed (row {})", source, row)
            }
            Diagnostic::MissingKeySentinel { source, found } => write!(
                f,
                "{}: header must start with KEY, found '{}' (e.g. KEY,English,Japanese)",
                source, found
            ),
            Diagnostic::EmptyKey { source, row } => {
                write!(f, "{}: row {} has an empty key and was skipped", source, row)
            }
            Diagnostic::SkippedColumn {
                source,
                column,
                code,
            } => write!(
                f,
                "{}: column {} has unsupported language '{}' and was skipped",
                source, column, code
            ),
            Diagnostic::SourceRejected { source, reason } => {
                write!(f, "{}: source rejected: {}", source, reason)
            }
        }
    }
}

pub trait DiagnosticSink {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic),
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// 写入 `tracing` 日志
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::SourceRejected { .. } => tracing::error!("{}", diagnostic),
            Diagnostic::MissingKey { language, key } => {
                tracing::warn!(%language, key = %key, "{}", diagnostic)
            }
            _ => tracing::warn!("{}", diagnostic),
        }
    }
}
