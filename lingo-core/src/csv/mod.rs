//! 本地化表格使用的 CSV 方言

mod escape;
mod parser;
mod table;

pub use escape::unescape;
pub use parser::{ParseOptions, parse, parse_with};
pub use table::{ParseWarning, Table};
