use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"<(\d+)>").expect("Invalid regex pattern"))
}

/// 将文本中的 `<i>` 替换为 `args[i]`
///
/// 单次扫描：替换进去的参数内容不会再被当作占位符处理。
/// 下标超出参数个数的占位符原样保留。
pub fn substitute<'a, S: AsRef<str>>(text: &'a str, args: &[S]) -> Cow<'a, str> {
    if args.is_empty() {
        return Cow::Borrowed(text);
    }

    placeholder_regex().replace_all(text, |caps: &Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|index| args.get(index))
            .map_or_else(|| caps[0].to_string(), |arg| arg.as_ref().to_string())
    })
}
