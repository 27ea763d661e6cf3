/// 解码一行中的反斜杠转义序列
///
/// 支持 `\n` `\r` `\t` `\0` `\\` `\"` `\'` 以及 `\uXXXX`，无法识别的序列原样保留。
pub fn unescape(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let decoded = match chars.peek().copied() {
            Some('n') => Some('\n'),
            Some('r') => Some('\r'),
            Some('t') => Some('\t'),
            Some('0') => Some('\0'),
            Some(c @ ('\\' | '"' | '\'')) => Some(c),
            Some('u') => {
                let hex: String = chars.clone().skip(1).take(4).collect();
                let code = Some(&hex)
                    .filter(|h| h.len() == 4 && h.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(|h| u32::from_str_radix(h, 16).ok())
                    .and_then(char::from_u32);
                if code.is_some() {
                    // 'u' 与前三位，最后一位在下面统一跳过
                    chars.nth(3);
                }
                code
            }
            _ => None,
        };

        match decoded {
            Some(c) => {
                out.push(c);
                chars.next();
            }
            None => out.push('\\'),
        }
    }
    out
}
