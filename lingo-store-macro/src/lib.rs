use proc_macro::TokenStream;
use quote::quote;
use std::path::{Path, PathBuf};
use syn::{LitStr, parse_macro_input};

/// 把资源目录内嵌进二进制，展开为 `lingo_store::EmbeddedProvider`
///
/// 路径相对于调用方的 `CARGO_MANIFEST_DIR`，会递归收录目录下的全部文件：
///
/// ```ignore
/// let provider = locale_assets!("assets");
/// let store = LocaleStore::builder(provider).build()?;
/// ```
#[proc_macro]
pub fn locale_assets(input: TokenStream) -> TokenStream {
    let dir = parse_macro_input!(input as LitStr);
    match expand(&dir.value()) {
        Ok(tokens) => tokens.into(),
        Err(message) => syn::Error::new(dir.span(), message).to_compile_error().into(),
    }
}

fn expand(dir: &str) -> Result<proc_macro2::TokenStream, String> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map_err(|e| format!("Failed to get manifest dir: {}", e))?;

    let dir_path = Path::new(&manifest_dir).join(dir);
    if !dir_path.is_dir() {
        return Err(format!("locale asset directory not found: {}", dir_path.display()));
    }

    let entries = collect_files(&dir_path)?;
    let files = entries.iter().map(|(relative, absolute)| {
        // include_bytes! 同时让编译器监视文件变化
        quote! { (#relative, include_bytes!(#absolute)) }
    });

    Ok(quote! {
        {
            static LOCALE_ASSETS: &[(&str, &[u8])] = &[ #(#files),* ];
            ::lingo_store::EmbeddedProvider::new(LOCALE_ASSETS)
        }
    })
}

/// 递归列出目录下的文件，返回 (以 `/` 分隔的相对路径, 绝对路径)，按相对路径排序
fn collect_files(dir: &Path) -> Result<Vec<(String, String)>, String> {
    let pattern = format!("{}/**/*", glob::Pattern::escape(&dir.to_string_lossy()));
    let paths = glob::glob(&pattern).map_err(|e| format!("Invalid asset pattern: {}", e))?;

    let mut files = Vec::new();
    for entry in paths {
        let path: PathBuf = entry.map_err(|e| format!("Path error: {}", e))?;
        if !path.is_file() {
            continue;
        }

        let absolute = path
            .canonicalize()
            .map_err(|e| format!("Failed to resolve {}: {}", path.display(), e))?;
        let relative = relative_path(dir, &path)
            .ok_or_else(|| format!("Non UTF-8 asset path: {}", path.display()))?;
        let absolute = absolute
            .to_str()
            .ok_or_else(|| format!("Non UTF-8 asset path: {}", absolute.display()))?
            .to_string();
        files.push((relative, absolute));
    }

    files.sort();
    Ok(files)
}

fn relative_path(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}
