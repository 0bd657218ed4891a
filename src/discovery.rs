use std::env;
use std::path::PathBuf;

#[cfg(target_os = "windows")]
const LIBRARY_FILE_NAME: &str = "kiwi.dll";
#[cfg(target_os = "macos")]
const LIBRARY_FILE_NAME: &str = "libkiwi.dylib";
#[cfg(all(unix, not(target_os = "macos")))]
const LIBRARY_FILE_NAME: &str = "libkiwi.so";

/// Bare names and absolute paths handed straight to the platform loader.
pub(crate) fn default_library_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["kiwi.dll", "libkiwi.dll"]
    }
    #[cfg(target_os = "macos")]
    {
        &[
            "libkiwi.dylib",
            "/usr/local/lib/libkiwi.dylib",
            "/opt/homebrew/lib/libkiwi.dylib",
            "@rpath/libkiwi.dylib",
        ]
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        &[
            "libkiwi.so",
            "./libkiwi.so",
            "/usr/local/lib/libkiwi.so",
            "/usr/lib/libkiwi.so",
        ]
    }
}

/// Per-user install roots, most specific first.
fn user_install_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    #[cfg(target_os = "windows")]
    {
        if let Some(local_app_data) = env::var_os("LOCALAPPDATA") {
            roots.push(PathBuf::from(local_app_data).join("kiwi"));
        }
        if let Some(user_profile) = env::var_os("USERPROFILE") {
            roots.push(
                PathBuf::from(user_profile)
                    .join("AppData")
                    .join("Local")
                    .join("kiwi"),
            );
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home) = env::var_os("HOME") {
            roots.push(PathBuf::from(home).join(".local").join("kiwi"));
        }
    }
    roots
}

fn system_install_roots() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["C:\\kiwi", "C:\\Program Files\\Kiwi"]
    }
    #[cfg(target_os = "macos")]
    {
        &["/usr/local", "/opt/homebrew", "/usr/local/share/kiwi"]
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        &["/usr/local", "/usr/local/share/kiwi", "/usr/share/kiwi"]
    }
}

fn install_roots() -> impl Iterator<Item = PathBuf> {
    user_install_roots().into_iter().chain(
        system_install_roots()
            .iter()
            .map(|root| PathBuf::from(*root)),
    )
}

/// First existing library file under the per-user and system install roots.
pub(crate) fn discover_default_library_path() -> Option<PathBuf> {
    install_roots()
        .map(|root| root.join("lib").join(LIBRARY_FILE_NAME))
        .find(|path| path.exists())
}

/// `KIWI_MODEL_PATH` when set, otherwise the first existing
/// `models/cong/base` directory under the install roots.
pub(crate) fn discover_default_model_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("KIWI_MODEL_PATH") {
        return Some(PathBuf::from(path));
    }

    install_roots()
        .map(|root| root.join("models").join("cong").join("base"))
        .find(|path| path.exists())
}
