//! Home-directory resolution for the server.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory.
///
/// - `configured`: the raw value from configuration, if any. A leading `~`
///   is expanded against the platform home directory.
/// - `default_subdir`: subdirectory under the platform home used when no
///   value was configured (e.g. `.contacts-server`).
/// - `create`: create the resolved directory if it does not exist.
///
/// The returned path is always absolute.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured {
        Some(raw) => expand_user(&raw)?,
        None => platform_home()?.join(default_subdir),
    };

    let absolute = if resolved.is_relative() {
        std::env::current_dir()
            .context("cannot determine current directory")?
            .join(resolved)
    } else {
        resolved
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("cannot create home dir {}", absolute.display()))?;
    }

    Ok(absolute)
}

/// Expand a leading `~` or `~/` into the platform home directory.
fn expand_user(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_home()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

/// Platform home directory: `%APPDATA%` on Windows, `$HOME` elsewhere.
fn platform_home() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    std::env::var_os(var)
        .map(PathBuf::from)
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| anyhow!("{} is not set; cannot resolve home directory", var))
}

/// Resolve a path against `base_dir` unless it is already absolute.
pub fn resolve_under(base_dir: &Path, value: &str) -> PathBuf {
    let p = Path::new(value);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let wanted = tmp.path().join("srv-home");
        let got = resolve_home_dir(
            Some(wanted.to_string_lossy().to_string()),
            ".contacts-server",
            true,
        )
        .unwrap();
        assert_eq!(got, wanted);
        assert!(got.exists());
    }

    #[test]
    fn tilde_is_expanded() {
        let tmp = tempdir().unwrap();
        #[cfg(target_os = "windows")]
        std::env::set_var("APPDATA", tmp.path());
        #[cfg(not(target_os = "windows"))]
        std::env::set_var("HOME", tmp.path());

        let got = resolve_home_dir(Some("~/nested".into()), ".contacts-server", false).unwrap();
        assert!(got.is_absolute());
        assert!(got.starts_with(tmp.path()));
        assert!(got.ends_with("nested"));
    }

    #[test]
    fn default_subdir_under_platform_home() {
        let tmp = tempdir().unwrap();
        #[cfg(target_os = "windows")]
        std::env::set_var("APPDATA", tmp.path());
        #[cfg(not(target_os = "windows"))]
        std::env::set_var("HOME", tmp.path());

        let got = resolve_home_dir(None, ".contacts-server", false).unwrap();
        assert!(got.ends_with(".contacts-server"));
    }

    #[test]
    fn resolve_under_keeps_absolute_paths() {
        let tmp = tempdir().unwrap();
        let abs = tmp.path().join("a.log");
        assert_eq!(
            resolve_under(tmp.path(), &abs.to_string_lossy()),
            abs.clone()
        );
        assert_eq!(resolve_under(tmp.path(), "rel.log"), tmp.path().join("rel.log"));
    }
}
