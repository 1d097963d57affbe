mod settings;

pub use settings::{BrandSettings, Config, PageSettings, PdfSettings, RenderSettings};

use crate::error::{Result, StatementError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, or ~/.statement/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "statement") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        StatementError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".statement"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Relative output directories are resolved against the config directory.
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let path = expand_path(output_dir);
    if path.is_relative() {
        config_dir.join(path)
    } else {
        path
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(StatementError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(StatementError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| StatementError::ConfigParse { path, source: e })
}

/// Create the config directory with a template config.toml
pub fn init_config_dir(config_dir: &Path) -> Result<()> {
    if config_dir.exists() {
        return Err(StatementError::AlreadyInitialized(config_dir.to_path_buf()));
    }
    fs::create_dir_all(config_dir.join("output"))?;
    fs::write(config_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[brand]
title = "الغدير نقل و تخليص"
subtitle = "كشف حساب العميل (PDF)"

[page]
width = 595.28   # points (A4)
height = 841.89
scale = 2.0      # raster pixels per point, 2.0 is about 150dpi

[render]
jpeg_quality = 92
# font = "/usr/share/fonts/truetype/noto/NotoNaskhArabic-Regular.ttf"
default_currency = "USD"

[pdf]
output_dir = "output"   # relative to this directory
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        let defaults = Config::default();
        assert_eq!(config.brand.title, defaults.brand.title);
        assert_eq!(config.page.width, defaults.page.width);
        assert_eq!(config.page.scale, defaults.page.scale);
        assert_eq!(config.render.jpeg_quality, defaults.render.jpeg_quality);
        assert!(config.render.font.is_none());
        assert!(config.page.geometry().is_ok());
    }

    #[test]
    fn sections_are_optional() {
        let toml = "[page]\nwidth = 612.0\nheight = 792.0\nscale = 1.5\n";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.page.width, 612.0);
        assert_eq!(config.render.default_currency, "USD");
        assert_eq!(config.pdf.output_dir, "output");
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let toml = r#"
[brand]
title = "Acme"

[page]
scale = 1.5

[render]
default_currency = "IQD"

[pdf]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let defaults = Config::default();

        assert_eq!(config.brand.title, "Acme");
        assert_eq!(config.brand.subtitle, defaults.brand.subtitle);
        assert_eq!(config.page.scale, 1.5);
        assert_eq!(config.page.width, defaults.page.width);
        assert_eq!(config.page.height, defaults.page.height);
        assert_eq!(config.render.default_currency, "IQD");
        assert_eq!(config.render.jpeg_quality, defaults.render.jpeg_quality);
        assert_eq!(config.pdf.output_dir, "output");
        assert!(config.page.geometry().is_ok());
    }

    #[test]
    fn zero_page_size_fails_geometry() {
        let toml = "[page]\nwidth = 0.0\nheight = 792.0\nscale = 2.0\n";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(
            config.page.geometry(),
            Err(StatementError::Configuration(_))
        ));
    }

    #[test]
    fn relative_output_dir_is_under_config_dir() {
        let dir = Path::new("/tmp/statement-config");
        assert_eq!(resolve_output_dir("output", dir), dir.join("output"));
        assert_eq!(resolve_output_dir("/srv/pdf", dir), PathBuf::from("/srv/pdf"));
    }

    #[test]
    fn init_then_load() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("cfg");
        init_config_dir(&dir).unwrap();
        assert!(dir.join("output").is_dir());
        let config = load_config(&dir).unwrap();
        assert_eq!(config.render.jpeg_quality, 92);
        assert!(matches!(
            init_config_dir(&dir),
            Err(StatementError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn broken_toml_reports_path() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("config.toml"), "[page\nwidth=").unwrap();
        let err = load_config(temp.path()).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
