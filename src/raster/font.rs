use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, StatementError};

/// Font files tried in order when no font is configured. Arabic-capable
/// faces come first.
const FONT_CANDIDATES: &[&str] = &[
    "NotoNaskhArabic-Regular.ttf",
    "NotoSansArabic-Regular.ttf",
    "NotoKufiArabic-Regular.ttf",
    "Amiri-Regular.ttf",
    "tahoma.ttf",
    "Tahoma.ttf",
    "arial.ttf",
    "Arial.ttf",
    "DejaVuSans.ttf",
    "FreeSans.ttf",
];

/// How deep to look below each font directory.
const MAX_SCAN_DEPTH: usize = 4;

/// Raw font file shared between page surfaces.
#[derive(Debug, Clone)]
pub struct FontData {
    path: PathBuf,
    data: Arc<Vec<u8>>,
}

impl FontData {
    /// Read a TrueType/OpenType file and check that it parses.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|e| StatementError::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if rustybuzz::Face::from_slice(&data, 0).is_none() {
            return Err(StatementError::Font {
                path: path.to_path_buf(),
                reason: "not a TrueType or OpenType font".to_string(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            data: Arc::new(data),
        })
    }

    /// First loadable candidate font found in the system font directories.
    pub fn discover() -> Option<Self> {
        let mut found: HashMap<String, PathBuf> = HashMap::new();
        for dir in system_font_dirs() {
            collect_font_files(&dir, 0, &mut found);
        }
        FONT_CANDIDATES.iter().find_map(|name| {
            let path = found.get(*name)?;
            match Self::load(path) {
                Ok(font) => {
                    debug!(path = %path.display(), "using system font");
                    Some(font)
                }
                Err(e) => {
                    debug!(error = %e, "skipping font");
                    None
                }
            }
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        self.data.as_slice()
    }
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    if let Some(windir) = std::env::var_os("WINDIR").map(PathBuf::from) {
        dirs.push(windir.join("Fonts"));
    }
    dirs
}

fn collect_font_files(dir: &Path, depth: usize, found: &mut HashMap<String, PathBuf>) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_font_files(&path, depth + 1, found);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            found.entry(name.to_string()).or_insert(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_font_error() {
        let err = FontData::load(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(matches!(err, StatementError::Font { .. }));
    }

    #[test]
    fn non_font_bytes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.ttf");
        fs::write(&path, b"definitely not a font").unwrap();
        let err = FontData::load(&path).unwrap_err();
        assert!(err.to_string().contains("not a TrueType"));
    }
}
