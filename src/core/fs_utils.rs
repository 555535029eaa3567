//! Filesystem helpers

use std::io::Write;
use std::path::Path;

/// Write `content` to `path` atomically (temp file in the same directory,
/// then rename), so a crash never leaves a half-written formula behind.
pub fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let temp_path = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id()
    ));

    let mut temp_file = std::fs::File::create(&temp_path)?;
    let written = temp_file
        .write_all(content.as_bytes())
        .and_then(|()| temp_file.sync_all());
    drop(temp_file);

    if let Err(e) = written.and_then(|()| std::fs::rename(&temp_path, path)) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(())
}
