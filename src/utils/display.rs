//! Output formatting utilities

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::time::Duration;

/// Format a duration as a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        return format!("{} ms", ms);
    }
    let seconds = duration.as_secs_f64();
    if seconds < 60.0 {
        return format!("{:.2} s", seconds);
    }
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else {
        format!("{}m {}s", minutes, secs)
    }
}

/// Write a text file, refusing to clobber an existing one unless asked.
pub fn write_file_checked(path: &Path, content: &str, overwrite: bool) -> Result<()> {
    if !overwrite && path.exists() {
        bail!("file already exists: {}", path.display());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Terminal colors for status output.
#[derive(Debug, Clone, Copy)]
pub enum Color {
    Green,
    Red,
    Yellow,
    Blue,
}

impl Color {
    fn ansi_code(self) -> &'static str {
        match self {
            Color::Green => "32",
            Color::Red => "31",
            Color::Yellow => "33",
            Color::Blue => "34",
        }
    }
}

/// Whether the terminal accepts ANSI color codes. Honors the NO_COLOR
/// convention and dumb terminals (common in CI logs).
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    match std::env::var("TERM") {
        Ok(term) => term != "dumb",
        Err(_) => true,
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    pub fn colored(text: &str, color: Color) -> String {
        if !supports_color() {
            return text.to_string();
        }
        format!("\x1b[{}m{}\x1b[0m", color.ansi_code(), text)
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250 ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.50 s");
        assert_eq!(format_duration(Duration::from_secs(150)), "2m 30s");
        assert_eq!(format_duration(Duration::from_secs(3700)), "1h 1m 40s");
    }

    #[test]
    fn test_write_file_checked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out.txt");
        write_file_checked(&path, "hello", false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");

        // Refuses to overwrite by default
        assert!(write_file_checked(&path, "again", false).is_err());
        write_file_checked(&path, "again", true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "again");
    }

    #[test]
    fn test_colored_output() {
        let text = ColorOutput::success("done");
        assert!(text.contains("done"));
        if supports_color() {
            assert!(text.starts_with("\x1b[32m"));
            assert!(text.ends_with("\x1b[0m"));
        } else {
            assert_eq!(text, "done");
        }
    }
}
