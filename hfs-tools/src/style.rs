//! Trimmed-down terminal styling, reused from the DMG pipeline CLI's own
//! `style` module: just enough for verbose-mode phase banners.

pub(crate) const RESET: &str = "\x1b[0m";
pub(crate) const BOLD: &str = "\x1b[1m";
pub(crate) const DIM: &str = "\x1b[2m";
pub(crate) const GREEN: &str = "\x1b[32m";
pub(crate) const YELLOW: &str = "\x1b[33m";
pub(crate) const RED: &str = "\x1b[31m";

pub(crate) const DASH_LINE: &str = "────────────────────────────────────────────────────────────";

pub(crate) fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

pub(crate) fn section(title: &str) {
    println!("  {YELLOW}{BOLD}{title}{RESET}");
    println!("  {DIM}{DASH_LINE}{RESET}");
}

pub(crate) fn kv(key: &str, value: &str) {
    println!("  {DIM}{key:<16}{RESET} {value}");
}
