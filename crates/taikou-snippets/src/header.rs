//! Detection of Taikou5 event source files by their first line

use once_cell::sync::Lazy;
use regex::Regex;

static EVENT_FILE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^太[閣阁]立志[傳传][５5]事件源文件$").expect("valid header pattern"));

/// Whether `first_line` marks an event source file.
///
/// A leading BOM and anything from `//` on are ignored.
pub fn is_event_file(first_line: &str) -> bool {
    let line = first_line.strip_prefix('\u{feff}').unwrap_or(first_line);
    let header = match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    };
    EVENT_FILE_HEADER.is_match(header.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_header_variants() {
        assert!(is_event_file("太閣立志傳５事件源文件"));
        assert!(is_event_file("太阁立志传5事件源文件"));
        assert!(is_event_file("太閣立志传5事件源文件"));
    }

    #[test]
    fn test_ignores_bom_comment_and_whitespace() {
        assert!(is_event_file("\u{feff}太閣立志傳５事件源文件"));
        assert!(is_event_file("  太閣立志傳５事件源文件  // generated"));
    }

    #[test]
    fn test_rejects_other_lines() {
        assert!(!is_event_file(""));
        assert!(!is_event_file("// 太閣立志傳５事件源文件"));
        assert!(!is_event_file("太閣立志傳５事件源文件 extra"));
        assert!(!is_event_file("太閣立志傳4事件源文件"));
    }
}
