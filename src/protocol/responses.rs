//! Server replies
//!
//! Reply keywords and the formatting/parsing of the replies that carry a value.

pub const FILE_COUNT: &str = "FileCnt";
pub const FILE_UNKNOWN: &str = "FileUnknown";
pub const START: &str = "Start";
pub const OK: &str = "OK";

/// `FileCnt <n>`
pub fn format_file_count(count: usize) -> String {
    format!("{} {}", FILE_COUNT, count)
}

/// `<name> <size>`
pub fn format_file_entry(name: &str, size: u64) -> String {
    format!("{} {}", name, size)
}

/// `Start <size>`
pub fn format_start(size: u64) -> String {
    format!("{} {}", START, size)
}

/// Parses `FileCnt <n>`
pub fn parse_file_count(line: &str) -> Option<usize> {
    parse_keyword_value(line, FILE_COUNT)
}

/// Parses `Start <size>`
pub fn parse_start(line: &str) -> Option<u64> {
    parse_keyword_value(line, START)
}

/// Parses a listing line. The size is the last token so names may contain spaces.
pub fn parse_file_entry(line: &str) -> Option<(String, u64)> {
    let (name, size) = line.trim().rsplit_once(' ')?;
    let size = size.parse().ok()?;
    let name = name.trim_end();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), size))
}

fn parse_keyword_value<T: std::str::FromStr>(line: &str, keyword: &str) -> Option<T> {
    let mut parts = line.split_whitespace();
    if parts.next()? != keyword {
        return None;
    }
    let value = parts.next()?.parse().ok()?;
    match parts.next() {
        Some(_) => None,
        None => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_replies() {
        assert_eq!(format_file_count(2), "FileCnt 2");
        assert_eq!(format_file_entry("a.txt", 5), "a.txt 5");
        assert_eq!(format_start(10), "Start 10");
    }

    #[test]
    fn test_parse_file_count() {
        assert_eq!(parse_file_count("FileCnt 3"), Some(3));
        assert_eq!(parse_file_count("FileCnt"), None);
        assert_eq!(parse_file_count("FileCnt -1"), None);
        assert_eq!(parse_file_count("Start 3"), None);
        assert_eq!(parse_file_count("FileCnt 3 4"), None);
    }

    #[test]
    fn test_parse_start() {
        assert_eq!(parse_start("Start 0"), Some(0));
        assert_eq!(parse_start("Start 123456789"), Some(123456789));
        assert_eq!(parse_start("FileUnknown"), None);
    }

    #[test]
    fn test_parse_file_entry() {
        assert_eq!(parse_file_entry("b.txt 10"), Some(("b.txt".to_string(), 10)));
        assert_eq!(
            parse_file_entry("my notes.txt 7"),
            Some(("my notes.txt".to_string(), 7))
        );
        assert_eq!(parse_file_entry("nosize"), None);
        assert_eq!(parse_file_entry(" 5"), None);
    }
}
