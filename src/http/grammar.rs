//! Character-level grammar for request lines and header fields (RFC 7230).

/// `tchar` from RFC 7230 section 3.2.6.
pub fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
}

/// `token = 1*tchar`, used for methods and header field names.
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_tchar)
}

/// A request target in origin form: a leading `/` followed by any run of
/// visible characters. The query string, if any, is part of the target.
pub fn is_target(s: &str) -> bool {
    s.starts_with('/') && s.chars().all(|c| !c.is_whitespace() && !c.is_control())
}

/// A field value: runs of non-whitespace characters separated by a single
/// SP or HTAB. Must not be empty or start/end with whitespace.
pub fn is_field_value(s: &str) -> bool {
    let mut prev_sep = true;
    for c in s.chars() {
        if c == ' ' || c == '\t' {
            if prev_sep {
                return false;
            }
            prev_sep = true;
        } else if c.is_whitespace() {
            return false;
        } else {
            prev_sep = false;
        }
    }
    !prev_sep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens() {
        assert!(is_token("GET"));
        assert!(is_token("X-Custom_Header.v2"));
        assert!(!is_token(""));
        assert!(!is_token("Bad Name"));
        assert!(!is_token("a,b"));
        assert!(!is_token("x:y"));
    }

    #[test]
    fn targets() {
        assert!(is_target("/"));
        assert!(is_target("/a/b?x=1&y=2"));
        assert!(!is_target("a/b"));
        assert!(!is_target("/a b"));
        assert!(!is_target(""));
    }

    #[test]
    fn field_values() {
        assert!(is_field_value("example.com"));
        assert!(is_field_value("text/html; q=0.9"));
        assert!(is_field_value("a\tb"));
        assert!(!is_field_value(""));
        assert!(!is_field_value("a  b"));
        assert!(!is_field_value(" a"));
        assert!(!is_field_value("a "));
    }
}
