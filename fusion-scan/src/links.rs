//! Detection of remote d-scan links in message tokens

use regex::Regex;
use std::sync::LazyLock;

use fusion_core::Token;

static ADASHBOARD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://adashboard\.info/intel/dscan/view/([A-Za-z0-9]+)").unwrap()
});

static DSCAN_INFO_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://dscan\.info/v/([A-Za-z0-9]+)").unwrap()
});

/// A link to a shared scan on one of the supported services
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanLink {
    /// adashboard.info, served as JSON
    Adashboard { id: String },
    /// dscan.info, served as HTML
    DscanInfo { id: String },
}

impl ScanLink {
    pub fn service(&self) -> &'static str {
        match self {
            ScanLink::Adashboard { .. } => "adashboard",
            ScanLink::DscanInfo { .. } => "dscan.info",
        }
    }
}

fn capture_id(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse a single URL into a scan link
pub fn parse_scan_link(url: &str) -> Option<ScanLink> {
    if let Some(id) = capture_id(&ADASHBOARD_REGEX, url) {
        return Some(ScanLink::Adashboard { id });
    }
    capture_id(&DSCAN_INFO_REGEX, url).map(|id| ScanLink::DscanInfo { id })
}

/// Find the scan link to use for a message.
///
/// adashboard links take priority over dscan.info links anywhere in the
/// message; within a service the first link wins.
pub fn find_scan_link(tokens: &[Token]) -> Option<ScanLink> {
    let words = || tokens.iter().flat_map(|token| token.words.iter());

    if let Some(id) = words().find_map(|word| capture_id(&ADASHBOARD_REGEX, word)) {
        return Some(ScanLink::Adashboard { id });
    }
    words()
        .find_map(|word| capture_id(&DSCAN_INFO_REGEX, word))
        .map(|id| ScanLink::DscanInfo { id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_core::TokenType;

    fn url(text: &str) -> Token {
        Token::new(&[text], vec![TokenType::Url])
    }

    #[test]
    fn test_parse_adashboard() {
        assert_eq!(
            parse_scan_link("https://adashboard.info/intel/dscan/view/aB3dE9"),
            Some(ScanLink::Adashboard {
                id: "aB3dE9".to_string()
            })
        );
    }

    #[test]
    fn test_parse_dscan_info() {
        assert_eq!(
            parse_scan_link("http://dscan.info/v/7f3c1a2b9d"),
            Some(ScanLink::DscanInfo {
                id: "7f3c1a2b9d".to_string()
            })
        );
    }

    #[test]
    fn test_unrelated_urls_ignored() {
        assert_eq!(parse_scan_link("https://zkillboard.com/kill/123/"), None);
        assert_eq!(parse_scan_link("https://dscan.info/about"), None);
    }

    #[test]
    fn test_adashboard_wins_over_earlier_dscan_info() {
        let tokens = vec![
            url("https://dscan.info/v/first"),
            url("https://adashboard.info/intel/dscan/view/second"),
        ];
        assert_eq!(
            find_scan_link(&tokens),
            Some(ScanLink::Adashboard {
                id: "second".to_string()
            })
        );
    }

    #[test]
    fn test_no_link() {
        let tokens = vec![Token::new(&["Jita"], vec![])];
        assert_eq!(find_scan_link(&tokens), None);
    }
}
