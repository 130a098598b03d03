use core_types::ErrorKind;

/// Maps a raw failure signal (error text and/or an HTTP-like status code) to
/// a canonical `ErrorKind`.
///
/// Rules are checked in order and the first match wins; matching is a
/// case-insensitive substring search over the combined status + text
/// context. The absence of any signal classifies as `Success`; this
/// function never fails.
pub fn classify(error_text: Option<&str>, status_code: Option<u16>) -> ErrorKind {
    let text = error_text.unwrap_or("").trim();
    if text.is_empty() && status_code.is_none() {
        return ErrorKind::Success;
    }

    let mut context = String::new();
    if let Some(status) = status_code {
        context.push_str(&status.to_string());
        context.push(' ');
    }
    context.push_str(&text.to_lowercase());

    if context.contains("429") || context.contains("rate limit") {
        ErrorKind::RateLimit
    } else if context.contains("401") || context.contains("403") || context.contains("unauthorized")
    {
        ErrorKind::AuthError
    } else if context.contains("404") || context.contains("not found") {
        ErrorKind::NotFound
    } else if context.contains("500") || context.contains("502") || context.contains("503") {
        ErrorKind::ServerError
    } else if context.contains("timeout")
        || context.contains("timed out")
        || context.contains("connection refused")
        || context.contains("connect error")
        || context.contains("dns error")
    {
        ErrorKind::NetworkError
    } else if context.contains("parse") || context.contains("malformed") {
        ErrorKind::ParseError
    } else {
        ErrorKind::UnknownError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_signal_is_success() {
        assert_eq!(classify(None, None), ErrorKind::Success);
        assert_eq!(classify(Some(""), None), ErrorKind::Success);
        assert_eq!(classify(Some("   "), None), ErrorKind::Success);
    }

    #[test]
    fn rate_limits_match_first() {
        assert_eq!(classify(None, Some(429)), ErrorKind::RateLimit);
        assert_eq!(
            classify(Some("Rate limit exceeded"), Some(200)),
            ErrorKind::RateLimit
        );
        // 429 wins over a later rule even when the text mentions the server.
        assert_eq!(
            classify(Some("server rejected: rate limit"), Some(500)),
            ErrorKind::RateLimit
        );
    }

    #[test]
    fn auth_and_not_found() {
        assert_eq!(classify(None, Some(401)), ErrorKind::AuthError);
        assert_eq!(classify(Some("Unauthorized key"), None), ErrorKind::AuthError);
        assert_eq!(classify(None, Some(404)), ErrorKind::NotFound);
        assert_eq!(classify(Some("token not found"), None), ErrorKind::NotFound);
    }

    #[test]
    fn server_and_network_errors() {
        assert_eq!(classify(None, Some(502)), ErrorKind::ServerError);
        assert_eq!(
            classify(Some("operation timed out"), None),
            ErrorKind::NetworkError
        );
        assert_eq!(
            classify(Some("connection refused"), None),
            ErrorKind::NetworkError
        );
    }

    #[test]
    fn parse_and_unknown() {
        assert_eq!(
            classify(Some("failed to parse response body"), None),
            ErrorKind::ParseError
        );
        assert_eq!(
            classify(Some("something inexplicable"), None),
            ErrorKind::UnknownError
        );
        // A bare unfamiliar status is still a signal, just an unclassified one.
        assert_eq!(classify(None, Some(418)), ErrorKind::UnknownError);
    }
}
