use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("URL contains credentials")]
    Credentials,
}

/// Validates a server-provided media URL before handing it to the system
/// browser. Only plain `http`/`https` links with a host are allowed.
///
/// ```
/// use quotedeck::util::validate_url_for_open;
///
/// assert!(validate_url_for_open("https://cdn.example.com/a.png").is_ok());
/// assert!(validate_url_for_open("file:///etc/passwd").is_err());
/// ```
pub fn validate_url_for_open(raw: &str) -> Result<Url, LinkError> {
    let url = Url::parse(raw.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(LinkError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(LinkError::MissingHost);
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(LinkError::Credentials);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(validate_url_for_open("http://example.com/x.jpg").is_ok());
        assert!(validate_url_for_open(" https://example.com/x.jpg ").is_ok());
    }

    #[test]
    fn test_rejects_other_schemes() {
        for raw in ["file:///etc/passwd", "javascript:alert(1)", "data:text/html,hi"] {
            assert!(
                matches!(
                    validate_url_for_open(raw),
                    Err(LinkError::UnsupportedScheme(_))
                ),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_rejects_credentials() {
        assert!(matches!(
            validate_url_for_open("https://user:pw@example.com/"),
            Err(LinkError::Credentials)
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            validate_url_for_open("not a url"),
            Err(LinkError::InvalidUrl(_))
        ));
    }
}
