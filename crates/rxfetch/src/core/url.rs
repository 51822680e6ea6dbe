use crate::error::{Error, Result};

/// Join a target's base URL and path into the request URL.
///
/// Exactly one `/` separates the two parts. An empty path yields the base
/// URL unchanged apart from trailing slashes.
///
/// # Examples
///
/// ```
/// use rxfetch::endpoint_url;
///
/// let url = endpoint_url("https://api.example.com/v1/", "/users").unwrap();
/// assert_eq!(url, "https://api.example.com/v1/users");
/// ```
pub fn endpoint_url(base_url: &str, path: &str) -> Result<String> {
    let base = base_url.trim();
    let has_scheme = base.starts_with("http://") || base.starts_with("https://");
    let base = base.trim_end_matches('/');
    if !has_scheme || base.ends_with(':') {
        return Err(Error::InvalidUrl(base_url.to_string()));
    }

    let path = path.trim_start_matches('/');
    if path.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{base}/{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_separator() {
        assert_eq!(endpoint_url("http://h", "a").unwrap(), "http://h/a");
        assert_eq!(endpoint_url("http://h/", "/a").unwrap(), "http://h/a");
        assert_eq!(endpoint_url("http://h///", "//a/b").unwrap(), "http://h/a/b");
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(endpoint_url("https://h/v1/", "").unwrap(), "https://h/v1");
    }

    #[test]
    fn test_rejects_missing_scheme() {
        assert!(matches!(endpoint_url("example.com", "a"), Err(Error::InvalidUrl(_))));
        assert!(matches!(endpoint_url("", "a"), Err(Error::InvalidUrl(_))));
        assert!(matches!(endpoint_url("http://", "a"), Err(Error::InvalidUrl(_))));
    }
}
