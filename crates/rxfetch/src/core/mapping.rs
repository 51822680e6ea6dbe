use std::ops::RangeInclusive;

use serde::de::DeserializeOwned;

use crate::data::Response;
use crate::error::{Error, Result};

impl Response {
    /// Pass the response through if its status code lies in `range`.
    pub fn filter_status_codes(self, range: RangeInclusive<u16>) -> Result<Self> {
        if range.contains(&self.status_code) {
            Ok(self)
        } else {
            Err(Error::StatusCode(self))
        }
    }

    pub fn filter_status_code(self, code: u16) -> Result<Self> {
        self.filter_status_codes(code..=code)
    }

    /// Accepts 2xx.
    pub fn filter_successful_status_codes(self) -> Result<Self> {
        self.filter_status_codes(200..=299)
    }

    /// Accepts 2xx and 3xx.
    pub fn filter_successful_status_and_redirect_codes(self) -> Result<Self> {
        self.filter_status_codes(200..=399)
    }

    /// Deserialize the body as JSON.
    pub fn map_json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.data).map_err(|source| Error::JsonMapping {
            source,
            response: self.clone(),
        })
    }

    /// Decode the body as UTF-8.
    pub fn map_string(&self) -> Result<String> {
        String::from_utf8(self.data.to_vec()).map_err(|_| Error::StringMapping(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u32,
        name: String,
    }

    #[test]
    fn test_filter_successful_status_codes() {
        assert!(Response::new(200, "").filter_successful_status_codes().is_ok());
        assert!(Response::new(299, "").filter_successful_status_codes().is_ok());

        let err = Response::new(304, "").filter_successful_status_codes().unwrap_err();
        assert!(matches!(err, Error::StatusCode(ref r) if r.status_code == 304));
        assert_eq!(err.response().map(|r| r.status_code), Some(304));
    }

    #[test]
    fn test_filter_redirects_allowed() {
        assert!(Response::new(302, "").filter_successful_status_and_redirect_codes().is_ok());
        assert!(Response::new(404, "").filter_successful_status_and_redirect_codes().is_err());
    }

    #[test]
    fn test_filter_single_code() {
        assert!(Response::new(201, "").filter_status_code(201).is_ok());
        assert!(Response::new(200, "").filter_status_code(201).is_err());
    }

    #[test]
    fn test_map_json() {
        let response = Response::new(200, r#"{"id":7,"name":"ada"}"#);
        let user: User = response.map_json().unwrap();
        assert_eq!(user, User { id: 7, name: "ada".to_string() });

        let err = Response::new(200, "not json").map_json::<User>().unwrap_err();
        assert!(matches!(err, Error::JsonMapping { .. }));
    }

    #[test]
    fn test_map_string() {
        assert_eq!(Response::new(200, "hello").map_string().unwrap(), "hello");

        let err = Response::new(200, vec![0xff, 0xfe]).map_string().unwrap_err();
        assert!(matches!(err, Error::StringMapping(_)));
    }
}
