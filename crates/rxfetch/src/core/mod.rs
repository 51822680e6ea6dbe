//! Pure transformations over responses and URLs.

mod mapping;
mod url;

pub use url::endpoint_url;
