//! REST plumbing: the transport seam, the reqwest-backed client, and the
//! header and body helpers the stores use around each request.

pub mod clean;
pub mod http;
pub mod links;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpTransport;
pub use links::Links;
pub use transport::{ApiRequest, ApiResponse, Method, Transport};
