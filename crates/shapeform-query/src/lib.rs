#![doc = include_str!("../README.md")]

mod client;
mod error;
mod key;
mod query;
mod request;
mod transport;

pub use client::ApiClient;
pub use error::{ApiError, TransportError};
pub use key::{QueryKey, QueryOptions};
pub use query::{Endpoint, MutateOptions, QueryClient};
pub use request::{
    ApiRequest, ApiRoutes, CredentialsMode, HttpMethod, NO_CACHE_HEADER, RequestParams, Route,
};
pub use transport::{ApiResponse, ReqwestTransport, Transport, TransportOptions};
