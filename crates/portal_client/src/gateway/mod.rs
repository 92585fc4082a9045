//! Request gateway: descriptor types, transport and response normalization.

mod client;
mod request;
mod response;

pub use client::Gateway;
pub use request::{ApiRequest, FilePart, MultipartPayload, RequestBody};
