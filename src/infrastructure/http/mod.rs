pub mod client;
pub mod envelope;
pub mod refresh;
pub mod request;
pub mod transport;

pub use client::{ApiClient, REFRESH_PATH};
pub use envelope::{normalize, Envelope};
pub use refresh::{RefreshCoordinator, RefreshTicket};
pub use request::ApiRequest;
pub use transport::{PreparedRequest, RawResponse, ReqwestTransport, Transport};
