pub mod interceptor;

pub use interceptor::{outgoing_headers, AUTHORIZATION, X_REQUEST_ID};
