// End-to-end tests for the watch shop client
//
// Each test gets its own in-process mock backend (axum on an ephemeral
// port) and a fresh client pipeline over real HTTP: reqwest transport,
// in-memory storage and recording UI hooks.
//
// The mock backend only accepts the access token it currently considers
// valid, so tests can expire a token server-side and observe the client
// refreshing and replaying on its own.

mod helpers;
mod test_catalog;
mod test_customers;
mod test_refresh;
