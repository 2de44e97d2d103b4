//! Integration tests entrypoint

#[path = "support/mod.rs"]
mod support;

#[path = "integration/dispatch_test.rs"]
mod dispatch_test;

#[path = "integration/index_test.rs"]
mod index_test;

#[path = "integration/reconcile_api_test.rs"]
mod reconcile_api_test;

#[path = "integration/http_server_test.rs"]
mod http_server_test;
