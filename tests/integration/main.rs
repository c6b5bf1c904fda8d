//! Integration tests driving the HTTP API end to end.

mod auth_test;
mod health_test;
mod helpers;
mod oauth_test;
