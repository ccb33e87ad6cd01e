//! End-to-end tests for the `/api/search` surface.
//!
//! Backend-sensitive tests run on the in-memory store and, when
//! `database.test_database_url` is set, again on Postgres.

#[allow(unused)]
#[path = "../support/mod.rs"]
mod support;

mod auth;
mod paging;
mod sorting;
