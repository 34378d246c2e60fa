//! Integration tests for nib-api
//!
//! Uses wiremock to simulate the NodeImage API and verifies end-to-end
//! behavior of the NodeImageClient and the NodeImageInventory adapter.

mod common;

mod test_download;
mod test_listing;
