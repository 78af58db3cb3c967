//! Backend integrations for the Facturas client.

pub mod http_group_api;

pub use crate::http_group_api::HttpGroupApi;
