//! Generated metadata artifacts.
//!
//! - **Manifest**: web-app manifest (`manifest.json`) and the matching
//!   `<head>` fragment for the page renderer
//! - **Appcache**: offline cache manifest (`manifest.appcache`)

pub mod appcache;
pub mod manifest;
