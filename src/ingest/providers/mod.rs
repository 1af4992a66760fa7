// src/ingest/providers/mod.rs
//! Discovery routines selectable from the source catalog by `kind`.

pub mod html_link;

pub use html_link::HtmlLinkDiscovery;
