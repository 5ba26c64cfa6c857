//! Generic outbound HTTP connector.
//!
//! # Overview
//! Sends one HTTP request per action against a configured base URL and
//! reduces whatever comes back (JSON, XML, HTML, plain text or nothing) to a
//! uniform success/failure `ActionResult`.
//!
//! # Design
//! - `Connector` validates configuration once and routes every action
//!   through a single `Dispatcher`.
//! - The `Dispatcher` builds a plain-data `HttpRequest`; a `Transport`
//!   (`UreqTransport` in production) is the only place that does I/O.
//! - `classify` turns an `HttpResponse` into an `Outcome` with one pure
//!   function per `ContentCategory`.
//! - Failures are rendered through `ErrorDetail` so every message has the
//!   same shape.

pub mod action;
pub mod classify;
pub mod config;
pub mod connector;
pub mod dispatch;
pub mod error;
pub mod html;
pub mod http;
pub mod normalize;
pub mod transport;
pub mod xml;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{ActionKind, ActionParams, ActionResult, ActionStatus, ResponseData, Summary};
pub use classify::{classify, ContentCategory, Outcome, ParsedBody};
pub use config::{Auth, ConnectorConfig, Settings};
pub use connector::Connector;
pub use dispatch::{Call, Dispatcher};
pub use error::{ConfigError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use normalize::ErrorDetail;
pub use transport::{Transport, UreqTransport};
