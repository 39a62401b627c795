//! # relink
//!
//! **Relink** is a transport-agnostic real-time connection client for Rust.
//!
//! It manages the lifecycle of one logical connection — connect, receive
//! data, detect termination, and reconnect with randomized exponential
//! backoff — while delegating the actual wire transport and message codec
//! to pluggable collaborators injected by the embedding application.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐        ┌──────────────┐       ┌──────────────┐
//!     │  Transport   │        │    Codec     │       │  UrlParser   │
//!     │ (app-injected│        │ (app-injected│       │ (default or  │
//!     │  byte channel│        │  wire format)│       │ app-injected)│
//!     └──────┬───────┘        └──────┬───────┘       └──────┬───────┘
//!            │ WireIntake (FIFO)     │                      │ parse-once
//!            ▼                       ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Link (lifecycle driver)                                          │
//! │  - ConnectionDescriptor (resolved address, computed once)         │
//! │  - BackoffController (retry budget, randomized delays)            │
//! │  - EventBus (ordered synchronous dispatch)                        │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                 connect / reconnect / open / data / error / end
//!                                │
//!                    application handlers (subscribe)
//! ```
//!
//! ### Lifecycle
//! ```text
//! run()
//!   ├─► resolve target ─► publish(connect) ─► transport.open()
//!   ├─► wire Opened ─► publish(open)
//!   ├─► wire Data   ─► decode ─► publish(data) │ publish(error, opt-in)
//!   ├─► wire Closed ─► backoff.schedule()
//!   │        ├─ Ok(delay) ─► sleep ─► publish(reconnect) ─► open again
//!   │        └─ Err ─► publish(end{exhausted}), stop
//!   └─► end() ─► cancel pending retry ─► publish(end{closed}), stop
//! ```
//!
//! ## Features
//! | Area           | Description                                              | Key types / traits                  |
//! |----------------|----------------------------------------------------------|-------------------------------------|
//! | **Events**     | Subscribe to lifecycle topics (ordered, synchronous).    | [`EventBus`], [`Payload`], [`topic`]|
//! | **Backoff**    | Randomized exponential retry with a hard budget.         | [`BackoffController`], [`BackoffOptions`] |
//! | **Lifecycle**  | Connection supervision and explicit close.               | [`Link`], [`LinkHandle`], [`LinkState`] |
//! | **Seams**      | Injected transport, codec, and URL parsing.              | [`Transport`], [`Codec`], [`UrlParser`] |
//! | **Errors**     | Typed errors per failure domain.                         | [`LinkError`], [`RetryError`]       |
//!
//! ## Example
//! ```rust,no_run
//! use relink::{topic, Config, JsonCodec, Link, Transport, TransportError, WireIntake};
//! use bytes::Bytes;
//!
//! struct MyTransport;
//!
//! impl Transport for MyTransport {
//!     fn open(&mut self, uri: &str, intake: WireIntake) {
//!         // spawn the real wire driver here; report through `intake`
//!         let _ = uri;
//!         intake.opened();
//!     }
//!     fn send(&mut self, _frame: Bytes) -> Result<(), TransportError> { Ok(()) }
//!     fn close(&mut self) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut link = Link::new(
//!         "https://example.com/live?room=7",
//!         JsonCodec,
//!         Box::new(MyTransport),
//!         Config::default(),
//!     )?;
//!
//!     link.subscribe(topic::DATA, |_session, payload| {
//!         if let Some(msg) = payload.message() {
//!             println!("got {msg}");
//!         }
//!     });
//!
//!     let reason = link.run().await;
//!     println!("link ended: {}", reason.as_label());
//!     Ok(())
//! }
//! ```

mod backoff;
mod codec;
mod config;
mod error;
mod events;
mod link;
mod transport;

// ---- Public re-exports ----

pub use backoff::{BackoffController, BackoffOptions};
pub use codec::{Codec, JsonCodec};
pub use config::Config;
pub use error::{AddressError, CodecError, LinkError, RetryError, TransportError};
pub use events::{topic, EndReason, EventBus, Handler, Payload};
pub use link::{
    ConnectionDescriptor, Link, LinkHandle, LinkState, RawTarget, Scheme, Session, StdUrlParser,
    UrlParser,
};
pub use transport::{Transport, WireEvent, WireIntake};
