//! Connection core: descriptor, session state, and the lifecycle driver.
//!
//! The only entry point from this module is [`Link`], which orchestrates
//! address resolution, wire intake, decode/dispatch, and reconnect timing.
//!
//! Internal modules:
//! - [`descriptor`]: parse-once connection descriptor and the URL seam;
//! - [`session`]: per-lifecycle mutable state handed to event handlers;
//! - [`lifecycle`]: the driver loop wiring bus, backoff, codec, transport.

mod descriptor;
mod lifecycle;
mod session;

pub use descriptor::{ConnectionDescriptor, RawTarget, Scheme, StdUrlParser, UrlParser};
pub use lifecycle::{Link, LinkHandle};
pub use session::{LinkState, Session};
