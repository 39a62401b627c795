//! # Example: reconnect
//!
//! Demonstrates how a [`Link`] automatically retries a flaky channel
//! according to [`BackoffOptions`], and how the retry budget eventually
//! runs dry and surfaces a terminal `end` event.
//!
//! ## Flow
//! ```text
//! run()
//!   ├─► publish(connect)          open #1 → refused
//!   ├─► backoff 100ms             open #2 → refused
//!   ├─► backoff ≈400ms            open #3 → opened, 3 ticks, closed
//!   ├─► ...reconnects until the budget is spent...
//!   └─► publish(end{retry_exhausted})
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example reconnect
//! ```

use std::time::Duration;

use bytes::Bytes;
use relink::{
    topic, BackoffOptions, Config, JsonCodec, Link, Payload, Transport, TransportError, WireIntake,
};

/// Wire that refuses its first two opens, then delivers a few ticks and
/// drops the channel again.
struct FlakyWire {
    opens: usize,
}

impl Transport for FlakyWire {
    fn open(&mut self, uri: &str, intake: WireIntake) {
        self.opens += 1;
        println!("[wire] open #{} -> {uri}", self.opens);

        if self.opens <= 2 {
            intake.closed(Some("connection refused"));
            return;
        }

        intake.opened();
        for n in 1..=3 {
            intake.data(format!(r#"{{"tick":{n}}}"#).into_bytes());
        }
        intake.closed(Some("server went away"));
    }

    fn send(&mut self, _frame: Bytes) -> Result<(), TransportError> {
        Ok(())
    }

    fn close(&mut self) {
        println!("[wire] close");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Small budget and short delays so the demo ends quickly.
    let cfg = Config {
        backoff: BackoffOptions {
            min: Duration::from_millis(100),
            max: Some(Duration::from_secs(2)),
            retries: 4,
            factor: 2.0,
        },
        reset_on_open: false,
    };

    // 2. Build the link around the flaky wire.
    let mut link = Link::new(
        "https://demo.local/live?room=7",
        JsonCodec,
        Box::new(FlakyWire { opens: 0 }),
        cfg,
    )?;

    // 3. Observe the whole lifecycle.
    link.subscribe(topic::CONNECT, |_s, p| {
        if let Payload::Intent { uri, .. } = p {
            println!("[connect] {uri}");
        }
    })
    .subscribe(topic::RECONNECT, |_s, p| {
        if let Payload::Intent { attempt, .. } = p {
            println!("[reconnect] attempt={attempt}");
        }
    })
    .subscribe(topic::OPEN, |_s, _p| {
        println!("[open]");
    })
    .subscribe(topic::DATA, |_s, p| {
        if let Some(msg) = p.message() {
            println!("[data] {msg}");
        }
    })
    .subscribe(topic::END, |_s, p| {
        if let Payload::End(reason) = p {
            println!("[end] {}", reason.as_label());
        }
    });

    // 4. Drive until the retry budget is spent.
    let reason = link.run().await;
    println!("[main] done: {}", reason.as_label());
    Ok(())
}
