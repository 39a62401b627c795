//! # Example: loopback
//!
//! An in-memory echo transport: every frame sent through the link comes
//! straight back as inbound data. Shows the subscribe / send / end round
//! trip without any real networking.
//!
//! ## Run
//! ```bash
//! cargo run --example loopback
//! ```

use bytes::Bytes;
use relink::{topic, Config, JsonCodec, Link, Transport, TransportError, WireIntake};
use serde_json::json;

/// Echoes every outbound frame back through the intake.
#[derive(Default)]
struct Loopback {
    intake: Option<WireIntake>,
}

impl Transport for Loopback {
    fn open(&mut self, _uri: &str, intake: WireIntake) {
        intake.opened();
        self.intake = Some(intake);
    }

    fn send(&mut self, frame: Bytes) -> Result<(), TransportError> {
        match &self.intake {
            Some(intake) => {
                intake.data(frame);
                Ok(())
            }
            None => Err(TransportError::NotOpen),
        }
    }

    fn close(&mut self) {
        self.intake = None;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut link = Link::new(
        "http://loopback.local/echo",
        JsonCodec,
        Box::new(Loopback::default()),
        Config::default(),
    )?;

    // Greet as soon as the channel opens; the echo arrives as `data`.
    link.subscribe(topic::OPEN, |session, _p| {
        println!("[open] {}", session.uri());
        if let Err(e) = session.send(&json!({"hello": "world"})) {
            eprintln!("[open] greeting failed: {e}");
        }
    })
    .subscribe(topic::DATA, |session, p| {
        if let Some(msg) = p.message() {
            println!("[echo] {msg}");
            session.end();
        }
    });

    let reason = link.run().await;
    println!("[main] done: {}", reason.as_label());
    Ok(())
}
