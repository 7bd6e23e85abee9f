//! JSON-lines request intake on stdin and outcome output on stdout.
//!
//! Each input line is one command:
//!
//! ```text
//! {"type":"start","id":1,"code":"addM9Ammo_25","viewer":"alice"}
//! {"type":"start","id":2,"code":"infiniteAmmo","viewer":"bob","duration_secs":10}
//! {"type":"cancel","id":2}
//! ```
//!
//! Every request produces exactly one [`EffectReport`] line on stdout.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use mgs2cc_core::{Dispatcher, EffectReport, EffectRequest, RequestId};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Line {
    Start {
        id: u64,
        code: String,
        #[serde(default = "anonymous")]
        viewer: String,
        #[serde(default)]
        duration_secs: Option<u64>,
    },
    Cancel {
        id: u64,
    },
}

fn anonymous() -> String {
    "Someone".to_string()
}

impl Line {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

fn request(id: u64, code: &str, viewer: String, duration_secs: Option<u64>) -> EffectRequest {
    let request = EffectRequest::from_code(RequestId(id), code, viewer);
    match duration_secs {
        Some(secs) => request.with_duration(Duration::from_secs(secs)),
        None => request,
    }
}

/// Read commands from stdin until EOF and hand them to `dispatcher`.
pub fn spawn_request_reader(dispatcher: Arc<Dispatcher>) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("Request reader started");
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let result = match Line::parse(&line) {
                Ok(Line::Start {
                    id,
                    code,
                    viewer,
                    duration_secs,
                }) => dispatcher
                    .submit(request(id, &code, viewer, duration_secs))
                    .map(|_| ()),
                Ok(Line::Cancel { id }) => dispatcher.cancel(RequestId(id)),
                Err(e) => {
                    warn!("Ignoring malformed request {:?}: {}", line, e);
                    continue;
                }
            };
            if let Err(e) = result {
                warn!("{}", e);
                break;
            }
        }
        debug!("Request reader stopped");
    })
}

/// Print every report as one JSON line until the sending side is gone.
pub fn spawn_report_printer(rx: Receiver<EffectReport>) -> JoinHandle<()> {
    thread::spawn(move || {
        for report in rx {
            match serde_json::to_string(&report) {
                Ok(json) => {
                    let mut stdout = io::stdout().lock();
                    if writeln!(stdout, "{json}").and_then(|_| stdout.flush()).is_err() {
                        warn!("stdout closed, dropping {}", report.id);
                    }
                }
                Err(e) => warn!("Failed to serialize report {}: {}", report.id, e),
            }
        }
    })
}
