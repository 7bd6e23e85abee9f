//! Main effect mode: attach, serve requests, reattach on disconnect.

use std::sync::Arc;
use std::sync::mpsc;

use anyhow::Result;
use mgs2cc_core::config::timing;
use mgs2cc_core::{
    CancelSignal, ChannelReporter, Config, Connector, Dispatcher, Engine, LogSink, ProcessHandle,
    ProcessMemory, StateClassifier,
};
use tracing::{debug, info, warn};

use crate::requests;

pub fn run(config: &Config) -> Result<()> {
    let shutdown = Arc::new(CancelSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.cancel();
    })?;

    info!("mgs2cc {}", env!("CARGO_PKG_VERSION"));

    let connector = Arc::new(Connector::new());
    let classifier = Arc::new(StateClassifier::new(config.state.clone()));
    let engine = Arc::new(Engine::new(
        Arc::clone(&connector),
        Arc::clone(&classifier),
        Arc::new(LogSink),
        config.engine.clone(),
    ));

    let (report_tx, report_rx) = mpsc::channel();
    let dispatcher = Arc::new(Dispatcher::spawn(
        engine,
        Arc::new(ChannelReporter::new(report_tx)),
        config.engine.clone(),
    )?);
    let printer = requests::spawn_report_printer(report_rx);
    // Blocks on stdin; never joined
    let _reader = requests::spawn_request_reader(Arc::clone(&dispatcher));

    let executable = &config.process.executable;
    eprintln!("Waiting for {}... (Press Ctrl+C to quit)", executable);
    while !shutdown.is_cancelled() {
        match ProcessHandle::find_and_open(executable) {
            Ok(process) => {
                let process: Arc<dyn ProcessMemory> = Arc::new(process);
                match connector.attach(
                    Arc::clone(&process),
                    &config.addresses,
                    config.process.pointer_width,
                ) {
                    Ok(()) => {
                        info!("Attached to {}", executable);
                        watch(process.as_ref(), &connector, &classifier, &shutdown);
                        connector.detach();
                        classifier.reset();
                        info!("Detached, waiting for reconnect...");
                    }
                    Err(e) => warn!("Failed to attach: {}", e),
                }
            }
            Err(e) => debug!("{}", e),
        }

        if shutdown.wait(timing::ATTACH_RETRY_DELAY) {
            break;
        }
    }

    dispatcher.shutdown();
    drop(dispatcher);
    if printer.join().is_err() {
        warn!("Report printer panicked");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Poll the target until it exits or shutdown is requested. Classifying on
/// every poll keeps state transitions visible in the log.
fn watch(
    process: &dyn ProcessMemory,
    connector: &Connector,
    classifier: &StateClassifier,
    shutdown: &CancelSignal,
) {
    while process.is_alive() {
        classifier.classify(connector);
        if shutdown.wait(timing::LIVENESS_POLL_INTERVAL) {
            return;
        }
    }
    info!("Process terminated");
}
