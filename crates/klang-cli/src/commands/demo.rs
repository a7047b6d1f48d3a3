//! Scripted demo sequence command.

use crate::commands::common::SynthArgs;
use clap::Args;
use klang_io::{CpalBackend, NoteEvent, SynthEngine};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Args)]
pub struct DemoArgs {
    #[command(flatten)]
    synth: SynthArgs,

    /// Milliseconds per sequence step
    #[arg(long, default_value = "300")]
    step_ms: u64,
}

/// C major arpeggio over two octaves, up and back down.
const SEQUENCE: &[u8] = &[60, 64, 67, 72, 76, 79, 84, 79, 76, 72, 67, 64];

pub fn run(args: DemoArgs) -> anyhow::Result<()> {
    let backend = CpalBackend::new();
    let engine = SynthEngine::start(&backend, &args.synth.engine_config())?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    println!("Playing demo sequence, Ctrl+C to stop...");
    tracing::debug!(
        steps = SEQUENCE.len(),
        sample_rate = engine.sample_rate(),
        "demo sequence starting"
    );

    let step = Duration::from_millis(args.step_ms);
    let gate = step * 3 / 4;

    'outer: for _ in 0..2 {
        for &note in SEQUENCE {
            if !running.load(Ordering::SeqCst) {
                break 'outer;
            }
            engine.send(NoteEvent::On {
                note,
                velocity: 100,
            });
            thread::sleep(gate);
            engine.send(NoteEvent::Off { note });
            thread::sleep(step - gate);
        }
    }

    // Let release tails ring out before the stream drops.
    thread::sleep(Duration::from_millis(400));

    Ok(())
}
