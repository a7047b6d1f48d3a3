//! Interactive keyboard play command.

use crate::commands::common::SynthArgs;
use clap::Args;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use klang_io::{CpalBackend, KEY_VELOCITY, NoteEvent, ScopeBuffer, SynthEngine, key_to_note};
use std::io::Write;
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    synth: SynthArgs,

    /// How long a key press sounds, in milliseconds
    #[arg(long, default_value = "250")]
    gate_ms: u64,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let backend = CpalBackend::new();
    let engine = SynthEngine::start(&backend, &args.synth.engine_config())?;
    let scope = engine.scope();

    println!("klang - chromatic octave on [z s x d c v g b h n j m] (C4..B4)");
    println!("Esc or q quits.\n");

    enable_raw_mode()?;
    let result = play_loop(&engine, &scope, Duration::from_millis(args.gate_ms));
    disable_raw_mode()?;
    println!();

    result
}

fn play_loop(engine: &SynthEngine, scope: &ScopeBuffer, gate: Duration) -> anyhow::Result<()> {
    // Terminals report presses but not reliable releases, so each press
    // sounds for a fixed gate and is released from here.
    let mut sounding: Vec<(Instant, u8)> = Vec::new();
    let mut window = [0.0f32; 256];

    loop {
        let now = Instant::now();
        sounding.retain(|&(pressed, note)| {
            if now.duration_since(pressed) >= gate {
                engine.send(NoteEvent::Off { note });
                false
            } else {
                true
            }
        });

        if event::poll(Duration::from_millis(25))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char(ch) => {
                        if let Some(note) = key_to_note(ch) {
                            engine.send(NoteEvent::On {
                                note,
                                velocity: KEY_VELOCITY,
                            });
                            sounding.push((now, note));
                        }
                    }
                    _ => {}
                }
            }
        }

        draw_meter(scope, &mut window)?;
    }

    for &(_, note) in &sounding {
        engine.send(NoteEvent::Off { note });
    }

    Ok(())
}

/// Redraw the inline peak meter from the latest scope window.
fn draw_meter(scope: &ScopeBuffer, window: &mut [f32]) -> anyhow::Result<()> {
    const WIDTH: usize = 40;

    let n = scope.snapshot_latest(window);
    let peak = window[..n].iter().fold(0.0f32, |p, &s| p.max(s.abs()));
    let filled = (peak.min(1.0) * WIDTH as f32) as usize;

    let mut stdout = std::io::stdout();
    write!(
        stdout,
        "\r[{}{}] {:5.2}",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        peak
    )?;
    stdout.flush()?;
    Ok(())
}
