//! Timed key event scripts for replaying sessions against the engine.
//!
//! ```text
//! ; rollover between two punctuation keys
//! term 200
//! policy single
//! chords forward
//! 0   down dq
//! 50  down op
//! 100 up   dq
//! ```

use crate::config::{ChordRelease, ModifierRelease, PendingPolicy, Settings};
use crate::engine::Engine;
use crate::keymap::{key_name_to_id, Keymap};
use crate::mode::Mode;
use crate::recorder::{ManualTimer, Recorder};
use crate::types::{KeyEdge, KeyId};
use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptEvent {
    pub t_ms: u16,
    pub key: KeyId,
    pub edge: KeyEdge,
}

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub name: Option<String>,
    pub settings: Settings,
    pub events: Vec<ScriptEvent>,
}

pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Script> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    parse_script(&text)
}

pub fn parse_script(content: &str) -> Result<Script> {
    let mut script = Script::default();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if script.name.is_none() && script.events.is_empty() && line.starts_with(';') {
            let name = line.trim_start_matches(';').trim().to_string();
            if !name.is_empty() {
                script.name = Some(name);
            }
            continue;
        }
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        parse_line(line, &mut script).with_context(|| format!("line {}: {}", idx + 1, line))?;
    }

    script
        .settings
        .validate()
        .context("script settings are invalid")?;
    debug!("Parsed script with {} events", script.events.len());
    Ok(script)
}

fn parse_line(line: &str, script: &mut Script) -> Result<()> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        ["term", ms] => {
            script.settings.tapping_term_ms = ms.parse().context("bad tapping term")?;
        }
        ["policy", p] => {
            script.settings.pending_policy = match *p {
                "single" => PendingPolicy::SingleSlot,
                "per-key" => PendingPolicy::PerKey,
                other => bail!("unknown pending policy '{}'", other),
            };
        }
        ["modifiers", m] => {
            script.settings.modifier_release = match *m {
                "release" => ModifierRelease::OnKeyRelease,
                "leave" => ModifierRelease::Leave,
                other => bail!("unknown modifier release '{}'", other),
            };
        }
        ["chords", c] => {
            script.settings.chord_release = match *c {
                "swallow" => ChordRelease::Swallow,
                "forward" => ChordRelease::Forward,
                other => bail!("unknown chord release '{}'", other),
            };
        }
        [t, edge, key] => {
            let t_ms: u16 = t.parse().context("bad timestamp")?;
            let edge = match *edge {
                "down" => KeyEdge::Down,
                "up" => KeyEdge::Up,
                other => bail!("expected 'down' or 'up', got '{}'", other),
            };
            let key = parse_key(key)?;
            if let Some(prev) = script.events.last() {
                if t_ms < prev.t_ms {
                    warn!("Script time goes backwards at {}ms; treating as timer wrap", t_ms);
                }
            }
            script.events.push(ScriptEvent { t_ms, key, edge });
        }
        _ => bail!("unrecognised line"),
    }
    Ok(())
}

fn parse_key(raw: &str) -> Result<KeyId> {
    if let Some(id) = key_name_to_id(raw) {
        return Ok(id);
    }
    let code = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => raw.parse(),
    }
    .map_err(|_| anyhow!("unknown key '{}'", raw))?;
    Ok(KeyId::new(code))
}

/// Result of running a script.
#[derive(Debug)]
pub struct Replay {
    pub mode: Mode,
    pub recorder: Recorder,
    /// Events the engine left for regular keymap processing.
    pub passthrough: Vec<ScriptEvent>,
}

pub fn replay(script: &Script, keymap: Keymap) -> Result<Replay> {
    let mut engine = Engine::new(keymap, script.settings.clone())?;
    let timer = ManualTimer::new(0);
    let mut recorder = Recorder::new();
    let mut passthrough = Vec::new();

    for ev in &script.events {
        timer.set(ev.t_ms);
        if engine.on_key_event(ev.key, ev.edge.is_down(), &timer, &mut recorder) {
            passthrough.push(*ev);
        }
    }

    Ok(Replay {
        mode: engine.mode(),
        recorder,
        passthrough,
    })
}
