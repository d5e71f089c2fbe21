//! Gesture script replay.
//!
//! A script mounts named items and feeds a [`SwipeList`] touch samples,
//! taps and clock ticks. The report lists every emitted signal and the
//! final render state of each item, which makes gesture tuning
//! reproducible outside the browser.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use swipe_core::{
    ItemId, ItemKind, ItemSignal, RenderState, SwipeConfig, SwipeList, SwipeSignal, TapTarget,
    TouchEvent, TouchPhase,
};
use tracing::debug;

/// An item mounted by a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptItem {
    /// Name used by steps and in the report.
    pub name: String,
    /// Task or wish.
    #[serde(default = "default_kind")]
    pub kind: ItemKind,
}

const fn default_kind() -> ItemKind {
    ItemKind::Task
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Touch sample on an item. `x`/`y` are required for start and move.
    Touch {
        /// Target item name.
        item: String,
        /// Touch phase.
        phase: TouchPhase,
        /// Horizontal position.
        #[serde(default)]
        x: Option<f32>,
        /// Vertical position.
        #[serde(default)]
        y: Option<f32>,
        /// Timestamp in milliseconds.
        #[serde(default)]
        at: u64,
    },
    /// Tap on an item's card or delete button.
    Tap {
        /// Target item name.
        item: String,
        /// Tap target.
        target: ScriptTapTarget,
        /// Timestamp in milliseconds.
        #[serde(default)]
        at: u64,
    },
    /// Advance the clock.
    Tick {
        /// Timestamp in milliseconds.
        at: u64,
    },
    /// Toggle presentation mode.
    Presentation {
        /// New mode.
        enabled: bool,
    },
    /// Close every open item.
    CloseAll,
}

/// Tap target as written in scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptTapTarget {
    /// The card body.
    Card,
    /// The revealed delete button.
    DeleteButton,
}

impl From<ScriptTapTarget> for TapTarget {
    fn from(target: ScriptTapTarget) -> Self {
        match target {
            ScriptTapTarget::Card => Self::Card,
            ScriptTapTarget::DeleteButton => Self::DeleteButton,
        }
    }
}

/// A gesture script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Items mounted before the first step, in list order.
    pub items: Vec<ScriptItem>,
    /// Inputs to replay.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a script.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid gesture script")
    }

    /// Load a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_json(&json)
    }
}

/// Load a swipe configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config(path: &Path) -> anyhow::Result<SwipeConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = SwipeConfig::from_json(&json)?;
    config.validate()?;
    Ok(config)
}

/// A signal attributed to the step that caused it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayEvent {
    /// Zero-based step index.
    pub step: usize,
    /// Item name.
    pub item: String,
    /// Emitted signal.
    pub signal: SwipeSignal,
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    /// Signals in emission order. Frame bookkeeping is left out.
    pub events: Vec<ReplayEvent>,
    /// Items whose exit animation finished, in order.
    pub deleted: Vec<String>,
    /// Render state of every item still in the list.
    pub final_states: BTreeMap<String, RenderState>,
}

impl ReplayReport {
    /// Names of items that emitted `signal`.
    #[must_use]
    pub fn items_with(&self, signal: SwipeSignal) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.signal == signal)
            .map(|e| e.item.as_str())
            .collect()
    }
}

/// Run `script` through a fresh list built from `config`.
///
/// # Errors
///
/// Returns an error for an invalid configuration, duplicate item names,
/// steps naming unknown items, or touch samples missing coordinates.
pub fn replay(script: &Script, config: SwipeConfig) -> anyhow::Result<ReplayReport> {
    let mut list = SwipeList::new(config)?;
    let mut ids: HashMap<String, ItemId> = HashMap::new();
    let mut names: HashMap<ItemId, String> = HashMap::new();

    for item in &script.items {
        if ids.contains_key(&item.name) {
            bail!("duplicate item name: {}", item.name);
        }
        let id = ItemId::new();
        list.mount(id, item.kind)?;
        ids.insert(item.name.clone(), id);
        names.insert(id, item.name.clone());
    }

    let lookup = |name: &str| {
        ids.get(name)
            .copied()
            .with_context(|| format!("unknown item: {name}"))
    };

    let mut events = Vec::new();
    for (index, step) in script.steps.iter().enumerate() {
        debug!("step {}: {:?}", index, step);
        let signals = match step {
            Step::Touch {
                item,
                phase,
                x,
                y,
                at,
            } => {
                let id = lookup(item.as_str())?;
                let event = touch_event(*phase, *x, *y, *at)
                    .with_context(|| format!("step {index}: touch needs x and y"))?;
                list.handle_touch(id, &event)
            }
            Step::Tap { item, target, at } => {
                list.tap(lookup(item.as_str())?, (*target).into(), *at)
            }
            Step::Tick { at } => list.tick(*at),
            Step::Presentation { enabled } => list.set_presentation_mode(*enabled),
            Step::CloseAll => list.close_all(),
        };
        list.flush_frames();
        events.extend(
            signals
                .into_iter()
                .filter(|s| !is_frame_bookkeeping(s))
                .map(|ItemSignal { item, signal }| ReplayEvent {
                    step: index,
                    item: names.get(&item).cloned().unwrap_or_else(|| item.to_string()),
                    signal,
                }),
        );
    }

    let deleted = list
        .take_deletions()
        .into_iter()
        .map(|d| names.get(&d.item).cloned().unwrap_or_else(|| d.item.to_string()))
        .collect();
    let final_states = list
        .ids()
        .filter_map(|id| Some((names.get(&id)?.clone(), list.render_state(id)?)))
        .collect();

    Ok(ReplayReport {
        events,
        deleted,
        final_states,
    })
}

fn touch_event(phase: TouchPhase, x: Option<f32>, y: Option<f32>, at: u64) -> Option<TouchEvent> {
    Some(match phase {
        TouchPhase::Start => TouchEvent::start(x?, y?, at),
        TouchPhase::Move => TouchEvent::moved(x?, y?, at),
        TouchPhase::End => TouchEvent::end(at),
        TouchPhase::Cancel => TouchEvent::cancel(at),
    })
}

fn is_frame_bookkeeping(signal: &ItemSignal) -> bool {
    matches!(
        signal.signal,
        SwipeSignal::RequestFrame { .. } | SwipeSignal::CancelFrame { .. }
    )
}

/// Wire name of a signal, as the PWA sees it.
#[must_use]
pub fn signal_name(signal: &SwipeSignal) -> String {
    serde_json::to_value(signal)
        .ok()
        .and_then(|v| v.get("signal").and_then(|s| s.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("{signal:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swipe(item: &str, to_x: f32, start_at: u64) -> Vec<Step> {
        let touch = |phase, x: Option<f32>, at| Step::Touch {
            item: item.to_string(),
            phase,
            x,
            y: x.map(|_| 100.0),
            at,
        };
        vec![
            touch(TouchPhase::Start, Some(300.0), start_at),
            touch(TouchPhase::Move, Some(290.0), start_at + 16),
            touch(TouchPhase::Move, Some(to_x), start_at + 32),
            touch(TouchPhase::End, None, start_at + 48),
        ]
    }

    fn items(names: &[&str]) -> Vec<ScriptItem> {
        names
            .iter()
            .map(|n| ScriptItem {
                name: (*n).to_string(),
                kind: ItemKind::Wish,
            })
            .collect()
    }

    #[test]
    fn parses_script_json() {
        let script = Script::from_json(
            r#"{
                "items": [{"name": "lamp", "kind": "wish"}, {"name": "bike"}],
                "steps": [
                    {"action": "touch", "item": "lamp", "phase": "start", "x": 10, "y": 5},
                    {"action": "tap", "item": "lamp", "target": "delete_button", "at": 7},
                    {"action": "tick", "at": 400},
                    {"action": "presentation", "enabled": true},
                    {"action": "close_all"}
                ]
            }"#,
        )
        .expect("script");
        assert_eq!(script.items[1].kind, ItemKind::Task);
        assert_eq!(script.steps.len(), 5);
        assert_eq!(script.steps[4], Step::CloseAll);
    }

    #[test]
    fn opening_second_item_closes_first() {
        let mut steps = swipe("lamp", 230.0, 0);
        steps.extend(swipe("bike", 230.0, 100));
        let script = Script {
            items: items(&["lamp", "bike"]),
            steps,
        };
        let report = replay(&script, SwipeConfig::default()).expect("replay");

        assert_eq!(report.items_with(SwipeSignal::RevealOpened), vec!["lamp", "bike"]);
        assert_eq!(report.items_with(SwipeSignal::Closed), vec!["lamp"]);
        assert!(!report.final_states["lamp"].open);
        assert!(report.final_states["bike"].open);
        assert!((report.final_states["bike"].offset + 80.0).abs() < 1e-3);
    }

    #[test]
    fn far_swipe_then_tick_deletes() {
        let mut steps = swipe("lamp", -100.0, 0);
        steps.push(Step::Tick { at: 1_000 });
        let script = Script {
            items: items(&["lamp", "bike"]),
            steps,
        };
        let report = replay(&script, SwipeConfig::default()).expect("replay");

        assert_eq!(report.deleted, vec!["lamp"]);
        assert_eq!(report.items_with(SwipeSignal::Deleted), vec!["lamp"]);
        assert!(!report.final_states.contains_key("lamp"));
        assert!(report.final_states.contains_key("bike"));
    }

    #[test]
    fn unknown_item_is_an_error() {
        let script = Script {
            items: items(&["lamp"]),
            steps: swipe("chair", 200.0, 0),
        };
        let err = replay(&script, SwipeConfig::default()).expect_err("unknown");
        assert!(err.to_string().contains("chair"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let script = Script {
            items: items(&["lamp", "lamp"]),
            steps: Vec::new(),
        };
        assert!(replay(&script, SwipeConfig::default()).is_err());
    }

    #[test]
    fn touch_start_needs_coordinates() {
        let script = Script {
            items: items(&["lamp"]),
            steps: vec![Step::Touch {
                item: "lamp".into(),
                phase: TouchPhase::Start,
                x: None,
                y: Some(1.0),
                at: 0,
            }],
        };
        assert!(replay(&script, SwipeConfig::default()).is_err());
    }

    #[test]
    fn signal_names_match_wire_format() {
        assert_eq!(signal_name(&SwipeSignal::DeleteAttempt), "delete_attempt");
        assert_eq!(signal_name(&SwipeSignal::RevealOpened), "reveal_opened");
    }
}
