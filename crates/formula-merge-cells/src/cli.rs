use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::plugin::KeyEvent;
use crate::{CellDelta, CellRef, Grid, MergeCells, MergeCellsSetting, MergedRegions, SelectionRange};

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(about = "Replay keyboard/mouse selection steps against a grid with merged cells.")]
pub struct Args {
    /// JSON replay script.
    script: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// A replay script.
///
/// ```json
/// {
///   "rows": 10, "cols": 10,
///   "mergeCells": [{ "row": 2, "col": 2, "rowspan": 2, "colspan": 2 }],
///   "steps": [
///     { "action": "select", "row": 1, "col": 2 },
///     { "action": "move", "row": 1, "col": 0 },
///     { "action": "extend", "row": 0, "col": 1 },
///     { "action": "key", "key": "m", "ctrl": true }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub rows: u32,
    pub cols: u32,
    #[serde(default = "enabled")]
    pub merge_cells: MergeCellsSetting,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn enabled() -> MergeCellsSetting {
    MergeCellsSetting::Enabled(true)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Step {
    /// Mouse click.
    Select { row: u32, col: u32 },
    /// Mouse drag.
    SelectRange { from: CellRef, to: CellRef },
    /// Arrow key.
    Move { row: i64, col: i64 },
    /// Shift + arrow key.
    Extend { row: i64, col: i64 },
    Key {
        key: char,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
        #[serde(default)]
        alt: bool,
        #[serde(default)]
        shift: bool,
    },
    /// Context menu action.
    Menu { id: String },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Select { row, col } => write!(f, "select {}", CellRef::new(*row, *col)),
            Step::SelectRange { from, to } => write!(f, "select {from}:{to}"),
            Step::Move { row, col } => write!(f, "move {}", CellDelta::new(*row, *col)),
            Step::Extend { row, col } => write!(f, "extend {}", CellDelta::new(*row, *col)),
            Step::Key {
                key,
                ctrl,
                meta,
                alt,
                shift,
            } => {
                f.write_str("key ")?;
                let modifiers = [
                    (*ctrl, "Ctrl+"),
                    (*meta, "Cmd+"),
                    (*alt, "Alt+"),
                    (*shift, "Shift+"),
                ];
                for (held, name) in modifiers {
                    if held {
                        f.write_str(name)?;
                    }
                }
                write!(f, "{key}")
            }
            Step::Menu { id } => write!(f, "menu {id}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub step: String,
    pub selection: SelectionRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    pub frames: Vec<Frame>,
    pub merge_cells: MergedRegions,
}

/// Runs `script` against a fresh grid with the merged-cells feature installed.
pub fn replay(script: &Script) -> Result<Replay> {
    let merge = MergeCells::from_setting(&script.merge_cells).context("invalid mergeCells")?;
    let mut grid = Grid::new(script.rows, script.cols, merge);
    let mut frames = Vec::with_capacity(script.steps.len());

    for step in &script.steps {
        match step {
            Step::Select { row, col } => grid.select_cell(CellRef::new(*row, *col)),
            Step::SelectRange { from, to } => grid.select_range(*from, *to),
            Step::Move { row, col } => {
                grid.move_highlight(CellDelta::new(*row, *col));
            }
            Step::Extend { row, col } => {
                grid.extend_selection(CellDelta::new(*row, *col));
            }
            Step::Key {
                key,
                ctrl,
                meta,
                alt,
                shift,
            } => {
                let event = KeyEvent {
                    key: *key,
                    ctrl: *ctrl,
                    meta: *meta,
                    alt: *alt,
                    shift: *shift,
                };
                grid.key_down(&event);
            }
            Step::Menu { id } => {
                if !grid.menu_action(id) {
                    log::warn!("unknown menu action '{id}'");
                }
            }
        }
        frames.push(Frame {
            step: step.to_string(),
            selection: *grid.selection(),
        });
    }

    Ok(Replay {
        frames,
        merge_cells: grid.plugin().regions().clone(),
    })
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    run_with_args(args)
}

pub fn run_with_args(args: Args) -> Result<()> {
    let text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("read replay script {}", args.script.display()))?;
    let script: Script = serde_json::from_str(&text)
        .with_context(|| format!("parse replay script {}", args.script.display()))?;
    let replay = replay(&script)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let written = match args.format {
        OutputFormat::Text => write_text(&mut handle, &replay),
        OutputFormat::Json => serde_json::to_writer(&mut handle, &replay)
            .map_err(std::io::Error::from)
            .and_then(|()| handle.write_all(b"\n")),
    };
    match written {
        // A closed pipe (e.g. `| head`) is not a failure.
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => Ok(other?),
    }
}

fn write_text(out: &mut impl Write, replay: &Replay) -> std::io::Result<()> {
    for (idx, frame) in replay.frames.iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {:<24} highlight={} range={}",
            idx + 1,
            frame.step,
            frame.selection.highlight,
            frame.selection.range()
        )?;
    }
    let merged: Vec<String> = replay
        .merge_cells
        .iter()
        .map(|region| region.range().to_string())
        .collect();
    writeln!(out, "merged: {}", merged.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn replays_navigation_and_merge_toggle() {
        let script: Script = serde_json::from_str(
            r#"{
                "rows": 6, "cols": 6,
                "mergeCells": [{ "row": 2, "col": 2, "rowspan": 2, "colspan": 2 }],
                "steps": [
                    { "action": "select", "row": 1, "col": 2 },
                    { "action": "move", "row": 1, "col": 0 },
                    { "action": "move", "row": 1, "col": 0 },
                    { "action": "selectRange", "from": { "row": 0, "col": 0 }, "to": { "row": 0, "col": 1 } },
                    { "action": "key", "key": "m", "ctrl": true }
                ]
            }"#,
        )
        .unwrap();

        let replay = replay(&script).unwrap();
        let highlights: Vec<String> = replay
            .frames
            .iter()
            .map(|frame| frame.selection.highlight.to_string())
            .collect();
        assert_eq!(highlights, ["C2", "C3", "C5", "A1", "A1"]);
        assert_eq!(replay.frames[4].step, "key Ctrl+m");

        let merged: Vec<String> = replay
            .merge_cells
            .iter()
            .map(|region| region.range().to_string())
            .collect();
        assert_eq!(merged, ["C3:D4", "A1:B1"]);
    }

    #[test]
    fn rejects_overlapping_configuration() {
        let script: Script = serde_json::from_str(
            r#"{ "rows": 4, "cols": 4, "mergeCells": [
                { "row": 0, "col": 0, "rowspan": 2, "colspan": 2 },
                { "row": 1, "col": 1, "rowspan": 1, "colspan": 1 }
            ] }"#,
        )
        .unwrap();
        assert!(replay(&script).is_err());
    }
}
