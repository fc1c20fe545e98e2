//! Bend macros: recorded sequences of axis edits that can be replayed.
//!
//! A macro is plain text, one step per line: `<index> <u> <v>`, separated
//! by single spaces. A recording starts with one step per joint holding
//! its current axes, so playback first restores the starting shape and
//! then animates the recorded edits.

use std::fmt;

use softarm_kinematics::Chain;

use crate::error::{EditorError, Result};

/// One axis edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroStep {
    /// Chain index of the joint to bend.
    pub index: usize,
    /// New `u` bend component.
    pub u: f64,
    /// New `v` bend component.
    pub v: f64,
}

impl fmt::Display for MacroStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.index, self.u, self.v)
    }
}

/// An ordered list of axis edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacroScript {
    steps: Vec<MacroStep>,
}

impl MacroScript {
    /// Script from explicit steps.
    pub fn new(steps: Vec<MacroStep>) -> Self {
        Self { steps }
    }

    /// Parse macro text. Blank trailing lines are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut steps = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(' ').collect();
            if fields.len() != 3 {
                return Err(EditorError::macro_line(
                    line_no,
                    format!("expected 3 fields, found {}", fields.len()),
                ));
            }
            let index = fields[0].parse::<usize>().map_err(|_| {
                EditorError::macro_line(line_no, format!("invalid joint index {:?}", fields[0]))
            })?;
            let u = parse_component(fields[1], "u", line_no)?;
            let v = parse_component(fields[2], "v", line_no)?;
            steps.push(MacroStep { index, u, v });
        }
        Ok(Self { steps })
    }

    /// Steps in playback order.
    pub fn steps(&self) -> &[MacroStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the script has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a step.
    pub fn push(&mut self, step: MacroStep) {
        self.steps.push(step);
    }
}

impl fmt::Display for MacroScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}

fn parse_component(text: &str, name: &str, line: usize) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| EditorError::macro_line(line, format!("invalid {name} value {text:?}")))
}

/// Records axis edits into a [`MacroScript`].
#[derive(Debug, Clone)]
pub struct MacroRecorder {
    script: MacroScript,
    seed_len: usize,
}

impl MacroRecorder {
    /// Start recording, seeded with the current axes of every joint.
    pub fn start(chain: &Chain) -> Self {
        let steps = chain
            .joints()
            .iter()
            .enumerate()
            .map(|(index, joint)| {
                let axis = joint.axis();
                MacroStep {
                    index,
                    u: axis.u,
                    v: axis.v,
                }
            })
            .collect::<Vec<_>>();
        let seed_len = steps.len();
        Self {
            script: MacroScript::new(steps),
            seed_len,
        }
    }

    /// Record one edit.
    pub fn record(&mut self, index: usize, u: f64, v: f64) {
        self.script.push(MacroStep { index, u, v });
    }

    /// Whether anything was recorded past the seed block.
    pub fn has_edits(&self) -> bool {
        self.script.len() > self.seed_len
    }

    /// The script recorded so far.
    pub fn script(&self) -> &MacroScript {
        &self.script
    }

    /// Stop recording and return the script.
    pub fn finish(self) -> MacroScript {
        self.script
    }
}
