//! The editing session: one chain, its overlays, selection and file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use softarm_ir::{AnchorSpec, Document, JointId, JointRecord, Rgb};
use softarm_kinematics::{AnchorPose, Chain, ChainError, Joint, PoseQuery};
use softarm_scene::{compose, DrawList, OverlayId, OverlayList, Shape};
use softarm_xml::{read_joints, write_joints};

use crate::error::{EditorError, Result};
use crate::macro_script::{MacroRecorder, MacroScript};
use crate::settings::EditorSettings;

/// On-disk format of a chain file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// XML joints file (any extension other than `.json`).
    Xml,
    /// JSON [`Document`], which also keeps the anchor.
    Json,
}

impl FileFormat {
    /// Format for `path`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Xml,
        }
    }
}

/// Read a chain file into records and the anchor it carries, if any.
pub fn read_chain_file(path: &Path) -> Result<(Vec<JointRecord>, Option<AnchorSpec>)> {
    let text = std::fs::read_to_string(path)?;
    match FileFormat::from_path(path) {
        FileFormat::Json => {
            let doc = Document::from_json(&text)?;
            if doc.joints.is_empty() {
                return Err(EditorError::NoJoints);
            }
            Ok((doc.joints, doc.anchor))
        }
        FileFormat::Xml => Ok((read_joints(&text)?, None)),
    }
}

/// Write records (and the anchor, for JSON) to a chain file.
pub fn write_chain_file(
    path: &Path,
    records: Vec<JointRecord>,
    anchor: Option<AnchorSpec>,
) -> Result<()> {
    let text = match FileFormat::from_path(path) {
        FileFormat::Json => Document {
            joints: records,
            anchor,
            ..Document::default()
        }
        .to_json()?,
        FileFormat::Xml => write_joints(&records)?,
    };
    std::fs::write(path, text)?;
    Ok(())
}

/// An editing session.
///
/// Selection is held as a joint id and resolved to an index when used, so
/// it survives deletions of other joints.
#[derive(Debug)]
pub struct Session {
    chain: Chain,
    overlays: OverlayList,
    settings: EditorSettings,
    anchor: Option<AnchorSpec>,
    selected: Option<JointId>,
    next_id: JointId,
    dirty: bool,
    path: Option<PathBuf>,
    recorder: Option<MacroRecorder>,
}

impl Session {
    /// Empty session with the axis markers shown.
    pub fn new(settings: EditorSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            chain: empty_chain(&settings),
            overlays: OverlayList::with_axes(),
            settings,
            anchor: None,
            selected: None,
            next_id: 1,
            dirty: false,
            path: None,
            recorder: None,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The chain being edited.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Overlays drawn with the chain.
    pub fn overlays(&self) -> &OverlayList {
        &self.overlays
    }

    /// Mutable overlays.
    pub fn overlays_mut(&mut self) -> &mut OverlayList {
        &mut self.overlays
    }

    /// Active settings.
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Whether there are edits not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// File the session was last opened from or saved to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Anchor last applied with [`Session::set_anchor`] or loaded from JSON.
    pub fn anchor(&self) -> Option<&AnchorSpec> {
        self.anchor.as_ref()
    }

    /// Id of the selected joint.
    pub fn selected(&self) -> Option<JointId> {
        self.selected
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append a joint with the default size and color.
    pub fn add_joint(&mut self) -> JointId {
        let id = self.next_id;
        self.next_id += 1;
        let mut joint = Joint::new(id, self.settings.default_height, self.settings.default_radius);
        joint.set_color(self.settings.default_color);
        self.chain.append(joint);
        self.dirty = true;
        debug!("added joint {id}");
        id
    }

    /// Delete the joint with `id`. Clears the selection if it pointed there.
    pub fn delete(&mut self, id: JointId) -> Result<()> {
        let index = self
            .chain
            .index_of(id)
            .ok_or(ChainError::UnknownJoint(id))?;
        self.chain.remove(index)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.dirty = true;
        debug!("deleted joint {id} at index {index}");
        Ok(())
    }

    /// Drop every joint and forget the file. Ids start again at 1.
    pub fn clear(&mut self) {
        self.chain = empty_chain(&self.settings);
        if let Some(anchor) = &self.anchor {
            self.chain.set_anchor(AnchorPose::from_spec(anchor).get());
        }
        self.overlays = OverlayList::with_axes();
        self.selected = None;
        self.next_id = 1;
        self.dirty = false;
        self.path = None;
        self.recorder = None;
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select the joint with `id`.
    pub fn select(&mut self, id: JointId) -> Result<()> {
        if self.chain.index_of(id).is_none() {
            return Err(ChainError::UnknownJoint(id).into());
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Current chain index of the selected joint.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected.and_then(|id| self.chain.index_of(id))
    }

    /// The selected joint.
    pub fn selected_joint(&self) -> Option<&Joint> {
        self.selected.and_then(|id| self.chain.joint_by_id(id))
    }

    /// Pose of the selected joint, for display.
    pub fn selected_pose(&self) -> Result<PoseQuery> {
        let index = self.require_selection()?;
        Ok(self.chain.query(index)?)
    }

    fn require_selection(&self) -> Result<usize> {
        self.selected_index().ok_or(EditorError::NoSelection)
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Bend joint `index`, clamping each component to the bend limit.
    ///
    /// The clamped step is recorded when a macro recording is active.
    pub fn bend(&mut self, index: usize, u: f64, v: f64) -> Result<()> {
        let (cu, cv) = (self.settings.clamp_bend(u), self.settings.clamp_bend(v));
        if cu != u || cv != v {
            warn!(
                "bend ({u}, {v}) clamped to ({cu}, {cv}), limit {}",
                self.settings.bend_limit
            );
        }
        self.chain.set_axis(index, cu, cv)?;
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(index, cu, cv);
        }
        self.dirty = true;
        Ok(())
    }

    /// Bend the selected joint.
    pub fn bend_selected(&mut self, u: f64, v: f64) -> Result<()> {
        let index = self.require_selection()?;
        self.bend(index, u, v)
    }

    /// Resize joint `index`. Height must be in the configured range and
    /// radius positive.
    pub fn resize(&mut self, index: usize, height: f64, radius: f64) -> Result<()> {
        if let Some(reason) = self.size_problem(height, radius) {
            return Err(EditorError::InvalidSize(reason));
        }
        self.chain.set_size(index, height, radius)?;
        self.dirty = true;
        Ok(())
    }

    fn size_problem(&self, height: f64, radius: f64) -> Option<String> {
        if !self.settings.height_in_range(height) {
            return Some(format!(
                "height {height} outside [{}, {}]",
                self.settings.min_height, self.settings.max_height
            ));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Some(format!("radius must be positive, got {radius}"));
        }
        None
    }

    /// Resize the selected joint.
    pub fn resize_selected(&mut self, height: f64, radius: f64) -> Result<()> {
        let index = self.require_selection()?;
        self.resize(index, height, radius)
    }

    /// Recolor the selected joint.
    pub fn recolor_selected(&mut self, color: Rgb) -> Result<()> {
        let index = self.require_selection()?;
        self.chain.set_color(index, color)?;
        self.dirty = true;
        Ok(())
    }

    /// Place the chain base from a translation and XYZ Euler angles.
    pub fn set_anchor(&mut self, spec: &AnchorSpec) {
        self.chain.set_anchor(AnchorPose::from_spec(spec).get());
        self.anchor = Some(*spec);
        self.dirty = true;
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Load a chain file, replacing the current chain.
    ///
    /// The file is parsed and checked completely first; on any error the
    /// session is left exactly as it was. Ids must be unique and sizes must
    /// pass the same checks as [`Session::resize`].
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let (records, anchor) = read_chain_file(path)?;
        self.check_records(&records)?;

        let mut chain = empty_chain(&self.settings);
        let anchor = anchor.or(self.anchor);
        if let Some(spec) = &anchor {
            chain.set_anchor(AnchorPose::from_spec(spec).get());
        }
        chain.rebuild_from_records(&records);

        self.next_id = records.iter().map(|r| r.id).max().map_or(1, |max| max + 1);
        self.chain = chain;
        self.anchor = anchor;
        self.overlays = OverlayList::with_axes();
        self.selected = None;
        self.dirty = false;
        self.path = Some(path.to_path_buf());
        info!("opened {} ({} joints)", path.display(), records.len());
        Ok(())
    }

    fn check_records(&self, records: &[JointRecord]) -> Result<()> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.id) {
                return Err(EditorError::DuplicateId(record.id));
            }
            if let Some(reason) = self.size_problem(record.size.height, record.size.radius) {
                return Err(EditorError::InvalidSize(format!(
                    "joint {}: {reason}",
                    record.id
                )));
            }
        }
        Ok(())
    }

    /// Save to the current file.
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(EditorError::NoPath)?;
        self.save_as(path)
    }

    /// Save to `path` and make it the current file.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        write_chain_file(path, self.chain.records(), self.anchor)?;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        info!("saved {} ({} joints)", path.display(), self.chain.len());
        Ok(())
    }

    // =========================================================================
    // Presentation
    // =========================================================================

    /// Add a decorative shape overlay.
    pub fn add_shape(&mut self, shape: Shape) -> Result<OverlayId> {
        let id = self.overlays.add_shape(shape)?;
        debug!("added {} overlay {id}", shape.kind);
        Ok(id)
    }

    /// Overlays and joints in draw order, with the selection highlighted.
    pub fn draw_list(&self) -> DrawList {
        compose(&self.overlays, &self.chain, self.selected)
    }

    // =========================================================================
    // Macros
    // =========================================================================

    /// Start recording bends, seeded with the current axes.
    pub fn start_recording(&mut self) {
        self.recorder = Some(MacroRecorder::start(&self.chain));
    }

    /// Whether a recording is active.
    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Stop recording and return what was recorded.
    pub fn stop_recording(&mut self) -> Option<MacroScript> {
        self.recorder.take().map(MacroRecorder::finish)
    }

    /// Replay a macro.
    ///
    /// Every step goes through [`Session::bend`]. Once the first `len`
    /// steps (one per joint) have been applied, `pace` is called after each
    /// further step with the configured delay, so a front end can animate.
    /// A step naming a missing joint stops playback with
    /// [`EditorError::MacroStep`]; earlier steps stay applied.
    pub fn play<F>(&mut self, script: &MacroScript, mut pace: F) -> Result<()>
    where
        F: FnMut(Duration),
    {
        let delay = Duration::from_millis(self.settings.macro_step_delay_ms);
        let seed = self.chain.len();
        info!("playing macro: {} steps", script.len());
        for (i, step) in script.steps().iter().enumerate() {
            if step.index >= self.chain.len() {
                return Err(EditorError::MacroStep {
                    step: i + 1,
                    reason: format!(
                        "joint index {} out of range (chain has {} joints)",
                        step.index,
                        self.chain.len()
                    ),
                });
            }
            self.bend(step.index, step.u, step.v)?;
            if i >= seed {
                pace(delay);
            }
        }
        info!("macro finished");
        Ok(())
    }
}

fn empty_chain(settings: &EditorSettings) -> Chain {
    let mut chain = Chain::with_connecting_offset(settings.connecting_offset);
    chain.set_marker_sampling(settings.marker_sampling);
    chain
}
