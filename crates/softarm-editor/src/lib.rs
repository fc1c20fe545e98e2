#![warn(missing_docs)]

//! Editing session for softarm chains.
//!
//! A [`Session`] owns one [`Chain`](softarm_kinematics::Chain), the overlays
//! drawn with it and the current selection. It is the layer a front end
//! talks to: edits are validated against [`EditorSettings`], files are
//! loaded atomically, and bend edits can be recorded and replayed as a
//! [`MacroScript`].
//!
//! ```
//! use softarm_editor::{EditorSettings, Session};
//!
//! let mut session = Session::new(EditorSettings::default()).unwrap();
//! let id = session.add_joint();
//! session.select(id).unwrap();
//! session.bend_selected(0.4, 0.0).unwrap();
//! assert!(session.is_dirty());
//! ```

pub mod error;
pub mod macro_script;
pub mod session;
pub mod settings;

pub use error::{EditorError, Result};
pub use macro_script::{MacroRecorder, MacroScript, MacroStep};
pub use session::{read_chain_file, write_chain_file, FileFormat, Session};
pub use settings::EditorSettings;
