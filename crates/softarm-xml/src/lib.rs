#![warn(missing_docs)]

//! XML joints files for softarm chains.
//!
//! The format stores one `<joint>` per segment, base to tip:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <joints>
//!   <joint>
//!     <id>1</id>
//!     <color><red>0</red><green>0</green><blue>0</blue></color>
//!     <size><height>5</height><radius>1</radius></size>
//!     <axis><u>0</u><v>0</v></axis>
//!   </joint>
//! </joints>
//! ```
//!
//! The anchor is not part of this format; use the JSON
//! [`softarm_ir::Document`] to keep it.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{Result, XmlError};
pub use reader::read_joints;
pub use writer::write_joints;
