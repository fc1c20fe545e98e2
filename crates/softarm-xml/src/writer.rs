//! Joints-file writer.

use std::fmt::Display;
use std::io::Write;

use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use softarm_ir::JointRecord;

use crate::error::{Result, XmlError};

/// Serialize records as a joints file with two-space indentation.
///
/// Numbers are written in their shortest round-trip form, so reading the
/// output back yields field-equal records.
pub fn write_joints(records: &[JointRecord]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    open(&mut writer, "joints")?;
    for record in records {
        open(&mut writer, "joint")?;
        value(&mut writer, "id", record.id)?;

        open(&mut writer, "color")?;
        value(&mut writer, "red", record.color.red)?;
        value(&mut writer, "green", record.color.green)?;
        value(&mut writer, "blue", record.color.blue)?;
        close(&mut writer, "color")?;

        open(&mut writer, "size")?;
        value(&mut writer, "height", record.size.height)?;
        value(&mut writer, "radius", record.size.radius)?;
        close(&mut writer, "size")?;

        open(&mut writer, "axis")?;
        value(&mut writer, "u", record.axis.u)?;
        value(&mut writer, "v", record.axis.v)?;
        close(&mut writer, "axis")?;

        close(&mut writer, "joint")?;
    }
    close(&mut writer, "joints")?;

    let mut text = String::from_utf8(writer.into_inner())
        .map_err(|e| XmlError::Write(format!("invalid UTF-8 in generated XML: {e}")))?;
    text.push('\n');
    debug!("wrote {} joints", records.len());
    Ok(text)
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}

fn open<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(name)))
}

fn close<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn value<W: Write>(writer: &mut Writer<W>, name: &str, value: impl Display) -> Result<()> {
    open(writer, name)?;
    emit(writer, Event::Text(BytesText::new(&value.to_string())))?;
    close(writer, name)
}
