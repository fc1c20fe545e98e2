//! Joints-file reader.
//!
//! The document is first collected into a small element tree so that a
//! missing child can be reported at the position of its parent, then the
//! tree is walked into [`JointRecord`]s. Nothing is returned unless the
//! whole file is valid.

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use softarm_ir::{BendAxis, JointRecord, JointSize, Rgb};

use crate::error::{Result, XmlError};

/// Parse a joints file into records, in document order.
///
/// Elements the format does not know are skipped.
pub fn read_joints(xml: &str) -> Result<Vec<JointRecord>> {
    let lines = LineIndex::new(xml);
    let root = parse_tree(xml, &lines)?;

    let Some(root) = root else {
        return Err(XmlError::NotAJointsFile {
            line: 1,
            col: 1,
            found: String::new(),
        });
    };
    if root.name != "joints" {
        return Err(XmlError::NotAJointsFile {
            line: root.line,
            col: root.col,
            found: root.name,
        });
    }

    let joints: Vec<&Element> = root.children_named("joint").collect();
    if joints.is_empty() {
        return Err(XmlError::missing(root.line, root.col, "joint"));
    }

    let records = joints
        .into_iter()
        .map(parse_joint)
        .collect::<Result<Vec<_>>>()?;
    debug!("read {} joints", records.len());
    Ok(records)
}

// =============================================================================
// Element tree
// =============================================================================

#[derive(Debug)]
struct Element {
    name: String,
    line: usize,
    col: usize,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart, line: usize, col: usize) -> Self {
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            line,
            col,
            text: String::new(),
            children: Vec::new(),
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn require(&self, name: &str) -> Result<&Element> {
        self.child(name)
            .ok_or_else(|| XmlError::missing(self.line, self.col, name))
    }

    fn number(&self, name: &str) -> Result<f64> {
        let child = self.require(name)?;
        let text = child.text.trim();
        text.parse::<f64>()
            .map_err(|_| XmlError::invalid_number(child.line, child.col, name, text))
    }
}

/// Byte offsets of line starts, for turning reader positions into
/// line and column.
struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { source, starts }
    }

    fn locate(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.source.len());
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.starts[line];
        let col = self
            .source
            .get(start..offset)
            .map_or(offset - start, |s| s.chars().count());
        (line + 1, col + 1)
    }

    /// Position of the first non-whitespace byte at or after `offset`.
    fn locate_tag(&self, offset: usize) -> (usize, usize) {
        let rest = self.source.get(offset..).unwrap_or("");
        let skipped = rest.len() - rest.trim_start().len();
        self.locate(offset + skipped)
    }
}

fn parse_tree(xml: &str, lines: &LineIndex<'_>) -> Result<Option<Element>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                let (line, col) = lines.locate(reader.buffer_position() as usize);
                return Err(XmlError::Syntax {
                    line,
                    col,
                    message: e.to_string(),
                });
            }
        };

        match event {
            Event::Start(ref e) => {
                let (line, col) = lines.locate_tag(before);
                stack.push(Element::open(e, line, col));
            }
            Event::Empty(ref e) => {
                let (line, col) = lines.locate_tag(before);
                attach(&mut stack, &mut root, Element::open(e, line, col));
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Text(ref e) => {
                if let Some(top) = stack.last_mut() {
                    let text = e.unescape().map_err(|err| {
                        let (line, col) = lines.locate_tag(before);
                        XmlError::Syntax {
                            line,
                            col,
                            message: err.to_string(),
                        }
                    })?;
                    top.text.push_str(&text);
                }
            }
            Event::CData(ref e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        let (line, col) = lines.locate(xml.len());
        return Err(XmlError::Syntax {
            line,
            col,
            message: format!("unexpected end of document inside <{}>", open.name),
        });
    }

    Ok(root)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

// =============================================================================
// Records
// =============================================================================

fn parse_joint(joint: &Element) -> Result<JointRecord> {
    let id_element = joint.require("id")?;
    let id_text = id_element.text.trim();
    let id = id_text
        .parse::<u64>()
        .map_err(|_| XmlError::invalid_number(id_element.line, id_element.col, "id", id_text))?;

    let color = joint.require("color")?;
    let size = joint.require("size")?;
    let axis = joint.require("axis")?;

    Ok(JointRecord {
        id,
        color: Rgb::new(
            color.number("red")?,
            color.number("green")?,
            color.number("blue")?,
        ),
        size: JointSize::new(size.number("height")?, size.number("radius")?),
        axis: BendAxis::new(axis.number("u")?, axis.number("v")?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<joints>
  <joint>
    <id>1</id>
    <color><red>0</red><green>0</green><blue>0</blue></color>
    <size><height>5</height><radius>1</radius></size>
    <axis><u>0</u><v>0</v></axis>
  </joint>
</joints>
"#;

    #[test]
    fn test_read_single_joint() {
        let records = read_joints(SINGLE).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, 1);
        assert_eq!(r.color, Rgb::new(0.0, 0.0, 0.0));
        assert_eq!(r.size, JointSize::new(5.0, 1.0));
        assert_eq!(r.axis, BendAxis::new(0.0, 0.0));
    }

    #[test]
    fn test_missing_size_is_reported_at_joint() {
        let xml = "<joints>\n  <joint>\n    <id>4</id>\n    <color><red>1</red><green>2</green><blue>3</blue></color>\n    <axis><u>0.1</u><v>0.2</v></axis>\n  </joint>\n</joints>";
        let err = read_joints(xml).unwrap_err();
        assert_eq!(err, XmlError::missing(2, 3, "size"));
    }

    #[test]
    fn test_missing_child_is_reported_at_parent() {
        let xml = "<joints><joint><id>1</id><color><red>0</red><green>0</green><blue>0</blue></color><size><height>5</height></size><axis><u>0</u><v>0</v></axis></joint></joints>";
        match read_joints(xml).unwrap_err() {
            XmlError::MissingParameter { parameter, line, col } => {
                assert_eq!(parameter, "radius");
                assert_eq!((line, col), (1, 83));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_root() {
        let err = read_joints("<?xml version=\"1.0\"?>\n<robot/>").unwrap_err();
        assert_eq!(
            err,
            XmlError::NotAJointsFile {
                line: 2,
                col: 1,
                found: "robot".into()
            }
        );
    }

    #[test]
    fn test_no_joints_is_missing_joint() {
        let err = read_joints("<joints>\n</joints>").unwrap_err();
        assert_eq!(err, XmlError::missing(1, 1, "joint"));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            read_joints("").unwrap_err(),
            XmlError::NotAJointsFile { .. }
        ));
    }

    #[test]
    fn test_invalid_number() {
        let xml = SINGLE.replace("<height>5</height>", "<height>tall</height>");
        match read_joints(&xml).unwrap_err() {
            XmlError::InvalidNumber {
                parameter, text, line, ..
            } => {
                assert_eq!(parameter, "height");
                assert_eq!(text, "tall");
                assert_eq!(line, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_id_is_invalid() {
        let xml = SINGLE.replace("<id>1</id>", "<id>-3</id>");
        assert!(matches!(
            read_joints(&xml).unwrap_err(),
            XmlError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn test_mismatched_tags_are_syntax_errors() {
        let err = read_joints("<joints>\n  <joint></jont>\n</joints>").unwrap_err();
        assert!(matches!(err, XmlError::Syntax { .. }), "{err:?}");
        assert_eq!(err.location().map(|(line, _)| line), Some(2));
    }

    #[test]
    fn test_truncated_document() {
        let err = read_joints("<joints><joint><id>1</id>").unwrap_err();
        assert!(matches!(err, XmlError::Syntax { .. }), "{err:?}");
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        let xml = SINGLE
            .replace("<id>1</id>", "<id>1</id><note>left arm</note><extra><deep/></extra>")
            .replace("<joints>", "<joints><meta version=\"2\"/>");
        let records = read_joints(&xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
    }

    #[test]
    fn test_order_is_document_order() {
        let joint = |id: u64| {
            format!(
                "<joint><id>{id}</id><color><red>0</red><green>0</green><blue>0</blue></color>\
                 <size><height>2</height><radius>0.5</radius></size><axis><u>0</u><v>0</v></axis></joint>"
            )
        };
        let xml = format!("<joints>{}{}{}</joints>", joint(9), joint(2), joint(5));
        let ids: Vec<u64> = read_joints(&xml).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[test]
    fn test_line_index_columns_count_chars() {
        let lines = LineIndex::new("ab\nçd<x");
        assert_eq!(lines.locate(0), (1, 1));
        assert_eq!(lines.locate(3), (2, 1));
        // 'ç' is two bytes
        assert_eq!(lines.locate(6), (2, 3));
        assert_eq!(lines.locate_tag(2), (2, 1));
    }
}
