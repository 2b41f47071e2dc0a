// Single-class diagram injection
//
// The model text is left untouched apart from the inserted diagrams, so the
// renderer sees the document exactly as the modeling tool wrote it.

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::model::{Class, ClassKind, UmlModel, UML_NS};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::io::Cursor;
use std::ops::Range;
use tracing::debug;

/// Width of a class widget without a custom width
pub const DEFAULT_WIDTH: u32 = 700;

const FONT: &str = "Noto Sans Mono,9,-1,5,50,0,0,0,0,0,Regular";

const DIAGRAM_ATTRIBUTES: &[(&str, &str)] = &[
    ("usefillcolor", "1"),
    ("showpackage", "1"),
    ("type", "1"),
    ("linewidth", "0"),
    ("textcolor", "#000000"),
    ("snapcsgrid", "0"),
    ("documentation", ""),
    ("canvaswidth", "500"),
    ("linecolor", "#ff0000"),
    ("snapx", "25"),
    ("snapy", "25"),
    ("canvasheight", "500"),
    ("snapgrid", "0"),
    ("showatts", "1"),
    ("showscope", "1"),
    ("showstereotype", "1"),
    ("showopsig", "1"),
    ("isopen", "1"),
    ("fillcolor", "#ffffc0"),
    ("showops", "1"),
    ("backgroundcolor", "#ffffff"),
    ("showpubliconly", "0"),
    ("zoom", "100"),
    ("showattribassocs", "1"),
    ("showattsig", "1"),
    ("griddotcolor", "#f7f7f7"),
    ("font", FONT),
    ("localid", "-1"),
    ("showgrid", "0"),
];

const WIDGET_ATTRIBUTES: &[(&str, &str)] = &[
    ("usefillcolor", "1"),
    ("usesdiagramfillcolor", "0"),
    ("showoperations", "1"),
    ("showpackage", "1"),
    ("usesdiagramusefillcolor", "0"),
    ("linewidth", "1"),
    ("showopsigs", "601"),
    ("textcolor", "#000000"),
    ("x", "-178"),
    ("y", "-178"),
    ("linecolor", "#ff0000"),
    ("autoresize", "1"),
    ("showscope", "1"),
    ("showstereotype", "1"),
    ("fillcolor", "#ffffc0"),
    ("showpubliconly", "0"),
    ("font", FONT),
    ("isinstance", "0"),
    ("localid", "uHVRIOTyOW7Yf"),
    ("showattsigs", "601"),
];

/// Where the generated diagrams go and what surrounds them
enum Insertion {
    /// Append after the last existing diagram
    After(usize),
    /// Replace an empty diagram list
    ReplaceList(Range<usize>),
    /// Replace an extension block without a diagram list
    ReplaceExtension(Range<usize>),
    /// The logical view has no extension block yet
    NewExtension(usize),
}

/// Add a `Diagram_<Class>` diagram for every class to the logical view
pub fn inject_single_class_diagrams(
    source: &str,
    model: &UmlModel,
    widths: &HashMap<String, u32>,
    config: &ModelConfig,
) -> Result<String> {
    let doc = Document::parse(source)?;
    let logical_view = doc
        .descendants()
        .find(|n| {
            n.has_tag_name((UML_NS, "Model"))
                && n.attribute("xmi.id") == Some(config.logical_view_id.as_str())
        })
        .ok_or_else(|| Error::missing_anchor(format!("logical view `{}`", config.logical_view_id)))?;

    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let insertion = locate(logical_view)?;
    let wrap_list = !matches!(insertion, Insertion::After(_));
    let wrap_extension = matches!(
        insertion,
        Insertion::ReplaceExtension(_) | Insertion::NewExtension(_)
    );

    if wrap_extension {
        let mut ext = BytesStart::new("XMI.extension");
        ext.push_attribute(("xmi.extender", "umbrello"));
        write(&mut writer, Event::Start(ext))?;
    }
    if wrap_list {
        write(&mut writer, Event::Start(BytesStart::new("diagrams")))?;
    }

    let mut count = 0;
    for class in model.classes() {
        let width = widths.get(&class.name).copied().unwrap_or(DEFAULT_WIDTH);
        write_diagram(&mut writer, class, width)?;
        count += 1;
    }

    if wrap_list {
        write(&mut writer, Event::End(BytesEnd::new("diagrams")))?;
    }
    if wrap_extension {
        write(&mut writer, Event::End(BytesEnd::new("XMI.extension")))?;
    }

    let fragment = String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| Error::XmlWrite(e.to_string()))?;
    debug!(diagrams = count, "injected single-class diagrams");

    let (start, end) = match insertion {
        Insertion::After(pos) | Insertion::NewExtension(pos) => (pos, pos),
        Insertion::ReplaceList(range) | Insertion::ReplaceExtension(range) => (range.start, range.end),
    };
    Ok(format!("{}{}{}", &source[..start], fragment, &source[end..]))
}

fn locate(logical_view: Node) -> Result<Insertion> {
    let Some(ext) = logical_view
        .children()
        .find(|n| n.has_tag_name("XMI.extension"))
    else {
        let last = logical_view
            .children()
            .filter(|n| n.is_element())
            .last()
            .ok_or_else(|| Error::missing_anchor("namespace of the logical view"))?;
        return Ok(Insertion::NewExtension(last.range().end));
    };

    let Some(list) = ext.children().find(|n| n.has_tag_name("diagrams")) else {
        return Ok(Insertion::ReplaceExtension(ext.range()));
    };

    Ok(match list.children().filter(|n| n.is_element()).last() {
        Some(last) => Insertion::After(last.range().end),
        None => Insertion::ReplaceList(list.range()),
    })
}

fn write_diagram<W: std::io::Write>(writer: &mut Writer<W>, class: &Class, width: u32) -> Result<()> {
    let name = format!("Diagram_{}", class.name);
    let id = format!("diag_{}", class.name);
    let mut diagram = BytesStart::new("diagram");
    diagram.push_attribute(("name", name.as_str()));
    diagram.push_attribute(("xmi.id", id.as_str()));
    diagram.extend_attributes(DIAGRAM_ATTRIBUTES.iter().copied());
    write(writer, Event::Start(diagram))?;

    write(writer, Event::Start(BytesStart::new("widgets")))?;
    let height = class.approx_height.to_string();
    let width = width.to_string();
    let show_attributes = if class.kind == ClassKind::Class { "1" } else { "0" };
    let mut widget = BytesStart::new(class.kind.widget_tag());
    widget.push_attribute(("xmi.id", class.id.as_str()));
    widget.push_attribute(("height", height.as_str()));
    widget.push_attribute(("width", width.as_str()));
    widget.push_attribute(("showattributes", show_attributes));
    widget.extend_attributes(WIDGET_ATTRIBUTES.iter().copied());
    write(writer, Event::Empty(widget))?;
    write(writer, Event::End(BytesEnd::new("widgets")))?;

    write(writer, Event::Empty(BytesStart::new("messages")))?;
    write(writer, Event::Empty(BytesStart::new("associations")))?;
    write(writer, Event::End(BytesEnd::new("diagram")))
}

fn write<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlWrite(format!("Write error: {e}")))
}
