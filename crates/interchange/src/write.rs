use crate::{WriteError, BACKGROUND_ROLE, SVG_NAMESPACE};
use node::{Color, Document, Element, ElementKind, Style};
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Writes `document` as SVG markup.
///
/// Numbers use Rust's shortest round-tripping decimal form, so reading the
/// output back reproduces every value exactly.
pub fn to_markup(document: &Document) -> Result<String, WriteError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let width = number(document.width);
    let height = number(document.height);
    let view_box = format!("0 0 {} {}", width, height);
    let mut svg = BytesStart::new("svg");
    svg.push_attribute(("xmlns", SVG_NAMESPACE));
    svg.push_attribute(("width", width.as_str()));
    svg.push_attribute(("height", height.as_str()));
    svg.push_attribute(("viewBox", view_box.as_str()));
    writer.write_event(Event::Start(svg))?;

    writer.write_event(Event::Start(BytesStart::new("title")))?;
    writer.write_event(Event::Text(character_data(&document.name)))?;
    writer.write_event(Event::End(BytesEnd::new("title")))?;

    let mut background = BytesStart::new("rect");
    background.push_attribute(("data-role", BACKGROUND_ROLE));
    background.push_attribute(("x", "0"));
    background.push_attribute(("y", "0"));
    background.push_attribute(("width", width.as_str()));
    background.push_attribute(("height", height.as_str()));
    push_paint(&mut background, "fill", Some(document.background));
    writer.write_event(Event::Empty(background))?;

    let root = Style::default();
    for element in &document.elements {
        write_element(&mut writer, element, &root)?;
    }

    writer.write_event(Event::End(BytesEnd::new("svg")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// `inherited` is the style a reader would pass down from the enclosing
/// group; stroke attributes are written only where they differ from it.
fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element, inherited: &Style) -> Result<(), WriteError> {
    let tag = element.tag();
    let mut start = BytesStart::new(tag.as_ref());
    start.push_attribute(("id", element.id.to_string().as_str()));

    let mut text_content = None;
    match &element.kind {
        ElementKind::Rect {
            x,
            y,
            width,
            height,
            rx,
        } => {
            push_number(&mut start, "x", *x);
            push_number(&mut start, "y", *y);
            push_number(&mut start, "width", *width);
            push_number(&mut start, "height", *height);
            if *rx != 0.0 {
                push_number(&mut start, "rx", *rx);
            }
        }
        ElementKind::Circle { cx, cy, r } => {
            push_number(&mut start, "cx", *cx);
            push_number(&mut start, "cy", *cy);
            push_number(&mut start, "r", *r);
        }
        ElementKind::Ellipse { cx, cy, rx, ry } => {
            push_number(&mut start, "cx", *cx);
            push_number(&mut start, "cy", *cy);
            push_number(&mut start, "rx", *rx);
            push_number(&mut start, "ry", *ry);
        }
        ElementKind::Path { data } => {
            start.push_attribute(("d", data.to_string().as_str()));
        }
        ElementKind::Text {
            x,
            y,
            content,
            font_size,
        } => {
            push_number(&mut start, "x", *x);
            push_number(&mut start, "y", *y);
            push_number(&mut start, "font-size", *font_size);
            text_content = Some(content.as_str());
        }
        ElementKind::Group => {}
    }

    let style = &element.style;
    push_paint(&mut start, "fill", style.fill);
    if style.stroke != inherited.stroke {
        push_paint(&mut start, "stroke", style.stroke);
    }
    if style.stroke.is_some() || style.stroke_width != inherited.stroke_width {
        push_number(&mut start, "stroke-width", style.stroke_width);
    }
    if style.opacity != 1.0 {
        push_number(&mut start, "opacity", style.opacity);
    }
    if !element.transform.is_identity() {
        start.push_attribute(("transform", element.transform.to_string().as_str()));
    }

    match text_content {
        Some(content) if !content.is_empty() => {
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(character_data(content)))?;
            writer.write_event(Event::End(BytesEnd::new(tag.as_ref())))?;
        }
        _ if !element.children.is_empty() => {
            writer.write_event(Event::Start(start))?;
            for child in &element.children {
                write_element(writer, child, style)?;
            }
            writer.write_event(Event::End(BytesEnd::new(tag.as_ref())))?;
        }
        _ => writer.write_event(Event::Empty(start))?,
    }
    Ok(())
}

/// Escaped text with `\r` as a character reference. A literal carriage
/// return is folded into `\n` when the markup is read back.
fn character_data(content: &str) -> BytesText<'static> {
    BytesText::from_escaped(escape(content).replace('\r', "&#13;"))
}

fn number(value: f64) -> String {
    format!("{}", value)
}

fn push_number(start: &mut BytesStart, name: &str, value: f64) {
    start.push_attribute((name, number(value).as_str()));
}

/// Writes a paint as `#rrggbb`, plus `<name>-opacity` when translucent.
fn push_paint(start: &mut BytesStart, name: &str, color: Option<Color>) {
    let Some(color) = color else {
        start.push_attribute((name, "none"));
        return;
    };
    let opaque = Color::rgb(color.r, color.g, color.b);
    start.push_attribute((name, opaque.to_hex().as_str()));
    if !color.is_opaque() {
        let opacity = number(f64::from(color.a) / 255.0);
        start.push_attribute((format!("{}-opacity", name).as_str(), opacity.as_str()));
    }
}
