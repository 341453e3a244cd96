//! MJML 3 to MJML 4 migration.
//!
//! Markup is read into a small element tree, rewritten, and printed back
//! with two-space indentation. Tags whose body is HTML (`mj-text`,
//! `mj-button`, ...) keep that body byte for byte.

use crate::error::{MjmlError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use tracing::warn;

/// Tags whose content is raw HTML rather than MJML children.
pub const ENDING_TAGS: &[&str] = &[
    "mj-text",
    "mj-button",
    "mj-raw",
    "mj-table",
    "mj-navbar-link",
    "mj-social-element",
    "mj-accordion-title",
    "mj-accordion-text",
    "mj-style",
    "mj-title",
    "mj-preview",
    "mj-link",
];

/// Attributes whose bare numeric values are pixel lengths.
const PX_ATTRIBUTES: &[&str] = &[
    "width",
    "height",
    "border-radius",
    "font-size",
    "icon-size",
    "icon-height",
    "inner-padding",
    "letter-spacing",
];

/// Per-network attributes of the MJML 3 `mj-social` and what they became.
const SOCIAL_ATTRIBUTES: &[(&str, &str)] = &[
    ("href", "href"),
    ("icon-color", "background-color"),
    ("icon", "src"),
    ("alt", "alt"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    /// Raw body of an ending tag
    content: Option<String>,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            content: None,
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.html_attributes().with_checks(false) {
            let attr = attr?;
            element.attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            ));
        }
        Ok(element)
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn take_attribute(&mut self, key: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(index).1)
    }

    fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Adopt attributes this element does not define yet.
    fn merge_attributes(&mut self, attributes: Vec<(String, String)>) {
        for (key, value) in attributes {
            if self.attribute(&key).is_none() {
                self.attributes.push((key, value));
            }
        }
    }

    fn has_child(&self, name: &str) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, Node::Element(e) if e.name == name))
    }
}

/// Converts MJML 3 markup to MJML 4.
#[derive(Debug, Clone)]
pub struct Migrator {
    indent: usize,
}

impl Migrator {
    pub fn new() -> Self {
        Self { indent: 2 }
    }

    /// Spaces per nesting level in the output
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn migrate(&self, input: &str) -> Result<String> {
        let roots = parse(input)?;
        let roots = migrate_children(None, roots);

        let mut lines = Vec::new();
        for node in &roots {
            self.print(node, 0, &mut lines);
        }
        Ok(lines.join("\n"))
    }

    fn print(&self, node: &Node, depth: usize, lines: &mut Vec<String>) {
        let pad = " ".repeat(depth * self.indent);
        match node {
            Node::Text(text) => lines.push(format!("{pad}{text}")),
            Node::Comment(comment) => lines.push(format!("{pad}<!--{comment}-->")),
            Node::Element(element) => {
                let open = open_tag(element);
                if let Some(content) = &element.content {
                    lines.push(format!("{pad}{open}>{content}</{}>", element.name));
                } else if element.children.is_empty() {
                    lines.push(format!("{pad}{open} />"));
                } else {
                    lines.push(format!("{pad}{open}>"));
                    for child in &element.children {
                        self.print(child, depth + 1, lines);
                    }
                    lines.push(format!("{pad}</{}>", element.name));
                }
            }
        }
    }
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert MJML 3 markup to MJML 4, returning `input` unchanged when it
/// cannot be parsed.
pub fn migrate_to_mjml4(input: &str) -> String {
    match Migrator::new().migrate(input) {
        Ok(migrated) => migrated,
        Err(e) => {
            warn!(error = %e, "Leaving markup unmigrated");
            input.to_string()
        }
    }
}

fn open_tag(element: &Element) -> String {
    let mut tag = format!("<{}", element.name);
    for (key, value) in &element.attributes {
        if value.contains('"') {
            tag.push_str(&format!(" {key}='{value}'"));
        } else {
            tag.push_str(&format!(" {key}=\"{value}\""));
        }
    }
    tag
}

fn parse(input: &str) -> Result<Vec<Node>> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().check_end_names = false;

    let mut roots = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut text = String::new();

    loop {
        let event = reader.read_event()?;

        if !matches!(event, Event::Text(_) | Event::CData(_) | Event::GeneralRef(_)) {
            flush_text(&mut text, &mut stack, &mut roots);
        }

        match event {
            Event::Start(start) => {
                let mut element = Element::from_start(&start)?;
                if ENDING_TAGS.contains(&element.name.as_str()) {
                    let end = start.name().as_ref().to_vec();
                    element.content = Some(reader.read_text(QName(&end))?.into_owned());
                    append(Node::Element(element), &mut stack, &mut roots);
                } else {
                    stack.push(element);
                }
            }
            Event::Empty(start) => {
                append(Node::Element(Element::from_start(&start)?), &mut stack, &mut roots);
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let element = stack
                    .pop()
                    .ok_or_else(|| MjmlError::Parse(format!("unexpected closing tag </{name}>")))?;
                if element.name != name {
                    return Err(MjmlError::Parse(format!(
                        "expected </{}>, found </{}>",
                        element.name, name
                    )));
                }
                append(Node::Element(element), &mut stack, &mut roots);
            }
            Event::Text(raw) => text.push_str(&String::from_utf8_lossy(&raw)),
            Event::GeneralRef(reference) => {
                text.push('&');
                text.push_str(&String::from_utf8_lossy(&reference));
                text.push(';');
            }
            Event::CData(data) => {
                text.push_str("<![CDATA[");
                text.push_str(&String::from_utf8_lossy(&data));
                text.push_str("]]>");
            }
            Event::Comment(comment) => append(
                Node::Comment(String::from_utf8_lossy(&comment).into_owned()),
                &mut stack,
                &mut roots,
            ),
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(MjmlError::Parse(format!("unclosed tag <{}>", open.name)));
    }

    Ok(roots)
}

fn flush_text(text: &mut String, stack: &mut [Element], roots: &mut Vec<Node>) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        let node = Node::Text(trimmed.to_string());
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
    text.clear();
}

fn append(node: Node, stack: &mut [Element], roots: &mut Vec<Node>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Migrate `children` of an element named `parent` (`None` at the root).
fn migrate_children(mut parent: Option<&mut Element>, children: Vec<Node>) -> Vec<Node> {
    let parent_name = parent.as_ref().map(|p| p.name.clone());
    let mut migrated = Vec::with_capacity(children.len());

    for child in children {
        let Node::Element(element) = child else {
            migrated.push(child);
            continue;
        };
        let mut element = migrate_element(element);

        let spliced = matches!(
            (element.name.as_str(), parent_name.as_deref()),
            ("mj-container", Some("mj-body")) | ("mj-hero-content", Some("mj-hero"))
        );

        if spliced {
            if let Some(parent) = parent.as_mut() {
                parent.merge_attributes(std::mem::take(&mut element.attributes));
            }
            migrated.append(&mut element.children);
            continue;
        }

        if element.name == "mj-container" {
            element.name = "mj-body".to_string();
        }
        migrated.push(Node::Element(element));
    }

    migrated
}

fn migrate_element(mut element: Element) -> Element {
    let children = std::mem::take(&mut element.children);
    element.children = migrate_children(Some(&mut element), children);

    match element.name.as_str() {
        "mj-navbar" if element.has_child("mj-column") => {
            element.name = "mj-section".to_string();
        }
        "mj-inline-links" => {
            element.name = "mj-navbar".to_string();
            for child in &mut element.children {
                if let Node::Element(link) = child {
                    if link.name == "mj-link" {
                        link.name = "mj-navbar-link".to_string();
                    }
                }
            }
        }
        "mj-social" => migrate_social(&mut element),
        _ => {}
    }

    add_px_units(&mut element);
    element
}

/// Turn `display="facebook:share twitter:url"` and the `<network>-*`
/// attributes into `mj-social-element` children.
fn migrate_social(social: &mut Element) {
    let Some(display) = social.take_attribute("display") else {
        return;
    };

    let mut networks = Vec::new();
    for entry in display.split_whitespace() {
        let (network, mode) = entry.split_once(':').unwrap_or((entry, "share"));

        let mut element = Element::new("mj-social-element");
        let name = if mode == "url" {
            format!("{network}-noshare")
        } else {
            network.to_string()
        };
        element.set_attribute("name", name);

        for (old, new) in SOCIAL_ATTRIBUTES {
            if let Some(value) = social.take_attribute(&format!("{network}-{old}")) {
                element.set_attribute(*new, value);
            }
        }
        element.content = Some(
            social
                .take_attribute(&format!("{network}-content"))
                .unwrap_or_default(),
        );
        networks.push(Node::Element(element));
    }

    networks.append(&mut social.children);
    social.children = networks;
}

fn add_px_units(element: &mut Element) {
    for (key, value) in &mut element.attributes {
        if !(PX_ATTRIBUTES.contains(&key.as_str()) || key.starts_with("padding")) {
            continue;
        }
        if value.split_whitespace().any(is_bare_number) {
            *value = value
                .split_whitespace()
                .map(|token| {
                    if is_bare_number(token) {
                        format!("{token}px")
                    } else {
                        token.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
        }
    }
}

fn is_bare_number(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || c == '.')
        && token.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_is_removed() {
        let input = r##"<mjml><mj-body><mj-container background-color="#fff" width="600"><mj-section padding="10 25"><mj-column><mj-text font-size="13">Hello <b>World</b></mj-text></mj-column></mj-section></mj-container></mj-body></mjml>"##;

        let expected = r##"<mjml>
  <mj-body background-color="#fff" width="600px">
    <mj-section padding="10px 25px">
      <mj-column>
        <mj-text font-size="13px">Hello <b>World</b></mj-text>
      </mj-column>
    </mj-section>
  </mj-body>
</mjml>"##;

        assert_eq!(migrate_to_mjml4(input), expected);
    }

    #[test]
    fn test_body_attributes_win_over_container() {
        let input = r##"<mjml><mj-body width="500px"><mj-container width="600" background-color="#eee" /></mj-body></mjml>"##;
        let output = migrate_to_mjml4(input);
        assert!(output.contains(r##"<mj-body width="500px" background-color="#eee" />"##));
    }

    #[test]
    fn test_hero_content_is_removed() {
        let input = r#"<mj-hero mode="fixed-height"><mj-hero-content background-color="white" padding="20"><mj-text>Hero</mj-text></mj-hero-content></mj-hero>"#;
        let expected = "<mj-hero mode=\"fixed-height\" background-color=\"white\" padding=\"20px\">\n  <mj-text>Hero</mj-text>\n</mj-hero>";
        assert_eq!(migrate_to_mjml4(input), expected);
    }

    #[test]
    fn test_inline_links_become_navbar() {
        let input = r##"<mj-navbar><mj-column><mj-inline-links base-url="https://mjml.io"><mj-link href="/gettings-started">Getting started</mj-link></mj-inline-links></mj-column></mj-navbar>"##;
        let output = migrate_to_mjml4(input);

        assert!(output.starts_with("<mj-section>"));
        assert!(output.contains(r#"<mj-navbar base-url="https://mjml.io">"#));
        assert!(output.contains(r#"<mj-navbar-link href="/gettings-started">Getting started</mj-navbar-link>"#));
        assert!(!output.contains("mj-inline-links"));
        assert!(!output.contains("<mj-link"));
    }

    #[test]
    fn test_social_networks_become_elements() {
        let input = r##"<mj-social display="facebook:share twitter:url" facebook-href="https://fb.com/x" facebook-content="Share" twitter-icon-color="#000" icon-size="20" mode="horizontal" />"##;
        let expected = r##"<mj-social icon-size="20px" mode="horizontal">
  <mj-social-element name="facebook" href="https://fb.com/x">Share</mj-social-element>
  <mj-social-element name="twitter-noshare" background-color="#000"></mj-social-element>
</mj-social>"##;
        assert_eq!(migrate_to_mjml4(input), expected);
    }

    #[test]
    fn test_units_left_alone_when_present() {
        let input = r#"<mj-column width="50%" padding="0 10px" line-height="1.5" />"#;
        assert_eq!(
            migrate_to_mjml4(input),
            r#"<mj-column width="50%" padding="0px 10px" line-height="1.5" />"#
        );
    }

    #[test]
    fn test_raw_content_is_verbatim() {
        let input = "<mj-raw><div class=\"x\">\n  <span>&nbsp;</span>\n</div></mj-raw>";
        assert_eq!(migrate_to_mjml4(input), input);
    }

    #[test]
    fn test_comments_and_entities_survive() {
        let input = "<mj-column><!-- keep me --><mj-divider />Fish &amp; chips</mj-column>";
        let expected = "<mj-column>\n  <!-- keep me -->\n  <mj-divider />\n  Fish &amp; chips\n</mj-column>";
        assert_eq!(migrate_to_mjml4(input), expected);
    }

    #[test]
    fn test_migration_is_stable() {
        let input = r#"<mjml><mj-body><mj-container><mj-section><mj-column><mj-image src="a.png" width="100" /></mj-column></mj-section></mj-container></mj-body></mjml>"#;
        let once = migrate_to_mjml4(input);
        assert_eq!(migrate_to_mjml4(&once), once);
    }

    #[test]
    fn test_malformed_input_is_returned_unchanged() {
        for input in ["<mjml><mj-body>", "<mjml><mj-body></mjml>", "</mj-body>"] {
            assert!(Migrator::new().migrate(input).is_err());
            assert_eq!(migrate_to_mjml4(input), input);
        }
    }

    #[test]
    fn test_custom_indent() {
        let output = Migrator::new()
            .with_indent(4)
            .migrate("<mjml><mj-body /></mjml>")
            .unwrap();
        assert_eq!(output, "<mjml>\n    <mj-body />\n</mjml>");
    }

    #[test]
    fn test_bare_numbers() {
        assert!(is_bare_number("600"));
        assert!(is_bare_number("1.5"));
        assert!(!is_bare_number("600px"));
        assert!(!is_bare_number("50%"));
        assert!(!is_bare_number("."));
        assert!(!is_bare_number("auto"));
    }
}
