// Reference resolution
//
// Decides whether an element is linked to its own section or written out as
// a literal type expression. Every generator goes through here so that the
// decision is the same everywhere in the document.

use crate::latex::escape;
use crate::model::{Element, UmlModel};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// Written in place of a type that is not part of the element table
pub const UNRESOLVED_TYPE: &str = "Nested classes aren't supported.";

/// `[pkg::]Name<[pkg::]Param>`, anchored at the start
fn generic_type() -> &'static Regex {
    static GENERIC: OnceLock<Regex> = OnceLock::new();
    GENERIC.get_or_init(|| {
        Regex::new(r"^(?:\w+::)?(\w+)<(?:\w+::)?(\w+)>").expect("static generic type pattern")
    })
}

/// How a referenced element is displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference<'a> {
    /// Named link to the section of a class
    Link(&'a str),
    /// Plain text
    Literal(String),
}

impl fmt::Display for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Link(name) => write!(f, "\\nameref{{{}}}", escape(name)),
            Reference::Literal(text) => f.write_str(&escape(text)),
        }
    }
}

/// Resolves element ids against the model
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    model: &'a UmlModel,
    noref: &'a HashSet<String>,
    std_package: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(model: &'a UmlModel, noref: &'a HashSet<String>, std_package: &'a str) -> Self {
        Self {
            model,
            noref,
            std_package,
        }
    }

    /// Display form of an element, `None` if the id is unknown
    pub fn resolve(&self, id: &str) -> Option<Reference<'a>> {
        let element = self.model.get(id)?;
        if let Element::Class(class) = element {
            if class.package != self.std_package && !self.noref.contains(&class.name) {
                return Some(Reference::Link(&class.name));
            }
        }
        Some(Reference::Literal(literal_name(element.name())))
    }

    /// LaTeX for a reference, with a diagnostic for unknown ids
    pub fn render(&self, id: &str) -> String {
        match self.resolve(id) {
            Some(reference) => reference.to_string(),
            None => UNRESOLVED_TYPE.to_string(),
        }
    }

    /// Like [`Resolver::render`] for optional type references
    pub fn render_opt(&self, id: Option<&str>) -> String {
        id.map(|id| self.render(id))
            .unwrap_or_else(|| UNRESOLVED_TYPE.to_string())
    }
}

/// Strip namespace prefixes from a single-parameter generic type
pub fn literal_name(name: &str) -> String {
    match generic_type().captures(name) {
        Some(caps) => format!("{}<{}>", &caps[1], &caps[2]),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Class, ClassKind, DataType, TemplateParameter};

    fn model() -> UmlModel {
        let mut model = UmlModel::default();
        let classes = [
            ("c1", "Widget", "Core"),
            ("c2", "String", "std"),
            ("c3", "Hidden", "Core"),
            ("c4", "my_widget", "Core"),
        ];
        for (id, name, package) in classes {
            model.elements.insert(
                id.to_string(),
                Element::Class(Class::new(ClassKind::Class, id, name, package)),
            );
        }
        model.elements.insert(
            "d1".to_string(),
            Element::DataType(DataType {
                name: "std::vector<std::string>".to_string(),
                id: "d1".to_string(),
                docs: None,
            }),
        );
        model.elements.insert(
            "d2".to_string(),
            Element::DataType(DataType {
                name: "int".to_string(),
                id: "d2".to_string(),
                docs: None,
            }),
        );
        model.elements.insert(
            "t1".to_string(),
            Element::Template(TemplateParameter {
                name: "T".to_string(),
                id: "t1".to_string(),
                bound: None,
                docs: None,
            }),
        );
        model
    }

    fn noref() -> HashSet<String> {
        ["Hidden".to_string()].into_iter().collect()
    }

    #[test]
    fn test_class_is_linked() {
        let model = model();
        let noref = noref();
        let resolver = Resolver::new(&model, &noref, "std");
        assert_eq!(resolver.resolve("c1"), Some(Reference::Link("Widget")));
        assert_eq!(resolver.render("c1"), "\\nameref{Widget}");
    }

    #[test]
    fn test_std_package_and_noref_are_literal() {
        let model = model();
        let noref = noref();
        let resolver = Resolver::new(&model, &noref, "std");
        assert_eq!(resolver.resolve("c2"), Some(Reference::Literal("String".to_string())));
        assert_eq!(resolver.resolve("c3"), Some(Reference::Literal("Hidden".to_string())));
    }

    #[test]
    fn test_non_classes_are_literal() {
        let model = model();
        let noref = noref();
        let resolver = Resolver::new(&model, &noref, "std");
        assert_eq!(resolver.resolve("d2"), Some(Reference::Literal("int".to_string())));
        assert_eq!(resolver.resolve("t1"), Some(Reference::Literal("T".to_string())));
    }

    #[test]
    fn test_generic_prefixes_stripped() {
        let model = model();
        let noref = noref();
        let resolver = Resolver::new(&model, &noref, "std");
        assert_eq!(
            resolver.resolve("d1"),
            Some(Reference::Literal("vector<string>".to_string()))
        );
    }

    #[test]
    fn test_literal_name_patterns() {
        assert_eq!(literal_name("Container<Element>"), "Container<Element>");
        assert_eq!(literal_name("core::Container<Element>"), "Container<Element>");
        assert_eq!(literal_name("Container<core::Element>"), "Container<Element>");
        assert_eq!(literal_name("Map<K, V>"), "Map<K, V>");
        assert_eq!(literal_name("Plain"), "Plain");
    }

    #[test]
    fn test_names_are_escaped() {
        let model = model();
        let noref = noref();
        let resolver = Resolver::new(&model, &noref, "std");
        assert_eq!(resolver.render("c4"), "\\nameref{my\\_widget}");
    }

    #[test]
    fn test_unknown_id_gets_diagnostic() {
        let model = model();
        let noref = noref();
        let resolver = Resolver::new(&model, &noref, "std");
        assert_eq!(resolver.resolve("nope"), None);
        assert_eq!(resolver.render("nope"), UNRESOLVED_TYPE);
        assert_eq!(resolver.render_opt(None), UNRESOLVED_TYPE);
        assert_eq!(resolver.render_opt(Some("d2")), "int");
    }
}
