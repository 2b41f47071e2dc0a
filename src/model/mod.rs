// UML element graph
//
// Built once by the reader and only read afterwards.

mod reader;

pub use reader::{parse_model, UML_NS};

use indexmap::IndexMap;
use serde::Serialize;

/// Base height of a single-class diagram, in pixels
pub const BASE_CLASS_HEIGHT: u32 = 60;
/// Extra height per operation or attribute
pub const MEMBER_HEIGHT: u32 = 15;

/// Discriminator for everything that can appear in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElementKind {
    Class,
    DataType,
    Template,
    Dependency,
    Association,
}

/// An entry of the global element table
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "element")]
pub enum Element {
    Class(Class),
    DataType(DataType),
    Template(TemplateParameter),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Element::Class(c) => &c.id,
            Element::DataType(d) => &d.id,
            Element::Template(t) => &t.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Element::Class(c) => &c.name,
            Element::DataType(d) => &d.name,
            Element::Template(t) => &t.name,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Class(_) => ElementKind::Class,
            Element::DataType(_) => ElementKind::DataType,
            Element::Template(_) => ElementKind::Template,
        }
    }

    pub fn as_class(&self) -> Option<&Class> {
        match self {
            Element::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut Class> {
        match self {
            Element::Class(c) => Some(c),
            _ => None,
        }
    }
}

/// The closed set of classifier kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClassKind {
    Class,
    Interface,
    Enumeration,
}

impl ClassKind {
    /// Classify a UML element by its local tag name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Class" => Some(ClassKind::Class),
            "Interface" => Some(ClassKind::Interface),
            "Enumeration" => Some(ClassKind::Enumeration),
            _ => None,
        }
    }

    /// Widget tag the diagram renderer expects for this kind
    pub fn widget_tag(self) -> &'static str {
        match self {
            ClassKind::Class => "classwidget",
            ClassKind::Interface => "interfacewidget",
            ClassKind::Enumeration => "enumwidget",
        }
    }
}

/// A class, interface or enumeration
#[derive(Debug, Clone, Serialize)]
pub struct Class {
    pub kind: ClassKind,
    pub name: String,
    /// Name of the owning package
    pub package: String,
    pub id: String,
    pub docs: Option<String>,
    pub operations: Vec<Operation>,
    pub attributes: Vec<Attribute>,
    /// Supertype id
    pub abstraction: Option<String>,
    /// Subtype ids
    pub children: Vec<String>,
    /// Template parameter id
    pub template: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub associations: Vec<Association>,
    pub approx_height: u32,
}

impl Class {
    pub fn new(kind: ClassKind, id: impl Into<String>, name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            package: package.into(),
            id: id.into(),
            docs: None,
            operations: Vec::new(),
            attributes: Vec::new(),
            abstraction: None,
            children: Vec::new(),
            template: None,
            dependencies: Vec::new(),
            associations: Vec::new(),
            approx_height: BASE_CLASS_HEIGHT,
        }
    }

    /// Heuristic height of the class box in a rendered diagram
    pub fn approximate_height(operations: usize, attributes: usize) -> u32 {
        BASE_CLASS_HEIGHT + MEMBER_HEIGHT * (operations + attributes) as u32
    }

    /// Whether an association to `target` already exists
    pub fn associates_with(&self, target: &str) -> bool {
        self.associations.iter().any(|a| a.target == target)
    }
}

/// An operation signature
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    pub name: String,
    /// Return type id, `None` for void
    pub return_type: Option<String>,
    pub parameters: Vec<Parameter>,
    pub docs: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    pub type_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: String,
    pub type_ref: Option<String>,
    pub docs: Option<String>,
}

/// An externally defined or primitive type
#[derive(Debug, Clone, Serialize)]
pub struct DataType {
    pub name: String,
    pub id: String,
    pub docs: Option<String>,
}

/// A generic type parameter, owned by one class
#[derive(Debug, Clone, Serialize)]
pub struct TemplateParameter {
    pub name: String,
    pub id: String,
    /// Bound type id
    pub bound: Option<String>,
    pub docs: Option<String>,
}

/// A "uses" edge from a class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependency {
    pub target: String,
    pub docs: Option<String>,
}

impl Dependency {
    pub fn kind(&self) -> ElementKind {
        ElementKind::Dependency
    }
}

/// A navigable association end, stored on the owning class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Association {
    /// Role name
    pub name: String,
    pub target: String,
    pub multiplicity: Option<String>,
    pub docs: Option<String>,
}

impl Association {
    pub fn kind(&self) -> ElementKind {
        ElementKind::Association
    }
}

/// A package (module) and its classes in source order
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub name: String,
    pub id: Option<String>,
    pub docs: Option<String>,
    /// Class ids
    pub classes: Vec<String>,
}

/// A class or sequence diagram found in the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram {
    pub id: Option<String>,
    pub name: String,
    /// Empty when the diagram has no description
    pub documentation: String,
}

/// The parsed model
#[derive(Debug, Clone, Default, Serialize)]
pub struct UmlModel {
    /// Every element by id
    pub elements: IndexMap<String, Element>,
    pub packages: Vec<Package>,
    pub class_diagrams: Vec<Diagram>,
    pub sequence_diagrams: Vec<Diagram>,
}

impl UmlModel {
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn class(&self, id: &str) -> Option<&Class> {
        self.elements.get(id).and_then(Element::as_class)
    }

    /// All classes in table order
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.elements.values().filter_map(Element::as_class)
    }

    /// Classes of a package, skipping ids that are not classes
    pub fn package_classes<'a>(&'a self, package: &'a Package) -> impl Iterator<Item = &'a Class> + 'a {
        package.classes.iter().filter_map(move |id| self.class(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_kind_from_tag() {
        assert_eq!(ClassKind::from_tag("Class"), Some(ClassKind::Class));
        assert_eq!(ClassKind::from_tag("Interface"), Some(ClassKind::Interface));
        assert_eq!(ClassKind::from_tag("Enumeration"), Some(ClassKind::Enumeration));
        assert_eq!(ClassKind::from_tag("Component"), None);
    }

    #[test]
    fn test_widget_tags() {
        assert_eq!(ClassKind::Class.widget_tag(), "classwidget");
        assert_eq!(ClassKind::Interface.widget_tag(), "interfacewidget");
        assert_eq!(ClassKind::Enumeration.widget_tag(), "enumwidget");
    }

    #[test]
    fn test_approximate_height() {
        assert_eq!(Class::approximate_height(0, 0), 60);
        assert_eq!(Class::approximate_height(2, 3), 135);
    }

    #[test]
    fn test_element_accessors() {
        let element = Element::Class(Class::new(ClassKind::Interface, "c1", "Shape", "Core"));
        assert_eq!(element.id(), "c1");
        assert_eq!(element.name(), "Shape");
        assert_eq!(element.kind(), ElementKind::Class);
        assert!(element.as_class().is_some());

        let datatype = Element::DataType(DataType {
            name: "int".to_string(),
            id: "d1".to_string(),
            docs: None,
        });
        assert_eq!(datatype.kind(), ElementKind::DataType);
        assert!(datatype.as_class().is_none());
    }

    #[test]
    fn test_edge_kinds() {
        let dep = Dependency { target: "x".to_string(), docs: None };
        let assoc = Association {
            name: "items".to_string(),
            target: "x".to_string(),
            multiplicity: None,
            docs: None,
        };
        assert_eq!(dep.kind(), ElementKind::Dependency);
        assert_eq!(assoc.kind(), ElementKind::Association);
    }

    #[test]
    fn test_package_classes_skips_unknown_ids() {
        let mut model = UmlModel::default();
        model
            .elements
            .insert("c1".to_string(), Element::Class(Class::new(ClassKind::Class, "c1", "Widget", "Core")));
        let package = Package {
            name: "Core".to_string(),
            id: None,
            docs: None,
            classes: vec!["c1".to_string(), "missing".to_string()],
        };
        let names: Vec<&str> = model.package_classes(&package).map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Widget"]);
    }
}
