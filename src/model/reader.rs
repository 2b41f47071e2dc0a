// Model reader for the Umbrello XMI dialect
//
// Expects one logical view holding flat packages, a data type folder and a
// folder for sequence diagrams. Relationships are read after all classes are
// known so that edges can be checked against the element table.

use super::{
    Association, Attribute, Class, ClassKind, DataType, Dependency, Diagram, Element, Operation,
    Package, Parameter, TemplateParameter, UmlModel,
};
use crate::config::ModelConfig;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use roxmltree::{Document, Node};
use tracing::{debug, warn};

/// Namespace of the UML 1.4 elements
pub const UML_NS: &str = "http://schema.omg.org/spec/UML/1.4";

/// Parse a serialized model into the element graph
pub fn parse_model(source: &str, config: &ModelConfig) -> Result<UmlModel> {
    let doc = Document::parse(source)?;
    ModelReader::new(config).read(&doc)
}

struct ModelReader<'c> {
    config: &'c ModelConfig,
    elements: IndexMap<String, Element>,
}

impl<'c> ModelReader<'c> {
    fn new(config: &'c ModelConfig) -> Self {
        Self {
            config,
            elements: IndexMap::new(),
        }
    }

    fn read(mut self, doc: &Document<'_>) -> Result<UmlModel> {
        let logical_view = doc
            .descendants()
            .find(|n| {
                n.has_tag_name((UML_NS, "Model"))
                    && n.attribute("xmi.id") == Some(self.config.logical_view_id.as_str())
            })
            .ok_or_else(|| {
                Error::missing_anchor(format!("logical view `{}`", self.config.logical_view_id))
            })?;
        let namespace = uml_child(logical_view, "Namespace.ownedElement")
            .ok_or_else(|| Error::missing_anchor("namespace of the logical view"))?;

        let folders: Vec<Node> = uml_children(namespace, "Package").collect();
        let sequence_folder = folders
            .iter()
            .copied()
            .find(|p| p.attribute("name") == Some(self.config.sequence_package.as_str()))
            .ok_or_else(|| {
                Error::missing_anchor(format!(
                    "sequence diagram folder `{}`",
                    self.config.sequence_package
                ))
            })?;
        let datatypes_folder = folders
            .iter()
            .copied()
            .find(|p| p.attribute("name") == Some(self.config.datatypes_package.as_str()));

        let class_diagrams = read_diagrams(logical_view);
        let sequence_diagrams = read_diagrams(sequence_folder);

        let package_nodes: Vec<Node> = folders
            .iter()
            .copied()
            .filter(|p| !self.is_datatypes_folder(*p))
            .chain(std::iter::once(logical_view))
            .collect();
        let mut packages = Vec::new();
        for package in package_nodes {
            packages.push(self.read_package(package)?);
        }

        if let Some(folder) = datatypes_folder {
            self.read_datatypes(folder)?;
        }

        self.read_inheritance(logical_view);
        self.read_dependencies(logical_view);
        self.read_associations(logical_view);

        debug!(
            elements = self.elements.len(),
            packages = packages.len(),
            class_diagrams = class_diagrams.len(),
            sequence_diagrams = sequence_diagrams.len(),
            "model parsed"
        );

        Ok(UmlModel {
            elements: self.elements,
            packages,
            class_diagrams,
            sequence_diagrams,
        })
    }

    fn is_datatypes_folder(&self, package: Node) -> bool {
        package.has_attribute("stereotype")
            && package.attribute("name") == Some(self.config.datatypes_package.as_str())
    }

    fn read_package(&mut self, package: Node) -> Result<Package> {
        let name = required(package, "name")?.to_string();
        let mut classes = Vec::new();

        if let Some(namespace) = uml_child(package, "Namespace.ownedElement") {
            for node in namespace.children().filter(is_uml_element) {
                let tag = node.tag_name().name();
                match ClassKind::from_tag(tag) {
                    Some(kind) => {
                        let class = self.read_class(node, kind, &name)?;
                        classes.push(class.id.clone());
                        self.elements.insert(class.id.clone(), Element::Class(class));
                    }
                    None if uml_child(node, "Classifier.feature").is_some() => {
                        return Err(Error::UnknownClassKind {
                            tag: tag.to_string(),
                            id: node.attribute("xmi.id").unwrap_or_default().to_string(),
                        });
                    }
                    None => {}
                }
            }
        }

        Ok(Package {
            name,
            id: package.attribute("xmi.id").map(str::to_string),
            docs: comment(package),
            classes,
        })
    }

    fn read_class(&mut self, node: Node, kind: ClassKind, package: &str) -> Result<Class> {
        let id = required(node, "xmi.id")?;
        let mut class = Class::new(kind, id, required(node, "name")?, package);
        class.docs = comment(node);

        if let Some(features) = uml_child(node, "Classifier.feature") {
            for feature in features.children().filter(is_uml_element) {
                match feature.tag_name().name() {
                    "Operation" => class.operations.push(read_operation(feature)?),
                    "Attribute" => class.attributes.push(Attribute {
                        name: required(feature, "name")?.to_string(),
                        type_ref: feature.attribute("type").map(str::to_string),
                        docs: comment(feature),
                    }),
                    _ => {}
                }
            }
        }
        class.approx_height = Class::approximate_height(class.operations.len(), class.attributes.len());

        if let Some(parameter) = uml_child(node, "ModelElement.templateParameter")
            .and_then(|n| n.children().find(|c| c.is_element()))
        {
            let template = TemplateParameter {
                name: required(parameter, "name")?.to_string(),
                id: required(parameter, "xmi.id")?.to_string(),
                bound: parameter.attribute("type").map(str::to_string),
                docs: comment(parameter),
            };
            class.template = Some(template.id.clone());
            self.elements.insert(template.id.clone(), Element::Template(template));
        }

        Ok(class)
    }

    fn read_datatypes(&mut self, folder: Node) -> Result<()> {
        let Some(namespace) = uml_child(folder, "Namespace.ownedElement") else {
            return Ok(());
        };
        for node in uml_children(namespace, "DataType") {
            let datatype = DataType {
                name: required(node, "name")?.to_string(),
                id: required(node, "xmi.id")?.to_string(),
                docs: comment(node),
            };
            self.elements.insert(datatype.id.clone(), Element::DataType(datatype));
        }
        Ok(())
    }

    /// Realizations and generalizations both feed the supertype relation
    fn read_inheritance(&mut self, root: Node) {
        for node in root.descendants().filter(is_uml_element) {
            let edge = match node.tag_name().name() {
                "Abstraction" => node.attribute("client").zip(node.attribute("supplier")),
                "Generalization" => node.attribute("child").zip(node.attribute("parent")),
                _ => continue,
            };
            if let Some((child, parent)) = edge {
                self.link_inheritance(child, parent);
            }
        }
    }

    fn link_inheritance(&mut self, child: &str, parent: &str) {
        if !self.is_class(child) || !self.is_class(parent) {
            warn!(child, parent, "skipping inheritance edge with unknown endpoint");
            return;
        }
        if let Some(class) = self.class_mut(child) {
            class.abstraction = Some(parent.to_string());
        }
        if let Some(class) = self.class_mut(parent) {
            if !class.children.iter().any(|c| c == child) {
                class.children.push(child.to_string());
            }
        }
    }

    fn read_dependencies(&mut self, root: Node) {
        for node in root.descendants().filter(|n| n.has_tag_name((UML_NS, "Dependency"))) {
            let (Some(client), Some(supplier)) = (node.attribute("client"), node.attribute("supplier"))
            else {
                continue;
            };
            if !self.elements.contains_key(supplier) {
                debug!(client, supplier, "skipping dependency on unknown element");
                continue;
            }
            match self.class_mut(client) {
                Some(class) => class.dependencies.push(Dependency {
                    target: supplier.to_string(),
                    docs: comment(node),
                }),
                None => debug!(client, supplier, "skipping dependency from unknown class"),
            }
        }
    }

    fn read_associations(&mut self, root: Node) {
        for node in root.descendants().filter(|n| n.has_tag_name((UML_NS, "Association"))) {
            let Some(connection) = uml_child(node, "Association.connection") else {
                continue;
            };
            let association_name = node.attribute("name").unwrap_or_default();
            let ends: Vec<Node> = connection.children().filter(is_uml_element).collect();

            for (i, start) in ends.iter().enumerate() {
                for (j, end) in ends.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let (Some(client), Some(target)) = (start.attribute("type"), end.attribute("type"))
                    else {
                        continue;
                    };
                    if !self.should_link(client, target, *end) {
                        continue;
                    }

                    let role = match end.attribute("name") {
                        Some(name) if !name.is_empty() => name,
                        _ => association_name,
                    };
                    let association = Association {
                        name: role.to_string(),
                        target: target.to_string(),
                        multiplicity: end
                            .attribute("multiplicity")
                            .filter(|m| !m.is_empty())
                            .map(str::to_string),
                        docs: comment(*end),
                    };
                    if let Some(class) = self.class_mut(client) {
                        class.associations.push(association);
                    }
                }
            }
        }
    }

    /// Edge filter for one ordered pair of association ends
    fn should_link(&self, client: &str, target: &str, end: Node) -> bool {
        if client == target || !self.is_class(client) || !self.elements.contains_key(target) {
            return false;
        }
        if end.attribute("isNavigable") == Some("false") {
            return false;
        }
        // The opposite direction already produced an edge for this pair
        let reverse = self
            .elements
            .get(target)
            .and_then(Element::as_class)
            .is_some_and(|c| c.associates_with(client));
        !reverse
    }

    fn is_class(&self, id: &str) -> bool {
        matches!(self.elements.get(id), Some(Element::Class(_)))
    }

    fn class_mut(&mut self, id: &str) -> Option<&mut Class> {
        self.elements.get_mut(id).and_then(Element::as_class_mut)
    }
}

fn read_operation(node: Node) -> Result<Operation> {
    let mut operation = Operation {
        name: required(node, "name")?.to_string(),
        return_type: None,
        parameters: Vec::new(),
        docs: comment(node),
    };

    if let Some(params) = uml_child(node, "BehavioralFeature.parameter") {
        for param in params.children().filter(is_uml_element) {
            let type_ref = param.attribute("type").map(str::to_string);
            if param.attribute("kind") == Some("return") {
                operation.return_type = type_ref;
            } else {
                operation.parameters.push(Parameter {
                    name: param.attribute("name").unwrap_or_default().to_string(),
                    type_ref,
                });
            }
        }
    }

    Ok(operation)
}

/// Diagrams listed in the element's `XMI.extension` block
fn read_diagrams(node: Node) -> Vec<Diagram> {
    node.children()
        .find(|n| n.has_tag_name("XMI.extension"))
        .and_then(|ext| ext.children().find(|c| c.is_element()))
        .map(|list| {
            list.children()
                .filter(|n| n.has_tag_name("diagram"))
                .map(|d| Diagram {
                    id: d.attribute("xmi.id").map(str::to_string),
                    name: d.attribute("name").unwrap_or_default().to_string(),
                    documentation: d.attribute("documentation").unwrap_or_default().to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn is_uml_element(node: &Node) -> bool {
    node.is_element() && node.tag_name().namespace() == Some(UML_NS)
}

fn uml_child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.has_tag_name((UML_NS, name)))
}

fn uml_children<'a, 'i: 'a>(node: Node<'a, 'i>, name: &'a str) -> impl Iterator<Item = Node<'a, 'i>> + 'a {
    node.children().filter(move |n| n.has_tag_name((UML_NS, name)))
}

fn required<'a>(node: Node<'a, '_>, attribute: &str) -> Result<&'a str> {
    node.attribute(attribute)
        .ok_or_else(|| Error::missing_attribute(format!("UML:{}", node.tag_name().name()), attribute))
}

fn comment(node: Node) -> Option<String> {
    node.attribute("comment").map(str::to_string)
}
