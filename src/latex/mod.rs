// LaTeX document generation
//
// Each section of the document is a macro template whose pieces are
// rendered from small embedded Tera snippets.

mod classes;
mod diagrams;
mod modules;

use crate::error::Result;
use crate::model::{Class, Diagram, Package, UmlModel};
use crate::overrides::Overrides;
use crate::resolve::Resolver;
use crate::template::MacroTemplate;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use tera::{Context, Tera, Value};
use tracing::debug;

/// Prepended to every generated document
pub const FILE_HEADER: &str = "% This file was generated automatically.\n\
% Editing it is pointless, every run overwrites it.\n\
% Use the files in the override directory to customize the output instead.\n";

/// Options that do not come from the model or the overrides
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory the rendered diagrams are read from
    pub image_dir: PathBuf,
    /// Package whose classes are never cross-referenced
    pub std_package: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("outImages"),
            std_package: "std".to_string(),
        }
    }
}

/// Embedded LaTeX snippets
pub struct Snippets {
    tera: Tera,
}

/// One entry of an item list; entries without a body are rendered compactly
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub title: String,
    pub body: Option<String>,
}

impl Item {
    pub fn described(title: String, body: String) -> Self {
        Self {
            title,
            body: Some(body),
        }
    }

    pub fn bare(title: String) -> Self {
        Self { title, body: None }
    }
}

impl Snippets {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("item_list.tex", include_str!("../../templates/item_list.tex.tera")),
            ("class_header.tex", include_str!("../../templates/class_header.tex.tera")),
            ("class_diagram.tex", include_str!("../../templates/class_diagram.tex.tera")),
            ("module_classes.tex", include_str!("../../templates/module_classes.tex.tera")),
            ("diagram_header.tex", include_str!("../../templates/diagram_header.tex.tera")),
            ("diagram_page.tex", include_str!("../../templates/diagram_page.tex.tera")),
            (
                "diagram_section_page.tex",
                include_str!("../../templates/diagram_section_page.tex.tera"),
            ),
        ])?;

        tera.register_filter("tex", tex_filter);
        tera.register_filter("space_ul", space_ul_filter);

        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(name, context)?)
    }

    /// A titled list of items
    pub fn item_list(&self, title: &str, items: &[Item]) -> Result<String> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("items", items);
        self.render("item_list.tex", &context)
    }
}

/// Everything the section generators need
pub struct TexInfo<'a> {
    pub overrides: &'a Overrides,
    pub model: &'a UmlModel,
    /// Packages with their classes, both already ordered
    pub packages: Vec<(&'a Package, Vec<&'a Class>)>,
    /// Class diagrams not yet claimed by a module listing
    pub class_diagrams: RefCell<Vec<&'a Diagram>>,
    pub sequence_diagrams: Vec<&'a Diagram>,
    pub resolver: Resolver<'a>,
    pub image_dir: String,
    pub snippets: &'a Snippets,
}

fn root_template<'a>() -> MacroTemplate<TexInfo<'a>> {
    MacroTemplate::new()
        .with("%MODULES", modules::make_module_list)
        .with("%DIAGRAMS", diagrams::make_class_diagrams)
        .with("%DESCRIPTIONS", classes::make_class_descriptions)
        .with("%SEQUENCES", diagrams::make_sequence_diagrams)
}

/// Generate the whole document
pub fn generate_document(
    model: &UmlModel,
    overrides: &Overrides,
    options: &GenerateOptions,
) -> Result<String> {
    let snippets = Snippets::new()?;
    let info = tex_info(model, overrides, options, &snippets);
    debug!(
        packages = info.packages.len(),
        class_diagrams = info.class_diagrams.borrow().len(),
        sequence_diagrams = info.sequence_diagrams.len(),
        "generating document"
    );

    let body = root_template().render(&overrides.root, &info)?;
    Ok(format!("{}{}", FILE_HEADER, body))
}

/// Apply the configured orderings and collect the generator context
pub fn tex_info<'a>(
    model: &'a UmlModel,
    overrides: &'a Overrides,
    options: &'a GenerateOptions,
    snippets: &'a Snippets,
) -> TexInfo<'a> {
    let class_diagrams = sort_by_order(
        model.class_diagrams.iter().collect(),
        &overrides.diagram_order,
        |d: &&Diagram| d.name.as_str(),
    );
    let sequence_diagrams = sort_by_order(
        model.sequence_diagrams.iter().collect(),
        &overrides.sequence_diagram_order,
        |d: &&Diagram| d.name.as_str(),
    );

    let packages = sort_by_order(
        model.packages.iter().collect(),
        &overrides.module_list_order,
        |p: &&Package| p.name.as_str(),
    )
    .into_iter()
    .map(|package| {
        let classes: Vec<&Class> = model.package_classes(package).collect();
        let classes = match overrides.module_order.get(&package.name) {
            Some(order) => sort_by_order(classes, order, |c: &&Class| c.name.as_str()),
            None => classes,
        };
        (package, classes)
    })
    .collect();

    TexInfo {
        overrides,
        model,
        packages,
        class_diagrams: RefCell::new(class_diagrams),
        sequence_diagrams,
        resolver: Resolver::new(model, &overrides.noref, &options.std_package),
        image_dir: options.image_dir.display().to_string(),
        snippets,
    }
}

/// Reorder `items` by name; with a non-empty order only listed items remain
pub fn sort_by_order<T, F>(items: Vec<T>, order: &[String], key: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    if order.is_empty() {
        return items;
    }
    order
        .iter()
        .filter_map(|name| items.iter().find(|item| key(item) == name.as_str()).cloned())
        .collect()
}

/// Escape text for use as a LaTeX literal
pub fn escape(text: &str) -> String {
    text.replace('_', "\\_").replace('&', "\\&").replace('$', "")
}

/// Replace spaces with underscores, as done for rendered image names
pub fn space_ul(text: &str) -> String {
    text.replace(' ', "_")
}

/// Documentation text, or a placeholder asking for it
pub fn describe(docs: Option<&str>, name: &str) -> String {
    match docs {
        Some(docs) => docs.to_string(),
        None => format!("XXX Description of {}.", escape(name)),
    }
}

fn tex_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value.as_str().unwrap_or("");
    Ok(Value::String(escape(s)))
}

fn space_ul_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value.as_str().unwrap_or("");
    Ok(Value::String(space_ul(s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassKind, Element};

    #[test]
    fn test_escape() {
        assert_eq!(escape("my_class"), "my\\_class");
        assert_eq!(escape("A & B"), "A \\& B");
        assert_eq!(escape("$cost"), "cost");
    }

    #[test]
    fn test_space_ul() {
        assert_eq!(space_ul("Class Overview"), "Class_Overview");
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(Some("Counts things."), "count"), "Counts things.");
        assert_eq!(describe(None, "my_count"), "XXX Description of my\\_count.");
    }

    #[test]
    fn test_sort_by_order() {
        let items = vec!["a", "b", "c"];
        let order = vec!["c".to_string(), "x".to_string(), "a".to_string()];
        assert_eq!(sort_by_order(items.clone(), &order, |s| *s), vec!["c", "a"]);
        assert_eq!(sort_by_order(items, &[], |s| *s), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_item_list_forms() {
        let snippets = Snippets::new().unwrap();
        let text = snippets
            .item_list(
                "Attributes",
                &[
                    Item::described("int count".to_string(), "How many.".to_string()),
                    Item::bare("\\nameref{Derived}".to_string()),
                ],
            )
            .unwrap();

        assert!(text.starts_with("\t\t\t\\paragraph{Attributes}\n"));
        assert!(text.contains("\\texttt{int count}\\\\\n"));
        assert!(text.contains("\t\t\t\tHow many.\n"));
        assert!(text.contains("\t\t\t\t\t\\item \\texttt{\\nameref{Derived}}\n"));
        assert!(text.ends_with("\t\t\t\\end{itemize}\n"));
    }

    #[test]
    fn test_tex_filter_in_snippet() {
        let snippets = Snippets::new().unwrap();
        let mut context = Context::new();
        context.insert("name", "Core_Overview");
        let text = snippets.render("diagram_header.tex", &context).unwrap();
        assert_eq!(text, "\t\\subsection{Core\\_Overview}\n\t\t\\label{Core\\_Overview}\n");
    }

    #[test]
    fn test_tex_info_orders_packages_and_classes() {
        let mut model = UmlModel::default();
        for (id, name) in [("c1", "Alpha"), ("c2", "Beta")] {
            model.elements.insert(
                id.to_string(),
                Element::Class(Class::new(ClassKind::Class, id, name, "Core")),
            );
        }
        for name in ["Core", "Util"] {
            model.packages.push(Package {
                name: name.to_string(),
                id: None,
                docs: None,
                classes: if name == "Core" {
                    vec!["c1".to_string(), "c2".to_string()]
                } else {
                    Vec::new()
                },
            });
        }

        let mut overrides = Overrides::default();
        overrides.module_list_order = vec!["Util".to_string(), "Core".to_string()];
        overrides
            .module_order
            .insert("Core".to_string(), vec!["Beta".to_string(), "Alpha".to_string()]);

        let options = GenerateOptions::default();
        let snippets = Snippets::new().unwrap();
        let info = tex_info(&model, &overrides, &options, &snippets);

        let order: Vec<&str> = info.packages.iter().map(|(p, _)| p.name.as_str()).collect();
        assert_eq!(order, vec!["Util", "Core"]);
        let classes: Vec<&str> = info.packages[1].1.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(classes, vec!["Beta", "Alpha"]);
    }

    #[test]
    fn test_document_starts_with_header() {
        let model = UmlModel::default();
        let text = generate_document(&model, &Overrides::default(), &GenerateOptions::default()).unwrap();
        assert_eq!(text, FILE_HEADER);
    }

    #[test]
    fn test_root_override_splices_sections() {
        let model = UmlModel::default();
        let mut overrides = Overrides::default();
        overrides.root = "\\chapter{Design}\n%MODULES\n%DESCRIPTIONS\n\\end{document}".to_string();
        overrides.architecture_desc = "Architecture overview.\n".to_string();

        let text = generate_document(&model, &overrides, &GenerateOptions::default()).unwrap();
        assert_eq!(
            text,
            format!("{}\\chapter{{Design}}\nArchitecture overview.\n\\end{{document}}", FILE_HEADER)
        );
    }
}
