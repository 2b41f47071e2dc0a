// Module listing: one subsection per package

use super::{describe, diagrams, escape, Snippets, TexInfo};
use crate::error::Result;
use crate::model::{Class, Diagram, Package};
use crate::overrides::Overrides;
use crate::template::MacroTemplate;
use std::cell::RefCell;
use tera::Context;
use tracing::debug;

pub(super) struct ModuleInfo<'a, 'm> {
    package: &'a Package,
    classes: &'m [&'a Class],
    /// Shared with the class diagram section; a claimed diagram is removed
    diagrams: &'m RefCell<Vec<&'a Diagram>>,
    image_dir: &'m str,
    snippets: &'m Snippets,
}

fn module_template<'a, 'm>() -> MacroTemplate<ModuleInfo<'a, 'm>> {
    MacroTemplate::new()
        .with("%HEADER", module_header)
        .with("%DESCRIPTION", module_description)
        .with("%CLASSLIST", module_classlist)
        .with("%DIAGRAM", module_diagram)
}

/// Architecture description followed by every module listing
pub(super) fn make_module_list(info: &TexInfo<'_>) -> Result<String> {
    let template = module_template();
    let mut text = info.overrides.architecture_desc.clone();

    for (package, classes) in &info.packages {
        let module = ModuleInfo {
            package: *package,
            classes,
            diagrams: &info.class_diagrams,
            image_dir: &info.image_dir,
            snippets: info.snippets,
        };
        let override_text = Overrides::lookup(&info.overrides.module_listing, &package.name);
        text.push_str(&template.render(override_text, &module)?);
    }

    Ok(text)
}

fn module_header(info: &ModuleInfo<'_, '_>) -> Result<String> {
    Ok(format!("\t\\subsection{{{}}}\n", escape(&info.package.name)))
}

fn module_description(info: &ModuleInfo<'_, '_>) -> Result<String> {
    Ok(format!(
        "\t\t{}\n",
        describe(info.package.docs.as_deref(), &info.package.name)
    ))
}

fn module_classlist(info: &ModuleInfo<'_, '_>) -> Result<String> {
    let names: Vec<&str> = info.classes.iter().map(|c| c.name.as_str()).collect();
    let mut context = Context::new();
    context.insert("classes", &names);
    info.snippets.render("module_classes.tex", &context)
}

/// Claim the class diagram named like the module, ignoring case
fn module_diagram(info: &ModuleInfo<'_, '_>) -> Result<String> {
    let wanted = info.package.name.to_lowercase();
    let claimed = {
        let mut pool = info.diagrams.borrow_mut();
        pool.iter()
            .position(|d| d.name.to_lowercase() == wanted)
            .map(|pos| pool.remove(pos))
    };

    match claimed {
        Some(diagram) => {
            debug!(module = %info.package.name, diagram = %diagram.name, "module claimed diagram");
            diagrams::diagram_page(info.snippets, diagram, info.image_dir)
        }
        None => Ok(String::new()),
    }
}
