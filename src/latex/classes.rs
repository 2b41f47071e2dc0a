// Class descriptions

use super::{describe, escape, Item, Snippets, TexInfo};
use crate::error::Result;
use crate::model::{Class, Element, UmlModel};
use crate::overrides::Overrides;
use crate::resolve::Resolver;
use crate::template::MacroTemplate;
use tera::Context;

pub(super) struct ClassInfo<'a> {
    class: &'a Class,
    model: &'a UmlModel,
    resolver: Resolver<'a>,
    image_dir: &'a str,
    snippets: &'a Snippets,
}

fn class_template<'a>() -> MacroTemplate<ClassInfo<'a>> {
    MacroTemplate::new()
        .with("%HEADER", class_header)
        .with("%DIAGRAM", class_diagram)
        .with("%DESCRIPTION", class_description)
        .with("%TEMPLATE", class_template_list)
        .with("%OPERATIONS", class_operations)
        .with("%ATTRIBUTES", class_attributes)
        .with("%CHILDREN", class_children)
        .with("%DEPENDENCIES", class_dependencies)
        .with("%ASSOCIATIONS", class_associations)
}

/// Section with one subsection per package and one description per class
pub(super) fn make_class_descriptions(info: &TexInfo<'_>) -> Result<String> {
    if info.packages.is_empty() {
        return Ok(String::new());
    }

    let template = class_template();
    let mut text = String::from("\\section{Class descriptions}\n\t\\label{Class descriptions}\n");
    text.push_str(&info.overrides.classes_desc);

    for (package, classes) in &info.packages {
        let name = escape(&package.name);
        text.push_str(&format!("\t\\subsection{{{0}}}\n\t\t\\label{{{0}}}\n", name));

        for class in classes {
            text.push_str(&format!("% {} template\n", class.name));
            let class_info = ClassInfo {
                class,
                model: info.model,
                resolver: info.resolver,
                image_dir: &info.image_dir,
                snippets: info.snippets,
            };
            let override_text = Overrides::lookup(&info.overrides.classes, &class.name);
            text.push_str(&template.render(override_text, &class_info)?);
        }
        text.push_str("\t\\newpage\n");
    }

    Ok(text)
}

fn class_header(info: &ClassInfo<'_>) -> Result<String> {
    let parent = info.class.abstraction.as_deref().map(|id| info.resolver.render(id));
    let mut context = Context::new();
    context.insert("name", &info.class.name);
    context.insert("parent", &parent);
    info.snippets.render("class_header.tex", &context)
}

fn class_diagram(info: &ClassInfo<'_>) -> Result<String> {
    let mut context = Context::new();
    context.insert("name", &info.class.name);
    context.insert("image_dir", info.image_dir);
    info.snippets.render("class_diagram.tex", &context)
}

fn class_description(info: &ClassInfo<'_>) -> Result<String> {
    Ok(format!(
        "\t\t\t{}\n",
        describe(info.class.docs.as_deref(), &info.class.name)
    ))
}

fn class_template_list(info: &ClassInfo<'_>) -> Result<String> {
    let Some(Element::Template(param)) = info.class.template.as_deref().and_then(|id| info.model.get(id))
    else {
        return Ok(String::new());
    };

    let bound = param
        .bound
        .as_deref()
        .map(|id| format!("{} ", info.resolver.render(id)))
        .unwrap_or_default();
    let item = Item::described(
        format!("{}{}", bound, escape(&param.name)),
        describe(param.docs.as_deref(), &param.name),
    );
    info.snippets.item_list("Type parameters", &[item])
}

fn class_operations(info: &ClassInfo<'_>) -> Result<String> {
    if info.class.operations.is_empty() {
        return Ok(String::new());
    }

    let items: Vec<Item> = info
        .class
        .operations
        .iter()
        .map(|op| {
            let ret = op
                .return_type
                .as_deref()
                .map(|id| info.resolver.render(id))
                .unwrap_or_else(|| "void".to_string());
            let args: Vec<String> = op
                .parameters
                .iter()
                .map(|p| format!("{}: {}", escape(&p.name), info.resolver.render_opt(p.type_ref.as_deref())))
                .collect();
            Item::described(
                format!("{} {}({})", ret, escape(&op.name), args.join(", ")),
                describe(op.docs.as_deref(), &op.name),
            )
        })
        .collect();
    info.snippets.item_list("Operations", &items)
}

fn class_attributes(info: &ClassInfo<'_>) -> Result<String> {
    if info.class.attributes.is_empty() {
        return Ok(String::new());
    }

    let items: Vec<Item> = info
        .class
        .attributes
        .iter()
        .map(|attr| {
            let ty = attr
                .type_ref
                .as_deref()
                .map(|id| format!("{} ", info.resolver.render(id)))
                .unwrap_or_default();
            Item::described(
                format!("{}{}", ty, escape(&attr.name)),
                describe(attr.docs.as_deref(), &attr.name),
            )
        })
        .collect();
    info.snippets.item_list("Attributes", &items)
}

fn class_children(info: &ClassInfo<'_>) -> Result<String> {
    if info.class.children.is_empty() {
        return Ok(String::new());
    }

    let items: Vec<Item> = info
        .class
        .children
        .iter()
        .map(|id| Item::bare(info.resolver.render(id)))
        .collect();
    info.snippets.item_list("Subclasses", &items)
}

fn class_dependencies(info: &ClassInfo<'_>) -> Result<String> {
    if info.class.dependencies.is_empty() {
        return Ok(String::new());
    }

    let items: Vec<Item> = info
        .class
        .dependencies
        .iter()
        .map(|dep| {
            Item::described(
                info.resolver.render(&dep.target),
                describe(dep.docs.as_deref(), "dependency"),
            )
        })
        .collect();
    info.snippets.item_list("Dependencies", &items)
}

fn class_associations(info: &ClassInfo<'_>) -> Result<String> {
    if info.class.associations.is_empty() {
        return Ok(String::new());
    }

    let items: Vec<Item> = info
        .class
        .associations
        .iter()
        .map(|assoc| {
            let multiplicity = assoc
                .multiplicity
                .as_deref()
                .map(|m| format!("{} ", escape(m)))
                .unwrap_or_default();
            Item::described(
                format!(
                    "{}{} {}",
                    multiplicity,
                    info.resolver.render(&assoc.target),
                    escape(&assoc.name)
                ),
                describe(assoc.docs.as_deref(), &assoc.name),
            )
        })
        .collect();
    info.snippets.item_list("Associations", &items)
}
