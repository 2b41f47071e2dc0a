// Class and sequence diagram sections

use super::{Snippets, TexInfo};
use crate::error::Result;
use crate::model::Diagram;
use crate::overrides::Overrides;
use crate::template::MacroTemplate;
use tera::Context;

pub(super) struct DiagramInfo<'a> {
    diagram: &'a Diagram,
    image_dir: &'a str,
    snippets: &'a Snippets,
}

/// Diagrams with documentation get a header and description
fn described_template<'a>() -> MacroTemplate<DiagramInfo<'a>> {
    MacroTemplate::new()
        .with("%HEADER", diagram_header)
        .with("%DESCRIPTION", diagram_description)
        .with("%DIAGRAM", diagram_image)
}

/// Diagrams without documentation get a numbered page of their own
fn bare_template<'a>() -> MacroTemplate<DiagramInfo<'a>> {
    MacroTemplate::new().with("%DIAGRAM", diagram_image_with_section)
}

fn image_context(diagram: &Diagram, image_dir: &str) -> Context {
    let mut context = Context::new();
    context.insert("name", &diagram.name);
    context.insert("image_dir", image_dir);
    context
}

/// Full-page image of a diagram with its name printed on it
pub(super) fn diagram_page(snippets: &Snippets, diagram: &Diagram, image_dir: &str) -> Result<String> {
    snippets.render("diagram_page.tex", &image_context(diagram, image_dir))
}

fn diagram_header(info: &DiagramInfo<'_>) -> Result<String> {
    let mut context = Context::new();
    context.insert("name", &info.diagram.name);
    info.snippets.render("diagram_header.tex", &context)
}

fn diagram_description(info: &DiagramInfo<'_>) -> Result<String> {
    Ok(format!("\t\t{}\n", info.diagram.documentation))
}

fn diagram_image(info: &DiagramInfo<'_>) -> Result<String> {
    diagram_page(info.snippets, info.diagram, info.image_dir)
}

fn diagram_image_with_section(info: &DiagramInfo<'_>) -> Result<String> {
    info.snippets.render(
        "diagram_section_page.tex",
        &image_context(info.diagram, info.image_dir),
    )
}

fn make_diagrams(info: &TexInfo<'_>, diagrams: &[&Diagram]) -> Result<String> {
    let described = described_template();
    let bare = bare_template();
    let mut text = String::new();

    for diagram in diagrams {
        let template = if diagram.documentation.is_empty() {
            &bare
        } else {
            &described
        };
        let diagram_info = DiagramInfo {
            diagram,
            image_dir: &info.image_dir,
            snippets: info.snippets,
        };
        let override_text = Overrides::lookup(&info.overrides.diagrams, &diagram.name);
        text.push_str(&template.render(override_text, &diagram_info)?);
    }

    Ok(text)
}

/// Class diagrams not already claimed by a module listing
pub(super) fn make_class_diagrams(info: &TexInfo<'_>) -> Result<String> {
    let diagrams = info.class_diagrams.borrow().clone();
    if diagrams.is_empty() {
        return Ok(String::new());
    }

    let mut text = String::from("\\section{Class diagrams}\n\t\\label{Class diagrams}\n");
    text.push_str(&make_diagrams(info, &diagrams)?);
    text.push_str("\\newpage\n");
    Ok(text)
}

pub(super) fn make_sequence_diagrams(info: &TexInfo<'_>) -> Result<String> {
    if info.sequence_diagrams.is_empty() {
        return Ok(String::new());
    }

    let mut text = String::from("\\section{Sequences}\n\t\\label{Sequences}\n");
    text.push_str(&info.overrides.sequence_desc);
    text.push_str(&make_diagrams(info, &info.sequence_diagrams)?);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex::{generate_document, tex_info, GenerateOptions};
    use crate::model::{Package, UmlModel};

    fn diagram(name: &str, documentation: &str) -> Diagram {
        Diagram {
            id: None,
            name: name.to_string(),
            documentation: documentation.to_string(),
        }
    }

    #[test]
    fn test_described_and_bare_forms() {
        let mut model = UmlModel::default();
        model.class_diagrams.push(diagram("Class Overview", "All the classes."));
        model.class_diagrams.push(diagram("Details", ""));
        let overrides = Overrides::default();
        let options = GenerateOptions::default();
        let snippets = Snippets::new().unwrap();
        let info = tex_info(&model, &overrides, &options, &snippets);

        let text = make_class_diagrams(&info).unwrap();
        assert!(text.starts_with("\\section{Class diagrams}\n\t\\label{Class diagrams}\n"));
        assert!(text.contains("\t\\subsection{Class Overview}\n\t\t\\label{Class Overview}\n"));
        assert!(text.contains("\t\tAll the classes.\n"));
        assert!(text.contains("{outImages/Class_Overview.pdf}"));
        assert!(text.contains("addtotoc={1,subsection,2,Details,Details}"));
        assert!(text.ends_with("\\newpage\n"));
    }

    #[test]
    fn test_sequences_with_description() {
        let mut model = UmlModel::default();
        model.sequence_diagrams.push(diagram("Startup", ""));
        let overrides = Overrides {
            sequence_desc: "How the program starts.\n".to_string(),
            ..Default::default()
        };
        let options = GenerateOptions::default();
        let snippets = Snippets::new().unwrap();
        let info = tex_info(&model, &overrides, &options, &snippets);

        let text = make_sequence_diagrams(&info).unwrap();
        assert!(text.starts_with(
            "\\section{Sequences}\n\t\\label{Sequences}\nHow the program starts.\n\t\\includepdf"
        ));
        assert!(text.contains("{outImages/Startup.pdf}"));
    }

    #[test]
    fn test_no_sequences_no_section() {
        let model = UmlModel::default();
        let overrides = Overrides {
            sequence_desc: "Unused.\n".to_string(),
            ..Default::default()
        };
        let options = GenerateOptions::default();
        let snippets = Snippets::new().unwrap();
        let info = tex_info(&model, &overrides, &options, &snippets);
        assert_eq!(make_sequence_diagrams(&info).unwrap(), "");
    }

    #[test]
    fn test_diagram_override() {
        let mut model = UmlModel::default();
        model.sequence_diagrams.push(diagram("Startup", "Boot."));
        let mut overrides = Overrides::default();
        overrides
            .diagrams
            .insert("Startup".to_string(), "%HEADER\n%DESCRIPTION\n".to_string());
        let options = GenerateOptions::default();
        let snippets = Snippets::new().unwrap();
        let info = tex_info(&model, &overrides, &options, &snippets);

        let text = make_sequence_diagrams(&info).unwrap();
        assert!(text.ends_with("\t\\subsection{Startup}\n\t\t\\label{Startup}\n\t\tBoot.\n"));
        assert!(!text.contains("includepdf"));
    }

    #[test]
    fn test_claimed_diagram_not_repeated() {
        let mut model = UmlModel::default();
        model.packages.push(Package {
            name: "Core".to_string(),
            id: None,
            docs: None,
            classes: Vec::new(),
        });
        model.class_diagrams.push(diagram("core", ""));
        model.class_diagrams.push(diagram("Overview", ""));

        let text = generate_document(&model, &Overrides::default(), &GenerateOptions::default()).unwrap();
        assert_eq!(text.matches("{outImages/core.pdf}").count(), 1);
        assert_eq!(text.matches("{outImages/Overview.pdf}").count(), 1);
        assert!(text.contains("\\section{Class diagrams}"));
    }

    #[test]
    fn test_all_diagrams_claimed_leaves_no_section() {
        let mut model = UmlModel::default();
        model.packages.push(Package {
            name: "Core".to_string(),
            id: None,
            docs: None,
            classes: Vec::new(),
        });
        model.class_diagrams.push(diagram("Core", ""));

        let text = generate_document(&model, &Overrides::default(), &GenerateOptions::default()).unwrap();
        assert!(!text.contains("\\section{Class diagrams}"));
    }
}
