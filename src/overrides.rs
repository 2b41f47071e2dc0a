// Override store
//
// Reads user customization fragments from a flat directory. The role of
// each file is selected by its name; files that match no pattern are ignored.

use crate::error::Result;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// User-supplied customization of the generated document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// Macro text for the document root
    pub root: String,
    pub diagram_order: Vec<String>,
    pub sequence_diagram_order: Vec<String>,
    pub module_list_order: Vec<String>,
    /// Names that are never turned into cross-references
    pub noref: HashSet<String>,
    /// Class name to single-class diagram width
    pub custom_width: HashMap<String, u32>,
    pub architecture_desc: String,
    pub classes_desc: String,
    pub sequence_desc: String,
    /// Module name to class order
    pub module_order: HashMap<String, Vec<String>>,
    /// Module name to listing macro text
    pub module_listing: HashMap<String, String>,
    /// Diagram name to macro text
    pub diagrams: HashMap<String, String>,
    /// Class name to description macro text
    pub classes: HashMap<String, String>,
}

/// The role a file plays, selected by its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Root,
    DiagramOrder,
    SequenceDiagramOrder,
    ModuleListOrder,
    NoRef,
    CustomWidth,
    ArchitectureDesc,
    ClassesDesc,
    SequenceDesc,
    ModuleOrder,
    ModuleListing,
    Diagram,
    Class,
}

const FILE_PATTERNS: &[(&str, Slot)] = &[
    ("%ROOT", Slot::Root),
    ("%DIAGRAM_ORDER", Slot::DiagramOrder),
    ("%SEQUENCE_DIAGRAM_ORDER", Slot::SequenceDiagramOrder),
    ("%MODULE_ORDER", Slot::ModuleListOrder),
    ("%NOREF", Slot::NoRef),
    ("%CUSTOM_WIDTH", Slot::CustomWidth),
    ("%ARCHITECTURE_DESC", Slot::ArchitectureDesc),
    ("%CLASSES_DESC", Slot::ClassesDesc),
    ("%SEQUENCE_DESC", Slot::SequenceDesc),
    ("([a-zA-Z][a-zA-Z0-9_]*)%ORDER", Slot::ModuleOrder),
    ("([a-zA-Z][a-zA-Z0-9_]*)%LISTING", Slot::ModuleListing),
    ("([a-zA-Z][a-zA-Z0-9_]*)%DIAGRAM", Slot::Diagram),
    ("([a-zA-Z][a-zA-Z0-9_]*)%CLASS", Slot::Class),
];

/// File name matcher, anchored at the start of the name
struct FileMatcher {
    patterns: Vec<(Regex, Slot)>,
}

impl FileMatcher {
    fn new() -> Self {
        let patterns = FILE_PATTERNS
            .iter()
            .map(|(pattern, slot)| {
                let regex = Regex::new(&format!("^{}", pattern)).expect("static override pattern");
                (regex, *slot)
            })
            .collect();
        Self { patterns }
    }

    /// First matching slot and the captured entity name, if any
    fn classify(&self, file_name: &str) -> Option<(Slot, Option<String>)> {
        self.patterns.iter().find_map(|(regex, slot)| {
            regex
                .captures(file_name)
                .map(|caps| (*slot, caps.get(1).map(|m| m.as_str().to_string())))
        })
    }
}

impl Overrides {
    /// Load every override file found directly in `dir`
    ///
    /// A missing directory yields the default (empty) configuration.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut overrides = Self::default();
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "no override directory");
            return Ok(overrides);
        }

        let matcher = FileMatcher::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            let Some((slot, key)) = matcher.classify(file_name) else {
                debug!(file = file_name, "ignoring unrecognized override file");
                continue;
            };

            let text = std::fs::read_to_string(entry.path())?;
            debug!(file = file_name, ?slot, "loaded override");
            overrides.apply(slot, key, text);
        }

        Ok(overrides)
    }

    fn apply(&mut self, slot: Slot, key: Option<String>, text: String) {
        let key = key.unwrap_or_default();
        match slot {
            Slot::Root => self.root = text,
            Slot::DiagramOrder => self.diagram_order = lines(&text),
            Slot::SequenceDiagramOrder => self.sequence_diagram_order = lines(&text),
            Slot::ModuleListOrder => self.module_list_order = lines(&text),
            Slot::NoRef => self.noref = text.lines().map(str::to_string).collect(),
            Slot::CustomWidth => self.custom_width = parse_widths(&text),
            Slot::ArchitectureDesc => self.architecture_desc = text,
            Slot::ClassesDesc => self.classes_desc = text,
            Slot::SequenceDesc => self.sequence_desc = text,
            Slot::ModuleOrder => {
                self.module_order.insert(key, lines(&text));
            }
            Slot::ModuleListing => {
                self.module_listing.insert(key, text);
            }
            Slot::Diagram => {
                self.diagrams.insert(key, text);
            }
            Slot::Class => {
                self.classes.insert(key, text);
            }
        }
    }

    /// Per-entity macro text, empty when not overridden
    pub fn lookup<'a>(map: &'a HashMap<String, String>, name: &str) -> &'a str {
        map.get(name).map(String::as_str).unwrap_or("")
    }
}

fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

fn parse_widths(text: &str) -> HashMap<String, u32> {
    let mut widths = HashMap::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next().map(str::parse::<u32>), parts.next()) {
            (Some(name), Some(Ok(width)), None) => {
                widths.insert(name.to_string(), width);
            }
            _ => warn!(line, "skipping malformed custom width"),
        }
    }
    widths
}
