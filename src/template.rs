// Macro templates
//
// A template is an ordered list of named generators. Without an override
// the generated pieces are concatenated; with one, every `<macro>\n` in the
// override text is replaced by the matching piece.

use crate::error::Result;

/// Macro that always expands to every piece, in order
pub const FULL: &str = "%FULL";

/// Generator producing the text of one macro
pub type MacroFn<C> = fn(&C) -> Result<String>;

/// Ordered list of macro names and their generators
pub struct MacroTemplate<C> {
    macros: Vec<(&'static str, MacroFn<C>)>,
}

impl<C> MacroTemplate<C> {
    pub fn new() -> Self {
        Self { macros: Vec::new() }
    }

    /// Append a macro
    pub fn with(mut self, name: &'static str, generator: MacroFn<C>) -> Self {
        self.macros.push((name, generator));
        self
    }

    /// Run every generator against `ctx` and assemble the result
    pub fn render(&self, override_text: &str, ctx: &C) -> Result<String> {
        let mut full = String::new();
        let mut segments = Vec::with_capacity(self.macros.len());
        for (name, generator) in &self.macros {
            let text = generator(ctx)?;
            full.push_str(&text);
            segments.push((*name, text));
        }

        if override_text.is_empty() {
            return Ok(full);
        }

        let mut text = splice(override_text, FULL, &full);
        for (name, value) in &segments {
            text = splice(&text, name, value);
        }
        Ok(text)
    }
}

impl<C> Default for MacroTemplate<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace every `name` directly followed by a line break
fn splice(text: &str, name: &str, value: &str) -> String {
    text.replace(&format!("{}\n", name), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ctx {
        name: &'static str,
    }

    fn header(ctx: &Ctx) -> Result<String> {
        Ok(format!("header {}\n", ctx.name))
    }

    fn body(_ctx: &Ctx) -> Result<String> {
        Ok("body\n".to_string())
    }

    fn failing(_ctx: &Ctx) -> Result<String> {
        Err(crate::error::Error::other("boom"))
    }

    fn template() -> MacroTemplate<Ctx> {
        MacroTemplate::new().with("%HEADER", header).with("%BODY", body)
    }

    #[test]
    fn test_no_override_concatenates_in_order() {
        let ctx = Ctx { name: "Widget" };
        let text = template().render("", &ctx).unwrap();
        assert_eq!(text, format!("{}{}", header(&ctx).unwrap(), body(&ctx).unwrap()));
    }

    #[test]
    fn test_override_splices_macros() {
        let ctx = Ctx { name: "Widget" };
        let text = template()
            .render("before\n%BODY\nmiddle\n%HEADER\nafter", &ctx)
            .unwrap();
        assert_eq!(text, "before\nbody\nmiddle\nheader Widget\nafter");
    }

    #[test]
    fn test_macro_without_line_break_kept() {
        let ctx = Ctx { name: "Widget" };
        let text = template().render("%HEADER and %BODY", &ctx).unwrap();
        assert_eq!(text, "%HEADER and %BODY");
    }

    #[test]
    fn test_full_macro() {
        let ctx = Ctx { name: "Widget" };
        let text = template().render("[\n%FULL\n]", &ctx).unwrap();
        assert_eq!(text, "[\nheader Widget\nbody\n]");
    }

    #[test]
    fn test_repeated_macro_replaced_everywhere() {
        let ctx = Ctx { name: "Widget" };
        let text = template().render("%BODY\n%BODY\n", &ctx).unwrap();
        assert_eq!(text, "body\nbody\n");
    }

    #[test]
    fn test_generator_error_propagates() {
        let ctx = Ctx { name: "Widget" };
        let template = MacroTemplate::new().with("%FAIL", failing);
        assert!(template.render("", &ctx).is_err());
    }
}
