//! Prompt templates and rendering.

use super::parser;

/// Instruction block for entry analysis.
pub const ANALYSIS_TEMPLATE: &str = "Analyze the following journal entry. Follow the instructions and format your response to match the format instructions, no matter what! \n{format_instructions}\n{entry}";

/// Build the analysis prompt for a journal entry. Entry text is inserted verbatim.
pub fn build_prompt(content: &str) -> String {
    render_template(
        ANALYSIS_TEMPLATE,
        &[
            ("format_instructions", parser::format_instructions()),
            ("entry", content),
        ],
    )
}

/// Substitute `{name}` placeholders in one left-to-right pass.
///
/// Substituted values are never rescanned, so braces inside them survive
/// untouched. Unknown placeholders are left as literal text.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let substituted = after.find('}').and_then(|end| {
            let name = &after[..end];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (end, *value))
        });
        match substituted {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
