//! Prompt rendering from a document schema.

use super::{DocumentSchema, FieldKind, FieldSpec};

const INDENT: &str = "    ";

/// Build the extraction prompt for `schema`.
///
/// The prompt embeds the expected JSON object literally, one key per schema
/// field with its hint as the value, followed by the shared extraction rules
/// and the schema's own guidance.
pub fn render_prompt(schema: &DocumentSchema) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Extract the following information from the {} document with high accuracy.\n",
        schema.label
    ));
    prompt.push_str(
        "Focus on capturing key details and output them in a structured JSON object format:\n\n",
    );

    write_object(&mut prompt, schema.fields, 0);

    prompt.push_str(
        "\n\nEnsure the JSON object format is clean, with each extracted field labeled precisely by the above field names.\n\
         If a field is not found, return it as an empty string or null to maintain consistency.\n\n\
         Look carefully at all parts of the document including headers, tables, and footnotes.\n",
    );
    for line in schema.guidance {
        prompt.push_str(line);
        prompt.push('\n');
    }
    prompt.push_str(
        "\nReturn ONLY the JSON object without any additional text, explanations, or markdown formatting.\n",
    );

    prompt
}

fn write_object(out: &mut String, fields: &[FieldSpec], depth: usize) {
    out.push('{');
    out.push('\n');
    for (i, field) in fields.iter().enumerate() {
        let pad = INDENT.repeat(depth + 1);
        out.push_str(&format!("{}{}: ", pad, quote(field.name)));
        match field.kind {
            FieldKind::Group(inner) => write_object(out, inner, depth + 1),
            _ => out.push_str(&quote(field.hint)),
        }
        if i + 1 < fields.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str(&INDENT.repeat(depth));
    out.push('}');
}

fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog::{AGREEMENT, KYC, MEMORANDUM_OF_TITLE};
    use crate::schema::BUILTIN_SCHEMAS;

    #[test]
    fn test_prompt_names_every_field() {
        for schema in BUILTIN_SCHEMAS {
            let prompt = render_prompt(schema);
            for field in schema.fields {
                assert!(
                    prompt.contains(&format!("\"{}\":", field.name)),
                    "{} prompt is missing {}",
                    schema.key,
                    field.name
                );
            }
            assert!(prompt.contains(schema.label));
            assert!(prompt.trim_end().ends_with("markdown formatting."));
        }
    }

    #[test]
    fn test_kyc_prompt_layout() {
        let prompt = render_prompt(&KYC);
        assert!(prompt.starts_with(
            "Extract the following information from the KYC document with high accuracy.\n"
        ));
        assert!(prompt.contains("{\n    \"name\": \"Full name of the person\",\n"));
        assert!(prompt.contains("check if they are already masked"));
    }

    #[test]
    fn test_nested_groups_are_indented() {
        let prompt = render_prompt(&AGREEMENT);
        assert!(prompt.contains("    \"dpn\": {\n        \"borrowersSignatures\": "));
        assert!(prompt.contains("\n    },\n    \"schedulePage\": {"));
    }

    #[test]
    fn test_hints_are_escaped() {
        let prompt = render_prompt(&MEMORANDUM_OF_TITLE);
        // Guidance is plain text; only JSON values get escaped.
        assert!(prompt.contains("Check if \"Cholamandalam"));
        let start = prompt.find('{').unwrap();
        let end = prompt.rfind('}').unwrap();
        let body: serde_json::Value = serde_json::from_str(&prompt[start..=end]).unwrap();
        assert_eq!(body.as_object().unwrap().len(), 5);
    }
}
