//! Prompt context assembly.

use crate::store::CodeContext;

/// Render a task's context entries into the prompt evidence block.
///
/// For each entry with a non-empty `file_path`, emits a `File:` line followed
/// by `Content:` and `Error:` blocks when present. Entries without a file path
/// are skipped; output order matches input order. Pure and deterministic, so
/// prompt fixtures are reproducible.
pub fn format_context(entries: &[CodeContext]) -> String {
    let mut out = String::new();
    for entry in entries {
        let Some(path) = entry.file_path.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        out.push_str("\nFile: ");
        out.push_str(path);
        out.push('\n');
        if let Some(content) = entry.content.as_deref().filter(|c| !c.is_empty()) {
            out.push_str("Content:\n");
            out.push_str(content);
            out.push('\n');
        }
        if let Some(error) = entry.error_message.as_deref().filter(|e| !e.is_empty()) {
            out.push_str("Error:\n");
            out.push_str(error);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_entry_layout() {
        let entries = vec![CodeContext::for_file("a.py").with_content("x=1")];
        assert_eq!(format_context(&entries), "\nFile: a.py\nContent:\nx=1\n");
    }

    #[test]
    fn repeated_calls_are_byte_identical() {
        let entries = vec![
            CodeContext::for_file("src/main.rs")
                .with_content("fn main() {}")
                .with_error("unused import"),
            CodeContext::for_file("src/lib.rs"),
        ];
        assert_eq!(format_context(&entries), format_context(&entries));
    }

    #[test]
    fn entries_without_file_path_are_skipped() {
        let entries = vec![
            CodeContext::from_content("orphan excerpt"),
            CodeContext::for_file("b.rs").with_error("boom"),
        ];
        assert_eq!(format_context(&entries), "\nFile: b.rs\nError:\nboom\n");
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(format_context(&[]), "");
    }
}
