use ragkit_core::types::ScoredNode;

pub const CONTEXT_PLACEHOLDER: &str = "{context_str}";
pub const QUERY_PLACEHOLDER: &str = "{query_str}";

/// Fills a question-answering template with retrieved node texts (joined by a
/// blank line, best match first) and the question.
pub fn build_prompt(template: &str, sources: &[ScoredNode], question: &str) -> String {
    let context = sources.iter().map(|s| s.node.text.trim()).collect::<Vec<_>>().join("\n\n");
    template.replace(CONTEXT_PLACEHOLDER, &context).replace(QUERY_PLACEHOLDER, question)
}
