// file: src/llm/prompt.rs
// description: prompt templates for question condensing and answering

use crate::models::{ChatTurn, RetrievedChunk};

pub struct PromptBuilder;

impl PromptBuilder {
    /// History rendered as alternating `Human:` / `Assistant:` lines.
    pub fn format_history(history: &[ChatTurn]) -> String {
        history
            .iter()
            .map(|turn| format!("\nHuman: {}\nAssistant: {}", turn.question, turn.answer))
            .collect()
    }

    pub fn build_condense_prompt(history: &[ChatTurn], question: &str) -> String {
        format!(
            r#"Given the following conversation and a follow up question, rephrase the follow up question to be a standalone question, in its original language.

Chat History:
{history}
Follow Up Input: {question}
Standalone question:"#,
            history = Self::format_history(history),
            question = question
        )
    }

    pub fn build_context(results: &[RetrievedChunk]) -> String {
        results
            .iter()
            .map(|r| r.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:"#,
            context = context,
            question = question
        )
    }
}
