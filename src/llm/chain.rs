// file: src/llm/chain.rs
// description: conversational retrieval: condense, retrieve, answer

use crate::error::Result;
use crate::llm::{ChatMessage, ChatModel, PromptBuilder};
use crate::models::{Answer, ChatTurn};
use crate::vector_store::Retriever;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ConversationalRetrievalChain {
    llm: Arc<dyn ChatModel>,
    retriever: Retriever,
}

impl ConversationalRetrievalChain {
    pub fn new(llm: Arc<dyn ChatModel>, retriever: Retriever) -> Self {
        Self { llm, retriever }
    }

    /// Rewrite a follow-up into a standalone question. The first question
    /// of a conversation is used as-is.
    pub async fn condense_question(&self, question: &str, history: &[ChatTurn]) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let prompt = PromptBuilder::build_condense_prompt(history, question);
        let standalone = self.llm.complete(&[ChatMessage::user(prompt)]).await?;
        debug!("Condensed question: {}", standalone);
        Ok(standalone)
    }

    pub async fn ask(&self, question: &str, history: &[ChatTurn]) -> Result<Answer> {
        let standalone_question = self.condense_question(question, history).await?;
        let sources = self.retriever.retrieve(&standalone_question).await?;

        let context = PromptBuilder::build_context(&sources);
        let prompt = PromptBuilder::build_qa_prompt(&standalone_question, &context);
        let text = self.llm.complete(&[ChatMessage::user(prompt)]).await?;

        info!(
            "Answered with {} from {} source chunks",
            self.llm.model(),
            sources.len()
        );

        Ok(Answer {
            text,
            standalone_question,
            sources,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::embeddings::HashingEmbedder;
    use crate::error::RagError;
    use crate::models::Chunk;
    use crate::vector_store::retriever::tests::FakeStore;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Returns queued replies in order and records every prompt it saw.
    #[derive(Default)]
    pub(crate) struct ScriptedChat {
        pub(crate) replies: Mutex<VecDeque<String>>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl ScriptedChat {
        pub(crate) fn with_replies(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedChat {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            let prompt = messages
                .iter()
                .map(|m| m.content.clone())
                .collect::<Vec<_>>()
                .join("\n");
            self.prompts.lock().unwrap().push(prompt);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| RagError::Llm("no scripted reply".to_string()))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    async fn indexed_retriever() -> Retriever {
        let retriever = Retriever::new(
            Arc::new(FakeStore::default()),
            Arc::new(HashingEmbedder::new(128)),
            2,
        );
        let chunks = vec![
            Chunk::new("The warranty lasts two years.".into(), "manual.pdf".into(), 4),
            Chunk::new("Batteries are not covered.".into(), "manual.pdf".into(), 5),
            Chunk::new("Shipping takes five days.".into(), "faq.pdf".into(), 1),
        ];
        retriever.index(&chunks).await.unwrap();
        retriever
    }

    #[tokio::test]
    async fn test_first_question_not_condensed() {
        let llm = Arc::new(ScriptedChat::with_replies(&["Two years."]));
        let chain = ConversationalRetrievalChain::new(llm.clone(), indexed_retriever().await);

        let answer = chain.ask("How long is the warranty?", &[]).await.unwrap();

        assert_eq!(answer.text, "Two years.");
        assert_eq!(answer.standalone_question, "How long is the warranty?");
        assert_eq!(answer.sources.len(), 2);

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Question: How long is the warranty?"));
        assert!(prompts[0].contains("The warranty lasts two years."));
    }

    #[tokio::test]
    async fn test_follow_up_is_condensed() {
        let llm = Arc::new(ScriptedChat::with_replies(&[
            "Are batteries covered by the warranty?",
            "No, batteries are not covered.",
        ]));
        let chain = ConversationalRetrievalChain::new(llm.clone(), indexed_retriever().await);
        let history = vec![ChatTurn::new("How long is the warranty?", "Two years.")];

        let answer = chain.ask("What about batteries?", &history).await.unwrap();

        assert_eq!(answer.standalone_question, "Are batteries covered by the warranty?");
        assert_eq!(answer.text, "No, batteries are not covered.");

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("Follow Up Input: What about batteries?"));
        assert!(prompts[1].contains("Question: Are batteries covered by the warranty?"));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let llm = Arc::new(ScriptedChat::default());
        let chain = ConversationalRetrievalChain::new(llm, indexed_retriever().await);

        assert!(matches!(
            chain.ask("anything", &[]).await,
            Err(RagError::Llm(_))
        ));
    }
}
