use super::{LanguageModel, SummaryMemory, VectorStore};
use crate::config::RetrievalConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{CorpusError, Result, RetrievalError};
use crate::types::RetrievedChunk;
use std::sync::Arc;
use tokio::sync::Mutex;

fn condense_prompt(chat_history: &str, question: &str) -> String {
    format!(
        "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question, in its original language.

Chat History:
{chat_history}
Follow Up Input: {question}
Standalone question:"
    )
}

fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:"
    )
}

/// Result of one turn of the conversation
#[derive(Debug, Clone)]
pub struct ChainAnswer {
    pub question: String,
    /// Question as sent to retrieval, rewritten against the conversation so far
    pub standalone_question: String,
    pub answer: String,
    pub sources: Vec<RetrievedChunk>,
}

/// Question answering over the corpus with a summarized conversation history
pub struct ConversationalRetrievalChain {
    store: Arc<dyn VectorStore>,
    embeddings: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LanguageModel>,
    memory: Mutex<SummaryMemory>,
    options: RetrievalConfig,
}

impl ConversationalRetrievalChain {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embeddings: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LanguageModel>,
        options: RetrievalConfig,
    ) -> Self {
        let memory = Mutex::new(SummaryMemory::new(llm.clone()));
        Self {
            store,
            embeddings,
            llm,
            memory,
            options,
        }
    }

    /// Retrieve the chunks most relevant to `query` by maximal marginal relevance
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
        let provider = self.embeddings.clone();
        let text = query.to_string();
        let query_vector = tokio::task::spawn_blocking(move || provider.embed_query(&text))
            .await
            .map_err(|e| CorpusError::other(format!("Embedding task panicked: {}", e)))??;

        self.store
            .mmr_search(
                query_vector,
                self.options.k,
                self.options.fetch_k,
                self.options.lambda_mult,
            )
            .await
            .map_err(|e| RetrievalError::Store(format!("{:#}", e)).into())
    }

    /// Answer a question, updating the conversation summary
    ///
    /// Calls are serialized so each turn sees the summary of the previous one.
    pub async fn ask(&self, question: &str) -> Result<ChainAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RetrievalError::EmptyQuestion.into());
        }

        let mut memory = self.memory.lock().await;

        let standalone_question = if memory.is_empty() {
            question.to_string()
        } else {
            let prompt = condense_prompt(memory.summary(), question);
            self.complete(&prompt).await?.trim().to_string()
        };

        let sources = self.retrieve(&standalone_question).await?;
        tracing::info!(
            "Retrieved {} chunks for question {:?}",
            sources.len(),
            standalone_question
        );

        let context = sources
            .iter()
            .map(|s| s.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = answer_prompt(&context, &standalone_question);
        let answer = self.complete(&prompt).await?.trim().to_string();

        memory
            .record_exchange(question, &answer)
            .await
            .map_err(|e| RetrievalError::LanguageModel(format!("{:#}", e)))?;

        Ok(ChainAnswer {
            question: question.to_string(),
            standalone_question,
            answer,
            sources,
        })
    }

    /// Current conversation summary
    pub async fn summary(&self) -> String {
        self.memory.lock().await.summary().to_string()
    }

    /// Forget the conversation so far
    pub async fn reset(&self) {
        self.memory.lock().await.clear();
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.llm
            .complete(prompt)
            .await
            .map_err(|e| RetrievalError::LanguageModel(format!("{:#}", e)).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::InMemoryVectorStore;
    use crate::types::TextChunk;
    use std::collections::VecDeque;
    use std::path::PathBuf;

    /// Embeds text as keyword presence flags
    struct KeywordProvider;

    const KEYWORDS: [&str; 3] = ["parser", "cache", "walker"];

    impl EmbeddingProvider for KeywordProvider {
        fn embed_batch(&self, texts: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    KEYWORDS
                        .iter()
                        .map(|k| if t.contains(k) { 1.0 } else { 0.0 })
                        .collect()
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            KEYWORDS.len()
        }

        fn model_name(&self) -> &str {
            "keywords"
        }
    }

    /// Replays canned replies and records every prompt
    struct ScriptedModel {
        replies: std::sync::Mutex<VecDeque<String>>,
        prompts: std::sync::Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: std::sync::Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: std::sync::Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }
    }

    async fn chain_with(model: Arc<ScriptedModel>) -> ConversationalRetrievalChain {
        let store = Arc::new(InMemoryVectorStore::new());
        let contents = ["the parser changed", "cache layout", "walker skips binaries"];
        let chunks: Vec<TextChunk> = contents
            .iter()
            .enumerate()
            .map(|(i, c)| TextChunk {
                content: c.to_string(),
                source: PathBuf::from("/cache/corpus.txt"),
                index: i,
                start_offset: 0,
            })
            .collect();
        let embeddings = KeywordProvider
            .embed_batch(contents.iter().map(|c| c.to_string()).collect())
            .unwrap();
        store.add_chunks(chunks, embeddings).await.unwrap();

        ConversationalRetrievalChain::new(
            store,
            Arc::new(KeywordProvider),
            model,
            RetrievalConfig {
                k: 1,
                fetch_k: 3,
                lambda_mult: 0.5,
            },
        )
    }

    #[tokio::test]
    async fn test_first_question_skips_condensing() {
        let model = ScriptedModel::new(&["The parser changed.", "User asked about the parser."]);
        let chain = chain_with(model.clone()).await;

        let answer = chain.ask("What happened to the parser?").await.unwrap();

        assert_eq!(answer.standalone_question, "What happened to the parser?");
        assert_eq!(answer.answer, "The parser changed.");
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].chunk.content, "the parser changed");

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("the parser changed\n\nQuestion: What happened to the parser?"));
        assert_eq!(chain.summary().await, "User asked about the parser.");
    }

    #[tokio::test]
    async fn test_follow_up_is_condensed_with_summary() {
        let model = ScriptedModel::new(&[
            "The parser changed.",
            "User asked about the parser.",
            "How does the cache work?",
            "It stores lines.",
            "User asked about the parser and cache.",
        ]);
        let chain = chain_with(model.clone()).await;

        chain.ask("What happened to the parser?").await.unwrap();
        let answer = chain.ask("And the other thing?").await.unwrap();

        assert_eq!(answer.standalone_question, "How does the cache work?");
        assert_eq!(answer.sources[0].chunk.content, "cache layout");
        assert_eq!(answer.answer, "It stores lines.");

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[2].contains("Chat History:\nUser asked about the parser.\n"));
        assert!(prompts[2].contains("Follow Up Input: And the other thing?"));
        assert_eq!(chain.summary().await, "User asked about the parser and cache.");
    }

    #[tokio::test]
    async fn test_placeholders_in_context_reach_model_verbatim() {
        let store = Arc::new(InMemoryVectorStore::new());
        let content = "parser: let s = \"Question: {question}\"; {chat_history} {context}";
        store
            .add_chunks(
                vec![TextChunk {
                    content: content.to_string(),
                    source: PathBuf::from("/cache/corpus.txt"),
                    index: 0,
                    start_offset: 0,
                }],
                vec![vec![1.0, 0.0, 0.0]],
            )
            .await
            .unwrap();
        let model = ScriptedModel::new(&["It builds a string.", "{new_lines}"]);
        let chain = ConversationalRetrievalChain::new(
            store,
            Arc::new(KeywordProvider),
            model.clone(),
            RetrievalConfig {
                k: 1,
                fetch_k: 1,
                lambda_mult: 0.5,
            },
        );

        chain.ask("WHY parser").await.unwrap();
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains(content));
        assert!(prompts[0].ends_with("Question: WHY parser\nHelpful Answer:"));
        assert_eq!(prompts.len(), 2);
        drop(prompts);

        assert_eq!(chain.summary().await, "{new_lines}");
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let chain = chain_with(ScriptedModel::new(&[])).await;
        let err = chain.ask("   ").await.unwrap_err();
        assert!(matches!(
            err,
            CorpusError::Retrieval(RetrievalError::EmptyQuestion)
        ));
    }

    #[tokio::test]
    async fn test_model_failure_surfaces() {
        let chain = chain_with(ScriptedModel::new(&[])).await;
        let err = chain.ask("parser?").await.unwrap_err();
        assert!(matches!(
            err,
            CorpusError::Retrieval(RetrievalError::LanguageModel(_))
        ));
        assert_eq!(chain.summary().await, "");
    }

    #[tokio::test]
    async fn test_reset_forgets_history() {
        let model = ScriptedModel::new(&["a", "summary", "b", "summary"]);
        let chain = chain_with(model.clone()).await;

        chain.ask("parser?").await.unwrap();
        chain.reset().await;
        let answer = chain.ask("walker?").await.unwrap();

        assert_eq!(answer.standalone_question, "walker?");
        assert_eq!(model.prompts.lock().unwrap().len(), 4);
    }
}
