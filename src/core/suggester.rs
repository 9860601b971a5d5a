//! Batched suggestion pipeline and the review feedback loop.
//!
//! Items are grouped into fixed-size batches; each batch renders its
//! prompts against one snapshot of the few-shot window, goes to the model
//! in a single request, and comes back as annotated items in input order.
//! Batches run strictly sequentially - the awaited completion call (plus
//! its rate-limit backoff) is the only suspension point, so downstream
//! consumption paces upstream batch issuance.
//!
//! The window only changes through `update`, fed by the host review
//! tool's accepted decisions; raw model responses never touch it, which
//! is why prompts within one batch all see the same examples.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::adapters::{complete_with_retry, CompletionClient, CompletionRequest};
use crate::config;
use crate::core::align::align_response;
use crate::core::prompt::PromptBuilder;
use crate::core::store::ExampleStore;
use crate::core::tokenize::Tokenizer;
use crate::domain::{
    input_hash, task_hash, AnnotatedItem, Disposition, InputItem, LabelSet, LlmExchange,
    PromptExample, ReviewedItem,
};

/// Request parameters for the completion endpoint.
#[derive(Debug, Clone)]
pub struct RequestParams {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Retries after a rate-limited response.
    pub retries: u32,
    /// Fixed sleep between rate-limit retries.
    pub retry_delay: Duration,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            model: config::DEFAULT_MODEL.to_string(),
            temperature: config::DEFAULT_TEMPERATURE,
            max_tokens: config::DEFAULT_MAX_TOKENS,
            retries: config::DEFAULT_RETRIES,
            retry_delay: Duration::from_secs(config::DEFAULT_RETRY_DELAY_S),
        }
    }
}

/// Drives texts through prompt building, one batched completion call per
/// group, and span alignment.
pub struct Suggester<C, T> {
    client: C,
    tokenizer: T,
    prompt: PromptBuilder,
    labels: LabelSet,
    store: ExampleStore,
    params: RequestParams,
    segment: bool,
}

impl<C, T> Suggester<C, T>
where
    C: CompletionClient,
    T: Tokenizer,
{
    pub fn new(
        client: C,
        tokenizer: T,
        prompt: PromptBuilder,
        labels: LabelSet,
        params: RequestParams,
        max_examples: usize,
        segment: bool,
    ) -> Self {
        Self {
            client,
            tokenizer,
            prompt,
            labels,
            store: ExampleStore::new(max_examples),
            params,
            segment,
        }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn store(&self) -> &ExampleStore {
        &self.store
    }

    /// Seed the few-shot window, e.g. from an examples file or previously
    /// reviewed dataset entries. Subject to the window's capacity like any
    /// other add.
    pub fn seed<I>(&mut self, examples: I)
    where
        I: IntoIterator<Item = PromptExample>,
    {
        for example in examples {
            self.store.add(example);
        }
    }

    /// Annotate one batch: shared window snapshot, one completion call,
    /// then per-item merge and alignment.
    pub async fn annotate_batch(&self, batch: Vec<InputItem>) -> Result<Vec<AnnotatedItem>> {
        let prompts: Vec<String> = batch
            .iter()
            .map(|item| {
                self.prompt
                    .render(&item.text, &self.labels, self.store.examples())
            })
            .collect::<Result<_>>()?;

        let request = CompletionRequest {
            model: self.params.model.clone(),
            prompts: prompts.clone(),
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
        };
        let completions = complete_with_retry(
            &self.client,
            &request,
            self.params.retries,
            self.params.retry_delay,
        )
        .await
        .context("Completion request failed")?;

        if completions.len() != batch.len() {
            anyhow::bail!(
                "Completion count mismatch: sent {} prompts, received {} completions",
                batch.len(),
                completions.len()
            );
        }

        let mut annotated = Vec::with_capacity(batch.len());
        for ((item, prompt), response) in batch.into_iter().zip(prompts).zip(completions) {
            debug!(prompt = %prompt, "prompt sent to the model");
            debug!(response = %response, "model response");

            let tokens = self.tokenizer.tokenize(&item.text);
            let spans = align_response(&item.text, &tokens, &response, &self.labels);
            let input_hash = input_hash(&item.text);
            let task_hash = task_hash(&item.text, &spans);

            // Passthrough fields the pipeline rewrites would otherwise
            // serialize twice
            let mut extra = item.extra;
            for key in ["llm", "spans", "input_hash", "task_hash"] {
                extra.remove(key);
            }

            annotated.push(AnnotatedItem {
                text: item.text,
                extra,
                llm: LlmExchange { prompt, response },
                spans,
                input_hash,
                task_hash,
            });
        }
        Ok(annotated)
    }

    /// Run a stream of items through the pipeline in arrival order,
    /// handing each annotated item to `sink` as its batch completes.
    ///
    /// A fatal batch error (exhausted retries, auth failure, transport
    /// failure) aborts the whole run with nothing written for the
    /// in-flight batch; malformed responses are tolerated per item and
    /// simply yield fewer spans.
    pub async fn run_with<I, F>(&self, items: I, batch_size: usize, mut sink: F) -> Result<()>
    where
        I: IntoIterator<Item = InputItem>,
        F: FnMut(AnnotatedItem) -> Result<()>,
    {
        let items: Box<dyn Iterator<Item = InputItem> + '_> = if self.segment {
            Box::new(items.into_iter().flat_map(|item| self.split_item(item)))
        } else {
            Box::new(items.into_iter())
        };

        let mut batch_index = 0usize;
        for batch in batches(items, batch_size) {
            info!(batch_index, size = batch.len(), "Annotating batch");
            let annotated = self.annotate_batch(batch).await?;
            for item in annotated {
                sink(item)?;
            }
            batch_index += 1;
        }
        Ok(())
    }

    /// Run the pipeline and collect every annotated item.
    pub async fn run<I>(&self, items: I, batch_size: usize) -> Result<Vec<AnnotatedItem>>
    where
        I: IntoIterator<Item = InputItem>,
    {
        let mut output = Vec::new();
        self.run_with(items, batch_size, |item| {
            output.push(item);
            Ok(())
        })
        .await?;
        Ok(output)
    }

    /// Fold reviewed items back into the few-shot window.
    ///
    /// Only items that are flagged for prompt use AND accepted AND carry
    /// text enter the window; partial or rejected reviews are ignored.
    pub fn update<'a, I>(&mut self, reviewed: I)
    where
        I: IntoIterator<Item = &'a ReviewedItem>,
    {
        let mut added = 0usize;
        for item in reviewed {
            if let Disposition::PromptWorthy(_) = item.disposition() {
                if let Some(example) = PromptExample::from_review(item, &self.labels) {
                    self.store.add(example);
                    added += 1;
                }
            }
        }
        if added > 0 {
            debug!(added, window = self.store.len(), "Updated few-shot window");
        }
    }

    /// Split one item into per-sentence items carrying the same
    /// passthrough fields. Spans on a fragment index into the fragment's
    /// own text.
    fn split_item(&self, item: InputItem) -> Vec<InputItem> {
        let sentences = self.tokenizer.segment_sentences(&item.text);
        if sentences.len() <= 1 {
            return vec![item];
        }
        sentences
            .into_iter()
            .filter_map(|(start, end)| {
                let fragment = item.text[start..end].trim();
                if fragment.is_empty() {
                    None
                } else {
                    Some(InputItem {
                        text: fragment.to_string(),
                        extra: item.extra.clone(),
                    })
                }
            })
            .collect()
    }
}

/// Group items into batches of at most `batch_size`, flushing the final
/// partial batch when the source ends. This is the only batching policy -
/// there is no time-based flush, so a slow unbounded source pauses until
/// the buffer fills or the source ends.
pub fn batches<I>(items: I, batch_size: usize) -> Batches<I::IntoIter>
where
    I: IntoIterator,
{
    Batches {
        inner: items.into_iter(),
        batch_size: batch_size.max(1),
    }
}

pub struct Batches<I> {
    inner: I,
    batch_size: usize,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match self.inner.next() {
                Some(item) => batch.push(item),
                None => break,
            }
        }
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_groups_and_flushes_remainder() {
        let grouped: Vec<Vec<i32>> = batches(vec![1, 2, 3, 4, 5], 2).collect();
        assert_eq!(grouped, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn test_batches_exact_fit() {
        let grouped: Vec<Vec<i32>> = batches(vec![1, 2, 3, 4], 2).collect();
        assert_eq!(grouped, vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_batches_empty_source() {
        let grouped: Vec<Vec<i32>> = batches(Vec::<i32>::new(), 3).collect();
        assert!(grouped.is_empty());
    }

    #[test]
    fn test_batches_clamps_zero_size() {
        let grouped: Vec<Vec<i32>> = batches(vec![1, 2], 0).collect();
        assert_eq!(grouped, vec![vec![1], vec![2]]);
    }
}
