//! Command-line interface for enspan.
//!
//! Provides commands for fetching bulk entity suggestions, evaluating
//! stored responses against reviewed annotations, and checking API
//! access.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::adapters::OpenAiClient;
use crate::config::{self, Credentials};
use crate::core::prompt::PromptBuilder;
use crate::core::suggester::{RequestParams, Suggester};
use crate::core::tokenize::UnicodeTokenizer;
use crate::dataset::{self, JsonlWriter};
use crate::domain::{InputItem, LabelSet, ReviewedItem};
use crate::eval;

/// enspan - LLM-assisted named entity annotation
#[derive(Parser, Debug)]
#[command(name = "enspan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch bulk entity suggestions for a JSONL dataset
    Fetch {
        /// Path to JSONL data to annotate
        input_path: PathBuf,

        /// Path to save the annotated output
        output_path: PathBuf,

        /// Labels to annotate (comma delimited)
        #[arg(short, long, value_delimiter = ',', required = true)]
        labels: Vec<String>,

        /// Completion model to use for suggestions
        #[arg(short, long, default_value = config::DEFAULT_MODEL)]
        model: String,

        /// Path to examples that help define the task (.json/.yaml)
        #[arg(short, long)]
        examples_path: Option<PathBuf>,

        /// Max examples to include in the prompt
        #[arg(short = 'n', long, default_value_t = config::DEFAULT_MAX_EXAMPLES)]
        max_examples: usize,

        /// Path to a Handlebars prompt template (.hbs)
        #[arg(short, long)]
        prompt_path: Option<PathBuf>,

        /// Batch size to send to the completion API
        #[arg(short, long, default_value_t = config::DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Split input items into sentences before annotating
        #[arg(short = 'S', long)]
        segment: bool,
    },

    /// Evaluate stored responses against reviewed gold annotations
    Evaluate {
        /// Path to the reviewed JSONL dataset (gold spans + stored responses)
        dataset_path: PathBuf,

        /// Labels to evaluate (comma delimited)
        #[arg(short, long, value_delimiter = ',', required = true)]
        labels: Vec<String>,
    },

    /// Verify API credentials and list available models
    Check {
        /// Model name to validate against the service's model list
        #[arg(short, long)]
        model: Option<String>,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Fetch {
                input_path,
                output_path,
                labels,
                model,
                examples_path,
                max_examples,
                prompt_path,
                batch_size,
                segment,
            } => {
                fetch(
                    input_path,
                    output_path,
                    labels,
                    model,
                    examples_path,
                    max_examples,
                    prompt_path,
                    batch_size,
                    segment,
                )
                .await
            }
            Commands::Evaluate {
                dataset_path,
                labels,
            } => evaluate(dataset_path, labels),
            Commands::Check { model } => check(model).await,
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn fetch(
    input_path: PathBuf,
    output_path: PathBuf,
    labels: Vec<String>,
    model: String,
    examples_path: Option<PathBuf>,
    max_examples: usize,
    prompt_path: Option<PathBuf>,
    batch_size: usize,
    segment: bool,
) -> Result<()> {
    let labels = LabelSet::new(&labels);
    if labels.is_empty() {
        anyhow::bail!("At least one non-empty label is required");
    }

    let credentials = Credentials::from_env()?;
    let client = OpenAiClient::new(credentials);
    client.verify_access(Some(&model)).await?;

    let template = config::load_template(prompt_path.as_deref())?;
    let prompt = PromptBuilder::new(&template)?;
    let params = RequestParams {
        model,
        ..RequestParams::default()
    };
    let mut suggester = Suggester::new(
        client,
        UnicodeTokenizer,
        prompt,
        labels,
        params,
        max_examples,
        segment,
    );

    if let Some(path) = examples_path {
        let examples = dataset::read_prompt_examples(&path)?;
        info!("Seeding {} prompt examples from {}", examples.len(), path.display());
        suggester.seed(examples);
    }

    let items: Vec<InputItem> = dataset::read_jsonl(&input_path)?;
    info!("Annotating {} items from {}", items.len(), input_path.display());

    let mut writer = JsonlWriter::create(&output_path)?;
    suggester
        .run_with(items, batch_size, |item| writer.write(&item))
        .await?;
    writer.flush()?;

    info!("Wrote annotated dataset to {}", output_path.display());
    Ok(())
}

fn evaluate(dataset_path: PathBuf, labels: Vec<String>) -> Result<()> {
    let labels = LabelSet::new(&labels);
    if labels.is_empty() {
        anyhow::bail!("At least one non-empty label is required");
    }

    let items: Vec<ReviewedItem> = dataset::read_jsonl(&dataset_path)?;
    let evaluation = eval::evaluate(&items, &labels, &UnicodeTokenizer);

    println!("P {:.3}", evaluation.overall.precision);
    println!("R {:.3}", evaluation.overall.recall);
    println!("F {:.3}", evaluation.overall.f1);
    for (label, score) in &evaluation.per_label {
        println!(
            "{} {:.3} {:.3} {:.3}",
            label, score.precision, score.recall, score.f1
        );
    }
    Ok(())
}

async fn check(model: Option<String>) -> Result<()> {
    let credentials = Credentials::from_env()?;
    let client = OpenAiClient::new(credentials);
    let models = client.verify_access(model.as_deref()).await?;

    println!("API access verified. {} models available:", models.len());
    for model in models {
        println!("  {}", model);
    }
    Ok(())
}
