use std::io::{self, BufRead, Write};

use anyhow::Result;
use sentiment_textgen::pipelines::sentiment::*;
use sentiment_textgen::pipelines::text_generation::*;
use sentiment_textgen::{LengthBounds, SentimentChoice, SentimentTextSession};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("Loading models...");
    let analyzer = SentimentAnalysisPipelineBuilder::modernbert(ModernBertSize::Base).build();
    let generator = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B).build();

    let session = match (analyzer, generator) {
        (Ok(analyzer), Ok(generator)) => SentimentTextSession::new(analyzer, generator),
        (Err(e), _) | (_, Err(e)) => {
            println!("The AI model is not available: {e}");
            return Ok(());
        }
    };
    let bounds = session.bounds();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let Some(prompt) = ask(&mut lines, "\nPrompt (empty line to quit): ")? else {
            break;
        };
        if prompt.is_empty() {
            break;
        }

        let choice = ask(&mut lines, "Sentiment [Auto/positive/negative/neutral]: ")?
            .unwrap_or_default();
        let choice = if choice.trim().is_empty() {
            SentimentChoice::Auto
        } else {
            match choice.parse::<SentimentChoice>() {
                Ok(choice) => choice,
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            }
        };

        let Some(max_length) = read_length(&mut lines, bounds)? else {
            continue;
        };

        match session.run(&prompt, choice, max_length) {
            Ok(outcome) => {
                println!(
                    "\nDetected Sentiment: {}",
                    outcome.sentiment.as_str().to_uppercase()
                );
                println!("\nGenerated Content:\n{}", outcome.text);
            }
            Err(e) => println!("Error: {e}"),
        }
    }

    Ok(())
}

fn ask<B: BufRead>(lines: &mut io::Lines<B>, question: &str) -> Result<Option<String>> {
    print!("{question}");
    io::stdout().flush()?;
    Ok(lines.next().transpose()?.map(|line| line.trim().to_string()))
}

fn read_length<B: BufRead>(lines: &mut io::Lines<B>, bounds: LengthBounds) -> Result<Option<usize>> {
    let question = format!(
        "Length in tokens [{}-{}, default {}]: ",
        bounds.min(),
        bounds.max(),
        bounds.default_length()
    );
    let answer = ask(lines, &question)?.unwrap_or_default();
    if answer.is_empty() {
        return Ok(Some(bounds.default_length()));
    }

    match answer.parse::<usize>() {
        Ok(length) if bounds.contains(length) => Ok(Some(length)),
        _ => {
            println!(
                "Please enter a number between {} and {}.",
                bounds.min(),
                bounds.max()
            );
            Ok(None)
        }
    }
}
