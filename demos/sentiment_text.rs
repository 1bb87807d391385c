use anyhow::Result;
use sentiment_textgen::pipelines::sentiment::*;
use sentiment_textgen::pipelines::text_generation::*;
use sentiment_textgen::{SentimentChoice, SentimentLabel, SentimentTextSession};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("Building pipelines...");

    let analyzer = SentimentAnalysisPipelineBuilder::modernbert(ModernBertSize::Base).build()?;
    let generator = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B)
        .seed(42)
        .build()?;

    println!("Pipelines built successfully.");

    let session = SentimentTextSession::new(analyzer, generator);

    let requests = [
        (
            "I absolutely love this new design, it's wonderful!",
            SentimentChoice::Auto,
        ),
        (
            "This is the worst experience I have ever had.",
            SentimentChoice::Auto,
        ),
        (
            "The meeting is scheduled for 3pm on Tuesday.",
            SentimentChoice::Auto,
        ),
        (
            "Quantum computing is interesting.",
            SentimentChoice::Manual(SentimentLabel::Negative),
        ),
    ];

    for (prompt, choice) in requests {
        let outcome = session.run(prompt, choice, 120)?;

        println!("\n=== {prompt} ===");
        println!(
            "Sentiment: {} ({})",
            outcome.sentiment.as_str().to_uppercase(),
            if outcome.detected { "detected" } else { "manual" }
        );
        println!("{}", outcome.text);
    }

    Ok(())
}
