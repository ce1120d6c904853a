//! Blocking client example
//!
//! Same checks as `basic_usage`, on the calling thread with no async runtime.
//! Conversation entries are given as JSON values here.
//!
//! Usage:
//!   XIANGXINAI_API_KEY="your_key" cargo run --example blocking_usage

use serde_json::json;
use xiangxinai::{CheckOptions, GuardrailClientBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let client = GuardrailClientBuilder::from_env()?
        .max_retries(1)
        .build_blocking()?;

    println!("health: {}", client.health_check()?);
    println!("models: {}", client.get_models()?);

    let conversation = vec![
        json!({"role": "system", "content": "You are a customer support bot."}),
        json!({"role": "user", "content": "What's the weather like today?"}),
        json!({"role": "assistant", "content": ""}),
    ];
    let verdict = client.check_conversation_json(&conversation, &CheckOptions::new())?;
    println!(
        "conversation: risk={} action={}",
        verdict.overall_risk_level, verdict.suggest_action
    );

    // A malformed entry is rejected before any request is made
    let broken = vec![json!({"role": "user"})];
    if let Err(e) = client.check_conversation_json(&broken, &CheckOptions::new()) {
        println!("rejected locally: {e}");
    }

    client.close();
    Ok(())
}
