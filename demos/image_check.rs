//! Image check example
//!
//! Sends local files and remote addresses to the vision model. Each image is
//! encoded as a base64 data URI before the request.
//!
//! Usage:
//!   XIANGXINAI_API_KEY="your_key" cargo run --example image_check -- photo.jpg https://example.com/b.png

use xiangxinai::{CheckOptions, GuardrailClientBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let images: Vec<String> = std::env::args().skip(1).collect();
    if images.is_empty() {
        eprintln!("usage: image_check <path|url>...");
        std::process::exit(1);
    }

    let client = GuardrailClientBuilder::from_env()?.build()?;
    let options = CheckOptions::new().user_id("demo-user");

    let verdict = if images.len() == 1 {
        client
            .check_prompt_image("Is this image appropriate?", &images[0], &options)
            .await?
    } else {
        client
            .check_prompt_images("Are these images appropriate?", &images, &options)
            .await?
    };

    println!("risk:       {}", verdict.overall_risk_level);
    println!("action:     {}", verdict.suggest_action);
    println!("categories: {:?}", verdict.all_categories());

    client.close();
    Ok(())
}
