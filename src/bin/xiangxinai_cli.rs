//! xiangxinai-cli: 象信AI安全护栏命令行检测工具
//!
//! Usage:
//!   xiangxinai-cli health                          Service health
//!   xiangxinai-cli models                          Available models
//!   xiangxinai-cli prompt <text>                   Check a user input
//!   xiangxinai-cli response <prompt> <answer>      Check a model answer in context
//!   xiangxinai-cli image <path|url> [prompt]       Check an image

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;
use xiangxinai::{blocking, CheckOptions, GuardrailClientBuilder, GuardrailResponse};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "health" | "models" | "prompt" | "response" | "image" => run(&args[1], &args[2..]),
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        std::process::exit(2);
    }
}

fn print_usage() {
    println!(
        r#"xiangxinai-cli: 象信AI安全护栏命令行工具

USAGE:
    xiangxinai-cli <COMMAND> [ARGS]

COMMANDS:
    health                      Show service health
    models                      List available models
    prompt <text>               Check a user input
    response <prompt> <answer>  Check a model answer against its prompt
    image <path|url> [prompt]   Check a local or remote image
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    XIANGXINAI_API_KEY          API key (required)
    XIANGXINAI_BASE_URL         Service address (default https://api.xiangxinai.cn/v1)
    XIANGXINAI_TIMEOUT_SECS     Request timeout in seconds (default 30)
    XIANGXINAI_MAX_RETRIES      Retry budget (default 3)
    RUST_LOG                    Log filter (default warn)"#
    );
}

fn cmd_version() {
    println!("xiangxinai-cli {}", env!("CARGO_PKG_VERSION"));
}

fn run(command: &str, args: &[String]) -> anyhow::Result<()> {
    let client = GuardrailClientBuilder::from_env()?
        .build_blocking()
        .context("cannot create client (is XIANGXINAI_API_KEY set?)")?;

    match command {
        "health" => print_json(&client.health_check()?),
        "models" => print_json(&client.get_models()?),
        "prompt" => {
            let text = required(args, 0, "text")?;
            print_verdict(&client.check_prompt(text, None)?);
        }
        "response" => {
            let prompt = required(args, 0, "prompt")?;
            let answer = required(args, 1, "answer")?;
            print_verdict(&client.check_response_ctx(prompt, answer, None)?);
        }
        "image" => {
            let image = required(args, 0, "path|url")?;
            let prompt = args.get(1).map(String::as_str).unwrap_or("");
            print_verdict(&check_image(&client, prompt, image)?);
        }
        other => bail!("unknown command: {other}"),
    }

    client.close();
    Ok(())
}

fn check_image(
    client: &blocking::GuardrailClient,
    prompt: &str,
    image: &str,
) -> anyhow::Result<GuardrailResponse> {
    Ok(client.check_prompt_image(prompt, image, &CheckOptions::new())?)
}

fn required<'a>(args: &'a [String], idx: usize, name: &str) -> anyhow::Result<&'a str> {
    match args.get(idx) {
        Some(v) => Ok(v.as_str()),
        None => bail!("missing argument <{name}>"),
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}

fn print_verdict(resp: &GuardrailResponse) {
    println!("id:            {}", resp.id);
    println!("overall risk:  {}", resp.overall_risk_level);
    println!("action:        {}", resp.suggest_action);
    println!(
        "compliance:    {} {:?}",
        resp.result.compliance.risk_level, resp.result.compliance.categories
    );
    println!(
        "security:      {} {:?}",
        resp.result.security.risk_level, resp.result.security.categories
    );
    if let Some(data) = &resp.result.data {
        println!("data:          {} {:?}", data.risk_level, data.categories);
    }
    if let Some(score) = resp.score {
        println!("score:         {score:.3}");
    }
    if let Some(answer) = &resp.suggest_answer {
        println!("suggested:     {answer}");
    }
}
