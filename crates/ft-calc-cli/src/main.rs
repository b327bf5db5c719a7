use std::io::Read as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comfy_table::{presets, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::{Style, Term};
use ft_calc_core::{
    api::OPENAI_API,
    catalog::{self, Catalog},
    pricing::{compute_cost, fmt_tokens, fmt_usd, PricingRequest, PricingResult},
    share::{ShareState, Tab},
    tokens::{TokenCountRequest, TokenCountResult, TokenCounter, DEFAULT_TOKENIZER_MODEL, TOKENIZER_MODELS},
};
use serde_json::json;

// ── Palette ──────────────────────────────────────────────────────────

fn s_header() -> Style { Style::new().color256(252).bold() }  // bright gray, bold
fn s_dim() -> Style    { Style::new().color256(248) }         // light gray
fn s_tree() -> Style   { Style::new().color256(245) }         // mid gray
fn s_hint() -> Style   { Style::new().color256(243) }         // soft gray
fn s_warm() -> Style   { Style::new().color256(214) }         // amber
fn s_price() -> Style  { Style::new().color256(109) }         // teal
fn s_bold() -> Style   { Style::new().bold() }
fn s_label() -> Style  { Style::new().color256(146) }         // muted lavender

fn sep(width: usize) -> String {
    s_tree().apply_to("\u{2500}".repeat(width)).to_string()
}

// ── CLI Args ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "ft-calc",
    about = "Estimate OpenAI fine-tuning and inference costs, count tokens",
    version,
    after_help = "examples:\n  \
        ft-calc models\n  \
        ft-calc cost --model gpt-4o --input 100000 --output 20000 --epochs 3\n  \
        ft-calc cost --model gpt-4.1-mini --cached --batch\n  \
        ft-calc cost --share https://calc.example.com/   (print a share link)\n  \
        ft-calc tokens \"some text to count\"\n  \
        ft-calc tokens --file prompt.txt --cost            (count, then price as input)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, short, global = true)]
    json: bool,

    /// Replacement models.toml (defaults to the bundled catalog).
    #[arg(long, global = true, env = "FT_CALC_CATALOG")]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List models and their rates.
    Models,
    /// Cost of fine-tuning and then running a model.
    Cost {
        #[arg(long, short, default_value = "gpt-4o-mini")]
        model: String,
        /// Input (training) tokens.
        #[arg(long, short, default_value_t = 100_000, allow_negative_numbers = true)]
        input: i64,
        /// Output tokens.
        #[arg(long, short, default_value_t = 20_000, allow_negative_numbers = true)]
        output: i64,
        #[arg(long, short, default_value_t = 3, allow_negative_numbers = true)]
        epochs: i64,
        /// Price inference input at the cached-input rate.
        #[arg(long)]
        cached: bool,
        /// Apply the Batch API discount to inference.
        #[arg(long)]
        batch: bool,
        /// Print a share link rooted at this URL.
        #[arg(long, value_name = "BASE_URL")]
        share: Option<String>,
    },
    /// Count tokens in text (argument, --file, or stdin).
    Tokens {
        text: Option<String>,
        #[arg(long, short, conflicts_with = "text")]
        file: Option<PathBuf>,
        #[arg(long, short, default_value = DEFAULT_TOKENIZER_MODEL)]
        model: String,
        /// Also price the counted tokens as calculator input.
        #[arg(long)]
        cost: bool,
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        #[arg(long, env = "OPENAI_BASE_URL", default_value = OPENAI_API)]
        base_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let catalog = match &cli.catalog {
        Some(path) => catalog::load_catalog(path)?,
        None => catalog::load_bundled_catalog()?,
    };

    match cli.command {
        Commands::Models => cmd_models(&catalog, cli.json)?,
        Commands::Cost {
            model,
            input,
            output,
            epochs,
            cached,
            batch,
            share,
        } => {
            let req = PricingRequest {
                model,
                input_tokens: input,
                output_tokens: output,
                epochs,
                use_cached_input: cached,
                use_batch_api: batch,
            };
            cmd_cost(&catalog, &req, share.as_deref(), cli.json)?;
        }
        Commands::Tokens {
            text,
            file,
            model,
            cost,
            api_key,
            base_url,
        } => {
            let text = read_text(text, file.as_ref())?;
            let counter = TokenCounter::from_credential(api_key, &base_url)?;
            let req = TokenCountRequest::new(text).with_model(model);
            cmd_tokens(&catalog, &counter, &req, cost, cli.json).await?;
        }
    }
    Ok(())
}

fn read_text(text: Option<String>, file: Option<&PathBuf>) -> anyhow::Result<String> {
    if let Some(t) = text {
        return Ok(t);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

// ── Models ───────────────────────────────────────────────────────────

fn cmd_models(catalog: &Catalog, json: bool) -> anyhow::Result<()> {
    if json {
        let models: Vec<_> = catalog
            .iter()
            .map(|(id, m)| json!({ "id": id, "pricing": m }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!();
    println!("{}", s_header().apply_to("fine-tuning models"));
    println!("{}", sep(72));

    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["  Model", "Input", "Cached", "Output", "Training", ""]
            .map(|h| Cell::new(h).fg(Color::AnsiValue(243))),
    );
    for (id, m) in catalog.iter() {
        let rate = |v: f64| {
            Cell::new(format!("${v}"))
                .fg(Color::AnsiValue(109))
                .set_alignment(CellAlignment::Right)
        };
        table.add_row(vec![
            Cell::new(format!("  {id}")).fg(Color::AnsiValue(252)),
            rate(m.input),
            rate(m.cached_input),
            rate(m.output),
            rate(m.training),
            Cell::new(&m.description).fg(Color::AnsiValue(248)),
        ]);
    }
    println!("{table}");

    println!("{}", sep(72));
    println!(
        "{}",
        s_hint().apply_to(format!(
            "  {} models   rates in USD per 1M tokens   ft-calc cost --model <id>",
            catalog.len()
        ))
    );
    println!();
    Ok(())
}

// ── Cost ─────────────────────────────────────────────────────────────

fn cmd_cost(
    catalog: &Catalog,
    req: &PricingRequest,
    share: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let result = compute_cost(catalog, req)?;
    let link = share
        .map(|base| ShareState::new(req.clone(), Tab::Calculator).share_link(base))
        .transpose()?;

    if json {
        let mut out = json!({ "request": req, "result": result });
        if let Some(link) = &link {
            out["shareLink"] = json!(link);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_breakdown(catalog, req, &result);
    if let Some(link) = link {
        println!("  {}", s_label().apply_to("share"));
        println!("  {}", s_dim().apply_to(link));
        println!();
    }
    Ok(())
}

fn print_breakdown(catalog: &Catalog, req: &PricingRequest, result: &PricingResult) {
    let name = catalog
        .get(&req.model)
        .map(|m| m.name.as_str())
        .unwrap_or(&req.model);

    let mut discounts = Vec::new();
    if req.use_cached_input {
        discounts.push("cached");
    }
    if req.use_batch_api {
        discounts.push("with Batch API");
    }
    let suffix = if discounts.is_empty() {
        String::new()
    } else {
        format!(" ({})", discounts.join(", "))
    };
    let batch_note = if req.use_batch_api { " with Batch API" } else { "" };

    println!();
    println!(
        "{}  {}",
        s_bold().apply_to(name),
        s_dim().apply_to(&req.model)
    );
    println!("{}", sep(56));
    println!(
        "  {:<24} {:>12}   {}",
        "training",
        s_price().apply_to(fmt_usd(result.training_cost)),
        s_hint().apply_to(format!(
            "{} tokens \u{00d7} {} epochs",
            fmt_tokens(req.input_tokens),
            req.epochs
        ))
    );
    println!(
        "  {:<24} {:>12}   {}",
        "inference input",
        s_price().apply_to(fmt_usd(result.inference_input_cost)),
        s_hint().apply_to(format!("{} tokens{suffix}", fmt_tokens(req.input_tokens)))
    );
    println!(
        "  {:<24} {:>12}   {}",
        "inference output",
        s_price().apply_to(fmt_usd(result.inference_output_cost)),
        s_hint().apply_to(format!("{} tokens{batch_note}", fmt_tokens(req.output_tokens)))
    );
    println!("{}", sep(56));
    println!(
        "  {:<24} {:>12}",
        s_bold().apply_to("total"),
        s_bold().apply_to(fmt_usd(result.total_cost))
    );
    println!();
}

// ── Tokens ───────────────────────────────────────────────────────────

async fn cmd_tokens(
    catalog: &Catalog,
    counter: &TokenCounter,
    req: &TokenCountRequest,
    with_cost: bool,
    json: bool,
) -> anyhow::Result<()> {
    let term = Term::stderr();
    let spinner = matches!(counter, TokenCounter::Upstream(_)) && term.is_term() && !json;
    if spinner {
        term.write_line(&format!("{}", s_dim().apply_to("counting...")))?;
    }
    let counted = counter.count(req).await;
    if spinner {
        term.clear_last_lines(1)?;
    }
    let counted = counted?;

    let priced = if with_cost {
        let p = calculator_request(catalog, req, &counted);
        Some((compute_cost(catalog, &p)?, p))
    } else {
        None
    };

    if json {
        let mut out = serde_json::to_value(&counted)?;
        if let Some((result, p)) = &priced {
            out["request"] = json!(p);
            out["result"] = json!(result);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let model = req.model_or_default();
    let model_name = TOKENIZER_MODELS
        .iter()
        .find(|m| m.id == model)
        .map(|m| m.name)
        .unwrap_or(model);

    println!();
    println!(
        "  {} {}",
        s_bold().apply_to(format!("{} tokens", fmt_tokens(counted.token_count as i64))),
        s_dim().apply_to(format!("for {model_name}"))
    );
    if let Some(note) = &counted.note {
        println!("  {}", s_warm().apply_to(note));
    }

    match priced {
        Some((result, p)) => print_breakdown(catalog, &p, &result),
        None => println!(),
    }
    Ok(())
}

/// Calculator request seeded with a token count, priced on the tokenizer
/// model when the catalog has it.
fn calculator_request(
    catalog: &Catalog,
    req: &TokenCountRequest,
    counted: &TokenCountResult,
) -> PricingRequest {
    let model = req.model_or_default();
    let defaults = PricingRequest::default();
    PricingRequest {
        model: if catalog.contains(model) {
            model.to_string()
        } else {
            defaults.model.clone()
        },
        input_tokens: i64::try_from(counted.token_count).unwrap_or(i64::MAX),
        ..defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_cost_flags() {
        let cli = Cli::try_parse_from([
            "ft-calc", "cost", "--model", "gpt-4o", "--input", "5000", "--cached", "--batch",
        ])
        .unwrap();
        match cli.command {
            Commands::Cost { model, input, output, epochs, cached, batch, share } => {
                assert_eq!(model, "gpt-4o");
                assert_eq!(input, 5000);
                assert_eq!(output, 20_000);
                assert_eq!(epochs, 3);
                assert!(cached && batch);
                assert!(share.is_none());
            }
            _ => panic!("expected cost"),
        }
    }

    #[test]
    fn calculator_request_uses_catalog_model() {
        let catalog = catalog::load_bundled_catalog().unwrap();
        let counted = TokenCountResult { token_count: 1234, note: None };

        let req = TokenCountRequest::new("x").with_model("gpt-4.1");
        let p = calculator_request(&catalog, &req, &counted);
        assert_eq!(p.model, "gpt-4.1");
        assert_eq!(p.input_tokens, 1234);

        // gpt-3.5-turbo can be counted but has no fine-tuning price
        let req = TokenCountRequest::new("x").with_model("gpt-3.5-turbo");
        let p = calculator_request(&catalog, &req, &counted);
        assert_eq!(p.model, "gpt-4o-mini");
    }
}
