use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;
use httpretty::config::Config;
use httpretty::request::{build_url, execute_request, validate_url};
use httpretty::{PrettyPrinter, StyleRegistry};
use std::io::Write;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: httpretty [--style NAME] [--save-style] [--list-styles] \
[--headers-only | --body-only] [METHOD] URL [name==value ...]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    help: bool,
    style: Option<String>,
    save_style: bool,
    list_styles: bool,
    headers_only: bool,
    body_only: bool,
    method: Option<String>,
    url: Option<String>,
    query: Vec<(String, String)>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut positional = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--style" | "-s" => {
                let style = args.next().ok_or_else(|| eyre!("--style needs a value"))?;
                parsed.style = Some(style);
            }
            "--save-style" => parsed.save_style = true,
            "--list-styles" => parsed.list_styles = true,
            "--headers-only" => parsed.headers_only = true,
            "--body-only" => parsed.body_only = true,
            "--help" | "-h" => parsed.help = true,
            other => {
                if let Some(style) = other.strip_prefix("--style=") {
                    parsed.style = Some(style.to_string());
                } else if other.starts_with('-') {
                    bail!("unknown option {other}\n{USAGE}");
                } else if let Some((name, value)) = other.split_once("==") {
                    parsed.query.push((name.to_string(), value.to_string()));
                } else {
                    positional.push(other.to_string());
                }
            }
        }
    }

    if parsed.headers_only && parsed.body_only {
        bail!("--headers-only and --body-only are mutually exclusive");
    }

    match positional.len() {
        0 => {}
        1 => parsed.url = positional.pop(),
        2 => {
            parsed.url = positional.pop();
            parsed.method = positional.pop().map(|m| m.to_uppercase());
        }
        _ => bail!("too many arguments\n{USAGE}"),
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("HTTPRETTY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let mut config = Config::load()?;
    let styles = StyleRegistry::builtin();

    if args.list_styles {
        for name in styles.available_styles() {
            println!("{name}");
        }
        return Ok(());
    }

    let style = args.style.clone().unwrap_or_else(|| config.style().to_string());
    // Fails on unknown style names before any request goes out
    let printer = PrettyPrinter::new(&style)?;

    if args.save_style {
        config.set_style(style)?;
    }

    let Some(url) = args.url else {
        if args.save_style {
            return Ok(());
        }
        bail!("{USAGE}");
    };
    validate_url(&url).map_err(|e| eyre!(e))?;
    let url = build_url(&url, &args.query).map_err(|e| eyre!(e))?;

    let method = match args.method.as_deref() {
        Some(method) => reqwest::Method::from_bytes(method.as_bytes())
            .map_err(|_| eyre!("invalid method {method}"))?,
        None => reqwest::Method::GET,
    };

    let response = execute_request(method, &url).await?;
    tracing::info!(url, "{}", response.summary());

    let mut out = std::io::stdout().lock();
    if !args.body_only {
        writeln!(out, "{}", printer.headers(&response.header_block())?)?;
    }
    if !args.headers_only {
        if !args.body_only {
            writeln!(out)?;
        }
        writeln!(out, "{}", printer.body(&response.body, response.content_type())?)?;
    }

    Ok(())
}
