// ABOUTME: CLI binary for the scout metadata extractor.
// ABOUTME: Extracts SiteMetadata from URLs (via proxies) or local HTML files and prints it as JSON.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use postplanner_scout::{Client, ProxySpec, SiteMetadata};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(about = "Extract titles, descriptions, recipes, and workouts from web pages")]
struct Args {
    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print single-line JSON instead of pretty JSON
    #[arg(long = "compact")]
    compact: bool,

    /// HTML file to extract from (requires --url)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// URL context for HTML file extraction (required with --html)
    #[arg(long = "url")]
    url: Option<String>,

    /// Per-proxy timeout in seconds
    #[arg(long = "timeout-secs")]
    timeout_secs: Option<u64>,

    /// Proxy as NAME=TEMPLATE; repeatable, replaces the defaults. Prefix the template with json: for JSON-wrapping proxies
    #[arg(long = "proxy")]
    proxies: Vec<String>,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Allow local and private-network targets
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// URLs to extract (fetch mode)
    #[arg()]
    urls: Vec<String>,
}

fn format_output(results: &[SiteMetadata], compact: bool) -> serde_json::Result<String> {
    match (results, compact) {
        ([single], true) => serde_json::to_string(single),
        ([single], false) => serde_json::to_string_pretty(single),
        (many, true) => serde_json::to_string(many),
        (many, false) => serde_json::to_string_pretty(many),
    }
}

/// `RUST_LOG` when it parses, otherwise warnings only.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let url_context = match (&args.html, &args.url) {
        (Some(_), None) => {
            eprintln!("error: --url is required when using --html");
            return ExitCode::from(1);
        }
        (Some(_), Some(url)) => Some(url.clone()),
        _ => None,
    };

    if args.html.is_none() && args.urls.is_empty() {
        eprintln!("error: at least one URL is required, or use --html with --url");
        return ExitCode::from(1);
    }

    if args.html.is_some() && !args.urls.is_empty() {
        eprintln!("error: cannot use both --html and positional URLs");
        return ExitCode::from(1);
    }

    let mut builder = Client::builder().allow_private_networks(args.allow_private_networks);
    if let Some(secs) = args.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if !args.proxies.is_empty() {
        let mut proxies = Vec::with_capacity(args.proxies.len());
        for arg in &args.proxies {
            match ProxySpec::parse_arg(arg) {
                Some(spec) => proxies.push(spec),
                None => {
                    eprintln!("error: invalid --proxy {arg:?}, expected NAME=TEMPLATE");
                    return ExitCode::from(1);
                }
            }
        }
        builder = builder.proxies(proxies);
    }
    let client = builder.build();

    let start = Instant::now();
    let mut results: Vec<SiteMetadata> = Vec::new();
    let mut had_error = false;

    match (&args.html, url_context) {
        (Some(html_path), Some(url)) => match fs::read_to_string(html_path) {
            Ok(html) => results.push(client.extract_from_html(&html, &url, "")),
            Err(e) => {
                eprintln!("error reading file {:?}: {}", html_path, e);
                had_error = true;
            }
        },
        _ => {
            for url in &args.urls {
                results.push(client.extract_metadata(url).await);
            }
        }
    }

    let elapsed = start.elapsed();

    if !results.is_empty() {
        match format_output(&results, args.compact) {
            Ok(output_str) => {
                if let Some(output_path) = &args.output {
                    if let Err(e) = fs::write(output_path, &output_str) {
                        eprintln!("error writing to {:?}: {}", output_path, e);
                        had_error = true;
                    }
                } else {
                    println!("{}", output_str);
                }
            }
            Err(e) => {
                eprintln!("error serializing output: {}", e);
                had_error = true;
            }
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
