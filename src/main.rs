mod cli;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use diff_context::cfg::DiffContextConfig;
use diff_context::{ContextSelection, FileContext, generate_context_text_for_file, try_parse_diff};
use grep_context::{GrepConfig, GrepRequest, GrepSearcher, GrepTool};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Commands, DiffArgs, GrepArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file; a missing file is fine.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,diff_context=info,grep_context=info"))
        .context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let args = cli::parse_args();
    match args.command {
        Commands::Diff(diff_args) => handle_diff(diff_args)?,
        Commands::Grep(grep_args) => handle_grep(grep_args).await?,
    }

    Ok(())
}

fn handle_diff(args: DiffArgs) -> Result<()> {
    let diff = read_diff(&args.input)?;
    let cfg = DiffContextConfig::from_env();

    let selection = match (args.changed_only, args.around) {
        (true, _) => ContextSelection::ChangedOnly,
        (false, Some(n)) => ContextSelection::Around(n),
        (false, None) => ContextSelection::Full,
    };

    if let Some(path) = &args.file {
        if args.json {
            let ctx = diff_context::get_file_context(&diff, path)
                .with_context(|| format!("file not found in diff: {path}"))?;
            println!("{}", serde_json::to_string_pretty(&ctx.narrowed(selection))?);
        } else {
            let text = generate_context_text_for_file(&diff, path, selection);
            if text.is_empty() {
                bail!("file not found in diff: {path}");
            }
            println!("{text}");
        }
        return Ok(());
    }

    let contexts: BTreeMap<String, FileContext> = try_parse_diff(&diff, &cfg)
        .context("failed to parse diff")?
        .into_iter()
        .map(|(path, ctx)| (path, ctx.narrowed(selection)))
        .collect();
    info!(files = contexts.len(), "rendering diff context");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&contexts)?);
    } else {
        let blocks: Vec<&str> = contexts.values().map(|c| c.context_text.as_str()).collect();
        println!("{}", blocks.join("\n\n"));
    }
    Ok(())
}

async fn handle_grep(args: GrepArgs) -> Result<()> {
    let cfg = GrepConfig::from_env();
    let tool = match args.root {
        Some(root) => GrepTool::new(Some(root), Arc::new(GrepSearcher::new(&cfg))),
        None => GrepTool::from_config(&cfg),
    };
    info!(root = %tool.workspace_root().display(), "searching repository");

    let request = GrepRequest {
        pattern: args.pattern,
        is_regex: args.regex,
        case_sensitive: !args.ignore_case,
        include_patterns: (!args.include.is_empty()).then_some(args.include),
        exclude_patterns: (!args.exclude.is_empty()).then_some(args.exclude),
        context_lines: args.context,
        max_results: args.max_results,
    };

    let out = tool.run_async(request).await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", out.result);
    }
    if let Some(err) = out.error {
        bail!(err);
    }
    Ok(())
}

fn read_diff(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read diff from stdin")?;
        return Ok(buf);
    }
    diff_context::load_diff_from_file(input)
        .with_context(|| format!("failed to load diff from {}", input.display()))
}
