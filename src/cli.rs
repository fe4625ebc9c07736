use crate::api::FamilyApi;
use crate::config::{Config, load_config};
use crate::graph::build_graph;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::model::{Member, ViewMode};
use crate::parser::parse_members;
use crate::render::render_svg;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::write_output_svg;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "famtree", version, about = "Family tree renderer")]
pub struct Args {
    /// Member list JSON file or '-' for stdin
    #[arg(short = 'i', long = "input", conflicts_with = "tree")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Color members by family branch
    #[arg(long)]
    pub branches: bool,

    /// Also write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Fetch the members of this tree from the API instead of reading a file
    #[arg(long)]
    pub tree: Option<u64>,

    /// API base URL
    #[arg(long = "api-url", env = "FAMTREE_API_URL")]
    pub api_url: Option<String>,

    #[arg(long, requires = "password")]
    pub username: Option<String>,

    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Where to keep the access/refresh token pair between runs
    #[arg(long = "token-file")]
    pub token_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    run_with(Args::parse())
}

pub fn run_with(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;

    let members = match args.tree {
        Some(tree) => fetch_members(&args, &config, tree)?,
        None => {
            let input = read_input(args.input.as_deref())?;
            parse_members(&input).context("failed to parse member list")?
        }
    };
    tracing::info!(members = members.len(), view = ?config.layout.view_mode, "rendering");

    let graph = build_graph(&members, config.layout.view_mode, &config.theme);
    let layout = compute_layout(&graph, &config.layout);
    if let Some(path) = &args.dump_layout {
        write_layout_dump(path, &layout)?;
    }
    let svg = render_svg(&layout, &config.theme, &config.layout);

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref()),
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config)
        }
    }
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if args.branches {
        config.layout.view_mode = ViewMode::Branches;
    }
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(path) = &args.token_file {
        config.api.token_file = Some(path.clone());
    }
    Ok(config)
}

fn fetch_members(args: &Args, config: &Config, tree: u64) -> Result<Vec<Member>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let api = FamilyApi::from_config(&config.api)?;
        if let (Some(username), Some(password)) = (&args.username, &args.password) {
            api.login(username, password).await?;
        } else if !api.is_logged_in() {
            tracing::warn!("no stored session; fetching anonymously");
        }
        let members = api
            .tree_members(tree)
            .await
            .with_context(|| format!("failed to fetch members of tree {tree}"))?;
        Ok::<_, anyhow::Error>(members)
    })
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
