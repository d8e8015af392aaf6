//! Command-line interface for the outline flavor.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;

use crate::cache::TagCache;
use crate::config::{DispatchConfig, MAX_SOURCE_SIZE, TEXT_WRAP_WIDTH};
use crate::error::{DispatchError, Result};
use crate::outline::{create_outline_parser, render_tree};
use crate::resolver::FsResolver;
use crate::tag::TagKind;

/// Markup Dispatch - Parse markup through registered tag handlers.
#[derive(Parser)]
#[command(name = "markup-dispatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format of the `outline` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Tree,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a file and print its outline.
    Outline {
        /// Markup file to parse
        file: PathBuf,

        /// YAML dispatch configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Extra element tags (comma-separated, e.g. "P,B,I")
        #[arg(short, long)]
        tags: Option<String>,

        /// Extra include tags (comma-separated)
        #[arg(long)]
        include_tag: Option<String>,

        /// Directory included resources are resolved against (default: the file's directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,

        /// Wrap width for text in tree output
        #[arg(short, long, default_value_t = TEXT_WRAP_WIDTH)]
        width: usize,
    },

    /// List the tags found in a file.
    Tags {
        /// Markup file to scan
        file: PathBuf,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Outline {
            file,
            config,
            tags,
            include_tag,
            root,
            format,
            width,
        } => {
            let options = OutlineOptions {
                config,
                tags,
                include_tag,
                root,
                format,
                width,
            };
            print!("{}", outline_command(&file, &options)?);
            Ok(())
        }
        Commands::Tags { file } => {
            print!("{}", tags_command(&file)?);
            Ok(())
        }
    }
}

/// Options of the `outline` command besides the input file.
#[derive(Debug, Clone)]
pub struct OutlineOptions {
    pub config: Option<PathBuf>,
    pub tags: Option<String>,
    pub include_tag: Option<String>,
    pub root: Option<PathBuf>,
    pub format: OutputFormat,
    pub width: usize,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            config: None,
            tags: None,
            include_tag: None,
            root: None,
            format: OutputFormat::Yaml,
            width: TEXT_WRAP_WIDTH,
        }
    }
}

/// Read a source file, refusing files larger than [`MAX_SOURCE_SIZE`].
pub fn read_source(path: &Path) -> Result<String> {
    let size = fs::metadata(path)?.len();
    if size > MAX_SOURCE_SIZE {
        return Err(DispatchError::SourceTooLarge {
            size,
            limit: MAX_SOURCE_SIZE,
        });
    }
    Ok(fs::read_to_string(path)?)
}

fn extend_list(list: &mut Vec<String>, extra: Option<&str>) {
    if let Some(extra) = extra {
        list.extend(extra.split(',').map(|name| name.trim().to_string()));
    }
}

/// Execute the outline command, returning the rendered output.
pub fn outline_command(file: &Path, options: &OutlineOptions) -> Result<String> {
    let mut config = match &options.config {
        Some(path) => DispatchConfig::load(path)?,
        None => DispatchConfig::default(),
    };
    extend_list(&mut config.elements, options.tags.as_deref());
    extend_list(&mut config.include_tags, options.include_tag.as_deref());

    let source = read_source(file)?;
    let mut parser = create_outline_parser(&config)?;

    let root = options
        .root
        .clone()
        .or_else(|| file.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    parser.set_resolver(Rc::new(FsResolver::new(root)));

    let outline = parser.parse(source)?;

    match options.format {
        OutputFormat::Yaml => Ok(serde_yaml_ng::to_string(&outline)?),
        OutputFormat::Tree => Ok(render_tree(&outline, options.width)),
    }
}

/// Execute the tags command, returning one line per tag.
pub fn tags_command(file: &Path) -> Result<String> {
    let source = read_source(file)?;
    let cache = TagCache::from_source(&source);

    let mut out = String::new();
    for tag in cache.tags() {
        let kind = match tag.kind() {
            TagKind::Start if tag.has_ending() => "start",
            TagKind::Start => "open",
            TagKind::End => "end",
            TagKind::Empty => "empty",
            TagKind::Markup => "markup",
        };
        out.push_str(&format!(
            "{:>6}..{:<6} {:<6} {}\n",
            tag.start(),
            tag.unit_end(),
            kind,
            style(tag.name()).cyan()
        ));
    }
    out.push_str(&format!(
        "{} {}\n",
        style("Tags:").bold(),
        cache.tags().len()
    ));
    Ok(out)
}
