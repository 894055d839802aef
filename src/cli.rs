//! Minimal CLI: infer → (ts | schema)
use std::io::Read;
use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Options;
use crate::inference::{infer_samples, Inferred};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer TypeScript declarations from sample JSON/NDJSON documents
#[derive(Parser, Debug)]
#[command(name = "json-tsi", version)]
pub struct CommandLineInterface {
    /// more logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer and print TypeScript interfaces / type aliases
    Ts(TsOut),
    /// infer and print the JSON debug view of the schema model
    Schema(SchemaOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct OptionSettings {
    /// JSON file with generation options (`exported`, `root`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// name of the top-level declaration
    #[arg(long)]
    root: Option<String>,

    /// prefix declarations with `export`
    #[arg(long)]
    export: bool,
}

#[derive(clap::Parser, Debug)]
struct TsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    option_settings: OptionSettings,

    /// prepend a `// Generated by json-tsi on <timestamp>` comment
    #[arg(long)]
    banner: bool,

    /// output .ts file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    option_settings: OptionSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Every sample across all inputs, in input order.
    fn load_samples(&self) -> Result<Vec<Value>> {
        let sources = resolve_file_path_patterns(&self.input)?;
        debug!(inputs = sources.len(), "resolved inputs");
        let per_source = sources
            .par_iter()
            .map(|source| self.load_source(source))
            .collect::<Result<Vec<_>>>()?;
        let samples: Vec<Value> = per_source.into_iter().flatten().collect();
        info!(samples = samples.len(), "loaded samples");
        Ok(samples)
    }

    fn load_source(&self, source: &Source) -> Result<Vec<Value>> {
        let label = source.label();
        let text = source.read()?;
        let documents = if self.ndjson {
            text.lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(n, line)| {
                    serde_json::from_str::<Value>(line)
                        .with_context(|| format!("failed to parse JSON ({label}, line {})", n + 1))
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![serde_json::from_str::<Value>(&text).with_context(|| format!("failed to parse JSON ({label})"))?]
        };

        let mut samples = Vec::with_capacity(documents.len());
        for document in documents {
            let document = match self.json_pointer.as_deref() {
                None => document,
                Some(pointer) => match document.pointer(pointer) {
                    Some(node) => node.clone(),
                    None => {
                        warn!(%label, %pointer, "JSON pointer did not match; document skipped");
                        continue;
                    }
                },
            };
            match self.jq_expr.as_deref() {
                None => samples.push(document),
                Some(jq_expr) => {
                    let outputs = crate::jq_exec::apply_jq(jq_expr, &document)
                        .with_context(|| format!("failed to apply jq expression ({label})"))?;
                    samples.extend(outputs);
                }
            }
        }
        Ok(samples)
    }
}

impl OptionSettings {
    /// File options first, then flags on top.
    fn resolve(&self) -> Result<Options> {
        let mut options = match self.config.as_deref() {
            Some(path) => Options::load(path)?,
            None => Options::default(),
        };
        if let Some(root) = self.root.as_deref() {
            options = options.with_root(root);
        }
        if self.export {
            options.exported = true;
        }
        Ok(options)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Ts(target) => {
                let options = target.option_settings.resolve()?;
                let samples = target.input_settings.load_samples()?;
                let mut ts_src = infer_samples(&samples, &options)?.render(&options);
                if target.banner {
                    let stamp = chrono::Local::now().to_rfc3339();
                    ts_src = format!("// Generated by json-tsi on {stamp}\n{ts_src}");
                }
                write_output(target.out.as_deref(), &ts_src)
            }
            Command::Schema(target) => {
                let options = target.option_settings.resolve()?;
                let samples = target.input_settings.load_samples()?;
                let view = match infer_samples(&samples, &options)? {
                    Inferred::Model { schema, .. } => schema.describe(),
                    Inferred::Primitive { root, ty } => serde_json::json!({
                        "root": root,
                        "type": ty.map(|t| t.as_str()).unwrap_or("unknown"),
                    }),
                };
                let schema_src = serde_json::to_string_pretty(&view)?;
                write_output(target.out.as_deref(), &schema_src)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    fn label(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(path) => path.to_string_lossy().to_string(),
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            Self::Stdin => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
                Ok(text)
            }
            Self::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read source file {}", path.display())),
        }
    }
}

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<Source>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<Source>::new();
    let mut stdin_seen = false;

    for raw in patterns {
        let pattern = raw.as_ref();

        if pattern == "-" {
            if stdin_seen {
                bail!("stdin ('-') given more than once");
            }
            stdin_seen = true;
            out.push(Source::Stdin);
        } else if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                out.push(Source::File(entry?));
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(Source::File(PathBuf::from(pattern)));
        }
    }

    Ok(out)
}
