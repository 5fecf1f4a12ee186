use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use shared::model::DraftField;

pub const USAGE: &str = "\
usage:
  snapprice analyze <IMAGE> [options]   upload an image and work with the result
  snapprice health                      check that the backend answers
  snapprice help

options for analyze:
  --set <field>=<value>   edit item, brand, description or condition (repeatable)
  --price <amount>        move the price slider
  --reanalyze             ask the backend for a revised price
  --post                  create a listing
  --open                  open the created listing in a browser (with --post)
  --share                 print the share summary

global:
  --json                  print views as JSON

environment:
  SNAPPRICE_BASE_URL, SNAPPRICE_ANALYZE_PATH, SNAPPRICE_REANALYZE_PATH,
  SNAPPRICE_POST_PATH, SNAPPRICE_TIMEOUT_MS, RUST_LOG";

#[derive(Clone, Debug, PartialEq)]
pub struct Cli {
    pub command: Command,
    pub json: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Analyze(AnalyzeArgs),
    Health,
    Help,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalyzeArgs {
    pub image: PathBuf,
    pub edits: Vec<(DraftField, String)>,
    pub price: Option<f64>,
    pub reanalyze: bool,
    pub post: bool,
    pub open: bool,
    pub share: bool,
}

pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Cli> {
    let mut json = false;
    let mut rest = Vec::new();
    for arg in args {
        if arg == "--json" {
            json = true;
        } else {
            rest.push(arg);
        }
    }

    let mut rest = rest.into_iter();
    let command = match rest.next().as_deref() {
        None | Some("help" | "--help" | "-h") => Command::Help,
        Some("health") => {
            if let Some(extra) = rest.next() {
                bail!("unexpected argument '{extra}' for health");
            }
            Command::Health
        }
        Some("analyze") => Command::Analyze(parse_analyze(rest)?),
        Some(other) => bail!("unknown command '{other}'"),
    };
    Ok(Cli { command, json })
}

fn parse_analyze(mut args: impl Iterator<Item = String>) -> Result<AnalyzeArgs> {
    let mut parsed = AnalyzeArgs::default();
    let mut image = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--set" => {
                let pair = args.next().context("--set needs <field>=<value>")?;
                parsed.edits.push(parse_edit(&pair)?);
            }
            "--price" => {
                let raw = args.next().context("--price needs an amount")?;
                let price: f64 = raw
                    .parse()
                    .with_context(|| format!("'{raw}' is not a price"))?;
                parsed.price = Some(price);
            }
            "--reanalyze" => parsed.reanalyze = true,
            "--post" => parsed.post = true,
            "--open" => parsed.open = true,
            "--share" => parsed.share = true,
            flag if flag.starts_with("--") => bail!("unknown option '{flag}'"),
            _ if image.is_none() => image = Some(PathBuf::from(&arg)),
            _ => bail!("only one image can be analyzed at a time"),
        }
    }

    if parsed.open && !parsed.post {
        bail!("--open only makes sense together with --post");
    }
    parsed.image = image.ok_or_else(|| anyhow!("analyze needs an image path"))?;
    Ok(parsed)
}

fn parse_edit(pair: &str) -> Result<(DraftField, String)> {
    let (field, value) = pair
        .split_once('=')
        .with_context(|| format!("expected <field>=<value>, got '{pair}'"))?;
    let field = match field.trim().to_ascii_lowercase().as_str() {
        "item" | "title" => DraftField::Item,
        "brand" => DraftField::Brand,
        "description" => DraftField::Description,
        "condition" => DraftField::Condition,
        other => bail!("unknown field '{other}'"),
    };
    Ok((field, value.to_string()))
}
