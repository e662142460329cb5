//! Pin curation commands.
//!
//! `pins edit` applies a sequence of operations to one collection in a single
//! editing session and commits the result, or discards it with `--discard`.
//! Positions are 1-based and address the pinned products as listed by
//! `pins show`. Only pins found on the first product page are listed there;
//! the rest are reported as not in the listing and keep their place.

use std::io::{BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;

use clap::Subcommand;
use vitrine_core::AppConfig;
use vitrine_engine::{CatalogSource, CollectionScreen, CurationEngine, EngineError};
use vitrine_gateway::CatalogClient;
use vitrine_pins::LocalPinStore;

/// Sub-commands available under `pins`.
#[derive(Debug, Subcommand)]
pub enum PinsCommands {
    /// Show the pinned products of a collection in pin order
    Show { collection_id: i64 },
    /// Apply pin operations and commit them
    Edit {
        collection_id: i64,
        /// Operations applied in order: `toggle:KEY`, `remove:KEY`,
        /// `move:FROM:TO`
        #[arg(required = true, value_name = "OP")]
        ops: Vec<PinOp>,
        /// Confirm removals without prompting
        #[arg(long, short)]
        yes: bool,
        /// Preview the result, then drop the edits instead of committing
        #[arg(long)]
        discard: bool,
    },
}

/// One step of a `pins edit` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinOp {
    Toggle { product_code: String, color_code: String },
    Remove { product_code: String, color_code: String },
    Move { from: usize, to: usize },
}

impl FromStr for PinOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verb, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("operation \"{s}\" must look like VERB:ARGS"))?;
        match verb {
            "toggle" => {
                let (product_code, color_code) = split_key(rest)?;
                Ok(PinOp::Toggle {
                    product_code,
                    color_code,
                })
            }
            "remove" => {
                let (product_code, color_code) = split_key(rest)?;
                Ok(PinOp::Remove {
                    product_code,
                    color_code,
                })
            }
            "move" => {
                let (from, to) = rest
                    .split_once(':')
                    .ok_or_else(|| format!("move \"{rest}\" must look like FROM:TO"))?;
                Ok(PinOp::Move {
                    from: parse_position(from)?,
                    to: parse_position(to)?,
                })
            }
            other => Err(format!(
                "unknown operation \"{other}\"; expected toggle, remove or move"
            )),
        }
    }
}

/// Splits `productCode-colorCode` at the last dash; product codes may
/// themselves contain dashes.
fn split_key(key: &str) -> Result<(String, String), String> {
    match key.rsplit_once('-') {
        Some((code, color)) if !code.is_empty() && !color.is_empty() => {
            Ok((code.to_string(), color.to_string()))
        }
        _ => Err(format!("product key \"{key}\" must look like CODE-COLOR")),
    }
}

fn parse_position(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(position) if position >= 1 => Ok(position),
        _ => Err(format!("position \"{raw}\" must be a number starting at 1")),
    }
}

/// Dispatch a `pins` sub-command.
///
/// # Errors
///
/// Returns an error if loading the screen, a removal prompt, or the commit
/// fails.
pub(crate) async fn run(
    config: &AppConfig,
    client: &Arc<CatalogClient>,
    command: PinsCommands,
) -> anyhow::Result<()> {
    match command {
        PinsCommands::Show { collection_id } => {
            let screen = open_screen(config, client, collection_id).await?;
            print_pins(screen.curation());
            Ok(())
        }
        PinsCommands::Edit {
            collection_id,
            ops,
            yes,
            discard,
        } => {
            let mut screen = open_screen(config, client, collection_id).await?;
            let curation = screen.curation_mut();
            curation.enter_editing();
            for op in &ops {
                apply_op(curation, op, yes)?;
            }
            print_pins(curation);

            let diff = curation.diff();
            if discard {
                curation.discard().await?;
                println!("edits discarded");
            } else if diff.is_empty() {
                curation.discard().await?;
                println!("nothing to commit");
            } else {
                curation.commit().await?;
                println!(
                    "committed {} pins ({} added, {} removed{})",
                    curation.pinned_keys().len(),
                    diff.added.len(),
                    diff.removed.len(),
                    if diff.reordered { ", reordered" } else { "" }
                );
            }
            Ok(())
        }
    }
}

async fn open_screen(
    config: &AppConfig,
    client: &Arc<CatalogClient>,
    collection_id: i64,
) -> anyhow::Result<CollectionScreen> {
    let store = Arc::new(LocalPinStore::new(&config.pin_store_path));
    let source: Arc<dyn CatalogSource> = client.clone();
    let mut screen = CollectionScreen::new(collection_id, source, store, config.page_size);
    if let Err(err) = screen.enter().await {
        let pins_loaded = screen.curation().error().is_none();
        tolerate_listing_failure(err, pins_loaded)?;
    }
    Ok(screen)
}

/// Pin commands need only the stored pins. A failed products or filters
/// fetch is reported and the pins are listed without product details.
fn tolerate_listing_failure(err: EngineError, pins_loaded: bool) -> Result<(), EngineError> {
    match err {
        EngineError::Fetch { .. } if pins_loaded => {
            tracing::warn!(error = %err, "collection listing unavailable");
            eprintln!("warning: {err}; pins are listed without product details");
            Ok(())
        }
        other => Err(other),
    }
}

fn apply_op(curation: &mut CurationEngine, op: &PinOp, assume_yes: bool) -> anyhow::Result<()> {
    match op {
        PinOp::Toggle {
            product_code,
            color_code,
        } => {
            let pinned = curation.toggle_pin(product_code, color_code);
            let verb = if pinned { "pinned" } else { "unpinned" };
            println!("{verb} {product_code}-{color_code}");
        }
        PinOp::Remove {
            product_code,
            color_code,
        } => {
            let key = format!("{product_code}-{color_code}");
            if !curation.is_pinned(&key) {
                println!("{key} is not pinned");
                return Ok(());
            }
            curation.request_removal(product_code, color_code);
            if assume_yes || confirm(&format!("Remove {key} from pinned products?"))? {
                if let Some(removed) = curation.confirm_removal() {
                    println!("removed {removed}");
                }
            } else {
                curation.cancel_removal();
                println!("kept {key}");
            }
        }
        PinOp::Move { from, to } if from == to => {
            println!("position {from} unchanged");
        }
        PinOp::Move { from, to } => {
            if !curation.reorder(from - 1, to - 1) {
                anyhow::bail!(
                    "cannot move position {from} to {to}; {} pinned products are listed",
                    curation.pinned_view().len()
                );
            }
            println!("moved position {from} to {to}");
        }
    }
    Ok(())
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_pins(curation: &CurationEngine) {
    if curation.pinned_keys().is_empty() {
        println!("no pinned products");
        return;
    }
    for (idx, product) in curation.pinned_view().iter().enumerate() {
        println!("{:>3}. {:<28}{}", idx + 1, product.key(), product.display_name(10));
    }
    let orphans = curation.orphaned_keys();
    if !orphans.is_empty() {
        println!("not in collection listing: {}", orphans.join(", "));
    }
}
