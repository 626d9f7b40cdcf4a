// ABOUTME: Command handlers for the stockroom CLI, one per subcommand.
// ABOUTME: Each handler takes the store handle and context explicitly and writes to a caller-supplied sink.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Context as _;
use stockroom_core::{Context, ListFilter, Record, RecordStore};
use ulid::Ulid;

use crate::cli::{Command, CreateArgs, ListArgs, OutputFormat, UpdateArgs};
use crate::render;

/// Dispatch one parsed command against `store`, printing to stdout.
pub async fn run(command: Command, store: &dyn RecordStore, ctx: &Context) -> anyhow::Result<()> {
    let mut out = std::io::stdout();
    match command {
        Command::Create(args) => create(store, ctx, args, &mut out).await,
        Command::Get { id } => get(store, ctx, &id, &mut out).await,
        Command::List(args) => list(store, ctx, &args, &mut out).await,
        Command::Update(args) => update(store, ctx, args, &mut out).await,
        Command::Delete { id, force } => {
            let mut input = std::io::stdin().lock();
            delete(store, ctx, &id, force, &mut input, &mut out).await
        }
        Command::Import { file } => import(store, ctx, &file, &mut out).await,
        Command::Export { file, category } => {
            export(store, ctx, &file, category, &mut out).await
        }
    }
}

pub async fn create(
    store: &dyn RecordStore,
    ctx: &Context,
    args: CreateArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let record = Record::new(
        Ulid::new().to_string(),
        args.name,
        args.price,
        args.quantity,
        args.category,
    );
    record.validate()?;

    let id = record.id.clone();
    store.create(ctx, record).await?;

    writeln!(out, "Product created successfully: {}", id)?;
    Ok(())
}

pub async fn get(
    store: &dyn RecordStore,
    ctx: &Context,
    id: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let record = store.get(ctx, id).await?;
    render::write_table(out, &[record])?;
    Ok(())
}

pub async fn list(
    store: &dyn RecordStore,
    ctx: &Context,
    args: &ListArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let filter = ListFilter {
        category: args.category.clone().filter(|c| !c.is_empty()),
        min_price: args.min_price,
        max_price: args.max_price,
    };

    let mut records = store.list(ctx, &filter).await?;
    records.sort_by(|a, b| a.id.cmp(&b.id));

    match args.format() {
        OutputFormat::Json => render::write_json(out, &records)?,
        OutputFormat::Table => render::write_table(out, &records)?,
    }
    Ok(())
}

/// Read-modify-write: only the fields given on the command line change.
pub async fn update(
    store: &dyn RecordStore,
    ctx: &Context,
    args: UpdateArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut record = store.get(ctx, &args.id).await?;

    if let Some(name) = args.name {
        record.name = name;
    }
    if let Some(price) = args.price {
        record.price = price;
    }
    if let Some(quantity) = args.quantity {
        record.quantity = quantity;
    }
    if let Some(category) = args.category {
        record.category = category;
    }
    record.validate()?;

    store.update(ctx, &args.id, record).await?;

    writeln!(out, "Product updated successfully: {}", args.id)?;
    Ok(())
}

pub async fn delete(
    store: &dyn RecordStore,
    ctx: &Context,
    id: &str,
    force: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if !force {
        write!(out, "Are you sure you want to delete product {}? [y/N]: ", id)?;
        out.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y") {
            writeln!(out, "Deletion cancelled")?;
            return Ok(());
        }
    }

    store.delete(ctx, id).await?;

    writeln!(out, "Product deleted successfully")?;
    Ok(())
}

pub async fn import(
    store: &dyn RecordStore,
    ctx: &Context,
    file: &Path,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let records: Vec<Record> = serde_json::from_slice(&data).context("invalid json format")?;
    let count = records.len();

    store.bulk_import(ctx, records).await?;

    writeln!(out, "Successfully imported {} products", count)?;
    Ok(())
}

pub async fn export(
    store: &dyn RecordStore,
    ctx: &Context,
    file: &Path,
    category: Option<String>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let filter = ListFilter {
        category: category.filter(|c| !c.is_empty()),
        ..ListFilter::default()
    };

    let mut records = store.list(ctx, &filter).await?;
    records.sort_by(|a, b| a.id.cmp(&b.id));

    let json = serde_json::to_vec_pretty(&records)?;
    tokio::fs::write(file, json)
        .await
        .with_context(|| format!("failed to write {}", file.display()))?;

    writeln!(out, "Exported {} products to {}", records.len(), file.display())?;
    Ok(())
}
