use anyhow::{bail, Context, Result};
use clap::Parser;
use snapurl::batch::{collect_image_files, load_sources, BatchSummary};
use snapurl::cli::{Args, Commands, ProfileArgs, StoreKind};
use snapurl::clipboard::SystemClipboard;
use snapurl::config::StoreConfig;
use snapurl::error::SnapError;
use snapurl::item::ItemStatus;
use snapurl::logger::init_logging;
use snapurl::metadata::{JsonlMetadataStore, MetadataPolicy};
use snapurl::processing::compress;
use snapurl::profile::{CompressionProfile, ProfilePreset};
use snapurl::tracker::ItemEvent;
use snapurl::upload::Uploader;
use snapurl::utils::{
    calculate_compression_ratio, create_progress_bar, format_file_size, print_compression_result,
};
use snapurl::validation::validate_input_path;
use snapurl::walrus::WalrusOptions;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

struct UploadRequest {
    inputs: Vec<String>,
    profile: CompressionProfile,
    recursive: bool,
    store: StoreConfig,
    metadata: Option<PathBuf>,
    metadata_policy: MetadataPolicy,
    copy: bool,
    json: bool,
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet, args.verbose);

    match args.command {
        Commands::Upload {
            inputs,
            profile,
            recursive,
            store,
            out_dir,
            public_base_url,
            aggregator_url,
            publisher_url,
            epochs,
            temp,
            metadata,
            best_effort_metadata,
            copy,
            json,
        } => {
            if store == StoreKind::Dir && temp {
                tracing::warn!("--temp only applies to the walrus store");
            }
            let walrus = WalrusOptions::new(aggregator_url, publisher_url, epochs, temp);
            let request = UploadRequest {
                inputs,
                profile: profile.resolve()?,
                recursive,
                store: StoreConfig::new(store, out_dir, public_base_url, walrus),
                metadata,
                metadata_policy: if best_effort_metadata {
                    MetadataPolicy::BestEffort
                } else {
                    MetadataPolicy::Required
                },
                copy,
                json,
                quiet: args.quiet,
            };
            run_upload(request).await?;
        }
        Commands::Compress {
            input,
            output,
            profile,
        } => {
            run_compress(&input, &output, &profile).await?;
        }
        Commands::Profiles => print_profiles(),
    }

    Ok(())
}

async fn run_upload(request: UploadRequest) -> Result<()> {
    let chatty = !request.quiet && !request.json;

    let paths = collect_image_files(&request.inputs, request.recursive)?;
    if paths.is_empty() {
        return Err(SnapError::NoImageFilesFound(request.inputs.join(" ")).into());
    }

    let (sources, rejected) = load_sources(&paths).await;
    for (path, e) in &rejected {
        eprintln!("❌ Skipping {}: {}", path.display(), e);
    }
    if sources.is_empty() {
        bail!("none of the {} input files could be read", paths.len());
    }

    if chatty {
        println!("🚀 Uploading {} images", sources.len());
        println!("🎛️  Profile: {}", request.profile.name());
        println!("📦 Store: {}", request.store.describe());
    }

    let mut uploader = Uploader::new(request.store.build_store()?);
    if let Some(path) = &request.metadata {
        uploader = uploader
            .with_metadata(Arc::new(JsonlMetadataStore::new(path)))
            .with_metadata_policy(request.metadata_policy);
    }

    let progress = if chatty {
        create_progress_bar(sources.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    let progress_task = tokio::spawn(track_progress(uploader.subscribe(), progress.clone()));

    let summary = uploader.submit_batch(sources, &request.profile).await;

    // Closing the channel lets the progress task drain and exit
    drop(uploader);
    if let Err(e) = progress_task.await {
        tracing::debug!(error = %e, "progress task ended abnormally");
    }
    progress.finish_and_clear();

    if request.json {
        print_json(&summary, rejected.len())?;
    } else {
        print_summary(&summary, request.quiet);
    }

    if request.copy {
        copy_urls(&summary, request.quiet).await;
    }

    if summary.completed() == 0 {
        bail!("no image was uploaded");
    }
    Ok(())
}

async fn track_progress(
    mut updates: tokio::sync::broadcast::Receiver<ItemEvent>,
    progress: ProgressBar,
) {
    loop {
        match updates.recv().await {
            Ok(ItemEvent::Changed(item)) => match item.status() {
                ItemStatus::Processing => progress.set_message(item.original_name().to_string()),
                ItemStatus::Completed | ItemStatus::Failed => progress.inc(1),
                ItemStatus::Pending => {}
            },
            Ok(ItemEvent::Cleared) => progress.set_position(0),
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "progress updates lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_summary(summary: &BatchSummary, quiet: bool) {
    for item in &summary.items {
        match (item.public_url(), item.error()) {
            (Some(url), _) if quiet => println!("{}", url),
            (Some(url), _) => println!("✅ {} -> {}", item.original_name(), url),
            (None, error) => eprintln!(
                "❌ {}: {}",
                item.original_name(),
                error.unwrap_or("unknown error")
            ),
        }
    }

    if quiet {
        return;
    }

    println!("\n📊 Upload Summary:");
    println!(
        "  ✅ Uploaded: {}/{} images",
        summary.completed(),
        summary.total()
    );
    println!(
        "  📊 Total original size: {}",
        format_file_size(summary.bytes_before)
    );
    println!(
        "  📊 Total uploaded size: {}",
        format_file_size(summary.bytes_after)
    );
    println!(
        "  🎯 Overall compression ratio: {:.1}%",
        calculate_compression_ratio(summary.bytes_before, summary.bytes_after)
    );
    println!("  ⏱️  Total time: {:?}", summary.elapsed);
    if summary.failed() > 0 {
        println!("  ⚠️  Failed files: {}", summary.failed());
    }
}

fn print_json(summary: &BatchSummary, skipped: usize) -> Result<()> {
    let report = serde_json::json!({
        "items": summary.items,
        "completed": summary.completed(),
        "failed": summary.failed(),
        "skipped": skipped,
        "bytes_before": summary.bytes_before,
        "bytes_after": summary.bytes_after,
        "elapsed_ms": summary.elapsed.as_millis() as u64,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize upload report")?
    );
    Ok(())
}

async fn copy_urls(summary: &BatchSummary, quiet: bool) {
    let urls = summary.public_urls();
    if urls.is_empty() {
        return;
    }
    match SystemClipboard::new().copy(&urls.join("\n")).await {
        Ok(program) if !quiet => println!("📋 Copied {} URL(s) via {}", urls.len(), program),
        Ok(_) => {}
        Err(e) => eprintln!("⚠️  Could not copy to clipboard: {}", e),
    }
}

async fn run_compress(input: &Path, output: &Path, profile_args: &ProfileArgs) -> Result<()> {
    let profile = profile_args.resolve()?;
    println!("📸 Compressing: {}", input.display());
    println!("🎛️  Profile: {}", profile.name());

    validate_input_path(input).await?;
    let source = tokio::fs::read(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;

    let compressed = compress(source, &profile).await?;
    if let Some((width, height)) = compressed.dimensions {
        println!("📐 Output dimensions: {}x{}", width, height);
    }
    println!(
        "🖼️  Output format: {} ({:?})",
        compressed.mime_type(),
        compressed.outcome
    );

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(output, &compressed.bytes)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;

    print_compression_result(compressed.original_size, compressed.size());
    println!("💾 Saved to: {}", output.display());
    Ok(())
}

fn print_profiles() {
    println!("🎛️  Compression profiles:\n");
    for preset in ProfilePreset::all() {
        let profile = preset.profile();
        let default_marker = if preset == ProfilePreset::default() {
            " (default)"
        } else {
            ""
        };
        if profile.is_passthrough() {
            println!("  {:<10} upload originals untouched{}", preset.name(), default_marker);
        } else {
            println!(
                "  {:<10} max {}px, quality {:.2}, {}, untouched at or below {}{}",
                preset.name(),
                profile.max_dimension(),
                profile.quality(),
                profile.output_format(),
                format_file_size(profile.passthrough_below()),
                default_marker
            );
        }
    }
}
