//! `appbake finalize`: turn the bundler's output into a versioned artifact.

use crate::{
    cli::FinalizeArgs,
    config::ProjectConfig,
    log,
    patch::PatchOutcome,
    pipeline::{FinalizeReport, Pipeline},
    stats::BuildStats,
    utils::plural_count,
};
use anyhow::Result;

pub fn finalize(config: &ProjectConfig, args: &FinalizeArgs) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let stats = args.stats.as_deref().map(BuildStats::load).transpose()?;
    let bundle = pipeline.bundle_dir(args.bundle.as_deref(), stats.as_ref());

    log!(
        "finalize";
        "{} {} ({}, {})",
        pipeline.app().title,
        pipeline.output().version(),
        config.environment.as_str(),
        config.deploy.mode.as_str()
    );

    let report = pipeline.run(&bundle, stats)?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &FinalizeReport) {
    let icons = &report.icons;
    log!("icons"; "{}, {} renamed", plural_count(icons.copied, "icon"), icons.renamed);

    if let Some(appcache) = &report.appcache {
        let cached = plural_count(appcache.cache.len(), "file");
        log!("appcache"; "{} cached (revision {})", cached, appcache.revision);
    }

    for (name, outcome) in &report.patches {
        match outcome {
            Ok(PatchOutcome::Patched { replacements }) => {
                log!("patch"; "{}: {}", name, plural_count(*replacements, "replacement"));
            }
            Ok(PatchOutcome::Unchanged) => log!("patch"; "{}: up to date", name),
            Ok(PatchOutcome::Skipped) | Err(_) => {}
        }
    }

    if !report.cleanup.removed.is_empty() {
        log!("cleanup"; "removed {}", plural_count(report.cleanup.removed.len(), "file"));
    }

    if let Some(gzip) = &report.compression {
        log!(
            "gzip";
            "{} compressed, {} skipped, {} failed, {} KiB saved",
            gzip.compressed,
            gzip.skipped,
            gzip.failed,
            gzip.bytes_saved / 1024
        );
    }

    log!("finalize"; "done: {}", report.output.display());
}
