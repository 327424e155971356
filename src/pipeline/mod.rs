//! The finalization pipeline.
//!
//! # Stages
//!
//! ```text
//! adopt bundle ─▶ ┌ manifest.json ──────┐
//!                 ├ icons + browserconfig├─▶ patch ─▶ cleanup ─▶ gzip ─▶ publish
//!                 └ manifest.appcache ───┘
//! ```
//!
//! The three generators run concurrently and are joined before patching.
//! Manifest, icons, required patches and publish are fatal: the bundle is
//! moved back where the bundler left it. Everything else logs and continues.

mod stage;

pub use stage::Staging;

use crate::app::AppDescriptor;
use crate::cleanup::{self, CleanupReport};
use crate::compress::{self, CompressionReport, CompressionSettings};
use crate::config::{ProjectConfig, ResolvedBuild};
use crate::error::StageResult;
use crate::generator::appcache::{self, APPCACHE_FILE, CacheManifest};
use crate::generator::manifest::{self, MANIFEST_FILE, ManifestDescriptor};
use crate::icon::{self, BROWSERCONFIG_FILE, IconPlan, IconReport};
use crate::output::{self, VersionedOutputPath};
use crate::patch::{self, PatchError, PatchOutcome, PatchRule};
use crate::stats::BuildStats;
use crate::utils::{date::current_year, path::file_name};
use crate::{debug, log};
use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

/// Everything a finalize run produced.
#[derive(Debug)]
pub struct FinalizeReport {
    pub output: PathBuf,
    pub manifest: ManifestDescriptor,
    pub icons: IconReport,
    /// `None` when the cache manifest could not be written.
    pub appcache: Option<CacheManifest>,
    pub patches: Vec<(&'static str, Result<PatchOutcome, PatchError>)>,
    pub cleanup: CleanupReport,
    /// `None` when gzip is disabled.
    pub compression: Option<CompressionReport>,
}

/// One finalize run for a resolved project.
pub struct Pipeline<'a> {
    config: &'a ProjectConfig,
    build: ResolvedBuild,
    app: AppDescriptor,
    output: VersionedOutputPath,
}

impl<'a> Pipeline<'a> {
    /// Read the app descriptor and resolve the versioned output path.
    pub fn new(config: &'a ProjectConfig) -> Result<Self> {
        let descriptor = config.paths.descriptor();
        let app = AppDescriptor::load(&descriptor)?;
        let output = output::resolve(&config.paths.output, &app.version)
            .with_context(|| format!("Invalid version in {}", descriptor.display()))?;

        Ok(Self {
            config,
            build: config.resolved_build(),
            app,
            output,
        })
    }

    pub const fn output(&self) -> &VersionedOutputPath {
        &self.output
    }

    pub const fn app(&self) -> &AppDescriptor {
        &self.app
    }

    /// Where the bundler left its output.
    ///
    /// An explicit directory wins, then the stats' `outputPath`, then the
    /// versioned directory itself.
    pub fn bundle_dir(&self, explicit: Option<&Path>, stats: Option<&BuildStats>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| stats.and_then(|s| s.output_path.clone()))
            .unwrap_or_else(|| self.output.path().to_path_buf())
    }

    /// Finalize `bundle` into the versioned output directory.
    ///
    /// Without `stats` the asset list is taken from the bundle itself.
    pub fn run(&self, bundle: &Path, stats: Option<BuildStats>) -> Result<FinalizeReport> {
        let stats = match stats {
            Some(stats) => stats,
            None => BuildStats::scan(bundle)?,
        };

        let staging = Staging::adopt(bundle, &self.output)?;
        debug!("finalize"; "staging {}", staging.dir().display());

        let staged = match self.finalize(staging.dir(), &stats) {
            Ok(staged) => staged,
            Err(e) => {
                staging.rollback();
                return Err(e);
            }
        };

        let output = staging.publish(&self.output)?;
        log!("publish"; "{}", output.display());

        Ok(FinalizeReport { output, ..staged })
    }

    /// Run every stage against the staging directory.
    fn finalize(&self, dir: &Path, stats: &BuildStats) -> Result<FinalizeReport> {
        let minify = self.build.minify;
        let icon_plan =
            icon::plan(&self.config.paths.icons, dir).context("Failed to install icons")?;
        let cached = self.cached_assets(stats, &icon_plan);

        let (manifest, (icons, appcache)) = rayon::join(
            || manifest::generate(&self.app, dir, minify),
            || {
                rayon::join(
                    || icon_plan.apply(dir, &self.config.icons.tile_color, minify),
                    || appcache::generate(dir, &cached),
                )
            },
        );
        let manifest = manifest.context("Failed to generate web app manifest")?;
        let icons = icons.context("Failed to install icons")?;
        let appcache = best_effort("appcache", appcache);

        let patches = self.patch()?;

        let cleanup = cleanup::cleanup(
            dir,
            &self.config.paths.project,
            self.config.deploy.mode,
            &self.config.cleanup,
        );

        let compression = self
            .build
            .gzip
            .enable
            .then(|| compress::compress(dir, &CompressionSettings::from(&self.build.gzip)));

        Ok(FinalizeReport {
            output: dir.to_path_buf(),
            manifest,
            icons,
            appcache,
            patches,
            cleanup,
            compression,
        })
    }

    /// Bundle assets the cache manifest lists.
    ///
    /// Re-running over an already finalized directory scans this pipeline's
    /// own outputs back in; they are left out so the manifest reaches a fixed
    /// point. Stale-prefixed assets are left out because cleanup removes them.
    fn cached_assets(&self, stats: &BuildStats, icon_plan: &IconPlan) -> BuildStats {
        let mut generated: FxHashSet<&str> = [MANIFEST_FILE, BROWSERCONFIG_FILE, APPCACHE_FILE]
            .into_iter()
            .collect();
        generated.extend(icon_plan.outputs().map(file_name));

        let stale = &self.config.cleanup.stale_prefixes;
        stats.retain_assets(|name| {
            !generated.contains(name)
                && !name.ends_with(".gz")
                && !stale.iter().any(|p| name.starts_with(p.as_str()))
        })
    }

    /// Apply patch rules; only a failing required rule aborts.
    fn patch(&self) -> Result<Vec<(&'static str, Result<PatchOutcome, PatchError>)>> {
        let rules = patch::rules(self.config, &self.output.version(), current_year())?;
        let outcomes = patch::patch(&rules);

        let mut results = Vec::with_capacity(rules.len());
        for (rule, outcome) in rules.iter().zip(outcomes) {
            match &outcome {
                Ok(PatchOutcome::Skipped) => {
                    log!("skip"; "{}: {} not found", rule.name, rule.target.display());
                }
                Ok(_) => {}
                Err(e) if rule.optional => log!("warning"; "{}: {}", rule.name, e),
                Err(_) => return Err(required_failure(rule, outcome)),
            }
            results.push((rule.name, outcome));
        }
        Ok(results)
    }
}

fn required_failure(rule: &PatchRule, outcome: Result<PatchOutcome, PatchError>) -> anyhow::Error {
    match outcome {
        Err(e) => anyhow::Error::new(e).context(format!("Failed to patch {}", rule.name)),
        Ok(_) => anyhow::anyhow!("Failed to patch {}", rule.name),
    }
}

/// Log a non-fatal stage failure and carry on.
fn best_effort<T>(stage: &str, result: StageResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log!("warning"; "{}: {}", stage, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeploymentMode, test_config};
    use crate::error::StageError;
    use std::fs;
    use tempfile::TempDir;

    const ICONS: &[&str] = &[
        "favicon-16x16.png",
        "favicon-32x32.png",
        "android-chrome-192x192.png",
        "android-chrome-512x512.png",
        "mstile-150x150.png",
        "apple-touch-icon-180x180.png",
    ];

    /// A project whose bundler has emitted into `www/build-2.0.1`.
    fn project(icons: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(
            root.join("config.json"),
            r##"{"title":"Demo","version":"2.0.1","iconBackgroundColor":"#112233"}"##,
        )
        .unwrap();
        fs::write(root.join("LICENSE"), "Copyright (c) 2017 scriptPilot\n").unwrap();

        fs::create_dir_all(root.join("icons")).unwrap();
        for name in icons {
            fs::write(root.join("icons").join(name), name.as_bytes()).unwrap();
        }

        let bundle = root.join("www/build-2.0.1");
        fs::create_dir_all(&bundle).unwrap();
        fs::write(bundle.join("app.js"), "console.log(1)").unwrap();
        fs::write(bundle.join("app.js.map"), "{}").unwrap();
        fs::write(bundle.join("i-f7-ios.css"), "").unwrap();
        fs::write(
            root.join("www/.htaccess"),
            "RewriteRule ^(.*)$ /build-1.4.0/$1\nRewriteRule ^$ /build-1.4.0/index.html\n",
        )
        .unwrap();
        tmp
    }

    #[test]
    fn test_end_to_end() {
        let tmp = project(ICONS);
        let config = test_config("", tmp.path());
        let pipeline = Pipeline::new(&config).unwrap();
        let bundle = pipeline.bundle_dir(None, None);

        let report = pipeline.run(&bundle, None).unwrap();
        let out = tmp.path().join("www/build-2.0.1");
        assert_eq!(report.output, pipeline.output().path());

        for name in ["manifest.json", "browserconfig.xml", "manifest.appcache", "app.js"] {
            assert!(out.join(name).exists(), "missing {name}");
        }
        assert!(out.join("apple-touch-icon.png").exists());
        assert!(!out.join("apple-touch-icon-180x180.png").exists());
        assert!(!out.join("i-f7-ios.css").exists());
        assert!(!tmp.path().join("www/.build-2.0.1.staging").exists());

        let rules = fs::read_to_string(tmp.path().join("www/.htaccess")).unwrap();
        assert_eq!(rules.matches("/build-").count(), 2);
        assert_eq!(rules.matches("/build-2.0.1/").count(), 2);

        let license = fs::read_to_string(tmp.path().join("LICENSE")).unwrap();
        assert!(license.contains(&format!("Copyright (c) {} scriptPilot", current_year())));

        let appcache = fs::read_to_string(out.join("manifest.appcache")).unwrap();
        assert!(appcache.contains("\napp.js\n"));
        assert!(!appcache.contains("app.js.map"));
        assert!(!appcache.contains("i-f7-ios"));

        assert_eq!(report.manifest.theme_color, "#112233");
        assert!(report.compression.is_none());
        assert!(report.patches.iter().all(|(_, outcome)| outcome.is_ok()));
    }

    #[test]
    fn test_rerun_reaches_fixed_point() {
        let tmp = project(ICONS);
        let big = "const answer = 42;\n".repeat(2000);
        fs::write(tmp.path().join("www/build-2.0.1/vendor.js"), &big).unwrap();
        let config = test_config("[build.production]\ngzip = true", tmp.path());
        let pipeline = Pipeline::new(&config).unwrap();
        let appcache = tmp.path().join("www/build-2.0.1/manifest.appcache");

        pipeline.run(&pipeline.bundle_dir(None, None), None).unwrap();
        let first = fs::read_to_string(&appcache).unwrap();
        pipeline.run(&pipeline.bundle_dir(None, None), None).unwrap();
        let second = fs::read_to_string(&appcache).unwrap();

        assert_eq!(first, second);
        assert!(second.contains("CACHE:\napp.js\nvendor.js\n\nNETWORK:"));
    }

    #[test]
    fn test_installed_mode_leaves_license() {
        let tmp = project(ICONS);
        let mut config = test_config("", tmp.path());
        config.deploy.mode = DeploymentMode::Installed;
        fs::write(tmp.path().join(".babelrc"), "{}").unwrap();

        let pipeline = Pipeline::new(&config).unwrap();
        let report = pipeline.run(&pipeline.bundle_dir(None, None), None).unwrap();

        assert_eq!(report.patches.len(), 1);
        assert_eq!(
            fs::read_to_string(tmp.path().join("LICENSE")).unwrap(),
            "Copyright (c) 2017 scriptPilot\n"
        );
        assert!(!tmp.path().join(".babelrc").exists());
    }

    #[test]
    fn test_gzip_enabled() {
        let tmp = project(ICONS);
        let big = "const answer = 42;\n".repeat(2000);
        fs::write(tmp.path().join("www/build-2.0.1/vendor.js"), &big).unwrap();
        let config = test_config("[build.production]\ngzip = true", tmp.path());

        let pipeline = Pipeline::new(&config).unwrap();
        let report = pipeline.run(&pipeline.bundle_dir(None, None), None).unwrap();

        let compression = report.compression.unwrap();
        assert_eq!(compression.compressed, 1);
        assert!(report.output.join("vendor.js.gz").exists());
        assert!(!report.output.join("app.js.gz").exists());
    }

    #[test]
    fn test_missing_icon_rolls_back() {
        let without_tile: Vec<_> = ICONS
            .iter()
            .copied()
            .filter(|n| !n.starts_with("mstile-"))
            .collect();
        let tmp = project(&without_tile);
        fs::create_dir_all(tmp.path().join("dist")).unwrap();
        fs::write(tmp.path().join("dist/app.js"), "x").unwrap();
        let config = test_config("", tmp.path());

        let pipeline = Pipeline::new(&config).unwrap();
        let bundle = tmp.path().join("dist");
        let err = pipeline.run(&bundle, None).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StageError>(),
            Some(StageError::MissingIconAsset { .. })
        ));
        assert!(bundle.join("app.js").exists());
        assert!(!tmp.path().join("www/.build-2.0.1.staging").exists());
        // The previous output was not replaced.
        assert!(tmp.path().join("www/build-2.0.1/i-f7-ios.css").exists());
    }

    #[test]
    fn test_required_patch_target_missing() {
        let tmp = project(ICONS);
        fs::remove_file(tmp.path().join("www/.htaccess")).unwrap();
        let config = test_config("[patch]\nrewrite_rules_optional = false", tmp.path());

        let pipeline = Pipeline::new(&config).unwrap();
        let bundle = pipeline.bundle_dir(None, None);
        let err = pipeline.run(&bundle, None).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PatchError>(),
            Some(PatchError::TargetMissing(_))
        ));
        assert!(bundle.join("app.js").exists());
    }

    #[test]
    fn test_bundle_dir_precedence() {
        let tmp = project(ICONS);
        let config = test_config("", tmp.path());
        let pipeline = Pipeline::new(&config).unwrap();
        let stats = BuildStats {
            output_path: Some(PathBuf::from("/from/stats")),
            ..BuildStats::default()
        };

        assert_eq!(
            pipeline.bundle_dir(Some(Path::new("/explicit")), Some(&stats)),
            PathBuf::from("/explicit")
        );
        assert_eq!(pipeline.bundle_dir(None, Some(&stats)), PathBuf::from("/from/stats"));
        assert_eq!(pipeline.bundle_dir(None, None), pipeline.output().path());
    }
}
