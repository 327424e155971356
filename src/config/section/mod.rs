//! Configuration section definitions.
//!
//! Each module corresponds to a section in `appbake.toml`:
//!
//! | Module    | TOML Section | Purpose                                   |
//! |-----------|--------------|-------------------------------------------|
//! | `build`   | `[build]`    | Layered build options per environment     |
//! | `cleanup` | `[cleanup]`  | Stale artifacts and project dotfiles      |
//! | `deploy`  | `[deploy]`   | Source tree vs installed deployment       |
//! | `icons`   | `[icons]`    | Windows tile metadata                     |
//! | `patch`   | `[patch]`    | License and rewrite-rules patching        |
//! | `paths`   | `[paths]`    | Input and output locations                |

pub mod build;
mod cleanup;
mod deploy;
mod icons;
mod patch;
mod paths;

pub use build::{BuildConfiguration, BuildSectionConfig, Environment, GzipOptions, ResolvedBuild};
pub use cleanup::CleanupConfig;
pub use deploy::{DeployConfig, DeploymentMode};
pub use icons::IconsConfig;
pub use patch::PatchConfig;
pub use paths::PathsConfig;
