//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the case file named on the command line
//! 2. Reads it, or mutates it through a checkout or a case entry point
//! 3. Writes the file back atomically when something changed
//! 4. Formats and displays output
//!
//! Read-only commands never write the file.

mod config_cmd;
mod dump;
mod get;
mod init;
mod keys;
mod material;
mod model;
mod scalar;
mod set;
mod validate;

pub use config_cmd::{set as config_set, show as config_show};
pub use dump::dump;
pub use get::get;
pub use init::init;
pub use keys::keys;
pub use material::{
    add as material_add, add_mixture, add_specie, remove as material_remove, set_transport,
};
pub use model::{species as model_species, turbulence as model_turbulence};
pub use scalar::{add as scalar_add, remove as scalar_remove};
pub use set::set;
pub use validate::validate;

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use tracing::debug;

use super::args::{Command, ConfigAction, MaterialAction, ModelAction, ScalarAction};
use crate::case::CaseDb;
use crate::core::config::{write_atomic, Config};
use crate::ui::output::{self, Verbosity};

/// Settings shared by every handler.
#[derive(Debug, Clone)]
pub struct Context {
    pub debug: bool,
    pub quiet: bool,
    /// Flag or config value for loading case files
    pub fill_with_default: bool,
    pub config: Config,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init { file, force } => init::init(ctx, &file, force),
        Command::Validate { file } => validate::validate(ctx, &file),
        Command::Get { file, path } => get::get(ctx, &file, &path),
        Command::Set { file, path, value } => set::set(ctx, &file, &path, &value),
        Command::Dump { file, path, format } => dump::dump(ctx, &file, path.as_deref(), format),
        Command::Keys { file, path } => keys::keys(ctx, &file, &path),
        Command::Material { action } => match action {
            MaterialAction::Add { file, name, phase } => material::add(ctx, &file, &name, phase),
            MaterialAction::AddMixture {
                file,
                name,
                species,
                phase,
            } => material::add_mixture(ctx, &file, &name, &species, phase),
            MaterialAction::AddSpecie {
                file,
                mixture,
                name,
            } => material::add_specie(ctx, &file, &mixture, &name),
            MaterialAction::Remove { file, id } => material::remove(ctx, &file, &id),
            MaterialAction::SetTransport {
                file,
                id,
                specification,
            } => material::set_transport(ctx, &file, &id, specification),
        },
        Command::Scalar { action } => match action {
            ScalarAction::Add {
                file,
                field_name,
                region,
                material,
            } => scalar::add(ctx, &file, &field_name, region.as_deref(), material.as_deref()),
            ScalarAction::Remove { file, id } => scalar::remove(ctx, &file, &id),
        },
        Command::Model { action } => match action {
            ModelAction::Species { file, state } => model::species(ctx, &file, state),
            ModelAction::Turbulence { file, model } => model::turbulence(ctx, &file, model),
        },
        Command::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(ctx),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
        },
    }
}

/// Read and validate a case file.
pub(crate) fn load_case(ctx: &Context, file: &Path) -> Result<CaseDb> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read case file '{}'", file.display()))?;
    let case = CaseDb::from_yaml(&text, ctx.fill_with_default)
        .with_context(|| format!("Invalid case file '{}'", file.display()))?;
    debug!(file = %file.display(), "case loaded");
    Ok(case)
}

/// Write a case file if the live document changed.
pub(crate) fn save_case(ctx: &Context, file: &Path, case: &CaseDb) -> Result<bool> {
    if !case.db().is_modified() {
        output::debug(format!("{} unchanged, not written", file.display()), ctx.verbosity());
        return Ok(false);
    }
    let text = case.to_yaml()?;
    write_atomic(file, &text)
        .with_context(|| format!("Failed to write case file '{}'", file.display()))?;
    debug!(file = %file.display(), "case saved");
    output::debug(format!("wrote {} ({} bytes)", file.display(), text.len()), ctx.verbosity());
    Ok(true)
}
