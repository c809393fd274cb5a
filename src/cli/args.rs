//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--fill-with-default`: Load case files with missing fields defaulted

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::case::{Phase, SpeciesModel, TransportSpecification, TurbulenceModel};
use crate::core::config::OutputFormat;
use crate::core::types::DbEnum;

/// casedb - A schema-validated case database for CFD setups
#[derive(Parser, Debug)]
#[command(name = "casedb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Substitute schema defaults for fields missing from the case file
    #[arg(long, global = true)]
    pub fill_with_default: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new case file
    #[command(
        name = "init",
        long_about = "Create a new case file.\n\n\
            The new case holds one gas material named 'air' and one region \
            'region0' made of it, with a cell zone covering the whole region.",
        after_help = "\
EXAMPLES:
    casedb init case.yaml
    casedb init case.yaml --force     # overwrite an existing file"
    )]
    Init {
        /// Case file to create
        file: PathBuf,

        /// Overwrite the file if it exists
        #[arg(long)]
        force: bool,
    },

    /// Check a case file against the case schema
    Validate {
        /// Case file to check
        file: PathBuf,
    },

    /// Print one value
    #[command(after_help = "\
EXAMPLES:
    casedb get case.yaml materials/1/density
    casedb get case.yaml region/region0/material")]
    Get {
        /// Case file
        file: PathBuf,

        /// Slash-delimited path of a value
        path: String,
    },

    /// Validate and write one value
    #[command(after_help = "\
EXAMPLES:
    casedb set case.yaml materials/1/density 1.2
    casedb set case.yaml region/region0/cellZones/1/zoneType porous")]
    Set {
        /// Case file
        file: PathBuf,

        /// Slash-delimited path of a value
        path: String,

        /// New value
        value: String,
    },

    /// Print the document or a part of it
    Dump {
        /// Case file
        file: PathBuf,

        /// Path of the part to print; the whole document when omitted
        path: Option<String>,

        /// Output format [default: from config, else yaml]
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// List the keys of a collection
    Keys {
        /// Case file
        file: PathBuf,

        /// Path of a collection
        path: String,
    },

    /// Add and remove materials
    Material {
        #[command(subcommand)]
        action: MaterialAction,
    },

    /// Add and remove user-defined scalars
    Scalar {
        #[command(subcommand)]
        action: ScalarAction,
    },

    /// Switch physics models
    #[command(after_help = "\
EXAMPLES:
    casedb model species case.yaml off
    casedb model turbulence case.yaml k-epsilon")]
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or change configuration
    #[command(
        name = "config",
        after_help = "\
KEYS:
    load.fill_with_default    true | false
    output.format             yaml | json"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Material subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum MaterialAction {
    /// Add a single-substance material
    Add {
        /// Case file
        file: PathBuf,

        /// Name; a numeric suffix is added if taken
        name: String,

        /// Phase of the material
        #[arg(long, value_parser = parse_enum::<Phase>, default_value = "gas")]
        phase: Phase,
    },

    /// Add a mixture with its species
    AddMixture {
        /// Case file
        file: PathBuf,

        /// Name of the mixture
        name: String,

        /// Specie names; the first is the primary specie
        #[arg(long = "specie", required = true)]
        species: Vec<String>,

        /// Phase of the mixture
        #[arg(long, value_parser = parse_enum::<Phase>, default_value = "gas")]
        phase: Phase,
    },

    /// Add a specie to a mixture
    AddSpecie {
        /// Case file
        file: PathBuf,

        /// Id of the mixture
        mixture: String,

        /// Name of the specie
        name: String,
    },

    /// Remove a material, a mixture with its species, or a single specie
    Remove {
        /// Case file
        file: PathBuf,

        /// Id of the material or specie
        id: String,
    },

    /// Choose how a material's viscosity is specified
    SetTransport {
        /// Case file
        file: PathBuf,

        /// Id of the material
        id: String,

        /// Viscosity specification
        #[arg(value_parser = parse_enum::<TransportSpecification>)]
        specification: TransportSpecification,
    },
}

/// Scalar subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ScalarAction {
    /// Add a user-defined scalar
    Add {
        /// Case file
        file: PathBuf,

        /// Field name of the scalar
        field_name: String,

        /// Region the scalar is solved in
        #[arg(long)]
        region: Option<String>,

        /// Material id the scalar is bound to
        #[arg(long)]
        material: Option<String>,
    },

    /// Remove a user-defined scalar
    Remove {
        /// Case file
        file: PathBuf,

        /// Id of the scalar
        id: String,
    },
}

/// Model subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ModelAction {
    /// Turn the species model on or off; off removes every mixture
    Species {
        /// Case file
        file: PathBuf,

        /// on | off
        #[arg(value_parser = parse_enum::<SpeciesModel>)]
        state: SpeciesModel,
    },

    /// Select the turbulence model
    Turbulence {
        /// Case file
        file: PathBuf,

        /// laminar | inviscid | spalartAllmaras | k-epsilon | k-omega | des | les
        #[arg(value_parser = parse_enum::<TurbulenceModel>)]
        model: TurbulenceModel,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
}

/// Parse a case enum by value or member name.
fn parse_enum<E: DbEnum>(text: &str) -> Result<E, String> {
    E::parse(text).ok_or_else(|| {
        let values: Vec<&str> = E::members().iter().map(|m| m.value()).collect();
        format!("invalid {} '{text}', must be one of: {}", E::TYPE_NAME, values.join(", "))
    })
}
