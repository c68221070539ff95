//! Transform command implementation.

use std::io::BufReader;

use asag_data::publish::DOCUMENT_EXTENSION;
use asag_data::{TransformOptions, TransformReport, transform_document};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_INPUT, ARG_OUTPUT, CliError, ENV_INPUT, ENV_OUTPUT};

/// CLI arguments for the `transform` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Convert the stop places, parkings and tariff zones of a \
                 NeTEx export into one GeoJSON FeatureCollection. The input \
                 may be a document or a directory holding an unpacked \
                 export; directories are searched for the first .xml file.",
    about = "Convert a NeTEx export into GeoJSON"
)]
#[ortho_config(prefix = "ASAG")]
pub(crate) struct TransformArgs {
    /// NeTEx document, or a directory containing one.
    #[arg(long = ARG_INPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Destination for the GeoJSON document.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TransformArgs {
    pub(crate) fn into_config(self) -> Result<TransformConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TransformConfig::try_from(merged)
    }
}

/// Resolved `transform` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransformConfig {
    pub(crate) input: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
}

impl TransformConfig {
    /// Locate the document to read: the input itself, or the first
    /// document found below it.
    pub(crate) fn resolve_document(&self) -> Result<Utf8PathBuf, CliError> {
        let is_dir = asag_fs::path_is_dir(&self.input)
            .map_err(|source| inspect_error(&self.input, source))?;
        if !is_dir {
            require_existing(&self.input, ARG_INPUT)?;
            return Ok(self.input.clone());
        }
        asag_fs::find_first_with_extension(&self.input, DOCUMENT_EXTENSION)
            .map_err(|source| inspect_error(&self.input, source))?
            .ok_or_else(|| CliError::NoDocument {
                path: self.input.clone(),
            })
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match asag_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(inspect_error(path, source)),
    }
}

fn inspect_error(path: &Utf8Path, source: std::io::Error) -> CliError {
    if source.kind() == std::io::ErrorKind::NotFound {
        CliError::MissingSourceFile {
            field: ARG_INPUT,
            path: path.to_path_buf(),
        }
    } else {
        CliError::InspectSourcePath {
            field: ARG_INPUT,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl TryFrom<TransformArgs> for TransformConfig {
    type Error = CliError;

    fn try_from(args: TransformArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_INPUT,
        })?;
        let output = args.output.ok_or(CliError::MissingArgument {
            field: ARG_OUTPUT,
            env: ENV_OUTPUT,
        })?;
        Ok(Self { input, output })
    }
}

/// What a transform run read and wrote.
#[derive(Debug, Clone)]
pub(crate) struct TransformSummary {
    pub(crate) document: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
    pub(crate) report: TransformReport,
}

pub(crate) fn run_transform(args: TransformArgs) -> Result<TransformSummary, CliError> {
    let config = args.into_config()?;
    execute_transform(&config, &TransformOptions::default())
}

pub(crate) fn execute_transform(
    config: &TransformConfig,
    options: &TransformOptions,
) -> Result<TransformSummary, CliError> {
    let document = config.resolve_document()?;
    let file = asag_fs::open_utf8_file(&document).map_err(|source| CliError::OpenDocument {
        path: document.clone(),
        source,
    })?;
    let output = transform_document(BufReader::new(file), options).map_err(|source| {
        CliError::Transform {
            path: document.clone(),
            source,
        }
    })?;
    asag_fs::write_file(&config.output, &output.geojson).map_err(|source| {
        CliError::WriteOutput {
            path: config.output.clone(),
            source,
        }
    })?;
    Ok(TransformSummary {
        document,
        output: config.output.clone(),
        report: output.report,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<TransformConfig, CliError> {
    let merged = TransformArgs::merge_from_layers(layers).map_err(CliError::from)?;
    TransformConfig::try_from(merged)
}
