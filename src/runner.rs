//! One bax2bam run: validate settings, convert, then write the output
//! dataset when an input dataset was given.

use anyhow::Context;
use std::path::PathBuf;
use tracing::{error, info};

use crate::convert::{run_conversion, ConversionOutput};
use crate::core::settings::Settings;
use crate::dataset::synthesis::{write_output_dataset, SynthesisRequest};
use crate::legacy::LegacyFormat;
use crate::utils::ambient::Ambient;

/// Outcome of a run; successful iff `errors` is empty
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub errors: Vec<String>,
    pub output: Option<ConversionOutput>,
    pub dataset: Option<PathBuf>,
}

impl RunReport {
    fn failed(errors: impl IntoIterator<Item = String>) -> Self {
        Self {
            errors: errors.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run a conversion with the given settings.
///
/// Configuration errors stop the run before anything is written; a
/// conversion error stops it before the dataset is written.
#[must_use]
pub fn run(settings: &Settings, format: &dyn LegacyFormat, ambient: &dyn Ambient) -> RunReport {
    if !settings.is_valid() {
        return RunReport::failed(settings.errors.iter().map(ToString::to_string));
    }

    let output = match run_conversion(settings, format) {
        Ok(output) => output,
        Err(e) => {
            error!(error = %e, "Conversion failed");
            return RunReport::failed([e.to_string()]);
        }
    };
    info!(
        path = %output.output_bam.display(),
        records = output.stats.primary_records,
        "Conversion complete"
    );

    let mut report = RunReport {
        output: Some(output),
        ..RunReport::default()
    };

    if let (Some(input), Some(output)) = (&settings.dataset, &report.output) {
        let destination = settings.output_dataset_path();
        let request = SynthesisRequest {
            input,
            profile: settings.profile(),
            output_bam: &output.output_bam,
            scraps_bam: output.scraps_bam.as_deref(),
            destination: &destination,
        };

        match write_output_dataset(&request, ambient).context("could not create output manifest") {
            Ok(path) => report.dataset = Some(path),
            Err(e) => report.errors.push(format!("{e:#}")),
        }
    }

    report
}
