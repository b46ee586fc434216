use std::borrow::Cow;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::config::{CountMode, RunConfig};
use crate::core::library::ReferenceLibrary;
use crate::core::types::ClassificationOutcome;
use crate::counting::counter::{SampleCountTable, SampleCounter};
use crate::counting::stats::percentage;
use crate::matching::{BarcodeResolver, FlankMatcher};
use crate::parsing::reads::{for_each_read, ReadError};
use crate::parsing::samples::SampleInput;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Reference mode requires a reference library")]
    MissingLibrary,

    #[error("Failed to read sample '{sample}': {source}")]
    Read { sample: String, source: ReadError },

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Flank extraction followed by barcode resolution, configured once per run
pub struct Classifier<'a> {
    matcher: FlankMatcher,
    resolver: BarcodeResolver<'a>,
    library: Option<&'a ReferenceLibrary>,
}

impl<'a> Classifier<'a> {
    /// # Errors
    ///
    /// Returns `PipelineError::MissingLibrary` in reference mode without a library.
    pub fn new(
        config: &RunConfig,
        library: Option<&'a ReferenceLibrary>,
    ) -> Result<Self, PipelineError> {
        let resolver = match config.mode {
            CountMode::Reference => BarcodeResolver::Reference {
                library: library.ok_or(PipelineError::MissingLibrary)?,
                max_edits: config.pattern.max_edits(),
            },
            CountMode::ReferenceFree { .. } => BarcodeResolver::ReferenceFree,
        };

        Ok(Self {
            matcher: FlankMatcher::new(&config.pattern),
            resolver,
            library: match config.mode {
                CountMode::Reference => library,
                CountMode::ReferenceFree { .. } => None,
            },
        })
    }

    /// Classify one read; lowercase bases are accepted
    pub fn classify(&self, read: &[u8]) -> ClassificationOutcome {
        let read: Cow<'_, [u8]> = if read.iter().any(u8::is_ascii_lowercase) {
            Cow::Owned(read.to_ascii_uppercase())
        } else {
            Cow::Borrowed(read)
        };
        self.resolver.classify(self.matcher.extract(&read))
    }

    /// A fresh counter matching this classifier's mode
    pub fn counter(&self, sample: &str) -> SampleCounter {
        SampleCounter::new(sample, self.library)
    }
}

/// Classify and count an in-memory read stream
pub fn count_reads<I, S>(sample: &str, reads: I, classifier: &Classifier<'_>) -> SampleCountTable
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut counter = classifier.counter(sample);
    for read in reads {
        counter.record(classifier.classify(read.as_ref()));
    }
    counter.finish()
}

/// Classify and count every read of one sample file.
///
/// If decoding fails part way, the partial counts are discarded.
///
/// # Errors
///
/// Returns `PipelineError::Read` if the read file cannot be decoded.
pub fn count_sample(
    input: &SampleInput,
    classifier: &Classifier<'_>,
) -> Result<SampleCountTable, PipelineError> {
    debug!("Counting barcodes in {}", input.path.display());

    let mut counter = classifier.counter(&input.sample);
    for_each_read(&input.path, |read| counter.record(classifier.classify(read))).map_err(
        |source| PipelineError::Read {
            sample: input.sample.clone(),
            source,
        },
    )?;

    let table = counter.finish();
    log_sample(&table);
    Ok(table)
}

fn log_sample(table: &SampleCountTable) {
    if table.total_reads() == 0 {
        warn!("{}: no reads found", table.sample());
    }
    let rate = |count| {
        percentage(count, table.total_reads())
            .map_or_else(|| "NA".to_string(), |p| format!("{p:.2}%"))
    };
    info!(
        "{}: {} reads, {} matched ({}), {} unmatched ({})",
        table.sample(),
        table.total_reads(),
        table.matched(),
        rate(table.matched()),
        table.unmatched(),
        rate(table.unmatched()),
    );
}

/// Count all samples in parallel, one worker per sample at a time.
///
/// Tables are returned in the order of `samples`. `threads == 0` uses one
/// thread per core.
///
/// # Errors
///
/// Returns the first sample failure; no tables are returned in that case.
pub fn count_samples(
    samples: &[SampleInput],
    config: &RunConfig,
    library: Option<&ReferenceLibrary>,
    threads: usize,
) -> Result<Vec<SampleCountTable>, PipelineError> {
    let classifier = Classifier::new(config, library)?;
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;

    info!(
        "Counting barcodes in {} samples on {} threads",
        samples.len(),
        pool.current_num_threads()
    );

    pool.install(|| {
        samples
            .par_iter()
            .map(|input| count_sample(input, &classifier))
            .collect()
    })
}
