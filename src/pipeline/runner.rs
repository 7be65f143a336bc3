use std::path::Path;

use tracing::{debug, info_span, warn};

use crate::api::{ImageMetadata, MetadataSource};
use crate::error::{BatchError, ExifError};
use crate::exif::ExifWriter;
use crate::hint::derive_hint;
use crate::scanner::{BatchScanner, ImageRecord};
use crate::storage::{Outcome, OutcomeRouter};

use super::progress::{ProgressEvent, ProgressReporter};
use super::BatchSummary;

/// Seam over the EXIF write step so pipeline tests can observe or
/// suppress the file mutation.
pub trait TagEmbedder: Send + Sync {
    fn embed(&self, image_path: &Path, metadata: &ImageMetadata) -> Result<(), ExifError>;
}

impl TagEmbedder for ExifWriter {
    fn embed(&self, image_path: &Path, metadata: &ImageMetadata) -> Result<(), ExifError> {
        ExifWriter::embed(self, image_path, metadata)
    }
}

/// Drives one batch: enumerate, then per image fetch -> embed -> route,
/// strictly one image at a time in filename order.
pub struct BatchPipeline {
    client: Box<dyn MetadataSource>,
    writer: Box<dyn TagEmbedder>,
}

impl BatchPipeline {
    /// Production constructor.
    pub fn new(client: Box<dyn MetadataSource>) -> Self {
        Self {
            client,
            writer: Box::new(ExifWriter::new()),
        }
    }

    /// Constructor with injected sub-components, used by tests.
    pub fn with_components(client: Box<dyn MetadataSource>, writer: Box<dyn TagEmbedder>) -> Self {
        Self { client, writer }
    }

    /// Runs the batch over `folder`.
    ///
    /// Setup (bucket creation, enumeration) failures and routing failures
    /// are batch-fatal; everything else is absorbed per image. After a
    /// successful run every enumerated image sits in exactly one of
    /// `ready/` or `failed/` and none remain in the folder itself.
    pub fn run(
        &self,
        folder: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<BatchSummary, BatchError> {
        let _batch_span = info_span!("batch", folder = %folder.display()).entered();

        let router = OutcomeRouter::new(folder);
        router.prepare().map_err(BatchError::Setup)?;

        // The batch total is captured once; files added mid-run are not
        // picked up.
        let records = BatchScanner::new(folder).scan()?;
        let total = records.len();
        progress.report(ProgressEvent::Started { total });

        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };

        for (index, record) in records.iter().enumerate() {
            let (outcome, detail) = self.process_image(record);

            // The move is what takes the file out of the source folder; a
            // failure here would leave the image unresolved, so it aborts
            // the batch visibly instead of being absorbed.
            let destination = router
                .route(&record.path, &record.filename, outcome)
                .map_err(|source| BatchError::Route {
                    filename: record.filename.clone(),
                    destination: outcome.dir_name().to_string(),
                    source,
                })?;
            debug!(
                filename = %record.filename,
                destination = %destination.display(),
                "routed image"
            );

            match outcome {
                Outcome::Ready => summary.ready += 1,
                Outcome::Failed => summary.failed += 1,
            }

            progress.report(ProgressEvent::Image {
                filename: record.filename.clone(),
                outcome,
                detail,
                percent: completion_percent(index + 1, total),
            });
        }

        progress.report(ProgressEvent::Completed {
            ready: summary.ready,
            failed: summary.failed,
        });
        Ok(summary)
    }

    /// Resolves one image to a terminal outcome. Every per-image failure
    /// is absorbed here and becomes `Failed` with a reason.
    fn process_image(&self, record: &ImageRecord) -> (Outcome, Option<String>) {
        let _image_span = info_span!("image", filename = %record.filename).entered();

        let hint = derive_hint(&record.filename);

        let metadata = match self.client.fetch_metadata(&record.path, &hint) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Metadata acquisition failed for {}: {}", record.filename, e);
                return (Outcome::Failed, Some(e.to_string()));
            }
        };

        // An empty title or keyword list counts as acquisition failure
        // even on a success response; the EXIF write is skipped entirely.
        if !metadata.is_complete() {
            warn!("Incomplete metadata for {}", record.filename);
            return (
                Outcome::Failed,
                Some("incomplete metadata (missing title or keywords)".to_string()),
            );
        }

        match self.writer.embed(&record.path, &metadata) {
            Ok(()) => (Outcome::Ready, None),
            Err(e) => {
                warn!("EXIF write failed for {}: {}", record.filename, e);
                (Outcome::Failed, Some(e.to_string()))
            }
        }
    }
}

/// Integer completion percentage, 0-100 inclusive. Exact halves round
/// to the nearest even value.
fn completion_percent(processed: usize, total: usize) -> u8 {
    let scaled = processed * 100;
    let floor = scaled / total;
    let remainder = scaled % total;
    let round_up = match (remainder * 2).cmp(&total) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Equal => floor % 2 == 1,
        std::cmp::Ordering::Less => false,
    };
    (floor + round_up as usize) as u8
}
