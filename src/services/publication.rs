//! Publication processing service.
//!
//! Decides per publication whether to (re)process it, then runs
//! rasterization, the page pipeline, indexing, metadata lookup, and cleanup.
//! Separated from UI concerns - emits events for progress tracking.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use super::artifacts::{self, PageStructure, PublicationStructure, SearchIndex};
use super::error::ProcessError;
use super::isbn;
use super::metadata::{MetadataResolver, VolumeLookup};
use super::pipeline::{self, PagePipeline};
use super::search;
use crate::config::Config;
use crate::models::{Page, Publication, PublicationStatus, STRUCTURE_FILENAME};
use crate::ocr::{find_page_images, ToolRunner, Toolchain};

/// Events emitted during a batch.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    BatchStarted { total: usize },
    PublicationStarted { id: String },
    PublicationSkipped { id: String },
    PublicationCompleted { id: String, pages: usize, meta: MetaOutcome },
    PublicationFailed { id: String, error: String },
    BatchCancelled { remaining: usize },
}

/// What happened to `meta.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaOutcome {
    /// Metadata generation is turned off.
    Disabled,
    /// An existing file was kept.
    Preserved,
    /// No ISBN-like text in the scan window.
    NoCandidates,
    /// Candidates were found but none matched.
    NoMatch,
    /// Written for this ISBN.
    Matched(String),
}

/// Outcome of one publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicationOutcome {
    Skipped,
    Processed { pages: usize, meta: MetaOutcome },
}

/// Counts for a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub meta_matched: usize,
    pub cancelled: bool,
}

/// Service for processing publications.
pub struct PublicationService<'a> {
    config: &'a Config,
    runner: &'a dyn ToolRunner,
    lookup: &'a dyn VolumeLookup,
    tools: Toolchain,
    output_root: PathBuf,
}

impl<'a> PublicationService<'a> {
    pub fn new(
        config: &'a Config,
        runner: &'a dyn ToolRunner,
        lookup: &'a dyn VolumeLookup,
        output_root: &Path,
    ) -> Self {
        Self {
            config,
            runner,
            lookup,
            tools: Toolchain::from_config(&config.tools),
            output_root: output_root.to_path_buf(),
        }
    }

    /// Process publications one after another.
    ///
    /// `cancel` is checked before each publication. A failure aborts the
    /// batch unless `continue_on_error` is set.
    pub async fn process_all(
        &self,
        publications: &[Publication],
        cancel: &AtomicBool,
        event_tx: mpsc::Sender<ProcessEvent>,
    ) -> Result<BatchResult, ProcessError> {
        let mut result = BatchResult::default();
        let _ = event_tx
            .send(ProcessEvent::BatchStarted {
                total: publications.len(),
            })
            .await;

        for (position, publication) in publications.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                tracing::warn!("Cancelled before {}", publication.source_name());
                result.cancelled = true;
                let _ = event_tx
                    .send(ProcessEvent::BatchCancelled {
                        remaining: publications.len() - position,
                    })
                    .await;
                break;
            }

            let id = publication.id.clone();
            let _ = event_tx
                .send(ProcessEvent::PublicationStarted { id: id.clone() })
                .await;

            match self.process(publication).await {
                Ok(PublicationOutcome::Skipped) => {
                    result.skipped += 1;
                    let _ = event_tx.send(ProcessEvent::PublicationSkipped { id }).await;
                }
                Ok(PublicationOutcome::Processed { pages, meta }) => {
                    result.processed += 1;
                    if matches!(meta, MetaOutcome::Matched(_)) {
                        result.meta_matched += 1;
                    }
                    let _ = event_tx
                        .send(ProcessEvent::PublicationCompleted { id, pages, meta })
                        .await;
                }
                Err(e) => {
                    result.failed += 1;
                    tracing::error!("Failed to process {}: {}", publication.source_name(), e);
                    let _ = event_tx
                        .send(ProcessEvent::PublicationFailed {
                            id,
                            error: e.to_string(),
                        })
                        .await;
                    if !self.config.processing.continue_on_error {
                        return Err(e);
                    }
                }
            }
        }

        Ok(result)
    }

    /// Process a single publication.
    pub async fn process(
        &self,
        publication: &Publication,
    ) -> Result<PublicationOutcome, ProcessError> {
        let options = &self.config.processing;
        let status = publication.status();
        tracing::debug!("{} is {}", publication.id, status.as_str());

        if status == PublicationStatus::Processed && options.ignore_existing {
            tracing::info!("Ignoring {}", publication.source_name());
            return Ok(PublicationOutcome::Skipped);
        }

        tracing::info!("Extracting pages from {}", publication.source_name());
        if status == PublicationStatus::Unprocessed {
            tokio::fs::create_dir_all(&publication.output_dir).await?;
        }

        if options.generate_pngs {
            self.tools
                .rasterizer
                .rasterize(self.runner, &publication.source_path, &publication.output_dir)
                .await?;
        }

        let pages = Page::manifest(
            &publication.output_dir,
            find_page_images(&publication.output_dir)?,
        );
        tracing::debug!("{} has {} pages", publication.id, pages.len());

        PagePipeline::new(self.runner, &self.tools, options)
            .process_pages(&pages, options.page_workers)
            .await?;

        if options.cleanup_pngs {
            pipeline::cleanup_images(&pages).await?;
        }

        if options.generate_pdf_structures {
            artifacts::write_json(
                &publication.structure_path(),
                &PageStructure::from_pages(&pages),
            )
            .await?;
        }

        let texts = load_page_texts(&pages).await?;

        if options.generate_pdf_searches {
            tracing::info!("Generating search indices");
            let counts = search::aggregate(&texts);
            tracing::debug!(
                "{} has {} distinct words in {} tokens",
                publication.id,
                counts.len(),
                counts.total()
            );
            artifacts::write_json(&publication.search_path(), &SearchIndex::new(&counts)).await?;
        }

        if options.generate_structure {
            self.write_publication_structure().await?;
        }

        let meta = if options.generate_meta_from_isbn {
            tracing::info!("Researching ISBN related data");
            self.generate_meta(publication, &texts).await?
        } else {
            MetaOutcome::Disabled
        };

        if options.cleanup_txts {
            pipeline::cleanup_text(&pages).await?;
        }

        Ok(PublicationOutcome::Processed {
            pages: pages.len(),
            meta,
        })
    }

    /// Rewrite the root listing of every publication folder.
    pub async fn write_publication_structure(&self) -> Result<(), ProcessError> {
        let structure = PublicationStructure::scan(&self.output_root)?;
        artifacts::write_json(&self.output_root.join(STRUCTURE_FILENAME), &structure).await
    }

    async fn generate_meta(
        &self,
        publication: &Publication,
        texts: &[String],
    ) -> Result<MetaOutcome, ProcessError> {
        let meta_path = publication.meta_path();
        if self.config.processing.preserve_existing_meta && meta_path.exists() {
            tracing::debug!("Keeping existing {}", meta_path.display());
            return Ok(MetaOutcome::Preserved);
        }

        let candidates = isbn::find_candidates(texts);
        if candidates.is_empty() {
            tracing::info!("No ISBN found in {}", publication.id);
            return Ok(MetaOutcome::NoCandidates);
        }
        tracing::debug!("ISBN candidates for {}: {:?}", publication.id, candidates);

        match MetadataResolver::new(self.lookup)
            .resolve_first(&candidates)
            .await?
        {
            Some(record) => {
                artifacts::write_meta(&meta_path, &record).await?;
                tracing::info!("Matched {} to \"{}\"", publication.id, record.title);
                Ok(MetaOutcome::Matched(record.isbn))
            }
            None => {
                tracing::info!("No metadata match for {}", publication.id);
                Ok(MetaOutcome::NoMatch)
            }
        }
    }
}

/// Read the OCR text of every page that has one, in page order.
pub async fn load_page_texts(pages: &[Page]) -> Result<Vec<String>, ProcessError> {
    let mut texts = Vec::new();
    for page in pages {
        let path = page.text_path();
        if path.exists() {
            texts.push(tokio::fs::read_to_string(&path).await?);
        }
    }
    Ok(texts)
}
