//! The UGC image sequencer.
//!
//! One prompt-variation call, then four sequential image generations. The
//! sequence is fixed — which capability runs, and how many times, is never
//! decided at runtime.

use std::path::PathBuf;

use tracing::{Instrument, info};

use crate::assemble::MediaAssembler;
use crate::capability::MediaCapabilities;
use crate::error::{Error, Result};
use crate::model::{JobId, JobKind, JobOutput, Stage, UGC_VARIANTS};
use crate::telemetry::job::start_job_span;
use crate::telemetry::metrics;

use super::Pipeline;

const DEFAULT_INTENT: &str = "A person showcasing a product in a natural, engaging way";

/// Inputs for one UGC image batch.
#[derive(Debug, Clone)]
pub struct UgcRequest {
    pub person_image: PathBuf,
    pub product_image: PathBuf,
    /// Base intent the prompt variations are built from. Empty means the
    /// stock intent.
    pub intent: String,
}

impl<C, A> Pipeline<C, A>
where
    C: MediaCapabilities + 'static,
    A: MediaAssembler + 'static,
{
    /// Submit a UGC job. Returns immediately with a queryable id.
    pub fn spawn_ugc(&self, request: UgcRequest) -> JobId {
        let id = self.registry().create(JobKind::Ugc);
        metrics::jobs_submitted().add(1, &[]);

        let pipeline = self.clone();
        tokio::spawn(async move {
            let span = start_job_span("ugc", &id);
            async {
                match pipeline.execute_ugc(id, &request).await {
                    Ok(output) => {
                        let result = pipeline.registry().update(id, |job| {
                            job.set_progress("UGC image batch complete!");
                            job.complete(output)
                        });
                        if let Err(e) = result {
                            pipeline.record_failure(id, &e);
                        } else {
                            info!(job = %id, "ugc batch completed");
                        }
                    }
                    Err(e) => pipeline.record_failure(id, &e),
                }
            }
            .instrument(span)
            .await;
        });

        id
    }

    async fn execute_ugc(&self, id: JobId, request: &UgcRequest) -> Result<JobOutput> {
        // Both inputs must exist before anything is submitted upstream.
        if !request.person_image.exists() {
            return Err(Error::MissingInput(request.person_image.clone()));
        }
        if !request.product_image.exists() {
            return Err(Error::MissingInput(request.product_image.clone()));
        }

        let dir = self.job_dir(id);
        tokio::fs::create_dir_all(&dir).await?;

        let intent = if request.intent.trim().is_empty() {
            DEFAULT_INTENT
        } else {
            request.intent.as_str()
        };

        self.enter_stage(id, Stage::Prompts, "Generating prompt variations...")?;
        let prompts = self.caps.vary_prompts(intent).await?;

        self.enter_stage(id, Stage::Images, "Generating UGC images...")?;
        let mut images: Vec<PathBuf> = Vec::with_capacity(UGC_VARIANTS);
        for (index, prompt) in prompts.iter().enumerate() {
            let dest = dir.join(format!("variant_{}.png", index + 1));
            self.caps
                .generate_ugc_image(&request.person_image, &request.product_image, prompt, &dest)
                .await?;
            images.push(dest);

            self.registry().update(id, |job| {
                job.set_progress(format!("Generated image {}/{UGC_VARIANTS}", index + 1));
                Ok(())
            })?;
        }

        Ok(JobOutput::Ugc { images })
    }
}
