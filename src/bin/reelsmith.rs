//! reelsmith CLI — submit a production job and watch it run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reelsmith::assemble::FfmpegAssembler;
use reelsmith::capability::ProviderClient;
use reelsmith::config::Config;
use reelsmith::model::{DEFAULT_CLIP_SECONDS, JobId, JobOutput, JobStatus, VoiceSettings};
use reelsmith::pipeline::{Pipeline, ProduceRequest, UgcRequest};
use reelsmith::registry::JobRegistry;
use reelsmith::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "reelsmith", about = "Image in, narrated lip-synced video out")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Produce a narrated, lip-synced video from a source image
    Produce {
        /// Source image path
        image: PathBuf,
        /// Target narration length in seconds
        #[arg(long, default_value_t = 30)]
        duration: u32,
        /// Voice model for narration
        #[arg(long, default_value = "aura-asteria-en")]
        voice: String,
    },
    /// Generate four UGC-style product images
    Ugc {
        /// Person photo path
        person: PathBuf,
        /// Product photo path
        product: PathBuf,
        /// Base intent the prompt variations are built from
        #[arg(long, default_value = "")]
        intent: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "reelsmith".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let caps = Arc::new(ProviderClient::new(&config)?);
    let assembler = Arc::new(FfmpegAssembler);
    let registry = JobRegistry::new();
    let pipeline = Pipeline::new(
        caps,
        assembler,
        registry.clone(),
        config.work_dir.clone(),
        DEFAULT_CLIP_SECONDS,
    );

    let job_id = match cli.command {
        Command::Produce {
            image,
            duration,
            voice,
        } => pipeline.spawn_video(ProduceRequest {
            image,
            target_secs: duration,
            voice: VoiceSettings {
                model: voice,
                ..VoiceSettings::default()
            },
        }),
        Command::Ugc {
            person,
            product,
            intent,
        } => pipeline.spawn_ugc(UgcRequest {
            person_image: person,
            product_image: product,
            intent,
        }),
    };

    println!("Job submitted: {job_id}");
    watch(&registry, job_id).await
}

/// Poll the registry and print progress until the job reaches a terminal
/// status.
async fn watch(registry: &JobRegistry, id: JobId) -> anyhow::Result<()> {
    let mut last_progress = String::new();

    loop {
        let job = registry.get(id)?;

        if job.progress != last_progress {
            println!("[{}] {}", job.status, job.progress);
            last_progress = job.progress.clone();
        }

        match job.status {
            JobStatus::Completed => {
                match job.result {
                    Some(JobOutput::Video {
                        final_video,
                        duration_secs,
                        clips_generated,
                    }) => {
                        println!("Final video: {}", final_video.display());
                        println!("Duration:    {duration_secs:.1}s ({clips_generated} clips)");
                    }
                    Some(JobOutput::Ugc { images }) => {
                        for image in images {
                            println!("Image: {}", image.display());
                        }
                    }
                    None => {}
                }
                return Ok(());
            }
            JobStatus::Failed => {
                anyhow::bail!(
                    "job {id} failed: {}",
                    job.error.as_deref().unwrap_or("unknown error")
                );
            }
            _ => tokio::time::sleep(Duration::from_secs(2)).await,
        }
    }
}
