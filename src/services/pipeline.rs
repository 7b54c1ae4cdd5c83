//! Multi-stage generation jobs
//!
//! The full pipeline is research → script → voice → video → merge, run as a
//! detached task while the client polls. Single-stage video jobs share the
//! same job table and record shape.

use crate::core::router::ProviderRouter;
use crate::core::types::{SpeechRequest, TalkingHeadRequest, TextRequest, VideoRequest};
use crate::services::assembler::Assembler;
use crate::services::prompts;
use crate::services::scraper;
use crate::utils::error::{GatewayError, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

const DEFAULT_VIDEO_PROMPT: &str = "Professional business person in modern office, talking to \
     camera, confident and friendly, corporate setting, high quality, 4K";

/// Stage a job is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Pending,
    Researching,
    Scripting,
    GeneratingVoice,
    GeneratingVideo,
    Merging,
    Completed,
    Failed,
}

/// State of one generation job
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub job_id: String,
    pub status: JobStage,
    /// 0-100
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobRecord {
    fn new(job_id: String) -> Self {
        Self {
            job_id,
            status: JobStage::Pending,
            progress: 0,
            research: None,
            script: None,
            audio_path: None,
            video_path: None,
            final_path: None,
            error: None,
        }
    }
}

/// In-memory job table shared between handlers and background tasks
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: DashMap<String, JobRecord>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh pending job and return its id
    pub fn create(&self) -> String {
        let job_id = Uuid::new_v4().simple().to_string()[..12].to_string();
        self.jobs.insert(job_id.clone(), JobRecord::new(job_id.clone()));
        job_id
    }

    pub fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.jobs.get(job_id).map(|r| r.clone())
    }

    pub fn update(&self, job_id: &str, f: impl FnOnce(&mut JobRecord)) {
        if let Some(mut record) = self.jobs.get_mut(job_id) {
            f(&mut record);
        }
    }

    fn stage(&self, job_id: &str, status: JobStage, progress: u8) {
        self.update(job_id, |job| {
            job.status = status;
            job.progress = progress;
        });
    }

    fn fail(&self, job_id: &str, error: &GatewayError) {
        self.update(job_id, |job| {
            job.status = JobStage::Failed;
            job.error = Some(error.to_string());
        });
    }
}

/// Full-pipeline request
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub company_url: String,
    #[serde(default = "default_product")]
    pub our_product: String,
    #[serde(default = "default_voice")]
    pub voice_id: String,
    #[serde(default = "default_emotion")]
    pub voice_emotion: String,
    /// Custom video prompt; auto-generated when absent
    #[serde(default)]
    pub video_prompt: Option<String>,
    /// Stop after the audio stage
    #[serde(default)]
    pub skip_video: bool,
}

fn default_product() -> String {
    "AI-powered sales automation platform".to_string()
}

fn default_voice() -> String {
    "female-shaonv".to_string()
}

fn default_emotion() -> String {
    "happy".to_string()
}

/// Spawns and drives generation jobs
pub struct PipelineService {
    router: Arc<ProviderRouter>,
    jobs: Arc<JobStore>,
    assembler: Assembler,
    output_dir: PathBuf,
}

impl PipelineService {
    pub fn new(router: Arc<ProviderRouter>, jobs: Arc<JobStore>, output_dir: PathBuf) -> Self {
        Self {
            router,
            jobs,
            assembler: Assembler::new(output_dir.clone()),
            output_dir,
        }
    }

    pub fn jobs(&self) -> &Arc<JobStore> {
        &self.jobs
    }

    /// Start the full pipeline; returns the job id immediately
    pub fn start_generate(&self, request: GenerateRequest) -> String {
        let job_id = self.jobs.create();
        let router = self.router.clone();
        let jobs = self.jobs.clone();
        let assembler = self.assembler.clone();
        let output_dir = self.output_dir.clone();
        let id = job_id.clone();

        tokio::spawn(async move {
            if let Err(e) =
                run_generate(&router, &jobs, &assembler, &output_dir, &id, request).await
            {
                error!(job_id = %id, "pipeline failed: {}", e);
                jobs.fail(&id, &e);
            }
        });

        job_id
    }

    /// Start a single text-to-video job
    pub fn start_video(&self, request: VideoRequest) -> String {
        let job_id = self.jobs.create();
        let router = self.router.clone();
        let jobs = self.jobs.clone();
        let output_dir = self.output_dir.clone();
        let id = job_id.clone();

        tokio::spawn(async move {
            jobs.stage(&id, JobStage::GeneratingVideo, 10);
            let result = async {
                let routed = router.generate_video(&request).await?;
                let path = store_video(&output_dir, &id, &routed.value).await?;
                Ok::<_, GatewayError>(path)
            }
            .await;

            match result {
                Ok(path) => jobs.update(&id, |job| {
                    job.video_path = path.clone();
                    job.final_path = path;
                    job.status = JobStage::Completed;
                    job.progress = 100;
                }),
                Err(e) => {
                    error!(job_id = %id, "video job failed: {}", e);
                    jobs.fail(&id, &e);
                }
            }
        });

        job_id
    }

    /// Start a talking-head job
    pub fn start_talking_head(&self, request: TalkingHeadRequest) -> String {
        let job_id = self.jobs.create();
        let router = self.router.clone();
        let jobs = self.jobs.clone();
        let output_dir = self.output_dir.clone();
        let id = job_id.clone();

        tokio::spawn(async move {
            jobs.stage(&id, JobStage::GeneratingVideo, 10);
            let result = async {
                let routed = router.generate_talking_head(&request).await?;
                let path = store_video(&output_dir, &id, &routed.value).await?;
                Ok::<_, GatewayError>(path)
            }
            .await;

            match result {
                Ok(path) => jobs.update(&id, |job| {
                    job.video_path = path.clone();
                    job.final_path = path;
                    job.status = JobStage::Completed;
                    job.progress = 100;
                }),
                Err(e) => {
                    error!(job_id = %id, "talking-head job failed: {}", e);
                    jobs.fail(&id, &e);
                }
            }
        });

        job_id
    }
}

/// The five pipeline stages, with the same progress milestones the UI polls
async fn run_generate(
    router: &ProviderRouter,
    jobs: &JobStore,
    assembler: &Assembler,
    output_dir: &std::path::Path,
    job_id: &str,
    request: GenerateRequest,
) -> Result<()> {
    // Research
    jobs.stage(job_id, JobStage::Researching, 10);
    let snapshot = scraper::scrape_company(&request.company_url).await;

    let research_prompt = prompts::render_research_prompt(
        &request.company_url,
        snapshot.display_name(),
        &snapshot.prompt_context(),
    );
    let research_text = router
        .generate_text(&TextRequest::new(research_prompt))
        .await?;
    let research = prompts::extract_json(&research_text.value.content)?;
    jobs.update(job_id, |job| {
        job.research = Some(research.clone());
        job.progress = 25;
    });

    // Script
    jobs.stage(job_id, JobStage::Scripting, 25);
    let script_prompt = prompts::render_script_prompt(&research, &request.our_product);
    let script_text = router
        .generate_text(&TextRequest::new(script_prompt).with_max_tokens(1000))
        .await?;
    let script = prompts::clean_script(&script_text.value.content);
    jobs.update(job_id, |job| {
        job.script = Some(script.clone());
        job.progress = 40;
    });

    // Voice
    jobs.stage(job_id, JobStage::GeneratingVoice, 40);
    let mut speech_request = SpeechRequest::new(&script, &request.voice_id);
    speech_request.emotion = Some(request.voice_emotion.clone());
    let speech = router.synthesize_speech(&speech_request).await?;

    let audio_path = output_dir.join(format!("audio_{}.mp3", job_id));
    tokio::fs::write(&audio_path, &speech.value.audio).await?;
    let audio_path_str = audio_path.display().to_string();
    jobs.update(job_id, |job| {
        job.audio_path = Some(audio_path_str.clone());
        job.progress = 60;
    });

    if request.skip_video {
        jobs.update(job_id, |job| {
            job.final_path = Some(audio_path_str);
            job.status = JobStage::Completed;
            job.progress = 100;
        });
        info!(job_id, "pipeline completed (audio only)");
        return Ok(());
    }

    // Video
    jobs.stage(job_id, JobStage::GeneratingVideo, 60);
    let video_prompt = request
        .video_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_VIDEO_PROMPT.to_string());
    let video = router.generate_video(&VideoRequest::new(video_prompt)).await?;
    let video_path = store_video(output_dir, job_id, &video.value).await?;
    jobs.update(job_id, |job| {
        job.video_path = video_path.clone();
        job.progress = 85;
    });

    // Merge
    let final_path = match &video_path {
        Some(video_path) => {
            jobs.stage(job_id, JobStage::Merging, 85);
            let merged = assembler
                .merge_audio_video(
                    &audio_path,
                    std::path::Path::new(video_path),
                    Some(format!("final_{}.mp4", job_id)),
                )
                .await?;
            merged.display().to_string()
        }
        // no video produced, ship the audio
        None => audio_path_str,
    };

    jobs.update(job_id, |job| {
        job.final_path = Some(final_path);
        job.status = JobStage::Completed;
        job.progress = 100;
    });
    info!(job_id, "pipeline completed");
    Ok(())
}

/// Persist a video result to the output directory, returning the path
async fn store_video(
    output_dir: &std::path::Path,
    job_id: &str,
    result: &crate::core::types::VideoResult,
) -> Result<Option<String>> {
    if let Some(video) = &result.video {
        let path = output_dir.join(format!("video_{}.mp4", job_id));
        tokio::fs::write(&path, video).await?;
        return Ok(Some(path.display().to_string()));
    }
    Ok(result
        .video_path
        .as_ref()
        .map(|p| p.display().to_string()))
}
