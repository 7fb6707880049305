//! # reelsmith
//!
//! Multi-stage media production pipeline: a source image becomes a narrated,
//! lip-synced video by chaining external generation services (vision/script,
//! text-to-speech, image-to-video, assembly, lip-sync). A second workflow
//! produces UGC-style product images from a person photo and a product photo.
//!
//! The interesting machinery is the asynchronous job orchestration: jobs run
//! out-of-band against slow external services, polled to completion, with a
//! coarse-grained status model readable at any time from the job registry.

pub mod assemble;
pub mod capability;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod poller;
pub mod registry;
pub mod telemetry;
