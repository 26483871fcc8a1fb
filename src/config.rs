use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub interview: InterviewConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct InterviewConfig {
    /// Countdown allotted to each question, in seconds
    pub seconds_per_question: u32,

    /// Optional JSON question bank; the built-in prompts are used when absent
    pub questions_path: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "interview-coach".to_string(),
            },
            interview: InterviewConfig {
                seconds_per_question: 180,
                questions_path: None,
            },
        }
    }
}
