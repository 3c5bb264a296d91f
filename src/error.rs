use thiserror::Error;

/// Failures the workflow distinguishes from generic I/O errors.
#[derive(Debug, Error)]
pub enum PraiError {
    #[error(
        "OpenAI API key is not set. Please set it using 'prai config api_key YOUR_API_KEY'\n\
         see: https://platform.openai.com/api-keys"
    )]
    MissingApiKey,

    #[error("unknown configuration key: {0} (expected one of: api_key, language, template, prompt)")]
    UnknownKey(String),

    #[error("{program} {args} exited with status {code}: {stderr}")]
    CommandFailed {
        program: String,
        args: String,
        code: String,
        stderr: String,
    },
}

impl PraiError {
    pub fn command_failed(program: &str, args: &[&str], code: Option<i32>, stderr: &[u8]) -> Self {
        PraiError::CommandFailed {
            program: program.to_string(),
            args: args.join(" "),
            code: code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}
