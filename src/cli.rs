//! CLI module
//!
//! This module provides the command-line interface for the narrator backend client.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;

use crate::{
    api::{
        client::{API_URL_ENV, DEFAULT_BASE_URL},
        ClientConfig, Credentials, HttpClient, NarratorApi,
    },
    models::{FaceswapInitiation, FaceswapStatus, UploadFile, VoiceId},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL
    #[arg(
        short,
        long,
        global = true,
        env = API_URL_ENV,
        default_value = DEFAULT_BASE_URL
    )]
    server: String,

    /// Do not send or store session cookies
    #[arg(long, global = true)]
    omit_credentials: bool,

    /// Session cookie to send, in `name=value` form (repeatable)
    #[arg(long = "cookie", global = true)]
    cookies: Vec<String>,

    /// Log requests and responses
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a voice sample and clone it
    CloneVoice {
        /// Audio file to upload
        file: PathBuf,

        /// File name to report to the backend (defaults to the file's own name)
        #[arg(long)]
        file_name: Option<String>,
    },

    /// Start a faceswap job for a photo
    Faceswap {
        /// Image file to upload
        image: PathBuf,
    },

    /// Get the status of a faceswap task
    Status {
        /// Task id returned by `faceswap`
        task_id: String,
    },

    /// Synthesize narrator speech with a cloned voice
    Speak {
        /// Voice id returned by `clone-voice`
        #[arg(long)]
        voice_id: String,

        /// Where to write the audio
        #[arg(short, long)]
        output: PathBuf,

        /// Text to speak
        text: String,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Run the CLI application
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let client = create_client(&cli)?;
    execute(&client, &cli.command, &mut io::stdout()).await
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn create_client(cli: &Cli) -> Result<HttpClient, Box<dyn std::error::Error>> {
    let credentials = if cli.omit_credentials {
        Credentials::Omit
    } else {
        Credentials::Include
    };
    let config = ClientConfig::new(cli.server.clone()).with_credentials(credentials);

    let client = HttpClient::with_config(config)?;
    for cookie in &cli.cookies {
        client.add_session_cookie(cookie);
    }

    Ok(client)
}

/// Runs one command against `api`, writing the human-readable result to `out`
async fn execute<W: Write>(
    api: &dyn NarratorApi,
    command: &Commands,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::CloneVoice { file, file_name } => {
            let mut upload = UploadFile::from_path(file).await?;
            if let Some(file_name) = file_name {
                upload = upload.with_file_name(file_name.clone());
            }

            let voice_id = api.clone_voice(upload).await?;
            writeln!(out, "{} {}", "Voice ID:".bold(), voice_id)?;
        }

        Commands::Faceswap { image } => {
            let upload = UploadFile::from_path(image).await?;
            let initiation = api.initiate_faceswap(upload).await?;
            print_initiation(out, &initiation)?;
        }

        Commands::Status { task_id } => {
            let status = api.get_faceswap_status(task_id).await?;
            print_status(out, &status)?;
        }

        Commands::Speak {
            voice_id,
            output,
            text,
        } => {
            let audio = api
                .synthesize_narrator_speech(text, &VoiceId::new(voice_id.clone()))
                .await?;
            audio.write_to(output).await?;

            writeln!(
                out,
                "{} {} bytes ({}) to {}",
                "Wrote".green(),
                audio.len(),
                audio.content_type().unwrap_or("unknown type"),
                output.display()
            )?;
        }

        Commands::Completions { shell } => {
            // Generate completions for the specified shell
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, out);
        }
    }

    Ok(())
}

fn print_initiation<W: Write>(out: &mut W, initiation: &FaceswapInitiation) -> io::Result<()> {
    writeln!(out, "{} {}", "Faceswap:".bold(), initiation.message)?;
    print_field(out, "Task ID", initiation.task_id.as_deref())?;
    print_field(out, "Job ID", initiation.job_id.as_deref())?;
    print_field(out, "Details", initiation.details.as_deref())?;
    print_field(out, "Direct URL", initiation.direct_url.as_deref())?;

    if initiation.task_id.is_none() && initiation.job_id.is_none() {
        writeln!(out, "{}", "No task was created; nothing to poll.".yellow())?;
    }
    Ok(())
}

fn print_status<W: Write>(out: &mut W, status: &FaceswapStatus) -> io::Result<()> {
    let details = &status.status_details;
    writeln!(out, "{} {}", "Task:".bold(), status.task_id)?;
    print_field(
        out,
        "Status code",
        details
            .status_code
            .as_ref()
            .map(|code| code.to_string())
            .as_deref(),
    )?;
    print_field(out, "URL", details.url.as_deref())?;
    print_field(out, "Message", details.message.as_deref())?;
    print_field(out, "Record ID", details.record_id.as_deref())?;

    for (key, value) in &details.extra {
        writeln!(out, "  {}: {}", key, value)?;
    }
    Ok(())
}

fn print_field<W: Write>(out: &mut W, label: &str, value: Option<&str>) -> io::Result<()> {
    match value {
        Some(value) => writeln!(out, "  {}: {}", label, value),
        None => Ok(()),
    }
}
