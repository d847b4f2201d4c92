//! Example client for the narrator backend

use narrator_client::{HttpClient, NarratorApi, UploadFile};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Uses NARRATOR_API_URL, or localhost:8000 when unset
    let client = HttpClient::new()?;
    println!("Narrator API Client Example");
    println!("---------------------------");
    println!("Backend: {}", client.base_url());

    let mut args = std::env::args().skip(1);
    let (Some(voice_sample), Some(text)) = (args.next(), args.next()) else {
        eprintln!("usage: client_example <voice-sample> <text>");
        std::process::exit(2);
    };

    // Clone the voice
    println!("\nCloning voice from {}...", voice_sample);
    let voice_id = client
        .clone_voice(UploadFile::from_path(&voice_sample).await?)
        .await?;
    println!("Voice ID: {}", voice_id);

    // Speak with it
    println!("\nSynthesizing narrator speech...");
    let audio = client.synthesize_narrator_speech(&text, &voice_id).await?;
    audio.write_to("narration.mp3").await?;
    println!("Wrote {} bytes to narration.mp3", audio.len());

    Ok(())
}
