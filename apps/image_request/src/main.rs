use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use clap::Parser;
use client_core::{
    build_payload, load_settings, Base64FileEncoder, ClientSettings, FileBlob, FormEvent,
    FormSession, HttpSubmissionTransport, SubmitOutcome,
};
use shared::domain::{ImageType, Operation};
use tracing_subscriber::EnvFilter;

/// Submit an image to the processing service.
#[derive(Parser, Debug)]
#[command(name = "image-request", version)]
struct Args {
    /// Image to upload.
    #[arg(long)]
    file: PathBuf,
    /// Address the service notifies when the job is done.
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "resize")]
    operation: Operation,
    #[arg(long)]
    width: Option<String>,
    #[arg(long)]
    height: Option<String>,
    /// Target format for `convert`.
    #[arg(long, default_value = "png")]
    to_type: ImageType,
    /// Declared source format. Guessed from the file extension when omitted.
    #[arg(long)]
    image_type: Option<ImageType>,
    /// Overrides IMAGE_API_URL / client.toml.
    #[arg(long)]
    endpoint: Option<String>,
    /// Print the request body instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let settings = match &args.endpoint {
        Some(endpoint) => ClientSettings::new(endpoint)?,
        None => load_settings()?,
    };
    let transport = HttpSubmissionTransport::new(&settings)?;
    let mut session = FormSession::new(Arc::new(transport));
    fill_form(&mut session, &args);

    if args.dry_run {
        let mut payload = build_payload(session.state(), &Base64FileEncoder).await?;
        let file_len = payload.file.len();
        payload.file = format!("<{file_len} base64 chars>");
        println!("POST {}", settings.endpoint);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match session.submit().await {
        SubmitOutcome::Submitted { message } => {
            println!("{message}");
            Ok(())
        }
        SubmitOutcome::Rejected(err) => Err(anyhow!("{err}")),
        SubmitOutcome::Failed | SubmitOutcome::AlreadyInFlight => Err(anyhow!(
            "{}",
            session.state().notification.clone().unwrap_or_default()
        )),
    }
}

fn fill_form(session: &mut FormSession, args: &Args) {
    let image_type = args
        .image_type
        .or_else(|| ImageType::from_path(&args.file))
        .unwrap_or(ImageType::Jpeg);

    let events = [
        FormEvent::FileSelected(Some(FileBlob::Path(args.file.clone()))),
        FormEvent::EmailChanged(args.email.clone()),
        FormEvent::OperationChanged(args.operation),
        FormEvent::ImageTypeChanged(image_type),
        FormEvent::ToTypeChanged(args.to_type),
        FormEvent::WidthChanged(args.width.clone().unwrap_or_default()),
        FormEvent::HeightChanged(args.height.clone().unwrap_or_default()),
    ];
    for event in events {
        session.dispatch(event);
    }
}
