use std::{
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use model::AnalysisResult;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde_json::{Value, json};

#[derive(Parser, Debug)]
#[command(author, version, about = "Drives a running Sightline server")]
struct Args {
    #[arg(long, default_value = "http://localhost:5000")]
    url: String,

    /// Live ticks to walk through
    #[arg(long, default_value_t = 5)]
    ticks: u32,

    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    start: i64,

    /// Also upload this file as the `video` part
    #[arg(long)]
    upload: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = Client::new();
    let endpoint = format!("{}/api/video-analysis", args.url.trim_end_matches('/'));

    walk_live(&client, &endpoint, args.start, args.ticks).await?;

    if let Some(path) = args.upload {
        upload(&client, &endpoint, &path).await?;
    }

    Ok(())
}

/// Stops at `i64::MAX` instead of overflowing.
fn tick_range(start: i64, ticks: u32) -> Range<i64> {
    start..start.saturating_add(i64::from(ticks))
}

async fn walk_live(client: &Client, endpoint: &str, start: i64, ticks: u32) -> Result<()> {
    let pb = ProgressBar::new(ticks as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    for tick in tick_range(start, ticks) {
        pb.set_message(format!("Tick {tick}"));

        let response = client
            .post(endpoint)
            .json(&json!({ "live": true, "tick": tick }))
            .send()
            .await
            .with_context(|| format!("Failed to reach {endpoint}"))?;

        let analysis = read_analysis(response).await?;
        pb.println(format!("[{tick}] {}", describe(&analysis)));

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    Ok(())
}

async fn upload(client: &Client, endpoint: &str, path: &Path) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    println!("Uploading {} ({} bytes)", filename, bytes.len());

    let form = Form::new().part("video", Part::bytes(bytes).file_name(filename));
    let response = client
        .post(endpoint)
        .multipart(form)
        .send()
        .await
        .with_context(|| format!("Failed to reach {endpoint}"))?;

    let analysis = read_analysis(response).await?;
    println!("[upload] {}", describe(&analysis));

    Ok(())
}

/// Lifts `meta.timestamp` to the top level so the body reads as an [`AnalysisResult`].
async fn read_analysis(response: reqwest::Response) -> Result<AnalysisResult> {
    let status = response.status();
    if !status.is_success() {
        bail!("Server answered {status}: {}", response.text().await?);
    }

    let mut body: Value = response.json().await?;
    let timestamp = body
        .pointer_mut("/meta/timestamp")
        .map(Value::take)
        .unwrap_or_default();

    let Some(fields) = body.as_object_mut() else {
        bail!("Analysis response is not a JSON object");
    };
    fields.insert("timestamp".to_string(), timestamp);

    serde_json::from_value(body).context("Unexpected analysis payload")
}

fn describe(analysis: &AnalysisResult) -> String {
    let warnings: Vec<&str> = analysis
        .detected_objects
        .iter()
        .filter(|object| object.warning_flag)
        .map(|object| object.name.as_str())
        .collect();

    if warnings.is_empty() {
        analysis.audio_description.clone()
    } else {
        format!("{} (warn: {})", analysis.audio_description, warnings.join(", "))
    }
}
