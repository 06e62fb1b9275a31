use anyhow::{Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use tokio::task::JoinSet;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://localhost:8000")]
    url: String,

    /// Post to claim.
    #[arg(long)]
    post: i64,

    /// User ids that race for the post, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    claimants: Vec<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = Client::new();
    let endpoint = format!("{}/food-posts/{}/claim", args.url.trim_end_matches('/'), args.post);

    let pb = ProgressBar::new(args.claimants.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut claims = JoinSet::new();
    for claimant in args.claimants {
        let client = client.clone();
        let endpoint = endpoint.clone();

        claims.spawn(async move {
            let response = client
                .post(&endpoint)
                .header("X-User-Id", claimant.to_string())
                .send()
                .await?;
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();

            Ok::<_, reqwest::Error>((claimant, status, body))
        });
    }

    let mut winners = Vec::new();
    while let Some(joined) = claims.join_next().await {
        let (claimant, status, body) = joined??;
        pb.inc(1);

        let detail = body
            .get("detail")
            .or_else(|| body.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        pb.println(format!("User {claimant}: {status} {detail}"));

        if status == StatusCode::OK {
            winners.push(claimant);
        }
    }

    pb.finish_with_message("Done");

    println!("Winners: {winners:?}");

    if winners.len() > 1 {
        bail!("{} claims succeeded on post {}", winners.len(), args.post);
    }

    Ok(())
}
