use anyhow::{Context, Result};
use clap::Parser;
use reqwest::{Client, StatusCode};
use song_catalog::song::{IdMessage, ListRequest, LyricsRequest, Song};

#[derive(Parser)]
#[command(name = "song-client")]
#[command(about = "Song Catalog CLI Client", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(short, long, default_value = "http://localhost:8080")]
    server: String,

    /// Command to execute
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Parser)]
enum Command {
    /// List songs, optionally filtered
    List {
        /// Case-insensitive part of the song title
        #[arg(long)]
        song: Option<String>,
        /// Case-insensitive part of the group name
        #[arg(long)]
        group: Option<String>,
        /// Exact release date
        #[arg(long)]
        release_date: Option<String>,
        #[arg(long, default_value = "0")]
        offset: u64,
        /// Maximum number of songs, 0 for all
        #[arg(long, default_value = "0")]
        limit: u64,
    },
    /// Add a song
    Add { song: String, group: String },
    /// Replace all fields of a song
    Update {
        id: u64,
        #[arg(long)]
        song: String,
        #[arg(long)]
        group: String,
        #[arg(long, default_value = "")]
        release_date: String,
        #[arg(long, default_value = "")]
        text: String,
        #[arg(long, default_value = "")]
        link: String,
    },
    /// Delete a song
    Delete { id: u64 },
    /// Show one couplet of a song's lyrics
    Lyrics {
        id: u64,
        /// Zero-based couplet number
        #[arg(default_value = "0")]
        couplet: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let server = cli.server.trim_end_matches('/');

    let command = cli.command.unwrap_or(Command::List {
        song: None,
        group: None,
        release_date: None,
        offset: 0,
        limit: 0,
    });

    match command {
        Command::List {
            song,
            group,
            release_date,
            offset,
            limit,
        } => {
            let request = ListRequest {
                offset,
                limit,
                filter: Song {
                    song: song.unwrap_or_default(),
                    group: group.unwrap_or_default(),
                    release_date: release_date.unwrap_or_default(),
                    ..Default::default()
                },
            };
            list_songs(&client, server, &request).await?
        }
        Command::Add { song, group } => add_song(&client, server, &song, &group).await?,
        Command::Update {
            id,
            song,
            group,
            release_date,
            text,
            link,
        } => {
            let song = Song {
                id,
                song,
                group,
                release_date,
                text,
                link,
            };
            update_song(&client, server, &song).await?
        }
        Command::Delete { id } => delete_song(&client, server, id).await?,
        Command::Lyrics { id, couplet } => show_couplet(&client, server, id, couplet).await?,
    }

    Ok(())
}

async fn list_songs(client: &Client, server: &str, request: &ListRequest) -> Result<()> {
    let response = client
        .post(format!("{}/songs", server))
        .json(request)
        .send()
        .await
        .context("Failed to connect to server")?;

    if response.status() == StatusCode::NO_CONTENT {
        println!("No songs found.");
        return Ok(());
    }
    if !response.status().is_success() {
        anyhow::bail!("Server returned error: {}", response.status());
    }

    let songs: Vec<Song> = response.json().await.context("Failed to parse response")?;
    if songs.is_empty() {
        println!("No songs found.");
        return Ok(());
    }

    println!("Songs ({}):", songs.len());
    println!("{:-<80}", "");
    for song in &songs {
        println!("{}. {} - {}", song.id, song.group, song.song);
        if !song.release_date.is_empty() {
            println!("   Released: {}", song.release_date);
        }
        if !song.link.is_empty() {
            println!("   Link:     {}", song.link);
        }
    }

    Ok(())
}

async fn add_song(client: &Client, server: &str, song: &str, group: &str) -> Result<()> {
    let response = client
        .post(format!("{}/song", server))
        .json(&Song::new(song, group))
        .send()
        .await
        .context("Failed to connect to server")?;

    if !response.status().is_success() {
        anyhow::bail!("Server returned error: {}", response.status());
    }

    let IdMessage { id } = response
        .json::<IdMessage>()
        .await
        .context("Failed to parse response")?;
    println!("Created song {}", id);
    Ok(())
}

async fn update_song(client: &Client, server: &str, song: &Song) -> Result<()> {
    let response = client
        .put(format!("{}/song", server))
        .json(song)
        .send()
        .await
        .context("Failed to connect to server")?;

    match response.status() {
        StatusCode::OK => println!("Updated song {}", song.id),
        StatusCode::NOT_FOUND => anyhow::bail!("Song {} not found", song.id),
        status => anyhow::bail!("Server returned error: {}", status),
    }
    Ok(())
}

async fn delete_song(client: &Client, server: &str, id: u64) -> Result<()> {
    let response = client
        .delete(format!("{}/song", server))
        .json(&IdMessage { id })
        .send()
        .await
        .context("Failed to connect to server")?;

    match response.status() {
        StatusCode::OK => println!("Deleted song {}", id),
        StatusCode::NO_CONTENT => println!("Song {} does not exist", id),
        status => anyhow::bail!("Server returned error: {}", status),
    }
    Ok(())
}

async fn show_couplet(client: &Client, server: &str, id: u64, couplet: usize) -> Result<()> {
    let request = LyricsRequest {
        song_id: id,
        couplet_num: couplet,
    };
    let response = client
        .post(format!("{}/lyrics", server))
        .json(&request)
        .send()
        .await
        .context("Failed to connect to server")?;

    match response.status() {
        StatusCode::OK => {
            let text = response.text().await.context("Failed to read lyrics")?;
            println!("{}", text);
        }
        StatusCode::NO_CONTENT => println!("Song {} has no couplet {}", id, couplet),
        StatusCode::NOT_FOUND => anyhow::bail!("Song {} not found", id),
        status => anyhow::bail!("Server returned error: {}", status),
    }
    Ok(())
}
