use anyhow::Result;
use clap::Parser;
use futures::future::join_all;
use tracing_subscriber::EnvFilter;

use libs::news::{ArticlePatch, NewArticle};

mod cli;
mod client;
mod view;

use cli::{Cli, Command, NewsCommand};
use client::SiteClient;
use view::{DeleteOutcome, GalleryView};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("LOG_LEVEL"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = SiteClient::new(&cli.url)?;
    client.login(&cli.password).await?;

    match cli.cmd {
        Command::Login => println!("password accepted by {}", cli.url),
        Command::List => print_gallery(&GalleryView::new(client.gallery().await?)),
        Command::Upload { files } => {
            let mut view = GalleryView::new(client.gallery().await?);
            let added = client.upload(&files).await?;
            for img in &added {
                println!("uploaded {} ({}x{})", img.src, img.width, img.height);
            }
            view.replace(client.gallery().await?);
            print_gallery(&view);
        }
        Command::Delete { srcs } => {
            let mut view = GalleryView::new(client.gallery().await?);
            let results = join_all(srcs.iter().map(|src| client.delete(src))).await;
            let outcomes: Vec<_> = srcs
                .into_iter()
                .zip(results)
                .map(|(src, result)| DeleteOutcome {
                    src,
                    result: result.map_err(|e| format!("{e:#}")),
                })
                .collect();

            let failed = view.apply_deletes(&outcomes);
            for f in &failed {
                if let Err(e) = &f.result {
                    eprintln!("could not delete {}: {e}", f.src);
                }
            }
            print_gallery(&view);
            if !failed.is_empty() {
                anyhow::bail!("{} of {} deletes failed", failed.len(), outcomes.len());
            }
        }
        Command::Hero { file } => {
            let url = client.upload_hero(&file).await?;
            println!("hero image is now {url}");
        }
        Command::News(cmd) => run_news(&client, cmd).await?,
    }

    Ok(())
}

async fn run_news(client: &SiteClient, cmd: NewsCommand) -> Result<()> {
    match cmd {
        NewsCommand::List => {
            for a in client.news().await? {
                let state = if a.published { "published" } else { "draft" };
                println!("#{:<4} {} [{state}] {}", a.id, a.date, a.title);
            }
        }
        NewsCommand::Add {
            title,
            content,
            date,
            image,
            publish,
        } => {
            let article = client
                .create_article(&NewArticle {
                    title,
                    content,
                    date,
                    image,
                    published: publish,
                })
                .await?;
            println!("created article #{}", article.id);
        }
        NewsCommand::Publish { id } => set_published(client, id, true).await?,
        NewsCommand::Unpublish { id } => set_published(client, id, false).await?,
        NewsCommand::Remove { id } => {
            client.delete_article(id).await?;
            println!("removed article #{id}");
        }
    }
    Ok(())
}

async fn set_published(client: &SiteClient, id: u64, published: bool) -> Result<()> {
    let patch = ArticlePatch {
        published: Some(published),
        ..ArticlePatch::default()
    };
    let article = client.update_article(id, &patch).await?;
    println!("article #{} published={}", article.id, article.published);
    Ok(())
}

fn print_gallery(view: &GalleryView) {
    for img in view.images() {
        println!("{}  {}x{}  {}", img.src, img.width, img.height, img.alt);
    }
    println!("{} image(s)", view.images().len());
}
