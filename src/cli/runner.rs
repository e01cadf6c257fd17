//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, SortKey};
use crate::collection::{CollectionChange, CollectionLoader, LoadOutcome};
use crate::config::AppConfig;
use crate::discogs::{Label, Release, ReleaseQuery};
use crate::error::{Error, Result};
use crate::types::SortOrder;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        match &self.cli.command {
            Commands::Label { id } => self.label(&config, *id).await,
            Commands::Releases {
                id,
                artist,
                per_page,
                max_pages,
                sort,
                desc,
            } => {
                let query = build_query(
                    *id,
                    *artist,
                    per_page.unwrap_or(config.pagination.per_page),
                    *sort,
                    *desc,
                );
                self.releases(&config, query, *max_pages).await
            }
        }
    }

    /// Load configuration: file (or defaults), then environment, then flags
    fn load_config(&self) -> Result<AppConfig> {
        let config = match &self.cli.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        Ok(config.with_env().with_token(self.cli.token.clone()))
    }

    /// Print label details
    async fn label(&self, config: &AppConfig, id: u64) -> Result<()> {
        let client = config.build_client()?;
        let label = client.label(id).await?;
        match self.cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&label)?),
            OutputFormat::Pretty => print_label(&label),
        }
        Ok(())
    }

    /// Walk a release listing the way a scrolling list does
    ///
    /// Every printed row is reported to the loader, which fetches the next
    /// page once the last loaded row has been shown.
    async fn releases(
        &self,
        config: &AppConfig,
        query: ReleaseQuery,
        max_pages: Option<u32>,
    ) -> Result<()> {
        if max_pages == Some(0) {
            return Err(Error::invalid_value("max_pages", "must be positive"));
        }

        let client = Arc::new(config.build_client()?);
        let loader = CollectionLoader::new(client.clone(), config.loader_config()).with_observer(
            Arc::new(|change: &CollectionChange| debug!(?change, "Collection changed")),
        );

        loader.start(query).await?;
        if let Some(pagination) = loader.pagination() {
            info!(
                items = ?pagination.items,
                pages = ?pagination.pages,
                "Listing has {} item(s) on the first page",
                loader.len()
            );
        }

        let mut pages_loaded = 1;
        let mut index = 0;
        while let Some(release) = loader.item_at(index) {
            self.print_release(index, &release)?;
            index += 1;

            let at_page_cap = max_pages.is_some_and(|max| pages_loaded >= max);
            if at_page_cap && loader.is_last_item(&release) {
                debug!(pages_loaded, "Page limit reached");
                break;
            }

            match loader.on_item_displayed(&release).await? {
                Some(LoadOutcome::Appended { count, .. }) if count > 0 => pages_loaded += 1,
                Some(LoadOutcome::Failed) => {
                    warn!("Stopping after a failed page load");
                    break;
                }
                _ => {}
            }
        }

        info!(
            shown = index,
            pages = pages_loaded,
            exhausted = loader.is_exhausted(),
            "Done"
        );
        if let Some(quota) = client.http().quota() {
            info!(
                remaining = quota.remaining,
                limit = quota.limit,
                "Discogs requests left this minute"
            );
        }
        Ok(())
    }

    fn print_release(&self, index: usize, release: &Release) -> Result<()> {
        match self.cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(release)?),
            OutputFormat::Pretty => println!("{}", format_release(index, release)),
        }
        Ok(())
    }
}

fn build_query(
    id: u64,
    artist: bool,
    per_page: u32,
    sort: Option<SortKey>,
    desc: bool,
) -> ReleaseQuery {
    let query = if artist {
        ReleaseQuery::artist(id)
    } else {
        ReleaseQuery::label(id)
    };
    let query = query.with_per_page(per_page);
    match sort {
        Some(key) => {
            let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
            query.sorted_by(key.into(), order)
        }
        None => query,
    }
}

/// One listing row: position, catalog number, artist, title and year
fn format_release(index: usize, release: &Release) -> String {
    let catno = release.catno.as_deref().unwrap_or("-");
    let title = match &release.artist {
        Some(artist) => format!("{artist} - {}", release.title),
        None => release.title.clone(),
    };
    match release.year {
        Some(year) => format!("{:>5}  {catno:<14} {title} ({year})", index + 1),
        None => format!("{:>5}  {catno:<14} {title}", index + 1),
    }
}

fn print_label(label: &Label) {
    println!("{}", label.name);
    if let Some(contact) = &label.contact_info {
        println!("\n{}", contact.replace("\r\n", "\n"));
    }
    if let Some(profile) = &label.profile {
        println!("\n{profile}");
    }
    if let Some(url) = label.cover_image().and_then(|i| i.resource_url.as_deref()) {
        println!("\nImage: {url}");
    }
    if !label.sublabels.is_empty() {
        let names: Vec<&str> = label.sublabels.iter().map(|l| l.name.as_str()).collect();
        println!("\nSublabels: {}", names.join(", "));
    }
}
