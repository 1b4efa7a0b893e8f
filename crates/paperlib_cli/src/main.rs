//! Command-line client for the PaperLib API.

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use paperlib_client::{
    FolderDeletion, HttpLibraryApi, LibraryApi, LibraryController, RestoreOutcome, UploadFile,
};
use paperlib_core::{
    folder_tree,
    models::{
        parse_tag_list, FolderCache, FolderNode, FolderPayload, LibraryStats, MetadataUpdate,
        Paper, UploadMetadata,
    },
    trash::RestoreTarget,
    AppError, BatchOutcome, Config, SearchInput,
};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "plib", about = "PaperLib CLI", version)]
struct Cli {
    /// Server URL (can also be set via PAPERLIB_SERVER env var)
    #[arg(short, long, env = "PAPERLIB_SERVER", global = true)]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds (0 disables the timeout)
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show the folder tree
    Folders,
    /// Create a folder
    FolderCreate {
        name: String,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Rename, re-describe or re-parent a folder
    FolderEdit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "root")]
        parent: Option<String>,
        /// Move the folder to the top level
        #[arg(long)]
        root: bool,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a folder, moving its papers to the trash first
    FolderDelete { id: String },
    /// List folders that may become the parent of a folder
    Parents { id: Option<String> },
    /// List folders a paper can be moved or uploaded into
    Targets,
    /// List papers
    List {
        #[arg(long, conflicts_with_all = ["trash", "category", "tag"])]
        folder: Option<String>,
        #[arg(long, conflicts_with_all = ["category", "tag"])]
        trash: bool,
        #[arg(long, conflicts_with = "tag")]
        category: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Semantic search across paper contents
    Search { query: String },
    /// Show one paper's metadata
    Show { filename: String },
    /// Edit paper metadata
    Edit {
        filename: String,
        #[command(flatten)]
        fields: MetadataArgs,
        #[arg(long)]
        folder: Option<String>,
    },
    /// Move a paper into a folder (omit the folder for the Default Library)
    Move {
        filename: String,
        folder: Option<String>,
    },
    /// Move a paper to the trash
    Delete {
        filename: String,
        /// Delete permanently instead of trashing
        #[arg(long)]
        permanent: bool,
    },
    /// Restore a paper from the trash
    Restore { filename: String },
    /// Permanently delete every paper in the trash
    EmptyTrash,
    /// Upload files; directories upload their immediate files
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        folder: Option<String>,
        #[command(flatten)]
        fields: MetadataArgs,
    },
    /// Show library statistics
    Stats,
}

#[derive(clap::Args, Debug, Default)]
struct MetadataArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    authors: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    category: Option<String>,
    /// Comma or space separated tags
    #[arg(long)]
    tags: Option<String>,
    #[arg(long = "abstract")]
    abstract_text: Option<String>,
}

impl MetadataArgs {
    fn apply_to_update(self, update: &mut MetadataUpdate) {
        if let Some(title) = self.title {
            update.title = title;
        }
        if let Some(authors) = self.authors {
            update.authors = authors;
        }
        if self.year.is_some() {
            update.year = self.year;
        }
        if let Some(category) = self.category {
            update.category = Some(category);
        }
        if let Some(tags) = self.tags {
            update.tags = parse_tag_list(&tags);
        }
        if let Some(abstract_text) = self.abstract_text {
            update.abstract_text = abstract_text;
        }
    }

    fn into_upload(self) -> UploadMetadata {
        UploadMetadata {
            title: self.title.unwrap_or_default(),
            authors: self.authors.unwrap_or_default(),
            year: self.year,
            category: self.category,
            tags: self.tags.as_deref().map(parse_tag_list).unwrap_or_default(),
            abstract_text: self.abstract_text.unwrap_or_default(),
        }
    }
}

struct Output {
    json: bool,
    yes: bool,
}

impl Output {
    fn confirm(&self, prompt: &str) -> bool {
        if self.yes {
            return true;
        }
        let stdin = io::stdin();
        match confirm_with(&mut stdin.lock(), &mut io::stderr(), prompt) {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!("Failed to read confirmation: {}", err);
                false
            }
        }
    }
}

/// Ask a yes/no question; anything but `y`/`yes` is a no.
fn confirm_with<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    prompt: &str,
) -> io::Result<bool> {
    write!(writer, "{} [y/N] ", prompt)?;
    writer.flush()?;
    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("response encoding error")
}

fn format_folder_tree(nodes: &[FolderNode]) -> String {
    folder_tree::flatten(nodes)
        .into_iter()
        .map(|(depth, folder)| format!("{}{} ({})", "  ".repeat(depth), folder.name, folder.id))
        .collect::<Vec<_>>()
        .join("\n")
}

fn folder_label(paper: &Paper, folders: &FolderCache) -> String {
    if paper.is_trashed() {
        let origin = paper
            .original_folder_id
            .as_deref()
            .map(|id| folders.folder_name(id))
            .unwrap_or_else(|| folders.folder_name(paperlib_core::DEFAULT_FOLDER_ID));
        return format!("Trash (from {})", origin);
    }
    folders.folder_name(paper.folder_or_default()).to_string()
}

fn format_paper_rows(papers: &[Paper], folders: &FolderCache) -> String {
    papers
        .iter()
        .map(|paper| {
            format!(
                "{:<32} {:<40} {}",
                paper.filename,
                paper.display_title(),
                folder_label(paper, folders)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_paper_details(paper: &Paper, folders: &FolderCache) -> String {
    let mut lines = vec![
        format!("Title:    {}", paper.display_title()),
        format!("File:     {}", paper.filename),
        format!("Authors:  {}", paper.authors),
        format!(
            "Year:     {}",
            paper.year.map(|y| y.to_string()).unwrap_or_default()
        ),
        format!("Category: {}", paper.category.as_deref().unwrap_or("")),
        format!("Tags:     {}", paper.tags.join(", ")),
        format!("Folder:   {}", folder_label(paper, folders)),
    ];
    if let Some(uploaded) = &paper.upload_date {
        lines.push(format!("Uploaded: {}", uploaded));
    }
    if !paper.abstract_text.is_empty() {
        lines.push(String::new());
        lines.push(paper.abstract_text.clone());
    }
    lines.join("\n")
}

fn format_stats(stats: &LibraryStats) -> String {
    let mut lines = vec![
        format!("Papers:     {}", stats.total_papers),
        format!("Categories: {}", stats.category_count()),
        format!("Tags:       {}", stats.tag_count()),
    ];
    if let Some((first, last)) = stats.year_span() {
        lines.push(format!("Years:      {}-{}", first, last));
    }
    let tags = stats.sorted_tags();
    if !tags.is_empty() {
        lines.push(format!("Tag list:   {}", tags.join(", ")));
    }
    lines.join("\n")
}

fn batch_json(outcome: &BatchOutcome<String>) -> serde_json::Value {
    serde_json::json!({
        "succeeded": outcome.succeeded,
        "failed": outcome
            .failed
            .iter()
            .map(|(key, err)| serde_json::json!({ "item": key, "error": err.to_string() }))
            .collect::<Vec<_>>(),
        "skipped": outcome.skipped,
    })
}

/// Expand directory arguments to the visible files directly inside them.
fn expand_upload_paths(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries = Vec::new();
            for entry in std::fs::read_dir(path)
                .with_context(|| format!("Failed to read directory '{}'", path.display()))?
            {
                let entry_path = entry?.path();
                if entry_path.is_file() && !path_is_hidden(&entry_path) {
                    entries.push(entry_path);
                }
            }
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn resolve_config(mut config: Config, server: Option<&str>, timeout: Option<u64>) -> Config {
    if let Some(server) = server.map(str::trim).filter(|s| !s.is_empty()) {
        config.server_url = paperlib_core::config::normalize_server_url(server);
    }
    if let Some(timeout) = timeout {
        config.timeout_secs = timeout;
    }
    config
}

fn restore_prompt(target: &RestoreTarget) -> String {
    match target {
        RestoreTarget::MissingOriginal { original_folder_id } => format!(
            "Original folder '{}' no longer exists. Restore to Default Library?",
            original_folder_id
        ),
        RestoreTarget::Original(folder_id) => format!("Restore to '{}'?", folder_id),
    }
}

fn print_papers(papers: &[Paper], folders: &FolderCache, out: &Output) -> anyhow::Result<()> {
    if out.json {
        println!("{}", to_json(papers)?);
    } else if papers.is_empty() {
        println!("No papers found");
    } else {
        println!("{}", format_paper_rows(papers, folders));
    }
    Ok(())
}

fn print_batch(action: &str, outcome: &BatchOutcome<String>, out: &Output) -> anyhow::Result<()> {
    if out.json {
        println!("{}", to_json(&batch_json(outcome))?);
    } else {
        println!("{}: {}", action, outcome);
    }
    if !outcome.is_complete() {
        bail!("{} failed for {} item(s)", action, outcome.failed.len());
    }
    Ok(())
}

async fn run<A: LibraryApi>(
    controller: &mut LibraryController<A>,
    command: Commands,
    out: &Output,
) -> anyhow::Result<()> {
    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::Folders => {
            if out.json {
                println!("{}", to_json(controller.folders().as_slice())?);
            } else {
                println!("{}", format_folder_tree(&controller.view().tree()?));
                let orphans = folder_tree::orphans(controller.folders());
                if !orphans.is_empty() {
                    tracing::warn!("{} folder(s) reference a missing parent", orphans.len());
                }
            }
        }
        Commands::FolderCreate {
            name,
            parent,
            description,
        } => {
            let folder = controller
                .create_folder(FolderPayload::new(name, parent, description))
                .await?;
            if out.json {
                println!("{}", to_json(&folder)?);
            } else {
                println!("Created: {} ({})", folder.name, folder.id);
            }
        }
        Commands::FolderEdit {
            id,
            name,
            parent,
            root,
            description,
        } => {
            let existing = controller
                .folders()
                .get(&id)
                .cloned()
                .ok_or_else(|| AppError::MissingFolder {
                    folder_id: id.clone(),
                })?;
            let parent_id = if root {
                None
            } else {
                parent.or(existing.parent_id)
            };
            let payload = FolderPayload::new(
                name.unwrap_or(existing.name),
                parent_id,
                description.unwrap_or(existing.description),
            );
            let folder = controller.update_folder(&id, payload).await?;
            if out.json {
                println!("{}", to_json(&folder)?);
            } else {
                println!("Updated: {} ({})", folder.name, folder.id);
            }
        }
        Commands::FolderDelete { id } => {
            let name = controller.folders().folder_name(&id).to_string();
            if !out.confirm(&format!(
                "Delete folder '{}'? Its papers will be moved to the trash.",
                name
            )) {
                println!("Cancelled");
                return Ok(());
            }
            let FolderDeletion { trashed, deleted } = controller.delete_folder(&id).await?;
            print_batch("Moved to trash", &trashed, out)?;
            if deleted {
                println!("Deleted folder: {}", name);
            }
        }
        Commands::Parents { id } => {
            let choices = controller.parent_choices(id.as_deref())?;
            if out.json {
                println!("{}", to_json(&choices)?);
            } else {
                for folder in choices {
                    println!("{:<36} {}", folder.id, folder.name);
                }
            }
        }
        Commands::Targets => {
            let choices = controller.destination_choices();
            if out.json {
                println!("{}", to_json(&choices)?);
            } else {
                for folder in choices {
                    println!("{:<36} {}", folder.id, folder.name);
                }
            }
        }
        Commands::List {
            folder,
            trash,
            category,
            tag,
        } => {
            if let Some(category) = category {
                controller.filter_by_category(&category).await?;
            } else if let Some(tag) = tag {
                controller.filter_by_tag(&tag).await?;
            } else if trash {
                controller.show_trash().await?;
            } else if let Some(folder) = folder {
                controller.open_folder(&folder).await?;
            } else {
                controller.show_all_papers().await?;
            }
            if !out.json {
                println!("{}", controller.view().title());
            }
            print_papers(controller.papers(), controller.folders(), out)?;
        }
        Commands::Search { query } => match controller.set_search_query(&query).await? {
            SearchInput::Search(_) => {
                print_papers(controller.papers(), controller.folders(), out)?
            }
            SearchInput::Ignored => bail!(AppError::Validation(
                "Search query must be at least 3 characters".to_string()
            )),
            SearchInput::Cleared => {
                bail!(AppError::Validation("Search query is empty".to_string()))
            }
        },
        Commands::Show { filename } => {
            let paper = controller.paper_metadata(&filename).await?;
            if out.json {
                println!("{}", to_json(&paper)?);
            } else {
                println!("{}", format_paper_details(&paper, controller.folders()));
            }
        }
        Commands::Edit {
            filename,
            fields,
            folder,
        } => {
            let paper = controller.paper_metadata(&filename).await?;
            let mut update = MetadataUpdate::from_paper(&paper);
            fields.apply_to_update(&mut update);
            if let Some(folder) = folder {
                update.folder_id = Some(folder);
            }
            controller.update_metadata(&filename, update).await?;
            println!("Updated: {}", filename);
        }
        Commands::Move { filename, folder } => {
            controller.move_paper(&filename, folder.as_deref()).await?;
            let destination = folder.as_deref().unwrap_or(paperlib_core::DEFAULT_FOLDER_ID);
            println!(
                "Moved {} to {}",
                filename,
                controller.folders().folder_name(destination)
            );
        }
        Commands::Delete {
            filename,
            permanent,
        } => {
            let prompt = if permanent {
                format!("Permanently delete '{}'? This cannot be undone.", filename)
            } else {
                format!("Move '{}' to the trash?", filename)
            };
            if !out.confirm(&prompt) {
                println!("Cancelled");
                return Ok(());
            }
            if permanent {
                controller.purge_paper(&filename).await?;
                println!("Deleted: {}", filename);
            } else {
                controller.soft_delete_paper(&filename).await?;
                println!("Moved to trash: {}", filename);
            }
        }
        Commands::Restore { filename } => {
            let outcome = controller
                .restore_paper(&filename, |target| out.confirm(&restore_prompt(target)))
                .await?;
            match outcome {
                RestoreOutcome::Restored { folder_id } => println!(
                    "Restored {} to {}",
                    filename,
                    controller.folders().folder_name(&folder_id)
                ),
                RestoreOutcome::Declined { .. } => {
                    println!("Cancelled; {} stays in the trash", filename)
                }
            }
        }
        Commands::EmptyTrash => {
            if !out.confirm("Permanently delete every paper in the trash?") {
                println!("Cancelled");
                return Ok(());
            }
            let outcome = controller.empty_trash().await?;
            print_batch("Empty trash", &outcome, out)?;
        }
        Commands::Upload {
            paths,
            folder,
            fields,
        } => {
            let mut files = Vec::new();
            for path in expand_upload_paths(&paths)? {
                files.push(UploadFile::from_path(&path).await?);
            }
            if files.is_empty() {
                bail!(AppError::Validation("No files to upload".to_string()));
            }
            let outcome = controller
                .upload_papers(&files, &fields.into_upload(), folder.as_deref())
                .await?;
            print_batch("Upload", &outcome, out)?;
        }
        Commands::Stats => {
            let stats = controller.load_stats().await?;
            if out.json {
                println!("{}", to_json(&stats)?);
            } else {
                println!("{}", format_stats(&stats));
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "paperlib_cli=info,paperlib_client=warn,paperlib_core=warn".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn path_is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {
        server,
        json,
        timeout,
        yes,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_tracing();
    let config = resolve_config(Config::from_env(), server.as_deref(), timeout);
    tracing::debug!("Using server {}", config.server_url);
    let api = HttpLibraryApi::new(&config)?;
    let mut controller = LibraryController::new(api, &config);
    controller.load_folders().await?;

    run(&mut controller, command, &Output { json, yes }).await
}
