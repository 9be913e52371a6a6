use anyhow::{bail, Context, Result};
use dialoguer::Confirm;
use folio_core::selection::SelectOutcome;
use folio_core::store::ResourceStore;
use folio_core::sync::{MergeDestination, SyncError};
use folio_core::tree::{find_collection, find_item_name, ItemKind};
use tracing::{info, warn};

use crate::app::{render_tree, Folio};
use crate::cli::{AddArgs, AddCommands, Commands, DeleteArgs, EditArgs, InsertArgs, MergeArgs, RenameArgs, ShowArgs, TreeArgs};

pub async fn dispatch<S: ResourceStore>(command: Commands, folio: &mut Folio<S>) -> Result<()> {
    match command {
        Commands::Tree(args) => handle_tree(args, folio).await,
        Commands::Add(args) => handle_add(args, folio).await,
        Commands::Rename(args) => handle_rename(args, folio).await,
        Commands::Delete(args) => handle_delete(args, folio).await,
        Commands::Show(args) => handle_show(args, folio).await,
        Commands::Edit(args) => handle_edit(args, folio).await,
        Commands::Merge(args) => handle_merge(args, folio).await,
        Commands::Insert(args) => handle_insert(args, folio).await,
    }
}

pub async fn handle_tree<S: ResourceStore>(args: TreeArgs, folio: &mut Folio<S>) -> Result<()> {
    folio.load().await;
    let forest = match args.search.as_deref() {
        Some(term) => folio.controller().filtered(term),
        None => folio.controller().forest().to_vec(),
    };

    if forest.is_empty() {
        println!("No collections.");
    } else {
        print!("{}", render_tree(&forest, console::colors_enabled()));
    }
    Ok(())
}

pub async fn handle_add<S: ResourceStore>(args: AddArgs, folio: &mut Folio<S>) -> Result<()> {
    let name = match &args.command {
        AddCommands::Collection { name, .. } | AddCommands::File { name, .. } => name,
    };
    if name.trim().is_empty() {
        bail!("Name must not be blank");
    }

    folio.load().await;
    let controller = folio.controller_mut();

    match args.command {
        AddCommands::Collection { name, parent } => {
            match controller.add_collection(&name, parent.as_deref()).await? {
                Some(id) => println!("Added collection '{name}' ({id})"),
                None => bail!("No collection with id '{}'", parent.unwrap_or_default()),
            }
        }
        AddCommands::File { name, parent } => match controller.add_file(&name, &parent).await? {
            Some(id) => println!("Added file '{name}' ({id})"),
            None => bail!("No collection with id '{parent}'"),
        },
    }
    Ok(())
}

pub async fn handle_rename<S: ResourceStore>(args: RenameArgs, folio: &mut Folio<S>) -> Result<()> {
    folio.load().await;
    let kind = ItemKind::from(args.kind);

    let old_name = find_item_name(folio.controller().forest(), &args.id, kind)
        .map(str::to_string)
        .with_context(|| format!("No {kind} with id '{}'", args.id))?;
    if !folio.controller_mut().rename(&args.id, kind, &args.name).await? {
        bail!("Name must not be blank");
    }
    if old_name == args.name {
        println!("{kind} '{old_name}' already has that name");
    } else {
        println!("Renamed {kind} '{old_name}' to '{}'", args.name);
    }
    Ok(())
}

pub async fn handle_delete<S: ResourceStore>(args: DeleteArgs, folio: &mut Folio<S>) -> Result<()> {
    folio.load().await;
    let kind = ItemKind::from(args.kind);
    let forest = folio.controller().forest();

    let name = find_item_name(forest, &args.id, kind)
        .map(str::to_string)
        .with_context(|| format!("No {kind} with id '{}'", args.id))?;
    let prompt = match kind {
        ItemKind::Collection => {
            let files = find_collection(forest, &args.id).map(|c| c.total_files()).unwrap_or_default();
            format!("Delete collection '{name}' and the {files} file(s) in it?")
        }
        ItemKind::File => format!("Delete file '{name}'?"),
    };
    if !args.yes && !Confirm::new().with_prompt(prompt).default(false).interact()? {
        println!("Cancelled.");
        return Ok(());
    }

    let controller = folio.controller_mut();
    match kind {
        ItemKind::File => {
            controller.delete_file(&args.id).await?;
        }
        ItemKind::Collection => {
            match controller.delete_collection(&args.id).await {
                Ok(_) => {}
                Err(err @ SyncError::Cascade { .. }) => {
                    warn!(error = %err, "Cascade delete interrupted, retrying once");
                    controller
                        .resume_cascade()
                        .await
                        .context("Collection was only partly deleted; run the command again to finish")?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    println!("Deleted {kind} '{name}'");
    Ok(())
}

pub async fn handle_show<S: ResourceStore>(args: ShowArgs, folio: &mut Folio<S>) -> Result<()> {
    let file = folio
        .controller()
        .store()
        .get_file(&args.file_id)
        .await?
        .with_context(|| format!("No file with id '{}'", args.file_id))?;
    print!("{}", file.content);
    Ok(())
}

pub async fn handle_edit<S: ResourceStore>(args: EditArgs, folio: &mut Folio<S>) -> Result<()> {
    let content = tokio::fs::read_to_string(&args.from)
        .await
        .with_context(|| format!("Failed to read {}", args.from.display()))?;

    folio.load().await;
    let mut buffer = folio.open_file(&args.file_id).await?;
    buffer.set_content(content);
    let outcome = buffer.save(folio.controller().store()).await?;
    if !outcome.success {
        warn!(file_id = %args.file_id, "Store did not confirm the save");
    }
    println!("Saved {} bytes to '{}'", buffer.content().len(), args.file_id);
    Ok(())
}

pub async fn handle_merge<S: ResourceStore>(args: MergeArgs, folio: &mut Folio<S>) -> Result<()> {
    folio.load().await;
    let controller = folio.controller_mut();

    controller.begin_merge();
    for file_id in &args.files {
        match controller.select_file(file_id) {
            SelectOutcome::Added(order) => info!(%file_id, order, "Selected for merge"),
            SelectOutcome::Removed => warn!(%file_id, "File listed twice, dropped from the merge"),
            SelectOutcome::Ignored | SelectOutcome::InsertReady(_) => {
                controller.cancel_selection();
                bail!("No file with id '{file_id}'");
            }
        }
    }

    let destination = match (args.into, args.new_collection) {
        (Some(id), _) => MergeDestination::Existing(id),
        (None, Some(name)) => MergeDestination::New {
            name,
            parent_id: args.parent,
        },
        (None, None) => bail!("A destination collection is required"),
    };
    let outcome = controller.execute_merge(destination).await?;
    if !outcome.success {
        warn!(file_id = %outcome.file_id, "Store did not confirm the merged file");
    }
    println!(
        "Merged {} files into '{}' ({}) in collection {}",
        outcome.merged,
        folio_core::compose::MERGED_FILE_NAME,
        outcome.file_id,
        outcome.collection_id
    );
    Ok(())
}

pub async fn handle_insert<S: ResourceStore>(args: InsertArgs, folio: &mut Folio<S>) -> Result<()> {
    folio.load().await;
    let mut buffer = folio.open_file(&args.target).await?;

    let controller = folio.controller_mut();
    for file_id in &args.files {
        controller.begin_insert();
        let SelectOutcome::InsertReady(selection) = controller.select_file(file_id) else {
            controller.cancel_selection();
            bail!("No file with id '{file_id}'");
        };
        controller.execute_insert(&selection, &mut buffer).await?;
    }

    buffer.save(folio.controller().store()).await?;
    println!("Inserted {} file(s) into '{}'", args.files.len(), args.target);
    Ok(())
}
