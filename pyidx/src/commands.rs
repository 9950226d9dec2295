// Command handlers

use crate::cli::{Command, StoreArgs};
use anyhow::{Context, Result};
use colored::Colorize;
use pyidx::{
    expand_inputs, group_distributions, Config, PublishOptions, PublishReport, Publisher, Storage,
    StoreConfig,
};
use pyidx_core::normalize_name;
use pyidx_store::{DryRunStore, ObjectStore};
use tracing::debug;

pub fn execute_command(command: Command, mut config: Config) -> Result<()> {
    match command {
        Command::Upload {
            dists,
            store,
            acl,
            force,
            no_root_index,
            dry_run,
            json,
        } => {
            apply_store_args(&mut config, store);
            if let Some(acl) = acl {
                config.acl = acl;
            }
            config.force |= force;
            if no_root_index {
                config.root_index = false;
            }
            handle_upload(&dists, &config, dry_run, json)
        }
        Command::List {
            package,
            store,
            json,
        } => {
            apply_store_args(&mut config, store);
            handle_list(&package, &config, json)
        }
    }
}

fn apply_store_args(config: &mut Config, args: StoreArgs) {
    if args.bucket.is_some() {
        config.bucket = args.bucket;
    }
    if args.prefix.is_some() {
        config.prefix = args.prefix;
    }
    config.static_website |= args.static_website;
    if let Some(path) = args.store_dir {
        config.store = StoreConfig::Local { path };
    } else if let Some(endpoint) = args.endpoint {
        let timeout_secs = match &config.store {
            StoreConfig::Http { timeout_secs, .. } => *timeout_secs,
            StoreConfig::Local { .. } => 30,
        };
        config.store = StoreConfig::Http {
            endpoint,
            timeout_secs,
        };
    }
}

fn open_store(config: &Config, dry_run: bool) -> Result<Box<dyn ObjectStore>> {
    let store = config.open_store().context("failed to open the bucket")?;
    debug!(backend = store.name(), dry_run, "Opened store");
    if dry_run {
        Ok(Box::new(DryRunStore::new(store)))
    } else {
        Ok(store)
    }
}

fn handle_upload(
    dists: &[std::path::PathBuf],
    config: &Config,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let paths = expand_inputs(dists)?;
    let packages = group_distributions(&paths)?;

    let storage = Storage::new(open_store(config, dry_run)?, config.storage_options());
    let publisher = Publisher::new(
        storage,
        PublishOptions {
            force: config.force,
            root_index: config.root_index,
        },
    );

    let mut reports = Vec::with_capacity(packages.len());
    for package in &packages {
        let report = publisher
            .publish(package)
            .with_context(|| format!("failed to publish {}", package.name))?;
        if !json {
            print_report(&report, dry_run);
        }
        if dry_run && !json {
            println!("{}", "Index that would be written:".dimmed());
            print!("{}", publisher.storage().fetch_index(&report.directory).to_html());
        }
        reports.push(report);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

fn print_report(report: &PublishReport, dry_run: bool) {
    let heading = if dry_run {
        format!("Would publish {}", report.package).yellow().bold()
    } else {
        format!("Published {}", report.package).green().bold()
    };
    println!("{heading} ({})", report.index_key);

    for filename in &report.uploaded {
        println!("  {} {filename}", "uploaded".green());
    }
    for filename in &report.skipped {
        println!("  {} {filename} (already listed)", "skipped".yellow());
    }
    if report.root_index_updated {
        println!("  {} root index", "updated".cyan());
    }
}

fn handle_list(package: &str, config: &Config, json: bool) -> Result<()> {
    let storage = Storage::new(open_store(config, false)?, config.storage_options());
    let directory = normalize_name(package);
    let index = storage.fetch_index(&directory);

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    if index.is_empty() {
        println!("No files listed for {}", directory.bold());
        return Ok(());
    }

    println!("{}", format!("Links for {directory}").bold());
    for (release, links) in index.releases() {
        println!("  {}", release.cyan());
        for link in links {
            match &link.sha256 {
                Some(sha256) => println!("    {} {}", link.filename, sha256.dimmed()),
                None => println!("    {}", link.filename),
            }
        }
    }
    Ok(())
}
