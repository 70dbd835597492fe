//! CLI probe for the note organizer core.
//!
//! # Responsibility
//! - Verify `annotree_core` linkage, config loading and database bootstrap.
//! - Print the stored tree for quick local sanity checks.
//!
//! Usage: `annotree_cli [config.json]`

use annotree_core::db::{open_db, open_db_in_memory};
use annotree_core::{
    core_version, init_logging, ping, AnnotreeConfig, NoteId, NoteKind, NoteRepository,
    NoteTreeService, PathResolver, SqliteNoteRepository,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("annotree_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("annotree_core ping={}", ping());
    println!("annotree_core version={}", core_version());

    let config = match std::env::args().nth(1) {
        Some(path) => AnnotreeConfig::from_json_file(path)?,
        None => AnnotreeConfig::default(),
    };
    if let Some(log_dir) = &config.log_dir {
        let log_dir = log_dir.to_str().ok_or("log_dir must be valid UTF-8")?;
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteNoteRepository::try_new(&conn)?;
    let service = NoteTreeService::open(repo, &config)?;
    info!(
        "event=cli_run module=cli status=ok item_count={}",
        service.store().len()
    );

    println!("annotree_core items={}", service.store().len());
    println!("{}", PathResolver::render(&service.breadcrumb()));
    for line in tree_lines(&service) {
        println!("{line}");
    }
    Ok(())
}

/// Renders the tree as indented lines, siblings sorted by name.
fn tree_lines<R: NoteRepository>(service: &NoteTreeService<R>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Vec<(Option<NoteId>, usize)> = vec![(None, 0)];
    while let Some((parent_id, depth)) = pending.pop() {
        if let Some(id) = parent_id {
            let Some(item) = service.item(id) else {
                continue;
            };
            let marker = match item.kind() {
                NoteKind::Folder => "+",
                NoteKind::File => "-",
            };
            lines.push(format!("{:indent$}{marker} {}", "", item.name, indent = depth * 2));
            if !item.is_folder() {
                continue;
            }
        }
        // Listing order is not guaranteed; sort for stable output. Reversed
        // so the first name is popped first.
        let mut children = service.list(parent_id);
        children.sort_by(|left, right| left.name.cmp(&right.name).then(left.id.cmp(&right.id)));
        pending.extend(children.iter().rev().map(|child| (Some(child.id), depth + 1)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::tree_lines;
    use annotree_core::{AnnotreeConfig, InMemoryNoteRepository, NoteTreeService};

    #[test]
    fn tree_lines_sorts_siblings_and_indents_by_depth() {
        let mut service =
            NoteTreeService::open(InMemoryNoteRepository::new(), &AnnotreeConfig::default())
                .unwrap();
        let drafts = service.create_folder("drafts").unwrap();
        service.create_file("zeta").unwrap();
        service.enter(drafts).unwrap();
        service.create_file("b").unwrap();
        service.create_file("a").unwrap();

        assert_eq!(
            tree_lines(&service),
            vec!["  + drafts", "    - a", "    - b", "  - zeta"]
        );
    }

    #[test]
    fn tree_lines_walks_very_deep_chains() {
        const DEPTH: usize = 60_000;

        let mut service =
            NoteTreeService::open(InMemoryNoteRepository::new(), &AnnotreeConfig::default())
                .unwrap();
        for level in 0..DEPTH {
            let folder = service.create_folder(&format!("level {level}")).unwrap();
            service.enter(folder).unwrap();
        }

        let lines = tree_lines(&service);
        assert_eq!(lines.len(), DEPTH);
        assert_eq!(lines[0], "  + level 0");
        assert!(lines[DEPTH - 1].ends_with(&format!("+ level {}", DEPTH - 1)));
    }
}
