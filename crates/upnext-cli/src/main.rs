//! `upnext` — a dependency-aware recurring task engine.

mod cli;
mod errors;
mod tracing;

use std::collections::HashMap;

use ::tracing::instrument;
use cli::{Cli, Commands};
use errors::{CliError, CliResult};
use upnext_core::{config, DependencyManager, InMemoryStore, Store};

fn main() -> miette::Result<()> {
    let cli = cli::parse();
    tracing::init_tracing(cli.level, cli.format)?;

    if let Err(error) = run(&cli) {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
    Ok(())
}

#[instrument(skip(cli))]
fn run(cli: &Cli) -> CliResult<()> {
    let source = std::fs::read_to_string(&cli.config).map_err(|source| CliError::Io {
        path: cli.config.display().to_string(),
        source,
    })?;
    let app_config = config::parse_config(&source).map_err(upnext_core::DmError::from)?;
    let store = InMemoryStore::seed_from_config(&app_config);
    let manager = DependencyManager::new();
    manager.load(&store, &app_config)?;

    match &cli.command {
        Commands::Load => {
            println!(
                "loaded {} categories, {} todos",
                store.categories().len(),
                store.todos().len()
            );
        }
        Commands::Recommended => {
            let recommended = manager.recommended_todos(&store);
            let titles: HashMap<i64, String> = store.todos().into_iter().map(|t| (t.id, t.title)).collect();
            for tid in recommended {
                println!("{}", titles.get(&tid).map_or_else(|| tid.to_string(), Clone::clone));
            }
        }
        Commands::Graph { scope } => {
            let projected = manager.dependency_graph((*scope).into(), &store)?;
            let json = serde_json::to_string_pretty(&GraphJson::from(&projected))?;
            println!("{json}");
        }
        Commands::Timeslots => {
            let slots = manager.timeslots(&store);
            for (tid, slot) in slots {
                println!("{tid}: start={:?} end={:?} impossible={}", slot.start, slot.end, slot.impossible);
            }
        }
        Commands::TriggerEvent { name } => {
            store.ensure_event(name);
            store.trigger_event(name);
            println!("triggered event '{name}'");
        }
        Commands::Reload => {
            manager.reload(&store, &app_config)?;
            println!("reloaded");
        }
    }

    Ok(())
}

/// `serde`-friendly mirror of [`upnext_graph::ProjectedGraph`] for CLI JSON
/// output; the graph crate's types don't derive `Serialize` to stay decoupled
/// from a serialization format.
#[derive(serde::Serialize)]
struct GraphJson {
    nodes: Vec<NodeJson>,
    edges: Vec<EdgeJson>,
}

#[derive(serde::Serialize)]
struct NodeJson {
    id: String,
    kind: &'static str,
    label: String,
    border_color: Option<&'static str>,
}

#[derive(serde::Serialize)]
struct EdgeJson {
    from: String,
    to: String,
    kind: &'static str,
}

impl From<&upnext_graph::ProjectedGraph> for GraphJson {
    fn from(graph: &upnext_graph::ProjectedGraph) -> Self {
        Self {
            nodes: graph
                .nodes
                .iter()
                .map(|n| NodeJson {
                    id: n.id.clone(),
                    kind: match n.kind {
                        upnext_graph::NodeKind::Task => "task",
                        upnext_graph::NodeKind::Category => "category",
                        upnext_graph::NodeKind::Control => "control",
                    },
                    label: n.label.clone(),
                    border_color: n.border_color,
                })
                .collect(),
            edges: graph
                .edges
                .iter()
                .map(|e| EdgeJson {
                    from: e.from.clone(),
                    to: e.to.clone(),
                    kind: match e.kind {
                        upnext_graph::EdgeKind::Dependency => "dependency",
                        upnext_graph::EdgeKind::CategoryDependency => "category_dependency",
                        upnext_graph::EdgeKind::Membership => "membership",
                        upnext_graph::EdgeKind::Control => "control",
                    },
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn run_load_reports_counts() {
        let file = write_config(
            r#"
            [[categories]]
            name = "morning"
            [[categories.todos]]
            title = "make bed"
        "#,
        );
        let cli = Cli::try_parse_from(["upnext", "--config", file.path().to_str().unwrap(), "load"]).unwrap();
        assert!(run(&cli).is_ok());
    }

    #[test]
    fn run_recommended_lists_ready_todos() {
        let file = write_config(
            r#"
            [[categories]]
            name = "morning"
            [[categories.todos]]
            title = "make bed"
        "#,
        );
        let cli =
            Cli::try_parse_from(["upnext", "--config", file.path().to_str().unwrap(), "recommended"]).unwrap();
        assert!(run(&cli).is_ok());
    }

    #[test]
    fn run_errors_on_missing_config_file() {
        let cli = Cli::try_parse_from(["upnext", "--config", "/nonexistent/upnext.toml", "load"]).unwrap();
        assert!(run(&cli).is_err());
    }
}
