// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pathnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pathnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pathnav CLI entrypoint.
//!
//! Navigates a headless viewer through a list of identifiers and prints where each one landed.
//! Viewer calls and navigation diagnostics go to stderr through `tracing` (`RUST_LOG`).

use std::error::Error;
use std::sync::Arc;

use pathnav::facade::{DiagramConfig, DiagramHost};
use pathnav::graph::{demo_graph, FixtureGraph};
use pathnav::model::{PlaceHolderId, StableId};
use pathnav::viewer::{DiagramViewer, HeadlessViewer, ViewerSettings};
use tracing_subscriber::EnvFilter;

const PLACE_HOLDER: &str = "diagramHolder";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--graph <file.json> | --demo] [--initial <diagram>] <identifier>...\n\nWithout --graph the built-in demo graph is used.\n--initial loads a diagram before navigating, as if the user had opened it.\n\nEach identifier is a stable id (R-HSA-177934) or a database id (177934)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    demo: bool,
    graph: Option<String>,
    initial: Option<String>,
    identifiers: Vec<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--graph" => {
                if options.graph.is_some() {
                    return Err(());
                }
                options.graph = Some(args.next().ok_or(())?);
            }
            "--initial" => {
                if options.initial.is_some() {
                    return Err(());
                }
                options.initial = Some(args.next().ok_or(())?);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => options.identifiers.push(arg),
        }
    }

    if options.demo && options.graph.is_some() {
        return Err(());
    }

    if options.identifiers.is_empty() && options.initial.is_none() {
        return Err(());
    }

    Ok(options)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pathnav=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn describe(id: Option<&StableId>) -> String {
    id.map_or_else(|| "-".to_owned(), ToString::to_string)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "pathnav".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_tracing();

        let graph = match &options.graph {
            Some(path) => FixtureGraph::from_path(path)?,
            None => demo_graph()?,
        };
        tracing::debug!(objects = graph.len(), "object graph ready");

        let place_holder = PlaceHolderId::new(PLACE_HOLDER)?;
        let initial = options.initial.as_deref().map(StableId::new).transpose()?;

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        runtime.block_on(async move {
            let factory = {
                let place_holder = place_holder.clone();
                move |settings: ViewerSettings| -> Arc<dyn DiagramViewer> {
                    Arc::new(HeadlessViewer::new(settings).with_place_holder(place_holder.clone()))
                }
            };
            let host = DiagramHost::new(factory, Arc::new(graph));
            let diagram = host.create(&DiagramConfig::new(place_holder, 500, 400))?;

            diagram.on_subpathway_selected(|target| println!("sub-pathway selected: {target}"));

            if let Some(initial) = &initial {
                diagram.load_diagram(initial);
            }

            for identifier in options.identifiers {
                diagram.navigate(identifier.as_str());
                diagram.loader().settled().await;

                let snapshot = diagram.loader().snapshot();
                println!(
                    "{identifier}: diagram {}, selected {}",
                    describe(snapshot.loaded_diagram.as_ref()),
                    describe(snapshot.selected_pathway.as_ref()),
                );
            }

            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("pathnav: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values.iter().map(|value| (*value).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_identifiers_in_order() {
        let options = parse_options(args(&["R-HSA-177934", "68877"])).expect("parse options");
        assert_eq!(
            options,
            CliOptions {
                identifiers: vec!["R-HSA-177934".to_owned(), "68877".to_owned()],
                ..CliOptions::default()
            }
        );
    }

    #[test]
    fn parses_graph_and_initial() {
        let options = parse_options(args(&["--graph", "g.json", "--initial", "R-HSA-69278", "x"]))
            .expect("parse options");
        assert_eq!(options.graph.as_deref(), Some("g.json"));
        assert_eq!(options.initial.as_deref(), Some("R-HSA-69278"));
        assert_eq!(options.identifiers, vec!["x"]);
        assert!(!options.demo);
    }

    #[test]
    fn initial_alone_is_enough() {
        let options = parse_options(args(&["--initial", "R-HSA-69278"])).expect("parse options");
        assert!(options.identifiers.is_empty());
    }

    #[test]
    fn parses_demo_flag() {
        let options = parse_options(args(&["--demo", "R-HSA-68886"])).expect("parse options");
        assert!(options.demo);
        assert!(options.graph.is_none());
    }

    #[test]
    fn rejects_nothing_to_do() {
        parse_options(std::iter::empty()).unwrap_err();
        parse_options(args(&["--demo"])).unwrap_err();
    }

    #[test]
    fn rejects_demo_with_graph() {
        parse_options(args(&["--demo", "--graph", "g.json", "x"])).unwrap_err();
    }

    #[test]
    fn rejects_unknown_args() {
        parse_options(args(&["--nope", "x"])).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(args(&["--demo", "--demo", "x"])).unwrap_err();
        parse_options(args(&["--graph", "a", "--graph", "b", "x"])).unwrap_err();
        parse_options(args(&["--initial", "a", "--initial", "b"])).unwrap_err();
    }

    #[test]
    fn rejects_missing_values() {
        parse_options(args(&["x", "--graph"])).unwrap_err();
        parse_options(args(&["x", "--initial"])).unwrap_err();
    }
}
