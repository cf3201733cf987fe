//! The build engine: a single-threaded, pre-order depth-first traversal
//! of the target graph that recomputes staleness from file modification
//! times and drives the shell driver.
//!
//! The distilled contract is `execute(name, parent_update_pending: &mut
//! Option<bool>)`; this implementation returns the local `update_pending`
//! flag directly (`Result<bool>`) instead of writing it through an
//! out-parameter; the caller folds it into its own flag with `|=`. This
//! is the same propagation the source performs, expressed the way Rust
//! expects values to flow — see DESIGN.md.
//!
//! No memoization: a diamond dependency is visited once per edge, exactly
//! as in the source. No cycle detection: the target graph is trusted to
//! be acyclic; a cycle recurses until the stack is exhausted. Both are
//! explicit non-goals, not oversights.

use std::path::Path;
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::cli::Verbosity;
use crate::error::{Error, Result, SemanticErrorKind};
use crate::model::Model;
use crate::world::{CommandOutcome, World};

pub struct Engine<'a> {
    model: &'a Model,
    world: &'a dyn World,
    quiet: bool,
    verbosity: Verbosity,
}

impl<'a> Engine<'a> {
    pub fn new(model: &'a Model, world: &'a dyn World, quiet: bool, verbosity: Verbosity) -> Self {
        Self {
            model,
            world,
            quiet,
            verbosity,
        }
    }

    /// Build the declared build root. Fails if none was set.
    pub fn build(&self) -> Result<()> {
        let root = self
            .model
            .build_root
            .get()
            .ok_or(Error::Semantic(SemanticErrorKind::NoBuildTarget))?;
        self.execute(root)?;
        Ok(())
    }

    /// Bring `name` up to date, returning whether anything was (or needed
    /// to be) rebuilt.
    fn execute(&self, name: &str) -> Result<bool> {
        let path = Path::new(name);
        let exists = self.world.exists(path);
        let mut update_pending = !exists;

        let Some(entry) = self.model.targets.lookup(name) else {
            // A leaf dependency: either a real file (fine) or nothing at
            // all (fatal — the caller's `needs_update` check never runs
            // for it).
            if !exists {
                return Err(Error::Semantic(SemanticErrorKind::UnresolvedDependency {
                    target: name.to_string(),
                    dep: name.to_string(),
                }));
            }
            debug!(target = name, "leaf dependency present on disk");
            return Ok(update_pending);
        };

        if entry.deps.is_empty() && entry.commands.is_empty() {
            return Err(Error::Semantic(SemanticErrorKind::EmptyTarget(
                name.to_string(),
            )));
        }

        for dep in &entry.deps {
            let dep_rebuilt = self.execute(dep)?;
            update_pending |= dep_rebuilt;
            if self.needs_update(name, dep) {
                update_pending = true;
            }
        }

        if update_pending {
            info!(target = name, "rebuilding");
            for command in &entry.commands {
                if !self.quiet {
                    println!("{command}");
                }
                match self.world.run(command) {
                    Ok(CommandOutcome::Success) => {}
                    Ok(CommandOutcome::NonZero(code)) => {
                        return Err(Error::ChildFailure {
                            command: command.clone(),
                            code,
                        });
                    }
                    Err(source) => {
                        return Err(Error::SpawnFailed {
                            command: command.clone(),
                            source,
                        });
                    }
                }
            }
            if !self.world.exists(path) {
                return Err(Error::PostBuildMissing(name.to_string()));
            }
        } else {
            info!(target = name, "up to date");
            // Matches the original's `LOGV("Target \"%s\" is up to date",
            // ...)`: gated on verbosity alone, independent of `-q`.
            if self.verbosity.is_verbose() {
                println!("Target \"{name}\" is up to date");
            }
        }

        Ok(update_pending)
    }

    /// Staleness oracle: `dep` is newer than `target`, or either is
    /// missing.
    fn needs_update(&self, target: &str, dep: &str) -> bool {
        let outcome = match (self.mtime(target), self.mtime(dep)) {
            (Some(t), Some(d)) => d > t,
            _ => true,
        };
        if outcome {
            warn!(target, dep, "dependency is newer or unreadable");
        }
        outcome
    }

    fn mtime(&self, name: &str) -> Option<SystemTime> {
        self.world.mtime(Path::new(name)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::testutil::MockWorld;

    #[test]
    fn hello_scenario_runs_one_command() {
        let model = parse(
            r#"
            build hello
            target hello {
              created using { echo hi > hello }
            }
            "#
            .to_string(),
        )
        .unwrap();
        let world = MockWorld::new();
        Engine::new(&model, &world, true, Verbosity::Normal)
            .build()
            .unwrap();
        assert_eq!(world.take_log(), vec!["echo hi > hello".to_string()]);
        assert!(world.exists(Path::new("hello")));
    }

    #[test]
    fn incremental_rerun_executes_nothing() {
        let model = parse(
            r#"
            build hello
            target hello {
              created using { echo hi > hello }
            }
            "#
            .to_string(),
        )
        .unwrap();
        let world = MockWorld::new();
        Engine::new(&model, &world, true, Verbosity::Normal)
            .build()
            .unwrap();
        world.take_log();
        Engine::new(&model, &world, true, Verbosity::Normal)
            .build()
            .unwrap();
        assert!(world.take_log().is_empty());
    }

    #[test]
    fn dep_rebuild_runs_in_order() {
        let model = parse(
            r#"
            build app
            target app {
              depends on { a.o }
              created using { cat a.o > app }
            }
            target a.o {
              depends on { a.c }
              created using { cp a.c a.o }
            }
            "#
            .to_string(),
        )
        .unwrap();
        let world = MockWorld::new();
        world.touch_file("a.c");
        Engine::new(&model, &world, true, Verbosity::Normal)
            .build()
            .unwrap();
        assert_eq!(
            world.take_log(),
            vec!["cp a.c a.o".to_string(), "cat a.o > app".to_string()]
        );
    }

    #[test]
    fn stale_dependency_forces_rebuild() {
        let model = parse(
            r#"
            build app
            target app {
              depends on { a.o }
              created using { cat a.o > app }
            }
            target a.o {
              created using { touch a.o }
            }
            "#
            .to_string(),
        )
        .unwrap();
        let world = MockWorld::new();
        world.touch_file("app");
        world.touch_file("a.o");
        world.advance_epoch();
        world.touch_file("a.o");
        Engine::new(&model, &world, true, Verbosity::Normal)
            .build()
            .unwrap();
        assert_eq!(world.take_log(), vec!["cat a.o > app".to_string()]);
    }

    #[test]
    fn nonzero_exit_is_fatal() {
        let model = parse(
            r#"
            build hello
            target hello {
              created using { false }
            }
            "#
            .to_string(),
        )
        .unwrap();
        let world = MockWorld::new();
        world.set_exit_code("false", 7);
        let err = Engine::new(&model, &world, true, Verbosity::Normal)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::ChildFailure { code: 7, .. }));
    }

    #[test]
    fn unresolved_dependency_is_fatal() {
        let model = parse(
            r#"
            build app
            target app {
              depends on { missing.c }
              created using { echo never }
            }
            "#
            .to_string(),
        )
        .unwrap();
        let world = MockWorld::new();
        let err = Engine::new(&model, &world, true, Verbosity::Normal)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Semantic(_)));
    }

    #[test]
    fn missing_build_target_is_fatal() {
        let model = parse(
            r#"
            target lonely { created using { echo hi } }
            "#
            .to_string(),
        )
        .unwrap();
        let world = MockWorld::new();
        let err = Engine::new(&model, &world, true, Verbosity::Normal)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Semantic(SemanticErrorKind::NoBuildTarget)
        ));
    }
}
