//! Task registry and dependency resolution.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::{Error, Result};
use crate::task::{Action, Task};

/// File patterns that re-trigger a task once its owner has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSpec {
    pub patterns: Vec<String>,
    pub target: String,
}

/// Registered tasks, kept in registration order.
///
/// Dependencies are not checked when a task is registered; a missing or
/// cyclic dependency surfaces when an invocation resolves its plan.
#[derive(Debug, Default, Clone)]
pub struct TaskGraph {
    tasks: IndexMap<String, Task>,
    watches: IndexMap<String, WatchSpec>,
}

/// Linear execution order for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    root: String,
    order: Vec<String>,
}

impl ExecutionPlan {
    #[inline]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Tasks in execution order; every dependency precedes its dependents.
    #[inline]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a task, replacing any task already registered under `name`.
    ///
    /// Last registration wins: the replacement's action and dependency list
    /// apply to every later invocation. The task keeps the position of its
    /// first registration for ordering purposes.
    pub fn register_task<I, S>(&mut self, name: &str, dependencies: I, action: Arc<dyn Action>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dependencies: Vec<String> = dependencies.into_iter().map(Into::into).collect();
        if self.tasks.contains_key(name) {
            tracing::debug!(task = name, "replacing previously registered task");
        }
        self.tasks
            .insert(name.to_string(), Task::new(name, dependencies, action));
    }

    /// Marks `name` as a watch task: after it succeeds, changes to files
    /// matching `patterns` re-invoke `target`.
    pub fn register_watch<I, S>(&mut self, name: &str, patterns: I, target: &str)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.watches.insert(
            name.to_string(),
            WatchSpec {
                patterns: patterns.into_iter().map(Into::into).collect(),
                target: target.to_string(),
            },
        );
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    #[inline]
    pub fn watch_spec(&self, name: &str) -> Option<&WatchSpec> {
        self.watches.get(name)
    }

    /// Returns all tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn available(&self) -> String {
        self.tasks.keys().cloned().collect::<Vec<_>>().join(", ")
    }

    fn registration_index(&self, name: &str) -> usize {
        self.tasks.get_index_of(name).unwrap_or(usize::MAX)
    }

    /// Dependencies of `name` ordered by registration, not by listing.
    fn ordered_dependencies(&self, name: &str) -> Vec<&str> {
        let mut deps: Vec<&str> = self
            .tasks
            .get(name)
            .map(|task| task.dependencies.iter().map(String::as_str).collect())
            .unwrap_or_default();
        deps.sort_by_key(|dep| self.registration_index(dep));
        deps.dedup();
        deps
    }

    /// Resolves the execution order for `root` and its transitive
    /// dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if `root` is not registered,
    /// [`Error::UnknownDependency`] if any task in the closure names a
    /// missing dependency, and [`Error::Cycle`] if the closure is cyclic.
    pub fn resolve(&self, root: &str) -> Result<ExecutionPlan> {
        if !self.contains(root) {
            return Err(Error::UnknownTask {
                name: root.to_string(),
                available: self.available(),
            });
        }

        let closure = self.closure(root)?;
        self.check_cycles(&closure)?;

        let mut order = Vec::with_capacity(closure.len());
        let mut visited = HashSet::new();

        fn visit<'a>(
            graph: &'a TaskGraph,
            name: &'a str,
            order: &mut Vec<String>,
            visited: &mut HashSet<&'a str>,
        ) {
            if !visited.insert(name) {
                return;
            }
            for dep in graph.ordered_dependencies(name) {
                visit(graph, dep, order, visited);
            }
            order.push(name.to_string());
        }

        visit(self, root, &mut order, &mut visited);

        Ok(ExecutionPlan {
            root: root.to_string(),
            order,
        })
    }

    fn closure<'a>(&'a self, root: &'a str) -> Result<Vec<&'a str>> {
        let mut seen = HashSet::new();
        let mut closure = Vec::new();
        let mut stack = vec![root];

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            closure.push(current);

            let task = self.tasks.get(current).ok_or_else(|| Error::UnknownTask {
                name: current.to_string(),
                available: self.available(),
            })?;

            for dep in &task.dependencies {
                if !self.contains(dep) {
                    return Err(Error::UnknownDependency {
                        task: current.to_string(),
                        dependency: dep.clone(),
                    });
                }
                if !seen.contains(dep.as_str()) {
                    stack.push(dep);
                }
            }
        }

        closure.sort_by_key(|name| self.registration_index(name));
        Ok(closure)
    }

    fn check_cycles(&self, closure: &[&str]) -> Result<()> {
        let mut graph = DiGraph::<&str, ()>::new();
        let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();

        for &name in closure {
            node_map.insert(name, graph.add_node(name));
        }
        for &name in closure {
            for dep in self.ordered_dependencies(name) {
                if let (Some(from), Some(to)) = (node_map.get(name), node_map.get(dep)) {
                    graph.add_edge(*from, *to, ());
                }
            }
        }

        let cycle = match toposort(&graph, None) {
            Ok(_) => return Ok(()),
            Err(cycle) => cycle.node_id(),
        };

        let component: HashSet<NodeIndex> = tarjan_scc(&graph)
            .into_iter()
            .find(|scc| scc.contains(&cycle))
            .map(|scc| scc.into_iter().collect())
            .unwrap_or_else(|| HashSet::from([cycle]));

        let start = component
            .iter()
            .copied()
            .min_by_key(|idx| self.registration_index(graph[*idx]))
            .unwrap_or(cycle);

        Err(Error::Cycle {
            members: cycle_path(&graph, start, &component)
                .into_iter()
                .map(|idx| graph[idx].to_string())
                .collect(),
        })
    }
}

/// Shortest walk from `start` back to itself inside one strongly connected
/// component.
fn cycle_path(
    graph: &DiGraph<&str, ()>,
    start: NodeIndex,
    component: &HashSet<NodeIndex>,
) -> Vec<NodeIndex> {
    let mut parents: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let mut next: Vec<NodeIndex> = graph
            .neighbors_directed(current, Direction::Outgoing)
            .filter(|n| component.contains(n))
            .collect();
        next.sort();

        for neighbor in next {
            if neighbor == start {
                let mut path = vec![current];
                let mut cursor = current;
                while let Some(parent) = parents.get(&cursor) {
                    path.push(*parent);
                    cursor = *parent;
                }
                path.reverse();
                return path;
            }
            if neighbor != start && !parents.contains_key(&neighbor) {
                parents.insert(neighbor, current);
                queue.push_back(neighbor);
            }
        }
    }

    vec![start]
}
