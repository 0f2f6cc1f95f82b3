//! Whole-file JSON persistence of the relation graph.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::{GraphNode, RelationGraph};
use crate::types::{NavError, NavResult, GRAPH_FORMAT_VERSION};

/// On-disk representation of the relation graph.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Format version.
    pub version: u32,
    /// When the document was written.
    pub saved_at: DateTime<Utc>,
    /// All nodes, sorted by id.
    pub nodes: Vec<GraphNode>,
}

#[derive(Serialize)]
struct GraphDocumentRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    nodes: Vec<&'a GraphNode>,
}

/// The single file holding the persisted relation graph.
#[derive(Debug, Clone)]
pub struct GraphFile {
    path: PathBuf,
}

impl GraphFile {
    /// Graph file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the graph, falling back to an empty graph on any failure.
    pub fn load(&self) -> RelationGraph {
        if !self.path.exists() {
            log::warn!("Graph file {} does not exist", self.path.display());
            return RelationGraph::new();
        }
        match self.try_load() {
            Ok(graph) => {
                log::info!(
                    "Loaded graph with {} nodes from {}",
                    graph.node_count(),
                    self.path.display()
                );
                graph
            }
            Err(e) => {
                log::error!("Fail to load graph from {}: {e}", self.path.display());
                RelationGraph::new()
            }
        }
    }

    /// Load the graph, reporting failures.
    pub fn try_load(&self) -> NavResult<RelationGraph> {
        let file = std::fs::File::open(&self.path)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Sibling file a save writes before renaming; the full file name plus `.tmp`.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Replace the file with the current graph.
    ///
    /// Writes a sibling temporary file first and renames it over the target,
    /// so a crash mid-save leaves the previous file intact.
    pub fn save(&self, graph: &RelationGraph) -> NavResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.temp_path();
        {
            let file = std::fs::File::create(&tmp)?;
            let mut writer = std::io::BufWriter::new(file);
            Self::write_to(graph, &mut writer)?;
        }
        std::fs::rename(&tmp, &self.path)?;
        log::debug!(
            "Saved graph with {} nodes to {}",
            graph.node_count(),
            self.path.display()
        );
        Ok(())
    }

    /// Save, logging instead of propagating failures.
    pub fn save_or_log(&self, graph: &RelationGraph) {
        if let Err(e) = self.save(graph) {
            log::error!("Fail to save graph to {}: {e}", self.path.display());
        }
    }

    /// Serialize a graph to any writer.
    pub fn write_to(graph: &RelationGraph, writer: &mut impl Write) -> NavResult<()> {
        let document = GraphDocumentRef {
            version: GRAPH_FORMAT_VERSION,
            saved_at: Utc::now(),
            nodes: graph.sorted_nodes(),
        };
        serde_json::to_writer_pretty(&mut *writer, &document)?;
        writer.flush()?;
        Ok(())
    }

    /// Deserialize a graph from any reader.
    pub fn read_from(reader: &mut impl Read) -> NavResult<RelationGraph> {
        let document: GraphDocument = serde_json::from_reader(reader)?;
        if document.version != GRAPH_FORMAT_VERSION {
            return Err(NavError::UnsupportedVersion(document.version));
        }
        Ok(RelationGraph::from_nodes(document.nodes))
    }
}
