//! Rewiring of input plugs.

use log::{debug, warn};

use super::Graph;
use crate::error::{GraphError, GraphResult};
use crate::model::PlugId;

impl Graph {
    /// Connects `source` to the input `destination`, replacing any previous
    /// connection. Returns the dirtied plugs.
    pub fn connect(&mut self, source: PlugId, destination: PlugId) -> GraphResult<Vec<PlugId>> {
        self.set_input(destination, Some(source))
    }

    /// Clears the input connection of `destination`.
    pub fn disconnect(&mut self, destination: PlugId) -> GraphResult<Vec<PlugId>> {
        self.set_input(destination, None)
    }

    /// Sets or clears the single upstream source of an input plug.
    ///
    /// Invalid connections are rejected before anything changes.
    pub fn set_input(
        &mut self,
        destination: PlugId,
        source: Option<PlugId>,
    ) -> GraphResult<Vec<PlugId>> {
        let previous = self.plug_record(destination)?.input;
        if previous == source {
            return Ok(Vec::new());
        }
        if let Some(source) = source {
            if let Err(e) = self.validate_connection(source, destination) {
                warn!("Rejected connection: {}", e);
                return Err(e);
            }
        } else if !self.plug_record(destination)?.is_input() {
            return Err(GraphError::invalid_connection(format!(
                "{} is an output",
                self.plug_path(destination)
            )));
        }

        let dirtied = self.collect_dirty(&[destination])?;

        if let Some(previous) = previous {
            self.plug_record_mut(previous)?
                .outputs
                .retain(|&p| p != destination);
        }
        if let Some(source) = source {
            self.plug_record_mut(source)?.outputs.push(destination);
            debug!(
                "Connected {} -> {}",
                self.plug_path(source),
                self.plug_path(destination)
            );
        } else {
            debug!("Disconnected {}", self.plug_path(destination));
        }
        self.plug_record_mut(destination)?.input = source;

        self.mark_dirty(&dirtied);
        Ok(dirtied)
    }

    /// Validates a connection before adding it.
    ///
    /// Checks:
    /// - Both plugs exist
    /// - The destination is an input
    /// - No self-connections
    /// - Compatible types
    /// - No cycles through connections and affects declarations
    fn validate_connection(&self, source: PlugId, destination: PlugId) -> GraphResult<()> {
        let src = self.plug_record(source)?;
        let dst = self.plug_record(destination)?;

        if !dst.is_input() {
            return Err(GraphError::invalid_connection(format!(
                "{} is an output",
                self.plug_path(destination)
            )));
        }
        if src.node == dst.node {
            return Err(GraphError::invalid_connection(format!(
                "cannot connect {} to its own node",
                self.plug_path(source)
            )));
        }
        if !dst.definition.data_type.accepts(src.definition.data_type) {
            return Err(GraphError::invalid_connection(format!(
                "{} ({}) cannot feed {} ({})",
                self.plug_path(source),
                src.definition.data_type,
                self.plug_path(destination),
                dst.definition.data_type
            )));
        }
        if self.reaches(destination, source)? {
            return Err(GraphError::invalid_connection(format!(
                "connecting {} -> {} would create a cycle",
                self.plug_path(source),
                self.plug_path(destination)
            )));
        }
        Ok(())
    }

    /// The upstream source of `plug`, if connected.
    pub fn input(&self, plug: PlugId) -> GraphResult<Option<PlugId>> {
        Ok(self.plug_record(plug)?.input)
    }

    /// Plugs fed by `plug`.
    pub fn outputs(&self, plug: PlugId) -> GraphResult<&[PlugId]> {
        Ok(&self.plug_record(plug)?.outputs)
    }

    /// All `(source, destination)` connections between different nodes.
    /// Pass-through plugs are established by node construction and are not
    /// listed.
    pub fn connections(&self) -> Vec<(PlugId, PlugId)> {
        self.nodes()
            .filter_map(|node| self.plugs(node).ok())
            .flatten()
            .filter_map(|&destination| {
                let record = self.plug_record(destination).ok()?;
                let source = record.input?;
                let external = self
                    .plug_record(source)
                    .map(|s| s.node != record.node)
                    .unwrap_or(false);
                external.then_some((source, destination))
            })
            .collect()
    }
}
