//! Plugin repository contract.
//!
//! Plugins may bundle a debt model XML document; the repository hands out a
//! readable source for it. Resetting the model always goes through the
//! bundled default.

use std::io::Read;

/// Plugin key whose bundled XML is the default model
pub const DEFAULT_MODEL_PLUGIN: &str = "technical-debt";

/// Supplies bundled model XML documents by plugin key
pub trait PluginModelRepository {
    /// A readable XML source for the model bundled by `plugin_key`
    fn model_reader(&self, plugin_key: &str) -> std::io::Result<Box<dyn Read>>;
}
