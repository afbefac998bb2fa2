//! The run object: one working document and one active-unit context

use crate::errors::Result;
use crate::settings::RunSettings;
use crate::unit::Unit;
use rimpatch_core::{
    execute, patch, ActiveContext, Document, ExError, Operation, OperationParser, PatchResult,
    XmlNode,
};
use rimpatch_core_types::correlation::RunId;

/// State of a single assembly run
///
/// The document is owned exclusively by the run. The context is captured at
/// construction and never changes afterwards.
#[derive(Debug)]
pub struct Run {
    id: RunId,
    settings: RunSettings,
    document: Document,
    context: ActiveContext,
    parser: OperationParser,
}

impl Run {
    /// Start a run with an explicit context
    pub fn new(settings: RunSettings, context: ActiveContext) -> Self {
        let document = Document::new(settings.root_tag.clone());
        let parser = settings.parser();
        Self {
            id: RunId::new(),
            settings,
            document,
            context,
            parser,
        }
    }

    /// Start a run whose context holds the ids and names of `units`
    pub fn for_units(settings: RunSettings, units: &[&dyn Unit]) -> Self {
        let context = ActiveContext::new(
            units.iter().map(|u| u.id()),
            units.iter().map(|u| u.name()),
        );
        Self::new(settings, context)
    }

    pub fn id(&self) -> &RunId {
        &self.id
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn context(&self) -> &ActiveContext {
        &self.context
    }

    pub fn active_ids(&self) -> impl Iterator<Item = &str> {
        self.context.ids()
    }

    pub fn active_names(&self) -> impl Iterator<Item = &str> {
        self.context.names()
    }

    /// Apply top-level operations, one result per operation
    ///
    /// # Errors
    ///
    /// Returns the first structural error; earlier operations stay applied.
    pub fn execute(&mut self, operations: &[Operation]) -> Result<Vec<PatchResult>> {
        execute(&mut self.document, operations, &self.context).map_err(ExError::from)
    }

    /// Parse and apply an operation file
    ///
    /// # Errors
    ///
    /// Returns parse errors before any operation is applied, or the first
    /// structural error.
    pub fn patch(&mut self, file: &XmlNode) -> Result<Vec<PatchResult>> {
        patch(&mut self.document, file, &self.parser, &self.context)
    }

    /// Append a definition file's top-level children under the root
    ///
    /// # Errors
    ///
    /// Returns `DifferentRoots` if the file's root tag differs.
    pub fn merge(&mut self, file: &XmlNode) -> Result<usize> {
        self.document.merge(file).map_err(ExError::from)
    }
}
