//! Parse sessions: populating a graph from XML elements.

use roxmltree::Node;

use super::extract::{
    coerce, extract_attribute, extract_child_elements, extract_reference_ids,
    extract_simple_element,
};
use super::resolver::{resolve_references, PendingReference, ResolutionReport};
use crate::config::{is_conforming_id, ParseOptions, ID_ATTRIBUTE};
use crate::error::{ModelError, ParseWarning, Result};
use crate::model::{EntityId, ModelGraph};
use crate::schema::{EntityKind, KindSpec, PropertyKind, PropertySpec, Schema};
use crate::xml::{child_elements, is_element_named, local_name};

/// Result of a finished parse session.
#[derive(Debug)]
pub struct ParsedModel<'s> {
    /// The populated, linked graph.
    pub graph: ModelGraph<'s>,

    /// Entity built from the document element, if any.
    pub root: Option<EntityId>,

    /// Non-fatal findings, in the order they were made.
    pub warnings: Vec<ParseWarning>,

    /// Reference resolution outcome.
    pub resolution: ResolutionReport,
}

impl<'s> ParsedModel<'s> {
    /// Fail if any reference could not be resolved.
    ///
    /// # Errors
    /// Returns `ModelError::Unresolved` carrying every resolution error.
    pub fn ensure_resolved(mut self) -> Result<Self> {
        if self.resolution.is_complete() {
            Ok(self)
        } else {
            Err(ModelError::Unresolved(std::mem::take(
                &mut self.resolution.errors,
            )))
        }
    }
}

/// One parse or build session over a single graph.
///
/// Phase one ([`instantiate`](Self::instantiate) and
/// [`update`](Self::update)) creates entities and records reference stubs.
/// Phase two ([`resolve`](Self::resolve)) links the stubs once every
/// entity they may name exists.
#[derive(Debug)]
pub struct ParseSession<'s> {
    graph: ModelGraph<'s>,
    options: ParseOptions,
    pending: Vec<PendingReference>,
    warnings: Vec<ParseWarning>,
    resolution: ResolutionReport,
    root: Option<EntityId>,
}

impl<'s> ParseSession<'s> {
    /// Start a session with default options.
    #[must_use]
    pub fn new(schema: &'s Schema) -> Self {
        Self::with_options(schema, ParseOptions::default())
    }

    /// Start a session on an empty graph.
    #[must_use]
    pub fn with_options(schema: &'s Schema, options: ParseOptions) -> Self {
        Self::from_graph(ModelGraph::new(schema), options)
    }

    /// Continue working on an existing graph.
    #[must_use]
    pub fn from_graph(graph: ModelGraph<'s>, options: ParseOptions) -> Self {
        Self {
            graph,
            options,
            pending: Vec::new(),
            warnings: Vec::new(),
            resolution: ResolutionReport::default(),
            root: None,
        }
    }

    /// The graph being populated.
    #[must_use]
    pub fn graph(&self) -> &ModelGraph<'s> {
        &self.graph
    }

    /// Mutable access to the graph, for building entities through the API.
    pub fn graph_mut(&mut self) -> &mut ModelGraph<'s> {
        &mut self.graph
    }

    #[must_use]
    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Stubs waiting for [`resolve`](Self::resolve).
    #[must_use]
    pub fn pending(&self) -> &[PendingReference] {
        &self.pending
    }

    /// Warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Build the entity for a document element, choosing the kind by tag.
    ///
    /// # Errors
    /// Returns `ModelError::UnknownRootElement` if no kind has this element
    /// name, or any error from [`instantiate`](Self::instantiate).
    pub fn instantiate_root(&mut self, node: Node<'_, '_>) -> Result<EntityId> {
        let tag = local_name(node);
        let kind = self
            .graph
            .schema()
            .kinds()
            .kind_for_tag(tag)
            .ok_or_else(|| ModelError::UnknownRootElement(tag.to_string()))?;
        let root = self.instantiate(kind, node)?;
        self.root = Some(root);
        Ok(root)
    }

    /// Create an entity of `kind` and populate it from `node`.
    ///
    /// On failure nothing created for the subtree is left behind.
    ///
    /// # Errors
    /// Returns any error raised while populating the entity or its children.
    pub fn instantiate(&mut self, kind: EntityKind, node: Node<'_, '_>) -> Result<EntityId> {
        self.instantiate_at(kind, node, 1)
    }

    /// Populate an existing entity from `node`.
    ///
    /// Properties present in the element are set or overwritten; properties
    /// absent from it are left as they are. Reference stubs are queued for
    /// the next [`resolve`](Self::resolve). On failure the entity and its
    /// subtree are left as they were before the call.
    ///
    /// # Errors
    /// Returns an error for invalid values, repeated singular elements,
    /// stubs without `ID`, duplicate IDs, or a tag mismatch in strict mode.
    pub fn update(&mut self, id: EntityId, node: Node<'_, '_>) -> Result<()> {
        self.merge_at(id, node, 1)
    }

    /// Link every queued stub.
    ///
    /// The outcome is also accumulated for [`finish`](Self::finish).
    pub fn resolve(&mut self) -> &ResolutionReport {
        let pending = std::mem::take(&mut self.pending);
        let report = resolve_references(&mut self.graph, pending);
        self.resolution.merge(report);
        &self.resolution
    }

    /// Resolve any remaining stubs and hand over the graph.
    #[must_use]
    pub fn finish(mut self) -> ParsedModel<'s> {
        if !self.pending.is_empty() {
            self.resolve();
        }
        ParsedModel {
            graph: self.graph,
            root: self.root,
            warnings: self.warnings,
            resolution: self.resolution,
        }
    }

    fn instantiate_at(
        &mut self,
        kind: EntityKind,
        node: Node<'_, '_>,
        depth: usize,
    ) -> Result<EntityId> {
        let mark = self.graph.mark();
        let pending_mark = self.pending.len();
        let warnings_mark = self.warnings.len();

        let id = self.graph.create(kind)?;
        if let Err(err) = self.update_at(id, node, depth) {
            self.graph.rollback(mark);
            self.pending.truncate(pending_mark);
            self.warnings.truncate(warnings_mark);
            return Err(err);
        }
        Ok(id)
    }

    fn merge_at(&mut self, id: EntityId, node: Node<'_, '_>, depth: usize) -> Result<()> {
        let snapshot = self.graph.snapshot(id)?;
        let pending_mark = self.pending.len();
        let warnings_mark = self.warnings.len();

        if let Err(err) = self.update_at(id, node, depth) {
            self.graph.restore(snapshot);
            self.pending.truncate(pending_mark);
            self.warnings.truncate(warnings_mark);
            return Err(err);
        }
        Ok(())
    }

    fn update_at(&mut self, id: EntityId, node: Node<'_, '_>, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(ModelError::MaxDepthExceeded(self.options.max_depth));
        }

        let schema = self.graph.schema();
        let kind = self.graph.kind(id)?;
        let spec = schema.kind(kind).ok_or(ModelError::UnknownKind(kind))?;
        self.check_tag(spec, node)?;

        for property in &spec.properties {
            match &property.kind {
                PropertyKind::Attribute(value_type) => {
                    if let Some(raw) = extract_attribute(node, property) {
                        let value = coerce(schema, kind, property.name, *value_type, raw)?;
                        if property.name == ID_ATTRIBUTE {
                            self.check_id_convention(spec, raw);
                        }
                        self.graph.set_property(id, property.name, value)?;
                    }
                }
                PropertyKind::Element(value_type) => {
                    if let Some(text) = extract_simple_element(node, kind, property)? {
                        let value = coerce(schema, kind, property.name, *value_type, &text)?;
                        self.graph.set_property(id, property.name, value)?;
                    }
                }
                PropertyKind::Child(child_kind) => {
                    self.update_children(id, node, property, *child_kind, depth)?;
                }
                PropertyKind::Reference { .. } => {
                    for target_id in extract_reference_ids(node, kind, property)? {
                        self.pending.push(PendingReference {
                            source: id,
                            property: property.name,
                            target_id: target_id.to_string(),
                        });
                    }
                }
            }
        }

        for child in child_elements(node) {
            if spec.property(local_name(child)).is_none() {
                tracing::trace!(
                    element = local_name(child),
                    parent = %kind,
                    "Ignoring unknown element"
                );
            }
        }

        Ok(())
    }

    fn update_children(
        &mut self,
        parent: EntityId,
        node: Node<'_, '_>,
        property: &PropertySpec,
        child_kind: EntityKind,
        depth: usize,
    ) -> Result<()> {
        let parent_kind = self.graph.kind(parent)?;
        let previous = self.graph.get(parent)?.children(property.name).to_vec();
        for element in extract_child_elements(node, parent_kind, property)? {
            let outcome = match self.existing_child(&previous, element, property, child_kind) {
                Some(existing) => self.merge_at(existing, element, depth + 1).map(|()| None),
                None => self.instantiate_at(child_kind, element, depth + 1).map(Some),
            };

            match outcome {
                Ok(Some(child)) => self.graph.add_child(parent, child)?,
                Ok(None) => {}
                Err(err) if self.options.skip_invalid_entities => {
                    let parent_label = self.graph.describe(parent);
                    tracing::warn!(
                        error = %err,
                        tag = property.name,
                        parent = %parent_label,
                        "Skipping invalid entity"
                    );
                    self.warnings.push(ParseWarning::SkippedEntity {
                        tag: property.name.to_string(),
                        parent: parent_label,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Child from before this update that an element should be merged into.
    fn existing_child(
        &self,
        previous: &[EntityId],
        element: Node<'_, '_>,
        property: &PropertySpec,
        child_kind: EntityKind,
    ) -> Option<EntityId> {
        if property.is_singular() {
            return previous.first().copied();
        }
        element.attribute(ID_ATTRIBUTE)
            .and_then(|id| self.graph.lookup(id))
            .filter(|candidate| previous.contains(candidate))
            .filter(|candidate| self.graph.kind(*candidate).ok() == Some(child_kind))
    }

    fn check_tag(&mut self, spec: &KindSpec, node: Node<'_, '_>) -> Result<()> {
        if is_element_named(node, spec.tag()) {
            return Ok(());
        }
        let expected = spec.tag().to_string();
        let found = local_name(node).to_string();
        if self.options.strict_tag_names {
            return Err(ModelError::TagMismatch { expected, found });
        }
        tracing::warn!(%expected, %found, "Element name does not match entity kind");
        self.warnings
            .push(ParseWarning::TagMismatch { expected, found });
        Ok(())
    }

    fn check_id_convention(&mut self, spec: &KindSpec, id: &str) {
        let Some(prefix) = spec.id_prefix else {
            return;
        };
        if !is_conforming_id(prefix, id) {
            tracing::warn!(kind = %spec.kind, id, "ID does not follow the LSID convention");
            self.warnings.push(ParseWarning::NonConformingId {
                kind: spec.kind,
                id: id.to_string(),
                prefix,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use roxmltree::Document;

    fn session() -> ParseSession<'static> {
        ParseSession::new(Schema::v2010_04())
    }

    #[test]
    fn test_instantiate_reagent() {
        let xml = r#"<Reagent ID="Reagent:1" Name="siRNA" ReagentIdentifier="  ABC ">
            <Description>knock-down</Description>
        </Reagent>"#;
        let doc = Document::parse(xml).unwrap();
        let mut session = session();

        let reagent = session
            .instantiate(EntityKind::Reagent, doc.root_element())
            .unwrap();
        let graph = session.graph();

        assert_eq!(graph.lookup("Reagent:1"), Some(reagent));
        assert_eq!(
            graph.property(reagent, "ReagentIdentifier").unwrap(),
            Some(&Value::from("  ABC "))
        );
        assert_eq!(
            graph.property(reagent, "Description").unwrap(),
            Some(&Value::from("knock-down"))
        );
        assert!(session.warnings().is_empty());
    }

    #[test]
    fn test_tag_mismatch_warns_and_continues() {
        let doc = Document::parse(r#"<Reagant ID="Reagent:1" Name="x"/>"#).unwrap();
        let mut session = session();

        let reagent = session
            .instantiate(EntityKind::Reagent, doc.root_element())
            .unwrap();

        assert_eq!(
            session.graph().property(reagent, "Name").unwrap(),
            Some(&Value::from("x"))
        );
        assert_eq!(
            session.warnings(),
            &[ParseWarning::TagMismatch {
                expected: "Reagent".to_string(),
                found: "Reagant".to_string(),
            }]
        );
    }

    #[test]
    fn test_tag_mismatch_strict() {
        let doc = Document::parse(r#"<Reagant ID="Reagent:1"/>"#).unwrap();
        let options = ParseOptions::default().with_strict_tag_names(true);
        let mut session = ParseSession::with_options(Schema::v2010_04(), options);

        let err = session
            .instantiate(EntityKind::Reagent, doc.root_element())
            .unwrap_err();
        assert!(matches!(err, ModelError::TagMismatch { .. }));
        assert!(session.graph().is_empty());
    }

    #[test]
    fn test_failed_instantiation_rolls_back() {
        let xml = r#"<Plate ID="Plate:1">
            <Well ID="Well:1"><WellSample ID="WellSample:1"/></Well>
            <Well ID="Well:2" Row="two"/>
        </Plate>"#;
        let doc = Document::parse(xml).unwrap();
        let mut session = session();

        let err = session
            .instantiate(EntityKind::Plate, doc.root_element())
            .unwrap_err();

        assert!(matches!(err, ModelError::InvalidValue { .. }));
        assert!(session.graph().is_empty());
        assert_eq!(session.graph().lookup("Well:1"), None);
        assert_eq!(session.graph().lookup("Plate:1"), None);
    }

    #[test]
    fn test_skip_invalid_entities() {
        let xml = r#"<Plate ID="Plate:1">
            <Well ID="Well:1"><AnnotationRef ID="Annotation:1"/></Well>
            <Well ID="Well:2" Row="two"><AnnotationRef ID="Annotation:2"/></Well>
        </Plate>"#;
        let doc = Document::parse(xml).unwrap();
        let options = ParseOptions::default().with_skip_invalid_entities(true);
        let mut session = ParseSession::with_options(Schema::v2010_04(), options);

        let plate = session
            .instantiate(EntityKind::Plate, doc.root_element())
            .unwrap();

        let wells = session.graph().children(plate, EntityKind::Well).unwrap();
        assert_eq!(wells.len(), 1);
        assert_eq!(session.graph().lookup("Well:2"), None);
        assert_eq!(session.pending().len(), 1);
        assert!(matches!(
            &session.warnings()[0],
            ParseWarning::SkippedEntity { tag, .. } if tag == "Well"
        ));
    }

    #[test]
    fn test_update_is_cumulative() {
        let mut session = session();
        let doc = Document::parse(r#"<Reagent ID="Reagent:1" Name="first"/>"#).unwrap();
        let reagent = session
            .instantiate(EntityKind::Reagent, doc.root_element())
            .unwrap();

        let doc = Document::parse(
            r#"<Reagent ReagentIdentifier="R-7"><Description>d</Description></Reagent>"#,
        )
        .unwrap();
        session.update(reagent, doc.root_element()).unwrap();

        let graph = session.graph();
        assert_eq!(graph.property(reagent, "Name").unwrap(), Some(&Value::from("first")));
        assert_eq!(
            graph.property(reagent, "ReagentIdentifier").unwrap(),
            Some(&Value::from("R-7"))
        );
        assert_eq!(graph.property(reagent, "Description").unwrap(), Some(&Value::from("d")));
    }

    #[test]
    fn test_update_merges_identified_children() {
        let xml = r#"<Plate ID="Plate:1"><Well ID="Well:1" Row="0"/></Plate>"#;
        let doc = Document::parse(xml).unwrap();
        let mut session = session();
        let plate = session
            .instantiate(EntityKind::Plate, doc.root_element())
            .unwrap();

        let xml = r#"<Plate><Well ID="Well:1" Column="3"/><Well ID="Well:2"/></Plate>"#;
        let doc = Document::parse(xml).unwrap();
        session.update(plate, doc.root_element()).unwrap();

        let graph = session.graph();
        let wells = graph.children(plate, EntityKind::Well).unwrap();
        assert_eq!(wells.len(), 2);
        let well = graph.lookup("Well:1").unwrap();
        assert_eq!(graph.property(well, "Row").unwrap(), Some(&Value::Integer(0)));
        assert_eq!(graph.property(well, "Column").unwrap(), Some(&Value::Integer(3)));
    }

    fn plate_with_wells(session: &mut ParseSession<'_>) -> EntityId {
        let xml = r#"<Plate ID="Plate:1"><Well ID="Well:1" Row="0"/><Well ID="Well:2"/></Plate>"#;
        let doc = Document::parse(xml).unwrap();
        session
            .instantiate(EntityKind::Plate, doc.root_element())
            .unwrap()
    }

    /// Well:1 sets a column and gains a sample before its reagent stub fails.
    const INVALID_MERGE: &str = r#"<Plate Name="renamed">
        <Well ID="Well:1" Column="5">
            <WellSample ID="WellSample:1"/>
            <ReagentRef/>
            <AnnotationRef ID="Annotation:1"/>
        </Well>
        <Well ID="Well:3"/>
    </Plate>"#;

    #[test]
    fn test_update_skips_invalid_merged_child() {
        let options = ParseOptions::default().with_skip_invalid_entities(true);
        let mut session = ParseSession::with_options(Schema::v2010_04(), options);
        let plate = plate_with_wells(&mut session);

        let doc = Document::parse(INVALID_MERGE).unwrap();
        session.update(plate, doc.root_element()).unwrap();

        let graph = session.graph();
        assert_eq!(graph.property(plate, "Name").unwrap(), Some(&Value::from("renamed")));
        assert_eq!(graph.children(plate, EntityKind::Well).unwrap().len(), 3);
        assert!(graph.lookup("Well:3").is_some());

        let well = graph.lookup("Well:1").unwrap();
        assert_eq!(graph.property(well, "Row").unwrap(), Some(&Value::Integer(0)));
        assert_eq!(graph.property(well, "Column").unwrap(), None);
        assert!(graph.children(well, EntityKind::WellSample).unwrap().is_empty());
        assert_eq!(graph.lookup("WellSample:1"), None);
        assert!(session.pending().is_empty());
        assert!(matches!(
            session.warnings(),
            [ParseWarning::SkippedEntity { tag, parent, .. }]
                if tag == "Well" && parent.contains("Plate:1")
        ));
    }

    #[test]
    fn test_failed_update_leaves_entity_unchanged() {
        let mut session = session();
        let plate = plate_with_wells(&mut session);
        let before = session.graph().summary();

        let doc = Document::parse(INVALID_MERGE).unwrap();
        let err = session.update(plate, doc.root_element()).unwrap_err();
        assert!(matches!(err, ModelError::MissingAttribute { .. }));

        let graph = session.graph();
        assert_eq!(graph.summary(), before);
        assert_eq!(graph.property(plate, "Name").unwrap(), None);
        let well = graph.lookup("Well:1").unwrap();
        assert_eq!(graph.property(well, "Column").unwrap(), None);
        assert!(session.warnings().is_empty());
        assert!(session.pending().is_empty());
    }

    #[test]
    fn test_duplicate_id_is_fatal() {
        let xml = r#"<Screen ID="Screen:1"><Reagent ID="X"/><Reagent ID="X"/></Screen>"#;
        let doc = Document::parse(xml).unwrap();
        let mut session = session();

        let err = session
            .instantiate(EntityKind::Screen, doc.root_element())
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateId(id) if id == "X"));
    }

    #[test]
    fn test_non_conforming_id_warning() {
        let doc = Document::parse(r#"<TagAnnotation ID="Tag:1"/>"#).unwrap();
        let mut session = session();
        session
            .instantiate(EntityKind::TagAnnotation, doc.root_element())
            .unwrap();

        assert!(matches!(
            &session.warnings()[0],
            ParseWarning::NonConformingId { prefix: "Annotation", .. }
        ));
    }

    #[test]
    fn test_max_depth() {
        let xml = r#"<OME><Plate><Well><WellSample/></Well></Plate></OME>"#;
        let doc = Document::parse(xml).unwrap();
        let options = ParseOptions::default().with_max_depth(3);
        let mut session = ParseSession::with_options(Schema::v2010_04(), options);

        let err = session.instantiate_root(doc.root_element()).unwrap_err();
        assert!(matches!(err, ModelError::MaxDepthExceeded(3)));
    }

    #[test]
    fn test_instantiate_root_unknown() {
        let doc = Document::parse("<Image/>").unwrap();
        let err = session().instantiate_root(doc.root_element()).unwrap_err();
        assert!(matches!(err, ModelError::UnknownRootElement(tag) if tag == "Image"));
    }

    #[test]
    fn test_finish_resolves_pending() {
        let xml = r#"<OME>
            <Screen ID="Screen:1"><PlateRef ID="Plate:1"/></Screen>
            <Plate ID="Plate:1"/>
        </OME>"#;
        let doc = Document::parse(xml).unwrap();
        let mut session = session();
        session.instantiate_root(doc.root_element()).unwrap();
        assert_eq!(session.pending().len(), 1);

        let parsed = session.finish();
        assert_eq!(parsed.resolution.resolved, 1);
        let plate = parsed.graph.lookup("Plate:1").unwrap();
        let screen = parsed.graph.lookup("Screen:1").unwrap();
        assert_eq!(parsed.graph.copy_linked(plate, "Screen").unwrap(), vec![screen]);
        assert!(parsed.ensure_resolved().is_ok());
    }
}
