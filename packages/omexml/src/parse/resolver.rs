//! Second parse phase: turning reference stubs into links.

use crate::error::ModelError;
use crate::model::{EntityId, ModelGraph};

/// A reference stub read from a document, waiting for its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReference {
    /// Entity holding the stub.
    pub source: EntityId,

    /// Reference property of the source.
    pub property: &'static str,

    /// Value of the stub's `ID` attribute.
    pub target_id: String,
}

/// Outcome of resolving a batch of stubs.
#[derive(Debug, Default)]
pub struct ResolutionReport {
    /// Number of links created.
    pub resolved: usize,

    /// One error per stub that could not be linked.
    pub errors: Vec<ModelError>,
}

impl ResolutionReport {
    /// Check whether every stub was linked.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: ResolutionReport) {
        self.resolved += other.resolved;
        self.errors.extend(other.errors);
    }
}

/// Resolve stubs against the ID index of `graph`, in order.
///
/// Each stub is handled on its own: a missing or wrongly-typed target is
/// recorded in the report and the remaining stubs are still linked.
pub fn resolve_references(
    graph: &mut ModelGraph<'_>,
    pending: impl IntoIterator<Item = PendingReference>,
) -> ResolutionReport {
    let mut report = ResolutionReport::default();

    for stub in pending {
        let Some(target) = graph.lookup(&stub.target_id) else {
            tracing::warn!(
                source = %graph.describe(stub.source),
                property = stub.property,
                target_id = %stub.target_id,
                "Unresolved reference"
            );
            report.errors.push(ModelError::UnresolvedReference {
                source_entity: graph.describe(stub.source),
                property: stub.property.to_string(),
                target_id: stub.target_id,
            });
            continue;
        };

        match graph.link(stub.source, stub.property, target) {
            Ok(()) => report.resolved += 1,
            Err(ModelError::KindMismatch { actual, .. }) => {
                tracing::warn!(
                    source = %graph.describe(stub.source),
                    property = stub.property,
                    target_id = %stub.target_id,
                    found = %actual,
                    "Reference target has the wrong kind"
                );
                report.errors.push(ModelError::ReferenceKindMismatch {
                    source_entity: graph.describe(stub.source),
                    property: stub.property.to_string(),
                    target_id: stub.target_id,
                    found: actual,
                });
            }
            Err(err) => report.errors.push(err),
        }
    }

    tracing::debug!(
        resolved = report.resolved,
        failed = report.errors.len(),
        "Reference resolution finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntityKind, Schema};

    fn stub(source: EntityId, property: &'static str, target_id: &str) -> PendingReference {
        PendingReference {
            source,
            property,
            target_id: target_id.to_string(),
        }
    }

    #[test]
    fn test_resolves_in_order_and_isolates_failures() {
        let mut graph = ModelGraph::new(Schema::v2010_04());
        let reagent = graph.create(EntityKind::Reagent).unwrap();
        let a1 = graph.create(EntityKind::CommentAnnotation).unwrap();
        graph.set_property(a1, "ID", "A1").unwrap();

        let report = resolve_references(
            &mut graph,
            [
                stub(reagent, "AnnotationRef", "A1"),
                stub(reagent, "AnnotationRef", "A2"),
            ],
        );

        assert_eq!(report.resolved, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            &report.errors[0],
            ModelError::UnresolvedReference { target_id, .. } if target_id == "A2"
        ));
        assert_eq!(graph.copy_linked(reagent, "AnnotationRef").unwrap(), vec![a1]);
        assert_eq!(graph.copy_linked(a1, "Reagent").unwrap(), vec![reagent]);
    }

    #[test]
    fn test_wrong_target_kind_is_not_linked() {
        let mut graph = ModelGraph::new(Schema::v2010_04());
        let well = graph.create(EntityKind::Well).unwrap();
        let plate = graph.create(EntityKind::Plate).unwrap();
        graph.set_property(plate, "ID", "Plate:1").unwrap();

        let report = resolve_references(&mut graph, [stub(well, "ReagentRef", "Plate:1")]);

        assert!(!report.is_complete());
        assert!(matches!(
            &report.errors[0],
            ModelError::ReferenceKindMismatch { found: EntityKind::Plate, .. }
        ));
        assert_eq!(graph.size_of_linked(well, "ReagentRef").unwrap(), 0);
    }

    #[test]
    fn test_empty_id_matches_exactly() {
        let mut graph = ModelGraph::new(Schema::v2010_04());
        let screen = graph.create(EntityKind::Screen).unwrap();
        let plate = graph.create(EntityKind::Plate).unwrap();
        graph.set_property(plate, "ID", "").unwrap();

        let report = resolve_references(
            &mut graph,
            [stub(screen, "PlateRef", ""), stub(screen, "PlateRef", " ")],
        );

        assert_eq!(report.resolved, 1);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_merge_reports() {
        let mut report = ResolutionReport::default();
        report.merge(ResolutionReport {
            resolved: 2,
            errors: vec![ModelError::DuplicateId("x".to_string())],
        });
        assert_eq!(report.resolved, 2);
        assert_eq!(report.errors.len(), 1);
    }
}
