use crate::core::policy::MappingPolicy;
use crate::core::summary::{self, SUMMARY_ID, SUMMARY_TYPE_NAME};
use crate::domain::model::{CompositeType, Library, Model, Parent, TypeRef, Variable, VariableValue};
use crate::domain::source::{SourceKind, SourceNode};
use crate::utils::error::{InterpreterError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub types: usize,
    pub variables: usize,
    pub skipped_fields: usize,
}

/// Outcome of [`GraphBuilder::extended_build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedBuild {
    Added(TypeRef),
    /// No root type to attach to; nothing was built.
    NoRoot,
    /// The root already holds a type with the summary id; nothing was built.
    Occupied(TypeRef),
}

/// Walks a source tree and emits one composite type per expanded node.
pub struct GraphBuilder<'p> {
    policy: &'p MappingPolicy,
    root_name: String,
    model: Model,
    stats: BuildStats,
}

impl<'p> GraphBuilder<'p> {
    pub fn new(
        model_name: &str,
        library_id: &str,
        root_name: &str,
        policy: &'p MappingPolicy,
    ) -> Self {
        Self {
            policy,
            root_name: root_name.to_string(),
            model: Model::new(model_name, Library::new(library_id)),
            stats: BuildStats::default(),
        }
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn finish(self) -> Model {
        tracing::debug!(
            "Model '{}' built: {} types, {} variables, {} skipped fields",
            self.model.name,
            self.stats.types,
            self.stats.variables,
            self.stats.skipped_fields
        );
        self.model
    }

    pub fn build(&mut self, root: &SourceNode) -> Result<TypeRef> {
        let root_name = self.root_name.clone();
        self.build_type(&root_name, root, &root_name, Parent::Root)
    }

    /// Attaches the synthetic summary record under the root type built by [`Self::build`].
    pub fn extended_build(&mut self, root: &SourceNode) -> Result<ExtendedBuild> {
        let Some(root_type) = self.model.root_type() else {
            tracing::warn!(
                "Extended build skipped for model '{}': no root type, build() has not run",
                self.model.name
            );
            return Ok(ExtendedBuild::NoRoot);
        };

        let summary_id = format!("{}.{}", self.composite(root_type, SUMMARY_ID)?.id, SUMMARY_ID);
        if let Some(existing) = self.model.library.ref_by_id(&summary_id) {
            tracing::warn!(
                "Extended build skipped for model '{}': type '{}' already exists",
                self.model.name,
                summary_id
            );
            return Ok(ExtendedBuild::Occupied(existing));
        }

        let summary = summary::summarize(root);
        let added = self.build_type(SUMMARY_ID, &summary, SUMMARY_TYPE_NAME, Parent::Type(root_type))?;
        Ok(ExtendedBuild::Added(added))
    }

    pub fn build_type(
        &mut self,
        local_id: &str,
        node: &SourceNode,
        display_name: &str,
        parent: Parent,
    ) -> Result<TypeRef> {
        let id = match parent {
            Parent::Root => local_id.to_string(),
            Parent::Type(parent_ref) => {
                let parent_id = &self.composite(parent_ref, local_id)?.id;
                if parent_id.is_empty() {
                    local_id.to_string()
                } else {
                    format!("{}.{}", parent_id, local_id)
                }
            }
        };

        tracing::trace!("Building type '{}' ({})", id, display_name);
        let this = self.model.library.push(CompositeType::new(id, display_name));
        self.stats.types += 1;

        let policy = self.policy;
        if policy.is_terminal(node) {
            let target = self.composite_mut(this, local_id)?;
            if let Some(report) = policy.render(node, target) {
                self.stats.variables += report.emitted;
                self.stats.skipped_fields += report.skipped.len();
            }
        } else if let Some(entries) = node.children() {
            for (key, value) in entries {
                if let Some(text) = value.scalar_text() {
                    self.composite_mut(this, key)?.push_text(key.as_str(), text);
                    self.stats.variables += 1;
                } else if value.kind() == SourceKind::Boolean {
                    tracing::trace!("Skipping unsupported scalar field '{}'", key);
                    self.stats.skipped_fields += 1;
                }

                if let Some(type_name) = policy.classify(value) {
                    self.build_type(key, value, &type_name, Parent::Type(this))?;
                }
            }
        }

        let variable = Variable {
            id: local_id.to_string(),
            name: display_name.to_string(),
            value: VariableValue::Type(this),
        };
        match parent {
            Parent::Root => self.model.variables.push(variable),
            Parent::Type(parent_ref) => self.composite_mut(parent_ref, local_id)?.variables.push(variable),
        }
        self.stats.variables += 1;

        Ok(this)
    }

    fn composite(&self, type_ref: TypeRef, key: &str) -> Result<&CompositeType> {
        self.model
            .library
            .get(type_ref)
            .ok_or_else(|| dangling(type_ref, key))
    }

    fn composite_mut(&mut self, type_ref: TypeRef, key: &str) -> Result<&mut CompositeType> {
        self.model
            .library
            .get_mut(type_ref)
            .ok_or_else(|| dangling(type_ref, key))
    }
}

fn dangling(type_ref: TypeRef, key: &str) -> InterpreterError {
    InterpreterError::NotFound {
        path: format!("library type #{}", type_ref.0),
        key: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::source::{Container, ContainerKind, LabelledMapping};
    use std::collections::HashSet;

    fn unit(name: &str) -> Container {
        Container::new(ContainerKind::TimeSeries, name)
            .with_field("unit", "mV")
            .with_field("data", vec![1.0, 2.0])
    }

    fn sample_root() -> SourceNode {
        Container::new(ContainerKind::File, "root")
            .with_field("session_description", "demo session")
            .with_field("identifier", "42")
            .with_field("file_version", 2.5)
            .with_field(
                "acquisition",
                LabelledMapping::new("acquisition")
                    .with_entry("unitA", unit("unitA"))
                    .with_entry("unitB", unit("unitB")),
            )
            .with_field("stimulus", LabelledMapping::new("stimulus"))
            .with_field("devices", LabelledMapping::new("devices").with_entry(
                "probe",
                Container::new(ContainerKind::Device, "probe"),
            ))
            .with_field(
                "subject",
                Container::new(ContainerKind::Subject, "subject")
                    .with_field("species", "Mus musculus")
                    .with_field("age", "P90D"),
            )
            .with_field("epoch_tags", SourceNode::Set(vec![SourceNode::from("tag")]))
            .with_field("trials", Container::new(ContainerKind::Table, "trials"))
            .into()
    }

    fn build(policy: &MappingPolicy, root: &SourceNode) -> Model {
        let mut builder = GraphBuilder::new("nwb", "nwblib", "nwbfile", policy);
        builder.build(root).unwrap();
        builder.finish()
    }

    #[test]
    fn test_ids_are_dot_joined_paths() {
        let model = build(&MappingPolicy::base(), &sample_root());
        let ids: Vec<&str> = model.library.types.iter().map(|t| t.id.as_str()).collect();

        assert_eq!(
            ids,
            vec![
                "nwbfile",
                "nwbfile.acquisition",
                "nwbfile.acquisition.unitA",
                "nwbfile.acquisition.unitB",
                "nwbfile.devices",
                "nwbfile.subject",
            ]
        );
        assert_eq!(model.variables.len(), 1);
        assert_eq!(model.variables[0].id, "nwbfile");
        assert_eq!(model.variables[0].name, "nwbfile");
    }

    #[test]
    fn test_root_type_variables_follow_field_order() {
        let model = build(&MappingPolicy::base(), &sample_root());
        let root = model.library.get(model.root_type().unwrap()).unwrap();
        let ids: Vec<&str> = root.variables.iter().map(|v| v.id.as_str()).collect();

        assert_eq!(
            ids,
            vec!["session_description", "identifier", "file_version", "acquisition", "devices", "subject"]
        );
        assert_eq!(root.variable("identifier").unwrap().text(), Some("42"));
        assert_eq!(root.variable("file_version").unwrap().text(), Some("2.5"));
        assert_eq!(model.type_of(root.variable("subject").unwrap()).unwrap().name, "map");
    }

    #[test]
    fn test_suppressed_kinds_create_no_types() {
        let model = build(&MappingPolicy::base(), &sample_root());

        for suppressed in ["nwbfile.stimulus", "nwbfile.epoch_tags", "nwbfile.trials", "nwbfile.devices.probe"] {
            assert!(model.library.find_by_id(suppressed).is_none(), "{}", suppressed);
        }
        let devices = model.library.find_by_id("nwbfile.devices").unwrap();
        assert!(devices.variables.is_empty());
    }

    #[test]
    fn test_terminal_series_are_rendered_not_recursed() {
        let model = build(&MappingPolicy::base(), &sample_root());
        let unit_a = model.library.find_by_id("nwbfile.acquisition.unitA").unwrap();
        let ids: Vec<&str> = unit_a.variables.iter().map(|v| v.id.as_str()).collect();

        assert_eq!(unit_a.name, "timeseries");
        assert_eq!(ids, vec!["unit", "time", "data"]);
        assert_eq!(unit_a.variable("data").unwrap().value, VariableValue::Import);
    }

    #[test]
    fn test_scalar_and_composite_coexist() {
        fn name_text(_: &SourceNode) -> Option<String> {
            Some("literal".to_string())
        }

        let policy = MappingPolicy::base().with_override(crate::core::policy::KindRule::named(
            crate::domain::source::SourceKind::Text,
            name_text,
        ));
        let root: SourceNode = Container::new(ContainerKind::File, "root")
            .with_field("answer", "42")
            .into();
        let model = build(&policy, &root);
        let root_type = model.library.find_by_id("nwbfile").unwrap();

        assert_eq!(root_type.variables.len(), 2);
        assert_eq!(root_type.variables[0].text(), Some("42"));
        let composite = model.type_of(&root_type.variables[1]).unwrap();
        assert_eq!(composite.id, "nwbfile.answer");
        assert_eq!(composite.name, "literal");
    }

    #[test]
    fn test_every_type_has_one_incoming_variable() {
        let model = build(&MappingPolicy::extended(), &sample_root());
        let mut incoming = vec![0usize; model.library.types.len()];

        let all_variables = model
            .variables
            .iter()
            .chain(model.library.types.iter().flat_map(|t| t.variables.iter()));
        for variable in all_variables {
            if let Some(type_ref) = variable.type_ref() {
                incoming[type_ref.0] += 1;
            }
        }

        assert!(incoming.iter().all(|count| *count == 1), "{:?}", incoming);
        let unique: HashSet<&str> = model.library.types.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(unique.len(), model.library.types.len());
    }

    #[test]
    fn test_build_is_idempotent() {
        let policy = MappingPolicy::extended();
        let root = sample_root();

        assert_eq!(build(&policy, &root), build(&policy, &root));
    }

    #[test]
    fn test_extended_build_adds_summary_under_root() {
        let policy = MappingPolicy::extended();
        let root = sample_root();
        let mut builder = GraphBuilder::new("nwb", "nwblib", "nwbfile", &policy);
        builder.build(&root).unwrap();

        let outcome = builder.extended_build(&root).unwrap();
        let model = builder.finish();

        let ExtendedBuild::Added(summary_ref) = outcome else {
            panic!("expected summary to be added, got {:?}", outcome);
        };
        let summary = model.library.get(summary_ref).unwrap();
        assert_eq!(summary.id, "nwbfile.Summary");
        assert_eq!(summary.name, "map");
        assert_eq!(summary.variable("Num. of acquisitions").unwrap().text(), Some("2"));
        assert!(summary.variable("Num. of stimulus").is_none());

        let root_type = model.library.find_by_id("nwbfile").unwrap();
        assert_eq!(root_type.variables.last().unwrap().id, "Summary");
    }

    #[test]
    fn test_extended_build_without_root_is_noop() {
        let policy = MappingPolicy::extended();
        let mut builder = GraphBuilder::new("nwb", "nwblib", "nwbfile", &policy);

        let outcome = builder.extended_build(&sample_root()).unwrap();

        assert_eq!(outcome, ExtendedBuild::NoRoot);
        assert_eq!(builder.stats(), &BuildStats::default());
        assert!(builder.model().library.types.is_empty());
    }

    #[test]
    fn test_unsupported_scalars_are_counted_as_skipped() {
        let policy = MappingPolicy::base();
        let root: SourceNode = Container::new(ContainerKind::File, "root")
            .with_field("identifier", "42")
            .with_field("is_reviewed", SourceNode::Boolean(true))
            .with_field(
                "subject",
                Container::new(ContainerKind::Subject, "subject").with_field("is_alive", SourceNode::Boolean(false)),
            )
            .into();
        let mut builder = GraphBuilder::new("nwb", "nwblib", "nwbfile", &policy);
        builder.build(&root).unwrap();

        assert_eq!(builder.stats().skipped_fields, 2);
        let root_type = builder.model().library.find_by_id("nwbfile").unwrap();
        assert!(root_type.variable("is_reviewed").is_none());
        assert_eq!(root_type.variable("identifier").unwrap().text(), Some("42"));
    }

    #[test]
    fn test_extended_build_keeps_existing_summary_id() {
        let policy = MappingPolicy::extended();
        let root: SourceNode = Container::new(ContainerKind::File, "root")
            .with_field(
                "acquisition",
                LabelledMapping::new("acquisition").with_entry("unitA", unit("unitA")),
            )
            .with_field("Summary", Container::new(ContainerKind::Subject, "Summary"))
            .into();
        let mut builder = GraphBuilder::new("nwb", "nwblib", "nwbfile", &policy);
        builder.build(&root).unwrap();
        let types_before = builder.model().library.types.len();

        let outcome = builder.extended_build(&root).unwrap();
        let model = builder.finish();

        let existing = model.library.ref_by_id("nwbfile.Summary").unwrap();
        assert_eq!(outcome, ExtendedBuild::Occupied(existing));
        assert_eq!(model.library.types.len(), types_before);
        let ids: HashSet<&str> = model.library.types.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), model.library.types.len());
    }

    #[test]
    fn test_dangling_parent_is_an_error() {
        let policy = MappingPolicy::base();
        let mut builder = GraphBuilder::new("nwb", "nwblib", "nwbfile", &policy);

        let result = builder.build_type("x", &sample_root(), "x", Parent::Type(TypeRef(9)));
        assert!(matches!(result, Err(InterpreterError::NotFound { .. })));
    }
}
