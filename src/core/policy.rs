//! Decides how source nodes show up in the model graph.
//!
//! A [`MappingPolicy`] is a base table of [`KindRule`]s plus an ordered list
//! of overrides. Lookups walk the overrides first, so extending the policy
//! means prepending a rule rather than replacing the base table.

use crate::core::summary;
use crate::domain::model::CompositeType;
use crate::domain::source::{SourceKind, SourceNode};
use std::fmt;

/// Display name for the composite type of a node, or `None` to keep the node out of the graph.
pub type Namer = fn(&SourceNode) -> Option<String>;

/// Emits the fixed variable set of a terminal node onto its composite type.
pub type Renderer = fn(&SourceNode, &mut CompositeType) -> RenderReport;

#[derive(Clone, Copy)]
pub struct KindRule {
    pub kind: SourceKind,
    pub namer: Namer,
    pub renderer: Option<Renderer>,
}

impl KindRule {
    pub fn named(kind: SourceKind, namer: Namer) -> Self {
        Self {
            kind,
            namer,
            renderer: None,
        }
    }

    pub fn terminal(kind: SourceKind, namer: Namer, renderer: Renderer) -> Self {
        Self {
            kind,
            namer,
            renderer: Some(renderer),
        }
    }
}

impl fmt::Debug for KindRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindRule")
            .field("kind", &self.kind)
            .field("terminal", &self.renderer.is_some())
            .finish()
    }
}

/// What a renderer put on a type, and which field keys it left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub emitted: usize,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MappingPolicy {
    overrides: Vec<KindRule>,
    base: Vec<KindRule>,
}

impl Default for MappingPolicy {
    fn default() -> Self {
        Self::base()
    }
}

impl MappingPolicy {
    pub fn base() -> Self {
        Self {
            overrides: Vec::new(),
            base: vec![
                KindRule::named(SourceKind::Subject, name_map),
                KindRule::terminal(SourceKind::ImageSeries, name_imageseries, render_image_series),
                KindRule::terminal(SourceKind::TimeSeries, name_timeseries, render_time_series),
                KindRule::named(SourceKind::Mapping, name_mapping),
                KindRule::named(SourceKind::Array, suppressed),
                KindRule::named(SourceKind::Set, suppressed),
                KindRule::named(SourceKind::Table, suppressed),
                KindRule::named(SourceKind::Device, suppressed),
            ],
        }
    }

    /// Base policy plus support for the synthetic summary record.
    pub fn extended() -> Self {
        Self::base().with_override(summary::summary_rule())
    }

    pub fn with_override(mut self, rule: KindRule) -> Self {
        self.overrides.insert(0, rule);
        self
    }

    fn rule_for(&self, kind: SourceKind) -> Option<&KindRule> {
        self.overrides
            .iter()
            .chain(self.base.iter())
            .find(|rule| rule.kind == kind)
    }

    pub fn classify(&self, node: &SourceNode) -> Option<String> {
        self.rule_for(node.kind()).and_then(|rule| (rule.namer)(node))
    }

    pub fn is_terminal(&self, node: &SourceNode) -> bool {
        self.rule_for(node.kind())
            .is_some_and(|rule| rule.renderer.is_some())
    }

    /// Renders a terminal node; `None` when the policy has no renderer for its kind.
    pub fn render(&self, node: &SourceNode, target: &mut CompositeType) -> Option<RenderReport> {
        let renderer = self.rule_for(node.kind())?.renderer?;
        Some(renderer(node, target))
    }
}

fn name_map(_: &SourceNode) -> Option<String> {
    Some("map".to_string())
}

fn name_imageseries(_: &SourceNode) -> Option<String> {
    Some("imageseries".to_string())
}

fn name_timeseries(_: &SourceNode) -> Option<String> {
    Some("timeseries".to_string())
}

fn name_mapping(node: &SourceNode) -> Option<String> {
    match node {
        SourceNode::Mapping(mapping) if !mapping.is_empty() => Some(mapping.label.clone()),
        _ => None,
    }
}

fn suppressed(_: &SourceNode) -> Option<String> {
    None
}

/// Every text or numeric field as a text variable named by its key.
pub fn push_scalar_fields(node: &SourceNode, target: &mut CompositeType) -> RenderReport {
    let mut report = RenderReport::default();
    let Some(fields) = node.children() else {
        return report;
    };

    for (key, value) in fields {
        match value.scalar_text() {
            Some(text) => {
                target.push_text(key.as_str(), text);
                report.emitted += 1;
            }
            None => report.skipped.push(key.clone()),
        }
    }
    report
}

fn render_time_series(node: &SourceNode, target: &mut CompositeType) -> RenderReport {
    let mut report = push_scalar_fields(node, target);
    target.push_import("time");
    target.push_import("data");
    report.emitted += 2;
    report
}

fn render_image_series(node: &SourceNode, target: &mut CompositeType) -> RenderReport {
    let mut report = push_scalar_fields(node, target);
    target.push_import("timestamps");
    report.emitted += 1;

    if let Some(num_samples) = node.as_container().and_then(|c| c.num_samples()) {
        target.push_text("num_samples", num_samples.to_string());
        report.emitted += 1;
    }
    report
}
