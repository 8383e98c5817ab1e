//! Synthetic summary record attached next to the file contents.

use crate::core::policy::{KindRule, RenderReport};
use crate::domain::model::CompositeType;
use crate::domain::source::{Container, ContainerKind, SourceKind, SourceNode};

pub const SUMMARY_ID: &str = "Summary";
pub const SUMMARY_TYPE_NAME: &str = "map";

/// Counts of top-level collections; a count of zero leaves its entry out.
pub fn summarize(root: &SourceNode) -> SourceNode {
    let mut summary = Container::new(ContainerKind::Summary, SUMMARY_ID);

    let acquisitions = collection_len(root, "acquisition");
    if acquisitions > 0 {
        summary = summary.with_field("Num. of acquisitions", acquisitions.to_string());
    }

    let stimuli = collection_len(root, "stimulus");
    if stimuli > 0 {
        summary = summary.with_field("Num. of stimulus", stimuli.to_string());
    }

    summary.into()
}

fn collection_len(root: &SourceNode, key: &str) -> usize {
    root.child(key)
        .and_then(SourceNode::children)
        .map_or(0, |entries| entries.len())
}

pub fn summary_rule() -> KindRule {
    KindRule::terminal(SourceKind::Summary, name_summary, render_summary)
}

fn name_summary(_: &SourceNode) -> Option<String> {
    Some(SUMMARY_TYPE_NAME.to_string())
}

fn render_summary(node: &SourceNode, target: &mut CompositeType) -> RenderReport {
    let mut report = RenderReport::default();
    let Some(fields) = node.children() else {
        return report;
    };

    for (key, value) in fields {
        match value {
            SourceNode::Text(text) => {
                target.push_text(key.as_str(), text.as_str());
                report.emitted += 1;
            }
            _ => report.skipped.push(key.clone()),
        }
    }
    report
}
