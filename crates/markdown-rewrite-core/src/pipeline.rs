//! The two named document transforms.
//!
//! `modify` promotes section labels, inserts the TOC marker, normalizes
//! images and enumerates level-2 headings, in that order.
//! `delete-level-2-header` only turns enumerated headings back into numbers.
//! Both are pure functions of the input text.

use std::fmt;

use markdown_rewrite_config::ModifySettings;

use crate::heading::{enumerate_headings, number_headings};
use crate::image::{rewrite_embeds, rewrite_standard_images};
use crate::report::RewriteReport;
use crate::section::{insert_toc_marker, promote_labels};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    Modify,
    DeleteLevel2Header,
}

impl Transform {
    pub fn id(self) -> &'static str {
        match self {
            Transform::Modify => "modify",
            Transform::DeleteLevel2Header => "delete-level-2-header",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Result of running a transform over a document.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub transform: Transform,
    pub text: String,
    pub changed: bool,
    pub report: RewriteReport,
}

pub fn apply_transform(
    transform: Transform,
    text: &str,
    settings: &ModifySettings,
) -> TransformOutcome {
    let mut report = RewriteReport::default();
    let output = match transform {
        Transform::Modify => modify(text, settings, &mut report),
        Transform::DeleteLevel2Header => delete_level_2_header(text, &mut report),
    };

    let changed = output != text;
    tracing::debug!(
        transform = transform.id(),
        changed,
        rewrites = report.total_rewrites(),
        "transform finished"
    );

    TransformOutcome {
        transform,
        text: output,
        changed,
        report,
    }
}

pub fn modify(text: &str, settings: &ModifySettings, report: &mut RewriteReport) -> String {
    let image_prefix = settings.image_prefix();

    let text = promote_labels(text, &settings.promote_labels, report);
    let text = insert_toc_marker(
        &text,
        &settings.toc_marker,
        &settings.anchor_heading(),
        report,
    );
    let text = rewrite_embeds(&text, &image_prefix, report);
    let text = rewrite_standard_images(&text, &image_prefix, report);
    enumerate_headings(&text, report)
}

pub fn delete_level_2_header(text: &str, report: &mut RewriteReport) -> String {
    number_headings(text, report)
}
