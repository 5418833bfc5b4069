use crate::report::RewriteReport;

/// Replace every bolded `**label**` with a `## label` heading, one label at a time.
pub fn promote_labels(text: &str, labels: &[String], report: &mut RewriteReport) -> String {
    let mut output = text.to_string();
    for label in labels {
        let bolded = format!("**{label}**");
        let count = output.matches(&bolded).count();
        if count == 0 {
            continue;
        }
        output = output.replace(&bolded, &format!("## {label}"));
        report.labels_promoted += count;
    }
    output
}

/// Insert `marker` followed by a blank line before the first `anchor_heading`.
///
/// Nothing happens when the marker already appears anywhere in the text, or
/// when the anchor heading is absent.
pub fn insert_toc_marker(
    text: &str,
    marker: &str,
    anchor_heading: &str,
    report: &mut RewriteReport,
) -> String {
    if text.contains(marker) {
        return text.to_string();
    }

    let Some(position) = text.find(anchor_heading) else {
        tracing::debug!(anchor = anchor_heading, "no anchor heading; TOC marker not inserted");
        return text.to_string();
    };

    let mut output = String::with_capacity(text.len() + marker.len() + 2);
    output.push_str(&text[..position]);
    output.push_str(marker);
    output.push_str("\n\n");
    output.push_str(&text[position..]);
    report.toc_inserted = true;
    output
}
